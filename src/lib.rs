//! Cluster-Shared Group Registry Library
//!
//! Storage primitive for gateway nodes that register grouped metadata
//! (modules, tenants, deployments) in a map every node can write to at once.
//!
//! ## Architecture Modules
//! - **`locked`**: The two-level locked map. Groups of secondary-key/value pairs
//!   under a primary key, updated with compare-and-swap retry loops, plus an
//!   append-only index of every primary key.
//! - **`storage`**: The shared conditional key/value store the map runs on:
//!   its contract, an in-process implementation, and HTTP hosting/client bindings
//!   so several nodes can share one store.
//! - **`api`**: The node's HTTP surface over its locked maps.
//! - **`config`**: Command-line/environment configuration of a node.

pub mod api;
pub mod config;
pub mod locked;
pub mod storage;
