//! Shared Storage Module
//!
//! The conditional key/value store that shared structures are layered on.
//!
//! ## Core Concepts
//! - **Contract**: `ConditionalStore` offers get, create-if-absent, compare-and-replace
//!   and compare-and-remove, each linearizable per key.
//! - **Binding**: a `Cluster` hands out one store per structure name, creating it on first use.
//! - **Hosting**: `MemoryCluster` keeps the maps in process; `handlers` exposes them to peers.
//! - **Access**: `HttpCluster` runs the same primitives against a hosting peer over HTTP.

pub mod handlers;
pub mod memory;
pub mod protocol;
pub mod remote;
pub mod store;
