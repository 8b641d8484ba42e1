//! Locked Group Map Module
//!
//! A two-level map shared by every node of the cluster, kept consistent
//! without any lock service.
//!
//! ## Core Concepts
//! - **Groups**: each primary key holds a mapping of secondary keys to values,
//!   stored as one blob in a `ConditionalStore`.
//! - **Optimistic writes**: read, modify in memory, write back with compare-and-swap;
//!   a lost race reruns the attempt after a fixed delay (`retry`).
//! - **Key index**: an append-only sorted set of every primary key ever written,
//!   stored under the reserved `_keys` entry and updated after the group write.
//! - **Errors**: `Internal`, `NotFound` and `User` reach callers; conflicts never do.

pub mod codec;
pub mod errors;
pub mod map;
pub mod retry;
