//! Shared Conditional Store Contract
//!
//! The primitives every shared structure is built on. Each operation is
//! linearizable per key; nothing is promised across keys.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Failures reported by a store binding.
///
/// None of these mean "someone else wrote first": lost races are reported
/// through the return values of the conditional primitives instead.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store transport error: {0}")]
    Transport(String),

    #[error("store responded with status {0}")]
    Status(u16),

    #[error("store codec error: {0}")]
    Codec(String),

    #[error("invalid map name: {0}")]
    InvalidName(String),
}

/// A string-keyed map offering atomic read and compare-and-swap primitives.
#[async_trait]
pub trait ConditionalStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` only if `key` is absent.
    ///
    /// Returns `None` when the write happened, or the value that was already
    /// present when another writer got there first.
    async fn create_if_absent(&self, key: &str, value: String)
    -> Result<Option<String>, StoreError>;

    /// Replaces the value only if it currently equals `expected` byte-for-byte.
    async fn replace_if_matches(
        &self,
        key: &str,
        expected: &str,
        value: String,
    ) -> Result<bool, StoreError>;

    /// Removes the entry only if its value currently equals `expected`.
    async fn remove_if_matches(&self, key: &str, expected: &str) -> Result<bool, StoreError>;
}

/// Handle to a cluster that hosts named shared structures.
#[async_trait]
pub trait Cluster: Send + Sync {
    /// Binds to the structure called `name`, creating it if needed.
    async fn shared_map(&self, name: &str) -> Result<Arc<dyn ConditionalStore>, StoreError>;
}
