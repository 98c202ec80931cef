//! # Provider
//!
//! Provider defines external data interfaces for the crate.

use anyhow::Result;

/// The `StateStore` trait defines the behavior for storing and retrieving
/// shift records and GPS pings.
pub trait StateStore: Send + Sync {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>>> + Send;

    /// Stores `value` under `key`, returning the value it replaced.
    fn set(
        &self, key: &str, value: &[u8],
    ) -> impl Future<Output = Result<Option<Vec<u8>>>> + Send;

    fn delete(&self, key: &str) -> impl Future<Output = Result<()>> + Send;
}
