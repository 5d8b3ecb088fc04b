#![deny(clippy::all)]

use crate::domain::{CacheKey, CacheValue, ConnectionHealth};
use async_trait::async_trait;
use shared::{BackendError, InvalidationDelay, Result, Ttl};
use tokio::sync::watch;

// Ports are the pluggable extension points: drivers face the application,
// backend clients face the storage technology.

/// Backend-neutral cache contract.
///
/// Every call resolves exactly once, either with the operation's result or
/// with a [`shared::ClusterException`] when the backend cannot serve it. A
/// missing key is never an error. Concurrent calls, even on the same key,
/// complete in no particular order.
#[async_trait]
pub trait CacheDriver: Send + Sync + 'static {
    /// `Ok(false)` when the key is absent
    async fn has(&self, key: &CacheKey) -> Result<bool>;

    /// `Ok(None)` when the key is absent
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheValue>>;

    /// Overwrites any existing value. `Ttl(0)` stores without expiry.
    async fn set(&self, key: &CacheKey, value: CacheValue, ttl: Ttl) -> Result<bool>;

    /// Schedules removal of `key` after `delay`.
    ///
    /// The deletion is not durable: if the backend loses its state (process
    /// exit for in-memory backends) before the delay elapses, the key is
    /// never removed. A later `set` on the same key cancels the schedule.
    async fn invalidate(&self, key: &CacheKey, delay: InvalidationDelay) -> Result<bool>;

    /// Clears everything reachable through this driver
    async fn flush(&self) -> Result<bool>;
}

/// Primitive key-value surface of a cache backend.
///
/// Implementations own connection management, reconnects and multiplexing;
/// callers share one instance across all concurrent requests.
#[async_trait]
pub trait BackendClient: Send + Sync + 'static {
    /// Number of matching keys (0 or 1)
    async fn exists(&self, key: &str) -> std::result::Result<u64, BackendError>;

    async fn get(&self, key: &str) -> std::result::Result<Option<Vec<u8>>, BackendError>;

    async fn set(
        &self,
        key: &str,
        value: &[u8],
        ttl: Ttl,
    ) -> std::result::Result<bool, BackendError>;

    async fn expire(
        &self,
        key: &str,
        delay: InvalidationDelay,
    ) -> std::result::Result<bool, BackendError>;

    async fn flush_all(&self) -> std::result::Result<bool, BackendError>;

    /// Connection-level failure notifications
    fn health(&self) -> watch::Receiver<ConnectionHealth>;
}
