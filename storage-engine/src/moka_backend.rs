use async_trait::async_trait;
use cache_driver::{BackendClient, ConnectionHealth};
use moka::Expiry;
use moka::future::Cache;
use moka::ops::compute::Op;
use shared::{BackendError, InvalidationDelay, Ttl};
use std::fmt::Debug;
use std::time::{Duration, Instant};
use tokio::sync::watch;

#[derive(Clone, Debug)]
struct Entry {
    value: Vec<u8>,
    // None = never expires
    ttl: Option<Duration>,
}

/// Per-entry expiry: every write replaces the previous deadline, like SET/EXPIRE do in Redis
struct EntryExpiry;

impl Expiry<String, Entry> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl
    }
}

/// In-process backend built on Moka.
/// Never reports connection failures; scheduled deletions live only as long as this instance.
pub struct MokaBackend {
    cache: Cache<String, Entry>,
    health_tx: watch::Sender<ConnectionHealth>,
}

impl MokaBackend {
    /// Create a new unbounded backend
    pub fn new_unbounded() -> Self {
        Self::new(None)
    }

    /// Create a new bounded backend holding at most `max_entries`
    pub fn new_bounded(max_entries: u64) -> Self {
        Self::new(Some(max_entries))
    }

    pub fn new(max_entries: Option<u64>) -> Self {
        let mut builder = Cache::builder().expire_after(EntryExpiry);

        if let Some(capacity) = max_entries {
            builder = builder.max_capacity(capacity);
        }

        let (health_tx, _) = watch::channel(ConnectionHealth::Healthy);

        Self {
            cache: builder.build(),
            health_tx,
        }
    }
}

#[async_trait]
impl BackendClient for MokaBackend {
    async fn exists(&self, key: &str) -> Result<u64, BackendError> {
        Ok(u64::from(self.cache.contains_key(key)))
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        Ok(self.cache.get(key).await.map(|entry| entry.value))
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Ttl) -> Result<bool, BackendError> {
        let entry = Entry {
            value: value.to_vec(),
            ttl: ttl.as_duration(),
        };
        self.cache.insert(key.to_string(), entry).await;
        Ok(true)
    }

    async fn expire(&self, key: &str, delay: InvalidationDelay) -> Result<bool, BackendError> {
        let delay = delay.as_duration();

        // Atomic against concurrent writes to the same key
        self.cache
            .entry(key.to_string())
            .and_compute_with(|current| {
                let op = match current {
                    Some(_) if delay.is_zero() => Op::Remove,
                    Some(entry) => {
                        let mut entry = entry.into_value();
                        entry.ttl = Some(delay);
                        Op::Put(entry)
                    }
                    None => Op::Nop,
                };
                std::future::ready(op)
            })
            .await;

        // Scheduling on a missing key is still an accepted request
        Ok(true)
    }

    async fn flush_all(&self) -> Result<bool, BackendError> {
        self.cache.invalidate_all();
        Ok(true)
    }

    fn health(&self) -> watch::Receiver<ConnectionHealth> {
        self.health_tx.subscribe()
    }
}

impl Debug for MokaBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaBackend")
            .field("entry_count", &self.cache.entry_count())
            .field("weighted_size", &self.cache.weighted_size())
            .finish()
    }
}
