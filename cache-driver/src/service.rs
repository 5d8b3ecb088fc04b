use crate::domain::{CacheKey, CacheValue};
use crate::ports::CacheDriver;
use shared::{InvalidationDelay, Result, Ttl};
use std::future::Future;
use std::sync::Arc;

/// Application-facing cache service.
///
/// Wraps one driver and adds the cache-aside read path. Policy decisions
/// about cluster failures live here, not in the driver.
#[derive(Clone)]
pub struct CacheService {
    driver: Arc<dyn CacheDriver>,
}

impl CacheService {
    pub fn new(driver: Arc<dyn CacheDriver>) -> Self {
        Self { driver }
    }

    pub fn driver(&self) -> &Arc<dyn CacheDriver> {
        &self.driver
    }

    pub async fn has(&self, key: &CacheKey) -> Result<bool> {
        self.driver.has(key).await
    }

    pub async fn get(&self, key: &CacheKey) -> Result<Option<CacheValue>> {
        self.driver.get(key).await
    }

    pub async fn set(&self, key: &CacheKey, value: CacheValue, ttl: Ttl) -> Result<bool> {
        self.driver.set(key, value, ttl).await
    }

    pub async fn invalidate(&self, key: &CacheKey, delay: InvalidationDelay) -> Result<bool> {
        self.driver.invalidate(key, delay).await
    }

    pub async fn flush(&self) -> Result<bool> {
        self.driver.flush().await
    }

    /// Read through the cache, falling back to `loader` on a miss.
    ///
    /// A miss repopulates the key with `ttl`. When the cluster is unavailable
    /// the cache is bypassed: the loader runs and nothing is written back.
    pub async fn get_or_load<F, Fut, E>(
        &self,
        key: &CacheKey,
        ttl: Ttl,
        loader: F,
    ) -> std::result::Result<CacheValue, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<CacheValue, E>>,
    {
        match self.driver.get(key).await {
            Ok(Some(value)) => {
                tracing::debug!("Cache hit for key '{}'", key);
                Ok(value)
            }
            Ok(None) => {
                tracing::debug!("Cache miss for key '{}', loading", key);
                let value = loader().await?;
                if let Err(err) = self.driver.set(key, value.clone(), ttl).await {
                    tracing::warn!("Failed to repopulate key '{}': {}", key, err);
                }
                Ok(value)
            }
            Err(err) => {
                tracing::warn!("Bypassing cache for key '{}': {}", key, err);
                loader().await
            }
        }
    }
}

impl std::fmt::Debug for CacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheService")
            .field("driver", &"<dyn CacheDriver>")
            .finish()
    }
}
