use crate::redis_client::RedisClient;
use async_trait::async_trait;
use cache_driver::translator;
use cache_driver::{BackendClient, CacheDriver, CacheKey, CacheValue, ConnectionHealth};
use shared::{BackendError, InvalidationDelay, Result, Ttl};
use std::borrow::Cow;
use std::fmt::Debug;
use std::sync::Arc;
use tokio::sync::watch;

/// Cache driver issuing Redis primitives through an injected backend client.
///
/// | operation    | primitive                        |
/// |--------------|----------------------------------|
/// | `has`        | `EXISTS key`                     |
/// | `get`        | `GET key`                        |
/// | `set`        | `SET key value [EX ttl]`         |
/// | `invalidate` | `EXPIRE key delay`               |
/// | `flush`      | `FLUSHALL`                       |
///
/// `Ttl(0)` writes without `EX`, so the value never expires on its own.
/// Every outcome goes through [`translator::translate`]; nothing is retried,
/// logged as an error or swallowed here.
pub struct RedisDriver<C: BackendClient = RedisClient> {
    client: Arc<C>,
    health: watch::Receiver<ConnectionHealth>,
    namespace: Option<String>,
}

impl<C: BackendClient> RedisDriver<C> {
    pub fn new(client: Arc<C>) -> Self {
        let health = client.health();
        Self {
            client,
            health,
            namespace: None,
        }
    }

    /// Prefix every key with `<namespace>:`
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    fn backend_key<'a>(&self, key: &'a CacheKey) -> Cow<'a, str> {
        match &self.namespace {
            Some(namespace) => Cow::Owned(format!("{}:{}", namespace, key)),
            None => Cow::Borrowed(key.as_str()),
        }
    }

    // Health is read after the primitive returns so a failure it just reported is seen
    fn translate<T: Default>(&self, outcome: std::result::Result<T, BackendError>) -> Result<T> {
        translator::translate(outcome, *self.health.borrow())
    }
}

#[async_trait]
impl<C: BackendClient> CacheDriver for RedisDriver<C> {
    async fn has(&self, key: &CacheKey) -> Result<bool> {
        let key = self.backend_key(key);
        tracing::trace!("EXISTS {}", key);
        let outcome = self.client.exists(&key).await.map(|count| count > 0);
        self.translate(outcome)
    }

    async fn get(&self, key: &CacheKey) -> Result<Option<CacheValue>> {
        let key = self.backend_key(key);
        tracing::trace!("GET {}", key);
        let outcome = self.client.get(&key).await.map(|v| v.map(CacheValue::from));
        self.translate(outcome)
    }

    async fn set(&self, key: &CacheKey, value: CacheValue, ttl: Ttl) -> Result<bool> {
        let key = self.backend_key(key);
        tracing::trace!("SET {} ({} bytes, ttl {}s)", key, value.len(), ttl.0);
        let outcome = self.client.set(&key, value.as_bytes(), ttl).await;
        self.translate(outcome)
    }

    async fn invalidate(&self, key: &CacheKey, delay: InvalidationDelay) -> Result<bool> {
        let key = self.backend_key(key);
        tracing::trace!("EXPIRE {} {}", key, delay.0);
        let outcome = self.client.expire(&key, delay).await;
        self.translate(outcome)
    }

    async fn flush(&self) -> Result<bool> {
        tracing::trace!("FLUSHALL");
        let outcome = self.client.flush_all().await;
        self.translate(outcome)
    }
}

impl<C: BackendClient + Debug> Debug for RedisDriver<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisDriver")
            .field("client", &self.client)
            .field("namespace", &self.namespace)
            .finish()
    }
}
