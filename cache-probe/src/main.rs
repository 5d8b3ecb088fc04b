use cache_driver::{CacheDriver, CacheKey, CacheService, CacheValue};
use shared::config::{Backend, Config};
use shared::{InvalidationDelay, Ttl};
use std::sync::Arc;
use storage_engine::{MokaBackend, RedisClient, RedisDriver};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load environment variables from .env file (if exists)
    match dotenvy::dotenv() {
        Ok(_) => info!("Loaded environment variables from .env file"),
        Err(_) => info!("No .env file found, using system environment variables"),
    }

    let config = Config::from_env()?;
    info!("Probing {} backend", config.backend.name());

    let driver = match build_driver(&config).await {
        Ok(driver) => driver,
        Err(e) => {
            error!("Failed to initialize {} backend: {}", config.backend.name(), e);
            return Err(e);
        }
    };

    let service = CacheService::new(driver);
    let key = CacheKey::new(config.probe_key.clone())?;

    probe(&service, &key).await;

    let loaded = service
        .get_or_load(&key, Ttl::secs(30), || async {
            Ok::<_, std::convert::Infallible>(CacheValue::from("loaded"))
        })
        .await?;
    info!("get_or_load('{}') -> {} bytes", key, loaded.len());

    Ok(())
}

async fn build_driver(config: &Config) -> Result<Arc<dyn CacheDriver>, Box<dyn std::error::Error>> {
    let driver: Arc<dyn CacheDriver> = match &config.backend {
        Backend::Redis(url) => {
            let client = Arc::new(RedisClient::connect(url).await?);
            Arc::new(namespaced(RedisDriver::new(client), config))
        }
        Backend::RedisCluster(nodes) => {
            let client = Arc::new(RedisClient::connect_cluster(nodes).await?);
            Arc::new(namespaced(RedisDriver::new(client), config))
        }
        Backend::Memory(max_entries) => {
            let client = Arc::new(MokaBackend::new(*max_entries));
            Arc::new(namespaced(RedisDriver::new(client), config))
        }
    };
    Ok(driver)
}

fn namespaced<C: cache_driver::BackendClient>(
    driver: RedisDriver<C>,
    config: &Config,
) -> RedisDriver<C> {
    match &config.namespace {
        Some(namespace) => driver.with_namespace(namespace.clone()),
        None => driver,
    }
}

/// One pass over every operation except flush, logging each outcome
async fn probe(service: &CacheService, key: &CacheKey) {
    match service.set(key, CacheValue::from("probe"), Ttl::secs(30)).await {
        Ok(accepted) => info!("set('{}') -> {}", key, accepted),
        Err(e) => warn!("set('{}') failed: {}", key, e),
    }

    match service.get(key).await {
        Ok(Some(value)) => info!("get('{}') -> {} bytes", key, value.len()),
        Ok(None) => info!("get('{}') -> not found", key),
        Err(e) => warn!("get('{}') failed: {}", key, e),
    }

    match service.has(key).await {
        Ok(present) => info!("has('{}') -> {}", key, present),
        Err(e) => warn!("has('{}') failed: {}", key, e),
    }

    match service.invalidate(key, InvalidationDelay::IMMEDIATE).await {
        Ok(accepted) => info!("invalidate('{}') -> {}", key, accepted),
        Err(e) => warn!("invalidate('{}') failed: {}", key, e),
    }
}
