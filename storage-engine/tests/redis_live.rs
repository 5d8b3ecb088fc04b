//! Runs against a real Redis server: `REDIS_URL=redis://127.0.0.1:6379 cargo test -- --ignored`

use cache_driver::{CacheDriver, CacheKey, CacheValue};
use shared::{BackendError, InvalidationDelay, Ttl};
use std::sync::Arc;
use storage_engine::{RedisClient, RedisDriver};

fn redis_url() -> String {
    std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string())
}

#[tokio::test]
#[ignore]
async fn test_round_trip_against_live_redis() {
    let client = Arc::new(RedisClient::connect(&redis_url()).await.unwrap());
    let driver = RedisDriver::new(client).with_namespace("cache-driver-it");
    let key = CacheKey::new("test_key").unwrap();

    assert!(driver
        .set(&key, CacheValue::from("test_value"), Ttl::secs(1))
        .await
        .unwrap());
    assert_eq!(
        driver.get(&key).await.unwrap(),
        Some(CacheValue::from("test_value"))
    );
    assert!(driver.has(&key).await.unwrap());

    assert!(driver
        .invalidate(&key, InvalidationDelay::IMMEDIATE)
        .await
        .unwrap());
    assert_eq!(driver.get(&key).await.unwrap(), None);
}

#[tokio::test]
#[ignore]
async fn test_wrong_type_is_a_miss_against_live_redis() {
    let url = redis_url();
    let client = redis::Client::open(url.as_str()).unwrap();
    let mut conn = client.get_multiplexed_async_connection().await.unwrap();
    let _: () = redis::cmd("DEL")
        .arg("cache-driver-it:list")
        .query_async(&mut conn)
        .await
        .unwrap();
    let _: () = redis::cmd("RPUSH")
        .arg("cache-driver-it:list")
        .arg("x")
        .query_async(&mut conn)
        .await
        .unwrap();

    let driver = RedisDriver::new(Arc::new(RedisClient::connect(&url).await.unwrap()))
        .with_namespace("cache-driver-it");

    let key = CacheKey::new("list").unwrap();
    assert_eq!(driver.get(&key).await.unwrap(), None);
}

#[tokio::test]
#[ignore]
async fn test_unreachable_node_refuses_connection() {
    // Nothing listens on port 1
    let err = RedisClient::connect("redis://127.0.0.1:1").await.unwrap_err();
    assert!(err.is_connection_level());
    assert!(matches!(err, BackendError::ConnectionRefused(_)));
}
