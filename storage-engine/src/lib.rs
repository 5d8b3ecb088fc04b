//! Concrete cache backends and the Redis driver built on them.

pub mod moka_backend;
pub mod redis_client;
pub mod redis_driver;

pub use moka_backend::MokaBackend;
pub use redis_client::RedisClient;
pub use redis_driver::RedisDriver;
