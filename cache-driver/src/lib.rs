//! Backend-neutral cache driver contract.
//!
//! [`ports::CacheDriver`] is what applications program against,
//! [`ports::BackendClient`] is what storage adapters implement, and
//! [`translator`] decides which backend failures become a
//! [`shared::ClusterException`].

pub mod domain;
pub mod ports;
pub mod service;
pub mod translator;

pub use domain::{CacheKey, CacheValue, ConnectionHealth, InvalidKey};
pub use ports::{BackendClient, CacheDriver};
pub use service::CacheService;
pub use shared::{BackendError, ClusterException, InvalidationDelay, Result, Ttl};
