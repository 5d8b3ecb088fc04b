// shared/src/lib.rs

use std::time::Duration;

/// Low-level failure reported by a backend client.
///
/// This is a closed set: every backend adapter maps its native error shape
/// into one of these variants so the translator never has to inspect
/// backend-specific types or message text.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("connection refused: {0}")]
    ConnectionRefused(String),
    #[error("connection dropped: {0}")]
    ConnectionDropped(String),
    #[error("timed out: {0}")]
    Timeout(String),
    #[error("io: {0}")]
    Io(String),
    /// CLUSTERDOWN, MASTERDOWN, TRYAGAIN, LOADING, READONLY or no node serving the slot
    #[error("cluster down: {0}")]
    ClusterDown(String),
    /// MOVED / ASK / CROSSSLOT that the client could not resolve itself
    #[error("redirected: {0}")]
    Redirected(String),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("wrong type: {0}")]
    WrongType(String),
    #[error("malformed reply: {0}")]
    Malformed(String),
    #[error("server error: {0}")]
    Response(String),
}

impl BackendError {
    /// True when the connection or the cluster itself failed, as opposed to a single reply
    pub fn is_connection_level(&self) -> bool {
        matches!(
            self,
            BackendError::ConnectionRefused(_)
                | BackendError::ConnectionDropped(_)
                | BackendError::Timeout(_)
                | BackendError::Io(_)
                | BackendError::ClusterDown(_)
        )
    }
}

/// The single error surfaced by cache drivers: the backend or the cluster
/// behind it could not serve the request.
#[derive(thiserror::Error, Debug, Clone)]
#[error("cluster unavailable: {message}")]
pub struct ClusterException {
    message: String,
    #[source]
    source: Option<BackendError>,
}

impl ClusterException {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The backend failure this exception was raised for, if any
    pub fn backend_error(&self) -> Option<&BackendError> {
        self.source.as_ref()
    }
}

impl From<BackendError> for ClusterException {
    fn from(err: BackendError) -> Self {
        Self {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClusterException>;

/// Time-to-live in whole seconds. `Ttl(0)` means the entry never expires on its own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ttl(pub u64);

impl Ttl {
    pub const NONE: Ttl = Ttl(0);

    pub fn secs(secs: u64) -> Self {
        Ttl(secs)
    }

    pub fn is_persistent(self) -> bool {
        self.0 == 0
    }

    /// `None` when the entry should persist
    pub fn as_duration(self) -> Option<Duration> {
        if self.is_persistent() {
            None
        } else {
            Some(Duration::from_secs(self.0))
        }
    }
}

/// Whole seconds until a scheduled deletion; `0` deletes right away.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InvalidationDelay(pub u64);

impl InvalidationDelay {
    pub const IMMEDIATE: InvalidationDelay = InvalidationDelay(0);

    pub fn secs(secs: u64) -> Self {
        InvalidationDelay(secs)
    }

    pub fn is_immediate(self) -> bool {
        self.0 == 0
    }

    pub fn as_duration(self) -> Duration {
        Duration::from_secs(self.0)
    }
}

pub mod config;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_cluster_exception_keeps_backend_error() {
        let err = ClusterException::from(BackendError::ClusterDown("CLUSTERDOWN".into()));

        assert_eq!(err.message(), "cluster down: CLUSTERDOWN");
        assert_eq!(
            err.backend_error(),
            Some(&BackendError::ClusterDown("CLUSTERDOWN".into()))
        );
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "cluster unavailable: cluster down: CLUSTERDOWN");
    }

    #[test]
    fn test_connection_level_errors() {
        assert!(BackendError::ConnectionRefused("x".into()).is_connection_level());
        assert!(BackendError::ClusterDown("x".into()).is_connection_level());
        assert!(!BackendError::WrongType("x".into()).is_connection_level());
        assert!(!BackendError::Response("x".into()).is_connection_level());
    }

    #[test]
    fn test_cluster_exception_without_source() {
        let err = ClusterException::new("no nodes");
        assert!(err.backend_error().is_none());
        assert!(err.source().is_none());
    }

    #[test]
    fn test_ttl_zero_is_persistent() {
        assert!(Ttl::NONE.is_persistent());
        assert_eq!(Ttl::NONE.as_duration(), None);
        assert_eq!(Ttl::secs(5).as_duration(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_invalidation_delay() {
        assert!(InvalidationDelay::IMMEDIATE.is_immediate());
        assert!(!InvalidationDelay::secs(1).is_immediate());
        assert_eq!(InvalidationDelay::secs(3).as_duration(), Duration::from_secs(3));
    }
}
