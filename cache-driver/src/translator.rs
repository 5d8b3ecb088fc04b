use crate::domain::ConnectionHealth;
use shared::{BackendError, ClusterException, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification {
    /// The cluster or connection cannot serve requests
    Fatal,
    /// The request was served; the outcome maps to "not found" or "not accepted"
    Benign,
}

/// Decide whether a backend error means the cluster is unusable.
///
/// Generic server errors are ambiguous on their own, so they are judged by
/// the health last published by the client.
pub fn classify(error: &BackendError, health: ConnectionHealth) -> Classification {
    match error {
        BackendError::ConnectionRefused(_)
        | BackendError::ConnectionDropped(_)
        | BackendError::Timeout(_)
        | BackendError::Io(_)
        | BackendError::ClusterDown(_)
        | BackendError::Redirected(_)
        | BackendError::Auth(_) => Classification::Fatal,
        BackendError::WrongType(_) | BackendError::Malformed(_) => Classification::Benign,
        BackendError::Response(_) => match health {
            ConnectionHealth::Healthy => Classification::Benign,
            ConnectionHealth::Unreachable => Classification::Fatal,
        },
    }
}

/// Turn a raw backend outcome into a driver result.
///
/// Successful values pass through untouched. Benign errors collapse into
/// `T::default()`, which is `false` for acknowledgements and `None` for
/// lookups.
pub fn translate<T: Default>(
    outcome: std::result::Result<T, BackendError>,
    health: ConnectionHealth,
) -> Result<T> {
    match outcome {
        Ok(value) => Ok(value),
        Err(err) => match classify(&err, health) {
            Classification::Fatal => Err(ClusterException::from(err)),
            Classification::Benign => Ok(T::default()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fatal_errors() -> Vec<BackendError> {
        vec![
            BackendError::ConnectionRefused("127.0.0.1:6379".into()),
            BackendError::ConnectionDropped("broken pipe".into()),
            BackendError::Timeout("read".into()),
            BackendError::Io("reset".into()),
            BackendError::ClusterDown("CLUSTERDOWN".into()),
            BackendError::Redirected("MOVED 3999".into()),
            BackendError::Auth("NOAUTH".into()),
        ]
    }

    #[test]
    fn test_connection_and_cluster_errors_are_fatal_regardless_of_health() {
        for err in fatal_errors() {
            assert_eq!(classify(&err, ConnectionHealth::Healthy), Classification::Fatal);
            assert_eq!(classify(&err, ConnectionHealth::Unreachable), Classification::Fatal);
        }
    }

    #[test]
    fn test_reply_shape_errors_are_benign() {
        let wrong_type = BackendError::WrongType("WRONGTYPE".into());
        let malformed = BackendError::Malformed("unexpected nil".into());
        assert_eq!(classify(&wrong_type, ConnectionHealth::Healthy), Classification::Benign);
        assert_eq!(classify(&malformed, ConnectionHealth::Unreachable), Classification::Benign);
    }

    #[test]
    fn test_response_error_depends_on_health() {
        let err = BackendError::Response("ERR something".into());
        assert_eq!(classify(&err, ConnectionHealth::Healthy), Classification::Benign);
        assert_eq!(classify(&err, ConnectionHealth::Unreachable), Classification::Fatal);
    }

    #[test]
    fn test_translate_passes_success_through() {
        let result = translate(Ok(Some(b"v".to_vec())), ConnectionHealth::Unreachable);
        assert_eq!(result.unwrap(), Some(b"v".to_vec()));
    }

    #[test]
    fn test_translate_wraps_fatal_error() {
        let err = BackendError::ClusterDown("CLUSTERDOWN".into());
        let result: Result<bool> = translate(Err(err.clone()), ConnectionHealth::Healthy);
        let exception = result.unwrap_err();
        assert_eq!(exception.backend_error(), Some(&err));
    }

    #[test]
    fn test_translate_normalizes_benign_error() {
        let lookup: Result<Option<Vec<u8>>> = translate(
            Err(BackendError::WrongType("WRONGTYPE".into())),
            ConnectionHealth::Healthy,
        );
        assert_eq!(lookup.unwrap(), None);

        let ack: Result<bool> = translate(
            Err(BackendError::Response("ERR".into())),
            ConnectionHealth::Healthy,
        );
        assert!(!ack.unwrap());
    }
}
