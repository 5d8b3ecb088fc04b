use async_trait::async_trait;
use cache_driver::{BackendClient, ConnectionHealth};
use redis::aio::ConnectionManager;
use redis::cluster::ClusterClient;
use redis::cluster_async::ClusterConnection;
use redis::{Cmd, ErrorKind, FromRedisValue, RedisError, RedisResult};
use shared::{BackendError, InvalidationDelay, Ttl};
use tokio::sync::watch;
use tracing::{info, warn};

#[derive(Clone)]
enum Connection {
    Single(ConnectionManager),
    Cluster(ClusterConnection),
}

/// Redis backend client for a single node or a cluster.
///
/// Both connection kinds are multiplexed handles, so concurrent requests
/// share one underlying connection set. Reconnects are left to the `redis`
/// crate; this type only reports what it observes on the health channel.
pub struct RedisClient {
    connection: Connection,
    health_tx: watch::Sender<ConnectionHealth>,
}

impl RedisClient {
    /// Connect to a single Redis node, e.g. `redis://127.0.0.1:6379`
    pub async fn connect(url: &str) -> Result<Self, BackendError> {
        let client = redis::Client::open(url).map_err(backend_error)?;
        let manager = ConnectionManager::new(client).await.map_err(backend_error)?;
        info!("Connected to Redis at {}", url);
        Ok(Self::with_connection(Connection::Single(manager)))
    }

    /// Connect to a Redis cluster through any subset of its nodes
    pub async fn connect_cluster(nodes: &[String]) -> Result<Self, BackendError> {
        let client = ClusterClient::new(nodes.to_vec()).map_err(backend_error)?;
        let connection = client.get_async_connection().await.map_err(backend_error)?;
        info!("Connected to Redis cluster via {} seed node(s)", nodes.len());
        Ok(Self::with_connection(Connection::Cluster(connection)))
    }

    fn with_connection(connection: Connection) -> Self {
        let (health_tx, _) = watch::channel(ConnectionHealth::Healthy);
        Self {
            connection,
            health_tx,
        }
    }

    async fn query<T: FromRedisValue>(&self, cmd: &Cmd) -> Result<T, BackendError> {
        let outcome: RedisResult<T> = match &self.connection {
            Connection::Single(conn) => {
                let mut conn = conn.clone();
                cmd.query_async(&mut conn).await
            }
            Connection::Cluster(conn) => {
                let mut conn = conn.clone();
                cmd.query_async(&mut conn).await
            }
        };

        match outcome {
            Ok(value) => {
                self.publish(ConnectionHealth::Healthy, None);
                Ok(value)
            }
            Err(err) => {
                let err = backend_error(err);
                if err.is_connection_level() {
                    self.publish(ConnectionHealth::Unreachable, Some(&err));
                }
                Err(err)
            }
        }
    }

    fn publish(&self, health: ConnectionHealth, cause: Option<&BackendError>) {
        let changed = self.health_tx.send_if_modified(|current| {
            if *current == health {
                return false;
            }
            *current = health;
            true
        });

        if changed {
            match cause {
                Some(err) => warn!("Redis connection lost: {}", err),
                None => info!("Redis connection restored"),
            }
        }
    }
}

#[async_trait]
impl BackendClient for RedisClient {
    async fn exists(&self, key: &str) -> Result<u64, BackendError> {
        self.query(redis::cmd("EXISTS").arg(key)).await
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        self.query(redis::cmd("GET").arg(key)).await
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Ttl) -> Result<bool, BackendError> {
        let _: () = self.query(&set_cmd(key, value, ttl)).await?;
        Ok(true)
    }

    async fn expire(&self, key: &str, delay: InvalidationDelay) -> Result<bool, BackendError> {
        // EXPIRE answers 0 for a missing key; the request was still accepted
        let _: i64 = self.query(&expire_cmd(key, delay)).await?;
        Ok(true)
    }

    async fn flush_all(&self) -> Result<bool, BackendError> {
        let _: () = self.query(&redis::cmd("FLUSHALL")).await?;
        Ok(true)
    }

    fn health(&self) -> watch::Receiver<ConnectionHealth> {
        self.health_tx.subscribe()
    }
}

impl std::fmt::Debug for RedisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let topology = match self.connection {
            Connection::Single(_) => "single",
            Connection::Cluster(_) => "cluster",
        };
        f.debug_struct("RedisClient")
            .field("topology", &topology)
            .field("health", &*self.health_tx.borrow())
            .finish()
    }
}

fn set_cmd(key: &str, value: &[u8], ttl: Ttl) -> Cmd {
    let mut cmd = redis::cmd("SET");
    cmd.arg(key).arg(value);
    // Ttl(0): plain SET, no expiry
    if !ttl.is_persistent() {
        cmd.arg("EX").arg(ttl.0);
    }
    cmd
}

fn expire_cmd(key: &str, delay: InvalidationDelay) -> Cmd {
    let mut cmd = redis::cmd("EXPIRE");
    cmd.arg(key).arg(delay.0);
    cmd
}

/// Map a `redis` error onto the backend error set by kind and error code
pub(crate) fn backend_error(err: RedisError) -> BackendError {
    let detail = err.to_string();

    if err.is_connection_refusal() {
        return BackendError::ConnectionRefused(detail);
    }
    if err.is_timeout() {
        return BackendError::Timeout(detail);
    }
    if err.is_connection_dropped() {
        return BackendError::ConnectionDropped(detail);
    }
    // Server replies without a dedicated ErrorKind arrive as extension errors
    match err.code() {
        Some("WRONGTYPE") => return BackendError::WrongType(detail),
        Some("NOAUTH" | "WRONGPASS" | "NOPERM") => return BackendError::Auth(detail),
        _ => {}
    }

    match err.kind() {
        ErrorKind::IoError => BackendError::Io(detail),
        ErrorKind::ClusterDown
        | ErrorKind::MasterDown
        | ErrorKind::TryAgain
        | ErrorKind::BusyLoadingError
        | ErrorKind::ReadOnly
        | ErrorKind::ClusterConnectionNotFound => BackendError::ClusterDown(detail),
        ErrorKind::Moved | ErrorKind::Ask | ErrorKind::CrossSlot => {
            BackendError::Redirected(detail)
        }
        ErrorKind::AuthenticationFailed => BackendError::Auth(detail),
        ErrorKind::TypeError => BackendError::Malformed(detail),
        _ => BackendError::Response(detail),
    }
}
