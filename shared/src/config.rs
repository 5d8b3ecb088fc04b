use tracing::warn;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown cache backend: {0}")]
    UnknownBackend(String),
    #[error("{0} must be set when CACHE_BACKEND=redis-cluster")]
    MissingClusterNodes(&'static str),
    #[error("invalid value for {name}: {value}")]
    InvalidNumber { name: &'static str, value: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Backend {
    Redis(String),            // url
    RedisCluster(Vec<String>), // node urls
    Memory(Option<u64>),      // max entries
}

#[derive(Clone, Debug)]
pub struct Config {
    pub backend: Backend,
    pub namespace: Option<String>,
    pub probe_key: String,
}

impl Config {
    const DEFAULT_BACKEND: &str = "redis";
    const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
    const DEFAULT_PROBE_KEY: &str = "probe";

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend_name = lookup("CACHE_BACKEND")
            .map(|s| s.trim().to_lowercase())
            .unwrap_or_else(|| Self::DEFAULT_BACKEND.to_string());

        let backend = match backend_name.as_str() {
            "redis" => Backend::Redis(lookup("CACHE_REDIS_URL").unwrap_or_else(|| {
                warn!(
                    "CACHE_REDIS_URL not set, using default {}",
                    Self::DEFAULT_REDIS_URL
                );
                Self::DEFAULT_REDIS_URL.to_string()
            })),
            "redis-cluster" => {
                let nodes: Vec<String> = lookup("CACHE_REDIS_CLUSTER_NODES")
                    .unwrap_or_default()
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
                if nodes.is_empty() {
                    return Err(ConfigError::MissingClusterNodes("CACHE_REDIS_CLUSTER_NODES"));
                }
                Backend::RedisCluster(nodes)
            }
            "memory" => {
                let max_entries = match lookup("CACHE_MEMORY_MAX_ENTRIES") {
                    Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| {
                        ConfigError::InvalidNumber {
                            name: "CACHE_MEMORY_MAX_ENTRIES",
                            value: raw.clone(),
                        }
                    })?),
                    None => None,
                };
                Backend::Memory(max_entries)
            }
            other => return Err(ConfigError::UnknownBackend(other.to_string())),
        };

        Ok(Self {
            backend,
            namespace: lookup("CACHE_NAMESPACE")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            probe_key: lookup("CACHE_PROBE_KEY")
                .unwrap_or_else(|| Self::DEFAULT_PROBE_KEY.to_string()),
        })
    }
}

impl Backend {
    pub fn name(&self) -> &str {
        match self {
            Backend::Redis(..) => "redis",
            Backend::RedisCluster(..) => "redis-cluster",
            Backend::Memory(..) => "memory",
        }
    }
}
