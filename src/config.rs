use crate::core::{Result, SpawnError};
use std::time::Duration;

pub const ENV_SYSTEM_NAME: &str = "PROXY_ACTOR_SYSTEM_NAME";
pub const ENV_USER_FUNCTION_HOST: &str = "USER_FUNCTION_HOST";
pub const ENV_USER_FUNCTION_PORT: &str = "USER_FUNCTION_PORT";
pub const ENV_PROXY_HOST: &str = "PROXY_HTTP_HOST";
pub const ENV_PROXY_PORT: &str = "PROXY_HTTP_PORT";

/// Bounds of an expiring cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of resident entries
    pub max_entries: usize,

    /// Time an entry stays valid after being written
    pub ttl: Duration,
}

impl CacheConfig {
    /// Bounds of the server-side handler instance cache.
    pub fn instances() -> Self {
        Self {
            max_entries: 10_000,
            ttl: Duration::from_secs(60),
        }
    }

    /// Bounds of the client-side actor reference cache.
    pub fn actor_refs() -> Self {
        Self {
            max_entries: 1_000,
            ttl: Duration::from_secs(60),
        }
    }
}

/// Network settings for both directions of fabric traffic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Interface the inbound action endpoint binds to
    pub host: String,

    /// Port the inbound action endpoint binds to
    pub port: u16,

    /// Fabric proxy host
    pub proxy_host: String,

    /// Fabric proxy port
    pub proxy_port: u16,

    /// Maximum number of fire-and-forget sends in flight
    pub async_pool_size: usize,

    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub write_timeout: Duration,

    /// Upper bound for a whole outbound call
    pub call_timeout: Duration,

    /// Idle connections kept per proxy host
    pub pool_max_idle: usize,

    pub pool_idle_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8091,
            proxy_host: "127.0.0.1".to_string(),
            proxy_port: 9001,
            async_pool_size: 64,
            connect_timeout: Duration::from_secs(120),
            read_timeout: Duration::from_secs(120),
            write_timeout: Duration::from_secs(120),
            call_timeout: Duration::from_secs(400),
            pool_max_idle: 256,
            pool_idle_timeout: Duration::from_secs(100),
        }
    }
}

impl TransportConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn proxy_url(&self) -> String {
        format!("http://{}:{}", self.proxy_host, self.proxy_port)
    }

    pub fn validate(&self) -> Result<()> {
        if self.proxy_host.trim().is_empty() {
            return Err(SpawnError::Config("proxy host must not be empty".to_string()));
        }
        if self.async_pool_size == 0 {
            return Err(SpawnError::Config("async_pool_size must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Top-level runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnConfig {
    /// Actor system this process registers into
    pub system: String,

    pub transport: TransportConfig,

    /// How long in-flight requests may finish after shutdown starts
    pub termination_grace_period: Duration,

    pub instance_cache: CacheConfig,
    pub actor_ref_cache: CacheConfig,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            system: "spawn-system".to_string(),
            transport: TransportConfig::default(),
            termination_grace_period: Duration::from_secs(30),
            instance_cache: CacheConfig::instances(),
            actor_ref_cache: CacheConfig::actor_refs(),
        }
    }
}

impl SpawnConfig {
    /// Reads the variables the fabric sidecar injects into the process.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        config.system = lookup(ENV_SYSTEM_NAME)
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| SpawnError::Config(format!("{} is not set", ENV_SYSTEM_NAME)))?;

        if let Some(host) = lookup(ENV_USER_FUNCTION_HOST) {
            config.transport.host = host;
        }
        if let Some(port) = lookup(ENV_USER_FUNCTION_PORT) {
            config.transport.port = parse_port(ENV_USER_FUNCTION_PORT, &port)?;
        }
        if let Some(host) = lookup(ENV_PROXY_HOST) {
            config.transport.proxy_host = host;
        }
        if let Some(port) = lookup(ENV_PROXY_PORT) {
            config.transport.proxy_port = parse_port(ENV_PROXY_PORT, &port)?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.system.trim().is_empty() {
            return Err(SpawnError::Config("system name must not be empty".to_string()));
        }
        self.transport.validate()
    }
}

fn parse_port(key: &str, value: &str) -> Result<u16> {
    value
        .trim()
        .parse()
        .map_err(|_| SpawnError::Config(format!("{} is not a valid port: '{}'", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = SpawnConfig::default();
        assert_eq!(config.transport.bind_address(), "127.0.0.1:8091");
        assert_eq!(config.transport.proxy_url(), "http://127.0.0.1:9001");
        assert_eq!(config.instance_cache.max_entries, 10_000);
        assert_eq!(config.actor_ref_cache.max_entries, 1_000);
        assert_eq!(config.termination_grace_period, Duration::from_secs(30));
    }

    #[test]
    fn env_overrides_hosts_and_ports() {
        let config = SpawnConfig::from_lookup(lookup(&[
            (ENV_SYSTEM_NAME, "orders"),
            (ENV_USER_FUNCTION_PORT, "8100"),
            (ENV_PROXY_HOST, "spawn-proxy"),
        ]))
        .unwrap();
        assert_eq!(config.system, "orders");
        assert_eq!(config.transport.port, 8100);
        assert_eq!(config.transport.proxy_host, "spawn-proxy");
        assert_eq!(config.transport.proxy_port, 9001);
    }

    #[test]
    fn system_name_is_required() {
        let err = SpawnConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, SpawnError::Config(_)));
    }

    #[test]
    fn bad_port_is_a_config_error() {
        let err = SpawnConfig::from_lookup(lookup(&[
            (ENV_SYSTEM_NAME, "orders"),
            (ENV_PROXY_PORT, "not-a-port"),
        ]))
        .unwrap_err();
        assert!(matches!(err, SpawnError::Config(_)));
    }
}
