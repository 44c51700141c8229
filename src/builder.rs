//! Builder for configuring a cache before its first connection.

use crate::cache::RedisCache;
use crate::config::{
    ClientOptions, ClientOptionsOverrides, ConnectionConfig, ConnectionOverrides,
    ProtocolProfile, Scheme,
};
use crate::store::ConnectionFactory;
use std::time::Duration;

/// Fluent builder for [`RedisCache`].
///
/// Collects connection overrides and client options, then merges them over
/// the defaults once in [`build`](Self::build).
///
/// # Example
///
/// ```
/// use redis_cache_kit::{RedisCacheBuilder, config::ProtocolProfile, store::InMemoryStore};
/// use std::time::Duration;
///
/// let cache = RedisCacheBuilder::new()
///     .host("cache.internal")
///     .database(5)
///     .response_timeout(Duration::from_millis(250))
///     .profile(ProtocolProfile::V2_8)
///     .build(InMemoryStore::new());
///
/// assert_eq!(cache.config().database, 5);
/// assert_eq!(cache.config().port, 6379);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RedisCacheBuilder {
    defaults: ConnectionConfig,
    overrides: ConnectionOverrides,
    options: ClientOptionsOverrides,
}

impl RedisCacheBuilder {
    /// Start from the built-in defaults (`tcp://127.0.0.1:6379`, database 0, persistent).
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the defaults the overrides are merged over.
    pub fn defaults(mut self, defaults: ConnectionConfig) -> Self {
        self.defaults = defaults;
        self
    }

    /// Replace all connection overrides at once.
    pub fn overrides(mut self, overrides: ConnectionOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Fill still-unset parameters from `REDIS_*` environment variables.
    ///
    /// Values set on the builder keep precedence over the environment.
    pub fn with_env(mut self) -> Self {
        self.overrides = self.overrides.or(ConnectionOverrides::from_env());
        self
    }

    pub fn scheme(mut self, scheme: Scheme) -> Self {
        self.overrides.scheme = Some(scheme);
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.overrides.host = Some(host.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.overrides.port = Some(port);
        self
    }

    /// Connect over a UNIX socket at `path`.
    pub fn socket_path(mut self, path: impl Into<String>) -> Self {
        self.overrides.scheme = Some(Scheme::Unix);
        self.overrides.path = Some(path.into());
        self
    }

    pub fn database(mut self, database: u32) -> Self {
        self.overrides.database = Some(database);
        self
    }

    pub fn persistent(mut self, persistent: bool) -> Self {
        self.overrides.persistent = Some(persistent);
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.overrides.connect_timeout = Some(timeout);
        self
    }

    pub fn response_timeout(mut self, timeout: Duration) -> Self {
        self.overrides.response_timeout = Some(timeout);
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.overrides.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.overrides.password = Some(password.into());
        self
    }

    /// Store version the client may assume (default `2.6`).
    pub fn profile(mut self, profile: ProtocolProfile) -> Self {
        self.options.profile = Some(profile);
        self
    }

    /// The configuration [`build`](Self::build) would use.
    pub fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig::merge(self.defaults.clone(), self.overrides.clone())
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions::merge(ClientOptions::default(), self.options)
    }

    /// Build a cache over `factory`. No connection is opened yet.
    pub fn build<F: ConnectionFactory>(self, factory: F) -> RedisCache<F> {
        let config = self.connection_config();
        let options = self.client_options();
        debug!(
            "Cache configured for {} (profile {})",
            config.display_addr(),
            options.profile
        );
        RedisCache::new(factory, config, options)
    }

    /// Build a cache over the Redis driver.
    #[cfg(feature = "redis")]
    pub fn build_redis(self) -> RedisCache<crate::store::RedisConnectionFactory> {
        self.build(crate::store::RedisConnectionFactory)
    }
}
