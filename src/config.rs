//! Connection parameters and client options.
//!
//! Both are plain values built once from `(defaults, overrides)` by a pure merge.
//! Overrides carry an `Option` per field; a `Some` wins, a `None` keeps the default.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default Redis port.
pub const DEFAULT_PORT: u16 = 6379;

/// Default host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Transport used to reach the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Scheme {
    /// Plain TCP.
    #[default]
    Tcp,
    /// TCP wrapped in TLS.
    Tls,
    /// UNIX domain socket; `host` and `port` are ignored.
    Unix,
}

impl FromStr for Scheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "tcp" | "redis" => Ok(Scheme::Tcp),
            "tls" | "rediss" => Ok(Scheme::Tls),
            "unix" | "redis+unix" => Ok(Scheme::Unix),
            other => Err(Error::ConfigError(format!("Unknown scheme: {}", other))),
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::Tcp => write!(f, "tcp"),
            Scheme::Tls => write!(f, "tls"),
            Scheme::Unix => write!(f, "unix"),
        }
    }
}

/// Connection parameters for one store.
///
/// # Example
///
/// ```
/// use redis_cache_kit::config::{ConnectionConfig, ConnectionOverrides};
///
/// let config = ConnectionConfig::merge(
///     ConnectionConfig::default(),
///     ConnectionOverrides {
///         database: Some(5),
///         ..Default::default()
///     },
/// );
///
/// assert_eq!(config.database, 5);
/// assert_eq!(config.port, 6379);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
    /// Socket path, only used with [`Scheme::Unix`].
    pub path: Option<String>,
    /// Logical database selected on connect and before every flush.
    pub database: u32,
    /// Keep one long-lived, driver-managed connection for the handle's lifetime.
    pub persistent: bool,
    pub connect_timeout: Option<Duration>,
    pub response_timeout: Option<Duration>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        ConnectionConfig {
            scheme: Scheme::Tcp,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            path: None,
            database: 0,
            persistent: true,
            connect_timeout: None,
            response_timeout: None,
            username: None,
            password: None,
        }
    }
}

/// Caller-supplied connection parameters. Unset fields keep their defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConnectionOverrides {
    pub scheme: Option<Scheme>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub path: Option<String>,
    pub database: Option<u32>,
    pub persistent: Option<bool>,
    pub connect_timeout: Option<Duration>,
    pub response_timeout: Option<Duration>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ConnectionOverrides {
    /// Read overrides from `REDIS_*` environment variables.
    ///
    /// Recognized: `REDIS_SCHEME`, `REDIS_HOST`, `REDIS_PORT`, `REDIS_PATH`,
    /// `REDIS_DATABASE`, `REDIS_PERSISTENT`, `REDIS_CONNECT_TIMEOUT_MS`,
    /// `REDIS_RESPONSE_TIMEOUT_MS`, `REDIS_USERNAME`, `REDIS_PASSWORD`.
    /// Values that fail to parse are skipped with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reading through `lookup`.
    pub fn from_lookup<L>(lookup: L) -> Self
    where
        L: Fn(&str) -> Option<String>,
    {
        let millis = |name: &str| parse_var::<u64, _>(&lookup, name).map(Duration::from_millis);

        ConnectionOverrides {
            scheme: parse_var(&lookup, "REDIS_SCHEME"),
            host: lookup("REDIS_HOST"),
            port: parse_var(&lookup, "REDIS_PORT"),
            path: lookup("REDIS_PATH"),
            database: parse_var(&lookup, "REDIS_DATABASE"),
            persistent: parse_var(&lookup, "REDIS_PERSISTENT"),
            connect_timeout: millis("REDIS_CONNECT_TIMEOUT_MS"),
            response_timeout: millis("REDIS_RESPONSE_TIMEOUT_MS"),
            username: lookup("REDIS_USERNAME"),
            password: lookup("REDIS_PASSWORD"),
        }
    }
}

impl ConnectionOverrides {
    /// Field-wise: keep `self` where set, fall back to `other`.
    pub fn or(self, other: ConnectionOverrides) -> ConnectionOverrides {
        ConnectionOverrides {
            scheme: self.scheme.or(other.scheme),
            host: self.host.or(other.host),
            port: self.port.or(other.port),
            path: self.path.or(other.path),
            database: self.database.or(other.database),
            persistent: self.persistent.or(other.persistent),
            connect_timeout: self.connect_timeout.or(other.connect_timeout),
            response_timeout: self.response_timeout.or(other.response_timeout),
            username: self.username.or(other.username),
            password: self.password.or(other.password),
        }
    }
}

fn parse_var<T, L>(lookup: &L, name: &str) -> Option<T>
where
    T: FromStr,
    L: Fn(&str) -> Option<String>,
{
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {}: cannot parse {:?}", name, raw);
            None
        }
    }
}

impl ConnectionConfig {
    /// Shallow merge of `overrides` over `defaults`.
    pub fn merge(defaults: ConnectionConfig, overrides: ConnectionOverrides) -> ConnectionConfig {
        ConnectionConfig {
            scheme: overrides.scheme.unwrap_or(defaults.scheme),
            host: overrides.host.unwrap_or(defaults.host),
            port: overrides.port.unwrap_or(defaults.port),
            path: overrides.path.or(defaults.path),
            database: overrides.database.unwrap_or(defaults.database),
            persistent: overrides.persistent.unwrap_or(defaults.persistent),
            connect_timeout: overrides.connect_timeout.or(defaults.connect_timeout),
            response_timeout: overrides.response_timeout.or(defaults.response_timeout),
            username: overrides.username.or(defaults.username),
            password: overrides.password.or(defaults.password),
        }
    }

    /// Build from built-in defaults plus `overrides`.
    pub fn with_overrides(overrides: ConnectionOverrides) -> ConnectionConfig {
        Self::merge(ConnectionConfig::default(), overrides)
    }

    /// Render a driver connection URL.
    ///
    /// Credentials are inserted verbatim; they must not contain URL delimiters.
    ///
    /// # Errors
    /// Returns `Error::ConfigError` for a unix scheme without a socket path.
    pub fn connection_url(&self) -> Result<String> {
        let auth = match (&self.username, &self.password) {
            (Some(user), Some(pass)) => format!("{}:{}@", user, pass),
            (None, Some(pass)) => format!(":{}@", pass),
            (Some(user), None) => format!("{}@", user),
            (None, None) => String::new(),
        };

        match self.scheme {
            Scheme::Tcp => Ok(format!(
                "redis://{}{}:{}/{}",
                auth, self.host, self.port, self.database
            )),
            Scheme::Tls => Ok(format!(
                "rediss://{}{}:{}/{}",
                auth, self.host, self.port, self.database
            )),
            Scheme::Unix => {
                let path = self.path.as_deref().ok_or_else(|| {
                    Error::ConfigError("Unix scheme requires a socket path".to_string())
                })?;
                let mut url = format!("redis+unix://{}?db={}", path, self.database);
                if let Some(user) = &self.username {
                    url.push_str(&format!("&user={}", user));
                }
                if let Some(pass) = &self.password {
                    url.push_str(&format!("&pass={}", pass));
                }
                Ok(url)
            }
        }
    }

    /// Address for log lines, without credentials.
    pub fn display_addr(&self) -> String {
        match self.scheme {
            Scheme::Unix => format!(
                "unix:{} db={}",
                self.path.as_deref().unwrap_or("<none>"),
                self.database
            ),
            scheme => format!("{}://{}:{} db={}", scheme, self.host, self.port, self.database),
        }
    }
}

/// Store version tag selecting which command variants may be issued.
///
/// Profiles below 2.6 have no `SET` options (`EX`, `NX`), so writes fall back
/// to `SETEX` / `SETNX`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProtocolProfile {
    major: u16,
    minor: u16,
}

impl ProtocolProfile {
    pub const V2_0: ProtocolProfile = ProtocolProfile::new(2, 0);
    pub const V2_4: ProtocolProfile = ProtocolProfile::new(2, 4);
    pub const V2_6: ProtocolProfile = ProtocolProfile::new(2, 6);
    pub const V2_8: ProtocolProfile = ProtocolProfile::new(2, 8);
    /// Unreleased server; assumes every command variant.
    pub const DEV: ProtocolProfile = ProtocolProfile::new(u16::MAX, u16::MAX);

    pub const fn new(major: u16, minor: u16) -> Self {
        ProtocolProfile { major, minor }
    }

    /// `SET key value [EX seconds] [NX]` is understood.
    pub fn supports_set_options(&self) -> bool {
        *self >= Self::V2_6
    }
}

impl Default for ProtocolProfile {
    fn default() -> Self {
        Self::V2_6
    }
}

impl FromStr for ProtocolProfile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("dev") {
            return Ok(Self::DEV);
        }

        let invalid = || Error::ConfigError(format!("Invalid protocol profile: {:?}", s));
        let (major, minor) = s.split_once('.').ok_or_else(invalid)?;
        Ok(ProtocolProfile {
            major: major.parse().map_err(|_| invalid())?,
            minor: minor.parse().map_err(|_| invalid())?,
        })
    }
}

impl fmt::Display for ProtocolProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::DEV {
            write!(f, "dev")
        } else {
            write!(f, "{}.{}", self.major, self.minor)
        }
    }
}

/// Options that shape how the client talks to the store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClientOptions {
    pub profile: ProtocolProfile,
}

/// Caller-supplied client options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClientOptionsOverrides {
    pub profile: Option<ProtocolProfile>,
}

impl ClientOptions {
    /// Shallow merge of `overrides` over `defaults`.
    pub fn merge(defaults: ClientOptions, overrides: ClientOptionsOverrides) -> ClientOptions {
        ClientOptions {
            profile: overrides.profile.unwrap_or(defaults.profile),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_connection_config_default() {
        let config = ConnectionConfig::default();
        assert_eq!(config.scheme, Scheme::Tcp);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 6379);
        assert_eq!(config.database, 0);
        assert!(config.persistent);
        assert!(config.connect_timeout.is_none());
    }

    #[test]
    fn test_merge_keeps_unset_defaults() {
        let config = ConnectionConfig::with_overrides(ConnectionOverrides {
            host: Some("cache.internal".to_string()),
            database: Some(5),
            ..Default::default()
        });

        assert_eq!(config.host, "cache.internal");
        assert_eq!(config.database, 5);
        assert_eq!(config.port, 6379);
        assert!(config.persistent);
    }

    #[test]
    fn test_merge_over_custom_defaults() {
        let defaults = ConnectionConfig {
            port: 7000,
            persistent: false,
            ..Default::default()
        };
        let config = ConnectionConfig::merge(
            defaults,
            ConnectionOverrides {
                persistent: Some(true),
                ..Default::default()
            },
        );

        assert_eq!(config.port, 7000);
        assert!(config.persistent);
    }

    #[test]
    fn test_connection_url() {
        let config = ConnectionConfig::with_overrides(ConnectionOverrides {
            database: Some(3),
            ..Default::default()
        });
        assert_eq!(
            config.connection_url().expect("url"),
            "redis://127.0.0.1:6379/3"
        );

        let tls = ConnectionConfig::with_overrides(ConnectionOverrides {
            scheme: Some(Scheme::Tls),
            host: Some("secure".to_string()),
            password: Some("hunter2".to_string()),
            ..Default::default()
        });
        assert_eq!(
            tls.connection_url().expect("url"),
            "rediss://:hunter2@secure:6379/0"
        );
    }

    #[test]
    fn test_unix_url_requires_path() {
        let mut config = ConnectionConfig::with_overrides(ConnectionOverrides {
            scheme: Some(Scheme::Unix),
            ..Default::default()
        });
        assert!(matches!(
            config.connection_url(),
            Err(Error::ConfigError(_))
        ));

        config.path = Some("/tmp/redis.sock".to_string());
        assert_eq!(
            config.connection_url().expect("url"),
            "redis+unix:///tmp/redis.sock?db=0"
        );
    }

    #[test]
    fn test_overrides_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("REDIS_HOST", "10.0.0.7"),
            ("REDIS_PORT", "6380"),
            ("REDIS_DATABASE", "not-a-number"),
            ("REDIS_PERSISTENT", "false"),
            ("REDIS_RESPONSE_TIMEOUT_MS", "250"),
        ]
        .into_iter()
        .collect();

        let overrides =
            ConnectionOverrides::from_lookup(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(overrides.host.as_deref(), Some("10.0.0.7"));
        assert_eq!(overrides.port, Some(6380));
        assert_eq!(overrides.database, None);
        assert_eq!(overrides.persistent, Some(false));
        assert_eq!(overrides.response_timeout, Some(Duration::from_millis(250)));
        assert_eq!(overrides.scheme, None);
    }

    #[test]
    fn test_overrides_or_prefers_self() {
        let explicit = ConnectionOverrides {
            port: Some(7001),
            ..Default::default()
        };
        let env = ConnectionOverrides {
            port: Some(6380),
            host: Some("env-host".to_string()),
            ..Default::default()
        };

        let combined = explicit.or(env);
        assert_eq!(combined.port, Some(7001));
        assert_eq!(combined.host.as_deref(), Some("env-host"));
        assert_eq!(combined.database, None);
    }

    #[test]
    fn test_scheme_parse() {
        assert_eq!("tcp".parse::<Scheme>().expect("tcp"), Scheme::Tcp);
        assert_eq!("REDISS".parse::<Scheme>().expect("tls"), Scheme::Tls);
        assert_eq!("unix".parse::<Scheme>().expect("unix"), Scheme::Unix);
        assert!("http".parse::<Scheme>().is_err());
    }

    #[test]
    fn test_profile_parse_and_order() {
        let profile: ProtocolProfile = "2.6".parse().expect("profile");
        assert_eq!(profile, ProtocolProfile::V2_6);
        assert!(profile.supports_set_options());

        let old: ProtocolProfile = "2.4".parse().expect("profile");
        assert!(!old.supports_set_options());
        assert!(old < ProtocolProfile::V2_6);

        let dev: ProtocolProfile = "dev".parse().expect("profile");
        assert!(dev.supports_set_options());
        assert_eq!(dev.to_string(), "dev");
        assert_eq!(ProtocolProfile::V2_8.to_string(), "2.8");

        assert!("2".parse::<ProtocolProfile>().is_err());
        assert!("two.six".parse::<ProtocolProfile>().is_err());
    }

    #[test]
    fn test_client_options_merge() {
        let options = ClientOptions::merge(
            ClientOptions::default(),
            ClientOptionsOverrides::default(),
        );
        assert_eq!(options.profile, ProtocolProfile::V2_6);

        let options = ClientOptions::merge(
            ClientOptions::default(),
            ClientOptionsOverrides {
                profile: Some(ProtocolProfile::V2_0),
            },
        );
        assert_eq!(options.profile, ProtocolProfile::V2_0);
    }
}
