//! Error types for cache operations.
//!
//! Ordinary cache outcomes are not errors: a miss is `Ok(None)` and a rejected
//! insert-if-absent is `Ok(false)`. Everything here means the cache could not
//! give an answer at all.

use std::fmt;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the cache client, its store adapters and the facade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The connection to the store could not be established.
    ConnectionError(String),

    /// The connection failed while a command was in flight.
    BackendError(String),

    /// The store answered a command with an error reply.
    CommandRejected(String),

    /// Connecting or waiting for a reply took longer than configured.
    Timeout(String),

    /// The store answered with a reply the command never produces.
    Protocol(String),

    /// The command variant is not available under the configured protocol profile.
    Unsupported(String),

    /// Invalid configuration value.
    ConfigError(String),

    /// Value could not be encoded for storage.
    SerializationError(String),

    /// Stored bytes could not be decoded.
    DeserializationError(String),

    /// Stored bytes do not carry the expected envelope.
    InvalidCacheEntry(String),

    /// Stored bytes were written under a different schema version.
    VersionMismatch { expected: u32, found: u32 },
}

impl Error {
    /// True when the error means the store could not be reached or did not
    /// answer, as opposed to answering something unexpected.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::ConnectionError(_) | Error::BackendError(_) | Error::Timeout(_)
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ConnectionError(msg) => write!(f, "Connection error: {}", msg),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::CommandRejected(msg) => write!(f, "Command rejected by store: {}", msg),
            Error::Timeout(msg) => write!(f, "Timeout: {}", msg),
            Error::Protocol(msg) => write!(f, "Unexpected store reply: {}", msg),
            Error::Unsupported(msg) => write!(f, "Unsupported operation: {}", msg),
            Error::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            Error::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            Error::DeserializationError(msg) => write!(f, "Deserialization error: {}", msg),
            Error::InvalidCacheEntry(msg) => write!(f, "Invalid cache entry: {}", msg),
            Error::VersionMismatch { expected, found } => write!(
                f,
                "Cache schema version mismatch: expected {}, found {}",
                expected, found
            ),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(feature = "redis")]
impl From<redis::RedisError> for Error {
    fn from(e: redis::RedisError) -> Self {
        if e.is_timeout() {
            Error::Timeout(e.to_string())
        } else if e.is_connection_refusal() {
            Error::ConnectionError(e.to_string())
        } else if e.is_io_error() || e.is_connection_dropped() {
            Error::BackendError(e.to_string())
        } else {
            Error::CommandRejected(e.to_string())
        }
    }
}
