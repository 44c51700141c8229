//! Store driver seam.
//!
//! The cache never talks to a socket itself. It hands [`Command`]s to a
//! [`StoreConnection`] produced by a [`ConnectionFactory`], which lets the Redis
//! adapter, the in-memory store and test doubles stand in for each other.
//!
//! # Implementing a store
//!
//! ```ignore
//! use redis_cache_kit::command::{Command, Reply};
//! use redis_cache_kit::store::StoreConnection;
//! use redis_cache_kit::error::Result;
//!
//! struct Recording(Vec<String>);
//!
//! impl StoreConnection for Recording {
//!     async fn execute(&mut self, command: &Command<'_>) -> Result<Reply> {
//!         self.0.push(command.to_string());
//!         Ok(Reply::Nil)
//!     }
//! }
//! ```

use crate::command::{Command, Reply};
use crate::config::{ClientOptions, ConnectionConfig};
use crate::error::Result;
use std::future::Future;

pub mod memory;
#[cfg(feature = "redis")]
pub mod redis;

pub use memory::{InMemoryConnection, InMemoryStore};
#[cfg(feature = "redis")]
pub use self::redis::{RedisConnection, RedisConnectionFactory};

/// A live connection able to run one command at a time.
///
/// Connections are not assumed to be safe for concurrent use; the client
/// handle serializes access.
pub trait StoreConnection: Send {
    /// Send `command` and wait for its reply.
    ///
    /// # Errors
    /// Transport failures, timeouts and error replies. A nil reply is not an error.
    fn execute(&mut self, command: &Command<'_>) -> impl Future<Output = Result<Reply>> + Send;
}

/// Builds connections from configuration.
pub trait ConnectionFactory: Send + Sync {
    type Connection: StoreConnection;

    /// Open a connection with `config.database` already selected.
    fn connect(
        &self,
        config: &ConnectionConfig,
        options: &ClientOptions,
    ) -> impl Future<Output = Result<Self::Connection>> + Send;
}
