//! Redis driver adapter.

use super::{ConnectionFactory, StoreConnection};
use crate::command::{Command, Reply};
use crate::config::{ClientOptions, ConnectionConfig};
use crate::error::{Error, Result};
use ::redis::aio::{ConnectionManager, MultiplexedConnection};
use ::redis::{Client, RedisResult, Value};
use std::future::Future;
use std::time::Duration;

/// Opens Redis connections from [`ConnectionConfig`].
///
/// Persistent configurations get a [`ConnectionManager`], which keeps one
/// connection for the handle's lifetime and lets the driver reconnect it.
/// Non-persistent ones get a plain multiplexed connection.
///
/// # Example
///
/// ```no_run
/// # use redis_cache_kit::{RedisCacheBuilder, store::RedisConnectionFactory};
/// # async fn example() -> redis_cache_kit::Result<()> {
/// let cache = RedisCacheBuilder::new()
///     .host("127.0.0.1")
///     .database(1)
///     .build(RedisConnectionFactory);
///
/// cache.set("key", b"value", 60).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct RedisConnectionFactory;

impl ConnectionFactory for RedisConnectionFactory {
    type Connection = RedisConnection;

    async fn connect(
        &self,
        config: &ConnectionConfig,
        options: &ClientOptions,
    ) -> Result<RedisConnection> {
        // The database in the URL is selected by the driver on every (re)connect.
        let url = config.connection_url()?;
        let client = Client::open(url.as_str()).map_err(|e| {
            Error::ConfigError(format!(
                "Invalid Redis address {}: {}",
                config.display_addr(),
                e
            ))
        })?;

        let link = if config.persistent {
            Link::Managed(
                bounded(config.connect_timeout, "connect", ConnectionManager::new(client))
                    .await
                    .map_err(connect_error)?,
            )
        } else {
            Link::Multiplexed(
                bounded(
                    config.connect_timeout,
                    "connect",
                    client.get_multiplexed_async_connection(),
                )
                .await
                .map_err(connect_error)?,
            )
        };

        info!(
            "✓ Redis connection established: {} (persistent: {}, profile: {})",
            config.display_addr(),
            config.persistent,
            options.profile
        );

        Ok(RedisConnection {
            link,
            response_timeout: config.response_timeout,
        })
    }
}

enum Link {
    Managed(ConnectionManager),
    Multiplexed(MultiplexedConnection),
}

/// A live Redis connection.
pub struct RedisConnection {
    link: Link,
    response_timeout: Option<Duration>,
}

impl StoreConnection for RedisConnection {
    async fn execute(&mut self, command: &Command<'_>) -> Result<Reply> {
        let mut cmd = ::redis::cmd(command.name());
        for arg in command.args() {
            cmd.arg(arg);
        }

        let value = match &mut self.link {
            Link::Managed(conn) => {
                bounded(
                    self.response_timeout,
                    command.name(),
                    cmd.query_async::<Value>(conn),
                )
                .await?
            }
            Link::Multiplexed(conn) => {
                bounded(
                    self.response_timeout,
                    command.name(),
                    cmd.query_async::<Value>(conn),
                )
                .await?
            }
        };

        to_reply(value)
    }
}

/// Run a driver future under an optional deadline.
async fn bounded<T, Fut>(limit: Option<Duration>, what: &str, fut: Fut) -> Result<T>
where
    Fut: Future<Output = RedisResult<T>>,
{
    match limit {
        Some(limit) => match tokio::time::timeout(limit, fut).await {
            Ok(result) => result.map_err(Error::from),
            Err(_) => Err(Error::Timeout(format!("{} exceeded {:?}", what, limit))),
        },
        None => fut.await.map_err(Error::from),
    }
}

fn connect_error(e: Error) -> Error {
    match e {
        Error::Timeout(msg) => Error::Timeout(msg),
        other => Error::ConnectionError(other.to_string()),
    }
}

fn to_reply(value: Value) -> Result<Reply> {
    match value {
        Value::Nil => Ok(Reply::Nil),
        Value::Okay => Ok(Reply::ok()),
        Value::SimpleString(status) => Ok(Reply::Status(status)),
        Value::Int(n) => Ok(Reply::Integer(n)),
        Value::BulkString(bytes) => Ok(Reply::Bulk(bytes)),
        Value::Array(items) => items
            .into_iter()
            .map(to_reply)
            .collect::<Result<Vec<_>>>()
            .map(Reply::Array),
        other => Err(Error::Protocol(format!(
            "unsupported Redis reply type: {:?}",
            other
        ))),
    }
}
