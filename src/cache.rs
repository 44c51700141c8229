//! Cache operations on top of a store connection.
//!
//! Each operation builds its store command(s), runs them through the lazily
//! connected handle and normalizes the raw reply:
//!
//! | Operation   | Command                     | Result                                   |
//! |-------------|-----------------------------|------------------------------------------|
//! | `get`       | `GET`                       | nil → `None`, bulk → `Some(bytes)`       |
//! | `set`       | `SET [EX]`                  | `OK` → `true`, anything else → `false`   |
//! | `add`       | `SET [EX] NX`               | `OK` → `true`, nil → `false`             |
//! | `delete`    | `DEL`                       | `0` or `1` → `true`                      |
//! | `multi_get` | `MGET`                      | one slot per key, nil slots kept as miss |
//! | `flush`     | `SELECT db` + `FLUSHDB`     | `OK` → `true`                            |
//!
//! Transport failures are returned as `Err`, never folded into `false` or a miss.

use crate::command::{Command, Reply, WriteCondition};
use crate::config::{ClientOptions, ClientOptionsOverrides, ConnectionConfig, ConnectionOverrides};
use crate::error::{Error, Result};
use crate::handle::ClientHandle;
use crate::store::ConnectionFactory;
use crate::values::ValueMap;

/// Key-value cache over one store database.
///
/// Owns its configuration and a [`ClientHandle`]; the connection is opened on
/// the first operation. Share across tasks behind an `Arc`.
///
/// # Example
///
/// ```
/// # use redis_cache_kit::{RedisCacheBuilder, store::InMemoryStore};
/// # async fn example() -> redis_cache_kit::Result<()> {
/// let cache = RedisCacheBuilder::new().build(InMemoryStore::new());
///
/// assert!(cache.set("a", b"1", 0).await?);
/// assert!(!cache.add("a", b"2", 0).await?);
/// assert_eq!(cache.get("a").await?, Some(b"1".to_vec()));
/// assert!(cache.delete("a").await?);
/// assert_eq!(cache.get("a").await?, None);
/// # Ok(())
/// # }
/// ```
pub struct RedisCache<F: ConnectionFactory> {
    config: ConnectionConfig,
    options: ClientOptions,
    handle: ClientHandle<F>,
}

impl<F: ConnectionFactory> RedisCache<F> {
    /// Create a cache; no connection is made until the first operation.
    pub fn new(factory: F, config: ConnectionConfig, options: ClientOptions) -> Self {
        RedisCache {
            config,
            options,
            handle: ClientHandle::new(factory),
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn factory(&self) -> &F {
        self.handle.factory()
    }

    /// True once an operation has opened the store connection.
    pub async fn is_connected(&self) -> bool {
        self.handle.is_connected().await
    }

    /// Merge `overrides` over the current connection parameters.
    ///
    /// Any open connection is dropped; the next operation reconnects.
    pub fn reconfigure(&mut self, overrides: ConnectionOverrides) {
        self.config = ConnectionConfig::merge(self.config.clone(), overrides);
        self.handle.reset();
        debug!("Cache reconfigured for {}", self.config.display_addr());
    }

    /// Merge `overrides` over the current client options, dropping any open connection.
    pub fn reconfigure_options(&mut self, overrides: ClientOptionsOverrides) {
        self.options = ClientOptions::merge(self.options, overrides);
        self.handle.reset();
    }

    async fn run(&self, command: &Command<'_>) -> Result<Reply> {
        let mut conn = self.handle.acquire(&self.config, &self.options).await?;
        conn.execute(command).await
    }

    /// Fetch the value stored under `key`.
    ///
    /// Returns `Ok(None)` on a miss (absent or expired).
    ///
    /// # Errors
    /// Transport failures and replies `GET` never produces.
    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let reply = self.run(&Command::Get { key }).await?;
        let value = lookup_slot(reply, "GET")?;

        if value.is_some() {
            debug!("✓ Redis GET {} -> HIT", key);
        } else {
            debug!("✓ Redis GET {} -> MISS", key);
        }
        Ok(value)
    }

    /// Store `value` under `key`, replacing any existing entry.
    ///
    /// `ttl_seconds == 0` means the entry never expires. Returns `false` when
    /// the store did not acknowledge the write.
    ///
    /// # Errors
    /// Transport failures, and `Error::CommandRejected` when the store refuses
    /// the expiry (for example a TTL past its clock range).
    pub async fn set(&self, key: &str, value: &[u8], ttl_seconds: u64) -> Result<bool> {
        let command = Command::write(
            key,
            value,
            ttl_seconds,
            WriteCondition::Always,
            self.options.profile,
        )?;
        let stored = self.run(&command).await?.is_ok();

        debug!("✓ Redis SET {} (TTL: {}s) -> {}", key, ttl_seconds, stored);
        Ok(stored)
    }

    /// Store `value` under `key` only if the key is absent, in one store command.
    ///
    /// Returns `Ok(false)` when the key already holds a live value.
    ///
    /// # Errors
    /// Transport failures, unexpected replies, and `Error::Unsupported` for an
    /// expiring add under a profile older than 2.6.
    pub async fn add(&self, key: &str, value: &[u8], ttl_seconds: u64) -> Result<bool> {
        let command = Command::write(
            key,
            value,
            ttl_seconds,
            WriteCondition::IfAbsent,
            self.options.profile,
        )?;
        let reply = self.run(&command).await?;
        let added = add_outcome(&command, reply)?;

        debug!("✓ Redis ADD {} (TTL: {}s) -> {}", key, ttl_seconds, added);
        Ok(added)
    }

    /// Remove `key`. Removing an absent key also succeeds.
    ///
    /// # Errors
    /// Transport failures, and `Error::Protocol` if `DEL` reports anything but 0 or 1.
    pub async fn delete(&self, key: &str) -> Result<bool> {
        match self.run(&Command::Del { key }).await? {
            Reply::Integer(removed @ (0 | 1)) => {
                debug!("✓ Redis DEL {} (removed: {})", key, removed);
                Ok(true)
            }
            other => Err(Error::Protocol(format!(
                "DEL {} answered {}",
                key,
                other.kind()
            ))),
        }
    }

    /// Fetch several keys in one round trip.
    ///
    /// Every requested key appears in the result in request order; misses are
    /// kept as `None`.
    ///
    /// # Errors
    /// Transport failures, and `Error::Protocol` if the reply does not hold one
    /// slot per key.
    pub async fn multi_get(&self, keys: &[&str]) -> Result<ValueMap> {
        if keys.is_empty() {
            return Ok(ValueMap::new());
        }

        let slots = match self.run(&Command::MGet { keys }).await? {
            Reply::Array(slots) if slots.len() == keys.len() => slots,
            other => {
                return Err(Error::Protocol(format!(
                    "MGET of {} keys answered {}",
                    keys.len(),
                    other.kind()
                )))
            }
        };

        let mut values = ValueMap::with_capacity(keys.len());
        for (key, slot) in keys.iter().zip(slots) {
            values.insert(*key, lookup_slot(slot, "MGET")?);
        }

        debug!("✓ Redis MGET {} keys ({} hits)", keys.len(), values.hits());
        Ok(values)
    }

    /// Remove every entry in the configured database.
    ///
    /// The configured database is selected again first: the live connection
    /// may have another one selected.
    ///
    /// # Errors
    /// Transport failures, and `Error::Protocol` if `SELECT` is not acknowledged
    /// (flushing then could hit the wrong database).
    pub async fn flush(&self) -> Result<bool> {
        let database = self.config.database;
        let mut conn = self.handle.acquire(&self.config, &self.options).await?;

        let selected = conn.execute(&Command::Select { database }).await?;
        if !selected.is_ok() {
            return Err(Error::Protocol(format!(
                "SELECT {} answered {}",
                database,
                selected.kind()
            )));
        }

        let flushed = conn.execute(&Command::FlushDb).await?.is_ok();
        warn!("⚠ Redis FLUSHDB executed on db {} -> {}", database, flushed);
        Ok(flushed)
    }

    /// Ping the store. `Ok(false)` means it answered something other than `PONG`.
    ///
    /// # Errors
    /// Transport failures.
    pub async fn health_check(&self) -> Result<bool> {
        let reply = self.run(&Command::Ping).await?;
        Ok(matches!(reply, Reply::Status(status) if status == "PONG"))
    }
}

/// `GET` and `MGET` slots: nil is a miss, data is returned verbatim.
fn lookup_slot(reply: Reply, command: &str) -> Result<Option<Vec<u8>>> {
    match reply {
        Reply::Nil => Ok(None),
        Reply::Bulk(bytes) => Ok(Some(bytes)),
        Reply::Status(status) => Ok(Some(status.into_bytes())),
        other => Err(Error::Protocol(format!(
            "{} answered {}",
            command,
            other.kind()
        ))),
    }
}

fn add_outcome(command: &Command<'_>, reply: Reply) -> Result<bool> {
    match (command, reply) {
        (Command::SetNx { .. }, Reply::Integer(1)) => Ok(true),
        (Command::SetNx { .. }, Reply::Integer(0)) => Ok(false),
        (Command::Set { .. }, reply) if reply.is_ok() => Ok(true),
        (Command::Set { .. }, Reply::Nil) => Ok(false),
        (command, other) => Err(Error::Protocol(format!(
            "{} answered {}",
            command.name(),
            other.kind()
        ))),
    }
}
