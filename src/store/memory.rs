//! In-memory store speaking the same command set as Redis.
//!
//! Entries live in one `DashMap` keyed by `(database, key)`. Expiry is checked
//! lazily against `tokio::time::Instant`, so tests can drive it with a paused
//! clock. Useful for tests and for running without a server.

use super::{ConnectionFactory, StoreConnection};
use crate::command::{Command, Expiry, Reply, WriteCondition};
use crate::config::{ClientOptions, ConnectionConfig};
use crate::error::{Error, Result};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Clone, Debug)]
struct StoredValue {
    data: Vec<u8>,
    expires_at: Option<Instant>,
}

impl StoredValue {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

#[derive(Default)]
struct Shared {
    entries: DashMap<(u32, String), StoredValue>,
    connects: AtomicUsize,
    unavailable: AtomicBool,
}

/// Thread-safe in-memory store. Cloning shares the same data.
///
/// Acts as its own [`ConnectionFactory`]: every connection opened from a clone
/// sees the same entries.
///
/// # Example
///
/// ```
/// # use redis_cache_kit::{RedisCacheBuilder, store::InMemoryStore};
/// # async fn example() -> redis_cache_kit::Result<()> {
/// let store = InMemoryStore::new();
/// let cache = RedisCacheBuilder::new().database(2).build(store.clone());
///
/// cache.set("greeting", b"hello", 0).await?;
/// assert_eq!(store.len(2), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Shared>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of connections opened through this store.
    pub fn connect_count(&self) -> usize {
        self.inner.connects.load(Ordering::SeqCst)
    }

    /// Simulate the server going away (`false`) or coming back (`true`).
    ///
    /// While unavailable, connecting fails with `Error::ConnectionError` and
    /// commands on open connections fail with `Error::BackendError`.
    pub fn set_available(&self, available: bool) {
        self.inner.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Live (unexpired) entries in `database`.
    pub fn len(&self, database: u32) -> usize {
        let now = Instant::now();
        self.inner
            .entries
            .iter()
            .filter(|entry| entry.key().0 == database && !entry.value().is_expired(now))
            .count()
    }

    /// True when no database holds a live entry.
    pub fn is_empty(&self) -> bool {
        let now = Instant::now();
        !self
            .inner
            .entries
            .iter()
            .any(|entry| !entry.value().is_expired(now))
    }

    /// True when `key` holds a live entry in `database`.
    pub fn contains(&self, database: u32, key: &str) -> bool {
        let now = Instant::now();
        self.inner
            .entries
            .get(&(database, key.to_string()))
            .is_some_and(|entry| !entry.is_expired(now))
    }

    /// Open a connection directly, bypassing the factory bookkeeping.
    pub fn connection(&self, database: u32) -> InMemoryConnection {
        InMemoryConnection {
            store: self.clone(),
            database,
        }
    }

    fn is_available(&self) -> bool {
        !self.inner.unavailable.load(Ordering::SeqCst)
    }
}

impl ConnectionFactory for InMemoryStore {
    type Connection = InMemoryConnection;

    async fn connect(
        &self,
        config: &ConnectionConfig,
        _options: &ClientOptions,
    ) -> Result<InMemoryConnection> {
        if !self.is_available() {
            return Err(Error::ConnectionError(format!(
                "in-memory store unavailable ({})",
                config.display_addr()
            )));
        }

        self.inner.connects.fetch_add(1, Ordering::SeqCst);
        debug!("✓ In-memory store connected (db={})", config.database);
        Ok(self.connection(config.database))
    }
}

/// Connection to an [`InMemoryStore`] with its own selected database.
pub struct InMemoryConnection {
    store: InMemoryStore,
    database: u32,
}

impl InMemoryConnection {
    /// Currently selected database.
    pub fn database(&self) -> u32 {
        self.database
    }

    fn entries(&self) -> &DashMap<(u32, String), StoredValue> {
        &self.store.inner.entries
    }

    fn slot(&self, key: &str) -> (u32, String) {
        (self.database, key.to_string())
    }

    fn read(&self, key: &str, now: Instant) -> Option<Vec<u8>> {
        let slot = self.slot(key);
        let hit = self
            .entries()
            .get(&slot)
            .and_then(|entry| (!entry.is_expired(now)).then(|| entry.data.clone()));

        if hit.is_none() {
            self.entries().remove_if(&slot, |_, value| value.is_expired(now));
        }
        hit
    }

    /// Returns false when `IfAbsent` found a live entry.
    ///
    /// An expiry past the clock's range is rejected like Redis rejects an
    /// out-of-range `EX`.
    fn write(
        &self,
        key: &str,
        value: &[u8],
        expiry: Option<Expiry>,
        condition: WriteCondition,
        now: Instant,
        command: &str,
    ) -> Result<bool> {
        let expires_at = match expiry {
            Some(e) => {
                let at = now.checked_add(Duration::from_secs(e.seconds()));
                Some(at.ok_or_else(|| invalid_expire_time(command))?)
            }
            None => None,
        };
        let stored = StoredValue {
            data: value.to_vec(),
            expires_at,
        };

        match self.entries().entry(self.slot(key)) {
            Entry::Occupied(mut occupied) => {
                if condition == WriteCondition::IfAbsent && !occupied.get().is_expired(now) {
                    return Ok(false);
                }
                occupied.insert(stored);
                Ok(true)
            }
            Entry::Vacant(vacant) => {
                vacant.insert(stored);
                Ok(true)
            }
        }
    }

    fn delete(&self, key: &str, now: Instant) -> i64 {
        match self.entries().remove(&self.slot(key)) {
            Some((_, value)) if !value.is_expired(now) => 1,
            _ => 0,
        }
    }
}

fn invalid_expire_time(command: &str) -> Error {
    Error::CommandRejected(format!(
        "ERR invalid expire time in '{}' command",
        command.to_lowercase()
    ))
}

impl StoreConnection for InMemoryConnection {
    async fn execute(&mut self, command: &Command<'_>) -> Result<Reply> {
        if !self.store.is_available() {
            return Err(Error::BackendError(format!(
                "in-memory store unavailable while running {}",
                command.name()
            )));
        }

        let now = Instant::now();
        let reply = match command {
            Command::Get { key } => self.read(key, now).map_or(Reply::Nil, Reply::Bulk),
            Command::Set {
                key,
                value,
                expiry,
                condition,
            } => {
                if self.write(key, value, *expiry, *condition, now, command.name())? {
                    Reply::ok()
                } else {
                    Reply::Nil
                }
            }
            Command::SetEx { key, expiry, value } => {
                self.write(
                    key,
                    value,
                    Some(*expiry),
                    WriteCondition::Always,
                    now,
                    command.name(),
                )?;
                Reply::ok()
            }
            Command::SetNx { key, value } => {
                let written = self.write(
                    key,
                    value,
                    None,
                    WriteCondition::IfAbsent,
                    now,
                    command.name(),
                )?;
                Reply::Integer(i64::from(written))
            }
            Command::Del { key } => Reply::Integer(self.delete(key, now)),
            Command::MGet { keys } => Reply::Array(
                keys.iter()
                    .map(|key| self.read(key, now).map_or(Reply::Nil, Reply::Bulk))
                    .collect(),
            ),
            Command::Select { database } => {
                self.database = *database;
                Reply::ok()
            }
            Command::FlushDb => {
                let database = self.database;
                self.entries().retain(|(db, _), _| *db != database);
                Reply::ok()
            }
            Command::Ping => Reply::Status("PONG".to_string()),
        };

        Ok(reply)
    }
}
