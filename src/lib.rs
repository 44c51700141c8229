//! # redis-cache-kit
//!
//! A key-value cache client over Redis-style stores that keeps cache semantics
//! exact: a miss is never confused with an empty value, `add` is a single
//! atomic `SET .. NX`, a TTL of 0 means "never expire", and an unreachable
//! store is an error rather than a silent `false`.
//!
//! ## Features
//!
//! - **Strict translation:** every operation maps to documented store commands
//!   with explicit reply normalization (see [`cache`])
//! - **Lazy connection:** the store connection is opened on first use and
//!   reused; factories are swappable for tests
//! - **Distinct error channel:** misses are `Ok(None)`, rejected inserts are
//!   `Ok(false)`, transport failures are `Err`
//! - **Typed facade:** serde values, key prefixes, default TTLs and metrics
//!   hooks through [`CacheFacade`]
//! - **In-memory store:** the same command set without a server, with real
//!   expiry and numbered databases
//!
//! ## Quick Start
//!
//! ```ignore
//! use redis_cache_kit::{CacheFacade, RedisCacheBuilder};
//!
//! // 1. Configure (nothing connects yet)
//! let cache = RedisCacheBuilder::new()
//!     .host("127.0.0.1")
//!     .database(1)
//!     .with_env()
//!     .build_redis();
//!
//! // 2. Raw bytes
//! cache.set("greeting", b"hello", 60).await?;
//! let hit = cache.get("greeting").await?;          // Some(b"hello")
//! let taken = cache.add("lock:job-7", b"1", 30).await?; // true once
//!
//! // 3. Typed values
//! let users = CacheFacade::new(cache).with_prefix("user");
//! users.set("42", &user, 300).await?;
//! let cached: Option<User> = users.get("42").await?;
//! ```

#[macro_use]
extern crate log;

pub mod builder;
pub mod cache;
pub mod command;
pub mod config;
pub mod error;
pub mod facade;
pub mod handle;
pub mod key;
pub mod observability;
pub mod serialization;
pub mod store;
pub mod values;

// Re-exports for convenience
pub use builder::RedisCacheBuilder;
pub use cache::RedisCache;
pub use config::{ClientOptions, ConnectionConfig, ConnectionOverrides, ProtocolProfile};
pub use error::{Error, Result};
pub use facade::CacheFacade;
pub use store::{ConnectionFactory, InMemoryStore, StoreConnection};
#[cfg(feature = "redis")]
pub use store::RedisConnectionFactory;
pub use values::ValueMap;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
