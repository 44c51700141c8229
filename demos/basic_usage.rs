//! Basic usage of the byte-level cache client.
//!
//! Runs against the in-memory store by default. Set `REDIS_HOST` (and
//! optionally `REDIS_PORT`, `REDIS_DATABASE`, ...) to use a real server.

use redis_cache_kit::error::Result;
use redis_cache_kit::store::ConnectionFactory;
use redis_cache_kit::{InMemoryStore, RedisCache, RedisCacheBuilder};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Debug)
        .try_init()
        .ok();

    println!("\n=== Redis Cache Kit - Basic Example ===\n");

    let builder = RedisCacheBuilder::new().database(1).with_env();

    if std::env::var("REDIS_HOST").is_ok() {
        println!("Using Redis at {}\n", builder.connection_config().display_addr());
        run(builder.build_redis()).await
    } else {
        println!("Using the in-memory store (set REDIS_HOST for a real server)\n");
        run(builder.build(InMemoryStore::new())).await
    }
}

async fn run<F: ConnectionFactory>(cache: RedisCache<F>) -> Result<()> {
    // 1. Plain set and get
    println!("1. set / get:");
    cache.set("demo:greeting", b"hello", 60).await?;
    match cache.get("demo:greeting").await? {
        Some(bytes) => println!(
            "   ✓ HIT  demo:greeting = {}\n",
            String::from_utf8_lossy(&bytes)
        ),
        None => println!("   ✗ MISS demo:greeting\n"),
    }

    // 2. Insert-if-absent
    println!("2. add (insert only if absent):");
    let first = cache.add("demo:lock", b"worker-1", 30).await?;
    let second = cache.add("demo:lock", b"worker-2", 30).await?;
    println!("   worker-1 acquired: {}", first);
    println!("   worker-2 acquired: {}\n", second);

    // 3. Batch read keeps misses
    println!("3. multi_get:");
    let values = cache
        .multi_get(&["demo:greeting", "demo:lock", "demo:absent"])
        .await?;
    for (key, value) in values.iter() {
        match value {
            Some(bytes) => println!("   {} = {}", key, String::from_utf8_lossy(bytes)),
            None => println!("   {} = <miss>", key),
        }
    }
    println!();

    // 4. Delete is idempotent
    println!("4. delete:");
    println!("   first delete:  {}", cache.delete("demo:lock").await?);
    println!("   second delete: {}\n", cache.delete("demo:lock").await?);

    // 5. Flush the configured database
    println!("5. flush database {}:", cache.config().database);
    cache.flush().await?;
    println!(
        "   ✓ demo:greeting after flush: {:?}\n",
        cache.get("demo:greeting").await?
    );

    println!("=== Example Complete ===\n");
    Ok(())
}
