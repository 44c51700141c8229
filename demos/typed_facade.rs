//! Typed values through the facade: serde types, key prefixes, a default TTL
//! and a metrics hook.

use redis_cache_kit::error::Result;
use redis_cache_kit::observability::{CacheMetrics, TtlPolicy};
use redis_cache_kit::{CacheFacade, InMemoryStore, RedisCacheBuilder};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Employment {
    id: String,
    employer_name: String,
    salary: f64,
}

#[derive(Default)]
struct Counters {
    hits: AtomicUsize,
    misses: AtomicUsize,
}

struct CountingMetrics(Arc<Counters>);

impl CacheMetrics for CountingMetrics {
    fn record_hit(&self, key: &str, duration: Duration) {
        self.0.hits.fetch_add(1, Ordering::Relaxed);
        println!("   [metrics] hit  {} in {:?}", key, duration);
    }

    fn record_miss(&self, key: &str, duration: Duration) {
        self.0.misses.fetch_add(1, Ordering::Relaxed);
        println!("   [metrics] miss {} in {:?}", key, duration);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .try_init()
        .ok();

    println!("\n=== Redis Cache Kit - Typed Facade ===\n");

    let counters = Arc::new(Counters::default());
    let cache = RedisCacheBuilder::new().build(InMemoryStore::new());
    let employments = CacheFacade::new(cache)
        .with_prefix("employment")
        .with_ttl_policy(TtlPolicy::Fixed(Duration::from_secs(300)))
        .with_metrics(Box::new(CountingMetrics(counters.clone())));

    let emp = Employment {
        id: "emp_001".to_string(),
        employer_name: "Acme Corp".to_string(),
        salary: 75000.0,
    };

    println!("1. Store with the default TTL:");
    employments.set_default(&emp.id, &emp).await?;
    println!(
        "   ✓ stored under {}\n",
        employments.key_builder().build(&emp.id)
    );

    println!("2. Read it back:");
    if let Some(cached) = employments.get::<Employment>("emp_001").await? {
        println!(
            "   ✓ {} at {} (${:.2})\n",
            cached.id, cached.employer_name, cached.salary
        );
    }

    println!("3. Read a missing entry:");
    let missing: Option<Employment> = employments.get("emp_404").await?;
    println!("   ✓ emp_404 -> {:?}\n", missing);

    println!("4. Batch read:");
    let batch = employments
        .multi_get::<Employment>(&["emp_001", "emp_404"])
        .await?;
    println!("   ✓ {} of {} keys hit\n", batch.hits(), batch.len());

    println!(
        "Metrics: {} hits, {} misses",
        counters.hits.load(Ordering::Relaxed),
        counters.misses.load(Ordering::Relaxed)
    );
    println!("\n=== Example Complete ===\n");
    Ok(())
}
