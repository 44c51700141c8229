//! Property tests for the cache contract over the in-memory store.

use proptest::collection::{hash_set, vec};
use proptest::prelude::*;
use redis_cache_kit::store::InMemoryStore;
use redis_cache_kit::{RedisCache, RedisCacheBuilder};
use tokio::runtime::Runtime;

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime")
}

fn fresh_cache() -> RedisCache<InMemoryStore> {
    RedisCacheBuilder::new().build(InMemoryStore::new())
}

fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9:_-]{1,24}"
}

proptest! {
    #[test]
    fn stored_bytes_come_back_verbatim(key in key_strategy(), value in vec(any::<u8>(), 0..256)) {
        runtime().block_on(async {
            let cache = fresh_cache();
            assert!(cache.set(&key, &value, 0).await.expect("set"));
            assert_eq!(cache.get(&key).await.expect("get"), Some(value.clone()));
        });
    }

    #[test]
    fn add_only_wins_on_absent_key(
        key in key_strategy(),
        first in vec(any::<u8>(), 1..32),
        second in vec(any::<u8>(), 1..32),
        ttl in 0u64..3600,
    ) {
        runtime().block_on(async {
            let cache = fresh_cache();
            assert!(cache.add(&key, &first, ttl).await.expect("add"));
            assert!(!cache.add(&key, &second, ttl).await.expect("add"));
            assert_eq!(cache.get(&key).await.expect("get"), Some(first.clone()));
        });
    }

    #[test]
    fn delete_is_idempotent(key in key_strategy(), present in any::<bool>(), repeats in 1usize..4) {
        runtime().block_on(async {
            let cache = fresh_cache();
            if present {
                cache.set(&key, b"v", 0).await.expect("set");
            }
            for _ in 0..repeats {
                assert!(cache.delete(&key).await.expect("delete"));
            }
            assert_eq!(cache.get(&key).await.expect("get"), None);
        });
    }

    #[test]
    fn multi_get_matches_single_gets(
        keys in hash_set(key_strategy(), 1..12),
        written in vec(any::<bool>(), 12),
    ) {
        runtime().block_on(async {
            let cache = fresh_cache();
            let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
            for (key, write) in keys.iter().zip(&written) {
                if *write {
                    cache.set(key, key.as_bytes(), 0).await.expect("set");
                }
            }

            let values = cache.multi_get(&keys).await.expect("mget");

            assert_eq!(values.keys().collect::<Vec<_>>(), keys);
            for key in &keys {
                let single = cache.get(key).await.expect("get");
                assert_eq!(values.get(key).cloned(), single);
            }
        });
    }
}
