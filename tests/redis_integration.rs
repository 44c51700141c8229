#![cfg(feature = "redis")]

use redis_cache_kit::{ConnectionConfig, Error, RedisCacheBuilder};

// ---------------------------------------------------------------------------
// Configuration checks (no Redis required)
// ---------------------------------------------------------------------------

#[test]
fn redis_url_reflects_builder_settings() {
    let cache = RedisCacheBuilder::new()
        .host("cache.internal")
        .port(6380)
        .database(5)
        .build_redis();

    assert_eq!(
        cache.config().connection_url().expect("url"),
        "redis://cache.internal:6380/5"
    );
    assert!(cache.config().username.is_none());
}

#[test]
fn unix_scheme_without_path_is_rejected() {
    let config = ConnectionConfig {
        scheme: redis_cache_kit::config::Scheme::Unix,
        path: None,
        ..Default::default()
    };
    assert!(matches!(
        config.connection_url().unwrap_err(),
        Error::ConfigError(_)
    ));
}

// ---------------------------------------------------------------------------
// Integration tests, require a running Redis instance.
// Run with: cargo test --test redis_integration -- --ignored
// Point at a server with REDIS_HOST / REDIS_PORT; database 5 is flushed.
// ---------------------------------------------------------------------------

mod integration {
    use redis_cache_kit::store::RedisConnectionFactory;
    use redis_cache_kit::{CacheFacade, RedisCache, RedisCacheBuilder};
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn test_cache() -> RedisCache<RedisConnectionFactory> {
        init_logging();
        RedisCacheBuilder::new().database(5).with_env().build_redis()
    }

    fn unique_key(label: &str) -> String {
        format!("rck-test:{}:{}", label, Uuid::now_v7())
    }

    #[tokio::test]
    #[ignore = "requires running Redis"]
    async fn set_get_add_delete_round() {
        let cache = test_cache();
        let key = unique_key("basic");

        assert!(cache.set(&key, b"1", 0).await.expect("set"));
        assert_eq!(cache.get(&key).await.expect("get"), Some(b"1".to_vec()));
        assert!(!cache.add(&key, b"2", 0).await.expect("add"));
        assert!(cache.delete(&key).await.expect("delete"));
        assert!(cache.delete(&key).await.expect("delete again"));
        assert_eq!(cache.get(&key).await.expect("get"), None);
    }

    #[tokio::test]
    #[ignore = "requires running Redis"]
    async fn expiring_value_disappears() {
        let cache = test_cache();
        let key = unique_key("ttl");

        assert!(cache.set(&key, b"short", 1).await.expect("set"));
        tokio::time::sleep(std::time::Duration::from_millis(2100)).await;
        assert_eq!(cache.get(&key).await.expect("get"), None);
    }

    #[tokio::test]
    #[ignore = "requires running Redis"]
    async fn multi_get_reports_misses() {
        let cache = test_cache();
        let present = unique_key("mget-hit");
        let missing = unique_key("mget-miss");
        cache.set(&present, b"v", 60).await.expect("set");

        let values = cache
            .multi_get(&[present.as_str(), missing.as_str()])
            .await
            .expect("mget");

        assert_eq!(values.get(&present), Some(&b"v".to_vec()));
        assert!(values.is_miss(&missing));

        cache.delete(&present).await.expect("cleanup");
    }

    #[tokio::test]
    #[ignore = "requires running Redis"]
    async fn flush_empties_test_database() {
        let cache = test_cache();
        let key = unique_key("flush");
        cache.set(&key, b"v", 0).await.expect("set");

        assert!(cache.flush().await.expect("flush"));
        assert_eq!(cache.get(&key).await.expect("get"), None);
    }

    #[tokio::test]
    #[ignore = "requires running Redis"]
    async fn health_check_pings() {
        assert!(test_cache().health_check().await.expect("ping"));
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Profile {
        id: u64,
        name: String,
    }

    #[tokio::test]
    #[ignore = "requires running Redis"]
    async fn facade_roundtrip_through_redis() {
        let prefix = unique_key("facade");
        let facade = CacheFacade::new(test_cache()).with_prefix(prefix);
        let profile = Profile {
            id: 7,
            name: "Ada".to_string(),
        };

        assert!(facade.set("7", &profile, 60).await.expect("set"));
        let cached: Option<Profile> = facade.get("7").await.expect("get");
        assert_eq!(cached, Some(profile));
        facade.delete("7").await.expect("cleanup");
    }
}
