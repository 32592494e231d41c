//! Integration Tests for the public cache API
//!
//! Exercises the create / get / put / delete / size / destroy surface end to end.

use std::sync::{Arc, Once};
use std::time::Duration;

use avl_cache::{
    shared, spawn_trim_task, AvlCache, AvlTree, CacheError, Config, EvictionPolicy,
};

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .init();
    });
}

// == Construction ==

#[test]
fn test_create_rejects_zero_capacity() {
    init_tracing();
    let result = AvlCache::<String, String>::new(0);
    assert!(matches!(result, Err(CacheError::InvalidConfiguration(_))));
}

#[test]
fn test_create_from_config() {
    init_tracing();
    let config = Config {
        max_entries: 3,
        eviction_policy: EvictionPolicy::Fifo,
        ..Config::default()
    };
    let cache: AvlCache<u64, u64> = AvlCache::from_config(&config).unwrap();
    assert_eq!(cache.capacity(), 3);
    assert_eq!(cache.policy(), EvictionPolicy::Fifo);
    assert_eq!(cache.len(), 0);
}

// == Cache Scenarios ==

#[test]
fn test_capacity_two_evicts_least_recently_touched() {
    init_tracing();
    let mut cache = AvlCache::new(2).unwrap();
    cache.put("a", 1).unwrap();
    cache.put("b", 2).unwrap();
    cache.put("c", 3).unwrap();

    assert_eq!(cache.get(&"a"), None);
    assert_eq!(cache.get(&"b"), Some(&2));
    assert_eq!(cache.get(&"c"), Some(&3));
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_full_cache_put_evicts_exactly_one() {
    init_tracing();
    let mut cache = AvlCache::new(4).unwrap();
    for k in 0..4 {
        cache.put(k, k * 10).unwrap();
    }
    cache.put(99, 990).unwrap();

    assert_eq!(cache.len(), 4);
    assert_eq!(cache.stats().evictions, 1);
    assert!(!cache.contains_key(&0));
}

#[test]
fn test_empty_cache_reports_not_found() {
    init_tracing();
    let mut cache: AvlCache<String, Vec<u8>> = AvlCache::new(8).unwrap();
    assert_eq!(cache.get("nothing"), None);
    assert!(!cache.delete("nothing"));
    assert_eq!(cache.len(), 0);
}

#[test]
fn test_delete_counts_only_real_removals() {
    init_tracing();
    let mut cache = AvlCache::new(8).unwrap();
    cache.put("x".to_string(), 1).unwrap();
    cache.put("y".to_string(), 2).unwrap();

    assert!(cache.delete("x"));
    assert!(!cache.delete("x"));
    assert_eq!(cache.len(), 1);
    assert!(cache.check_invariants().is_ok());
}

#[test]
fn test_destroy_drops_every_value() {
    init_tracing();
    let marker = Arc::new(());
    {
        let mut cache = AvlCache::new(16).unwrap();
        for k in 0..10 {
            cache.put(k, Arc::clone(&marker)).unwrap();
        }
        cache.delete(&3);
        cache.evict();
        assert_eq!(Arc::strong_count(&marker), 9);
    }
    assert_eq!(Arc::strong_count(&marker), 1);
}

#[test]
fn test_priority_policy_evicts_lowest_priority() {
    init_tracing();
    let mut cache = AvlCache::with_policy(2, EvictionPolicy::Priority).unwrap();
    cache.put_with_priority(1u32, "page-1", 7).unwrap();
    cache.put_with_priority(2u32, "page-2", 3).unwrap();
    cache.put_with_priority(3u32, "page-3", 5).unwrap();

    assert!(!cache.contains_key(&2));
    let remaining: Vec<_> = cache.iter().map(|(k, _)| *k).collect();
    assert_eq!(remaining, vec![3, 1]);
}

// == Tree Scenarios ==

#[test]
fn test_ascending_keys_stay_balanced() {
    init_tracing();
    let mut tree = AvlTree::new();
    for k in 1..=7 {
        tree.insert(k, k);
    }
    assert!(tree.height() <= 3);
    assert_ne!(tree.root().map(|(k, _)| *k), Some(1));
    assert!(tree.check_invariants().is_ok());
}

#[test]
fn test_delete_root_promotes_successor() {
    init_tracing();
    let mut tree = AvlTree::new();
    tree.insert(20, "root");
    tree.insert(10, "left");
    tree.insert(30, "right");

    assert_eq!(tree.remove(&20), Some("root"));
    assert_eq!(tree.root(), Some((&30, &"right")));
    assert!(tree.check_invariants().is_ok());
}

// == Shared Cache ==

#[tokio::test]
async fn test_trim_task_on_shared_cache() {
    init_tracing();
    let cache = shared(AvlCache::new(50).unwrap().with_weigher(|v: &String| v.len()));
    {
        let mut guard = cache.lock().await;
        for k in 0..10u32 {
            guard.put(k, "x".repeat(10)).unwrap();
        }
    }

    let config = Config {
        trim_interval: 1,
        ..Config::default()
    };
    let handle = spawn_trim_task(cache.clone(), 45, &config).unwrap();
    tokio::time::sleep(Duration::from_millis(1500)).await;
    handle.abort();

    let guard = cache.lock().await;
    assert_eq!(guard.total_weight(), 40);
    assert_eq!(guard.len(), 4);
    assert!(guard.check_invariants().is_ok());
}
