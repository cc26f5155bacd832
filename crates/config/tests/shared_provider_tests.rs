//! One provider shared by several schemas and threads.

mod common;

use std::sync::Arc;
use std::thread;

use common::{CountingSource, dict_source};
use typed_config::{Config, ConfigProvider, key, typed_config};

typed_config! {
    struct Cluster [section = "cluster"] {
        key name: String = key(),
        key nodes: u32 = key().parse::<u32>(),
    }
}

typed_config! {
    struct Monitor {
        key cluster_name: String = key().section("cluster").key_name("name"),
        key interval: u64 = key().section("monitor").parse::<u64>().required(false).default_value(30),
    }
}

fn counted_provider() -> (ConfigProvider, Arc<CountingSource<typed_config::DictConfigSource>>) {
    let source = CountingSource::new(dict_source(&[
        ("cluster", "name", "east"),
        ("cluster", "nodes", "12"),
    ]));
    let provider = ConfigProvider::new();
    provider.add_source(source.clone());
    (provider, source)
}

/// Concurrent first lookups of the same keys reach the source once per key.
#[test]
fn test_concurrent_lookups_hit_source_once() {
    let (provider, source) = counted_provider();

    thread::scope(|scope| {
        for _ in 0..8 {
            let provider = provider.clone();
            scope.spawn(move || {
                let cluster = Cluster::with_provider(provider.clone()).unwrap();
                let monitor = Monitor::with_provider(provider).unwrap();
                cluster.read().unwrap();
                monitor.read().unwrap();
                assert_eq!(cluster.name().unwrap(), "east");
                assert_eq!(monitor.cluster_name().unwrap(), "east");
                assert_eq!(cluster.nodes().unwrap(), 12);
                assert_eq!(monitor.interval().unwrap(), 30);
            });
        }
    });

    // cluster.name, cluster.nodes and monitor.interval
    assert_eq!(source.calls(), 3);
}

/// One config instance read from many threads.
#[test]
fn test_config_instance_shared_across_threads() {
    let (provider, source) = counted_provider();
    let cluster = Arc::new(Cluster::with_provider(provider).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let cluster = Arc::clone(&cluster);
            thread::spawn(move || cluster.nodes().unwrap())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 12);
    }
    assert_eq!(source.calls(), 1);
}

/// Sources added through one schema are visible to the other after clearing its cache.
#[test]
fn test_source_mutation_visible_to_every_schema() {
    let (provider, _source) = counted_provider();
    let cluster = Cluster::with_provider(provider.clone()).unwrap();
    let monitor = Monitor::with_provider(provider).unwrap();

    assert_eq!(monitor.interval().unwrap(), 30);
    cluster.add_source(Arc::new(dict_source(&[("monitor", "interval", "5")])));
    monitor.clear_cache();
    assert_eq!(monitor.interval().unwrap(), 5);
    assert!(cluster.provider().ptr_eq(monitor.provider()));
}
