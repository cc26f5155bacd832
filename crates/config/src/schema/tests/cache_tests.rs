//! Typed caching and `clear_cache`.

use std::sync::Arc;

use super::{DatabaseConfig, ParentConfig, WebConfig, dict};
use crate::error::ConfigError;
use crate::test_util::CountingSource;
use crate::{Config, DictConfigSource};

fn counting(entries: &[(&str, &str, &str)]) -> Arc<CountingSource> {
    let inner = entries
        .iter()
        .fold(DictConfigSource::default(), |source, (section, key, value)| {
            source.with_value(section, key, *value)
        });
    Arc::new(CountingSource::new(inner))
}

#[test]
fn test_repeated_access_uses_cache() {
    let source = counting(&[("app", "name", "demo")]);
    let config = ParentConfig::new().unwrap();
    config.add_source(source.clone());

    assert_eq!(config.name().unwrap(), "demo");
    assert_eq!(config.name().unwrap(), "demo");
    assert_eq!(source.calls(), 1);
}

#[test]
fn test_clear_cache_looks_up_again() {
    let source = counting(&[("app", "name", "demo")]);
    let config = ParentConfig::new().unwrap();
    config.add_source(source.clone());

    config.name().unwrap();
    config.clear_cache();
    config.name().unwrap();
    assert_eq!(source.calls(), 2);
}

#[test]
fn test_source_change_needs_clear_cache() {
    let config = ParentConfig::with_sources([dict(&[("app", "name", "old")])]).unwrap();
    assert_eq!(config.name().unwrap(), "old");

    config.set_sources([dict(&[("app", "name", "new")])]);
    assert_eq!(config.name().unwrap(), "old");

    config.clear_cache();
    assert_eq!(config.name().unwrap(), "new");
}

#[test]
fn test_failures_are_not_cached() {
    let config = DatabaseConfig::with_sources([dict(&[("database", "port", "eighty")])]).unwrap();
    assert!(matches!(config.port(), Err(ConfigError::Cast { .. })));

    config.set_sources([dict(&[("database", "port", "80")])]);
    assert_eq!(config.port().unwrap(), 80);
}

#[test]
fn test_clear_cache_keeps_groups_and_wipes_them() {
    let source = counting(&[("database", "host", "db"), ("database", "port", "1")]);
    let config = ParentConfig::new().unwrap();
    config.add_source(source.clone());

    let database = config.database().unwrap();
    assert_eq!(database.host().unwrap(), "db");
    assert_eq!(source.calls(), 1);

    config.clear_cache();
    assert!(Arc::ptr_eq(&database, &config.database().unwrap()));
    assert_eq!(database.host().unwrap(), "db");
    assert_eq!(source.calls(), 2);
}

#[test]
fn test_clear_cache_discards_overrides() {
    let config = WebConfig::with_sources([dict(&[("web", "use_https", "on")])]).unwrap();
    config.read().unwrap();
    assert_eq!(config.http_port().unwrap(), Some(443));

    config.clear_cache();
    assert_eq!(config.http_port().unwrap(), None);

    config.read().unwrap();
    assert_eq!(config.http_port().unwrap(), Some(443));
}
