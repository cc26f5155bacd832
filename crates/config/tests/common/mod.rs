//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use typed_config::{ConfigSource, DictConfigSource, SharedSource};

/// Wraps a source and counts lookups.
#[derive(Debug)]
pub struct CountingSource<S> {
    inner: S,
    calls: AtomicUsize,
}

impl<S: ConfigSource> CountingSource<S> {
    pub fn new(inner: S) -> Arc<Self> {
        Arc::new(Self {
            inner,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<S: ConfigSource> ConfigSource for CountingSource<S> {
    fn get_config_value(&self, section_name: &str, key_name: &str) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get_config_value(section_name, key_name)
    }
}

/// An in-memory source from `(section, key, value)` triples.
pub fn dict(entries: &[(&str, &str, &str)]) -> SharedSource {
    Arc::new(dict_source(entries))
}

pub fn dict_source(entries: &[(&str, &str, &str)]) -> DictConfigSource {
    entries
        .iter()
        .fold(DictConfigSource::default(), |source, (section, key, value)| {
            source.with_value(section, key, *value)
        })
}
