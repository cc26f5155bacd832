//! Shared helpers for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock};

use crate::source::{ConfigSource, DictConfigSource};

/// Serializes tests that touch process-global state (environment, cwd).
pub fn global_test_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

/// A dictionary source that counts how often it is consulted.
#[derive(Debug, Default)]
pub struct CountingSource {
    inner: DictConfigSource,
    calls: AtomicUsize,
}

impl CountingSource {
    pub fn new(inner: DictConfigSource) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ConfigSource for CountingSource {
    fn get_config_value(&self, section_name: &str, key_name: &str) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get_config_value(section_name, key_name)
    }
}
