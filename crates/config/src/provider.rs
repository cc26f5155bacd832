//! Shared, priority-ordered access to configuration sources.
//!
//! Responsibilities:
//! - Own the ordered source list (earlier = higher priority).
//! - Resolve `(section, key)` to the first value any source has.
//! - Memoize raw results, including misses, keyed by normalized names.
//!
//! Does NOT handle:
//! - Casting or typed caching (see `schema/instance.rs`).
//!
//! Invariants:
//! - Cloning a `ConfigProvider` yields another handle to the same sources and cache.
//! - Any change to the source list clears the raw cache.
//! - Check-cache / consult-sources / store-cache runs under one lock, so concurrent
//!   first lookups of the same key hit the sources once.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{ConfigError, Result};
use crate::source::{SharedSource, normalize_name, same_source};

#[derive(Default)]
struct ProviderState {
    sources: Vec<SharedSource>,
    cache: HashMap<(String, String), Option<String>>,
}

/// Configuration provider keeping the sources and raw-value cache shared by
/// every config built on it.
#[derive(Clone, Default)]
pub struct ConfigProvider {
    state: Arc<Mutex<ProviderState>>,
}

impl ConfigProvider {
    /// A provider with no sources.
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider with `sources` in priority order.
    pub fn with_sources(sources: impl IntoIterator<Item = SharedSource>) -> Self {
        let provider = Self::new();
        provider.set_sources(sources);
        provider
    }

    // The cache is plain memoization, so data behind a poisoned lock is still usable.
    fn state(&self) -> MutexGuard<'_, ProviderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the current sources in priority order.
    pub fn config_sources(&self) -> Vec<SharedSource> {
        self.state().sources.clone()
    }

    /// Append `source` as the lowest-priority source so far.
    pub fn add_source(&self, source: SharedSource) {
        tracing::debug!(source = ?source, "Adding config source");
        let mut state = self.state();
        state.sources.push(source);
        state.cache.clear();
    }

    /// Replace the whole source list.
    pub fn set_sources(&self, sources: impl IntoIterator<Item = SharedSource>) {
        let sources: Vec<SharedSource> = sources.into_iter().collect();
        tracing::debug!(count = sources.len(), "Setting config sources");
        let mut state = self.state();
        state.sources = sources;
        state.cache.clear();
    }

    /// Substitute `new` for `old` (matched by identity), keeping its priority.
    ///
    /// # Errors
    ///
    /// `ConfigError::UnknownSource` if `old` is not in the source list.
    pub fn replace_source(&self, old: &SharedSource, new: SharedSource) -> Result<()> {
        tracing::debug!(old = ?old, new = ?new, "Replacing config source");
        let mut state = self.state();
        let slot = state
            .sources
            .iter_mut()
            .find(|source| same_source(source, old))
            .ok_or_else(|| ConfigError::UnknownSource(format!("{:?}", old)))?;
        *slot = new;
        state.cache.clear();
        Ok(())
    }

    /// The first value any source has for `(section, key)`, memoized.
    pub fn get_config_value(&self, section_name: &str, key_name: &str) -> Option<String> {
        let cache_key = (normalize_name(section_name), normalize_name(key_name));
        let mut state = self.state();
        if let Some(cached) = state.cache.get(&cache_key) {
            return cached.clone();
        }

        let mut value = None;
        for source in &state.sources {
            tracing::debug!(
                section = section_name,
                key = key_name,
                source = ?source,
                "Looking for config value"
            );
            value = source.get_config_value(section_name, key_name);
            if value.is_some() {
                tracing::debug!(
                    section = section_name,
                    key = key_name,
                    source = ?source,
                    "Found config value"
                );
                break;
            }
        }

        state.cache.insert(cache_key, value.clone());
        value
    }

    /// Drop all memoized results. The source list is unchanged.
    pub fn clear_cache(&self) {
        self.state().cache.clear();
    }

    /// Returns true when both handles share the same sources and cache.
    pub fn ptr_eq(&self, other: &ConfigProvider) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl fmt::Debug for ConfigProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("ConfigProvider")
            .field("sources", &state.sources)
            .field("cached", &state.cache.len())
            .finish()
    }
}
