//! Tests for schema resolution.
//!
//! Responsibilities:
//! - Test key resolution order, required keys and defaults.
//! - Test group construction on the shared provider.
//! - Test the read / post-read hook / clear_cache lifecycle.
//!
//! Does NOT handle:
//! - Parsing of individual sources (tested next to each source).
//! - Environment-dependent behavior (see `tests/env_source_tests.rs`).
//!
//! Invariants:
//! - Every fixture source is in-memory; no test touches the process environment.

use std::sync::Arc;

use crate::source::{DictConfigSource, SharedSource};
use crate::{ConfigCore, Overrides, Result, key};

pub mod cache_tests;

/// A source holding `(section, key, value)` triples.
pub fn dict(entries: &[(&str, &str, &str)]) -> SharedSource {
    let source = entries
        .iter()
        .fold(DictConfigSource::default(), |source, (section, key, value)| {
            source.with_value(section, key, *value)
        });
    Arc::new(source)
}

typed_config! {
    pub struct DatabaseConfig [section = "database"] {
        key host: String = key(),
        key port: u16 = key().parse::<u16>(),
    }
}

typed_config! {
    pub struct ParentConfig [section = "app"] {
        key name: String = key(),
        group database: DatabaseConfig,
    }
}

typed_config! {
    /// Derives the port from the scheme when none is configured.
    pub struct WebConfig [section = "web"] [post_read = derive_port] {
        key use_https: bool = key().cast(crate::casts::boolean),
        key http_port: Option<u16> = key().parse::<u16>().optional(),
    }
}

impl WebConfig {
    fn derive_port(core: &ConfigCore) -> Result<Overrides> {
        if core.get::<bool>("use_https")? && core.get::<Option<u16>>("http_port")?.is_none() {
            return Ok(Overrides::new().set("http_port", Some(443u16)));
        }
        Ok(Overrides::new())
    }
}
