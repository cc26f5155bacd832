//! Configuration sources.
//!
//! Responsibilities:
//! - Define the `ConfigSource` trait: given a section and key, return an optional raw string.
//! - Provide the built-in sources: environment variables, INI files/strings, in-memory mappings.
//! - Define the single case-normalization rule every source and the provider share.
//!
//! Does NOT handle:
//! - Priority ordering or caching across sources (see `provider.rs`).
//! - Converting raw strings into typed values (see `key.rs` and `casts.rs`).
//!
//! Invariants:
//! - `get_config_value` never fails for a missing value; it returns `None`.
//! - Lookups are case-insensitive for both section and key names.
//! - Construction failures (missing required file, malformed INI) are reported by constructors.

mod dict;
mod env;
mod ini;
mod ini_parser;

pub use dict::DictConfigSource;
pub use env::EnvironmentConfigSource;
pub use ini::{IniFileConfigSource, IniStringConfigSource};

use std::fmt;
use std::sync::Arc;

/// A capability that maps `(section, key)` to a raw string value.
///
/// Implementations must be safe to call from several threads at once, since a
/// [`ConfigProvider`](crate::ConfigProvider) may be shared across threads.
pub trait ConfigSource: fmt::Debug + Send + Sync {
    /// Look up a raw value. Section and key names are matched case-insensitively.
    fn get_config_value(&self, section_name: &str, key_name: &str) -> Option<String>;
}

/// Shared handle to a source. Identity (for `replace_source`) is the allocation.
pub type SharedSource = Arc<dyn ConfigSource>;

/// Normalize a section or key name for case-insensitive storage and comparison.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
}

/// Returns true when both handles point at the same source allocation.
pub(crate) fn same_source(a: &SharedSource, b: &SharedSource) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
