//! In-memory two-level mapping source.

use std::collections::HashMap;
use std::fmt;

use super::{ConfigSource, normalize_name};

/// A source backed by a caller-supplied `section -> key -> value` mapping.
///
/// Names are normalized on construction; values are always strings so that
/// casting behaves the same whichever source a value came from.
#[derive(Clone, Default)]
pub struct DictConfigSource {
    sections: HashMap<String, HashMap<String, String>>,
}

impl DictConfigSource {
    /// Build a source from any two-level iterable of string-like pairs.
    ///
    /// When two entries differ only by case, the later one wins.
    pub fn new<S, I, K, V>(config: impl IntoIterator<Item = (S, I)>) -> Self
    where
        S: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
        for (section, keys) in config {
            let entries = sections.entry(normalize_name(section.as_ref())).or_default();
            for (key, value) in keys {
                entries.insert(normalize_name(key.as_ref()), value.into());
            }
        }
        Self { sections }
    }

    /// Set a single value, replacing any existing one.
    pub fn with_value(mut self, section: &str, key: &str, value: impl Into<String>) -> Self {
        self.sections
            .entry(normalize_name(section))
            .or_default()
            .insert(normalize_name(key), value.into());
        self
    }

    /// Returns true when the mapping holds no values.
    pub fn is_empty(&self) -> bool {
        self.sections.values().all(HashMap::is_empty)
    }
}

impl ConfigSource for DictConfigSource {
    fn get_config_value(&self, section_name: &str, key_name: &str) -> Option<String> {
        self.sections
            .get(&normalize_name(section_name))?
            .get(&normalize_name(key_name))
            .cloned()
    }
}

// Values may be secrets; only section names are printed.
impl fmt::Debug for DictConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.sections.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("DictConfigSource")
            .field("sections", &names)
            .finish()
    }
}
