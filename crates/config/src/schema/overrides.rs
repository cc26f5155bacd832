//! Post-read overrides.
//!
//! A post-read hook returns an [`Overrides`] tree: attribute names mapped to
//! either a typed value for a key or a nested tree for a group.

use std::any::Any;
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;
use std::sync::Arc;

use crate::key::Value;

/// One entry of an override tree.
#[derive(Clone)]
pub enum Override {
    /// Replaces the resolved value of a key. Must have exactly the key's value type.
    Value(Value),
    /// Addresses the attributes of a group.
    Group(Overrides),
}

impl Override {
    pub fn value<T: Any + Send + Sync>(value: T) -> Self {
        Override::Value(Arc::new(value))
    }

    /// The value, if this is a scalar of type `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Override::Value(value) => value.downcast_ref::<T>(),
            Override::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&Overrides> {
        match self {
            Override::Group(group) => Some(group),
            Override::Value(_) => None,
        }
    }
}

impl fmt::Debug for Override {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Override::Value(_) => f.write_str("Value(..)"),
            Override::Group(group) => f.debug_tuple("Group").field(group).finish(),
        }
    }
}

/// Mapping from attribute name to [`Override`], nestable to any depth.
#[derive(Clone, Default)]
pub struct Overrides {
    entries: BTreeMap<String, Override>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the key `attribute` with `value`.
    pub fn set<T: Any + Send + Sync>(mut self, attribute: impl Into<String>, value: T) -> Self {
        self.insert(attribute, Override::value(value));
        self
    }

    /// Override attributes of the group `attribute`.
    pub fn group(mut self, attribute: impl Into<String>, nested: Overrides) -> Self {
        self.insert(attribute, Override::Group(nested));
        self
    }

    pub fn insert(&mut self, attribute: impl Into<String>, entry: Override) {
        self.entries.insert(attribute.into(), entry);
    }

    pub fn get(&self, attribute: &str) -> Option<&Override> {
        self.entries.get(attribute)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Combine two trees; entries in `other` win. Nested groups present in
    /// both are merged recursively.
    ///
    /// A schema that extends another can merge its base's overrides with its
    /// own this way so the most-derived value wins.
    pub fn merge(mut self, other: Overrides) -> Self {
        for (attribute, entry) in other.entries {
            match (self.entries.remove(&attribute), entry) {
                (Some(Override::Group(base)), Override::Group(derived)) => {
                    self.entries
                        .insert(attribute, Override::Group(base.merge(derived)));
                }
                (_, entry) => {
                    self.entries.insert(attribute, entry);
                }
            }
        }
        self
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Override> {
        self.entries.iter()
    }
}

impl IntoIterator for Overrides {
    type Item = (String, Override);
    type IntoIter = btree_map::IntoIter<String, Override>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl fmt::Debug for Overrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let overrides = Overrides::new()
            .set("http_port", 443u16)
            .group("database", Overrides::new().set("host", "db".to_string()));

        assert_eq!(overrides.len(), 2);
        assert_eq!(
            overrides.get("http_port").and_then(Override::downcast_ref::<u16>),
            Some(&443)
        );
        let database = overrides.get("database").and_then(Override::as_group).unwrap();
        assert_eq!(
            database.get("host").and_then(Override::downcast_ref::<String>),
            Some(&"db".to_string())
        );
    }

    #[test]
    fn test_merge_prefers_other() {
        let base = Overrides::new().set("a", 1i32).set("b", 2i32);
        let derived = Overrides::new().set("b", 20i32).set("c", 30i32);
        let merged = base.merge(derived);

        assert_eq!(merged.get("a").and_then(Override::downcast_ref::<i32>), Some(&1));
        assert_eq!(merged.get("b").and_then(Override::downcast_ref::<i32>), Some(&20));
        assert_eq!(merged.get("c").and_then(Override::downcast_ref::<i32>), Some(&30));
    }

    #[test]
    fn test_merge_recurses_into_groups() {
        let base = Overrides::new().group("db", Overrides::new().set("host", "a").set("port", 1u16));
        let derived = Overrides::new().group("db", Overrides::new().set("host", "b"));
        let merged = base.merge(derived);

        let db = merged.get("db").and_then(Override::as_group).unwrap();
        assert_eq!(db.get("host").and_then(Override::downcast_ref::<&str>), Some(&"b"));
        assert_eq!(db.get("port").and_then(Override::downcast_ref::<u16>), Some(&1));
    }

    #[test]
    fn test_merge_scalar_replaces_group() {
        let base = Overrides::new().group("x", Overrides::new().set("y", 1u8));
        let merged = base.merge(Overrides::new().set("x", 2u8));
        assert!(merged.get("x").and_then(Override::as_group).is_none());
    }

    #[test]
    fn test_debug_rendering() {
        let overrides = Overrides::new()
            .set("a", 1u8)
            .group("g", Overrides::new());
        assert_eq!(format!("{:?}", overrides), "{\"a\": Value(..), \"g\": Group({})}");
    }
}
