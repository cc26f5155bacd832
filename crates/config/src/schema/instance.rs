//! Per-instance state of a config: resolved values and built groups.
//!
//! Responsibilities:
//! - Resolve keys through the provider, cast them and cache the typed result.
//! - Build group instances lazily on the shared provider.
//! - Apply post-read overrides and wipe caches on request.
//!
//! Does NOT handle:
//! - Source ordering or raw-value caching (see `provider.rs`).
//!
//! Invariants:
//! - Failed resolutions are never cached.
//! - A group is built at most once per parent; `clear_cache` keeps the instance
//!   and wipes its caches.
//! - An override tree is checked completely before any of it is stored.

use std::any::{TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{Config, ConfigNode, Entry, GroupDef, Override, Overrides, Schema};
use crate::error::{ConfigError, Result};
use crate::key::{KeyDef, Value};
use crate::provider::ConfigProvider;

/// State behind every config instance.
///
/// Types implementing [`Config`] store one of these and hand it out from
/// [`Config::core`]; the typed accessors call [`ConfigCore::get`] and
/// [`ConfigCore::group`].
pub struct ConfigCore {
    schema: Schema,
    provider: ConfigProvider,
    values: Mutex<HashMap<String, Value>>,
    groups: Mutex<HashMap<String, Arc<dyn ConfigNode>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn invalid_override(path: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidOverride {
        path: path.to_string(),
        message: message.into(),
    }
}

fn join_path(path: &str, attribute: &str) -> String {
    if path.is_empty() {
        attribute.to_string()
    } else {
        format!("{}.{}", path, attribute)
    }
}

impl ConfigCore {
    /// Fresh state with empty caches. Does not validate `schema`.
    pub fn new(schema: Schema, provider: ConfigProvider) -> Self {
        Self {
            schema,
            provider,
            values: Mutex::new(HashMap::new()),
            groups: Mutex::new(HashMap::new()),
        }
    }

    pub fn provider(&self) -> &ConfigProvider {
        &self.provider
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The value of the key registered as `attribute`.
    ///
    /// # Errors
    ///
    /// - `UnknownAttribute` if no key has that name.
    /// - `TypeMismatch` if the key's value type is not `T`.
    /// - `MissingRequired` or `Cast` if resolution fails.
    pub fn get<T: Clone + 'static>(&self, attribute: &str) -> Result<T> {
        let def = self
            .schema
            .key_def(attribute)
            .ok_or_else(|| ConfigError::UnknownAttribute(attribute.to_string()))?;
        let mismatch = || ConfigError::TypeMismatch {
            attribute: attribute.to_string(),
            expected: type_name::<T>(),
            actual: def.type_name,
        };
        if def.value_type != TypeId::of::<T>() {
            return Err(mismatch());
        }
        let value = self.value(def)?;
        value.downcast_ref::<T>().cloned().ok_or_else(mismatch)
    }

    /// The group registered as `attribute`, built on first access.
    ///
    /// # Errors
    ///
    /// `UnknownAttribute` if no group has that name, `TypeMismatch` if it is not a `C`.
    pub fn group<C: Config>(&self, attribute: &str) -> Result<Arc<C>> {
        let def = self
            .schema
            .group_def(attribute)
            .ok_or_else(|| ConfigError::UnknownAttribute(attribute.to_string()))?;
        let mismatch = || ConfigError::TypeMismatch {
            attribute: attribute.to_string(),
            expected: type_name::<C>(),
            actual: def.type_name,
        };
        if def.value_type != TypeId::of::<C>() {
            return Err(mismatch());
        }
        self.group_node(def)
            .into_any()
            .downcast::<C>()
            .map_err(|_| mismatch())
    }

    fn value(&self, def: &KeyDef) -> Result<Value> {
        if let Some(value) = lock(&self.values).get(&def.attribute) {
            return Ok(value.clone());
        }
        // Resolved outside the lock: a cast is user code.
        let value = self.resolve(def)?;
        lock(&self.values).insert(def.attribute.clone(), value.clone());
        Ok(value)
    }

    fn resolve(&self, def: &KeyDef) -> Result<Value> {
        let section = self.schema.section_for(def)?;
        match self.provider.get_config_value(section, &def.key_name) {
            Some(raw) => def.cast(&raw).map_err(|source| ConfigError::Cast {
                section: section.to_string(),
                key: def.key_name.clone(),
                source,
            }),
            None => {
                let missing = || ConfigError::MissingRequired {
                    section: section.to_string(),
                    key: def.key_name.clone(),
                };
                if def.required {
                    return Err(missing());
                }
                tracing::debug!(
                    section,
                    key = %def.key_name,
                    "Config value not found, using default"
                );
                def.default_value().ok_or_else(missing)
            }
        }
    }

    fn group_node(&self, def: &GroupDef) -> Arc<dyn ConfigNode> {
        lock(&self.groups)
            .entry(def.attribute.clone())
            .or_insert_with(|| {
                tracing::debug!(
                    parent = %self.schema.name(),
                    group = %def.attribute,
                    "Building config group"
                );
                (def.build)(self.provider.clone())
            })
            .clone()
    }

    /// Groups built so far, in declaration order.
    pub(crate) fn instantiated_groups(&self) -> Vec<Arc<dyn ConfigNode>> {
        let groups = lock(&self.groups);
        self.schema
            .groups()
            .filter_map(|def| groups.get(&def.attribute).cloned())
            .collect()
    }

    /// Resolve every key, then every group recursively.
    pub(crate) fn resolve_all(&self) -> Result<()> {
        for def in self.schema.keys() {
            self.value(def)?;
        }
        for def in self.schema.groups() {
            self.group_node(def).node_core().resolve_all()?;
        }
        Ok(())
    }

    pub(crate) fn apply_overrides(&self, overrides: Overrides, path: &str) -> Result<()> {
        self.check_overrides(&overrides, path)?;
        self.store_overrides(overrides);
        Ok(())
    }

    fn check_overrides(&self, overrides: &Overrides, path: &str) -> Result<()> {
        for (attribute, entry) in overrides.iter() {
            let location = join_path(path, attribute);
            match (self.schema.entry(attribute), entry) {
                (Some(Entry::Key(def)), Override::Value(value)) => {
                    if !def.accepts(value) {
                        return Err(invalid_override(
                            &location,
                            format!("expected a value of type {}", def.type_name),
                        ));
                    }
                }
                (Some(Entry::Key(_)), Override::Group(_)) => {
                    return Err(invalid_override(&location, "a mapping cannot override a key"));
                }
                (Some(Entry::Group(def)), Override::Group(nested)) => {
                    self.group_node(def)
                        .node_core()
                        .check_overrides(nested, &location)?;
                }
                (Some(Entry::Group(_)), Override::Value(_)) => {
                    return Err(invalid_override(
                        &location,
                        "a group can only be overridden with a mapping of its keys",
                    ));
                }
                (None, _) => {
                    return Err(invalid_override(&location, "no key or group with this name"));
                }
            }
        }
        Ok(())
    }

    fn store_overrides(&self, overrides: Overrides) {
        for (attribute, entry) in overrides {
            match (self.schema.entry(&attribute), entry) {
                (Some(Entry::Key(_)), Override::Value(value)) => {
                    lock(&self.values).insert(attribute, value);
                }
                (Some(Entry::Group(def)), Override::Group(nested)) => {
                    self.group_node(def).node_core().store_overrides(nested);
                }
                _ => {}
            }
        }
    }

    /// Forget resolved values here and in every built group.
    pub(crate) fn clear_cache(&self) {
        lock(&self.values).clear();
        for group in self.instantiated_groups() {
            group.node_core().clear_cache();
        }
    }

    pub(crate) fn describe(&self) -> Result<String> {
        let mut parts = Vec::new();
        for entry in self.schema.entries() {
            match entry {
                Entry::Key(def) => {
                    let value = self.value(def)?;
                    parts.push(format!("{}={}", def.attribute, def.render(&value)));
                }
                Entry::Group(def) => {
                    let nested = self.group_node(def).node_core().describe()?;
                    parts.push(format!("{}={}", def.attribute, nested));
                }
            }
        }
        Ok(format!("{}({})", self.schema.name(), parts.join(", ")))
    }
}

impl fmt::Debug for ConfigCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigCore")
            .field("schema", &self.schema.name())
            .field("resolved", &lock(&self.values).len())
            .field("groups", &lock(&self.groups).len())
            .finish()
    }
}
