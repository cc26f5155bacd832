//! Key descriptors.
//!
//! Responsibilities:
//! - Describe one typed configuration value: section, key name, cast, required flag, default.
//! - Erase the value type so a schema can hold keys of different types side by side.
//!
//! Does NOT handle:
//! - Looking values up or caching them (see `schema/instance.rs`).
//!
//! Invariants:
//! - The default is stored already typed and is never passed through the cast.
//! - `cast` replaces any previous cast and drops any previous default, since the type changes.

use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::CastError;

/// A resolved value as stored in a config's cache.
pub(crate) type Value = Arc<dyn Any + Send + Sync>;

type CastFn<T> = Arc<dyn Fn(&str) -> Result<T, CastError> + Send + Sync>;

/// A string key with the identity cast. Start here and refine with the builder methods.
///
/// ```
/// use typed_config::key;
///
/// let port = key().section("server").parse::<u16>().default_value(8080).required(false);
/// # let _ = port;
/// ```
pub fn key() -> Key<String> {
    Key::new()
}

/// Declarative description of a typed configuration value.
pub struct Key<T> {
    section_name: Option<String>,
    key_name: Option<String>,
    required: bool,
    cast: CastFn<T>,
    default: Option<T>,
}

impl Key<String> {
    /// A required string key whose section and name come from the schema.
    pub fn new() -> Self {
        Self {
            section_name: None,
            key_name: None,
            required: true,
            cast: Arc::new(|raw: &str| Ok::<_, CastError>(raw.to_string())),
            default: None,
        }
    }
}

impl Default for Key<String> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Key<T>
where
    T: Send + Sync + 'static,
{
    /// Section to read from, overriding the schema's section tag.
    pub fn section(mut self, section_name: impl Into<String>) -> Self {
        self.section_name = Some(section_name.into());
        self
    }

    /// Key name to read, overriding the attribute name.
    pub fn key_name(mut self, key_name: impl Into<String>) -> Self {
        self.key_name = Some(key_name.into());
        self
    }

    /// Whether a missing value is an error (the default) or falls back to the default value.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Value used when the key is not required and no source has it. Not cast.
    pub fn default_value(mut self, default: T) -> Self {
        self.default = Some(default);
        self
    }

    /// Convert raw strings with `cast`, changing the key's value type.
    pub fn cast<U, E, F>(self, cast: F) -> Key<U>
    where
        U: 'static,
        F: Fn(&str) -> Result<U, E> + Send + Sync + 'static,
        E: Into<CastError> + 'static,
    {
        Key {
            section_name: self.section_name,
            key_name: self.key_name,
            required: self.required,
            cast: Arc::new(move |raw: &str| cast(raw).map_err(Into::<CastError>::into)),
            default: None,
        }
    }

    /// Convert raw strings with `U::from_str`.
    pub fn parse<U>(self) -> Key<U>
    where
        U: FromStr + Send + Sync + 'static,
        U::Err: Into<CastError> + 'static,
    {
        self.cast(|raw: &str| raw.parse::<U>())
    }

    /// Make the key optional: absent values resolve to `None`, present ones to `Some`.
    ///
    /// An existing default becomes `Some(default)`.
    pub fn optional(self) -> Key<Option<T>> {
        let cast = self.cast;
        Key {
            section_name: self.section_name,
            key_name: self.key_name,
            required: false,
            cast: Arc::new(move |raw: &str| cast(raw).map(Some)),
            default: Some(self.default),
        }
    }
}

impl<T> Key<T>
where
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    pub(crate) fn into_def(self, attribute: &str) -> KeyDef {
        let cast = self.cast;
        KeyDef {
            attribute: attribute.to_string(),
            section_name: self.section_name,
            key_name: self.key_name.unwrap_or_else(|| attribute.to_string()),
            required: self.required,
            value_type: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            cast: Arc::new(move |raw: &str| cast(raw).map(|value| Arc::new(value) as Value)),
            default: self.default.map(|value| Arc::new(value) as Value),
            accepts: accepts::<T>,
            render: render::<T>,
        }
    }
}

impl<T> fmt::Debug for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("section_name", &self.section_name)
            .field("key_name", &self.key_name)
            .field("required", &self.required)
            .field("type", &type_name::<T>())
            .field("has_default", &self.default.is_some())
            .finish()
    }
}

fn accepts<T: Any>(value: &Value) -> bool {
    value.is::<T>()
}

fn render<T: fmt::Debug + 'static>(value: &Value) -> String {
    value
        .downcast_ref::<T>()
        .map(|value| format!("{:?}", value))
        .unwrap_or_default()
}

/// Type-erased key held by a schema.
#[derive(Clone)]
pub(crate) struct KeyDef {
    pub(crate) attribute: String,
    pub(crate) section_name: Option<String>,
    pub(crate) key_name: String,
    pub(crate) required: bool,
    pub(crate) value_type: TypeId,
    pub(crate) type_name: &'static str,
    cast: Arc<dyn Fn(&str) -> Result<Value, CastError> + Send + Sync>,
    default: Option<Value>,
    accepts: fn(&Value) -> bool,
    render: fn(&Value) -> String,
}

impl KeyDef {
    pub(crate) fn cast(&self, raw: &str) -> Result<Value, CastError> {
        (self.cast)(raw)
    }

    pub(crate) fn default_value(&self) -> Option<Value> {
        self.default.clone()
    }

    /// Whether `value` has this key's value type.
    pub(crate) fn accepts(&self, value: &Value) -> bool {
        (self.accepts)(value)
    }

    pub(crate) fn render(&self, value: &Value) -> String {
        (self.render)(value)
    }
}

impl fmt::Debug for KeyDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyDef")
            .field("attribute", &self.attribute)
            .field("section_name", &self.section_name)
            .field("key_name", &self.key_name)
            .field("required", &self.required)
            .field("type", &self.type_name)
            .finish()
    }
}
