//! Config schemas.
//!
//! Responsibilities:
//! - Register keys and groups under attribute names (`Schema`).
//! - Define the `Config` trait that user schema types implement, with the
//!   provider-facing operations (`add_source`, `read`, `clear_cache`, ...).
//! - Validate a schema tree when a root config is constructed.
//!
//! Does NOT handle:
//! - Per-instance resolution and caching (see `instance.rs`).
//!
//! Invariants:
//! - Attribute order is declaration order; an attribute shadowing one inherited via
//!   `extend` takes its place. Registering the same attribute twice is a definition error.
//! - Post-read hooks inherited via `extend` run before the schema's own, and their
//!   overrides are merged so the most-derived value wins.
//! - Definition errors are raised at construction, before any source is consulted.

mod instance;
mod overrides;

#[cfg(test)]
mod tests;

pub use instance::ConfigCore;
pub use overrides::{Override, Overrides};

use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::sync::Arc;

use crate::error::{ConfigError, Result};
use crate::key::{Key, KeyDef};
use crate::provider::ConfigProvider;
use crate::source::SharedSource;

/// A user-declared configuration type.
///
/// Implementors hold a [`ConfigCore`] and describe themselves with [`Config::schema`].
/// The [`typed_config!`](crate::typed_config) macro writes all of this for you.
pub trait Config: Send + Sync + Sized + 'static {
    /// The keys and groups of this type.
    fn schema() -> Schema;

    /// Wrap freshly built state. Called by the constructors and by parent groups.
    fn from_core(core: ConfigCore) -> Self;

    fn core(&self) -> &ConfigCore;

    /// Derive or adjust values after a successful [`read`](Config::read).
    ///
    /// Runs after the hooks registered with [`Schema::post_read`] and wins over
    /// them on conflicting keys. Unlike those, it is not inherited by schemas
    /// that extend this type's schema.
    fn post_read_hook(&self) -> Result<Overrides> {
        Ok(Overrides::new())
    }

    /// Build with a fresh provider that has no sources.
    fn new() -> Result<Self> {
        Self::with_provider(ConfigProvider::new())
    }

    /// Build with a fresh provider holding `sources` in priority order.
    fn with_sources(sources: impl IntoIterator<Item = SharedSource>) -> Result<Self> {
        Self::with_provider(ConfigProvider::with_sources(sources))
    }

    /// Build on a shared provider.
    ///
    /// # Errors
    ///
    /// `ConfigError::Definition` if any key in the schema tree has no section,
    /// an optional key has no default, or an attribute is registered twice.
    fn with_provider(provider: ConfigProvider) -> Result<Self> {
        let schema = Self::schema();
        schema.validate()?;
        Ok(Self::from_core(ConfigCore::new(schema, provider)))
    }

    fn provider(&self) -> &ConfigProvider {
        self.core().provider()
    }

    fn config_sources(&self) -> Vec<SharedSource> {
        self.provider().config_sources()
    }

    fn add_source(&self, source: SharedSource) {
        self.provider().add_source(source);
    }

    fn set_sources(&self, sources: impl IntoIterator<Item = SharedSource>) {
        self.provider().set_sources(sources);
    }

    fn replace_source(&self, old: &SharedSource, new: SharedSource) -> Result<()> {
        self.provider().replace_source(old, new)
    }

    /// Resolve every key and group now, then apply post-read hooks.
    ///
    /// The eager pass covers the whole group tree before any hook runs, so a
    /// missing or invalid value aborts with no overrides applied.
    fn read(&self) -> Result<()> {
        self.core().resolve_all()?;
        apply_post_read_hooks(self)
    }

    /// Forget every resolved value, here and in instantiated groups, and the
    /// provider's raw cache.
    fn clear_cache(&self) {
        self.provider().clear_cache();
        self.core().clear_cache();
    }

    /// Key attribute names in declaration order.
    fn registered_keys(&self) -> Vec<&str> {
        self.core().schema().key_names()
    }

    /// Group attribute names in declaration order.
    fn registered_groups(&self) -> Vec<&str> {
        self.core().schema().group_names()
    }

    /// Render every value, e.g. `Server(host="a", database=Database(port=5432))`.
    fn describe(&self) -> Result<String> {
        self.core().describe()
    }
}

/// Object-safe view of a config, used for groups.
pub(crate) trait ConfigNode: Send + Sync {
    fn node_core(&self) -> &ConfigCore;
    fn node_post_read_hook(&self) -> Result<Overrides>;
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<C: Config> ConfigNode for C {
    fn node_core(&self) -> &ConfigCore {
        self.core()
    }

    fn node_post_read_hook(&self) -> Result<Overrides> {
        self.post_read_hook()
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Top-down: a node's own overrides first, then its groups', so a
/// descendant's hook has the last word on its own keys.
///
/// Within one node the schema hooks run base first and the type's
/// `post_read_hook` last; later overrides win the merge.
fn apply_post_read_hooks(node: &dyn ConfigNode) -> Result<()> {
    let core = node.node_core();
    let mut overrides = Overrides::new();
    for hook in core.schema().hooks() {
        overrides = overrides.merge(hook(core)?);
    }
    let overrides = overrides.merge(node.node_post_read_hook()?);
    if !overrides.is_empty() {
        tracing::debug!(
            schema = core.schema().name(),
            count = overrides.len(),
            "Applying post-read overrides"
        );
        core.apply_overrides(overrides, "")?;
    }
    for group in core.instantiated_groups() {
        apply_post_read_hooks(group.as_ref())?;
    }
    Ok(())
}

/// A post-read hook registered with [`Schema::post_read`].
///
/// Receives the instance's state after the eager pass; read values with
/// [`ConfigCore::get`] and [`ConfigCore::group`].
pub type PostReadHook = fn(&ConfigCore) -> Result<Overrides>;

/// A registered group.
#[derive(Clone)]
pub(crate) struct GroupDef {
    pub(crate) attribute: String,
    pub(crate) value_type: TypeId,
    pub(crate) type_name: &'static str,
    pub(crate) schema: fn() -> Schema,
    pub(crate) build: fn(ConfigProvider) -> Arc<dyn ConfigNode>,
}

fn build_group<C: Config>(provider: ConfigProvider) -> Arc<dyn ConfigNode> {
    Arc::new(C::from_core(ConfigCore::new(C::schema(), provider)))
}

#[derive(Clone)]
pub(crate) enum Entry {
    Key(KeyDef),
    Group(GroupDef),
}

impl Entry {
    fn attribute(&self) -> &str {
        match self {
            Entry::Key(def) => &def.attribute,
            Entry::Group(def) => &def.attribute,
        }
    }
}

/// The registered keys and groups of a config type.
///
/// ```
/// use typed_config::{Schema, key};
///
/// let schema = Schema::new("ServerConfig")
///     .section("server")
///     .key("host", key())
///     .key("port", key().parse::<u16>());
/// assert_eq!(schema.key_names(), vec!["host", "port"]);
/// ```
#[derive(Clone)]
pub struct Schema {
    name: String,
    section_name: Option<String>,
    entries: Vec<Entry>,
    // Attributes registered directly on this schema, not inherited via `extend`.
    own: Vec<String>,
    duplicates: Vec<String>,
    // Least-derived first.
    hooks: Vec<PostReadHook>,
}

impl Schema {
    /// An empty schema. `name` is used in errors and in `describe()`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            section_name: None,
            entries: Vec::new(),
            own: Vec::new(),
            duplicates: Vec::new(),
            hooks: Vec::new(),
        }
    }

    /// Section used by every key that does not name its own.
    pub fn section(mut self, section_name: impl Into<String>) -> Self {
        self.section_name = Some(section_name.into());
        self
    }

    /// Register a key under `attribute`. Its key name defaults to `attribute`.
    pub fn key<T>(mut self, attribute: &str, key: Key<T>) -> Self
    where
        T: Clone + fmt::Debug + Send + Sync + 'static,
    {
        self.register(Entry::Key(key.into_def(attribute)));
        self
    }

    /// Register a nested config of type `C` under `attribute`.
    pub fn group<C: Config>(mut self, attribute: &str) -> Self {
        self.register(Entry::Group(GroupDef {
            attribute: attribute.to_string(),
            value_type: TypeId::of::<C>(),
            type_name: type_name::<C>(),
            schema: C::schema,
            build: build_group::<C>,
        }));
        self
    }

    /// Run `hook` after a successful `read()` of any config using this schema.
    pub fn post_read(mut self, hook: PostReadHook) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Start from `base`'s attributes; this schema's own registrations shadow them.
    ///
    /// The base's section tag is inherited unless this schema set its own.
    /// The base's post-read hooks are inherited too and run before this
    /// schema's, so on a conflicting key this schema's override wins.
    pub fn extend(mut self, base: Schema) -> Self {
        if self.section_name.is_none() {
            self.section_name = base.section_name;
        }
        self.duplicates.extend(base.duplicates);
        let own_hooks = std::mem::replace(&mut self.hooks, base.hooks);
        self.hooks.extend(own_hooks);
        let own = std::mem::replace(&mut self.entries, base.entries);
        for entry in own {
            self.insert(entry);
        }
        self
    }

    fn register(&mut self, entry: Entry) {
        let attribute = entry.attribute().to_string();
        if self.own.contains(&attribute) {
            self.duplicates.push(attribute);
        } else {
            self.own.push(attribute);
        }
        self.insert(entry);
    }

    fn insert(&mut self, entry: Entry) {
        match self
            .entries
            .iter_mut()
            .find(|existing| existing.attribute() == entry.attribute())
        {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn section_name(&self) -> Option<&str> {
        self.section_name.as_deref()
    }

    pub fn key_names(&self) -> Vec<&str> {
        self.keys().map(|def| def.attribute.as_str()).collect()
    }

    pub fn group_names(&self) -> Vec<&str> {
        self.groups().map(|def| def.attribute.as_str()).collect()
    }

    pub(crate) fn hooks(&self) -> &[PostReadHook] {
        &self.hooks
    }

    pub(crate) fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub(crate) fn keys(&self) -> impl Iterator<Item = &KeyDef> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Key(def) => Some(def),
            Entry::Group(_) => None,
        })
    }

    pub(crate) fn groups(&self) -> impl Iterator<Item = &GroupDef> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Group(def) => Some(def),
            Entry::Key(_) => None,
        })
    }

    pub(crate) fn entry(&self, attribute: &str) -> Option<&Entry> {
        self.entries
            .iter()
            .find(|entry| entry.attribute() == attribute)
    }

    pub(crate) fn key_def(&self, attribute: &str) -> Option<&KeyDef> {
        self.keys().find(|def| def.attribute == attribute)
    }

    pub(crate) fn group_def(&self, attribute: &str) -> Option<&GroupDef> {
        self.groups().find(|def| def.attribute == attribute)
    }

    /// Section a key resolves in: its own, else this schema's.
    pub(crate) fn section_for<'a>(&'a self, def: &'a KeyDef) -> Result<&'a str> {
        def.section_name
            .as_deref()
            .or(self.section_name.as_deref())
            .ok_or_else(|| self.definition_error(&def.attribute, "no section name on the key or the schema"))
    }

    fn definition_error(&self, attribute: &str, message: &str) -> ConfigError {
        ConfigError::Definition {
            schema: self.name.clone(),
            attribute: attribute.to_string(),
            message: message.to_string(),
        }
    }

    /// Check this schema and every nested group schema.
    pub fn validate(&self) -> Result<()> {
        if let Some(attribute) = self.duplicates.first() {
            return Err(self.definition_error(attribute, "registered more than once"));
        }
        for def in self.keys() {
            self.section_for(def)?;
            if !def.required && def.default_value().is_none() {
                return Err(self.definition_error(
                    &def.attribute,
                    "optional key has no default; use `optional()` or `default_value()`",
                ));
            }
        }
        for group in self.groups() {
            (group.schema)().validate()?;
        }
        Ok(())
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("section_name", &self.section_name)
            .field("keys", &self.key_names())
            .field("groups", &self.group_names())
            .field("hooks", &self.hooks.len())
            .finish()
    }
}
