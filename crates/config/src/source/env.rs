//! Environment variable source.
//!
//! Responsibilities:
//! - Map `(section, key)` to `{PREFIX_}{SECTION}_{KEY}` (upper-cased) and read it.
//! - Optionally seed the process environment from a `.env` file.
//!
//! Does NOT handle:
//! - Trimming or filtering values; an empty variable is an empty value, not a missing one.
//!
//! Invariants:
//! - The environment is read on every lookup, never snapshotted at construction.
//!   Changes made between lookups are visible (the provider cache still applies).
//! - Without a prefix, neither the prefix nor its separator appears in the name.
//! - The `DOTENV_DISABLED` variable is checked before `dotenvy` is called.

use std::path::Path;

use super::ConfigSource;
use crate::constants::{DOTENV_DISABLED_VAR, ENV_SEPARATOR};
use crate::error::{ConfigError, Result};

/// Reads configuration values from process environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentConfigSource {
    prefix: String,
}

impl EnvironmentConfigSource {
    /// A source without a prefix: `(server, port)` reads `SERVER_PORT`.
    pub fn new() -> Self {
        Self::default()
    }

    /// A source with a prefix: `(server, port)` reads `{PREFIX}_SERVER_PORT`.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The configured prefix (empty when none).
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The environment variable consulted for `(section, key)`.
    pub fn variable_name(&self, section_name: &str, key_name: &str) -> String {
        let mut name = String::with_capacity(
            self.prefix.len() + section_name.len() + key_name.len() + 2,
        );
        if !self.prefix.is_empty() {
            name.push_str(&self.prefix);
            name.push(ENV_SEPARATOR);
        }
        name.push_str(section_name);
        name.push(ENV_SEPARATOR);
        name.push_str(key_name);
        name.to_uppercase()
    }

    /// Check if dotenv loading is disabled via environment variable.
    fn dotenv_disabled() -> bool {
        matches!(
            std::env::var(DOTENV_DISABLED_VAR).ok().as_deref(),
            Some("true") | Some("1")
        )
    }

    /// Load variables from a `.env` file in the current directory, if present.
    ///
    /// Existing process variables are not overwritten. Missing files are
    /// silently ignored.
    ///
    /// # Errors
    ///
    /// `ConfigError::DotenvParse` / `ConfigError::DotenvIo` when the file exists
    /// but cannot be parsed or read.
    pub fn load_dotenv(self) -> Result<Self> {
        if Self::dotenv_disabled() {
            return Ok(self);
        }
        Self::map_dotenv(dotenvy::dotenv().map(|_| ()))?;
        Ok(self)
    }

    /// Like [`load_dotenv`](Self::load_dotenv), reading an explicit file path.
    pub fn load_dotenv_from(self, path: impl AsRef<Path>) -> Result<Self> {
        if Self::dotenv_disabled() {
            return Ok(self);
        }
        Self::map_dotenv(dotenvy::from_path(path.as_ref()))?;
        Ok(self)
    }

    fn map_dotenv(result: std::result::Result<(), dotenvy::Error>) -> Result<()> {
        match result {
            Ok(()) => Ok(()),
            Err(dotenvy::Error::Io(io_err)) if io_err.kind() == std::io::ErrorKind::NotFound => {
                Ok(())
            }
            Err(dotenvy::Error::LineParse(_, idx)) => {
                Err(ConfigError::DotenvParse { error_index: idx })
            }
            Err(dotenvy::Error::Io(io_err)) => Err(ConfigError::DotenvIo {
                kind: io_err.kind(),
            }),
            Err(_) => Err(ConfigError::DotenvUnknown),
        }
    }
}

impl ConfigSource for EnvironmentConfigSource {
    fn get_config_value(&self, section_name: &str, key_name: &str) -> Option<String> {
        // Non-unicode values are treated as unset.
        std::env::var(self.variable_name(section_name, key_name)).ok()
    }
}
