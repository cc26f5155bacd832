//! Error types for configuration resolution.
//!
//! Responsibilities:
//! - Define error variants for schema definition, source construction, and value resolution.
//! - Carry the section/key identity of every failed lookup or cast.
//!
//! Does NOT handle:
//! - Cast helper failures themselves (see `casts.rs`); those are boxed into `ConfigError::Cast`.
//!
//! Invariants:
//! - Errors are returned synchronously to the caller; nothing in this crate logs and continues.
//! - Dotenv errors NEVER include raw .env line contents to prevent secret leakage.

use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

/// Boxed error produced by a cast function.
pub type CastError = Box<dyn std::error::Error + Send + Sync>;

/// Convenience alias used throughout the crate.
pub type Result<T, E = ConfigError> = std::result::Result<T, E>;

/// Errors that can occur while declaring, sourcing, or resolving configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The schema itself is wrong. Raised when the schema instance is constructed.
    #[error("Invalid definition of {schema}.{attribute}: {message}")]
    Definition {
        schema: String,
        attribute: String,
        message: String,
    },

    #[error("Config parameter {section}.{key} not found")]
    MissingRequired { section: String, key: String },

    #[error("Invalid value for {section}.{key}: {source}")]
    Cast {
        section: String,
        key: String,
        #[source]
        source: CastError,
    },

    #[error("Could not find config file {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Failed to read config file at {}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse INI document {origin} at line {line}: {kind}")]
    IniParse {
        origin: String,
        line: usize,
        kind: IniErrorKind,
    },

    /// Failed to parse a `.env` file.
    ///
    /// SAFETY: only the byte index of the failure is kept, never the offending line.
    #[error(
        "Failed to parse .env file at position {error_index}. Hint: set DOTENV_DISABLED=1 to skip .env loading"
    )]
    DotenvParse { error_index: usize },

    #[error("Failed to read .env file: {kind}")]
    DotenvIo { kind: ErrorKind },

    #[error("Failed to load .env file. Hint: set DOTENV_DISABLED=1 to skip .env loading")]
    DotenvUnknown,

    #[error("ConfigProvider did not find the supplied old source to replace: {0}")]
    UnknownSource(String),

    #[error("Invalid post-read override for {path}: {message}")]
    InvalidOverride { path: String, message: String },

    #[error("{attribute} holds a value of type {actual}, not {expected}")]
    TypeMismatch {
        attribute: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("No key or group named {0} is registered on this config")]
    UnknownAttribute(String),
}

/// Reasons an INI document is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IniErrorKind {
    #[error("key found before any [section] header")]
    MissingSectionHeader,

    #[error("malformed section header {0:?}")]
    MalformedHeader(String),

    #[error("section [{0}] already exists")]
    DuplicateSection(String),

    #[error("key {key:?} already exists in section [{section}]")]
    DuplicateKey { section: String, key: String },

    #[error("expected `key = value` or `key: value`, found {0:?}")]
    MissingDelimiter(String),
}

impl ConfigError {
    /// Returns `(section, key)` for errors tied to a single configuration value.
    pub fn value_location(&self) -> Option<(&str, &str)> {
        match self {
            ConfigError::MissingRequired { section, key } | ConfigError::Cast { section, key, .. } => {
                Some((section.as_str(), key.as_str()))
            }
            _ => None,
        }
    }
}
