//! Typed configuration access.
//!
//! Declare a schema of typed keys grouped into sections, then resolve them
//! from an ordered list of sources (environment variables, INI documents,
//! in-memory mappings or your own [`ConfigSource`]). The first source that
//! has a value wins.
//!
//! ```
//! use std::sync::Arc;
//! use typed_config::{Config, EnvironmentConfigSource, IniStringConfigSource, key, typed_config};
//!
//! typed_config! {
//!     pub struct Server [section = "server"] {
//!         key host: String = key(),
//!         key port: u16 = key().parse::<u16>(),
//!     }
//! }
//!
//! let server = Server::new().unwrap();
//! server.add_source(Arc::new(EnvironmentConfigSource::with_prefix("DOCTEST")));
//! server.add_source(Arc::new(
//!     IniStringConfigSource::new("[server]\nhost = localhost\nport = 8080\n").unwrap(),
//! ));
//! server.read().unwrap();
//! assert_eq!(server.port().unwrap(), 8080);
//! ```

pub mod casts;
pub mod constants;
mod error;
mod key;
#[macro_use]
mod macros;
mod provider;
mod schema;
pub mod source;

pub use error::{CastError, ConfigError, IniErrorKind, Result};
pub use key::{Key, key};
pub use provider::ConfigProvider;
pub use schema::{Config, ConfigCore, Override, Overrides, PostReadHook, Schema};
pub use source::{
    ConfigSource, DictConfigSource, EnvironmentConfigSource, IniFileConfigSource,
    IniStringConfigSource, SharedSource, normalize_name,
};

#[cfg(test)]
pub(crate) mod test_util;
