//! Layered configuration demo.
//!
//! Resolves a small service config from, in priority order:
//! 1. `DEMO_*` environment variables (after loading `.env` if present),
//! 2. `local.ini` next to the working directory, if it exists,
//! 3. built-in defaults held in an in-memory source.
//!
//! Run with `RUST_LOG=typed_config=debug` to watch each lookup.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use typed_config::casts::{self, ListCast};
use typed_config::{
    Config, ConfigCore, DictConfigSource, EnvironmentConfigSource, IniFileConfigSource,
    Overrides, key, typed_config,
};

typed_config! {
    struct Database [section = "database"] {
        key host: String = key(),
        key port: u16 = key().parse::<u16>().required(false).default_value(5432),
    }
}

typed_config! {
    struct Service [section = "service"] [post_read = derive_port] {
        key name: String = key(),
        key use_https: bool = key().cast(casts::boolean).required(false).default_value(false),
        key http_port: Option<u16> = key().parse::<u16>().optional(),
        key admins: Vec<String> = key()
            .cast(casts::list(casts::identity, ListCast::new()))
            .required(false)
            .default_value(Vec::new()),
        group database: Database,
    }
}

impl Service {
    fn derive_port(core: &ConfigCore) -> typed_config::Result<Overrides> {
        if core.get::<Option<u16>>("http_port")?.is_some() {
            return Ok(Overrides::new());
        }
        let port = if core.get::<bool>("use_https")? { 443u16 } else { 80u16 };
        Ok(Overrides::new().set("http_port", Some(port)))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let defaults = DictConfigSource::default()
        .with_value("service", "name", "demo")
        .with_value("database", "host", "localhost");

    let service = Service::new()?;
    service.add_source(Arc::new(
        EnvironmentConfigSource::with_prefix("demo")
            .load_dotenv()
            .context("Failed to load .env")?,
    ));
    service.add_source(Arc::new(
        IniFileConfigSource::optional("local.ini").context("Failed to read local.ini")?,
    ));
    service.add_source(Arc::new(defaults));

    service.read().context("Invalid configuration")?;
    let name = service.name()?;
    tracing::info!(service = %name, "Configuration loaded");

    println!("{}", service.describe()?);
    if let Some(port) = service.http_port()? {
        let scheme = if service.use_https()? { "https" } else { "http" };
        println!("listening on {}://0.0.0.0:{}", scheme, port);
    }
    for admin in service.admins()? {
        println!("admin: {}", admin);
    }
    let database = service.database()?;
    println!("database at {}:{}", database.host()?, database.port()?);
    Ok(())
}
