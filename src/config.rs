//! Layered configuration.
//!
//! Sources, lowest priority first:
//! 1. Built-in defaults
//! 2. Config file: `config/articles.{toml,...}` when present, or the path
//!    given on the command line (then required)
//! 3. `DATABASE_URL`, if set
//! 4. `ARTICLES_*` environment variables, `__` between nesting levels
//!    (e.g. `ARTICLES_SERVER__ADDR=0.0.0.0:8080`,
//!    `ARTICLES_DATABASE__HOST=db`)

use std::env;
use std::path::Path;
use std::time::Duration;

use config::{
    Config, ConfigBuilder, ConfigError, Environment, File, Map, Source, Value, builder::DefaultState,
};
use serde::Deserialize;
use sqlx::postgres::{PgConnectOptions, PgSslMode};

use crate::error::Result;

const DEFAULT_FILE: &str = "config/articles";
const ENV_PREFIX: &str = "ARTICLES";

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Listener and routing
    pub server: ServerConfig,
    /// PostgreSQL connection and pool
    pub database: DatabaseConfig,
    pub log: LogConfig,
}

impl Settings {
    /// Loads settings from every source, `path` replacing the default file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_FILE).required(false),
        };

        let builder = Config::builder()
            .add_source(file)
            .add_source(DatabaseUrl(env::var("DATABASE_URL").ok()))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            );

        Self::from_builder(builder)
    }

    pub(crate) fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        Ok(builder.build()?.try_deserialize()?)
    }
}

/// `DATABASE_URL` as a source of its own, so it sits between the file and
/// the prefixed environment.
#[derive(Clone, Debug)]
struct DatabaseUrl(Option<String>);

impl Source for DatabaseUrl {
    fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
        Box::new(self.clone())
    }

    fn collect(&self) -> std::result::Result<Map<String, Value>, ConfigError> {
        let mut map = Map::new();
        if let Some(url) = &self.0 {
            let origin = "DATABASE_URL".to_owned();
            map.insert("database.url".to_owned(), Value::new(Some(&origin), url.as_str()));
        }
        Ok(map)
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// `host:port` to listen on; must be an IP literal.
    pub addr: String,
    /// Prefix for the article routes, e.g. `/api/v1`. Empty mounts them at
    /// the root.
    pub base_path: String,
    /// Per-request deadline; 0 disables it.
    pub request_timeout_secs: u64,
    /// How long shutdown waits for open connections.
    pub drain_timeout_secs: u64,
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_secs(self.drain_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8080".to_owned(),
            base_path: String::new(),
            request_timeout_secs: 15,
            drain_timeout_secs: 10,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Full DSN. When set, the individual parts below are ignored.
    pub url: Option<String>,
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub ssl_mode: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl DatabaseConfig {
    /// Connection options for the pool. Credentials are passed as-is, never
    /// through a URL, so they need no escaping.
    pub fn connect_options(&self) -> Result<PgConnectOptions> {
        if let Some(url) = &self.url {
            return Ok(url.parse()?);
        }
        let ssl_mode: PgSslMode = self.ssl_mode.parse()?;
        Ok(PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name)
            .ssl_mode(ssl_mode))
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            user: "postgres".to_owned(),
            password: "postgres".to_owned(),
            host: "localhost".to_owned(),
            port: 5432,
            name: "library".to_owned(),
            ssl_mode: "disable".to_owned(),
            max_connections: 10,
            acquire_timeout_secs: 5,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing` filter directive; `RUST_LOG` overrides it.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "info".to_owned() }
    }
}
