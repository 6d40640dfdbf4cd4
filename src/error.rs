//! Unified error type.

use thiserror::Error;

/// The error type returned by the crate's fallible infrastructure.
///
/// Application-level outcomes (400, 404, 422, ...) are expressed as HTTP
/// [`Response`](crate::Response) values by the resource layer. This type
/// surfaces the failures underneath: binding a port, talking to PostgreSQL,
/// loading configuration.
#[derive(Debug, Error)]
pub enum Error {
    /// Socket bind or accept failure.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// The configured listen address is not a valid `host:port`.
    #[error("invalid listen address: {0}")]
    Addr(#[from] std::net::AddrParseError),

    /// Query, pool or connection failure.
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration could not be loaded or deserialized.
    #[error("config: {0}")]
    Config(#[from] ::config::ConfigError),

    /// The in-memory store has handed out every positive `i32`.
    #[error("{table} ids exhausted")]
    IdsExhausted { table: &'static str },
}

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;
