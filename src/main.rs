//! `articles`: serve the API or manage the schema.
//!
//! ```text
//! articles serve
//! articles migrate            # up to latest
//! articles migrate down
//! articles migrate --reset    # down to 0, then up. All data is lost!
//! articles --config prod.toml serve
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use articles_library::store::postgres;
use articles_library::{PgArticleStore, Result, Server, Settings, api, health, migrate};

#[derive(Parser)]
#[command(name = "articles", version, about = "Articles REST service")]
struct Cli {
    /// Config file; defaults to config/articles.toml when present
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server
    Serve,
    /// Apply or revert schema migrations
    Migrate {
        #[arg(value_enum, default_value_t = Direction::Up)]
        direction: Direction,
        /// Migrate down to version 0 first. WARNING: all data will be lost!
        #[arg(long)]
        reset: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Direction {
    Up,
    Down,
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Command::Serve => serve(settings).await,
        Command::Migrate { direction, reset } => run_migrations(settings, direction, reset).await,
    }
}

async fn serve(settings: Settings) -> Result<()> {
    let pool = postgres::connect(&settings.database).await?;
    let store = Arc::new(PgArticleStore::new(pool.clone()));

    let app = api::router(store, &settings.server).get(
        "/readyz",
        health::readiness(move || {
            let pool = pool.clone();
            async move { postgres::ping(&pool).await }
        }),
    );

    let mut server = Server::bind(&settings.server.addr)?.drain_timeout(settings.server.drain_timeout());
    if let Some(limit) = settings.server.request_timeout() {
        server = server.request_timeout(limit);
    }
    server.serve(app).await
}

async fn run_migrations(settings: Settings, direction: Direction, reset: bool) -> Result<()> {
    let pool = postgres::connect(&settings.database).await?;

    if reset {
        migrate::reset(&pool).await?;
    }

    let version = match direction {
        Direction::Up => migrate::up(&pool).await?,
        Direction::Down => migrate::down(&pool).await?,
        Direction::Version => migrate::version(&pool).await?,
    };
    info!(version, latest = migrate::latest(), "schema version");

    pool.close().await;
    Ok(())
}
