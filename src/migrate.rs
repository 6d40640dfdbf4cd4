//! Embedded schema migrations.
//!
//! Each migration is a list of statements up and a list down, applied in its
//! own transaction and recorded in `schema_migrations`.

use sqlx::PgPool;
use tracing::info;

use crate::error::Result;

struct Migration {
    version: i64,
    name: &'static str,
    up: &'static [&'static str],
    down: &'static [&'static str],
}

const AUTHORS_TABLE: &str = "
CREATE TABLE authors (
    id SERIAL,
    name VARCHAR(255),

    PRIMARY KEY (id)
)";

const ARTICLES_TABLE: &str = "
CREATE TABLE articles (
    id SERIAL,
    title TEXT,
    content TEXT,
    author_id INT,

    PRIMARY KEY (id),
    FOREIGN KEY (author_id) REFERENCES authors (id)
)";

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial tables",
    up: &[AUTHORS_TABLE, ARTICLES_TABLE],
    down: &["DROP TABLE articles", "DROP TABLE authors"],
}];

const VERSION_TABLE: &str = "
CREATE TABLE IF NOT EXISTS schema_migrations (
    version BIGINT PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TIMESTAMPTZ NOT NULL DEFAULT now()
)";

/// Latest version this build knows about.
pub fn latest() -> i64 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

/// Current schema version; 0 when nothing has been applied.
pub async fn version(pool: &PgPool) -> Result<i64> {
    sqlx::query(VERSION_TABLE).execute(pool).await?;
    let (version,): (i64,) = sqlx::query_as("SELECT COALESCE(MAX(version), 0) FROM schema_migrations")
        .fetch_one(pool)
        .await?;
    Ok(version)
}

/// Applies every pending migration. Returns the resulting version.
pub async fn up(pool: &PgPool) -> Result<i64> {
    let current = version(pool).await?;

    for m in MIGRATIONS.iter().filter(|m| m.version > current) {
        info!(version = m.version, name = m.name, "applying migration");
        let mut tx = pool.begin().await?;
        for stmt in m.up {
            sqlx::query(stmt).execute(&mut *tx).await?;
        }
        sqlx::query("INSERT INTO schema_migrations (version, name) VALUES ($1, $2)")
            .bind(m.version)
            .bind(m.name)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
    }

    version(pool).await
}

/// Reverts the latest applied migration. Returns the resulting version.
pub async fn down(pool: &PgPool) -> Result<i64> {
    let current = version(pool).await?;

    if let Some(m) = MIGRATIONS.iter().find(|m| m.version == current) {
        info!(version = m.version, name = m.name, "reverting migration");
        let mut tx = pool.begin().await?;
        for stmt in m.down {
            sqlx::query(stmt).execute(&mut *tx).await?;
        }
        sqlx::query("DELETE FROM schema_migrations WHERE version = $1")
            .bind(m.version)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
    }

    version(pool).await
}

/// Reverts every applied migration. All data is lost.
pub async fn reset(pool: &PgPool) -> Result<()> {
    loop {
        let before = version(pool).await?;
        if before == 0 || down(pool).await? == before {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versions_strictly_increase() {
        let versions: Vec<i64> = MIGRATIONS.iter().map(|m| m.version).collect();
        assert!(versions.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(latest(), 1);
    }

    #[test]
    fn test_down_mirrors_up() {
        for m in MIGRATIONS {
            assert_eq!(m.up.len(), m.down.len(), "migration {}", m.version);
        }
    }
}
