//! PostgreSQL-backed stores.
//!
//! The SQL lives in free functions generic over [`sqlx::Executor`], so the
//! pool-backed store and the transaction-scoped one run exactly the same
//! statements.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool, Postgres, Transaction};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::ArticleStore;
use crate::article::{Article, ArticleId, NewArticle};
use crate::config::DatabaseConfig;
use crate::error::Result;

const SELECT_ONE: &str = "\
    SELECT articles.id, articles.title, articles.content, authors.name AS author \
    FROM articles JOIN authors ON authors.id = articles.author_id \
    WHERE articles.id = $1";

const SELECT_ALL: &str = "\
    SELECT articles.id, articles.title, articles.content, authors.name AS author \
    FROM articles JOIN authors ON authors.id = articles.author_id \
    ORDER BY articles.id";

// One statement, so the author row never outlives a failed article insert.
const INSERT: &str = "\
    WITH author AS (INSERT INTO authors (name) VALUES ($1) RETURNING id) \
    INSERT INTO articles (title, content, author_id) \
    VALUES ($2, $3, (SELECT id FROM author)) \
    RETURNING id";

/// Opens a connection pool for `config`.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .connect_with(config.connect_options()?)
        .await?;
    info!(host = %config.host, database = %config.name, "connected to postgres");
    Ok(pool)
}

/// `true` when the database answers a trivial query.
pub async fn ping(pool: &PgPool) -> bool {
    match sqlx::query("SELECT 1").execute(pool).await {
        Ok(_) => true,
        Err(e) => {
            debug!("database ping failed: {e}");
            false
        }
    }
}

async fn select_one<'e, E>(executor: E, id: i32) -> sqlx::Result<Option<Article>>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as::<_, Article>(SELECT_ONE)
        .bind(id)
        .fetch_optional(executor)
        .await
}

async fn select_all<'e, E>(executor: E) -> sqlx::Result<Vec<Article>>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as::<_, Article>(SELECT_ALL)
        .fetch_all(executor)
        .await
}

async fn insert<'e, E>(executor: E, article: &NewArticle) -> sqlx::Result<ArticleId>
where
    E: Executor<'e, Database = Postgres>,
{
    let (id,): (i32,) = sqlx::query_as(INSERT)
        .bind(&article.author)
        .bind(&article.title)
        .bind(&article.content)
        .fetch_one(executor)
        .await?;
    Ok(ArticleId { id })
}

// ── Pool-backed store ─────────────────────────────────────────────────────────

/// The production store: every call checks a connection out of the pool.
#[derive(Clone, Debug)]
pub struct PgArticleStore {
    pool: PgPool,
}

impl PgArticleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ArticleStore for PgArticleStore {
    async fn get(&self, id: i32) -> Result<Option<Article>> {
        Ok(select_one(&self.pool, id).await?)
    }

    async fn get_all(&self) -> Result<Vec<Article>> {
        Ok(select_all(&self.pool).await?)
    }

    async fn post(&self, article: &NewArticle) -> Result<ArticleId> {
        Ok(insert(&self.pool, article).await?)
    }
}

// ── Transaction-scoped store ──────────────────────────────────────────────────

/// A store whose every statement runs inside one open transaction.
///
/// Nothing it writes is visible to other connections, and nothing persists
/// unless [`commit`](PgTxArticleStore::commit) is called. Dropping it rolls
/// back. Calls are serialized on the transaction's single connection.
pub struct PgTxArticleStore {
    tx: Mutex<Transaction<'static, Postgres>>,
}

impl PgTxArticleStore {
    pub async fn begin(pool: &PgPool) -> Result<Self> {
        Ok(Self { tx: Mutex::new(pool.begin().await?) })
    }

    /// Runs a raw statement inside the transaction, e.g. to seed fixtures.
    pub async fn execute(&self, sql: &str) -> Result<()> {
        let mut tx = self.tx.lock().await;
        sqlx::raw_sql(sql).execute(&mut **tx).await?;
        Ok(())
    }

    pub async fn commit(self) -> Result<()> {
        Ok(self.tx.into_inner().commit().await?)
    }

    pub async fn rollback(self) -> Result<()> {
        Ok(self.tx.into_inner().rollback().await?)
    }
}

#[async_trait]
impl ArticleStore for PgTxArticleStore {
    async fn get(&self, id: i32) -> Result<Option<Article>> {
        let mut tx = self.tx.lock().await;
        Ok(select_one(&mut **tx, id).await?)
    }

    async fn get_all(&self) -> Result<Vec<Article>> {
        let mut tx = self.tx.lock().await;
        Ok(select_all(&mut **tx).await?)
    }

    async fn post(&self, article: &NewArticle) -> Result<ArticleId> {
        let mut tx = self.tx.lock().await;
        Ok(insert(&mut **tx, article).await?)
    }
}
