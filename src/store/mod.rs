//! Article persistence.
//!
//! [`ArticleStore`] is the seam between the HTTP resource and the database.
//! Handlers hold an `Arc<dyn ArticleStore>`, so tests swap in
//! [`MemoryArticleStore`] or a [`PgTxArticleStore`] without touching them.

pub mod memory;
pub mod postgres;

pub use memory::MemoryArticleStore;
pub use postgres::{PgArticleStore, PgTxArticleStore};

use async_trait::async_trait;

use crate::article::{Article, ArticleId, NewArticle};
use crate::error::Result;

/// Read and create operations over articles.
///
/// Every `post` writes a new author row alongside the article; authors are
/// never looked up or shared between articles.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// The article with `id`, or `None` when there is none.
    async fn get(&self, id: i32) -> Result<Option<Article>>;

    /// Every article in insertion order. Empty when the table is.
    async fn get_all(&self) -> Result<Vec<Article>>;

    /// Stores `article` with a fresh author and returns the new id.
    /// Either both rows are written or neither is.
    async fn post(&self, article: &NewArticle) -> Result<ArticleId>;
}
