//! In-memory store mirroring the two-table layout.

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::ArticleStore;
use crate::article::{Article, ArticleId, NewArticle};
use crate::error::{Error, Result};

/// Keeps authors and articles in separate "tables" with serial ids starting
/// at 1, the way a freshly migrated database would.
#[derive(Debug, Default)]
pub struct MemoryArticleStore {
    tables: Mutex<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    // author id = index + 1
    authors: Vec<String>,
    articles: Vec<ArticleRow>,
}

#[derive(Debug)]
struct ArticleRow {
    id: i32,
    title: String,
    content: String,
    author_id: i32,
}

impl Tables {
    fn join(&self, row: &ArticleRow) -> Article {
        let author = usize::try_from(row.author_id - 1)
            .ok()
            .and_then(|i| self.authors.get(i))
            .cloned()
            .unwrap_or_default();
        Article {
            id: row.id,
            title: row.title.clone(),
            content: row.content.clone(),
            author,
        }
    }

    /// Serial id for the row after `len` existing ones.
    fn next_id(table: &'static str, len: usize) -> Result<i32> {
        len.checked_add(1)
            .and_then(|n| i32::try_from(n).ok())
            .ok_or(Error::IdsExhausted { table })
    }
}

impl MemoryArticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of author rows written so far.
    pub async fn author_count(&self) -> usize {
        self.tables.lock().await.authors.len()
    }
}

#[async_trait]
impl ArticleStore for MemoryArticleStore {
    async fn get(&self, id: i32) -> Result<Option<Article>> {
        let tables = self.tables.lock().await;
        Ok(tables.articles.iter().find(|row| row.id == id).map(|row| tables.join(row)))
    }

    async fn get_all(&self) -> Result<Vec<Article>> {
        let tables = self.tables.lock().await;
        Ok(tables.articles.iter().map(|row| tables.join(row)).collect())
    }

    async fn post(&self, article: &NewArticle) -> Result<ArticleId> {
        let mut tables = self.tables.lock().await;

        // Both ids first, so a failure leaves neither table touched.
        let author_id = Tables::next_id("author", tables.authors.len())?;
        let id = Tables::next_id("article", tables.articles.len())?;

        tables.authors.push(article.author.clone());
        tables.articles.push(ArticleRow {
            id,
            title: article.title.clone(),
            content: article.content.clone(),
            author_id,
        });

        Ok(ArticleId { id })
    }
}
