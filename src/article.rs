//! The article resource and its write payload.

use serde::{Deserialize, Serialize};

use crate::validation::{self, ValidationErrors};

/// Shortest accepted author name, in characters after trimming.
pub const AUTHOR_MIN_LEN: usize = 5;
/// Longest accepted author name; matches `authors.name VARCHAR(255)`.
pub const AUTHOR_MAX_LEN: usize = 255;

/// A stored article joined with its author's name.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, sqlx::FromRow)]
pub struct Article {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub author: String,
}

/// The body of `POST /articles`.
///
/// Absent fields decode as empty strings so [`validate`](NewArticle::validate)
/// can name them.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct NewArticle {
    pub title: String,
    pub content: String,
    pub author: String,
}

impl NewArticle {
    pub fn new(title: impl Into<String>, content: impl Into<String>, author: impl Into<String>) -> Self {
        Self { title: title.into(), content: content.into(), author: author.into() }
    }

    /// Strips surrounding whitespace from every field. This is the form that
    /// gets validated and stored, so the length bounds hold for stored rows.
    pub fn normalized(self) -> Self {
        Self {
            title: trimmed(self.title),
            content: trimmed(self.content),
            author: trimmed(self.author),
        }
    }

    /// Checks every field and reports all failures at once.
    ///
    /// ```rust
    /// use articles_library::NewArticle;
    ///
    /// let err = NewArticle::new("Title", "", "").validate().unwrap_err();
    /// assert_eq!(err.to_string(), "author: cannot be blank; content: cannot be blank.");
    /// ```
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errs = ValidationErrors::new();
        errs.check("title", validation::required(&self.title));
        errs.check("content", validation::required(&self.content));
        errs.check("author", validation::required(&self.author));
        errs.check("author", validation::length(&self.author, AUTHOR_MIN_LEN, AUTHOR_MAX_LEN));
        errs.into_result()
    }

    /// The stored form of this payload under `id`.
    pub fn into_article(self, id: i32) -> Article {
        Article { id, title: self.title, content: self.content, author: self.author }
    }
}

fn trimmed(s: String) -> String {
    let t = s.trim();
    if t.len() == s.len() { s } else { t.to_owned() }
}

/// Identifier handed back by a successful create.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ArticleId {
    pub id: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(article: NewArticle, expected: &str) {
        let got = article.validate().err().map(|e| e.to_string()).unwrap_or_default();
        assert_eq!(got, expected);
    }

    #[test]
    fn test_validate() {
        check(NewArticle::new("TestTitle", "TestContent", "TestAuthor"), "");
        check(NewArticle::new("", "TestContent", "TestAuthor"), "title: cannot be blank.");
        check(NewArticle::new("TestTitle", "", "TestAuthor"), "content: cannot be blank.");
        check(NewArticle::new("TestTitle", "TestContent", ""), "author: cannot be blank.");
        check(
            NewArticle::new("TestTitle", "", ""),
            "author: cannot be blank; content: cannot be blank.",
        );
        check(
            NewArticle::default(),
            "author: cannot be blank; content: cannot be blank; title: cannot be blank.",
        );
    }

    #[test]
    fn test_author_length_bounds() {
        let msg = "author: the length must be between 5 and 255.";
        check(NewArticle::new("T", "C", "Test"), msg);
        check(NewArticle::new("T", "C", "Tests"), "");
        check(NewArticle::new("T", "C", "a".repeat(255)), "");
        check(NewArticle::new("T", "C", "a".repeat(256)), msg);
        // trimmed before counting
        check(NewArticle::new("T", "C", "  Test  "), msg);
    }

    #[test]
    fn test_normalized_trims_every_field() {
        let padded = NewArticle::new("  Title\n", "\tContent ", format!("{}Valid", " ".repeat(300)));
        let article = padded.normalized();
        assert_eq!(article, NewArticle::new("Title", "Content", "Valid"));
        assert!(article.validate().is_ok());
    }

    #[test]
    fn test_padded_author_over_limit_stays_rejected() {
        let author = format!("  {}  ", "a".repeat(256));
        let article = NewArticle::new("T", "C", author).normalized();
        assert_eq!(article.author.chars().count(), 256);
        check(article, "author: the length must be between 5 and 255.");

        let article = NewArticle::new("T", "C", format!("  {}  ", "a".repeat(255))).normalized();
        assert_eq!(article.author.chars().count(), AUTHOR_MAX_LEN);
        check(article, "");
    }

    #[test]
    fn test_length_failure_independent_of_other_fields() {
        let err = NewArticle::new("", "", "abc").validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "author: the length must be between 5 and 255; content: cannot be blank; title: cannot be blank."
        );
    }

    #[test]
    fn test_missing_json_fields_decode_empty() {
        let payload: NewArticle = serde_json::from_str(r#"{"title":"T"}"#).unwrap();
        assert_eq!(payload, NewArticle::new("T", "", ""));
    }

    #[test]
    fn test_article_serializes_all_fields() {
        let article = NewArticle::new("T", "C", "Author").into_article(3);
        let json = serde_json::to_value(&article).unwrap();
        assert_eq!(json, serde_json::json!({"id": 3, "title": "T", "content": "C", "author": "Author"}));
    }
}
