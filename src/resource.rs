//! The article resource: HTTP handlers over an [`ArticleStore`].
//!
//! Every response, success or failure, is the same JSON envelope:
//!
//! ```json
//! {"status": 200, "message": "SUCCESS", "data": [...]}
//! ```
//!
//! A missing article is not an error: `GET /articles/{id}` answers 200 with
//! `"data": null`.

use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::article::NewArticle;
use crate::error::Error;
use crate::handler::Handler;
use crate::request::Request;
use crate::response::{IntoResponse, Json, Response};
use crate::router::Router;
use crate::status::Status;
use crate::store::ArticleStore;
use crate::validation::ValidationErrors;

const SUCCESS: &str = "SUCCESS";

/// The JSON shape of every response.
#[derive(Debug, Deserialize, PartialEq, Serialize)]
pub struct Envelope<T> {
    pub status: u16,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    pub fn new(status: Status, message: impl Into<String>, data: Option<T>) -> Self {
        Self { status: status.code(), message: message.into(), data }
    }

    fn success(status: Status, data: T) -> Self {
        Self::new(status, SUCCESS, Some(data))
    }

    fn respond(self, status: Status) -> Response {
        Json(status, self).into_response()
    }
}

/// Why a request to the resource failed.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request cannot be empty")]
    EmptyBody,

    /// Undecodable body or path parameter; the message says which.
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Store(#[from] Error),
}

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            Self::EmptyBody | Self::BadRequest(_) | Self::Validation(_) => Status::BadRequest,
            // The database answered, but refused the statement.
            Self::Store(Error::Database(sqlx::Error::Database(_))) => Status::UnprocessableContent,
            Self::Store(_) => Status::InternalServerError,
        }
    }

    /// The envelope message: the database's own text for refused statements.
    fn message(&self) -> String {
        match self {
            Self::Store(Error::Database(sqlx::Error::Database(db))) => db.message().to_owned(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("article request failed: {self}");
        } else {
            warn!(status = status.code(), "article request rejected: {self}");
        }
        Envelope::<()>::new(status, self.message(), None).respond(status)
    }
}

/// Handlers for `/articles`.
pub struct ArticleResource {
    store: Arc<dyn ArticleStore>,
}

impl ArticleResource {
    pub fn new(store: Arc<dyn ArticleStore>) -> Self {
        Self { store }
    }

    /// Registers the article routes under `base_path` (e.g. `""` or `/api/v1`).
    pub fn routes(self, router: Router, base_path: &str) -> Router {
        let base = base_path.trim_end_matches('/');
        let collection = format!("{base}/articles");
        let item = format!("{base}/articles/{{id}}");

        let rs = Arc::new(self);
        router
            .get(&collection, bind(Arc::clone(&rs), Self::list))
            .post(&collection, bind(Arc::clone(&rs), Self::create))
            .get(&item, bind(rs, Self::get))
    }

    /// `GET /articles`
    async fn list(self: Arc<Self>, _req: Request) -> Result<Response, ApiError> {
        let articles = self.store.get_all().await?;
        debug!(count = articles.len(), "listed articles");
        Ok(Envelope::success(Status::Ok, articles).respond(Status::Ok))
    }

    /// `GET /articles/{id}`
    async fn get(self: Arc<Self>, req: Request) -> Result<Response, ApiError> {
        let raw = req.param("id").unwrap_or_default();
        let id: i32 = raw
            .parse()
            .map_err(|e| ApiError::BadRequest(format!("invalid article id {raw:?}: {e}")))?;

        let article = self.store.get(id).await?;
        if article.is_none() {
            debug!(id, "article not found");
        }

        let envelope = Envelope::new(Status::Ok, SUCCESS, article.map(|a| vec![a]));
        Ok(envelope.respond(Status::Ok))
    }

    /// `POST /articles`
    async fn create(self: Arc<Self>, req: Request) -> Result<Response, ApiError> {
        if req.body().iter().all(u8::is_ascii_whitespace) {
            return Err(ApiError::EmptyBody);
        }

        // `null` decodes to `None` and counts as empty.
        let article: Option<NewArticle> = req.json().map_err(|e| ApiError::BadRequest(e.to_string()))?;
        let article = article.ok_or(ApiError::EmptyBody)?.normalized();
        article.validate()?;

        let created = self.store.post(&article).await?;
        info!(id = created.id, "article created");

        let location = format!("{}/{}", req.path().trim_end_matches('/'), created.id);
        let mut res = Envelope::success(Status::Created, created).respond(Status::Created);
        res.set_header("location", &location);
        Ok(res)
    }
}

/// Adapts a method taking the shared resource into a route handler.
fn bind<F, Fut, R>(rs: Arc<ArticleResource>, f: F) -> impl Handler
where
    F: Fn(Arc<ArticleResource>, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    move |req: Request| f(Arc::clone(&rs), req)
}

/// Fallback for unmatched paths: a 404 in the usual envelope.
pub async fn not_found(_req: Request) -> Response {
    Envelope::<()>::new(Status::NotFound, Status::NotFound.reason(), None).respond(Status::NotFound)
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::article::{Article, ArticleId};
    use crate::error::Result;
    use crate::method::Method;
    use crate::store::MemoryArticleStore;

    fn app(store: Arc<dyn ArticleStore>) -> Router {
        ArticleResource::new(store).routes(Router::new(), "").fallback(not_found)
    }

    async fn seeded(articles: &[NewArticle]) -> Arc<MemoryArticleStore> {
        let store = Arc::new(MemoryArticleStore::new());
        for a in articles {
            store.post(a).await.unwrap();
        }
        store
    }

    fn body(res: &Response) -> Value {
        serde_json::from_slice(res.body()).unwrap()
    }

    fn test_article() -> NewArticle {
        NewArticle::new("Test Title", "Test Content", "Test Author")
    }

    fn another_article() -> NewArticle {
        NewArticle::new("Another Test Title", "Another Test Content", "Another Test Author")
    }

    /// Fails every call the way an unreachable database would.
    struct BrokenStore;

    #[async_trait::async_trait]
    impl ArticleStore for BrokenStore {
        async fn get(&self, _id: i32) -> Result<Option<Article>> {
            Err(sqlx::Error::PoolTimedOut.into())
        }
        async fn get_all(&self) -> Result<Vec<Article>> {
            Err(sqlx::Error::PoolTimedOut.into())
        }
        async fn post(&self, _article: &NewArticle) -> Result<ArticleId> {
            Err(sqlx::Error::PoolTimedOut.into())
        }
    }

    #[tokio::test]
    async fn test_list_empty_is_empty_array() {
        let res = app(seeded(&[]).await).handle(Request::test(Method::Get, "/articles", "")).await;
        assert_eq!(res.status_code(), Status::Ok);
        assert_eq!(body(&res), serde_json::json!({"status": 200, "message": "SUCCESS", "data": []}));
    }

    #[tokio::test]
    async fn test_list_in_insertion_order() {
        let store = seeded(&[test_article(), another_article()]).await;
        let res = app(store).handle(Request::test(Method::Get, "/articles", "")).await;

        let envelope: Envelope<Vec<Article>> = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(
            envelope.data.unwrap(),
            vec![test_article().into_article(1), another_article().into_article(2)]
        );
    }

    #[tokio::test]
    async fn test_get_found() {
        let store = seeded(&[test_article(), another_article()]).await;
        let res = app(store).handle(Request::test(Method::Get, "/articles/2", "")).await;

        assert_eq!(res.status_code(), Status::Ok);
        let envelope: Envelope<Vec<Article>> = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(envelope.message, "SUCCESS");
        assert_eq!(envelope.data.unwrap(), vec![another_article().into_article(2)]);
    }

    #[tokio::test]
    async fn test_get_missing_is_success_with_null() {
        let store = seeded(&[test_article()]).await;
        let res = app(store).handle(Request::test(Method::Get, "/articles/3", "")).await;

        assert_eq!(res.status_code(), Status::Ok);
        assert_eq!(body(&res), serde_json::json!({"status": 200, "message": "SUCCESS", "data": null}));
    }

    #[tokio::test]
    async fn test_get_non_integer_id() {
        let res = app(seeded(&[]).await).handle(Request::test(Method::Get, "/articles/abc", "")).await;

        assert_eq!(res.status_code(), Status::BadRequest);
        let json = body(&res);
        assert_eq!(json["status"], 400);
        assert_eq!(json["message"], "invalid article id \"abc\": invalid digit found in string");
        assert_eq!(json["data"], Value::Null);
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let store = seeded(&[]).await;
        let router = app(store.clone());

        let payload = r#"{"title":"Test Title","content":"Test Content","author":"Test Author"}"#;
        let res = router.handle(Request::test(Method::Post, "/articles", payload)).await;

        assert_eq!(res.status_code(), Status::Created);
        assert_eq!(res.header("location"), Some("/articles/1"));
        assert_eq!(body(&res), serde_json::json!({"status": 201, "message": "SUCCESS", "data": {"id": 1}}));
        assert_eq!(store.get(1).await.unwrap(), Some(test_article().into_article(1)));
    }

    #[tokio::test]
    async fn test_create_empty_body() {
        let store = seeded(&[]).await;
        for empty in ["", "  \n", "null"] {
            let res = app(store.clone()).handle(Request::test(Method::Post, "/articles", empty)).await;
            assert_eq!(res.status_code(), Status::BadRequest, "body {empty:?}");
            assert_eq!(body(&res)["message"], "request cannot be empty");
        }
        assert_eq!(store.author_count().await, 0);
    }

    #[tokio::test]
    async fn test_create_malformed_json() {
        let res = app(seeded(&[]).await)
            .handle(Request::test(Method::Post, "/articles", r#"{"title": 5}"#))
            .await;
        assert_eq!(res.status_code(), Status::BadRequest);
        assert!(body(&res)["message"].as_str().unwrap().contains("invalid type"));
    }

    #[tokio::test]
    async fn test_create_validation_names_every_field() {
        let store = seeded(&[]).await;
        let res = app(store.clone()).handle(Request::test(Method::Post, "/articles", "{}")).await;

        assert_eq!(res.status_code(), Status::BadRequest);
        assert_eq!(
            body(&res)["message"],
            "author: cannot be blank; content: cannot be blank; title: cannot be blank."
        );
        assert!(store.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_short_author() {
        let payload = r#"{"title":"T","content":"C","author":"Test"}"#;
        let res = app(seeded(&[]).await).handle(Request::test(Method::Post, "/articles", payload)).await;
        assert_eq!(res.status_code(), Status::BadRequest);
        assert_eq!(body(&res)["message"], "author: the length must be between 5 and 255.");
    }

    #[tokio::test]
    async fn test_create_stores_trimmed_fields() {
        let store = seeded(&[]).await;
        let payload = serde_json::json!({
            "title": " Test Title ",
            "content": "Test Content\n",
            "author": format!("{}Test Author", " ".repeat(300)),
        });
        let res = app(store.clone())
            .handle(Request::test(Method::Post, "/articles", &payload.to_string()))
            .await;

        assert_eq!(res.status_code(), Status::Created);
        let stored = store.get(1).await.unwrap().unwrap();
        assert_eq!(stored, test_article().into_article(1));
        assert!(stored.author.chars().count() <= crate::article::AUTHOR_MAX_LEN);
    }

    #[tokio::test]
    async fn test_create_padded_long_author_is_validation_error() {
        let store = seeded(&[]).await;
        let payload = serde_json::json!({
            "title": "T",
            "content": "C",
            "author": format!("   {}   ", "a".repeat(256)),
        });
        let res = app(store.clone())
            .handle(Request::test(Method::Post, "/articles", &payload.to_string()))
            .await;

        assert_eq!(res.status_code(), Status::BadRequest);
        assert_eq!(body(&res)["message"], "author: the length must be between 5 and 255.");
        assert_eq!(store.author_count().await, 0);
    }

    #[tokio::test]
    async fn test_store_failure_is_server_error() {
        let router = app(Arc::new(BrokenStore));

        let res = router.handle(Request::test(Method::Get, "/articles", "")).await;
        assert_eq!(res.status_code(), Status::InternalServerError);
        assert_eq!(body(&res)["status"], 500);

        let payload = r#"{"title":"T","content":"C","author":"Test Author"}"#;
        let res = router.handle(Request::test(Method::Post, "/articles", payload)).await;
        assert_eq!(res.status_code(), Status::InternalServerError);
    }

    #[tokio::test]
    async fn test_unknown_route_envelope() {
        let res = app(seeded(&[]).await).handle(Request::test(Method::Get, "/artichokes", "")).await;
        assert_eq!(res.status_code(), Status::NotFound);
        assert_eq!(body(&res), serde_json::json!({"status": 404, "message": "Not Found", "data": null}));
    }

    #[tokio::test]
    async fn test_base_path() {
        let router = ArticleResource::new(seeded(&[test_article()]).await).routes(Router::new(), "/api/v1/");
        let res = router.handle(Request::test(Method::Get, "/api/v1/articles/1", "")).await;
        assert_eq!(res.status_code(), Status::Ok);

        let res = router.handle(Request::test(Method::Get, "/articles/1", "")).await;
        assert_eq!(res.status_code(), Status::NotFound);
    }
}
