//! # articles-library
//!
//! A small REST service for articles and their authors, backed by
//! PostgreSQL, on a minimal hyper-based HTTP layer meant to sit behind a
//! reverse proxy.
//!
//! ## Layers
//!
//! - **HTTP**: radix-tree [`Router`] via [`matchit`], type-erased
//!   [`Handler`]s, a [`Server`] with graceful shutdown, and per-request
//!   middleware (request id, tracing span, timeout).
//! - **Resource**: [`ArticleResource`] turns requests into store calls and
//!   renders the `{status, message, data}` [`Envelope`].
//! - **Validation**: [`NewArticle::validate`] reports every failing field.
//! - **Persistence**: the [`ArticleStore`] trait, implemented for
//!   PostgreSQL ([`PgArticleStore`], [`PgTxArticleStore`]) and in memory
//!   ([`MemoryArticleStore`]).
//!
//! ## Routes
//!
//! | Method | Path | Answer |
//! |---|---|---|
//! | `GET` | `/articles` | every article |
//! | `GET` | `/articles/{id}` | the article, or `data: null` |
//! | `POST` | `/articles` | `201` with the new `{id}` |
//! | `GET` | `/healthz`, `/readyz` | probes |
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use articles_library::{MemoryArticleStore, Server, Settings, api};
//!
//! #[tokio::main]
//! async fn main() -> articles_library::Result<()> {
//!     let settings = Settings::load(None)?;
//!     let app = api::router(Arc::new(MemoryArticleStore::new()), &settings.server);
//!     Server::bind(&settings.server.addr)?.serve(app).await
//! }
//! ```

mod article;
mod error;
mod handler;
mod method;
mod middleware;
mod request;
mod resource;
mod response;
mod router;
mod server;
mod status;

pub mod api;
pub mod config;
pub mod health;
pub mod migrate;
pub mod store;
pub mod validation;

pub use article::{AUTHOR_MAX_LEN, AUTHOR_MIN_LEN, Article, ArticleId, NewArticle};
pub use self::config::Settings;
pub use error::{Error, Result};
pub use handler::Handler;
pub use method::Method;
pub use request::Request;
pub use resource::{ApiError, ArticleResource, Envelope};
pub use response::{IntoResponse, Json, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use status::Status;
pub use store::{ArticleStore, MemoryArticleStore, PgArticleStore, PgTxArticleStore};
pub use validation::{FieldError, ValidationErrors};
