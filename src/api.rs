//! Application assembly: resources, probes and fallback on one router.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::health;
use crate::resource::{self, ArticleResource};
use crate::router::Router;
use crate::store::ArticleStore;

/// Builds the application router over `store`.
///
/// Includes the article routes under `config.base_path`, the liveness probe
/// and the JSON 404 fallback. The readiness probe depends on the backend and
/// is added by the caller.
pub fn router(store: Arc<dyn ArticleStore>, config: &ServerConfig) -> Router {
    let router = Router::new()
        .get("/healthz", health::liveness)
        .fallback(resource::not_found);

    ArticleResource::new(store).routes(router, &config.base_path)
}
