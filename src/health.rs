//! Kubernetes health-check handlers.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can the pod serve traffic? Failure → pulled from load-balancer. |
//!
//! Readiness is gated on a caller-supplied probe, typically a database ping:
//!
//! ```rust,no_run
//! use articles_library::{Router, health, store};
//!
//! # fn build(pool: sqlx::PgPool) -> Router {
//! Router::new()
//!     .get("/healthz", health::liveness)
//!     .get("/readyz", health::readiness(move || {
//!         let pool = pool.clone();
//!         async move { store::postgres::ping(&pool).await }
//!     }))
//! # }
//! ```

use std::future::Future;

use tracing::warn;

use crate::handler::Handler;
use crate::{Request, Response, Status};

/// Liveness probe handler.
///
/// Always returns `200 OK` with body `"ok"`. If the process can respond to
/// HTTP at all, it is alive.
pub async fn liveness(_req: Request) -> Response {
    Response::text("ok")
}

/// Builds a readiness probe handler: `200 "ready"` while `probe` resolves to
/// `true`, `503` otherwise.
pub fn readiness<P, Fut>(probe: P) -> impl Handler
where
    P: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = bool> + Send + 'static,
{
    move |_req: Request| {
        let check = probe();
        async move {
            if check.await {
                Response::text("ready")
            } else {
                warn!("readiness probe failed");
                Response::status(Status::ServiceUnavailable)
            }
        }
    }
}
