//! Request deadline.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::response::Response;
use crate::status::Status;

/// Answers `504 Gateway Timeout` when `fut` does not finish within `limit`.
/// `None` disables the deadline.
///
/// The handler future is dropped on expiry, which also cancels any query it
/// was awaiting.
pub(crate) async fn timeout<Fut>(limit: Option<Duration>, fut: Fut) -> Response
where
    Fut: Future<Output = Response>,
{
    let Some(limit) = limit else {
        return fut.await;
    };

    match tokio::time::timeout(limit, fut).await {
        Ok(res) => res,
        Err(_) => {
            warn!(limit_ms = limit.as_millis() as u64, "request timed out");
            Response::status(Status::GatewayTimeout)
        }
    }
}
