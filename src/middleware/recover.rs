//! Panic recovery.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tracing::error;

use crate::resource::Envelope;
use crate::response::{IntoResponse, Json, Response};
use crate::status::Status;

/// Turns a panic inside `fut` into a `500` envelope instead of letting it
/// tear down the connection task.
///
/// Runs inside the request span, so the log line carries the request id.
pub(crate) async fn recover<Fut>(fut: Fut) -> Response
where
    Fut: Future<Output = Response>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(res) => res,
        Err(payload) => {
            error!(panic = panic_message(payload.as_ref()), "handler panicked");
            let status = Status::InternalServerError;
            Json(status, Envelope::<()>::new(status, status.reason(), None)).into_response()
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}
