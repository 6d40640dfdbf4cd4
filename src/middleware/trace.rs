//! Request id and per-request tracing span.

use std::future::Future;
use std::time::Instant;

use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use crate::request::Request;
use crate::response::Response;

/// Header carrying the request id in both directions.
pub(crate) const REQUEST_ID: &str = "x-request-id";

/// Wraps `next` in a span carrying the request id, method and path, logs the
/// outcome with its latency, and echoes the id back on the response.
///
/// An id supplied by the proxy is reused; otherwise a UUID v4 is generated.
pub(crate) async fn trace<F, Fut>(req: Request, next: F) -> Response
where
    F: FnOnce(Request) -> Fut,
    Fut: Future<Output = Response>,
{
    let request_id = req
        .header(REQUEST_ID)
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let span = info_span!(
        "request",
        id = %request_id,
        method = %req.method(),
        path = %req.path(),
    );

    let started = Instant::now();
    let mut res = next(req).instrument(span.clone()).await;
    let latency_ms = started.elapsed().as_millis() as u64;

    span.in_scope(|| {
        let status = res.status_code().code();
        if res.status_code().is_server_error() {
            warn!(status, latency_ms, "request failed");
        } else {
            info!(status, latency_ms, "request completed");
        }
    });

    res.set_header(REQUEST_ID, &request_id);
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::Method;
    use crate::status::Status;

    #[tokio::test]
    async fn test_supplied_request_id_is_echoed() {
        let req = Request::test(Method::Get, "/articles", "").with_header(REQUEST_ID, "req-7");
        let res = trace(req, |_req| async { Response::status(Status::Ok) }).await;
        assert_eq!(res.header(REQUEST_ID), Some("req-7"));
    }

    #[tokio::test]
    async fn test_request_id_is_generated() {
        let req = Request::test(Method::Get, "/articles", "");
        let res = trace(req, |_req| async { Response::status(Status::Ok) }).await;
        let id = res.header(REQUEST_ID).unwrap();
        assert!(Uuid::parse_str(id).is_ok());
    }

    #[tokio::test]
    async fn test_response_passes_through() {
        let req = Request::test(Method::Post, "/articles", "");
        let res = trace(req, |_req| async { Response::status(Status::BadRequest) }).await;
        assert_eq!(res.status_code(), Status::BadRequest);
    }
}
