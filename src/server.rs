//! HTTP server and graceful shutdown.
//!
//! # Graceful shutdown and Kubernetes
//!
//! When Kubernetes terminates a pod it sends **SIGTERM** and waits
//! `terminationGracePeriodSeconds` (default 30 s) before sending SIGKILL.
//!
//! The server reacts by:
//! 1. Immediately stopping `listener.accept()`, so no new connections are made.
//! 2. Asking every open connection to shut down gracefully: idle keep-alive
//!    connections close at once, busy ones after their current response.
//! 3. Waiting at most the drain timeout for that, then dropping whatever is
//!    left.
//! 4. Returning from [`Server::serve`], which lets `main` exit cleanly.
//!
//! Keep the request timeout and the drain timeout below the grace period.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::middleware;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;
use crate::status::Status;

enum Listen {
    Addr(SocketAddr),
    Listener(TcpListener),
}

/// How long shutdown waits for open connections by default.
const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// The HTTP server.
pub struct Server {
    listen: Listen,
    request_timeout: Option<Duration>,
    drain_timeout: Duration,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// ```rust
    /// use articles_library::Server;
    /// let server = Server::bind("0.0.0.0:8080").unwrap();
    /// assert!(Server::bind("localhost").is_err());
    /// ```
    pub fn bind(addr: &str) -> Result<Self> {
        let addr: SocketAddr = addr.parse()?;
        Ok(Self::new(Listen::Addr(addr)))
    }

    /// Serves on an already-bound listener, e.g. one bound to port 0.
    pub fn from_listener(listener: TcpListener) -> Self {
        Self::new(Listen::Listener(listener))
    }

    fn new(listen: Listen) -> Self {
        Self { listen, request_timeout: None, drain_timeout: DEFAULT_DRAIN_TIMEOUT }
    }

    /// Answers `504` for any request still running after `limit`.
    pub fn request_timeout(mut self, limit: Duration) -> Self {
        self.request_timeout = Some(limit);
        self
    }

    /// Upper bound on how long shutdown waits for open connections to
    /// finish. Defaults to 10 s.
    pub fn drain_timeout(mut self, limit: Duration) -> Self {
        self.drain_timeout = limit;
        self
    }

    /// Starts accepting connections and dispatching them through `router`.
    ///
    /// Returns only after a full graceful shutdown (SIGTERM or Ctrl-C,
    /// followed by the connection drain).
    pub async fn serve(self, router: Router) -> Result<()> {
        self.serve_with_shutdown(router, shutdown_signal()).await
    }

    /// Like [`serve`](Server::serve), but stops accepting when `shutdown`
    /// resolves instead of on a process signal.
    pub async fn serve_with_shutdown(
        self,
        router: Router,
        shutdown: impl Future<Output = ()>,
    ) -> Result<()> {
        let listener = match self.listen {
            Listen::Addr(addr) => TcpListener::bind(addr).await?,
            Listen::Listener(listener) => listener,
        };
        let timeout = self.request_timeout;
        let drain_timeout = self.drain_timeout;
        let router = Arc::new(router);

        info!(addr = %listener.local_addr()?, "articles listening");

        let builder = ConnBuilder::new(TokioExecutor::new());
        // Signals every watched connection when shutdown starts.
        let graceful = GracefulShutdown::new();
        // Owns the connection tasks; whatever outlives the drain is aborted.
        let mut tasks = tokio::task::JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // Check shutdown first so a signal stops accepting immediately.
                biased;

                () = &mut shutdown => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let router = Arc::clone(&router);
                    let io = TokioIo::new(stream);

                    // Called once per request on the connection.
                    let svc = service_fn(move |req| {
                        let router = Arc::clone(&router);
                        async move { dispatch(router, timeout, req).await }
                    });

                    // HTTP/1.1 or HTTP/2, whatever the client negotiates.
                    let conn = graceful.watch(builder.serve_connection(io, svc).into_owned());

                    tasks.spawn(async move {
                        if let Err(e) = conn.await {
                            debug!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        drop(listener);

        tokio::select! {
            () = graceful.shutdown() => {
                debug!("all connections closed");
            }
            () = tokio::time::sleep(drain_timeout) => {
                warn!(
                    remaining = tasks.len(),
                    drain_ms = drain_timeout.as_millis() as u64,
                    "drain timed out, dropping open connections"
                );
            }
        }
        tasks.shutdown().await;

        info!("articles stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Routes one request and produces one response.
///
/// Never fails: every problem becomes a status code, so hyper never sees an
/// error.
async fn dispatch(
    router: Arc<Router>,
    timeout: Option<Duration>,
    req: hyper::Request<hyper::body::Incoming>,
) -> std::result::Result<http::Response<Full<Bytes>>, std::convert::Infallible> {
    let (parts, body) = req.into_parts();

    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            debug!("failed to read request body: {e}");
            return Ok(Response::status(Status::BadRequest).into_inner());
        }
    };

    let Some(req) = Request::from_parts(parts, body) else {
        return Ok(Response::status(Status::MethodNotAllowed).into_inner());
    };

    let response = middleware::trace(req, |req| {
        middleware::timeout(timeout, middleware::recover(router.handle(req)))
    })
    .await;
    Ok(response.into_inner())
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first shutdown signal the process receives: SIGTERM or
/// SIGINT on Unix, Ctrl-C elsewhere.
///
/// If a handler cannot be installed, that arm never resolves and the other
/// one still works.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
