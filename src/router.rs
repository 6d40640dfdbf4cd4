//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. You register a path, you
//! get a handler.

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// The application router.
///
/// Build it once at startup and pass it to [`Server::serve`](crate::Server::serve).
/// Registration methods return `self` so they chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    fallback: Option<BoxedHandler>,
}

/// Outcome of matching a method + path pair.
pub(crate) enum Route {
    Found(BoxedHandler, HashMap<String, String>),
    /// The path is registered, but not under this method.
    MethodNotAllowed,
    NotFound,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new(), fallback: None }
    }

    /// Register a handler for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them:
    ///
    /// ```rust,no_run
    /// # use articles_library::{Method, Request, Response, Router};
    /// # async fn get_article(_: Request) -> Response { Response::text("") }
    /// Router::new().on(Method::Get, "/articles/{id}", get_article);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics on a malformed or conflicting route. Routes are fixed at
    /// startup, so this is a programming error.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{method} {path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Get, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Post, path, handler)
    }

    /// Handler for requests whose path matches no route under any method.
    /// Without one, such requests get a bare `404`.
    pub fn fallback(mut self, handler: impl Handler) -> Self {
        self.fallback = Some(handler.into_boxed_handler());
        self
    }

    pub(crate) fn lookup(&self, method: Method, path: &str) -> Route {
        if let Some(matched) = self.routes.get(&method).and_then(|tree| tree.at(path).ok()) {
            let params = matched.params.iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect();
            return Route::Found(Arc::clone(matched.value), params);
        }

        if self.routes.values().any(|tree| tree.at(path).is_ok()) {
            Route::MethodNotAllowed
        } else {
            Route::NotFound
        }
    }

    /// Routes one request to its handler and awaits the response.
    pub(crate) async fn handle(&self, mut req: Request) -> Response {
        match self.lookup(req.method(), req.path()) {
            Route::Found(handler, params) => {
                req.params = params;
                handler.call(req).await
            }
            Route::MethodNotAllowed => Response::status(Status::MethodNotAllowed),
            Route::NotFound => match &self.fallback {
                Some(handler) => handler.call(req).await,
                None => Response::status(Status::NotFound),
            },
        }
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}
