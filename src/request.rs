//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;
use http::HeaderMap;
use serde::de::DeserializeOwned;

use crate::method::Method;

/// An incoming HTTP request with its body fully buffered.
///
/// Body-size limits are the reverse proxy's job; the server collects the
/// whole body before routing.
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
}

impl Request {
    pub(crate) fn new(method: Method, path: impl Into<String>, headers: HeaderMap, body: Bytes) -> Self {
        Self { method, path: path.into(), headers, body, params: HashMap::new() }
    }

    /// Builds a request from hyper's head and a collected body.
    ///
    /// Returns `None` for methods outside [`Method`].
    pub(crate) fn from_parts(parts: http::request::Parts, body: Bytes) -> Option<Self> {
        let method = Method::try_from(&parts.method).ok()?;
        Some(Self::new(method, parts.uri.path(), parts.headers, body))
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup. Non-UTF-8 values are treated as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/articles/{id}`, `req.param("id")` on `/articles/42`
    /// returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Decodes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

#[cfg(test)]
impl Request {
    pub(crate) fn test(method: Method, path: &str, body: &str) -> Self {
        Self::new(method, path, HeaderMap::new(), Bytes::copy_from_slice(body.as_bytes()))
    }

    pub(crate) fn with_header(mut self, name: &'static str, value: &str) -> Self {
        if let Ok(value) = value.parse() {
            self.headers.insert(name, value);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts_keeps_path_without_query() {
        let (parts, ()) = http::Request::builder()
            .method("GET")
            .uri("/articles/7?verbose=1")
            .header("X-Request-Id", "abc")
            .body(())
            .unwrap()
            .into_parts();

        let req = Request::from_parts(parts, Bytes::new()).unwrap();
        assert_eq!(req.method(), Method::Get);
        assert_eq!(req.path(), "/articles/7");
        assert_eq!(req.header("x-request-id"), Some("abc"));
    }

    #[test]
    fn test_from_parts_rejects_unknown_method() {
        let (parts, ()) = http::Request::builder()
            .method("BREW")
            .uri("/")
            .body(())
            .unwrap()
            .into_parts();

        assert!(Request::from_parts(parts, Bytes::new()).is_none());
    }

    #[test]
    fn test_json_decoding() {
        #[derive(serde::Deserialize)]
        struct Payload {
            title: String,
        }

        let req = Request::test(Method::Post, "/articles", r#"{"title":"T"}"#);
        let payload: Payload = req.json().unwrap();
        assert_eq!(payload.title, "T");

        let bad = Request::test(Method::Post, "/articles", "{");
        assert!(bad.json::<Payload>().is_err());
    }
}
