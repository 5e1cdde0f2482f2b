//! Read-only inbound request view.

use bytes::Bytes;
use http::request::Parts;
use http::{HeaderMap, Method, Uri, Version};

/// The inbound half of a [`Context`](crate::Context).
///
/// Built by the dispatcher from the decoded head and the fully collected
/// body. Middlewares only ever read from it.
pub struct Request {
    method: Method,
    uri: Uri,
    version: Version,
    headers: HeaderMap,
    body: Bytes,
}

impl Request {
    pub(crate) fn new(parts: Parts, body: Bytes) -> Self {
        Self {
            method: parts.method,
            uri: parts.uri,
            version: parts.version,
            headers: parts.headers,
            body,
        }
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn uri(&self) -> &Uri { &self.uri }
    pub fn path(&self) -> &str { self.uri.path() }
    pub fn query(&self) -> Option<&str> { self.uri.query() }
    pub fn version(&self) -> Version { self.version }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup. Returns `None` for absent headers and
    /// for values that are not valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(builder: http::request::Builder) -> Request {
        let (parts, body) = builder.body(Bytes::new()).unwrap().into_parts();
        Request::new(parts, body)
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let req = request(http::Request::builder().uri("/").header("X-Request-Id", "abc"));
        assert_eq!(req.header("x-request-id"), Some("abc"));
        assert_eq!(req.header("X-REQUEST-ID"), Some("abc"));
        assert_eq!(req.header("x-missing"), None);
    }

    #[test]
    fn path_and_query_come_from_the_uri() {
        let req = request(http::Request::builder().method("GET").uri("/users/42?full=1"));
        assert_eq!(req.method(), Method::GET);
        assert_eq!(req.path(), "/users/42");
        assert_eq!(req.query(), Some("full=1"));
    }
}
