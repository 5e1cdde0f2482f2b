//! Outgoing response view.
//!
//! Middlewares describe the response here — status, headers, payload — and
//! the dispatcher serializes it once the pipeline completes. Two invariants
//! are enforced at assignment time, not at flush time:
//!
//! - clearing the body ([`Body::None`]) strips `Content-Type`,
//!   `Content-Length` and `Transfer-Encoding`, and forces `204` unless a
//!   status was set explicitly;
//! - a status set through [`set_status`](Response::set_status) is never
//!   overwritten by a later body assignment.

use std::sync::Arc;

use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, StatusCode};

use crate::body::Body;
use crate::mime::MimeLookup;

/// The outbound half of a [`Context`](crate::Context).
pub struct Response {
    status: StatusCode,
    explicit_status: bool,
    headers: HeaderMap,
    body: Body,
    header_sent: bool,
    mime: Arc<dyn MimeLookup>,
}

impl Response {
    pub(crate) fn new(mime: Arc<dyn MimeLookup>) -> Self {
        Self {
            status: StatusCode::OK,
            explicit_status: false,
            headers: HeaderMap::new(),
            body: Body::None,
            header_sent: false,
            mime,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Sets the status code and raises the explicit-status flag, so that a
    /// later body assignment keeps the code chosen here.
    ///
    /// # Panics
    ///
    /// Panics on codes outside `100..=999`. A bad status is a programming
    /// error and fails at the call site, not at response time.
    pub fn set_status(&mut self, code: u16) {
        self.status = StatusCode::from_u16(code)
            .unwrap_or_else(|_| panic!("invalid status code `{code}`"));
        self.explicit_status = true;
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Replaces the response payload.
    ///
    /// Assigning [`Body::None`] strips the entity headers and forces `204`
    /// unless a status was set explicitly. Any other payload defaults the
    /// status to `200`, again without clobbering an explicit one.
    pub fn set_body(&mut self, body: impl Into<Body>) {
        let body = body.into();
        if body.is_none() {
            if !self.explicit_status {
                self.status = StatusCode::NO_CONTENT;
            }
            self.remove("content-type");
            self.remove("content-length");
            self.remove("transfer-encoding");
            self.body = Body::None;
            return;
        }
        if !self.explicit_status {
            self.status = StatusCode::OK;
        }
        self.body = body;
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// True once the dispatcher has begun serializing the response. Headers
    /// cannot be amended past this point; writes become silent no-ops.
    pub fn header_sent(&self) -> bool {
        self.header_sent
    }

    pub(crate) fn mark_header_sent(&mut self) {
        self.header_sent = true;
    }

    /// Case-insensitive single-header lookup. Returns `""` when the header
    /// is absent.
    pub fn get(&self, field: &str) -> &str {
        self.headers.get(field).and_then(|v| v.to_str().ok()).unwrap_or("")
    }

    /// Sets one header. A silent no-op once [`header_sent`](Response::header_sent)
    /// is true — headers already on the wire cannot be amended.
    ///
    /// # Panics
    ///
    /// Panics on a malformed header name or value.
    pub fn set(&mut self, field: &str, value: &str) {
        if self.header_sent {
            return;
        }
        let name = HeaderName::from_bytes(field.as_bytes())
            .unwrap_or_else(|_| panic!("invalid header name `{field}`"));
        let value = HeaderValue::from_str(value)
            .unwrap_or_else(|_| panic!("invalid value for header `{field}`"));
        self.headers.insert(name, value);
    }

    /// Sets several headers at once. Same rules as [`set`](Response::set).
    pub fn set_all<'a>(&mut self, fields: impl IntoIterator<Item = (&'a str, &'a str)>) {
        for (field, value) in fields {
            self.set(field, value);
        }
    }

    /// Removes a header. A silent no-op once headers are sent.
    pub fn remove(&mut self, field: &str) {
        if self.header_sent {
            return;
        }
        self.headers.remove(field);
    }

    /// Resolves `hint` through the configured [`MimeLookup`] and sets
    /// `Content-Type` accordingly; an unknown hint clears the header.
    pub fn set_content_type(&mut self, hint: &str) {
        let resolved = self.mime.resolve(hint);
        match resolved {
            Some(full) => self.set("content-type", &full),
            None => self.remove("content-type"),
        }
    }

    pub(crate) fn into_parts(self) -> (StatusCode, HeaderMap, Body) {
        (self.status, self.headers, self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mime::MimeTable;

    fn response() -> Response {
        Response::new(Arc::new(MimeTable))
    }

    #[test]
    fn clearing_the_body_forces_204_and_strips_entity_headers() {
        let mut res = response();
        res.set("content-type", "text/plain");
        res.set("content-length", "5");
        res.set("transfer-encoding", "chunked");
        res.set_body(Body::None);

        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        assert_eq!(res.get("content-type"), "");
        assert_eq!(res.get("content-length"), "");
        assert_eq!(res.get("transfer-encoding"), "");
        assert!(res.body().is_none());
    }

    #[test]
    fn explicit_status_survives_body_assignment() {
        let mut res = response();
        res.set_status(200);
        res.set_body("hello");
        assert_eq!(res.status(), StatusCode::OK);
        assert!(matches!(res.body(), Body::Text(s) if s == "hello"));

        let mut res = response();
        res.set_status(201);
        res.set_body(Body::None);
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    #[test]
    fn body_assignment_defaults_the_status_to_200() {
        let mut res = response();
        res.set_body("hello");
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[test]
    fn set_all_registers_every_pair_case_insensitively() {
        let mut res = response();
        res.set_all([("A", "1"), ("B", "2")]);
        assert_eq!(res.get("a"), "1");
        assert_eq!(res.get("b"), "2");
        assert_eq!(res.get("B"), "2");
    }

    #[test]
    fn writes_after_header_sent_are_silent_no_ops() {
        let mut res = response();
        res.set("x-before", "kept");
        res.mark_header_sent();
        res.set("x-after", "dropped");
        res.remove("x-before");

        assert_eq!(res.get("x-before"), "kept");
        assert_eq!(res.get("x-after"), "");
    }

    #[test]
    fn content_type_resolves_through_the_lookup() {
        let mut res = response();
        res.set_content_type("json");
        assert_eq!(res.get("content-type"), "application/json");

        res.set_content_type("definitely-not-a-type");
        assert_eq!(res.get("content-type"), "");
    }

    #[test]
    #[should_panic(expected = "invalid status code")]
    fn out_of_range_status_fails_at_the_call_site() {
        response().set_status(1000);
    }
}
