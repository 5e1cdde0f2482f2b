//! Per-request state shared along the middleware chain.

use std::fmt;

use http::StatusCode;

use crate::body::Body;
use crate::request::Request;
use crate::response::Response;

/// One request's mutable state.
///
/// A fresh `Context` is built by the dispatcher for every request and
/// travels the middleware chain by value — exactly one middleware owns it
/// at any point, and it is dropped once the response is finalized. It is
/// never reused across requests.
///
/// The [`body`](Context::body) and [`status`](Context::status) accessors are
/// sugar for the corresponding operations on [`Context::response`].
pub struct Context {
    /// Inbound view: method, URI, headers, collected body.
    pub request: Request,
    /// Outbound view: status, headers, payload.
    pub response: Response,
}

impl Context {
    pub(crate) fn new(request: Request, response: Response) -> Self {
        Self { request, response }
    }

    pub fn body(&self) -> &Body {
        self.response.body()
    }

    pub fn set_body(&mut self, body: impl Into<Body>) {
        self.response.set_body(body);
    }

    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    pub fn set_status(&mut self, code: u16) {
        self.response.set_status(code);
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("method", self.request.method())
            .field("path", &self.request.path())
            .field("status", &self.response.status())
            .finish_non_exhaustive()
    }
}
