//! Response payload variants and their wire encoding.
//!
//! Middlewares set one of these on the response view; the dispatcher turns
//! it into the transport body when the pipeline completes. Strings and
//! buffers go out as a single frame, [`Body::Json`] is serialized at
//! finalization, and [`Body::Stream`] is passed through chunk by chunk.

use std::fmt;
use std::io;
use std::pin::Pin;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Full, StreamBody};
use hyper::body::Frame;
use serde_json::Value;
use tracing::error;

/// Chunk source for [`Body::Stream`].
pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes, io::Error>> + Send + 'static>>;

/// The body type the transport layer writes.
pub type WireBody = UnsyncBoxBody<Bytes, io::Error>;

/// An outgoing response payload.
pub enum Body {
    /// No payload. Assigning this strips the entity headers and, absent an
    /// explicit status, turns the response into a `204`.
    None,
    /// UTF-8 text, written verbatim.
    Text(String),
    /// Raw bytes, written verbatim.
    Binary(Bytes),
    /// A structured value, serialized as JSON at finalization.
    Json(Value),
    /// A byte stream, piped to the transport until exhausted.
    Stream(BodyStream),
}

impl Body {
    /// Wraps a chunk stream without the caller having to pin it.
    pub fn stream(s: impl Stream<Item = Result<Bytes, io::Error>> + Send + 'static) -> Self {
        Self::Stream(Box::pin(s))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub(crate) fn into_wire(self) -> WireBody {
        match self {
            Self::None => full(Bytes::new()),
            Self::Text(s) => full(Bytes::from(s)),
            Self::Binary(b) => full(b),
            Self::Json(v) => match serde_json::to_vec(&v) {
                Ok(buf) => full(Bytes::from(buf)),
                Err(e) => {
                    error!("body serialization failed: {e}");
                    full(Bytes::new())
                }
            },
            Self::Stream(s) => {
                StreamBody::new(s.map(|chunk| chunk.map(Frame::data))).boxed_unsync()
            }
        }
    }
}

fn full(bytes: Bytes) -> WireBody {
    Full::new(bytes).map_err(|never| match never {}).boxed_unsync()
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("Body::None"),
            Self::Text(s) => f.debug_tuple("Body::Text").field(s).finish(),
            Self::Binary(b) => f.debug_tuple("Body::Binary").field(&b.len()).finish(),
            Self::Json(v) => f.debug_tuple("Body::Json").field(v).finish(),
            Self::Stream(_) => f.write_str("Body::Stream"),
        }
    }
}

impl From<&str> for Body {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<u8>> for Body {
    fn from(b: Vec<u8>) -> Self {
        Self::Binary(Bytes::from(b))
    }
}

impl From<Bytes> for Body {
    fn from(b: Bytes) -> Self {
        Self::Binary(b)
    }
}

impl From<Value> for Body {
    fn from(v: Value) -> Self {
        Self::Json(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn collect(body: WireBody) -> Bytes {
        body.collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn text_and_binary_pass_through() {
        assert_eq!(collect(Body::from("hello").into_wire()).await, "hello");
        assert_eq!(collect(Body::from(vec![1u8, 2, 3]).into_wire()).await, vec![1u8, 2, 3].as_slice());
    }

    #[tokio::test]
    async fn json_serializes_at_finalization() {
        let body = Body::from(json!({"id": 1}));
        assert_eq!(collect(body.into_wire()).await, r#"{"id":1}"#);
    }

    #[tokio::test]
    async fn stream_is_piped_until_exhausted() {
        let chunks = futures::stream::iter(vec![
            Ok(Bytes::from("ab")),
            Ok(Bytes::from("cd")),
            Ok(Bytes::from("ef")),
        ]);
        assert_eq!(collect(Body::stream(chunks).into_wire()).await, "abcdef");
    }

    #[tokio::test]
    async fn none_writes_nothing() {
        assert!(collect(Body::None.into_wire()).await.is_empty());
    }
}
