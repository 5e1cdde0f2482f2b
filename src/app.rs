//! Application builder and per-request dispatch.

use std::sync::Arc;

use http_body_util::BodyExt;
use tracing::{debug, error};

use crate::body::{Body, WireBody};
use crate::compose::Pipeline;
use crate::context::Context;
use crate::error::Error;
use crate::middleware::{BoxedMiddleware, Middleware};
use crate::mime::{MimeLookup, MimeTable};
use crate::request::Request;
use crate::response::Response;
use crate::server::Server;

type ErrorObserver = Arc<dyn Fn(&Error) + Send + Sync + 'static>;

/// The application: an ordered middleware stack plus shared configuration.
///
/// Build it once at startup; every method chains by value. The first
/// registered middleware becomes the outermost layer of the pipeline.
///
/// ```rust,no_run
/// use negi::{App, Context, Next};
///
/// async fn hello(ctx: Context, next: Next) -> Result<Context, negi::Error> {
///     let mut ctx = next.run(ctx).await?;
///     ctx.set_body("hello");
///     Ok(ctx)
/// }
///
/// #[tokio::main]
/// async fn main() {
///     App::new()
///         .with(hello)
///         .listen("0.0.0.0:3000")
///         .await
///         .expect("server error");
/// }
/// ```
pub struct App {
    stack: Vec<BoxedMiddleware>,
    observers: Vec<ErrorObserver>,
    mime: Arc<dyn MimeLookup>,
}

impl App {
    pub fn new() -> Self {
        Self { stack: Vec::new(), observers: Vec::new(), mime: Arc::new(MimeTable) }
    }

    /// Appends a middleware to the stack. Returns `self` for chaining.
    ///
    /// Registration order is nesting order: the first middleware wraps
    /// everything registered after it.
    pub fn with(mut self, middleware: impl Middleware) -> Self {
        self.stack.push(middleware.into_boxed_middleware());
        self
    }

    /// Registers an observer invoked with every error that escapes the
    /// pipeline, after the error response has been produced. External
    /// monitoring hooks in here.
    pub fn on_error(mut self, observer: impl Fn(&Error) + Send + Sync + 'static) -> Self {
        self.observers.push(Arc::new(observer));
        self
    }

    /// Replaces the content-type lookup used by
    /// [`Response::set_content_type`](crate::Response::set_content_type).
    pub fn mime_lookup(mut self, lookup: impl MimeLookup) -> Self {
        self.mime = Arc::new(lookup);
        self
    }

    /// Shorthand for `Server::bind(addr).serve(self)`.
    pub async fn listen(self, addr: &str) -> Result<(), Error> {
        Server::bind(addr).serve(self).await
    }

    /// Freezes the stack into a [`Dispatcher`].
    ///
    /// The pipeline is composed exactly once, here. `App` is consumed, so
    /// nothing can grow the stack under a dispatcher that is already
    /// serving requests.
    pub fn callback(self) -> Dispatcher {
        Dispatcher {
            pipeline: Pipeline::compose(&self.stack),
            observers: self.observers,
            mime: self.mime,
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

// ── Dispatcher ────────────────────────────────────────────────────────────────

/// Per-request entry point: one frozen pipeline plus finalization state.
///
/// The bundled [`Server`] drives this for you; it is public so the
/// framework can be embedded behind any transport that speaks
/// `http::Request` / `http::Response`.
pub struct Dispatcher {
    pipeline: Pipeline,
    observers: Vec<ErrorObserver>,
    mime: Arc<dyn MimeLookup>,
}

impl Dispatcher {
    /// Handles one request: builds a fresh [`Context`], runs the composed
    /// pipeline over it, and serializes the outcome.
    ///
    /// Never returns an error — pipeline failures are mapped onto error
    /// responses here, which is the only place that performs the mapping.
    pub async fn call<B>(&self, req: http::Request<B>) -> http::Response<WireBody>
    where
        B: hyper::body::Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let (parts, body) = req.into_parts();
        debug!(method = %parts.method, path = parts.uri.path(), "request");

        let bytes = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                let e: Box<dyn std::error::Error + Send + Sync> = e.into();
                return self.fail(Error::internal(format!("failed to read request body: {e}")));
            }
        };

        let ctx = Context::new(
            Request::new(parts, bytes),
            Response::new(Arc::clone(&self.mime)),
        );

        match self.pipeline.run(ctx).await {
            Ok(ctx) => respond(ctx),
            Err(err) => self.fail(err),
        }
    }

    /// Error path: map the kind to a status, write the message as the whole
    /// body, and notify every registered observer.
    fn fail(&self, err: Error) -> http::Response<WireBody> {
        let status = err.status();
        let message = match err.message() {
            "" => "Internal error".to_owned(),
            msg => msg.to_owned(),
        };
        error!(status = status.as_u16(), "request failed: {err}");

        for observer in &self.observers {
            observer(&err);
        }

        let mut res = http::Response::new(Body::Text(message).into_wire());
        *res.status_mut() = status;
        res
    }
}

/// Success path: the only place the finished response leaves the context.
fn respond(ctx: Context) -> http::Response<WireBody> {
    let Context { mut response, .. } = ctx;
    response.mark_header_sent();
    let (status, headers, body) = response.into_parts();
    debug!(status = status.as_u16(), "response finalized");

    let mut res = http::Response::new(body.into_wire());
    *res.status_mut() = status;
    *res.headers_mut() = headers;
    res
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use bytes::Bytes;
    use http_body_util::Full;
    use serde_json::{json, Map, Value};

    use super::*;
    use crate::compose::Next;

    fn get(path: &str) -> http::Request<Full<Bytes>> {
        http::Request::builder()
            .method("GET")
            .uri(path)
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    async fn body_bytes(res: http::Response<WireBody>) -> Bytes {
        res.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn assembles_the_body_across_three_middlewares() {
        let profile = Arc::new(Mutex::new(Map::new()));

        let outermost = {
            let profile = Arc::clone(&profile);
            move |ctx: Context, next: Next| {
                let profile = Arc::clone(&profile);
                async move {
                    profile.lock().unwrap().insert("name".into(), json!("Heathcliff Huu"));
                    let mut ctx = next.run(ctx).await?;
                    let assembled = Value::Object(profile.lock().unwrap().clone());
                    ctx.set_body(assembled);
                    Ok::<_, Error>(ctx)
                }
            }
        };
        let middle = {
            let profile = Arc::clone(&profile);
            move |ctx: Context, next: Next| {
                let profile = Arc::clone(&profile);
                async move {
                    profile.lock().unwrap().insert("age".into(), json!(24));
                    next.run(ctx).await
                }
            }
        };
        let innermost = {
            let profile = Arc::clone(&profile);
            move |ctx: Context, next: Next| {
                let profile = Arc::clone(&profile);
                async move {
                    profile.lock().unwrap().insert("sex".into(), json!("Man"));
                    next.run(ctx).await
                }
            }
        };

        let dispatcher = App::new()
            .with(outermost)
            .with(middle)
            .with(innermost)
            .callback();

        let res = dispatcher.call(get("/")).await;
        assert_eq!(res.status(), http::StatusCode::OK);

        let body: Value = serde_json::from_slice(&body_bytes(res).await).unwrap();
        assert_eq!(body, json!({"name": "Heathcliff Huu", "age": 24, "sex": "Man"}));
    }

    #[tokio::test]
    async fn a_failing_middleware_becomes_a_500_with_its_message() {
        let dispatcher = App::new()
            .with(|_ctx: Context, _next: Next| async move {
                Err::<Context, _>(Error::internal("boom"))
            })
            .callback();

        let res = dispatcher.call(get("/")).await;
        assert_eq!(res.status(), http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_bytes(res).await, "boom");
    }

    #[tokio::test]
    async fn a_missing_resource_becomes_a_404() {
        let dispatcher = App::new()
            .with(|_ctx: Context, _next: Next| async move {
                let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such user");
                Err::<Context, _>(Error::from(io))
            })
            .callback();

        let res = dispatcher.call(get("/users/0")).await;
        assert_eq!(res.status(), http::StatusCode::NOT_FOUND);
        assert_eq!(body_bytes(res).await, "no such user");
    }

    #[tokio::test]
    async fn observers_hear_every_escaped_error() {
        let heard = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = App::new()
            .with(|_ctx: Context, _next: Next| async move {
                Err::<Context, _>(Error::internal("observed"))
            })
            .on_error({
                let heard = Arc::clone(&heard);
                move |err| heard.lock().unwrap().push(err.message().to_owned())
            })
            .callback();

        dispatcher.call(get("/")).await;
        assert_eq!(*heard.lock().unwrap(), ["observed"]);
    }

    #[tokio::test]
    async fn an_empty_message_falls_back_to_a_generic_one() {
        let dispatcher = App::new()
            .with(|_ctx: Context, _next: Next| async move {
                Err::<Context, _>(Error::internal(""))
            })
            .callback();

        let res = dispatcher.call(get("/")).await;
        assert_eq!(body_bytes(res).await, "Internal error");
    }

    #[tokio::test]
    async fn an_empty_stack_serves_the_default_response() {
        let res = App::new().callback().call(get("/")).await;
        assert_eq!(res.status(), http::StatusCode::OK);
        assert!(body_bytes(res).await.is_empty());
    }

    #[tokio::test]
    async fn a_cleared_body_yields_204_with_no_entity_headers() {
        let dispatcher = App::new()
            .with(|mut ctx: Context, next: Next| async move {
                ctx.response.set("content-type", "text/plain");
                ctx.set_body(Body::None);
                next.run(ctx).await
            })
            .callback();

        let res = dispatcher.call(get("/")).await;
        assert_eq!(res.status(), http::StatusCode::NO_CONTENT);
        assert!(res.headers().get("content-type").is_none());
        assert!(body_bytes(res).await.is_empty());
    }

    #[tokio::test]
    async fn a_stream_body_is_piped_to_the_client() {
        let dispatcher = App::new()
            .with(|mut ctx: Context, next: Next| async move {
                let chunks = futures::stream::iter(vec![
                    Ok(Bytes::from("chunk-1 ")),
                    Ok(Bytes::from("chunk-2")),
                ]);
                ctx.set_body(Body::stream(chunks));
                next.run(ctx).await
            })
            .callback();

        let res = dispatcher.call(get("/")).await;
        assert_eq!(body_bytes(res).await, "chunk-1 chunk-2");
    }

    #[tokio::test]
    async fn middlewares_read_the_inbound_request() {
        let dispatcher = App::new()
            .with(|mut ctx: Context, next: Next| async move {
                let echoed = format!("{} {}", ctx.request.method(), ctx.request.path());
                ctx.set_body(echoed);
                next.run(ctx).await
            })
            .callback();

        let res = dispatcher.call(get("/echo")).await;
        assert_eq!(body_bytes(res).await, "GET /echo");
    }
}
