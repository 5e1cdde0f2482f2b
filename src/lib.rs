//! # negi
//!
//! A tiny onion-model middleware framework for async HTTP services.
//! Nothing more. Nothing less.
//!
//! ## The contract
//!
//! You register a stack of async middlewares. negi composes them into one
//! pipeline where each middleware wraps everything registered after it:
//! code before `next.run(ctx).await` runs outer-to-inner, code after it
//! runs inner-to-outer, and a middleware that skips `next` short-circuits
//! the rest of the stack. One mutable [`Context`] per request carries the
//! inbound view and the pending response through every layer.
//!
//! What negi intentionally leaves to you or your proxy:
//!
//! - **Routing** — a middleware that matches `ctx.request.path()` is ten
//!   lines; bring your own matcher if you need more
//! - **Sessions, cookies, templating** — payload concerns, not pipeline
//!   concerns
//! - **TLS, rate limiting, body-size limits** — nginx / ingress already
//!   ships these, tested at scale
//!
//! What's left — the only part that changes between applications:
//!
//! - The composition engine and its suspension contract
//! - The per-request [`Context`] with its status/body/header invariants
//! - Async I/O — tokio + hyper, HTTP/1.1 and HTTP/2
//! - Graceful shutdown — SIGTERM / Ctrl-C, drains in-flight requests
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use negi::{App, Context, Error, Next};
//!
//! async fn timing(ctx: Context, next: Next) -> Result<Context, Error> {
//!     let start = std::time::Instant::now();
//!     let mut ctx = next.run(ctx).await?;
//!     let elapsed = format!("{}us", start.elapsed().as_micros());
//!     ctx.response.set("x-response-time", &elapsed);
//!     Ok(ctx)
//! }
//!
//! async fn hello(mut ctx: Context, next: Next) -> Result<Context, Error> {
//!     ctx.set_body(format!("hello from {}", ctx.request.path()));
//!     next.run(ctx).await
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     App::new()
//!         .with(timing)
//!         .with(hello)
//!         .listen("0.0.0.0:3000")
//!         .await
//!         .expect("server error");
//! }
//! ```

mod app;
mod body;
mod compose;
mod context;
mod error;
mod middleware;
mod mime;
mod request;
mod response;
mod server;

pub use app::{App, Dispatcher};
pub use body::{Body, BodyStream, WireBody};
pub use compose::Next;
pub use context::Context;
pub use error::{Error, ErrorKind};
pub use middleware::Middleware;
pub use mime::{MimeLookup, MimeTable};
pub use request::Request;
pub use response::Response;
pub use server::Server;
