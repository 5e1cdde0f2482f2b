//! Middleware trait and type erasure.
//!
//! # How async middlewares are stored
//!
//! The application holds middlewares of *different* types in one ordered
//! `Vec`. Rust collections can only hold one concrete type, so we use
//! **trait objects** (`dyn ErasedMiddleware`) to hide the concrete type
//! behind a common interface and store everything uniformly.
//!
//! The chain from user code to vtable call is:
//!
//! ```text
//! async fn trace(ctx: Context, next: Next) -> Result<Context, Error> { … }
//!        ↓ app.with(trace)
//! trace.into_boxed_middleware()                    ← Middleware blanket impl
//!        ↓
//! Arc::new(FnMiddleware(trace))                    ← heap-allocated wrapper
//!        ↓  stored as BoxedMiddleware = Arc<dyn ErasedMiddleware>
//! middleware.call(ctx, next)  at request time      ← one vtable dispatch
//!        ↓
//! Box::pin(trace(ctx, next))                       ← BoxFuture
//! ```
//!
//! The only runtime cost per request and layer is **one Arc clone** (atomic
//! inc) + **one virtual call** — negligible compared to network I/O.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::compose::Next;
use crate::context::Context;
use crate::error::Error;

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future resolving to the context (or an
/// error that aborts the request).
///
/// `Pin<Box<…>>` is required because the async runtime must be able to poll
/// the future in-place — it cannot move it in memory after the first poll.
/// `Send + 'static` let tokio move the future across threads safely.
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Result<Context, Error>> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Middleware` trait's `into_boxed_middleware`
/// method. External crates cannot usefully interact with this trait.
#[doc(hidden)]
pub trait ErasedMiddleware {
    fn call(&self, ctx: Context, next: Next) -> BoxFuture;
}

/// A heap-allocated, type-erased middleware shared by every pipeline link
/// that wraps it.
///
/// `#[doc(hidden)] pub` for the same reason as `ErasedMiddleware`.
#[doc(hidden)]
pub type BoxedMiddleware = Arc<dyn ErasedMiddleware + Send + Sync + 'static>;

// ── Public Middleware trait ───────────────────────────────────────────────────

/// Implemented for every valid middleware.
///
/// You never implement this yourself. It is automatically satisfied for any
/// `async fn` (or closure) with the signature:
///
/// ```text
/// async fn name(ctx: Context, next: Next) -> Result<Context, Error>
/// ```
///
/// Call `next.run(ctx).await` to run the layers registered after this one,
/// and get the context back once they complete; skip the call to
/// short-circuit them. Return `Err` to abort the request — the dispatcher
/// maps the error onto a status code and body.
///
/// The trait is **sealed** (via the private `Sealed` supertrait): only the
/// blanket impl below can satisfy it. This keeps the middleware contract
/// stable across versions.
pub trait Middleware: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_middleware(self) -> BoxedMiddleware;
}

/// The sealing module. Because `Sealed` is private, external crates cannot
/// name it and therefore cannot implement `Middleware` on their own types.
mod private {
    pub trait Sealed {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

impl<F, Fut> private::Sealed for F
where
    F: Fn(Context, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Context, Error>> + Send + 'static,
{
}

impl<F, Fut> Middleware for F
where
    F: Fn(Context, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Context, Error>> + Send + 'static,
{
    fn into_boxed_middleware(self) -> BoxedMiddleware {
        Arc::new(FnMiddleware(self))
    }
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

/// Newtype wrapper that holds a concrete middleware `F` and implements
/// [`ErasedMiddleware`], bridging the typed world to the trait-object world.
struct FnMiddleware<F>(F);

impl<F, Fut> ErasedMiddleware for FnMiddleware<F>
where
    F: Fn(Context, Next) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Context, Error>> + Send + 'static,
{
    fn call(&self, ctx: Context, next: Next) -> BoxFuture {
        Box::pin((self.0)(ctx, next))
    }
}
