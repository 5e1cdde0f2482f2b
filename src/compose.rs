//! Pipeline composition — the heart of the framework.
//!
//! [`Pipeline::compose`] folds the registered middlewares, right to left,
//! into a single chain of continuations:
//!
//! ```text
//! m[0] wraps m[1] wraps … wraps m[n-1] wraps (terminal no-op)
//! ```
//!
//! Each fold step binds one middleware together with the continuation built
//! in the previous step, by value, into a fresh closure. There is no shared
//! cursor anywhere: every nesting level closes over exactly its
//! next-innermost neighbour, so a composed pipeline is frozen — mutating the
//! application's stack afterwards cannot reach a pipeline that is already
//! executing.
//!
//! At request time a middleware that awaits [`Next::run`] is suspended until
//! every inner layer (and whatever those layers themselves await) has
//! completed. Code before the await runs outer-to-inner, code after it runs
//! inner-to-outer.

use std::sync::Arc;

use crate::context::Context;
use crate::error::Error;
use crate::middleware::{BoxFuture, BoxedMiddleware};

/// One bound link of the chain: runs a middleware (or the terminal no-op)
/// over the context it is given.
type Continuation = Arc<dyn Fn(Context) -> BoxFuture + Send + Sync + 'static>;

/// The continuation handed to a middleware.
///
/// Invoking [`run`](Next::run) executes all layers registered after the
/// current one and resolves once they complete. `run` consumes the `Next`,
/// so invoking a continuation twice — which would re-run the remaining
/// inner chain — is a compile error rather than a runtime surprise. Not
/// calling it at all is fine and short-circuits every inner layer.
pub struct Next {
    inner: Continuation,
}

impl Next {
    /// Runs the remaining inner middlewares over `ctx`, handing the context
    /// back when the innermost layer has completed.
    pub async fn run(self, ctx: Context) -> Result<Context, Error> {
        (self.inner)(ctx).await
    }
}

/// The composed pipeline: a single callable executing the whole stack in
/// nested order.
pub(crate) struct Pipeline {
    entry: Continuation,
}

impl Pipeline {
    /// Right-to-left fold over the stack.
    ///
    /// Starts from the terminal no-op and wraps one middleware per step, so
    /// that after the fold the entry point runs the first-registered
    /// middleware as the outermost layer. An empty stack composes to the
    /// terminal no-op itself.
    pub(crate) fn compose(stack: &[BoxedMiddleware]) -> Self {
        let mut next: Continuation =
            Arc::new(|ctx: Context| -> BoxFuture { Box::pin(async move { Ok(ctx) }) });
        for middleware in stack.iter().rev() {
            next = bind(Arc::clone(middleware), next);
        }
        Self { entry: next }
    }

    pub(crate) async fn run(&self, ctx: Context) -> Result<Context, Error> {
        (self.entry)(ctx).await
    }
}

/// Binds one middleware and its inner continuation into a new continuation.
/// A fresh [`Next`] is minted per invocation, so concurrent requests through
/// the same pipeline never share continuation state.
fn bind(middleware: BoxedMiddleware, inner: Continuation) -> Continuation {
    Arc::new(move |ctx: Context| -> BoxFuture {
        middleware.call(ctx, Next { inner: Arc::clone(&inner) })
    })
}
