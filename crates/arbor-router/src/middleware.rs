//! Handler and middleware types.
//!
//! A middleware is a decorator: it takes a handler and returns a new
//! handler. Chains are plain ordered lists that get folded around the
//! base handler once per dispatch; nothing in a chain is mutated after
//! registration.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::request::Request;
use crate::response::Response;

/// A boxed async handler function.
pub type Handler = Arc<dyn Fn(Request) -> BoxFuture<'static, Response> + Send + Sync>;

/// A handler decorator: wraps a handler, returns a new handler.
pub type Middleware = Arc<dyn Fn(Handler) -> Handler + Send + Sync>;

/// Lifts a plain async function into a boxed [`Handler`].
pub fn handler_fn<F, Fut>(f: F) -> Handler
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    Arc::new(move |req| Box::pin(f(req)))
}

/// Lifts a decorator closure into a boxed [`Middleware`].
pub fn middleware_fn<F>(f: F) -> Middleware
where
    F: Fn(Handler) -> Handler + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Folds a middleware chain around a base handler.
///
/// The chain is applied right-to-left so the first-registered middleware
/// ends up outermost: it runs first on the way in and last on the way
/// out.
pub fn compose(chain: &[Middleware], base: Handler) -> Handler {
    chain.iter().rev().fold(base, |handler, mw| mw(handler))
}
