//! # arbor-router
//!
//! A trie-based URL routing library with middleware support.
//!
//! This crate provides:
//! - A per-HTTP-method segment trie with four segment kinds: static
//!   literals, `:name` parameters, `*` wildcards, and `re:<pattern>`
//!   regular expressions
//! - Path parameter capture into a pooled, per-request match result
//! - Per-route middleware chains (handler decorators)
//! - Route groups with nested prefixes and inherited middleware
//!
//! ## Quick Start
//!
//! ```ignore
//! use arbor_router::{Router, Request, Response};
//!
//! async fn hello_handler(_req: Request) -> Response {
//!     Response::text("Hello, World!")
//! }
//!
//! async fn user_handler(req: Request) -> Response {
//!     let id = req.params.get("id").unwrap_or("unknown");
//!     Response::json(&serde_json::json!({"id": id}))
//! }
//!
//! let mut router = Router::new();
//! router.get("/", hello_handler)?;
//! router.get("/users/:id", user_handler)?;
//!
//! // Handle a request
//! let response = router.handle(Request::get("/users/123")).await;
//! ```
//!
//! ## Path Syntax
//!
//! Registered paths are split on `/` and each segment is dispatched on
//! its literal text:
//!
//! - `users` — static segment, matched exactly
//! - `:id` — parameter segment, captures exactly one path segment
//! - `*` — wildcard segment, absorbs this and any following segments
//!   until a more specific child matches again
//! - `re:^\d+$` — regex segment, tested against one segment and then
//!   absorbing the remainder of the path
//!
//! Per-segment matching precedence is regex, then static, then wildcard,
//! then parameter; greedy, without backtracking. Conflicting wildcard /
//! param / regex registrations at the same trie position are rejected at
//! registration time.
//!
//! ## Middleware
//!
//! A middleware wraps a handler and returns a new handler. Chains are
//! folded around the route's handler at dispatch so the first-registered
//! middleware runs outermost:
//!
//! ```ignore
//! use arbor_router::{middleware_fn, Handler};
//! use std::sync::Arc;
//!
//! let logging = middleware_fn(|next: Handler| {
//!     Arc::new(move |req| {
//!         let next = Arc::clone(&next);
//!         Box::pin(async move {
//!             tracing::info!(path = %req.path, "request");
//!             next(req).await
//!         })
//!     })
//! });
//! router.route(Method::Get, "/", handler, vec![logging])?;
//! ```
//!
//! ## Route Groups
//!
//! ```ignore
//! use arbor_router::RouteGroup;
//!
//! let api = RouteGroup::new("/api")?.middleware(auth);
//! let v1 = api.group("/v1")?;
//! v1.route(&mut router, Method::Get, "/users/:id", get_user, vec![])?;
//! // registered as GET /api/v1/users/:id, running `auth` outermost
//! ```
//!
//! ## Concurrency
//!
//! Registration takes `&mut Router` and serving takes `&Router`, so the
//! route tree is immutable once shared: concurrent dispatch needs no
//! locking. The per-request match result is drawn from an internal pool
//! and returns to it when dropped.

mod error;
mod group;
mod middleware;
mod node;
mod request;
mod response;
mod router;
mod tree;

pub use error::{Result, RouteError};
pub use group::RouteGroup;
pub use middleware::{compose, handler_fn, middleware_fn, Handler, Middleware};
pub use node::Node;
pub use request::{Method, PathParams, Request};
pub use response::Response;
pub use router::Router;
pub use tree::{RouteMatch, RouteTree};
