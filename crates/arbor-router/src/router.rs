//! Registration facade and request dispatch.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::debug;

use crate::error::Result;
use crate::middleware::{compose, handler_fn, Handler, Middleware};
use crate::request::{Method, Request};
use crate::response::Response;
use crate::tree::RouteTree;

/// The router: owns one [`RouteTree`] and dispatches requests against it.
///
/// Build-then-serve: all registration takes `&mut self` and must finish
/// before the router is shared; dispatch takes `&self` and is safe from
/// any number of concurrent tasks.
pub struct Router {
    tree: RouteTree,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Creates a router with no routes.
    pub fn new() -> Self {
        Self {
            tree: RouteTree::new(),
        }
    }

    /// Registers a route with an explicit middleware chain.
    pub fn route(
        &mut self,
        method: Method,
        path: &str,
        handler: Handler,
        middleware: Vec<Middleware>,
    ) -> Result<()> {
        self.tree.add_route(method, path, handler, middleware)
    }

    /// Registers a GET route.
    pub fn get<F, Fut>(&mut self, path: &str, handler: F) -> Result<()>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.route(Method::Get, path, handler_fn(handler), Vec::new())
    }

    /// Registers a POST route.
    pub fn post<F, Fut>(&mut self, path: &str, handler: F) -> Result<()>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.route(Method::Post, path, handler_fn(handler), Vec::new())
    }

    /// Registers a PUT route.
    pub fn put<F, Fut>(&mut self, path: &str, handler: F) -> Result<()>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.route(Method::Put, path, handler_fn(handler), Vec::new())
    }

    /// Registers a PATCH route.
    pub fn patch<F, Fut>(&mut self, path: &str, handler: F) -> Result<()>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.route(Method::Patch, path, handler_fn(handler), Vec::new())
    }

    /// Registers a DELETE route.
    pub fn delete<F, Fut>(&mut self, path: &str, handler: F) -> Result<()>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.route(Method::Delete, path, handler_fn(handler), Vec::new())
    }

    /// Registers a HEAD route.
    pub fn head<F, Fut>(&mut self, path: &str, handler: F) -> Result<()>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.route(Method::Head, path, handler_fn(handler), Vec::new())
    }

    /// Registers an OPTIONS route.
    pub fn options<F, Fut>(&mut self, path: &str, handler: F) -> Result<()>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.route(Method::Options, path, handler_fn(handler), Vec::new())
    }

    /// The underlying route tree.
    pub fn tree(&self) -> &RouteTree {
        &self.tree
    }

    /// Dispatches one request.
    ///
    /// Looks up `(method, path)`; an unmatched lookup becomes a 404
    /// response, never an error. On a match the request gets its
    /// matched-route label and captured parameters, the route's
    /// middleware chain is folded around the handler (first registered
    /// outermost), and the composed handler runs. The pooled match
    /// result is released only after the handler completes — or when
    /// the returned future is dropped mid-flight.
    pub fn handle(&self, mut request: Request) -> BoxFuture<'_, Response> {
        Box::pin(async move {
            let matched = self.tree.lookup(request.method, &request.path);

            let Some(node) = matched.node() else {
                debug!(method = %request.method, path = %request.path, "no route matched");
                return Response::not_found();
            };
            // Matched nodes are terminal; a missing handler cannot happen.
            let Some(handler) = node.handler().map(Arc::clone) else {
                return Response::not_found();
            };

            request.matched_route = node.full_route_label();
            for (name, value) in matched.params() {
                request.params.insert(name, value);
            }

            let composed = compose(node.middleware(), handler);
            let response = composed(request).await;
            drop(matched);
            response
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::group::RouteGroup;
    use crate::middleware::middleware_fn;

    async fn hello_handler(_req: Request) -> Response {
        Response::text("Hello, World!")
    }

    async fn user_handler(req: Request) -> Response {
        let id = req.params.get("id").unwrap_or("unknown");
        Response::text(format!("User: {id}"))
    }

    #[tokio::test]
    async fn test_basic_routing() {
        let mut router = Router::new();
        router.get("/", hello_handler).unwrap();
        router.get("/users/:id", user_handler).unwrap();

        let res = router.handle(Request::get("/")).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body_string(), Some("Hello, World!".to_string()));
    }

    #[tokio::test]
    async fn test_path_params_reach_the_handler() {
        let mut router = Router::new();
        router.get("/users/:id", user_handler).unwrap();

        let res = router.handle(Request::get("/users/123")).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body_string(), Some("User: 123".to_string()));
    }

    #[tokio::test]
    async fn test_not_found() {
        let mut router = Router::new();
        router.get("/", hello_handler).unwrap();

        let res = router.handle(Request::get("/nonexistent")).await;
        assert_eq!(res.status, 404);

        // Same path, unregistered method.
        let res = router.handle(Request::post("/")).await;
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn test_matched_route_label() {
        async fn echo_route(req: Request) -> Response {
            match req.matched_route {
                Some(route) => Response::text(route.to_string()),
                None => Response::internal_server_error(),
            }
        }

        let mut router = Router::new();
        router.get("/v2/mall/transaction/:id", echo_route).unwrap();

        let res = router.handle(Request::get("/v2/mall/transaction/9")).await;
        assert_eq!(
            res.body_string(),
            Some("/v2/mall/transaction/:id".to_string())
        );
    }

    #[tokio::test]
    async fn test_first_registered_middleware_runs_outermost() {
        let log: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

        let recording = |name: &'static str| {
            let log = Arc::clone(&log);
            middleware_fn(move |next: Handler| {
                let log = Arc::clone(&log);
                Arc::new(move |req| {
                    let log = Arc::clone(&log);
                    let next = Arc::clone(&next);
                    Box::pin(async move {
                        log.lock().unwrap().push(name);
                        let res = next(req).await;
                        log.lock().unwrap().push(name);
                        res
                    })
                })
            })
        };

        let mut router = Router::new();
        router
            .route(
                Method::Get,
                "/ping",
                handler_fn(|_req| async { Response::ok() }),
                vec![recording("outer"), recording("inner")],
            )
            .unwrap();

        router.handle(Request::get("/ping")).await;
        assert_eq!(
            *log.lock().unwrap(),
            vec!["outer", "inner", "inner", "outer"]
        );
    }

    #[tokio::test]
    async fn test_group_middleware_order_at_dispatch() {
        let log: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

        let recording = |name: &'static str| {
            let log = Arc::clone(&log);
            middleware_fn(move |next: Handler| {
                let log = Arc::clone(&log);
                Arc::new(move |req| {
                    let log = Arc::clone(&log);
                    let next = Arc::clone(&next);
                    Box::pin(async move {
                        log.lock().unwrap().push(name);
                        next(req).await
                    })
                })
            })
        };

        let mut router = Router::new();
        let api = RouteGroup::new("/api").unwrap().middleware(recording("group"));
        api.route(
            &mut router,
            Method::Get,
            "/ping",
            handler_fn(|_req| async { Response::ok() }),
            vec![recording("route")],
        )
        .unwrap();

        let res = router.handle(Request::get("/api/ping")).await;
        assert_eq!(res.status, 200);
        assert_eq!(*log.lock().unwrap(), vec!["group", "route"]);
    }

    #[tokio::test]
    async fn test_concurrent_dispatch() {
        let mut router = Router::new();
        router.get("/users/:id", user_handler).unwrap();
        let router = Arc::new(router);

        let mut tasks = Vec::new();
        for i in 0..32 {
            let router = Arc::clone(&router);
            tasks.push(tokio::spawn(async move {
                let res = router.handle(Request::get(format!("/users/{i}"))).await;
                assert_eq!(res.body_string(), Some(format!("User: {i}")));
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }
    }
}
