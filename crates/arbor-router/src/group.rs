//! Route groups: prefix and middleware scoping for registration.

use crate::error::{Result, RouteError};
use crate::middleware::{Handler, Middleware};
use crate::request::Method;
use crate::router::Router;

/// A registration-time scope: a path prefix plus middleware that every
/// route registered through the group inherits.
///
/// Groups nest. A child keeps a non-owning back-reference to its parent
/// and, at registration time, walks the parent links to compute the
/// absolute path (prefixes concatenated root-to-leaf) and the effective
/// middleware chain (inherited middleware before the group's own, so the
/// outermost scope runs first). Groups play no role during matching.
pub struct RouteGroup<'p> {
    base_path: String,
    middleware: Vec<Middleware>,
    parent: Option<&'p RouteGroup<'p>>,
}

impl<'p> RouteGroup<'p> {
    /// Creates a root scope with the given prefix.
    pub fn new(prefix: &str) -> Result<Self> {
        if prefix.is_empty() {
            return Err(RouteError::EmptyPath);
        }
        if !prefix.starts_with('/') {
            return Err(RouteError::MissingLeadingSlash {
                path: prefix.to_string(),
            });
        }
        Ok(Self {
            base_path: prefix.to_string(),
            middleware: Vec::new(),
            parent: None,
        })
    }

    /// Creates a nested scope under this one.
    pub fn group(&self, prefix: &str) -> Result<RouteGroup<'_>> {
        let mut child = RouteGroup::new(prefix)?;
        child.parent = Some(self);
        Ok(child)
    }

    /// Appends group-local middleware.
    pub fn use_middleware(&mut self, mw: Middleware) {
        self.middleware.push(mw);
    }

    /// Builder-style variant of [`RouteGroup::use_middleware`].
    #[must_use]
    pub fn middleware(mut self, mw: Middleware) -> Self {
        self.middleware.push(mw);
        self
    }

    /// Registers a route under this scope.
    ///
    /// The route's middleware runs inside the inherited chain: ancestors
    /// first, then this group's, then `middleware`.
    pub fn route(
        &self,
        router: &mut Router,
        method: Method,
        relative_path: &str,
        handler: Handler,
        middleware: Vec<Middleware>,
    ) -> Result<()> {
        let mut chain = self.middleware_chain();
        chain.extend(middleware);

        let path = format!("{}{relative_path}", self.abs_path());
        router.route(method, &path, handler, chain)
    }

    fn abs_path(&self) -> String {
        match self.parent {
            Some(parent) => parent.abs_path() + &self.base_path,
            None => self.base_path.clone(),
        }
    }

    fn middleware_chain(&self) -> Vec<Middleware> {
        let mut chain = match self.parent {
            Some(parent) => parent.middleware_chain(),
            None => Vec::new(),
        };
        chain.extend(self.middleware.iter().cloned());
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::{handler_fn, middleware_fn};
    use crate::response::Response;

    fn noop() -> Handler {
        handler_fn(|_req| async { Response::ok() })
    }

    #[test]
    fn test_prefix_validation() {
        assert!(matches!(RouteGroup::new(""), Err(RouteError::EmptyPath)));
        assert!(matches!(
            RouteGroup::new("api"),
            Err(RouteError::MissingLeadingSlash { .. })
        ));
    }

    #[test]
    fn test_nested_prefix_concatenation() {
        let api = RouteGroup::new("/api").unwrap();
        let v1 = api.group("/v1").unwrap();
        let users = v1.group("/users").unwrap();

        let mut router = Router::new();
        users
            .route(&mut router, Method::Get, "/:id", noop(), Vec::new())
            .unwrap();

        let m = router.tree().lookup(Method::Get, "/api/v1/users/42");
        assert!(m.is_matched());
        assert_eq!(m.param("id"), Some("42"));
        assert_eq!(
            m.node().and_then(crate::node::Node::full_route),
            Some("/api/v1/users/:id")
        );
    }

    #[test]
    fn test_inherited_chain_is_parent_before_own() {
        let passthrough = || middleware_fn(|next| next);

        let api = RouteGroup::new("/api").unwrap().middleware(passthrough());
        let mut v1 = api.group("/v1").unwrap();
        v1.use_middleware(passthrough());

        let mut router = Router::new();
        v1.route(
            &mut router,
            Method::Get,
            "/ping",
            noop(),
            vec![passthrough()],
        )
        .unwrap();

        let m = router.tree().lookup(Method::Get, "/api/v1/ping");
        // api (inherited) + v1 (own) + route-local
        assert_eq!(m.node().map(|n| n.middleware().len()), Some(3));
    }

    #[test]
    fn test_group_registration_errors_propagate() {
        let api = RouteGroup::new("/api").unwrap();
        let mut router = Router::new();
        api.route(&mut router, Method::Get, "/ping", noop(), Vec::new())
            .unwrap();
        let err = api
            .route(&mut router, Method::Get, "/ping", noop(), Vec::new())
            .unwrap_err();
        assert!(matches!(err, RouteError::DuplicateRoute { .. }));
    }
}
