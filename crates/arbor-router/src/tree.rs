//! The per-method route trie and the pooled match result.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use crate::error::{Result, RouteError};
use crate::middleware::{Handler, Middleware};
use crate::node::Node;
use crate::request::Method;

/// Free list of parameter maps reused across lookups.
///
/// The only mutable state shared between in-flight requests; acquire and
/// release are safe from any number of concurrent tasks. A released map
/// is cleared before it re-enters the list, so captured values never leak
/// into another request.
pub(crate) struct MatchPool {
    free: Mutex<Vec<HashMap<String, String>>>,
}

impl MatchPool {
    fn new() -> Self {
        Self {
            free: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn acquire(&self) -> HashMap<String, String> {
        self.free
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop()
            .unwrap_or_default()
    }

    pub(crate) fn release(&self, mut params: HashMap<String, String>) {
        params.clear();
        self.free
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(params);
    }

    #[cfg(test)]
    fn idle(&self) -> usize {
        self.free
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// The result of one route lookup.
///
/// Holds the matched terminal node (if any) and the captured path
/// parameters. The parameter map is borrowed from the tree's pool and
/// goes back on drop — cleared first — so release happens on every exit
/// path, including when the owning task is cancelled mid-request.
pub struct RouteMatch<'t> {
    pool: &'t MatchPool,
    node: Option<&'t Node>,
    params: HashMap<String, String>,
}

impl<'t> RouteMatch<'t> {
    fn unmatched(pool: &'t MatchPool, params: HashMap<String, String>) -> Self {
        Self {
            pool,
            node: None,
            params,
        }
    }

    /// Whether a registered route terminated at the looked-up path.
    pub fn is_matched(&self) -> bool {
        self.node.is_some()
    }

    /// The matched terminal node.
    pub fn node(&self) -> Option<&'t Node> {
        self.node
    }

    /// The handler registered at the matched node.
    pub fn handler(&self) -> Option<&'t Handler> {
        self.node.and_then(Node::handler)
    }

    /// One captured path parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// All captured path parameters.
    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of captured parameters.
    pub fn param_count(&self) -> usize {
        self.params.len()
    }
}

impl Drop for RouteMatch<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.params));
    }
}

/// One segment trie per HTTP method, plus the match pool.
///
/// Build-then-serve: registration needs `&mut self`, lookups take
/// `&self`, so all registration happens-before the first concurrent
/// lookup by construction.
pub struct RouteTree {
    roots: HashMap<Method, Node>,
    pool: MatchPool,
}

impl Default for RouteTree {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self {
            roots: HashMap::new(),
            pool: MatchPool::new(),
        }
    }

    /// Registers a route.
    ///
    /// Segments are dispatched on their literal text: `*` is a wildcard,
    /// a leading `:` declares a parameter, a leading `re:` declares a
    /// regex pattern, anything else matches statically. Fails on a
    /// malformed path, a duplicate route, or a conflicting wildcard /
    /// param / regex registration at one trie position.
    pub fn add_route(
        &mut self,
        method: Method,
        path: &str,
        handler: Handler,
        middleware: Vec<Middleware>,
    ) -> Result<()> {
        if path.is_empty() {
            return Err(RouteError::EmptyPath);
        }
        if !path.starts_with('/') {
            return Err(RouteError::MissingLeadingSlash {
                path: path.to_string(),
            });
        }

        let mut node = self.roots.entry(method).or_insert_with(Node::root);

        let trimmed = path.trim_matches('/');
        if !trimmed.is_empty() {
            for segment in trimmed.split('/') {
                if segment.is_empty() {
                    return Err(RouteError::EmptySegment {
                        path: path.to_string(),
                    });
                }
                node = node.add_child(segment, path)?;
            }
        }

        if node.has_handler() {
            return Err(RouteError::DuplicateRoute {
                method: method.to_string(),
                path: path.to_string(),
            });
        }
        node.install(path, handler, middleware);
        debug!(method = %method, path = %path, "route registered");
        Ok(())
    }

    /// Looks up the route for a request path.
    ///
    /// Per-segment precedence: regex child first (a matching regex node
    /// answers for the whole remaining path; a non-matching one fails the
    /// lookup), then exact static child, then wildcard child, then param
    /// child. A wildcard node with no more specific child keeps absorbing
    /// segments, so wildcards match multi-segment tails and can reappear
    /// mid-path. Greedy, no backtracking.
    ///
    /// A path whose node exists but carries no handler is unmatched.
    pub fn lookup(&self, method: Method, path: &str) -> RouteMatch<'_> {
        let mut params = self.pool.acquire();

        let Some(root) = self.roots.get(&method) else {
            return RouteMatch::unmatched(&self.pool, params);
        };

        let trimmed = path.trim_matches('/');
        if trimmed.is_empty() {
            return RouteMatch {
                pool: &self.pool,
                node: root.has_handler().then_some(root),
                params,
            };
        }

        let mut node = root;
        for segment in trimmed.split('/') {
            if let Some((re, child)) = node.regex_child() {
                // A regex node is a leaf-capturing device: on a segment
                // match it consumes the rest of the path in one shot.
                if re.is_match(segment) && child.has_handler() {
                    return RouteMatch {
                        pool: &self.pool,
                        node: Some(child),
                        params,
                    };
                }
                return RouteMatch::unmatched(&self.pool, params);
            }

            if let Some(child) = node.static_child(segment) {
                node = child;
                continue;
            }
            if let Some(child) = node.wildcard_child() {
                node = child;
                continue;
            }
            if let Some((name, child)) = node.param_child() {
                params.insert(name.to_string(), segment.to_string());
                node = child;
                continue;
            }
            if node.is_wildcard() {
                // Still inside the wildcard subtree; absorb the segment.
                continue;
            }

            return RouteMatch::unmatched(&self.pool, params);
        }

        RouteMatch {
            pool: &self.pool,
            node: node.has_handler().then_some(node),
            params,
        }
    }
}
