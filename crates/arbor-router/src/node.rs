//! Trie vertex for one path segment.

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;

use crate::error::{Result, RouteError};
use crate::middleware::{Handler, Middleware};

/// The four recognized path-segment kinds.
///
/// Closed sum: matching code dispatches on this exhaustively.
#[derive(Debug)]
pub(crate) enum NodeKind {
    /// Literal segment, matched by exact text.
    Static,
    /// `*` — consumes this segment and absorbs any following ones.
    Wildcard,
    /// `:name` — consumes exactly one segment and records it.
    Param(String),
    /// `re:<pattern>` — tests one segment, then absorbs the remainder.
    Regex(Regex),
}

impl NodeKind {
    fn label(&self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Wildcard => "wildcard",
            Self::Param(_) => "param",
            Self::Regex(_) => "regex",
        }
    }
}

/// One trie vertex: a path segment, its children, and (if a route
/// terminates here) the route's handler and middleware chain.
///
/// Static children live in a map keyed by literal text. The wildcard,
/// param, and regex children are mutually exclusive, so they share a
/// single slot; the kind of the boxed node tells them apart.
pub struct Node {
    kind: NodeKind,
    segment: String,
    children: HashMap<String, Node>,
    special: Option<Box<Node>>,
    handler: Option<Handler>,
    middleware: Vec<Middleware>,
    full_route: Option<Arc<str>>,
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("kind", &self.kind)
            .field("segment", &self.segment)
            .field("children", &self.children)
            .field("special", &self.special)
            .field("full_route", &self.full_route)
            .finish_non_exhaustive()
    }
}

impl Node {
    pub(crate) fn new(kind: NodeKind, segment: impl Into<String>) -> Self {
        Self {
            kind,
            segment: segment.into(),
            children: HashMap::new(),
            special: None,
            handler: None,
            middleware: Vec::new(),
            full_route: None,
        }
    }

    pub(crate) fn root() -> Self {
        Self::new(NodeKind::Static, "/")
    }

    /// The literal text (static) or declared pattern (`:name`, `*`,
    /// `re:<pattern>`) this node was registered under.
    pub fn segment(&self) -> &str {
        &self.segment
    }

    /// The complete registered path, set only on terminal nodes.
    pub fn full_route(&self) -> Option<&str> {
        self.full_route.as_deref()
    }

    pub(crate) fn full_route_label(&self) -> Option<Arc<str>> {
        self.full_route.clone()
    }

    /// The handler registered at this node, if a route terminates here.
    pub fn handler(&self) -> Option<&Handler> {
        self.handler.as_ref()
    }

    /// The middleware chain bound to this route, in registration order.
    pub fn middleware(&self) -> &[Middleware] {
        &self.middleware
    }

    pub(crate) fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    pub(crate) fn is_wildcard(&self) -> bool {
        matches!(self.kind, NodeKind::Wildcard)
    }

    /// Installs a route terminating at this node. The caller has already
    /// rejected duplicates via [`Node::has_handler`].
    pub(crate) fn install(&mut self, full_route: &str, handler: Handler, middleware: Vec<Middleware>) {
        self.handler = Some(handler);
        self.full_route = Some(Arc::from(full_route));
        self.middleware = middleware;
    }

    /// Walks to (creating on demand) the child for one registered
    /// segment. Re-walking an existing segment of the same kind and
    /// name/pattern returns the existing node; conflicting kinds or
    /// names/patterns at one position are registration errors.
    pub(crate) fn add_child(&mut self, segment: &str, route: &str) -> Result<&mut Node> {
        if segment == "*" {
            return self.add_wildcard_child(route);
        }
        if let Some(name) = segment.strip_prefix(':') {
            return self.add_param_child(name, route);
        }
        if let Some(pattern) = segment.strip_prefix("re:") {
            return self.add_regex_child(pattern, route);
        }

        Ok(self
            .children
            .entry(segment.to_string())
            .or_insert_with(|| Node::new(NodeKind::Static, segment)))
    }

    fn add_wildcard_child(&mut self, route: &str) -> Result<&mut Node> {
        if let Some(existing) = self.special.as_deref() {
            if !existing.is_wildcard() {
                return Err(RouteError::KindConflict {
                    path: route.to_string(),
                    existing: existing.kind.label(),
                    requested: "wildcard",
                });
            }
        }

        if self.special.is_none() {
            self.special = Some(Box::new(Node::new(NodeKind::Wildcard, "*")));
        }
        Ok(self.special_child_mut())
    }

    fn add_param_child(&mut self, name: &str, route: &str) -> Result<&mut Node> {
        if let Some(existing) = self.special.as_deref() {
            match &existing.kind {
                NodeKind::Param(existing_name) => {
                    if existing_name != name {
                        return Err(RouteError::ParamNameConflict {
                            path: route.to_string(),
                            existing: existing_name.clone(),
                            requested: name.to_string(),
                        });
                    }
                }
                other => {
                    return Err(RouteError::KindConflict {
                        path: route.to_string(),
                        existing: other.label(),
                        requested: "param",
                    });
                }
            }
        }

        if self.special.is_none() {
            self.special = Some(Box::new(Node::new(
                NodeKind::Param(name.to_string()),
                format!(":{name}"),
            )));
        }
        Ok(self.special_child_mut())
    }

    fn add_regex_child(&mut self, pattern: &str, route: &str) -> Result<&mut Node> {
        match self.special.as_deref() {
            Some(existing) => match &existing.kind {
                NodeKind::Regex(existing_re) if existing_re.as_str() == pattern => {}
                NodeKind::Regex(existing_re) => {
                    return Err(RouteError::PatternConflict {
                        path: route.to_string(),
                        existing: existing_re.as_str().to_string(),
                        requested: pattern.to_string(),
                    });
                }
                other => {
                    return Err(RouteError::KindConflict {
                        path: route.to_string(),
                        existing: other.label(),
                        requested: "regex",
                    });
                }
            },
            None => {
                // Compiled once here; lookups only ever run is_match.
                let re = Regex::new(pattern).map_err(|e| RouteError::InvalidPattern {
                    pattern: pattern.to_string(),
                    source: Box::new(e),
                })?;
                self.special = Some(Box::new(Node::new(
                    NodeKind::Regex(re),
                    format!("re:{pattern}"),
                )));
            }
        }

        Ok(self.special_child_mut())
    }

    /// The occupied special slot. Callers have just checked or filled it;
    /// the borrow checker cannot carry that proof across the mutation.
    fn special_child_mut(&mut self) -> &mut Node {
        match self.special.as_deref_mut() {
            Some(child) => child,
            None => unreachable!("special slot checked by caller"),
        }
    }

    /// Exact static child by literal segment text.
    pub(crate) fn static_child(&self, segment: &str) -> Option<&Node> {
        self.children.get(segment)
    }

    pub(crate) fn wildcard_child(&self) -> Option<&Node> {
        self.special
            .as_deref()
            .filter(|child| matches!(child.kind, NodeKind::Wildcard))
    }

    /// The param child together with its declared name.
    pub(crate) fn param_child(&self) -> Option<(&str, &Node)> {
        match self.special.as_deref() {
            Some(child) => match &child.kind {
                NodeKind::Param(name) => Some((name.as_str(), child)),
                _ => None,
            },
            None => None,
        }
    }

    /// The regex child together with its compiled pattern.
    pub(crate) fn regex_child(&self) -> Option<(&Regex, &Node)> {
        match self.special.as_deref() {
            Some(child) => match &child.kind {
                NodeKind::Regex(re) => Some((re, child)),
                _ => None,
            },
            None => None,
        }
    }
}
