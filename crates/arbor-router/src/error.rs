//! Error types for routing.

use thiserror::Error;

/// Route registration errors.
///
/// All variants are programmer errors surfaced while the route table is
/// being built; they should abort startup (`?` in `main`), never occur
/// from runtime traffic. A request that matches nothing is an ordinary
/// unmatched lookup, not an error.
#[derive(Debug, Error)]
pub enum RouteError {
    /// The registered path was empty.
    #[error("path is empty")]
    EmptyPath,

    /// The registered path did not start with `/`.
    #[error("path must start with '/': {path}")]
    MissingLeadingSlash { path: String },

    /// The registered path contained consecutive `/`.
    #[error("path contains an empty segment: {path}")]
    EmptySegment { path: String },

    /// A handler is already registered at this exact path.
    #[error("route already exists: {method} {path}")]
    DuplicateRoute { method: String, path: String },

    /// A wildcard, param, or regex child of a different kind already
    /// exists at this trie position.
    #[error("cannot register {requested} segment: a {existing} segment is already registered at this position (route {path})")]
    KindConflict {
        path: String,
        existing: &'static str,
        requested: &'static str,
    },

    /// A param child with a different name already exists at this trie
    /// position.
    #[error("conflicting parameter name at one position: ':{existing}' vs ':{requested}' (route {path})")]
    ParamNameConflict {
        path: String,
        existing: String,
        requested: String,
    },

    /// A regex child with a different pattern already exists at this
    /// trie position.
    #[error("conflicting regex pattern at one position: '{existing}' vs '{requested}' (route {path})")]
    PatternConflict {
        path: String,
        existing: String,
        requested: String,
    },

    /// A `re:` segment did not compile.
    #[error("invalid regex pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: Box<regex::Error>,
    },
}

/// Result type alias for registration operations.
pub type Result<T> = std::result::Result<T, RouteError>;
