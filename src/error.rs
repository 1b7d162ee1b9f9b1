//! Unified error type.

use thiserror::Error;

use crate::method::HttpMethod;

/// The error type returned by pathwise's fallible operations.
///
/// A request path that matches no route is *not* an error:
/// [`Router::resolve`](crate::Router::resolve) returns `Ok(None)` for it.
/// Everything here is either a malformed request path or a registration
/// problem detected while the router is being built.
#[derive(Debug, Error)]
pub enum RouteError {
    /// The raw path cannot be normalized.
    #[error("invalid path `{path}`: {reason}")]
    InvalidPath { path: String, reason: &'static str },

    /// The template was handed to the wrong compiler for its style.
    #[error("unsupported template `{template}`: {reason}")]
    UnsupportedTemplate { template: String, reason: &'static str },

    /// The generated (or declared) regular expression does not compile.
    #[error("invalid pattern in template `{template}`: {source}")]
    InvalidPattern {
        template: String,
        #[source]
        source: regex::Error,
    },

    /// Same method and same template registered twice under the `reject` policy.
    #[error("duplicate route {method} {template}")]
    DuplicateRoute { method: HttpMethod, template: String },

    /// A trie node ran out of size classes.
    #[error("trie node `{prefix}` exceeds the maximum fan-out")]
    NodeCapacity { prefix: String },

    #[error("unknown http method `{0}`")]
    UnknownMethod(String),

    /// A configured route references a handler the caller could not supply.
    #[error("no handler named `{name}`")]
    UnknownHandler { name: String },

    #[error("config: {0}")]
    Config(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl RouteError {
    pub(crate) fn invalid_path(path: &str, reason: &'static str) -> Self {
        Self::InvalidPath { path: path.to_owned(), reason }
    }

    pub(crate) fn unsupported(template: &str, reason: &'static str) -> Self {
        Self::UnsupportedTemplate { template: template.to_owned(), reason }
    }
}
