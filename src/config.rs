//! Router options and config-file route tables.
//!
//! # Data Flow
//! ```text
//! routes.toml
//!     → RoutesConfig::load (read & deserialize)
//!     → RoutesConfig::validate (semantic checks)
//!     → RouterBuilder::from_config (compile, resolve handler names)
//!     → RouterBuilder::build → Router
//! ```
//!
//! Every field has a default so a minimal file only lists its routes.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RouteError;
use crate::method::HttpMethod;
use crate::template::TemplateStyle;

/// Knobs that change how routes are compiled and registered.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterOptions {
    /// Escape the literal text of `{variable}` templates before it is spliced
    /// into the generated regex. Off by default: `.` in `/v1.0/{id}` then
    /// matches any character.
    pub escape_literals: bool,

    /// What to do when the same method and template are registered twice.
    pub duplicates: DuplicatePolicy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Keep the first registration, log a warning.
    #[default]
    Ignore,
    /// Fail registration with [`RouteError::DuplicateRoute`].
    Reject,
}

/// Root of a routes file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutesConfig {
    pub options: RouterOptions,
    pub aliases: Vec<AliasConfig>,
    pub routes: Vec<RouteConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AliasConfig {
    /// Prefix as requested by clients (e.g. `/v1`).
    pub prefix: String,
    /// Canonical prefix it stands for (e.g. `/api/v1`).
    pub target: String,
}

/// One declared route.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    pub methods: Vec<HttpMethod>,
    pub path: String,
    /// Compiler to use; inferred from `path` when omitted.
    #[serde(default)]
    pub style: Option<TemplateStyle>,
    /// Name resolved to a handler by the caller of
    /// [`RouterBuilder::from_config`](crate::RouterBuilder::from_config).
    pub handler: String,
}

impl RoutesConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, RouteError> {
        toml::from_str(content).map_err(|e| RouteError::Config(e.to_string()))
    }

    /// Reads and parses a TOML routes file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RouteError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Semantic checks serde cannot express. Reports every problem at once.
    pub fn validate(&self) -> Result<(), RouteError> {
        let mut problems = Vec::new();
        for (i, route) in self.routes.iter().enumerate() {
            if route.methods.is_empty() {
                problems.push(format!("routes[{i}] `{}` has no methods", route.path));
            }
            if route.handler.is_empty() {
                problems.push(format!("routes[{i}] `{}` has no handler", route.path));
            }
            if !route.path.starts_with('/') {
                problems.push(format!("routes[{i}] `{}` must start with /", route.path));
            }
        }
        for (i, alias) in self.aliases.iter().enumerate() {
            if !alias.prefix.starts_with('/') || !alias.target.starts_with('/') {
                problems.push(format!("aliases[{i}] `{}` → `{}` must be absolute", alias.prefix, alias.target));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(RouteError::Config(problems.join(", ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROUTES: &str = r#"
        [options]
        escape_literals = true
        duplicates = "reject"

        [[aliases]]
        prefix = "/v1"
        target = "/api/v1"

        [[routes]]
        methods = ["GET", "HEAD"]
        path = "/api/v1/users/{id}"
        handler = "get_user"

        [[routes]]
        methods = ["POST"]
        path = "/api/v1/files/([a-z]+)"
        style = "pattern"
        handler = "upload"
    "#;

    #[test]
    fn parses_a_routes_file() {
        let config = RoutesConfig::from_toml_str(ROUTES).unwrap();
        assert!(config.options.escape_literals);
        assert_eq!(config.options.duplicates, DuplicatePolicy::Reject);
        assert_eq!(config.aliases[0].target, "/api/v1");
        assert_eq!(config.routes[0].methods, [HttpMethod::Get, HttpMethod::Head]);
        assert_eq!(config.routes[0].style, None);
        assert_eq!(config.routes[1].style, Some(TemplateStyle::Pattern));
        config.validate().unwrap();
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let config = RoutesConfig::from_toml_str("").unwrap();
        assert!(!config.options.escape_literals);
        assert_eq!(config.options.duplicates, DuplicatePolicy::Ignore);
        assert!(config.routes.is_empty());
    }

    #[test]
    fn rejects_unknown_methods() {
        let err = RoutesConfig::from_toml_str(
            r#"
            [[routes]]
            methods = ["FETCH"]
            path = "/a"
            handler = "a"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, RouteError::Config(_)));
    }

    #[test]
    fn validation_collects_every_problem() {
        let config = RoutesConfig::from_toml_str(
            r#"
            [[routes]]
            methods = []
            path = "a"
            handler = ""
            "#,
        )
        .unwrap();
        let Err(RouteError::Config(message)) = config.validate() else {
            panic!("expected a config error");
        };
        assert!(message.contains("no methods"));
        assert!(message.contains("no handler"));
        assert!(message.contains("must start with /"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(RoutesConfig::load("/nonexistent/routes.toml"), Err(RouteError::Io(_))));
    }
}
