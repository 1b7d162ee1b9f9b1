//! # pathwise
//!
//! Maps an HTTP method and a request path to a registered handler in
//! O(path-length), for three kinds of routes:
//!
//! - **literal**: `/healthz`, served from a per-method hash table
//! - **variable**: `/users/{id}`, one path segment per variable
//! - **pattern**: `/files/([a-z]+)\.txt`, free-form regex groups
//!
//! Dynamic routes live in a per-method adaptive radix trie keyed by the route's
//! *shape* (`/users/*`). The trie finds the candidate structurally; the route's
//! regex then validates the full path and extracts the values. Alias prefixes
//! (`/v1` → `/api/v1`) are tried when the path as requested misses.
//!
//! The router does not call handlers, parse bodies or check permissions. The
//! handler type `H` is opaque and comes back verbatim.
//!
//! ## Quick start
//!
//! ```rust
//! use pathwise::{HttpMethod, RouteDeclaration, RouterBuilder};
//!
//! # fn main() -> Result<(), pathwise::RouteError> {
//! let mut builder = RouterBuilder::new();
//! builder
//!     .add_routes([
//!         RouteDeclaration::new([HttpMethod::Get], "/users/me", "current_user"),
//!         RouteDeclaration::new([HttpMethod::Get], "/users/{id}", "get_user"),
//!         RouteDeclaration::new([HttpMethod::Get], r"/files/([a-z]+)\.txt", "get_file"),
//!     ])?
//!     .add_alias("/v1", "/")?;
//! let router = builder.build()?;
//!
//! let found = router.resolve(HttpMethod::Get, "/v1/users/42")?.unwrap();
//! assert_eq!(*found.handler(), "get_user");
//! assert_eq!(found.param("id"), Some("42"));
//!
//! let found = router.resolve(HttpMethod::Get, "/files/report.txt")?.unwrap();
//! assert_eq!(found.group(1), Some("report"));
//!
//! assert!(router.resolve(HttpMethod::Get, "/nothing/here")?.is_none());
//! # Ok(())
//! # }
//! ```

mod builder;
mod error;
mod exact;
mod mapping;
mod method;
mod path;
mod router;
mod template;
mod trie;

pub mod config;
pub mod telemetry;

pub use builder::RouterBuilder;
pub use config::{DuplicatePolicy, RouterOptions, RoutesConfig};
pub use error::RouteError;
pub use exact::ExactRouteTable;
pub use mapping::{PathParams, RouteDeclaration, RouteMapping, RouteMatch, RouteSource};
pub use method::HttpMethod;
pub use path::normalize;
pub use router::Router;
pub use telemetry::{LatencyObserver, TracingObserver};
pub use template::{RouteTemplate, TemplateStyle};
pub use trie::RouteTrie;
