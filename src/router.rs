//! The immutable request router.
//!
//! One exact table and one trie per HTTP method, indexed by
//! [`HttpMethod::ordinal`]. Built once by [`RouterBuilder`](crate::RouterBuilder);
//! afterwards nothing is written again, so a `Router` can be shared behind an
//! `Arc` by any number of threads without locking.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tracing::trace;

use crate::error::RouteError;
use crate::exact::ExactRouteTable;
use crate::mapping::{PathParams, RouteMatch};
use crate::method::HttpMethod;
use crate::path::normalize;
use crate::telemetry::LatencyObserver;
use crate::trie::RouteTrie;

/// The application router.
///
/// Lookup order for a request path, first hit wins:
///
/// ```text
/// exact(path) → exact(aliased) → trie(path) → trie(aliased)
/// ```
pub struct Router<H> {
    aliases: Box<[(Box<str>, Box<str>)]>,
    exact: [ExactRouteTable<H>; HttpMethod::COUNT],
    trie: [RouteTrie<H>; HttpMethod::COUNT],
    observer: Option<Arc<dyn LatencyObserver>>,
}

impl<H> Router<H> {
    pub(crate) fn new(
        aliases: Vec<(String, String)>,
        exact: [ExactRouteTable<H>; HttpMethod::COUNT],
        trie: [RouteTrie<H>; HttpMethod::COUNT],
        observer: Option<Arc<dyn LatencyObserver>>,
    ) -> Self {
        let aliases = aliases
            .into_iter()
            .map(|(prefix, target)| (prefix.into_boxed_str(), target.into_boxed_str()))
            .collect();
        Self { aliases, exact, trie, observer }
    }

    /// Maps a method and a raw request path to its route.
    ///
    /// Returns `Ok(None)` when nothing matches. Fails only when `raw_path`
    /// itself is invalid (relative, or escaping the root with `..`).
    pub fn resolve(&self, method: HttpMethod, raw_path: &str) -> Result<Option<RouteMatch<'_, H>>, RouteError> {
        let Some(observer) = &self.observer else {
            return self.lookup(method, raw_path);
        };

        let started = Instant::now();
        let result = self.lookup(method, raw_path);
        let elapsed = u64::try_from(started.elapsed().as_nanos()).unwrap_or(u64::MAX);
        observer.observe(elapsed);
        result
    }

    fn lookup(&self, method: HttpMethod, raw_path: &str) -> Result<Option<RouteMatch<'_, H>>, RouteError> {
        let path = normalize(raw_path)?;
        let exact = &self.exact[method.ordinal()];
        if let Some(mapping) = exact.get(&path) {
            return Ok(Some(RouteMatch::new(mapping, PathParams::None)));
        }

        let aliased = self.rewrite_alias(&path);
        if let Some(mapping) = aliased.as_deref().and_then(|p| exact.get(p)) {
            return Ok(Some(RouteMatch::new(mapping, PathParams::None)));
        }

        let trie = &self.trie[method.ordinal()];
        if let Some(found) = trie.lookup(&path) {
            return Ok(Some(found));
        }
        if let Some(found) = aliased.as_deref().and_then(|p| trie.lookup(p)) {
            return Ok(Some(found));
        }

        trace!(%method, %path, "no route");
        Ok(None)
    }

    /// Substitutes the first (longest) alias prefix that ends on a segment
    /// boundary of `path`.
    fn rewrite_alias(&self, path: &str) -> Option<String> {
        self.aliases.iter().find_map(|(prefix, target)| {
            let rest = alias_rest(path, prefix)?;
            let rewritten = match (&**target, rest) {
                ("/", "") => "/".to_owned(),
                ("/", rest) => rest.to_owned(),
                (target, rest) => format!("{target}{rest}"),
            };
            Some(rewritten)
        })
    }

    /// Registered aliases, in the order they are tried.
    pub fn aliases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(prefix, target)| (&**prefix, &**target))
    }

    /// Number of literal routes served for `method`.
    pub fn literal_count(&self, method: HttpMethod) -> usize {
        self.exact[method.ordinal()].len()
    }

    /// Number of dynamic routes served for `method`.
    pub fn dynamic_count(&self, method: HttpMethod) -> usize {
        self.trie[method.ordinal()].len()
    }
}

impl<H> fmt::Debug for Router<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let literal: usize = self.exact.iter().map(ExactRouteTable::len).sum();
        let dynamic: usize = self.trie.iter().map(RouteTrie::len).sum();
        f.debug_struct("Router")
            .field("aliases", &self.aliases)
            .field("literal", &literal)
            .field("dynamic", &dynamic)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

/// What is left of `path` after `prefix`: empty or starting with `/`.
/// `None` when `prefix` does not end on a segment boundary.
fn alias_rest<'p>(path: &'p str, prefix: &str) -> Option<&'p str> {
    if prefix == "/" {
        return Some(if path == "/" { "" } else { path });
    }
    let rest = path.strip_prefix(prefix)?;
    (rest.is_empty() || rest.starts_with('/')).then_some(rest)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::builder::RouterBuilder;
    use crate::mapping::RouteDeclaration;

    fn router() -> Router<&'static str> {
        let mut builder = RouterBuilder::new();
        builder
            .add_routes([
                RouteDeclaration::literal([HttpMethod::Get], "/users/me", "me"),
                RouteDeclaration::variable([HttpMethod::Get, HttpMethod::Delete], "/users/{id}", "user"),
                RouteDeclaration::literal([HttpMethod::Get], "/api/v1/status", "status"),
                RouteDeclaration::variable([HttpMethod::Get], "/api/v1/items/{item}", "item"),
            ])
            .unwrap()
            .add_alias("/v1", "/api/v1")
            .unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn exact_then_trie() {
        let router = router();
        assert_eq!(*router.resolve(HttpMethod::Get, "/users/me").unwrap().unwrap().handler(), "me");

        let m = router.resolve(HttpMethod::Get, "/users/42").unwrap().unwrap();
        assert_eq!(*m.handler(), "user");
        assert_eq!(m.param("id"), Some("42"));
    }

    #[test]
    fn methods_are_isolated() {
        let router = router();
        assert!(router.resolve(HttpMethod::Delete, "/users/me").unwrap().is_some_and(|m| *m.handler() == "user"));
        assert!(router.resolve(HttpMethod::Post, "/users/42").unwrap().is_none());
    }

    #[test]
    fn alias_rewrites_both_tables() {
        let router = router();
        assert_eq!(*router.resolve(HttpMethod::Get, "/v1/status").unwrap().unwrap().handler(), "status");

        let m = router.resolve(HttpMethod::Get, "/v1/items/abc").unwrap().unwrap();
        assert_eq!(*m.handler(), "item");
        assert_eq!(m.param("item"), Some("abc"));
    }

    #[test]
    fn normalizes_before_lookup() {
        let router = router();
        assert!(router.resolve(HttpMethod::Get, "//users/./x/../me/").unwrap().is_some_and(|m| *m.handler() == "me"));
        assert!(matches!(router.resolve(HttpMethod::Get, "/../x"), Err(RouteError::InvalidPath { .. })));
        assert!(matches!(router.resolve(HttpMethod::Get, "users"), Err(RouteError::InvalidPath { .. })));
    }

    #[test]
    fn root_alias_target() {
        let mut builder = RouterBuilder::new();
        builder
            .add_routes([RouteDeclaration::literal([HttpMethod::Get], "/x", 1)])
            .unwrap()
            .add_alias("/legacy", "/")
            .unwrap();
        let router = builder.build().unwrap();
        assert!(router.resolve(HttpMethod::Get, "/legacy/x").unwrap().is_some());
    }

    #[test]
    fn root_alias_prefix() {
        let mut builder = RouterBuilder::new();
        builder
            .add_routes([
                RouteDeclaration::literal([HttpMethod::Get], "/api/foo", "foo"),
                RouteDeclaration::literal([HttpMethod::Get], "/api", "index"),
            ])
            .unwrap()
            .add_alias("/", "/api")
            .unwrap();
        let router = builder.build().unwrap();

        assert_eq!(*router.resolve(HttpMethod::Get, "/foo").unwrap().unwrap().handler(), "foo");
        assert_eq!(*router.resolve(HttpMethod::Get, "/").unwrap().unwrap().handler(), "index");
    }

    #[test]
    fn alias_stops_at_segment_boundary() {
        let mut builder = RouterBuilder::new();
        builder
            .add_routes([
                RouteDeclaration::literal([HttpMethod::Get], "/api/v10/x", "v10"),
                RouteDeclaration::literal([HttpMethod::Get], "/api/v1", "v1"),
            ])
            .unwrap()
            .add_alias("/v1", "/api/v1")
            .unwrap();
        let router = builder.build().unwrap();

        assert!(router.resolve(HttpMethod::Get, "/v10/x").unwrap().is_none());
        assert_eq!(*router.resolve(HttpMethod::Get, "/v1").unwrap().unwrap().handler(), "v1");
    }

    #[test]
    fn observer_sees_every_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);

        let mut builder = RouterBuilder::new();
        builder
            .add_routes([RouteDeclaration::literal([HttpMethod::Get], "/a", ())])
            .unwrap()
            .observer(move |_nanos: u64| {
                seen.fetch_add(1, Ordering::Relaxed);
            });
        let router = builder.build().unwrap();

        router.resolve(HttpMethod::Get, "/a").unwrap();
        router.resolve(HttpMethod::Get, "/missing").unwrap();
        assert!(router.resolve(HttpMethod::Get, "nope").is_err());
        assert_eq!(calls.load(Ordering::Relaxed), 3);
    }
}
