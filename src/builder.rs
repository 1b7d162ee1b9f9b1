//! Router construction.
//!
//! Route declarations are compiled as they are added, so a malformed template
//! fails at registration time with the offending text in the error. Nothing is
//! skipped silently: a route that cannot be compiled aborts the build.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::config::{DuplicatePolicy, RouterOptions, RoutesConfig};
use crate::error::RouteError;
use crate::exact::ExactRouteTable;
use crate::mapping::{RouteDeclaration, RouteMapping, RouteSource};
use crate::method::HttpMethod;
use crate::path::normalize;
use crate::router::Router;
use crate::telemetry::LatencyObserver;
use crate::template::RouteTemplate;
use crate::trie::RouteTrie;

/// Accumulates routes and aliases, then freezes them into a [`Router`].
///
/// Single-threaded by construction: use it during startup, call
/// [`build`](RouterBuilder::build), and share the router.
pub struct RouterBuilder<H> {
    options: RouterOptions,
    routes: Vec<(HttpMethod, Arc<RouteMapping<H>>)>,
    seen: HashSet<(HttpMethod, bool, Box<[u8]>)>,
    aliases: Vec<(String, String)>,
    observer: Option<Arc<dyn LatencyObserver>>,
}

impl<H> RouterBuilder<H> {
    pub fn new() -> Self {
        Self::with_options(RouterOptions::default())
    }

    pub fn with_options(options: RouterOptions) -> Self {
        Self {
            options,
            routes: Vec::new(),
            seen: HashSet::new(),
            aliases: Vec::new(),
            observer: None,
        }
    }

    /// Builds a router description from a [`RoutesConfig`].
    ///
    /// `resolve` turns each configured handler name into the caller's handler
    /// value; returning `None` fails the whole load with
    /// [`RouteError::UnknownHandler`].
    pub fn from_config(config: &RoutesConfig, mut resolve: impl FnMut(&str) -> Option<H>) -> Result<Self, RouteError> {
        config.validate()?;

        let mut builder = Self::with_options(config.options.clone());
        for route in &config.routes {
            let handler = resolve(&route.handler).ok_or_else(|| RouteError::UnknownHandler {
                name: route.handler.clone(),
            })?;
            let declaration = match route.style {
                Some(style) => RouteDeclaration {
                    methods: route.methods.clone(),
                    template: route.path.clone(),
                    style,
                    handler,
                },
                None => RouteDeclaration::new(route.methods.iter().copied(), route.path.as_str(), handler),
            };
            builder.add_route(declaration)?;
        }
        for alias in &config.aliases {
            builder.add_alias(&alias.prefix, &alias.target)?;
        }
        Ok(builder)
    }

    /// Compiles and registers one declaration under each of its methods.
    pub fn add_route(&mut self, declaration: RouteDeclaration<H>) -> Result<&mut Self, RouteError> {
        let RouteDeclaration { methods, template, style, handler } = declaration;
        let compiled = RouteTemplate::compile(style, &template, self.options.escape_literals)?;

        let mut unique: Vec<HttpMethod> = Vec::with_capacity(methods.len());
        for method in methods {
            if !unique.contains(&method) {
                unique.push(method);
            }
        }
        if unique.is_empty() {
            warn!(template = %compiled, "route declared without methods");
        }

        let mut fresh = Vec::with_capacity(unique.len());
        for &method in &unique {
            // Literal and dynamic routes live in separate tables, so `/files/*`
            // does not collide with `/files/{name}`.
            let key = (method, compiled.is_literal(), Box::<[u8]>::from(compiled.wildcard_path()));
            if !self.seen.contains(&key) {
                fresh.push(key);
                continue;
            }
            match self.options.duplicates {
                DuplicatePolicy::Reject => {
                    return Err(RouteError::DuplicateRoute { method, template: compiled.path().to_owned() });
                }
                DuplicatePolicy::Ignore => {
                    warn!(%method, template = %compiled, "duplicate route ignored, first registration wins");
                }
            }
        }

        let kind = if compiled.is_literal() { "direct" } else { "pattern" };
        let mapping = Arc::new(RouteMapping::new(unique, compiled, handler));
        for key in fresh {
            trace!(method = %key.0, template = %mapping.template(), kind, "add mapping");
            self.routes.push((key.0, Arc::clone(&mapping)));
            self.seen.insert(key);
        }
        Ok(self)
    }

    /// Registers every declaration in order.
    pub fn add_routes(
        &mut self,
        declarations: impl IntoIterator<Item = RouteDeclaration<H>>,
    ) -> Result<&mut Self, RouteError> {
        for declaration in declarations {
            self.add_route(declaration)?;
        }
        Ok(self)
    }

    /// Registers everything a [`RouteSource`] contributes.
    pub fn add_source(&mut self, source: impl RouteSource<H>) -> Result<&mut Self, RouteError> {
        self.add_routes(source.routes())
    }

    /// Serves paths under `alias` as if they were under `canonical_prefix`.
    ///
    /// Aliases are only consulted after the unaliased path missed. When
    /// several aliases match, the longest one applies.
    pub fn add_alias(&mut self, alias: &str, canonical_prefix: &str) -> Result<&mut Self, RouteError> {
        let alias = normalize(alias)?;
        let target = normalize(canonical_prefix)?;
        trace!(%alias, %target, "add alias");
        self.aliases.push((alias, target));
        Ok(self)
    }

    /// Installs a latency observer for every resolve call.
    pub fn observer(&mut self, observer: impl LatencyObserver + 'static) -> &mut Self {
        let observer: Arc<dyn LatencyObserver> = Arc::new(observer);
        self.observer = Some(observer);
        self
    }

    /// Freezes the accumulated state into a new router.
    ///
    /// The builder is left untouched; building twice yields two independent
    /// routers sharing the same (immutable) mappings.
    pub fn build(&self) -> Result<Router<H>, RouteError> {
        let mut exact: [ExactRouteTable<H>; HttpMethod::COUNT] = std::array::from_fn(|_| ExactRouteTable::new());
        let mut trie: [RouteTrie<H>; HttpMethod::COUNT] = std::array::from_fn(|_| RouteTrie::new());

        let (mut literal, mut dynamic) = (0, 0);
        for (method, mapping) in &self.routes {
            let slot = method.ordinal();
            if mapping.template().is_literal() {
                exact[slot].insert(mapping.template().path(), Arc::clone(mapping));
                literal += 1;
            } else {
                trie[slot].insert(Arc::clone(mapping))?;
                dynamic += 1;
            }
        }

        // Longest prefix first; the stable sort keeps registration order among equals.
        let mut aliases = self.aliases.clone();
        aliases.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        debug!(literal, dynamic, aliases = aliases.len(), "router built");
        Ok(Router::new(aliases, exact, trie, self.observer.clone()))
    }
}

impl<H> Default for RouterBuilder<H> {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::TemplateStyle;

    #[test]
    fn wrong_style_aborts_registration() {
        let mut builder: RouterBuilder<()> = RouterBuilder::new();
        let err = builder
            .add_route(RouteDeclaration::literal([HttpMethod::Get], "/users/{id}", ()))
            .err()
            .unwrap();
        assert!(matches!(err, RouteError::UnsupportedTemplate { .. }));

        let err = builder
            .add_route(RouteDeclaration::variable([HttpMethod::Get], "/users", ()))
            .err()
            .unwrap();
        assert!(matches!(err, RouteError::UnsupportedTemplate { .. }));
    }

    #[test]
    fn duplicates_are_ignored_by_default() {
        let mut builder = RouterBuilder::new();
        builder
            .add_routes([
                RouteDeclaration::literal([HttpMethod::Get], "/a", 1),
                RouteDeclaration::literal([HttpMethod::Get, HttpMethod::Post], "/a/", 2),
                RouteDeclaration::variable([HttpMethod::Get], "/b/{x}", 3),
                RouteDeclaration::variable([HttpMethod::Get], "/b/{y}", 4),
            ])
            .unwrap();
        let router = builder.build().unwrap();

        assert_eq!(*router.resolve(HttpMethod::Get, "/a").unwrap().unwrap().handler(), 1);
        assert_eq!(*router.resolve(HttpMethod::Post, "/a").unwrap().unwrap().handler(), 2);
        assert_eq!(*router.resolve(HttpMethod::Get, "/b/z").unwrap().unwrap().handler(), 3);
        assert_eq!(router.literal_count(HttpMethod::Get), 1);
        assert_eq!(router.dynamic_count(HttpMethod::Get), 1);
    }

    #[test]
    fn duplicates_can_be_rejected() {
        let options = RouterOptions { duplicates: DuplicatePolicy::Reject, ..RouterOptions::default() };
        let mut builder = RouterBuilder::with_options(options);
        builder.add_route(RouteDeclaration::variable([HttpMethod::Get], "/b/{x}", 1)).unwrap();
        let err = builder
            .add_route(RouteDeclaration::variable([HttpMethod::Put, HttpMethod::Get], "/b/{y}", 2))
            .err()
            .unwrap();
        assert!(matches!(err, RouteError::DuplicateRoute { method: HttpMethod::Get, .. }));

        // the rejected declaration left nothing behind, not even its PUT half
        let router = builder.build().unwrap();
        assert!(router.resolve(HttpMethod::Put, "/b/1").unwrap().is_none());
    }

    #[test]
    fn repeated_methods_in_one_declaration_are_not_duplicates() {
        let options = RouterOptions { duplicates: DuplicatePolicy::Reject, ..RouterOptions::default() };
        let mut builder = RouterBuilder::with_options(options);
        builder
            .add_route(RouteDeclaration::literal([HttpMethod::Get, HttpMethod::Get], "/a", ()))
            .unwrap();
        let router = builder.build().unwrap();
        assert_eq!(router.literal_count(HttpMethod::Get), 1);
    }

    #[test]
    fn literal_star_is_not_a_duplicate_of_a_variable() {
        let options = RouterOptions { duplicates: DuplicatePolicy::Reject, ..RouterOptions::default() };
        let mut builder = RouterBuilder::with_options(options);
        builder
            .add_routes([
                RouteDeclaration::literal([HttpMethod::Get], "/files/*", "star"),
                RouteDeclaration::variable([HttpMethod::Get], "/files/{name}", "file"),
            ])
            .unwrap();
        let router = builder.build().unwrap();

        assert_eq!(*router.resolve(HttpMethod::Get, "/files/*").unwrap().unwrap().handler(), "star");
        assert_eq!(*router.resolve(HttpMethod::Get, "/files/a").unwrap().unwrap().handler(), "file");
    }

    #[test]
    fn aliases_are_sorted_longest_first() {
        let mut builder: RouterBuilder<()> = RouterBuilder::new();
        builder
            .add_alias("/v1", "/api/v1")
            .unwrap()
            .add_alias("/v1/beta", "/api/v1/beta")
            .unwrap();
        let router = builder.build().unwrap();
        let prefixes: Vec<&str> = router.aliases().map(|(prefix, _)| prefix).collect();
        assert_eq!(prefixes, ["/v1/beta", "/v1"]);
    }

    #[test]
    fn alias_must_be_absolute() {
        let mut builder: RouterBuilder<()> = RouterBuilder::new();
        assert!(matches!(builder.add_alias("v1", "/api"), Err(RouteError::InvalidPath { .. })));
    }

    #[test]
    fn build_twice_gives_independent_routers() {
        let mut builder = RouterBuilder::new();
        builder.add_route(RouteDeclaration::new([HttpMethod::Get], "/x/{id}", "x")).unwrap();
        let first = builder.build().unwrap();
        builder.add_route(RouteDeclaration::new([HttpMethod::Get], "/y", "y")).unwrap();
        let second = builder.build().unwrap();

        assert!(first.resolve(HttpMethod::Get, "/y").unwrap().is_none());
        assert!(second.resolve(HttpMethod::Get, "/y").unwrap().is_some());
        assert!(first.resolve(HttpMethod::Get, "/x/1").unwrap().is_some());
    }

    #[test]
    fn escape_literals_option_reaches_the_compiler() {
        let options = RouterOptions { escape_literals: true, ..RouterOptions::default() };
        let mut builder = RouterBuilder::with_options(options);
        builder
            .add_route(RouteDeclaration {
                methods: vec![HttpMethod::Get],
                template: "/v1.0/{id}".into(),
                style: TemplateStyle::Variable,
                handler: (),
            })
            .unwrap();
        let router = builder.build().unwrap();
        assert!(router.resolve(HttpMethod::Get, "/v1.0/7").unwrap().is_some());
        assert!(router.resolve(HttpMethod::Get, "/v1x0/7").unwrap().is_none());
    }
}
