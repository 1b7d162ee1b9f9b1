//! Route declarations, built mappings and match results.
//!
//! The handler type `H` is opaque to the router: it is stored when a route is
//! declared and handed back verbatim on a match. Nothing in this crate calls,
//! clones or inspects it.

use std::collections::HashMap;

use crate::method::HttpMethod;
use crate::template::{RouteTemplate, TemplateStyle};

// ── Declarations ──────────────────────────────────────────────────────────────

/// One route as contributed by generated code or a config file.
#[derive(Clone, Debug)]
pub struct RouteDeclaration<H> {
    pub methods: Vec<HttpMethod>,
    pub template: String,
    pub style: TemplateStyle,
    pub handler: H,
}

impl<H> RouteDeclaration<H> {
    /// Declares a route, inferring the style from the template text.
    pub fn new(methods: impl IntoIterator<Item = HttpMethod>, template: impl Into<String>, handler: H) -> Self {
        let template = template.into();
        let style = TemplateStyle::infer(&template);
        Self { methods: methods.into_iter().collect(), template, style, handler }
    }

    pub fn literal(methods: impl IntoIterator<Item = HttpMethod>, template: impl Into<String>, handler: H) -> Self {
        Self::with_style(TemplateStyle::Literal, methods, template, handler)
    }

    pub fn variable(methods: impl IntoIterator<Item = HttpMethod>, template: impl Into<String>, handler: H) -> Self {
        Self::with_style(TemplateStyle::Variable, methods, template, handler)
    }

    pub fn pattern(methods: impl IntoIterator<Item = HttpMethod>, template: impl Into<String>, handler: H) -> Self {
        Self::with_style(TemplateStyle::Pattern, methods, template, handler)
    }

    fn with_style(
        style: TemplateStyle,
        methods: impl IntoIterator<Item = HttpMethod>,
        template: impl Into<String>,
        handler: H,
    ) -> Self {
        Self { methods: methods.into_iter().collect(), template: template.into(), style, handler }
    }
}

/// A group of route declarations contributed as a unit, typically one per
/// generated module.
pub trait RouteSource<H> {
    fn routes(self) -> Vec<RouteDeclaration<H>>;
}

impl<H> RouteSource<H> for Vec<RouteDeclaration<H>> {
    fn routes(self) -> Vec<RouteDeclaration<H>> {
        self
    }
}

impl<H, const N: usize> RouteSource<H> for [RouteDeclaration<H>; N] {
    fn routes(self) -> Vec<RouteDeclaration<H>> {
        self.into()
    }
}

// ── Built mappings ────────────────────────────────────────────────────────────

/// A compiled route. Shared by every per-method table it was registered in.
#[derive(Debug)]
pub struct RouteMapping<H> {
    methods: Box<[HttpMethod]>,
    template: RouteTemplate,
    handler: H,
}

impl<H> RouteMapping<H> {
    pub fn new(methods: impl Into<Box<[HttpMethod]>>, template: RouteTemplate, handler: H) -> Self {
        Self { methods: methods.into(), template, handler }
    }

    pub fn methods(&self) -> &[HttpMethod] {
        &self.methods
    }

    pub fn template(&self) -> &RouteTemplate {
        &self.template
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }
}

// ── Match results ─────────────────────────────────────────────────────────────

/// Values extracted from the request path.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum PathParams {
    /// Literal route: nothing to extract.
    #[default]
    None,
    /// `{name}` route: variable name → segment value.
    Named(HashMap<String, String>),
    /// `(regex)` route: groups in declaration order. A group that did not
    /// participate in the match is an empty string.
    Positional(Vec<String>),
}

/// A successful lookup: the matched mapping plus the captured values.
#[derive(Debug)]
pub struct RouteMatch<'r, H> {
    mapping: &'r RouteMapping<H>,
    params: PathParams,
}

impl<'r, H> RouteMatch<'r, H> {
    pub(crate) fn new(mapping: &'r RouteMapping<H>, params: PathParams) -> Self {
        Self { mapping, params }
    }

    pub fn handler(&self) -> &'r H {
        self.mapping.handler()
    }

    pub fn mapping(&self) -> &'r RouteMapping<H> {
        self.mapping
    }

    pub fn template(&self) -> &'r RouteTemplate {
        self.mapping.template()
    }

    pub fn params(&self) -> &PathParams {
        &self.params
    }

    pub fn into_params(self) -> PathParams {
        self.params
    }

    /// `true` when the route had dynamic parts.
    pub fn has_params(&self) -> bool {
        !matches!(self.params, PathParams::None)
    }

    /// Returns a named path variable.
    ///
    /// For a route `/users/{id}`, `param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, name: &str) -> Option<&str> {
        match &self.params {
            PathParams::Named(vars) => vars.get(name).map(String::as_str),
            _ => None,
        }
    }

    /// Returns a positional group, 1-based like regex groups.
    pub fn group(&self, index: usize) -> Option<&str> {
        match &self.params {
            PathParams::Positional(groups) => index.checked_sub(1).and_then(|i| groups.get(i)).map(String::as_str),
            _ => None,
        }
    }
}
