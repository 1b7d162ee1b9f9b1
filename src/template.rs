//! Route template compilation.
//!
//! A declared route is reduced to two artifacts:
//!
//! - a **wildcard path**: the normalized template bytes with every dynamic
//!   part (`{name}` or `(group)`) replaced by a single `*`, terminated by `0`.
//!   The trie only ever sees this shape.
//! - an optional anchored **regex** that validates the full request path and
//!   extracts the dynamic values once the trie has found a structural match.
//!
//! ```text
//! "/users/{id}/posts"      →  b"/users/*/posts\0"   ^/users/(?<id>[^/]*)/posts$
//! "/files/([a-z]+)\.txt"   →  b"/files/*\.txt\0"    ^/files/([a-z]+)\.txt$
//! "/healthz"               →  b"/healthz\0"         (none)
//! ```

use std::collections::HashMap;
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::RouteError;
use crate::mapping::PathParams;
use crate::path::normalize;

/// Edge key for "one dynamic run consumed here".
pub(crate) const WILDCARD: u8 = b'*';
/// Terminator of every wildcard path; edge key for "end of input".
pub(crate) const END: u8 = 0;

/// Which compiler a declaration is meant for.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateStyle {
    /// Plain path, served from the exact table.
    Literal,
    /// `{name}` segments, captured by name.
    Variable,
    /// Free-form `(regex)` groups, captured by position.
    Pattern,
}

impl TemplateStyle {
    /// Picks the style a template is written in: any `(` makes it a pattern,
    /// otherwise any `{` makes it a variable template.
    pub fn infer(template: &str) -> Self {
        if template.contains('(') {
            Self::Pattern
        } else if template.contains('{') {
            Self::Variable
        } else {
            Self::Literal
        }
    }
}

/// A compiled route template.
#[derive(Clone, Debug)]
pub struct RouteTemplate {
    path: Box<str>,
    wildcard_path: Box<[u8]>,
    pattern: Option<Regex>,
    style: TemplateStyle,
}

impl RouteTemplate {
    /// Compiles `template` with the compiler matching `style`.
    ///
    /// `escape_literals` only affects [`TemplateStyle::Variable`]; see
    /// [`RouteTemplate::variable_escaped`].
    pub fn compile(style: TemplateStyle, template: &str, escape_literals: bool) -> Result<Self, RouteError> {
        match style {
            TemplateStyle::Literal => Self::literal(template),
            TemplateStyle::Variable => Self::compile_variable(template, escape_literals),
            TemplateStyle::Pattern => Self::pattern(template),
        }
    }

    /// A literal route: no variables, no groups.
    ///
    /// A `*` in a literal is plain text: `/files/*` matches only that path.
    pub fn literal(template: &str) -> Result<Self, RouteError> {
        let path = normalize(template)?;
        if path.contains(['{', '(']) {
            return Err(RouteError::unsupported(
                template,
                "literal routes cannot contain {variables} or (groups)",
            ));
        }

        if path.as_bytes().contains(&END) {
            return Err(RouteError::unsupported(template, "NUL bytes are not allowed in routes"));
        }

        let mut wildcard_path = Vec::with_capacity(path.len() + 1);
        wildcard_path.extend_from_slice(path.as_bytes());
        wildcard_path.push(END);

        Ok(Self {
            path: path.into_boxed_str(),
            wildcard_path: wildcard_path.into_boxed_slice(),
            pattern: None,
            style: TemplateStyle::Literal,
        })
    }

    /// A route with `{name}` segments. Each variable matches `[^/]*`.
    ///
    /// The literal text around the variables is spliced into the regex as
    /// written, so `.` or `+` in a literal run keep their regex meaning. Use
    /// [`RouteTemplate::variable_escaped`] to match them literally.
    pub fn variable(template: &str) -> Result<Self, RouteError> {
        Self::compile_variable(template, false)
    }

    /// Like [`RouteTemplate::variable`], with the literal runs escaped.
    pub fn variable_escaped(template: &str) -> Result<Self, RouteError> {
        Self::compile_variable(template, true)
    }

    /// A route with free-form `(regex)` groups, captured by position.
    /// The template itself is the regex.
    pub fn pattern(template: &str) -> Result<Self, RouteError> {
        let path = normalize(template)?;
        if !path.contains('(') {
            let reason = if path.contains('{') {
                "no (group) found, use a variable route for {variables}"
            } else {
                "no (group) found, use a literal route"
            };
            return Err(RouteError::unsupported(template, reason));
        }

        let mut wildcard_path = Vec::with_capacity(path.len() + 1);
        let mut offset = 0;
        while let Some((open, close)) = find_delimited(&path, offset, '(', ')') {
            push_literal(&mut wildcard_path, template, &path[offset..open])?;
            wildcard_path.push(WILDCARD);
            offset = close + 1;
        }
        push_literal(&mut wildcard_path, template, &path[offset..])?;
        wildcard_path.push(END);

        let pattern = anchored(template, &path)?;
        Ok(Self {
            path: path.into_boxed_str(),
            wildcard_path: wildcard_path.into_boxed_slice(),
            pattern: Some(pattern),
            style: TemplateStyle::Pattern,
        })
    }

    fn compile_variable(template: &str, escape_literals: bool) -> Result<Self, RouteError> {
        let path = normalize(template)?;
        if !path.contains('{') {
            let reason = if path.contains('(') {
                "no {variable} found, use a pattern route for (groups)"
            } else {
                "no {variable} found, use a literal route"
            };
            return Err(RouteError::unsupported(template, reason));
        }

        let mut wildcard_path = Vec::with_capacity(path.len() + 1);
        let mut regex = String::with_capacity(path.len() + 32);
        let mut offset = 0;
        while let Some(open) = path[offset..].find('{').map(|i| offset + i) {
            let Some(close) = path[open..].find('}').map(|i| open + i) else {
                return Err(RouteError::unsupported(template, "unterminated {variable}"));
            };
            let literal = &path[offset..open];
            push_literal(&mut wildcard_path, template, literal)?;
            wildcard_path.push(WILDCARD);
            push_regex_literal(&mut regex, literal, escape_literals);
            regex.push_str("(?<");
            regex.push_str(&path[open + 1..close]);
            regex.push_str(">[^/]*)");
            offset = close + 1;
        }
        let tail = &path[offset..];
        push_literal(&mut wildcard_path, template, tail)?;
        wildcard_path.push(END);
        push_regex_literal(&mut regex, tail, escape_literals);

        let pattern = anchored(template, &regex)?;
        Ok(Self {
            path: path.into_boxed_str(),
            wildcard_path: wildcard_path.into_boxed_slice(),
            pattern: Some(pattern),
            style: TemplateStyle::Variable,
        })
    }

    /// The normalized template text.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The `*`-annotated, `0`-terminated trie key.
    pub fn wildcard_path(&self) -> &[u8] {
        &self.wildcard_path
    }

    /// The anchored regex of a dynamic template.
    pub fn regex(&self) -> Option<&Regex> {
        self.pattern.as_ref()
    }

    pub fn style(&self) -> TemplateStyle {
        self.style
    }

    /// `true` when the template has no dynamic part.
    pub fn is_literal(&self) -> bool {
        self.pattern.is_none()
    }

    /// Verifies a canonical request path against this template and extracts
    /// the dynamic values.
    pub(crate) fn capture(&self, path: &str) -> Option<PathParams> {
        let Some(pattern) = &self.pattern else {
            return (&*self.path == path).then_some(PathParams::None);
        };

        let caps = pattern.captures(path)?;
        let params = match self.style {
            TemplateStyle::Variable => {
                let named: HashMap<String, String> = pattern
                    .capture_names()
                    .flatten()
                    .filter_map(|name| caps.name(name).map(|m| (name.to_owned(), m.as_str().to_owned())))
                    .collect();
                PathParams::Named(named)
            }
            _ => PathParams::Positional(
                caps.iter()
                    .skip(1)
                    .map(|m| m.map_or_else(String::new, |m| m.as_str().to_owned()))
                    .collect(),
            ),
        };
        Some(params)
    }
}

impl fmt::Display for RouteTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Finds the next `open … close` pair at or after `from`, non-nested.
fn find_delimited(path: &str, from: usize, open: char, close: char) -> Option<(usize, usize)> {
    let start = path[from..].find(open)? + from;
    let end = path[start..].find(close)? + start;
    Some((start, end))
}

/// Copies the literal run of a dynamic template into the wildcard path. The
/// two sentinel bytes are reserved for the trie and cannot appear there.
fn push_literal(out: &mut Vec<u8>, template: &str, literal: &str) -> Result<(), RouteError> {
    if literal.as_bytes().contains(&END) {
        return Err(RouteError::unsupported(template, "NUL bytes are not allowed in routes"));
    }
    if literal.as_bytes().contains(&WILDCARD) {
        return Err(RouteError::unsupported(template, "`*` is reserved for dynamic segments"));
    }
    out.extend_from_slice(literal.as_bytes());
    Ok(())
}

fn push_regex_literal(out: &mut String, literal: &str, escape: bool) {
    if escape {
        out.push_str(&regex::escape(literal));
    } else {
        out.push_str(literal);
    }
}

fn anchored(template: &str, body: &str) -> Result<Regex, RouteError> {
    Regex::new(&format!("^{body}$")).map_err(|source| RouteError::InvalidPattern {
        template: template.to_owned(),
        source,
    })
}
