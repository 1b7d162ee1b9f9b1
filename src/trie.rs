//! Adaptive radix trie over wildcard paths.
//!
//! # Shape
//!
//! ```text
//! /users/{id}          → b"/users/*\0"
//! /users/{id}/posts    → b"/users/*/posts\0"
//! /users/me/settings   → b"/users/me/settings\0"
//!
//! Internal "/users/"
//!  ├─ 'm' → Leaf /users/me/settings
//!  └─ '*' → Internal ""
//!            ├─ 0   → Leaf /users/*
//!            └─ '/' → Leaf /users/*/posts
//! ```
//!
//! Internal nodes hold a compressed prefix and a small child map keyed by the
//! next byte. `*` is only ever an edge key, never part of a prefix. A leaf keeps
//! the full mapping so the final regex can validate the whole request path and
//! extract its values.
//!
//! Child maps grow through fixed size classes (4, 8, 16, 32, 64, 80). Most nodes
//! have a handful of children and stay in the smallest class; each step up is a
//! fresh allocation that the old entries are moved into.

use std::fmt;
use std::mem;
use std::sync::Arc;

use crate::error::RouteError;
use crate::mapping::{RouteMapping, RouteMatch};
use crate::template::{END, WILDCARD};

const SIZE_CLASSES: [usize; 6] = [4, 8, 16, 32, 64, 80];

/// Dynamic routes of one HTTP method.
pub struct RouteTrie<H> {
    root: Option<Node<H>>,
    len: usize,
}

enum Node<H> {
    Leaf(LeafNode<H>),
    Internal(InternalNode<H>),
}

struct LeafNode<H> {
    mapping: Arc<RouteMapping<H>>,
}

struct InternalNode<H> {
    prefix: Box<[u8]>,
    keys: Vec<u8>,
    children: Vec<Node<H>>,
    class: usize,
}

// ── Public API ────────────────────────────────────────────────────────────────

impl<H> RouteTrie<H> {
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    /// Inserts a mapping keyed by its template's wildcard path.
    ///
    /// Returns `Ok(false)` when the same wildcard path is already present; the
    /// existing mapping is kept. Fails only when a node would need more
    /// children than the largest size class holds.
    pub fn insert(&mut self, mapping: Arc<RouteMapping<H>>) -> Result<bool, RouteError> {
        let inserted = match &mut self.root {
            None => {
                let path = mapping.template().wildcard_path();
                self.root = Some(build_leaf_chain(path, 0, &mapping));
                true
            }
            Some(root) => {
                let path = mapping.template().wildcard_path();
                put(root, path, 0, &mapping)?
            }
        };
        if inserted {
            self.len += 1;
        }
        Ok(inserted)
    }

    /// Looks up a canonical path.
    ///
    /// Literal edges are tried before the wildcard edge at every node; the
    /// first leaf whose template accepts the path wins.
    pub fn lookup<'r>(&'r self, path: &str) -> Option<RouteMatch<'r, H>> {
        match self.root.as_ref()? {
            Node::Leaf(leaf) => leaf.matches(path),
            Node::Internal(node) => search(node, path, 0),
        }
    }

    /// Number of distinct wildcard paths stored.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<H> Default for RouteTrie<H> {
    fn default() -> Self { Self::new() }
}

impl<H> fmt::Debug for RouteTrie<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteTrie").field("len", &self.len).finish()
    }
}

// ── Insertion ─────────────────────────────────────────────────────────────────

/// Builds the node chain for `path[offset..]`: one internal node per literal
/// run that is followed by a `*`, ending in a leaf.
fn build_leaf_chain<H>(path: &[u8], offset: usize, mapping: &Arc<RouteMapping<H>>) -> Node<H> {
    match path[offset..].iter().position(|&b| b == WILDCARD) {
        None => Node::Leaf(LeafNode { mapping: Arc::clone(mapping) }),
        Some(i) => {
            let mut node = InternalNode::new(&path[offset..offset + i]);
            node.keys.push(WILDCARD);
            node.children.push(build_leaf_chain(path, offset + i + 1, mapping));
            Node::Internal(node)
        }
    }
}

fn put<H>(node: &mut Node<H>, path: &[u8], offset: usize, mapping: &Arc<RouteMapping<H>>) -> Result<bool, RouteError> {
    match node {
        Node::Leaf(leaf) => {
            let stored = leaf.path();
            if stored == path {
                return Ok(false);
            }

            // Both paths end in the same unique terminator, so they diverge
            // before either runs out.
            let split = offset + mismatch(&stored[offset..], &path[offset..]);
            let old_key = stored[split];

            let mut parent = InternalNode::new(&path[offset..split]);
            parent.add(path[split], build_leaf_chain(path, split + 1, mapping))?;
            let old = mem::replace(node, Node::Internal(InternalNode::new(&[])));
            parent.add(old_key, old)?;
            *node = Node::Internal(parent);
            Ok(true)
        }
        Node::Internal(inner) => {
            // A `*` never lives in a prefix, so an incoming wildcard stops the
            // comparison: with an empty prefix it falls through to the `*`
            // child, otherwise it splits the prefix right here.
            let p = mismatch(&inner.prefix, &path[offset..]);
            if p < inner.prefix.len() {
                let old_key = inner.prefix[p];
                let mut parent = InternalNode::new(&inner.prefix[..p]);
                inner.prefix = inner.prefix[p + 1..].into();

                parent.add(path[offset + p], build_leaf_chain(path, offset + p + 1, mapping))?;
                let old = mem::replace(node, Node::Internal(InternalNode::new(&[])));
                parent.add(old_key, old)?;
                *node = Node::Internal(parent);
                return Ok(true);
            }

            let offset = offset + p;
            let key = path[offset];
            match inner.position(key) {
                Some(i) => put(&mut inner.children[i], path, offset + 1, mapping),
                None => {
                    inner.add(key, build_leaf_chain(path, offset + 1, mapping))?;
                    Ok(true)
                }
            }
        }
    }
}

/// Length of the common prefix of `a` and `b`.
fn mismatch(a: &[u8], b: &[u8]) -> usize {
    a.iter()
        .zip(b)
        .position(|(x, y)| x != y)
        .unwrap_or(a.len().min(b.len()))
}

// ── Search ────────────────────────────────────────────────────────────────────

fn search<'r, H>(node: &'r InternalNode<H>, path: &str, offset: usize) -> Option<RouteMatch<'r, H>> {
    let bytes = path.as_bytes();
    let rest = bytes.get(offset..).unwrap_or_default();
    if !rest.starts_with(&node.prefix) {
        return None;
    }

    let offset = offset + node.prefix.len();
    let key = bytes.get(offset).copied().unwrap_or(END);
    let found = match node.get(key) {
        Some(Node::Leaf(leaf)) => leaf.matches(path),
        Some(Node::Internal(next)) => search(next, path, offset + 1),
        None => None,
    };
    if found.is_some() {
        return found;
    }

    match node.get(WILDCARD)? {
        Node::Leaf(leaf) => leaf.matches(path),
        Node::Internal(next) => search_wildcard(next, path, offset),
    }
}

/// Consumes one segment for the `*` edge, then continues below it. If that
/// fails, a leaf right under the wildcard gets the whole path: regex groups
/// may span `/`, which a single-segment skip cannot express.
fn search_wildcard<'r, H>(node: &'r InternalNode<H>, path: &str, offset: usize) -> Option<RouteMatch<'r, H>> {
    let bytes = path.as_bytes();
    let end = bytes
        .get(offset..)
        .and_then(|rest| rest.iter().position(|&b| b == b'/'))
        .map_or(bytes.len(), |i| offset + i);

    if let found @ Some(_) = search(node, path, end) {
        return found;
    }

    match node.get(END)? {
        Node::Leaf(leaf) => leaf.matches(path),
        Node::Internal(_) => None,
    }
}

// ── Nodes ─────────────────────────────────────────────────────────────────────

impl<H> LeafNode<H> {
    fn path(&self) -> &[u8] {
        self.mapping.template().wildcard_path()
    }

    fn matches<'r>(&'r self, path: &str) -> Option<RouteMatch<'r, H>> {
        let params = self.mapping.template().capture(path)?;
        Some(RouteMatch::new(&self.mapping, params))
    }
}

impl<H> InternalNode<H> {
    fn new(prefix: &[u8]) -> Self {
        let capacity = SIZE_CLASSES[0];
        Self {
            prefix: prefix.into(),
            keys: Vec::with_capacity(capacity),
            children: Vec::with_capacity(capacity),
            class: 0,
        }
    }

    fn position(&self, key: u8) -> Option<usize> {
        self.keys.iter().position(|&k| k == key)
    }

    fn get(&self, key: u8) -> Option<&Node<H>> {
        self.position(key).map(|i| &self.children[i])
    }

    fn add(&mut self, key: u8, node: Node<H>) -> Result<(), RouteError> {
        if self.keys.len() == SIZE_CLASSES[self.class] {
            self.grow()?;
        }
        self.keys.push(key);
        self.children.push(node);
        Ok(())
    }

    /// Moves the children into the next size class.
    fn grow(&mut self) -> Result<(), RouteError> {
        let class = self.class + 1;
        let Some(&capacity) = SIZE_CLASSES.get(class) else {
            return Err(RouteError::NodeCapacity {
                prefix: String::from_utf8_lossy(&self.prefix).into_owned(),
            });
        };

        let mut keys = Vec::with_capacity(capacity);
        keys.extend_from_slice(&self.keys);
        let mut children = Vec::with_capacity(capacity);
        children.extend(self.children.drain(..));

        self.keys = keys;
        self.children = children;
        self.class = class;
        Ok(())
    }
}
