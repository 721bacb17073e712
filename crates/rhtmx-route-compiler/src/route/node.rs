//! Route tree nodes produced by the compiler

use serde::{Deserialize, Serialize};
use std::fmt;

use super::pattern::{dynamic_convention, NOT_FOUND_MARKER};

/// Opaque handle identifying the module behind a route
///
/// The compiler passes it through unchanged and never dereferences it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(String);

impl SourceId {
    pub fn new(id: impl Into<String>) -> Self {
        SourceId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceId {
    fn from(id: &str) -> Self {
        SourceId::new(id)
    }
}

impl From<String> for SourceId {
    fn from(id: String) -> Self {
        SourceId(id)
    }
}

/// What a node represents in the route tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteKind {
    Route,
    Api,
    Layout,
    Redirect,
    Rewrite,
}

/// One dynamic part of a route name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicSegment {
    pub name: String,
    /// Catch-all (`[...name]`)
    pub deep: bool,
    /// The `+not-found` sentinel
    pub not_found: bool,
    /// Optional catch-all (`[[...name]]`)
    #[serde(default)]
    pub optional: bool,
}

impl DynamicSegment {
    pub fn not_found() -> Self {
        DynamicSegment {
            name: NOT_FOUND_MARKER.to_string(),
            deep: true,
            not_found: true,
            optional: false,
        }
    }
}

/// Where a redirect or rewrite node sends its requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectTarget {
    pub destination: String,
    #[serde(default)]
    pub permanent: bool,
}

/// A node of the compiled route tree
///
/// Only the root of a compiled tree is a [`RouteKind::Layout`]; nested
/// layouts own their routes as `children`. Every `name` is relative to the
/// parent layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteNode {
    pub kind: RouteKind,
    /// Route name relative to the parent layout
    pub name: String,
    pub source_id: SourceId,
    /// Normalized path the source was declared at, before group expansion
    pub declared_path: String,
    pub dynamic: Option<Vec<DynamicSegment>>,
    pub children: Vec<RouteNode>,
    pub generated: bool,
    pub internal: bool,
    /// Sources that must be loaded before this node, ancestors first
    pub entry_points: Vec<SourceId>,
    pub methods: Option<Vec<String>>,
    pub redirect: Option<RedirectTarget>,
}

impl RouteNode {
    /// Creates a node whose only entry point is its own source
    pub fn new(kind: RouteKind, name: impl Into<String>, source_id: impl Into<SourceId>) -> Self {
        let name = name.into();
        let source_id = source_id.into();
        RouteNode {
            kind,
            dynamic: dynamic_convention(&name),
            declared_path: name.clone(),
            name,
            entry_points: vec![source_id.clone()],
            source_id,
            children: Vec::new(),
            generated: false,
            internal: false,
            methods: None,
            redirect: None,
        }
    }

    /// Marks the node as synthesized by the compiler
    pub fn generated(mut self) -> Self {
        self.generated = true;
        self
    }

    /// Marks the node as framework-internal (hidden from sitemaps and listings)
    pub fn internal(mut self) -> Self {
        self.internal = true;
        self
    }

    pub fn with_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods = Some(methods.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_redirect(mut self, target: RedirectTarget) -> Self {
        self.redirect = Some(target);
        self
    }

    pub fn with_declared_path(mut self, path: impl Into<String>) -> Self {
        self.declared_path = path.into();
        self
    }

    /// Renames the node and recomputes its dynamic convention
    pub(crate) fn renamed(mut self, name: String) -> Self {
        self.dynamic = dynamic_convention(&name);
        self.name = name;
        self
    }

    pub fn is_layout(&self) -> bool {
        self.kind == RouteKind::Layout
    }

    /// True when the last dynamic segment is the not-found sentinel
    pub fn is_not_found(&self) -> bool {
        self.dynamic
            .as_ref()
            .and_then(|dynamic| dynamic.last())
            .is_some_and(|segment| segment.not_found)
    }

    /// Depth-first iterator over this node and all of its descendants
    pub fn iter(&self) -> impl Iterator<Item = &RouteNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    /// Finds a direct child by its relative name
    pub fn child(&self, name: &str) -> Option<&RouteNode> {
        self.children.iter().find(|child| child.name == name)
    }
}
