//! Flat, regex-based dispatch manifest compiled from a route tree
//!
//! The manifest is what a server consults per request: ordered rows, most
//! specific first, each with an anchored named-capture regex. Row order is
//! decided by the same comparator that orders siblings in the tree.

use std::collections::{BTreeMap, HashSet};

use ::regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CompileError, Result};
use crate::route::node::{RedirectTarget, RouteKind, RouteNode, SourceId};
use crate::route::specificity::compare_routes;

pub mod regex;

use self::regex::named_route_regex;

/// One dispatchable route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestRow {
    pub source_id: SourceId,
    /// Normalized URL path (`/`, `/users/[id]`, …)
    pub canonical_path: String,
    pub named_regex: String,
    /// Safe regex group key → original parameter name
    pub route_keys: BTreeMap<String, String>,
    pub generated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<RedirectTarget>,
}

/// Rows partitioned by how a server should treat them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerManifest {
    pub api_routes: Vec<ManifestRow>,
    pub html_routes: Vec<ManifestRow>,
    pub not_found_routes: Vec<ManifestRow>,
    #[serde(default)]
    pub redirects: Vec<ManifestRow>,
    #[serde(default)]
    pub rewrites: Vec<ManifestRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Partition {
    Api,
    Html,
    NotFound,
    Redirect,
    Rewrite,
}

impl Partition {
    fn of(node: &RouteNode) -> Self {
        match node.kind {
            RouteKind::Api => Partition::Api,
            RouteKind::Redirect => Partition::Redirect,
            RouteKind::Rewrite => Partition::Rewrite,
            _ if node.is_not_found() => Partition::NotFound,
            _ => Partition::Html,
        }
    }
}

/// A leaf with its layout-relative name resolved against its ancestors
struct Candidate<'a> {
    node: &'a RouteNode,
    absolute: RouteNode,
}

/// Compiles a route tree into its server manifest
///
/// # Examples
///
/// ```
/// use rhtmx_route_compiler::{compile, compile_manifest, CompileOptions, VirtualPath};
///
/// let options = CompileOptions::default().without_sitemap();
/// let tree = compile([VirtualPath::new("users/[id].rsx")], &options)
///     .unwrap()
///     .into_tree()
///     .unwrap();
///
/// let manifest = compile_manifest(&tree);
/// let row = &manifest.html_routes[0];
/// assert_eq!(row.canonical_path, "/users/[id]");
/// assert_eq!(row.named_regex, "^/users/(?<id>[^/]+?)(?:/)?$");
/// ```
pub fn compile_manifest(tree: &RouteNode) -> ServerManifest {
    let mut candidates = Vec::new();
    flatten(tree, "", &mut candidates);
    // Rank on absolute names: a leaf under `[org]/_layout` is named `index`
    // but still dispatches as `[org]`.
    candidates.sort_by(|a, b| compare_routes(&a.absolute, &b.absolute));

    let mut manifest = ServerManifest::default();
    let mut seen: HashSet<(Partition, String)> = HashSet::new();

    for Candidate { node, absolute } in candidates {
        let partition = Partition::of(node);
        let canonical_path = match node.kind {
            RouteKind::Api => canonical_key(&node.declared_path),
            _ => canonical_key(&absolute.name),
        };

        if !seen.insert((partition, canonical_path.clone())) {
            debug!("dropping duplicate manifest entry {} ({})", canonical_path, node.source_id);
            continue;
        }

        let named = named_route_regex(&canonical_path);
        let row = ManifestRow {
            source_id: node.source_id.clone(),
            canonical_path,
            named_regex: named.pattern,
            route_keys: named.route_keys,
            generated: node.generated,
            methods: node.methods.clone(),
            redirect: node.redirect.clone(),
        };

        match partition {
            Partition::Api => manifest.api_routes.push(row),
            Partition::Html => manifest.html_routes.push(row),
            Partition::NotFound => manifest.not_found_routes.push(row),
            Partition::Redirect => manifest.redirects.push(row),
            Partition::Rewrite => manifest.rewrites.push(row),
        }
    }

    debug!(
        "compiled manifest: {} html, {} api, {} not-found, {} redirect, {} rewrite rows",
        manifest.html_routes.len(),
        manifest.api_routes.len(),
        manifest.not_found_routes.len(),
        manifest.redirects.len(),
        manifest.rewrites.len()
    );

    manifest
}

fn flatten<'a>(node: &'a RouteNode, parent: &str, out: &mut Vec<Candidate<'a>>) {
    let absolute = join_path(parent, &node.name);

    if node.is_layout() {
        for child in &node.children {
            flatten(child, &absolute, out);
        }
    } else {
        let absolute = RouteNode::new(node.kind, absolute, node.source_id.clone());
        out.push(Candidate { node, absolute });
    }
}

fn join_path(parent: &str, name: &str) -> String {
    parent
        .split('/')
        .chain(name.split('/'))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Normalizes a route path to its URL form: leading `/`, no trailing `index`
///
/// # Examples
///
/// ```
/// use rhtmx_route_compiler::manifest::canonical_key;
///
/// assert_eq!(canonical_key("index"), "/");
/// assert_eq!(canonical_key("blog/index"), "/blog");
/// assert_eq!(canonical_key("users/[id]"), "/users/[id]");
/// ```
pub fn canonical_key(path: &str) -> String {
    let mut parts: Vec<&str> = path.split('/').filter(|part| !part.is_empty()).collect();
    if parts.last() == Some(&"index") {
        parts.pop();
    }
    format!("/{}", parts.join("/"))
}

impl ServerManifest {
    /// Compiles every row regex once for request matching
    pub fn matcher(&self) -> Result<ManifestMatcher<'_>> {
        let rows = [
            &self.redirects,
            &self.rewrites,
            &self.api_routes,
            &self.html_routes,
            &self.not_found_routes,
        ]
        .into_iter()
        .flatten()
        .map(|row| {
            Regex::new(&row.named_regex)
                .map(|regex| (row, regex))
                .map_err(|source| CompileError::InvalidRegex {
                    path: row.canonical_path.clone(),
                    source,
                })
        })
        .collect::<Result<Vec<_>>>()?;

        Ok(ManifestMatcher { rows })
    }

    /// Total number of rows across all partitions
    pub fn len(&self) -> usize {
        self.api_routes.len()
            + self.html_routes.len()
            + self.not_found_routes.len()
            + self.redirects.len()
            + self.rewrites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Resolves request paths against a [`ServerManifest`]
///
/// Partitions are tried in order: redirects, rewrites, API routes, HTML
/// routes, not-found routes.
#[derive(Debug)]
pub struct ManifestMatcher<'a> {
    rows: Vec<(&'a ManifestRow, Regex)>,
}

/// A matched row and its parameters keyed by their original names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestMatch<'a> {
    pub row: &'a ManifestRow,
    pub params: BTreeMap<String, String>,
}

impl<'a> ManifestMatcher<'a> {
    /// Finds the first row matching `path`
    ///
    /// Query strings and fragments are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use rhtmx_route_compiler::{compile, compile_manifest, CompileOptions, VirtualPath};
    ///
    /// let tree = compile([VirtualPath::new("blog/[...slug].rsx")], &CompileOptions::default())
    ///     .unwrap()
    ///     .into_tree()
    ///     .unwrap();
    /// let manifest = compile_manifest(&tree);
    /// let matcher = manifest.matcher().unwrap();
    ///
    /// let found = matcher.resolve("/blog/2024/hello?draft=1").unwrap();
    /// assert_eq!(found.params["slug"], "2024/hello");
    /// ```
    pub fn resolve(&self, path: &str) -> Option<ManifestMatch<'a>> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };

        self.rows.iter().find_map(|(row, regex)| {
            let captures = regex.captures(&path)?;
            let params = row
                .route_keys
                .iter()
                .filter_map(|(key, name)| {
                    captures
                        .name(key)
                        .map(|value| (name.clone(), value.as_str().to_string()))
                })
                .collect();
            Some(ManifestMatch { row: *row, params })
        })
    }
}

impl ManifestMatch<'_> {
    /// Destination of a redirect or rewrite row with parameters substituted
    ///
    /// `[name]` and `[...name]` placeholders in the destination are replaced
    /// by the matched values.
    pub fn destination(&self) -> Option<String> {
        let target = self.row.redirect.as_ref()?;
        Some(
            self.params
                .iter()
                .fold(target.destination.clone(), |acc, (name, value)| {
                    acc.replace(&format!("[[...{name}]]"), value)
                        .replace(&format!("[...{name}]"), value)
                        .replace(&format!("[{name}]"), value)
                }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn leaf(kind: RouteKind, name: &str) -> RouteNode {
        RouteNode::new(kind, name, name)
    }

    fn layout(name: &str, children: Vec<RouteNode>) -> RouteNode {
        let mut node = RouteNode::new(RouteKind::Layout, name, format!("{name}/_layout"));
        node.children = children;
        node
    }

    fn paths(rows: &[ManifestRow]) -> Vec<&str> {
        rows.iter().map(|row| row.canonical_path.as_str()).collect()
    }

    #[test]
    fn test_canonical_key() {
        assert_eq!(canonical_key(""), "/");
        assert_eq!(canonical_key("index"), "/");
        assert_eq!(canonical_key("/settings/index/"), "/settings");
        assert_eq!(canonical_key("(app)/index"), "/(app)");
    }

    #[test]
    fn test_absolute_paths_follow_layouts() {
        let tree = layout(
            "",
            vec![
                leaf(RouteKind::Route, "index"),
                layout("settings", vec![leaf(RouteKind::Route, "profile")]),
            ],
        );

        let manifest = compile_manifest(&tree);
        assert_eq!(paths(&manifest.html_routes), vec!["/", "/settings/profile"]);
    }

    #[test]
    fn test_partitions() {
        let mut redirect = leaf(RouteKind::Redirect, "old");
        redirect.redirect = Some(RedirectTarget {
            destination: "/new".to_string(),
            permanent: true,
        });

        let tree = layout(
            "",
            vec![
                leaf(RouteKind::Route, "about"),
                leaf(RouteKind::Api, "ping"),
                leaf(RouteKind::Route, "+not-found"),
                redirect,
                leaf(RouteKind::Rewrite, "legacy"),
            ],
        );

        let manifest = compile_manifest(&tree);
        assert_eq!(paths(&manifest.html_routes), vec!["/about"]);
        assert_eq!(paths(&manifest.api_routes), vec!["/ping"]);
        assert_eq!(paths(&manifest.not_found_routes), vec!["/+not-found"]);
        assert_eq!(paths(&manifest.redirects), vec!["/old"]);
        assert_eq!(paths(&manifest.rewrites), vec!["/legacy"]);
        assert_eq!(manifest.len(), 5);
    }

    #[test]
    fn test_duplicates_dropped_within_partition() {
        let tree = layout(
            "",
            vec![
                leaf(RouteKind::Route, "index"),
                leaf(RouteKind::Route, "(app)/index"),
                leaf(RouteKind::Route, ""),
            ],
        );

        let manifest = compile_manifest(&tree);
        assert_eq!(paths(&manifest.html_routes), vec!["/", "/(app)"]);
        assert_eq!(manifest.html_routes[0].source_id.as_str(), "");
    }

    #[test]
    fn test_api_key_uses_declared_path() {
        let ping = leaf(RouteKind::Api, "a/ping").with_declared_path("(a,b)/ping");
        let tree = layout("", vec![layout("a", vec![ping.renamed("ping".to_string())])]);

        let manifest = compile_manifest(&tree);
        assert_eq!(manifest.api_routes[0].canonical_path, "/(a,b)/ping");
    }

    #[test]
    fn test_resolve_order_and_params() {
        let tree = layout(
            "",
            vec![
                leaf(RouteKind::Route, "users/[id]"),
                leaf(RouteKind::Route, "users/me"),
                leaf(RouteKind::Route, "+not-found"),
            ],
        );

        let manifest = compile_manifest(&tree);
        let matcher = manifest.matcher().unwrap();

        let me = matcher.resolve("/users/me").unwrap();
        assert_eq!(me.row.canonical_path, "/users/me");

        let user = matcher.resolve("users/42/").unwrap();
        assert_eq!(user.params["id"], "42");

        let missing = matcher.resolve("/nope/deeper").unwrap();
        assert_eq!(missing.params["not-found"], "nope/deeper");
    }

    #[test]
    fn test_redirect_destination_substitution() {
        let mut redirect = leaf(RouteKind::Redirect, "blog/[slug]");
        redirect.redirect = Some(RedirectTarget {
            destination: "/articles/[slug]".to_string(),
            permanent: false,
        });

        let tree = layout("", vec![redirect]);
        let manifest = compile_manifest(&tree);
        let matcher = manifest.matcher().unwrap();

        let found = matcher.resolve("/blog/hello").unwrap();
        assert_eq!(found.destination().as_deref(), Some("/articles/hello"));
    }
}
