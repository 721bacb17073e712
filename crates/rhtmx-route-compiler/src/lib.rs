//! # RHTMX Route Compiler
//!
//! Turns a flat list of virtual file paths that follow routing conventions
//! into a nested route tree, and that tree into a regex dispatch manifest.
//!
//! Supported conventions:
//! - Static segments (`about`)
//! - Dynamic parameters (`[id]`)
//! - Catch-all and optional catch-all (`[...slug]`, `[[...slug]]`)
//! - Groups, invisible in the URL (`(auth)`), and group alternation (`(a,b)`)
//! - Layouts (`_layout`), not-found pages (`+not-found`), API routes (`+api`)
//!
//! The compiler never touches the file system. Callers hand it path strings
//! and opaque [`SourceId`]s and get back plain data.
//!
//! ## Example
//!
//! ```
//! use rhtmx_route_compiler::{compile, compile_manifest, CompileOptions, VirtualPath};
//!
//! let paths = [
//!     VirtualPath::new("_layout.rsx"),
//!     VirtualPath::new("index.rsx"),
//!     VirtualPath::new("users/[id].rsx"),
//! ];
//!
//! let tree = compile(paths, &CompileOptions::default())
//!     .unwrap()
//!     .into_tree()
//!     .unwrap();
//! assert!(tree.child("users/[id]").is_some());
//!
//! let manifest = compile_manifest(&tree);
//! let matcher = manifest.matcher().unwrap();
//! let found = matcher.resolve("/users/42").unwrap();
//! assert_eq!(found.params["id"], "42");
//! ```

use std::borrow::Cow;

use regex::Regex;
use tracing::{debug, trace};

// ============================================================================
// Module Declarations
// ============================================================================

pub mod cache;
pub mod error;
pub mod manifest;
pub mod options;
pub mod path;
pub mod route;
pub mod tree;

pub use cache::ConventionCache;
pub use error::{CompileError, ConventionError, Result};
pub use manifest::{compile_manifest, ManifestMatch, ManifestMatcher, ManifestRow, ServerManifest};
pub use options::{CompileOptions, ConflictPolicy, RedirectRule, RewriteRule, VariantConfig};
pub use route::{
    classify_segment, compare_routes, sort_routes, DynamicSegment, RedirectTarget, RouteKind,
    RouteNode, Segment, SourceId,
};
pub use tree::{DefaultSystemRoutes, SystemRouteProvider};

use path::{extrapolate, normalize, parse_file_meta};
use tree::directory::TreeBuilder;

// ============================================================================
// Core Types
// ============================================================================

/// One input file, identified by its root-relative virtual path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualPath {
    pub path: String,
    /// Handle passed through to the tree; defaults to `path`
    pub source_id: Option<SourceId>,
    /// Overrides the specificity derived from a variant suffix
    pub specificity: Option<u32>,
    /// HTTP methods an API route answers
    pub methods: Option<Vec<String>>,
}

impl VirtualPath {
    pub fn new(path: impl Into<String>) -> Self {
        VirtualPath {
            path: path.into(),
            source_id: None,
            specificity: None,
            methods: None,
        }
    }

    pub fn with_source(mut self, source_id: impl Into<SourceId>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }

    pub fn with_specificity(mut self, specificity: u32) -> Self {
        self.specificity = Some(specificity);
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

    fn source(&self) -> SourceId {
        self.source_id
            .clone()
            .unwrap_or_else(|| SourceId::new(self.path.clone()))
    }
}

impl From<&str> for VirtualPath {
    fn from(path: &str) -> Self {
        VirtualPath::new(path)
    }
}

impl From<String> for VirtualPath {
    fn from(path: String) -> Self {
        VirtualPath::new(path)
    }
}

/// Outcome of a compile
///
/// `Empty` means no route or layout survived filtering. It is distinct from
/// an error and from a tree holding only generated nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compiled {
    Routes(RouteNode),
    Empty,
}

impl Compiled {
    pub fn into_tree(self) -> Option<RouteNode> {
        match self {
            Compiled::Routes(tree) => Some(tree),
            Compiled::Empty => None,
        }
    }

    pub fn tree(&self) -> Option<&RouteNode> {
        match self {
            Compiled::Routes(tree) => Some(tree),
            Compiled::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Compiled::Empty)
    }
}

// ============================================================================
// Compiler
// ============================================================================

/// Caller predicate for skipping normalized paths
type IgnorePredicate<'a> = Box<dyn Fn(&str) -> bool + 'a>;

/// Configurable route compiler
///
/// Every call builds a fresh intermediate tree; the only state shared
/// between calls is the optional caller-owned [`ConventionCache`].
///
/// # Examples
///
/// ```
/// use rhtmx_route_compiler::{CompileOptions, Compiler, ConventionCache, VirtualPath};
///
/// let options = CompileOptions::default();
/// let mut cache = ConventionCache::new();
///
/// let compiled = Compiler::new(&options)
///     .with_cache(&mut cache)
///     .ignore_if(|path| path.starts_with("drafts/"))
///     .compile(["about.rsx", "drafts/wip.rsx"].map(VirtualPath::from))
///     .unwrap();
///
/// let tree = compiled.into_tree().unwrap();
/// assert!(tree.child("about").is_some());
/// assert!(tree.child("drafts/wip").is_none());
/// ```
pub struct Compiler<'a> {
    options: &'a CompileOptions,
    provider: &'a dyn SystemRouteProvider,
    cache: Option<&'a mut ConventionCache>,
    ignore: Vec<IgnorePredicate<'a>>,
}

impl<'a> Compiler<'a> {
    pub fn new(options: &'a CompileOptions) -> Self {
        Compiler {
            options,
            provider: &DefaultSystemRoutes,
            cache: None,
            ignore: Vec::new(),
        }
    }

    /// Replaces the provider of generated routes
    pub fn with_provider(mut self, provider: &'a dyn SystemRouteProvider) -> Self {
        self.provider = provider;
        self
    }

    /// Memoizes segment classification in a caller-owned cache
    pub fn with_cache(mut self, cache: &'a mut ConventionCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Skips every path for which `predicate` returns true
    ///
    /// The predicate sees the normalized path, extension included.
    pub fn ignore_if(mut self, predicate: impl Fn(&str) -> bool + 'a) -> Self {
        self.ignore.push(Box::new(predicate));
        self
    }

    /// Compiles `paths` into a route tree
    pub fn compile<I>(&mut self, paths: I) -> Result<Compiled>
    where
        I: IntoIterator<Item = VirtualPath>,
    {
        let options = self.options;
        let patterns = options
            .ignore
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| CompileError::InvalidIgnorePattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut builder = TreeBuilder::new(options.conflict_policy);

        for rule in &options.redirects {
            let node = RouteNode::new(RouteKind::Redirect, "", rule.destination.as_str())
                .with_redirect(RedirectTarget {
                    destination: rule.destination.clone(),
                    permanent: rule.permanent,
                });
            self.register_rule(&mut builder, &rule.source, node, rule.methods.as_ref())?;
        }

        for rule in &options.rewrites {
            let node = RouteNode::new(RouteKind::Rewrite, "", rule.destination.as_str())
                .with_redirect(RedirectTarget {
                    destination: rule.destination.clone(),
                    permanent: false,
                });
            self.register_rule(&mut builder, &rule.source, node, rule.methods.as_ref())?;
        }

        let mut seen = 0usize;
        let mut skipped = 0usize;

        for virtual_path in paths {
            seen += 1;
            let normalized = normalize(&virtual_path.path);

            if patterns.iter().any(|pattern| pattern.is_match(&normalized))
                || self.ignore.iter().any(|predicate| predicate(&*normalized))
            {
                trace!("ignoring {}", normalized);
                skipped += 1;
                continue;
            }

            let Some(meta) = parse_file_meta(&normalized, virtual_path.specificity, options)? else {
                trace!("skipping {}: inactive variant", normalized);
                skipped += 1;
                continue;
            };

            if meta.is_api && !options.preserve_api_routes {
                trace!("skipping API route {}", normalized);
                skipped += 1;
                continue;
            }

            self.classify(&meta.route, &virtual_path.path)?;

            let kind = if meta.is_layout {
                RouteKind::Layout
            } else if meta.is_api {
                RouteKind::Api
            } else {
                RouteKind::Route
            };
            let source_id = virtual_path.source();

            for directory in extrapolate(meta.directory())? {
                let route = join_route(&directory, meta.filename());
                let mut node = RouteNode::new(kind, route.as_str(), source_id.clone())
                    .with_declared_path(meta.route.as_str());
                node.methods = virtual_path.methods.clone();
                builder.register(&route, meta.specificity, node)?;
            }
        }

        let Some(root) = builder.finish(options, self.provider) else {
            debug!("no routes in {} paths ({} skipped)", seen, skipped);
            return Ok(Compiled::Empty);
        };

        let tree = tree::hoist::hoist(root)?;
        debug!(
            "compiled {} paths ({} skipped) into {} nodes",
            seen,
            skipped,
            tree.iter().count()
        );
        Ok(Compiled::Routes(tree))
    }

    fn register_rule(
        &mut self,
        builder: &mut TreeBuilder,
        source: &str,
        node: RouteNode,
        methods: Option<&Vec<String>>,
    ) -> Result<()> {
        // A rule on `/` targets the root index
        let declared = match normalize(source) {
            declared if declared.is_empty() => Cow::Borrowed("index"),
            declared => declared,
        };
        self.classify(&declared, source)?;

        let (directory, filename) = declared.rsplit_once('/').unwrap_or(("", &*declared));
        if filename.is_empty() {
            return Err(CompileError::malformed(
                source,
                ConventionError::EmptyName(source.to_string()),
            ));
        }

        for directory in extrapolate(directory)? {
            let route = join_route(&directory, filename);
            let mut node = node.clone().renamed(route.clone()).with_declared_path(&*declared);
            node.methods = methods.cloned();
            builder.register(&route, 0, node)?;
        }
        Ok(())
    }

    fn classify(&mut self, route: &str, original: &str) -> Result<()> {
        let classified = match self.cache.as_deref_mut() {
            Some(cache) => cache.classify(route).map(drop),
            None => cache::classify_path(route).map(drop),
        };
        classified.map_err(|reason| CompileError::malformed(original, reason))
    }
}

fn join_route(directory: &str, filename: &str) -> String {
    if directory.is_empty() {
        filename.to_string()
    } else {
        format!("{directory}/{filename}")
    }
}

// ============================================================================
// Convenience Functions
// ============================================================================

/// Compiles `paths` with the default system routes and no cache
///
/// # Examples
///
/// ```
/// use rhtmx_route_compiler::{compile, CompileOptions, Compiled};
///
/// let compiled = compile(Vec::<&str>::new(), &CompileOptions::default()).unwrap();
/// assert_eq!(compiled, Compiled::Empty);
/// ```
pub fn compile<I, P>(paths: I, options: &CompileOptions) -> Result<Compiled>
where
    I: IntoIterator<Item = P>,
    P: Into<VirtualPath>,
{
    Compiler::new(options).compile(paths.into_iter().map(Into::into))
}
