//! Intermediate directory tree built from the flat path list
//!
//! The tree is scratch state for a single compile. Each directory records
//! its layout and file candidates indexed by specificity; the hoister then
//! turns it into the final route tree.

use std::collections::BTreeMap;

use tracing::{trace, warn};

use super::system::{self, SystemRouteProvider, SITEMAP_ROUTE};
use crate::error::{CompileError, Result};
use crate::options::{CompileOptions, ConflictPolicy};
use crate::route::node::{RouteKind, RouteNode};
use crate::route::pattern::NOT_FOUND_MARKER;

/// Candidates for one route, keyed by specificity (0 = generic)
pub type SpecificitySlots = BTreeMap<u32, RouteNode>;

/// One directory of the intermediate tree
#[derive(Debug, Default)]
pub struct DirectoryNode {
    pub files: BTreeMap<String, SpecificitySlots>,
    pub subdirectories: BTreeMap<String, DirectoryNode>,
    pub layout: SpecificitySlots,
}

impl DirectoryNode {
    fn descend<'a, I>(&mut self, parts: I) -> &mut DirectoryNode
    where
        I: IntoIterator<Item = &'a str>,
    {
        parts.into_iter().fold(self, |directory, part| {
            directory.subdirectories.entry(part.to_string()).or_default()
        })
    }
}

/// Accumulates registrations and detects specificity collisions
#[derive(Debug)]
pub(crate) struct TreeBuilder {
    policy: ConflictPolicy,
    root: DirectoryNode,
    layouts: usize,
    routes: usize,
    files: usize,
}

impl TreeBuilder {
    pub(crate) fn new(policy: ConflictPolicy) -> Self {
        Self {
            policy,
            root: DirectoryNode::default(),
            layouts: 0,
            routes: 0,
            files: 0,
        }
    }

    /// Registers `node` at the concrete (already expanded) `route`
    ///
    /// Layout routes end in `_layout`; API nodes get their own key so an API
    /// route and a page can share a name.
    pub(crate) fn register(&mut self, route: &str, specificity: u32, node: RouteNode) -> Result<()> {
        let (directory, filename) = route.rsplit_once('/').unwrap_or(("", route));
        let parts = directory.split('/').filter(|part| !part.is_empty());
        let target = self.root.descend(parts);

        let (slots, specificity, node) = match node.kind {
            RouteKind::Layout => (&mut target.layout, specificity, node.renamed(directory.to_string())),
            RouteKind::Api => (
                target.files.entry(format!("{filename}+api")).or_default(),
                0,
                node.renamed(route.to_string()),
            ),
            _ => (
                target.files.entry(filename.to_string()).or_default(),
                specificity,
                node.renamed(route.to_string()),
            ),
        };

        if let Some(existing) = slots.get(&specificity) {
            let existing = existing.source_id.to_string();
            let incoming = node.source_id.to_string();
            return match self.policy {
                ConflictPolicy::Strict => Err(CompileError::SpecificityConflict {
                    route: route.to_string(),
                    existing,
                    incoming,
                }),
                ConflictPolicy::Lenient => {
                    warn!(
                        "`{}` conflicts with `{}` on /{} (specificity {}); keeping `{}`",
                        incoming, existing, route, specificity, existing
                    );
                    Ok(())
                }
            };
        }

        trace!("registered {:?} /{} at specificity {}", node.kind, route, specificity);
        match node.kind {
            RouteKind::Layout => self.layouts += 1,
            RouteKind::Route => {
                self.routes += 1;
                self.files += 1;
            }
            _ => self.files += 1,
        }
        slots.insert(specificity, node);
        Ok(())
    }

    /// Finishes the tree, synthesizing generated nodes
    ///
    /// Returns `None` when nothing at all was registered.
    pub(crate) fn finish(
        self,
        options: &CompileOptions,
        provider: &dyn SystemRouteProvider,
    ) -> Option<DirectoryNode> {
        if self.layouts == 0 && self.files == 0 {
            return None;
        }

        let mut root = self.root;

        if root.layout.is_empty() {
            root.layout.insert(0, system::root_layout(provider));
        }

        if options.generate_sitemap && self.routes > 0 && !root.files.contains_key(SITEMAP_ROUTE) {
            insert_generated(&mut root, SITEMAP_ROUTE, system::sitemap(provider));
        }

        if options.generate_not_found && !root.files.contains_key(NOT_FOUND_MARKER) {
            insert_generated(&mut root, NOT_FOUND_MARKER, system::not_found(provider));
        }

        Some(root)
    }
}

fn insert_generated(root: &mut DirectoryNode, key: &str, node: RouteNode) {
    root.files
        .insert(key.to_string(), SpecificitySlots::from([(0, node)]));
}
