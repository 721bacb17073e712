//! Folds the directory tree into the final route tree
//!
//! Each layout becomes a parent whose children are every route below it up
//! to the next layout. Directories without a layout dissolve into the
//! nearest ancestor layout. Names are made relative to that layout and
//! entry points accumulate from the root down.

use std::collections::BTreeMap;

use super::directory::{DirectoryNode, SpecificitySlots};
use crate::error::{CompileError, Result};
use crate::route::node::{RouteKind, RouteNode, SourceId};
use crate::route::specificity::sort_routes;

/// What a directory inherits from its enclosing layout
#[derive(Debug, Default, Clone)]
struct Scope {
    /// Absolute path of the enclosing layout, with a trailing `/` unless root
    prefix: String,
    entry_points: Vec<SourceId>,
}

/// Hoists a finished directory tree into a route tree rooted at its layout
pub(crate) fn hoist(root: DirectoryNode) -> Result<RouteNode> {
    let DirectoryNode {
        files,
        subdirectories,
        layout,
    } = root;

    match pick_layout(layout)? {
        Some(layout) => hoist_layout(layout, files, subdirectories, &Scope::default()),
        None => Err(CompileError::MissingFallback {
            route: String::new(),
            source_id: String::from("_layout"),
        }),
    }
}

fn hoist_directory(directory: DirectoryNode, scope: &Scope) -> Result<Vec<RouteNode>> {
    let DirectoryNode {
        files,
        subdirectories,
        layout,
    } = directory;

    match pick_layout(layout)? {
        Some(layout) => Ok(vec![hoist_layout(layout, files, subdirectories, scope)?]),
        None => collect_children(files, subdirectories, scope),
    }
}

fn hoist_layout(
    layout: RouteNode,
    files: BTreeMap<String, SpecificitySlots>,
    subdirectories: BTreeMap<String, DirectoryNode>,
    scope: &Scope,
) -> Result<RouteNode> {
    let absolute = layout.name.clone();
    let entry_points = merge_entry_points(&scope.entry_points, &layout.entry_points);

    let inner = Scope {
        prefix: if absolute.is_empty() {
            String::new()
        } else {
            format!("{absolute}/")
        },
        entry_points: entry_points.clone(),
    };

    let mut children = collect_children(files, subdirectories, &inner)?;
    sort_routes(&mut children);

    let mut layout = layout.renamed(relativize(&absolute, &scope.prefix));
    layout.entry_points = entry_points;
    layout.children = children;
    Ok(layout)
}

fn collect_children(
    files: BTreeMap<String, SpecificitySlots>,
    subdirectories: BTreeMap<String, DirectoryNode>,
    scope: &Scope,
) -> Result<Vec<RouteNode>> {
    let mut children: Vec<RouteNode> = files
        .into_values()
        .filter_map(|slots| slots.into_values().next())
        .map(|node| hoist_leaf(node, scope))
        .collect();

    for directory in subdirectories.into_values() {
        children.extend(hoist_directory(directory, scope)?);
    }

    Ok(children)
}

fn hoist_leaf(node: RouteNode, scope: &Scope) -> RouteNode {
    let name = relativize(&node.name, &scope.prefix);
    let mut node = node.renamed(name);
    if node.kind == RouteKind::Route {
        node.entry_points = merge_entry_points(&scope.entry_points, &node.entry_points);
    }
    node
}

/// Layouts always render the generic file; variants need it as a fallback
fn pick_layout(slots: SpecificitySlots) -> Result<Option<RouteNode>> {
    let mut slots = slots.into_iter();
    match slots.next() {
        None => Ok(None),
        Some((0, layout)) => Ok(Some(layout)),
        Some((_, variant)) => Err(CompileError::MissingFallback {
            route: variant.name,
            source_id: variant.source_id.to_string(),
        }),
    }
}

fn relativize(name: &str, prefix: &str) -> String {
    name.strip_prefix(prefix).unwrap_or(name).to_string()
}

fn merge_entry_points(inherited: &[SourceId], own: &[SourceId]) -> Vec<SourceId> {
    let mut merged = inherited.to_vec();
    for source in own {
        if !merged.contains(source) {
            merged.push(source.clone());
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{CompileOptions, ConflictPolicy};
    use crate::tree::directory::TreeBuilder;
    use crate::tree::system::DefaultSystemRoutes;
    use pretty_assertions::assert_eq;

    fn build(entries: &[(&str, RouteKind, u32, &str)]) -> Result<RouteNode> {
        let mut builder = TreeBuilder::new(ConflictPolicy::Strict);
        for (route, kind, specificity, source) in entries {
            builder.register(route, *specificity, RouteNode::new(*kind, *route, *source))?;
        }
        let options = CompileOptions::default().without_sitemap().without_not_found();
        let root = builder
            .finish(&options, &DefaultSystemRoutes)
            .expect("non-empty tree");
        hoist(root)
    }

    #[test]
    fn test_names_are_relative_to_parent_layout() {
        let tree = build(&[
            ("_layout", RouteKind::Layout, 0, "_layout.rsx"),
            ("settings/_layout", RouteKind::Layout, 0, "settings/_layout.rsx"),
            ("settings/profile", RouteKind::Route, 0, "settings/profile.rsx"),
            ("blog/post", RouteKind::Route, 0, "blog/post.rsx"),
        ])
        .unwrap();

        assert_eq!(tree.name, "");
        let settings = tree.child("settings").unwrap();
        assert!(settings.is_layout());
        assert_eq!(settings.children[0].name, "profile");
        assert!(tree.child("blog/post").is_some());
    }

    #[test]
    fn test_entry_points_accumulate_from_root() {
        let tree = build(&[
            ("_layout", RouteKind::Layout, 0, "_layout.rsx"),
            ("settings/_layout", RouteKind::Layout, 0, "settings/_layout.rsx"),
            ("settings/profile", RouteKind::Route, 0, "settings/profile.rsx"),
        ])
        .unwrap();

        let profile = &tree.child("settings").unwrap().children[0];
        let entry_points: Vec<&str> = profile.entry_points.iter().map(SourceId::as_str).collect();
        assert_eq!(
            entry_points,
            vec!["_layout.rsx", "settings/_layout.rsx", "settings/profile.rsx"]
        );
    }

    #[test]
    fn test_api_routes_keep_own_entry_point() {
        let tree = build(&[
            ("_layout", RouteKind::Layout, 0, "_layout.rsx"),
            ("ping", RouteKind::Api, 0, "ping+api.rs"),
        ])
        .unwrap();

        let ping = tree.child("ping").unwrap();
        assert_eq!(ping.entry_points, vec![SourceId::new("ping+api.rs")]);
    }

    #[test]
    fn test_lowest_specificity_wins() {
        let tree = build(&[
            ("about", RouteKind::Route, 2, "about.ios.rsx"),
            ("about", RouteKind::Route, 1, "about.native.rsx"),
        ])
        .unwrap();

        assert_eq!(tree.child("about").unwrap().source_id.as_str(), "about.native.rsx");
    }

    #[test]
    fn test_layout_variant_without_fallback_fails() {
        let err = build(&[
            ("settings/_layout", RouteKind::Layout, 1, "settings/_layout.ios.rsx"),
            ("settings/index", RouteKind::Route, 0, "settings/index.rsx"),
        ])
        .unwrap_err();

        match err {
            CompileError::MissingFallback { route, source_id } => {
                assert_eq!(route, "settings");
                assert_eq!(source_id, "settings/_layout.ios.rsx");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_children_are_sorted() {
        let tree = build(&[
            ("[id]", RouteKind::Route, 0, "[id].rsx"),
            ("about", RouteKind::Route, 0, "about.rsx"),
            ("index", RouteKind::Route, 0, "index.rsx"),
        ])
        .unwrap();

        let names: Vec<&str> = tree.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["index", "about", "[id]"]);
    }
}
