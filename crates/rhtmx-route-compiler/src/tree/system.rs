//! Generated routes supplied to the tree builder
//!
//! Hosts that render the tree differently (server, client, native shell)
//! plug in their own [`SystemRouteProvider`] instead of forking the builder.

use crate::route::node::{DynamicSegment, RouteKind, RouteNode};
use crate::route::pattern::NOT_FOUND_MARKER;

/// Name of the generated sitemap route
pub const SITEMAP_ROUTE: &str = "_sitemap";

/// Supplies the nodes the builder synthesizes when a project omits them
///
/// The builder fixes up `name`, `kind`, `dynamic` and the `generated` flag
/// of whatever is returned, so implementations only choose sources and
/// extra metadata.
pub trait SystemRouteProvider {
    /// Pass-through root layout used when no root `_layout` exists
    fn root_layout(&self) -> RouteNode;

    /// Route listing every page of the app
    fn sitemap(&self) -> RouteNode;

    /// Catch-all shown for unmatched URLs
    fn not_found(&self) -> RouteNode;
}

/// Built-in provider backed by the `rhtmx:` system sources
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSystemRoutes;

impl SystemRouteProvider for DefaultSystemRoutes {
    fn root_layout(&self) -> RouteNode {
        RouteNode::new(RouteKind::Layout, "", "rhtmx:views/navigator")
    }

    fn sitemap(&self) -> RouteNode {
        RouteNode::new(RouteKind::Route, SITEMAP_ROUTE, "rhtmx:views/sitemap").internal()
    }

    fn not_found(&self) -> RouteNode {
        RouteNode::new(RouteKind::Route, NOT_FOUND_MARKER, "rhtmx:views/unmatched").internal()
    }
}

pub(crate) fn root_layout(provider: &dyn SystemRouteProvider) -> RouteNode {
    normalize(provider.root_layout(), RouteKind::Layout, "")
}

pub(crate) fn sitemap(provider: &dyn SystemRouteProvider) -> RouteNode {
    normalize(provider.sitemap(), RouteKind::Route, SITEMAP_ROUTE)
}

pub(crate) fn not_found(provider: &dyn SystemRouteProvider) -> RouteNode {
    let mut node = normalize(provider.not_found(), RouteKind::Route, NOT_FOUND_MARKER);
    node.dynamic = Some(vec![DynamicSegment::not_found()]);
    node
}

fn normalize(node: RouteNode, kind: RouteKind, name: &str) -> RouteNode {
    let mut node = node.renamed(name.to_string()).with_declared_path(name).generated();
    node.kind = kind;
    node.children.clear();
    node
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Custom;

    impl SystemRouteProvider for Custom {
        fn root_layout(&self) -> RouteNode {
            RouteNode::new(RouteKind::Route, "whatever", "app:shell")
        }

        fn sitemap(&self) -> RouteNode {
            RouteNode::new(RouteKind::Route, "map", "app:map")
        }

        fn not_found(&self) -> RouteNode {
            RouteNode::new(RouteKind::Route, "404", "app:404")
        }
    }

    #[test]
    fn test_provider_nodes_are_normalized() {
        let layout = root_layout(&Custom);
        assert_eq!(layout.kind, RouteKind::Layout);
        assert_eq!(layout.name, "");
        assert!(layout.generated);
        assert_eq!(layout.source_id.as_str(), "app:shell");

        let sitemap = sitemap(&Custom);
        assert_eq!(sitemap.name, SITEMAP_ROUTE);

        let not_found = not_found(&Custom);
        assert_eq!(not_found.name, NOT_FOUND_MARKER);
        assert!(not_found.is_not_found());
    }

    #[test]
    fn test_default_not_found_is_internal() {
        let node = not_found(&DefaultSystemRoutes);
        assert!(node.internal);
        assert!(node.generated);
    }
}
