/// Specificity ordering shared by sibling sorting and manifest priority
///
/// A single comparator decides both the order a layout lists its children
/// and the order the manifest tries its rows, so screen resolution and
/// request dispatch always agree.
use std::cmp::Ordering;

use super::node::{DynamicSegment, RouteNode};
use super::pattern::match_group_name;

/// Total order over route nodes, most specific first
///
/// 1. Static routes before dynamic ones
/// 2. Between dynamic routes: more dynamic segments first, then at the first
///    differing position `[x]` before `[...x]`, and real params before
///    the not-found sentinel; tied catch-alls with more segments first
/// 3. Index-like names (same URL as the parent) before named routes
/// 4. Shorter names first
///
/// # Examples
///
/// ```
/// use rhtmx_route_compiler::{compare_routes, RouteKind, RouteNode};
/// use std::cmp::Ordering;
///
/// let index = RouteNode::new(RouteKind::Route, "index", "index");
/// let user = RouteNode::new(RouteKind::Route, "[id]", "[id]");
/// assert_eq!(compare_routes(&index, &user), Ordering::Less);
/// ```
pub fn compare_routes(a: &RouteNode, b: &RouteNode) -> Ordering {
    match (&a.dynamic, &b.dynamic) {
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (Some(a_dynamic), Some(b_dynamic)) => compare_dynamic(a_dynamic, b_dynamic)
            .then_with(|| compare_catch_all_depth(a, b))
            .then_with(|| compare_names(&a.name, &b.name)),
        (None, None) => compare_names(&a.name, &b.name),
    }
}

/// Sorts a sibling list in place with [`compare_routes`] (stable)
pub fn sort_routes(routes: &mut [RouteNode]) {
    routes.sort_by(compare_routes);
}

fn compare_dynamic(a: &[DynamicSegment], b: &[DynamicSegment]) -> Ordering {
    b.len().cmp(&a.len()).then_with(|| {
        a.iter()
            .zip(b)
            .map(|(a, b)| {
                a.deep
                    .cmp(&b.deep)
                    .then_with(|| a.not_found.cmp(&b.not_found))
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    })
}

/// Deeper catch-alls shadow shallower ones, so they go first
fn compare_catch_all_depth(a: &RouteNode, b: &RouteNode) -> Ordering {
    let ends_deep = |node: &RouteNode| {
        node.dynamic
            .as_ref()
            .and_then(|dynamic| dynamic.last())
            .is_some_and(|segment| segment.deep)
    };

    if ends_deep(a) && ends_deep(b) {
        depth(&b.name).cmp(&depth(&a.name))
    } else {
        Ordering::Equal
    }
}

fn depth(name: &str) -> usize {
    name.split('/').filter(|part| !part.is_empty()).count()
}

fn compare_names(a: &str, b: &str) -> Ordering {
    match (is_index_like(a), is_index_like(b)) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.len().cmp(&b.len()),
    }
}

/// True when a name resolves to the same URL as its parent
///
/// Empty names, `index`, and names made only of groups and `index` qualify.
pub fn is_index_like(name: &str) -> bool {
    name.split('/')
        .filter(|part| !part.is_empty())
        .all(|part| part == "index" || match_group_name(part).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::node::RouteKind;

    fn route(name: &str) -> RouteNode {
        RouteNode::new(RouteKind::Route, name, name)
    }

    fn sorted(names: &[&str]) -> Vec<String> {
        let mut routes: Vec<RouteNode> = names.iter().map(|name| route(name)).collect();
        sort_routes(&mut routes);
        routes.into_iter().map(|route| route.name).collect()
    }

    #[test]
    fn test_static_before_dynamic_before_catch_all() {
        assert_eq!(
            sorted(&["[...slug]", "[id]", "(group)/index", "index"]),
            vec!["index", "(group)/index", "[id]", "[...slug]"]
        );
    }

    #[test]
    fn test_more_dynamic_segments_first() {
        assert_eq!(
            sorted(&["[a]", "[a]/[b]"]),
            vec!["[a]/[b]", "[a]"]
        );
    }

    #[test]
    fn test_first_differing_position_decides() {
        assert_eq!(
            sorted(&["[...a]/[b]", "[a]/[...b]"]),
            vec!["[a]/[...b]", "[...a]/[b]"]
        );
    }

    #[test]
    fn test_catch_all_before_not_found() {
        assert_eq!(
            sorted(&["+not-found", "[...slug]"]),
            vec!["[...slug]", "+not-found"]
        );
    }

    #[test]
    fn test_deeper_catch_all_first() {
        assert_eq!(
            sorted(&["+not-found", "blog/+not-found", "[...rest]", "docs/[...rest]"]),
            vec!["docs/[...rest]", "[...rest]", "blog/+not-found", "+not-found"]
        );
    }

    #[test]
    fn test_index_like_before_named_then_shorter_first() {
        assert_eq!(
            sorted(&["settings", "about", "index", "(app)"]),
            vec!["index", "(app)", "about", "settings"]
        );
    }

    #[test]
    fn test_is_index_like() {
        assert!(is_index_like(""));
        assert!(is_index_like("index"));
        assert!(is_index_like("(a)/(b)/index"));
        assert!(!is_index_like("(a)/about"));
    }
}
