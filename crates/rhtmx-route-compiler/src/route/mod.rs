/// Route module for convention-based routing
///
/// Contains the pure building blocks of the compiler:
/// - `pattern`: segment classification (convention matcher)
/// - `node`: the route tree data model
/// - `specificity`: the ordering shared by the tree and the manifest
pub mod node;
pub mod pattern;
pub mod specificity;

// Re-export commonly used types
pub use node::{DynamicSegment, RedirectTarget, RouteKind, RouteNode, SourceId};
pub use pattern::{classify_segment, dynamic_convention, Segment};
pub use specificity::{compare_routes, sort_routes};
