/// Route tree construction
///
/// - `directory`: the intermediate per-directory tree and its conflict checks
/// - `system`: nodes synthesized when a project omits them
/// - `hoist`: the fold from directories to the nested route tree
pub mod directory;
pub(crate) mod hoist;
pub mod system;

pub use directory::{DirectoryNode, SpecificitySlots};
pub use system::{DefaultSystemRoutes, SystemRouteProvider, SITEMAP_ROUTE};
