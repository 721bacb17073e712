/// Path utilities for virtual route files
///
/// All functions are **pure**: given same input, always produce same output with no side effects.
use std::borrow::Cow;

use crate::error::{CompileError, ConventionError, Result};
use crate::options::CompileOptions;
use crate::route::pattern::{classify_segment, Segment, API_SUFFIX, LAYOUT_MARKER, NOT_FOUND_MARKER};

pub mod extrapolate;
pub use extrapolate::extrapolate;

/// Validates if a virtual path is in canonical form
///
/// # Rules
///
/// - Must not start with `/` or `./`
/// - Must not contain `//` or `\`
/// - Must not end with `/`
/// - Must not contain `.` segments
///
/// # Examples
///
/// ```
/// use rhtmx_route_compiler::path::is_normalized;
///
/// assert!(is_normalized("index.rsx"));
/// assert!(is_normalized("users/[id].rsx"));
///
/// assert!(!is_normalized("./index.rsx"));
/// assert!(!is_normalized("/users/[id].rsx"));
/// assert!(!is_normalized("users//[id].rsx"));
/// assert!(!is_normalized("users\\[id].rsx"));
/// ```
pub fn is_normalized(path: &str) -> bool {
    !path.starts_with('/')
        && !path.ends_with('/')
        && !path.contains("//")
        && !path.contains('\\')
        && path.split('/').all(|part| part != ".")
}

/// Normalizes a virtual path to its root-relative canonical form
///
/// Returns `Cow::Borrowed` when input is already canonical (zero allocations).
///
/// # Examples
///
/// ```
/// use rhtmx_route_compiler::path::normalize;
/// use std::borrow::Cow;
///
/// assert!(matches!(normalize("about.rsx"), Cow::Borrowed("about.rsx")));
/// assert_eq!(normalize("./(app)/index.tsx"), "(app)/index.tsx");
/// assert_eq!(normalize("\\users\\[id].rsx"), "users/[id].rsx");
/// assert_eq!(normalize("/a//b/"), "a/b");
/// ```
pub fn normalize(path: &str) -> Cow<'_, str> {
    if is_normalized(path) {
        return Cow::Borrowed(path);
    }

    Cow::Owned(
        path.replace('\\', "/")
            .split('/')
            .filter(|s| !s.is_empty() && *s != ".")
            .collect::<Vec<_>>()
            .join("/"),
    )
}

/// What a virtual path declares, once extensions and markers are stripped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMeta {
    /// Route path without extension, variant suffix or `+api` marker
    pub route: String,
    pub specificity: u32,
    pub is_layout: bool,
    pub is_api: bool,
}

impl FileMeta {
    /// Directory portion of the route (empty at the root)
    pub fn directory(&self) -> &str {
        self.route.rsplit_once('/').map_or("", |(dir, _)| dir)
    }

    /// Last segment of the route
    pub fn filename(&self) -> &str {
        self.route
            .rsplit_once('/')
            .map_or(self.route.as_str(), |(_, file)| file)
    }
}

/// Parses a normalized virtual path into its [`FileMeta`]
///
/// Returns `Ok(None)` when the path carries a variant suffix that is not
/// active for this compile.
///
/// # Examples
///
/// ```
/// use rhtmx_route_compiler::path::parse_file_meta;
/// use rhtmx_route_compiler::CompileOptions;
///
/// let options = CompileOptions::default().with_variant("web", Some(1));
///
/// let meta = parse_file_meta("users/[id].web.rsx", None, &options).unwrap().unwrap();
/// assert_eq!(meta.route, "users/[id]");
/// assert_eq!(meta.specificity, 1);
///
/// let meta = parse_file_meta("api/ping+api.rs", None, &options).unwrap().unwrap();
/// assert_eq!(meta.route, "api/ping");
/// assert!(meta.is_api);
/// ```
pub fn parse_file_meta(
    path: &str,
    specificity: Option<u32>,
    options: &CompileOptions,
) -> Result<Option<FileMeta>> {
    let without_ext = strip_extension(path, &options.extensions);

    let (route, variant) = match without_ext.rsplit_once('.') {
        Some((stem, suffix)) if options.variants.is_known(suffix) && !stem.ends_with('/') => {
            (stem, Some(suffix))
        }
        _ => (without_ext, None),
    };

    let specificity = match (specificity, variant) {
        (Some(explicit), _) => explicit,
        (None, Some(suffix)) => match options.variants.rank(suffix) {
            Some(rank) => rank,
            None => return Ok(None),
        },
        (None, None) => 0,
    };

    let (route, is_api) = match route.strip_suffix(API_SUFFIX) {
        Some(stripped) => (stripped, true),
        None => (route, false),
    };

    let filename = route.rsplit_once('/').map_or(route, |(_, file)| file);

    if filename.is_empty() {
        return Err(CompileError::malformed(
            path,
            ConventionError::EmptyName(path.to_string()),
        ));
    }

    if is_api && specificity != 0 {
        return Err(CompileError::malformed(
            path,
            ConventionError::VariantApiRoute(path.to_string()),
        ));
    }

    if !is_api {
        if filename.starts_with('+') && filename != NOT_FOUND_MARKER {
            return Err(CompileError::malformed(
                path,
                ConventionError::ReservedPrefix(filename.to_string()),
            ));
        }
        if let Ok(Segment::Group(_)) = classify_segment(filename) {
            return Err(CompileError::malformed(
                path,
                ConventionError::GroupFilename(filename.to_string()),
            ));
        }
    }

    Ok(Some(FileMeta {
        is_layout: !is_api && filename == LAYOUT_MARKER,
        route: route.to_string(),
        specificity,
        is_api,
    }))
}

fn strip_extension<'a>(path: &'a str, extensions: &[String]) -> &'a str {
    match path.rsplit_once('.') {
        Some((stem, ext)) if !ext.contains('/') && extensions.iter().any(|known| known == ext) => {
            stem
        }
        _ => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> CompileOptions {
        CompileOptions::default()
            .with_variant("ios", Some(2))
            .with_variant("native", Some(1))
            .with_variant("android", None)
    }

    #[test]
    fn test_normalize_valid_is_borrowed() {
        assert!(matches!(normalize("users/[id].rsx"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_normalize_dot_prefix_and_slashes() {
        assert_eq!(normalize("./users/[id].rsx"), "users/[id].rsx");
        assert_eq!(normalize("users/./[id].rsx"), "users/[id].rsx");
        assert_eq!(normalize("/users///[id].rsx/"), "users/[id].rsx");
    }

    #[test]
    fn test_parse_plain_route() {
        let meta = parse_file_meta("settings/profile.rsx", None, &options())
            .unwrap()
            .unwrap();
        assert_eq!(meta.route, "settings/profile");
        assert_eq!(meta.directory(), "settings");
        assert_eq!(meta.filename(), "profile");
        assert_eq!(meta.specificity, 0);
        assert!(!meta.is_layout);
        assert!(!meta.is_api);
    }

    #[test]
    fn test_parse_layout() {
        let meta = parse_file_meta("settings/_layout.tsx", None, &options())
            .unwrap()
            .unwrap();
        assert!(meta.is_layout);
        assert_eq!(meta.directory(), "settings");
    }

    #[test]
    fn test_parse_variant_ranks() {
        let meta = parse_file_meta("index.ios.tsx", None, &options()).unwrap().unwrap();
        assert_eq!((meta.route.as_str(), meta.specificity), ("index", 2));

        let meta = parse_file_meta("index.native.tsx", None, &options()).unwrap().unwrap();
        assert_eq!(meta.specificity, 1);

        assert!(parse_file_meta("index.android.tsx", None, &options())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_unknown_suffix_is_part_of_the_name() {
        let meta = parse_file_meta("feed.xml", None, &options()).unwrap().unwrap();
        assert_eq!(meta.route, "feed.xml");
    }

    #[test]
    fn test_explicit_specificity_wins() {
        let meta = parse_file_meta("index.ios.tsx", Some(7), &options())
            .unwrap()
            .unwrap();
        assert_eq!(meta.specificity, 7);
    }

    #[test]
    fn test_api_variant_rejected() {
        let err = parse_file_meta("ping+api.ios.ts", None, &options()).unwrap_err();
        assert!(matches!(
            err,
            CompileError::MalformedConvention {
                reason: ConventionError::VariantApiRoute(_),
                ..
            }
        ));
    }

    #[test]
    fn test_reserved_prefix_rejected() {
        let err = parse_file_meta("+html.tsx", None, &options()).unwrap_err();
        assert!(matches!(
            err,
            CompileError::MalformedConvention {
                reason: ConventionError::ReservedPrefix(_),
                ..
            }
        ));
        assert!(parse_file_meta("+not-found.tsx", None, &options()).is_ok());
    }

    #[test]
    fn test_empty_name_rejected() {
        for path in ["", "+api.ts", "users/+api.ts"] {
            let err = parse_file_meta(path, None, &options()).unwrap_err();
            assert!(matches!(
                err,
                CompileError::MalformedConvention {
                    reason: ConventionError::EmptyName(_),
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_group_filename_rejected() {
        let err = parse_file_meta("(app)/(tabs).tsx", None, &options()).unwrap_err();
        assert!(matches!(
            err,
            CompileError::MalformedConvention {
                reason: ConventionError::GroupFilename(_),
                ..
            }
        ));
    }
}
