/// Convention matching for route path segments
///
/// Pure parsing of one file-path segment into a typed [`Segment`].
/// All functions are **pure**: same input → same output, no side effects.
use crate::error::ConventionError;
use crate::route::node::DynamicSegment;

/// Marker file that turns a directory into a layout
pub const LAYOUT_MARKER: &str = "_layout";
/// Reserved leaf that catches every unmatched path below its layout
pub const NOT_FOUND_MARKER: &str = "+not-found";
/// Filename suffix that marks an API route
pub const API_SUFFIX: &str = "+api";

/// Represents the different kinds of route path segments
///
/// # Examples
///
/// ```
/// use rhtmx_route_compiler::route::pattern::{classify_segment, Segment};
///
/// assert!(matches!(classify_segment("about"), Ok(Segment::Static(_))));
/// assert!(matches!(classify_segment("[id]"), Ok(Segment::Dynamic { deep: false, .. })));
/// assert!(matches!(classify_segment("[...slug]"), Ok(Segment::Dynamic { deep: true, .. })));
/// assert!(matches!(classify_segment("(auth)"), Ok(Segment::Group(_))));
/// assert!(matches!(classify_segment("_layout"), Ok(Segment::Layout)));
/// assert!(matches!(classify_segment("+not-found"), Ok(Segment::NotFound)));
/// assert!(matches!(classify_segment("ping+api"), Ok(Segment::Api(_))));
/// assert!(classify_segment("[id").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text matched verbatim
    Static(String),
    /// `[name]`, `[...name]` or `[[...name]]`
    Dynamic {
        name: String,
        deep: bool,
        optional: bool,
    },
    /// `(name)` or `(a,b,...)`, invisible in the URL
    Group(Vec<String>),
    /// `+not-found`
    NotFound,
    /// `_layout`
    Layout,
    /// A segment carrying the trailing `+api` marker
    Api(Box<Segment>),
}

impl Segment {
    /// Returns true for organizational segments that never appear in a URL
    pub fn is_group(&self) -> bool {
        matches!(self, Segment::Group(_))
    }

    /// Converts dynamic and not-found segments into their dynamic convention
    pub fn to_dynamic(&self) -> Option<DynamicSegment> {
        match self {
            Segment::Dynamic {
                name,
                deep,
                optional,
            } => Some(DynamicSegment {
                name: name.clone(),
                deep: *deep,
                not_found: false,
                optional: *optional,
            }),
            Segment::NotFound => Some(DynamicSegment::not_found()),
            Segment::Api(inner) => inner.to_dynamic(),
            _ => None,
        }
    }
}

/// Classifies a segment into a [`Segment`] (pure function)
///
/// # Parsing Rules (evaluated in order)
///
/// 1. `_layout` and `+not-found` markers
/// 2. Trailing `+api` marker, the remainder is classified recursively
/// 3. **Optional catch-all**: `[[...name]]`
/// 4. **Catch-all**: `[...name]`, **dynamic**: `[name]`
/// 5. **Group**: `(name)` or `(a, b)`
/// 6. **Static**: any other balanced text
pub fn classify_segment(segment: &str) -> Result<Segment, ConventionError> {
    if segment.is_empty() {
        return Err(ConventionError::EmptyName(segment.to_string()));
    }

    match segment {
        LAYOUT_MARKER => return Ok(Segment::Layout),
        NOT_FOUND_MARKER => return Ok(Segment::NotFound),
        _ => {}
    }

    if let Some(inner) = segment.strip_suffix(API_SUFFIX) {
        if inner.is_empty() {
            return Err(ConventionError::EmptyName(segment.to_string()));
        }
        return classify_segment(inner).map(|inner| Segment::Api(Box::new(inner)));
    }

    if segment.starts_with("[[") || segment.ends_with("]]") {
        return classify_optional(segment);
    }

    match (segment.strip_prefix('['), segment.ends_with(']')) {
        (Some(rest), true) => return classify_dynamic(segment, &rest[..rest.len() - 1]),
        (Some(_), false) => return Err(ConventionError::UnbalancedBrackets(segment.to_string())),
        (None, true) => return Err(ConventionError::UnbalancedBrackets(segment.to_string())),
        (None, false) => {}
    }

    match (segment.strip_prefix('('), segment.ends_with(')')) {
        (Some(rest), true) => classify_group(segment, &rest[..rest.len() - 1]),
        (Some(_), false) | (None, true) => {
            Err(ConventionError::UnbalancedParentheses(segment.to_string()))
        }
        (None, false) => classify_static(segment),
    }
}

fn classify_optional(segment: &str) -> Result<Segment, ConventionError> {
    let inner = segment
        .strip_prefix("[[")
        .and_then(|s| s.strip_suffix("]]"))
        .ok_or_else(|| ConventionError::UnbalancedBrackets(segment.to_string()))?;

    let name = inner
        .strip_prefix("...")
        .ok_or_else(|| ConventionError::OptionalNonCatchAll(segment.to_string()))?;

    validate_param_name(segment, name)?;
    Ok(Segment::Dynamic {
        name: name.to_string(),
        deep: true,
        optional: true,
    })
}

fn classify_dynamic(segment: &str, inner: &str) -> Result<Segment, ConventionError> {
    let (name, deep) = match inner.strip_prefix("...") {
        Some(name) => (name, true),
        None => (inner, false),
    };

    validate_param_name(segment, name)?;
    Ok(Segment::Dynamic {
        name: name.to_string(),
        deep,
        optional: false,
    })
}

fn validate_param_name(segment: &str, name: &str) -> Result<(), ConventionError> {
    if name.is_empty() {
        return Err(ConventionError::EmptyName(segment.to_string()));
    }
    if name.contains(['[', ']']) {
        return Err(ConventionError::UnbalancedBrackets(segment.to_string()));
    }
    Ok(())
}

fn classify_group(segment: &str, inner: &str) -> Result<Segment, ConventionError> {
    if inner.contains(['(', ')']) {
        return Err(ConventionError::UnbalancedParentheses(segment.to_string()));
    }

    let alternatives: Vec<String> = inner.split(',').map(|s| s.trim().to_string()).collect();
    if alternatives.iter().any(String::is_empty) {
        return Err(ConventionError::EmptyName(segment.to_string()));
    }

    Ok(Segment::Group(alternatives))
}

fn classify_static(segment: &str) -> Result<Segment, ConventionError> {
    let opens = segment.matches('[').count();
    let closes = segment.matches(']').count();
    if opens != closes {
        return Err(ConventionError::UnbalancedBrackets(segment.to_string()));
    }

    let opens = segment.matches('(').count();
    let closes = segment.matches(')').count();
    if opens != closes {
        return Err(ConventionError::UnbalancedParentheses(segment.to_string()));
    }

    Ok(Segment::Static(segment.to_string()))
}

/// Returns the alternatives of a group segment, or `None` for anything else
///
/// Malformed segments are treated as "not a group" here; the classifier
/// reports them when the full path is validated.
pub fn match_group_name(segment: &str) -> Option<Vec<String>> {
    match classify_segment(segment) {
        Ok(Segment::Group(alternatives)) => Some(alternatives),
        _ => None,
    }
}

/// Derives the dynamic convention of a `/`-joined route name
///
/// Returns `None` when no segment is dynamic.
///
/// # Examples
///
/// ```
/// use rhtmx_route_compiler::route::pattern::dynamic_convention;
///
/// let dynamic = dynamic_convention("users/[id]/[...rest]").unwrap();
/// assert_eq!(dynamic.len(), 2);
/// assert!(!dynamic[0].deep);
/// assert!(dynamic[1].deep);
///
/// assert!(dynamic_convention("settings/profile").is_none());
/// ```
pub fn dynamic_convention(name: &str) -> Option<Vec<DynamicSegment>> {
    let dynamic: Vec<DynamicSegment> = name
        .split('/')
        .filter(|part| !part.is_empty())
        .filter_map(|part| classify_segment(part).ok())
        .filter_map(|segment| segment.to_dynamic())
        .collect();

    if dynamic.is_empty() {
        None
    } else {
        Some(dynamic)
    }
}
