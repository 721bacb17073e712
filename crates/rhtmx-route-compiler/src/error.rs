//! Error types for route compilation

use thiserror::Error;

/// Why a single path segment could not be classified
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConventionError {
    #[error("unbalanced brackets in segment `{0}`")]
    UnbalancedBrackets(String),

    #[error("unbalanced parentheses in segment `{0}`")]
    UnbalancedParentheses(String),

    #[error("segment `{0}` has an empty name")]
    EmptyName(String),

    #[error("double brackets are only valid around a catch-all, found `{0}`")]
    OptionalNonCatchAll(String),

    #[error("route files cannot end with a group segment (`{0}`)")]
    GroupFilename(String),

    #[error("route files cannot start with `+` (`{0}`); only `+not-found` and `+api` are reserved")]
    ReservedPrefix(String),

    #[error("API routes cannot have a variant suffix (`{0}`)")]
    VariantApiRoute(String),
}

/// Fatal errors raised while compiling a route tree or manifest
///
/// An empty input is not an error; see [`crate::Compiled::Empty`].
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("malformed route convention in `{path}`: {reason}")]
    MalformedConvention {
        path: String,
        #[source]
        reason: ConventionError,
    },

    #[error("`{incoming}` and `{existing}` conflict on the route `/{route}`; remove or rename one of them")]
    SpecificityConflict {
        route: String,
        existing: String,
        incoming: String,
    },

    #[error("group syntax cannot repeat the alternative `{alternative}` in `{path}`")]
    DuplicateGroupAlternative { path: String, alternative: String },

    #[error("`{source_id}` has no fallback sibling without a variant suffix for `/{route}`")]
    MissingFallback { route: String, source_id: String },

    #[error("invalid ignore pattern `{pattern}`")]
    InvalidIgnorePattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("failed to build a matcher for `{path}`")]
    InvalidRegex {
        path: String,
        #[source]
        source: regex::Error,
    },
}

impl CompileError {
    pub(crate) fn malformed(path: impl Into<String>, reason: ConventionError) -> Self {
        CompileError::MalformedConvention {
            path: path.into(),
            reason,
        }
    }
}

pub type Result<T, E = CompileError> = std::result::Result<T, E>;
