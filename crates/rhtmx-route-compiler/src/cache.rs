//! Caller-owned memoization of segment classification
//!
//! Compiling the same project repeatedly (tests, watch loops, multi-project
//! hosts) classifies the same path strings over and over. A
//! [`ConventionCache`] lets the caller keep those results between calls.
//!
//! The compiler consults it only to validate each route path before
//! registration, so a hit skips that validation pass. Later steps derive
//! dynamic conventions and manifest regexes from the route name itself.
//! Compiling with or without a cache gives identical output.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ConventionError;
use crate::route::pattern::{classify_segment, Segment};

/// Classified segments of a `/`-separated path
pub type Segments = Arc<[Segment]>;

/// Memoizes [`classify_path`] results keyed by the full path string
///
/// Failed classifications are never stored.
#[derive(Debug, Default, Clone)]
pub struct ConventionCache {
    entries: HashMap<String, Segments>,
    hits: usize,
    misses: usize,
}

impl ConventionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifies every segment of `path`, reusing a previous result if present
    pub fn classify(&mut self, path: &str) -> Result<Segments, ConventionError> {
        if let Some(segments) = self.entries.get(path) {
            self.hits += 1;
            return Ok(Arc::clone(segments));
        }

        self.misses += 1;
        let segments = classify_path(path)?;
        self.entries.insert(path.to_string(), Arc::clone(&segments));
        Ok(segments)
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }
}

/// Classifies every non-empty segment of a `/`-separated path
pub fn classify_path(path: &str) -> Result<Segments, ConventionError> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(classify_segment)
        .collect::<Result<Vec<_>, _>>()
        .map(Arc::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_hits_on_repeat() {
        let mut cache = ConventionCache::new();
        let first = cache.classify("users/[id]").unwrap();
        let second = cache.classify("users/[id]").unwrap();

        assert_eq!(first, second);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let mut cache = ConventionCache::new();
        assert!(cache.classify("users/[id").is_err());
        assert!(cache.classify("users/[id").is_err());
        assert!(cache.is_empty());
        assert_eq!(cache.misses(), 2);
    }

    #[test]
    fn test_classify_path_skips_empty_segments() {
        let segments = classify_path("a//[b]").unwrap();
        assert_eq!(segments.len(), 2);
    }
}
