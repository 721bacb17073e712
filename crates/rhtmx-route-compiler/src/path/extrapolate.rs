/// Expansion of comma-group tokens into concrete paths
///
/// `(a,b)/page` declares the same file under two parents. Single groups such
/// as `(auth)` are organizational only and are left untouched.
use std::collections::HashSet;

use crate::error::{CompileError, Result};
use crate::route::pattern::match_group_name;

/// Expands every multi-alternative group token into the set of concrete paths
///
/// Results keep first-seen order and never contain duplicates.
///
/// # Examples
///
/// ```
/// use rhtmx_route_compiler::path::extrapolate;
///
/// let paths = extrapolate("(a,b)/(c,d)/e").unwrap();
/// assert_eq!(paths, vec!["a/c/e", "a/d/e", "b/c/e", "b/d/e"]);
///
/// assert_eq!(extrapolate("(a)/b").unwrap(), vec!["(a)/b"]);
/// assert!(extrapolate("(a,a)/b").is_err());
/// ```
pub fn extrapolate(path: &str) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut paths = Vec::new();
    extrapolate_into(path, &mut seen, &mut paths)?;
    Ok(paths)
}

fn extrapolate_into(
    path: &str,
    seen: &mut HashSet<String>,
    paths: &mut Vec<String>,
) -> Result<()> {
    let segments: Vec<&str> = path.split('/').collect();

    let Some((index, alternatives)) = segments.iter().enumerate().find_map(|(index, segment)| {
        match_group_name(segment)
            .filter(|alternatives| alternatives.len() > 1)
            .map(|alternatives| (index, alternatives))
    }) else {
        if seen.insert(path.to_string()) {
            paths.push(path.to_string());
        }
        return Ok(());
    };

    let mut unique = HashSet::new();
    if let Some(duplicate) = alternatives.iter().find(|alt| !unique.insert(alt.as_str())) {
        return Err(CompileError::DuplicateGroupAlternative {
            path: path.to_string(),
            alternative: duplicate.clone(),
        });
    }

    for alternative in &alternatives {
        let expanded = segments
            .iter()
            .enumerate()
            .map(|(i, segment)| if i == index { alternative.as_str() } else { *segment })
            .collect::<Vec<_>>()
            .join("/");
        extrapolate_into(&expanded, seen, paths)?;
    }

    Ok(())
}
