/// Named-capture regex generation for manifest rows
///
/// Parameter names come from file names and can be anything the file system
/// allows, while regex group names cannot. Each name is mapped to a safe key
/// and the mapping is kept so matches can be reported under the real name.
use std::collections::BTreeMap;

use crate::route::pattern::{classify_segment, Segment};

/// Group keys longer than this are replaced by a generated key
const MAX_KEY_LENGTH: usize = 30;

/// Regex source for one canonical path plus its key mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedRegex {
    pub pattern: String,
    /// Safe group key → original parameter name
    pub route_keys: BTreeMap<String, String>,
}

/// Builds the anchored named-capture regex for a canonical path
///
/// # Examples
///
/// ```
/// use rhtmx_route_compiler::manifest::regex::named_route_regex;
///
/// let named = named_route_regex("/users/[id]/[...rest]");
/// assert_eq!(named.pattern, "^/users/(?<id>[^/]+?)/(?<rest>.+?)(?:/)?$");
/// assert_eq!(named.route_keys["rest"], "rest");
///
/// assert_eq!(named_route_regex("/").pattern, "^(?:/)?$");
/// ```
pub fn named_route_regex(canonical_path: &str) -> NamedRegex {
    let mut keys = KeyGenerator::default();
    let mut route_keys = BTreeMap::new();

    let body: String = canonical_path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| match classify_segment(segment) {
            Ok(Segment::Dynamic {
                name,
                deep,
                optional,
            }) => {
                let key = safe_key(&name, &route_keys, &mut keys);
                route_keys.insert(key.clone(), name);
                match (deep, optional) {
                    (true, true) => format!("(?:/(?<{key}>.+?))?"),
                    (true, false) => format!("/(?<{key}>.+?)"),
                    _ => format!("/(?<{key}>[^/]+?)"),
                }
            }
            Ok(Segment::NotFound) => {
                let name = "not-found".to_string();
                let key = safe_key(&name, &route_keys, &mut keys);
                route_keys.insert(key.clone(), name);
                format!("/(?<{key}>.+?)")
            }
            Ok(Segment::Group(alternatives)) => match alternatives.as_slice() {
                [single] => format!("(?:/{})?", regex::escape(single)),
                _ => {
                    let alternatives: Vec<String> =
                        alternatives.iter().map(|alt| regex::escape(alt)).collect();
                    format!("(?:/(?:{}))?", alternatives.join("|"))
                }
            },
            _ => format!("/{}", regex::escape(segment)),
        })
        .collect();

    NamedRegex {
        pattern: format!("^{body}(?:/)?$"),
        route_keys,
    }
}

/// Picks a regex-safe group key for `name`
///
/// Non-word characters are dropped. Keys that end up empty, too long,
/// starting with a digit, or already taken on this row are replaced by the
/// next unused generated key.
fn safe_key(
    name: &str,
    used: &BTreeMap<String, String>,
    keys: &mut KeyGenerator,
) -> String {
    let sanitized: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();

    let valid = !sanitized.is_empty()
        && sanitized.len() <= MAX_KEY_LENGTH
        && !sanitized.starts_with(|c: char| c.is_ascii_digit())
        && !used.contains_key(&sanitized);

    if valid {
        return sanitized;
    }

    keys.by_ref()
        .find(|candidate| !used.contains_key(candidate))
        .unwrap_or(sanitized)
}

/// Bijective base-26 key sequence: `a`…`z`, `aa`, `ab`, …
#[derive(Debug, Default)]
pub struct KeyGenerator {
    issued: u64,
}

impl Iterator for KeyGenerator {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.issued += 1;
        let mut n = self.issued;
        let mut key = Vec::new();
        while n > 0 {
            n -= 1;
            key.push(b'a' + (n % 26) as u8);
            n /= 26;
        }
        key.reverse();
        String::from_utf8(key).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_key_generator_sequence() {
        let keys: Vec<String> = KeyGenerator::default().take(28).collect();
        assert_eq!(keys[0], "a");
        assert_eq!(keys[25], "z");
        assert_eq!(keys[26], "aa");
        assert_eq!(keys[27], "ab");

        let mut generator = KeyGenerator::default();
        assert_eq!(generator.nth(701).as_deref(), Some("zz"));
        assert_eq!(generator.next().as_deref(), Some("aaa"));
    }

    #[rstest]
    #[case("/users/[id]", "^/users/(?<id>[^/]+?)(?:/)?$")]
    #[case("/docs/[[...slug]]", "^/docs(?:/(?<slug>.+?))?(?:/)?$")]
    #[case("/(app)/home", "^(?:/app)?/home(?:/)?$")]
    #[case("/(a,b)/ping", "^(?:/(?:a|b))?/ping(?:/)?$")]
    #[case("/files/a.b+c", "^/files/a\\.b\\+c(?:/)?$")]
    fn test_segment_patterns(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(named_route_regex(path).pattern, expected);
    }

    #[test]
    fn test_not_found_is_a_catch_all() {
        let named = named_route_regex("/blog/+not-found");
        assert_eq!(named.pattern, "^/blog/(?<notfound>.+?)(?:/)?$");
        assert_eq!(named.route_keys["notfound"], "not-found");
    }

    #[test]
    fn test_unsafe_and_colliding_keys_are_replaced() {
        let named = named_route_regex("/[user-id]/[userid]/[1st]/[-]");

        let expected: BTreeMap<String, String> = [
            ("userid", "user-id"),
            ("a", "userid"),
            ("b", "1st"),
            ("c", "-"),
        ]
        .into_iter()
        .map(|(key, name)| (key.to_string(), name.to_string()))
        .collect();

        assert_eq!(named.route_keys, expected);
    }

    #[test]
    fn test_long_keys_are_replaced() {
        let long = "x".repeat(MAX_KEY_LENGTH + 1);
        let named = named_route_regex(&format!("/[{long}]"));
        assert_eq!(named.route_keys["a"], long);
    }

    #[test]
    fn test_generated_key_skips_taken_names() {
        let named = named_route_regex("/[a]/[1]");
        assert_eq!(named.route_keys["a"], "a");
        assert_eq!(named.route_keys["b"], "1");
    }
}
