//! Path pattern matching.
//!
//! Patterns are matched segment by segment:
//!
//! * literal segments must be equal,
//! * `:name` captures one segment,
//! * a trailing `*` captures the remainder (at least one segment).
//!
//! Leading and trailing slashes are ignored, so `/users/` matches `/users`.

use std::collections::HashMap;

/// Splits the path into the next segment and the remainder.
///
/// # Example
/// ```
/// use basics_http::routing::next_segment;
///
/// let path = "users/123/posts";
/// let (segment, rest) = next_segment(path);
/// assert_eq!(segment, "users");
/// assert_eq!(rest, Some("123/posts"));
///
/// let path = "last";
/// let (segment, rest) = next_segment(path);
/// assert_eq!(segment, "last");
/// assert_eq!(rest, None);
/// ```
pub fn next_segment(path: &str) -> (&str, Option<&str>) {
    match path.split_once('/') {
        Some((segment, rest)) => (segment, Some(rest)),
        None => (path, None),
    }
}

/// Match `path` against `pattern`, returning the captured parameters.
///
/// With `prefix` set the pattern only has to match the leading segments of
/// the path (middleware mounting); otherwise the whole path must match.
pub fn match_path(pattern: &str, path: &str, prefix: bool) -> Option<HashMap<String, String>> {
    let mut params = HashMap::new();
    let mut pattern_rest = trimmed(pattern);
    let mut path_rest = trimmed(path);

    loop {
        match (pattern_rest, path_rest) {
            (None, None) => return Some(params),
            (None, Some(_)) => return prefix.then_some(params),
            (Some(_), None) => return None,
            (Some(pattern), Some(path)) => {
                let (expected, pattern_tail) = next_segment(pattern);
                if expected == "*" && pattern_tail.is_none() {
                    params.insert("*".to_string(), path.to_string());
                    return Some(params);
                }

                let (segment, path_tail) = next_segment(path);
                match expected.strip_prefix(':') {
                    Some(name) if !segment.is_empty() => {
                        params.insert(name.to_string(), segment.to_string());
                    }
                    Some(_) => return None,
                    None if expected == segment => {}
                    None => return None,
                }

                pattern_rest = pattern_tail;
                path_rest = path_tail;
            }
        }
    }
}

fn trimmed(path: &str) -> Option<&str> {
    Some(path.trim_matches('/')).filter(|p| !p.is_empty())
}
