//! Key patterns for pruning, e.g. `APP.LEGACY.*`.
//!
//! `*` matches within one dot-separated segment and never crosses a `.`.

/// Check if a key pattern contains wildcards.
pub fn is_key_pattern(pattern: &str) -> bool {
    pattern.contains('*')
}

/// Expand `patterns` against `keys`.
///
/// Literal patterns are kept as given, matched or not. Wildcard patterns expand
/// to the matching keys in `keys` order. Duplicates are dropped.
pub fn expand_key_patterns(patterns: &[String], keys: &[String]) -> Vec<String> {
    let mut expanded: Vec<String> = Vec::new();
    for pattern in patterns {
        if !is_key_pattern(pattern) {
            if !expanded.contains(pattern) {
                expanded.push(pattern.clone());
            }
            continue;
        }
        let segments: Vec<&str> = pattern.split('.').collect();
        for key in keys.iter().filter(|k| matches_pattern(&segments, k)) {
            if !expanded.contains(key) {
                expanded.push(key.clone());
            }
        }
    }
    expanded
}

fn matches_pattern(pattern_segments: &[&str], key: &str) -> bool {
    let key_segments: Vec<&str> = key.split('.').collect();
    pattern_segments.len() == key_segments.len()
        && pattern_segments
            .iter()
            .zip(&key_segments)
            .all(|(pattern, segment)| segment_matches(pattern, segment))
}

/// One segment; `*` matches zero or more characters.
fn segment_matches(pattern: &str, text: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    let parts: Vec<&str> = pattern.split('*').collect();
    let [first, middle @ .., last] = parts.as_slice() else {
        return pattern == text;
    };

    if !text.starts_with(*first) || !text.ends_with(*last) {
        return false;
    }
    let start = first.len();
    let Some(end) = text.len().checked_sub(last.len()) else {
        return false;
    };
    if start > end {
        return false;
    }

    let mut pos = start;
    for part in middle.iter().filter(|p| !p.is_empty()) {
        match text[pos..end].find(*part) {
            Some(found) => pos += found + part.len(),
            None => return false,
        }
    }
    true
}
