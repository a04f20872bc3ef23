//! Common utility functions shared across the codebase.

/// Checks if the text contains at least one Unicode alphabetic character.
///
/// Returns false for empty strings, pure numbers, or pure symbols.
///
/// # Examples
///
/// ```
/// use glot_ng::utils::contains_alphabetic;
///
/// assert!(contains_alphabetic("Hello"));
/// assert!(contains_alphabetic("你好"));
/// assert!(contains_alphabetic("Hello123"));
/// assert!(!contains_alphabetic("123"));
/// assert!(!contains_alphabetic("---"));
/// assert!(!contains_alphabetic("$100"));
/// assert!(!contains_alphabetic(""));
/// ```
pub fn contains_alphabetic(text: &str) -> bool {
    text.chars().any(|c| c.is_alphabetic())
}

/// Collapse every run of whitespace into a single space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decode the HTML entities that commonly appear in template text.
///
/// Unknown entities are left untouched.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match tail.find(';').filter(|end| *end <= 10) {
            Some(end) => {
                let entity = &tail[1..end];
                match decode_entity(entity) {
                    Some(c) => out.push(c),
                    None => out.push_str(&tail[..=end]),
                }
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        "copy" => Some('©'),
        "reg" => Some('®'),
        "hellip" => Some('…'),
        "mdash" => Some('—'),
        "ndash" => Some('–'),
        _ => {
            let num = entity.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

/// Encode text for markup. `quote` is the attribute quote the text sits in, if any.
pub fn encode_entities(text: &str, quote: Option<char>) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if quote == Some('"') => out.push_str("&quot;"),
            '\'' if quote == Some('\'') => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape a value so it can sit inside a single-quoted JS/TS string.
pub fn escape_single_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_alphabetic() {
        assert!(contains_alphabetic("Hello"));
        assert!(contains_alphabetic("你好"));
        assert!(contains_alphabetic("Hello123"));
        assert!(contains_alphabetic("123 abc"));
        assert!(contains_alphabetic("Test!@#"));

        assert!(!contains_alphabetic("123"));
        assert!(!contains_alphabetic("---"));
        assert!(!contains_alphabetic("$100"));
        assert!(!contains_alphabetic("   "));
        assert!(!contains_alphabetic(""));
        assert!(!contains_alphabetic("123-456"));
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  Hello \n   world  "), "Hello world");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("Terms &amp; Conditions"), "Terms & Conditions");
        assert_eq!(decode_entities("a&nbsp;b"), "a b");
        assert_eq!(decode_entities("&#65;&#x42;"), "AB");
        assert_eq!(decode_entities("Fish & Chips"), "Fish & Chips");
        assert_eq!(decode_entities("&unknown;"), "&unknown;");
    }

    #[test]
    fn test_encode_entities() {
        assert_eq!(encode_entities("Use <b> & more", None), "Use &lt;b&gt; &amp; more");
        assert_eq!(encode_entities(r#"Say "hi", it's"#, Some('"')), "Say &quot;hi&quot;, it's");
        assert_eq!(encode_entities(r#"Say "hi", it's"#, Some('\'')), "Say \"hi\", it&#39;s");
        assert_eq!(decode_entities(&encode_entities("a < b && c", Some('"'))), "a < b && c");
    }

    #[test]
    fn test_escape_single_quoted() {
        assert_eq!(escape_single_quoted("It's"), "It\\'s");
        assert_eq!(escape_single_quoted("a\\b"), "a\\\\b");
        assert_eq!(escape_single_quoted("line\nbreak"), "line\\nbreak");
    }
}
