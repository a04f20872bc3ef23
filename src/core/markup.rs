//! Markup scanner for component templates.
//!
//! Extracts text nodes, allow-listed attribute values and string literals
//! inside `{{ ... }}` interpolations from template markup. Works on standalone
//! template files and on inline templates nested in a TypeScript host file, in
//! which case positions are translated into host-file coordinates.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::classify::policy::{PolicyTable, is_multi_word};
use crate::core::data::{CandidateKind, FoundString};
use crate::core::offset::{LineIndex, Position};
use crate::utils::{collapse_whitespace, decode_entities};

static STYLE_BLOCK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style\b[^>]*>(.*?)</style\s*>").unwrap());
static SCRIPT_BLOCK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b[^>]*>(.*?)</script\s*>").unwrap());
static COMMENT_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
static ATTRIBUTE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|\s)([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap()
});
static CONTROL_FLOW_SPLIT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@[a-z]+(?:\s+if)?\b[^{}]*\{|\}|\{").unwrap());
static TRANSLATED_LITERAL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:'([^'\\]+)'|"([^"\\]+)")\s*\|\s*translate\b"#).unwrap()
});

/// Where the markup being scanned comes from.
#[derive(Debug, Clone, Copy)]
pub struct MarkupSource<'a> {
    pub file_abs: &'a str,
    pub file_rel: &'a str,
    /// Host position of the first markup character for inline templates.
    pub origin: Option<Position>,
    /// Delimiter of the host string literal for inline templates.
    pub host_quote: Option<char>,
}

impl<'a> MarkupSource<'a> {
    /// A standalone markup file.
    pub fn file(file_abs: &'a str, file_rel: &'a str) -> Self {
        Self {
            file_abs,
            file_rel,
            origin: None,
            host_quote: None,
        }
    }
}

/// Scans markup for translatable text.
pub struct MarkupScanner<'a> {
    policy: &'a PolicyTable,
    attributes: &'a [String],
    min_length: usize,
}

impl<'a> MarkupScanner<'a> {
    pub fn new(policy: &'a PolicyTable, attributes: &'a [String], min_length: usize) -> Self {
        Self {
            policy,
            attributes,
            min_length,
        }
    }

    /// Scan a markup buffer and return every accepted or already-translated span.
    pub fn scan(&self, markup: &str, source: &MarkupSource<'_>) -> Vec<FoundString> {
        let masked = mask_blocks(markup);
        let mut walker = Walker {
            scanner: self,
            markup,
            masked: &masked,
            index: LineIndex::new(markup),
            source,
            found: Vec::new(),
        };
        walker.walk();
        walker.collect_translated();

        let mut found = walker.found;
        found.sort_by_key(|f| (f.line, f.column));
        found
    }

    fn accepts(&self, text: &str) -> bool {
        if text.chars().count() < self.min_length {
            return false;
        }
        self.policy.rejection_reason(text).is_none()
    }

    fn is_checked_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a.eq_ignore_ascii_case(name))
    }
}

/// Replace the bodies of `<style>`/`<script>` blocks and whole comments with
/// spaces, keeping newlines and byte offsets intact.
pub fn mask_blocks(markup: &str) -> String {
    let mut bytes = markup.as_bytes().to_vec();
    let mut blank = |start: usize, end: usize| {
        for b in &mut bytes[start..end] {
            if *b != b'\n' && *b != b'\r' {
                *b = b' ';
            }
        }
    };

    for regex in [&*STYLE_BLOCK_REGEX, &*SCRIPT_BLOCK_REGEX] {
        for caps in regex.captures_iter(markup) {
            if let Some(body) = caps.get(1) {
                blank(body.start(), body.end());
            }
        }
    }
    for m in COMMENT_REGEX.find_iter(markup) {
        blank(m.start(), m.end());
    }

    // Multi-byte sequences are blanked whole, so this never fails.
    String::from_utf8(bytes).unwrap_or_else(|_| markup.to_string())
}

struct Walker<'s, 'm> {
    scanner: &'s MarkupScanner<'s>,
    markup: &'m str,
    masked: &'m str,
    index: LineIndex<'m>,
    source: &'m MarkupSource<'m>,
    found: Vec<FoundString>,
}

impl<'s, 'm> Walker<'s, 'm> {
    fn walk(&mut self) {
        let bytes = self.masked.as_bytes();
        let len = bytes.len();
        let mut i = 0;
        let mut text_start = 0;

        while i < len {
            if bytes[i] == b'{' && bytes.get(i + 1) == Some(&b'{') {
                i = find_interpolation_end(self.masked, i + 2).map_or(len, |end| end + 2);
                continue;
            }
            if bytes[i] == b'<' && is_tag_start(bytes, i) {
                self.scan_text(text_start, i);
                let end = find_tag_end(bytes, i);
                self.scan_attributes(i, end);
                i = end;
                text_start = end;
                continue;
            }
            i += 1;
        }
        self.scan_text(text_start, len);
    }

    /// Text between tags, split into static and interpolated segments.
    fn scan_text(&mut self, start: usize, end: usize) {
        if start >= end {
            return;
        }
        let mut cursor = start;
        while let Some(rel) = self.masked[cursor..end].find("{{") {
            let open = cursor + rel;
            self.scan_static(cursor, open);
            let Some(close) = find_interpolation_end(self.masked, open + 2).filter(|c| *c <= end)
            else {
                cursor = end;
                break;
            };
            self.scan_interpolation(open + 2, close);
            cursor = close + 2;
        }
        self.scan_static(cursor, end);
    }

    /// A static text run; control-flow block syntax also splits it.
    fn scan_static(&mut self, start: usize, end: usize) {
        if start >= end {
            return;
        }
        let run = &self.masked[start..end];
        let mut cursor = 0;
        for m in CONTROL_FLOW_SPLIT_REGEX.find_iter(run) {
            self.emit_text(start + cursor, start + m.start());
            cursor = m.end();
        }
        self.emit_text(start + cursor, end);
    }

    /// Emit each unmasked part of `[start, end)` as its own text segment.
    fn emit_text(&mut self, start: usize, end: usize) {
        for (run_start, run_end) in unmasked_runs(self.markup, self.masked, start, end) {
            self.emit_segment(run_start, run_end);
        }
    }

    fn emit_segment(&mut self, start: usize, end: usize) {
        let segment = &self.markup[start..end];
        let trimmed = segment.trim();
        if trimmed.is_empty() {
            return;
        }
        let lead = segment.len() - segment.trim_start().len();
        let text = collapse_whitespace(&decode_entities(trimmed));
        if !self.scanner.accepts(&text) {
            return;
        }
        self.push(start + lead, trimmed, text, CandidateKind::TextNode, None);
    }

    /// String literals inside an interpolation expression `[start, end)`.
    fn scan_interpolation(&mut self, start: usize, end: usize) {
        let expr = &self.markup[start..end];
        for (lit_start, lit_end) in string_literals(expr) {
            let before = expr[..lit_start].trim_end();
            let after = expr[lit_end..].trim_start();

            if is_translate_pipe(after) {
                continue;
            }
            if before.ends_with(':') && expr[..lit_start].contains('|') {
                continue;
            }
            if before.ends_with("==")
                || before.ends_with("!=")
                || before.ends_with('[')
                || after.starts_with("==")
                || after.starts_with("!=")
            {
                continue;
            }

            if !self.is_unmasked(start + lit_start, start + lit_end) {
                continue;
            }
            let raw = &expr[lit_start..lit_end];
            let content = unescape_literal(&raw[1..raw.len() - 1]);
            let text = collapse_whitespace(content.trim());
            if !self.scanner.accepts(&text) {
                continue;
            }
            if !is_multi_word(&text)
                && self.scanner.policy.technical_shape(&text).is_some()
            {
                continue;
            }
            self.push(
                start + lit_start,
                raw,
                text,
                CandidateKind::InterpolationExpression,
                None,
            );
        }
    }

    /// Allow-listed attribute values of the tag `[start, end)`.
    fn scan_attributes(&mut self, start: usize, end: usize) {
        let tag = &self.masked[start..end];
        let mut hits = Vec::new();
        for caps in ATTRIBUTE_REGEX.captures_iter(tag) {
            let Some(name) = caps.get(1) else {
                continue;
            };
            if !self.scanner.is_checked_attribute(name.as_str()) {
                continue;
            }
            let (value, quote) = match (caps.get(2), caps.get(3)) {
                (Some(v), _) => (v, '"'),
                (None, Some(v)) => (v, '\''),
                (None, None) => continue,
            };
            hits.push((start + value.start(), start + value.end(), quote));
        }

        for (value_start, value_end, quote) in hits {
            if !self.is_unmasked(value_start, value_end) {
                continue;
            }
            let value = &self.markup[value_start..value_end];
            let trimmed = value.trim();
            if trimmed.is_empty() {
                continue;
            }
            let lead = value.len() - value.trim_start().len();
            let text = collapse_whitespace(&decode_entities(trimmed));
            if !self.scanner.accepts(&text) {
                continue;
            }
            self.push(
                value_start + lead,
                trimmed,
                text,
                CandidateKind::AttributeValue,
                Some(quote),
            );
        }
    }

    /// Keys already piped through `translate` anywhere in the markup.
    fn collect_translated(&mut self) {
        let hits: Vec<(usize, String, String)> = TRANSLATED_LITERAL_REGEX
            .captures_iter(self.masked)
            .filter_map(|caps| {
                let key = caps.get(1).or_else(|| caps.get(2))?;
                Some((
                    key.start() - 1,
                    self.markup[key.start() - 1..key.end() + 1].to_string(),
                    key.as_str().trim().to_string(),
                ))
            })
            .filter(|(_, _, key)| !key.is_empty())
            .collect();

        for (offset, raw, key) in hits {
            let mut found = self.make(
                offset,
                &raw,
                key,
                CandidateKind::InterpolationExpression,
                None,
            );
            found.is_already_translated = true;
            self.found.push(found);
        }
    }

    /// The markup and its masked copy agree on `[start, end)`.
    fn is_unmasked(&self, start: usize, end: usize) -> bool {
        self.markup.as_bytes()[start..end] == self.masked.as_bytes()[start..end]
    }

    fn push(
        &mut self,
        offset: usize,
        raw: &str,
        text: String,
        kind: CandidateKind,
        attr_quote: Option<char>,
    ) {
        let found = self.make(offset, raw, text, kind, attr_quote);
        self.found.push(found);
    }

    fn make(
        &self,
        offset: usize,
        raw: &str,
        text: String,
        kind: CandidateKind,
        attr_quote: Option<char>,
    ) -> FoundString {
        let mut position = self.index.position(offset);
        if let Some(origin) = self.source.origin {
            position = position.translate_into(origin);
        }
        let enclosing_quotes = attr_quote
            .into_iter()
            .chain(self.source.host_quote)
            .collect();
        FoundString {
            file_abs: self.source.file_abs.to_string(),
            file_rel: self.source.file_rel.to_string(),
            line: position.line,
            column: position.column,
            text,
            raw_text: Some(raw.to_string()),
            kind,
            is_already_translated: false,
            enclosing_quotes,
        }
    }
}

/// Maximal sub-ranges of `[start, end)` the mask left untouched.
///
/// Whitespace inside a masked block survives masking, which only yields
/// blank runs. Multi-byte characters are blanked byte by byte, so every
/// boundary is a char boundary.
fn unmasked_runs(markup: &str, masked: &str, start: usize, end: usize) -> Vec<(usize, usize)> {
    let original = markup.as_bytes();
    let blanked = masked.as_bytes();
    let mut runs = Vec::new();
    let mut run_start: Option<usize> = None;
    for i in start..end {
        match (original[i] == blanked[i], run_start) {
            (true, None) => run_start = Some(i),
            (false, Some(s)) => {
                runs.push((s, i));
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = run_start {
        runs.push((s, end));
    }
    runs
}

fn is_tag_start(bytes: &[u8], i: usize) -> bool {
    matches!(bytes.get(i + 1), Some(b) if b.is_ascii_alphabetic() || *b == b'/' || *b == b'!')
}

/// Offset just past the closing `>` of the tag opening at `i`, skipping quoted values.
fn find_tag_end(bytes: &[u8], i: usize) -> usize {
    let mut quote: Option<u8> = None;
    let mut j = i + 1;
    while j < bytes.len() {
        let b = bytes[j];
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => return j + 1,
            None => {}
        }
        j += 1;
    }
    bytes.len()
}

/// Offset of the `}}` closing an interpolation whose body starts at `from`.
fn find_interpolation_end(text: &str, from: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut quote: Option<u8> = None;
    let mut j = from;
    while j < bytes.len() {
        let b = bytes[j];
        match quote {
            Some(_) if b == b'\\' => j += 1,
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'\'' || b == b'"' => quote = Some(b),
            None if b == b'}' && bytes.get(j + 1) == Some(&b'}') => return Some(j),
            None => {}
        }
        j += 1;
    }
    None
}

/// Byte ranges (quotes included) of the quoted string literals in an expression.
fn string_literals(expr: &str) -> Vec<(usize, usize)> {
    let bytes = expr.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'\'' || b == b'"' {
            let mut j = i + 1;
            let mut closed = false;
            while j < bytes.len() {
                if bytes[j] == b'\\' {
                    j += 2;
                    continue;
                }
                if bytes[j] == b {
                    closed = true;
                    break;
                }
                j += 1;
            }
            if !closed {
                break;
            }
            out.push((i, j + 1));
            i = j + 1;
        } else {
            i += 1;
        }
    }
    out
}

fn is_translate_pipe(after: &str) -> bool {
    after
        .strip_prefix('|')
        .map(str::trim_start)
        .and_then(|rest| rest.strip_prefix("translate"))
        .is_some_and(|rest| {
            !rest
                .chars()
                .next()
                .is_some_and(|c| c.is_alphanumeric() || c == '_')
        })
}

fn unescape_literal(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut chars = content.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}
