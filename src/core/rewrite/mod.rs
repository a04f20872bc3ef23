//! Offset-validated source rewriting.
//!
//! Every replacement is checked against the untouched file before it is made:
//! the text at the candidate's position must equal its `raw_text` exactly.
//! Edits for one file are applied in a single pass from the end of the file
//! backwards, and the file is written whole.
//!
//! ## Module Structure
//!
//! - `scaffold`: Imports and injection a file needs after it gains translate calls

pub mod scaffold;

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use crate::core::data::{CandidateKind, FoundString, KeyMap};
use crate::core::offset::LineIndex;
use crate::core::rewrite::scaffold::Scaffolder;
use crate::issues::{Failure, FailureKind};

/// Statistics from rewriting a batch of files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteStats {
    /// Literal spans replaced with key references.
    pub strings_replaced: usize,
    /// Replacements skipped (mismatch, missing key, overlap).
    pub skipped: usize,
    /// Files whose content changed.
    pub files_updated: usize,
}

impl std::ops::AddAssign for RewriteStats {
    fn add_assign(&mut self, other: Self) {
        self.strings_replaced += other.strings_replaced;
        self.skipped += other.skipped;
        self.files_updated += other.files_updated;
    }
}

/// One file's planned rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRewrite {
    pub path: PathBuf,
    pub file_rel: String,
    pub original: String,
    pub updated: String,
    pub replaced: usize,
}

impl FileRewrite {
    pub fn is_changed(&self) -> bool {
        self.original != self.updated
    }
}

/// Every planned file rewrite plus the per-candidate failures met while planning.
#[derive(Debug, Clone, Default)]
pub struct RewritePlan {
    pub files: Vec<FileRewrite>,
    pub failures: Vec<Failure>,
    pub skipped: usize,
}

impl RewritePlan {
    pub fn stats(&self) -> RewriteStats {
        RewriteStats {
            strings_replaced: self.files.iter().map(|f| f.replaced).sum(),
            skipped: self.skipped,
            files_updated: self.files.iter().filter(|f| f.is_changed()).count(),
        }
    }

    /// Write every changed file.
    pub fn apply(&self) -> Result<RewriteStats> {
        for file in self.files.iter().filter(|f| f.is_changed()) {
            fs::write(&file.path, &file.updated)
                .with_context(|| format!("Failed to write file: {}", file.path.display()))?;
            tracing::debug!(file = %file.file_rel, replaced = file.replaced, "rewrote file");
        }
        Ok(self.stats())
    }
}

/// A validated replacement of `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Edit {
    start: usize,
    end: usize,
    replacement: String,
    kind: CandidateKind,
}

pub struct SourceRewriter<'a> {
    key_map: &'a KeyMap,
    /// Expression that owns `instant()`, e.g. `this.translate`.
    accessor: &'a str,
    scaffolder: Option<&'a dyn Scaffolder>,
}

impl<'a> SourceRewriter<'a> {
    pub fn new(key_map: &'a KeyMap, accessor: &'a str) -> Self {
        Self {
            key_map,
            accessor,
            scaffolder: None,
        }
    }

    pub fn with_scaffolder(mut self, scaffolder: &'a dyn Scaffolder) -> Self {
        self.scaffolder = Some(scaffolder);
        self
    }

    /// Plan the rewrite of every file that has candidates. Nothing is written.
    pub fn plan(&self, candidates: &[FoundString]) -> RewritePlan {
        let mut by_file: BTreeMap<&str, Vec<&FoundString>> = BTreeMap::new();
        for candidate in candidates.iter().filter(|c| !c.is_already_translated) {
            by_file.entry(&candidate.file_abs).or_default().push(candidate);
        }

        let mut plan = RewritePlan::default();
        let mut pipe_hosts: Vec<(PathBuf, String)> = Vec::new();

        for (file_abs, file_candidates) in by_file {
            if self.key_map.for_file(file_abs).is_none() {
                continue;
            }
            let path = PathBuf::from(file_abs);
            let file_rel = file_candidates[0].file_rel.clone();
            let original = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(err) => {
                    plan.failures.push(Failure::new(
                        FailureKind::ParseFailure,
                        &file_rel,
                        format!("Failed to read file: {}", err),
                    ));
                    continue;
                }
            };

            let (edits, failures) = self.collect_edits(&original, &file_candidates);
            plan.skipped += failures.len();
            plan.failures.extend(failures);

            let (mut updated, applied, overlapped) = apply_edits(&original, edits.clone());
            plan.skipped += overlapped;
            if applied == 0 {
                continue;
            }

            let gained_calls = edits.iter().any(|e| !e.kind.is_markup());
            let gained_pipes = edits.iter().any(|e| e.kind.is_markup());
            if let Some(scaffolder) = self.scaffolder {
                if is_script(&path) {
                    if gained_calls {
                        updated = scaffolder.ensure_call_support(&updated, self.accessor);
                    }
                    if gained_pipes {
                        updated = scaffolder.ensure_pipe_support(&updated);
                    }
                } else if gained_pipes {
                    let host_rel = Path::new(&file_rel).with_extension("ts");
                    pipe_hosts.push((
                        path.with_extension("ts"),
                        host_rel.to_string_lossy().replace('\\', "/"),
                    ));
                }
            }

            plan.files.push(FileRewrite {
                path,
                file_rel,
                original,
                updated,
                replaced: applied,
            });
        }

        if let Some(scaffolder) = self.scaffolder {
            for (host, host_rel) in pipe_hosts {
                add_pipe_support(&mut plan, scaffolder, &host, host_rel);
            }
        }
        plan
    }

    fn collect_edits(
        &self,
        content: &str,
        candidates: &[&FoundString],
    ) -> (Vec<Edit>, Vec<Failure>) {
        let index = LineIndex::new(content);
        let mut edits = Vec::new();
        let mut failures = Vec::new();

        for candidate in candidates {
            let position = candidate.position();
            let Some(key) = self.key_map.get(&candidate.file_abs, &candidate.text) else {
                failures.push(
                    Failure::new(
                        FailureKind::KeyNotFound,
                        &candidate.file_rel,
                        format!("no key assigned to '{}'", candidate.text),
                    )
                    .at(position),
                );
                continue;
            };

            match locate(content, &index, candidate) {
                Ok((start, end)) => edits.push(Edit {
                    start,
                    end,
                    replacement: self.replacement(candidate, key),
                    kind: candidate.kind,
                }),
                Err(message) => {
                    tracing::warn!(file = %candidate.file_rel, %position, "{}", message);
                    failures.push(
                        Failure::new(FailureKind::OffsetMismatch, &candidate.file_rel, message)
                            .at(position),
                    );
                }
            }
        }
        (edits, failures)
    }

    /// Key-reference syntax for a candidate, by kind.
    fn replacement(&self, candidate: &FoundString, key: &str) -> String {
        let quoted = key_literal(key, &candidate.enclosing_quotes);
        match candidate.kind {
            CandidateKind::TextNode | CandidateKind::AttributeValue => {
                format!("{{{{ {} | translate }}}}", quoted)
            }
            CandidateKind::InterpolationExpression => format!("({} | translate)", quoted),
            CandidateKind::StringLiteral | CandidateKind::TemplateLiteral => {
                format!("{}.instant({})", self.accessor, quoted)
            }
        }
    }
}

/// Quote `key` with a quote character the surrounding syntax does not use.
pub fn key_literal(key: &str, enclosing: &[char]) -> String {
    if !enclosing.contains(&'\'') {
        format!("'{}'", key)
    } else if !enclosing.contains(&'"') {
        format!("\"{}\"", key)
    } else {
        format!("\\'{}\\'", key)
    }
}

/// Byte range of a candidate in `content`, validated against its raw text.
fn locate(
    content: &str,
    index: &LineIndex<'_>,
    candidate: &FoundString,
) -> Result<(usize, usize), String> {
    let position = candidate.position();
    let start = index
        .offset(position)
        .ok_or_else(|| format!("position {} is outside the file", position))?;

    match &candidate.raw_text {
        Some(raw) => {
            if content[start..].starts_with(raw.as_str()) {
                Ok((start, start + raw.len()))
            } else {
                Err(format!(
                    "expected {} at {}, the file has changed",
                    preview(raw),
                    position
                ))
            }
        }
        None => quoted_span_end(content, start)
            .map(|end| (start, end))
            .ok_or_else(|| format!("no quoted string starts at {}", position)),
    }
}

/// End (exclusive) of the quoted string opening at `start`.
fn quoted_span_end(content: &str, start: usize) -> Option<usize> {
    let mut chars = content[start..].char_indices();
    let (_, quote) = chars.next()?;
    if !matches!(quote, '\'' | '"' | '`') {
        return None;
    }
    let mut escaped = false;
    for (i, c) in chars {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '\n' if quote != '`' => return None,
            c if c == quote => return Some(start + i + c.len_utf8()),
            _ => {}
        }
    }
    None
}

/// Apply edits from the end of the file backwards.
///
/// Returns the new content, the number applied and the number dropped for
/// overlapping an edit that was already applied.
fn apply_edits(content: &str, mut edits: Vec<Edit>) -> (String, usize, usize) {
    edits.sort_by(|a, b| b.start.cmp(&a.start).then(b.end.cmp(&a.end)));

    let mut out = content.to_string();
    let mut floor = usize::MAX;
    let mut applied = 0;
    let mut overlapped = 0;
    for edit in edits {
        if edit.end > floor {
            overlapped += 1;
            continue;
        }
        out.replace_range(edit.start..edit.end, &edit.replacement);
        floor = edit.start;
        applied += 1;
    }
    (out, applied, overlapped)
}

/// Give the component class behind a rewritten markup file the translate pipe.
fn add_pipe_support(
    plan: &mut RewritePlan,
    scaffolder: &dyn Scaffolder,
    host: &Path,
    host_rel: String,
) {
    if let Some(existing) = plan.files.iter_mut().find(|f| f.path == host) {
        existing.updated = scaffolder.ensure_pipe_support(&existing.updated);
        return;
    }
    let Ok(original) = fs::read_to_string(host) else {
        return;
    };
    let updated = scaffolder.ensure_pipe_support(&original);
    if updated == original {
        return;
    }
    plan.files.push(FileRewrite {
        path: host.to_path_buf(),
        file_rel: host_rel,
        original,
        updated,
        replaced: 0,
    });
}

fn is_script(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("ts" | "mts" | "cts" | "js" | "mjs")
    )
}

fn preview(text: &str) -> String {
    let short: String = text.chars().take(40).collect();
    if short.len() < text.len() {
        format!("'{}…'", short)
    } else {
        format!("'{}'", short)
    }
}

#[cfg(test)]
mod tests {
    use crate::core::offset::Position;
    use crate::core::rewrite::scaffold::NgxTranslateScaffolder;
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn candidate(path: &Path, line: usize, column: usize, text: &str, raw: &str, kind: CandidateKind) -> FoundString {
        FoundString {
            file_abs: path.to_string_lossy().to_string(),
            file_rel: path.file_name().unwrap().to_string_lossy().to_string(),
            line,
            column,
            text: text.to_string(),
            raw_text: Some(raw.to_string()),
            kind,
            is_already_translated: false,
            enclosing_quotes: Vec::new(),
        }
    }

    fn key_map(found: &[FoundString], keys: &[&str]) -> KeyMap {
        let mut map = KeyMap::new();
        for (f, key) in found.iter().zip(keys) {
            map.insert(&f.file_abs, &f.text, key);
        }
        map
    }

    #[test]
    fn test_rewrites_source_literal() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("list.component.ts");
        let code = "export class A {\n  remove() {\n    if (confirm('Are you sure?')) {}\n  }\n}\n";
        fs::write(&path, code).unwrap();

        let found = vec![candidate(&path, 3, 17, "Are you sure?", "'Are you sure?'", CandidateKind::StringLiteral)];
        let map = key_map(&found, &["LIST.ARE_YOU_SURE"]);
        let plan = SourceRewriter::new(&map, "this.translate").plan(&found);

        assert_eq!(plan.failures, vec![]);
        assert_eq!(
            plan.files[0].updated,
            "export class A {\n  remove() {\n    if (confirm(this.translate.instant('LIST.ARE_YOU_SURE'))) {}\n  }\n}\n"
        );
        // Nothing written until applied.
        assert_eq!(fs::read_to_string(&path).unwrap(), code);

        let stats = plan.apply().unwrap();
        assert_eq!(stats.strings_replaced, 1);
        assert_eq!(stats.files_updated, 1);
        assert!(fs::read_to_string(&path).unwrap().contains("instant('LIST.ARE_YOU_SURE')"));
    }

    #[test]
    fn test_rewrites_markup_kinds() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nav.component.html");
        let markup = "<a routerLink=\"/sources\">Source CVs</a>\n<input placeholder=\"Search files\">\n<b>{{ on ? 'Enabled now' : x }}</b>\n";
        fs::write(&path, markup).unwrap();

        let mut attr = candidate(&path, 2, 21, "Search files", "Search files", CandidateKind::AttributeValue);
        attr.enclosing_quotes = vec!['"'];
        let found = vec![
            candidate(&path, 1, 26, "Source CVs", "Source CVs", CandidateKind::TextNode),
            attr,
            candidate(&path, 3, 12, "Enabled now", "'Enabled now'", CandidateKind::InterpolationExpression),
        ];
        let map = key_map(&found, &["NAV.SOURCE_CVS", "NAV.SEARCH_FILES", "NAV.ENABLED_NOW"]);
        let plan = SourceRewriter::new(&map, "this.translate").plan(&found);

        assert_eq!(
            plan.files[0].updated,
            "<a routerLink=\"/sources\">{{ 'NAV.SOURCE_CVS' | translate }}</a>\n<input placeholder=\"{{ 'NAV.SEARCH_FILES' | translate }}\">\n<b>{{ on ? ('NAV.ENABLED_NOW' | translate) : x }}</b>\n"
        );
        assert_eq!(plan.stats().strings_replaced, 3);
    }

    #[test]
    fn test_mismatch_skips_only_that_replacement() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.ts");
        fs::write(&path, "alert('Hello there');\nalert('Changed text');\n").unwrap();

        let found = vec![
            candidate(&path, 1, 7, "Hello there", "'Hello there'", CandidateKind::StringLiteral),
            candidate(&path, 2, 7, "Original text", "'Original text'", CandidateKind::StringLiteral),
        ];
        let map = key_map(&found, &["A.HELLO_THERE", "A.ORIGINAL_TEXT"]);
        let plan = SourceRewriter::new(&map, "t").plan(&found);

        assert_eq!(plan.failures.len(), 1);
        assert_eq!(plan.failures[0].kind, FailureKind::OffsetMismatch);
        assert_eq!(plan.failures[0].position, Some(Position::new(2, 7)));
        assert_eq!(
            plan.files[0].updated,
            "alert(t.instant('A.HELLO_THERE'));\nalert('Changed text');\n"
        );
    }

    #[test]
    fn test_missing_key_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.ts");
        fs::write(&path, "alert('Hello there');\n").unwrap();

        let found = vec![candidate(&path, 1, 7, "Hello there", "'Hello there'", CandidateKind::StringLiteral)];
        let mut map = KeyMap::new();
        map.insert(&found[0].file_abs, "Something else", "A.OTHER");
        let plan = SourceRewriter::new(&map, "t").plan(&found);

        assert_eq!(plan.failures[0].kind, FailureKind::KeyNotFound);
        assert!(plan.files.is_empty());
    }

    #[test]
    fn test_files_without_keys_are_left_alone() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.ts");
        fs::write(&path, "alert('Hello there');\n").unwrap();

        let found = vec![candidate(&path, 1, 7, "Hello there", "'Hello there'", CandidateKind::StringLiteral)];
        let plan = SourceRewriter::new(&KeyMap::new(), "t").plan(&found);

        assert!(plan.files.is_empty());
        assert!(plan.failures.is_empty());
    }

    #[test]
    fn test_overlapping_edits_are_skipped() {
        let edits = vec![
            Edit { start: 0, end: 10, replacement: "A".into(), kind: CandidateKind::TextNode },
            Edit { start: 4, end: 8, replacement: "B".into(), kind: CandidateKind::TextNode },
            Edit { start: 12, end: 14, replacement: "C".into(), kind: CandidateKind::TextNode },
        ];
        let (out, applied, overlapped) = apply_edits("0123456789xx34", edits);
        assert_eq!(out, "0123B89xxC");
        assert_eq!((applied, overlapped), (2, 1));
    }

    #[test]
    fn test_quote_fallback_without_raw_text() {
        assert_eq!(quoted_span_end("x = 'it\\'s' + y", 4), Some(11));
        assert_eq!(quoted_span_end("x = \"abc\"", 4), Some(9));
        assert_eq!(quoted_span_end("x = abc", 4), None);
        assert_eq!(quoted_span_end("'open\nline'", 0), None);
    }

    #[test]
    fn test_key_literal_avoids_enclosing_quotes() {
        assert_eq!(key_literal("K", &[]), "'K'");
        assert_eq!(key_literal("K", &['\'']), "\"K\"");
        assert_eq!(key_literal("K", &['"', '\'']), "\\'K\\'");
        assert_eq!(key_literal("K", &['"', '`']), "'K'");
    }

    #[test]
    fn test_scaffolds_translate_service() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.component.ts");
        let code = "import { Component } from '@angular/core';\n\nexport class A {\n  run() {\n    alert('Hello there');\n  }\n}\n";
        fs::write(&path, code).unwrap();

        let found = vec![candidate(&path, 5, 11, "Hello there", "'Hello there'", CandidateKind::StringLiteral)];
        let map = key_map(&found, &["A.HELLO_THERE"]);
        let scaffolder = NgxTranslateScaffolder;
        let plan = SourceRewriter::new(&map, "this.translate")
            .with_scaffolder(&scaffolder)
            .plan(&found);

        let updated = &plan.files[0].updated;
        assert!(updated.contains("import { Component, inject } from '@angular/core';"));
        assert!(updated.contains("import { TranslateService } from '@ngx-translate/core';"));
        assert!(updated.contains("private readonly translate = inject(TranslateService);"));
        assert!(updated.contains("alert(this.translate.instant('A.HELLO_THERE'))"));
    }

    #[test]
    fn test_markup_file_adds_pipe_to_sibling_component() {
        let dir = tempdir().unwrap();
        let html = dir.path().join("a.component.html");
        let ts = dir.path().join("a.component.ts");
        fs::write(&html, "<p>Welcome home</p>\n").unwrap();
        fs::write(
            &ts,
            "import { Component } from '@angular/core';\n\n@Component({\n  selector: 'app-a',\n  standalone: true,\n  imports: [CommonModule],\n  templateUrl: './a.component.html',\n})\nexport class A {}\n",
        )
        .unwrap();

        let found = vec![candidate(&html, 1, 4, "Welcome home", "Welcome home", CandidateKind::TextNode)];
        let map = key_map(&found, &["A.WELCOME_HOME"]);
        let scaffolder = NgxTranslateScaffolder;
        let plan = SourceRewriter::new(&map, "this.translate")
            .with_scaffolder(&scaffolder)
            .plan(&found);

        assert_eq!(plan.files.len(), 2);
        let host = &plan.files[1];
        assert_eq!(host.replaced, 0);
        assert!(host.updated.contains("imports: [TranslatePipe, CommonModule]"));
        assert!(host.updated.contains("import { TranslatePipe } from '@ngx-translate/core';"));
    }
}
