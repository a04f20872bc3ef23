//! Report formatting and printing utilities.
//!
//! Findings are displayed cargo-style; command summaries and dry-run previews
//! follow. Separate from core logic so glot-ng can be used as a library.

use std::{
    collections::HashMap,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use colored::Colorize;
use unicode_width::UnicodeWidthStr;

use super::commands::{
    CommandKind, CommandResult, CommandSummary, ExtractSummary, InitSummary, ManifestSummary,
    PruneSummary, RevertSummary, ScanSummary,
};
use crate::config::CONFIG_FILE_NAME;
use crate::core::rewrite::FileRewrite;
use crate::issues::{Finding, Report, Severity};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Changed lines shown per file in a preview.
const MAX_PREVIEW_LINES: usize = 12;

pub fn print(result: &CommandResult, verbose: bool) {
    let mut out = io::stdout().lock();
    report_to(&result.findings, result.src_dir.as_deref(), &mut out);
    print_command_output(result, verbose, &mut out);
}

/// Print findings to a custom writer.
///
/// Source context is read from `src_dir` when given.
pub fn report_to<W: Write>(findings: &[Finding], src_dir: Option<&Path>, writer: &mut W) {
    if findings.is_empty() {
        return;
    }

    let mut sorted: Vec<&Finding> = findings.iter().collect();
    sorted.sort_by(|a, b| {
        a.file()
            .cmp(b.file())
            .then_with(|| a.location().cmp(&b.location()))
    });

    let max_line_width = sorted
        .iter()
        .filter_map(|f| f.location())
        .map(|p| p.line.to_string().len())
        .max()
        .unwrap_or(1);

    let mut sources = SourceLines::new(src_dir);
    for finding in sorted {
        print_finding(finding, &mut sources, writer, max_line_width);
    }
}

fn print_finding<W: Write>(
    finding: &Finding,
    sources: &mut SourceLines,
    writer: &mut W,
    max_line_width: usize,
) {
    let severity = finding.report_severity();
    let severity_str = match severity {
        Severity::Error => "error".bold().red(),
        Severity::Warning => "warning".bold().yellow(),
        Severity::Info => "text".bold().green(),
    };
    let _ = writeln!(
        writer,
        "{}: \"{}\"  {}",
        severity_str,
        finding.message(),
        format!("[{}]", finding.label()).dimmed().cyan()
    );

    let Some(position) = finding.location() else {
        let _ = writeln!(writer, "  {} {}", "-->".blue(), finding.file());
        print_details(finding, writer, max_line_width);
        let _ = writeln!(writer);
        return;
    };
    let _ = writeln!(writer, "  {} {}:{}", "-->".blue(), finding.file(), position);

    if let Some(source_line) = sources.line(finding.file(), position.line) {
        let caret = match severity {
            Severity::Error => "^".red(),
            Severity::Warning => "^".yellow(),
            Severity::Info => "^".green(),
        };
        let _ = writeln!(writer, "{:>width$} {}", "", "|".blue(), width = max_line_width);
        let _ = writeln!(
            writer,
            "{:>width$} {} {}",
            position.line.to_string().blue(),
            "|".blue(),
            source_line,
            width = max_line_width
        );
        let prefix: String = source_line
            .chars()
            .take(position.column.saturating_sub(1))
            .collect();
        let _ = writeln!(
            writer,
            "{:>width$} {} {:>padding$}{}",
            "",
            "|".blue(),
            "",
            caret,
            width = max_line_width,
            padding = UnicodeWidthStr::width(prefix.as_str())
        );
    }

    print_details(finding, writer, max_line_width);
    let _ = writeln!(writer);
}

fn print_details<W: Write>(finding: &Finding, writer: &mut W, max_line_width: usize) {
    if let Some(details) = finding.details() {
        let _ = writeln!(
            writer,
            "{:>width$} {} {} {}",
            "",
            "=".blue(),
            "note:".bold(),
            details,
            width = max_line_width
        );
    }
}

/// Lazily read source files for context lines.
struct SourceLines {
    src_dir: Option<PathBuf>,
    files: HashMap<String, Option<Vec<String>>>,
}

impl SourceLines {
    fn new(src_dir: Option<&Path>) -> Self {
        Self {
            src_dir: src_dir.map(Path::to_path_buf),
            files: HashMap::new(),
        }
    }

    fn line(&mut self, file_rel: &str, line: usize) -> Option<&str> {
        let src_dir = self.src_dir.as_ref()?;
        let lines = self.files.entry(file_rel.to_string()).or_insert_with(|| {
            fs::read_to_string(src_dir.join(file_rel))
                .ok()
                .map(|content| content.lines().map(str::to_string).collect())
        });
        lines.as_ref()?.get(line.checked_sub(1)?).map(String::as_str)
    }
}

fn print_command_output<W: Write>(result: &CommandResult, verbose: bool, writer: &mut W) {
    match &result.summary {
        CommandSummary::Init(summary) => print_init(summary, writer),
        CommandSummary::Scan(summary) => {
            print_scan(summary, result.source_files_checked, verbose, writer)
        }
        CommandSummary::Extract(summary) => print_extract(summary, writer),
        CommandSummary::Revert(summary) => print_revert(summary, writer),
        CommandSummary::Prune(summary) => print_prune(summary, writer),
        CommandSummary::Manifest(summary) => print_manifest(summary, writer),
    }

    let failures = result.failure_count();
    if failures > 0 {
        let what = match result.kind {
            CommandKind::Revert => "reference(s) could not be restored",
            CommandKind::Scan => "file(s) could not be parsed",
            _ => "item(s) could not be processed",
        };
        let _ = writeln!(writer, "{} {} {}", FAILURE_MARK.red(), failures, what);
    }
}

fn print_init<W: Write>(summary: &InitSummary, writer: &mut W) {
    if summary.config_created {
        let _ = writeln!(
            writer,
            "{} {}",
            SUCCESS_MARK.green(),
            format!("Created {}", CONFIG_FILE_NAME).green()
        );
    } else {
        let _ = writeln!(
            writer,
            "{} {} already exists",
            "warning:".bold().yellow(),
            CONFIG_FILE_NAME
        );
    }
    if let Some(path) = &summary.languages_seeded {
        let _ = writeln!(
            writer,
            "{} {}",
            SUCCESS_MARK.green(),
            format!("Created {}", path).green()
        );
    }
}

fn print_scan<W: Write>(summary: &ScanSummary, files: usize, verbose: bool, writer: &mut W) {
    let file_word = if files == 1 { "file" } else { "files" };
    if summary.found_count == 0 {
        let _ = writeln!(
            writer,
            "{} {}",
            SUCCESS_MARK.green(),
            format!("Checked {} source {} - no translatable text found", files, file_word).green()
        );
    } else {
        let _ = writeln!(
            writer,
            "{} {} translatable string(s) in {} source {}",
            "Found".yellow().bold(),
            summary.found_count,
            files,
            file_word
        );
    }
    if summary.translated_count > 0 {
        let _ = writeln!(writer, "  - already translated: {}", summary.translated_count);
    }
    if summary.restricted_count > 0 {
        let _ = writeln!(
            writer,
            "  - restricted by aggressive mode: {}{}",
            summary.restricted_count,
            if verbose {
                String::new()
            } else {
                format!(" (use {} for details)", "-v".cyan())
            }
        );
    }
}

fn print_extract<W: Write>(summary: &ExtractSummary, writer: &mut W) {
    if !summary.is_apply {
        print_previews(&summary.rewrites, writer);
    }

    if summary.strings_added == 0
        && summary.strings_replaced == 0
        && summary.keys_pruned == 0
        && summary.locale_files.is_empty()
    {
        let _ = writeln!(
            writer,
            "{} {}",
            SUCCESS_MARK.green(),
            "Nothing to extract".green()
        );
        return;
    }

    let verb = if summary.is_apply {
        "Extracted".green().bold()
    } else {
        "Would extract".yellow().bold()
    };
    let _ = writeln!(
        writer,
        "{} {} new key(s), replacing {} string(s) in {} file(s).",
        verb, summary.strings_added, summary.strings_replaced, summary.files_updated
    );
    if summary.keys_pruned > 0 {
        let _ = writeln!(writer, "  - pruned: {} key(s)", summary.keys_pruned);
    }
    for path in &summary.locale_files {
        let _ = writeln!(writer, "  - locale: {}", path);
    }
    if !summary.is_apply {
        let _ = writeln!(writer, "Run with {} to write these changes.", "--apply".cyan());
    }
}

fn print_revert<W: Write>(summary: &RevertSummary, writer: &mut W) {
    if !summary.is_apply {
        print_previews(&summary.rewrites, writer);
    }

    if summary.files_updated == 0 {
        let _ = writeln!(
            writer,
            "{} {}",
            SUCCESS_MARK.green(),
            "No translate references to revert".green()
        );
        return;
    }
    if summary.is_apply {
        let _ = writeln!(
            writer,
            "{} {} string(s) in {} file(s).",
            "Restored".green().bold(),
            summary.strings_restored,
            summary.files_updated
        );
    } else {
        let _ = writeln!(
            writer,
            "{} {} string(s) in {} file(s).",
            "Would restore".yellow().bold(),
            summary.strings_restored,
            summary.files_updated
        );
        let _ = writeln!(writer, "Run with {} to restore these strings.", "--apply".cyan());
    }
}

fn print_prune<W: Write>(summary: &PruneSummary, writer: &mut W) {
    let total: usize = summary.removed.iter().map(|(_, n)| n).sum();
    if total == 0 {
        let _ = writeln!(
            writer,
            "{} No locale file contains {}",
            "warning:".bold().yellow(),
            summary.keys.join(", ")
        );
        return;
    }

    let verb = if summary.is_apply {
        "Deleted".green().bold()
    } else {
        "Would delete".yellow().bold()
    };
    let _ = writeln!(
        writer,
        "{} {} key(s) across {} locale file(s).",
        verb,
        summary.keys.len(),
        summary.removed.iter().filter(|(_, n)| *n > 0).count()
    );
    for (code, count) in summary.removed.iter().filter(|(_, n)| *n > 0) {
        let _ = writeln!(writer, "  - {}: {} key(s)", code, count);
    }
    for path in &summary.locale_files {
        let _ = writeln!(writer, "  - locale: {}", path);
    }
    if !summary.is_apply {
        let _ = writeln!(writer, "Run with {} to delete these keys.", "--apply".cyan());
    }
}

fn print_manifest<W: Write>(summary: &ManifestSummary, writer: &mut W) {
    let _ = writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "Wrote {} ({} locale(s): {})",
            summary.path,
            summary.locales.len(),
            summary.locales.join(", ")
        )
        .green()
    );
}

/// Show the changed lines of each planned rewrite.
fn print_previews<W: Write>(rewrites: &[FileRewrite], writer: &mut W) {
    for rewrite in rewrites {
        let _ = writeln!(writer, "  {} {}", "-->".blue(), rewrite.file_rel);
        let changes = changed_lines(&rewrite.original, &rewrite.updated);
        for change in changes.iter().take(MAX_PREVIEW_LINES) {
            let _ = match change {
                LineChange::Removed(text) => writeln!(writer, "  {} {}", "-".red().bold(), text.red()),
                LineChange::Added(text) => {
                    writeln!(writer, "  {} {}", "+".green().bold(), text.green())
                }
            };
        }
        if changes.len() > MAX_PREVIEW_LINES {
            let _ = writeln!(
                writer,
                "  {}",
                format!("... and {} more line(s)", changes.len() - MAX_PREVIEW_LINES).dimmed()
            );
        }
        let _ = writeln!(writer);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LineChange<'a> {
    Removed(&'a str),
    Added(&'a str),
}

/// Line diff via longest common subsequence.
fn changed_lines<'a>(original: &'a str, updated: &'a str) -> Vec<LineChange<'a>> {
    let old: Vec<&str> = original.lines().collect();
    let new: Vec<&str> = updated.lines().collect();

    // lcs[i][j]: common lines of old[i..] and new[j..]
    let mut lcs = vec![vec![0u32; new.len() + 1]; old.len() + 1];
    for i in (0..old.len()).rev() {
        for j in (0..new.len()).rev() {
            lcs[i][j] = if old[i] == new[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut changes = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < old.len() && j < new.len() {
        if old[i] == new[j] {
            i += 1;
            j += 1;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            changes.push(LineChange::Removed(old[i]));
            i += 1;
        } else {
            changes.push(LineChange::Added(new[j]));
            j += 1;
        }
    }
    changes.extend(old[i..].iter().map(|&l| LineChange::Removed(l)));
    changes.extend(new[j..].iter().map(|&l| LineChange::Added(l)));
    changes
}

// ============================================================
// Tests
// ============================================================
