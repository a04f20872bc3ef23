//! Source tree discovery.

use std::path::{Path, PathBuf};

use glob::Pattern;
use walkdir::{DirEntry, WalkDir};

/// Test files left out when `ignoreTestFiles` is set.
pub const TEST_FILE_PATTERNS: &[&str] = &[
    "**/*.spec.ts",
    "**/*.test.ts",
    "**/*.spec.js",
    "**/*.test.js",
];

/// Directories never descended into.
const EXCLUDED_DIRS: &[&str] = &["node_modules", ".git", ".angular", "dist"];

/// A file to classify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Path relative to the source root, `/`-separated.
    pub file_rel: String,
    pub is_markup: bool,
    /// Matches `skipGlobs`: classified, never rewritten or reverted.
    pub skip_rewrite: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub source_extensions: Vec<String>,
    pub markup_extensions: Vec<String>,
    pub ignore_globs: Vec<String>,
    pub skip_globs: Vec<String>,
    pub ignore_test_files: bool,
}

/// Result of scanning files.
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// Sorted by relative path.
    pub files: Vec<SourceFile>,
    /// Entries that could not be read.
    pub skipped_count: usize,
}

impl ScanResult {
    pub fn rewritable(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.iter().filter(|f| !f.skip_rewrite)
    }
}

/// A user path pattern: a glob when it has `*` or `?`, otherwise a literal
/// path prefix relative to the source root.
#[derive(Debug, Clone)]
enum PathMatcher {
    Glob(Pattern),
    Prefix(String),
}

impl PathMatcher {
    fn parse(pattern: &str) -> Option<Self> {
        if is_glob_pattern(pattern) {
            match Pattern::new(pattern) {
                Ok(p) => Some(PathMatcher::Glob(p)),
                Err(e) => {
                    tracing::warn!(%pattern, "invalid glob pattern: {}", e);
                    None
                }
            }
        } else {
            let prefix = pattern.trim_start_matches("./").trim_end_matches('/');
            Some(PathMatcher::Prefix(prefix.replace('\\', "/")))
        }
    }

    fn matches(&self, file_rel: &str) -> bool {
        match self {
            PathMatcher::Glob(p) => p.matches(file_rel),
            PathMatcher::Prefix(prefix) => {
                file_rel == prefix
                    || file_rel
                        .strip_prefix(prefix.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            }
        }
    }
}

/// Patterns without `*` or `?` are literal paths.
fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

fn compile(patterns: &[String]) -> Vec<PathMatcher> {
    patterns.iter().filter_map(|p| PathMatcher::parse(p)).collect()
}

fn is_excluded_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| EXCLUDED_DIRS.contains(&name))
}

pub fn scan_files(src_dir: &Path, options: &ScanOptions) -> ScanResult {
    let mut ignore = compile(&options.ignore_globs);
    if options.ignore_test_files {
        ignore.extend(TEST_FILE_PATTERNS.iter().filter_map(|p| PathMatcher::parse(p)));
    }
    let skip = compile(&options.skip_globs);

    let mut result = ScanResult::default();
    for entry in WalkDir::new(src_dir)
        .into_iter()
        .filter_entry(|e| !is_excluded_dir(e))
    {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                result.skipped_count += 1;
                tracing::warn!("cannot access path: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        let is_markup = options.markup_extensions.iter().any(|m| m == ext);
        if !is_markup && !options.source_extensions.iter().any(|s| s == ext) {
            continue;
        }

        let file_rel = relative_path(src_dir, path);
        if ignore.iter().any(|m| m.matches(&file_rel)) {
            continue;
        }
        result.files.push(SourceFile {
            path: path.to_path_buf(),
            skip_rewrite: skip.iter().any(|m| m.matches(&file_rel)),
            file_rel,
            is_markup,
        });
    }

    result.files.sort_by(|a, b| a.file_rel.cmp(&b.file_rel));
    tracing::debug!(files = result.files.len(), "scanned source tree");
    result
}

/// `/`-separated path of `path` below `base`.
pub fn relative_path(base: &Path, path: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}
