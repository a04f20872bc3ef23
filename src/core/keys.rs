//! Translation key generation.
//!
//! Keys look like `APP.HOME.SOURCE_CVS`: a prefix derived from the file's path
//! below the source root, then a slug of the text. A generator is seeded from
//! the existing base locale tree so an unchanged text keeps its key across runs.

use std::collections::{HashMap, HashSet};

/// Longest slug kept before the collision suffix.
const MAX_SLUG_LEN: usize = 60;

/// Angular file-name suffixes dropped from the last path segment.
const ANGULAR_SUFFIXES: &[&str] = &[
    ".component",
    ".service",
    ".page",
    ".dialog",
    ".directive",
    ".pipe",
    ".module",
];

/// Key prefix for a file path relative to the source root.
///
/// `app/home/home.component.ts` → `APP.HOME`; consecutive duplicate segments
/// collapse, so `app/app/home` → `APP.HOME`.
pub fn path_prefix(file_rel: &str) -> String {
    let normalized = file_rel.replace('\\', "/");
    let without_ext = match normalized.rsplit_once('.') {
        Some((stem, ext)) if !ext.contains('/') => stem.to_string(),
        _ => normalized,
    };
    let without_suffix = ANGULAR_SUFFIXES
        .iter()
        .find_map(|suffix| without_ext.strip_suffix(suffix))
        .unwrap_or(&without_ext);

    let mut segments: Vec<String> = Vec::new();
    for segment in without_suffix.split('/') {
        let segment = sanitize(segment);
        if segment.is_empty() || segments.last() == Some(&segment) {
            continue;
        }
        segments.push(segment);
    }
    segments.join(".")
}

/// Uppercase slug of `text`: quotes removed, non-alphanumeric runs become `_`.
pub fn slugify(text: &str) -> String {
    let unquoted: String = text
        .chars()
        .filter(|c| !matches!(c, '\'' | '"' | '`'))
        .collect();
    let slug = sanitize(&unquoted);
    let capped: String = slug.chars().take(MAX_SLUG_LEN).collect();
    let capped = capped.trim_matches('_');
    if capped.is_empty() {
        "TEXT".to_string()
    } else {
        capped.to_string()
    }
}

fn sanitize(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut pending_sep = false;
    for c in segment.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(c.to_ascii_uppercase());
        } else {
            pending_sep = true;
        }
    }
    out
}

/// Assigns unique keys for one generation pass.
#[derive(Debug, Default)]
pub struct KeyGenerator {
    /// Every leaf key in use.
    used: HashSet<String>,
    /// Every ancestor path of a used key; a new key may not land on one.
    branches: HashSet<String>,
    /// `(prefix, text)` → key, first seen wins.
    index: HashMap<(String, String), String>,
}

impl KeyGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from the flattened `key → value` pairs of the existing base tree.
    pub fn seeded<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut generator = Self::new();
        for (key, value) in entries {
            generator.register(key);
            if value.trim().is_empty() {
                continue;
            }
            let prefix = key.rsplit_once('.').map(|(p, _)| p).unwrap_or_default();
            generator
                .index
                .entry((prefix.to_string(), value.to_string()))
                .or_insert_with(|| key.to_string());
        }
        generator
    }

    /// The existing key for `text` under `prefix`, if one was seen.
    pub fn lookup(&self, prefix: &str, text: &str) -> Option<&str> {
        self.index
            .get(&(prefix.to_string(), text.to_string()))
            .map(String::as_str)
    }

    pub fn is_taken(&self, key: &str) -> bool {
        self.used.contains(key) || self.branches.contains(key)
    }

    /// Mark `key` as used without indexing a text for it.
    pub fn register(&mut self, key: &str) {
        self.used.insert(key.to_string());
        let mut rest = key;
        while let Some((parent, _)) = rest.rsplit_once('.') {
            if !self.branches.insert(parent.to_string()) {
                break;
            }
            rest = parent;
        }
    }

    /// Key for `text` under `prefix`, reusing an earlier assignment when there is one.
    pub fn key_for(&mut self, prefix: &str, text: &str) -> String {
        if let Some(existing) = self.lookup(prefix, text) {
            return existing.to_string();
        }

        let slug = slugify(text);
        let base = if prefix.is_empty() {
            slug
        } else {
            format!("{}.{}", prefix, slug)
        };

        let mut key = base.clone();
        let mut n = 2;
        while self.is_taken(&key) {
            key = format!("{}_{}", base, n);
            n += 1;
        }

        self.register(&key);
        self.index
            .insert((prefix.to_string(), text.to_string()), key.clone());
        key
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }
}
