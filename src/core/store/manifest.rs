//! `translate-manifest.json`: which locale files make up each locale code.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::file_scanner::relative_path;
use crate::core::store::languages::bare_language;

pub const MANIFEST_FILE: &str = "translate-manifest.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Locale code → locale file paths, relative to the project root.
    pub locales: BTreeMap<String, Vec<String>>,
}

impl Manifest {
    /// List, for every code, the `<root>/<code>.json` files that exist.
    ///
    /// Codes with no file in any root are left out.
    pub fn collect(project_root: &Path, output_roots: &[PathBuf], codes: &[String]) -> Self {
        let mut locales = BTreeMap::new();
        for code in codes {
            let files: Vec<String> = output_roots
                .iter()
                .map(|root| root.join(format!("{}.json", code)))
                .filter(|path| path.is_file())
                .map(|path| relative_path(project_root, &path))
                .collect();
            if !files.is_empty() {
                locales.insert(code.clone(), files);
            }
        }
        Self { locales }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse manifest: {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self).context("Failed to serialize JSON")?;
        fs::write(path, format!("{}\n", content))
            .with_context(|| format!("Failed to write manifest: {}", path.display()))
    }

    /// Files for `code`, falling back from `en-US` to `en`.
    pub fn resolve(&self, code: &str) -> Option<(&str, &[String])> {
        let exact = self
            .locales
            .iter()
            .find(|(c, _)| c.eq_ignore_ascii_case(code));
        let found = exact.or_else(|| {
            let bare = bare_language(code);
            self.locales
                .iter()
                .find(|(c, _)| c.eq_ignore_ascii_case(bare))
        });
        found.map(|(c, files)| (c.as_str(), files.as_slice()))
    }
}
