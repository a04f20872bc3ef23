//! Locale store: the base tree and every target tree under `outputRoot`.
//!
//! ## Module Structure
//!
//! - `tree`: Nested string-valued JSON trees
//! - `languages`: The languages file and the base/target split
//! - `manifest`: `translate-manifest.json`
//! - `key_pattern`: Wildcard key patterns for pruning
//!
//! A generation pass is computed in memory first (`generate`, `prune`) and
//! written afterwards (`persist`), so dry runs share the exact code path.

pub mod key_pattern;
pub mod languages;
pub mod manifest;
pub mod tree;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Result;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::core::data::{FoundString, KeyMap};
use crate::core::keys::{KeyGenerator, path_prefix};
use crate::core::store::languages::Languages;
use crate::core::store::tree::LocaleTree;
use crate::issues::{Failure, FailureKind};

/// How existing locale files are treated by a generation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum UpdateMode {
    /// Keep the base tree and every non-blank target value; fill gaps.
    #[default]
    Merge,
    /// Keep the base tree; rebuild every target blank.
    Overwrite,
    /// Start the base tree from scratch; rebuild every target blank.
    Recreate,
}

impl std::fmt::Display for UpdateMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpdateMode::Merge => write!(f, "merge"),
            UpdateMode::Overwrite => write!(f, "overwrite"),
            UpdateMode::Recreate => write!(f, "recreate"),
        }
    }
}

/// One locale file, computed but not necessarily written.
#[derive(Debug, Clone, PartialEq)]
pub struct LocaleFile {
    pub code: String,
    pub path: PathBuf,
    pub tree: LocaleTree,
}

#[derive(Debug, Clone)]
pub struct GenerationResult {
    /// Text → key per file, for the source rewriter.
    pub key_map: KeyMap,
    /// Keys newly added to the base tree.
    pub strings_added: usize,
    /// Keys removed from the base tree by pruning.
    pub keys_pruned: usize,
    pub failures: Vec<Failure>,
    /// The base file first, then targets in rank order.
    pub files: Vec<LocaleFile>,
}

#[derive(Debug, Clone)]
pub struct PruneResult {
    /// `(code, removed)` for every locale file, base first.
    pub removed: Vec<(String, usize)>,
    pub files: Vec<LocaleFile>,
}

impl PruneResult {
    pub fn total_removed(&self) -> usize {
        self.removed.iter().map(|(_, n)| n).sum()
    }
}

#[derive(Debug, Clone)]
pub struct LocaleStore {
    pub output_root: PathBuf,
    pub base_code: String,
    pub target_codes: Vec<String>,
}

impl LocaleStore {
    pub fn new(output_root: impl Into<PathBuf>, base_code: &str, target_codes: Vec<String>) -> Self {
        Self {
            output_root: output_root.into(),
            base_code: base_code.to_string(),
            target_codes,
        }
    }

    /// Build from the languages file. Fails when the default-locale invariant is broken.
    pub fn from_languages(
        output_root: impl Into<PathBuf>,
        languages: &Languages,
        only_active: bool,
        only_main: bool,
    ) -> Result<Self> {
        let base = languages.base()?;
        let targets = languages.targets(only_active, only_main)?;
        Ok(Self::new(output_root, &base.code, targets))
    }

    pub fn path_for(&self, code: &str) -> PathBuf {
        self.output_root.join(format!("{}.json", code))
    }

    /// Every locale code, base first.
    pub fn codes(&self) -> Vec<String> {
        std::iter::once(self.base_code.clone())
            .chain(self.target_codes.iter().cloned())
            .collect()
    }

    pub fn load_base(&self) -> Result<LocaleTree> {
        LocaleTree::load(&self.path_for(&self.base_code))
    }

    /// Assign keys to `candidates`, merge them into the base tree, prune
    /// `remove_keys` and derive every target tree. Nothing is written.
    pub fn generate(
        &self,
        candidates: &[FoundString],
        mode: UpdateMode,
        remove_keys: &[String],
    ) -> Result<GenerationResult> {
        let mut base = match mode {
            UpdateMode::Recreate => LocaleTree::new(),
            UpdateMode::Merge | UpdateMode::Overwrite => self.load_base()?,
        };
        let seed = base.flatten();
        let mut generator =
            KeyGenerator::seeded(seed.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        let mut key_map = KeyMap::new();
        let mut failures = Vec::new();
        let mut strings_added = 0;

        for candidate in candidates {
            let key = if candidate.is_already_translated {
                candidate.text.clone()
            } else {
                generator.key_for(&path_prefix(&candidate.file_rel), &candidate.text)
            };

            if base.get(&key).is_none() {
                let value = if candidate.is_already_translated {
                    ""
                } else {
                    candidate.text.as_str()
                };
                if let Err(conflict) = base.set(&key, value) {
                    tracing::warn!(file = %candidate.file_rel, %key, "{}", conflict);
                    failures.push(
                        Failure::new(
                            FailureKind::LocaleConflict,
                            &candidate.file_rel,
                            conflict.to_string(),
                        )
                        .at(candidate.position()),
                    );
                    continue;
                }
                generator.register(&key);
                if !candidate.is_already_translated {
                    strings_added += 1;
                }
            }
            key_map.insert(&candidate.file_abs, &candidate.text, &key);
        }

        let mut keys_pruned = 0;
        for key in remove_keys {
            if base.remove(key) {
                keys_pruned += 1;
            }
            key_map.remove_key(key);
        }

        let mut files = Vec::with_capacity(self.target_codes.len() + 1);
        for code in &self.target_codes {
            let tree = match mode {
                UpdateMode::Merge => {
                    let existing = LocaleTree::load(&self.path_for(code))?;
                    merge_target(&base, &[&existing])
                }
                UpdateMode::Overwrite | UpdateMode::Recreate => merge_target(&base, &[]),
            };
            files.push(LocaleFile {
                code: code.clone(),
                path: self.path_for(code),
                tree,
            });
        }
        files.insert(
            0,
            LocaleFile {
                code: self.base_code.clone(),
                path: self.path_for(&self.base_code),
                tree: base,
            },
        );

        Ok(GenerationResult {
            key_map,
            strings_added,
            keys_pruned,
            failures,
            files,
        })
    }

    /// Remove `keys` from the base tree and every target tree. Nothing is written.
    pub fn prune(&self, keys: &[String]) -> Result<PruneResult> {
        let mut removed = Vec::new();
        let mut files = Vec::new();
        for code in self.codes() {
            let path = self.path_for(&code);
            if !path.exists() {
                continue;
            }
            let mut tree = LocaleTree::load(&path)?;
            let count = keys.iter().filter(|key| tree.remove(key)).count();
            removed.push((code.clone(), count));
            files.push(LocaleFile { code, path, tree });
        }
        Ok(PruneResult { removed, files })
    }

    /// Paths of the files whose serialized content differs from disk.
    pub fn changed(files: &[LocaleFile]) -> Result<Vec<PathBuf>> {
        let mut changed = Vec::new();
        for file in files {
            if differs_from_disk(&file.path, &file.tree.to_pretty_string()?) {
                changed.push(file.path.clone());
            }
        }
        Ok(changed)
    }

    /// Write every file whose serialized content differs from disk.
    ///
    /// Returns the paths actually written.
    pub fn persist(files: &[LocaleFile]) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for file in files {
            if !differs_from_disk(&file.path, &file.tree.to_pretty_string()?) {
                continue;
            }
            file.tree.save(&file.path)?;
            tracing::debug!(locale = %file.code, "wrote locale file");
            written.push(file.path.clone());
        }
        Ok(written)
    }
}

/// Rebuild a target tree from the base key set.
///
/// Each key takes the first non-blank value among `layers`, else `""`. Keys
/// absent from `base` are dropped, so the result mirrors base exactly.
pub fn merge_target(base: &LocaleTree, layers: &[&LocaleTree]) -> LocaleTree {
    let mut target = LocaleTree::new();
    for (key, _) in base.flatten() {
        let value = layers
            .iter()
            .filter_map(|layer| layer.get(&key))
            .find(|v| !v.trim().is_empty())
            .unwrap_or("");
        // Base has no leaf-through paths, so mirroring it cannot conflict.
        let _ = target.set(&key, value);
    }
    target
}

fn differs_from_disk(path: &Path, content: &str) -> bool {
    fs::read_to_string(path).map_or(true, |existing| existing != content)
}
