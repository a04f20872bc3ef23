//! Machine-translation collaborator.
//!
//! Backends live outside this crate; they implement `Translator` over whole
//! locale trees. `translate_targets` sends each target only the base entries it
//! is missing and merges the answers back without overwriting existing
//! translations.

use std::{thread, time::Duration};

use anyhow::{Context, Result};
use rayon::prelude::*;

use crate::core::store::tree::LocaleTree;
use crate::core::store::{LocaleFile, LocaleStore, merge_target};

pub trait Translator: Send + Sync {
    /// Translate every value of `input` from `source` to `target`, keeping keys.
    fn translate(&self, input: &LocaleTree, target: &str, source: &str) -> Result<LocaleTree>;
}

/// Request pacing for a translator backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslatorSettings {
    /// Targets translated at the same time.
    pub concurrency: usize,
    /// Pause before each request.
    pub delay_ms: u64,
}

impl Default for TranslatorSettings {
    fn default() -> Self {
        Self {
            concurrency: 4,
            delay_ms: 0,
        }
    }
}

#[derive(Debug, Default)]
pub struct TranslationOutcome {
    /// Updated target files, ready for `LocaleStore::persist`.
    pub files: Vec<LocaleFile>,
    /// `(code, values filled)` per target that was sent anything.
    pub filled: Vec<(String, usize)>,
    /// `(code, error)` per target whose request failed.
    pub errors: Vec<(String, String)>,
}

/// Fill blank target entries through `translator`.
pub fn translate_targets(
    store: &LocaleStore,
    translator: &dyn Translator,
    settings: TranslatorSettings,
) -> Result<TranslationOutcome> {
    let base = store.load_base()?;
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(settings.concurrency.max(1))
        .build()
        .context("Failed to start translation workers")?;

    let results: Vec<(String, Result<Option<(LocaleFile, usize)>>)> = pool.install(|| {
        store
            .target_codes
            .par_iter()
            .map(|code| {
                let result = translate_one(store, &base, code, translator, settings);
                (code.clone(), result)
            })
            .collect()
    });

    let mut outcome = TranslationOutcome::default();
    for (code, result) in results {
        match result {
            Ok(Some((file, filled))) => {
                outcome.filled.push((code, filled));
                outcome.files.push(file);
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(locale = %code, "translation failed: {:#}", err);
                outcome.errors.push((code, format!("{:#}", err)));
            }
        }
    }
    Ok(outcome)
}

fn translate_one(
    store: &LocaleStore,
    base: &LocaleTree,
    code: &str,
    translator: &dyn Translator,
    settings: TranslatorSettings,
) -> Result<Option<(LocaleFile, usize)>> {
    let path = store.path_for(code);
    let existing = LocaleTree::load(&path)?;

    let mut missing = LocaleTree::new();
    for (key, value) in base.flatten() {
        let blank = existing.get(&key).is_none_or(|v| v.trim().is_empty());
        if blank && !value.trim().is_empty() {
            let _ = missing.set(&key, &value);
        }
    }
    if missing.is_empty() {
        return Ok(None);
    }

    if settings.delay_ms > 0 {
        thread::sleep(Duration::from_millis(settings.delay_ms));
    }
    let translated = translator
        .translate(&missing, code, &store.base_code)
        .with_context(|| format!("Translator failed for '{}'", code))?;

    let tree = merge_target(base, &[&existing, &translated]);
    let filled = missing
        .flatten()
        .iter()
        .filter(|(key, _)| tree.get(key).is_some_and(|v| !v.trim().is_empty()))
        .count();
    Ok(Some((
        LocaleFile {
            code: code.to_string(),
            path,
            tree,
        },
        filled,
    )))
}
