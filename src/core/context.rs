use std::{
    cell::OnceCell,
    collections::HashSet,
    path::{Path, PathBuf},
};

use anyhow::{Result, bail};
use rayon::prelude::*;

use crate::{
    cli::args::CommonArgs,
    config::{Config, load_config},
    core::{
        classify::classify_file,
        data::{FileCandidates, FoundString, RestrictedCandidate},
        file_scanner::{ScanResult, scan_files},
        reverse::ReverseMapper,
        rewrite::{FileRewrite, RewritePlan, SourceRewriter, scaffold::NgxTranslateScaffolder},
        store::{
            LocaleStore, PruneResult,
            key_pattern::expand_key_patterns,
            languages::Languages,
            manifest::{MANIFEST_FILE, Manifest},
        },
    },
    issues::{Failure, FailureKind},
};

/// Classifier output for every scanned file.
#[derive(Debug, Default)]
pub struct Classification {
    pub candidates: Vec<FoundString>,
    pub restricted: Vec<RestrictedCandidate>,
    /// Files that could not be read or parsed.
    pub failures: Vec<Failure>,
}

/// What an extraction did, or would do in a dry run.
#[derive(Debug, Default)]
pub struct ExtractOutcome {
    pub strings_added: usize,
    pub strings_replaced: usize,
    pub keys_pruned: usize,
    pub files_updated: usize,
    /// Locale files written, or that differ from disk in a dry run.
    pub locale_files: Vec<PathBuf>,
    /// Changed source files, for previews.
    pub rewrites: Vec<FileRewrite>,
    pub failures: Vec<Failure>,
}

impl ExtractOutcome {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn errors(&self) -> Vec<String> {
        self.failures.iter().map(|f| f.to_string()).collect()
    }
}

#[derive(Debug, Default)]
pub struct RevertOutcome {
    pub strings_restored: usize,
    pub files_updated: usize,
    pub rewrites: Vec<FileRewrite>,
    pub failures: Vec<Failure>,
}

#[derive(Debug)]
pub struct PruneOutcome {
    /// Keys after pattern expansion.
    pub keys: Vec<String>,
    pub result: PruneResult,
    pub locale_files: Vec<PathBuf>,
}

/// One project run: merged configuration, the scanned file list and lazily
/// classified candidates.
///
/// # Configuration Priority
///
/// 1. CLI arguments (e.g. `--src-dir`)
/// 2. `.glotngrc.json`
/// 3. Built-in defaults
///
/// # Phases
///
/// `extract` runs classify-all, then generate-and-persist, then rewrite-all,
/// strictly in that order. Nothing is written before the default locale is
/// known.
pub struct ProjectContext {
    /// Merged configuration (CLI args > config file > defaults).
    pub config: Config,

    /// Directory holding `.glotngrc.json`; every configured path is relative to it.
    pub root_dir: PathBuf,

    pub src_dir: PathBuf,

    pub scan: ScanResult,

    pub verbose: bool,

    classification: OnceCell<Classification>,
}

impl ProjectContext {
    pub fn new(common: &CommonArgs) -> Result<Self> {
        let verbose = common.verbose;
        let start_dir = common.root.clone().unwrap_or_else(|| PathBuf::from("."));

        let config_result = load_config(&start_dir)?;
        if verbose && !config_result.from_file {
            eprintln!("Note: No .glotngrc.json found, using default configuration");
        }

        let mut config = config_result.config;
        if let Some(ref src_dir) = common.src_dir {
            config.src_dir = src_dir.to_string_lossy().to_string();
        }
        if let Some(ref output_root) = common.output_root {
            config.output_root = output_root.to_string_lossy().to_string();
        }

        Self::from_config(config, config_result.root_dir, verbose)
    }

    pub fn from_config(config: Config, root_dir: PathBuf, verbose: bool) -> Result<Self> {
        config.validate()?;
        let src_dir = resolve_path(&root_dir, &config.src_dir);
        if !src_dir.is_dir() {
            bail!("Source directory not found: {}", src_dir.display());
        }

        let scan = scan_files(&src_dir, &config.scan_options());
        if scan.skipped_count > 0 {
            eprintln!(
                "Warning: {} path(s) skipped due to access errors{}",
                scan.skipped_count,
                if verbose { "" } else { " (use -v for details)" }
            );
        }
        tracing::debug!(files = scan.files.len(), src = %src_dir.display(), "project loaded");

        Ok(Self {
            config,
            root_dir,
            src_dir,
            scan,
            verbose,
            classification: OnceCell::new(),
        })
    }

    pub fn output_root(&self) -> PathBuf {
        resolve_path(&self.root_dir, &self.config.output_root)
    }

    pub fn languages_path(&self) -> PathBuf {
        resolve_path(&self.root_dir, &self.config.languages_json_path)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.output_root().join(MANIFEST_FILE)
    }

    pub fn languages(&self) -> Result<Languages> {
        Languages::load_or_seed(&self.languages_path())
    }

    /// Fails when the languages file has no single default entry.
    pub fn locale_store(&self, languages: &Languages) -> Result<LocaleStore> {
        LocaleStore::from_languages(
            self.output_root(),
            languages,
            self.config.only_generate_active_langs,
            self.config.only_main_languages,
        )
    }

    /// Classify every scanned file (lazy, parallel).
    ///
    /// A file that fails to read or parse yields a `ParseFailure` and no candidates.
    pub fn classification(&self) -> Result<&Classification> {
        if let Some(classification) = self.classification.get() {
            return Ok(classification);
        }
        let options = self.config.classifier_options()?;

        let results: Vec<(&str, Result<FileCandidates>)> = self
            .scan
            .files
            .par_iter()
            .map(|file| {
                let result = classify_file(&file.path, &file.file_rel, file.is_markup, &options);
                (file.file_rel.as_str(), result)
            })
            .collect();

        let mut classification = Classification::default();
        for (file_rel, result) in results {
            match result {
                Ok(found) => {
                    classification.candidates.extend(found.found);
                    classification.restricted.extend(found.restricted);
                }
                Err(err) => {
                    if self.verbose {
                        eprintln!("Warning: {} - {:#}", file_rel, err);
                    }
                    classification.failures.push(Failure::new(
                        FailureKind::ParseFailure,
                        file_rel,
                        format!("{:#}", err),
                    ));
                }
            }
        }
        Ok(self.classification.get_or_init(|| classification))
    }

    /// Candidates from files that may be rewritten (not matched by `skipGlobs`).
    fn rewritable_candidates(&self, candidates: &[FoundString]) -> Vec<FoundString> {
        let rewritable: HashSet<String> = self
            .scan
            .rewritable()
            .map(|f| f.path.to_string_lossy().to_string())
            .collect();
        candidates
            .iter()
            .filter(|c| rewritable.contains(&c.file_abs))
            .cloned()
            .collect()
    }

    /// The full pipeline. Without `apply` nothing is written.
    pub fn extract(&self, apply: bool) -> Result<ExtractOutcome> {
        let languages = self.languages()?;
        let store = self.locale_store(&languages)?;
        let classification = self.classification()?;

        let base_keys = store.load_base()?.keys();
        let remove_keys = expand_key_patterns(&self.config.remove_keys, &base_keys);
        let generation =
            store.generate(&classification.candidates, self.config.update_mode, &remove_keys)?;

        let locale_files = if apply {
            if languages.dirty {
                languages.save(&self.languages_path())?;
            }
            LocaleStore::persist(&generation.files)?
        } else {
            LocaleStore::changed(&generation.files)?
        };

        let candidates = self.rewritable_candidates(&classification.candidates);
        let scaffolder = NgxTranslateScaffolder;
        let plan = SourceRewriter::new(&generation.key_map, &self.config.translate_accessor)
            .with_scaffolder(&scaffolder)
            .plan(&candidates);
        let stats = if apply { plan.apply()? } else { plan.stats() };

        if apply {
            self.write_manifest(&store)?;
        }

        let mut failures = classification.failures.clone();
        failures.extend(generation.failures);
        failures.extend(plan.failures);
        for failure in &failures {
            tracing::warn!("{}", failure);
        }

        Ok(ExtractOutcome {
            strings_added: generation.strings_added,
            strings_replaced: stats.strings_replaced,
            keys_pruned: generation.keys_pruned,
            files_updated: stats.files_updated,
            locale_files,
            rewrites: plan.files.into_iter().filter(|f| f.is_changed()).collect(),
            failures,
        })
    }

    /// Restore literals from the base locale. Without `apply` nothing is written.
    pub fn revert(&self, apply: bool) -> Result<RevertOutcome> {
        let languages = self.languages()?;
        let store = self.locale_store(&languages)?;
        let base = store.load_base()?;

        let files: Vec<(PathBuf, String)> = self
            .scan
            .rewritable()
            .map(|f| (f.path.clone(), f.file_rel.clone()))
            .collect();
        let scaffolder = NgxTranslateScaffolder;
        let plan: RewritePlan = ReverseMapper::new(&base, &self.config.translate_accessor)
            .with_scaffolder(&scaffolder)
            .plan(&files);
        let stats = if apply { plan.apply()? } else { plan.stats() };

        Ok(RevertOutcome {
            strings_restored: stats.strings_replaced,
            files_updated: stats.files_updated,
            rewrites: plan.files.into_iter().filter(|f| f.is_changed()).collect(),
            failures: plan.failures,
        })
    }

    /// Remove keys (or `*` patterns) from every locale file.
    pub fn prune(&self, patterns: &[String], apply: bool) -> Result<PruneOutcome> {
        let languages = self.languages()?;
        let store = self.locale_store(&languages)?;

        let keys = expand_key_patterns(patterns, &store.load_base()?.keys());
        let result = store.prune(&keys)?;
        let locale_files = if apply {
            let written = LocaleStore::persist(&result.files)?;
            self.write_manifest(&store)?;
            written
        } else {
            LocaleStore::changed(&result.files)?
        };

        Ok(PruneOutcome {
            keys,
            result,
            locale_files,
        })
    }

    /// Rewrite `translate-manifest.json` from the locale files on disk.
    pub fn write_manifest(&self, store: &LocaleStore) -> Result<Manifest> {
        let manifest = Manifest::collect(&self.root_dir, &[store.output_root.clone()], &store.codes());
        manifest.save(&self.manifest_path())?;
        Ok(manifest)
    }

    /// Path relative to the project root, for display.
    pub fn display_path(&self, path: &Path) -> String {
        crate::core::file_scanner::relative_path(&self.root_dir, path)
    }
}

fn resolve_path(root_dir: &Path, configured: &str) -> PathBuf {
    let path = Path::new(configured);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root_dir.join(path.strip_prefix(".").unwrap_or(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::tree::LocaleTree;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    const COMPONENT: &str = r#"import { Component } from '@angular/core';

@Component({
  selector: 'app-home',
  template: `
    <h1>Welcome home</h1>
  `,
})
export class HomeComponent {
  remove() {
    confirm('Are you sure you want to delete this configuration?');
  }
}
"#;

    fn project() -> TempDir {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        let home = dir.path().join("src/app/home");
        fs::create_dir_all(&home).unwrap();
        fs::write(home.join("home.component.ts"), COMPONENT).unwrap();
        fs::write(
            dir.path().join("src/languages.json"),
            r#"[
  { "code": "en", "englishName": "English", "nativeName": "English", "rank": 0, "default": true },
  { "code": "fr", "englishName": "French", "nativeName": "Français", "rank": 1, "default": false }
]"#,
        )
        .unwrap();
        dir
    }

    fn context(dir: &TempDir) -> ProjectContext {
        let config = Config {
            output_root: "src/i18n".to_string(),
            languages_json_path: "src/languages.json".to_string(),
            ..Default::default()
        };
        ProjectContext::from_config(config, dir.path().to_path_buf(), false).unwrap()
    }

    #[test]
    fn test_missing_src_dir_is_fatal() {
        let dir = tempdir().unwrap();
        let result = ProjectContext::from_config(Config::default(), dir.path().to_path_buf(), false);
        assert!(result.is_err());
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = project();
        let ctx = context(&dir);

        let outcome = ctx.extract(false).unwrap();

        assert_eq!(outcome.strings_added, 2);
        assert_eq!(outcome.strings_replaced, 2);
        assert_eq!(outcome.locale_files.len(), 2);
        assert!(!dir.path().join("src/i18n/en.json").exists());
        let source = fs::read_to_string(dir.path().join("src/app/home/home.component.ts")).unwrap();
        assert_eq!(source, COMPONENT);
    }

    #[test]
    fn test_extract_then_revert_round_trip() {
        let dir = project();
        let ctx = context(&dir);
        let component = dir.path().join("src/app/home/home.component.ts");

        let outcome = ctx.extract(true).unwrap();
        assert_eq!(outcome.failed(), 0, "{:?}", outcome.errors());

        let base = LocaleTree::load(&dir.path().join("src/i18n/en.json")).unwrap();
        assert_eq!(
            base.get("APP.HOME.ARE_YOU_SURE_YOU_WANT_TO_DELETE_THIS_CONFIGURATION"),
            Some("Are you sure you want to delete this configuration?")
        );
        let fr = LocaleTree::load(&dir.path().join("src/i18n/fr.json")).unwrap();
        assert_eq!(fr.keys(), base.keys());
        assert!(dir.path().join("src/i18n/translate-manifest.json").is_file());

        let rewritten = fs::read_to_string(&component).unwrap();
        assert!(rewritten.contains(
            "confirm(this.translate.instant('APP.HOME.ARE_YOU_SURE_YOU_WANT_TO_DELETE_THIS_CONFIGURATION'))"
        ));
        assert!(rewritten.contains("{{ 'APP.HOME.WELCOME_HOME' | translate }}"));

        let reverted = context(&dir).revert(true).unwrap();
        assert_eq!(reverted.strings_restored, 2);
        assert_eq!(fs::read_to_string(&component).unwrap(), COMPONENT);
    }

    #[test]
    fn test_second_extract_is_idempotent() {
        let dir = project();
        context(&dir).extract(true).unwrap();
        context(&dir).revert(true).unwrap();

        let en = dir.path().join("src/i18n/en.json");
        let before = fs::read_to_string(&en).unwrap();
        let outcome = context(&dir).extract(true).unwrap();
        assert_eq!(outcome.strings_added, 0);
        assert_eq!(fs::read_to_string(&en).unwrap(), before);
    }

    #[test]
    fn test_skip_globs_are_not_rewritten() {
        let dir = project();
        let config = Config {
            output_root: "src/i18n".to_string(),
            languages_json_path: "src/languages.json".to_string(),
            skip_globs: vec!["app/home/**".to_string()],
            ..Default::default()
        };
        let ctx = ProjectContext::from_config(config, dir.path().to_path_buf(), false).unwrap();

        let outcome = ctx.extract(true).unwrap();
        assert_eq!(outcome.strings_added, 2);
        assert_eq!(outcome.strings_replaced, 0);
        let source = fs::read_to_string(dir.path().join("src/app/home/home.component.ts")).unwrap();
        assert_eq!(source, COMPONENT);
    }

    #[test]
    fn test_prune_with_pattern() {
        let dir = project();
        context(&dir).extract(true).unwrap();

        let outcome = context(&dir)
            .prune(&["APP.HOME.*".to_string()], true)
            .unwrap();
        assert_eq!(outcome.keys.len(), 2);
        assert_eq!(outcome.result.total_removed(), 4);

        let base = LocaleTree::load(&dir.path().join("src/i18n/en.json")).unwrap();
        assert!(base.is_empty());
    }

    #[test]
    fn test_module_scope_literals_are_reported_not_rewritten() {
        let dir = project();
        let helper = dir.path().join("src/app/home/titles.ts");
        let code = "export const PAGE_TITLE = 'Welcome to the dashboard';\n";
        fs::write(&helper, code).unwrap();

        let ctx = context(&dir);
        let classification = ctx.classification().unwrap();
        let restricted: Vec<&str> = classification
            .restricted
            .iter()
            .map(|r| r.candidate.text.as_str())
            .collect();
        assert_eq!(restricted, vec!["Welcome to the dashboard"]);

        let outcome = ctx.extract(true).unwrap();
        assert_eq!(outcome.strings_added, 2);
        assert_eq!(fs::read_to_string(&helper).unwrap(), code);
    }

    #[test]
    fn test_parse_failure_does_not_abort() {
        let dir = project();
        fs::write(dir.path().join("src/app/broken.ts"), "export class {{{").unwrap();

        let outcome = context(&dir).extract(false).unwrap();
        assert_eq!(outcome.strings_added, 2);
        assert_eq!(outcome.failed(), 1);
        assert_eq!(outcome.failures[0].kind, FailureKind::ParseFailure);
    }

    #[test]
    fn test_resolve_path() {
        let root = Path::new("/project");
        assert_eq!(resolve_path(root, "./src"), PathBuf::from("/project/src"));
        assert_eq!(resolve_path(root, "/abs/src"), PathBuf::from("/abs/src"));
    }
}
