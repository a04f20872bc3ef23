use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::classify::{AggressiveMode, ClassifierOptions, Permissiveness, PolicyTable};
use crate::core::file_scanner::ScanOptions;
use crate::core::store::UpdateMode;

pub const CONFIG_FILE_NAME: &str = ".glotngrc.json";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_src_dir")]
    pub src_dir: String,
    #[serde(default = "default_output_root")]
    pub output_root: String,
    #[serde(default = "default_languages_json_path")]
    pub languages_json_path: String,
    #[serde(default = "default_min_string_length")]
    pub min_string_length: usize,
    #[serde(default)]
    pub ignore_globs: Vec<String>,
    /// Classified but never rewritten or reverted.
    #[serde(default)]
    pub skip_globs: Vec<String>,
    #[serde(default = "default_html_attribute_names")]
    pub html_attribute_names: Vec<String>,
    #[serde(default)]
    pub update_mode: UpdateMode,
    #[serde(default)]
    pub aggressive_mode: AggressiveMode,
    #[serde(default)]
    pub aggressive_mode_allow_call_regex: Vec<String>,
    #[serde(default)]
    pub aggressive_mode_allow_context_regex: Vec<String>,
    #[serde(default)]
    pub only_main_languages: bool,
    #[serde(default = "default_true")]
    pub only_generate_active_langs: bool,
    #[serde(default = "default_translate_accessor")]
    pub translate_accessor: String,
    #[serde(default = "default_markup_extensions")]
    pub markup_extensions: Vec<String>,
    #[serde(default = "default_source_extensions")]
    pub source_extensions: Vec<String>,
    #[serde(default = "default_true")]
    pub ignore_test_files: bool,
    /// Keys (or `*` patterns) pruned on every extraction.
    #[serde(default)]
    pub remove_keys: Vec<String>,
}

fn default_src_dir() -> String {
    "src".to_string()
}

fn default_output_root() -> String {
    "src/assets/i18n".to_string()
}

fn default_languages_json_path() -> String {
    "src/assets/i18n/languages.json".to_string()
}

fn default_min_string_length() -> usize {
    3
}

fn default_html_attribute_names() -> Vec<String> {
    ["placeholder", "title", "alt", "aria-label", "label", "tooltip"]
        .map(String::from)
        .to_vec()
}

fn default_translate_accessor() -> String {
    "this.translate".to_string()
}

fn default_markup_extensions() -> Vec<String> {
    vec!["html".to_string()]
}

fn default_source_extensions() -> Vec<String> {
    vec!["ts".to_string()]
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            src_dir: default_src_dir(),
            output_root: default_output_root(),
            languages_json_path: default_languages_json_path(),
            min_string_length: default_min_string_length(),
            ignore_globs: Vec::new(),
            skip_globs: Vec::new(),
            html_attribute_names: default_html_attribute_names(),
            update_mode: UpdateMode::default(),
            aggressive_mode: AggressiveMode::default(),
            aggressive_mode_allow_call_regex: Vec::new(),
            aggressive_mode_allow_context_regex: Vec::new(),
            only_main_languages: false,
            only_generate_active_langs: true,
            translate_accessor: default_translate_accessor(),
            markup_extensions: default_markup_extensions(),
            source_extensions: default_source_extensions(),
            ignore_test_files: true,
            remove_keys: Vec::new(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Returns an error naming the field of the first invalid glob or regex.
    pub fn validate(&self) -> Result<()> {
        for (field, patterns) in [
            ("ignoreGlobs", &self.ignore_globs),
            ("skipGlobs", &self.skip_globs),
        ] {
            for pattern in patterns {
                Pattern::new(pattern).with_context(|| {
                    format!("Invalid glob pattern in '{}': \"{}\"", field, pattern)
                })?;
            }
        }
        compile_regexes("aggressiveModeAllowCallRegex", &self.aggressive_mode_allow_call_regex)?;
        compile_regexes(
            "aggressiveModeAllowContextRegex",
            &self.aggressive_mode_allow_context_regex,
        )?;

        if self.translate_accessor.trim().is_empty() {
            anyhow::bail!("'translateAccessor' must not be empty");
        }
        Ok(())
    }

    pub fn classifier_options(&self) -> Result<ClassifierOptions> {
        let permissiveness = Permissiveness {
            mode: self.aggressive_mode,
            allow_call: compile_regexes(
                "aggressiveModeAllowCallRegex",
                &self.aggressive_mode_allow_call_regex,
            )?,
            allow_context: compile_regexes(
                "aggressiveModeAllowContextRegex",
                &self.aggressive_mode_allow_context_regex,
            )?,
        };
        Ok(ClassifierOptions {
            policy: PolicyTable::default(),
            permissiveness,
            min_length: self.min_string_length,
            attributes: self.html_attribute_names.clone(),
            instance_only: self.translate_accessor.trim_start().starts_with("this."),
        })
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            source_extensions: self.source_extensions.clone(),
            markup_extensions: self.markup_extensions.clone(),
            ignore_globs: self.ignore_globs.clone(),
            skip_globs: self.skip_globs.clone(),
            ignore_test_files: self.ignore_test_files,
        }
    }
}

fn compile_regexes(field: &str, patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p).with_context(|| format!("Invalid regex in '{}': \"{}\"", field, p))
        })
        .collect()
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// Directory holding the config file, or the start directory when none was found.
    pub root_dir: PathBuf,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            config.validate()?;
            let root_dir = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| start_dir.to_path_buf());
            Ok(ConfigLoadResult {
                config,
                root_dir,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            root_dir: start_dir.to_path_buf(),
            from_file: false,
        }),
    }
}
