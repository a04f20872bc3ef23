//! The languages file: which locales exist, which one is the base.

use std::{fs, path::Path};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageEntry {
    pub code: String,
    #[serde(default)]
    pub english_name: String,
    #[serde(default)]
    pub native_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag: Option<String>,
    #[serde(default)]
    pub rank: u32,
    #[serde(default)]
    pub default: bool,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Display names and flags for the codes seeded on first run and common regions.
const KNOWN_LANGUAGES: &[(&str, &str, &str, &str)] = &[
    ("en", "English", "English", "🇬🇧"),
    ("es", "Spanish", "Español", "🇪🇸"),
    ("fr", "French", "Français", "🇫🇷"),
    ("de", "German", "Deutsch", "🇩🇪"),
    ("it", "Italian", "Italiano", "🇮🇹"),
    ("pt", "Portuguese", "Português", "🇵🇹"),
    ("nl", "Dutch", "Nederlands", "🇳🇱"),
    ("ja", "Japanese", "日本語", "🇯🇵"),
    ("zh", "Chinese", "中文", "🇨🇳"),
    ("ko", "Korean", "한국어", "🇰🇷"),
    ("ru", "Russian", "Русский", "🇷🇺"),
    ("ar", "Arabic", "العربية", "🇸🇦"),
    ("en-US", "English (United States)", "English (US)", "🇺🇸"),
    ("pt-BR", "Portuguese (Brazil)", "Português (Brasil)", "🇧🇷"),
    ("es-MX", "Spanish (Mexico)", "Español (México)", "🇲🇽"),
    ("zh-TW", "Chinese (Taiwan)", "中文 (台灣)", "🇹🇼"),
];

const SEEDED_CODES: &[&str] = &[
    "en", "es", "fr", "de", "it", "pt", "nl", "ja", "zh", "ko", "ru", "ar",
];

fn lookup(code: &str) -> Option<&'static (&'static str, &'static str, &'static str, &'static str)> {
    KNOWN_LANGUAGES
        .iter()
        .find(|(c, ..)| c.eq_ignore_ascii_case(code))
        .or_else(|| {
            let bare = bare_language(code);
            KNOWN_LANGUAGES.iter().find(|(c, ..)| c.eq_ignore_ascii_case(bare))
        })
}

/// `pt-BR` → `pt`, `zh_TW` → `zh`.
pub fn bare_language(code: &str) -> &str {
    code.split(['-', '_']).next().unwrap_or(code)
}

pub fn is_region_qualified(code: &str) -> bool {
    code.contains(['-', '_'])
}

/// The set written on first run: English as the base, the rest as targets.
pub fn default_languages() -> Vec<LanguageEntry> {
    SEEDED_CODES
        .iter()
        .enumerate()
        .map(|(rank, code)| {
            let mut entry = LanguageEntry {
                code: code.to_string(),
                english_name: String::new(),
                native_name: String::new(),
                flag: None,
                rank: rank as u32,
                default: rank == 0,
                active: true,
            };
            fill_display_fields(&mut entry);
            entry
        })
        .collect()
}

/// Fill missing names and flag from the built-in table. Returns true if anything changed.
pub fn fill_display_fields(entry: &mut LanguageEntry) -> bool {
    let Some((_, english, native, flag)) = lookup(&entry.code) else {
        if entry.english_name.is_empty() {
            entry.english_name = entry.code.clone();
            entry.native_name = entry.code.clone();
            return true;
        }
        return false;
    };
    let mut changed = false;
    if entry.english_name.is_empty() {
        entry.english_name = english.to_string();
        changed = true;
    }
    if entry.native_name.is_empty() {
        entry.native_name = native.to_string();
        changed = true;
    }
    if entry.flag.is_none() {
        entry.flag = Some(flag.to_string());
        changed = true;
    }
    changed
}

/// Loaded languages file.
#[derive(Debug, Clone)]
pub struct Languages {
    pub entries: Vec<LanguageEntry>,
    /// The file was created or normalized and should be written back.
    pub dirty: bool,
}

impl Languages {
    /// Load the languages file, seeding the default set when it does not exist.
    pub fn load_or_seed(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self {
                entries: default_languages(),
                dirty: true,
            });
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read languages file: {}", path.display()))?;
        let mut entries: Vec<LanguageEntry> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse languages file: {}", path.display()))?;

        let mut dirty = false;
        for entry in &mut entries {
            dirty |= fill_display_fields(entry);
        }
        Ok(Self { entries, dirty })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let content =
            serde_json::to_string_pretty(&self.entries).context("Failed to serialize JSON")?;
        fs::write(path, format!("{}\n", content))
            .with_context(|| format!("Failed to write file: {}", path.display()))
    }

    /// The single entry marked `default`.
    pub fn base(&self) -> Result<&LanguageEntry> {
        let defaults: Vec<&LanguageEntry> = self.entries.iter().filter(|e| e.default).collect();
        match defaults.as_slice() {
            [] => bail!("No language is marked as default; mark exactly one entry with \"default\": true"),
            [entry] => Ok(entry),
            many => bail!(
                "Only one language may be marked as default, found: {}",
                many.iter().map(|e| e.code.as_str()).collect::<Vec<_>>().join(", ")
            ),
        }
    }

    /// Target locale codes ordered by rank.
    pub fn targets(&self, only_active: bool, only_main: bool) -> Result<Vec<String>> {
        let base = self.base()?;
        let mut targets: Vec<&LanguageEntry> = self
            .entries
            .iter()
            .filter(|e| e.code != base.code)
            .filter(|e| !only_active || e.active)
            .filter(|e| !only_main || !is_region_qualified(&e.code))
            .collect();
        targets.sort_by_key(|e| e.rank);
        Ok(targets.into_iter().map(|e| e.code.clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn entry(code: &str, rank: u32, default: bool, active: bool) -> LanguageEntry {
        LanguageEntry {
            code: code.to_string(),
            english_name: String::new(),
            native_name: String::new(),
            flag: None,
            rank,
            default,
            active,
        }
    }

    #[test]
    fn test_default_languages() {
        let languages = Languages {
            entries: default_languages(),
            dirty: true,
        };
        assert_eq!(languages.base().unwrap().code, "en");
        assert_eq!(languages.entries.len(), 12);
        assert_eq!(languages.entries[1].native_name, "Español");
        assert_eq!(languages.targets(true, false).unwrap().len(), 11);
    }

    #[test]
    fn test_missing_default_is_an_error() {
        let languages = Languages {
            entries: vec![entry("en", 0, false, true), entry("fr", 1, false, true)],
            dirty: false,
        };
        let err = languages.base().unwrap_err();
        assert!(err.to_string().contains("default"));
    }

    #[test]
    fn test_two_defaults_is_an_error() {
        let languages = Languages {
            entries: vec![entry("en", 0, true, true), entry("fr", 1, true, true)],
            dirty: false,
        };
        assert!(languages.base().is_err());
    }

    #[test]
    fn test_targets_filters_and_orders() {
        let languages = Languages {
            entries: vec![
                entry("de", 5, false, true),
                entry("en", 0, true, true),
                entry("pt-BR", 2, false, true),
                entry("fr", 1, false, false),
                entry("es", 3, false, true),
            ],
            dirty: false,
        };
        assert_eq!(
            languages.targets(false, false).unwrap(),
            vec!["fr", "pt-BR", "es", "de"]
        );
        assert_eq!(languages.targets(true, false).unwrap(), vec!["pt-BR", "es", "de"]);
        assert_eq!(languages.targets(true, true).unwrap(), vec!["es", "de"]);
    }

    #[test]
    fn test_fill_display_fields_with_region_fallback() {
        let mut e = entry("fr-CA", 0, false, true);
        assert!(fill_display_fields(&mut e));
        assert_eq!(e.english_name, "French");
        assert_eq!(e.flag.as_deref(), Some("🇫🇷"));
        assert!(!fill_display_fields(&mut e));
    }

    #[test]
    fn test_load_normalizes_entries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("languages.json");
        fs::write(&path, r#"[{ "code": "en", "default": true }, { "code": "ja", "rank": 1 }]"#)
            .unwrap();

        let languages = Languages::load_or_seed(&path).unwrap();
        assert!(languages.dirty);
        assert_eq!(languages.entries[1].native_name, "日本語");
        assert!(languages.entries[1].active);
    }

    #[test]
    fn test_seed_when_missing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("languages.json");
        let languages = Languages::load_or_seed(&path).unwrap();
        assert!(languages.dirty);
        languages.save(&path).unwrap();

        let reloaded = Languages::load_or_seed(&path).unwrap();
        assert!(!reloaded.dirty);
        assert_eq!(reloaded.entries, languages.entries);
    }
}
