use std::{fs, path::PathBuf};

use anyhow::{Context, Result};

use super::{CommandKind, CommandResult, CommandSummary, InitSummary};
use crate::cli::args::InitCommand;
use crate::config::{CONFIG_FILE_NAME, default_config_json, load_config};
use crate::core::file_scanner::relative_path;
use crate::core::store::languages::Languages;

/// Write the default config (unless one exists) and seed the languages file.
pub fn init(cmd: InitCommand) -> Result<CommandResult> {
    let root = cmd.common.root.clone().unwrap_or_else(|| PathBuf::from("."));
    let config_path = root.join(CONFIG_FILE_NAME);

    let config_created = !config_path.exists();
    if config_created {
        fs::write(&config_path, default_config_json()?)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
    }

    let config = load_config(&root)?.config;
    let languages_path = root.join(&config.languages_json_path);
    let languages_seeded = if languages_path.exists() {
        None
    } else {
        Languages::load_or_seed(&languages_path)?.save(&languages_path)?;
        Some(relative_path(&root, &languages_path))
    };

    Ok(CommandResult::new(
        CommandKind::Init,
        CommandSummary::Init(InitSummary {
            config_created,
            languages_seeded,
        }),
    ))
}
