//! Extract command - the full pipeline.
//!
//! Classifies every file, assigns keys, updates the locale files and replaces
//! literals with translate references. Use `--apply` to write (default is
//! dry-run, which previews the source changes).

use anyhow::Result;

use super::{CommandKind, CommandResult, CommandSummary, ExtractSummary};
use crate::cli::args::ExtractCommand;
use crate::core::ProjectContext;
use crate::issues::Finding;

pub fn extract(cmd: ExtractCommand) -> Result<CommandResult> {
    let mut ctx = ProjectContext::new(&cmd.common)?;
    if let Some(mode) = cmd.classify.aggressive_mode {
        ctx.config.aggressive_mode = mode;
    }
    if let Some(mode) = cmd.update_mode {
        ctx.config.update_mode = mode;
    }

    let outcome = ctx.extract(cmd.apply)?;
    let pending = !cmd.apply && (!outcome.locale_files.is_empty() || !outcome.rewrites.is_empty());

    let mut result = CommandResult::new(
        CommandKind::Extract,
        CommandSummary::Extract(ExtractSummary {
            is_apply: cmd.apply,
            strings_added: outcome.strings_added,
            strings_replaced: outcome.strings_replaced,
            keys_pruned: outcome.keys_pruned,
            files_updated: outcome.files_updated,
            locale_files: outcome
                .locale_files
                .iter()
                .map(|p| ctx.display_path(p))
                .collect(),
            rewrites: outcome.rewrites,
        }),
    );
    result.findings = outcome.failures.into_iter().map(Finding::from).collect();
    result.src_dir = Some(ctx.src_dir.clone());
    result.pending = pending;
    result.source_files_checked = ctx.scan.files.len();
    Ok(result)
}
