use anyhow::Result;

use super::{CommandKind, CommandResult, CommandSummary, RevertSummary};
use crate::cli::args::RevertCommand;
use crate::core::ProjectContext;
use crate::issues::Finding;

pub fn revert(cmd: RevertCommand) -> Result<CommandResult> {
    let ctx = ProjectContext::new(&cmd.common)?;
    let outcome = ctx.revert(cmd.apply)?;

    let mut result = CommandResult::new(
        CommandKind::Revert,
        CommandSummary::Revert(RevertSummary {
            is_apply: cmd.apply,
            strings_restored: outcome.strings_restored,
            files_updated: outcome.files_updated,
            rewrites: outcome.rewrites,
        }),
    );
    result.pending = !cmd.apply && outcome.files_updated > 0;
    result.findings = outcome.failures.into_iter().map(Finding::from).collect();
    result.src_dir = Some(ctx.src_dir.clone());
    result.source_files_checked = ctx.scan.files.len();
    Ok(result)
}
