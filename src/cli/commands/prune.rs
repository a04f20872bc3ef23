use anyhow::Result;

use super::{CommandKind, CommandResult, CommandSummary, PruneSummary};
use crate::cli::args::PruneCommand;
use crate::core::ProjectContext;

pub fn prune(cmd: PruneCommand) -> Result<CommandResult> {
    let ctx = ProjectContext::new(&cmd.common)?;
    let outcome = ctx.prune(&cmd.keys, cmd.apply)?;

    let mut result = CommandResult::new(
        CommandKind::Prune,
        CommandSummary::Prune(PruneSummary {
            is_apply: cmd.apply,
            keys: outcome.keys,
            removed: outcome.result.removed.clone(),
            locale_files: outcome
                .locale_files
                .iter()
                .map(|p| ctx.display_path(p))
                .collect(),
        }),
    );
    result.pending = !cmd.apply && outcome.result.total_removed() > 0;
    Ok(result)
}
