use anyhow::Result;

use super::{CommandKind, CommandResult, CommandSummary, ManifestSummary};
use crate::cli::args::ManifestCommand;
use crate::core::ProjectContext;

pub fn manifest(cmd: ManifestCommand) -> Result<CommandResult> {
    let ctx = ProjectContext::new(&cmd.common)?;
    let languages = ctx.languages()?;
    let store = ctx.locale_store(&languages)?;
    let manifest = ctx.write_manifest(&store)?;

    Ok(CommandResult::new(
        CommandKind::Manifest,
        CommandSummary::Manifest(ManifestSummary {
            path: ctx.display_path(&ctx.manifest_path()),
            locales: manifest.locales.keys().cloned().collect(),
        }),
    ))
}
