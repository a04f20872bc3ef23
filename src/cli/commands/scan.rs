//! Scan command - classify the source tree without changing anything.
//!
//! Every accepted candidate is reported; restricted candidates (call arguments
//! rejected by the permissiveness tier) are listed with `-v` so the
//! `aggressiveMode*` settings can be tuned.

use anyhow::Result;

use super::{CommandKind, CommandResult, CommandSummary, ScanSummary};
use crate::cli::args::ScanCommand;
use crate::core::ProjectContext;
use crate::issues::Finding;

pub fn scan(cmd: ScanCommand) -> Result<CommandResult> {
    let mut ctx = ProjectContext::new(&cmd.common)?;
    if let Some(mode) = cmd.classify.aggressive_mode {
        ctx.config.aggressive_mode = mode;
    }
    let classification = ctx.classification()?;

    let (translated, found): (Vec<_>, Vec<_>) = classification
        .candidates
        .iter()
        .cloned()
        .partition(|c| c.is_already_translated);

    let mut findings: Vec<Finding> = found.iter().cloned().map(Finding::from).collect();
    if ctx.verbose {
        findings.extend(classification.restricted.iter().cloned().map(Finding::from));
    }
    findings.extend(classification.failures.iter().cloned().map(Finding::from));

    let mut result = CommandResult::new(
        CommandKind::Scan,
        CommandSummary::Scan(ScanSummary {
            found_count: found.len(),
            translated_count: translated.len(),
            restricted_count: classification.restricted.len(),
        }),
    );
    result.findings = findings;
    result.src_dir = Some(ctx.src_dir.clone());
    result.pending = !found.is_empty();
    result.source_files_checked = ctx.scan.files.len();
    Ok(result)
}
