use std::path::PathBuf;

use crate::cli::exit_status::ExitStatus;
use crate::core::rewrite::FileRewrite;
use crate::issues::{Finding, Report, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Init,
    Scan,
    Extract,
    Revert,
    Prune,
    Manifest,
}

#[derive(Debug)]
pub enum CommandSummary {
    Init(InitSummary),
    Scan(ScanSummary),
    Extract(ExtractSummary),
    Revert(RevertSummary),
    Prune(PruneSummary),
    Manifest(ManifestSummary),
}

#[derive(Debug)]
pub struct InitSummary {
    pub config_created: bool,
    /// Languages file written, relative to the project root.
    pub languages_seeded: Option<String>,
}

#[derive(Debug)]
pub struct ScanSummary {
    /// Candidates that would be extracted.
    pub found_count: usize,
    /// References to existing keys.
    pub translated_count: usize,
    pub restricted_count: usize,
}

#[derive(Debug)]
pub struct ExtractSummary {
    pub is_apply: bool,
    pub strings_added: usize,
    pub strings_replaced: usize,
    pub keys_pruned: usize,
    pub files_updated: usize,
    /// Locale files written (or to be written), relative to the project root.
    pub locale_files: Vec<String>,
    pub rewrites: Vec<FileRewrite>,
}

#[derive(Debug)]
pub struct RevertSummary {
    pub is_apply: bool,
    pub strings_restored: usize,
    pub files_updated: usize,
    pub rewrites: Vec<FileRewrite>,
}

#[derive(Debug)]
pub struct PruneSummary {
    pub is_apply: bool,
    pub keys: Vec<String>,
    /// `(locale code, keys removed)`, base first.
    pub removed: Vec<(String, usize)>,
    pub locale_files: Vec<String>,
}

#[derive(Debug)]
pub struct ManifestSummary {
    pub path: String,
    pub locales: Vec<String>,
}

/// Result of running a glot-ng command.
#[derive(Debug)]
pub struct CommandResult {
    pub kind: CommandKind,
    pub summary: CommandSummary,
    /// Candidates, restricted candidates and failures to print.
    pub findings: Vec<Finding>,
    /// Directory `findings` paths are relative to, for source context.
    pub src_dir: Option<PathBuf>,
    /// A dry run found work to do.
    pub pending: bool,
    pub source_files_checked: usize,
}

impl CommandResult {
    pub fn new(kind: CommandKind, summary: CommandSummary) -> Self {
        Self {
            kind,
            summary,
            findings: Vec::new(),
            src_dir: None,
            pending: false,
            source_files_checked: 0,
        }
    }

    pub fn failure_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.report_severity() == Severity::Error)
            .count()
    }

    pub fn exit_status(&self) -> ExitStatus {
        let init_refused = matches!(
            &self.summary,
            CommandSummary::Init(summary) if !summary.config_created
        );
        if init_refused || self.pending || self.failure_count() > 0 {
            ExitStatus::Failure
        } else {
            ExitStatus::Success
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issues::{Failure, FailureKind};

    fn manifest_result() -> CommandResult {
        CommandResult::new(
            CommandKind::Manifest,
            CommandSummary::Manifest(ManifestSummary {
                path: "src/assets/i18n/translate-manifest.json".to_string(),
                locales: vec!["en".to_string()],
            }),
        )
    }

    #[test]
    fn test_exit_status() {
        let mut result = manifest_result();
        assert_eq!(result.exit_status(), ExitStatus::Success);

        result.pending = true;
        assert_eq!(result.exit_status(), ExitStatus::Failure);

        let mut result = manifest_result();
        result
            .findings
            .push(Failure::new(FailureKind::OffsetMismatch, "a.ts", "changed").into());
        assert_eq!(result.failure_count(), 1);
        assert_eq!(result.exit_status(), ExitStatus::Failure);
    }
}
