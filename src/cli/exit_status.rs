use std::process::ExitCode;

/// Exit status for CLI commands.
///
/// - `Success` (0): Nothing left to do, nothing failed
/// - `Failure` (1): Pending work in a dry run, or per-file failures were reported
/// - `Error` (2): The command could not run (config error, missing default locale, ...)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
    Error,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::from(0),
            ExitStatus::Failure => ExitCode::from(1),
            ExitStatus::Error => ExitCode::from(2),
        }
    }
}
