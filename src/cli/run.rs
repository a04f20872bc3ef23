/// Dispatches to the command handler for the parsed arguments.
///
/// # Returns
/// - `Ok(CommandResult)` with the summary and findings to print
/// - `Err` if the command cannot run (config not found, unreadable base locale)
use anyhow::Result;

use super::{
    args::{Arguments, Command},
    commands::{
        CommandResult, extract::extract, init::init, manifest::manifest, prune::prune,
        revert::revert, scan::scan,
    },
};

pub fn run(Arguments { command }: Arguments) -> Result<CommandResult> {
    match command {
        Some(Command::Init(cmd)) => init(cmd),
        Some(Command::Scan(cmd)) => scan(cmd),
        Some(Command::Extract(cmd)) => extract(cmd),
        Some(Command::Revert(cmd)) => revert(cmd),
        Some(Command::Prune(cmd)) => prune(cmd),
        Some(Command::Manifest(cmd)) => manifest(cmd),
        None => {
            anyhow::bail!("No command provided. Use --help to see available commands.")
        }
    }
}
