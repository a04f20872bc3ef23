use std::{io, process::ExitCode};

use clap::Parser;
use glot_ng::cli::{Arguments, ExitStatus};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, checked before `RUST_LOG`.
const LOG_ENV: &str = "GLOT_NG_LOG";

fn init_logging(verbose: bool) {
    let default = if verbose { "glot_ng=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| default.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn main() -> ExitCode {
    let args = Arguments::parse();
    init_logging(args.verbose());

    match glot_ng::cli::run_cli(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitStatus::Error.into()
        }
    }
}
