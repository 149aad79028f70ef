//! Small helpers shared across CLI tests.

use clap::Parser;
use kmsweep_core::Launcher;
use tempfile::TempDir;

use super::{Cli, CliError, ExecutionSummary, run_cli_with};

pub(super) fn temp_dir() -> TempDir {
    match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => panic!("failed to create temp dir: {err}"),
    }
}

pub(super) fn parse(args: &[&str]) -> Cli {
    let argv = std::iter::once("kmsweep").chain(args.iter().copied());
    match Cli::try_parse_from(argv) {
        Ok(cli) => cli,
        Err(err) => panic!("arguments must parse: {err}"),
    }
}

pub(super) fn run_expecting_error<L: Launcher>(
    cli: Cli,
    launcher: &mut L,
    panic_msg: &str,
) -> CliError {
    match run_cli_with(cli, launcher) {
        Ok(_) => panic!("{panic_msg}"),
        Err(err) => err,
    }
}

pub(super) fn render(summary: &ExecutionSummary) -> String {
    let mut buffer = Vec::new();
    if let Err(err) = super::render_summary(summary, &mut buffer) {
        panic!("rendering into memory must succeed: {err}");
    }
    match String::from_utf8(buffer) {
        Ok(text) => text,
        Err(err) => panic!("summary must be UTF-8: {err}"),
    }
}
