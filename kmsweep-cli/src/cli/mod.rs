//! Command-line interface for the cluster-count sweep.
//!
//! `run` launches the external clustering program once per sample and prints
//! a report; `plan` prints the command lines without launching anything.

mod commands;
mod render;

pub use commands::{
    Cli, CliError, Command, ExecutionSummary, PlanCommand, RunCommand, SweepArgs, check_strict,
    run_cli, run_cli_with,
};
pub use render::render_summary;

#[cfg(test)]
mod test_helpers;
