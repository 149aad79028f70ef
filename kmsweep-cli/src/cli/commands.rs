//! Command implementations and argument parsing for the kmsweep CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use kmsweep_core::{
    CommandTemplate, DEFAULT_CLUSTERS_FLAG, DEFAULT_HIGH, DEFAULT_INPUT, DEFAULT_INPUT_FLAG,
    DEFAULT_LEADING_ARGS, DEFAULT_LOW, DEFAULT_OUTPUT_FLAG, DEFAULT_OUTPUT_TEMPLATE,
    DEFAULT_PROGRAM, DEFAULT_SAMPLES, Interval, Invocation, Launcher, ProcessLauncher, Sweep,
    SweepError, SweepErrorCode, SweepReport,
};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "kmsweep",
    about = "Run an external k-means tool across a linear range of cluster counts."
)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Launch one invocation per sample, in order, and report the outcomes.
    Run(RunCommand),
    /// Print the invocations a run would launch without launching them.
    Plan(PlanCommand),
}

/// Options accepted by the `run` command.
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Sweep configuration.
    #[command(flatten)]
    pub sweep: SweepArgs,

    /// Exit unsuccessfully after the sweep if any invocation failed.
    #[arg(long)]
    pub strict: bool,
}

/// Options accepted by the `plan` command.
#[derive(Debug, Args, Clone)]
pub struct PlanCommand {
    /// Sweep configuration.
    #[command(flatten)]
    pub sweep: SweepArgs,
}

/// Interval and command template shared by `run` and `plan`.
///
/// Defaults sweep 100 points over `[10, 10000]` with the chembridge inputs.
#[derive(Debug, Args, Clone)]
pub struct SweepArgs {
    /// Lower bound of the cluster-count interval.
    #[arg(long, default_value_t = DEFAULT_LOW, allow_negative_numbers = true)]
    pub low: f64,

    /// Upper bound of the cluster-count interval.
    #[arg(long, default_value_t = DEFAULT_HIGH, allow_negative_numbers = true)]
    pub high: f64,

    /// Number of evenly spaced samples, endpoints included (at most 1000000).
    #[arg(long, default_value_t = DEFAULT_SAMPLES)]
    pub samples: usize,

    /// External program launched for every sample.
    #[arg(long, default_value = DEFAULT_PROGRAM)]
    pub program: String,

    /// Argument placed before the generated flags; repeat for several.
    #[arg(
        long = "program-arg",
        value_name = "ARG",
        default_values = DEFAULT_LEADING_ARGS,
        allow_hyphen_values = true,
    )]
    pub program_args: Vec<String>,

    /// Pass no arguments before the generated flags.
    #[arg(long, conflicts_with = "program_args")]
    pub no_program_args: bool,

    /// Input file handed to every invocation.
    #[arg(long, default_value = DEFAULT_INPUT)]
    pub input: PathBuf,

    /// Output filename; `{clusters}` is replaced by the cluster count.
    #[arg(long, default_value = DEFAULT_OUTPUT_TEMPLATE)]
    pub output_template: String,

    /// Flag introducing the input file.
    #[arg(long, default_value = DEFAULT_INPUT_FLAG, allow_hyphen_values = true)]
    pub input_flag: String,

    /// Flag introducing the cluster count.
    #[arg(long, default_value = DEFAULT_CLUSTERS_FLAG, allow_hyphen_values = true)]
    pub clusters_flag: String,

    /// Flag introducing the output file.
    #[arg(long, default_value = DEFAULT_OUTPUT_FLAG, allow_hyphen_values = true)]
    pub output_flag: String,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// The sweep configuration was rejected before anything was launched.
    #[error(transparent)]
    Sweep(#[from] SweepError),
    /// `--strict` was given and at least one invocation did not succeed.
    #[error("{failed} of {total} invocations did not succeed")]
    Strict {
        /// Invocations that exited unsuccessfully or failed to launch.
        failed: usize,
        /// Invocations attempted.
        total: usize,
    },
}

impl CliError {
    /// Returns the stable code of an underlying configuration error.
    #[must_use]
    pub const fn code(&self) -> Option<SweepErrorCode> {
        match self {
            Self::Sweep(err) => Some(err.code()),
            Self::Strict { .. } => None,
        }
    }
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone)]
pub enum ExecutionSummary {
    /// A sweep was launched.
    Run {
        /// Outcome of every invocation, in launch order.
        report: SweepReport,
        /// Whether failures should turn into a failing exit status.
        strict: bool,
    },
    /// A sweep was planned but not launched.
    Plan {
        /// Invocations a run would launch, in order.
        invocations: Vec<Invocation>,
    },
}

/// Executes `cli`, launching invocations as child processes.
///
/// # Errors
/// Returns [`CliError::Sweep`] when the sweep configuration is invalid.
/// Failing invocations are reported in the summary, not as errors.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use clap::Parser;
/// # use kmsweep_cli::cli::{Cli, ExecutionSummary, run_cli};
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let cli = Cli::try_parse_from(["kmsweep", "plan", "--low", "1", "--high", "3", "--samples", "3"])?;
/// let ExecutionSummary::Plan { invocations } = run_cli(cli)? else {
///     panic!("plan must not launch");
/// };
/// assert_eq!(invocations.len(), 3);
/// # Ok(())
/// # }
/// ```
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    run_cli_with(cli, &mut ProcessLauncher)
}

/// Executes `cli`, handing every invocation to `launcher`.
///
/// # Errors
/// Returns [`CliError::Sweep`] when the sweep configuration is invalid.
#[instrument(
    name = "cli.run",
    err,
    skip(cli, launcher),
    fields(command = field::Empty),
)]
pub fn run_cli_with<L: Launcher + ?Sized>(
    cli: Cli,
    launcher: &mut L,
) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Run(run) => {
            Span::current().record("command", field::display("run"));
            run_command(&run, launcher)
        }
        Command::Plan(plan) => {
            Span::current().record("command", field::display("plan"));
            plan_command(&plan)
        }
    }
}

#[instrument(
    name = "cli.execute",
    err,
    skip(command, launcher),
    fields(strict = command.strict),
)]
pub(super) fn run_command<L: Launcher + ?Sized>(
    command: &RunCommand,
    launcher: &mut L,
) -> Result<ExecutionSummary, CliError> {
    let sweep = build_sweep(&command.sweep)?;
    let report = sweep.run(launcher);
    info!(
        invocations = report.len(),
        failures = report.len() - report.succeeded(),
        "command completed"
    );
    Ok(ExecutionSummary::Run {
        report,
        strict: command.strict,
    })
}

#[instrument(name = "cli.plan", err, skip(command))]
pub(super) fn plan_command(command: &PlanCommand) -> Result<ExecutionSummary, CliError> {
    let sweep = build_sweep(&command.sweep)?;
    Ok(ExecutionSummary::Plan {
        invocations: sweep.plan(),
    })
}

pub(super) fn build_sweep(args: &SweepArgs) -> Result<Sweep, CliError> {
    let interval = Interval::new(args.low, args.high, args.samples)?;
    let leading_args: &[String] = if args.no_program_args {
        &[]
    } else {
        &args.program_args
    };
    let template = CommandTemplate::new(
        args.program.as_str(),
        args.input.clone(),
        args.output_template.as_str(),
    )?
    .with_leading_args(leading_args.iter().map(String::as_str))
    .with_input_flag(args.input_flag.as_str())
    .with_clusters_flag(args.clusters_flag.as_str())
    .with_output_flag(args.output_flag.as_str());
    Ok(Sweep::new(interval, template))
}

/// Converts a strict run with failures into [`CliError::Strict`].
///
/// Call this after rendering so the full report is printed before the process
/// exits.
///
/// # Errors
/// Returns [`CliError::Strict`] when `--strict` was requested and any
/// invocation did not succeed.
pub fn check_strict(summary: &ExecutionSummary) -> Result<(), CliError> {
    match summary {
        ExecutionSummary::Run {
            report,
            strict: true,
        } if report.has_failures() => Err(CliError::Strict {
            failed: report.len() - report.succeeded(),
            total: report.len(),
        }),
        _ => Ok(()),
    }
}
