//! Plain-text rendering of command summaries.

use std::io::{self, Write};

use super::commands::ExecutionSummary;

/// Renders `summary` to `writer`.
///
/// A run prints a count header followed by one tab-separated
/// `clusters, output, outcome` line per invocation. A plan prints one command
/// line per invocation.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use std::path::PathBuf;
/// # use kmsweep_cli::cli::{ExecutionSummary, render_summary};
/// # use kmsweep_core::{InvocationOutcome, SweepRecord, SweepReport};
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let summary = ExecutionSummary::Run {
///     report: SweepReport::from_records(vec![SweepRecord {
///         clusters: 10,
///         output: PathBuf::from("km_10.csv"),
///         outcome: InvocationOutcome::Succeeded,
///     }]),
///     strict: false,
/// };
/// let mut buffer = Vec::new();
/// render_summary(&summary, &mut buffer)?;
/// assert!(String::from_utf8(buffer)?.ends_with("10\tkm_10.csv\tok\n"));
/// # Ok(())
/// # }
/// ```
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    match summary {
        ExecutionSummary::Run { report, .. } => {
            writeln!(writer, "sweep: {} invocations", report.len())?;
            writeln!(writer, "succeeded: {}", report.succeeded())?;
            writeln!(writer, "failed: {}", report.failed())?;
            writeln!(writer, "launch failed: {}", report.launch_failed())?;
            for record in report.records() {
                writeln!(
                    writer,
                    "{}\t{}\t{}",
                    record.clusters,
                    record.output.display(),
                    record.outcome
                )?;
            }
        }
        ExecutionSummary::Plan { invocations } => {
            for invocation in invocations {
                writeln!(writer, "{invocation}")?;
            }
        }
    }
    Ok(())
}
