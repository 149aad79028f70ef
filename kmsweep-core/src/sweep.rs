//! The sequential sweep driver.
//!
//! A [`Sweep`] pairs an [`Interval`] with a [`CommandTemplate`]. Running it
//! launches one invocation per sample, strictly in sample order, waiting for
//! each to finish before starting the next. A failing invocation is recorded
//! and logged; it never stops the sweep.

use std::collections::HashSet;
use std::path::PathBuf;

use tracing::{Span, field, info, instrument, warn};

use crate::{
    command::{CommandTemplate, Invocation},
    interval::Interval,
    launcher::{InvocationOutcome, Launcher},
};

/// A configured cluster-count sweep.
///
/// # Examples
/// ```
/// use kmsweep_core::{CommandTemplate, Interval, InvocationOutcome, Invocation, Launcher, Sweep};
///
/// struct Collect(Vec<i64>);
///
/// impl Launcher for Collect {
///     fn launch(&mut self, invocation: &Invocation) -> InvocationOutcome {
///         self.0.push(invocation.clusters());
///         InvocationOutcome::Succeeded
///     }
/// }
///
/// let interval = Interval::new(1.0, 4.0, 4).expect("interval is valid");
/// let template = CommandTemplate::new("kmeans", "in.gz", "k{clusters}.csv")
///     .expect("template is valid");
/// let mut launcher = Collect(Vec::new());
/// let report = Sweep::new(interval, template).run(&mut launcher);
/// assert_eq!(launcher.0, vec![1, 2, 3, 4]);
/// assert_eq!(report.succeeded(), 4);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sweep {
    interval: Interval,
    template: CommandTemplate,
}

impl Sweep {
    /// Pairs an interval with the command template each sample expands into.
    #[must_use]
    pub const fn new(interval: Interval, template: CommandTemplate) -> Self {
        Self { interval, template }
    }

    /// Returns the sampled interval.
    #[must_use]
    pub const fn interval(&self) -> &Interval {
        &self.interval
    }

    /// Returns the command template.
    #[must_use]
    pub const fn template(&self) -> &CommandTemplate {
        &self.template
    }

    /// Expands every sample into its invocation, in sample order.
    ///
    /// Samples that repeat an earlier value are kept. Each repeat logs a
    /// warning because its output file overwrites the earlier one.
    #[instrument(
        name = "sweep.plan",
        skip(self),
        fields(samples = self.interval.sample_count().get(), duplicates = field::Empty),
    )]
    pub fn plan(&self) -> Vec<Invocation> {
        let mut seen = HashSet::new();
        let mut duplicates = 0_usize;
        let invocations: Vec<Invocation> = self
            .interval
            .samples()
            .into_iter()
            .map(|clusters| {
                let invocation = self.template.invocation(clusters);
                if !seen.insert(clusters) {
                    duplicates += 1;
                    warn!(
                        clusters,
                        output = %invocation.output().display(),
                        "duplicate sample; output file will be overwritten"
                    );
                }
                invocation
            })
            .collect();
        Span::current().record("duplicates", duplicates);
        invocations
    }

    /// Launches every invocation in order and collects the outcomes.
    ///
    /// Never stops early: a non-zero exit or a launch failure is logged at
    /// `warn` and recorded in the returned [`SweepReport`].
    #[instrument(
        name = "sweep.run",
        skip(self, launcher),
        fields(
            low = self.interval.low(),
            high = self.interval.high(),
            samples = self.interval.sample_count().get(),
        ),
    )]
    pub fn run<L: Launcher + ?Sized>(&self, launcher: &mut L) -> SweepReport {
        let invocations = self.plan();
        let mut records = Vec::with_capacity(invocations.len());
        for (index, invocation) in invocations.into_iter().enumerate() {
            info!(
                index,
                clusters = invocation.clusters(),
                output = %invocation.output().display(),
                "launching invocation"
            );
            let outcome = launcher.launch(&invocation);
            record_outcome(&outcome);
            match &outcome {
                InvocationOutcome::Succeeded => {}
                InvocationOutcome::Failed { exit_code } => warn!(
                    index,
                    clusters = invocation.clusters(),
                    exit_code = ?exit_code,
                    "invocation exited unsuccessfully; continuing sweep"
                ),
                InvocationOutcome::LaunchFailed { reason } => warn!(
                    index,
                    clusters = invocation.clusters(),
                    reason = reason.as_str(),
                    "invocation could not be launched; continuing sweep"
                ),
            }
            records.push(SweepRecord {
                clusters: invocation.clusters(),
                output: invocation.output().to_path_buf(),
                outcome,
            });
        }

        let report = SweepReport { records };
        info!(
            invocations = report.len(),
            succeeded = report.succeeded(),
            failed = report.failed(),
            launch_failed = report.launch_failed(),
            "sweep completed"
        );
        report
    }
}

#[cfg(feature = "metrics")]
fn record_outcome(outcome: &InvocationOutcome) {
    metrics::counter!("sweep_invocations_total").increment(1);
    match outcome {
        InvocationOutcome::Succeeded => {}
        InvocationOutcome::Failed { .. } => {
            metrics::counter!("sweep_invocation_failures_total").increment(1);
        }
        InvocationOutcome::LaunchFailed { .. } => {
            metrics::counter!("sweep_launch_failures_total").increment(1);
        }
    }
}

#[cfg(not(feature = "metrics"))]
fn record_outcome(_outcome: &InvocationOutcome) {}

/// Outcome of one sweep point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepRecord {
    /// Cluster count requested from the external program.
    pub clusters: i64,
    /// Output file the external program was asked to write.
    pub output: PathBuf,
    /// How the invocation ended.
    pub outcome: InvocationOutcome,
}

/// Ordered outcomes of a completed sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    records: Vec<SweepRecord>,
}

impl SweepReport {
    /// Builds a report from records already in sweep order.
    #[must_use]
    pub const fn from_records(records: Vec<SweepRecord>) -> Self {
        Self { records }
    }

    /// Returns the records in launch order.
    #[must_use]
    pub fn records(&self) -> &[SweepRecord] {
        &self.records
    }

    /// Returns the number of invocations attempted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` when no invocation was attempted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Counts invocations that exited with status zero.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.count(|outcome| outcome.is_success())
    }

    /// Counts invocations that ran but exited unsuccessfully.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, InvocationOutcome::Failed { .. }))
    }

    /// Counts invocations that could not be started.
    #[must_use]
    pub fn launch_failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, InvocationOutcome::LaunchFailed { .. }))
    }

    /// Returns `true` when any invocation did not succeed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.succeeded() < self.len()
    }

    fn count(&self, predicate: impl Fn(&InvocationOutcome) -> bool) -> usize {
        self.records
            .iter()
            .filter(|record| predicate(&record.outcome))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::{fixture, rstest};

    struct Scripted {
        fail_on: Vec<usize>,
        seen: Vec<i64>,
    }

    impl Launcher for Scripted {
        fn launch(&mut self, invocation: &Invocation) -> InvocationOutcome {
            let index = self.seen.len();
            self.seen.push(invocation.clusters());
            if self.fail_on.contains(&index) {
                InvocationOutcome::Failed { exit_code: Some(3) }
            } else {
                InvocationOutcome::Succeeded
            }
        }
    }

    #[fixture]
    fn small_sweep() -> Sweep {
        let interval = Interval::new(0.0, 1.0, 4).expect("interval is valid");
        let template = CommandTemplate::new("prog", "in", "{clusters}.csv").expect("valid");
        Sweep::new(interval, template)
    }

    #[rstest]
    fn plan_keeps_duplicates_in_order(small_sweep: Sweep) {
        let clusters: Vec<i64> = small_sweep.plan().iter().map(Invocation::clusters).collect();
        assert_eq!(clusters, vec![0, 0, 1, 1]);
    }

    #[rstest]
    fn run_continues_after_failures(small_sweep: Sweep) {
        let mut launcher = Scripted {
            fail_on: vec![0, 2],
            seen: Vec::new(),
        };
        let report = small_sweep.run(&mut launcher);
        assert_eq!(launcher.seen, vec![0, 0, 1, 1]);
        assert_eq!(report.len(), 4);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 2);
        assert_eq!(report.launch_failed(), 0);
        assert!(report.has_failures());
    }

    #[rstest]
    fn default_sweep_embeds_every_value_in_its_output() {
        let plan = Sweep::default().plan();
        assert_eq!(plan.len(), 100);
        assert!(plan.iter().all(|invocation| {
            let output = invocation.output().to_string_lossy().into_owned();
            output.contains(&invocation.clusters().to_string())
        }));
    }

    #[rstest]
    fn empty_report_has_no_failures() {
        let report = SweepReport::default();
        assert!(report.is_empty());
        assert!(!report.has_failures());
    }
}
