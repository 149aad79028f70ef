//! Launching invocations and classifying how they ended.

use std::fmt;

use tracing::{debug, field, instrument};

use crate::command::Invocation;

/// How a single invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationOutcome {
    /// The program exited with status zero.
    Succeeded,
    /// The program ran but exited unsuccessfully.
    Failed {
        /// Exit code, absent when the process was terminated by a signal.
        exit_code: Option<i32>,
    },
    /// The program could not be started at all.
    LaunchFailed {
        /// Operating system error reported by the spawn attempt.
        reason: String,
    },
}

impl InvocationOutcome {
    /// Returns `true` when the program ran and exited with status zero.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

impl fmt::Display for InvocationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded => f.write_str("ok"),
            Self::Failed {
                exit_code: Some(code),
            } => write!(f, "exit {code}"),
            Self::Failed { exit_code: None } => f.write_str("terminated by signal"),
            Self::LaunchFailed { reason } => write!(f, "launch failed: {reason}"),
        }
    }
}

/// Runs invocations to completion.
///
/// Implementations must block until the invocation has finished. Failures are
/// reported through [`InvocationOutcome`] rather than an error so a sweep can
/// always continue with the next sample.
pub trait Launcher {
    /// Launches `invocation` and waits for it to finish.
    fn launch(&mut self, invocation: &Invocation) -> InvocationOutcome;
}

/// Launches invocations as child processes that inherit stdio.
///
/// # Examples
/// ```no_run
/// use kmsweep_core::{CommandTemplate, Launcher, ProcessLauncher};
///
/// let invocation = CommandTemplate::default().invocation(10);
/// let outcome = ProcessLauncher.launch(&invocation);
/// println!("{outcome}");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessLauncher;

impl Launcher for ProcessLauncher {
    #[instrument(
        name = "launcher.process",
        skip(self, invocation),
        fields(clusters = invocation.clusters(), status = field::Empty),
    )]
    fn launch(&mut self, invocation: &Invocation) -> InvocationOutcome {
        let outcome = match invocation.to_command().status() {
            Ok(status) if status.success() => InvocationOutcome::Succeeded,
            Ok(status) => InvocationOutcome::Failed {
                exit_code: status.code(),
            },
            Err(err) => InvocationOutcome::LaunchFailed {
                reason: err.to_string(),
            },
        };
        tracing::Span::current().record("status", field::display(&outcome));
        debug!(command = %invocation, "invocation finished");
        outcome
    }
}
