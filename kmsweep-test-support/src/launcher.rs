//! A [`Launcher`] that never spawns anything.
//!
//! Outcomes are scripted per launch index, so tests can simulate non-zero
//! exits and launch failures at chosen points of a sweep.

use std::collections::HashMap;

use kmsweep_core::{Invocation, InvocationOutcome, Launcher};

/// Records every invocation and answers with scripted outcomes.
///
/// Launches without a scripted outcome succeed.
///
/// # Examples
/// ```
/// use kmsweep_core::{CommandTemplate, InvocationOutcome, Launcher};
/// use kmsweep_test_support::launcher::ScriptedLauncher;
///
/// let template = CommandTemplate::default();
/// let mut launcher = ScriptedLauncher::default().exit_at(1, 2);
/// assert!(launcher.launch(&template.invocation(10)).is_success());
/// assert_eq!(
///     launcher.launch(&template.invocation(20)),
///     InvocationOutcome::Failed { exit_code: Some(2) },
/// );
/// assert_eq!(launcher.clusters(), vec![10, 20]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScriptedLauncher {
    script: HashMap<usize, InvocationOutcome>,
    launched: Vec<Invocation>,
}

impl ScriptedLauncher {
    /// Makes the launch at `index` exit with `code`.
    #[must_use]
    pub fn exit_at(mut self, index: usize, code: i32) -> Self {
        self.script.insert(
            index,
            InvocationOutcome::Failed {
                exit_code: Some(code),
            },
        );
        self
    }

    /// Makes the launch at `index` fail to start with `reason`.
    #[must_use]
    pub fn launch_failure_at(mut self, index: usize, reason: &str) -> Self {
        self.script.insert(
            index,
            InvocationOutcome::LaunchFailed {
                reason: reason.to_owned(),
            },
        );
        self
    }

    /// Returns the invocations received so far, in launch order.
    #[must_use]
    pub fn launched(&self) -> &[Invocation] {
        &self.launched
    }

    /// Returns the cluster counts received so far, in launch order.
    #[must_use]
    pub fn clusters(&self) -> Vec<i64> {
        self.launched.iter().map(Invocation::clusters).collect()
    }
}

impl Launcher for ScriptedLauncher {
    fn launch(&mut self, invocation: &Invocation) -> InvocationOutcome {
        let index = self.launched.len();
        self.launched.push(invocation.clone());
        self.script
            .get(&index)
            .cloned()
            .unwrap_or(InvocationOutcome::Succeeded)
    }
}
