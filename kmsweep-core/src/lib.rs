//! Core sweep driver for kmsweep.
//!
//! Samples a closed interval of cluster counts, expands each sample into an
//! invocation of an external clustering program and runs the invocations one
//! after another through a [`Launcher`].
//!
//! # Metrics
//!
//! When the `metrics` feature is enabled the driver emits:
//!
//! - `sweep_invocations_total` (counter)
//! - `sweep_invocation_failures_total` (counter)
//! - `sweep_launch_failures_total` (counter)

mod command;
mod error;
mod interval;
mod launcher;
mod sweep;

pub use crate::{
    command::{
        CLUSTERS_PLACEHOLDER, CommandTemplate, DEFAULT_CLUSTERS_FLAG, DEFAULT_INPUT,
        DEFAULT_INPUT_FLAG, DEFAULT_LEADING_ARGS, DEFAULT_OUTPUT_FLAG, DEFAULT_OUTPUT_TEMPLATE,
        DEFAULT_PROGRAM, Invocation,
    },
    error::{Result, SweepError, SweepErrorCode},
    interval::{DEFAULT_HIGH, DEFAULT_LOW, DEFAULT_SAMPLES, Interval, MAX_SAMPLES},
    launcher::{InvocationOutcome, Launcher, ProcessLauncher},
    sweep::{Sweep, SweepRecord, SweepReport},
};
