//! Support library for the kmsweep CLI binary.
//!
//! Exposes the command pipeline and logging setup so tests can drive a sweep
//! without forking the binary.

pub mod cli;
pub mod logging;
