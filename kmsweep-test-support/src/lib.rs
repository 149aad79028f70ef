//! Shared test utilities used across kmsweep crates.

pub mod launcher;
pub mod tracing;
