//! Behavioural tests for the `kmsweep` binary.

use std::process::{Command, Output};

use rstest::rstest;

fn kmsweep(args: &[&str]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_kmsweep"));
    command
        .args(args)
        .env("RUST_LOG", "warn")
        .env_remove("KMSWEEP_LOG_FORMAT");
    match command.output() {
        Ok(output) => output,
        Err(error) => panic!("failed to run kmsweep: {error}"),
    }
}

#[rstest]
fn plan_prints_the_default_sweep() {
    let output = kmsweep(&["plan"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 100);
    assert!(stdout.lines().all(|line| line.starts_with("python3 kmeans.py cluster ")));
}

#[rstest]
fn configuration_errors_exit_with_failure_and_code() {
    let output = kmsweep(&["plan", "--output-template", "fixed.csv"]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("SWEEP_MISSING_PLACEHOLDER"), "stderr: {stderr}");
}

#[cfg(unix)]
#[rstest]
#[case::lenient(&[], true)]
#[case::strict(&["--strict"], false)]
fn failing_invocations_only_fail_strict_runs(#[case] extra: &[&str], #[case] succeeds: bool) {
    let mut args = vec!["run", "--samples", "3", "--program", "false", "--no-program-args"];
    args.extend_from_slice(extra);
    let output = kmsweep(&args);
    assert_eq!(output.status.success(), succeeds);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("sweep: 3 invocations\n"), "stdout: {stdout}");
    assert!(stdout.contains("failed: 3\n"));
}

#[rstest]
fn missing_program_is_reported_not_fatal() {
    let output = kmsweep(&[
        "run",
        "--samples",
        "2",
        "--program",
        "kmsweep-definitely-missing-program",
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("launch failed: 2\n"), "stdout: {stdout}");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("could not be launched"), "stderr: {stderr}");
}

#[rstest]
fn json_logging_is_selected_by_environment() {
    let output = Command::new(env!("CARGO_BIN_EXE_kmsweep"))
        .args(["plan", "--samples", "0"])
        .env("KMSWEEP_LOG_FORMAT", "json")
        .env("RUST_LOG", "error")
        .output();
    let output = match output {
        Ok(output) => output,
        Err(error) => panic!("failed to run kmsweep: {error}"),
    };
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.trim_start().starts_with('{'), "stderr: {stderr}");
    assert!(stderr.contains("SWEEP_INVALID_SAMPLE_COUNT"));
}
