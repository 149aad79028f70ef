//! Diagnostics for the kmsweep CLI.
//!
//! Sweep reports and plans go to stdout; every `tracing` event goes to
//! stderr, so piping `kmsweep plan` into a shell never mixes the two. The
//! `log` facade is bridged into the same subscriber.

use std::{env, str::FromStr, sync::OnceLock};

use thiserror::Error;
use tracing_log::LogTracer;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::format::FmtSpan,
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
};

/// Environment variable selecting [`LogFormat`].
pub const LOG_FORMAT_ENV: &str = "KMSWEEP_LOG_FORMAT";

/// Filter applied when `RUST_LOG` is unset or unparsable.
const DEFAULT_DIRECTIVE: &str = "info";

static INSTALLED: OnceLock<()> = OnceLock::new();

/// Output format for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Human,
    /// One JSON object per event, carrying the enclosing sweep spans.
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let value = raw.trim();
        if value.eq_ignore_ascii_case("human") {
            Ok(Self::Human)
        } else if value.eq_ignore_ascii_case("json") {
            Ok(Self::Json)
        } else {
            Err(LoggingError::UnknownFormat {
                value: value.to_owned(),
            })
        }
    }
}

/// Reasons the diagnostics configuration could not be read.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoggingError {
    /// [`LOG_FORMAT_ENV`] was set to bytes that are not UTF-8.
    #[error("`KMSWEEP_LOG_FORMAT` is not valid UTF-8")]
    NotUnicode,
    /// [`LOG_FORMAT_ENV`] named neither `human` nor `json`.
    #[error("`KMSWEEP_LOG_FORMAT={value}` is not a log format; use `human` or `json`")]
    UnknownFormat {
        /// Trimmed value found in the environment.
        value: String,
    },
}

/// Resolves the log format from a variable lookup such as [`env::var`].
///
/// An unset variable selects [`LogFormat::Human`].
///
/// # Errors
/// Returns [`LoggingError`] when the variable is not UTF-8 or names an
/// unknown format.
pub fn resolve_format(
    lookup: impl FnOnce(&str) -> Result<String, env::VarError>,
) -> Result<LogFormat, LoggingError> {
    match lookup(LOG_FORMAT_ENV) {
        Ok(raw) => raw.parse(),
        Err(env::VarError::NotPresent) => Ok(LogFormat::default()),
        Err(env::VarError::NotUnicode(_)) => Err(LoggingError::NotUnicode),
    }
}

/// Installs the global stderr subscriber once per process.
///
/// `RUST_LOG` sets the filter and falls back to `info`. A subscriber that
/// some other component already installed is left in place and noted on
/// stderr.
///
/// # Errors
/// Returns [`LoggingError`] when [`LOG_FORMAT_ENV`] cannot be used.
pub fn init_logging() -> Result<(), LoggingError> {
    if INSTALLED.get().is_some() {
        return Ok(());
    }
    let format = resolve_format(|name| env::var(name))?;
    if let Err(err) = install(format) {
        note_foreign_subscriber(&err);
    }
    let _ = INSTALLED.set(());
    Ok(())
}

fn install(format: LogFormat) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    // Span closes carry timings for each `sweep.run` and `cli.*` span.
    let layer = tracing_subscriber::fmt::layer()
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);
    let layer = match format {
        LogFormat::Human => layer.boxed(),
        LogFormat::Json => layer
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .boxed(),
    };

    let _ = LogTracer::init();

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
}

#[expect(
    clippy::print_stderr,
    reason = "The global subscriber is owned by someone else, so tracing may not reach the user"
)]
fn note_foreign_subscriber(err: &TryInitError) {
    eprintln!("kmsweep: keeping existing tracing subscriber: {err}");
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::ffi::OsString;

    use rstest::rstest;

    #[rstest]
    #[case("human", LogFormat::Human)]
    #[case("HUMAN", LogFormat::Human)]
    #[case(" json ", LogFormat::Json)]
    fn known_formats_parse(#[case] raw: &str, #[case] expected: LogFormat) {
        assert_eq!(raw.parse::<LogFormat>(), Ok(expected));
    }

    #[rstest]
    fn unknown_format_is_reported_trimmed() {
        assert_eq!(
            " xml ".parse::<LogFormat>(),
            Err(LoggingError::UnknownFormat {
                value: "xml".to_owned()
            }),
        );
    }

    #[rstest]
    fn unset_variable_selects_human() {
        let format = resolve_format(|_| Err(env::VarError::NotPresent));
        assert_eq!(format, Ok(LogFormat::Human));
    }

    #[rstest]
    fn lookup_reads_the_kmsweep_variable() {
        let format = resolve_format(|name| {
            assert_eq!(name, LOG_FORMAT_ENV);
            Ok("json".to_owned())
        });
        assert_eq!(format, Ok(LogFormat::Json));
    }

    #[rstest]
    fn non_unicode_variable_is_rejected() {
        let format = resolve_format(|_| Err(env::VarError::NotUnicode(OsString::from("x"))));
        assert_eq!(format, Err(LoggingError::NotUnicode));
    }

    #[rstest]
    fn init_logging_is_idempotent() {
        init_logging().expect("logging must initialise");
        init_logging().expect("subsequent calls must be no-ops");
    }
}
