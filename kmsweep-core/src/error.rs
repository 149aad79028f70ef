//! Error types for the sweep driver.
//!
//! Only configuration problems are errors. A failing external invocation is
//! an [`crate::InvocationOutcome`], never a [`SweepError`].

use std::fmt;

use thiserror::Error;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// Error raised while configuring a [`crate::Sweep`].
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SweepError {
    /// The interval must be sampled at least once.
    #[error("sample count must be at least 1 (got {got})")]
    InvalidSampleCount {
        /// The rejected sample count.
        got: usize,
    },
    /// The sample count exceeded the supported maximum.
    #[error("sample count {got} exceeds the maximum of {max}")]
    TooManySamples {
        /// The rejected sample count.
        got: usize,
        /// Largest accepted sample count.
        max: usize,
    },
    /// The lower bound exceeded the upper bound.
    #[error("interval is inverted: low {low} is greater than high {high}")]
    InvertedInterval {
        /// Lower bound supplied by the caller.
        low: f64,
        /// Upper bound supplied by the caller.
        high: f64,
    },
    /// One of the bounds was NaN or infinite.
    #[error("interval bounds must be finite (low {low}, high {high})")]
    NonFiniteBound {
        /// Lower bound supplied by the caller.
        low: f64,
        /// Upper bound supplied by the caller.
        high: f64,
    },
    /// A bound lies outside the range of cluster counts a sample can hold.
    #[error("interval bounds must lie within the 64-bit integer range (low {low}, high {high})")]
    BoundOutOfRange {
        /// Lower bound supplied by the caller.
        low: f64,
        /// Upper bound supplied by the caller.
        high: f64,
    },
    /// The output template cannot embed the cluster count.
    #[error("output template `{template}` does not contain the `{{clusters}}` placeholder")]
    MissingPlaceholder {
        /// The rejected template.
        template: String,
    },
    /// No external program was named.
    #[error("external program name must not be empty")]
    EmptyProgram,
}

define_error_codes! {
    /// Stable codes describing [`SweepError`] variants.
    enum SweepErrorCode for SweepError {
        /// The interval must be sampled at least once.
        InvalidSampleCount => InvalidSampleCount { .. } => "SWEEP_INVALID_SAMPLE_COUNT",
        /// The sample count exceeded the supported maximum.
        TooManySamples => TooManySamples { .. } => "SWEEP_TOO_MANY_SAMPLES",
        /// The lower bound exceeded the upper bound.
        InvertedInterval => InvertedInterval { .. } => "SWEEP_INVERTED_INTERVAL",
        /// One of the bounds was NaN or infinite.
        NonFiniteBound => NonFiniteBound { .. } => "SWEEP_NON_FINITE_BOUND",
        /// A bound lies outside the 64-bit integer range.
        BoundOutOfRange => BoundOutOfRange { .. } => "SWEEP_BOUND_OUT_OF_RANGE",
        /// The output template cannot embed the cluster count.
        MissingPlaceholder => MissingPlaceholder { .. } => "SWEEP_MISSING_PLACEHOLDER",
        /// No external program was named.
        EmptyProgram => EmptyProgram => "SWEEP_EMPTY_PROGRAM",
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, SweepError>;
