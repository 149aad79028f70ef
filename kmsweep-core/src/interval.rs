//! Closed intervals and the linear sample sequence drawn from them.

use std::num::NonZeroUsize;

use crate::{Result, error::SweepError};

/// Lower bound of the default cluster-count sweep.
pub const DEFAULT_LOW: f64 = 10.0;

/// Upper bound of the default cluster-count sweep.
pub const DEFAULT_HIGH: f64 = 10_000.0;

/// Number of points in the default cluster-count sweep.
pub const DEFAULT_SAMPLES: usize = 100;

/// Largest number of points an interval may be sampled at.
pub const MAX_SAMPLES: usize = 1_000_000;

/// `i64::MIN` as a float; exactly representable.
const SAMPLE_FLOOR: f64 = -9_223_372_036_854_775_808.0;

/// `2^63`, the first float above `i64::MAX`.
const SAMPLE_CEILING: f64 = 9_223_372_036_854_775_808.0;

/// A closed interval `[low, high]` sampled at a fixed number of evenly
/// spaced points.
///
/// # Examples
/// ```
/// use kmsweep_core::Interval;
///
/// let interval = Interval::new(10.0, 10_000.0, 100).expect("interval is valid");
/// let samples = interval.samples();
/// assert_eq!(samples.len(), 100);
/// assert_eq!(samples.first(), Some(&10));
/// assert_eq!(samples.last(), Some(&10_000));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    low: f64,
    high: f64,
    sample_count: NonZeroUsize,
}

impl Default for Interval {
    fn default() -> Self {
        Self {
            low: DEFAULT_LOW,
            high: DEFAULT_HIGH,
            sample_count: NonZeroUsize::MIN.saturating_add(DEFAULT_SAMPLES - 1),
        }
    }
}

impl Interval {
    /// Validates the bounds and sample count.
    ///
    /// `low == high` is accepted and yields a constant sequence.
    ///
    /// # Errors
    /// Returns [`SweepError::InvalidSampleCount`] when `sample_count` is zero,
    /// [`SweepError::TooManySamples`] when it exceeds [`MAX_SAMPLES`],
    /// [`SweepError::NonFiniteBound`] when either bound is NaN or infinite,
    /// [`SweepError::BoundOutOfRange`] when a bound cannot be held by an
    /// `i64` sample, and [`SweepError::InvertedInterval`] when `low > high`.
    ///
    /// # Examples
    /// ```
    /// use kmsweep_core::{Interval, SweepError};
    ///
    /// let err = Interval::new(5.0, 1.0, 3).expect_err("inverted bounds are rejected");
    /// assert!(matches!(err, SweepError::InvertedInterval { .. }));
    /// ```
    pub fn new(low: f64, high: f64, sample_count: usize) -> Result<Self> {
        let sample_count = NonZeroUsize::new(sample_count)
            .ok_or(SweepError::InvalidSampleCount { got: sample_count })?;
        if sample_count.get() > MAX_SAMPLES {
            return Err(SweepError::TooManySamples {
                got: sample_count.get(),
                max: MAX_SAMPLES,
            });
        }
        if !low.is_finite() || !high.is_finite() {
            return Err(SweepError::NonFiniteBound { low, high });
        }
        // Also keeps `high - low` finite.
        if !(SAMPLE_FLOOR..SAMPLE_CEILING).contains(&low)
            || !(SAMPLE_FLOOR..SAMPLE_CEILING).contains(&high)
        {
            return Err(SweepError::BoundOutOfRange { low, high });
        }
        if low > high {
            return Err(SweepError::InvertedInterval { low, high });
        }
        Ok(Self {
            low,
            high,
            sample_count,
        })
    }

    /// Returns the lower bound.
    #[must_use]
    pub const fn low(&self) -> f64 {
        self.low
    }

    /// Returns the upper bound.
    #[must_use]
    pub const fn high(&self) -> f64 {
        self.high
    }

    /// Returns the number of points drawn from the interval.
    #[must_use]
    pub const fn sample_count(&self) -> NonZeroUsize {
        self.sample_count
    }

    /// Returns the evenly spaced points before rounding.
    ///
    /// Both endpoints are included. The last point is pinned to `high` so
    /// accumulated floating-point error never moves the upper endpoint. A
    /// single-point interval yields `[low]`.
    ///
    /// # Examples
    /// ```
    /// use kmsweep_core::Interval;
    ///
    /// let interval = Interval::new(0.0, 1.0, 5).expect("interval is valid");
    /// assert_eq!(interval.linear_points(), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    /// ```
    #[must_use]
    pub fn linear_points(&self) -> Vec<f64> {
        let count = self.sample_count.get();
        let Some(divisions) = count.checked_sub(1).filter(|&d| d > 0) else {
            return vec![self.low];
        };

        let step = (self.high - self.low) / divisions as f64;
        let mut points: Vec<f64> = (0..count)
            .map(|index| self.low + index as f64 * step)
            .collect();
        if let Some(last) = points.last_mut() {
            *last = self.high;
        }
        points
    }

    /// Returns the sample sequence: every linear point rounded to the nearest
    /// integer, ties to even.
    ///
    /// The sequence is non-decreasing. Neighbouring samples may be equal when
    /// the interval is narrower than the sample count; duplicates are kept.
    ///
    /// # Examples
    /// ```
    /// use kmsweep_core::Interval;
    ///
    /// let interval = Interval::new(0.0, 2.0, 5).expect("interval is valid");
    /// assert_eq!(interval.samples(), vec![0, 0, 1, 2, 2]);
    /// ```
    #[must_use]
    pub fn samples(&self) -> Vec<i64> {
        self.linear_points()
            .into_iter()
            .map(|point| point.round_ties_even() as i64)
            .collect()
    }
}
