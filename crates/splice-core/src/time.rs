//! Time representation for exact timeline arithmetic
//!
//! Uses rational numbers so that trimming and splitting never accumulate
//! floating-point drift. All time values are seconds stored as
//! numerator/denominator pairs.

use num_rational::Rational64;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use crate::error::SpliceError;

/// Denominator used when converting from floating-point seconds (microseconds).
const F64_PRECISION: i64 = 1_000_000;

/// A rational time value in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RationalTime {
    value: Rational64,
}

impl RationalTime {
    /// Zero time constant.
    pub const ZERO: Self = Self {
        value: Rational64::new_raw(0, 1),
    };

    /// Create a new RationalTime of `numerator / denominator` seconds.
    #[inline]
    pub fn new(numerator: i64, denominator: i64) -> Self {
        Self {
            value: Rational64::new(numerator, denominator),
        }
    }

    /// Whole seconds.
    #[inline]
    pub fn from_seconds(seconds: i64) -> Self {
        Self::new(seconds, 1)
    }

    /// Create a RationalTime from float seconds, rounded to the microsecond.
    ///
    /// Non-finite input maps to zero; use [`RationalTime::try_from_seconds_f64`]
    /// when the input comes from outside the process.
    pub fn from_seconds_f64(seconds: f64) -> Self {
        Self::try_from_seconds_f64(seconds).unwrap_or(Self::ZERO)
    }

    /// Like [`RationalTime::from_seconds_f64`] but rejects NaN and infinities.
    pub fn try_from_seconds_f64(seconds: f64) -> Option<Self> {
        if !seconds.is_finite() {
            return None;
        }
        Some(Self::new(
            (seconds * F64_PRECISION as f64).round() as i64,
            F64_PRECISION,
        ))
    }

    /// Convert to seconds as f64.
    #[inline]
    pub fn to_seconds_f64(self) -> f64 {
        *self.value.numer() as f64 / *self.value.denom() as f64
    }

    /// Check if this time is strictly negative.
    #[inline]
    pub fn is_negative(self) -> bool {
        *self.value.numer() < 0
    }

    /// Check if this time is strictly positive.
    #[inline]
    pub fn is_positive(self) -> bool {
        *self.value.numer() > 0
    }

    /// Whole milliseconds, rounded half away from zero.
    pub fn to_millis(self) -> i64 {
        (self.value * Rational64::from_integer(1000))
            .round()
            .to_integer()
    }

    /// Seconds formatted for external tools (`12.345678`).
    pub fn to_arg_string(self) -> String {
        format!("{:.6}", self.to_seconds_f64())
    }
}

impl Default for RationalTime {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Add for RationalTime {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            value: self.value + rhs.value,
        }
    }
}

impl Sub for RationalTime {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self {
            value: self.value - rhs.value,
        }
    }
}

impl fmt::Display for RationalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.to_seconds_f64())
    }
}

/// Canvas frame rate as a fraction (`30000/1001` for NTSC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameRate {
    pub numerator: u32,
    pub denominator: u32,
}

impl FrameRate {
    pub const FPS_25: Self = Self::new(25, 1);
    pub const FPS_29_97: Self = Self::new(30000, 1001);
    pub const FPS_30: Self = Self::new(30, 1);

    #[inline]
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// `n/d`, the form ffmpeg filters accept for `r=` and `fps=`.
    pub fn to_arg_string(self) -> String {
        format!("{}/{}", self.numerator, self.denominator)
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::FPS_30
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator == 1 {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{:.3}", f64::from(self.numerator) / f64::from(self.denominator))
        }
    }
}

/// Parses the `num/den` form ffprobe reports (`r_frame_rate=30000/1001`),
/// or a bare integer rate.
impl FromStr for FrameRate {
    type Err = SpliceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (num, den) = match s.split_once('/') {
            Some((n, d)) => (n.trim(), d.trim()),
            None => (s, "1"),
        };
        let invalid = || SpliceError::InvalidParameter(format!("invalid frame rate: {s:?}"));
        let numerator: u32 = num.parse().map_err(|_| invalid())?;
        let denominator: u32 = den.parse().map_err(|_| invalid())?;
        if numerator == 0 || denominator == 0 {
            return Err(invalid());
        }
        Ok(Self::new(numerator, denominator))
    }
}

/// Half-open window `[start, start + duration)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: RationalTime,
    pub duration: RationalTime,
}

impl TimeRange {
    pub fn new(start: RationalTime, duration: RationalTime) -> Self {
        Self { start, duration }
    }

    pub fn from_start_end(start: RationalTime, end: RationalTime) -> Self {
        Self {
            start,
            duration: end - start,
        }
    }

    pub fn end(self) -> RationalTime {
        self.start + self.duration
    }

    /// The end point belongs to the next window, not this one.
    pub fn contains(self, time: RationalTime) -> bool {
        time >= self.start && time < self.end()
    }
}
