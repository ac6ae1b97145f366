// Copyright 2026 the VHUD Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Monotonic host time in microsecond ticks.
//!
//! [`HostTime`] is a point on the page's monotonic clock (`performance.now()`
//! on the web). One tick is one microsecond, which is also the resolution the
//! web backend converts `DOMHighResTimeStamp` values to.
//!
//! [`Duration`] is a span in the same tick units.

use core::fmt;
use core::ops::{Add, Sub};

/// Microseconds per millisecond.
const TICKS_PER_MS: f64 = 1_000.0;

/// Microseconds per second.
const TICKS_PER_SEC: f64 = 1_000_000.0;

/// A point in time expressed as monotonic microsecond ticks.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct HostTime(pub u64);

impl HostTime {
    /// Returns the raw tick value.
    #[inline]
    #[must_use]
    pub const fn ticks(self) -> u64 {
        self.0
    }

    /// Converts a millisecond timestamp (e.g. a `DOMHighResTimeStamp`) into
    /// host time. Negative and non-finite inputs map to zero.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "timestamp is clamped to a non-negative finite value; µs fits in u64"
    )]
    pub fn from_millis_f64(ms: f64) -> Self {
        if !ms.is_finite() || ms <= 0.0 {
            return Self(0);
        }
        Self(libm::round(ms * TICKS_PER_MS) as u64)
    }

    /// Returns the duration between `self` and an earlier time, or zero if
    /// `earlier` is after `self`.
    #[inline]
    #[must_use]
    pub const fn saturating_duration_since(self, earlier: Self) -> Duration {
        Duration(self.0.saturating_sub(earlier.0))
    }

    /// Saturating addition of a duration.
    #[inline]
    #[must_use]
    pub const fn saturating_add(self, duration: Duration) -> Self {
        Self(self.0.saturating_add(duration.0))
    }
}

impl Add<Duration> for HostTime {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Duration) -> Self {
        self.saturating_add(rhs)
    }
}

impl Sub for HostTime {
    type Output = Duration;

    #[inline]
    fn sub(self, rhs: Self) -> Duration {
        self.saturating_duration_since(rhs)
    }
}

impl fmt::Debug for HostTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostTime({}µs)", self.0)
    }
}

/// A duration in microsecond ticks.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Duration(pub u64);

impl Duration {
    /// A zero-length duration.
    pub const ZERO: Self = Self(0);

    /// One second.
    pub const SECOND: Self = Self(1_000_000);

    /// Creates a duration from whole milliseconds.
    #[inline]
    #[must_use]
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms.saturating_mul(1_000))
    }

    /// Returns the raw tick value.
    #[inline]
    #[must_use]
    pub const fn ticks(self) -> u64 {
        self.0
    }

    /// Returns the duration in whole milliseconds, rounded down.
    #[inline]
    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.0 / 1_000
    }

    /// Returns the duration in fractional seconds.
    #[inline]
    #[must_use]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / TICKS_PER_SEC
    }

    /// Saturating addition.
    #[inline]
    #[must_use]
    pub const fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Add for Duration {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        self.saturating_add(rhs)
    }
}

impl fmt::Debug for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Duration({}µs)", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millis_timestamp_converts_to_micros() {
        assert_eq!(HostTime::from_millis_f64(16.667).ticks(), 16_667);
        assert_eq!(HostTime::from_millis_f64(1000.0).ticks(), 1_000_000);
    }

    #[test]
    fn bogus_timestamps_clamp_to_zero() {
        assert_eq!(HostTime::from_millis_f64(-5.0), HostTime(0));
        assert_eq!(HostTime::from_millis_f64(f64::NAN), HostTime(0));
        assert_eq!(HostTime::from_millis_f64(f64::INFINITY), HostTime(0));
    }

    #[test]
    fn host_time_arithmetic_saturates() {
        let t = HostTime(1000);
        assert_eq!(t - HostTime(1500), Duration::ZERO);
        assert_eq!(t - HostTime(400), Duration(600));
        assert_eq!(HostTime(u64::MAX) + Duration(1), HostTime(u64::MAX));
    }

    #[test]
    fn duration_units() {
        assert_eq!(Duration::from_millis(250).ticks(), 250_000);
        assert_eq!(Duration(1_999).as_millis(), 1);
        assert!((Duration(1_500_000).as_secs_f64() - 1.5).abs() < 1e-12);
    }
}
