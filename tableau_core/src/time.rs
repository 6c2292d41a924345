// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Monotonic host time, timebase conversion and wall-clock timestamps.
//!
//! [`HostTime`] is a point in time expressed as monotonic ticks, and
//! [`Timebase`] carries the rational factor that converts ticks to
//! nanoseconds (`nanoseconds = ticks * numer / denom`). [`Duration`] uses the
//! same tick units. All conversions use `u128` intermediates to avoid
//! overflow.
//!
//! The frame loop reads time through the [`Clock`] trait so that tests can
//! drive it with a [`ManualClock`].
//!
//! [`Timestamp`] is unrelated to frame timing: it is the calendar value kind
//! that the tweener can interpolate.

use core::cell::Cell;
use core::fmt;
use core::ops::{Add, Sub};
use std::rc::Rc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// A point in time expressed as monotonic ticks.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct HostTime(pub u64);

impl HostTime {
    /// Returns the raw tick value.
    #[inline]
    #[must_use]
    pub const fn ticks(self) -> u64 {
        self.0
    }

    /// Converts this host time to nanoseconds using the given timebase.
    #[inline]
    #[must_use]
    pub const fn to_nanos(self, timebase: Timebase) -> u64 {
        timebase.ticks_to_nanos(self.0)
    }

    /// Creates a [`HostTime`] from a nanosecond value and timebase.
    #[inline]
    #[must_use]
    pub const fn from_nanos(nanos: u64, timebase: Timebase) -> Self {
        Self(timebase.nanos_to_ticks(nanos))
    }

    /// Returns the duration between `self` and an earlier time, or zero if
    /// `earlier` is after `self`.
    #[inline]
    #[must_use]
    pub const fn saturating_duration_since(self, earlier: Self) -> Duration {
        Duration(self.0.saturating_sub(earlier.0))
    }
}

impl Add<Duration> for HostTime {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Duration) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for HostTime {
    type Output = Duration;

    #[inline]
    fn sub(self, rhs: Self) -> Duration {
        Duration(self.0 - rhs.0)
    }
}

impl fmt::Debug for HostTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostTime({})", self.0)
    }
}

/// Rational conversion factor from ticks to nanoseconds.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timebase {
    /// Numerator of the ticks-to-nanoseconds ratio.
    pub numer: u32,
    /// Denominator of the ticks-to-nanoseconds ratio.
    pub denom: u32,
}

impl Timebase {
    /// A timebase where ticks are already nanoseconds (1:1).
    pub const NANOS: Self = Self { numer: 1, denom: 1 };

    /// Creates a new timebase with the given numerator and denominator.
    ///
    /// # Panics
    ///
    /// Panics if `denom` is zero.
    #[inline]
    #[must_use]
    pub const fn new(numer: u32, denom: u32) -> Self {
        assert!(denom != 0, "timebase denominator must not be zero");
        Self { numer, denom }
    }

    /// Converts a tick count to nanoseconds.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "u128 intermediate avoids overflow; truncation back to u64 is intentional"
    )]
    pub const fn ticks_to_nanos(self, ticks: u64) -> u64 {
        let wide = ticks as u128 * self.numer as u128 / self.denom as u128;
        wide as u64
    }

    /// Converts nanoseconds to a tick count.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "u128 intermediate avoids overflow; truncation back to u64 is intentional"
    )]
    pub const fn nanos_to_ticks(self, nanos: u64) -> u64 {
        let wide = nanos as u128 * self.denom as u128 / self.numer as u128;
        wide as u64
    }
}

impl fmt::Debug for Timebase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timebase({}/{})", self.numer, self.denom)
    }
}

/// A duration in host-time ticks.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Duration(pub u64);

impl Duration {
    /// A zero-length duration.
    pub const ZERO: Self = Self(0);

    /// Returns the raw tick value.
    #[inline]
    #[must_use]
    pub const fn ticks(self) -> u64 {
        self.0
    }

    /// Creates a duration from fractional seconds, rounding to the nearest
    /// tick. Negative and non-finite inputs yield [`Duration::ZERO`].
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "frame intervals are far below u64::MAX nanoseconds"
    )]
    pub fn from_secs_f64(secs: f64, timebase: Timebase) -> Self {
        if !secs.is_finite() || secs <= 0.0 {
            return Self::ZERO;
        }
        Self(timebase.nanos_to_ticks((secs * 1e9).round() as u64))
    }

    /// Converts this duration to fractional seconds.
    #[inline]
    #[must_use]
    pub fn as_secs_f64(self, timebase: Timebase) -> f64 {
        timebase.ticks_to_nanos(self.0) as f64 / 1e9
    }
}

impl Add for Duration {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl fmt::Debug for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Duration({})", self.0)
    }
}

/// A source of monotonic [`HostTime`] readings.
pub trait Clock {
    /// Returns the current host time.
    fn now(&self) -> HostTime;

    /// Returns the timebase of the ticks reported by [`now`](Self::now).
    fn timebase(&self) -> Timebase {
        Timebase::NANOS
    }
}

/// A [`Clock`] backed by [`std::time::Instant`], counting nanoseconds since
/// the clock was created.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Creates a clock whose zero is the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "u64 nanoseconds cover centuries of uptime"
    )]
    fn now(&self) -> HostTime {
        HostTime(self.origin.elapsed().as_nanos() as u64)
    }
}

/// A [`Clock`] advanced by hand. Clones share the same reading.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    /// Creates a manual clock reading zero nanoseconds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the clock forward by `secs` seconds.
    pub fn advance_secs(&self, secs: f64) {
        let step = Duration::from_secs_f64(secs, Timebase::NANOS);
        self.now.set(self.now.get() + step.ticks());
    }

    /// Sets the clock to an absolute reading.
    pub fn set(&self, now: HostTime) {
        self.now.set(now.ticks());
    }
}

impl Clock for ManualClock {
    fn now(&self) -> HostTime {
        HostTime(self.now.get())
    }
}

/// A calendar instant in microseconds since the Unix epoch.
///
/// This is the date/time value kind understood by the tweener, which
/// interpolates the epoch offset.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Returns the number of microseconds since the Unix epoch.
    #[inline]
    #[must_use]
    pub const fn micros(self) -> i64 {
        self.0
    }

    /// Builds a timestamp from whole seconds since the Unix epoch.
    #[inline]
    #[must_use]
    pub const fn from_unix_secs(secs: i64) -> Self {
        Self(secs * 1_000_000)
    }
}

impl From<SystemTime> for Timestamp {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "i64 microseconds span roughly 292k years around the epoch"
    )]
    fn from(time: SystemTime) -> Self {
        match time.duration_since(UNIX_EPOCH) {
            Ok(after) => Self(after.as_micros() as i64),
            Err(before) => Self(-(before.duration().as_micros() as i64)),
        }
    }
}

impl From<Timestamp> for SystemTime {
    fn from(ts: Timestamp) -> Self {
        let offset = std::time::Duration::from_micros(ts.0.unsigned_abs());
        if ts.0 >= 0 {
            UNIX_EPOCH + offset
        } else {
            UNIX_EPOCH - offset
        }
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({}us)", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nanos_round_trip_identity_timebase() {
        let tb = Timebase::NANOS;
        let t = HostTime(1_000_000_000);
        assert_eq!(t.to_nanos(tb), 1_000_000_000, "identity timebase");
        assert_eq!(HostTime::from_nanos(1_000_000_000, tb), t);
    }

    #[test]
    fn nanos_round_trip_coarse_timebase() {
        // 24 MHz counter: 125/3 nanoseconds per tick.
        let tb = Timebase::new(125, 3);
        let ticks = 24_000_000_u64;
        assert_eq!(HostTime(ticks).to_nanos(tb), 1_000_000_000, "24 MHz -> 1s");
        assert_eq!(HostTime::from_nanos(1_000_000_000, tb).ticks(), ticks);
    }

    #[test]
    fn duration_seconds_conversion() {
        let d = Duration::from_secs_f64(0.5, Timebase::NANOS);
        assert_eq!(d.ticks(), 500_000_000);
        assert!((d.as_secs_f64(Timebase::NANOS) - 0.5).abs() < 1e-12);
        assert_eq!(Duration::from_secs_f64(-1.0, Timebase::NANOS), Duration::ZERO);
        assert_eq!(Duration::from_secs_f64(f64::NAN, Timebase::NANOS), Duration::ZERO);
    }

    #[test]
    fn host_time_duration_ops() {
        let t = HostTime(1000);
        assert_eq!((t + Duration(200)).ticks(), 1200);
        assert_eq!(t - HostTime(400), Duration(600));
        assert_eq!(t.saturating_duration_since(HostTime(1500)), Duration::ZERO);
    }

    #[test]
    fn manual_clock_clones_share_reading() {
        let clock = ManualClock::new();
        let view = clock.clone();
        clock.advance_secs(0.25);
        assert_eq!(view.now(), HostTime(250_000_000));
    }

    #[test]
    fn timestamp_system_time_round_trip() {
        let ts = Timestamp::from_unix_secs(1_700_000_000);
        let st: SystemTime = ts.into();
        assert_eq!(Timestamp::from(st), ts);

        let before = Timestamp(-1_500_000);
        let st: SystemTime = before.into();
        assert_eq!(Timestamp::from(st), before);
    }
}
