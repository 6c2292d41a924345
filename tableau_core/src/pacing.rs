// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame pacing with a frame-rate cap and redraw coalescing.
//!
//! The [`FramePacer`] decides when the scene runs a frame. It holds at most
//! one pending frame: any number of [`request_frame`](FramePacer::request_frame)
//! calls between two frames schedule a single one. While *continuous* (for
//! example while tweens are running) a frame is due on every interval
//! without being requested.
//!
//! [`poll`](FramePacer::poll) hands out a [`FrameTick`] once the minimum
//! interval since the previous frame has elapsed. The tick's `delta` is the
//! wall-clock time the frame should advance animations by, clamped to
//! [`PacerConfig::max_delta_secs`] so that a stalled host does not make
//! tweens jump.

use crate::time::{Duration, HostTime, Timebase};

/// Configuration for the [`FramePacer`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PacerConfig {
    /// Frame-rate cap. Zero or less disables the cap.
    pub max_fps: f64,
    /// Upper bound on the delta reported by a single tick, in seconds.
    pub max_delta_secs: f64,
    /// EMA smoothing factor for frame cost estimation (0.0–1.0).
    /// Smaller values = more smoothing.
    pub cost_alpha: f32,
}

impl PacerConfig {
    /// 60 fps with short deltas, for pointer-driven scenes.
    #[must_use]
    pub const fn interactive() -> Self {
        Self {
            max_fps: 60.0,
            max_delta_secs: 0.1,
            cost_alpha: 0.2,
        }
    }

    /// 30 fps with tolerant deltas, for battery-powered hosts.
    #[must_use]
    pub const fn low_power() -> Self {
        Self {
            max_fps: 30.0,
            max_delta_secs: 0.25,
            cost_alpha: 0.1,
        }
    }

    /// Returns the minimum time between two frames.
    #[must_use]
    pub fn min_interval(&self, timebase: Timebase) -> Duration {
        if self.max_fps > 0.0 {
            Duration::from_secs_f64(1.0 / self.max_fps, timebase)
        } else {
            Duration::ZERO
        }
    }
}

impl Default for PacerConfig {
    fn default() -> Self {
        Self::interactive()
    }
}

/// A frame handed out by [`FramePacer::poll`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameTick {
    /// Monotonic frame counter, starting at zero.
    pub frame_index: u64,
    /// Host time at which the frame was polled.
    pub now: HostTime,
    /// Time to advance animations by.
    pub delta: Duration,
}

/// Exponential moving average tracker.
#[derive(Clone, Copy, Debug)]
struct Ema {
    value: f32,
    alpha: f32,
    initialized: bool,
}

impl Ema {
    const fn new(alpha: f32) -> Self {
        Self {
            value: 0.0,
            alpha,
            initialized: false,
        }
    }

    fn update(&mut self, sample: f32) {
        if self.initialized {
            self.value = self.alpha * sample + (1.0 - self.alpha) * self.value;
        } else {
            self.value = sample;
            self.initialized = true;
        }
    }

    const fn get(&self) -> f32 {
        self.value
    }
}

/// Decides when frames run.
///
/// # Usage
///
/// ```rust,ignore
/// pacer.request_frame(now);
/// if let Some(tick) = pacer.poll(now) {
///     // ... advance by tick.delta, lay out, render ...
///     pacer.frame_done(tick.now, clock.now());
/// }
/// ```
#[derive(Debug)]
pub struct FramePacer {
    config: PacerConfig,
    timebase: Timebase,
    min_interval: Duration,
    max_delta: Duration,
    pending: bool,
    continuous: bool,
    /// Start of the current delta: the previous frame, or the request that
    /// woke the pacer from idle.
    anchor: Option<HostTime>,
    last_frame: Option<HostTime>,
    frame_index: u64,
    cost: Ema,
}

impl FramePacer {
    /// Creates an idle pacer for a clock ticking in `timebase`.
    #[must_use]
    pub fn new(config: PacerConfig, timebase: Timebase) -> Self {
        Self {
            min_interval: config.min_interval(timebase),
            max_delta: Duration::from_secs_f64(config.max_delta_secs, timebase),
            timebase,
            pending: false,
            continuous: false,
            anchor: None,
            last_frame: None,
            frame_index: 0,
            cost: Ema::new(config.cost_alpha),
            config,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &PacerConfig {
        &self.config
    }

    /// Returns the timebase of the ticks this pacer works in.
    #[must_use]
    pub fn timebase(&self) -> Timebase {
        self.timebase
    }

    /// Schedules a frame.
    ///
    /// Returns `false` if a frame was already pending, in which case the
    /// request is folded into it.
    pub fn request_frame(&mut self, now: HostTime) -> bool {
        if self.pending {
            return false;
        }
        if !self.continuous {
            // Waking from idle: time spent idle is not animation time.
            self.anchor = Some(now);
        }
        self.pending = true;
        true
    }

    /// Returns `true` if a frame has been requested and not yet handed out.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Makes every interval produce a frame, requested or not.
    pub fn set_continuous(&mut self, continuous: bool) {
        self.continuous = continuous;
    }

    /// Returns `true` if the pacer runs frames without requests.
    #[must_use]
    pub fn is_continuous(&self) -> bool {
        self.continuous
    }

    /// Returns the earliest time at which [`poll`](Self::poll) will produce a
    /// frame, or `None` while idle.
    #[must_use]
    pub fn next_due(&self) -> Option<HostTime> {
        if !self.pending && !self.continuous {
            return None;
        }
        Some(match self.last_frame {
            Some(last) => last + self.min_interval,
            None => HostTime(0),
        })
    }

    /// Hands out a frame if one is wanted and the frame-rate cap allows it.
    pub fn poll(&mut self, now: HostTime) -> Option<FrameTick> {
        if now < self.next_due()? {
            return None;
        }
        let delta = self
            .anchor
            .map_or(Duration::ZERO, |a| now.saturating_duration_since(a));
        let delta = Duration(delta.ticks().min(self.max_delta.ticks()));
        let tick = FrameTick {
            frame_index: self.frame_index,
            now,
            delta,
        };
        self.frame_index += 1;
        self.pending = false;
        self.anchor = Some(now);
        self.last_frame = Some(now);
        Some(tick)
    }

    /// Reports how long the frame that started at `started` took.
    pub fn frame_done(&mut self, started: HostTime, finished: HostTime) {
        let cost = finished.saturating_duration_since(started).ticks();
        self.cost.update(cost as f32);
    }

    /// Returns the smoothed cost of recent frames.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "EMA-smoothed frame cost in ticks fits in u64"
    )]
    pub fn frame_cost(&self) -> Duration {
        Duration(self.cost.get().max(0.0) as u64)
    }

    /// Returns the number of frames handed out so far.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: u64 = 1_000_000;

    fn pacer() -> FramePacer {
        FramePacer::new(PacerConfig::interactive(), Timebase::NANOS)
    }

    #[test]
    fn idle_pacer_produces_nothing() {
        let mut p = pacer();
        assert_eq!(p.next_due(), None);
        assert_eq!(p.poll(HostTime(100 * MS)), None);
    }

    #[test]
    fn requests_are_coalesced() {
        let mut p = pacer();
        assert!(p.request_frame(HostTime(0)));
        assert!(!p.request_frame(HostTime(MS)), "second request folds in");
        assert!(!p.request_frame(HostTime(2 * MS)));
        assert!(p.poll(HostTime(3 * MS)).is_some());
        assert_eq!(p.poll(HostTime(40 * MS)), None, "only one frame was pending");
    }

    #[test]
    fn frame_rate_is_capped() {
        let mut p = pacer();
        p.request_frame(HostTime(0));
        let first = p.poll(HostTime(0)).unwrap();
        assert_eq!(first.frame_index, 0);

        p.request_frame(HostTime(5 * MS));
        assert_eq!(p.poll(HostTime(10 * MS)), None, "inside 1/60 s");
        let second = p.poll(HostTime(17 * MS)).unwrap();
        assert_eq!(second.frame_index, 1);
        assert_eq!(second.delta, Duration(12 * MS), "measured from the request");
    }

    #[test]
    fn continuous_frames_measure_from_the_previous_frame() {
        let mut p = pacer();
        p.set_continuous(true);
        p.poll(HostTime(0)).unwrap();
        let tick = p.poll(HostTime(20 * MS)).unwrap();
        assert_eq!(tick.delta, Duration(20 * MS));
        assert_eq!(p.next_due(), Some(HostTime(20 * MS + 16_666_667)));
    }

    #[test]
    fn delta_is_clamped() {
        let mut p = pacer();
        p.set_continuous(true);
        p.poll(HostTime(0)).unwrap();
        let tick = p.poll(HostTime(5_000 * MS)).unwrap();
        assert_eq!(tick.delta, Duration(100 * MS));
    }

    #[test]
    fn uncapped_pacer_runs_back_to_back() {
        let config = PacerConfig {
            max_fps: 0.0,
            ..PacerConfig::interactive()
        };
        let mut p = FramePacer::new(config, Timebase::NANOS);
        p.request_frame(HostTime(0));
        assert!(p.poll(HostTime(0)).is_some());
        p.request_frame(HostTime(0));
        assert!(p.poll(HostTime(0)).is_some(), "no interval without a cap");
    }

    #[test]
    fn frame_cost_is_smoothed() {
        let mut p = pacer();
        assert_eq!(p.frame_cost(), Duration::ZERO);
        p.frame_done(HostTime(0), HostTime(4 * MS));
        assert_eq!(p.frame_cost(), Duration(4 * MS), "first sample initializes");
        p.frame_done(HostTime(0), HostTime(14 * MS));
        let cost = p.frame_cost().ticks();
        assert!(cost > 4 * MS && cost < 14 * MS, "cost = {cost}");
    }
}
