// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Timestamps
//! are converted to microseconds using a [`Timebase`].

use std::io::Write;

use tableau_core::time::{HostTime, Timebase};
use tableau_core::trace::{
    DispatchEvent, FrameSummary, FrameTickEvent, PhaseBeginEvent, PhaseEndEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    timebase: Timebase,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("timebase", &self.timebase)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr(timebase: Timebase) -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
            timebase,
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }

    /// Consumes the sink and returns its writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn ticks_to_us(&self, ticks: u64) -> f64 {
        self.timebase.ticks_to_nanos(ticks) as f64 / 1000.0
    }

    fn host_us(&self, t: HostTime) -> f64 {
        self.ticks_to_us(t.ticks())
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_frame_tick(&mut self, e: &FrameTickEvent) {
        let _ = writeln!(
            self.writer,
            "[tick] frame={} now={:.1}µs delta={:.1}µs",
            e.frame_index,
            self.host_us(e.now),
            self.ticks_to_us(e.delta_ticks),
        );
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:begin] frame={} {} at {:.1}µs",
            e.frame_index,
            e.phase.name(),
            self.host_us(e.timestamp),
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:end] frame={} {} at {:.1}µs",
            e.frame_index,
            e.phase.name(),
            self.host_us(e.timestamp),
        );
    }

    fn on_dispatch(&mut self, e: &DispatchEvent) {
        let _ = writeln!(
            self.writer,
            "[dispatch] frame={} {:?} target={:?} handlers={}",
            e.frame_index, e.kind, e.target, e.handlers,
        );
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        let _ = writeln!(
            self.writer,
            "[summary] frame={} tween={:.1}µs layout={:.1}µs render={:.1}µs \
             input={:.1}µs painted={} rasterized={} failed={} dispatched={}",
            s.frame_index,
            self.ticks_to_us(s.tween_ticks),
            self.ticks_to_us(s.layout_ticks),
            self.ticks_to_us(s.render_ticks),
            self.ticks_to_us(s.input_ticks),
            s.render.painted,
            s.render.rasterized,
            s.render.failed,
            s.dispatched,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tableau_core::trace::PhaseKind;

    #[test]
    fn pretty_print_tick() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new(), Timebase::NANOS);
        sink.on_frame_tick(&FrameTickEvent {
            frame_index: 1,
            now: HostTime(1_000_000),
            delta_ticks: 16_000_000,
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(output.contains("[tick]"), "got: {output}");
        assert!(output.contains("frame=1"), "got: {output}");
        assert!(output.contains("delta=16000.0µs"), "got: {output}");
    }

    #[test]
    fn phases_use_short_names() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new(), Timebase::NANOS);
        sink.on_phase_begin(&PhaseBeginEvent {
            frame_index: 3,
            phase: PhaseKind::Layout,
            timestamp: HostTime(2_000),
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(output, "[phase:begin] frame=3 layout at 2.0µs\n");
    }

    #[test]
    fn summary_reports_counters() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new(), Timebase::NANOS);
        let mut summary = FrameSummary {
            frame_index: 9,
            dispatched: 2,
            ..FrameSummary::default()
        };
        summary.render.painted = 5;
        sink.on_frame_summary(&summary);
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(output.contains("painted=5"), "got: {output}");
        assert!(output.contains("dispatched=2"), "got: {output}");
    }
}
