// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format export.
//!
//! [`ChromeTraceSink`] collects events as [Chrome Trace Event Format][format]
//! objects and writes them out as one JSON array, suitable for loading into
//! `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use tableau_core::time::Timebase;
use tableau_core::trace::{
    DispatchEvent, FrameSummary, FrameTickEvent, PhaseBeginEvent, PhaseEndEvent, TraceSink,
};

/// A [`TraceSink`] that buffers Chrome trace events in memory.
///
/// Phases become duration (`B`/`E`) pairs; ticks, dispatches and summaries
/// become instant events. Timestamps are converted to microseconds using the
/// provided [`Timebase`].
#[derive(Debug)]
pub struct ChromeTraceSink {
    timebase: Timebase,
    events: Vec<Value>,
}

impl ChromeTraceSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new(timebase: Timebase) -> Self {
        Self {
            timebase,
            events: Vec::new(),
        }
    }

    /// Returns the events collected so far.
    #[must_use]
    pub fn events(&self) -> &[Value] {
        &self.events
    }

    /// Discards the collected events.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Writes the collected events as a JSON array.
    pub fn write(&self, writer: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer_pretty(writer, &self.events)?;
        Ok(())
    }

    fn ticks_to_us(&self, ticks: u64) -> f64 {
        self.timebase.ticks_to_nanos(ticks) as f64 / 1000.0
    }
}

impl TraceSink for ChromeTraceSink {
    fn on_frame_tick(&mut self, e: &FrameTickEvent) {
        let ts = self.ticks_to_us(e.now.ticks());
        self.events.push(json!({
            "ph": "i",
            "name": "FrameTick",
            "cat": "Pacer",
            "ts": ts,
            "pid": 0,
            "tid": 0,
            "s": "g",
            "args": {
                "frame_index": e.frame_index,
                "delta_us": self.ticks_to_us(e.delta_ticks),
            }
        }));
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        let ts = self.ticks_to_us(e.timestamp.ticks());
        self.events.push(json!({
            "ph": "B",
            "name": format!("{:?}", e.phase),
            "cat": "Frame",
            "ts": ts,
            "pid": 0,
            "tid": 0,
            "args": {
                "frame_index": e.frame_index,
            }
        }));
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let ts = self.ticks_to_us(e.timestamp.ticks());
        self.events.push(json!({
            "ph": "E",
            "name": format!("{:?}", e.phase),
            "cat": "Frame",
            "ts": ts,
            "pid": 0,
            "tid": 0,
            "args": {
                "frame_index": e.frame_index,
            }
        }));
    }

    fn on_dispatch(&mut self, e: &DispatchEvent) {
        // Dispatch carries no timestamp; place it at the last recorded one.
        let ts = self
            .events
            .last()
            .and_then(|v| v["ts"].as_f64())
            .unwrap_or(0.0);
        self.events.push(json!({
            "ph": "i",
            "name": format!("{:?}", e.kind),
            "cat": "Input",
            "ts": ts,
            "pid": 0,
            "tid": 0,
            "s": "t",
            "args": {
                "frame_index": e.frame_index,
                "target": format!("{:?}", e.target),
                "handlers": e.handlers,
            }
        }));
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        let ts = self.ticks_to_us(s.now.ticks());
        self.events.push(json!({
            "ph": "i",
            "name": "FrameSummary",
            "cat": "Summary",
            "ts": ts,
            "pid": 0,
            "tid": 0,
            "s": "g",
            "args": {
                "frame_index": s.frame_index,
                "delta_us": self.ticks_to_us(s.delta_ticks),
                "tween_us": self.ticks_to_us(s.tween_ticks),
                "layout_us": self.ticks_to_us(s.layout_ticks),
                "render_us": self.ticks_to_us(s.render_ticks),
                "input_us": self.ticks_to_us(s.input_ticks),
                "painted": s.render.painted,
                "rasterized": s.render.rasterized,
                "blitted": s.render.blitted,
                "failed": s.render.failed,
                "dispatched": s.dispatched,
            }
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tableau_core::time::HostTime;
    use tableau_core::trace::PhaseKind;

    #[test]
    fn export_produces_valid_json() {
        let mut sink = ChromeTraceSink::new(Timebase::NANOS);
        sink.on_frame_tick(&FrameTickEvent {
            frame_index: 0,
            now: HostTime(1_000_000),
            delta_ticks: 0,
        });
        sink.on_phase_begin(&PhaseBeginEvent {
            frame_index: 0,
            phase: PhaseKind::Tween,
            timestamp: HostTime(1_000_000),
        });
        sink.on_phase_end(&PhaseEndEvent {
            frame_index: 0,
            phase: PhaseKind::Tween,
            timestamp: HostTime(1_000_100),
        });

        let mut out = Vec::new();
        sink.write(&mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), 3);

        assert_eq!(parsed[0]["ph"], "i");
        assert_eq!(parsed[0]["name"], "FrameTick");
        assert_eq!(parsed[0]["ts"], 1000.0);

        assert_eq!(parsed[1]["ph"], "B");
        assert_eq!(parsed[1]["name"], "Tween");

        assert_eq!(parsed[2]["ph"], "E");
        assert_eq!(parsed[2]["name"], "Tween");
        assert_eq!(parsed[2]["ts"], 1000.1);
    }

    #[test]
    fn export_empty_trace() {
        let sink = ChromeTraceSink::new(Timebase::NANOS);
        let mut out = Vec::new();
        sink.write(&mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&String::from_utf8(out).unwrap()).unwrap();
        assert!(parsed.is_empty(), "nothing was recorded");
    }
}
