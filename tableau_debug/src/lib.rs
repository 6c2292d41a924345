// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing and Chrome trace export for tableau frame diagnostics.
//!
//! This crate provides [`TraceSink`](tableau_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`chrome::ChromeTraceSink`]: buffers Chrome Trace Event Format JSON for
//!   `chrome://tracing` or Perfetto.
//!
//! Pass either to [`Tracer::new`](tableau_core::trace::Tracer::new) and drive
//! the scene with [`Scene::tick_traced`](tableau_core::scene::Scene::tick_traced).

pub mod chrome;
pub mod pretty;

#[cfg(test)]
mod tests {
    use kurbo::Rect;
    use tableau_core::draw::{Color, InstructionList, RecordingCanvas};
    use tableau_core::event::{EventKind, InputEvent, Modifiers, PointerButton};
    use tableau_core::node::NodeFlags;
    use tableau_core::scene::{Scene, SceneConfig};
    use tableau_core::time::{Clock, HostTime, ManualClock};
    use tableau_core::trace::Tracer;

    use crate::chrome::ChromeTraceSink;

    #[test]
    fn traced_frame_emits_every_phase() {
        let clock = ManualClock::new();
        let mut scene = Scene::with_clock(SceneConfig::default(), clock.clone());
        let root = scene.root();
        let node = scene.create_node();
        let mut list = InstructionList::new();
        list.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), Color::new(0.0, 1.0, 0.0, 1.0));
        scene.nodes_mut().set_instructions(node, list).unwrap();
        scene.nodes_mut().set_flags(node, NodeFlags::INTERACTIVE).unwrap();
        scene.add_child(root, node).unwrap();
        scene
            .connect(node, EventKind::PointerDown, |_, _| {})
            .unwrap();
        scene.push_input(InputEvent::PointerDown {
            position: kurbo::Point::new(5.0, 5.0),
            button: PointerButton::Primary,
            modifiers: Modifiers::NONE,
            time: HostTime(0),
        });

        let mut sink = ChromeTraceSink::new(clock.timebase());
        let mut canvas = RecordingCanvas::new();
        let stats = scene
            .tick_traced(&mut canvas, &mut Tracer::new(&mut sink))
            .unwrap();
        assert_eq!(stats.dispatched, 1);

        let events = sink.events();
        let begins = events.iter().filter(|e| e["ph"] == "B").count();
        let ends = events.iter().filter(|e| e["ph"] == "E").count();
        assert_eq!((begins, ends), (4, 4), "tween, layout, render, input");
        assert_eq!(events[0]["name"], "FrameTick");
        assert!(
            events.iter().any(|e| e["name"] == "PointerDown"),
            "dispatch recorded"
        );
        let summary = events.last().unwrap();
        assert_eq!(summary["name"], "FrameSummary");
        assert_eq!(summary["args"]["painted"], 1);
    }
}
