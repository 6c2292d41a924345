// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene graph, tweening and box layout for interactive 2D scenes.
//!
//! `tableau_core` manages a tree of drawable nodes stored as struct-of-arrays
//! with generational handles. Each node carries a local transform, opacity,
//! visibility, z-order, a recorded list of drawing instructions and optional
//! layout behavior. World matrices, effective opacities, sizes and paint
//! order are derived lazily through multi-channel dirty tracking.
//!
//! # Architecture
//!
//! ```text
//!   InputEvent ──► Scene (queue)
//!                    │
//!   Clock ──► FramePacer::poll() ──► FrameTick
//!                    │
//!                    ▼
//!   Tweener::update() ──► NodeStore::update_layout()
//!                    │
//!                    ▼
//!   NodeStore::evaluate() ──► NodeStore::render(&mut dyn Canvas)
//!                    │
//!                    ▼
//!   hit-test ──► SceneEvent ──► node handlers
//! ```
//!
//! **[`node`]**: Struct-of-arrays node tree. Transform, opacity, visibility,
//! z-order, flags, instructions and layout properties are set by the caller;
//! world matrices, effective opacities and geometry are computed on demand.
//! Nodes are animatable by attribute name.
//!
//! **[`dirty`]**: Channel constants over `understory_dirty`. TRANSFORM and
//! OPACITY propagate to descendants; CONTENT is local; TOPOLOGY triggers a
//! paint-order rebuild.
//!
//! **[`draw`]**: Drawing instructions, the [`Canvas`](draw::Canvas)
//! capability, compiled geometry for hit-testing and a recording canvas for
//! headless use.
//!
//! **[`tween`]**: Easing functions, tweenable values and the
//! [`Tweener`](tween::Tweener) registry.
//!
//! **[`layout`]**: Box, table and fixed layout strategies with a two-pass
//! measure and arrange solver.
//!
//! **[`pacing`]**: Frame-rate cap and redraw coalescing.
//!
//! **[`event`]**: Raw input and the closed set of scene events.
//!
//! **[`scene`]**: The frame loop tying the above together, with handler
//! dispatch.
//!
//! **[`time`]**: Host tick types and clocks.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! frame-loop instrumentation, with a zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Example
//!
//! ```
//! use kurbo::Rect;
//! use tableau_core::draw::{Color, InstructionList, RecordingCanvas};
//! use tableau_core::scene::{Scene, SceneConfig};
//! use tableau_core::tween::Value;
//!
//! let mut scene = Scene::new(SceneConfig::default());
//! let node = scene.create_node();
//! let mut list = InstructionList::new();
//! list.fill_rect(Rect::new(0.0, 0.0, 20.0, 20.0), Color::new(1.0, 0.0, 0.0, 1.0));
//! scene.nodes_mut().set_instructions(node, list).unwrap();
//! scene.add_child(scene.root(), node).unwrap();
//!
//! let options = scene.tween(0.25);
//! let _ = scene.animate(node, [("x", Value::Number(100.0))], options);
//! scene.advance(0.25);
//! assert_eq!(scene.nodes().position(node).unwrap().x, 100.0);
//!
//! let mut canvas = RecordingCanvas::new();
//! let stats = scene.render(&mut canvas);
//! assert_eq!(stats.painted, 1);
//! ```
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod dirty;
pub mod draw;
pub mod error;
pub mod event;
pub mod layout;
pub mod node;
pub mod pacing;
pub mod scene;
pub mod time;
pub mod trace;
pub mod tween;
