// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deferred drawing.
//!
//! A node describes its appearance as an [`InstructionList`]: a cairo-like
//! sequence of path construction and painting operations. The list is
//! compiled into [`Geometry`] (kurbo paths with resolved paint state), which
//! is replayed against a [`Canvas`] every frame and reused for hit-testing.
//!
//! [`RecordingCanvas`] is an in-memory canvas that records every call.

mod canvas;
mod geometry;
mod instructions;
mod recording;

pub use canvas::{Canvas, Color, Font, TextMeasure};
pub use geometry::{GeomOp, Geometry};
pub use instructions::{Instruction, InstructionList};
pub use recording::{Command, RecordingCanvas};
