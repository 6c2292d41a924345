// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Affine, BezPath, Point, Size};

use super::canvas::{Canvas, Color, Font, TextMeasure};
use crate::error::RenderError;
use crate::node::BitmapId;

/// One call received by a [`RecordingCanvas`].
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// [`Canvas::save`].
    Save,
    /// [`Canvas::restore`].
    Restore,
    /// [`Canvas::set_transform`].
    SetTransform(Affine),
    /// [`Canvas::fill`].
    Fill {
        /// Filled path.
        path: BezPath,
        /// Colour after opacity.
        color: Color,
    },
    /// [`Canvas::stroke`].
    Stroke {
        /// Stroked path.
        path: BezPath,
        /// Colour after opacity.
        color: Color,
        /// Line width.
        width: f64,
    },
    /// [`Canvas::clip`].
    Clip(BezPath),
    /// [`Canvas::paint`].
    Paint(Color),
    /// [`Canvas::draw_text`].
    Text {
        /// Text drawn.
        text: String,
        /// Top-left corner.
        origin: Point,
        /// Colour after opacity.
        color: Color,
    },
    /// [`Canvas::create_bitmap`].
    CreateBitmap {
        /// The new bitmap.
        bitmap: BitmapId,
        /// Width in device pixels.
        width: u32,
        /// Height in device pixels.
        height: u32,
    },
    /// [`Canvas::begin_bitmap`].
    BeginBitmap(BitmapId),
    /// [`Canvas::end_bitmap`].
    EndBitmap,
    /// [`Canvas::draw_bitmap`].
    DrawBitmap {
        /// The bitmap blitted.
        bitmap: BitmapId,
        /// Device-space top-left corner.
        origin: Point,
        /// Blit alpha.
        alpha: f32,
    },
    /// [`Canvas::release_bitmap`].
    ReleaseBitmap(BitmapId),
}

/// A headless [`Canvas`] that records every call.
///
/// Text is measured with a fixed advance of `0.6 × font.size` per character
/// and a line height of `font.size`. Bitmap creation and text drawing can be
/// made to fail to exercise error paths.
#[derive(Clone, Debug, Default)]
pub struct RecordingCanvas {
    commands: Vec<Command>,
    next_bitmap: u32,
    live_bitmaps: Vec<BitmapId>,
    rasterizations: usize,
    fail_bitmaps: bool,
    fail_text: bool,
}

impl RecordingCanvas {
    /// Creates an empty recording canvas.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every recorded command since the last [`clear`](Self::clear).
    #[must_use]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Forgets recorded commands. Counters and live bitmaps are kept.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Returns how many times drawing was redirected into a bitmap.
    #[must_use]
    pub fn rasterizations(&self) -> usize {
        self.rasterizations
    }

    /// Returns the number of bitmap blits recorded.
    #[must_use]
    pub fn blits(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, Command::DrawBitmap { .. }))
            .count()
    }

    /// Returns the bitmaps that were created and not yet released.
    #[must_use]
    pub fn live_bitmaps(&self) -> &[BitmapId] {
        &self.live_bitmaps
    }

    /// Makes [`create_bitmap`](Canvas::create_bitmap) fail.
    pub fn set_fail_bitmaps(&mut self, fail: bool) {
        self.fail_bitmaps = fail;
    }

    /// Makes [`draw_text`](Canvas::draw_text) fail.
    pub fn set_fail_text(&mut self, fail: bool) {
        self.fail_text = fail;
    }
}

impl TextMeasure for RecordingCanvas {
    fn measure_text(&self, text: &str, font: &Font) -> Size {
        Size::new(text.chars().count() as f64 * font.size * 0.6, font.size)
    }
}

impl Canvas for RecordingCanvas {
    fn save(&mut self) {
        self.commands.push(Command::Save);
    }

    fn restore(&mut self) {
        self.commands.push(Command::Restore);
    }

    fn set_transform(&mut self, transform: Affine) {
        self.commands.push(Command::SetTransform(transform));
    }

    fn fill(&mut self, path: &BezPath, color: Color) {
        self.commands.push(Command::Fill {
            path: path.clone(),
            color,
        });
    }

    fn stroke(&mut self, path: &BezPath, color: Color, width: f64) {
        self.commands.push(Command::Stroke {
            path: path.clone(),
            color,
            width,
        });
    }

    fn clip(&mut self, path: &BezPath) {
        self.commands.push(Command::Clip(path.clone()));
    }

    fn paint(&mut self, color: Color) {
        self.commands.push(Command::Paint(color));
    }

    fn draw_text(
        &mut self,
        text: &str,
        _font: &Font,
        origin: Point,
        color: Color,
    ) -> Result<(), RenderError> {
        if self.fail_text {
            return Err(RenderError::Text(format!("no font for {text:?}")));
        }
        self.commands.push(Command::Text {
            text: text.into(),
            origin,
            color,
        });
        Ok(())
    }

    fn create_bitmap(&mut self, width: u32, height: u32) -> Result<BitmapId, RenderError> {
        if self.fail_bitmaps {
            return Err(RenderError::SurfaceUnavailable { width, height });
        }
        let bitmap = BitmapId(self.next_bitmap);
        self.next_bitmap += 1;
        self.live_bitmaps.push(bitmap);
        self.commands.push(Command::CreateBitmap {
            bitmap,
            width,
            height,
        });
        Ok(bitmap)
    }

    fn begin_bitmap(&mut self, bitmap: BitmapId) {
        self.rasterizations += 1;
        self.commands.push(Command::BeginBitmap(bitmap));
    }

    fn end_bitmap(&mut self) {
        self.commands.push(Command::EndBitmap);
    }

    fn draw_bitmap(&mut self, bitmap: BitmapId, origin: Point, alpha: f32) {
        self.commands.push(Command::DrawBitmap {
            bitmap,
            origin,
            alpha,
        });
    }

    fn release_bitmap(&mut self, bitmap: BitmapId) {
        self.live_bitmaps.retain(|b| *b != bitmap);
        self.commands.push(Command::ReleaseBitmap(bitmap));
    }
}
