// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Affine, BezPath, Point, Size};

use crate::error::RenderError;
use crate::node::BitmapId;

/// Non-premultiplied sRGB colour with alpha.
pub type Color = palette::Srgba;

/// A font description passed through to the canvas.
///
/// Font selection and shaping belong to the platform; the scene graph only
/// carries the description and asks a [`TextMeasure`] for extents.
#[derive(Clone, Debug, PartialEq)]
pub struct Font {
    /// Family name, e.g. `"Sans"`.
    pub family: String,
    /// Size in scene units.
    pub size: f64,
}

impl Font {
    /// Creates a font description.
    #[must_use]
    pub fn new(family: impl Into<String>, size: f64) -> Self {
        Self {
            family: family.into(),
            size,
        }
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::new("Sans", 12.0)
    }
}

/// Text extents provider.
pub trait TextMeasure {
    /// Returns the width and height of `text` set in `font`.
    fn measure_text(&self, text: &str, font: &Font) -> Size;
}

/// A rendering surface.
///
/// The renderer sets an absolute transform before every node and brackets
/// each node with [`save`](Self::save) / [`restore`](Self::restore), so clips
/// applied by a node reach its descendants and nothing else.
///
/// Offscreen bitmaps are created with [`create_bitmap`](Self::create_bitmap)
/// and drawn into between [`begin_bitmap`](Self::begin_bitmap) and
/// [`end_bitmap`](Self::end_bitmap). Inside that bracket the canvas starts
/// from an identity transform with no clip, and every call targets the
/// bitmap. [`draw_bitmap`](Self::draw_bitmap) blits in device space,
/// ignoring the current transform but honouring the current clip.
pub trait Canvas: TextMeasure {
    /// Pushes the transform and clip state.
    fn save(&mut self);

    /// Pops the state pushed by the matching [`save`](Self::save).
    fn restore(&mut self);

    /// Replaces the current transform (local to device).
    fn set_transform(&mut self, transform: Affine);

    /// Fills `path` with `color` using the non-zero winding rule.
    fn fill(&mut self, path: &BezPath, color: Color);

    /// Strokes `path` with `color` and the given line width.
    fn stroke(&mut self, path: &BezPath, color: Color, width: f64);

    /// Intersects the clip region with `path`.
    fn clip(&mut self, path: &BezPath);

    /// Fills the whole clip region with `color`.
    fn paint(&mut self, color: Color);

    /// Draws `text` with the top-left corner of its box at `origin`.
    fn draw_text(
        &mut self,
        text: &str,
        font: &Font,
        origin: Point,
        color: Color,
    ) -> Result<(), RenderError>;

    /// Allocates an offscreen bitmap of `width` × `height` device pixels.
    fn create_bitmap(&mut self, width: u32, height: u32) -> Result<BitmapId, RenderError>;

    /// Redirects drawing into `bitmap`.
    fn begin_bitmap(&mut self, bitmap: BitmapId);

    /// Ends the redirection started by [`begin_bitmap`](Self::begin_bitmap).
    fn end_bitmap(&mut self);

    /// Composites `bitmap` with its top-left corner at the device point
    /// `origin`, scaled by `alpha`.
    fn draw_bitmap(&mut self, bitmap: BitmapId, origin: Point, alpha: f32);

    /// Frees `bitmap`.
    fn release_bitmap(&mut self, bitmap: BitmapId);
}
