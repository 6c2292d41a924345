// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node property groups.

use kurbo::{Affine, Size, Vec2};

/// Local transform of a node relative to its parent.
///
/// The local matrix is `T(x, y) · T(pivot) · R(rotation) · S(scale) · T(-pivot)`:
/// rotation and scale happen around the pivot point, then the node is moved
/// to `(x, y)` in its parent's space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalTransform {
    /// Horizontal position in parent space.
    pub x: f64,
    /// Vertical position in parent space.
    pub y: f64,
    /// Rotation in radians, clockwise in a y-down space.
    pub rotation: f64,
    /// Horizontal scale factor.
    pub scale_x: f64,
    /// Vertical scale factor.
    pub scale_y: f64,
    /// Horizontal pivot, in local coordinates.
    pub pivot_x: f64,
    /// Vertical pivot, in local coordinates.
    pub pivot_y: f64,
}

impl LocalTransform {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        rotation: 0.0,
        scale_x: 1.0,
        scale_y: 1.0,
        pivot_x: 0.0,
        pivot_y: 0.0,
    };

    /// Returns the local matrix.
    #[must_use]
    pub fn matrix(&self) -> Affine {
        let pivot = Vec2::new(self.pivot_x, self.pivot_y);
        Affine::translate((self.x, self.y))
            * Affine::translate(pivot)
            * Affine::rotate(self.rotation)
            * Affine::scale_non_uniform(self.scale_x, self.scale_y)
            * Affine::translate(-pivot)
    }
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Interaction flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct NodeFlags {
    /// The node takes part in hit-testing and receives pointer events.
    pub interactive: bool,
    /// Pointer drags on the node produce drag events.
    pub draggable: bool,
    /// Pressing the node moves keyboard focus to it.
    pub focusable: bool,
}

impl NodeFlags {
    /// Flags for a node that receives pointer events only.
    pub const INTERACTIVE: Self = Self {
        interactive: true,
        draggable: false,
        focusable: false,
    };
}

/// How a node's drawing instructions reach the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CacheMode {
    /// Compiled paths are replayed against the world matrix every frame.
    #[default]
    Paths,
    /// Instructions are rasterised once into an offscreen bitmap that is
    /// blitted while only the translation changes.
    Bitmap,
}

/// Edge sizes for padding and margin.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Insets {
    /// Top edge.
    pub top: f64,
    /// Right edge.
    pub right: f64,
    /// Bottom edge.
    pub bottom: f64,
    /// Left edge.
    pub left: f64,
}

impl Insets {
    /// No insets.
    pub const ZERO: Self = Self::uniform(0.0);

    /// The same inset on every edge.
    #[must_use]
    pub const fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    /// Sum of left and right.
    #[must_use]
    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    /// Sum of top and bottom.
    #[must_use]
    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }

    /// Total size taken by the insets.
    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.horizontal(), self.vertical())
    }
}

/// Placement of a node inside a [`TableLayout`](crate::layout::TableLayout).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridCell {
    /// First column.
    pub col: usize,
    /// First row.
    pub row: usize,
    /// Number of columns spanned (at least 1).
    pub col_span: usize,
    /// Number of rows spanned (at least 1).
    pub row_span: usize,
}

impl GridCell {
    /// A single cell at `(col, row)`.
    #[must_use]
    pub const fn at(col: usize, row: usize) -> Self {
        Self {
            col,
            row,
            col_span: 1,
            row_span: 1,
        }
    }

    /// Returns the cell with the given spans (clamped to at least 1).
    #[must_use]
    pub fn span(mut self, col_span: usize, row_span: usize) -> Self {
        self.col_span = col_span.max(1);
        self.row_span = row_span.max(1);
        self
    }
}

/// Size-related attributes consumed by the layout solver.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutProps {
    /// Declared minimum width (border box).
    pub min_width: f64,
    /// Declared minimum height (border box).
    pub min_height: f64,
    /// Take a share of leftover space on the container's packing axis.
    pub expand: bool,
    /// Take the whole cross-axis size instead of aligning within it.
    pub fill: bool,
    /// Horizontal alignment within the allocated area, in `[0, 1]`.
    pub x_align: f64,
    /// Vertical alignment within the allocated area, in `[0, 1]`.
    pub y_align: f64,
    /// Space between the border box and the content.
    pub padding: Insets,
    /// Space around the border box.
    pub margin: Insets,
    /// Cell placement when the parent lays out as a table.
    pub cell: Option<GridCell>,
    /// Explicit allocation for a layout root.
    pub requested: Option<Size>,
}

impl Default for LayoutProps {
    fn default() -> Self {
        Self {
            min_width: 0.0,
            min_height: 0.0,
            expand: true,
            fill: true,
            x_align: 0.5,
            y_align: 0.5,
            padding: Insets::ZERO,
            margin: Insets::ZERO,
            cell: None,
            requested: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    fn close(a: Point, b: Point) -> bool {
        (a - b).hypot() < 1e-9
    }

    #[test]
    fn identity_matrix() {
        assert_eq!(LocalTransform::IDENTITY.matrix(), Affine::IDENTITY);
    }

    #[test]
    fn rotation_happens_around_pivot() {
        let t = LocalTransform {
            rotation: core::f64::consts::FRAC_PI_2,
            pivot_x: 10.0,
            pivot_y: 10.0,
            ..LocalTransform::IDENTITY
        };
        // The pivot itself stays put.
        assert!(close(t.matrix() * Point::new(10.0, 10.0), Point::new(10.0, 10.0)));
        // (20, 10) swings a quarter turn around (10, 10).
        assert!(close(t.matrix() * Point::new(20.0, 10.0), Point::new(10.0, 20.0)));
    }

    #[test]
    fn translation_applies_after_scale() {
        let t = LocalTransform {
            x: 5.0,
            y: 7.0,
            scale_x: 2.0,
            scale_y: 3.0,
            ..LocalTransform::IDENTITY
        };
        assert!(close(t.matrix() * Point::new(1.0, 1.0), Point::new(7.0, 10.0)));
    }

    #[test]
    fn insets_sum_edges() {
        let i = Insets {
            top: 1.0,
            right: 2.0,
            bottom: 3.0,
            left: 4.0,
        };
        assert_eq!(i.size(), Size::new(6.0, 4.0));
    }
}
