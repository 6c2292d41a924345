// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Point, Rect};

use super::canvas::{Color, Font};

/// A single deferred drawing operation.
///
/// Path operations build up a current path; [`Fill`](Self::Fill),
/// [`Stroke`](Self::Stroke) and [`Clip`](Self::Clip) consume it. Colour and
/// line width are state that applies to every following paint.
#[derive(Clone, Debug, PartialEq)]
pub enum Instruction {
    /// Starts a new subpath.
    MoveTo(Point),
    /// Straight segment from the current point.
    LineTo(Point),
    /// Cubic Bézier segment from the current point.
    CurveTo(Point, Point, Point),
    /// Circular arc from `start_angle` to `end_angle` (radians, clockwise in
    /// y-down space). Connected to the current point with a line, if any.
    Arc {
        /// Centre of the circle.
        center: Point,
        /// Radius of the circle.
        radius: f64,
        /// Angle of the first point.
        start_angle: f64,
        /// Angle of the last point.
        end_angle: f64,
    },
    /// Closed rectangular subpath.
    Rectangle(Rect),
    /// Closes the current subpath.
    ClosePath,
    /// Intersects the clip region with the current path, then clears it.
    Clip,
    /// Fills the current path with the current colour, then clears it.
    Fill,
    /// Strokes the current path with the current colour and line width,
    /// then clears it.
    Stroke,
    /// Sets the paint colour.
    SetColor(Color),
    /// Sets the stroke width.
    SetLineWidth(f64),
    /// Fills the whole clip region with the current colour.
    Paint,
    /// Draws a run of text with its top-left corner at `origin`.
    Text {
        /// Text to draw.
        text: String,
        /// Font description.
        font: Font,
        /// Top-left corner of the text box.
        origin: Point,
    },
}

/// An ordered list of [`Instruction`]s with a builder-style API.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InstructionList {
    ops: Vec<Instruction>,
}

impl InstructionList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded instructions.
    #[must_use]
    pub fn ops(&self) -> &[Instruction] {
        &self.ops
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Removes every instruction.
    pub fn clear(&mut self) {
        self.ops.clear();
    }

    /// Appends an instruction.
    pub fn push(&mut self, op: Instruction) -> &mut Self {
        self.ops.push(op);
        self
    }

    /// Starts a new subpath at `p`.
    pub fn move_to(&mut self, p: impl Into<Point>) -> &mut Self {
        self.push(Instruction::MoveTo(p.into()))
    }

    /// Adds a line to `p`.
    pub fn line_to(&mut self, p: impl Into<Point>) -> &mut Self {
        self.push(Instruction::LineTo(p.into()))
    }

    /// Adds a cubic Bézier segment.
    pub fn curve_to(
        &mut self,
        c1: impl Into<Point>,
        c2: impl Into<Point>,
        p: impl Into<Point>,
    ) -> &mut Self {
        self.push(Instruction::CurveTo(c1.into(), c2.into(), p.into()))
    }

    /// Adds a circular arc.
    pub fn arc(
        &mut self,
        center: impl Into<Point>,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    ) -> &mut Self {
        self.push(Instruction::Arc {
            center: center.into(),
            radius,
            start_angle,
            end_angle,
        })
    }

    /// Adds a full circle as its own subpath.
    pub fn circle(&mut self, center: impl Into<Point>, radius: f64) -> &mut Self {
        let center = center.into();
        self.move_to((center.x + radius, center.y))
            .arc(center, radius, 0.0, core::f64::consts::TAU)
            .close_path()
    }

    /// Adds a closed rectangle.
    pub fn rectangle(&mut self, rect: Rect) -> &mut Self {
        self.push(Instruction::Rectangle(rect))
    }

    /// Closes the current subpath.
    pub fn close_path(&mut self) -> &mut Self {
        self.push(Instruction::ClosePath)
    }

    /// Clips to the current path.
    pub fn clip(&mut self) -> &mut Self {
        self.push(Instruction::Clip)
    }

    /// Fills the current path.
    pub fn fill(&mut self) -> &mut Self {
        self.push(Instruction::Fill)
    }

    /// Strokes the current path.
    pub fn stroke(&mut self) -> &mut Self {
        self.push(Instruction::Stroke)
    }

    /// Sets the paint colour.
    pub fn set_color(&mut self, color: Color) -> &mut Self {
        self.push(Instruction::SetColor(color))
    }

    /// Sets the stroke width.
    pub fn set_line_width(&mut self, width: f64) -> &mut Self {
        self.push(Instruction::SetLineWidth(width))
    }

    /// Paints the clip region.
    pub fn paint(&mut self) -> &mut Self {
        self.push(Instruction::Paint)
    }

    /// Draws text.
    pub fn text(&mut self, text: impl Into<String>, font: Font, origin: impl Into<Point>) -> &mut Self {
        self.push(Instruction::Text {
            text: text.into(),
            font,
            origin: origin.into(),
        })
    }

    /// Fills `rect` with `color` in one call.
    pub fn fill_rect(&mut self, rect: Rect, color: Color) -> &mut Self {
        self.set_color(color).rectangle(rect).fill()
    }
}

impl FromIterator<Instruction> for InstructionList {
    fn from_iter<I: IntoIterator<Item = Instruction>>(iter: I) -> Self {
        Self {
            ops: iter.into_iter().collect(),
        }
    }
}

impl Extend<Instruction> for InstructionList {
    fn extend<I: IntoIterator<Item = Instruction>>(&mut self, iter: I) {
        self.ops.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_records_in_order() {
        let mut list = InstructionList::new();
        list.move_to((0.0, 0.0)).line_to((10.0, 0.0)).stroke();
        assert_eq!(
            list.ops(),
            &[
                Instruction::MoveTo(Point::ZERO),
                Instruction::LineTo(Point::new(10.0, 0.0)),
                Instruction::Stroke,
            ]
        );
    }

    #[test]
    fn fill_rect_expands_to_three_ops() {
        let mut list = InstructionList::new();
        list.fill_rect(Rect::new(0.0, 0.0, 4.0, 4.0), Color::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(list.ops().len(), 3, "set colour, rectangle, fill");
        list.clear();
        assert!(list.is_empty());
    }
}
