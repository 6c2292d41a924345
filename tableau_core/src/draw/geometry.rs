// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::f64::consts::TAU;

use kurbo::{BezPath, ParamCurveNearest, Point, Rect, Shape, Vec2};

use super::canvas::{Canvas, Color, Font, TextMeasure};
use super::instructions::{Instruction, InstructionList};
use crate::error::RenderError;

/// Flattening tolerance used when converting arcs to cubic segments.
const ARC_TOLERANCE: f64 = 0.1;

/// Accuracy passed to the nearest-point solver for stroke hit-testing.
const NEAREST_ACCURACY: f64 = 1e-6;

/// A compiled paint operation in node-local coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum GeomOp {
    /// Filled path.
    Fill {
        /// Path in local space.
        path: BezPath,
        /// Paint colour.
        color: Color,
    },
    /// Stroked path.
    Stroke {
        /// Path in local space.
        path: BezPath,
        /// Paint colour.
        color: Color,
        /// Line width.
        width: f64,
    },
    /// Clip applied to everything after it, including descendants.
    Clip {
        /// Clip path in local space.
        path: BezPath,
    },
    /// Paint of the whole clip region.
    Paint {
        /// Paint colour.
        color: Color,
    },
    /// Text run.
    Text {
        /// Text to draw.
        text: String,
        /// Font description.
        font: Font,
        /// Top-left corner of the text box.
        origin: Point,
        /// Paint colour.
        color: Color,
        /// Measured text box.
        bounds: Rect,
    },
}

/// The compiled form of an [`InstructionList`].
///
/// Geometry is built once per instruction change and shared by painting and
/// hit-testing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Geometry {
    ops: Vec<GeomOp>,
    bounds: Option<Rect>,
}

impl Geometry {
    /// Compiles `list`, measuring text with `measure`.
    #[must_use]
    pub fn compile(list: &InstructionList, measure: &dyn TextMeasure) -> Self {
        let mut builder = Builder::default();
        for op in list.ops() {
            builder.apply(op, measure);
        }
        Self {
            ops: builder.ops,
            bounds: builder.bounds,
        }
    }

    /// Returns the compiled operations in paint order.
    #[must_use]
    pub fn ops(&self) -> &[GeomOp] {
        &self.ops
    }

    /// Returns the local-space bounds of everything painted, or `None` when
    /// nothing is.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    /// Returns the clip paths, in order. All of them remain in effect for
    /// descendants.
    pub fn clips(&self) -> impl Iterator<Item = &BezPath> {
        self.ops.iter().filter_map(|op| match op {
            GeomOp::Clip { path } => Some(path),
            _ => None,
        })
    }

    /// Returns `true` if `point` lies inside every clip of this geometry.
    #[must_use]
    pub fn clip_contains(&self, point: Point) -> bool {
        self.clips().all(|clip| clip.contains(point))
    }

    /// Returns `true` if the local-space `point` hits a fill, a stroke or a
    /// text box that is not clipped away.
    ///
    /// [`GeomOp::Paint`] is not hittable.
    #[must_use]
    pub fn hit(&self, point: Point) -> bool {
        let mut inside_clip = true;
        for op in &self.ops {
            let hit = match op {
                GeomOp::Clip { path } => {
                    inside_clip = inside_clip && path.contains(point);
                    false
                }
                GeomOp::Fill { path, .. } => path.contains(point),
                GeomOp::Stroke { path, width, .. } => stroke_contains(path, point, width * 0.5),
                GeomOp::Text { bounds, .. } => bounds.contains(point),
                GeomOp::Paint { .. } => false,
            };
            if !inside_clip {
                return false;
            }
            if hit {
                return true;
            }
        }
        false
    }

    /// Replays the operations against `canvas`, whose transform must already
    /// map this geometry's local space to the device.
    ///
    /// Colours are scaled by `alpha`. A failing text run does not stop the
    /// remaining operations; the first error is returned at the end.
    pub fn replay(&self, canvas: &mut dyn Canvas, alpha: f32) -> Result<(), RenderError> {
        let mut first_error = None;
        for op in &self.ops {
            match op {
                GeomOp::Fill { path, color } => canvas.fill(path, fade(*color, alpha)),
                GeomOp::Stroke { path, color, width } => {
                    canvas.stroke(path, fade(*color, alpha), *width);
                }
                GeomOp::Clip { path } => canvas.clip(path),
                GeomOp::Paint { color } => canvas.paint(fade(*color, alpha)),
                GeomOp::Text {
                    text,
                    font,
                    origin,
                    color,
                    ..
                } => {
                    if let Err(err) = canvas.draw_text(text, font, *origin, fade(*color, alpha)) {
                        first_error.get_or_insert(err);
                    }
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

fn fade(mut color: Color, alpha: f32) -> Color {
    color.alpha *= alpha;
    color
}

fn stroke_contains(path: &BezPath, point: Point, half_width: f64) -> bool {
    let limit = half_width * half_width;
    path.segments()
        .any(|seg| seg.nearest(point, NEAREST_ACCURACY).distance_sq <= limit)
}

/// Cairo-style interpreter state.
#[derive(Debug)]
struct Builder {
    ops: Vec<GeomOp>,
    bounds: Option<Rect>,
    path: BezPath,
    current: Option<Point>,
    subpath_start: Point,
    color: Color,
    line_width: f64,
    clip_bounds: Option<Rect>,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            ops: Vec::new(),
            bounds: None,
            path: BezPath::new(),
            current: None,
            subpath_start: Point::ZERO,
            color: Color::new(0.0, 0.0, 0.0, 1.0),
            line_width: 1.0,
            clip_bounds: None,
        }
    }
}

impl Builder {
    fn apply(&mut self, op: &Instruction, measure: &dyn TextMeasure) {
        match op {
            Instruction::MoveTo(p) => self.move_to(*p),
            Instruction::LineTo(p) => {
                if self.current.is_some() {
                    self.path.line_to(*p);
                    self.current = Some(*p);
                } else {
                    self.move_to(*p);
                }
            }
            Instruction::CurveTo(c1, c2, p) => {
                if self.current.is_none() {
                    self.move_to(*c1);
                }
                self.path.curve_to(*c1, *c2, *p);
                self.current = Some(*p);
            }
            Instruction::Arc {
                center,
                radius,
                start_angle,
                end_angle,
            } => self.arc(*center, *radius, *start_angle, *end_angle),
            Instruction::Rectangle(rect) => {
                self.move_to(Point::new(rect.x0, rect.y0));
                self.path.line_to((rect.x1, rect.y0));
                self.path.line_to((rect.x1, rect.y1));
                self.path.line_to((rect.x0, rect.y1));
                self.path.close_path();
            }
            Instruction::ClosePath => {
                if self.current.is_some() {
                    self.path.close_path();
                    self.current = Some(self.subpath_start);
                }
            }
            Instruction::Clip => {
                let path = self.take_path();
                let bbox = path.bounding_box();
                self.clip_bounds = Some(match self.clip_bounds {
                    Some(clip) => clip.intersect(bbox),
                    None => bbox,
                });
                self.ops.push(GeomOp::Clip { path });
            }
            Instruction::Fill => {
                let path = self.take_path();
                if !path.is_empty() {
                    self.grow(path.bounding_box());
                    self.ops.push(GeomOp::Fill {
                        path,
                        color: self.color,
                    });
                }
            }
            Instruction::Stroke => {
                let path = self.take_path();
                if !path.is_empty() {
                    let half = self.line_width * 0.5;
                    self.grow(path.bounding_box().inflate(half, half));
                    self.ops.push(GeomOp::Stroke {
                        path,
                        color: self.color,
                        width: self.line_width,
                    });
                }
            }
            Instruction::SetColor(color) => self.color = *color,
            Instruction::SetLineWidth(width) => self.line_width = width.max(0.0),
            Instruction::Paint => {
                // Unclipped paint covers the whole surface and has no bounds.
                if let Some(clip) = self.clip_bounds {
                    self.grow_unclipped(clip);
                }
                self.ops.push(GeomOp::Paint { color: self.color });
            }
            Instruction::Text { text, font, origin } => {
                let bounds = Rect::from_origin_size(*origin, measure.measure_text(text, font));
                self.grow(bounds);
                self.ops.push(GeomOp::Text {
                    text: text.clone(),
                    font: font.clone(),
                    origin: *origin,
                    color: self.color,
                    bounds,
                });
            }
        }
    }

    fn move_to(&mut self, p: Point) {
        self.path.move_to(p);
        self.current = Some(p);
        self.subpath_start = p;
    }

    fn arc(&mut self, center: Point, radius: f64, start_angle: f64, end_angle: f64) {
        let mut sweep = end_angle - start_angle;
        if sweep < 0.0 {
            sweep += TAU * (-sweep / TAU).ceil();
        }
        let start = center + Vec2::from_angle(start_angle) * radius;
        match self.current {
            Some(current) if current != start => self.path.line_to(start),
            Some(_) => {}
            None => self.move_to(start),
        }
        let arc = kurbo::Arc {
            center,
            radii: Vec2::new(radius, radius),
            start_angle,
            sweep_angle: sweep,
            x_rotation: 0.0,
        };
        for el in arc.append_iter(ARC_TOLERANCE) {
            self.path.push(el);
        }
        self.current = Some(center + Vec2::from_angle(start_angle + sweep) * radius);
    }

    fn take_path(&mut self) -> BezPath {
        self.current = None;
        core::mem::take(&mut self.path)
    }

    fn grow(&mut self, rect: Rect) {
        let rect = match self.clip_bounds {
            Some(clip) => clip.intersect(rect),
            None => rect,
        };
        self.grow_unclipped(rect);
    }

    fn grow_unclipped(&mut self, rect: Rect) {
        if rect.width() <= 0.0 && rect.height() <= 0.0 {
            return;
        }
        self.bounds = Some(match self.bounds {
            Some(bounds) => bounds.union(rect),
            None => rect,
        });
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Size;

    use super::*;

    struct Fixed;

    impl TextMeasure for Fixed {
        fn measure_text(&self, text: &str, font: &Font) -> Size {
            Size::new(text.chars().count() as f64 * font.size * 0.5, font.size)
        }
    }

    fn red() -> Color {
        Color::new(1.0, 0.0, 0.0, 1.0)
    }

    #[test]
    fn fill_consumes_current_path() {
        let mut list = InstructionList::new();
        list.rectangle(Rect::new(0.0, 0.0, 10.0, 10.0))
            .fill()
            .fill();
        let geom = Geometry::compile(&list, &Fixed);
        assert_eq!(geom.ops().len(), 1, "second fill has no path");
        assert_eq!(geom.bounds(), Some(Rect::new(0.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn colour_state_applies_to_later_paints() {
        let mut list = InstructionList::new();
        list.rectangle(Rect::new(0.0, 0.0, 1.0, 1.0))
            .fill()
            .set_color(red())
            .rectangle(Rect::new(0.0, 0.0, 1.0, 1.0))
            .fill();
        let geom = Geometry::compile(&list, &Fixed);
        let colors: Vec<_> = geom
            .ops()
            .iter()
            .filter_map(|op| match op {
                GeomOp::Fill { color, .. } => Some(*color),
                _ => None,
            })
            .collect();
        assert_eq!(colors, vec![Color::new(0.0, 0.0, 0.0, 1.0), red()]);
    }

    #[test]
    fn fill_hit_inside_and_outside() {
        let mut list = InstructionList::new();
        list.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), red());
        let geom = Geometry::compile(&list, &Fixed);
        assert!(geom.hit(Point::new(5.0, 5.0)));
        assert!(!geom.hit(Point::new(11.0, 5.0)));
    }

    #[test]
    fn stroke_hit_within_half_width() {
        let mut list = InstructionList::new();
        list.set_line_width(4.0)
            .move_to((0.0, 0.0))
            .line_to((100.0, 0.0))
            .stroke();
        let geom = Geometry::compile(&list, &Fixed);
        assert!(geom.hit(Point::new(50.0, 1.9)), "inside half width");
        assert!(!geom.hit(Point::new(50.0, 2.5)), "outside half width");
        assert_eq!(geom.bounds(), Some(Rect::new(-2.0, -2.0, 102.0, 2.0)));
    }

    #[test]
    fn clip_restricts_hits_and_bounds() {
        let mut list = InstructionList::new();
        list.rectangle(Rect::new(0.0, 0.0, 5.0, 5.0))
            .clip()
            .fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), red());
        let geom = Geometry::compile(&list, &Fixed);
        assert!(geom.hit(Point::new(2.0, 2.0)));
        assert!(!geom.hit(Point::new(7.0, 7.0)), "clipped away");
        assert_eq!(geom.bounds(), Some(Rect::new(0.0, 0.0, 5.0, 5.0)));
        assert!(geom.clip_contains(Point::new(1.0, 1.0)));
        assert!(!geom.clip_contains(Point::new(6.0, 1.0)));
    }

    #[test]
    fn text_box_is_hittable() {
        let mut list = InstructionList::new();
        list.text("abcd", Font::new("Sans", 10.0), (10.0, 10.0));
        let geom = Geometry::compile(&list, &Fixed);
        assert_eq!(geom.bounds(), Some(Rect::new(10.0, 10.0, 30.0, 20.0)));
        assert!(geom.hit(Point::new(15.0, 15.0)));
        assert!(!geom.hit(Point::new(35.0, 15.0)));
    }

    #[test]
    fn paint_is_not_hittable() {
        let mut list = InstructionList::new();
        list.paint();
        let geom = Geometry::compile(&list, &Fixed);
        assert!(!geom.hit(Point::new(0.0, 0.0)));
        assert_eq!(geom.bounds(), None);
    }

    #[test]
    fn circle_contains_centre() {
        let mut list = InstructionList::new();
        list.circle((50.0, 50.0), 10.0).fill();
        let geom = Geometry::compile(&list, &Fixed);
        assert!(geom.hit(Point::new(50.0, 50.0)));
        assert!(geom.hit(Point::new(58.0, 50.0)));
        assert!(!geom.hit(Point::new(58.0, 58.0)), "outside the disc");
    }
}
