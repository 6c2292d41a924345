// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hit-testing.

use kurbo::Point;

use super::id::NodeId;
use super::store::NodeStore;
use crate::draw::{Geometry, TextMeasure};

impl NodeStore {
    /// Returns the topmost interactive node under the scene-space `point`,
    /// searching the tree rooted at `root`.
    ///
    /// Children are visited in reverse paint order before their parent.
    /// Hidden subtrees are skipped, and the clips a node leaves active after
    /// its instructions also constrain its descendants. Nodes whose
    /// instructions were never compiled are compiled with `measure`.
    pub fn node_at(
        &mut self,
        root: NodeId,
        point: Point,
        measure: &dyn TextMeasure,
    ) -> Option<NodeId> {
        let idx = self.check(root).ok()?;
        self.sync_world();
        self.hit_slot(idx, point, measure)
    }

    /// Compiles the geometry of slot `idx` if it is missing.
    pub(crate) fn ensure_geometry(&mut self, idx: u32, measure: &dyn TextMeasure) {
        let i = idx as usize;
        if self.geometry[i].is_none() {
            self.geometry[i] = Some(Geometry::compile(&self.instructions[i], measure));
        }
    }

    fn hit_slot(&mut self, idx: u32, point: Point, measure: &dyn TextMeasure) -> Option<NodeId> {
        let i = idx as usize;
        if !self.visible[i] {
            return None;
        }
        let world = self.world[i];
        if world.determinant().abs() < 1e-12 {
            return None;
        }
        let local = world.inverse() * point;
        self.ensure_geometry(idx, measure);

        let inside_clips = self.geometry[i]
            .as_ref()
            .is_none_or(|geometry| geometry.clip_contains(local));
        if !inside_clips {
            return None;
        }

        self.ensure_paint_order(idx);
        let order = self.paint_order[i].clone();
        for &child in order.iter().rev() {
            if let Some(hit) = self.hit_slot(child, point, measure) {
                return Some(hit);
            }
        }

        let hit = self.flags[i].interactive
            && self.geometry[i]
                .as_ref()
                .is_some_and(|geometry| geometry.hit(local));
        hit.then(|| self.handle(idx))
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Rect;

    use super::*;
    use crate::draw::{Color, Font, InstructionList, RecordingCanvas};
    use crate::node::NodeFlags;

    fn square(store: &mut NodeStore, size: f64) -> NodeId {
        let n = store.create_node();
        let mut list = InstructionList::new();
        list.fill_rect(Rect::new(0.0, 0.0, size, size), Color::new(1.0, 0.0, 0.0, 1.0));
        store.set_instructions(n, list).unwrap();
        store.set_flags(n, NodeFlags::INTERACTIVE).unwrap();
        n
    }

    #[test]
    fn hit_inside_and_outside() {
        let measure = RecordingCanvas::new();
        let mut store = NodeStore::new();
        let root = store.create_node();
        let n = square(&mut store, 10.0);
        store.add_child(root, n).unwrap();
        store.set_position(n, Point::new(100.0, 100.0)).unwrap();

        assert_eq!(store.node_at(root, Point::new(105.0, 105.0), &measure), Some(n));
        assert_eq!(store.node_at(root, Point::new(95.0, 105.0), &measure), None);
        assert_eq!(store.node_at(root, Point::new(100.5, 100.5), &measure), Some(n));
        assert_eq!(
            store.node_at(root, Point::new(99.0, 105.0), &measure),
            None,
            "one unit left of the node"
        );
        assert_eq!(
            store.node_at(root, Point::new(111.0, 105.0), &measure),
            None,
            "one unit right of the node"
        );
    }

    #[test]
    fn topmost_in_paint_order_wins() {
        let measure = RecordingCanvas::new();
        let mut store = NodeStore::new();
        let root = store.create_node();
        let a = square(&mut store, 10.0);
        let b = square(&mut store, 10.0);
        store.add_child(root, a).unwrap();
        store.add_child(root, b).unwrap();
        let p = Point::new(5.0, 5.0);
        assert_eq!(store.node_at(root, p, &measure), Some(b), "later sibling on top");

        store.set_z_order(a, 1).unwrap();
        assert_eq!(store.node_at(root, p, &measure), Some(a), "higher z on top");
    }

    #[test]
    fn hidden_and_non_interactive_nodes_are_skipped() {
        let measure = RecordingCanvas::new();
        let mut store = NodeStore::new();
        let root = store.create_node();
        let below = square(&mut store, 10.0);
        let above = square(&mut store, 10.0);
        store.add_child(root, below).unwrap();
        store.add_child(root, above).unwrap();
        let p = Point::new(5.0, 5.0);

        store.set_visible(above, false).unwrap();
        assert_eq!(store.node_at(root, p, &measure), Some(below));

        store.set_visible(above, true).unwrap();
        store.set_flags(above, NodeFlags::default()).unwrap();
        assert_eq!(store.node_at(root, p, &measure), Some(below), "decorations pass through");
    }

    #[test]
    fn ancestor_clip_limits_descendants() {
        let measure = RecordingCanvas::new();
        let mut store = NodeStore::new();
        let root = store.create_node();
        let clipper = store.create_node();
        let mut clip = InstructionList::new();
        clip.rectangle(Rect::new(0.0, 0.0, 20.0, 20.0)).clip();
        store.set_instructions(clipper, clip).unwrap();
        let big = square(&mut store, 100.0);
        store.add_child(root, clipper).unwrap();
        store.add_child(clipper, big).unwrap();

        assert_eq!(store.node_at(root, Point::new(10.0, 10.0), &measure), Some(big));
        assert_eq!(
            store.node_at(root, Point::new(50.0, 50.0), &measure),
            None,
            "outside the ancestor clip"
        );
    }

    #[test]
    fn stroke_and_text_hits() {
        let measure = RecordingCanvas::new();
        let mut store = NodeStore::new();
        let line = store.create_node();
        let mut list = InstructionList::new();
        list.set_line_width(4.0)
            .move_to((0.0, 0.0))
            .line_to((100.0, 0.0))
            .stroke();
        store.set_instructions(line, list).unwrap();
        store.set_flags(line, NodeFlags::INTERACTIVE).unwrap();
        assert_eq!(store.node_at(line, Point::new(50.0, 1.5), &measure), Some(line));
        assert_eq!(store.node_at(line, Point::new(50.0, 2.5), &measure), None);

        let label = store.create_node();
        let mut list = InstructionList::new();
        list.text("hello", Font::new("Sans", 10.0), (0.0, 20.0));
        store.set_instructions(label, list).unwrap();
        store.set_flags(label, NodeFlags::INTERACTIVE).unwrap();
        let bounds = store.geometry(label).map(Geometry::bounds);
        assert_eq!(bounds, None, "not compiled yet");
        assert_eq!(store.node_at(label, Point::new(10.0, 25.0), &measure), Some(label));
        assert!(store.geometry(label).is_some(), "compiled on demand");
    }
}
