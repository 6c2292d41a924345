// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Rect, Size};

use super::{LayoutBehavior, LayoutCx};
use crate::node::NodeId;

/// Leaves children where they are.
///
/// Each child is allocated its minimum size at its own position. The
/// content minimum covers the far edges of all visible children, so moving
/// a child invalidates the layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FixedLayout;

impl LayoutBehavior for FixedLayout {
    fn measure(&self, cx: &mut LayoutCx<'_>, node: NodeId) -> Size {
        let mut extent = Size::ZERO;
        for child in cx.children(node) {
            let pos = cx.position(child);
            let min = cx.min_size(child);
            extent.width = extent.width.max(pos.x + min.width);
            extent.height = extent.height.max(pos.y + min.height);
        }
        extent
    }

    fn arrange(&self, cx: &mut LayoutCx<'_>, node: NodeId, _content: Rect) {
        for child in cx.children(node) {
            let min = cx.min_size(child);
            let m = cx.props(child).margin;
            let size = Size::new(
                (min.width - m.horizontal()).max(0.0),
                (min.height - m.vertical()).max(0.0),
            );
            cx.allocate(child, size);
        }
    }

    fn tracks_child_positions(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Point;

    use super::*;
    use crate::node::NodeStore;

    #[test]
    fn extents_follow_child_positions() {
        let mut store = NodeStore::new();
        let root = store.create_node();
        store.set_layout(root, Some(Box::new(FixedLayout))).unwrap();
        let a = store.create_node();
        store.set_min_size(a, Size::new(10.0, 10.0)).unwrap();
        store.set_position(a, Point::new(30.0, 5.0)).unwrap();
        store.add_child(root, a).unwrap();

        assert_eq!(store.min_size(root), Some(Size::new(40.0, 15.0)));
        assert_eq!(store.allocation(a), Some(Size::new(10.0, 10.0)));
        assert_eq!(store.position(a), Some(Point::new(30.0, 5.0)), "not moved");

        store.set_position(a, Point::new(60.0, 5.0)).unwrap();
        assert!(store.needs_layout(), "moving a child resizes the parent");
        assert_eq!(store.allocation(root), Some(Size::new(70.0, 15.0)));
    }
}
