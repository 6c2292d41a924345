// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Single-axis packing.

use kurbo::{Rect, Size, Vec2};

use super::{LayoutBehavior, LayoutCx, distribute};
use crate::node::NodeId;

/// The packing axis of a [`BoxLayout`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Children are packed left to right.
    Horizontal,
    /// Children are packed top to bottom.
    Vertical,
}

impl Orientation {
    fn main(self, size: Size) -> f64 {
        match self {
            Self::Horizontal => size.width,
            Self::Vertical => size.height,
        }
    }

    fn cross(self, size: Size) -> f64 {
        match self {
            Self::Horizontal => size.height,
            Self::Vertical => size.width,
        }
    }

    fn size(self, main: f64, cross: f64) -> Size {
        match self {
            Self::Horizontal => Size::new(main, cross),
            Self::Vertical => Size::new(cross, main),
        }
    }
}

/// Packs children along one axis.
///
/// On the packing axis every child gets its minimum size; leftover space is
/// split between children with `expand` set. On the cross axis children
/// either fill the content box or are aligned in it.
///
/// `spacing` is inserted between consecutive visible children that expand
/// or have a nonzero minimum extent on the packing axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxLayout {
    /// Packing axis.
    pub orientation: Orientation,
    /// Gap between children.
    pub spacing: f64,
}

impl BoxLayout {
    /// Creates a box with the given axis and spacing.
    #[must_use]
    pub const fn new(orientation: Orientation, spacing: f64) -> Self {
        Self {
            orientation,
            spacing,
        }
    }

    /// A left-to-right box.
    #[must_use]
    pub const fn horizontal(spacing: f64) -> Self {
        Self::new(Orientation::Horizontal, spacing)
    }

    /// A top-to-bottom box.
    #[must_use]
    pub const fn vertical(spacing: f64) -> Self {
        Self::new(Orientation::Vertical, spacing)
    }

    /// Returns each visible child with its minimum size and whether it takes
    /// part in spacing.
    fn entries(&self, cx: &mut LayoutCx<'_>, node: NodeId) -> Vec<Entry> {
        cx.children(node)
            .into_iter()
            .map(|child| {
                let min = cx.min_size(child);
                let expand = cx.props(child).expand;
                Entry {
                    child,
                    min,
                    expand,
                    spaced: expand || self.orientation.main(min) > 0.0,
                }
            })
            .collect()
    }

    fn total_spacing(&self, entries: &[Entry]) -> f64 {
        let spaced = entries.iter().filter(|e| e.spaced).count();
        self.spacing * spaced.saturating_sub(1) as f64
    }
}

#[derive(Debug)]
struct Entry {
    child: NodeId,
    min: Size,
    expand: bool,
    spaced: bool,
}

impl LayoutBehavior for BoxLayout {
    fn measure(&self, cx: &mut LayoutCx<'_>, node: NodeId) -> Size {
        let o = self.orientation;
        let entries = self.entries(cx, node);
        let main: f64 = entries.iter().map(|e| o.main(e.min)).sum();
        let cross = entries.iter().map(|e| o.cross(e.min)).fold(0.0, f64::max);
        o.size(main + self.total_spacing(&entries), cross)
    }

    fn arrange(&self, cx: &mut LayoutCx<'_>, node: NodeId, content: Rect) {
        let o = self.orientation;
        let entries = self.entries(cx, node);
        let available = o.main(content.size());
        let min_main: f64 = entries.iter().map(|e| o.main(e.min)).sum();
        let used = min_main + self.total_spacing(&entries);
        let expanders = entries.iter().filter(|e| e.expand).count();
        let mut shares = distribute(available - used, expanders).into_iter();

        let cross = o.cross(content.size());
        let mut remaining_spaced = entries.iter().filter(|e| e.spaced).count();
        let mut cursor = 0.0;
        for entry in &entries {
            let mut extent = o.main(entry.min);
            if entry.expand {
                extent += shares.next().unwrap_or(0.0);
            }
            let origin = match o {
                Orientation::Horizontal => content.origin() + Vec2::new(cursor, 0.0),
                Orientation::Vertical => content.origin() + Vec2::new(0.0, cursor),
            };
            let area = Rect::from_origin_size(origin, o.size(extent, cross));
            let fill = cx.props(entry.child).fill;
            cx.place(entry.child, area, fill, fill);

            cursor += extent;
            if entry.spaced {
                remaining_spaced -= 1;
                if remaining_spaced > 0 {
                    cursor += self.spacing;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Point;

    use super::*;
    use crate::node::{Insets, NodeStore};

    fn boxed(store: &mut NodeStore, layout: BoxLayout, width: f64, height: f64) -> NodeId {
        let root = store.create_node();
        store.set_layout(root, Some(Box::new(layout))).unwrap();
        store
            .set_requested_size(root, Some(Size::new(width, height)))
            .unwrap();
        root
    }

    fn child(store: &mut NodeStore, parent: NodeId, min: Size, expand: bool) -> NodeId {
        let n = store.create_node();
        store.set_min_size(n, min).unwrap();
        store.set_expand(n, expand).unwrap();
        store.add_child(parent, n).unwrap();
        n
    }

    #[test]
    fn expander_takes_leftover() {
        let mut store = NodeStore::new();
        let root = boxed(&mut store, BoxLayout::horizontal(10.0), 300.0, 40.0);
        let a = child(&mut store, root, Size::ZERO, true);
        let b = child(&mut store, root, Size::new(50.0, 0.0), false);

        assert_eq!(store.allocation(a), Some(Size::new(240.0, 40.0)));
        assert_eq!(store.allocation(b), Some(Size::new(50.0, 40.0)));
        assert_eq!(store.position(a), Some(Point::new(0.0, 0.0)));
        assert_eq!(store.position(b), Some(Point::new(250.0, 0.0)));
    }

    #[test]
    fn allocations_sum_exactly() {
        let mut store = NodeStore::new();
        let root = boxed(&mut store, BoxLayout::horizontal(0.0), 100.0, 10.0);
        let kids: Vec<_> = (0..3)
            .map(|_| child(&mut store, root, Size::ZERO, true))
            .collect();
        let widths: Vec<f64> = kids
            .iter()
            .map(|&k| store.allocation(k).map_or(0.0, |s| s.width))
            .collect();
        assert_eq!(widths, vec![33.0, 33.0, 34.0]);
        assert_eq!(widths.iter().sum::<f64>(), 100.0);
    }

    #[test]
    fn min_size_aggregates_children() {
        let mut store = NodeStore::new();
        let root = store.create_node();
        store
            .set_layout(root, Some(Box::new(BoxLayout::vertical(5.0))))
            .unwrap();
        store.set_padding(root, Insets::uniform(2.0)).unwrap();
        child(&mut store, root, Size::new(30.0, 10.0), false);
        child(&mut store, root, Size::new(20.0, 15.0), false);
        // Zero-size, non-expanding children take no spacing.
        child(&mut store, root, Size::ZERO, false);
        assert_eq!(store.min_size(root), Some(Size::new(34.0, 34.0)));
    }

    #[test]
    fn hidden_children_are_ignored() {
        let mut store = NodeStore::new();
        let root = store.create_node();
        store
            .set_layout(root, Some(Box::new(BoxLayout::horizontal(10.0))))
            .unwrap();
        child(&mut store, root, Size::new(30.0, 10.0), false);
        let hidden = child(&mut store, root, Size::new(20.0, 10.0), false);
        assert_eq!(store.min_size(root), Some(Size::new(60.0, 10.0)));
        store.set_visible(hidden, false).unwrap();
        assert_eq!(store.min_size(root), Some(Size::new(30.0, 10.0)));
    }

    #[test]
    fn cross_axis_alignment() {
        let mut store = NodeStore::new();
        let root = boxed(&mut store, BoxLayout::horizontal(0.0), 100.0, 100.0);
        let n = child(&mut store, root, Size::new(20.0, 20.0), false);
        store.set_fill(n, false).unwrap();
        store.set_align(n, 0.5, 1.0).unwrap();
        assert_eq!(store.allocation(n), Some(Size::new(20.0, 20.0)));
        assert_eq!(store.position(n), Some(Point::new(0.0, 80.0)));
    }

    #[test]
    fn margins_offset_children() {
        let mut store = NodeStore::new();
        let root = boxed(&mut store, BoxLayout::vertical(0.0), 50.0, 100.0);
        let n = child(&mut store, root, Size::new(10.0, 10.0), false);
        store.set_margin(n, Insets::uniform(5.0)).unwrap();
        assert_eq!(store.position(n), Some(Point::ORIGIN), "not laid out yet");
        assert_eq!(store.allocation(n), Some(Size::new(40.0, 10.0)));
        assert_eq!(store.position(n), Some(Point::new(5.0, 5.0)));
    }
}
