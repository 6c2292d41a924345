// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Box-model layout.
//!
//! Layout negotiates sizes in two passes over the node tree:
//!
//! 1. **Measure** (bottom-up, memoised): a node's minimum size is
//!    `max(declared min, content + padding) + margin`, where the content size
//!    comes from the node's [`LayoutBehavior`]. Hidden nodes measure zero.
//! 2. **Arrange** (top-down): a behavior receives its node's content box and
//!    places each visible child with [`LayoutCx::place`], which writes the
//!    child's position and allocation and recurses into it.
//!
//! Any size-relevant write marks the node and its ancestors as needing a
//! resize. [`NodeStore::update_layout`] then re-runs both passes from every
//! pending *layout root*: a node with a behavior whose parent has none.
//!
//! Three behaviors are provided: [`BoxLayout`], [`TableLayout`] and
//! [`FixedLayout`].

mod boxes;
mod fixed;
mod table;

use core::fmt;

use kurbo::{Point, Rect, Size};

use crate::node::{INVALID, LayoutProps, NodeId, NodeStore};

pub use boxes::{BoxLayout, Orientation};
pub use fixed::FixedLayout;
pub use table::TableLayout;

/// A strategy for sizing and positioning a node's children.
pub trait LayoutBehavior: fmt::Debug {
    /// Returns the minimum content size of `node`, padding and margin
    /// excluded.
    fn measure(&self, cx: &mut LayoutCx<'_>, node: NodeId) -> Size;

    /// Places the children of `node` inside `content`, its content box in
    /// local coordinates.
    fn arrange(&self, cx: &mut LayoutCx<'_>, node: NodeId, content: Rect);

    /// Whether child positions are inputs of [`measure`](Self::measure), so
    /// that moving a child must invalidate the layout.
    fn tracks_child_positions(&self) -> bool {
        false
    }
}

/// Access to the node tree for a running [`LayoutBehavior`].
#[derive(Debug)]
pub struct LayoutCx<'a> {
    store: &'a mut NodeStore,
}

impl LayoutCx<'_> {
    /// Returns the visible children of `node` in insertion order.
    #[must_use]
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.store
            .children(node)
            .filter(|&c| self.store.visible[c.idx as usize])
            .collect()
    }

    /// Returns the minimum size of `child`, margin included.
    pub fn min_size(&mut self, child: NodeId) -> Size {
        if self.store.is_alive(child) {
            self.store.measure_slot(child.idx)
        } else {
            Size::ZERO
        }
    }

    /// Returns the size attributes of `child`.
    #[must_use]
    pub fn props(&self, child: NodeId) -> LayoutProps {
        self.store.layout_props(child).copied().unwrap_or_default()
    }

    /// Returns the position of `child` in its parent's space.
    #[must_use]
    pub fn position(&self, child: NodeId) -> Point {
        self.store.position(child).unwrap_or(Point::ORIGIN)
    }

    /// Places `child` in `area` (parent-local, margin included).
    ///
    /// On each axis the child takes the whole area minus its margin when the
    /// corresponding `fill` flag is set, otherwise its minimum size aligned
    /// by its `x_align` / `y_align`.
    pub fn place(&mut self, child: NodeId, area: Rect, fill_x: bool, fill_y: bool) {
        if !self.store.is_alive(child) {
            return;
        }
        let props = self.props(child);
        let min = self.min_size(child);
        let m = props.margin;
        let inner = Rect::new(
            area.x0 + m.left,
            area.y0 + m.top,
            (area.x1 - m.right).max(area.x0 + m.left),
            (area.y1 - m.bottom).max(area.y0 + m.top),
        );
        let natural = Size::new(
            (min.width - m.horizontal()).max(0.0),
            (min.height - m.vertical()).max(0.0),
        );
        let width = if fill_x {
            inner.width()
        } else {
            natural.width.min(inner.width())
        };
        let height = if fill_y {
            inner.height()
        } else {
            natural.height.min(inner.height())
        };
        let x = inner.x0 + (inner.width() - width) * props.x_align;
        let y = inner.y0 + (inner.height() - height) * props.y_align;
        self.store.move_slot(child.idx, Point::new(x, y));
        self.allocate(child, Size::new(width, height));
    }

    /// Gives `child` an allocation (border box) without moving it, and
    /// arranges its own children.
    pub fn allocate(&mut self, child: NodeId, size: Size) {
        if self.store.is_alive(child) {
            self.store.arrange_slot(child.idx, size);
        }
    }
}

/// Splits `extra` into `count` whole-pixel shares that sum exactly to
/// `extra`.
///
/// Each share is recomputed from what is left, so rounding never leaves a
/// leftover or overflow pixel.
pub(crate) fn distribute(extra: f64, count: usize) -> Vec<f64> {
    let mut shares = Vec::with_capacity(count);
    let mut remaining = extra.max(0.0);
    for assigned in 0..count {
        let left = count - assigned;
        let share = if left == 1 {
            remaining
        } else {
            (remaining / left as f64).floor()
        };
        shares.push(share);
        remaining -= share;
    }
    shares
}

impl NodeStore {
    /// Returns the minimum size of a node (margin included), measuring its
    /// subtree if needed.
    pub fn min_size(&mut self, id: NodeId) -> Option<Size> {
        let idx = self.check(id).ok()?;
        Some(self.measure_slot(idx))
    }

    /// Returns the size allocated to a node by the last layout pass, running
    /// pending layout first.
    ///
    /// `None` for a stale handle or a node no layout has reached.
    pub fn allocation(&mut self, id: NodeId) -> Option<Size> {
        let idx = self.check(id).ok()?;
        self.update_layout();
        self.allocation[idx as usize]
    }

    /// Returns `true` if a size-relevant write is waiting for a layout pass.
    #[must_use]
    pub fn needs_layout(&self) -> bool {
        self.layout_dirty
    }

    /// Re-runs measure and arrange from every pending layout root.
    ///
    /// Roots are allocated their requested size, or their minimum size, and
    /// never less than the minimum. Returns `false` if nothing was pending.
    pub fn update_layout(&mut self) -> bool {
        if !self.layout_dirty {
            return false;
        }
        let roots: Vec<u32> = (0..self.len)
            .filter(|&idx| {
                let i = idx as usize;
                let p = self.parent[i];
                self.alive[i]
                    && self.layout_pending[i]
                    && self.behavior[i].is_some()
                    && (p == INVALID || self.behavior[p as usize].is_none())
            })
            .collect();
        for idx in roots {
            let i = idx as usize;
            let min = self.measure_slot(idx);
            let props = self.layout[i];
            let border_min = Size::new(
                (min.width - props.margin.horizontal()).max(0.0),
                (min.height - props.margin.vertical()).max(0.0),
            );
            let requested = props.requested.unwrap_or(border_min);
            let size = Size::new(
                requested.width.max(border_min.width),
                requested.height.max(border_min.height),
            );
            log::debug!("layout root {:?} allocated {size:?}", self.handle(idx));
            self.arrange_slot(idx, size);
        }
        self.layout_pending.iter_mut().for_each(|p| *p = false);
        self.layout_dirty = false;
        true
    }

    /// Measures slot `idx`, returning its margin-inclusive minimum size.
    pub(crate) fn measure_slot(&mut self, idx: u32) -> Size {
        let i = idx as usize;
        if !self.visible[i] {
            return Size::ZERO;
        }
        if let Some(size) = self.min_size[i] {
            return size;
        }
        let content = match self.behavior[i].take() {
            Some(behavior) => {
                let node = self.handle(idx);
                let size = behavior.measure(&mut LayoutCx { store: self }, node);
                self.behavior[i] = Some(behavior);
                size
            }
            None => Size::ZERO,
        };
        let props = self.layout[i];
        let size = Size::new(
            props
                .min_width
                .max(content.width + props.padding.horizontal())
                + props.margin.horizontal(),
            props
                .min_height
                .max(content.height + props.padding.vertical())
                + props.margin.vertical(),
        );
        self.min_size[i] = Some(size);
        size
    }

    /// Records the allocation of slot `idx` and arranges its children.
    pub(crate) fn arrange_slot(&mut self, idx: u32, size: Size) {
        let i = idx as usize;
        self.allocation[i] = Some(size);
        let Some(behavior) = self.behavior[i].take() else {
            return;
        };
        let pad = self.layout[i].padding;
        let content = Rect::new(
            pad.left,
            pad.top,
            (size.width - pad.right).max(pad.left),
            (size.height - pad.bottom).max(pad.top),
        );
        let node = self.handle(idx);
        behavior.arrange(&mut LayoutCx { store: self }, node, content);
        self.behavior[i] = Some(behavior);
    }

    /// Moves slot `idx` without invalidating layout.
    fn move_slot(&mut self, idx: u32, position: Point) {
        let mut t = self.transform[idx as usize];
        if t.x != position.x || t.y != position.y {
            t.x = position.x;
            t.y = position.y;
            self.write_transform(idx, t);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Insets;

    #[test]
    fn distribute_is_exact() {
        let shares = distribute(10.0, 3);
        assert_eq!(shares, vec![3.0, 3.0, 4.0]);
        assert_eq!(distribute(0.0, 2), vec![0.0, 0.0]);
        assert!(distribute(5.0, 0).is_empty());
        let shares = distribute(101.5, 4);
        assert_eq!(shares.iter().sum::<f64>(), 101.5);
    }

    #[test]
    fn leaf_min_size_adds_padding_and_margin() {
        let mut store = NodeStore::new();
        let n = store.create_node();
        store.set_min_size(n, Size::new(10.0, 4.0)).unwrap();
        store.set_padding(n, Insets::uniform(3.0)).unwrap();
        store.set_margin(n, Insets::uniform(1.0)).unwrap();
        // max(10, 0 + 6) + 2 by max(4, 0 + 6) + 2
        assert_eq!(store.min_size(n), Some(Size::new(12.0, 8.0)));
    }

    #[test]
    fn hidden_nodes_measure_zero() {
        let mut store = NodeStore::new();
        let n = store.create_node();
        store.set_min_size(n, Size::new(10.0, 10.0)).unwrap();
        store.set_visible(n, false).unwrap();
        assert_eq!(store.min_size(n), Some(Size::ZERO));
        store.set_visible(n, true).unwrap();
        assert_eq!(store.min_size(n), Some(Size::new(10.0, 10.0)));
    }

    #[test]
    fn layout_is_lazy() {
        let mut store = NodeStore::new();
        let root = store.create_node();
        store
            .set_layout(root, Some(Box::new(BoxLayout::horizontal(0.0))))
            .unwrap();
        assert!(store.needs_layout());
        assert!(store.update_layout());
        assert!(!store.needs_layout());
        assert!(!store.update_layout(), "nothing pending");

        store.set_padding(root, Insets::uniform(2.0)).unwrap();
        assert!(store.needs_layout());
        assert_eq!(store.allocation(root), Some(Size::new(4.0, 4.0)));
        assert!(!store.needs_layout(), "size queries run the pending pass");
    }

    #[test]
    fn requested_size_never_below_minimum() {
        let mut store = NodeStore::new();
        let root = store.create_node();
        store
            .set_layout(root, Some(Box::new(BoxLayout::vertical(0.0))))
            .unwrap();
        store.set_min_size(root, Size::new(50.0, 50.0)).unwrap();
        store
            .set_requested_size(root, Some(Size::new(20.0, 80.0)))
            .unwrap();
        assert_eq!(store.allocation(root), Some(Size::new(50.0, 80.0)));
    }
}
