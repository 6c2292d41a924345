// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Derived-state evaluation and change tracking.
//!
//! Evaluation follows a drain-recompute pattern for each dirty channel:
//!
//! 1. **TRANSFORM**: Drain dirty indices (with their dependents) and
//!    recompute each node's world matrix as `parent_world * local` in
//!    parent-before-child order.
//! 2. **OPACITY**: Drain and recompute `effective_opacity` as
//!    `parent_effective * own`.
//! 3. **CONTENT**: Drain. Geometry and bitmap caches were already
//!    invalidated by the setter; this only reports the change.
//! 4. **TOPOLOGY**: Drain and discard.
//!
//! World matrices are also synced lazily by queries such as
//! [`world_matrix`](NodeStore::world_matrix). Lazily synced indices are kept
//! and reported by the next [`evaluate`](NodeStore::evaluate).

use kurbo::{Affine, Point};

use super::id::{INVALID, NodeId};
use super::store::NodeStore;
use crate::dirty;

/// The set of changes produced by a single [`NodeStore::evaluate`] call.
///
/// Each field contains raw slot indices (see [`NodeId::index`]).
#[derive(Clone, Debug, Default)]
pub struct FrameChanges {
    /// Nodes whose world matrix was recomputed.
    pub transforms: Vec<u32>,
    /// Nodes whose effective opacity was recomputed.
    pub opacities: Vec<u32>,
    /// Nodes whose drawing instructions or cache mode changed.
    pub content: Vec<u32>,
    /// Nodes created since the last evaluate.
    pub added: Vec<u32>,
    /// Nodes destroyed since the last evaluate.
    pub removed: Vec<u32>,
    /// Whether the tree structure changed.
    pub topology_changed: bool,
}

impl FrameChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.transforms.clear();
        self.opacities.clear();
        self.content.clear();
        self.added.clear();
        self.removed.clear();
        self.topology_changed = false;
    }

    /// Returns `true` if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
            && self.opacities.is_empty()
            && self.content.is_empty()
            && self.added.is_empty()
            && self.removed.is_empty()
            && !self.topology_changed
    }
}

impl NodeStore {
    /// Brings world matrices and effective opacities up to date and returns
    /// everything that changed since the previous call.
    pub fn evaluate(&mut self) -> FrameChanges {
        let mut changes = FrameChanges::default();
        self.evaluate_into(&mut changes);
        changes
    }

    /// Like [`evaluate`](Self::evaluate), but reuses a caller-provided buffer.
    pub fn evaluate_into(&mut self, changes: &mut FrameChanges) {
        changes.clear();
        self.sync_world();

        let content: Vec<u32> = self
            .dirty
            .drain(dirty::CONTENT)
            .deterministic()
            .run()
            .collect();
        self.pending.content.extend(content);

        let topology: Vec<u32> = self
            .dirty
            .drain(dirty::TOPOLOGY)
            .deterministic()
            .run()
            .collect();
        if !topology.is_empty() {
            self.pending.topology_changed = true;
        }

        core::mem::swap(&mut self.pending, changes);
        // Slots destroyed after being marked are not worth reporting.
        let alive = &self.alive;
        changes.transforms.retain(|&i| alive[i as usize]);
        changes.opacities.retain(|&i| alive[i as usize]);
        changes.content.retain(|&i| alive[i as usize]);
    }

    /// Recomputes every dirty world matrix and effective opacity.
    pub(crate) fn sync_world(&mut self) {
        let transforms: Vec<u32> = self
            .dirty
            .drain(dirty::TRANSFORM)
            .affected()
            .deterministic()
            .run()
            .collect();
        for &idx in &transforms {
            let p = self.parent[idx as usize];
            let parent_world = if p == INVALID {
                Affine::IDENTITY
            } else {
                self.world[p as usize]
            };
            self.world[idx as usize] = parent_world * self.transform[idx as usize].matrix();
        }
        self.pending.transforms.extend(transforms);

        let opacities: Vec<u32> = self
            .dirty
            .drain(dirty::OPACITY)
            .affected()
            .deterministic()
            .run()
            .collect();
        for &idx in &opacities {
            let p = self.parent[idx as usize];
            let parent_opacity = if p == INVALID {
                1.0
            } else {
                self.effective_opacity[p as usize]
            };
            self.effective_opacity[idx as usize] = parent_opacity * self.opacity[idx as usize];
        }
        self.pending.opacities.extend(opacities);
    }

    /// Returns the node-to-scene matrix, recomputing it first if needed.
    pub fn world_matrix(&mut self, id: NodeId) -> Option<Affine> {
        if !self.is_alive(id) {
            return None;
        }
        self.sync_world();
        Some(self.world[id.idx as usize])
    }

    /// Returns own opacity times the parent's effective opacity.
    pub fn effective_opacity(&mut self, id: NodeId) -> Option<f64> {
        if !self.is_alive(id) {
            return None;
        }
        self.sync_world();
        Some(self.effective_opacity[id.idx as usize])
    }

    /// Maps a point in the node's local space to scene space.
    pub fn to_scene(&mut self, id: NodeId, local: Point) -> Option<Point> {
        self.world_matrix(id).map(|world| world * local)
    }

    /// Maps a scene point into the node's local space.
    ///
    /// Returns `None` for a stale handle or a non-invertible world matrix
    /// (for example a zero scale somewhere up the tree).
    pub fn to_local(&mut self, id: NodeId, scene: Point) -> Option<Point> {
        let world = self.world_matrix(id)?;
        if world.determinant().abs() < 1e-12 {
            return None;
        }
        Some(world.inverse() * scene)
    }

    /// Re-sorts the paint order of slot `idx` if it is stale.
    pub(crate) fn ensure_paint_order(&mut self, idx: u32) {
        let i = idx as usize;
        if !self.paint_order_dirty[i] && self.paint_order[i].len() == self.children[i].len() {
            return;
        }
        let mut order = core::mem::take(&mut self.paint_order[i]);
        order.clear();
        order.extend_from_slice(&self.children[i]);
        // `sort_by_key` is stable: equal z keeps insertion order.
        order.sort_by_key(|&c| self.z_order[c as usize]);
        self.paint_order[i] = order;
        self.paint_order_dirty[i] = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Affine, b: Affine) -> bool {
        a.as_coeffs()
            .iter()
            .zip(b.as_coeffs())
            .all(|(x, y)| (x - y).abs() < 1e-9)
    }

    /// Checks `world(n) = world(parent(n)) · local(n)` for every live node.
    fn assert_world_invariant(store: &mut NodeStore) {
        store.evaluate();
        for idx in 0..store.len {
            if !store.alive[idx as usize] {
                continue;
            }
            let p = store.parent[idx as usize];
            let parent_world = if p == INVALID {
                Affine::IDENTITY
            } else {
                store.world[p as usize]
            };
            let expected = parent_world * store.transform[idx as usize].matrix();
            assert!(
                close(store.world[idx as usize], expected),
                "slot {idx}: {:?} != {expected:?}",
                store.world[idx as usize]
            );
        }
    }

    #[test]
    fn world_matrix_invariant_survives_mutations() {
        let mut store = NodeStore::new();
        let nodes: Vec<_> = (0..6).map(|_| store.create_node()).collect();
        // 0 -> 1 -> 2, 0 -> 3 -> 4, 5 detached
        store.add_child(nodes[0], nodes[1]).unwrap();
        store.add_child(nodes[1], nodes[2]).unwrap();
        store.add_child(nodes[0], nodes[3]).unwrap();
        store.add_child(nodes[3], nodes[4]).unwrap();
        assert_world_invariant(&mut store);

        store.set_position(nodes[0], Point::new(10.0, 20.0)).unwrap();
        store.set_rotation(nodes[1], 0.7).unwrap();
        store.set_scale(nodes[3], 2.0, 3.0).unwrap();
        assert_world_invariant(&mut store);

        store.add_child(nodes[2], nodes[3]).unwrap();
        store.set_pivot(nodes[2], Point::new(5.0, 5.0)).unwrap();
        assert_world_invariant(&mut store);

        store.remove_child(nodes[1]).unwrap();
        store.add_child(nodes[5], nodes[0]).unwrap();
        store.set_position(nodes[5], Point::new(-3.0, 4.0)).unwrap();
        assert_world_invariant(&mut store);

        store.destroy(nodes[3]).unwrap();
        store.set_rotation(nodes[2], -0.2).unwrap();
        assert_world_invariant(&mut store);
    }

    #[test]
    fn scene_local_round_trip() {
        let mut store = NodeStore::new();
        let parent = store.create_node();
        let child = store.create_node();
        store.add_child(parent, child).unwrap();
        store.set_position(parent, Point::new(100.0, 50.0)).unwrap();
        store.set_rotation(parent, 0.5).unwrap();
        store.set_scale(child, 2.0, 0.5).unwrap();
        store.set_pivot(child, Point::new(10.0, 10.0)).unwrap();

        let p = Point::new(13.0, -7.5);
        let scene = store.to_scene(child, p).unwrap();
        let back = store.to_local(child, scene).unwrap();
        assert!((back - p).hypot() < 1e-9, "{back:?} != {p:?}");
    }

    #[test]
    fn zero_scale_has_no_local_space() {
        let mut store = NodeStore::new();
        let n = store.create_node();
        store.set_scale(n, 0.0, 1.0).unwrap();
        assert_eq!(store.to_local(n, Point::ORIGIN), None);
    }

    #[test]
    fn world_matrix_is_lazy_but_current() {
        let mut store = NodeStore::new();
        let parent = store.create_node();
        let child = store.create_node();
        store.add_child(parent, child).unwrap();
        store.set_position(parent, Point::new(5.0, 0.0)).unwrap();
        store.set_position(child, Point::new(0.0, 5.0)).unwrap();
        let world = store.world_matrix(child).unwrap();
        assert_eq!(world * Point::ORIGIN, Point::new(5.0, 5.0));

        // Lazily synced transforms are still reported by the next evaluate.
        let changes = store.evaluate();
        assert!(changes.transforms.contains(&child.index()));
        assert!(store.evaluate().is_empty());
    }

    #[test]
    fn effective_opacity_multiplies_down_the_tree() {
        let mut store = NodeStore::new();
        let a = store.create_node();
        let b = store.create_node();
        let c = store.create_node();
        store.add_child(a, b).unwrap();
        store.add_child(b, c).unwrap();
        store.set_opacity(a, 0.5).unwrap();
        store.set_opacity(b, 0.5).unwrap();
        assert_eq!(store.effective_opacity(c), Some(0.25));
        store.remove_child(b).unwrap();
        assert_eq!(store.effective_opacity(c), Some(0.5));
    }

    #[test]
    fn paint_order_is_stable_by_z() {
        let mut store = NodeStore::new();
        let p = store.create_node();
        let kids: Vec<_> = (0..4).map(|_| store.create_node()).collect();
        for &k in &kids {
            store.add_child(p, k).unwrap();
        }
        store.set_z_order(kids[0], 2).unwrap();
        store.set_z_order(kids[2], -1).unwrap();
        let order: Vec<_> = store.paint_order(p).collect();
        assert_eq!(order, vec![kids[2], kids[1], kids[3], kids[0]]);

        store.set_z_order(kids[0], 0).unwrap();
        let order: Vec<_> = store.paint_order(p).collect();
        assert_eq!(order, vec![kids[2], kids[0], kids[1], kids[3]]);
    }

    #[test]
    fn evaluate_reports_lifecycle() {
        let mut store = NodeStore::new();
        let a = store.create_node();
        let changes = store.evaluate();
        assert_eq!(changes.added, vec![a.index()]);
        assert!(changes.topology_changed);

        store.edit_instructions(a, |list| {
            list.rectangle(kurbo::Rect::new(0.0, 0.0, 1.0, 1.0));
        })
        .unwrap();
        let changes = store.evaluate();
        assert_eq!(changes.content, vec![a.index()]);

        store.destroy(a).unwrap();
        let changes = store.evaluate();
        assert_eq!(changes.removed, vec![a.index()]);
    }
}
