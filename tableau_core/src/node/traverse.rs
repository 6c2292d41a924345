// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use super::id::{INVALID, NodeId};
use super::store::NodeStore;

/// An iterator over a list of slot indices, yielding live handles.
///
/// Created by [`NodeStore::children`] and [`NodeStore::paint_order`].
#[derive(Debug)]
pub struct Children<'a> {
    store: &'a NodeStore,
    slots: core::slice::Iter<'a, u32>,
}

impl<'a> Children<'a> {
    pub(crate) fn new(store: &'a NodeStore, slots: &'a [u32]) -> Self {
        Self {
            store,
            slots: slots.iter(),
        }
    }
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        self.slots.next().map(|&idx| self.store.handle(idx))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.slots.size_hint()
    }
}

impl DoubleEndedIterator for Children<'_> {
    fn next_back(&mut self) -> Option<NodeId> {
        self.slots.next_back().map(|&idx| self.store.handle(idx))
    }
}

impl ExactSizeIterator for Children<'_> {}

/// An iterator from a node's parent up to its root.
///
/// Created by [`NodeStore::ancestors`].
#[derive(Debug)]
pub struct Ancestors<'a> {
    store: &'a NodeStore,
    current: u32,
}

impl<'a> Ancestors<'a> {
    pub(crate) fn new(store: &'a NodeStore, start: u32) -> Self {
        Self {
            store,
            current: start,
        }
    }
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.store.parent[idx as usize];
        Some(self.store.handle(idx))
    }
}

impl NodeStore {
    /// Collects the subtree rooted at slot `idx` in depth-first pre-order.
    pub(crate) fn subtree_slots(&self, idx: u32) -> Vec<u32> {
        let mut out = Vec::new();
        let mut stack = vec![idx];
        while let Some(i) = stack.pop() {
            out.push(i);
            stack.extend(self.children[i as usize].iter().rev().copied());
        }
        out
    }

    /// Returns `true` if slot `ancestor` is `idx` or one of its ancestors.
    pub(crate) fn is_ancestor_or_self(&self, ancestor: u32, idx: u32) -> bool {
        let mut cur = idx;
        while cur != INVALID {
            if cur == ancestor {
                return true;
            }
            cur = self.parent[cur as usize];
        }
        false
    }

    /// Returns the handles of `id` and every descendant, parents before
    /// children. Empty for a stale handle.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        if !self.is_alive(id) {
            return Vec::new();
        }
        self.subtree_slots(id.idx)
            .into_iter()
            .map(|idx| self.handle(idx))
            .collect()
    }

    /// Returns `true` if `node` is `ancestor` or lies in its subtree.
    #[must_use]
    pub fn is_descendant_of(&self, node: NodeId, ancestor: NodeId) -> bool {
        self.is_alive(node)
            && self.is_alive(ancestor)
            && self.is_ancestor_or_self(ancestor.idx, node.idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtree_is_pre_order() {
        let mut store = NodeStore::new();
        let a = store.create_node();
        let b = store.create_node();
        let c = store.create_node();
        let d = store.create_node();
        // a -> [b -> [d], c]
        store.add_child(a, b).unwrap();
        store.add_child(a, c).unwrap();
        store.add_child(b, d).unwrap();
        assert_eq!(store.descendants(a), vec![a, b, d, c]);
        assert!(store.is_descendant_of(d, a));
        assert!(!store.is_descendant_of(c, b));
    }

    #[test]
    fn ancestors_walk_to_root() {
        let mut store = NodeStore::new();
        let a = store.create_node();
        let b = store.create_node();
        let c = store.create_node();
        store.add_child(a, b).unwrap();
        store.add_child(b, c).unwrap();
        assert_eq!(store.ancestors(c).collect::<Vec<_>>(), vec![b, a]);
        assert_eq!(store.ancestors(a).count(), 0);
    }

    #[test]
    fn children_iterate_both_ways() {
        let mut store = NodeStore::new();
        let p = store.create_node();
        let kids: Vec<_> = (0..3).map(|_| store.create_node()).collect();
        for &k in &kids {
            store.add_child(p, k).unwrap();
        }
        assert_eq!(store.children(p).collect::<Vec<_>>(), kids);
        assert_eq!(
            store.children(p).rev().collect::<Vec<_>>(),
            kids.iter().rev().copied().collect::<Vec<_>>()
        );
        assert_eq!(store.children(p).len(), 3);
    }
}
