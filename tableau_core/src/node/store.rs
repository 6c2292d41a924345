// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage with allocation, topology, and property management.

use std::collections::BTreeMap;

use kurbo::{Affine, Point, Size};
use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use crate::dirty;
use crate::draw::{Geometry, InstructionList};
use crate::error::{Error, Result};
use crate::layout::LayoutBehavior;
use crate::tween::Value;

use super::evaluate::FrameChanges;
use super::id::{BitmapId, INVALID, NodeId};
use super::props::{CacheMode, Insets, LayoutProps, LocalTransform, NodeFlags};
use super::render::BitmapCache;
use super::traverse::{Ancestors, Children};

/// Default margin, in device pixels, around rasterised bitmap caches.
pub const DEFAULT_BITMAP_MARGIN: f64 = 2.0;

/// Determinants below this are treated as singular.
const SINGULAR_EPSILON: f64 = 1e-12;

/// Struct-of-arrays storage for all nodes.
///
/// Nodes are addressed by [`NodeId`] handles. Each node occupies a slot in
/// parallel arrays. Destroyed nodes are recycled via a free list, and
/// generation counters make old handles fail with [`Error::StaleNode`].
///
/// Getters return `None` for stale handles; mutators return an error.
#[derive(Debug)]
pub struct NodeStore {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) children: Vec<Vec<u32>>,
    pub(crate) paint_order: Vec<Vec<u32>>,
    pub(crate) paint_order_dirty: Vec<bool>,

    // -- Local properties (set by callers) --
    pub(crate) transform: Vec<LocalTransform>,
    pub(crate) opacity: Vec<f64>,
    pub(crate) visible: Vec<bool>,
    pub(crate) z_order: Vec<i32>,
    pub(crate) flags: Vec<NodeFlags>,
    pub(crate) instructions: Vec<InstructionList>,
    pub(crate) cache_mode: Vec<CacheMode>,
    pub(crate) custom: Vec<BTreeMap<String, Value>>,

    // -- Layout --
    pub(crate) layout: Vec<LayoutProps>,
    pub(crate) behavior: Vec<Option<Box<dyn LayoutBehavior>>>,
    pub(crate) min_size: Vec<Option<Size>>,
    pub(crate) allocation: Vec<Option<Size>>,
    pub(crate) layout_pending: Vec<bool>,
    pub(crate) layout_dirty: bool,

    // -- Computed properties --
    pub(crate) world: Vec<Affine>,
    pub(crate) effective_opacity: Vec<f64>,
    pub(crate) geometry: Vec<Option<Geometry>>,
    pub(crate) bitmap: Vec<Option<BitmapCache>>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) alive: Vec<bool>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,
    pub(crate) pending: FrameChanges,
    pub(crate) redraw_requested: bool,

    // -- Bitmap bookkeeping --
    pub(crate) released_bitmaps: Vec<BitmapId>,
    pub(crate) bitmap_margin: f64,
}

impl Default for NodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeStore {
    /// Creates an empty node store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            children: Vec::new(),
            paint_order: Vec::new(),
            paint_order_dirty: Vec::new(),
            transform: Vec::new(),
            opacity: Vec::new(),
            visible: Vec::new(),
            z_order: Vec::new(),
            flags: Vec::new(),
            instructions: Vec::new(),
            cache_mode: Vec::new(),
            custom: Vec::new(),
            layout: Vec::new(),
            behavior: Vec::new(),
            min_size: Vec::new(),
            allocation: Vec::new(),
            layout_pending: Vec::new(),
            layout_dirty: false,
            world: Vec::new(),
            effective_opacity: Vec::new(),
            geometry: Vec::new(),
            bitmap: Vec::new(),
            generation: Vec::new(),
            alive: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            pending: FrameChanges::default(),
            redraw_requested: false,
            released_bitmaps: Vec::new(),
            bitmap_margin: DEFAULT_BITMAP_MARGIN,
        }
    }

    /// Sets the margin added around rasterised bitmap caches.
    pub fn set_bitmap_margin(&mut self, margin: f64) {
        self.bitmap_margin = margin.max(0.0);
    }

    // -- Allocation API --

    /// Creates a new detached node and returns its handle.
    ///
    /// The node starts with an identity transform, full opacity, visible,
    /// no instructions and default layout properties.
    pub fn create_node(&mut self) -> NodeId {
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot. Its generation was bumped on destroy.
            let i = idx as usize;
            self.parent[i] = INVALID;
            self.children[i].clear();
            self.paint_order[i].clear();
            self.paint_order_dirty[i] = false;
            self.transform[i] = LocalTransform::IDENTITY;
            self.opacity[i] = 1.0;
            self.visible[i] = true;
            self.z_order[i] = 0;
            self.flags[i] = NodeFlags::default();
            self.instructions[i].clear();
            self.cache_mode[i] = CacheMode::default();
            self.custom[i].clear();
            self.layout[i] = LayoutProps::default();
            self.behavior[i] = None;
            self.min_size[i] = None;
            self.allocation[i] = None;
            self.layout_pending[i] = false;
            self.world[i] = Affine::IDENTITY;
            self.effective_opacity[i] = 1.0;
            self.geometry[i] = None;
            self.bitmap[i] = None;
            self.alive[i] = true;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.children.push(Vec::new());
            self.paint_order.push(Vec::new());
            self.paint_order_dirty.push(false);
            self.transform.push(LocalTransform::IDENTITY);
            self.opacity.push(1.0);
            self.visible.push(true);
            self.z_order.push(0);
            self.flags.push(NodeFlags::default());
            self.instructions.push(InstructionList::new());
            self.cache_mode.push(CacheMode::default());
            self.custom.push(BTreeMap::new());
            self.layout.push(LayoutProps::default());
            self.behavior.push(None);
            self.min_size.push(None);
            self.allocation.push(None);
            self.layout_pending.push(false);
            self.world.push(Affine::IDENTITY);
            self.effective_opacity.push(1.0);
            self.geometry.push(None);
            self.bitmap.push(None);
            self.generation.push(0);
            self.alive.push(true);
            idx
        };

        self.pending.added.push(idx);
        self.pending.topology_changed = true;
        self.dirty.mark(idx, dirty::TOPOLOGY);
        self.mark_inherited(idx);
        self.redraw_requested = true;

        self.handle(idx)
    }

    /// Destroys a node and its whole subtree, freeing their slots.
    ///
    /// Returns the destroyed handles, parents before children. Bitmap caches
    /// owned by the subtree are released on the next render.
    pub fn destroy(&mut self, id: NodeId) -> Result<Vec<NodeId>> {
        let idx = self.check(id)?;
        self.detach(idx);

        let slots = self.subtree_slots(idx);
        let destroyed = slots.iter().map(|&i| self.handle(i)).collect();
        for &slot in &slots {
            let i = slot as usize;
            self.dirty.remove_key(slot);
            if let Some(cache) = self.bitmap[i].take() {
                self.released_bitmaps.push(cache.bitmap);
            }
            self.geometry[i] = None;
            self.behavior[i] = None;
            self.custom[i].clear();
            self.children[i].clear();
            self.paint_order[i].clear();
            self.parent[i] = INVALID;
            self.alive[i] = false;
            // Bump generation so old handles immediately fail validation.
            self.generation[i] = self.generation[i].wrapping_add(1);
            self.free_list.push(slot);
            self.pending.removed.push(slot);
        }
        self.pending.topology_changed = true;
        self.redraw_requested = true;
        Ok(destroyed)
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        id.idx < self.len
            && self.alive[id.idx as usize]
            && self.generation[id.idx as usize] == id.generation
    }

    /// Returns the number of live nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    // -- Topology API --

    /// Appends `child` to `parent`'s children.
    ///
    /// If `child` already has a parent it is moved, and its position is
    /// re-expressed in the new parent's space so its local origin keeps its
    /// scene position. Adding a child to its current parent moves it to the
    /// end of the child list.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidHierarchy`] if `child` is `parent` or one of its
    /// ancestors, [`Error::StaleNode`] for a stale handle.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let p = self.check(parent)?;
        let c = self.check(child)?;
        if self.is_ancestor_or_self(c, p) {
            return Err(Error::InvalidHierarchy { parent, child });
        }

        let old_parent = self.parent[c as usize];
        let scene_origin = if old_parent != INVALID && old_parent != p {
            self.sync_world();
            Some(self.world[c as usize] * Point::ORIGIN)
        } else {
            None
        };

        if old_parent != INVALID {
            self.detach(c);
        }

        self.parent[c as usize] = p;
        self.children[p as usize].push(c);
        self.paint_order_dirty[p as usize] = true;

        // The child depends on its parent for TRANSFORM and OPACITY.
        let _ = self.dirty.add_dependency(c, p, dirty::TRANSFORM);
        let _ = self.dirty.add_dependency(c, p, dirty::OPACITY);

        if let Some(scene_origin) = scene_origin {
            self.reexpress_origin(c, scene_origin);
        }

        self.mark_inherited(c);
        self.dirty.mark(p, dirty::TOPOLOGY);
        self.pending.topology_changed = true;
        self.mark_resize(p);
        self.redraw_requested = true;
        Ok(())
    }

    /// Detaches `node` from its parent without destroying it.
    ///
    /// Does nothing if the node has no parent.
    ///
    /// # Errors
    ///
    /// [`Error::StaleNode`] for a stale handle.
    pub fn remove_child(&mut self, node: NodeId) -> Result<()> {
        let c = self.check(node)?;
        if self.parent[c as usize] != INVALID {
            self.detach(c);
            self.mark_inherited(c);
            self.redraw_requested = true;
        }
        Ok(())
    }

    /// Returns the parent of a node, if any.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        if !self.is_alive(id) {
            return None;
        }
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| self.handle(p))
    }

    /// Returns the children of a node in insertion order.
    ///
    /// Empty for a stale handle.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        if !self.is_alive(id) {
            return Children::new(self, &[]);
        }
        Children::new(self, &self.children[id.idx as usize])
    }

    /// Returns the children of a node in paint order (ascending z-order,
    /// stable), re-sorting first if needed.
    pub fn paint_order(&mut self, id: NodeId) -> Children<'_> {
        if !self.is_alive(id) {
            return Children::new(self, &[]);
        }
        self.ensure_paint_order(id.idx);
        Children::new(self, &self.paint_order[id.idx as usize])
    }

    /// Returns an iterator from the node's parent up to its root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        let start = if self.is_alive(id) {
            self.parent[id.idx as usize]
        } else {
            INVALID
        };
        Ancestors::new(self, start)
    }

    /// Returns the root of the tree containing `id`.
    #[must_use]
    pub fn root_of(&self, id: NodeId) -> Option<NodeId> {
        if !self.is_alive(id) {
            return None;
        }
        Some(self.ancestors(id).last().unwrap_or(id))
    }

    /// Returns all live nodes without a parent.
    #[must_use]
    pub fn roots(&self) -> Vec<NodeId> {
        (0..self.len)
            .filter(|&idx| self.alive[idx as usize] && self.parent[idx as usize] == INVALID)
            .map(|idx| self.handle(idx))
            .collect()
    }

    // -- Property getters (read-only, no dirty marking) --

    /// Returns the local transform of a node.
    #[must_use]
    pub fn transform(&self, id: NodeId) -> Option<LocalTransform> {
        self.slot(id).map(|i| self.transform[i])
    }

    /// Returns the position of a node in its parent's space.
    #[must_use]
    pub fn position(&self, id: NodeId) -> Option<Point> {
        self.slot(id)
            .map(|i| Point::new(self.transform[i].x, self.transform[i].y))
    }

    /// Returns the own opacity of a node.
    #[must_use]
    pub fn opacity(&self, id: NodeId) -> Option<f64> {
        self.slot(id).map(|i| self.opacity[i])
    }

    /// Returns whether a node is visible.
    #[must_use]
    pub fn visible(&self, id: NodeId) -> Option<bool> {
        self.slot(id).map(|i| self.visible[i])
    }

    /// Returns the z-order of a node among its siblings.
    #[must_use]
    pub fn z_order(&self, id: NodeId) -> Option<i32> {
        self.slot(id).map(|i| self.z_order[i])
    }

    /// Returns the interaction flags of a node.
    #[must_use]
    pub fn flags(&self, id: NodeId) -> Option<NodeFlags> {
        self.slot(id).map(|i| self.flags[i])
    }

    /// Returns the drawing instructions of a node.
    #[must_use]
    pub fn instructions(&self, id: NodeId) -> Option<&InstructionList> {
        self.slot(id).map(|i| &self.instructions[i])
    }

    /// Returns the cache mode of a node.
    #[must_use]
    pub fn cache_mode(&self, id: NodeId) -> Option<CacheMode> {
        self.slot(id).map(|i| self.cache_mode[i])
    }

    /// Returns the size attributes of a node.
    #[must_use]
    pub fn layout_props(&self, id: NodeId) -> Option<&LayoutProps> {
        self.slot(id).map(|i| &self.layout[i])
    }

    /// Returns the layout behavior of a node, if it has one.
    #[must_use]
    pub fn layout_behavior(&self, id: NodeId) -> Option<&dyn LayoutBehavior> {
        self.slot(id).and_then(|i| self.behavior[i].as_deref())
    }

    /// Returns the most recent compiled geometry of a node.
    #[must_use]
    pub fn geometry(&self, id: NodeId) -> Option<&Geometry> {
        self.slot(id).and_then(|i| self.geometry[i].as_ref())
    }

    /// Returns a user attribute of a node.
    #[must_use]
    pub fn custom_attr(&self, id: NodeId, name: &str) -> Option<&Value> {
        self.slot(id).and_then(|i| self.custom[i].get(name))
    }

    // -- Transform setters --
    //
    // Transform writes mark TRANSFORM with eager propagation. They only
    // invalidate layout when the parent's behavior reads child positions.

    /// Replaces the local transform of a node.
    pub fn set_transform(&mut self, id: NodeId, transform: LocalTransform) -> Result<()> {
        self.update_transform(id, |t| *t = transform)
    }

    /// Moves a node within its parent's space.
    pub fn set_position(&mut self, id: NodeId, position: Point) -> Result<()> {
        self.update_transform(id, |t| {
            t.x = position.x;
            t.y = position.y;
        })
    }

    /// Sets the rotation of a node, in radians.
    pub fn set_rotation(&mut self, id: NodeId, rotation: f64) -> Result<()> {
        self.update_transform(id, |t| t.rotation = rotation)
    }

    /// Sets the scale factors of a node.
    pub fn set_scale(&mut self, id: NodeId, scale_x: f64, scale_y: f64) -> Result<()> {
        self.update_transform(id, |t| {
            t.scale_x = scale_x;
            t.scale_y = scale_y;
        })
    }

    /// Sets the rotation and scale pivot of a node, in local coordinates.
    pub fn set_pivot(&mut self, id: NodeId, pivot: Point) -> Result<()> {
        self.update_transform(id, |t| {
            t.pivot_x = pivot.x;
            t.pivot_y = pivot.y;
        })
    }

    /// Applies `f` to the local transform of a node.
    pub fn update_transform(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut LocalTransform),
    ) -> Result<()> {
        let idx = self.check(id)?;
        let mut transform = self.transform[idx as usize];
        f(&mut transform);
        self.write_transform(idx, transform);
        let p = self.parent[idx as usize];
        if p != INVALID
            && self.behavior[p as usize]
                .as_ref()
                .is_some_and(|b| b.tracks_child_positions())
        {
            self.mark_resize(p);
        }
        Ok(())
    }

    // -- Visual setters --

    /// Sets the own opacity of a node, clamped to `[0, 1]`.
    pub fn set_opacity(&mut self, id: NodeId, opacity: f64) -> Result<()> {
        let idx = self.check(id)?;
        self.opacity[idx as usize] = if opacity.is_nan() {
            0.0
        } else {
            opacity.clamp(0.0, 1.0)
        };
        self.dirty.mark_with(idx, dirty::OPACITY, &EagerPolicy);
        self.redraw_requested = true;
        Ok(())
    }

    /// Shows or hides a node and its subtree.
    ///
    /// Hidden nodes are skipped by rendering and hit-testing and measure as
    /// zero in layout.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> Result<()> {
        let idx = self.check(id)?;
        if self.visible[idx as usize] != visible {
            self.visible[idx as usize] = visible;
            self.mark_resize(idx);
            self.redraw_requested = true;
        }
        Ok(())
    }

    /// Sets the z-order of a node among its siblings.
    pub fn set_z_order(&mut self, id: NodeId, z_order: i32) -> Result<()> {
        let idx = self.check(id)?;
        self.z_order[idx as usize] = z_order;
        let p = self.parent[idx as usize];
        if p != INVALID {
            self.paint_order_dirty[p as usize] = true;
        }
        self.redraw_requested = true;
        Ok(())
    }

    /// Sets the interaction flags of a node.
    pub fn set_flags(&mut self, id: NodeId, flags: NodeFlags) -> Result<()> {
        let idx = self.check(id)?;
        self.flags[idx as usize] = flags;
        Ok(())
    }

    /// Sets a user attribute on a node.
    pub fn set_custom_attr(
        &mut self,
        id: NodeId,
        name: impl Into<String>,
        value: Value,
    ) -> Result<()> {
        let idx = self.check(id)?;
        self.custom[idx as usize].insert(name.into(), value);
        self.redraw_requested = true;
        Ok(())
    }

    // -- Content setters --

    /// Replaces the drawing instructions of a node.
    pub fn set_instructions(&mut self, id: NodeId, instructions: InstructionList) -> Result<()> {
        self.edit_instructions(id, |list| *list = instructions)
    }

    /// Edits the drawing instructions of a node in place.
    pub fn edit_instructions(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut InstructionList),
    ) -> Result<()> {
        let idx = self.check(id)?;
        f(&mut self.instructions[idx as usize]);
        self.invalidate_content(idx);
        Ok(())
    }

    /// Chooses how a node's instructions are rendered.
    pub fn set_cache_mode(&mut self, id: NodeId, mode: CacheMode) -> Result<()> {
        let idx = self.check(id)?;
        if self.cache_mode[idx as usize] != mode {
            self.cache_mode[idx as usize] = mode;
            self.invalidate_content(idx);
        }
        Ok(())
    }

    // -- Size setters --
    //
    // Every size-relevant write marks the node and all its ancestors as
    // needing a resize. Recomputation happens on the next size query or frame.

    /// Applies `f` to the size attributes of a node.
    pub fn update_layout_props(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut LayoutProps),
    ) -> Result<()> {
        let idx = self.check(id)?;
        f(&mut self.layout[idx as usize]);
        self.mark_resize(idx);
        Ok(())
    }

    /// Sets the declared minimum size of a node.
    pub fn set_min_size(&mut self, id: NodeId, size: Size) -> Result<()> {
        self.update_layout_props(id, |p| {
            p.min_width = size.width;
            p.min_height = size.height;
        })
    }

    /// Sets whether a node takes a share of extra space.
    pub fn set_expand(&mut self, id: NodeId, expand: bool) -> Result<()> {
        self.update_layout_props(id, |p| p.expand = expand)
    }

    /// Sets whether a node fills its allocated area.
    pub fn set_fill(&mut self, id: NodeId, fill: bool) -> Result<()> {
        self.update_layout_props(id, |p| p.fill = fill)
    }

    /// Sets how a non-filling node is aligned inside its area.
    pub fn set_align(&mut self, id: NodeId, x_align: f64, y_align: f64) -> Result<()> {
        self.update_layout_props(id, |p| {
            p.x_align = x_align.clamp(0.0, 1.0);
            p.y_align = y_align.clamp(0.0, 1.0);
        })
    }

    /// Sets the padding of a node.
    pub fn set_padding(&mut self, id: NodeId, padding: Insets) -> Result<()> {
        self.update_layout_props(id, |p| p.padding = padding)
    }

    /// Sets the margin of a node.
    pub fn set_margin(&mut self, id: NodeId, margin: Insets) -> Result<()> {
        self.update_layout_props(id, |p| p.margin = margin)
    }

    /// Requests an allocation for a layout root.
    pub fn set_requested_size(&mut self, id: NodeId, size: Option<Size>) -> Result<()> {
        self.update_layout_props(id, |p| p.requested = size)
    }

    /// Installs or removes the layout behavior of a node.
    pub fn set_layout(
        &mut self,
        id: NodeId,
        behavior: Option<Box<dyn LayoutBehavior>>,
    ) -> Result<()> {
        let idx = self.check(id)?;
        self.behavior[idx as usize] = behavior;
        self.mark_resize(idx);
        Ok(())
    }

    // -- Redraw coalescing --

    /// Returns whether any mutation asked for a redraw since the last
    /// [`take_redraw_request`](Self::take_redraw_request).
    #[must_use]
    pub fn redraw_requested(&self) -> bool {
        self.redraw_requested
    }

    /// Asks for a redraw.
    pub fn request_redraw(&mut self) {
        self.redraw_requested = true;
    }

    /// Clears and returns the redraw flag.
    pub fn take_redraw_request(&mut self) -> bool {
        core::mem::take(&mut self.redraw_requested)
    }

    // -- Internal helpers --

    /// Returns the slot index of a live handle.
    pub(crate) fn check(&self, id: NodeId) -> Result<u32> {
        if self.is_alive(id) {
            Ok(id.idx)
        } else {
            Err(Error::StaleNode(id))
        }
    }

    fn slot(&self, id: NodeId) -> Option<usize> {
        self.is_alive(id).then_some(id.idx as usize)
    }

    /// Returns the current handle of slot `idx`.
    pub(crate) fn handle(&self, idx: u32) -> NodeId {
        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Writes a local transform without touching layout state.
    pub(crate) fn write_transform(&mut self, idx: u32, transform: LocalTransform) {
        self.transform[idx as usize] = transform;
        self.dirty.mark_with(idx, dirty::TRANSFORM, &EagerPolicy);
        self.redraw_requested = true;
    }

    fn invalidate_content(&mut self, idx: u32) {
        let i = idx as usize;
        self.geometry[i] = None;
        if let Some(cache) = &mut self.bitmap[i] {
            cache.valid = false;
        }
        self.dirty.mark(idx, dirty::CONTENT);
        self.redraw_requested = true;
    }

    /// Marks `idx` and every ancestor as needing a resize.
    pub(crate) fn mark_resize(&mut self, idx: u32) {
        let mut cur = idx;
        while cur != INVALID {
            let i = cur as usize;
            self.min_size[i] = None;
            self.layout_pending[i] = true;
            cur = self.parent[i];
        }
        self.layout_dirty = true;
        self.redraw_requested = true;
    }

    /// Removes `idx` from its parent's child list and dependency edges.
    fn detach(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        if p == INVALID {
            return;
        }
        self.children[p as usize].retain(|&c| c != idx);
        self.paint_order_dirty[p as usize] = true;
        self.parent[idx as usize] = INVALID;
        self.dirty.remove_dependency(idx, p, dirty::TRANSFORM);
        self.dirty.remove_dependency(idx, p, dirty::OPACITY);
        self.dirty.mark(p, dirty::TOPOLOGY);
        self.pending.topology_changed = true;
        self.mark_resize(p);
    }

    /// Marks the subtree rooted at `idx` dirty for inherited channels.
    fn mark_inherited(&mut self, idx: u32) {
        self.dirty.mark_with(idx, dirty::TRANSFORM, &EagerPolicy);
        self.dirty.mark_with(idx, dirty::OPACITY, &EagerPolicy);
    }

    /// Moves `idx` so its local origin lands on `scene_origin`, given its
    /// current parent.
    fn reexpress_origin(&mut self, idx: u32, scene_origin: Point) {
        self.sync_world();
        let p = self.parent[idx as usize];
        let parent_world = if p == INVALID {
            Affine::IDENTITY
        } else {
            self.world[p as usize]
        };
        if parent_world.determinant().abs() < SINGULAR_EPSILON {
            return;
        }
        let target = parent_world.inverse() * scene_origin;
        let mut t = self.transform[idx as usize];
        let pivot = Point::new(t.pivot_x, t.pivot_y);
        let linear = Affine::rotate(t.rotation) * Affine::scale_non_uniform(t.scale_x, t.scale_y);
        // The origin maps to (x, y) + pivot - linear * pivot.
        let pos = target - pivot.to_vec2() + (linear * pivot).to_vec2();
        t.x = pos.x;
        t.y = pos.y;
        self.write_transform(idx, t);
    }
}
