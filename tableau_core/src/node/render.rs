// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Painting the node tree onto a [`Canvas`].
//!
//! Each node is bracketed by `save` / `restore` so the clips it leaves
//! active reach its descendants only. Path-cache nodes replay their compiled
//! geometry against their world matrix every frame. Bitmap-cache nodes are
//! rasterised into an offscreen bitmap keyed by the linear part of their
//! world matrix; when only the translation changes, the bitmap is blitted at
//! the new origin.

use kurbo::{Affine, Point, Vec2};

use super::id::{BitmapId, NodeId};
use super::props::CacheMode;
use super::store::NodeStore;
use crate::draw::Canvas;
use crate::error::RenderError;

/// Counters for one [`NodeStore::render`] pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Nodes whose content was drawn.
    pub painted: usize,
    /// Bitmap caches that were (re)rasterised.
    pub rasterized: usize,
    /// Bitmap caches that were composited.
    pub blitted: usize,
    /// Nodes that failed to render and were skipped.
    pub failed: usize,
}

/// An offscreen rasterisation of one node's instructions.
#[derive(Clone, Debug)]
pub(crate) struct BitmapCache {
    pub(crate) bitmap: BitmapId,
    /// Linear part `[a, b, c, d]` of the world matrix it was rasterised with.
    pub(crate) linear: [f64; 4],
    /// Device offset of the bitmap's top-left corner from the node origin.
    pub(crate) offset: Vec2,
    pub(crate) valid: bool,
}

impl NodeStore {
    /// Paints the tree rooted at `root`.
    ///
    /// Bitmaps freed by destroyed or re-rasterised nodes are released first.
    /// A node that fails to render is logged and skipped; its siblings,
    /// descendants and the rest of the frame still render.
    pub fn render(&mut self, root: NodeId, canvas: &mut dyn Canvas) -> RenderStats {
        let mut stats = RenderStats::default();
        for bitmap in self.released_bitmaps.drain(..) {
            canvas.release_bitmap(bitmap);
        }
        let Ok(idx) = self.check(root) else {
            return stats;
        };
        self.sync_world();
        self.render_slot(idx, canvas, &mut stats);
        stats
    }

    fn render_slot(&mut self, idx: u32, canvas: &mut dyn Canvas, stats: &mut RenderStats) {
        let i = idx as usize;
        if !self.visible[i] {
            return;
        }
        self.ensure_geometry(idx, &*canvas);

        canvas.save();
        canvas.set_transform(self.world[i]);
        let has_content = self.geometry[i]
            .as_ref()
            .is_some_and(|geometry| !geometry.ops().is_empty());
        if has_content {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "opacity is in [0, 1]"
            )]
            let alpha = self.effective_opacity[i] as f32;
            let result = match self.cache_mode[i] {
                CacheMode::Paths => self.paint_paths(idx, canvas, alpha),
                CacheMode::Bitmap => self.paint_bitmap(idx, canvas, alpha, stats),
            };
            match result {
                Ok(()) => stats.painted += 1,
                Err(err) => {
                    log::warn!("skipping {:?}: {err}", self.handle(idx));
                    stats.failed += 1;
                }
            }
        }

        self.ensure_paint_order(idx);
        let order = self.paint_order[i].clone();
        for child in order {
            self.render_slot(child, canvas, stats);
        }
        canvas.restore();
    }

    fn paint_paths(
        &mut self,
        idx: u32,
        canvas: &mut dyn Canvas,
        alpha: f32,
    ) -> Result<(), RenderError> {
        let i = idx as usize;
        if let Some(stale) = self.bitmap[i].take() {
            canvas.release_bitmap(stale.bitmap);
        }
        match &self.geometry[i] {
            Some(geometry) => geometry.replay(canvas, alpha),
            None => Ok(()),
        }
    }

    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "device bounds are rounded out and at least one pixel"
    )]
    fn paint_bitmap(
        &mut self,
        idx: u32,
        canvas: &mut dyn Canvas,
        alpha: f32,
        stats: &mut RenderStats,
    ) -> Result<(), RenderError> {
        let i = idx as usize;
        let world = self.world[i];
        let [a, b, c, d, e, f] = world.as_coeffs();
        let linear = [a, b, c, d];
        let margin = self.bitmap_margin;

        let Some(geometry) = &self.geometry[i] else {
            return Ok(());
        };
        // Unbounded content (an unclipped paint) cannot be cached.
        let Some(bounds) = geometry.bounds() else {
            return geometry.replay(canvas, alpha);
        };

        let reusable = self.bitmap[i]
            .as_ref()
            .is_some_and(|cache| cache.valid && cache.linear == linear);
        let mut raster_result = Ok(());
        if !reusable {
            if let Some(stale) = self.bitmap[i].take() {
                canvas.release_bitmap(stale.bitmap);
            }
            let linear_part = Affine::new([a, b, c, d, 0.0, 0.0]);
            let device = linear_part
                .transform_rect_bbox(bounds)
                .inflate(margin, margin)
                .expand();
            let width = device.width().max(1.0) as u32;
            let height = device.height().max(1.0) as u32;
            match canvas.create_bitmap(width, height) {
                Ok(bitmap) => {
                    let offset = device.origin().to_vec2();
                    canvas.begin_bitmap(bitmap);
                    canvas.set_transform(Affine::translate(-offset) * linear_part);
                    raster_result = geometry.replay(canvas, 1.0);
                    canvas.end_bitmap();
                    canvas.set_transform(world);

                    self.bitmap[i] = Some(BitmapCache {
                        bitmap,
                        linear,
                        offset,
                        valid: true,
                    });
                    stats.rasterized += 1;
                }
                Err(err) => raster_result = Err(err),
            }
        }

        if let Some(cache) = &self.bitmap[i] {
            canvas.draw_bitmap(cache.bitmap, Point::new(e, f) + cache.offset, alpha);
            stats.blitted += 1;
        }
        // Clips reach descendants even when rasterisation failed.
        for clip in geometry.clips() {
            canvas.clip(clip);
        }
        raster_result
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Rect;

    use super::*;
    use crate::draw::{Color, Command, Font, InstructionList, RecordingCanvas};

    fn red() -> Color {
        Color::new(1.0, 0.0, 0.0, 1.0)
    }

    fn boxed(store: &mut NodeStore, parent: NodeId, mode: CacheMode) -> NodeId {
        let n = store.create_node();
        let mut list = InstructionList::new();
        list.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), red());
        store.set_instructions(n, list).unwrap();
        store.set_cache_mode(n, mode).unwrap();
        store.add_child(parent, n).unwrap();
        n
    }

    #[test]
    fn path_mode_replays_with_world_and_opacity() {
        let mut store = NodeStore::new();
        let root = store.create_node();
        let n = boxed(&mut store, root, CacheMode::Paths);
        store.set_position(n, Point::new(5.0, 6.0)).unwrap();
        store.set_opacity(root, 0.5).unwrap();

        let mut canvas = RecordingCanvas::new();
        let stats = store.render(root, &mut canvas);
        assert_eq!(stats.painted, 1);
        assert_eq!(stats.rasterized, 0);

        let cmds = canvas.commands();
        assert!(
            cmds.iter().any(|c| matches!(
                c,
                Command::SetTransform(t) if (*t * Point::ORIGIN - Point::new(5.0, 6.0)).hypot() < 1e-9
            )),
            "node drawn at its world position"
        );
        let fill_alpha = cmds.iter().find_map(|c| match c {
            Command::Fill { color, .. } => Some(color.alpha),
            _ => None,
        });
        assert_eq!(fill_alpha, Some(0.5));
        let saves = cmds.iter().filter(|c| matches!(c, Command::Save)).count();
        let restores = cmds.iter().filter(|c| matches!(c, Command::Restore)).count();
        assert_eq!(saves, restores, "balanced save/restore");
    }

    #[test]
    fn bitmap_is_reused_for_translation() {
        let mut store = NodeStore::new();
        let root = store.create_node();
        let n = boxed(&mut store, root, CacheMode::Bitmap);
        let mut canvas = RecordingCanvas::new();

        let first = store.render(root, &mut canvas);
        assert_eq!((first.rasterized, first.blitted), (1, 1));

        for step in 1..=5 {
            store
                .set_position(n, Point::new(f64::from(step) * 3.0, 0.0))
                .unwrap();
            let stats = store.render(root, &mut canvas);
            assert_eq!(stats.rasterized, 0, "translation-only frame {step}");
            assert_eq!(stats.blitted, 1);
        }
        assert_eq!(canvas.rasterizations(), 1);

        let origins: Vec<Point> = canvas
            .commands()
            .iter()
            .filter_map(|c| match c {
                Command::DrawBitmap { origin, .. } => Some(*origin),
                _ => None,
            })
            .collect();
        assert_eq!(origins.len(), 6);
        assert!(
            (origins[5].x - origins[0].x - 15.0).abs() < 1e-9,
            "blit follows the node"
        );
    }

    #[test]
    fn rotation_rerasterises_once() {
        let mut store = NodeStore::new();
        let root = store.create_node();
        let n = boxed(&mut store, root, CacheMode::Bitmap);
        let mut canvas = RecordingCanvas::new();
        store.render(root, &mut canvas);

        store.set_rotation(n, 0.5).unwrap();
        assert_eq!(store.render(root, &mut canvas).rasterized, 1);
        assert_eq!(store.render(root, &mut canvas).rasterized, 0);
        assert_eq!(canvas.rasterizations(), 2);
        assert_eq!(canvas.live_bitmaps().len(), 1, "old bitmap released");
    }

    #[test]
    fn instruction_change_rerasterises_once() {
        let mut store = NodeStore::new();
        let root = store.create_node();
        let n = boxed(&mut store, root, CacheMode::Bitmap);
        let mut canvas = RecordingCanvas::new();
        store.render(root, &mut canvas);

        store
            .edit_instructions(n, |list| {
                list.fill_rect(Rect::new(0.0, 0.0, 20.0, 5.0), red());
            })
            .unwrap();
        assert_eq!(store.render(root, &mut canvas).rasterized, 1);
        assert_eq!(store.render(root, &mut canvas).rasterized, 0);
    }

    #[test]
    fn destroyed_bitmaps_are_released_on_next_render() {
        let mut store = NodeStore::new();
        let root = store.create_node();
        let n = boxed(&mut store, root, CacheMode::Bitmap);
        let mut canvas = RecordingCanvas::new();
        store.render(root, &mut canvas);
        assert_eq!(canvas.live_bitmaps().len(), 1);

        store.destroy(n).unwrap();
        store.render(root, &mut canvas);
        assert!(canvas.live_bitmaps().is_empty());
    }

    #[test]
    fn failures_are_isolated() {
        let mut store = NodeStore::new();
        let root = store.create_node();
        let label = store.create_node();
        let mut list = InstructionList::new();
        list.text("oops", Font::default(), (0.0, 0.0));
        store.set_instructions(label, list).unwrap();
        store.add_child(root, label).unwrap();
        let cached = boxed(&mut store, root, CacheMode::Bitmap);
        let sibling = boxed(&mut store, root, CacheMode::Paths);

        let mut canvas = RecordingCanvas::new();
        canvas.set_fail_text(true);
        canvas.set_fail_bitmaps(true);
        let stats = store.render(root, &mut canvas);
        assert_eq!(stats.failed, 2, "text and bitmap failures");
        assert_eq!(stats.painted, 1, "the path sibling still renders");
        assert!(
            canvas
                .commands()
                .iter()
                .any(|c| matches!(c, Command::Fill { .. })),
            "{sibling:?} was drawn"
        );

        canvas.set_fail_bitmaps(false);
        let stats = store.render(root, &mut canvas);
        assert_eq!(stats.rasterized, 1, "{cached:?} recovers");
    }

    #[test]
    fn failed_raster_keeps_clipping_descendants() {
        let mut store = NodeStore::new();
        let root = store.create_node();
        let parent = store.create_node();
        let mut list = InstructionList::new();
        list.rectangle(Rect::new(0.0, 0.0, 20.0, 20.0))
            .clip()
            .fill_rect(Rect::new(0.0, 0.0, 20.0, 20.0), red());
        store.set_instructions(parent, list).unwrap();
        store.set_cache_mode(parent, CacheMode::Bitmap).unwrap();
        store.add_child(root, parent).unwrap();
        let child = store.create_node();
        let mut list = InstructionList::new();
        list.fill_rect(Rect::new(0.0, 0.0, 100.0, 100.0), red());
        store.set_instructions(child, list).unwrap();
        store.add_child(parent, child).unwrap();

        let mut canvas = RecordingCanvas::new();
        canvas.set_fail_bitmaps(true);
        let stats = store.render(root, &mut canvas);
        assert_eq!(stats.failed, 1, "parent raster failed");
        assert_eq!(stats.painted, 1, "child still painted");

        let cmds = canvas.commands();
        let clip = cmds.iter().position(|c| matches!(c, Command::Clip(..)));
        let child_fill = cmds.iter().position(|c| matches!(c, Command::Fill { .. }));
        assert!(clip.is_some(), "parent clip applied: {cmds:?}");
        assert!(clip < child_fill, "clip precedes the child's fill");
    }

    #[test]
    fn hidden_subtrees_are_not_painted() {
        let mut store = NodeStore::new();
        let root = store.create_node();
        let group = store.create_node();
        store.add_child(root, group).unwrap();
        boxed(&mut store, group, CacheMode::Paths);
        store.set_visible(group, false).unwrap();

        let mut canvas = RecordingCanvas::new();
        let stats = store.render(root, &mut canvas);
        assert_eq!(stats.painted, 0);
    }
}
