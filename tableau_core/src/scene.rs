// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The frame loop: a node tree with its tweener, pacer and input state.
//!
//! A [`Scene`] runs one frame per [`tick`](Scene::tick) when its
//! [`FramePacer`] says a frame is due. Each frame performs, in order:
//!
//! 1. **Tween**: advance the tweener by the measured wall-clock delta.
//! 2. **Layout**: run pending measure and arrange passes.
//! 3. **Render**: evaluate derived state and paint the tree.
//! 4. **Input**: hit-test queued [`InputEvent`]s and dispatch the resulting
//!    [`SceneEvent`]s to node handlers.
//!
//! Mutations between frames raise the store's redraw flag; the pacer folds
//! them into a single pending frame. While tweens are running the pacer
//! runs continuously.
//!
//! # Dispatch
//!
//! Handlers are registered per `(node, EventKind)` with
//! [`connect`](Scene::connect) and receive `&mut Scene`, so they may mutate
//! the tree, including detaching or destroying nodes that are about to
//! receive an event. Each input is therefore turned into its full list of
//! scene events first, and the delivery path of each event (target, then
//! ancestors for bubbling kinds) is snapshotted before any handler runs.
//! Every delivery re-checks that the receiving node is still attached to the
//! scene root and skips it otherwise.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use kurbo::{Point, Size};
use log::debug;

use crate::draw::{Canvas, TextMeasure};
use crate::error::{Error, Result};
use crate::event::{EventDetail, EventKind, InputEvent, Modifiers, PointerButton, SceneEvent};
use crate::node::{DEFAULT_BITMAP_MARGIN, FrameChanges, NodeId, NodeStore, RenderStats};
use crate::pacing::{FramePacer, PacerConfig};
use crate::time::{Clock, HostTime, MonotonicClock};
use crate::trace::{
    DispatchEvent, FrameSummaryBuilder, FrameTickEvent, PhaseBeginEvent, PhaseEndEvent,
    PhaseKind, Tracer,
};
use crate::tween::{Animation, Easing, TweenOptions, Tweener, Value};

/// Scene-wide settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneConfig {
    /// Frame pacing.
    pub pacer: PacerConfig,
    /// Distance in scene units the pointer must travel while pressing a
    /// draggable node before a drag starts.
    pub drag_threshold: f64,
    /// Device pixels added around bitmap caches.
    pub bitmap_margin: f64,
    /// Easing applied by [`Scene::tween`].
    pub default_easing: Easing,
}

impl SceneConfig {
    /// 60 fps, mouse-sized drag threshold.
    #[must_use]
    pub const fn interactive() -> Self {
        Self {
            pacer: PacerConfig::interactive(),
            drag_threshold: 4.0,
            bitmap_margin: DEFAULT_BITMAP_MARGIN,
            default_easing: Easing::DEFAULT,
        }
    }

    /// 30 fps, touch-sized drag threshold.
    #[must_use]
    pub const fn low_power() -> Self {
        Self {
            pacer: PacerConfig::low_power(),
            drag_threshold: 8.0,
            bitmap_margin: DEFAULT_BITMAP_MARGIN,
            default_easing: Easing::DEFAULT,
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::interactive()
    }
}

/// What one [`Scene::tick`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameStats {
    /// Frame counter.
    pub frame_index: u64,
    /// Seconds the tweener was advanced by.
    pub delta_secs: f64,
    /// Whether a layout pass ran.
    pub layout_ran: bool,
    /// Render counters.
    pub render: RenderStats,
    /// Handler invocations during the input phase.
    pub dispatched: usize,
}

/// A handler connected with [`Scene::connect`].
pub type EventHandler = Box<dyn FnMut(&mut Scene, &SceneEvent)>;

/// Identifies a connected handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandlerId(u64);

struct HandlerSlot {
    id: HandlerId,
    /// `None` while the handler is running.
    handler: Option<EventHandler>,
}

/// An active pointer press.
#[derive(Clone, Copy, Debug)]
struct Press {
    node: NodeId,
    button: PointerButton,
    origin: Point,
    dragging: bool,
}

/// A node tree driven by a frame loop.
pub struct Scene {
    nodes: NodeStore,
    tweener: Tweener<NodeId>,
    root: NodeId,
    config: SceneConfig,
    pacer: FramePacer,
    clock: Box<dyn Clock>,
    changes: FrameChanges,
    input: VecDeque<InputEvent>,
    pointer: Option<Point>,
    hovered: Option<NodeId>,
    press: Option<Press>,
    focus: Option<NodeId>,
    handlers: BTreeMap<(NodeId, EventKind), Vec<HandlerSlot>>,
    next_handler: u64,
}

impl core::fmt::Debug for Scene {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Scene")
            .field("root", &self.root)
            .field("nodes", &self.nodes.node_count())
            .field("tweens", &self.tweener.active_count())
            .field("pacer", &self.pacer)
            .field("hovered", &self.hovered)
            .field("focus", &self.focus)
            .field("handlers", &self.handlers.len())
            .finish_non_exhaustive()
    }
}

impl Scene {
    /// Creates a scene with a single root node, timed by a
    /// [`MonotonicClock`].
    #[must_use]
    pub fn new(config: SceneConfig) -> Self {
        Self::with_clock(config, MonotonicClock::new())
    }

    /// Creates a scene timed by `clock`.
    #[must_use]
    pub fn with_clock(config: SceneConfig, clock: impl Clock + 'static) -> Self {
        let mut nodes = NodeStore::new();
        nodes.set_bitmap_margin(config.bitmap_margin);
        let root = nodes.create_node();
        Self {
            nodes,
            tweener: Tweener::new(),
            root,
            pacer: FramePacer::new(config.pacer, clock.timebase()),
            clock: Box::new(clock),
            config,
            changes: FrameChanges::default(),
            input: VecDeque::new(),
            pointer: None,
            hovered: None,
            press: None,
            focus: None,
            handlers: BTreeMap::new(),
            next_handler: 0,
        }
    }

    /// Returns the root node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Returns the node store.
    #[must_use]
    pub fn nodes(&self) -> &NodeStore {
        &self.nodes
    }

    /// Returns the node store for direct mutation.
    ///
    /// Changes made here are picked up by the next frame. Nodes detached this
    /// way keep their hover and focus state until the next input touches
    /// them; prefer [`remove_child`](Self::remove_child) and
    /// [`destroy`](Self::destroy).
    pub fn nodes_mut(&mut self) -> &mut NodeStore {
        &mut self.nodes
    }

    /// Returns the tweener.
    #[must_use]
    pub fn tweener(&self) -> &Tweener<NodeId> {
        &self.tweener
    }

    /// Returns the frame pacer.
    #[must_use]
    pub fn pacer(&self) -> &FramePacer {
        &self.pacer
    }

    /// Returns the changes reported by the last render.
    #[must_use]
    pub fn last_changes(&self) -> &FrameChanges {
        &self.changes
    }

    /// Returns the current clock reading.
    #[must_use]
    pub fn now(&self) -> HostTime {
        self.clock.now()
    }

    // -- Tree --

    /// Creates a detached node.
    pub fn create_node(&mut self) -> NodeId {
        self.nodes.create_node()
    }

    /// Appends `child` to `parent`. See [`NodeStore::add_child`].
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.nodes.add_child(parent, child)
    }

    /// Detaches `node` from its parent, dropping hover and focus state that
    /// pointed into its subtree.
    pub fn remove_child(&mut self, node: NodeId) -> Result<()> {
        self.nodes.remove_child(node)?;
        self.forget_detached();
        Ok(())
    }

    /// Destroys `node` and its subtree, killing their tweens and
    /// disconnecting their handlers.
    pub fn destroy(&mut self, node: NodeId) -> Result<Vec<NodeId>> {
        let destroyed = self.nodes.destroy(node)?;
        let gone: BTreeSet<NodeId> = destroyed.iter().copied().collect();
        for &n in &destroyed {
            self.tweener.kill(n);
        }
        self.handlers.retain(|(n, _), _| !gone.contains(n));
        self.forget_detached();
        Ok(destroyed)
    }

    /// Returns `true` if `node` is alive and reachable from the root.
    #[must_use]
    pub fn is_attached(&self, node: NodeId) -> bool {
        self.nodes.is_descendant_of(node, self.root)
    }

    /// Returns the minimum size of `node`, margin included.
    pub fn min_size(&mut self, node: NodeId) -> Option<Size> {
        self.nodes.min_size(node)
    }

    /// Returns the topmost interactive node under the scene point.
    pub fn node_at(&mut self, point: Point, measure: &dyn TextMeasure) -> Option<NodeId> {
        self.nodes.update_layout();
        self.nodes.node_at(self.root, point, measure)
    }

    fn forget_detached(&mut self) {
        if self.hovered.is_some_and(|n| !self.is_attached(n)) {
            self.hovered = None;
        }
        if self.focus.is_some_and(|n| !self.is_attached(n)) {
            self.focus = None;
        }
        if self.press.is_some_and(|p| !self.is_attached(p.node)) {
            self.press = None;
        }
    }

    // -- Animation --

    /// Returns tween options for `duration` seconds using the scene's
    /// default easing.
    #[must_use]
    pub fn tween(&self, duration: f64) -> TweenOptions<NodeId> {
        TweenOptions::new(duration).easing(self.config.default_easing)
    }

    /// Starts animating attributes of `target`. See [`Tweener::animate`].
    pub fn animate<I, S>(
        &mut self,
        target: NodeId,
        attrs: I,
        options: TweenOptions<NodeId>,
    ) -> Animation
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        let animation = self.tweener.animate(&self.nodes, target, attrs, options);
        if animation.tween.is_some() {
            self.nodes.request_redraw();
        }
        animation
    }

    /// Stops every tween on `target` without completing it.
    pub fn kill(&mut self, target: NodeId) -> bool {
        self.tweener.kill(target)
    }

    /// Jumps every tween to its end and clears the tweener.
    pub fn finish(&mut self) {
        self.tweener.finish(&mut self.nodes);
    }

    /// Advances tweens by `dt` seconds and runs pending layout, without
    /// rendering or consulting the pacer.
    pub fn advance(&mut self, dt: f64) {
        self.tweener.update(&mut self.nodes, dt);
        self.nodes.update_layout();
    }

    // -- Frame loop --

    /// Runs a frame if one is due. Returns `None` if the pacer had nothing
    /// to do.
    pub fn tick(&mut self, canvas: &mut dyn Canvas) -> Option<FrameStats> {
        self.tick_traced(canvas, &mut Tracer::none())
    }

    /// Like [`tick`](Self::tick), reporting phases to `tracer`.
    pub fn tick_traced(
        &mut self,
        canvas: &mut dyn Canvas,
        tracer: &mut Tracer<'_>,
    ) -> Option<FrameStats> {
        let now = self.clock.now();
        self.schedule(now);
        let tick = self.pacer.poll(now)?;
        let tick_event = FrameTickEvent::from(&tick);
        tracer.frame_tick(&tick_event);
        let mut summary = FrameSummaryBuilder::new(&tick_event);
        let frame = tick.frame_index;
        let dt = tick.delta.as_secs_f64(self.pacer.timebase());

        self.phase_begin(tracer, &mut summary, frame, PhaseKind::Tween);
        self.tweener.update(&mut self.nodes, dt);
        self.phase_end(tracer, &mut summary, frame, PhaseKind::Tween);

        self.phase_begin(tracer, &mut summary, frame, PhaseKind::Layout);
        let layout_ran = self.nodes.update_layout();
        self.phase_end(tracer, &mut summary, frame, PhaseKind::Layout);

        self.phase_begin(tracer, &mut summary, frame, PhaseKind::Render);
        let render = self.render(canvas);
        self.phase_end(tracer, &mut summary, frame, PhaseKind::Render);

        self.phase_begin(tracer, &mut summary, frame, PhaseKind::Input);
        let dispatched = self.process_input(&*canvas, tracer, frame);
        self.phase_end(tracer, &mut summary, frame, PhaseKind::Input);

        self.pacer.frame_done(tick.now, self.clock.now());
        self.pacer.set_continuous(!self.tweener.is_empty());

        summary.set_render(render);
        summary.set_dispatched(dispatched);
        tracer.frame_summary(&summary.finish());

        Some(FrameStats {
            frame_index: frame,
            delta_secs: dt,
            layout_ran,
            render,
            dispatched,
        })
    }

    /// Returns when the next frame is due, or `None` while idle.
    pub fn next_frame_due(&mut self) -> Option<HostTime> {
        let now = self.clock.now();
        self.schedule(now);
        self.pacer.next_due()
    }

    /// Lays out, evaluates and paints the tree immediately.
    pub fn render(&mut self, canvas: &mut dyn Canvas) -> RenderStats {
        self.nodes.update_layout();
        self.nodes.evaluate_into(&mut self.changes);
        self.nodes.take_redraw_request();
        self.nodes.render(self.root, canvas)
    }

    fn schedule(&mut self, now: HostTime) {
        let animating = !self.tweener.is_empty();
        if animating || self.nodes.redraw_requested() || !self.input.is_empty() {
            self.pacer.request_frame(now);
        }
        self.pacer.set_continuous(animating);
    }

    fn phase_begin(
        &self,
        tracer: &mut Tracer<'_>,
        summary: &mut FrameSummaryBuilder,
        frame_index: u64,
        phase: PhaseKind,
    ) {
        let timestamp = self.clock.now();
        summary.phase_begin(phase, timestamp);
        tracer.phase_begin(&PhaseBeginEvent {
            frame_index,
            phase,
            timestamp,
        });
    }

    fn phase_end(
        &self,
        tracer: &mut Tracer<'_>,
        summary: &mut FrameSummaryBuilder,
        frame_index: u64,
        phase: PhaseKind,
    ) {
        let timestamp = self.clock.now();
        summary.phase_end(phase, timestamp);
        tracer.phase_end(&PhaseEndEvent {
            frame_index,
            phase,
            timestamp,
        });
    }

    // -- Input --

    /// Queues an input event for the next frame's input phase.
    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push_back(event);
    }

    /// Processes all queued input now, using `measure` for any text geometry
    /// that hit-testing needs. Returns the number of handler invocations.
    pub fn dispatch_input(&mut self, measure: &dyn TextMeasure) -> usize {
        let frame = self.pacer.frame_count();
        self.process_input(measure, &mut Tracer::none(), frame)
    }

    /// Returns the last known pointer position.
    #[must_use]
    pub fn pointer(&self) -> Option<Point> {
        self.pointer
    }

    /// Returns the node under the pointer.
    #[must_use]
    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    /// Returns the node holding keyboard focus.
    #[must_use]
    pub fn focus(&self) -> Option<NodeId> {
        self.focus
    }

    /// Returns `true` while a drag is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.press.is_some_and(|p| p.dragging && self.is_attached(p.node))
    }

    /// Moves keyboard focus, delivering focus-out and focus-in events.
    ///
    /// # Errors
    ///
    /// [`Error::StaleNode`] if `node` is stale or not attached to the root.
    pub fn set_focus(&mut self, node: Option<NodeId>) -> Result<()> {
        if let Some(n) = node {
            if !self.is_attached(n) {
                return Err(Error::StaleNode(n));
            }
        }
        let mut events = Vec::new();
        let now = self.clock.now();
        self.change_focus(node, now, Modifiers::NONE, &mut events);
        let frame = self.pacer.frame_count();
        for event in events {
            self.deliver(event, &mut Tracer::none(), frame);
        }
        Ok(())
    }

    /// Connects `handler` to events of `kind` aimed at `node` (or bubbling
    /// through it).
    ///
    /// # Errors
    ///
    /// [`Error::StaleNode`] for a stale handle.
    pub fn connect(
        &mut self,
        node: NodeId,
        kind: EventKind,
        handler: impl FnMut(&mut Self, &SceneEvent) + 'static,
    ) -> Result<HandlerId> {
        if !self.nodes.is_alive(node) {
            return Err(Error::StaleNode(node));
        }
        let id = HandlerId(self.next_handler);
        self.next_handler += 1;
        self.handlers
            .entry((node, kind))
            .or_default()
            .push(HandlerSlot {
                id,
                handler: Some(Box::new(handler)),
            });
        Ok(id)
    }

    /// Disconnects a handler. Safe to call from inside the handler itself.
    ///
    /// Returns `false` if it was not connected.
    pub fn disconnect(&mut self, id: HandlerId) -> bool {
        let mut found = false;
        self.handlers.retain(|_, slots| {
            let before = slots.len();
            slots.retain(|s| s.id != id);
            found |= slots.len() != before;
            !slots.is_empty()
        });
        found
    }

    fn process_input(
        &mut self,
        measure: &dyn TextMeasure,
        tracer: &mut Tracer<'_>,
        frame_index: u64,
    ) -> usize {
        let mut dispatched = 0;
        while let Some(input) = self.input.pop_front() {
            let events = self.translate(input, measure);
            for event in events {
                dispatched += self.deliver(event, tracer, frame_index);
            }
        }
        dispatched
    }

    /// Turns one input into the scene events it causes, updating hover,
    /// press and focus state.
    fn translate(&mut self, input: InputEvent, measure: &dyn TextMeasure) -> Vec<SceneEvent> {
        let time = input.time();
        let modifiers = input.modifiers();
        let mut events = Vec::new();
        self.drop_detached_drag();
        let hit = match input.position() {
            Some(position) => {
                self.pointer = Some(position);
                let hit = self.node_at(position, measure);
                self.update_hover(hit, position, time, modifiers, &mut events);
                hit
            }
            None => None,
        };

        match input {
            InputEvent::PointerMove { position, .. } => {
                if let Some(mut press) = self.press {
                    let offset = position - press.origin;
                    if press.dragging {
                        events.push(scene_event(
                            EventKind::DragMove,
                            press.node,
                            time,
                            modifiers,
                            EventDetail::Drag { position, offset },
                        ));
                        return events;
                    }
                    if self.is_draggable(press.node) && offset.hypot() >= self.config.drag_threshold
                    {
                        press.dragging = true;
                        self.press = Some(press);
                        events.push(scene_event(
                            EventKind::DragStart,
                            press.node,
                            time,
                            modifiers,
                            EventDetail::Drag { position, offset },
                        ));
                        return events;
                    }
                }
                if let Some(hit) = hit {
                    let detail = self.pointer_detail(hit, position, None);
                    events.push(scene_event(EventKind::PointerMove, hit, time, modifiers, detail));
                }
            }
            InputEvent::PointerDown {
                position, button, ..
            } => {
                self.press = hit.map(|node| Press {
                    node,
                    button,
                    origin: position,
                    dragging: false,
                });
                if let Some(hit) = hit {
                    let detail = self.pointer_detail(hit, position, Some(button));
                    events.push(scene_event(EventKind::PointerDown, hit, time, modifiers, detail));
                }
                let focus = hit.and_then(|hit| self.focusable_ancestor(hit));
                self.change_focus(focus, time, modifiers, &mut events);
            }
            InputEvent::PointerUp {
                position, button, ..
            } => {
                let press = self.press.filter(|p| p.button == button);
                if press.is_some() {
                    self.press = None;
                }
                if let Some(p) = press.filter(|p| p.dragging) {
                    events.push(scene_event(
                        EventKind::DragEnd,
                        p.node,
                        time,
                        modifiers,
                        EventDetail::Drag {
                            position,
                            offset: position - p.origin,
                        },
                    ));
                }
                if let Some(hit) = hit {
                    let detail = self.pointer_detail(hit, position, Some(button));
                    events.push(scene_event(EventKind::PointerUp, hit, time, modifiers, detail));
                }
                if let Some(p) = press.filter(|p| !p.dragging) {
                    if hit == Some(p.node) {
                        let detail = self.pointer_detail(p.node, position, Some(button));
                        events.push(scene_event(EventKind::Click, p.node, time, modifiers, detail));
                    } else if !self.is_attached(p.node) {
                        debug!("no click: {}", Error::StaleNode(p.node));
                    }
                }
            }
            InputEvent::Scroll {
                position, delta, ..
            } => {
                if let Some(hit) = hit {
                    events.push(scene_event(
                        EventKind::Scroll,
                        hit,
                        time,
                        modifiers,
                        EventDetail::Scroll { position, delta },
                    ));
                }
            }
            InputEvent::KeyDown { key, .. } => {
                if let Some(focus) = self.live_focus() {
                    events.push(scene_event(
                        EventKind::KeyDown,
                        focus,
                        time,
                        modifiers,
                        EventDetail::Key { key },
                    ));
                }
            }
            InputEvent::KeyUp { key, .. } => {
                if let Some(focus) = self.live_focus() {
                    events.push(scene_event(
                        EventKind::KeyUp,
                        focus,
                        time,
                        modifiers,
                        EventDetail::Key { key },
                    ));
                }
            }
        }
        events
    }

    fn update_hover(
        &mut self,
        hit: Option<NodeId>,
        position: Point,
        time: HostTime,
        modifiers: Modifiers,
        events: &mut Vec<SceneEvent>,
    ) {
        if hit == self.hovered {
            return;
        }
        if let Some(old) = self.hovered {
            let detail = self.pointer_detail(old, position, None);
            events.push(scene_event(EventKind::PointerOut, old, time, modifiers, detail));
        }
        if let Some(new) = hit {
            let detail = self.pointer_detail(new, position, None);
            events.push(scene_event(EventKind::PointerOver, new, time, modifiers, detail));
        }
        self.hovered = hit;
    }

    fn change_focus(
        &mut self,
        focus: Option<NodeId>,
        time: HostTime,
        modifiers: Modifiers,
        events: &mut Vec<SceneEvent>,
    ) {
        if focus == self.focus {
            return;
        }
        if let Some(old) = self.focus {
            events.push(scene_event(
                EventKind::FocusOut,
                old,
                time,
                modifiers,
                EventDetail::None,
            ));
        }
        if let Some(new) = focus {
            events.push(scene_event(
                EventKind::FocusIn,
                new,
                time,
                modifiers,
                EventDetail::None,
            ));
        }
        self.focus = focus;
    }

    /// Returns the focused node, dropping focus from a detached one.
    /// Cancels a drag whose node was detached through [`Self::nodes_mut`].
    fn drop_detached_drag(&mut self) {
        if let Some(press) = self.press.filter(|p| p.dragging && !self.is_attached(p.node)) {
            debug!("cancelling drag: {}", Error::StaleNode(press.node));
            self.press = None;
        }
    }

    fn live_focus(&mut self) -> Option<NodeId> {
        let focus = self.focus?;
        if self.is_attached(focus) {
            Some(focus)
        } else {
            debug!("dropping focus: {}", Error::StaleNode(focus));
            self.focus = None;
            None
        }
    }

    fn is_draggable(&self, node: NodeId) -> bool {
        self.nodes.flags(node).is_some_and(|f| f.draggable)
    }

    /// The nearest focusable node among `node` and its ancestors.
    fn focusable_ancestor(&self, node: NodeId) -> Option<NodeId> {
        core::iter::once(node)
            .chain(self.nodes.ancestors(node))
            .find(|&n| self.nodes.flags(n).is_some_and(|f| f.focusable))
    }

    fn pointer_detail(
        &mut self,
        target: NodeId,
        position: Point,
        button: Option<PointerButton>,
    ) -> EventDetail {
        EventDetail::Pointer {
            position,
            local: self.nodes.to_local(target, position),
            button,
        }
    }

    /// Runs the handlers for `event`, returning how many were invoked.
    fn deliver(&mut self, event: SceneEvent, tracer: &mut Tracer<'_>, frame_index: u64) -> usize {
        let kind = event.kind;
        if !self.is_attached(event.target) {
            debug!("dropping {kind:?}: {}", Error::StaleNode(event.target));
            return 0;
        }
        let mut path = vec![event.target];
        if kind.bubbles() {
            path.extend(self.nodes.ancestors(event.target));
        }
        let plan: Vec<(NodeId, Vec<HandlerId>)> = path
            .into_iter()
            .map(|node| (node, self.handler_ids(node, kind)))
            .filter(|(_, ids)| !ids.is_empty())
            .collect();

        let mut invoked = 0;
        for (node, ids) in plan {
            for id in ids {
                if !self.is_attached(node) {
                    debug!("skipping {kind:?} on {node:?}: detached during dispatch");
                    break;
                }
                let Some(mut handler) = self.take_handler(node, kind, id) else {
                    continue;
                };
                let current = SceneEvent {
                    current: node,
                    ..event.clone()
                };
                handler(self, &current);
                invoked += 1;
                self.restore_handler(node, kind, id, handler);
            }
        }
        if invoked > 0 {
            tracer.dispatch(&DispatchEvent {
                frame_index,
                kind,
                target: event.target,
                handlers: invoked,
            });
        }
        invoked
    }

    fn handler_ids(&self, node: NodeId, kind: EventKind) -> Vec<HandlerId> {
        self.handlers
            .get(&(node, kind))
            .map(|slots| {
                slots
                    .iter()
                    .filter(|s| s.handler.is_some())
                    .map(|s| s.id)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn take_handler(&mut self, node: NodeId, kind: EventKind, id: HandlerId) -> Option<EventHandler> {
        self.handlers
            .get_mut(&(node, kind))?
            .iter_mut()
            .find(|s| s.id == id)?
            .handler
            .take()
    }

    /// Puts a handler back after it ran, unless it was disconnected meanwhile.
    fn restore_handler(&mut self, node: NodeId, kind: EventKind, id: HandlerId, handler: EventHandler) {
        if let Some(slot) = self
            .handlers
            .get_mut(&(node, kind))
            .and_then(|slots| slots.iter_mut().find(|s| s.id == id))
        {
            slot.handler = Some(handler);
        }
    }
}

fn scene_event(
    kind: EventKind,
    target: NodeId,
    time: HostTime,
    modifiers: Modifiers,
    detail: EventDetail,
) -> SceneEvent {
    SceneEvent {
        kind,
        target,
        current: target,
        time,
        modifiers,
        detail,
    }
}
