// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input events in, scene events out.
//!
//! A windowing layer feeds raw [`InputEvent`]s to the scene, which queues
//! them until the input phase of the next frame. There each event is
//! hit-tested and turned into zero or more [`SceneEvent`]s, whose
//! [`EventKind`] selects the handlers registered for the target node.

use kurbo::{Point, Vec2};

use crate::node::NodeId;
use crate::time::HostTime;

/// Keyboard modifier state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    /// Shift key.
    pub shift: bool,
    /// Control key.
    pub ctrl: bool,
    /// Alt / Option key.
    pub alt: bool,
    /// Meta / Command / Super key.
    pub meta: bool,
}

impl Modifiers {
    /// No modifiers held.
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// Returns `true` if no modifier is held.
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Self::NONE
    }
}

/// A pointer button.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Primary (usually left) button.
    #[default]
    Primary,
    /// Secondary (usually right) button.
    Secondary,
    /// Middle button or wheel press.
    Auxiliary,
}

/// A raw event from the windowing layer. Positions are in scene space.
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    /// The pointer moved.
    PointerMove {
        /// New position.
        position: Point,
        /// Modifier state.
        modifiers: Modifiers,
        /// When it happened.
        time: HostTime,
    },
    /// A pointer button was pressed.
    PointerDown {
        /// Pointer position.
        position: Point,
        /// Which button.
        button: PointerButton,
        /// Modifier state.
        modifiers: Modifiers,
        /// When it happened.
        time: HostTime,
    },
    /// A pointer button was released.
    PointerUp {
        /// Pointer position.
        position: Point,
        /// Which button.
        button: PointerButton,
        /// Modifier state.
        modifiers: Modifiers,
        /// When it happened.
        time: HostTime,
    },
    /// The wheel or touchpad scrolled.
    Scroll {
        /// Pointer position.
        position: Point,
        /// Scroll amount.
        delta: Vec2,
        /// Modifier state.
        modifiers: Modifiers,
        /// When it happened.
        time: HostTime,
    },
    /// A key was pressed.
    KeyDown {
        /// Logical key name, such as `"a"` or `"Enter"`.
        key: String,
        /// Modifier state.
        modifiers: Modifiers,
        /// When it happened.
        time: HostTime,
    },
    /// A key was released.
    KeyUp {
        /// Logical key name.
        key: String,
        /// Modifier state.
        modifiers: Modifiers,
        /// When it happened.
        time: HostTime,
    },
}

impl InputEvent {
    /// Returns the time stamp of the event.
    #[must_use]
    pub fn time(&self) -> HostTime {
        match self {
            Self::PointerMove { time, .. }
            | Self::PointerDown { time, .. }
            | Self::PointerUp { time, .. }
            | Self::Scroll { time, .. }
            | Self::KeyDown { time, .. }
            | Self::KeyUp { time, .. } => *time,
        }
    }

    /// Returns the modifier state carried by the event.
    #[must_use]
    pub fn modifiers(&self) -> Modifiers {
        match self {
            Self::PointerMove { modifiers, .. }
            | Self::PointerDown { modifiers, .. }
            | Self::PointerUp { modifiers, .. }
            | Self::Scroll { modifiers, .. }
            | Self::KeyDown { modifiers, .. }
            | Self::KeyUp { modifiers, .. } => *modifiers,
        }
    }

    /// Returns the pointer position, if the event has one.
    #[must_use]
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::PointerMove { position, .. }
            | Self::PointerDown { position, .. }
            | Self::PointerUp { position, .. }
            | Self::Scroll { position, .. } => Some(*position),
            Self::KeyDown { .. } | Self::KeyUp { .. } => None,
        }
    }
}

/// The closed set of events delivered to node handlers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    /// The pointer entered the node.
    PointerOver,
    /// The pointer left the node.
    PointerOut,
    /// The pointer moved over the node.
    PointerMove,
    /// A button was pressed over the node.
    PointerDown,
    /// A button was released over the node.
    PointerUp,
    /// A press and release on the same node.
    Click,
    /// The pointer moved past the drag threshold while pressing a draggable
    /// node.
    DragStart,
    /// The pointer moved during a drag.
    DragMove,
    /// The button was released during a drag.
    DragEnd,
    /// Scrolling over the node.
    Scroll,
    /// A key was pressed while the node had focus.
    KeyDown,
    /// A key was released while the node had focus.
    KeyUp,
    /// The node gained keyboard focus.
    FocusIn,
    /// The node lost keyboard focus.
    FocusOut,
}

impl EventKind {
    /// Returns `true` if the event is also delivered to the target's
    /// ancestors, innermost first.
    #[must_use]
    pub const fn bubbles(self) -> bool {
        !matches!(
            self,
            Self::PointerOver | Self::PointerOut | Self::FocusIn | Self::FocusOut
        )
    }
}

/// Kind-specific payload of a [`SceneEvent`].
#[derive(Clone, Debug, Default, PartialEq)]
pub enum EventDetail {
    /// No payload.
    #[default]
    None,
    /// A pointer event.
    Pointer {
        /// Position in scene space.
        position: Point,
        /// Position in the target's local space, if its matrix is
        /// invertible.
        local: Option<Point>,
        /// The button involved, if any.
        button: Option<PointerButton>,
    },
    /// A drag event.
    Drag {
        /// Position in scene space.
        position: Point,
        /// Total movement since the press, in scene space.
        offset: Vec2,
    },
    /// A scroll event.
    Scroll {
        /// Position in scene space.
        position: Point,
        /// Scroll amount.
        delta: Vec2,
    },
    /// A key event.
    Key {
        /// Logical key name.
        key: String,
    },
}

/// An event delivered to the handlers of a node.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneEvent {
    /// What happened.
    pub kind: EventKind,
    /// The node the event is aimed at.
    pub target: NodeId,
    /// The node whose handlers are running. Differs from `target` while the
    /// event bubbles.
    pub current: NodeId,
    /// Time stamp of the input that caused it.
    pub time: HostTime,
    /// Modifier state at that time.
    pub modifiers: Modifiers,
    /// Kind-specific payload.
    pub detail: EventDetail,
}

impl SceneEvent {
    /// Returns the scene-space pointer position, if the event has one.
    #[must_use]
    pub fn position(&self) -> Option<Point> {
        match &self.detail {
            EventDetail::Pointer { position, .. }
            | EventDetail::Drag { position, .. }
            | EventDetail::Scroll { position, .. } => Some(*position),
            EventDetail::None | EventDetail::Key { .. } => None,
        }
    }
}
