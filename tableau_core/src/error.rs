// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! Structural errors surface synchronously from the mutating call that caused
//! them. Render failures are reported per node as [`RenderError`]; the frame
//! loop logs and skips them instead of aborting the frame.

use crate::node::NodeId;

/// Errors returned by scene-graph, tweening and dispatch operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A node was added to itself or to one of its own descendants.
    #[error("cannot add {child:?} under {parent:?}: it would become its own ancestor")]
    InvalidHierarchy {
        /// The would-be parent.
        parent: NodeId,
        /// The node being added.
        child: NodeId,
    },
    /// An animated attribute does not exist on the target, or its value has
    /// no interpolation rule.
    #[error("attribute `{attribute}` cannot be animated")]
    UnknownAttribute {
        /// Name of the rejected attribute.
        attribute: String,
    },
    /// The handle refers to a destroyed node, or to a node that is no longer
    /// attached where attachment is required.
    #[error("stale node handle {0:?}")]
    StaleNode(NodeId),
}

/// Errors reported by a [`Canvas`](crate::draw::Canvas) while painting a node.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// The canvas could not provide an offscreen surface.
    #[error("offscreen surface of {width}x{height} unavailable")]
    SurfaceUnavailable {
        /// Requested width in device pixels.
        width: u32,
        /// Requested height in device pixels.
        height: u32,
    },
    /// Text could not be drawn (missing font, shaping failure, ...).
    #[error("text rendering failed: {0}")]
    Text(String),
}

/// Shorthand for results carrying [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;
