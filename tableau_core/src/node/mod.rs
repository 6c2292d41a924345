// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene graph data model.
//!
//! A *node* is an element of a 2D scene tree. Each node has:
//!
//! - An identity ([`NodeId`]), a generational handle that becomes stale when
//!   the node is destroyed.
//! - Topology: a parent link and an ordered child list. Children paint in
//!   ascending [`z_order`](NodeStore::set_z_order), ties in insertion order.
//! - **Local properties** set by the caller: a [`LocalTransform`], opacity,
//!   visibility, [`NodeFlags`], drawing [instructions](crate::draw) with a
//!   [`CacheMode`], and [`LayoutProps`].
//! - **Derived properties**: the world matrix (product of ancestor local
//!   matrices), effective opacity, compiled geometry, bitmap cache, and
//!   layout results.
//!
//! Nodes are stored struct-of-arrays with index-based handles.
//!
//! # Dirty tracking
//!
//! Property writes mark the corresponding [`dirty`](crate::dirty) channel:
//!
//! - **TRANSFORM** / **OPACITY**: propagate eagerly to all descendants, whose
//!   derived values are recomputed on the next query or
//!   [`evaluate`](NodeStore::evaluate).
//! - **CONTENT**: local only; drops the compiled geometry and invalidates a
//!   bitmap cache.
//! - **TOPOLOGY**: structural changes.
//!
//! Size-relevant writes bypass the channels and mark the node and its
//! ancestors as needing a [layout](crate::layout) pass instead.

mod attr;
mod evaluate;
mod hit;
mod id;
mod props;
mod render;
mod store;
mod traverse;

pub use attr::{AttrCategory, Edge, NodeAttr};
pub use evaluate::FrameChanges;
pub use id::{BitmapId, INVALID, NodeId};
pub use props::{CacheMode, GridCell, Insets, LayoutProps, LocalTransform, NodeFlags};
pub use render::RenderStats;
pub use store::{DEFAULT_BITMAP_MARGIN, NodeStore};
pub use traverse::{Ancestors, Children};
