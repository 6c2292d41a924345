// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! Node mutations mark channels in an [`understory_dirty`] tracker owned by
//! the [`NodeStore`](crate::node::NodeStore). Each channel is an independent
//! category of change.
//!
//! - **Propagating**: [`TRANSFORM`] and [`OPACITY`] are marked with
//!   [`EagerPolicy`](understory_dirty::EagerPolicy) and carry child-on-parent
//!   dependency edges, so marking a node marks its whole subtree. This is the
//!   "parent matrix dirty" state: descendants recompute their world matrix
//!   on the next query or evaluation.
//! - **Local-only**: [`CONTENT`] is marked when a node's drawing
//!   instructions or cache mode change. Draining it drops the node's compiled
//!   geometry and invalidates its bitmap cache.
//! - **Structural**: [`TOPOLOGY`] is marked on add/remove/destroy and
//!   reported as a topology change by evaluation.
//!
//! Size invalidation ("needs resize") walks upward instead of downward and
//! is tracked by the layout solver itself, see [`layout`](crate::layout).

use understory_dirty::Channel;

/// Local transform or parent changed: world matrices of the subtree are stale.
pub const TRANSFORM: Channel = Channel::new(0);

/// Opacity changed: effective opacities of the subtree are stale.
pub const OPACITY: Channel = Channel::new(1);

/// Drawing instructions or cache mode changed: geometry and bitmap are stale.
pub const CONTENT: Channel = Channel::new(2);

/// Tree topology changed.
pub const TOPOLOGY: Channel = Channel::new(3);
