// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Attribute tweening.
//!
//! A [`Tweener`] interpolates named attributes of targets reached through the
//! [`Animatable`] trait. It owns no clock: the frame loop calls
//! [`Tweener::update`] with the elapsed wall-clock time.
//!
//! Values are dynamically typed ([`Value`]). Numbers and timestamps are
//! interpolated linearly in eased progress; text holding a `#rgb` or
//! `#rrggbb` colour is interpolated per channel and written back as
//! `#rrggbb`.

mod easing;
mod tweener;
mod value;

pub use easing::{Easing, EasingFamily, EasingMode};
pub use tweener::{Animatable, Animation, TweenCallback, TweenId, TweenOptions, Tweener};
pub use value::{Value, format_hex_color, parse_hex_color};
