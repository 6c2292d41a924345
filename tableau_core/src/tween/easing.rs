// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Easing curves.
//!
//! Every [`EasingFamily`] defines a single ease-in curve on `[0, 1]`. The
//! other two modes are derived from it:
//!
//! - ease-out: `1 - in(1 - t)`
//! - ease-in-out: `in(2t) / 2` for `t < 0.5`, `out(2t - 1) / 2 + 0.5` after.

use core::f64::consts::{FRAC_PI_2, TAU};

/// Overshoot used by [`EasingFamily::Back`].
const BACK_OVERSHOOT: f64 = 1.70158;

/// Period used by [`EasingFamily::Elastic`].
const ELASTIC_PERIOD: f64 = 0.3;

/// A family of easing curves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EasingFamily {
    /// `t`.
    Linear,
    /// `t²`.
    Quad,
    /// `t³`.
    Cubic,
    /// `t⁴`.
    Quart,
    /// `t⁵`.
    Quint,
    /// Quarter circle.
    Circ,
    /// Quarter cosine wave.
    Sine,
    /// Pulls back slightly before moving forward.
    Back,
    /// Bounces against the start before settling.
    Bounce,
    /// Damped oscillation.
    Elastic,
    /// `2^(10(t - 1))`.
    Expo,
}

impl EasingFamily {
    /// Evaluates the ease-in curve.
    #[must_use]
    pub fn ease_in(self, t: f64) -> f64 {
        match self {
            Self::Linear => t,
            Self::Quad => t * t,
            Self::Cubic => t * t * t,
            Self::Quart => t * t * t * t,
            Self::Quint => t * t * t * t * t,
            Self::Circ => 1.0 - (1.0 - t * t).max(0.0).sqrt(),
            Self::Sine => 1.0 - (t * FRAC_PI_2).cos(),
            Self::Back => t * t * ((BACK_OVERSHOOT + 1.0) * t - BACK_OVERSHOOT),
            Self::Bounce => 1.0 - bounce_out(1.0 - t),
            Self::Elastic => {
                if t <= 0.0 || t >= 1.0 {
                    return t.clamp(0.0, 1.0);
                }
                let s = ELASTIC_PERIOD / 4.0;
                let u = t - 1.0;
                -(2_f64.powf(10.0 * u) * ((u - s) * TAU / ELASTIC_PERIOD).sin())
            }
            Self::Expo => {
                if t <= 0.0 {
                    0.0
                } else {
                    2_f64.powf(10.0 * (t - 1.0))
                }
            }
        }
    }
}

fn bounce_out(t: f64) -> f64 {
    const N: f64 = 7.5625;
    const D: f64 = 2.75;
    if t < 1.0 / D {
        N * t * t
    } else if t < 2.0 / D {
        let t = t - 1.5 / D;
        N * t * t + 0.75
    } else if t < 2.5 / D {
        let t = t - 2.25 / D;
        N * t * t + 0.9375
    } else {
        let t = t - 2.625 / D;
        N * t * t + 0.984375
    }
}

/// Which end of the curve is eased.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EasingMode {
    /// Slow start.
    In,
    /// Slow end.
    Out,
    /// Slow start and end.
    InOut,
}

/// An easing curve: a family plus a mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Easing {
    /// Curve family.
    pub family: EasingFamily,
    /// Curve mode.
    pub mode: EasingMode,
}

impl Easing {
    /// Constant speed.
    pub const LINEAR: Self = Self::new(EasingFamily::Linear, EasingMode::In);

    /// Cubic ease-in-out, used when no easing is given.
    pub const DEFAULT: Self = Self::new(EasingFamily::Cubic, EasingMode::InOut);

    /// Creates an easing curve.
    #[must_use]
    pub const fn new(family: EasingFamily, mode: EasingMode) -> Self {
        Self { family, mode }
    }

    /// Ease-in variant of `family`.
    #[must_use]
    pub const fn ease_in(family: EasingFamily) -> Self {
        Self::new(family, EasingMode::In)
    }

    /// Ease-out variant of `family`.
    #[must_use]
    pub const fn ease_out(family: EasingFamily) -> Self {
        Self::new(family, EasingMode::Out)
    }

    /// Ease-in-out variant of `family`.
    #[must_use]
    pub const fn ease_in_out(family: EasingFamily) -> Self {
        Self::new(family, EasingMode::InOut)
    }

    /// Maps linear progress `t ∈ [0, 1]` to eased progress.
    ///
    /// The result may leave `[0, 1]` for back and elastic curves.
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        let ease_in = |t| self.family.ease_in(t);
        let ease_out = |t: f64| 1.0 - self.family.ease_in(1.0 - t);
        match self.mode {
            EasingMode::In => ease_in(t),
            EasingMode::Out => ease_out(t),
            EasingMode::InOut => {
                if t < 0.5 {
                    ease_in(2.0 * t) / 2.0
                } else {
                    ease_out(2.0 * t - 1.0) / 2.0 + 0.5
                }
            }
        }
    }
}

impl Default for Easing {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAMILIES: [EasingFamily; 11] = [
        EasingFamily::Linear,
        EasingFamily::Quad,
        EasingFamily::Cubic,
        EasingFamily::Quart,
        EasingFamily::Quint,
        EasingFamily::Circ,
        EasingFamily::Sine,
        EasingFamily::Back,
        EasingFamily::Bounce,
        EasingFamily::Elastic,
        EasingFamily::Expo,
    ];

    const MODES: [EasingMode; 3] = [EasingMode::In, EasingMode::Out, EasingMode::InOut];

    #[test]
    fn every_curve_pins_its_endpoints() {
        for family in FAMILIES {
            for mode in MODES {
                let e = Easing::new(family, mode);
                assert!(e.apply(0.0).abs() < 1e-3, "{e:?} at 0 = {}", e.apply(0.0));
                assert!(
                    (e.apply(1.0) - 1.0).abs() < 1e-3,
                    "{e:?} at 1 = {}",
                    e.apply(1.0)
                );
            }
        }
    }

    #[test]
    fn out_mirrors_in() {
        let ein = Easing::ease_in(EasingFamily::Quad);
        let eout = Easing::ease_out(EasingFamily::Quad);
        for i in 0..=10 {
            let t = f64::from(i) / 10.0;
            assert!((eout.apply(t) - (1.0 - ein.apply(1.0 - t))).abs() < 1e-12);
        }
    }

    #[test]
    fn in_out_is_symmetric_about_the_midpoint() {
        let e = Easing::ease_in_out(EasingFamily::Cubic);
        assert!((e.apply(0.5) - 0.5).abs() < 1e-12);
        assert!((e.apply(0.25) + e.apply(0.75) - 1.0).abs() < 1e-12);
        assert!((e.apply(0.25) - 0.0625).abs() < 1e-12, "in(0.5) / 2");
    }

    #[test]
    fn back_overshoots_below_zero() {
        let e = Easing::ease_in(EasingFamily::Back);
        assert!(e.apply(0.2) < 0.0, "back pulls back first");
    }

    #[test]
    fn linear_is_identity() {
        assert!((Easing::LINEAR.apply(0.37) - 0.37).abs() < 1e-12);
    }

    #[test]
    fn input_is_clamped() {
        assert_eq!(Easing::LINEAR.apply(-1.0), 0.0);
        assert_eq!(Easing::LINEAR.apply(2.0), 1.0);
    }

    #[test]
    fn default_is_cubic_in_out() {
        assert_eq!(Easing::default(), Easing::ease_in_out(EasingFamily::Cubic));
    }
}
