// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;
use std::collections::BTreeMap;

use log::{debug, warn};

use super::easing::Easing;
use super::value::{Interpolation, Value};
use crate::error::Error;

/// Something whose named attributes a [`Tweener`] can read and write.
///
/// `K` is the key the tweener uses to address a target, e.g. a
/// [`NodeId`](crate::node::NodeId).
pub trait Animatable<K> {
    /// Returns the current value of `name` on `target`, or `None` if the
    /// attribute does not exist.
    fn get_attr(&self, target: K, name: &str) -> Option<Value>;

    /// Writes `value` to `name` on `target`.
    fn set_attr(&mut self, target: K, name: &str, value: Value);

    /// Returns `false` once `target` has been destroyed.
    fn is_alive(&self, target: K) -> bool;
}

/// Callback invoked with the tween's target.
pub type TweenCallback<K> = Box<dyn FnMut(K)>;

/// Identifies one tween inside a [`Tweener`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TweenId(u64);

/// Timing and callbacks for [`Tweener::animate`].
pub struct TweenOptions<K> {
    duration: f64,
    delay: f64,
    easing: Easing,
    on_update: Option<TweenCallback<K>>,
    on_complete: Option<TweenCallback<K>>,
}

impl<K> TweenOptions<K> {
    /// A tween lasting `duration` seconds with the default easing and no
    /// delay.
    #[must_use]
    pub fn new(duration: f64) -> Self {
        Self {
            duration: sanitize(duration),
            delay: 0.0,
            easing: Easing::DEFAULT,
            on_update: None,
            on_complete: None,
        }
    }

    /// Waits `delay` seconds before the first write.
    #[must_use]
    pub fn delay(mut self, delay: f64) -> Self {
        self.delay = sanitize(delay);
        self
    }

    /// Sets the easing curve.
    #[must_use]
    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Called after every batch of writes.
    #[must_use]
    pub fn on_update(mut self, f: impl FnMut(K) + 'static) -> Self {
        self.on_update = Some(Box::new(f));
        self
    }

    /// Called once when the tween completes, is finished early, or loses
    /// all of its attributes to newer tweens.
    #[must_use]
    pub fn on_complete(mut self, f: impl FnMut(K) + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }
}

impl<K> fmt::Debug for TweenOptions<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TweenOptions")
            .field("duration", &self.duration)
            .field("delay", &self.delay)
            .field("easing", &self.easing)
            .field("on_update", &self.on_update.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

fn sanitize(secs: f64) -> f64 {
    if secs.is_finite() { secs.max(0.0) } else { 0.0 }
}

/// Outcome of [`Tweener::animate`].
///
/// Attributes are accepted or rejected individually; the tween exists as
/// long as at least one attribute was accepted.
#[derive(Debug, Default)]
#[must_use]
pub struct Animation {
    /// The new tween, if any attribute was accepted.
    pub tween: Option<TweenId>,
    /// One [`Error::UnknownAttribute`] per rejected attribute.
    pub rejected: Vec<Error>,
}

impl Animation {
    /// Returns `true` if every attribute was accepted.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.rejected.is_empty()
    }
}

struct Track {
    attribute: String,
    rule: Interpolation,
}

struct Tween<K> {
    id: TweenId,
    target: K,
    tracks: Vec<Track>,
    duration: f64,
    delay: f64,
    easing: Easing,
    elapsed: f64,
    on_update: Option<TweenCallback<K>>,
    on_complete: Option<TweenCallback<K>>,
}

impl<K: Copy> Tween<K> {
    /// Advances by `dt` and writes the new values. Returns `true` once the
    /// tween has completed.
    fn step<H: Animatable<K> + ?Sized>(&mut self, host: &mut H, dt: f64) -> bool {
        self.elapsed += dt;
        if self.elapsed < self.delay {
            return false;
        }
        let t = if self.duration <= 0.0 {
            1.0
        } else {
            ((self.elapsed - self.delay) / self.duration).clamp(0.0, 1.0)
        };
        let done = t >= 1.0;
        let eased = self.easing.apply(t);
        for track in &self.tracks {
            let value = if done {
                track.rule.end()
            } else {
                track.rule.at(eased)
            };
            host.set_attr(self.target, &track.attribute, value);
        }
        if let Some(f) = &mut self.on_update {
            f(self.target);
        }
        if done {
            self.complete();
        }
        done
    }

    /// Writes end values without easing.
    fn jump_to_end<H: Animatable<K> + ?Sized>(&self, host: &mut H) {
        for track in &self.tracks {
            host.set_attr(self.target, &track.attribute, track.rule.end());
        }
    }

    fn complete(&mut self) {
        if let Some(mut f) = self.on_complete.take() {
            f(self.target);
        }
    }
}

impl<K: fmt::Debug> fmt::Debug for Tween<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tween")
            .field("id", &self.id)
            .field("target", &self.target)
            .field(
                "attributes",
                &self
                    .tracks
                    .iter()
                    .map(|t| t.attribute.as_str())
                    .collect::<Vec<_>>(),
            )
            .field("elapsed", &self.elapsed)
            .finish_non_exhaustive()
    }
}

/// Registry of active tweens, keyed by target.
///
/// At most one tween animates a given `(target, attribute)` pair: a new
/// [`animate`](Self::animate) call takes overlapping attributes away from
/// older tweens on the same target.
///
/// Iteration is in key order, then creation order, so updates are
/// deterministic.
pub struct Tweener<K> {
    tweens: BTreeMap<K, Vec<Tween<K>>>,
    next_id: u64,
}

impl<K: fmt::Debug> fmt::Debug for Tweener<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tweener")
            .field("tweens", &self.tweens)
            .finish_non_exhaustive()
    }
}

impl<K> Default for Tweener<K> {
    fn default() -> Self {
        Self {
            tweens: BTreeMap::new(),
            next_id: 0,
        }
    }
}

impl<K: Copy + Ord + fmt::Debug> Tweener<K> {
    /// Creates an empty tweener.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts animating `attrs` on `target` towards the given end values.
    ///
    /// Start values are captured from `host` now. Attributes that do not
    /// exist, or whose start and end values cannot be interpolated, are
    /// rejected with [`Error::UnknownAttribute`]; the others proceed. Nothing
    /// is written until the next [`update`](Self::update).
    pub fn animate<H, I, S>(
        &mut self,
        host: &H,
        target: K,
        attrs: I,
        options: TweenOptions<K>,
    ) -> Animation
    where
        H: Animatable<K> + ?Sized,
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        let mut tracks: Vec<Track> = Vec::new();
        let mut rejected = Vec::new();
        for (name, end) in attrs {
            let attribute = name.into();
            let rule = host
                .get_attr(target, &attribute)
                .and_then(|start| Interpolation::classify(&start, &end));
            match rule {
                Some(rule) => {
                    tracks.retain(|t| t.attribute != attribute);
                    tracks.push(Track { attribute, rule });
                }
                None => {
                    warn!("cannot animate `{attribute}` on {target:?}");
                    rejected.push(Error::UnknownAttribute { attribute });
                }
            }
        }
        if tracks.is_empty() {
            return Animation {
                tween: None,
                rejected,
            };
        }

        self.evict(target, &tracks);

        let id = TweenId(self.next_id);
        self.next_id += 1;
        self.tweens.entry(target).or_default().push(Tween {
            id,
            target,
            tracks,
            duration: options.duration,
            delay: options.delay,
            easing: options.easing,
            elapsed: 0.0,
            on_update: options.on_update,
            on_complete: options.on_complete,
        });
        Animation {
            tween: Some(id),
            rejected,
        }
    }

    /// Removes the attributes in `tracks` from older tweens on `target`.
    /// Tweens left with nothing to animate complete immediately.
    fn evict(&mut self, target: K, tracks: &[Track]) {
        let Some(list) = self.tweens.get_mut(&target) else {
            return;
        };
        let mut emptied = Vec::new();
        list.retain_mut(|tween| {
            tween
                .tracks
                .retain(|old| tracks.iter().all(|new| new.attribute != old.attribute));
            if tween.tracks.is_empty() {
                debug!("tween {:?} on {target:?} lost all attributes", tween.id);
                emptied.push(tween.on_complete.take());
                false
            } else {
                true
            }
        });
        if list.is_empty() {
            self.tweens.remove(&target);
        }
        for mut f in emptied.into_iter().flatten() {
            f(target);
        }
    }

    /// Advances every tween by `dt` seconds and writes interpolated values
    /// through `host`.
    ///
    /// Tweens whose target is no longer alive are dropped without callbacks.
    pub fn update<H: Animatable<K> + ?Sized>(&mut self, host: &mut H, dt: f64) {
        let dt = sanitize(dt);
        let targets: Vec<K> = self.tweens.keys().copied().collect();
        for target in targets {
            let Some(mut list) = self.tweens.remove(&target) else {
                continue;
            };
            if !host.is_alive(target) {
                debug!("dropping {} tween(s) of dead target {target:?}", list.len());
                continue;
            }
            list.retain_mut(|tween| !tween.step(host, dt));
            if !list.is_empty() {
                self.tweens.insert(target, list);
            }
        }
    }

    /// Removes every tween on `target` without firing `on_complete`.
    ///
    /// Returns `true` if anything was removed.
    pub fn kill(&mut self, target: K) -> bool {
        self.tweens.remove(&target).is_some()
    }

    /// Removes a single tween without firing `on_complete`.
    ///
    /// Returns `true` if the tween was still active.
    pub fn kill_tween(&mut self, id: TweenId) -> bool {
        let Some((&target, list)) = self
            .tweens
            .iter_mut()
            .find(|(_, list)| list.iter().any(|t| t.id == id))
        else {
            return false;
        };
        list.retain(|t| t.id != id);
        if list.is_empty() {
            self.tweens.remove(&target);
        }
        true
    }

    /// Jumps every tween to its end values, fires `on_complete` and clears
    /// the registry. Calling it again does nothing.
    pub fn finish<H: Animatable<K> + ?Sized>(&mut self, host: &mut H) {
        let tweens = core::mem::take(&mut self.tweens);
        for (target, list) in tweens {
            if !host.is_alive(target) {
                continue;
            }
            for mut tween in list {
                tween.jump_to_end(host);
                tween.complete();
            }
        }
    }

    /// Returns `true` if any tween targets `target`.
    #[must_use]
    pub fn is_animating(&self, target: K) -> bool {
        self.tweens.contains_key(&target)
    }

    /// Returns the number of active tweens.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.tweens.values().map(Vec::len).sum()
    }

    /// Returns `true` if no tween is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }

    /// Returns the attributes currently animated on `target`, in tween order.
    #[must_use]
    pub fn animated_attributes(&self, target: K) -> Vec<&str> {
        self.tweens
            .get(&target)
            .into_iter()
            .flatten()
            .flat_map(|t| t.tracks.iter().map(|track| track.attribute.as_str()))
            .collect()
    }
}
