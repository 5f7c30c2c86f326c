//! Animated values driven by the host's transitions.

use std::time::{Duration, Instant};

use carousel_core::{SlotVisual, Vec2};

use super::easing::{EasingType, EasingTypeExt};
use super::timing::{is_complete, lerp, progress};

/// A value that can be blended between two states.
pub trait Interpolate: Copy {
    fn interpolate(from: Self, to: Self, t: f64) -> Self;
}

impl Interpolate for f64 {
    fn interpolate(from: f64, to: f64, t: f64) -> f64 {
        lerp(from, to, t)
    }
}

impl Interpolate for Vec2 {
    fn interpolate(from: Vec2, to: Vec2, t: f64) -> Vec2 {
        Vec2::new(lerp(from.x, to.x, t), lerp(from.y, to.y, t))
    }
}

impl Interpolate for SlotVisual {
    fn interpolate(from: SlotVisual, to: SlotVisual, t: f64) -> SlotVisual {
        SlotVisual {
            offset: Vec2::interpolate(from.offset, to.offset, t),
            rotation: lerp(from.rotation, to.rotation, t),
            scale: lerp(from.scale, to.scale, t),
            tilt: lerp(from.tilt, to.tilt, t),
            tilt_axis: to.tilt_axis,
            falloff: lerp(from.falloff, to.falloff, t),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Tween<V> {
    start: Instant,
    from: V,
    to: V,
    duration: Duration,
    easing: EasingType,
}

/// Current value plus the transition running toward its target, if any.
#[derive(Debug, Clone, Copy)]
pub struct Animated<V> {
    current: V,
    tween: Option<Tween<V>>,
}

impl<V: Interpolate> Animated<V> {
    pub fn new(value: V) -> Self {
        Self {
            current: value,
            tween: None,
        }
    }

    /// Head for `target` over `duration`, starting from wherever the value is now.
    ///
    /// A zero duration jumps straight to the target and drops any running transition.
    pub fn set(&mut self, target: V, duration: Duration, easing: EasingType, now: Instant) {
        if duration.is_zero() {
            self.current = target;
            self.tween = None;
            return;
        }
        let from = self.sample(now);
        self.tween = Some(Tween {
            start: now,
            from,
            to: target,
            duration,
            easing,
        });
        self.current = from;
    }

    /// Advance to `now` and return the current value
    pub fn update(&mut self, now: Instant) -> V {
        if let Some(tween) = self.tween {
            if is_complete(tween.start, tween.duration, now) {
                self.current = tween.to;
                self.tween = None;
            } else {
                self.current = Self::at(&tween, now);
            }
        }
        self.current
    }

    /// Value at `now` without advancing
    pub fn sample(&self, now: Instant) -> V {
        match &self.tween {
            Some(tween) => Self::at(tween, now),
            None => self.current,
        }
    }

    /// Where the value ends up
    pub fn target(&self) -> V {
        self.tween.map_or(self.current, |t| t.to)
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.tween.is_some()
    }

    fn at(tween: &Tween<V>, now: Instant) -> V {
        let t = tween.easing.apply(progress(tween.start, tween.duration, now));
        V::interpolate(tween.from, tween.to, t)
    }
}

impl<V: Interpolate + Default> Default for Animated<V> {
    fn default() -> Self {
        Self::new(V::default())
    }
}
