//! Terminal implementation of the engine's rendering collaborator.
//!
//! Engine units are terminal columns horizontally. A row is [`CELL_ASPECT`] units tall so
//! geometry computed in square units keeps its shape on screen.

use std::time::{Duration, Instant};

use carousel_core::config::AnimationConfig;
use carousel_core::{Brush, Error, Measurement, Result, Rgba, Size, SlotHost, SlotVisual, Transition};
use tracing::debug;
use unicode_width::UnicodeWidthStr;

use crate::animation::{Animated, AnimationConfigExt};

/// Height of one terminal row in engine units
pub const CELL_ASPECT: f64 = 2.0;

/// Border plus one column of padding on each side
const HORIZONTAL_MARGIN: f64 = 4.0;
/// Border rows around a single line label
const ROWS: f64 = 3.0;

const PULSE: Duration = Duration::from_millis(400);

/// One materialized container
#[derive(Debug, Clone)]
pub struct SlotView {
    pub label: String,
    /// Unset until the engine first places the slot
    pub visual: Option<Animated<SlotVisual>>,
    pub z: i32,
    /// Label color; the only recolorable part of a container
    pub foreground: Brush,
}

#[derive(Debug)]
pub struct TerminalHost {
    slots: Vec<SlotView>,
    wheel: Animated<f64>,
    hit_area: Size,
    animation: AnimationConfig,
    label_color: Rgba,
    pulse: Option<(usize, Instant)>,
}

impl TerminalHost {
    pub fn new(animation: AnimationConfig, label_color: Rgba) -> Self {
        Self {
            slots: Vec::new(),
            wheel: Animated::new(0.0),
            hit_area: Size::default(),
            animation,
            label_color,
            pulse: None,
        }
    }

    /// Size of the container showing `label`, margins included
    pub fn measure(label: &str) -> Size {
        Size::new(
            label.width() as f64 + HORIZONTAL_MARGIN,
            ROWS * CELL_ASPECT,
        )
    }

    pub fn slots(&self) -> &[SlotView] {
        &self.slots
    }

    pub fn hit_area(&self) -> Size {
        self.hit_area
    }

    /// Wheel rotation as currently displayed
    pub fn wheel_angle(&self) -> f64 {
        self.wheel.sample(Instant::now())
    }

    /// Slot whose selection animation is still playing
    pub fn pulsing(&self, now: Instant) -> Option<usize> {
        self.pulse
            .filter(|(_, start)| now.saturating_duration_since(*start) < PULSE)
            .map(|(slot, _)| slot)
    }

    /// Advance every running transition to `now`
    pub fn update(&mut self, now: Instant) {
        self.wheel.update(now);
        for slot in &mut self.slots {
            if let Some(visual) = slot.visual.as_mut() {
                visual.update(now);
            }
        }
        if self.pulsing(now).is_none() {
            self.pulse = None;
        }
    }

    /// Whether frames should be drawn at the animation rate
    pub fn is_animating(&self) -> bool {
        self.pulse.is_some()
            || self.wheel.is_animating()
            || self
                .slots
                .iter()
                .any(|s| s.visual.as_ref().is_some_and(Animated::is_animating))
    }

    pub fn set_animation(&mut self, animation: AnimationConfig) {
        self.animation = animation;
    }

    fn view(&mut self, slot: usize) -> Option<&mut SlotView> {
        let view = self.slots.get_mut(slot);
        if view.is_none() {
            debug!(slot, "Host call for a slot that was never materialized");
        }
        view
    }

    fn validate(label: &str) -> Result<()> {
        if label.chars().any(char::is_control) {
            return Err(Error::Host(format!(
                "label {:?} contains control characters",
                label
            )));
        }
        Ok(())
    }
}

impl SlotHost<String> for TerminalHost {
    fn clear(&mut self) {
        self.slots.clear();
        self.pulse = None;
        self.wheel = Animated::new(0.0);
    }

    fn materialize(&mut self, slot: usize, item: &String) -> Result<Measurement> {
        Self::validate(item)?;
        let view = SlotView {
            label: item.clone(),
            visual: None,
            z: 0,
            foreground: Brush::Solid(self.label_color),
        };
        if slot < self.slots.len() {
            self.slots[slot] = view;
        } else {
            self.slots.resize(slot, view.clone());
            self.slots.push(view);
        }

        if item.trim().is_empty() {
            return Ok(Measurement::Indefinite);
        }
        Ok(Measurement::Fixed(Self::measure(item)))
    }

    fn rebind(&mut self, slot: usize, item: &String) {
        let label_color = self.label_color;
        if let Some(view) = self.view(slot) {
            view.label.clone_from(item);
            // A rebound container starts from the template color
            view.foreground = Brush::Solid(label_color);
        }
    }

    fn place(&mut self, slot: usize, visual: &SlotVisual, transition: Transition) {
        let duration = self.animation.effective(transition);
        let easing = self.animation.easing;
        let now = Instant::now();
        if let Some(view) = self.view(slot) {
            match view.visual.as_mut() {
                Some(current) => current.set(*visual, duration, easing, now),
                None => view.visual = Some(Animated::new(*visual)),
            }
        }
    }

    fn set_z_index(&mut self, slot: usize, z: i32) {
        if let Some(view) = self.view(slot) {
            view.z = z;
        }
    }

    fn rotate_wheel(&mut self, degrees: f64, transition: Transition) {
        let duration = self.animation.effective(transition);
        self.wheel
            .set(degrees, duration, self.animation.easing, Instant::now());
    }

    fn set_hit_area(&mut self, size: Size) {
        self.hit_area = size;
    }

    fn recolor_targets(&self, slot: usize) -> Vec<Brush> {
        self.slots
            .get(slot)
            .map(|view| vec![view.foreground.clone()])
            .unwrap_or_default()
    }

    fn recolor(&mut self, slot: usize, target: usize, brush: &Brush) {
        if target != 0 {
            return;
        }
        if let Some(view) = self.view(slot) {
            view.foreground = brush.clone();
        }
    }

    fn play_selection_animation(&mut self, slot: usize) {
        self.pulse = Some((slot, Instant::now()));
    }
}
