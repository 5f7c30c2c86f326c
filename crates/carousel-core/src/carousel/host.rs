use std::time::Duration;

use crate::color::{Brush, Rgba};
use crate::geometry::{Axis, Size, Vec2};
use crate::Result;

/// Size reported by a freshly materialized container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measurement {
    /// Definite size, margins included
    Fixed(Size),
    /// Size will be reported later through `Carousel::report_measured`
    Pending,
    /// The template cannot report a definite size; the slot is left unpositioned
    Indefinite,
}

/// How a property change should reach its target value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Immediate,
    Animated(Duration),
}

impl Transition {
    /// Animated over `duration`, or immediate when it is zero
    pub fn over(duration: Duration) -> Self {
        if duration.is_zero() {
            Transition::Immediate
        } else {
            Transition::Animated(duration)
        }
    }

    pub fn duration(&self) -> Duration {
        match self {
            Transition::Immediate => Duration::ZERO,
            Transition::Animated(duration) => *duration,
        }
    }
}

/// Target visual state of one slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotVisual {
    /// Offset from the container center, warp included
    pub offset: Vec2,
    /// In-plane rotation in degrees; nonzero only on the wheel
    pub rotation: f64,
    pub scale: f64,
    /// Perspective tilt in degrees around `tilt_axis`
    pub tilt: f64,
    pub tilt_axis: Axis,
    /// 0 at the selection, 1 at or beyond the falloff threshold
    pub falloff: f64,
}

/// Rendering collaborator driven by the carousel.
///
/// Slots are addressed by their physical index `0..D`. Calls arrive from the single context
/// that owns the carousel.
pub trait SlotHost<T> {
    /// Drop every container
    fn clear(&mut self);

    /// Create the container for `slot` showing `item` and report its size
    fn materialize(&mut self, slot: usize, item: &T) -> Result<Measurement>;

    /// Show another item in an existing container
    fn rebind(&mut self, slot: usize, item: &T);

    fn place(&mut self, slot: usize, visual: &SlotVisual, transition: Transition);

    fn set_z_index(&mut self, slot: usize, z: i32);

    /// Rotate the whole wheel around the container center
    fn rotate_wheel(&mut self, degrees: f64, transition: Transition);

    /// Area that should receive gesture input
    fn set_hit_area(&mut self, _size: Size) {}

    /// Brushes of the container parts that follow the selection color
    fn recolor_targets(&self, _slot: usize) -> Vec<Brush> {
        Vec::new()
    }

    fn recolor(&mut self, _slot: usize, _target: usize, _brush: &Brush) {}

    fn play_selection_animation(&mut self, _slot: usize) {}
}

/// Blend a recolorable target toward the selected brush.
///
/// A solid selected brush applies to every stop of the target. A gradient selected brush only
/// applies to targets with the same number of stops.
pub(crate) fn blend_brush(
    selected: &Brush,
    original: &Brush,
    blend: impl Fn(Rgba, Rgba) -> Rgba,
) -> Option<Brush> {
    match (selected, original) {
        (Brush::Solid(sel), Brush::Solid(orig)) => Some(Brush::Solid(blend(*sel, *orig))),
        (Brush::Solid(sel), Brush::Gradient(stops)) => Some(Brush::Gradient(
            stops.iter().map(|orig| blend(*sel, *orig)).collect(),
        )),
        (Brush::Gradient(sel), Brush::Gradient(stops)) if sel.len() == stops.len() => Some(
            Brush::Gradient(
                sel.iter()
                    .zip(stops)
                    .map(|(sel, orig)| blend(*sel, *orig))
                    .collect(),
            ),
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_over_zero_is_immediate() {
        assert_eq!(Transition::over(Duration::ZERO), Transition::Immediate);
        assert_eq!(
            Transition::over(Duration::from_millis(20)).duration(),
            Duration::from_millis(20)
        );
    }

    #[test]
    fn test_blend_brush_shapes() {
        let white = Rgba::rgb(255, 255, 255);
        let black = Rgba::rgb(0, 0, 0);
        let pick_selected = |sel: Rgba, _orig: Rgba| sel;

        assert_eq!(
            blend_brush(&Brush::Solid(white), &Brush::Gradient(vec![black, black]), pick_selected),
            Some(Brush::Gradient(vec![white, white]))
        );
        assert_eq!(
            blend_brush(
                &Brush::Gradient(vec![white, black]),
                &Brush::Gradient(vec![black]),
                pick_selected
            ),
            None
        );
        assert_eq!(
            blend_brush(&Brush::Gradient(vec![white]), &Brush::Solid(black), pick_selected),
            None
        );
    }
}
