//! Per-slot geometry for the three layout modes.
//!
//! Everything here is a pure function of the window position `i` (0 at the trailing edge,
//! `D/2` at the selection) and the [`Layout`] metrics.

mod falloff;

pub use falloff::Falloff;

use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::ring;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    #[default]
    Row,
    Column,
    Wheel,
}

/// Which side of the wheel faces the viewer; decides rotation direction and phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WheelAlignment {
    Left,
    #[default]
    Right,
    Top,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component along an axis
    pub fn along(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    /// Vector of length `amount` along an axis
    pub fn on_axis(axis: Axis, amount: f64) -> Self {
        match axis {
            Axis::X => Vec2::new(amount, 0.0),
            Axis::Y => Vec2::new(0.0, amount),
        }
    }

    /// Rotate around the origin by `degrees` (clockwise on screen, y pointing down)
    pub fn rotated(&self, degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Vec2::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Component-wise maximum
    pub fn max(self, other: Size) -> Size {
        Size::new(self.width.max(other.width), self.height.max(other.height))
    }
}

/// Base geometry of a slot: where it sits and how the item is turned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SlotGeometry {
    pub offset: Vec2,
    pub rotation: f64,
}

/// Metrics that fully determine slot geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub mode: LayoutMode,
    pub alignment: WheelAlignment,
    pub density: usize,
    /// Size of the carousel container
    pub container: Size,
    /// Largest measured item, margins included
    pub item: Size,
    pub gap: f64,
}

impl Layout {
    /// Angular step between neighbouring slots
    pub fn degrees(&self) -> f64 {
        360.0 / self.density as f64
    }

    pub fn half(&self) -> usize {
        self.density / 2
    }

    /// Axis along which navigation moves items
    pub fn primary_axis(&self) -> Axis {
        match (self.mode, self.alignment) {
            (LayoutMode::Row, _) => Axis::X,
            (LayoutMode::Column, _) => Axis::Y,
            (LayoutMode::Wheel, WheelAlignment::Top | WheelAlignment::Bottom) => Axis::X,
            (LayoutMode::Wheel, WheelAlignment::Left | WheelAlignment::Right) => Axis::Y,
        }
    }

    /// Distance between neighbouring items: pixels for Row/Column, degrees for Wheel
    pub fn pitch(&self) -> f64 {
        match self.mode {
            LayoutMode::Row => self.item.width + self.gap,
            LayoutMode::Column => self.item.height + self.gap,
            LayoutMode::Wheel => self.degrees(),
        }
    }

    pub fn wheel_size(&self) -> f64 {
        self.container.width.max(self.container.height)
    }

    /// Wheel angle of window position `i`, with the quarter-turn phase for Top/Bottom
    fn wheel_angle(&self, i: usize) -> f64 {
        match self.alignment {
            WheelAlignment::Left | WheelAlignment::Right => self.degrees() * i as f64,
            WheelAlignment::Top | WheelAlignment::Bottom => {
                self.degrees() * ((i + self.density / 4) % self.density) as f64
            }
        }
    }

    /// Offset of window position `i` from the container center
    pub fn position(&self, i: usize) -> Vec2 {
        let centered = i as f64 - self.half() as f64;
        match self.mode {
            LayoutMode::Row => Vec2::new(self.pitch() * centered, 0.0),
            LayoutMode::Column => Vec2::new(0.0, self.pitch() * centered),
            LayoutMode::Wheel => {
                let radius = self.wheel_size() / 2.0;
                let (sin, cos) = self.wheel_angle(i).to_radians().sin_cos();
                // sin(360 - a) == -sin(a) and cos(360 - a) == cos(a)
                let (x, y) = match self.alignment {
                    WheelAlignment::Right => (cos, -sin),
                    WheelAlignment::Left => (-cos, -sin),
                    WheelAlignment::Top => (cos, -sin),
                    WheelAlignment::Bottom => (cos, sin),
                };
                Vec2::new(x * radius, y * radius)
            }
        }
    }

    /// Rotation of the item at window position `i` so it faces outward on the wheel
    pub fn rotation(&self, i: usize) -> f64 {
        match self.mode {
            LayoutMode::Row | LayoutMode::Column => 0.0,
            LayoutMode::Wheel => {
                let sign = match self.alignment {
                    WheelAlignment::Right | WheelAlignment::Top => -1.0,
                    WheelAlignment::Left | WheelAlignment::Bottom => 1.0,
                };
                (sign * self.degrees() * i as f64 + 180.0).rem_euclid(360.0)
            }
        }
    }

    pub fn geometry(&self, i: usize) -> SlotGeometry {
        SlotGeometry {
            offset: self.position(i),
            rotation: self.rotation(i),
        }
    }

    /// Wheel angle at which window position `i` is the selection
    pub fn selection_angle(&self, i: usize) -> f64 {
        ((i + self.half()) % self.density) as f64 * self.degrees()
    }

    /// Wheel rotation applied by one advance step
    pub fn wheel_step(&self) -> f64 {
        match self.alignment {
            WheelAlignment::Right | WheelAlignment::Top => self.degrees(),
            WheelAlignment::Left | WheelAlignment::Bottom => -self.degrees(),
        }
    }

    /// Signed angular distance of a wheel slot from the selection, positive ahead of it
    pub fn wheel_distance(&self, i: usize, wheel_angle: f64) -> f64 {
        let slot_angle = self.selection_angle(i);
        match self.alignment {
            WheelAlignment::Right | WheelAlignment::Top => {
                ring::wrap_degrees(slot_angle - wheel_angle)
            }
            WheelAlignment::Left | WheelAlignment::Bottom => {
                ring::wrap_degrees(wheel_angle + slot_angle)
            }
        }
    }

    /// Falloff threshold covering `items` neighbours (at least one)
    pub fn threshold(&self, items: usize) -> f64 {
        self.pitch() * items.max(1) as f64
    }

    /// Area that should receive gesture input
    pub fn hitbox(&self, selected_scale: f64) -> Size {
        match self.mode {
            LayoutMode::Row => Size::new(self.container.width, self.item.height * selected_scale),
            LayoutMode::Column => {
                Size::new(self.item.width * selected_scale, self.container.height)
            }
            LayoutMode::Wheel => {
                let extent = match self.alignment {
                    WheelAlignment::Top | WheelAlignment::Bottom => self.item.height,
                    WheelAlignment::Left | WheelAlignment::Right => self.item.width,
                };
                let side = self.wheel_size() + extent * selected_scale;
                Size::new(side, side)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn layout(mode: LayoutMode, alignment: WheelAlignment) -> Layout {
        Layout {
            mode,
            alignment,
            density: 12,
            container: Size::new(400.0, 200.0),
            item: Size::new(30.0, 20.0),
            gap: 10.0,
        }
    }

    fn assert_vec(actual: Vec2, x: f64, y: f64) {
        assert!(
            (actual.x - x).abs() < 1e-6 && (actual.y - y).abs() < 1e-6,
            "expected ({x}, {y}), got ({}, {})",
            actual.x,
            actual.y
        );
    }

    #[test]
    fn test_row_centers_selection() {
        let l = layout(LayoutMode::Row, WheelAlignment::Right);
        assert_vec(l.position(6), 0.0, 0.0);
        assert_vec(l.position(7), 40.0, 0.0);
        assert_vec(l.position(0), -240.0, 0.0);
        assert_eq!(l.rotation(3), 0.0);
    }

    #[test]
    fn test_column_positions() {
        let l = layout(LayoutMode::Column, WheelAlignment::Right);
        assert_vec(l.position(6), 0.0, 0.0);
        assert_vec(l.position(5), 0.0, -30.0);
        assert_eq!(l.primary_axis(), Axis::Y);
        assert!((l.pitch() - 30.0).abs() < EPS);
    }

    #[test]
    fn test_wheel_right_slot_zero_at_angle_zero() {
        let l = layout(LayoutMode::Wheel, WheelAlignment::Right);
        // wheel size is max(400, 200)
        assert_vec(l.position(0), 200.0, 0.0);
        // quarter turn is up on screen
        assert_vec(l.position(3), 0.0, -200.0);
        // selection sits opposite, upright
        assert_vec(l.position(6), -200.0, 0.0);
        assert!((l.rotation(6)).abs() < EPS);
        assert!((l.rotation(0) - 180.0).abs() < EPS);
    }

    #[test]
    fn test_wheel_left_is_mirrored() {
        let right = layout(LayoutMode::Wheel, WheelAlignment::Right);
        let left = layout(LayoutMode::Wheel, WheelAlignment::Left);
        for i in 0..12 {
            let r = right.position(i);
            let l = left.position(i);
            assert!((r.x + l.x).abs() < 1e-6);
            assert!((r.y - l.y).abs() < 1e-6);
        }
        assert!((left.rotation(1) - 210.0).abs() < EPS);
        assert!((right.rotation(1) - 150.0).abs() < EPS);
    }

    #[test]
    fn test_wheel_top_bottom_phase_shift() {
        let top = layout(LayoutMode::Wheel, WheelAlignment::Top);
        let bottom = layout(LayoutMode::Wheel, WheelAlignment::Bottom);
        // position 0 is a quarter turn ahead: angle 90
        assert_vec(top.position(0), 0.0, -200.0);
        assert_vec(bottom.position(0), 0.0, 200.0);
        // selection (i = 6) lands at angle 270
        assert_vec(top.position(6), 0.0, 200.0);
        assert_vec(bottom.position(6), 0.0, -200.0);
        assert_eq!(top.primary_axis(), Axis::X);
    }

    #[test]
    fn test_wheel_distance_is_zero_at_selection() {
        for alignment in [
            WheelAlignment::Left,
            WheelAlignment::Right,
            WheelAlignment::Top,
            WheelAlignment::Bottom,
        ] {
            let l = layout(LayoutMode::Wheel, alignment);
            assert!(l.wheel_distance(6, 0.0).abs() < EPS);
            // after one advance the next position becomes the selection
            assert!(l.wheel_distance(7, l.wheel_step()).abs() < EPS);
            // the neighbour ahead is one step ahead
            assert!((l.wheel_distance(7, 0.0) - 30.0).abs() < EPS, "{alignment:?}");
            assert!((l.wheel_distance(5, 0.0) + 30.0).abs() < EPS, "{alignment:?}");
        }
    }

    #[test]
    fn test_hitbox() {
        let row = layout(LayoutMode::Row, WheelAlignment::Right);
        assert_eq!(row.hitbox(2.0), Size::new(400.0, 40.0));
        let column = layout(LayoutMode::Column, WheelAlignment::Right);
        assert_eq!(column.hitbox(1.5), Size::new(45.0, 200.0));
        let wheel = layout(LayoutMode::Wheel, WheelAlignment::Top);
        assert_eq!(wheel.hitbox(1.0), Size::new(420.0, 420.0));
    }

    #[test]
    fn test_vec_rotation() {
        let v = Vec2::new(1.0, 0.0).rotated(90.0);
        assert!((v.x).abs() < EPS && (v.y - 1.0).abs() < EPS);
    }
}
