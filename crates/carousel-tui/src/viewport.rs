//! Mapping between engine units and terminal cells.

use carousel_core::{Layout, LayoutMode, Size, Vec2, WheelAlignment};
use ratatui::layout::Rect;

use crate::host::CELL_ASPECT;

/// Where the carousel is drawn and how its center is shifted on screen.
///
/// Row and Column are centered on the area. The wheel is pushed toward its alignment side so
/// the selected item, which always faces away from the hub, lands on the area center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub area: Rect,
    /// Offset of the layout origin (the wheel hub) from the area center
    pub shift: Vec2,
}

impl Viewport {
    pub fn new(area: Rect, layout: &Layout) -> Self {
        let shift = match layout.mode {
            LayoutMode::Row | LayoutMode::Column => Vec2::ZERO,
            LayoutMode::Wheel => {
                let radius = layout.wheel_size() / 2.0;
                match layout.alignment {
                    WheelAlignment::Right => Vec2::new(radius, 0.0),
                    WheelAlignment::Left => Vec2::new(-radius, 0.0),
                    WheelAlignment::Top => Vec2::new(0.0, -radius),
                    WheelAlignment::Bottom => Vec2::new(0.0, radius),
                }
            }
        };
        Self { area, shift }
    }

    /// Container size of an area, in engine units
    pub fn container(area: Rect) -> Size {
        Size::new(area.width as f64, area.height as f64 * CELL_ASPECT)
    }

    /// Fractional cell (column, row) of a point given relative to the layout origin
    pub fn to_cell(&self, point: Vec2) -> (f64, f64) {
        let x = self.area.x as f64 + self.area.width as f64 / 2.0 + self.shift.x + point.x;
        let y = self.area.y as f64
            + self.area.height as f64 / 2.0
            + (self.shift.y + point.y) / CELL_ASPECT;
        (x, y)
    }

    /// Point under a cell, relative to the layout origin
    pub fn to_units(&self, column: u16, row: u16) -> Vec2 {
        // Cell centers
        let x = column as f64 + 0.5 - self.area.x as f64 - self.area.width as f64 / 2.0;
        let y = (row as f64 + 0.5 - self.area.y as f64 - self.area.height as f64 / 2.0)
            * CELL_ASPECT;
        Vec2::new(x - self.shift.x, y - self.shift.y)
    }

    /// Whether a cell falls inside a hit area centered on the layout origin
    pub fn hits(&self, hit_area: Size, column: u16, row: u16) -> bool {
        if !self.area.contains((column, row).into()) {
            return false;
        }
        let point = self.to_units(column, row);
        point.x.abs() <= hit_area.width / 2.0 && point.y.abs() <= hit_area.height / 2.0
    }
}
