use std::time::Instant;

use carousel_core::{Axis, LayoutMode, Size, SlotVisual};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, LoadStatus};
use crate::host::{SlotView, CELL_ASPECT};
use crate::theme::{brush_color, Theme};
use crate::viewport::Viewport;

/// Smallest box that still shows a label between its borders
const MIN_COLUMNS: f64 = 3.0;
const MIN_ROWS: f64 = 3.0;

pub struct CarouselWidget;

impl CarouselWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        frame.render_widget(Block::default().style(Style::default().bg(theme.bg0)), area);

        let message = match app.load_status {
            LoadStatus::Loaded => None,
            LoadStatus::Empty => Some(("No items", theme.grey1)),
            LoadStatus::Loading => Some(("Loading...", theme.info)),
            LoadStatus::Failed => Some(("Failed to load items", theme.error)),
        };
        if let Some((text, color)) = message {
            let row = Rect::new(area.x, area.y + area.height / 2, area.width, area.height.min(1));
            let paragraph = Paragraph::new(Span::styled(text, Style::default().fg(color)))
                .alignment(Alignment::Center);
            frame.render_widget(paragraph, row);
            return;
        }

        let now = Instant::now();
        let layout = app.carousel.layout();
        let viewport = Viewport::new(area, &layout);
        let host = app.carousel.host();
        let wheel = host.wheel_angle();
        let selected = app.carousel.selected_slot();
        let pulsing = host.pulsing(now);

        // Back to front
        let mut order: Vec<usize> = (0..host.slots().len()).collect();
        order.sort_by_key(|slot| host.slots()[*slot].z);

        for slot in order {
            let view = &host.slots()[slot];
            let Some(visual) = view.visual.as_ref().map(|v| v.sample(now)) else {
                continue;
            };
            let point = match layout.mode {
                LayoutMode::Wheel => visual.offset.rotated(wheel),
                LayoutMode::Row | LayoutMode::Column => visual.offset,
            };
            let center = viewport.to_cell(point);
            let Some(rect) = slot_rect(center, &visual, layout.item, area) else {
                continue;
            };

            let is_selected = selected == Some(slot);
            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(if is_selected {
                    BorderType::Thick
                } else {
                    BorderType::Rounded
                })
                .border_style(border_style(theme, is_selected, pulsing == Some(slot)))
                .style(Style::default().bg(theme.bg0));

            frame.render_widget(Clear, rect);
            frame.render_widget(
                Paragraph::new(label(view, is_selected))
                    .block(block)
                    .alignment(Alignment::Center),
                rect,
            );
        }
    }
}

fn border_style(theme: &Theme, selected: bool, pulsing: bool) -> Style {
    match (selected, pulsing) {
        (_, true) => Style::default()
            .fg(theme.bg0)
            .bg(theme.accent)
            .add_modifier(Modifier::BOLD),
        (true, false) => Style::default().fg(theme.accent),
        (false, false) => Style::default().fg(theme.grey1),
    }
}

/// Label spans colored across the foreground brush
fn label(view: &SlotView, selected: bool) -> Line<'static> {
    let count = view.label.chars().count();
    let style = if selected {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let spans: Vec<Span<'static>> = view
        .label
        .chars()
        .enumerate()
        .map(|(i, c)| {
            let t = if count > 1 {
                i as f64 / (count - 1) as f64
            } else {
                0.0
            };
            Span::styled(c.to_string(), style.fg(brush_color(&view.foreground, t)))
        })
        .collect();
    Line::from(spans)
}

/// Box of a slot around its center cell, clipped to `area`
///
/// Tilt around an axis foreshortens the perpendicular extent.
fn slot_rect(center: (f64, f64), visual: &SlotVisual, item: Size, area: Rect) -> Option<Rect> {
    let foreshortening = visual.tilt.to_radians().cos().abs();
    let (width_factor, height_factor) = match visual.tilt_axis {
        Axis::Y => (foreshortening, 1.0),
        Axis::X => (1.0, foreshortening),
    };
    let width = (item.width * visual.scale * width_factor).round().max(MIN_COLUMNS);
    let height = (item.height * visual.scale * height_factor / CELL_ASPECT)
        .round()
        .max(MIN_ROWS);

    let left = (center.0 - width / 2.0).round();
    let top = (center.1 - height / 2.0).round();
    clip(left, top, width, height, area)
}

fn clip(left: f64, top: f64, width: f64, height: f64, area: Rect) -> Option<Rect> {
    let x0 = left.max(area.x as f64);
    let y0 = top.max(area.y as f64);
    let x1 = (left + width).min(area.right() as f64);
    let y1 = (top + height).min(area.bottom() as f64);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(Rect::new(
        x0 as u16,
        y0 as u16,
        (x1 - x0) as u16,
        (y1 - y0) as u16,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use carousel_core::Vec2;

    fn visual(scale: f64, tilt: f64) -> SlotVisual {
        SlotVisual {
            offset: Vec2::ZERO,
            rotation: 0.0,
            scale,
            tilt,
            tilt_axis: Axis::Y,
            falloff: 0.0,
        }
    }

    const AREA: Rect = Rect::new(0, 0, 80, 24);
    const ITEM: Size = Size::new(10.0, 6.0);

    #[test]
    fn test_slot_rect_centered() {
        let rect = slot_rect((40.0, 12.0), &visual(1.0, 0.0), ITEM, AREA).unwrap();
        assert_eq!(rect, Rect::new(35, 11, 10, 3));
    }

    #[test]
    fn test_scale_and_tilt() {
        let rect = slot_rect((40.0, 12.0), &visual(2.0, 0.0), ITEM, AREA).unwrap();
        assert_eq!((rect.width, rect.height), (20, 6));
        let rect = slot_rect((40.0, 12.0), &visual(1.0, 60.0), ITEM, AREA).unwrap();
        assert_eq!((rect.width, rect.height), (5, 3));
    }

    #[test]
    fn test_clipped_to_area() {
        let rect = slot_rect((2.0, 12.0), &visual(1.0, 0.0), ITEM, AREA).unwrap();
        assert_eq!(rect.x, 0);
        assert_eq!(rect.width, 7);
        assert!(slot_rect((-20.0, 12.0), &visual(1.0, 0.0), ITEM, AREA).is_none());
    }
}
