use std::time::Instant;

use carousel_core::config::AppConfig;
use carousel_core::density::{self, MAX_DENSITY, MIN_DENSITY};
use carousel_core::ring;
use carousel_core::{
    Brush, Carousel, CarouselEvent, CarouselPatch, LayoutMode, SelectionOrigin, WheelAlignment,
};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::host::TerminalHost;
use crate::input::Action;
use crate::theme::Theme;
use crate::viewport::Viewport;

/// Tilt applied by the fliptych toggle
const FLIPTYCH_DEGREES: f64 = 35.0;
const WARP_INTENSITY: i32 = 40;
const SCALES: [f64; 3] = [1.0, 1.5, 2.0];

/// Where the carousel stands with its current build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Empty,
    Loading,
    Loaded,
    Failed,
}

/// An open mouse gesture
#[derive(Debug, Clone, Copy)]
struct Drag {
    column: u16,
    row: u16,
    /// Wheel angle when the gesture started
    origin: f64,
    /// Pointer angle around the hub at the last wheel update
    pointer: f64,
    /// Rotation fed so far, relative to `origin`
    turned: f64,
}

pub struct App {
    pub carousel: Carousel<String, TerminalHost>,
    pub config: AppConfig,
    pub theme: Theme,
    pub status_message: Option<String>,
    pub load_status: LoadStatus,
    pub should_quit: bool,
    /// Area of the carousel itself, without the status bar
    area: Rect,
    drag: Option<Drag>,
    events: mpsc::UnboundedReceiver<CarouselEvent>,
}

impl App {
    pub fn new(config: AppConfig, items: Vec<String>, screen: Rect, now: Instant) -> Self {
        let area = Self::areas(screen).0;
        let host = TerminalHost::new(config.ui.animation.clone(), config.ui.colors.deselected);
        let mut carousel = Carousel::new(config.carousel.clone(), host, Viewport::container(area));
        let events = carousel.subscribe();

        let mut app = Self {
            carousel,
            theme: Theme::from(&config.ui.colors),
            config,
            status_message: None,
            load_status: LoadStatus::Empty,
            should_quit: false,
            area,
            drag: None,
            events,
        };
        app.load(items, now);
        app
    }

    /// Split the screen into the carousel area and the status bar
    pub fn areas(screen: Rect) -> (Rect, Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(screen);
        (chunks[0], chunks[1])
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.area, &self.carousel.layout())
    }

    /// Set a status message
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Clear the status message
    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    /// Replace the items and rebuild
    pub fn load(&mut self, items: Vec<String>, now: Instant) {
        let count = items.len();
        self.drag = None;
        self.load_status = match self.carousel.set_items(items, now) {
            Some(_) => LoadStatus::Loading,
            None => LoadStatus::Empty,
        };
        info!(count, "Loaded carousel items");
        self.drain_events();
    }

    pub fn resize(&mut self, screen: Rect, now: Instant) {
        self.area = Self::areas(screen).0;
        self.drag = None;
        if self
            .carousel
            .set_container_size(Viewport::container(self.area), now)
            .is_some()
        {
            self.load_status = LoadStatus::Loading;
        }
        self.drain_events();
    }

    /// Drive timers and running transitions
    pub fn tick(&mut self, now: Instant) {
        self.carousel.poll_timers(now);
        self.carousel.host_mut().update(now);
        self.drain_events();
    }

    /// Whether frames should be drawn at the animation rate
    pub fn needs_fast_update(&self) -> bool {
        self.drag.is_some() || self.carousel.host().is_animating()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Whether a cell is inside the area that takes gestures
    pub fn hits(&self, column: u16, row: u16) -> bool {
        self.carousel.are_items_loaded()
            && self
                .viewport()
                .hits(self.carousel.hit_area(), column, row)
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                CarouselEvent::ItemsLoaded { generation } => {
                    debug!(generation, "Carousel ready");
                    self.load_status = LoadStatus::Loaded;
                }
                CarouselEvent::ItemsLoadFailed { generation } => {
                    warn!(generation, "Carousel failed to load");
                    self.load_status = LoadStatus::Failed;
                    self.set_status("Failed to load items (r to retry)");
                }
                CarouselEvent::SelectionChanged { index, origin } => {
                    if origin == SelectionOrigin::External {
                        debug!(index, "Jumped to item");
                    }
                }
            }
        }
    }

    pub fn dispatch(&mut self, action: Action, now: Instant) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::Next => self.carousel.advance(now),
            Action::Previous => self.carousel.retreat(now),
            Action::JumpBy(delta) => {
                let count = self.carousel.items().len();
                if count > 0 {
                    let target = ring::modulus(self.carousel.selected_index() as i64 + delta, count);
                    self.carousel.set_selected_index(target, now);
                }
            }
            Action::JumpToFirst => self.carousel.set_selected_index(0, now),
            Action::JumpToLast => {
                let last = self.carousel.items().len().saturating_sub(1);
                self.carousel.set_selected_index(last, now);
            }
            Action::SetLayout(mode) => {
                self.update(
                    CarouselPatch {
                        layout_mode: Some(mode),
                        ..Default::default()
                    },
                    now,
                );
                self.set_status(format!("Layout: {}", layout_name(mode)));
            }
            Action::CycleAlignment => {
                let next = next_alignment(self.carousel.config().wheel_alignment);
                self.update(
                    CarouselPatch {
                        wheel_alignment: Some(next),
                        ..Default::default()
                    },
                    now,
                );
                self.set_status(format!("Wheel alignment: {}", alignment_name(next)));
            }
            Action::GrowDensity | Action::ShrinkDensity => {
                let grow = action == Action::GrowDensity;
                match neighbour_density(self.carousel.config().density(), grow) {
                    Some(raw) => {
                        self.update(
                            CarouselPatch {
                                density: Some(raw),
                                ..Default::default()
                            },
                            now,
                        );
                        self.set_status(format!("Density: {}", self.carousel.config().density()));
                    }
                    None => self.set_status("Density at its limit"),
                }
            }
            Action::ToggleFliptych => {
                let degrees = if self.carousel.config().use_fliptych() {
                    0.0
                } else {
                    FLIPTYCH_DEGREES
                };
                self.update(
                    CarouselPatch {
                        fliptych_degrees: Some(degrees),
                        ..Default::default()
                    },
                    now,
                );
            }
            Action::ToggleWarp => {
                let intensity = if self.carousel.config().warp_intensity == 0 {
                    WARP_INTENSITY
                } else {
                    0
                };
                self.update(
                    CarouselPatch {
                        warp_intensity: Some(intensity),
                        ..Default::default()
                    },
                    now,
                );
            }
            Action::ToggleForeground => {
                let brush = match self.carousel.config().selected_item_foreground {
                    Some(_) => None,
                    None => Some(Brush::Solid(self.config.ui.colors.accent)),
                };
                self.update(
                    CarouselPatch {
                        selected_item_foreground: Some(brush),
                        ..Default::default()
                    },
                    now,
                );
            }
            Action::CycleScale => {
                let current = self.carousel.config().selected_scale();
                let next = SCALES
                    .iter()
                    .copied()
                    .find(|s| *s > current)
                    .unwrap_or(SCALES[0]);
                self.update(
                    CarouselPatch {
                        selected_item_scale: Some(next),
                        additional_items_to_scale: Some(2),
                        ..Default::default()
                    },
                    now,
                );
                self.set_status(format!("Selected scale: {:.1}", next));
            }
            Action::ToggleDepthWait => {
                let waits = !self.carousel.config().z_index_update_waits_for_animation;
                self.update(
                    CarouselPatch {
                        z_index_update_waits_for_animation: Some(waits),
                        ..Default::default()
                    },
                    now,
                );
            }
            Action::PlaySelection => self.carousel.trigger_selection_animation(),
            Action::Reload => {
                let items = self.carousel.items().to_vec();
                self.load(items, now);
            }
            Action::DragStart { column, row } => self.begin_drag(column, row),
            Action::DragMove { column, row } => self.move_drag(column, row, now),
            Action::DragEnd => {
                self.drag = None;
                self.carousel.end_manipulation(now);
            }
            Action::None => {}
        }
        self.drain_events();
    }

    fn update(&mut self, patch: CarouselPatch, now: Instant) {
        self.drag = None;
        if self.carousel.update(patch, now).is_some() {
            self.load_status = LoadStatus::Loading;
        }
    }

    fn begin_drag(&mut self, column: u16, row: u16) {
        self.carousel.begin_manipulation();
        let origin = self.carousel.wheel_angle();
        self.drag = Some(Drag {
            column,
            row,
            origin,
            pointer: self.pointer_angle(column, row),
            turned: 0.0,
        });
    }

    fn move_drag(&mut self, column: u16, row: u16, now: Instant) {
        let Some(mut drag) = self.drag else {
            return;
        };
        let value = match self.carousel.config().layout_mode {
            LayoutMode::Row => column as f64 - drag.column as f64,
            LayoutMode::Column => {
                (row as f64 - drag.row as f64) * crate::host::CELL_ASPECT
            }
            LayoutMode::Wheel => {
                let pointer = self.pointer_angle(column, row);
                drag.turned += ring::wrap_degrees(pointer - drag.pointer);
                drag.pointer = pointer;
                drag.origin + drag.turned
            }
        };
        self.drag = Some(drag);
        self.carousel.update_manipulation(value, now);
    }

    /// Angle of a cell around the wheel hub, clockwise on screen
    fn pointer_angle(&self, column: u16, row: u16) -> f64 {
        let point = self.viewport().to_units(column, row);
        point.y.atan2(point.x).to_degrees()
    }
}

/// Raw density value whose normalized size is the next one up or down, if any
fn neighbour_density(current: usize, grow: bool) -> Option<i64> {
    let current = current as i64;
    if grow {
        (current + 1..=MAX_DENSITY as i64).find(|raw| density::normalize(*raw) as i64 > current)
    } else {
        (MIN_DENSITY as i64..current)
            .rev()
            .find(|raw| (density::normalize(*raw) as i64) < current)
    }
}

fn next_alignment(alignment: WheelAlignment) -> WheelAlignment {
    match alignment {
        WheelAlignment::Right => WheelAlignment::Bottom,
        WheelAlignment::Bottom => WheelAlignment::Left,
        WheelAlignment::Left => WheelAlignment::Top,
        WheelAlignment::Top => WheelAlignment::Right,
    }
}

pub fn layout_name(mode: LayoutMode) -> &'static str {
    match mode {
        LayoutMode::Row => "row",
        LayoutMode::Column => "column",
        LayoutMode::Wheel => "wheel",
    }
}

pub fn alignment_name(alignment: WheelAlignment) -> &'static str {
    match alignment {
        WheelAlignment::Left => "left",
        WheelAlignment::Right => "right",
        WheelAlignment::Top => "top",
        WheelAlignment::Bottom => "bottom",
    }
}
