//! The selection controller.
//!
//! [`Carousel`] owns the slot window and drives a [`SlotHost`] through rebuilds, discrete
//! steps, gesture sessions and external selection changes. Every call is expected from one
//! logical context; timers are polled explicitly with [`Carousel::poll_timers`].

mod events;
mod host;

pub use events::{CarouselEvent, Listeners, SelectionOrigin};
pub use host::{Measurement, SlotHost, SlotVisual, Transition};

use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::{CarouselConfig, CarouselPatch, Impact};
use crate::depth::{self, DeferredRefresh};
use crate::geometry::{Axis, Falloff, Layout, LayoutMode, Size, Vec2, WheelAlignment};
use crate::load::{LoadCoordinator, LoadOutcome, PendingLoad};
use crate::ring::{self, Direction};
use crate::scroll::ScrollTracker;
use crate::window::{Recycle, SlotWindow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    Idle,
    /// A gesture session is open
    ManipulationActive,
    /// Catching up with an externally assigned index
    AutoAdvancing,
}

pub struct Carousel<T, H> {
    config: CarouselConfig,
    items: Vec<T>,
    host: H,
    container: Size,
    /// Largest measured item of the current build
    item_size: Size,
    window: Option<SlotWindow>,
    /// Slots with a definite size; the others are never placed
    positioned: Vec<bool>,
    /// Slots of the current build still owing a measurement
    awaiting: Vec<bool>,
    z: Vec<i32>,
    state: SelectionState,
    tracker: ScrollTracker,
    wheel_angle: f64,
    /// Deadline after which the wheel angle is normalized following a snap
    wheel_settle: Option<Instant>,
    depth_refresh: DeferredRefresh,
    loads: LoadCoordinator,
    loaded: bool,
    listeners: Listeners,
}

impl<T, H: SlotHost<T>> Carousel<T, H> {
    pub fn new(config: CarouselConfig, host: H, container: Size) -> Self {
        Self {
            config,
            items: Vec::new(),
            host,
            container,
            item_size: Size::default(),
            window: None,
            positioned: Vec::new(),
            awaiting: Vec::new(),
            z: Vec::new(),
            state: SelectionState::Idle,
            tracker: ScrollTracker::new(),
            wheel_angle: 0.0,
            wheel_settle: None,
            depth_refresh: DeferredRefresh::default(),
            loads: LoadCoordinator::new(),
            loaded: false,
            listeners: Listeners::default(),
        }
    }

    /// Receive [`CarouselEvent`]s
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<CarouselEvent> {
        self.listeners.subscribe()
    }

    pub fn config(&self) -> &CarouselConfig {
        &self.config
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn window(&self) -> Option<&SlotWindow> {
        self.window.as_ref()
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn are_items_loaded(&self) -> bool {
        self.loaded
    }

    pub fn container(&self) -> Size {
        self.container
    }

    pub fn wheel_angle(&self) -> f64 {
        self.wheel_angle
    }

    /// Current z-index of a physical slot
    pub fn z_index(&self, slot: usize) -> Option<i32> {
        self.z.get(slot).copied()
    }

    pub fn selected_index(&self) -> usize {
        self.config.selected_index
    }

    pub fn selected_item(&self) -> Option<&T> {
        self.ready_window()?;
        self.items.get(self.config.selected_index)
    }

    /// Physical slot showing the selection
    pub fn selected_slot(&self) -> Option<usize> {
        self.ready_window().map(SlotWindow::selected_slot)
    }

    pub fn layout(&self) -> Layout {
        Layout {
            mode: self.config.layout_mode,
            alignment: self.config.wheel_alignment,
            density: self
                .window
                .as_ref()
                .map_or_else(|| self.config.density(), SlotWindow::density),
            container: self.container,
            item: self.item_size,
            gap: self.config.item_gap as f64,
        }
    }

    pub fn hit_area(&self) -> Size {
        self.layout().hitbox(self.config.selected_scale())
    }

    /// The window once its build has loaded; navigation is a no-op before that
    fn ready_window(&self) -> Option<&SlotWindow> {
        if self.loaded {
            self.window.as_ref()
        } else {
            None
        }
    }

    /// Replace the collection and rebuild.
    pub fn set_items(&mut self, items: Vec<T>, now: Instant) -> Option<PendingLoad> {
        self.items = items;
        self.rebuild(now)
    }

    /// Resize the container; any change rebuilds the window.
    pub fn set_container_size(&mut self, size: Size, now: Instant) -> Option<PendingLoad> {
        if size == self.container {
            return None;
        }
        self.container = size;
        self.rebuild(now)
    }

    /// Apply a configuration change, doing only the work the changed fields require.
    pub fn update(&mut self, patch: CarouselPatch, now: Instant) -> Option<PendingLoad> {
        let selected = patch.selected_index;
        let had_brush = self.config.selected_item_foreground.is_some();
        let impact = self.config.apply(patch);
        debug!(?impact, "Applied carousel configuration");

        match impact {
            Impact::Rebuild => {
                if let Some(index) = selected {
                    self.config.selected_index = if self.items.is_empty() {
                        index
                    } else {
                        ring::modulus(index as i64, self.items.len())
                    };
                }
                self.rebuild(now)
            }
            Impact::Effects => {
                if had_brush && self.config.selected_item_foreground.is_none() {
                    self.restore_colors();
                }
                if self.loaded {
                    self.host.set_hit_area(self.hit_area());
                    self.place_all(Transition::Immediate);
                }
                if let Some(index) = selected {
                    self.set_selected_index(index, now);
                }
                None
            }
            Impact::Timing | Impact::None => {
                if let Some(index) = selected {
                    self.set_selected_index(index, now);
                }
                None
            }
        }
    }

    /// Tear the window down and materialize a fresh one around the selected index.
    ///
    /// Returns `None` for an empty collection; otherwise the handle of the new build, which
    /// supersedes any build still in flight.
    pub fn rebuild(&mut self, now: Instant) -> Option<PendingLoad> {
        self.host.clear();
        self.window = None;
        self.loaded = false;
        self.positioned.clear();
        self.awaiting.clear();
        self.z.clear();
        self.item_size = Size::default();
        self.state = SelectionState::Idle;
        self.tracker.reset();
        self.wheel_angle = 0.0;
        self.wheel_settle = None;
        self.depth_refresh.cancel();

        if self.items.is_empty() {
            self.loads.supersede();
            return None;
        }

        let count = self.items.len();
        if self.config.selected_index >= count {
            debug!(
                selected = self.config.selected_index,
                count, "Selected index out of range after rebuild, resetting"
            );
            self.config.selected_index = 0;
        }

        let density = self.config.density();
        let pending = self.loads.begin(now, self.config.load_timeout());
        let generation = pending.generation();
        info!(
            density,
            items = count,
            generation,
            layout = ?self.config.layout_mode,
            "Rebuilding carousel window"
        );

        let mut window = SlotWindow::new(density, count, self.config.selected_index);
        self.positioned = vec![false; density];
        self.awaiting = vec![false; density];
        self.z = vec![0; density];

        for slot in 0..density {
            let item = &self.items[window.slots()[slot].item];
            match self.host.materialize(slot, item) {
                Ok(Measurement::Fixed(size)) => {
                    self.item_size = self.item_size.max(size);
                    self.positioned[slot] = true;
                }
                Ok(Measurement::Pending) => {
                    self.awaiting[slot] = true;
                    self.loads.expect_measurement();
                }
                Ok(Measurement::Indefinite) => {
                    warn!(slot, "Item has no definite size; slot left unpositioned");
                }
                Err(e) => {
                    error!(generation, slot, "Failed to build carousel window: {}", e);
                    self.host.clear();
                    if let Some(outcome) = self.loads.cancel() {
                        self.finish_load(generation, outcome);
                    }
                    return Some(pending);
                }
            }
            if let Some(entry) = window.slot_mut(slot) {
                entry.targets = self.host.recolor_targets(slot);
            }
        }

        self.window = Some(window);
        if let Some(outcome) = self.loads.settle() {
            self.finish_load(generation, outcome);
        }
        Some(pending)
    }

    /// A slot of build `generation` finished measuring.
    ///
    /// Only the first definite report of a slot that materialized as
    /// [`Measurement::Pending`] counts toward the load.
    pub fn report_measured(&mut self, generation: u64, slot: usize, measurement: Measurement) {
        if generation != self.loads.generation() || !self.loads.is_pending() {
            debug!(generation, slot, "Ignoring measurement for a finished build");
            return;
        }
        if measurement == Measurement::Pending {
            return;
        }
        match self.awaiting.get_mut(slot) {
            Some(awaiting) if *awaiting => *awaiting = false,
            _ => {
                debug!(generation, slot, "Ignoring measurement for a slot not awaiting one");
                return;
            }
        }
        if let Measurement::Fixed(size) = measurement {
            self.item_size = self.item_size.max(size);
            self.positioned[slot] = true;
        } else {
            warn!(slot, "Item has no definite size; slot left unpositioned");
        }
        if let Some(outcome) = self.loads.measured(generation) {
            self.finish_load(generation, outcome);
        }
    }

    fn finish_load(&mut self, generation: u64, outcome: LoadOutcome) {
        match outcome {
            LoadOutcome::Loaded => {
                self.loaded = true;
                self.layout_grid();
                self.host.rotate_wheel(self.wheel_angle, Transition::Immediate);
                self.place_all(Transition::Immediate);
                self.refresh_depth();
                self.host.set_hit_area(self.hit_area());
                info!(generation, "Carousel items loaded");
                self.listeners
                    .send(CarouselEvent::ItemsLoaded { generation });
            }
            LoadOutcome::TimedOut | LoadOutcome::Cancelled => {
                warn!(generation, ?outcome, "Carousel load failed");
                self.host.clear();
                self.window = None;
                self.loaded = false;
                self.listeners
                    .send(CarouselEvent::ItemsLoadFailed { generation });
            }
            LoadOutcome::Superseded => {
                debug!(generation, "Build superseded");
            }
        }
    }

    /// Drive deferred work: load deadlines, deferred depth refreshes and the wheel settle.
    pub fn poll_timers(&mut self, now: Instant) {
        if let Some(outcome) = self.loads.poll(now) {
            let generation = self.loads.generation();
            self.finish_load(generation, outcome);
        }
        if self.depth_refresh.poll(now) {
            self.refresh_depth();
        }
        if matches!(self.wheel_settle, Some(deadline) if now >= deadline) {
            self.settle_wheel();
        }
    }

    /// Earliest instant at which [`poll_timers`](Self::poll_timers) has work to do
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.loads.deadline(),
            self.depth_refresh.deadline(),
            self.wheel_settle,
        ]
        .into_iter()
        .flatten()
        .min()
    }

    pub fn advance(&mut self, now: Instant) {
        self.step(Direction::Forward, now);
    }

    pub fn retreat(&mut self, now: Instant) {
        self.step(Direction::Backward, now);
    }

    fn step(&mut self, direction: Direction, now: Instant) {
        let manipulating = self.state == SelectionState::ManipulationActive;
        if !self.loaded {
            return;
        }
        let Some(window) = self.window.as_mut() else {
            return;
        };

        let recycle = match direction {
            Direction::Forward => window.advance(),
            Direction::Backward => window.retreat(),
        };
        let index = window.selected();
        self.config.selected_index = index;
        self.rebind(recycle);

        let layout = self.layout();
        match layout.mode {
            LayoutMode::Row | LayoutMode::Column => {
                if manipulating {
                    self.place_beside_neighbour(recycle, &layout);
                    self.place_all(Transition::Immediate);
                } else {
                    self.place_beyond_edge(&[recycle], &layout);
                    self.layout_grid();
                    self.place_all(self.navigation());
                }
            }
            LayoutMode::Wheel => {
                if !manipulating {
                    let turn = match direction {
                        Direction::Forward => layout.wheel_step(),
                        Direction::Backward => -layout.wheel_step(),
                    };
                    self.wheel_angle += turn;
                    self.host.rotate_wheel(self.wheel_angle, self.navigation());
                    self.place_slot(recycle.slot, Transition::Immediate);
                    self.place_all(self.navigation());
                } else {
                    self.place_all(Transition::Immediate);
                }
            }
        }

        self.inherit_depth(recycle);
        debug!(index, ?direction, slot = recycle.slot, "Stepped selection");
        self.listeners.send(CarouselEvent::SelectionChanged {
            index,
            origin: SelectionOrigin::Internal,
        });
        self.request_depth_refresh(now);
    }

    /// Assign the selected index from outside; the window catches up in at most `D` steps.
    pub fn set_selected_index(&mut self, index: usize, now: Instant) {
        if self.items.is_empty() {
            return;
        }
        let count = self.items.len();
        let target = ring::modulus(index as i64, count);

        if self.ready_window().is_none() {
            let changed = self.config.selected_index != target;
            self.config.selected_index = target;
            // A build still loading is re-centered on the new selection
            if changed && self.window.is_some() {
                self.rebuild(now);
            }
            return;
        }
        if self.state == SelectionState::ManipulationActive {
            self.end_manipulation(now);
        }

        let layout = self.layout();
        let density = layout.density;
        let Some(window) = self.window.as_mut() else {
            return;
        };
        let previous = window.selected();
        if previous == target {
            return;
        }

        self.state = SelectionState::AutoAdvancing;
        let hop = ring::shortest_hop(previous, target, count);
        let steps = hop.distance.min(density);
        let half = (density / 2) as i64;
        let t = target as i64;
        let n = steps as i64;

        let mut recycled = Vec::with_capacity(steps);
        match hop.direction {
            Direction::Forward => {
                let start = ring::modulus(t + 1 - n - half, count);
                for k in 0..steps {
                    let item = (start + k + density - 1) % count;
                    recycled.push(window.recycle(Direction::Forward, item));
                }
            }
            Direction::Backward => {
                let start = ring::modulus(t - 1 + n - half, count);
                for k in 0..steps {
                    let item = ring::modulus(start as i64 - k as i64, count);
                    recycled.push(window.recycle(Direction::Backward, item));
                }
            }
        }
        window.set_selected(target);
        self.config.selected_index = target;
        for recycle in &recycled {
            self.rebind(*recycle);
        }

        match layout.mode {
            LayoutMode::Row | LayoutMode::Column => {
                self.place_beyond_edge(&recycled, &layout);
                self.layout_grid();
                self.place_all(self.navigation());
            }
            LayoutMode::Wheel => {
                let turn = match hop.direction {
                    Direction::Forward => layout.wheel_step(),
                    Direction::Backward => -layout.wheel_step(),
                };
                self.wheel_angle += turn * steps as f64;
                self.host.rotate_wheel(self.wheel_angle, self.navigation());
                for recycle in &recycled {
                    self.place_slot(recycle.slot, Transition::Immediate);
                }
                self.place_all(self.navigation());
            }
        }

        info!(
            from = previous,
            to = target,
            steps,
            direction = ?hop.direction,
            "Caught up with external selection"
        );
        self.listeners.send(CarouselEvent::SelectionChanged {
            index: target,
            origin: SelectionOrigin::External,
        });
        self.request_depth_refresh(now);
        self.state = SelectionState::Idle;
    }

    /// Open a gesture session.
    pub fn begin_manipulation(&mut self) {
        if self.ready_window().is_none() {
            return;
        }
        if self.wheel_settle.is_some() {
            self.settle_wheel();
        }
        let layout = self.layout();
        let origin = match layout.mode {
            LayoutMode::Wheel => self.wheel_angle,
            LayoutMode::Row | LayoutMode::Column => 0.0,
        };
        self.tracker.begin_session(origin, layout.pitch());
        self.state = SelectionState::ManipulationActive;
        debug!(origin, threshold = layout.pitch(), "Gesture session started");
    }

    /// Feed the absolute gesture value: a translation along the primary axis for Row/Column,
    /// a wheel angle for the Wheel.
    pub fn update_manipulation(&mut self, value: f64, now: Instant) {
        if self.state != SelectionState::ManipulationActive {
            return;
        }
        let layout = self.layout();
        let update = self.tracker.update(value);

        match layout.mode {
            LayoutMode::Row | LayoutMode::Column => {
                if let Some(window) = self.window.as_mut() {
                    window.translate_all(Vec2::on_axis(layout.primary_axis(), update.delta));
                }
            }
            LayoutMode::Wheel => {
                self.wheel_angle = value;
                self.host.rotate_wheel(value, Transition::Immediate);
            }
        }

        let growing = match (layout.mode, layout.alignment) {
            (LayoutMode::Row | LayoutMode::Column, _) => Direction::Backward,
            (LayoutMode::Wheel, WheelAlignment::Right | WheelAlignment::Top) => Direction::Forward,
            (LayoutMode::Wheel, WheelAlignment::Left | WheelAlignment::Bottom) => {
                Direction::Backward
            }
        };
        let direction = if update.steps > 0 {
            growing
        } else {
            opposite(growing)
        };
        for _ in 0..update.steps.unsigned_abs() {
            self.step(direction, now);
        }
        self.place_all(Transition::Immediate);
    }

    /// Close the gesture session and snap to the nearest slot.
    pub fn end_manipulation(&mut self, now: Instant) {
        if self.state != SelectionState::ManipulationActive {
            return;
        }
        self.state = SelectionState::Idle;

        let layout = self.layout();
        match layout.mode {
            LayoutMode::Row | LayoutMode::Column => {
                self.layout_grid();
                self.place_all(self.navigation());
            }
            LayoutMode::Wheel => {
                let snap = self.config.wheel_snap_duration();
                self.wheel_angle = self.tracker.tick();
                self.host
                    .rotate_wheel(self.wheel_angle, Transition::over(snap));
                self.place_all(Transition::over(snap));
                self.wheel_settle = Some(now + snap);
            }
        }

        self.depth_refresh.cancel();
        self.refresh_depth();
        self.tracker.reset();
        debug!(selected = self.config.selected_index, "Snapped after gesture");
    }

    /// Ask the host to play the selection animation on the selected container
    pub fn trigger_selection_animation(&mut self) {
        if let Some(slot) = self.selected_slot() {
            self.host.play_selection_animation(slot);
        }
    }

    fn navigation(&self) -> Transition {
        Transition::over(self.config.navigation_duration())
    }

    fn rebind(&mut self, recycle: Recycle) {
        let Some(item) = self.items.get(recycle.item) else {
            return;
        };
        self.host.rebind(recycle.slot, item);
        let targets = self.host.recolor_targets(recycle.slot);
        if let Some(slot) = self.window.as_mut().and_then(|w| w.slot_mut(recycle.slot)) {
            slot.targets = targets;
        }
    }

    /// Put every Row/Column slot on the grid position of its window position
    fn layout_grid(&mut self) {
        let layout = self.layout();
        if layout.mode == LayoutMode::Wheel {
            return;
        }
        if let Some(window) = self.window.as_mut() {
            for slot in 0..window.density() {
                let position = window.position_of(slot);
                if let Some(entry) = window.slot_mut(slot) {
                    entry.offset = layout.position(position);
                }
            }
        }
    }

    /// Recycled slots enter from just past the edge they are joining, without a transition
    fn place_beyond_edge(&mut self, recycled: &[Recycle], layout: &Layout) {
        let Some(window) = self.window.as_mut() else {
            return;
        };
        let shift = layout.pitch() * recycled.len() as f64;
        for recycle in recycled {
            let position = window.position_of(recycle.slot);
            let sign = match recycle.direction {
                Direction::Forward => 1.0,
                Direction::Backward => -1.0,
            };
            if let Some(entry) = window.slot_mut(recycle.slot) {
                entry.offset = layout.position(position)
                    + Vec2::on_axis(layout.primary_axis(), sign * shift);
            }
        }
        for recycle in recycled {
            self.place_slot(recycle.slot, Transition::Immediate);
        }
    }

    /// While dragging, a recycled slot lines up one pitch past its neighbour
    fn place_beside_neighbour(&mut self, recycle: Recycle, layout: &Layout) {
        let Some(window) = self.window.as_mut() else {
            return;
        };
        let density = window.density();
        let (neighbour, sign) = match recycle.direction {
            Direction::Forward => ((recycle.slot + 1) % density, 1.0),
            Direction::Backward => (ring::modulus(recycle.slot as i64 - 1, density), -1.0),
        };
        let Some(anchor) = window.slot(neighbour).map(|s| s.offset) else {
            return;
        };
        if let Some(entry) = window.slot_mut(recycle.slot) {
            entry.offset = anchor + Vec2::on_axis(layout.primary_axis(), sign * layout.pitch());
        }
        self.place_slot(recycle.slot, Transition::Immediate);
    }

    /// A recycled slot sits just below the neighbour it joined until the next depth refresh
    fn inherit_depth(&mut self, recycle: Recycle) {
        let density = self.z.len();
        if density == 0 {
            return;
        }
        let neighbour = match recycle.direction {
            Direction::Forward => (recycle.slot + 1) % density,
            Direction::Backward => ring::modulus(recycle.slot as i64 - 1, density),
        };
        let z = self.z[neighbour] - 1;
        self.z[recycle.slot] = z;
        self.host.set_z_index(recycle.slot, z);
    }

    fn request_depth_refresh(&mut self, now: Instant) {
        if self
            .depth_refresh
            .request(now, self.config.depth_refresh_delay())
        {
            self.refresh_depth();
        }
    }

    fn refresh_depth(&mut self) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        self.z = depth::z_indices(window.density(), window.display_selected());
        for (slot, z) in self.z.iter().enumerate() {
            self.host.set_z_index(slot, *z);
        }
    }

    fn settle_wheel(&mut self) {
        self.wheel_settle = None;
        self.wheel_angle = self.wheel_angle.rem_euclid(360.0);
        self.host
            .rotate_wheel(self.wheel_angle, Transition::Immediate);
    }

    fn place_all(&mut self, transition: Transition) {
        let density = self.window.as_ref().map_or(0, SlotWindow::density);
        for slot in 0..density {
            self.place_slot(slot, transition);
        }
    }

    fn place_slot(&mut self, slot: usize, transition: Transition) {
        if !self.loaded || !self.positioned.get(slot).copied().unwrap_or(false) {
            return;
        }
        let Some((visual, falloff)) = self.visual(slot) else {
            return;
        };
        self.host.place(slot, &visual, transition);
        self.recolor(slot, &falloff);
    }

    /// Target visual of a slot and the falloff driving its color
    pub fn visual(&self, slot: usize) -> Option<(SlotVisual, Falloff)> {
        let window = self.window.as_ref()?;
        let entry = window.slot(slot)?;
        let layout = self.layout();
        let config = &self.config;
        let axis = layout.primary_axis();

        let (offset, rotation, distance) = match layout.mode {
            LayoutMode::Row | LayoutMode::Column => {
                (entry.offset, 0.0, entry.offset.along(axis))
            }
            LayoutMode::Wheel => {
                let geometry = layout.geometry(entry.home);
                let distance = layout.wheel_distance(entry.home, self.wheel_angle);
                (geometry.offset, geometry.rotation, distance)
            }
        };

        let falloff = Falloff::new(distance, layout.threshold(config.items_to_scale()));
        let mut offset = offset;
        if layout.mode != LayoutMode::Wheel && config.warp_intensity != 0 {
            let warp = Falloff::new(distance, layout.threshold(config.items_to_warp()))
                .warp(config.warp_intensity as f64, config.warp_curve);
            offset += Vec2::on_axis(perpendicular(axis), warp);
        }

        let tilt = if config.use_fliptych() {
            let mut degrees = match axis {
                Axis::X => -config.fliptych_degrees,
                Axis::Y => config.fliptych_degrees,
            };
            if layout.mode == LayoutMode::Wheel {
                degrees = -degrees;
            }
            falloff.tilt(degrees)
        } else {
            0.0
        };

        let visual = SlotVisual {
            offset,
            rotation,
            scale: falloff.scale(config.selected_scale()),
            tilt,
            tilt_axis: perpendicular(axis),
            falloff: falloff.magnitude(),
        };
        Some((visual, falloff))
    }

    fn recolor(&mut self, slot: usize, falloff: &Falloff) {
        let Some(selected) = self.config.selected_item_foreground.as_ref() else {
            return;
        };
        let Some(entry) = self.window.as_ref().and_then(|w| w.slot(slot)) else {
            return;
        };
        for (target, original) in entry.targets.iter().enumerate() {
            match host::blend_brush(selected, original, |sel, orig| falloff.blend(sel, orig)) {
                Some(brush) => self.host.recolor(slot, target, &brush),
                None => debug!(slot, target, "Brush shape mismatch; target not recolored"),
            }
        }
    }

    fn restore_colors(&mut self) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        for (slot, entry) in window.slots().iter().enumerate() {
            for (target, original) in entry.targets.iter().enumerate() {
                self.host.recolor(slot, target, original);
            }
        }
    }
}

fn opposite(direction: Direction) -> Direction {
    match direction {
        Direction::Forward => Direction::Backward,
        Direction::Backward => Direction::Forward,
    }
}

fn perpendicular(axis: Axis) -> Axis {
    match axis {
        Axis::X => Axis::Y,
        Axis::Y => Axis::X,
    }
}

impl<T, H> std::fmt::Debug for Carousel<T, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Carousel")
            .field("items", &self.items.len())
            .field("selected_index", &self.config.selected_index)
            .field("state", &self.state)
            .field("loaded", &self.loaded)
            .field("wheel_angle", &self.wheel_angle)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::time::{Duration, Instant};

    use tokio::sync::mpsc::UnboundedReceiver;

    use super::*;
    use crate::color::{Brush, Rgba};
    use crate::config::CarouselConfig;
    use crate::depth::SELECTED_Z;
    use crate::{Error, Result};

    const ITEM: Size = Size::new(20.0, 10.0);
    const CONTAINER: Size = Size::new(400.0, 200.0);

    /// Host that records what the carousel asked of it.
    #[derive(Debug, Default)]
    struct MockHost {
        clears: usize,
        materialized: usize,
        bound: HashMap<usize, usize>,
        placed: HashMap<usize, (SlotVisual, Transition)>,
        place_calls: usize,
        z: HashMap<usize, i32>,
        z_calls: usize,
        wheel: Vec<(f64, Transition)>,
        hit_area: Option<Size>,
        recolored: HashMap<(usize, usize), Brush>,
        animated: Vec<usize>,
        /// Measurement behaviour
        pending: bool,
        indefinite: HashSet<usize>,
        fail_on: Option<usize>,
        targets: Vec<Brush>,
    }

    impl SlotHost<usize> for MockHost {
        fn clear(&mut self) {
            self.clears += 1;
            self.bound.clear();
            self.placed.clear();
            self.z.clear();
        }

        fn materialize(&mut self, slot: usize, item: &usize) -> Result<Measurement> {
            if self.fail_on == Some(slot) {
                return Err(Error::Host(format!("template for slot {slot} failed")));
            }
            self.materialized += 1;
            self.bound.insert(slot, *item);
            if self.indefinite.contains(&slot) {
                Ok(Measurement::Indefinite)
            } else if self.pending {
                Ok(Measurement::Pending)
            } else {
                Ok(Measurement::Fixed(ITEM))
            }
        }

        fn rebind(&mut self, slot: usize, item: &usize) {
            self.bound.insert(slot, *item);
        }

        fn place(&mut self, slot: usize, visual: &SlotVisual, transition: Transition) {
            self.place_calls += 1;
            self.placed.insert(slot, (*visual, transition));
        }

        fn set_z_index(&mut self, slot: usize, z: i32) {
            self.z_calls += 1;
            self.z.insert(slot, z);
        }

        fn rotate_wheel(&mut self, degrees: f64, transition: Transition) {
            self.wheel.push((degrees, transition));
        }

        fn set_hit_area(&mut self, size: Size) {
            self.hit_area = Some(size);
        }

        fn recolor_targets(&self, _slot: usize) -> Vec<Brush> {
            self.targets.clone()
        }

        fn recolor(&mut self, slot: usize, target: usize, brush: &Brush) {
            self.recolored.insert((slot, target), brush.clone());
        }

        fn play_selection_animation(&mut self, slot: usize) {
            self.animated.push(slot);
        }
    }

    fn config(mode: LayoutMode) -> CarouselConfig {
        CarouselConfig {
            layout_mode: mode,
            density: 12,
            ..CarouselConfig::default()
        }
    }

    fn build(
        count: usize,
        config: CarouselConfig,
        host: MockHost,
    ) -> (Carousel<usize, MockHost>, UnboundedReceiver<CarouselEvent>) {
        let mut carousel = Carousel::new(config, host, CONTAINER);
        let rx = carousel.subscribe();
        carousel.set_items((0..count).collect(), Instant::now());
        (carousel, rx)
    }

    fn loaded(count: usize, mode: LayoutMode) -> Carousel<usize, MockHost> {
        let (carousel, _rx) = build(count, config(mode), MockHost::default());
        carousel
    }

    fn drain(rx: &mut UnboundedReceiver<CarouselEvent>) -> Vec<CarouselEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn selection_events(events: &[CarouselEvent]) -> Vec<(usize, SelectionOrigin)> {
        events
            .iter()
            .filter_map(|e| match e {
                CarouselEvent::SelectionChanged { index, origin } => Some((*index, *origin)),
                _ => None,
            })
            .collect()
    }

    /// Window covers `[S - D/2, S + D/2)` and the host shows exactly what the window says
    fn assert_window_consistent(carousel: &Carousel<usize, MockHost>) {
        let window = carousel.window().expect("window built");
        let n = window.item_count();
        let start = window.window_start();
        for (position, item) in window.items_by_position().into_iter().enumerate() {
            assert_eq!(item, (start + position) % n, "window position {position}");
        }
        for (slot, entry) in window.slots().iter().enumerate() {
            assert_eq!(carousel.host().bound.get(&slot), Some(&entry.item), "slot {slot}");
        }
        assert_eq!(window.selected(), carousel.selected_index());
    }

    fn assert_depth_settled(carousel: &Carousel<usize, MockHost>) {
        let window = carousel.window().expect("window built");
        let half = (window.density() / 2) as i64;
        for slot in 0..window.density() {
            let distance = window.position_of(slot) as i64 - half;
            let expected = SELECTED_Z - distance.unsigned_abs() as i32;
            assert_eq!(carousel.host().z.get(&slot), Some(&expected), "slot {slot}");
        }
    }

    #[test]
    fn test_empty_collection_is_noop() {
        let (mut carousel, mut rx) = build(0, config(LayoutMode::Row), MockHost::default());
        let now = Instant::now();
        assert!(carousel.window().is_none());
        carousel.advance(now);
        carousel.retreat(now);
        carousel.set_selected_index(4, now);
        carousel.begin_manipulation();
        carousel.update_manipulation(100.0, now);
        carousel.end_manipulation(now);
        assert!(carousel.selected_item().is_none());
        assert!(drain(&mut rx).is_empty());
        assert_eq!(carousel.host().materialized, 0);
    }

    #[test]
    fn test_synchronous_measurement_loads_immediately() {
        let (carousel, mut rx) = build(100, config(LayoutMode::Row), MockHost::default());
        assert!(carousel.are_items_loaded());
        assert_eq!(drain(&mut rx), vec![CarouselEvent::ItemsLoaded { generation: 1 }]);
        assert_eq!(carousel.host().materialized, 12);
        assert_eq!(carousel.selected_item(), Some(&0));
        assert_window_consistent(&carousel);
        assert_depth_settled(&carousel);
        assert_eq!(carousel.host().hit_area, Some(Size::new(400.0, 10.0)));
    }

    #[test]
    fn test_selection_follows_step_count() {
        let (mut carousel, mut rx) = build(7, config(LayoutMode::Row), MockHost::default());
        drain(&mut rx);
        let now = Instant::now();
        let (mut advances, mut retreats) = (0i64, 0i64);
        for step in 0..40 {
            if step % 5 < 2 {
                carousel.retreat(now);
                retreats += 1;
            } else {
                carousel.advance(now);
                advances += 1;
            }
            assert_window_consistent(&carousel);
        }
        assert_eq!(
            carousel.selected_index(),
            ring::modulus(advances - retreats, 7)
        );
        let events = selection_events(&drain(&mut rx));
        assert_eq!(events.len(), 40);
        assert!(events.iter().all(|(_, origin)| *origin == SelectionOrigin::Internal));
    }

    #[test]
    fn test_density_advances_return_to_start() {
        let mut carousel = loaded(50, LayoutMode::Row);
        let now = Instant::now();
        let before: Vec<(usize, Vec2)> = carousel
            .window()
            .unwrap()
            .slots()
            .iter()
            .map(|s| (s.item, s.offset))
            .collect();
        for _ in 0..12 {
            carousel.advance(now);
        }
        let window = carousel.window().unwrap();
        let after: Vec<(usize, Vec2)> = window.slots().iter().map(|s| (s.item, s.offset)).collect();
        assert_eq!(window.insert(), 0);
        assert_eq!(carousel.selected_index(), 12);
        // Same slots in the same places, each showing the item twelve further on
        for ((item_before, offset_before), (item_after, offset_after)) in before.iter().zip(&after) {
            assert_eq!((item_before + 12) % 50, *item_after);
            assert_eq!(offset_before, offset_after);
        }
    }

    #[test]
    fn test_depth_order_after_steps() {
        let mut carousel = loaded(30, LayoutMode::Row);
        let now = Instant::now();
        for _ in 0..5 {
            carousel.advance(now);
        }
        carousel.retreat(now);
        assert_depth_settled(&carousel);
        let selected = carousel.selected_slot().unwrap();
        assert_eq!(carousel.z_index(selected), Some(SELECTED_Z));
    }

    #[test]
    fn test_row_selection_is_centered_and_scaled() {
        let mut config = config(LayoutMode::Row);
        config.selected_item_scale = 2.0;
        let (carousel, _rx) = build(40, config, MockHost::default());
        let selected = carousel.selected_slot().unwrap();
        let (visual, _) = carousel.host().placed[&selected];
        assert_eq!(visual.offset, Vec2::ZERO);
        assert_eq!(visual.scale, 2.0);

        let window = carousel.window().unwrap();
        let next = window.slot_at(7);
        let (visual, _) = carousel.host().placed[&next];
        assert_eq!(visual.offset, Vec2::new(20.0, 0.0));
        assert_eq!(visual.scale, 1.0);
    }

    #[test]
    fn test_advance_shifts_row_with_navigation_transition() {
        let mut carousel = loaded(40, LayoutMode::Row);
        carousel.advance(Instant::now());
        let window = carousel.window().unwrap();
        let leading = window.slot_at(11);
        let (visual, transition) = carousel.host().placed[&leading];
        // The recycled slot lands on the last grid position
        assert_eq!(visual.offset, Vec2::new(100.0, 0.0));
        assert_eq!(transition, Transition::Animated(Duration::from_millis(500)));
        let (visual, _) = carousel.host().placed[&carousel.selected_slot().unwrap()];
        assert_eq!(visual.offset, Vec2::ZERO);
    }

    #[test]
    fn test_wheel_right_slot_zero_sits_on_the_right() {
        let carousel = loaded(40, LayoutMode::Wheel);
        let window = carousel.window().unwrap();
        let slot = window.slots().iter().position(|s| s.home == 0).unwrap();
        let (visual, _) = carousel.host().placed[&slot];
        assert!((visual.offset.x - 200.0).abs() < 1e-9);
        assert!(visual.offset.y.abs() < 1e-9);
        assert_eq!(
            carousel.host().hit_area,
            Some(Size::new(420.0, 420.0))
        );
    }

    #[test]
    fn test_wheel_step_rotates_by_one_slot() {
        let mut config = config(LayoutMode::Wheel);
        config.wheel_alignment = WheelAlignment::Left;
        let (mut carousel, _rx) = build(40, config, MockHost::default());
        let now = Instant::now();
        carousel.advance(now);
        assert_eq!(carousel.wheel_angle(), -30.0);
        carousel.retreat(now);
        carousel.retreat(now);
        assert_eq!(carousel.wheel_angle(), 30.0);
        let (visual, _) = carousel.host().placed[&carousel.selected_slot().unwrap()];
        assert_eq!(visual.falloff, 0.0);
    }

    #[test]
    fn test_external_selection_catches_up_forward() {
        let (mut carousel, mut rx) = build(100, config(LayoutMode::Row), MockHost::default());
        drain(&mut rx);
        carousel.set_selected_index(10, Instant::now());
        assert_window_consistent(&carousel);
        assert_eq!(carousel.state(), SelectionState::Idle);
        assert_eq!(
            selection_events(&drain(&mut rx)),
            vec![(10, SelectionOrigin::External)]
        );
        assert_eq!(carousel.window().unwrap().insert(), 10);
    }

    #[test]
    fn test_external_selection_takes_shorter_way_back() {
        let (mut carousel, mut rx) = build(100, config(LayoutMode::Row), MockHost::default());
        drain(&mut rx);
        carousel.set_selected_index(97, Instant::now());
        assert_window_consistent(&carousel);
        assert_eq!(carousel.window().unwrap().insert(), 9);
        assert_eq!(selection_events(&drain(&mut rx)).len(), 1);
    }

    #[test]
    fn test_far_external_selection_recycles_whole_window() {
        let mut carousel = loaded(100, LayoutMode::Row);
        carousel.set_selected_index(50, Instant::now());
        assert_window_consistent(&carousel);
        assert_eq!(carousel.window().unwrap().insert(), 0);
        assert_depth_settled(&carousel);
    }

    #[test]
    fn test_external_selection_wraps_out_of_range() {
        let mut carousel = loaded(100, LayoutMode::Wheel);
        carousel.set_selected_index(205, Instant::now());
        assert_eq!(carousel.selected_index(), 5);
        assert_window_consistent(&carousel);
        // Five advance steps of the wheel
        assert_eq!(carousel.wheel_angle(), 150.0);
    }

    #[test]
    fn test_same_external_selection_is_ignored() {
        let (mut carousel, mut rx) = build(20, config(LayoutMode::Row), MockHost::default());
        drain(&mut rx);
        carousel.set_selected_index(0, Instant::now());
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_drag_fires_one_step_at_one_and_a_half_pitch() {
        let (mut carousel, mut rx) = build(40, config(LayoutMode::Row), MockHost::default());
        drain(&mut rx);
        let now = Instant::now();
        carousel.begin_manipulation();
        assert_eq!(carousel.state(), SelectionState::ManipulationActive);
        for value in [0.0, -10.0, -20.0] {
            carousel.update_manipulation(value, now);
        }
        assert!(drain(&mut rx).is_empty());
        carousel.update_manipulation(-30.0, now);
        // Dragging toward -X brings the next item in
        assert_eq!(
            selection_events(&drain(&mut rx)),
            vec![(1, SelectionOrigin::Internal)]
        );
        assert_window_consistent(&carousel);

        // Everything moved with the finger, the recycled slot one pitch past its neighbour
        let window = carousel.window().unwrap();
        for position in 0..12 {
            let slot = window.slot_at(position);
            let expected = 20.0 * (position as f64 - 6.0) + 20.0 - 30.0;
            assert!(
                (window.slot(slot).unwrap().offset.x - expected).abs() < 1e-9,
                "position {position}"
            );
        }
    }

    #[test]
    fn test_snap_returns_slots_to_grid() {
        let mut carousel = loaded(40, LayoutMode::Column);
        let now = Instant::now();
        carousel.begin_manipulation();
        carousel.update_manipulation(0.0, now);
        carousel.update_manipulation(7.0, now);
        carousel.update_manipulation(17.0, now);
        carousel.end_manipulation(now);
        assert_eq!(carousel.state(), SelectionState::Idle);
        // Column pitch is the item height; +Y retreats
        assert_eq!(carousel.selected_index(), 39);

        let window = carousel.window().unwrap();
        let selected = window.selected_slot();
        for k in -5i64..=6 {
            let slot = ring::modulus(selected as i64 + k, 12);
            let (visual, transition) = carousel.host().placed[&slot];
            assert_eq!(visual.offset, Vec2::new(0.0, -10.0 * k as f64), "k = {k}");
            assert_eq!(transition, Transition::Animated(Duration::from_millis(500)));
        }
        assert_depth_settled(&carousel);
    }

    #[test]
    fn test_wheel_gesture_snaps_and_settles() {
        let mut carousel = loaded(40, LayoutMode::Wheel);
        let start = Instant::now();
        carousel.begin_manipulation();
        carousel.update_manipulation(0.0, start);
        carousel.update_manipulation(200.0, start);
        carousel.update_manipulation(395.0, start);
        assert_eq!(carousel.selected_index(), 13);
        assert_window_consistent(&carousel);

        carousel.end_manipulation(start);
        assert_eq!(carousel.wheel_angle(), 390.0);
        assert_eq!(
            carousel.host().wheel.last(),
            Some(&(390.0, Transition::Animated(Duration::from_millis(250))))
        );
        assert_eq!(carousel.next_deadline(), Some(start + Duration::from_millis(250)));

        carousel.poll_timers(start + Duration::from_millis(250));
        assert_eq!(carousel.wheel_angle(), 30.0);
        assert_eq!(carousel.host().wheel.last(), Some(&(30.0, Transition::Immediate)));
        assert_eq!(carousel.next_deadline(), None);
    }

    #[test]
    fn test_new_gesture_settles_wheel_early() {
        let mut carousel = loaded(40, LayoutMode::Wheel);
        let now = Instant::now();
        carousel.begin_manipulation();
        carousel.update_manipulation(0.0, now);
        carousel.update_manipulation(-370.0, now);
        carousel.end_manipulation(now);
        assert_eq!(carousel.wheel_angle(), -360.0);
        carousel.begin_manipulation();
        assert_eq!(carousel.wheel_angle(), 0.0);
    }

    #[test]
    fn test_pending_measurements_load_on_last_report() {
        let host = MockHost {
            pending: true,
            ..MockHost::default()
        };
        let (mut carousel, mut rx) = build(30, config(LayoutMode::Row), host);
        assert!(!carousel.are_items_loaded());
        let now = Instant::now();
        carousel.advance(now);
        assert_eq!(carousel.selected_index(), 0);

        for slot in 0..11 {
            carousel.report_measured(1, slot, Measurement::Fixed(ITEM));
        }
        assert!(drain(&mut rx).is_empty());
        carousel.report_measured(1, 11, Measurement::Fixed(Size::new(30.0, 10.0)));
        assert_eq!(drain(&mut rx), vec![CarouselEvent::ItemsLoaded { generation: 1 }]);
        // The widest item defines the pitch
        assert_eq!(carousel.layout().pitch(), 30.0);
    }

    #[test]
    fn test_only_awaited_slots_count_toward_load() {
        let mut host = MockHost {
            pending: true,
            ..MockHost::default()
        };
        host.indefinite.insert(3);
        let (mut carousel, mut rx) = build(30, config(LayoutMode::Row), host);

        // Repeats, slots that never went pending and slots outside the window are ignored
        for _ in 0..12 {
            carousel.report_measured(1, 0, Measurement::Fixed(ITEM));
        }
        carousel.report_measured(1, 3, Measurement::Fixed(ITEM));
        carousel.report_measured(1, 40, Measurement::Fixed(ITEM));
        assert!(drain(&mut rx).is_empty());
        assert!(!carousel.are_items_loaded());

        for slot in (1..12).filter(|slot| *slot != 3) {
            carousel.report_measured(1, slot, Measurement::Fixed(ITEM));
        }
        assert_eq!(drain(&mut rx), vec![CarouselEvent::ItemsLoaded { generation: 1 }]);
        assert!(carousel.host().placed.contains_key(&5));
        assert!(!carousel.host().placed.contains_key(&3));
    }

    #[test]
    fn test_missing_measurement_fails_at_timeout() {
        let host = MockHost {
            pending: true,
            ..MockHost::default()
        };
        let start = Instant::now();
        let mut carousel = Carousel::new(config(LayoutMode::Row), host, CONTAINER);
        let mut rx = carousel.subscribe();
        carousel.set_items((0..30).collect(), start);
        for slot in 1..12 {
            carousel.report_measured(1, slot, Measurement::Fixed(ITEM));
        }

        carousel.poll_timers(start + Duration::from_millis(4999));
        assert!(drain(&mut rx).is_empty());
        carousel.poll_timers(start + Duration::from_millis(5000));
        assert_eq!(drain(&mut rx), vec![CarouselEvent::ItemsLoadFailed { generation: 1 }]);
        assert!(!carousel.are_items_loaded());
        assert!(carousel.window().is_none());

        // Late reports are ignored and navigation stays inert
        carousel.report_measured(1, 0, Measurement::Fixed(ITEM));
        carousel.advance(start);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_rebuild_supersedes_pending_build() {
        let host = MockHost {
            pending: true,
            ..MockHost::default()
        };
        let (mut carousel, mut rx) = build(30, config(LayoutMode::Row), host);
        let now = Instant::now();
        let first_generation = 1;
        let second = carousel
            .update(
                CarouselPatch {
                    density: Some(24),
                    ..CarouselPatch::default()
                },
                now,
            )
            .expect("rebuild started");
        assert_eq!(second.generation(), 2);
        assert_eq!(carousel.window().unwrap().density(), 24);

        carousel.report_measured(first_generation, 0, Measurement::Fixed(ITEM));
        for slot in 0..24 {
            carousel.report_measured(2, slot, Measurement::Fixed(ITEM));
        }
        assert_eq!(drain(&mut rx), vec![CarouselEvent::ItemsLoaded { generation: 2 }]);
        assert_eq!(second.outcome(), Some(LoadOutcome::Loaded));
    }

    #[test]
    fn test_materialize_failure_cancels_build() {
        let host = MockHost {
            fail_on: Some(3),
            ..MockHost::default()
        };
        let (carousel, mut rx) = build(30, config(LayoutMode::Row), host);
        assert_eq!(drain(&mut rx), vec![CarouselEvent::ItemsLoadFailed { generation: 1 }]);
        assert!(!carousel.are_items_loaded());
        assert!(carousel.window().is_none());
    }

    #[test]
    fn test_indefinite_slot_is_not_positioned() {
        let mut host = MockHost::default();
        host.indefinite.insert(2);
        let (carousel, mut rx) = build(30, config(LayoutMode::Row), host);
        assert_eq!(drain(&mut rx), vec![CarouselEvent::ItemsLoaded { generation: 1 }]);
        assert!(!carousel.host().placed.contains_key(&2));
        assert!(carousel.host().placed.contains_key(&3));
    }

    #[test]
    fn test_depth_refresh_waits_for_half_navigation() {
        let mut config = config(LayoutMode::Row);
        config.z_index_update_waits_for_animation = true;
        let (mut carousel, _rx) = build(30, config, MockHost::default());
        let start = Instant::now();
        carousel.host_mut().z_calls = 0;

        carousel.advance(start);
        // Only the recycled slot moved below its neighbour
        assert_eq!(carousel.host().z_calls, 1);
        carousel.poll_timers(start + Duration::from_millis(249));
        assert_eq!(carousel.host().z_calls, 1);
        carousel.poll_timers(start + Duration::from_millis(250));
        assert_eq!(carousel.host().z_calls, 13);
        assert_depth_settled(&carousel);
    }

    #[test]
    fn test_second_step_refreshes_depth_immediately() {
        let mut config = config(LayoutMode::Row);
        config.z_index_update_waits_for_animation = true;
        let (mut carousel, _rx) = build(30, config, MockHost::default());
        let start = Instant::now();
        carousel.advance(start);
        carousel.advance(start + Duration::from_millis(100));
        assert_depth_settled(&carousel);
        assert_eq!(
            carousel.next_deadline(),
            Some(start + Duration::from_millis(350))
        );
    }

    #[test]
    fn test_effects_update_keeps_window() {
        let mut carousel = loaded(30, LayoutMode::Row);
        let now = Instant::now();
        let clears = carousel.host().clears;
        let pending = carousel.update(
            CarouselPatch {
                selected_item_scale: Some(3.0),
                fliptych_degrees: Some(40.0),
                ..CarouselPatch::default()
            },
            now,
        );
        assert!(pending.is_none());
        assert_eq!(carousel.host().clears, clears);
        let (visual, transition) = carousel.host().placed[&carousel.selected_slot().unwrap()];
        assert_eq!(visual.scale, 3.0);
        assert_eq!(transition, Transition::Immediate);
        assert_eq!(carousel.host().hit_area, Some(Size::new(400.0, 30.0)));

        // Items after the selection tilt one way, items before it the other
        let window = carousel.window().unwrap();
        let (ahead, _) = carousel.host().placed[&window.slot_at(7)];
        let (behind, _) = carousel.host().placed[&window.slot_at(5)];
        assert_eq!(ahead.tilt, -40.0);
        assert_eq!(behind.tilt, 40.0);
        assert_eq!(ahead.tilt_axis, Axis::Y);
    }

    #[test]
    fn test_column_tilts_around_x_axis() {
        let mut carousel = loaded(30, LayoutMode::Column);
        carousel.update(
            CarouselPatch {
                selected_item_scale: Some(3.0),
                additional_items_to_scale: Some(2),
                fliptych_degrees: Some(40.0),
                ..CarouselPatch::default()
            },
            Instant::now(),
        );

        // One pitch away with a two-item threshold is halfway through the falloff
        let window = carousel.window().unwrap();
        let (ahead, _) = carousel.host().placed[&window.slot_at(7)];
        let (behind, _) = carousel.host().placed[&window.slot_at(5)];
        assert_eq!(ahead.tilt, 20.0);
        assert_eq!(behind.tilt, -20.0);
        assert_eq!(ahead.tilt_axis, Axis::X);
        assert_eq!(behind.tilt_axis, Axis::X);
        assert_eq!(ahead.scale, 2.0);
        assert_eq!(behind.scale, 2.0);
    }

    #[test]
    fn test_wheel_tilt_is_flipped_and_angular() {
        let mut config = config(LayoutMode::Wheel);
        config.selected_item_scale = 3.0;
        config.additional_items_to_scale = 2;
        config.fliptych_degrees = 40.0;
        let (mut carousel, _rx) = build(30, config, MockHost::default());

        let assert_neighbours = |carousel: &Carousel<usize, MockHost>| {
            let window = carousel.window().unwrap();
            let (ahead, _) = carousel.visual(window.slot_at(7)).unwrap();
            let (behind, _) = carousel.visual(window.slot_at(5)).unwrap();
            let (selected, _) = carousel.visual(window.selected_slot()).unwrap();
            // 30 degrees from the selection over a 60 degree threshold
            assert!((ahead.tilt + 20.0).abs() < 1e-9, "ahead tilt {}", ahead.tilt);
            assert!((behind.tilt - 20.0).abs() < 1e-9, "behind tilt {}", behind.tilt);
            assert_eq!(ahead.tilt_axis, Axis::X);
            assert!((ahead.scale - 2.0).abs() < 1e-9);
            assert!((behind.scale - 2.0).abs() < 1e-9);
            assert_eq!(selected.tilt, 0.0);
            assert_eq!(selected.scale, 3.0);
        };

        assert_neighbours(&carousel);
        let window = carousel.window().unwrap();
        assert_eq!(
            carousel.host().placed[&window.slot_at(7)].0,
            carousel.visual(window.slot_at(7)).unwrap().0
        );

        // The falloff follows the wheel as it turns
        carousel.advance(Instant::now());
        assert_eq!(carousel.wheel_angle(), 30.0);
        assert_neighbours(&carousel);
    }

    #[test]
    fn test_rebuild_update_and_selection_together() {
        let mut carousel = loaded(30, LayoutMode::Row);
        let now = Instant::now();
        let pending = carousel.update(
            CarouselPatch {
                layout_mode: Some(LayoutMode::Wheel),
                selected_index: Some(12),
                ..CarouselPatch::default()
            },
            now,
        );
        assert!(pending.is_some());
        assert_eq!(carousel.selected_index(), 12);
        assert_window_consistent(&carousel);
    }

    #[test]
    fn test_rebuild_update_wraps_selected_index() {
        let mut carousel = loaded(30, LayoutMode::Row);
        let pending = carousel.update(
            CarouselPatch {
                density: Some(24),
                selected_index: Some(33),
                ..CarouselPatch::default()
            },
            Instant::now(),
        );
        assert!(pending.is_some());
        assert_eq!(carousel.selected_index(), 3);
        assert_eq!(carousel.window().unwrap().density(), 24);
        assert_window_consistent(&carousel);
    }

    #[test]
    fn test_warp_pushes_selection_off_axis() {
        let mut config = config(LayoutMode::Row);
        config.warp_intensity = 100;
        let (carousel, _rx) = build(30, config, MockHost::default());
        let (visual, _) = carousel.host().placed[&carousel.selected_slot().unwrap()];
        assert!((visual.offset.y - 20.0).abs() < 1e-9);
        assert_eq!(visual.offset.x, 0.0);
    }

    #[test]
    fn test_selected_brush_recolors_by_distance() {
        let white = Rgba::rgb(255, 255, 255);
        let black = Rgba::rgb(0, 0, 0);
        let mut config = config(LayoutMode::Row);
        config.selected_item_foreground = Some(Brush::Solid(white));
        let host = MockHost {
            targets: vec![Brush::Solid(black)],
            ..MockHost::default()
        };
        let (mut carousel, _rx) = build(30, config, host);
        let window = carousel.window().unwrap();
        let selected = window.selected_slot();
        let far = window.slot_at(9);
        assert_eq!(carousel.host().recolored[&(selected, 0)], Brush::Solid(white));
        assert_eq!(carousel.host().recolored[&(far, 0)], Brush::Solid(black));

        carousel.update(
            CarouselPatch {
                selected_item_foreground: Some(None),
                ..CarouselPatch::default()
            },
            Instant::now(),
        );
        assert_eq!(carousel.host().recolored[&(selected, 0)], Brush::Solid(black));
    }

    #[test]
    fn test_trigger_selection_animation() {
        let mut carousel = loaded(30, LayoutMode::Row);
        carousel.advance(Instant::now());
        carousel.trigger_selection_animation();
        let selected = carousel.selected_slot().unwrap();
        assert_eq!(carousel.host().animated, vec![selected]);
    }

    #[test]
    fn test_shrinking_collection_resets_selection() {
        let mut carousel = loaded(30, LayoutMode::Row);
        let now = Instant::now();
        carousel.set_selected_index(20, now);
        carousel.set_items((0..5).collect(), now);
        assert_eq!(carousel.selected_index(), 0);
        assert_window_consistent(&carousel);
    }

    #[test]
    fn test_small_collection_repeats_items() {
        let carousel = loaded(3, LayoutMode::Row);
        assert_window_consistent(&carousel);
        let items = carousel.window().unwrap().items_by_position();
        assert_eq!(&items[..6], &[0, 1, 2, 0, 1, 2]);
    }
}
