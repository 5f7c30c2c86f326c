//! Quantizes a continuous input value into discrete steps.
//!
//! The tracker is updated from input callbacks and read from timer callbacks, so its cells are
//! atomics. Only atomicity matters here; every access uses `Relaxed`.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// An `f64` stored as its bit pattern.
#[derive(Debug, Default)]
struct AtomicF64(AtomicU64);

impl AtomicF64 {
    fn new(value: f64) -> Self {
        Self(AtomicU64::new(value.to_bits()))
    }

    fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    fn store(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Result of feeding one value to the tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollUpdate {
    /// Change since the previous value
    pub delta: f64,
    /// Net thresholds crossed: positive when the value grew past `tick + threshold`
    pub steps: i64,
}

impl ScrollUpdate {
    const IDLE: ScrollUpdate = ScrollUpdate {
        delta: 0.0,
        steps: 0,
    };
}

#[derive(Debug)]
pub struct ScrollTracker {
    tick: AtomicF64,
    bias: AtomicF64,
    last_value: AtomicF64,
    threshold: AtomicF64,
    reverse: AtomicBool,
    session_start: AtomicBool,
}

impl Default for ScrollTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollTracker {
    pub fn new() -> Self {
        Self {
            tick: AtomicF64::new(0.0),
            bias: AtomicF64::new(0.0),
            last_value: AtomicF64::new(0.0),
            threshold: AtomicF64::new(0.0),
            reverse: AtomicBool::new(false),
            session_start: AtomicBool::new(true),
        }
    }

    /// Open a session at `origin` (0 for linear input, the current wheel angle for the wheel)
    pub fn begin_session(&self, origin: f64, threshold: f64) {
        self.tick.store(origin);
        self.last_value.store(origin);
        self.bias.store(0.0);
        self.threshold.store(threshold);
        self.reverse.store(false, Ordering::Relaxed);
        self.session_start.store(true, Ordering::Relaxed);
    }

    /// Back to zero after a snap
    pub fn reset(&self) {
        let threshold = self.threshold.load();
        self.begin_session(0.0, threshold);
    }

    /// Value at which the last step fired
    pub fn tick(&self) -> f64 {
        self.tick.load()
    }

    pub fn threshold(&self) -> f64 {
        self.threshold.load()
    }

    pub fn update(&self, value: f64) -> ScrollUpdate {
        let threshold = self.threshold.load();
        if !value.is_finite() || threshold.is_nan() || threshold <= 0.0 {
            return ScrollUpdate::IDLE;
        }

        let delta = value - self.last_value.load();
        self.last_value.store(value);

        if self.session_start.swap(false, Ordering::Relaxed) {
            // First crossing happens at half a threshold in the direction of travel
            self.reverse.store(delta < 0.0, Ordering::Relaxed);
            if delta > 0.0 {
                self.bias.store(self.bias.load() - threshold / 2.0);
            } else if delta < 0.0 {
                self.bias.store(self.bias.load() + threshold / 2.0);
            }
        } else {
            let reverse = self.reverse.load(Ordering::Relaxed);
            if (reverse && delta > 0.0) || (!reverse && delta < 0.0) {
                self.reverse.store(!reverse, Ordering::Relaxed);
                let bias = self.bias.load();
                self.bias.store(if reverse { bias - threshold } else { bias + threshold });
            }
        }

        let bias = self.bias.load();
        let mut tick = self.tick.load();
        let mut steps = 0i64;
        while value > tick + threshold + bias {
            tick += threshold;
            steps += 1;
        }
        while value < tick - threshold + bias {
            tick -= threshold;
            steps -= 1;
        }
        self.tick.store(tick);

        ScrollUpdate { delta, steps }
    }
}
