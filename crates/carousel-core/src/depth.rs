//! Depth layering of the window and the timing of its refresh.

use std::time::{Duration, Instant};

/// Z-index of the selected slot; every other slot sits `|distance|` below it.
pub const SELECTED_Z: i32 = 10_000;

/// Z-index per physical slot for a window whose selection is displayed at carousel index
/// `display_selected`.
pub fn z_indices(density: usize, display_selected: usize) -> Vec<i32> {
    let half = (density / 2) as i64;
    let mut z = vec![0; density];
    for distance in -half..half {
        let carousel = display_selected as i64 + distance;
        let slot = crate::ring::modulus(density as i64 - 1 - carousel, density);
        z[slot] = SELECTED_Z - distance.unsigned_abs() as i32;
    }
    z
}

/// Debounced depth refresh.
///
/// Waiting for the midpoint of a navigation animation is optional. While a deferred refresh is
/// pending, another request refreshes right away and pushes the deadline out.
#[derive(Debug, Default)]
pub struct DeferredRefresh {
    deadline: Option<Instant>,
}

impl DeferredRefresh {
    /// Returns true when the caller should refresh now.
    pub fn request(&mut self, now: Instant, delay: Option<Duration>) -> bool {
        match delay {
            None => true,
            Some(delay) => self.deadline.replace(now + delay).is_some(),
        }
    }

    /// Returns true once when the pending deadline has passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}
