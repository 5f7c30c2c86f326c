//! The slot window: which item each of the `D` physical slots currently shows.
//!
//! Window position `i` (0 at the trailing edge, `D/2` at the selection) maps to the physical
//! slot `D - 1 - ((insert + i) mod D)`. Slots are filled in reverse so that depth ordering can
//! walk them with a single modulus. Each step recycles exactly one slot and moves the insert
//! position one place around the ring.

use crate::color::Brush;
use crate::geometry::Vec2;
use crate::ring::{self, Direction};

/// One physical container.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    /// Item index currently bound to this slot
    pub item: usize,
    /// Window position the slot was built at. Wheel slots never move, so this stays their
    /// place on the ring.
    pub home: usize,
    /// Current placement relative to the container center
    pub offset: Vec2,
    /// Recolorable targets as first reported by the host, before any blending
    pub targets: Vec<Brush>,
}

/// A recycle performed by a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recycle {
    pub slot: usize,
    pub item: usize,
    pub direction: Direction,
}

#[derive(Debug, Clone)]
pub struct SlotWindow {
    density: usize,
    item_count: usize,
    selected: usize,
    insert: usize,
    slots: Vec<Slot>,
}

impl SlotWindow {
    /// Build the window around `selected`. `item_count` must be non-zero.
    pub fn new(density: usize, item_count: usize, selected: usize) -> Self {
        let selected = ring::modulus(selected as i64, item_count);
        let start = ring::modulus(selected as i64 - (density / 2) as i64, item_count);
        let slots = (0..density)
            .map(|physical| {
                let position = density - 1 - physical;
                Slot {
                    item: (start + position) % item_count,
                    home: position,
                    offset: Vec2::ZERO,
                    targets: Vec::new(),
                }
            })
            .collect();

        Self {
            density,
            item_count,
            selected,
            insert: 0,
            slots,
        }
    }

    pub fn density(&self) -> usize {
        self.density
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Overwrite the selection without recycling; used by catch-up which recycles separately
    pub fn set_selected(&mut self, index: usize) {
        self.selected = ring::modulus(index as i64, self.item_count);
    }

    pub fn insert(&self) -> usize {
        self.insert
    }

    /// Item index shown at the trailing edge
    pub fn window_start(&self) -> usize {
        ring::modulus(self.selected as i64 - (self.density / 2) as i64, self.item_count)
    }

    /// Carousel index that displays the selection
    pub fn display_selected(&self) -> usize {
        (self.insert + self.density / 2) % self.density
    }

    /// Physical slot at window position `position`
    pub fn slot_at(&self, position: usize) -> usize {
        let carousel = (self.insert + position) % self.density;
        self.density - 1 - carousel
    }

    /// Window position of a physical slot, inverse of [`slot_at`](Self::slot_at)
    pub fn position_of(&self, slot: usize) -> usize {
        let carousel = self.density - 1 - slot;
        ring::forward_distance(self.insert, carousel, self.density)
    }

    /// Physical slot that displays the selection
    pub fn selected_slot(&self) -> usize {
        self.slot_at(self.density / 2)
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot(&self, slot: usize) -> Option<&Slot> {
        self.slots.get(slot)
    }

    pub fn slot_mut(&mut self, slot: usize) -> Option<&mut Slot> {
        self.slots.get_mut(slot)
    }

    /// Move every slot by the same amount
    pub fn translate_all(&mut self, delta: Vec2) {
        for slot in &mut self.slots {
            slot.offset += delta;
        }
    }

    /// Select the next item and recycle the trailing slot to the new leading item.
    pub fn advance(&mut self) -> Recycle {
        self.selected = ring::step(self.selected, Direction::Forward, self.item_count);
        let item = ring::modulus(
            self.selected as i64 + (self.density / 2) as i64 - 1,
            self.item_count,
        );
        self.recycle(Direction::Forward, item)
    }

    /// Select the previous item and recycle the leading slot to the new trailing item.
    pub fn retreat(&mut self) -> Recycle {
        self.selected = ring::step(self.selected, Direction::Backward, self.item_count);
        let item = ring::modulus(
            self.selected as i64 - (self.density / 2) as i64,
            self.item_count,
        );
        self.recycle(Direction::Backward, item)
    }

    /// Rotate the insert position one place and bind `item` to the slot that falls off the
    /// window. The selection is left alone.
    pub fn recycle(&mut self, direction: Direction, item: usize) -> Recycle {
        let carousel = match direction {
            Direction::Forward => {
                let recycled = self.insert;
                self.insert = ring::step(self.insert, Direction::Forward, self.density);
                recycled
            }
            Direction::Backward => {
                self.insert = ring::step(self.insert, Direction::Backward, self.density);
                self.insert
            }
        };
        let slot = self.density - 1 - carousel;
        self.slots[slot].item = item;
        Recycle {
            slot,
            item,
            direction,
        }
    }

    /// Item indices by window position, trailing edge first
    pub fn items_by_position(&self) -> Vec<usize> {
        (0..self.density)
            .map(|position| self.slots[self.slot_at(position)].item)
            .collect()
    }
}
