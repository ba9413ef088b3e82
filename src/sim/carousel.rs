//! Selected-slot carousel
//!
//! Tracks which slot is "up next" on the HUD and the order slots are listed in.
//! The carousel turns by one on every successful shot; firing is refused while
//! the selected slot is still out.

use serde::{Deserialize, Serialize};

use super::ammo::AmmoAllocator;

/// How prominently a slot is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotEmphasis {
    Current,
    Next,
    Reserve,
}

/// One entry of the HUD listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotView {
    pub index: usize,
    pub bullet: String,
    pub available: bool,
    pub emphasis: SlotEmphasis,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlotCarousel {
    current: usize,
}

impl SlotCarousel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently selected slot index
    pub fn current(&self) -> usize {
        self.current
    }

    /// Turn to the next slot, wrapping at `capacity`
    pub fn advance(&mut self, capacity: usize) {
        if capacity == 0 {
            return;
        }
        self.current = (self.current + 1) % capacity;
    }

    /// Listing for the HUD: current, next, then the rest highest index first
    pub fn view(&self, ammo: &AmmoAllocator, reserve_len: usize) -> Vec<SlotView> {
        let capacity = ammo.capacity();
        let current = self.current % capacity;
        let next = (current + 1) % capacity;

        let entry = |index: usize, emphasis: SlotEmphasis| SlotView {
            index,
            bullet: ammo
                .slot(index)
                .map(|s| s.bullet().name.clone())
                .unwrap_or_default(),
            available: ammo.is_available(index),
            emphasis,
        };

        let mut listing = vec![entry(current, SlotEmphasis::Current)];
        if next != current {
            listing.push(entry(next, SlotEmphasis::Next));
        }

        listing.extend(
            (0..capacity)
                .rev()
                .filter(|&i| i != current && i != next)
                .take(reserve_len)
                .map(|i| entry(i, SlotEmphasis::Reserve)),
        );

        listing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::BulletDescriptor;

    fn ammo(capacity: usize) -> AmmoAllocator {
        AmmoAllocator::new(capacity, BulletDescriptor::default()).unwrap()
    }

    #[test]
    fn test_advance_wraps() {
        let mut carousel = SlotCarousel::new();
        carousel.advance(3);
        carousel.advance(3);
        assert_eq!(carousel.current(), 2);
        carousel.advance(3);
        assert_eq!(carousel.current(), 0);
    }

    #[test]
    fn test_view_order() {
        let mut ammo = ammo(6);
        let mut carousel = SlotCarousel::new();
        carousel.advance(6); // current = 1
        ammo.allocate_next(); // slot 0 busy

        let view = carousel.view(&ammo, 5);
        let order: Vec<usize> = view.iter().map(|v| v.index).collect();
        assert_eq!(order, vec![1, 2, 5, 4, 3, 0]);
        assert_eq!(view[0].emphasis, SlotEmphasis::Current);
        assert_eq!(view[1].emphasis, SlotEmphasis::Next);
        assert!(view[2..].iter().all(|v| v.emphasis == SlotEmphasis::Reserve));
        assert!(!view[5].available);
        assert!(view[0].available);
        assert_eq!(view[0].bullet, "Standard");
    }

    #[test]
    fn test_view_caps_reserve() {
        let ammo = ammo(10);
        let view = SlotCarousel::new().view(&ammo, 5);
        assert_eq!(view.len(), 7);
        assert_eq!(view[2].index, 9);
    }

    #[test]
    fn test_single_slot_view() {
        let ammo = ammo(1);
        let view = SlotCarousel::new().view(&ammo, 5);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].emphasis, SlotEmphasis::Current);
    }
}
