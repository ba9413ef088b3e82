//! Circular ammo-slot allocator
//!
//! A fixed ring of slots, each holding a bullet type and a busy flag. Slots are
//! granted round-robin starting just after the last grant, so every slot gets
//! its turn and the grant order is deterministic.
//!
//! Every grant and every type replacement bumps the slot's generation. Flying
//! projectiles release through the `SlotClaim` they were granted; a claim whose
//! generation is stale (slot was replaced and possibly re-granted since) is a
//! no-op, so an old bullet can never free a slot that now belongs to a new one.
//!
//! Out-of-range indices are ignored and logged at debug level.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::descriptor::{BulletDescriptor, DescriptorError};

/// Allocator construction errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AmmoError {
    /// Capacity must be at least one slot
    #[error("ammo capacity must be at least 1, got {capacity}")]
    InvalidCapacity {
        /// Requested capacity
        capacity: usize,
    },
    /// Default bullet type failed validation
    #[error("invalid default bullet: {0}")]
    InvalidBullet(#[from] DescriptorError),
    /// Restored cursor points outside the ring
    #[error("ammo cursor {cursor} is outside a ring of {capacity}")]
    InvalidCursor { cursor: usize, capacity: usize },
}

/// Result type for allocator construction.
pub type AmmoResult<T> = Result<T, AmmoError>;

/// Proof of a granted slot, held by the projectile until it returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotClaim {
    pub index: usize,
    pub generation: u32,
}

/// A successful grant: the bullet type snapshot and the claim to release later
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    pub bullet: BulletDescriptor,
    pub claim: SlotClaim,
}

/// What happened to a claim-based release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// Slot was busy under this claim and is now free
    Freed,
    /// Claim no longer matches the slot (replaced or already released)
    Stale,
    /// Index outside the ring
    OutOfRange,
}

/// One addressable unit of ammo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmmoSlot {
    bullet: BulletDescriptor,
    in_use: bool,
    generation: u32,
}

impl AmmoSlot {
    pub fn bullet(&self) -> &BulletDescriptor {
        &self.bullet
    }

    pub fn in_use(&self) -> bool {
        self.in_use
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// Fixed-capacity ring of ammo slots
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawAllocator")]
pub struct AmmoAllocator {
    slots: Vec<AmmoSlot>,
    /// Next index to probe, always in [0, capacity)
    cursor: usize,
}

/// Unchecked serialized form of `AmmoAllocator`
#[derive(Deserialize)]
struct RawAllocator {
    slots: Vec<AmmoSlot>,
    cursor: usize,
}

impl TryFrom<RawAllocator> for AmmoAllocator {
    type Error = AmmoError;

    fn try_from(raw: RawAllocator) -> AmmoResult<Self> {
        let capacity = raw.slots.len();
        if capacity == 0 {
            return Err(AmmoError::InvalidCapacity { capacity });
        }
        if raw.cursor >= capacity {
            return Err(AmmoError::InvalidCursor {
                cursor: raw.cursor,
                capacity,
            });
        }
        for slot in &raw.slots {
            slot.bullet.validate()?;
        }
        Ok(Self {
            slots: raw.slots,
            cursor: raw.cursor,
        })
    }
}

impl AmmoAllocator {
    /// Build `capacity` free slots, all holding `default_bullet`
    pub fn new(capacity: usize, default_bullet: BulletDescriptor) -> AmmoResult<Self> {
        if capacity == 0 {
            return Err(AmmoError::InvalidCapacity { capacity });
        }
        default_bullet.validate()?;

        let slots = (0..capacity)
            .map(|_| AmmoSlot {
                bullet: default_bullet.clone(),
                in_use: false,
                generation: 0,
            })
            .collect();

        Ok(Self { slots, cursor: 0 })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Index the next allocation starts probing from
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn slot(&self, index: usize) -> Option<&AmmoSlot> {
        self.slots.get(index)
    }

    /// True if any slot is free
    pub fn has_free(&self) -> bool {
        self.slots.iter().any(|s| !s.in_use)
    }

    pub fn free_count(&self) -> usize {
        self.slots.iter().filter(|s| !s.in_use).count()
    }

    pub fn in_use_count(&self) -> usize {
        self.capacity() - self.free_count()
    }

    /// Grant the first free slot at or after the cursor, wrapping.
    ///
    /// Returns `None` when every slot is busy; nothing is mutated in that case.
    pub fn allocate_next(&mut self) -> Option<Allocation> {
        let capacity = self.capacity();

        for offset in 0..capacity {
            let index = (self.cursor + offset) % capacity;
            let slot = &mut self.slots[index];
            if slot.in_use {
                continue;
            }

            slot.in_use = true;
            slot.generation = slot.generation.wrapping_add(1);
            self.cursor = (index + 1) % capacity;

            return Some(Allocation {
                bullet: slot.bullet.clone(),
                claim: SlotClaim {
                    index,
                    generation: slot.generation,
                },
            });
        }

        None
    }

    /// Mark a slot free regardless of who holds it.
    ///
    /// Returns false (and changes nothing) for an out-of-range index.
    pub fn release(&mut self, index: usize) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) => {
                slot.in_use = false;
                true
            }
            None => {
                log::debug!("release ignored: slot {index} out of range");
                false
            }
        }
    }

    /// Free a slot only if `claim` is still the slot's live grant
    pub fn release_claim(&mut self, claim: SlotClaim) -> ReleaseOutcome {
        let Some(slot) = self.slots.get_mut(claim.index) else {
            log::debug!("release ignored: slot {} out of range", claim.index);
            return ReleaseOutcome::OutOfRange;
        };

        if slot.in_use && slot.generation == claim.generation {
            slot.in_use = false;
            ReleaseOutcome::Freed
        } else {
            log::debug!(
                "stale release of slot {} (claim gen {}, slot gen {})",
                claim.index,
                claim.generation,
                slot.generation
            );
            ReleaseOutcome::Stale
        }
    }

    /// Swap a slot's bullet type and force it free.
    ///
    /// Any projectile still holding a claim on the slot keeps flying with its
    /// own descriptor copy; its eventual release becomes stale.
    pub fn replace(&mut self, index: usize, bullet: BulletDescriptor) -> bool {
        let Some(slot) = self.slots.get_mut(index) else {
            log::debug!("replace ignored: slot {index} out of range");
            return false;
        };

        if slot.in_use {
            log::debug!("slot {index} replaced while in flight");
        }
        slot.bullet = bullet;
        slot.in_use = false;
        slot.generation = slot.generation.wrapping_add(1);
        true
    }

    /// One flag per slot in slot order, true = free
    pub fn availability(&self) -> Vec<bool> {
        self.slots.iter().map(|s| !s.in_use).collect()
    }

    /// False for busy slots and out-of-range indices
    pub fn is_available(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(|s| !s.in_use)
    }

    /// Bullet type of every slot, in slot order
    pub fn bullet_types(&self) -> Vec<&BulletDescriptor> {
        self.slots.iter().map(|s| &s.bullet).collect()
    }
}
