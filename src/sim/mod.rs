//! Deterministic simulation module
//!
//! All weapon logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Anchors and hits come in through `TickInput`, events go out as `GameEvent`
//! - Stable iteration order (by projectile ID)
//! - No rendering, physics or platform dependencies

pub mod ammo;
pub mod carousel;
pub mod descriptor;
pub mod motion;
pub mod state;
pub mod tick;

pub use ammo::{Allocation, AmmoAllocator, AmmoError, AmmoResult, AmmoSlot, ReleaseOutcome, SlotClaim};
pub use carousel::{SlotCarousel, SlotEmphasis, SlotView};
pub use descriptor::{BulletDescriptor, DescriptorError};
pub use motion::{
    Anchors, MotionError, MotionPhase, MotionTuning, ProjectileMotion, StepOutcome,
    TuningError,
};
pub use state::{FireCommand, FireRefusal, GameEvent, GameState, Projectile, ProjectileId};
pub use tick::{TickInput, UpgradeAction, tick};
