//! Session state and core simulation types
//!
//! `GameState` owns everything the weapon core mutates: the ammo ring, the HUD
//! carousel, and every live projectile by value. Projectiles are disposed by
//! removing them from `projectiles` at the end of a tick.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::ammo::{AmmoAllocator, ReleaseOutcome, SlotClaim};
use super::carousel::{SlotCarousel, SlotView};
use super::descriptor::BulletDescriptor;
use super::motion::{MotionError, MotionTuning, ProjectileMotion};
use crate::{Settings, SettingsError};

/// Stable id of a live projectile
pub type ProjectileId = u32;

/// Why a fire request did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FireRefusal {
    /// An upgrade session is open
    Upgrading,
    /// The selected slot's bullet has not come back yet
    SelectedSlotBusy,
    /// Every slot is out
    Empty,
}

/// Something the host should react to
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A projectile was launched from `slot`
    Fired { projectile: ProjectileId, slot: usize },
    /// A fire request was turned down; not an error
    FireRefused { reason: FireRefusal },
    /// A projectile touched something hostile. Carries the damage only
    Hit { damage: u32 },
    /// A slot became free because its bullet came home
    SlotReleased { slot: usize },
    /// A projectile lost an anchor and stopped
    ProjectileAborted {
        projectile: ProjectileId,
        error: MotionError,
    },
    /// The host can drop everything tied to this projectile
    DisposalRequested { projectile: ProjectileId },
    /// A slot's bullet type was swapped by an upgrade
    SlotUpgraded { slot: usize, bullet: String },
}

/// A live projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: ProjectileId,
    pub motion: ProjectileMotion,
}

/// Muzzle position and aim for one shot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireCommand {
    pub muzzle: Vec3,
    pub direction: Vec3,
}

/// Weapon session state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Ammo ring
    pub ammo: AmmoAllocator,
    /// HUD selection
    pub carousel: SlotCarousel,
    /// Live projectiles (sorted by id for determinism)
    pub projectiles: Vec<Projectile>,
    /// Shared motion policy
    pub tuning: MotionTuning,
    /// Open upgrade session; shooting is blocked while set
    pub upgrading: bool,
    /// Reserve entries shown in the HUD listing
    pub reserve_view_len: usize,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Next projectile id
    next_id: ProjectileId,
}

impl GameState {
    /// Fresh session: every slot free, holding `default_bullet`
    pub fn new(
        capacity: usize,
        default_bullet: BulletDescriptor,
        tuning: MotionTuning,
    ) -> Result<Self, SettingsError> {
        tuning.validate()?;
        Ok(Self {
            ammo: AmmoAllocator::new(capacity, default_bullet)?,
            carousel: SlotCarousel::new(),
            projectiles: Vec::new(),
            tuning,
            upgrading: false,
            reserve_view_len: crate::consts::RESERVE_VIEW_LEN,
            time_ticks: 0,
            next_id: 1,
        })
    }

    /// Session built from validated settings
    pub fn from_settings(settings: &Settings) -> Result<Self, SettingsError> {
        settings.validate()?;
        let mut state = Self::new(
            settings.ammo_capacity,
            settings.default_bullet.clone(),
            settings.tuning,
        )?;
        state.reserve_view_len = settings.reserve_view_len;
        Ok(state)
    }

    /// Allocate a new projectile ID
    fn next_projectile_id(&mut self) -> ProjectileId {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Whether a shot is allowed right now, and why not
    pub fn can_fire(&self) -> Result<(), FireRefusal> {
        if self.upgrading {
            return Err(FireRefusal::Upgrading);
        }
        if !self.ammo.is_available(self.carousel.current()) {
            return Err(FireRefusal::SelectedSlotBusy);
        }
        if !self.ammo.has_free() {
            return Err(FireRefusal::Empty);
        }
        Ok(())
    }

    /// Claim the next slot and launch a projectile.
    ///
    /// The slot is granted before the projectile exists, so the new motion
    /// never steps without a claim.
    pub fn try_fire(
        &mut self,
        command: FireCommand,
    ) -> Result<(ProjectileId, SlotClaim), FireRefusal> {
        self.can_fire()?;

        self.carousel.advance(self.ammo.capacity());
        let allocation = self.ammo.allocate_next().ok_or(FireRefusal::Empty)?;

        let id = self.next_projectile_id();
        let claim = allocation.claim;
        log::debug!(
            "projectile {id} launched from slot {} ({}, ~{:.1}s orbit)",
            allocation.claim.index,
            allocation.bullet.name,
            allocation.bullet.nominal_orbit_secs()
        );
        let motion = ProjectileMotion::new(
            allocation.bullet,
            claim,
            command.muzzle,
            command.direction,
            self.tuning,
        );
        self.projectiles.push(Projectile { id, motion });

        Ok((id, claim))
    }

    pub fn projectile(&self, id: ProjectileId) -> Option<&Projectile> {
        self.projectiles.iter().find(|p| p.id == id)
    }

    /// Release a finished projectile's slot; returns the slot index if it was freed
    pub(crate) fn release_projectile(&mut self, projectile: &Projectile) -> Option<usize> {
        let claim = projectile.motion.claim();
        match self.ammo.release_claim(claim) {
            ReleaseOutcome::Freed => Some(claim.index),
            ReleaseOutcome::Stale | ReleaseOutcome::OutOfRange => None,
        }
    }

    /// Open an upgrade session (blocks shooting)
    pub fn begin_upgrade(&mut self) {
        if !self.upgrading {
            log::info!("Upgrade session opened");
        }
        self.upgrading = true;
    }

    /// Swap the selected slot's bullet type; only inside an upgrade session
    pub fn apply_upgrade(&mut self, bullet: BulletDescriptor) -> Option<usize> {
        if !self.upgrading {
            log::debug!("upgrade '{}' ignored outside an upgrade session", bullet.name);
            return None;
        }
        if let Err(e) = bullet.validate() {
            log::warn!("upgrade rejected: {e}");
            return None;
        }

        let slot = self.carousel.current();
        let name = bullet.name.clone();
        if !self.ammo.replace(slot, bullet) {
            return None;
        }
        log::info!("Slot {} upgraded to {}", slot, name);
        Some(slot)
    }

    /// Close the upgrade session
    pub fn finish_upgrade(&mut self) {
        if self.upgrading {
            log::info!("Upgrade session closed");
        }
        self.upgrading = false;
    }

    /// HUD listing of the ammo ring
    pub fn slot_view(&self) -> Vec<SlotView> {
        self.carousel.view(&self.ammo, self.reserve_view_len)
    }
}
