//! Looping bullet trajectory
//!
//! Each projectile runs three phases exactly once, in order:
//!
//! ```text
//!   TravelForward ──(traveled >= travel_distance)──> Orbiting
//!   Orbiting ──(completed_loops >= loop_count)──> Returning
//!   Returning ──(distance to return target < epsilon)──> Arrived
//! ```
//!
//! With `loop_count == 0` the orbit is skipped entirely.
//!
//! The orbit plane is XZ around the orbit center, lifted by the descriptor's
//! vertical offset. The radius eases toward a per-loop target so entering the
//! orbit does not snap the bullet.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ammo::SlotClaim;
use super::descriptor::BulletDescriptor;
use crate::consts::{ARRIVAL_EPSILON, ORBIT_RADIUS_SMOOTHING};
use crate::{clamp01, lerp, move_towards, planar_heading, planar_offset};

/// Reasons a projectile cannot advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MotionError {
    /// The orbit center (owner) is gone
    #[error("orbit center is missing")]
    MissingOrbitCenter,
    /// The return target is gone
    #[error("return target is missing")]
    MissingReturnTarget,
    /// Stepped after arriving or aborting
    #[error("projectile already finished")]
    Spent,
}

/// Motion tuning rejected at session setup.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum TuningError {
    #[error("radius_smoothing must be finite and non-negative, got {0}")]
    RadiusSmoothing(f32),
    /// Zero would let a bullet sit on its return target forever
    #[error("arrival_epsilon must be finite and positive, got {0}")]
    ArrivalEpsilon(f32),
}

/// Trajectory phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionPhase {
    TravelForward,
    Orbiting,
    Returning,
}

/// Result of one successful step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Still flying
    InFlight,
    /// Reached the return target this step; the claim must now be released
    Arrived,
}

/// Reference points sampled from the host each tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Anchors {
    /// Point the bullet orbits around (usually the player)
    pub orbit_center: Option<Vec3>,
    /// Point the bullet flies home to (usually the ammo holster)
    pub return_target: Option<Vec3>,
}

impl Anchors {
    /// Both anchors pinned to one point
    pub fn at(point: Vec3) -> Self {
        Self {
            orbit_center: Some(point),
            return_target: Some(point),
        }
    }
}

/// Numeric policy shared by every projectile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionTuning {
    /// Radius easing rate while orbiting (per second)
    pub radius_smoothing: f32,
    /// Catch distance for the return phase
    pub arrival_epsilon: f32,
}

impl Default for MotionTuning {
    fn default() -> Self {
        Self {
            radius_smoothing: ORBIT_RADIUS_SMOOTHING,
            arrival_epsilon: ARRIVAL_EPSILON,
        }
    }
}

impl MotionTuning {
    pub fn validate(&self) -> Result<(), TuningError> {
        if !(self.radius_smoothing.is_finite() && self.radius_smoothing >= 0.0) {
            return Err(TuningError::RadiusSmoothing(self.radius_smoothing));
        }
        if !(self.arrival_epsilon.is_finite() && self.arrival_epsilon > 0.0) {
            return Err(TuningError::ArrivalEpsilon(self.arrival_epsilon));
        }
        Ok(())
    }
}

/// Runtime state of one flying bullet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileMotion {
    bullet: BulletDescriptor,
    claim: SlotClaim,
    tuning: MotionTuning,
    phase: MotionPhase,
    position: Vec3,
    direction: Vec3,
    traveled: f32,
    /// Orbit angle in degrees; wraps by 360 on each completed loop
    angle: f32,
    radius: f32,
    completed_loops: u32,
    spent: bool,
}

impl ProjectileMotion {
    /// Launch from `origin` along `direction` (normalized here; zero falls back to +Z)
    pub fn new(
        bullet: BulletDescriptor,
        claim: SlotClaim,
        origin: Vec3,
        direction: Vec3,
        tuning: MotionTuning,
    ) -> Self {
        let direction = if direction.length_squared() < 1e-8 {
            Vec3::Z
        } else {
            direction.normalize()
        };

        Self {
            bullet,
            claim,
            tuning,
            phase: MotionPhase::TravelForward,
            position: origin,
            direction,
            traveled: 0.0,
            angle: 0.0,
            radius: 0.0,
            completed_loops: 0,
            spent: false,
        }
    }

    pub fn phase(&self) -> MotionPhase {
        self.phase
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn traveled(&self) -> f32 {
        self.traveled
    }

    pub fn angle_degrees(&self) -> f32 {
        self.angle
    }

    pub fn current_radius(&self) -> f32 {
        self.radius
    }

    pub fn completed_loops(&self) -> u32 {
        self.completed_loops
    }

    /// Damage carried to whoever resolves a hit
    pub fn damage(&self) -> u32 {
        self.bullet.damage
    }

    pub fn bullet(&self) -> &BulletDescriptor {
        &self.bullet
    }

    pub fn claim(&self) -> SlotClaim {
        self.claim
    }

    /// True once the bullet arrived or was aborted
    pub fn is_spent(&self) -> bool {
        self.spent
    }

    /// Stop this projectile for good; later steps fail with `Spent`
    pub fn abort(&mut self) {
        self.spent = true;
    }

    /// Advance by `dt` seconds.
    ///
    /// Both anchors must be present on every step. A missing anchor aborts the
    /// projectile (it never computes against a stale point) and the caller is
    /// expected to release its claim.
    pub fn step(&mut self, anchors: &Anchors, dt: f32) -> Result<StepOutcome, MotionError> {
        if self.spent {
            return Err(MotionError::Spent);
        }

        let (center, home) = match (anchors.orbit_center, anchors.return_target) {
            (Some(center), Some(home)) => (center, home),
            (None, _) => {
                self.spent = true;
                return Err(MotionError::MissingOrbitCenter);
            }
            (_, None) => {
                self.spent = true;
                return Err(MotionError::MissingReturnTarget);
            }
        };

        match self.phase {
            MotionPhase::TravelForward => self.travel(center, dt),
            MotionPhase::Orbiting => self.orbit(center, dt),
            MotionPhase::Returning => {
                if self.return_home(home, dt) {
                    self.spent = true;
                    return Ok(StepOutcome::Arrived);
                }
            }
        }

        Ok(StepOutcome::InFlight)
    }

    fn travel(&mut self, center: Vec3, dt: f32) {
        let distance = self.bullet.speed * dt;
        self.position += self.direction * distance;
        self.traveled += distance;

        if self.traveled < self.bullet.travel_distance {
            return;
        }

        if self.bullet.loop_count == 0 {
            self.phase = MotionPhase::Returning;
            return;
        }

        // Enter the orbit from wherever we ended up, no snapping
        let to_bullet = self.position - center;
        self.radius = to_bullet.length();
        self.angle = planar_heading(to_bullet);
        self.phase = MotionPhase::Orbiting;
    }

    fn orbit(&mut self, center: Vec3, dt: f32) {
        self.angle += self.bullet.orbit_speed * dt;

        let progress = clamp01(self.completed_loops as f32 / self.bullet.loop_count as f32);
        let target_radius = lerp(self.bullet.start_radius, self.bullet.end_radius, progress);
        self.radius = lerp(
            self.radius,
            target_radius,
            clamp01(dt * self.tuning.radius_smoothing),
        );

        self.position = center
            + planar_offset(self.angle, self.radius)
            + Vec3::Y * self.bullet.vertical_offset;

        // A long step can cover several turns
        while self.angle >= 360.0 {
            self.angle -= 360.0;
            self.completed_loops += 1;

            if self.completed_loops >= self.bullet.loop_count {
                self.phase = MotionPhase::Returning;
                break;
            }
        }
    }

    /// Returns true once within the arrival epsilon
    fn return_home(&mut self, home: Vec3, dt: f32) -> bool {
        self.position = move_towards(self.position, home, self.bullet.return_speed * dt);
        self.position.distance(home) < self.tuning.arrival_epsilon
    }
}
