//! Loop Shot - looping-bullet weapon core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (ammo slots, projectile motion, tick loop)
//! - `settings`: Data-driven bullet catalog and motion tuning
//! - `demo`: Seeded scripted session used by the native binary

pub mod demo;
pub mod settings;
pub mod sim;

pub use settings::{Settings, SettingsError};

use glam::Vec3;

/// Simulation configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one tick per rendered frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Default number of ammo slots
    pub const DEFAULT_AMMO_CAPACITY: usize = 6;

    /// How quickly an orbiting bullet eases toward its target radius (per second)
    pub const ORBIT_RADIUS_SMOOTHING: f32 = 5.0;
    /// Distance at which a returning bullet counts as caught
    pub const ARRIVAL_EPSILON: f32 = 0.1;

    /// Reserve slots shown behind the current/next pair
    pub const RESERVE_VIEW_LEN: usize = 5;
}

/// Linear interpolation between `a` and `b` (t is not clamped)
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Clamp to [0, 1], mapping NaN to 0
#[inline]
pub fn clamp01(t: f32) -> f32 {
    if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) }
}

/// Offset on the horizontal (XZ) plane for an angle in degrees and a radius
#[inline]
pub fn planar_offset(angle_degrees: f32, radius: f32) -> Vec3 {
    let radians = angle_degrees.to_radians();
    Vec3::new(radians.cos(), 0.0, radians.sin()) * radius
}

/// Heading in degrees of a horizontal offset (inverse of `planar_offset`)
#[inline]
pub fn planar_heading(offset: Vec3) -> f32 {
    offset.z.atan2(offset.x).to_degrees()
}

/// Step from `current` toward `target` by at most `max_delta`, never overshooting
#[inline]
pub fn move_towards(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
    let delta = target - current;
    let distance = delta.length();
    if distance <= max_delta || distance <= f32::EPSILON {
        target
    } else {
        current + delta / distance * max_delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planar_roundtrip_heading() {
        let offset = planar_offset(90.0, 2.0);
        assert!(offset.x.abs() < 1e-5);
        assert!((offset.z - 2.0).abs() < 1e-5);
        assert_eq!(offset.y, 0.0);
        assert!((planar_heading(offset) - 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_move_towards_clamps() {
        let from = Vec3::ZERO;
        let to = Vec3::new(3.0, 0.0, 4.0);
        let step = move_towards(from, to, 1.0);
        assert!((step.length() - 1.0).abs() < 1e-5);
        // Large step lands exactly on the target
        assert_eq!(move_towards(from, to, 10.0), to);
    }

    #[test]
    fn test_clamp01() {
        assert_eq!(clamp01(-1.0), 0.0);
        assert_eq!(clamp01(2.0), 1.0);
        assert_eq!(clamp01(f32::NAN), 0.0);
        assert_eq!(lerp(3.0, 1.0, 0.5), 2.0);
    }
}
