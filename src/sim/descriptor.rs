//! Bullet type descriptors
//!
//! A descriptor is the immutable numeric profile of one bullet type. Slots hold
//! one each; a projectile takes its own copy at fire time, so replacing a slot's
//! type never changes a bullet that is already flying.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Descriptor validation errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DescriptorError {
    /// A speed, radius or distance is below zero
    #[error("bullet '{bullet}': {field} must be non-negative, got {value}")]
    Negative {
        /// Descriptor name
        bullet: String,
        /// Offending field
        field: &'static str,
        /// Offending value
        value: f32,
    },
    /// A field is NaN or infinite
    #[error("bullet '{bullet}': {field} must be finite")]
    NotFinite {
        /// Descriptor name
        bullet: String,
        /// Offending field
        field: &'static str,
    },
}

/// Numeric behavior of one bullet type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulletDescriptor {
    /// Display name (HUD, logs)
    pub name: String,
    /// Forward travel speed (units/s)
    pub speed: f32,
    /// Damage carried to the hit collaborator
    pub damage: u32,
    /// Full orbits before returning (0 skips the orbit)
    pub loop_count: u32,
    /// Height above the orbit center while orbiting
    pub vertical_offset: f32,
    /// Orbit angular speed (degrees/s)
    pub orbit_speed: f32,
    /// Speed on the way back to the return target (units/s)
    pub return_speed: f32,
    /// Orbit radius targeted on the first loop
    pub start_radius: f32,
    /// Orbit radius targeted on the last loop
    pub end_radius: f32,
    /// Forward distance covered before orbiting begins
    pub travel_distance: f32,
}

impl Default for BulletDescriptor {
    fn default() -> Self {
        Self {
            name: "Standard".to_string(),
            speed: 20.0,
            damage: 1,
            loop_count: 3,
            vertical_offset: 1.0,
            orbit_speed: 180.0,
            return_speed: 10.0,
            start_radius: 3.0,
            end_radius: 1.0,
            travel_distance: 2.0,
        }
    }
}

impl BulletDescriptor {
    /// Check every field; speeds, radii and distances must be finite and non-negative
    pub fn validate(&self) -> Result<(), DescriptorError> {
        let non_negative = [
            ("speed", self.speed),
            ("orbit_speed", self.orbit_speed),
            ("return_speed", self.return_speed),
            ("start_radius", self.start_radius),
            ("end_radius", self.end_radius),
            ("travel_distance", self.travel_distance),
        ];

        for (field, value) in non_negative {
            if !value.is_finite() {
                return Err(DescriptorError::NotFinite {
                    bullet: self.name.clone(),
                    field,
                });
            }
            if value < 0.0 {
                return Err(DescriptorError::Negative {
                    bullet: self.name.clone(),
                    field,
                    value,
                });
            }
        }

        if !self.vertical_offset.is_finite() {
            return Err(DescriptorError::NotFinite {
                bullet: self.name.clone(),
                field: "vertical_offset",
            });
        }

        Ok(())
    }

    /// Seconds spent orbiting for a bullet that enters the orbit at angle 0
    pub fn nominal_orbit_secs(&self) -> f32 {
        if self.loop_count == 0 || self.orbit_speed <= 0.0 {
            return 0.0;
        }
        self.loop_count as f32 * 360.0 / self.orbit_speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let bullet = BulletDescriptor::default();
        assert!(bullet.validate().is_ok());
        assert!((bullet.nominal_orbit_secs() - 6.0).abs() < 1e-5);
    }

    #[test]
    fn test_negative_radius_rejected() {
        let bullet = BulletDescriptor {
            end_radius: -1.0,
            ..Default::default()
        };
        assert_eq!(
            bullet.validate(),
            Err(DescriptorError::Negative {
                bullet: "Standard".to_string(),
                field: "end_radius",
                value: -1.0,
            })
        );
    }

    #[test]
    fn test_nan_rejected() {
        let bullet = BulletDescriptor {
            speed: f32::NAN,
            ..Default::default()
        };
        assert!(matches!(
            bullet.validate(),
            Err(DescriptorError::NotFinite { field: "speed", .. })
        ));

        let bullet = BulletDescriptor {
            vertical_offset: f32::INFINITY,
            ..Default::default()
        };
        assert!(bullet.validate().is_err());
    }

    #[test]
    fn test_negative_vertical_offset_allowed() {
        let bullet = BulletDescriptor {
            vertical_offset: -0.5,
            ..Default::default()
        };
        assert!(bullet.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let bullet: BulletDescriptor =
            serde_json::from_str(r#"{"name":"Heavy","damage":3,"loop_count":1}"#).unwrap();
        assert_eq!(bullet.name, "Heavy");
        assert_eq!(bullet.damage, 3);
        assert_eq!(bullet.loop_count, 1);
        assert_eq!(bullet.speed, 20.0);
    }
}
