//! Weapon settings and bullet catalog
//!
//! Loaded from a JSON file on native; every field falls back to its default.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{DEFAULT_AMMO_CAPACITY, RESERVE_VIEW_LEN};
use crate::sim::{AmmoError, BulletDescriptor, DescriptorError, MotionTuning, TuningError};

/// Settings load/validation errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Settings file could not be read
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    /// Settings file is not valid JSON for `Settings`
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    /// A bullet in the catalog is invalid
    #[error(transparent)]
    Bullet(#[from] DescriptorError),
    /// Ammo ring cannot be built
    #[error(transparent)]
    Ammo(#[from] AmmoError),
    /// Motion tuning out of range
    #[error("invalid motion tuning: {0}")]
    Tuning(#[from] TuningError),
}

/// Weapon settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Number of ammo slots
    pub ammo_capacity: usize,
    /// Bullet type every slot starts with
    pub default_bullet: BulletDescriptor,
    /// Bullet types offered by the upgrade screen, by key
    pub upgrade_bullets: BTreeMap<String, BulletDescriptor>,
    /// Shared motion policy
    pub tuning: MotionTuning,
    /// Reserve slots listed behind current/next on the HUD
    pub reserve_view_len: usize,
}

impl Default for Settings {
    fn default() -> Self {
        let mut upgrade_bullets = BTreeMap::new();
        upgrade_bullets.insert(
            "wide".to_string(),
            BulletDescriptor {
                name: "Wide".to_string(),
                damage: 2,
                loop_count: 2,
                start_radius: 5.0,
                end_radius: 3.0,
                orbit_speed: 150.0,
                ..Default::default()
            },
        );
        upgrade_bullets.insert(
            "rapid".to_string(),
            BulletDescriptor {
                name: "Rapid".to_string(),
                speed: 30.0,
                loop_count: 1,
                orbit_speed: 360.0,
                return_speed: 20.0,
                ..Default::default()
            },
        );

        Self {
            ammo_capacity: DEFAULT_AMMO_CAPACITY,
            default_bullet: BulletDescriptor::default(),
            upgrade_bullets,
            tuning: MotionTuning::default(),
            reserve_view_len: RESERVE_VIEW_LEN,
        }
    }
}

impl Settings {
    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!(
            "Loaded settings from {} ({} slots, {} upgrades)",
            path.display(),
            settings.ammo_capacity,
            settings.upgrade_bullets.len()
        );
        Ok(settings)
    }

    /// Load from `path` if given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, SettingsError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                log::info!("Using default settings");
                Ok(Self::default())
            }
        }
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check capacity, tuning and every bullet descriptor
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.ammo_capacity == 0 {
            return Err(AmmoError::InvalidCapacity {
                capacity: self.ammo_capacity,
            }
            .into());
        }
        self.tuning.validate()?;

        self.default_bullet.validate()?;
        for bullet in self.upgrade_bullets.values() {
            bullet.validate()?;
        }
        Ok(())
    }

    /// Upgrade bullet by key
    pub fn upgrade(&self, key: &str) -> Option<&BulletDescriptor> {
        self.upgrade_bullets.get(key)
    }
}
