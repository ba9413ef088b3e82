//! Scripted, seeded weapon session
//!
//! Stands in for the game host: walks the player around, aims with a seeded
//! RNG, fakes collision reports and opens one upgrade session halfway through.
//! Same seed and settings give the same summary.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::SIM_DT;
use crate::sim::{
    Anchors, FireCommand, GameEvent, GameState, SlotView, TickInput, UpgradeAction, tick,
};
use crate::{Settings, SettingsError};

/// Demo parameters
#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub seed: u64,
    /// Simulated seconds
    pub duration_secs: f32,
    /// Chance per tick that the player pulls the trigger
    pub fire_chance: f64,
    /// Chance per tick that a live projectile reports a hit
    pub hit_chance: f64,
    /// Upgrade key applied at the halfway mark, if present in the catalog
    pub upgrade_key: Option<String>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            duration_secs: 30.0,
            fire_chance: 0.05,
            hit_chance: 0.01,
            upgrade_key: Some("wide".to_string()),
        }
    }
}

/// What happened during a demo run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DemoSummary {
    pub ticks: u64,
    pub shots: u32,
    pub refusals: u32,
    pub hits: u32,
    pub total_damage: u64,
    pub slots_released: u32,
    pub disposals: u32,
    pub aborted: u32,
    pub upgrades: u32,
    pub in_flight: usize,
    pub availability: Vec<bool>,
    /// HUD listing at the end of the run
    pub hud: Vec<SlotView>,
}

impl DemoSummary {
    fn record(&mut self, event: &GameEvent) {
        match event {
            GameEvent::Fired { .. } => self.shots += 1,
            GameEvent::FireRefused { .. } => self.refusals += 1,
            GameEvent::Hit { damage } => {
                self.hits += 1;
                self.total_damage += u64::from(*damage);
            }
            GameEvent::SlotReleased { .. } => self.slots_released += 1,
            GameEvent::DisposalRequested { .. } => self.disposals += 1,
            GameEvent::ProjectileAborted { .. } => self.aborted += 1,
            GameEvent::SlotUpgraded { .. } => self.upgrades += 1,
        }
    }
}

/// Player walks a slow circle of this radius around the origin
const WALK_RADIUS: f32 = 4.0;
/// Radians per second along the walk circle
const WALK_SPEED: f32 = 0.3;
/// Holster sits behind and above the player
const HOLSTER_OFFSET: Vec3 = Vec3::new(0.0, 1.0, -0.5);

/// Run a full session and summarize its events
pub fn run(settings: &Settings, config: &DemoConfig) -> Result<DemoSummary, SettingsError> {
    let mut state = GameState::from_settings(settings)?;
    let mut rng = Pcg32::seed_from_u64(config.seed);
    let mut summary = DemoSummary::default();

    let total_ticks = (config.duration_secs / SIM_DT).ceil() as u64;
    let upgrade_tick = total_ticks / 2;
    let upgrade = config
        .upgrade_key
        .as_deref()
        .and_then(|key| settings.upgrade(key))
        .cloned();

    log::info!(
        "Demo starting: seed {}, {} ticks, {} slots",
        config.seed,
        total_ticks,
        state.ammo.capacity()
    );

    for tick_index in 0..total_ticks {
        let t = tick_index as f32 * SIM_DT;
        let player = Vec3::new((t * WALK_SPEED).cos(), 0.0, (t * WALK_SPEED).sin()) * WALK_RADIUS;

        let mut input = TickInput {
            anchors: Anchors {
                orbit_center: Some(player),
                return_target: Some(player + HOLSTER_OFFSET),
            },
            ..Default::default()
        };

        if rng.random_bool(config.fire_chance) {
            let heading = rng.random_range(0.0..TAU);
            input.fire = Some(FireCommand {
                muzzle: player + Vec3::Y * 0.5,
                direction: Vec3::new(heading.cos(), 0.0, heading.sin()),
            });
        }

        for projectile in &state.projectiles {
            if rng.random_bool(config.hit_chance) {
                input.hits.push(projectile.id);
            }
        }

        if tick_index == upgrade_tick {
            if let Some(bullet) = &upgrade {
                input.upgrades = vec![
                    UpgradeAction::Begin,
                    UpgradeAction::Apply(bullet.clone()),
                    UpgradeAction::Finish,
                ];
            }
        }

        for event in tick(&mut state, &input, SIM_DT) {
            summary.record(&event);
        }
    }

    summary.ticks = state.time_ticks;
    summary.in_flight = state.projectiles.len();
    summary.availability = state.ammo.availability();
    summary.hud = state.slot_view();

    log::info!(
        "Demo finished: {} shots, {} hits, {} returned, {} in flight",
        summary.shots,
        summary.hits,
        summary.disposals,
        summary.in_flight
    );

    Ok(summary)
}
