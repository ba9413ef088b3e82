//! Fixed timestep simulation tick
//!
//! Core loop that advances the weapon deterministically. Order within a tick:
//! 1. upgrade actions
//! 2. fire request (slot granted before the projectile's first update)
//! 3. hit reports
//! 4. projectile steps, releasing slots of arrived/aborted projectiles
//! 5. disposal (removal from the live list)

use super::descriptor::BulletDescriptor;
use super::motion::{Anchors, StepOutcome};
use super::state::{FireCommand, GameEvent, GameState, ProjectileId};

/// Upgrade flow driven by the host UI
#[derive(Debug, Clone, PartialEq)]
pub enum UpgradeAction {
    Begin,
    Apply(BulletDescriptor),
    Finish,
}

/// Input for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Orbit center / return target positions this frame
    pub anchors: Anchors,
    /// Shoot once
    pub fire: Option<FireCommand>,
    /// Projectiles the host's collision pass saw touching a hostile
    pub hits: Vec<ProjectileId>,
    /// Upgrade UI actions, applied in order
    pub upgrades: Vec<UpgradeAction>,
}

/// Advance the weapon state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) -> Vec<GameEvent> {
    let mut events = Vec::new();
    state.time_ticks += 1;

    for action in &input.upgrades {
        match action {
            UpgradeAction::Begin => state.begin_upgrade(),
            UpgradeAction::Apply(bullet) => {
                if let Some(slot) = state.apply_upgrade(bullet.clone()) {
                    events.push(GameEvent::SlotUpgraded {
                        slot,
                        bullet: bullet.name.clone(),
                    });
                }
            }
            UpgradeAction::Finish => state.finish_upgrade(),
        }
    }

    if let Some(command) = input.fire {
        match state.try_fire(command) {
            Ok((projectile, claim)) => events.push(GameEvent::Fired {
                projectile,
                slot: claim.index,
            }),
            Err(reason) => {
                log::debug!("fire refused: {reason:?}");
                events.push(GameEvent::FireRefused { reason });
            }
        }
    }

    for &id in &input.hits {
        match state.projectile(id) {
            Some(p) if !p.motion.is_spent() => events.push(GameEvent::Hit {
                damage: p.motion.damage(),
            }),
            _ => log::debug!("hit report for unknown projectile {id}"),
        }
    }

    // Step in id order; collect finished projectiles for release
    let mut finished = Vec::new();
    for projectile in &mut state.projectiles {
        match projectile.motion.step(&input.anchors, dt) {
            Ok(StepOutcome::InFlight) => {}
            Ok(StepOutcome::Arrived) => finished.push(projectile.id),
            Err(error) => {
                log::warn!("projectile {} aborted: {error}", projectile.id);
                projectile.motion.abort();
                events.push(GameEvent::ProjectileAborted {
                    projectile: projectile.id,
                    error,
                });
                finished.push(projectile.id);
            }
        }
    }

    // Release strictly before disposal so the slot is free when the id goes away
    for id in &finished {
        let Some(index) = state.projectiles.iter().position(|p| p.id == *id) else {
            continue;
        };
        let projectile = state.projectiles.remove(index);
        if let Some(slot) = state.release_projectile(&projectile) {
            events.push(GameEvent::SlotReleased { slot });
        }
        events.push(GameEvent::DisposalRequested { projectile: *id });
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::motion::{MotionError, MotionTuning};
    use crate::sim::state::FireRefusal;
    use glam::Vec3;

    fn quick_bullet() -> BulletDescriptor {
        BulletDescriptor {
            name: "Quick".to_string(),
            speed: 10.0,
            travel_distance: 1.0,
            loop_count: 1,
            orbit_speed: 720.0,
            return_speed: 20.0,
            start_radius: 1.0,
            end_radius: 0.5,
            vertical_offset: 0.0,
            damage: 2,
        }
    }

    fn state(capacity: usize) -> GameState {
        GameState::new(capacity, quick_bullet(), MotionTuning::default()).unwrap()
    }

    fn fire_input() -> TickInput {
        TickInput {
            anchors: Anchors::at(Vec3::ZERO),
            fire: Some(FireCommand {
                muzzle: Vec3::ZERO,
                direction: Vec3::X,
            }),
            ..Default::default()
        }
    }

    fn idle_input() -> TickInput {
        TickInput {
            anchors: Anchors::at(Vec3::ZERO),
            ..Default::default()
        }
    }

    fn count<F: Fn(&GameEvent) -> bool>(events: &[GameEvent], f: F) -> usize {
        events.iter().filter(|&e| f(e)).count()
    }

    #[test]
    fn test_fire_steps_same_tick() {
        let mut state = state(2);
        let events = tick(&mut state, &fire_input(), SIM_DT);
        assert_eq!(events, vec![GameEvent::Fired { projectile: 1, slot: 0 }]);
        // First update already applied
        assert!(state.projectiles[0].motion.traveled() > 0.0);
    }

    #[test]
    fn test_terminal_release_exactly_once() {
        let mut state = state(1);
        let mut all = tick(&mut state, &fire_input(), SIM_DT);
        for _ in 0..2000 {
            all.extend(tick(&mut state, &idle_input(), SIM_DT));
        }

        assert_eq!(
            count(&all, |e| matches!(e, GameEvent::SlotReleased { slot: 0 })),
            1
        );
        assert_eq!(
            count(&all, |e| matches!(e, GameEvent::DisposalRequested { projectile: 1 })),
            1
        );
        // Release comes before disposal
        let released = all
            .iter()
            .position(|e| matches!(e, GameEvent::SlotReleased { .. }))
            .unwrap();
        let disposed = all
            .iter()
            .position(|e| matches!(e, GameEvent::DisposalRequested { .. }))
            .unwrap();
        assert!(released < disposed);
        assert!(state.projectiles.is_empty());
        assert!(state.ammo.is_available(0));
    }

    #[test]
    fn test_slot_not_regranted_while_in_flight() {
        let mut state = state(1);
        tick(&mut state, &fire_input(), SIM_DT);
        for _ in 0..10 {
            let events = tick(&mut state, &fire_input(), SIM_DT);
            assert!(events.contains(&GameEvent::FireRefused {
                reason: FireRefusal::SelectedSlotBusy
            }));
        }
        assert_eq!(state.projectiles.len(), 1);
    }

    #[test]
    fn test_hit_carries_damage() {
        let mut state = state(2);
        tick(&mut state, &fire_input(), SIM_DT);
        let input = TickInput {
            hits: vec![1, 42],
            ..idle_input()
        };
        let events = tick(&mut state, &input, SIM_DT);
        assert_eq!(count(&events, |e| *e == GameEvent::Hit { damage: 2 }), 1);
        assert_eq!(count(&events, |e| matches!(e, GameEvent::Hit { .. })), 1);
    }

    #[test]
    fn test_missing_anchor_aborts_projectile_and_frees_slot() {
        let mut state = state(2);
        tick(&mut state, &fire_input(), SIM_DT);

        let lost = TickInput {
            anchors: Anchors {
                orbit_center: None,
                return_target: Some(Vec3::ZERO),
            },
            ..Default::default()
        };
        let events = tick(&mut state, &lost, SIM_DT);
        assert!(events.contains(&GameEvent::ProjectileAborted {
            projectile: 1,
            error: MotionError::MissingOrbitCenter,
        }));
        assert!(events.contains(&GameEvent::SlotReleased { slot: 0 }));
        assert!(events.contains(&GameEvent::DisposalRequested { projectile: 1 }));
        assert!(state.projectiles.is_empty());
        assert_eq!(state.ammo.availability(), vec![true, true]);

        // The loop keeps going
        let events = tick(&mut state, &fire_input(), SIM_DT);
        assert!(matches!(events[0], GameEvent::Fired { .. }));
    }

    #[test]
    fn test_upgrade_in_flight_slot_release_is_stale() {
        let mut state = state(2);
        tick(&mut state, &fire_input(), SIM_DT); // slot 0 out, carousel -> 1
        tick(&mut state, &fire_input(), SIM_DT); // slot 1 out, carousel -> 0

        let heavy = BulletDescriptor {
            name: "Heavy".to_string(),
            damage: 5,
            ..quick_bullet()
        };
        let input = TickInput {
            upgrades: vec![
                UpgradeAction::Begin,
                UpgradeAction::Apply(heavy),
                UpgradeAction::Finish,
            ],
            ..fire_input()
        };
        let events = tick(&mut state, &input, SIM_DT);
        assert!(events.contains(&GameEvent::SlotUpgraded {
            slot: 0,
            bullet: "Heavy".to_string()
        }));
        // Upgraded slot 0 is free again and the new shot takes it
        assert!(events.contains(&GameEvent::Fired { projectile: 3, slot: 0 }));
        assert_eq!(state.projectile(3).unwrap().motion.damage(), 5);
        // The first bullet keeps its own descriptor copy
        assert_eq!(state.projectile(1).unwrap().motion.damage(), 2);
        assert_eq!(state.projectile(1).unwrap().motion.bullet().name, "Quick");

        let mut all = Vec::new();
        for _ in 0..2000 {
            all.extend(tick(&mut state, &idle_input(), SIM_DT));
        }
        // Projectile 1's stale claim never frees slot 0 a second time
        assert_eq!(
            count(&all, |e| matches!(e, GameEvent::SlotReleased { slot: 0 })),
            1
        );
        assert_eq!(
            count(&all, |e| matches!(e, GameEvent::DisposalRequested { .. })),
            3
        );
        assert_eq!(state.ammo.availability(), vec![true, true]);
    }

    #[test]
    fn test_fire_refused_while_upgrading() {
        let mut state = state(2);
        let input = TickInput {
            upgrades: vec![UpgradeAction::Begin],
            ..fire_input()
        };
        let events = tick(&mut state, &input, SIM_DT);
        assert_eq!(
            events,
            vec![GameEvent::FireRefused {
                reason: FireRefusal::Upgrading
            }]
        );
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_determinism() {
        let mut a = state(3);
        let mut b = state(3);
        let inputs = [fire_input(), idle_input(), fire_input(), idle_input()];
        for _ in 0..50 {
            for input in &inputs {
                let ea = tick(&mut a, input, SIM_DT);
                let eb = tick(&mut b, input, SIM_DT);
                assert_eq!(ea, eb);
            }
        }
        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.projectiles.len(), b.projectiles.len());
        for (pa, pb) in a.projectiles.iter().zip(&b.projectiles) {
            assert_eq!(pa.motion.position(), pb.motion.position());
        }
    }
}
