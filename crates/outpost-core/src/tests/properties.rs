//! Property-based tests using proptest.
//!
//! Rules that must hold for any clock sequence:
//! - Path index never decreases, and followers leave only at the path end
//! - No weapon fires twice inside its interval
//! - Score moves up by exactly one per scoring event and never down
//! - A spent projectile is gone by the end of the tick it ran out in

use glam::Vec2;
use proptest::prelude::*;

use crate::config::SimConfig;
use crate::entity::{Blueprint, DeactivationReason, Layers, ProjectileProfile, Weapon, WeaponProfile};
use crate::output::{Command, Event, Shooter};
use crate::simulation::Simulation;

use super::helpers::{arena_with_player, quiet_config, spawn_dummy};

fn deltas(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0f64..120.0, 1..max_len)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_path_index_is_monotonic(speed in 10.0f32..300.0, steps in deltas(400)) {
        let config = SimConfig {
            path: SimConfig::tower_defense().path,
            ..quiet_config()
        };
        let len = config.path.len();
        let mut sim = Simulation::new(config, 0).unwrap();
        let id = sim.arena_mut().spawn(Blueprint::path_follower(Vec2::new(0.0, 300.0), 0, speed));

        let mut now = 0.0;
        let mut last = 0;
        for delta in steps {
            now += delta;
            let report = sim.step(now, delta).unwrap();
            if let Some(actor) = sim.arena().get(id) {
                let index = actor.state.as_path_follower().unwrap().path_index;
                prop_assert!(index >= last, "index went from {last} to {index}");
                prop_assert!(index < len);
                last = index;
            } else {
                prop_assert_eq!(report.deactivation_reason(id), Some(DeactivationReason::ReachedEnd));
                prop_assert_eq!(last, len - 1);
                break;
            }
        }
    }

    #[test]
    fn prop_weapon_respects_interval(
        interval in 50.0f64..1000.0,
        targets in prop::collection::vec((0.0f32..300.0, 0.0f32..300.0), 1..12),
        steps in deltas(300),
    ) {
        let mut sim = Simulation::new(quiet_config(), 0).unwrap();
        let profile = WeaponProfile { fire_interval_ms: interval, ..WeaponProfile::default() };
        let tower = sim.arena_mut().add_emplacement(Vec2::new(150.0, 150.0), Weapon::new(profile), None);
        for (x, y) in targets {
            spawn_dummy(&mut sim, Vec2::new(x, y));
        }

        let mut now = 0.0;
        let mut last_shot: Option<f64> = None;
        for delta in steps {
            now += delta;
            let report = sim.step(now, delta).unwrap();
            let shots = report
                .events
                .iter()
                .filter(|e| matches!(e, Event::Fired { shooter: Shooter::Emplacement(s), .. } if *s == tower))
                .count();
            prop_assert!(shots <= 1);
            if shots == 1 {
                if let Some(previous) = last_shot {
                    prop_assert!(now >= previous + interval);
                }
                last_shot = Some(now);
            }
        }
    }

    #[test]
    fn prop_score_counts_scoring_events(
        seed in any::<u64>(),
        steps in deltas(300),
        aims in prop::collection::vec(prop::option::of((0.0f32..800.0, 0.0f32..600.0)), 300),
    ) {
        let (mut sim, player) = arena_with_player(seed);
        let mut now = 0.0;
        let mut score = 0;
        for (delta, aim) in steps.into_iter().zip(aims) {
            if let Some((x, y)) = aim {
                sim.push_command(Command::Fire { shooter: player, aim: Vec2::new(x, y) });
                sim.push_command(Command::Melee { attacker: player });
            }
            now += delta;
            let report = sim.step(now, delta).unwrap();
            let scored = report.events.iter().filter(|e| matches!(e, Event::Scored { .. })).count();
            prop_assert!(report.score >= score);
            prop_assert_eq!(report.score - score, u64::try_from(scored).unwrap());
            score = report.score;
        }
    }

    #[test]
    fn prop_spent_projectile_is_purged(lifespan in 1.0f64..2000.0, steps in deltas(60)) {
        let mut sim = Simulation::new(quiet_config(), 0).unwrap();
        let profile = ProjectileProfile { lifespan_ms: lifespan, ..ProjectileProfile::default() };
        let shot = sim.arena_mut().spawn(Blueprint::projectile(
            Vec2::new(400.0, 300.0),
            Vec2::ZERO,
            &profile,
            Layers::HOSTILE,
        ));

        let mut now = 0.0;
        for delta in steps {
            now += delta;
            sim.step(now, delta).unwrap();
            // Clock and lifespan accumulate separately; skip the rounding band.
            if now > lifespan + 1e-6 {
                prop_assert!(sim.arena().get(shot).is_none());
                break;
            }
            if now < lifespan - 1e-6 {
                prop_assert!(sim.arena().get_active(shot).is_some());
            }
        }
    }
}
