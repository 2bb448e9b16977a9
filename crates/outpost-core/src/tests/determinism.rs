//! Determinism verification tests.
//!
//! The same seed, configuration, clock and commands must produce the same
//! world, tick for tick. This is what replays and lockstep hosts rely on.

use glam::Vec2;

use crate::output::{Command, TickReport};
use crate::snapshot::WorldSnapshot;

use super::helpers::{arena_with_player, fortified_tower_defense, Clock, FRAME_MS};

/// Runs the arena shooter with a scripted player and records every snapshot.
fn scripted_arena_run(seed: u64, frames: usize) -> (Vec<WorldSnapshot>, Vec<TickReport>) {
    let (mut sim, player) = arena_with_player(seed);
    let mut clock = Clock::new(FRAME_MS);
    let mut snapshots = Vec::with_capacity(frames);
    let mut reports = Vec::with_capacity(frames);

    for frame in 0..frames {
        if frame % 20 == 0 {
            #[allow(clippy::cast_precision_loss)]
            let angle = frame as f32 * 0.1;
            sim.push_command(Command::Fire {
                shooter: player,
                aim: Vec2::new(400.0, 300.0) + Vec2::from_angle(angle) * 100.0,
            });
        }
        if frame % 45 == 0 {
            sim.push_command(Command::Melee { attacker: player });
        }
        reports.push(clock.step(&mut sim));
        snapshots.push(sim.snapshot());
    }
    (snapshots, reports)
}

#[test]
fn same_seed_same_world() {
    let (first, first_reports) = scripted_arena_run(1234, 600);
    let (second, second_reports) = scripted_arena_run(1234, 600);

    assert_eq!(first, second);
    assert_eq!(first_reports, second_reports);
}

#[test]
fn different_seeds_diverge() {
    let (first, _) = scripted_arena_run(1, 300);
    let (second, _) = scripted_arena_run(2, 300);

    assert_ne!(first.last(), second.last());
}

#[test]
fn tower_defense_replays_identically() {
    let run = |seed| {
        let mut sim = fortified_tower_defense(seed);
        let reports = Clock::new(FRAME_MS).run(&mut sim, 1200);
        (sim.snapshot(), reports)
    };

    assert_eq!(run(9), run(9));
}

#[test]
fn snapshot_json_is_stable() {
    let (first, _) = scripted_arena_run(77, 200);
    let (second, _) = scripted_arena_run(77, 200);

    let a = serde_json::to_string(first.last().unwrap()).unwrap();
    let b = serde_json::to_string(second.last().unwrap()).unwrap();
    assert_eq!(a, b);
}
