//! Test helper functions for setting up simulations and driving the clock.

use glam::Vec2;

use crate::config::SimConfig;
use crate::entity::{ActorId, Blueprint};
use crate::output::{Command, Event, TickReport};
use crate::simulation::Simulation;

/// Frame length used by most scenarios, roughly 60 fps.
pub const FRAME_MS: f64 = 16.0;

// =============================================================================
// Setup
// =============================================================================

/// Tower-defense simulation with a tower placed on every slot.
///
/// The placements are queued, so they take effect on the first step.
pub fn fortified_tower_defense(seed: u64) -> Simulation {
    let config = SimConfig::tower_defense();
    let slots = config.towers.slots.clone();
    let mut sim = Simulation::new(config, seed).expect("preset is valid");
    for at in slots {
        sim.push_command(Command::PlaceEmplacement { at });
    }
    sim
}

/// Arena-shooter simulation with the player in the middle of the field.
pub fn arena_with_player(seed: u64) -> (Simulation, ActorId) {
    let mut sim = Simulation::new(SimConfig::arena_shooter(), seed).expect("preset is valid");
    let player = sim.spawn_player(Vec2::new(400.0, 300.0));
    (sim, player)
}

/// Config with no spawn rules and no path, for hand-built scenarios.
pub fn quiet_config() -> SimConfig {
    SimConfig::default()
}

/// Spawns a hostile that stays put.
pub fn spawn_dummy(sim: &mut Simulation, position: Vec2) -> ActorId {
    sim.arena_mut()
        .spawn(Blueprint::fixture(position).with_layer(crate::entity::Layers::HOSTILE))
}

// =============================================================================
// Clock
// =============================================================================

/// Drives a simulation with a fixed frame length and tracks the clock.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    /// Current clock value.
    pub now: f64,
    /// Frame length.
    pub delta: f64,
}

impl Clock {
    /// Clock at zero with the given frame length.
    pub fn new(delta: f64) -> Self {
        Self { now: 0.0, delta }
    }

    /// Runs one frame.
    pub fn step(&mut self, sim: &mut Simulation) -> TickReport {
        self.now += self.delta;
        sim.step(self.now, self.delta).expect("clock only moves forward")
    }

    /// Runs `frames` frames and returns every report.
    pub fn run(&mut self, sim: &mut Simulation, frames: usize) -> Vec<TickReport> {
        (0..frames).map(|_| self.step(sim)).collect()
    }
}

/// Every event of `reports`, flattened in order.
pub fn all_events(reports: &[TickReport]) -> impl Iterator<Item = &Event> + '_ {
    reports.iter().flat_map(|report| report.events.iter())
}
