//! Simulation module with the fixed per-tick stage order.
//!
//! The `Simulation` owns the arena, the configuration, the seeded random
//! source and the command queue, and runs one tick per [`Simulation::step`]:
//!
//! 1. **SPAWN**: spawn timers that came due add actors
//! 2. **MOVEMENT**: actors move
//! 3. **FIRE CONTROL**: queued commands apply, weapons fire
//! 4. **COLLISION**: hits resolve, spent projectiles are marked
//! 5. **PURGE**: every actor deactivated during the tick is removed
//!
//! # Determinism
//!
//! All randomness comes from one `ChaCha8Rng` seeded at construction, and
//! every stage walks actors in spawn order. The same seed, configuration,
//! clock values and commands produce the same snapshots.
//!
//! # Example
//!
//! ```
//! use outpost_core::config::SimConfig;
//! use outpost_core::output::Command;
//! use outpost_core::simulation::Simulation;
//! use glam::Vec2;
//!
//! let mut sim = Simulation::new(SimConfig::tower_defense(), 42).unwrap();
//! sim.push_command(Command::PlaceEmplacement { at: Vec2::new(150.0, 200.0) });
//!
//! let mut now = 0.0;
//! for _ in 0..10 {
//!     now += 16.0;
//!     sim.step(now, 16.0).unwrap();
//! }
//!
//! assert_eq!(sim.tick(), 10);
//! assert_eq!(sim.snapshot().emplacements.len(), 1);
//! ```

use std::fmt;

use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::arena::Arena;
use crate::config::{ConfigError, SimConfig};
use crate::entity::{ActorId, Blueprint, Layers, Weapon};
use crate::geometry::{AabbOverlap, OverlapTest};
use crate::output::{Command, CommandQueue, Event, TickReport};
use crate::resolver::{CollisionResolver, FireControlResolver, MovementResolver, Resolver, TickContext};
use crate::snapshot::WorldSnapshot;
use crate::spawn::{spawn_from_rule, SpawnSchedule};

/// Host contract violations rejected by [`Simulation::step`].
///
/// A rejected tick changes nothing: no stage runs and the tick counter stays.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SimError {
    /// The clock went backwards.
    #[error("clock regressed from {previous_ms} ms to {now_ms} ms")]
    ClockRegressed {
        /// Clock value of the last accepted tick.
        previous_ms: f64,
        /// Rejected clock value.
        now_ms: f64,
    },
    /// The clock value is NaN or infinite.
    #[error("clock value {now_ms} is not finite")]
    NonFiniteClock {
        /// Rejected clock value.
        now_ms: f64,
    },
    /// The delta is negative, NaN or infinite.
    #[error("tick delta {delta_ms} ms is negative or not finite")]
    InvalidDelta {
        /// Rejected delta.
        delta_ms: f64,
    },
}

// =============================================================================
// Simulation
// =============================================================================

/// The tick orchestrator.
pub struct Simulation {
    arena: Arena,
    config: SimConfig,
    /// Stages in execution order.
    resolvers: Vec<Box<dyn Resolver>>,
    spawner: SpawnSchedule,
    commands: CommandQueue,
    rng: ChaCha8Rng,
    overlap: Box<dyn OverlapTest>,
    /// Clock value of the last accepted tick.
    last_now: Option<f64>,
    tick: u64,
    seed: u64,
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("arena", &self.arena)
            .field("resolvers", &format!("[{} resolvers]", self.resolvers.len()))
            .field("spawner", &self.spawner)
            .field("commands", &self.commands)
            .field("last_now", &self.last_now)
            .field("tick", &self.tick)
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// Creates a simulation for `config`, seeding the random source with `seed`.
    ///
    /// The arena starts empty apart from the configured tower slots. Overlap
    /// uses [`AabbOverlap`] until replaced with [`Simulation::with_overlap`].
    ///
    /// # Errors
    ///
    /// Returns the first problem found by [`SimConfig::validate`].
    pub fn new(config: SimConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        debug!(seed, spawn_rules = config.spawns.len(), "simulation created");
        Ok(Self {
            arena: Arena::with_tower_slots(&config.towers.slots),
            spawner: SpawnSchedule::new(&config.spawns),
            config,
            resolvers: vec![
                Box::new(MovementResolver::new()),
                Box::new(FireControlResolver::new()),
                Box::new(CollisionResolver::new()),
            ],
            commands: CommandQueue::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            overlap: Box::new(AabbOverlap),
            last_now: None,
            tick: 0,
            seed,
        })
    }

    /// Replaces the overlap primitive used by collision resolution.
    #[must_use]
    pub fn with_overlap(mut self, overlap: impl OverlapTest + 'static) -> Self {
        self.overlap = Box::new(overlap);
        self
    }

    /// Spawns the player: a static actor on the player layer carrying the
    /// configured player weapon.
    pub fn spawn_player(&mut self, position: Vec2) -> ActorId {
        let id = self.arena.spawn(
            Blueprint::fixture(position)
                .with_layer(Layers::PLAYER)
                .with_weapon(Weapon::new(self.config.player_weapon)),
        );
        debug!(%id, ?position, "player spawned");
        id
    }

    /// Queues a command for the next tick's fire control stage.
    pub fn push_command(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Runs one tick at clock time `now_ms`, `delta_ms` after the previous one.
    ///
    /// # Errors
    ///
    /// Returns [`SimError`] without running anything if the clock goes
    /// backwards or either value is not a usable number.
    pub fn step(&mut self, now_ms: f64, delta_ms: f64) -> Result<TickReport, SimError> {
        if let Err(err) = self.check_clock(now_ms, delta_ms) {
            warn!(tick = self.tick, %err, "tick rejected");
            return Err(err);
        }

        let mut events = Vec::new();
        for rule in self.spawner.advance(delta_ms) {
            if let Some(actor) = spawn_from_rule(&rule, &self.config, &mut self.arena, &mut self.rng) {
                events.push(Event::Spawned { actor });
            }
        }

        let mut ctx = TickContext {
            tick: self.tick,
            now_ms,
            delta_ms,
            config: &self.config,
            rng: &mut self.rng,
            commands: self.commands.drain(),
            overlap: self.overlap.as_ref(),
            events,
        };
        for resolver in &self.resolvers {
            trace!(tick = ctx.tick, stage = resolver.name(), "resolve");
            resolver.resolve(&mut ctx, &mut self.arena);
        }
        let events = ctx.events;

        let purged = self.arena.purge();
        if !purged.is_empty() {
            debug!(tick = self.tick, purged = purged.len(), "purged deactivated actors");
        }

        let report = TickReport {
            tick: self.tick,
            score: self.arena.score(),
            purged: purged.len(),
            events,
        };
        self.tick += 1;
        self.last_now = Some(now_ms);
        Ok(report)
    }

    fn check_clock(&self, now_ms: f64, delta_ms: f64) -> Result<(), SimError> {
        if !now_ms.is_finite() {
            return Err(SimError::NonFiniteClock { now_ms });
        }
        if !delta_ms.is_finite() || delta_ms < 0.0 {
            return Err(SimError::InvalidDelta { delta_ms });
        }
        match self.last_now {
            Some(previous_ms) if now_ms < previous_ms => Err(SimError::ClockRegressed { previous_ms, now_ms }),
            _ => Ok(()),
        }
    }

    /// Captures the current world for rendering.
    #[must_use]
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot::capture(&self.arena, self.tick)
    }

    /// Returns a read-only reference to the arena.
    #[must_use]
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Returns a mutable reference to the arena.
    ///
    /// Use this for setup between ticks. Resolvers own the arena during a step.
    #[must_use]
    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    /// Session score.
    #[must_use]
    pub fn score(&self) -> u64 {
        self.arena.score()
    }

    /// Number of completed ticks.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Seed the random source was created with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Names of the resolver stages in execution order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.resolvers.iter().map(|resolver| resolver.name()).collect()
    }
}

// =============================================================================
// Tests
// =============================================================================
