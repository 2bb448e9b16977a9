//! Resolver module: the per-tick stages.
//!
//! Resolvers advance the simulation by mutating the [`Arena`] directly. The
//! simulation runs them once per tick in a fixed order:
//!
//! 1. [`MovementResolver`]: actors move
//! 2. [`FireControlResolver`]: commands are applied, weapons may fire
//! 3. [`CollisionResolver`]: hits resolve, expired projectiles are culled
//!
//! # Invariants
//!
//! - Targeting reads post-movement positions; collision sees projectiles
//!   spawned earlier in the same tick. Reordering the stages breaks both.
//! - Resolvers never remove actors. They deactivate them, and the simulation
//!   purges once after the last stage.
//! - Inactive actors are skipped by every stage.

mod collision;
mod fire_control;
mod movement;

pub use collision::CollisionResolver;
pub use fire_control::FireControlResolver;
pub use movement::MovementResolver;

use rand_chacha::ChaCha8Rng;

use crate::arena::Arena;
use crate::config::SimConfig;
use crate::entity::{ActorId, DeactivationReason};
use crate::geometry::OverlapTest;
use crate::output::{Command, Event, ScoreReason};

/// Everything a resolver may read or write besides the arena.
pub struct TickContext<'a> {
    /// Tick number.
    pub tick: u64,
    /// Clock time in milliseconds.
    pub now_ms: f64,
    /// Time since the previous tick in milliseconds.
    pub delta_ms: f64,
    /// Simulation configuration.
    pub config: &'a SimConfig,
    /// Seeded random source.
    pub rng: &'a mut ChaCha8Rng,
    /// Commands drained from the queue for this tick.
    pub commands: Vec<Command>,
    /// Overlap primitive.
    pub overlap: &'a dyn OverlapTest,
    /// Events emitted so far this tick.
    pub events: Vec<Event>,
}

impl TickContext<'_> {
    /// Elapsed time in seconds.
    #[must_use]
    pub fn delta_secs(&self) -> f32 {
        #[allow(clippy::cast_possible_truncation)]
        let secs = (self.delta_ms / 1000.0) as f32;
        secs
    }

    /// Deactivates an actor and records the event if it was still active.
    pub fn deactivate(&mut self, arena: &mut Arena, actor: ActorId, reason: DeactivationReason) -> bool {
        let changed = arena.deactivate(actor, reason);
        if changed {
            self.events.push(Event::Deactivated { actor, reason });
        }
        changed
    }

    /// Awards one point and records it.
    pub fn score(&mut self, arena: &mut Arena, reason: ScoreReason) {
        let total = arena.award_point();
        self.events.push(Event::Scored { reason, total });
    }
}

/// A stage of the simulation tick.
///
/// # Example
///
/// ```
/// use outpost_core::arena::Arena;
/// use outpost_core::resolver::{Resolver, TickContext};
///
/// struct Idle;
///
/// impl Resolver for Idle {
///     fn name(&self) -> &'static str {
///         "idle"
///     }
///
///     fn resolve(&self, _ctx: &mut TickContext<'_>, _arena: &mut Arena) {}
/// }
/// ```
pub trait Resolver: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Runs the stage for one tick.
    fn resolve(&self, ctx: &mut TickContext<'_>, arena: &mut Arena);
}
