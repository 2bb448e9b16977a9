//! Commands flowing into the simulation and events flowing out of it.
//!
//! # Architecture
//!
//! - [`Command`]: Host input (placement clicks, fire and melee buttons),
//!   buffered in a [`CommandQueue`] and drained once per tick by fire control
//! - [`Event`]: Notifications of what happened during a tick
//! - [`TickReport`]: The events of one tick plus the score after it
//!
//! Commands decouple input timing from simulation timing: the host may push
//! commands at any moment, and they take effect at the next tick's fire
//! control stage.
//!
//! # Example
//!
//! ```
//! use outpost_core::output::{Command, CommandQueue};
//! use glam::Vec2;
//!
//! let mut queue = CommandQueue::new();
//! queue.push(Command::PlaceEmplacement { at: Vec2::new(150.0, 200.0) });
//! assert_eq!(queue.len(), 1);
//!
//! let drained = queue.drain();
//! assert_eq!(drained.len(), 1);
//! assert!(queue.is_empty());
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::arena::EmplacementId;
use crate::entity::{ActorId, DeactivationReason};

// =============================================================================
// Commands
// =============================================================================

/// A discrete input from the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Build a tower on the free slot under `at`, if any.
    PlaceEmplacement {
        /// Pointer position in world space.
        at: Vec2,
    },
    /// Fire `shooter`'s weapon toward `aim`.
    Fire {
        /// Actor holding the weapon.
        shooter: ActorId,
        /// Aim point in world space.
        aim: Vec2,
    },
    /// Strike the first hostile in melee range of `attacker`.
    ///
    /// A landed strike deactivates the target and scores a point
    /// ([`ScoreReason::MeleeHit`]), the same as a projectile hit. Every
    /// attempt uses up the attacker's melee cooldown.
    Melee {
        /// Actor performing the strike.
        attacker: ActorId,
    },
}

/// FIFO buffer of host commands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandQueue {
    pending: Vec<Command>,
}

impl CommandQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a command.
    pub fn push(&mut self, command: Command) {
        self.pending.push(command);
    }

    /// Removes and returns every queued command in arrival order.
    pub fn drain(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.pending)
    }

    /// Number of queued commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

// =============================================================================
// Events
// =============================================================================

/// What fired a shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shooter {
    /// A tower emplacement.
    Emplacement(EmplacementId),
    /// A weapon-carrying actor.
    Actor(ActorId),
}

/// Why the score went up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreReason {
    /// A projectile struck a hostile.
    ProjectileHit,
    /// A melee strike landed.
    MeleeHit,
    /// A wanderer left the outer bounds and was recycled.
    Recycled,
}

/// Something that happened during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// A new actor entered the arena from a spawn rule.
    Spawned {
        /// The new actor.
        actor: ActorId,
    },
    /// A tower was built on a slot.
    EmplacementPlaced {
        /// The new emplacement.
        emplacement: EmplacementId,
        /// Slot index it occupies.
        slot: usize,
    },
    /// A weapon fired.
    Fired {
        /// Who fired.
        shooter: Shooter,
        /// The spawned projectile.
        projectile: ActorId,
        /// Target actor, for automatic fire.
        target: Option<ActorId>,
    },
    /// A projectile resolved against a target.
    Hit {
        /// The projectile.
        projectile: ActorId,
        /// The target.
        target: ActorId,
    },
    /// A melee strike removed a target.
    MeleeHit {
        /// The attacker.
        attacker: ActorId,
        /// The target.
        target: ActorId,
    },
    /// A hostile projectile reached the player. No gameplay effect.
    PlayerStruck {
        /// The projectile.
        projectile: ActorId,
        /// The player actor.
        player: ActorId,
    },
    /// Cosmetic impact burst for the presentation layer.
    Burst {
        /// Where to draw it.
        position: Vec2,
    },
    /// A wanderer was recycled back into the inner region.
    Recycled {
        /// The wanderer.
        actor: ActorId,
        /// Its new position.
        to: Vec2,
    },
    /// The score went up by one.
    Scored {
        /// Cause.
        reason: ScoreReason,
        /// Score after the increment.
        total: u64,
    },
    /// An actor was deactivated.
    Deactivated {
        /// The actor.
        actor: ActorId,
        /// Why.
        reason: DeactivationReason,
    },
}

/// Result of one simulation tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Tick number that just completed (the first tick is 0).
    pub tick: u64,
    /// Score after the tick.
    pub score: u64,
    /// Number of actors purged at the end of the tick.
    pub purged: usize,
    /// Events in the order they happened.
    pub events: Vec<Event>,
}

impl TickReport {
    /// Number of `Fired` events.
    #[must_use]
    pub fn shots_fired(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::Fired { .. }))
            .count()
    }

    /// Returns `true` if `actor` was deactivated during the tick.
    #[must_use]
    pub fn was_deactivated(&self, actor: ActorId) -> bool {
        self.deactivation_reason(actor).is_some()
    }

    /// Reason `actor` was deactivated during the tick, if it was.
    #[must_use]
    pub fn deactivation_reason(&self, actor: ActorId) -> Option<DeactivationReason> {
        self.events.iter().find_map(|e| match e {
            Event::Deactivated { actor: a, reason } if *a == actor => Some(*reason),
            _ => None,
        })
    }
}
