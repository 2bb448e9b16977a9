//! # Outpost Core
//!
//! Engine-agnostic simulation core for small top-down arena and tower-defense
//! games.
//!
//! This crate owns the gameplay rules: which actors exist, how they move,
//! when weapons fire, and what happens when projectiles hit. Rendering,
//! input devices and asset loading stay with the host, which feeds the core a
//! clock and commands and draws the snapshots it returns.
//!
//! ## Architecture
//!
//! - **Arena**: actors, emplacements, tower slots and the score
//! - **Resolvers**: movement, fire control, collision, run in that order
//! - **Simulation**: spawn schedule, command queue, seeded RNG and the tick loop
//!
//! ## Usage
//!
//! ```
//! use outpost_core::{Command, SimConfig, Simulation};
//! use glam::Vec2;
//!
//! let mut sim = Simulation::new(SimConfig::tower_defense(), 42)?;
//! sim.push_command(Command::PlaceEmplacement { at: Vec2::new(150.0, 200.0) });
//!
//! let mut now = 0.0;
//! for _ in 0..600 {
//!     now += 16.0;
//!     sim.step(now, 16.0)?;
//! }
//! println!("score: {}", sim.score());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod arena;
pub mod config;
pub mod entity;
pub mod geometry;
pub mod output;
pub mod resolver;
pub mod simulation;
pub mod snapshot;
pub mod spawn;

#[cfg(test)]
mod tests;

pub use arena::{Arena, EmplacementId};
pub use config::{ConfigError, SimConfig};
pub use entity::{ActorId, ActorKind, Blueprint, DeactivationReason, Layers};
pub use geometry::{Aabb, AabbOverlap, CircleOverlap, OverlapTest};
pub use output::{Command, Event, TickReport};
pub use simulation::{SimError, Simulation};
pub use snapshot::WorldSnapshot;
