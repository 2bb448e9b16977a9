//! Serializable view of the world for the presentation layer.
//!
//! A [`WorldSnapshot`] holds only active actors, in spawn order, with
//! everything a renderer needs to draw them: position, heading, the sprite
//! angle, kind and bounding box.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::arena::{Arena, EmplacementId};
use crate::entity::{Actor, ActorId, ActorKind};
use crate::geometry::Aabb;

/// Render state of one active actor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActorView {
    /// Handle.
    pub id: ActorId,
    /// Kind of actor.
    pub kind: ActorKind,
    /// World position.
    pub position: Vec2,
    /// Facing in radians.
    pub heading: f32,
    /// Facing in degrees with the sprite offset applied.
    pub sprite_angle_degrees: f32,
    /// Body bounds, for debug drawing.
    pub bounds: Aabb,
}

impl From<&Actor> for ActorView {
    fn from(actor: &Actor) -> Self {
        Self {
            id: actor.id(),
            kind: actor.kind(),
            position: actor.position(),
            heading: actor.transform.heading,
            sprite_angle_degrees: actor.sprite_angle_degrees(),
            bounds: actor.bounds(),
        }
    }
}

/// Render state of one emplacement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmplacementView {
    /// Identifier.
    pub id: EmplacementId,
    /// Position.
    pub position: Vec2,
    /// Turret facing in radians.
    pub heading: f32,
    /// Targeting radius.
    pub range: f32,
}

/// Everything the host draws for one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Tick the snapshot was taken after.
    pub tick: u64,
    /// Session score.
    pub score: u64,
    /// Active actors in spawn order.
    pub actors: Vec<ActorView>,
    /// Emplacements in placement order.
    pub emplacements: Vec<EmplacementView>,
}

impl WorldSnapshot {
    /// Captures the arena's current state.
    #[must_use]
    pub fn capture(arena: &Arena, tick: u64) -> Self {
        Self {
            tick,
            score: arena.score(),
            actors: arena.active_actors().map(ActorView::from).collect(),
            emplacements: arena
                .emplacements()
                .iter()
                .map(|emplacement| EmplacementView {
                    id: emplacement.id(),
                    position: emplacement.position,
                    heading: emplacement.heading,
                    range: emplacement.weapon.profile.range,
                })
                .collect(),
        }
    }

    /// Looks up an actor by handle.
    #[must_use]
    pub fn actor(&self, id: ActorId) -> Option<&ActorView> {
        self.actors.iter().find(|view| view.id == id)
    }

    /// Number of visible actors of `kind`.
    #[must_use]
    pub fn count(&self, kind: ActorKind) -> usize {
        self.actors.iter().filter(|view| view.kind == kind).count()
    }
}
