//! Entity module for the movement and combat loop.
//!
//! This module provides the actor types the simulation operates on:
//! - [`ActorId`]: Generational handle into the [`Arena`](crate::arena::Arena)
//! - [`ActorKind`]: Type classification used by the resolvers
//! - [`ActorState`]: Tagged per-kind state (path follower, wanderer, ...)
//! - [`Actor`]: The complete actor container
//! - [`Blueprint`]: Everything needed to spawn an actor
//!
//! # Architecture
//!
//! Each kind owns a fixed field set selected through [`ActorState`]; there is
//! no dynamic property attachment. Shared state (transform, body, velocity,
//! layer, optional weapon) lives on [`Actor`].
//!
//! # Example
//!
//! ```
//! use outpost_core::entity::{ActorKind, Blueprint};
//! use glam::Vec2;
//!
//! let blueprint = Blueprint::path_follower(Vec2::new(0.0, 300.0), 0, 60.0);
//! assert_eq!(blueprint.state.kind(), ActorKind::PathFollower);
//! ```

pub mod components;

use std::fmt;

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::geometry::Aabb;

pub use components::{
    PathFollowerState, ProjectileProfile, ProjectileState, TransformState, Trigger,
    WandererState, Weapon, WeaponProfile,
};

// =============================================================================
// ActorId
// =============================================================================

/// Generational handle to an actor stored in the arena.
///
/// The `index` names a storage slot; the `generation` is bumped every time
/// the slot is purged, so a handle to a purged actor never resolves to a
/// later occupant of the same slot.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId {
    index: u32,
    generation: u32,
}

impl ActorId {
    /// Creates a handle from raw parts.
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Storage slot index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Slot generation this handle was issued for.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActorId({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

// =============================================================================
// Classification
// =============================================================================

/// Actor type tag.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorKind {
    /// Walks the shared waypoint sequence.
    PathFollower,
    /// Moves in a random direction re-rolled on a timer.
    Wanderer,
    /// Does not move on its own (towers, the player).
    Static,
    /// Fire-and-forget shot.
    Projectile,
}

impl fmt::Display for ActorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PathFollower => write!(f, "PathFollower"),
            Self::Wanderer => write!(f, "Wanderer"),
            Self::Static => write!(f, "Static"),
            Self::Projectile => write!(f, "Projectile"),
        }
    }
}

bitflags! {
    /// Collision and targeting layers.
    ///
    /// An actor sits on one or more layers; weapons and projectiles carry a
    /// mask of the layers they may engage.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Layers: u8 {
        /// Enemies: path followers and wanderers.
        const HOSTILE = 1 << 0;
        /// The player-controlled actor.
        const PLAYER = 1 << 1;
        /// Tower visuals and other scenery.
        const STRUCTURE = 1 << 2;
    }
}

impl Default for Layers {
    fn default() -> Self {
        Self::empty()
    }
}

/// Why an actor left the simulation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeactivationReason {
    /// Walked past the final waypoint.
    ReachedEnd,
    /// Lifespan ran out.
    Expired,
    /// Left the playfield.
    OutOfBounds,
    /// Struck by a projectile or a melee attack, or was the projectile.
    Hit,
}

impl fmt::Display for DeactivationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReachedEnd => write!(f, "reached-end"),
            Self::Expired => write!(f, "expired"),
            Self::OutOfBounds => write!(f, "out-of-bounds"),
            Self::Hit => write!(f, "hit"),
        }
    }
}

/// Actor lifecycle. Transitions only go forward; purge removes the actor.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lifecycle {
    /// Taking part in the simulation.
    #[default]
    Active,
    /// Logically removed, waiting for the end-of-tick purge.
    Deactivated(DeactivationReason),
}

// =============================================================================
// ActorState
// =============================================================================

/// Kind-specific actor state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActorState {
    /// Path follower state.
    PathFollower(PathFollowerState),
    /// Wanderer state.
    Wanderer(WandererState),
    /// Static actors carry no extra state.
    Static,
    /// Projectile state.
    Projectile(ProjectileState),
}

impl ActorState {
    /// Returns the matching [`ActorKind`].
    #[must_use]
    pub const fn kind(&self) -> ActorKind {
        match self {
            Self::PathFollower(_) => ActorKind::PathFollower,
            Self::Wanderer(_) => ActorKind::Wanderer,
            Self::Static => ActorKind::Static,
            Self::Projectile(_) => ActorKind::Projectile,
        }
    }

    /// Path follower state, if this is a path follower.
    #[must_use]
    pub const fn as_path_follower(&self) -> Option<&PathFollowerState> {
        match self {
            Self::PathFollower(state) => Some(state),
            _ => None,
        }
    }

    /// Wanderer state, if this is a wanderer.
    #[must_use]
    pub const fn as_wanderer(&self) -> Option<&WandererState> {
        match self {
            Self::Wanderer(state) => Some(state),
            _ => None,
        }
    }

    /// Projectile state, if this is a projectile.
    #[must_use]
    pub const fn as_projectile(&self) -> Option<&ProjectileState> {
        match self {
            Self::Projectile(state) => Some(state),
            _ => None,
        }
    }

    /// Mutable projectile state, if this is a projectile.
    #[must_use]
    pub fn as_projectile_mut(&mut self) -> Option<&mut ProjectileState> {
        match self {
            Self::Projectile(state) => Some(state),
            _ => None,
        }
    }
}

// =============================================================================
// Blueprint
// =============================================================================

/// Everything the arena needs to spawn an actor.
///
/// # Example
///
/// ```
/// use outpost_core::entity::{Blueprint, Layers, Weapon, WeaponProfile};
/// use glam::Vec2;
///
/// let tower = Blueprint::fixture(Vec2::new(150.0, 200.0))
///     .with_layer(Layers::STRUCTURE)
///     .with_weapon(Weapon::new(WeaponProfile::default()));
/// assert!(tower.weapon.is_some());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Blueprint {
    /// Initial transform.
    pub transform: TransformState,
    /// Initial velocity in units per second.
    pub velocity: Vec2,
    /// Half extents of the body used for overlap and debug bounds.
    pub half_extents: Vec2,
    /// Layers the actor sits on.
    pub layer: Layers,
    /// Optional weapon.
    pub weapon: Option<Weapon>,
    /// Kind-specific state.
    pub state: ActorState,
}

impl Blueprint {
    /// Default half extents for enemies and fixtures (a 32×32 sprite).
    pub const DEFAULT_HALF_EXTENTS: Vec2 = Vec2::splat(16.0);

    fn base(position: Vec2, state: ActorState) -> Self {
        Self {
            transform: TransformState::new(position, 0.0),
            velocity: Vec2::ZERO,
            half_extents: Self::DEFAULT_HALF_EXTENTS,
            layer: Layers::empty(),
            weapon: None,
            state,
        }
    }

    /// A hostile path follower approaching waypoint `path_index`.
    #[must_use]
    pub fn path_follower(position: Vec2, path_index: usize, speed: f32) -> Self {
        Self::base(
            position,
            ActorState::PathFollower(PathFollowerState::new(path_index, speed)),
        )
        .with_layer(Layers::HOSTILE)
    }

    /// A hostile wanderer that rolls its first heading on the next tick.
    #[must_use]
    pub fn wanderer(position: Vec2) -> Self {
        Self::base(position, ActorState::Wanderer(WandererState::default()))
            .with_layer(Layers::HOSTILE)
    }

    /// A non-moving actor (tower visual, player).
    #[must_use]
    pub fn fixture(position: Vec2) -> Self {
        Self::base(position, ActorState::Static)
    }

    /// A projectile moving at `velocity`, facing its direction of travel.
    #[must_use]
    pub fn projectile(position: Vec2, velocity: Vec2, profile: &ProjectileProfile, hits: Layers) -> Self {
        let mut blueprint = Self::base(
            position,
            ActorState::Projectile(ProjectileState {
                lifespan_remaining: profile.lifespan_ms,
                hits,
            }),
        );
        blueprint.transform.face(velocity);
        blueprint.velocity = velocity;
        blueprint.half_extents = profile.half_extents;
        blueprint
    }

    /// Replaces the layer set.
    #[must_use]
    pub fn with_layer(mut self, layer: Layers) -> Self {
        self.layer = layer;
        self
    }

    /// Attaches a weapon.
    #[must_use]
    pub fn with_weapon(mut self, weapon: Weapon) -> Self {
        self.weapon = Some(weapon);
        self
    }

    /// Overrides the body half extents.
    #[must_use]
    pub fn with_half_extents(mut self, half_extents: Vec2) -> Self {
        self.half_extents = half_extents;
        self
    }
}

// =============================================================================
// Actor
// =============================================================================

/// A simulated entity with position and lifecycle.
///
/// Actors are created by [`Arena::spawn`](crate::arena::Arena::spawn) from a
/// [`Blueprint`]; the arena assigns the [`ActorId`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    id: ActorId,
    /// Position and facing.
    pub transform: TransformState,
    /// Velocity in units per second.
    pub velocity: Vec2,
    /// Body half extents.
    pub half_extents: Vec2,
    /// Layers the actor sits on.
    pub layer: Layers,
    /// Optional weapon.
    pub weapon: Option<Weapon>,
    /// Clock time (ms) of the last melee strike, if any.
    pub last_melee_at: Option<f64>,
    /// Kind-specific state.
    pub state: ActorState,
    lifecycle: Lifecycle,
}

impl Actor {
    /// Builds an active actor from a blueprint.
    #[must_use]
    pub fn from_blueprint(id: ActorId, blueprint: Blueprint) -> Self {
        Self {
            id,
            transform: blueprint.transform,
            velocity: blueprint.velocity,
            half_extents: blueprint.half_extents,
            layer: blueprint.layer,
            weapon: blueprint.weapon,
            last_melee_at: None,
            state: blueprint.state,
            lifecycle: Lifecycle::Active,
        }
    }

    /// The actor's handle.
    #[must_use]
    pub const fn id(&self) -> ActorId {
        self.id
    }

    /// The actor's type tag.
    #[must_use]
    pub const fn kind(&self) -> ActorKind {
        self.state.kind()
    }

    /// World position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.transform.position
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Returns `true` while the actor has not been deactivated.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Active)
    }

    /// Deactivates the actor. Returns `false` if it was already inactive,
    /// in which case the original reason is kept.
    pub fn deactivate(&mut self, reason: DeactivationReason) -> bool {
        if self.is_active() {
            self.lifecycle = Lifecycle::Deactivated(reason);
            true
        } else {
            false
        }
    }

    /// Returns `true` if the actor is a valid target: active, not a
    /// projectile, and on one of `mask`'s layers.
    #[must_use]
    pub fn is_target_for(&self, mask: Layers) -> bool {
        self.is_active() && self.kind() != ActorKind::Projectile && self.layer.intersects(mask)
    }

    /// Axis-aligned bounding box of the body.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.transform.position, self.half_extents)
    }

    /// Facing angle in degrees with the sprite-alignment offset applied.
    ///
    /// Sprites are drawn pointing up, so the presentation angle is the
    /// heading minus 90°.
    #[must_use]
    pub fn sprite_angle_degrees(&self) -> f32 {
        self.transform.heading.to_degrees() - 90.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(blueprint: Blueprint) -> Actor {
        Actor::from_blueprint(ActorId::new(0, 0), blueprint)
    }

    #[test]
    fn kind_follows_state_variant() {
        assert_eq!(
            actor(Blueprint::path_follower(Vec2::ZERO, 0, 60.0)).kind(),
            ActorKind::PathFollower
        );
        assert_eq!(actor(Blueprint::wanderer(Vec2::ZERO)).kind(), ActorKind::Wanderer);
        assert_eq!(actor(Blueprint::fixture(Vec2::ZERO)).kind(), ActorKind::Static);
        assert_eq!(
            actor(Blueprint::projectile(
                Vec2::ZERO,
                Vec2::X,
                &ProjectileProfile::default(),
                Layers::HOSTILE
            ))
            .kind(),
            ActorKind::Projectile
        );
    }

    #[test]
    fn deactivate_keeps_first_reason() {
        let mut a = actor(Blueprint::wanderer(Vec2::ZERO));
        assert!(a.deactivate(DeactivationReason::Hit));
        assert!(!a.deactivate(DeactivationReason::Expired));
        assert_eq!(a.lifecycle(), Lifecycle::Deactivated(DeactivationReason::Hit));
        assert!(!a.is_active());
    }

    #[test]
    fn projectiles_are_never_targets() {
        let shot = actor(
            Blueprint::projectile(Vec2::ZERO, Vec2::X, &ProjectileProfile::default(), Layers::HOSTILE)
                .with_layer(Layers::HOSTILE),
        );
        assert!(!shot.is_target_for(Layers::all()));
    }

    #[test]
    fn target_requires_layer_overlap() {
        let enemy = actor(Blueprint::wanderer(Vec2::ZERO));
        assert!(enemy.is_target_for(Layers::HOSTILE));
        assert!(enemy.is_target_for(Layers::HOSTILE | Layers::PLAYER));
        assert!(!enemy.is_target_for(Layers::PLAYER));
    }

    #[test]
    fn sprite_angle_applies_offset() {
        let mut a = actor(Blueprint::fixture(Vec2::ZERO));
        a.transform.face(Vec2::new(1.0, 0.0));
        assert!((a.sprite_angle_degrees() + 90.0).abs() < 1e-4);
        a.transform.face(Vec2::new(0.0, 1.0));
        assert!(a.sprite_angle_degrees().abs() < 1e-4);
    }

    #[test]
    fn projectile_blueprint_faces_velocity() {
        let bp = Blueprint::projectile(
            Vec2::ZERO,
            Vec2::new(0.0, -400.0),
            &ProjectileProfile::default(),
            Layers::HOSTILE,
        );
        assert!((bp.transform.heading + std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert_eq!(bp.half_extents, ProjectileProfile::default().half_extents);
    }

    #[test]
    fn bounds_centered_on_position() {
        let a = actor(Blueprint::fixture(Vec2::new(100.0, 50.0)).with_half_extents(Vec2::new(10.0, 5.0)));
        let b = a.bounds();
        assert_eq!(b.min, Vec2::new(90.0, 45.0));
        assert_eq!(b.max, Vec2::new(110.0, 55.0));
    }

    #[test]
    fn layers_serialize_as_names() {
        let json = serde_json::to_string(&(Layers::HOSTILE | Layers::PLAYER)).unwrap();
        let back: Layers = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Layers::HOSTILE | Layers::PLAYER);
    }
}
