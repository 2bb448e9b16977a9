//! Per-kind state components for actors.
//!
//! Each actor kind carries a fixed field set. Shared state (transform, body,
//! velocity) lives on [`Actor`](super::Actor) itself; the structs here hold
//! only what a single kind needs.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::Layers;

/// Position and facing of an actor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformState {
    /// World position.
    pub position: Vec2,
    /// Facing angle in radians, measured like `atan2(dy, dx)`.
    pub heading: f32,
}

impl TransformState {
    /// Creates a transform at `position` with the given heading.
    #[must_use]
    pub const fn new(position: Vec2, heading: f32) -> Self {
        Self { position, heading }
    }

    /// Points the heading along `direction`. A zero vector leaves it unchanged.
    pub fn face(&mut self, direction: Vec2) {
        if direction != Vec2::ZERO {
            self.heading = direction.y.atan2(direction.x);
        }
    }
}

/// State for an actor walking the shared waypoint sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathFollowerState {
    /// Index of the waypoint currently being approached.
    pub path_index: usize,
    /// Travel speed in units per second.
    pub speed: f32,
}

impl PathFollowerState {
    /// Creates a follower heading for `path_index` at `speed`.
    #[must_use]
    pub const fn new(path_index: usize, speed: f32) -> Self {
        Self { path_index, speed }
    }
}

/// State for an actor moving in random, periodically re-rolled directions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WandererState {
    /// Current direction of travel in radians.
    pub wander_heading: f32,
    /// Clock time (ms) after which the heading is re-rolled.
    pub wander_until: f64,
}

/// State for an in-flight projectile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileState {
    /// Remaining lifetime in milliseconds.
    pub lifespan_remaining: f64,
    /// Layers this projectile can resolve against.
    pub hits: Layers,
}

/// How a weapon decides to fire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trigger {
    /// Scans for targets every tick and fires on its own.
    #[default]
    Automatic,
    /// Fires only when a `Fire` command names its owner.
    Manual,
}

/// Projectile parameters stamped onto every shot a weapon fires.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileProfile {
    /// Launch speed in units per second.
    pub speed: f32,
    /// Lifetime in milliseconds.
    pub lifespan_ms: f64,
    /// Collision half extents.
    pub half_extents: Vec2,
}

impl Default for ProjectileProfile {
    fn default() -> Self {
        Self {
            speed: 400.0,
            lifespan_ms: 1000.0,
            half_extents: Vec2::splat(4.0),
        }
    }
}

/// Static description of a weapon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponProfile {
    /// Targeting radius. Targets must be strictly closer than this.
    pub range: f32,
    /// Minimum time between shots in milliseconds.
    pub fire_interval_ms: f64,
    /// Layers the weapon scans for and its projectiles can hit.
    pub targets: Layers,
    /// Automatic scan or command-driven.
    #[serde(default)]
    pub trigger: Trigger,
    /// Distance along the aim direction at which projectiles appear.
    #[serde(default)]
    pub muzzle_offset: f32,
    /// Shot parameters.
    #[serde(default)]
    pub projectile: ProjectileProfile,
}

impl Default for WeaponProfile {
    fn default() -> Self {
        Self {
            range: 180.0,
            fire_interval_ms: 500.0,
            targets: Layers::HOSTILE,
            trigger: Trigger::Automatic,
            muzzle_offset: 0.0,
            projectile: ProjectileProfile::default(),
        }
    }
}

/// A weapon profile plus its cooldown clock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    /// Static parameters.
    pub profile: WeaponProfile,
    /// Clock time (ms) of the last shot. Starts at zero.
    pub last_fired_at: f64,
}

impl Weapon {
    /// Creates a weapon that has never fired.
    #[must_use]
    pub const fn new(profile: WeaponProfile) -> Self {
        Self {
            profile,
            last_fired_at: 0.0,
        }
    }

    /// Returns `true` once `now >= last_fired_at + fire_interval_ms`.
    #[must_use]
    pub fn is_ready(&self, now: f64) -> bool {
        now >= self.last_fired_at + self.profile.fire_interval_ms
    }

    /// Records a shot at `now`.
    pub fn mark_fired(&mut self, now: f64) {
        self.last_fired_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weapon_ready_exactly_at_interval() {
        let mut weapon = Weapon::new(WeaponProfile::default());
        weapon.mark_fired(1000.0);

        assert!(!weapon.is_ready(1499.9));
        assert!(weapon.is_ready(1500.0));
    }

    #[test]
    fn fresh_weapon_waits_one_interval_from_zero() {
        let weapon = Weapon::new(WeaponProfile::default());
        assert!(!weapon.is_ready(100.0));
        assert!(weapon.is_ready(500.0));
    }

    #[test]
    fn face_ignores_zero_direction() {
        let mut transform = TransformState::new(Vec2::ZERO, 1.25);
        transform.face(Vec2::ZERO);
        assert!((transform.heading - 1.25).abs() < f32::EPSILON);

        transform.face(Vec2::new(0.0, 2.0));
        assert!((transform.heading - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn weapon_profile_deserializes_with_defaults() {
        let json = r#"{"range": 120.0, "fire_interval_ms": 250.0, "targets": "HOSTILE"}"#;
        let profile: WeaponProfile = serde_json::from_str(json).unwrap();

        assert_eq!(profile.trigger, Trigger::Automatic);
        assert!((profile.muzzle_offset).abs() < f32::EPSILON);
        assert_eq!(profile.projectile, ProjectileProfile::default());
    }
}
