//! Simulation configuration.
//!
//! [`SimConfig`] gathers every tunable the resolvers read: the playfield, the
//! waypoint path, tower slots, weapon profiles, wander behavior and spawn
//! rules. It round-trips through JSON so maps can be authored outside the
//! code, and two presets reproduce the shipped prototypes:
//!
//! - [`SimConfig::tower_defense`]: the path-and-towers map
//! - [`SimConfig::arena_shooter`]: wandering enemies and a player gun
//!
//! # Example
//!
//! ```
//! use outpost_core::config::SimConfig;
//!
//! let config = SimConfig::tower_defense();
//! assert!(config.validate().is_ok());
//!
//! let json = config.to_json().unwrap();
//! let back = SimConfig::from_json(&json).unwrap();
//! assert_eq!(back.path.len(), config.path.len());
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entity::{Layers, ProjectileProfile, Trigger, WeaponProfile};
use crate::geometry::Aabb;

/// Per-field names for a weapon profile at `$prefix`: range, fire interval,
/// projectile speed and projectile lifespan.
macro_rules! weapon_fields {
    ($prefix:literal) => {
        [
            concat!($prefix, ".range"),
            concat!($prefix, ".fire_interval_ms"),
            concat!($prefix, ".projectile.speed"),
            concat!($prefix, ".projectile.lifespan_ms"),
        ]
    };
}

/// Errors raised while loading or validating a [`SimConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON document could not be parsed.
    #[error("invalid config document: {0}")]
    Parse(#[from] serde_json::Error),
    /// A rectangle has zero or negative area.
    #[error("{name} rectangle is degenerate: {rect:?}")]
    DegenerateRect {
        /// Which rectangle.
        name: &'static str,
        /// Offending value.
        rect: Aabb,
    },
    /// A value that must be positive is not.
    #[error("{name} must be positive, got {value}")]
    NotPositive {
        /// Which field.
        name: &'static str,
        /// Offending value.
        value: f64,
    },
    /// A path-follower spawn rule exists but the path has no waypoints.
    #[error("spawn rule {rule} spawns path followers but the path is empty")]
    EmptyPath {
        /// Index of the spawn rule.
        rule: usize,
    },
    /// A path-follower spawn rule starts past the end of the path.
    #[error("spawn rule {rule} starts at waypoint {start_index} but the path has {len} waypoints")]
    StartIndexOutOfRange {
        /// Index of the spawn rule.
        rule: usize,
        /// Configured start index.
        start_index: usize,
        /// Path length.
        len: usize,
    },
    /// The recycle margin is negative or not finite.
    #[error("recycle margin must be a finite, non-negative distance, got {margin}")]
    InvalidRecycleMargin {
        /// Offending value.
        margin: f32,
    },
    /// The recycle respawn region reaches past the recycle boundary, so a
    /// recycled wanderer could be recycled again on the next tick.
    #[error("recycle respawn {respawn:?} is not inside the recycle boundary {outer:?}")]
    RespawnOutsideBoundary {
        /// Configured respawn region.
        respawn: Aabb,
        /// `playfield.bounds` expanded by the margin.
        outer: Aabb,
    },
    /// A wanderer spawn rule exists but wanderers are neither confined nor
    /// recycled, so they drift away forever.
    #[error("spawn rule {rule} spawns wanderers but the playfield neither confines nor recycles them")]
    UnboundedWanderers {
        /// Index of the spawn rule.
        rule: usize,
    },
}

/// Playfield bounds and what happens at their edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayfieldConfig {
    /// Projectiles leaving this rectangle are culled.
    pub bounds: Aabb,
    /// Keep wanderers inside `bounds` (the host's world-bounds collision).
    #[serde(default)]
    pub confine_wanderers: bool,
    /// Wanderer recycling, if enabled.
    #[serde(default)]
    pub recycle: Option<RecycleConfig>,
}

/// Wanderers beyond `bounds.expand(margin)` score a point and respawn inside
/// `respawn`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecycleConfig {
    /// Distance past the playfield edge that triggers a recycle.
    pub margin: f32,
    /// Region recycled wanderers are moved into.
    pub respawn: Aabb,
}

/// Random-walk parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WanderConfig {
    /// Travel speed in units per second.
    pub speed: f32,
    /// Time between heading re-rolls in milliseconds.
    pub reroll_interval_ms: f64,
}

impl Default for WanderConfig {
    fn default() -> Self {
        Self {
            speed: 100.0,
            reroll_interval_ms: 1000.0,
        }
    }
}

/// Tower slot layout and the weapon every placed tower gets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TowerConfig {
    /// Slot centers.
    pub slots: Vec<Vec2>,
    /// A placement click must be strictly closer than this to a slot center.
    pub slot_radius: f32,
    /// Weapon for placed towers.
    pub weapon: WeaponProfile,
}

impl Default for TowerConfig {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            slot_radius: 25.0,
            weapon: WeaponProfile::default(),
        }
    }
}

/// Melee strike parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeleeConfig {
    /// Reach of the strike.
    pub range: f32,
    /// Minimum time between strikes from the same attacker.
    pub interval_ms: f64,
    /// Layers a strike can hit.
    pub targets: Layers,
}

impl Default for MeleeConfig {
    fn default() -> Self {
        Self {
            range: 40.0,
            interval_ms: 300.0,
            targets: Layers::HOSTILE,
        }
    }
}

/// What a spawn rule creates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SpawnKind {
    /// A path follower at the first waypoint.
    PathFollower {
        /// Waypoint index to approach first.
        start_index: usize,
        /// Travel speed in units per second.
        speed: f32,
    },
    /// A wanderer at a random point of `region`.
    Wanderer {
        /// Spawn region.
        region: Aabb,
    },
}

/// A repeating spawn timer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnRule {
    /// Period in milliseconds; the first spawn happens one period in.
    pub every_ms: f64,
    /// What to spawn.
    pub kind: SpawnKind,
    /// Weapon carried by spawned actors, if any.
    #[serde(default)]
    pub weapon: Option<WeaponProfile>,
}

/// Complete simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Playfield bounds and edge behavior.
    pub playfield: PlayfieldConfig,
    /// Shared waypoint sequence for path followers.
    #[serde(default)]
    pub path: Vec<Vec2>,
    /// Distance below which a waypoint counts as reached.
    pub arrival_threshold: f32,
    /// Random-walk parameters.
    #[serde(default)]
    pub wander: WanderConfig,
    /// Tower slots and tower weapon.
    #[serde(default)]
    pub towers: TowerConfig,
    /// Weapon given to the player actor.
    pub player_weapon: WeaponProfile,
    /// Melee strike parameters.
    #[serde(default)]
    pub melee: MeleeConfig,
    /// Spawn timers.
    #[serde(default)]
    pub spawns: Vec<SpawnRule>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            playfield: PlayfieldConfig {
                bounds: Aabb::from_size(800.0, 600.0),
                confine_wanderers: false,
                recycle: None,
            },
            path: Vec::new(),
            arrival_threshold: 4.0,
            wander: WanderConfig::default(),
            towers: TowerConfig::default(),
            player_weapon: player_gun(),
            melee: MeleeConfig::default(),
            spawns: Vec::new(),
        }
    }
}

fn player_gun() -> WeaponProfile {
    WeaponProfile {
        range: 1000.0,
        fire_interval_ms: 250.0,
        targets: Layers::HOSTILE,
        trigger: Trigger::Manual,
        muzzle_offset: 20.0,
        projectile: ProjectileProfile {
            speed: 500.0,
            lifespan_ms: 1000.0,
            half_extents: Vec2::splat(4.0),
        },
    }
}

impl SimConfig {
    /// The tower-defense map: an 800×600 field, a six-waypoint path, four
    /// tower slots and an enemy every 1.5 s.
    #[must_use]
    pub fn tower_defense() -> Self {
        Self {
            path: vec![
                Vec2::new(0.0, 300.0),
                Vec2::new(200.0, 300.0),
                Vec2::new(200.0, 500.0),
                Vec2::new(600.0, 500.0),
                Vec2::new(600.0, 100.0),
                Vec2::new(800.0, 100.0),
            ],
            towers: TowerConfig {
                slots: vec![
                    Vec2::new(150.0, 200.0),
                    Vec2::new(350.0, 400.0),
                    Vec2::new(500.0, 200.0),
                    Vec2::new(700.0, 400.0),
                ],
                slot_radius: 25.0,
                weapon: WeaponProfile::default(),
            },
            spawns: vec![SpawnRule {
                every_ms: 1500.0,
                kind: SpawnKind::PathFollower {
                    start_index: 1,
                    speed: 60.0,
                },
                weapon: None,
            }],
            ..Self::default()
        }
    }

    /// The shooter arena: wanderers spawn in the middle, leak past the edges
    /// for a point, and shoot back at the player.
    #[must_use]
    pub fn arena_shooter() -> Self {
        let bounds = Aabb::from_size(800.0, 600.0);
        let inner = Aabb::new(Vec2::new(100.0, 100.0), Vec2::new(700.0, 500.0));
        Self {
            playfield: PlayfieldConfig {
                bounds,
                confine_wanderers: false,
                recycle: Some(RecycleConfig {
                    margin: 50.0,
                    respawn: inner,
                }),
            },
            spawns: vec![SpawnRule {
                every_ms: 2000.0,
                kind: SpawnKind::Wanderer { region: inner },
                weapon: Some(WeaponProfile {
                    range: 250.0,
                    fire_interval_ms: 1500.0,
                    targets: Layers::PLAYER,
                    trigger: Trigger::Automatic,
                    muzzle_offset: 0.0,
                    projectile: ProjectileProfile {
                        speed: 250.0,
                        lifespan_ms: 1500.0,
                        half_extents: Vec2::splat(4.0),
                    },
                }),
            }],
            ..Self::default()
        }
    }

    /// Parses a configuration from JSON and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON, or any validation
    /// error from [`SimConfig::validate`].
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if serialization fails.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks the configuration for values the resolvers cannot work with.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_rect("playfield", self.playfield.bounds)?;
        if let Some(recycle) = &self.playfield.recycle {
            check_rect("recycle respawn", recycle.respawn)?;
            if !(recycle.margin.is_finite() && recycle.margin >= 0.0) {
                return Err(ConfigError::InvalidRecycleMargin { margin: recycle.margin });
            }
            let outer = self.playfield.bounds.expand(recycle.margin);
            if !outer.contains_rect(&recycle.respawn) {
                return Err(ConfigError::RespawnOutsideBoundary {
                    respawn: recycle.respawn,
                    outer,
                });
            }
        }
        check_positive("arrival_threshold", f64::from(self.arrival_threshold))?;
        check_positive("wander.speed", f64::from(self.wander.speed))?;
        check_positive("wander.reroll_interval_ms", self.wander.reroll_interval_ms)?;
        check_positive("towers.slot_radius", f64::from(self.towers.slot_radius))?;
        check_weapon(weapon_fields!("towers.weapon"), &self.towers.weapon)?;
        check_weapon(weapon_fields!("player_weapon"), &self.player_weapon)?;
        check_positive("melee.range", f64::from(self.melee.range))?;

        for (rule, spawn) in self.spawns.iter().enumerate() {
            check_positive("spawn.every_ms", spawn.every_ms)?;
            if let Some(weapon) = &spawn.weapon {
                check_weapon(weapon_fields!("spawn.weapon"), weapon)?;
            }
            match spawn.kind {
                SpawnKind::PathFollower { start_index, speed } => {
                    if self.path.is_empty() {
                        return Err(ConfigError::EmptyPath { rule });
                    }
                    if start_index >= self.path.len() {
                        return Err(ConfigError::StartIndexOutOfRange {
                            rule,
                            start_index,
                            len: self.path.len(),
                        });
                    }
                    check_positive("spawn.speed", f64::from(speed))?;
                }
                SpawnKind::Wanderer { region } => {
                    check_rect("spawn region", region)?;
                    if self.playfield.recycle.is_none() && !self.playfield.confine_wanderers {
                        return Err(ConfigError::UnboundedWanderers { rule });
                    }
                }
            }
        }
        Ok(())
    }
}

fn check_rect(name: &'static str, rect: Aabb) -> Result<(), ConfigError> {
    if rect.is_degenerate() {
        return Err(ConfigError::DegenerateRect { name, rect });
    }
    Ok(())
}

fn check_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    // NaN fails this comparison too.
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}

fn check_weapon(names: [&'static str; 4], weapon: &WeaponProfile) -> Result<(), ConfigError> {
    let [range, interval, speed, lifespan] = names;
    check_positive(range, f64::from(weapon.range))?;
    check_positive(interval, weapon.fire_interval_ms)?;
    check_positive(speed, f64::from(weapon.projectile.speed))?;
    check_positive(lifespan, weapon.projectile.lifespan_ms)
}
