//! Spawn schedule: repeating timers that add actors to the arena.
//!
//! Each [`SpawnRule`] owns an accumulator. Elapsed time is added every tick and
//! one actor is produced per whole period accumulated, so the first spawn
//! happens one period after the schedule starts and a long tick catches up on
//! every period it covered.

use rand::Rng;
use tracing::trace;

use crate::arena::Arena;
use crate::config::{SimConfig, SpawnKind, SpawnRule};
use crate::entity::{ActorId, Blueprint, Weapon};

#[derive(Debug, Clone, Copy, PartialEq)]
struct SpawnTimer {
    rule: SpawnRule,
    elapsed_ms: f64,
}

/// Timers for every configured spawn rule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpawnSchedule {
    timers: Vec<SpawnTimer>,
}

impl SpawnSchedule {
    /// Creates a schedule with one timer per rule, all starting at zero.
    #[must_use]
    pub fn new(rules: &[SpawnRule]) -> Self {
        Self {
            timers: rules
                .iter()
                .map(|&rule| SpawnTimer { rule, elapsed_ms: 0.0 })
                .collect(),
        }
    }

    /// Advances every timer by `delta_ms` and returns the rules that came due,
    /// in rule order. A rule appears once per period elapsed.
    pub fn advance(&mut self, delta_ms: f64) -> Vec<SpawnRule> {
        let mut due = Vec::new();
        for timer in &mut self.timers {
            if timer.rule.every_ms <= 0.0 {
                continue;
            }
            timer.elapsed_ms += delta_ms;
            while timer.elapsed_ms >= timer.rule.every_ms {
                timer.elapsed_ms -= timer.rule.every_ms;
                due.push(timer.rule);
            }
        }
        due
    }
}

/// Spawns the actor described by `rule`.
///
/// Path followers appear on the first waypoint. Returns `None` when a path
/// follower is requested but the path is empty.
pub fn spawn_from_rule<R: Rng + ?Sized>(
    rule: &SpawnRule,
    config: &SimConfig,
    arena: &mut Arena,
    rng: &mut R,
) -> Option<ActorId> {
    let mut blueprint = match rule.kind {
        SpawnKind::PathFollower { start_index, speed } => {
            let &start = config.path.first()?;
            Blueprint::path_follower(start, start_index, speed)
        }
        SpawnKind::Wanderer { region } => Blueprint::wanderer(region.random_point(rng)),
    };
    if let Some(profile) = rule.weapon {
        blueprint = blueprint.with_weapon(Weapon::new(profile));
    }
    let id = arena.spawn(blueprint);
    trace!(%id, "spawn rule fired");
    Some(id)
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::entity::ActorKind;
    use crate::geometry::Aabb;
    use crate::resolver::test_support::rng;

    fn wanderer_rule(every_ms: f64) -> SpawnRule {
        SpawnRule {
            every_ms,
            kind: SpawnKind::Wanderer {
                region: Aabb::new(Vec2::new(100.0, 100.0), Vec2::new(700.0, 500.0)),
            },
            weapon: None,
        }
    }

    #[test]
    fn first_spawn_after_one_period() {
        let mut schedule = SpawnSchedule::new(&[wanderer_rule(1500.0)]);

        assert!(schedule.advance(1000.0).is_empty());
        assert_eq!(schedule.advance(499.0).len(), 0);
        assert_eq!(schedule.advance(1.0).len(), 1);
        assert!(schedule.advance(16.0).is_empty());
    }

    #[test]
    fn long_tick_catches_up() {
        let mut schedule = SpawnSchedule::new(&[wanderer_rule(500.0)]);
        assert_eq!(schedule.advance(1600.0).len(), 3);
        assert_eq!(schedule.advance(400.0).len(), 1);
    }

    #[test]
    fn rules_fire_independently_in_order() {
        let fast = wanderer_rule(100.0);
        let slow = SpawnRule {
            every_ms: 250.0,
            ..wanderer_rule(0.0)
        };
        let mut schedule = SpawnSchedule::new(&[fast, slow]);

        let due = schedule.advance(250.0);
        assert_eq!(due, vec![fast, fast, slow]);
    }

    #[test]
    fn non_positive_period_never_fires() {
        let mut schedule = SpawnSchedule::new(&[wanderer_rule(0.0)]);
        assert!(schedule.advance(10_000.0).is_empty());
    }

    #[test]
    fn path_follower_spawns_on_first_waypoint() {
        let config = SimConfig::tower_defense();
        let mut arena = Arena::new();
        let rule = config.spawns[0];

        let id = spawn_from_rule(&rule, &config, &mut arena, &mut rng()).unwrap();
        let actor = arena.get(id).unwrap();
        assert_eq!(actor.kind(), ActorKind::PathFollower);
        assert_eq!(actor.position(), Vec2::new(0.0, 300.0));
        assert_eq!(actor.state.as_path_follower().unwrap().path_index, 1);
        assert!(actor.weapon.is_none());
    }

    #[test]
    fn path_follower_without_path_is_skipped() {
        let config = SimConfig::default();
        let rule = SimConfig::tower_defense().spawns[0];
        let mut arena = Arena::new();

        assert!(spawn_from_rule(&rule, &config, &mut arena, &mut rng()).is_none());
        assert!(arena.is_empty());
    }

    #[test]
    fn armed_wanderer_spawns_inside_region() {
        let config = SimConfig::arena_shooter();
        let rule = config.spawns[0];
        let mut arena = Arena::new();
        let mut rng = rng();

        for _ in 0..20 {
            let id = spawn_from_rule(&rule, &config, &mut arena, &mut rng).unwrap();
            let actor = arena.get(id).unwrap();
            assert!(Aabb::new(Vec2::new(100.0, 100.0), Vec2::new(700.0, 500.0)).contains(actor.position()));
            assert!(actor.weapon.is_some());
        }
    }
}
