//! Arena module: the entity registry.
//!
//! The Arena is the container for all simulation state the resolvers share:
//! - Actor storage with generational handles
//! - Spawn-order iteration (targeting scans are first-match in this order)
//! - Emplacements and the tower slots they are built on
//! - The session score
//!
//! # Mark, then purge
//!
//! Resolvers never remove actors while iterating. They call
//! [`Arena::deactivate`], which only flips the actor's lifecycle; the
//! simulation calls [`Arena::purge`] once at the end of the tick. Storage slots
//! freed by a purge are reused with a bumped generation, so an [`ActorId`]
//! held across the purge resolves to `None` rather than to a new actor.
//!
//! # Example
//!
//! ```
//! use outpost_core::arena::Arena;
//! use outpost_core::entity::{Blueprint, DeactivationReason};
//! use glam::Vec2;
//!
//! let mut arena = Arena::new();
//! let enemy = arena.spawn(Blueprint::wanderer(Vec2::new(100.0, 200.0)));
//! assert!(arena.get(enemy).is_some());
//!
//! arena.deactivate(enemy, DeactivationReason::Hit);
//! assert_eq!(arena.actor_count(), 1); // still stored until purge
//!
//! arena.purge();
//! assert!(arena.get(enemy).is_none());
//! ```

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::entity::{Actor, ActorId, Blueprint, DeactivationReason, Layers, Lifecycle, Weapon};

// =============================================================================
// Emplacements
// =============================================================================

/// Identifier of an emplacement. Emplacements are never removed, so this is a
/// plain index.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EmplacementId(u32);

impl EmplacementId {
    /// Creates an ID from a raw index.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Raw index.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for EmplacementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EmplacementId({})", self.0)
    }
}

/// A designated location where a tower may be built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TowerSlot {
    /// Center of the slot.
    pub position: Vec2,
    /// Emplacement built here, if any.
    pub occupant: Option<EmplacementId>,
}

/// A fixed-position weapon source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Emplacement {
    id: EmplacementId,
    /// Where the weapon sits.
    pub position: Vec2,
    /// Turret facing in radians. Cosmetic.
    pub heading: f32,
    /// Targeting and cooldown state.
    pub weapon: Weapon,
    /// Tower slot occupied, if it was placed through one.
    pub slot: Option<usize>,
    /// Static actor representing the tower visually.
    pub actor: Option<ActorId>,
}

impl Emplacement {
    /// The emplacement's identifier.
    #[must_use]
    pub const fn id(&self) -> EmplacementId {
        self.id
    }
}

// =============================================================================
// Arena
// =============================================================================

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    actor: Option<Actor>,
}

/// The entity registry shared by every resolver.
#[derive(Debug, Clone, Default)]
pub struct Arena {
    /// Actor storage indexed by `ActorId::index`.
    slots: Vec<Slot>,
    /// Storage indices available for reuse.
    free: Vec<u32>,
    /// Stored actors in spawn order.
    order: Vec<ActorId>,
    emplacements: Vec<Emplacement>,
    tower_slots: Vec<TowerSlot>,
    score: u64,
}

impl Arena {
    /// Creates an empty arena with no tower slots.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty arena with unoccupied tower slots at `positions`.
    #[must_use]
    pub fn with_tower_slots(positions: &[Vec2]) -> Self {
        Self {
            tower_slots: positions
                .iter()
                .map(|&position| TowerSlot {
                    position,
                    occupant: None,
                })
                .collect(),
            ..Self::default()
        }
    }

    // -------------------------------------------------------------------------
    // Actors
    // -------------------------------------------------------------------------

    /// Spawns an actor and returns its handle.
    ///
    /// The actor is appended to the iteration order, so it is visible to every
    /// later stage of the current tick.
    pub fn spawn(&mut self, blueprint: Blueprint) -> ActorId {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
                self.slots.push(Slot::default());
                index
            }
        };
        let slot = &mut self.slots[index as usize];
        let id = ActorId::new(index, slot.generation);
        let actor = Actor::from_blueprint(id, blueprint);
        trace!(%id, kind = %actor.kind(), position = ?actor.position(), "spawn");
        slot.actor = Some(actor);
        self.order.push(id);
        id
    }

    /// Returns the actor behind `id`, unless it has been purged.
    #[must_use]
    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.slots
            .get(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.actor.as_ref())
    }

    /// Mutable access to the actor behind `id`, unless it has been purged.
    #[must_use]
    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.slots
            .get_mut(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.actor.as_mut())
    }

    /// Returns the actor only if it is still active.
    #[must_use]
    pub fn get_active(&self, id: ActorId) -> Option<&Actor> {
        self.get(id).filter(|actor| actor.is_active())
    }

    /// Mutable access to the actor only if it is still active.
    #[must_use]
    pub fn get_active_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.get_mut(id).filter(|actor| actor.is_active())
    }

    /// Marks an actor inactive. Returns `true` on the first deactivation.
    pub fn deactivate(&mut self, id: ActorId, reason: DeactivationReason) -> bool {
        self.get_mut(id)
            .is_some_and(|actor| actor.deactivate(reason))
    }

    /// Handles of every stored actor in spawn order.
    ///
    /// This is a copy, so the caller may spawn or deactivate while walking it.
    #[must_use]
    pub fn ids(&self) -> Vec<ActorId> {
        self.order.clone()
    }

    /// Every stored actor in spawn order, including deactivated ones.
    pub fn actors(&self) -> impl Iterator<Item = &Actor> + '_ {
        self.order.iter().filter_map(move |&id| self.get(id))
    }

    /// Active actors in spawn order.
    pub fn active_actors(&self) -> impl Iterator<Item = &Actor> + '_ {
        self.actors().filter(|actor| actor.is_active())
    }

    /// The first active target in spawn order strictly closer than `range` to
    /// `origin` and on one of `mask`'s layers, skipping `exclude`.
    ///
    /// This is first-match, not nearest: a target further away but spawned
    /// earlier wins.
    #[must_use]
    pub fn first_in_range(
        &self,
        origin: Vec2,
        range: f32,
        mask: Layers,
        exclude: Option<ActorId>,
    ) -> Option<ActorId> {
        self.active_actors()
            .filter(|actor| Some(actor.id()) != exclude)
            .find(|actor| actor.is_target_for(mask) && origin.distance(actor.position()) < range)
            .map(Actor::id)
    }

    /// Removes every deactivated actor and returns who left and why.
    ///
    /// Freed storage slots get a new generation before reuse.
    pub fn purge(&mut self) -> Vec<(ActorId, DeactivationReason)> {
        let mut purged = Vec::new();
        for &id in &self.order {
            let slot = &mut self.slots[id.index() as usize];
            let Some(Lifecycle::Deactivated(reason)) = slot.actor.as_ref().map(Actor::lifecycle) else {
                continue;
            };
            slot.actor = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(id.index());
            purged.push((id, reason));
        }
        if !purged.is_empty() {
            let slots = &self.slots;
            self.order
                .retain(|id| slots[id.index() as usize].actor.is_some());
        }
        purged
    }

    /// Number of stored actors, active or awaiting purge.
    #[must_use]
    pub fn actor_count(&self) -> usize {
        self.order.len()
    }

    /// Number of active actors.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active_actors().count()
    }

    /// Returns `true` if no actors are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    // -------------------------------------------------------------------------
    // Emplacements
    // -------------------------------------------------------------------------

    /// Adds an emplacement outside the slot system (scripted maps, tests).
    pub fn add_emplacement(&mut self, position: Vec2, weapon: Weapon, actor: Option<ActorId>) -> EmplacementId {
        let id = EmplacementId::new(u32::try_from(self.emplacements.len()).unwrap_or(u32::MAX));
        self.emplacements.push(Emplacement {
            id,
            position,
            heading: 0.0,
            weapon,
            slot: None,
            actor,
        });
        id
    }

    /// Builds a tower on the first slot strictly within `radius` of `at`.
    ///
    /// Returns `None`, changing nothing, when no slot is under `at` or that
    /// slot is already occupied. On success a static actor is spawned on the
    /// STRUCTURE layer to represent the tower.
    pub fn place_emplacement(&mut self, at: Vec2, radius: f32, weapon: Weapon) -> Option<(EmplacementId, usize)> {
        let slot_index = self
            .tower_slots
            .iter()
            .position(|slot| slot.position.distance(at) < radius)?;
        if self.tower_slots[slot_index].occupant.is_some() {
            return None;
        }
        let position = self.tower_slots[slot_index].position;
        let actor = self.spawn(Blueprint::fixture(position).with_layer(Layers::STRUCTURE));
        let id = self.add_emplacement(position, weapon, Some(actor));
        self.emplacements[id.as_u32() as usize].slot = Some(slot_index);
        self.tower_slots[slot_index].occupant = Some(id);
        Some((id, slot_index))
    }

    /// Returns an emplacement by ID.
    #[must_use]
    pub fn emplacement(&self, id: EmplacementId) -> Option<&Emplacement> {
        self.emplacements.get(id.as_u32() as usize)
    }

    /// Mutable access to an emplacement by ID.
    #[must_use]
    pub fn emplacement_mut(&mut self, id: EmplacementId) -> Option<&mut Emplacement> {
        self.emplacements.get_mut(id.as_u32() as usize)
    }

    /// All emplacements in build order.
    #[must_use]
    pub fn emplacements(&self) -> &[Emplacement] {
        &self.emplacements
    }

    /// Emplacement IDs in build order.
    #[must_use]
    pub fn emplacement_ids(&self) -> Vec<EmplacementId> {
        self.emplacements.iter().map(Emplacement::id).collect()
    }

    /// All tower slots.
    #[must_use]
    pub fn tower_slots(&self) -> &[TowerSlot] {
        &self.tower_slots
    }

    // -------------------------------------------------------------------------
    // Score
    // -------------------------------------------------------------------------

    /// Current score. Never decreases.
    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    /// Adds one point and returns the new total.
    pub fn award_point(&mut self) -> u64 {
        self.score += 1;
        self.score
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::WeaponProfile;

    mod actor_storage {
        use super::*;

        #[test]
        fn new_creates_empty_arena() {
            let arena = Arena::new();
            assert!(arena.is_empty());
            assert_eq!(arena.actor_count(), 0);
            assert_eq!(arena.score(), 0);
        }

        #[test]
        fn spawn_assigns_sequential_indices() {
            let mut arena = Arena::new();
            let a = arena.spawn(Blueprint::wanderer(Vec2::ZERO));
            let b = arena.spawn(Blueprint::wanderer(Vec2::ZERO));

            assert_eq!(a, ActorId::new(0, 0));
            assert_eq!(b, ActorId::new(1, 0));
            assert_eq!(arena.ids(), vec![a, b]);
        }

        #[test]
        fn deactivated_actor_stays_until_purge() {
            let mut arena = Arena::new();
            let a = arena.spawn(Blueprint::wanderer(Vec2::ZERO));

            assert!(arena.deactivate(a, DeactivationReason::Hit));
            assert!(!arena.deactivate(a, DeactivationReason::Expired));
            assert!(arena.get(a).is_some());
            assert!(arena.get_active(a).is_none());
            assert_eq!(arena.active_count(), 0);

            let purged = arena.purge();
            assert_eq!(purged, vec![(a, DeactivationReason::Hit)]);
            assert!(arena.get(a).is_none());
            assert!(arena.is_empty());
        }

        #[test]
        fn purged_slot_reused_with_new_generation() {
            let mut arena = Arena::new();
            let old = arena.spawn(Blueprint::wanderer(Vec2::ZERO));
            arena.deactivate(old, DeactivationReason::Hit);
            arena.purge();

            let new = arena.spawn(Blueprint::wanderer(Vec2::ONE));
            assert_eq!(new.index(), old.index());
            assert_ne!(new.generation(), old.generation());
            assert!(arena.get(old).is_none());
            assert!(!arena.deactivate(old, DeactivationReason::Expired));
            assert!(arena.get_active(new).is_some());
        }

        #[test]
        fn purge_keeps_spawn_order_of_survivors() {
            let mut arena = Arena::new();
            let a = arena.spawn(Blueprint::wanderer(Vec2::ZERO));
            let b = arena.spawn(Blueprint::wanderer(Vec2::ZERO));
            let c = arena.spawn(Blueprint::wanderer(Vec2::ZERO));
            arena.deactivate(b, DeactivationReason::Hit);
            arena.purge();

            assert_eq!(arena.ids(), vec![a, c]);
        }

        #[test]
        fn purge_without_inactive_is_noop() {
            let mut arena = Arena::new();
            arena.spawn(Blueprint::wanderer(Vec2::ZERO));
            assert!(arena.purge().is_empty());
            assert_eq!(arena.actor_count(), 1);
        }
    }

    mod targeting {
        use super::*;

        #[test]
        fn first_match_not_nearest() {
            let mut arena = Arena::new();
            let far = arena.spawn(Blueprint::wanderer(Vec2::new(170.0, 0.0)));
            let _near = arena.spawn(Blueprint::wanderer(Vec2::new(50.0, 0.0)));

            assert_eq!(arena.first_in_range(Vec2::ZERO, 180.0, Layers::HOSTILE, None), Some(far));
        }

        #[test]
        fn range_is_strict() {
            let mut arena = Arena::new();
            arena.spawn(Blueprint::wanderer(Vec2::new(180.0, 0.0)));
            assert_eq!(arena.first_in_range(Vec2::ZERO, 180.0, Layers::HOSTILE, None), None);
        }

        #[test]
        fn skips_inactive_and_wrong_layers() {
            let mut arena = Arena::new();
            let dead = arena.spawn(Blueprint::wanderer(Vec2::new(10.0, 0.0)));
            arena.deactivate(dead, DeactivationReason::Hit);
            arena.spawn(Blueprint::fixture(Vec2::new(20.0, 0.0)).with_layer(Layers::STRUCTURE));
            let live = arena.spawn(Blueprint::wanderer(Vec2::new(30.0, 0.0)));

            assert_eq!(arena.first_in_range(Vec2::ZERO, 100.0, Layers::HOSTILE, None), Some(live));
            assert_eq!(arena.first_in_range(Vec2::ZERO, 100.0, Layers::PLAYER, None), None);
        }

        #[test]
        fn excluded_actor_is_skipped() {
            let mut arena = Arena::new();
            let me = arena.spawn(Blueprint::wanderer(Vec2::ZERO));
            let other = arena.spawn(Blueprint::wanderer(Vec2::new(10.0, 0.0)));

            assert_eq!(arena.first_in_range(Vec2::ZERO, 50.0, Layers::HOSTILE, None), Some(me));
            assert_eq!(arena.first_in_range(Vec2::ZERO, 50.0, Layers::HOSTILE, Some(me)), Some(other));
        }
    }

    mod emplacements {
        use super::*;

        fn weapon() -> Weapon {
            Weapon::new(WeaponProfile::default())
        }

        #[test]
        fn place_on_free_slot() {
            let mut arena = Arena::with_tower_slots(&[Vec2::new(150.0, 200.0), Vec2::new(350.0, 400.0)]);

            let (id, slot) = arena
                .place_emplacement(Vec2::new(160.0, 210.0), 25.0, weapon())
                .unwrap();
            assert_eq!(slot, 0);
            assert_eq!(arena.tower_slots()[0].occupant, Some(id));

            let emplacement = arena.emplacement(id).unwrap();
            assert_eq!(emplacement.position, Vec2::new(150.0, 200.0));
            let visual = arena.get(emplacement.actor.unwrap()).unwrap();
            assert_eq!(visual.layer, Layers::STRUCTURE);
        }

        #[test]
        fn occupied_slot_is_ignored() {
            let mut arena = Arena::with_tower_slots(&[Vec2::new(150.0, 200.0)]);
            assert!(arena.place_emplacement(Vec2::new(150.0, 200.0), 25.0, weapon()).is_some());
            assert!(arena.place_emplacement(Vec2::new(151.0, 200.0), 25.0, weapon()).is_none());
            assert_eq!(arena.emplacements().len(), 1);
            assert_eq!(arena.actor_count(), 1);
        }

        #[test]
        fn click_outside_slots_is_ignored() {
            let mut arena = Arena::with_tower_slots(&[Vec2::new(150.0, 200.0)]);
            assert!(arena.place_emplacement(Vec2::new(175.0, 200.0), 25.0, weapon()).is_none());
            assert!(arena.emplacements().is_empty());
        }

        #[test]
        fn award_point_is_monotonic() {
            let mut arena = Arena::new();
            assert_eq!(arena.award_point(), 1);
            assert_eq!(arena.award_point(), 2);
            assert_eq!(arena.score(), 2);
        }
    }
}
