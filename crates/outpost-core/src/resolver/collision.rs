//! Collision resolver: projectile hits and projectile culling.
//!
//! Each active projectile resolves against at most one target per tick: the
//! first actor in spawn order that is on one of the projectile's hit layers and
//! overlaps it. A projectile that survives the hit test then loses `delta` from
//! its lifespan and is culled when the lifespan runs out or it leaves the
//! playfield.
//!
//! Hostile fire reaching a player actor only removes the projectile. Player
//! damage is left to the host.

use tracing::{debug, trace};

use super::{Resolver, TickContext};
use crate::arena::Arena;
use crate::entity::{ActorId, DeactivationReason, Layers};
use crate::output::{Event, ScoreReason};

/// Resolves projectile hits and culls spent projectiles.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollisionResolver;

impl CollisionResolver {
    /// Creates a new `CollisionResolver`.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Resolver for CollisionResolver {
    fn name(&self) -> &'static str {
        "collision"
    }

    fn resolve(&self, ctx: &mut TickContext<'_>, arena: &mut Arena) {
        for id in arena.ids() {
            let Some(projectile) = arena.get_active(id) else {
                continue;
            };
            let Some(hits) = projectile.state.as_projectile().map(|state| state.hits) else {
                continue;
            };

            let target = arena
                .active_actors()
                .find(|other| {
                    other.id() != id && other.is_target_for(hits) && ctx.overlap.overlaps(projectile, other)
                })
                .map(|other| (other.id(), other.layer, other.position()));

            match target {
                Some((player, layer, _)) if layer.contains(Layers::PLAYER) => {
                    debug!(projectile = %id, %player, "hostile projectile struck the player");
                    ctx.deactivate(arena, id, DeactivationReason::Hit);
                    ctx.events.push(Event::PlayerStruck { projectile: id, player });
                }
                Some((target, _, position)) => {
                    trace!(projectile = %id, %target, "projectile hit");
                    ctx.deactivate(arena, id, DeactivationReason::Hit);
                    ctx.deactivate(arena, target, DeactivationReason::Hit);
                    ctx.events.push(Event::Hit { projectile: id, target });
                    ctx.events.push(Event::Burst { position });
                    ctx.score(arena, ScoreReason::ProjectileHit);
                }
                None => age(ctx, arena, id),
            }
        }
    }
}

fn age(ctx: &mut TickContext<'_>, arena: &mut Arena, id: ActorId) {
    let bounds = ctx.config.playfield.bounds;
    let Some(actor) = arena.get_active_mut(id) else {
        return;
    };
    let Some(state) = actor.state.as_projectile_mut() else {
        return;
    };
    state.lifespan_remaining -= ctx.delta_ms;

    let reason = if state.lifespan_remaining <= 0.0 {
        DeactivationReason::Expired
    } else if !bounds.contains(actor.position()) {
        DeactivationReason::OutOfBounds
    } else {
        return;
    };
    ctx.deactivate(arena, id, reason);
}
