//! Movement resolver: path following, wandering and projectile flight.
//!
//! # Path following
//!
//! A path follower heads for `path[path_index]`, moving `speed * dt` but never
//! past the waypoint. Once within the arrival threshold the index advances;
//! advancing past the last waypoint deactivates the actor with
//! [`DeactivationReason::ReachedEnd`]. A follower whose index is already out of
//! range when the tick starts is deactivated the same way.
//!
//! # Wandering
//!
//! A wanderer re-rolls a uniform heading in `[0, 2π)` whenever the clock passes
//! `wander_until`, then holds it for the reroll interval. Velocity is reapplied
//! from the heading every tick. With recycling enabled, a wanderer beyond the
//! outer rectangle scores a point and is moved back inside.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use tracing::debug;

use super::{Resolver, TickContext};
use crate::arena::Arena;
use crate::entity::{ActorId, ActorKind, ActorState, DeactivationReason};
use crate::output::{Event, ScoreReason};

/// Advances every active actor's position.
#[derive(Debug, Clone, Copy, Default)]
pub struct MovementResolver;

impl MovementResolver {
    /// Creates a new `MovementResolver`.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Resolver for MovementResolver {
    fn name(&self) -> &'static str {
        "movement"
    }

    fn resolve(&self, ctx: &mut TickContext<'_>, arena: &mut Arena) {
        let dt = ctx.delta_secs();
        for id in arena.ids() {
            let Some(kind) = arena.get_active(id).map(|actor| actor.kind()) else {
                continue;
            };
            match kind {
                ActorKind::PathFollower => follow_path(ctx, arena, id, dt),
                ActorKind::Wanderer => wander(ctx, arena, id, dt),
                ActorKind::Projectile => drift(arena, id, dt),
                ActorKind::Static => {}
            }
        }
    }
}

fn follow_path(ctx: &mut TickContext<'_>, arena: &mut Arena, id: ActorId, dt: f32) {
    let config = ctx.config;
    let path = &config.path;
    let Some(actor) = arena.get_active_mut(id) else {
        return;
    };
    let ActorState::PathFollower(follower) = &mut actor.state else {
        return;
    };

    let reached_end = match path.get(follower.path_index) {
        None => true,
        Some(&waypoint) => {
            let to_waypoint = waypoint - actor.transform.position;
            let distance = to_waypoint.length();
            actor.transform.face(to_waypoint);
            if distance > 0.0 {
                let direction = to_waypoint / distance;
                actor.transform.position += direction * (follower.speed * dt).min(distance);
                actor.velocity = direction * follower.speed;
            } else {
                actor.velocity = Vec2::ZERO;
            }

            if actor.transform.position.distance(waypoint) < config.arrival_threshold {
                follower.path_index += 1;
            }
            follower.path_index >= path.len()
        }
    };

    if reached_end && ctx.deactivate(arena, id, DeactivationReason::ReachedEnd) {
        debug!(%id, "path follower reached the end of the path");
    }
}

fn wander(ctx: &mut TickContext<'_>, arena: &mut Arena, id: ActorId, dt: f32) {
    let config = ctx.config;
    let now = ctx.now_ms;
    let Some(actor) = arena.get_active_mut(id) else {
        return;
    };
    let ActorState::Wanderer(wanderer) = &mut actor.state else {
        return;
    };

    if now > wanderer.wander_until {
        wanderer.wander_heading = ctx.rng.gen_range(0.0..TAU);
        wanderer.wander_until = now + config.wander.reroll_interval_ms;
    }
    let velocity = Vec2::from_angle(wanderer.wander_heading) * config.wander.speed;
    actor.velocity = velocity;
    actor.transform.face(velocity);
    actor.transform.position += velocity * dt;

    let bounds = config.playfield.bounds;
    if config.playfield.confine_wanderers {
        actor.transform.position = bounds.clamp(actor.transform.position);
    }

    let Some(recycle) = config.playfield.recycle else {
        return;
    };
    if bounds.expand(recycle.margin).contains(actor.transform.position) {
        return;
    }
    let to = recycle.respawn.random_point(&mut *ctx.rng);
    actor.transform.position = to;
    actor.velocity = Vec2::ZERO;

    debug!(%id, ?to, "wanderer left the field and was recycled");
    ctx.events.push(Event::Recycled { actor: id, to });
    ctx.score(arena, ScoreReason::Recycled);
}

fn drift(arena: &mut Arena, id: ActorId, dt: f32) {
    if let Some(actor) = arena.get_active_mut(id) {
        actor.transform.position += actor.velocity * dt;
    }
}
