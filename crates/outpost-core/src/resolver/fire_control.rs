//! Fire control resolver: host commands, then automatic weapons.
//!
//! # Order within the stage
//!
//! 1. Queued commands, in arrival order (placement, manual fire, melee)
//! 2. Emplacements, in placement order
//! 3. Weapon-carrying actors with an automatic trigger, in spawn order
//!
//! # Targeting
//!
//! Automatic weapons take the first target in spawn order strictly inside
//! their range, not the nearest one. Shots aim at the target's current
//! position with no lead. A weapon with nothing in range keeps its cooldown
//! untouched, so it fires the moment a target appears.

use glam::Vec2;
use tracing::{debug, trace};

use super::{Resolver, TickContext};
use crate::arena::{Arena, EmplacementId};
use crate::entity::{Actor, ActorId, Blueprint, DeactivationReason, Trigger, Weapon, WeaponProfile};
use crate::output::{Command, Event, ScoreReason, Shooter};

/// Applies commands and fires every ready weapon.
#[derive(Debug, Clone, Copy, Default)]
pub struct FireControlResolver;

impl FireControlResolver {
    /// Creates a new `FireControlResolver`.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Resolver for FireControlResolver {
    fn name(&self) -> &'static str {
        "fire_control"
    }

    fn resolve(&self, ctx: &mut TickContext<'_>, arena: &mut Arena) {
        for command in std::mem::take(&mut ctx.commands) {
            match command {
                Command::PlaceEmplacement { at } => place(ctx, arena, at),
                Command::Fire { shooter, aim } => fire_at_point(ctx, arena, shooter, aim),
                Command::Melee { attacker } => strike(ctx, arena, attacker),
            }
        }

        for id in arena.emplacement_ids() {
            emplacement_fire(ctx, arena, id);
        }

        for id in arena.ids() {
            actor_fire(ctx, arena, id);
        }
    }
}

/// Spawns a projectile leaving `origin` along the unit vector `direction`.
fn launch(arena: &mut Arena, origin: Vec2, direction: Vec2, profile: &WeaponProfile) -> ActorId {
    let velocity = direction * profile.projectile.speed;
    arena.spawn(Blueprint::projectile(
        origin + direction * profile.muzzle_offset,
        velocity,
        &profile.projectile,
        profile.targets,
    ))
}

fn place(ctx: &mut TickContext<'_>, arena: &mut Arena, at: Vec2) {
    let towers = &ctx.config.towers;
    match arena.place_emplacement(at, towers.slot_radius, Weapon::new(towers.weapon)) {
        Some((emplacement, slot)) => {
            debug!(?emplacement, slot, "emplacement placed");
            ctx.events.push(Event::EmplacementPlaced { emplacement, slot });
        }
        None => trace!(?at, "placement ignored, no free slot under pointer"),
    }
}

fn fire_at_point(ctx: &mut TickContext<'_>, arena: &mut Arena, shooter: ActorId, aim: Vec2) {
    let now = ctx.now_ms;
    let Some(actor) = arena.get_active(shooter) else {
        trace!(%shooter, "fire command from inactive shooter dropped");
        return;
    };
    let Some(weapon) = actor.weapon else {
        trace!(%shooter, "fire command from unarmed shooter dropped");
        return;
    };
    if !weapon.is_ready(now) {
        return;
    }
    let origin = actor.position();
    let direction = (aim - origin).normalize_or_zero();
    if direction == Vec2::ZERO {
        return;
    }

    let projectile = launch(arena, origin, direction, &weapon.profile);
    if let Some(actor) = arena.get_active_mut(shooter) {
        actor.transform.face(direction);
        if let Some(weapon) = actor.weapon.as_mut() {
            weapon.mark_fired(now);
        }
    }
    ctx.events.push(Event::Fired {
        shooter: Shooter::Actor(shooter),
        projectile,
        target: None,
    });
}

fn strike(ctx: &mut TickContext<'_>, arena: &mut Arena, attacker: ActorId) {
    let now = ctx.now_ms;
    let melee = ctx.config.melee;
    let Some(actor) = arena.get_active_mut(attacker) else {
        return;
    };
    if actor
        .last_melee_at
        .is_some_and(|last| now < last + melee.interval_ms)
    {
        return;
    }
    actor.last_melee_at = Some(now);
    let origin = actor.position();

    let Some(target) = arena.first_in_range(origin, melee.range, melee.targets, Some(attacker)) else {
        trace!(%attacker, "melee strike found nothing in reach");
        return;
    };
    let position = arena.get(target).map_or(origin, Actor::position);
    ctx.deactivate(arena, target, DeactivationReason::Hit);
    debug!(%attacker, %target, "melee hit");
    ctx.events.push(Event::MeleeHit { attacker, target });
    ctx.events.push(Event::Burst { position });
    ctx.score(arena, ScoreReason::MeleeHit);
}

fn emplacement_fire(ctx: &mut TickContext<'_>, arena: &mut Arena, id: EmplacementId) {
    let now = ctx.now_ms;
    let Some(emplacement) = arena.emplacement(id) else {
        return;
    };
    if !emplacement.weapon.is_ready(now) {
        return;
    }
    let origin = emplacement.position;
    let profile = emplacement.weapon.profile;
    let Some((target, to_target)) = acquire(arena, origin, &profile, None) else {
        return;
    };

    let projectile = launch(arena, origin, to_target.normalize_or_zero(), &profile);
    let mut visual = None;
    if let Some(emplacement) = arena.emplacement_mut(id) {
        emplacement.weapon.mark_fired(now);
        emplacement.heading = to_target.y.atan2(to_target.x);
        visual = emplacement.actor;
    }
    if let Some(actor) = visual.and_then(|visual| arena.get_active_mut(visual)) {
        actor.transform.face(to_target);
    }

    trace!(?id, %target, %projectile, "emplacement fired");
    ctx.events.push(Event::Fired {
        shooter: Shooter::Emplacement(id),
        projectile,
        target: Some(target),
    });
}

fn actor_fire(ctx: &mut TickContext<'_>, arena: &mut Arena, id: ActorId) {
    let now = ctx.now_ms;
    let Some(actor) = arena.get_active(id) else {
        return;
    };
    let Some(weapon) = actor.weapon else {
        return;
    };
    if weapon.profile.trigger != Trigger::Automatic || !weapon.is_ready(now) {
        return;
    }
    let origin = actor.position();
    let Some((target, to_target)) = acquire(arena, origin, &weapon.profile, Some(id)) else {
        return;
    };

    let projectile = launch(arena, origin, to_target.normalize_or_zero(), &weapon.profile);
    if let Some(actor) = arena.get_active_mut(id) {
        if let Some(weapon) = actor.weapon.as_mut() {
            weapon.mark_fired(now);
        }
    }

    trace!(%id, %target, %projectile, "actor fired");
    ctx.events.push(Event::Fired {
        shooter: Shooter::Actor(id),
        projectile,
        target: Some(target),
    });
}

/// First target in range and the offset from `origin` to it.
fn acquire(
    arena: &Arena,
    origin: Vec2,
    profile: &WeaponProfile,
    exclude: Option<ActorId>,
) -> Option<(ActorId, Vec2)> {
    let target = arena.first_in_range(origin, profile.range, profile.targets, exclude)?;
    let to_target = arena.get(target)?.position() - origin;
    Some((target, to_target))
}
