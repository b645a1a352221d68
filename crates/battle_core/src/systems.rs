//! Per-tick simulation systems.
//!
//! Each system is a plain function over the entity slice and handles one
//! phase of the tick. [`crate::step::step`] runs them in order:
//!
//! 1. [`skill_system`]
//! 2. [`radius_system`]
//! 3. [`targeting_system`] then [`movement_system`]
//! 4. [`special_move_system`]
//! 5. [`collision_system`]
//! 6. [`elimination_system`]
//! 7. [`rage_system`]
//!
//! Eliminated entities stay in the slice and every system skips them.
//! Lookups that index by slice position ([`TickContext::skills`],
//! [`TickContext::specials`]) are aligned with the entity slice.

use rand::Rng;
use tracing::debug;

use crate::combat::{
    crit_knockback, drain_heal, resolve_hit, AttackProfile, DefenseProfile, HitKind, HitOutcome,
};
use crate::components::{EntityId, Marble};
use crate::config::{ArenaConfig, BattleConfig};
use crate::cooldown::PairCooldown;
use crate::events::{EventKind, SimulationEvent};
use crate::math::{Vec2, EPSILON};
use crate::skills::{PeriodicEffect, Skill, ThresholdEffect};
use crate::special_moves::SpecialMoveKind;

/// Read-only inputs shared by every system during one tick.
#[derive(Debug, Clone, Copy)]
pub struct TickContext<'a> {
    /// Tick being simulated.
    pub tick: u64,
    /// Match configuration.
    pub config: &'a BattleConfig,
    /// Skill of each entity, aligned with the entity slice.
    pub skills: &'a [Skill],
    /// Special move of each entity, aligned with the entity slice.
    pub specials: &'a [SpecialMoveKind],
}

/// Slice position of the entity with `id`.
#[must_use]
pub fn find_index(marbles: &[Marble], id: EntityId) -> Option<usize> {
    marbles.iter().position(|m| m.id == id)
}

/// Slice position of `marble`'s target if it is still alive.
fn live_target(marbles: &[Marble], marble: &Marble) -> Option<usize> {
    marble
        .targeting
        .target
        .and_then(|id| find_index(marbles, id))
        .filter(|&t| marbles[t].alive)
}

/// Two distinct mutable entities. Requires `i < j`.
fn pair_mut(marbles: &mut [Marble], i: usize, j: usize) -> (&mut Marble, &mut Marble) {
    debug_assert!(i < j);
    let (left, right) = marbles.split_at_mut(j);
    (&mut left[i], &mut right[0])
}

/// Share of incoming knockback an entity keeps (damped while fortified).
fn knockback_retention(marble: &Marble, kind: SpecialMoveKind, config: &BattleConfig) -> f64 {
    if kind == SpecialMoveKind::Fortress && marble.special.is_active() {
        config.special_moves.fortress_knockback_retention
    } else {
        1.0
    }
}

/// Heal amount for `fraction` of `max_health`, at least 1.
fn scaled_heal(max_health: u32, fraction: f64) -> u32 {
    if fraction <= 0.0 {
        return 0;
    }
    (f64::from(max_health) * fraction).round().max(1.0) as u32
}

// ============================================================================
// Phase 1: skills
// ============================================================================

/// Advance skill timers and fire periodic and threshold skills.
pub fn skill_system<R: Rng + ?Sized>(
    marbles: &mut [Marble],
    ctx: &TickContext<'_>,
    rng: &mut R,
    events: &mut Vec<SimulationEvent>,
) {
    for i in 0..marbles.len() {
        if !marbles[i].alive {
            continue;
        }
        let skill = ctx.skills[i];
        marbles[i].skill.tick_buff();

        match skill {
            Skill::Periodic { interval, effect } => {
                if marbles[i].skill.advance_timer(interval) {
                    marbles[i].skill.triggers += 1;
                    apply_periodic(marbles, i, effect, ctx.tick, rng, events);
                }
            }
            Skill::Threshold { .. } => {
                trigger_threshold(&mut marbles[i], &skill, ctx.tick, events);
            }
            _ => {}
        }
    }
}

fn apply_periodic<R: Rng + ?Sized>(
    marbles: &mut [Marble],
    index: usize,
    effect: PeriodicEffect,
    tick: u64,
    rng: &mut R,
    events: &mut Vec<SimulationEvent>,
) {
    match effect {
        PeriodicEffect::Heal { fraction } => {
            let marble = &mut marbles[index];
            let restored = marble.heal(scaled_heal(marble.max_health, fraction));
            events.push(
                SimulationEvent::new(
                    tick,
                    EventKind::Heal,
                    marble.id,
                    format!("{} regenerates {restored} health", marble.identity.name),
                )
                .with_magnitude(f64::from(restored)),
            );
        }
        PeriodicEffect::StatRoll {
            min_multiplier,
            max_multiplier,
            duration,
        } => {
            let (lo, hi) = if min_multiplier <= max_multiplier {
                (min_multiplier, max_multiplier)
            } else {
                (max_multiplier, min_multiplier)
            };
            let roll = if hi > lo { rng.gen_range(lo..=hi) } else { lo };
            let marble = &mut marbles[index];
            marble.skill.start_buff(roll, duration);
            events.push(
                SimulationEvent::new(
                    tick,
                    EventKind::SkillTriggered,
                    marble.id,
                    format!("{} rolls a x{roll:.2} attack swing", marble.identity.name),
                )
                .with_magnitude(roll),
            );
        }
        PeriodicEffect::EnemySlow { radius, retention } => {
            let (id, origin) = (marbles[index].id, marbles[index].position);
            let retention = retention.clamp(0.0, 1.0);
            let mut slowed = 0_u32;
            for (j, other) in marbles.iter_mut().enumerate() {
                if j == index || !other.alive {
                    continue;
                }
                if other.position.distance(origin) <= radius {
                    other.velocity *= retention;
                    slowed += 1;
                }
            }
            events.push(
                SimulationEvent::new(
                    tick,
                    EventKind::SkillTriggered,
                    id,
                    format!("{} sanctions slow {slowed} rivals", marbles[index].identity.name),
                )
                .with_magnitude(radius)
                .at(origin),
            );
        }
    }
}

/// Fire a threshold skill the first time health drops below its ratio.
///
/// Returns true when the skill fired on this call.
pub fn trigger_threshold(
    marble: &mut Marble,
    skill: &Skill,
    tick: u64,
    events: &mut Vec<SimulationEvent>,
) -> bool {
    let Skill::Threshold {
        health_ratio,
        effect,
    } = *skill
    else {
        return false;
    };
    if marble.skill.activated || marble.health == 0 || marble.health_ratio() >= health_ratio {
        return false;
    }

    marble.skill.activated = true;
    marble.skill.triggers += 1;
    let text = match effect {
        ThresholdEffect::AttackBoost { multiplier } => {
            format!("{} makes a last stand (x{multiplier:.2} attack)", marble.identity.name)
        }
        ThresholdEffect::Fortify { damage_taken } => format!(
            "{} entrenches (x{damage_taken:.2} damage taken)",
            marble.identity.name
        ),
        ThresholdEffect::Recover { fraction } => {
            let restored = marble.heal(scaled_heal(marble.max_health, fraction));
            format!("{} is bailed out for {restored} health", marble.identity.name)
        }
    };
    events.push(SimulationEvent::new(
        tick,
        EventKind::SkillTriggered,
        marble.id,
        text,
    ));
    true
}

// ============================================================================
// Phase 2: dynamic radius
// ============================================================================

/// Shrink each entity's radius with its health.
pub fn radius_system(marbles: &mut [Marble]) {
    for marble in marbles.iter_mut().filter(|m| m.alive) {
        marble.radius = marble.base_radius * (0.3 + 0.7 * marble.health_ratio());
    }
}

// ============================================================================
// Phase 3: targeting and movement
// ============================================================================

fn nearest_foe(marbles: &[Marble], index: usize) -> Option<EntityId> {
    let origin = marbles[index].position;
    marbles
        .iter()
        .enumerate()
        .filter(|(j, m)| *j != index && m.alive)
        .min_by(|(_, a), (_, b)| {
            a.position
                .distance_squared(origin)
                .total_cmp(&b.position.distance_squared(origin))
        })
        .map(|(_, m)| m.id)
}

fn largest_foe(marbles: &[Marble], index: usize) -> Option<EntityId> {
    marbles
        .iter()
        .enumerate()
        .filter(|(j, m)| *j != index && m.alive)
        .max_by(|(_, a), (_, b)| a.max_health.cmp(&b.max_health).then(b.id.cmp(&a.id)))
        .map(|(_, m)| m.id)
}

/// Pick new targets for entities whose retarget timer expired or whose
/// target died.
///
/// Entities under pressure (health ratio below `focus_health_ratio`) may
/// go after the foe with the highest max health; otherwise they chase the
/// nearest.
pub fn targeting_system<R: Rng + ?Sized>(
    marbles: &mut [Marble],
    ctx: &TickContext<'_>,
    rng: &mut R,
) {
    let movement = &ctx.config.movement;
    for i in 0..marbles.len() {
        let me = &marbles[i];
        if !me.alive {
            continue;
        }
        let has_target = live_target(marbles, me).is_some();
        if has_target && ctx.tick < me.targeting.next_retarget_tick {
            continue;
        }

        let focus =
            me.health_ratio() < movement.focus_health_ratio && rng.gen::<f64>() < movement.focus_chance;
        let target = if focus {
            largest_foe(marbles, i)
        } else {
            nearest_foe(marbles, i)
        };
        let wait = rng.gen_range(movement.retarget_interval.min..=movement.retarget_interval.max);

        let targeting = &mut marbles[i].targeting;
        targeting.target = target;
        targeting.next_retarget_tick = ctx.tick + u64::from(wait);
    }
}

/// Steer, integrate and bounce every entity.
///
/// Top speed grows with the escalation ramp and with rage. Active special
/// moves override normal steering: a charge dashes toward the target, a
/// fortress bleeds off velocity, and a dance zig-zags above normal speed.
pub fn movement_system<R: Rng + ?Sized>(
    marbles: &mut [Marble],
    ctx: &TickContext<'_>,
    rng: &mut R,
) {
    let config = ctx.config;
    let movement = &config.movement;
    let specials = &config.special_moves;
    let chaos = config.escalation.speed_multiplier(ctx.tick);
    let restitution = config.escalation.restitution(ctx.tick);

    for i in 0..marbles.len() {
        if !marbles[i].alive {
            continue;
        }
        let target_position = live_target(marbles, &marbles[i]).map(|t| marbles[t].position);
        let jitter = if movement.jitter > 0.0 {
            Vec2::new(
                rng.gen_range(-movement.jitter..=movement.jitter),
                rng.gen_range(-movement.jitter..=movement.jitter),
            )
        } else {
            Vec2::ZERO
        };

        let marble = &mut marbles[i];
        let mut max_speed = marble.stats.speed * movement.max_speed_factor * chaos;
        let mut steering = marble.stats.speed * movement.steering_per_speed;
        if marble.enraged {
            max_speed *= config.combat.rage_speed_multiplier;
            steering *= config.combat.rage_steering_multiplier;
        }
        let heading = target_position.map_or(Vec2::ZERO, |p| (p - marble.position).normalize());

        let special = marble.special;
        match ctx.specials[i] {
            SpecialMoveKind::Charge if special.is_active() => {
                let direction = if heading.length_squared() > EPSILON {
                    heading
                } else {
                    special.aim
                };
                marble.velocity = direction * (max_speed * specials.charge_speed_multiplier);
            }
            SpecialMoveKind::Fortress if special.is_active() => {
                marble.velocity *= specials.fortress_velocity_retention;
            }
            SpecialMoveKind::Dance if special.is_active() => {
                let period = specials.dance_zigzag_period.max(1);
                let side = if (special.active / period) % 2 == 0 {
                    1.0
                } else {
                    -1.0
                };
                let velocity = marble.velocity + heading * steering + jitter;
                let lateral = velocity.normalize().perpendicular() * (specials.dance_zigzag * side);
                marble.velocity =
                    (velocity + lateral).clamp_length(max_speed * specials.dance_speed_multiplier);
            }
            _ => {
                marble.velocity =
                    (marble.velocity + heading * steering + jitter).clamp_length(max_speed);
            }
        }

        marble.position += marble.velocity;
        bounce_off_walls(marble, &config.arena, restitution);
    }
}

/// Keep an entity inside the arena, reflecting velocity off the walls.
pub fn bounce_off_walls(marble: &mut Marble, arena: &ArenaConfig, restitution: f64) {
    let r = marble
        .radius
        .min(arena.width / 2.0)
        .min(arena.height / 2.0);

    if marble.position.x < r {
        marble.position.x = r;
        marble.velocity.x = marble.velocity.x.abs() * restitution;
    } else if marble.position.x > arena.width - r {
        marble.position.x = arena.width - r;
        marble.velocity.x = -marble.velocity.x.abs() * restitution;
    }

    if marble.position.y < r {
        marble.position.y = r;
        marble.velocity.y = marble.velocity.y.abs() * restitution;
    } else if marble.position.y > arena.height - r {
        marble.position.y = arena.height - r;
        marble.velocity.y = -marble.velocity.y.abs() * restitution;
    }
}

// ============================================================================
// Phase 4: special moves
// ============================================================================

/// Count down special-move cooldowns and fire moves whose cooldown expired.
pub fn special_move_system<R: Rng + ?Sized>(
    marbles: &mut [Marble],
    ctx: &TickContext<'_>,
    rng: &mut R,
    events: &mut Vec<SimulationEvent>,
) {
    let config = ctx.config;
    let specials = &config.special_moves;

    for i in 0..marbles.len() {
        let kind = ctx.specials[i];
        if !marbles[i].alive || kind == SpecialMoveKind::None {
            continue;
        }
        let target = live_target(marbles, &marbles[i]);
        let aim = match target {
            Some(t) => (marbles[t].position - marbles[i].position).normalize(),
            None => marbles[i].velocity.normalize(),
        };
        if !marbles[i].special.advance(kind, aim, specials, rng) {
            continue;
        }

        let (id, origin) = (marbles[i].id, marbles[i].position);
        debug!(tick = ctx.tick, entity = id, kind = kind.label(), "Special move fired");
        events.push(
            SimulationEvent::new(
                ctx.tick,
                EventKind::SpecialMove,
                id,
                format!("{} uses {}", marbles[i].identity.name, kind.label()),
            )
            .at(origin),
        );

        match kind {
            SpecialMoveKind::Wave => {
                let reach = specials.wave_radius.max(EPSILON);
                for (j, other) in marbles.iter_mut().enumerate() {
                    if j == i || !other.alive {
                        continue;
                    }
                    let offset = other.position - origin;
                    let distance = offset.length();
                    if distance > reach {
                        continue;
                    }
                    let hold = knockback_retention(other, ctx.specials[j], config);
                    let strength = specials.wave_strength * (1.0 - distance / reach) * hold;
                    let direction = if distance > EPSILON {
                        offset * (1.0 / distance)
                    } else {
                        Vec2::from_angle(rng.gen_range(0.0..std::f64::consts::TAU))
                    };
                    other.velocity += direction * strength;
                }
            }
            SpecialMoveKind::Fortress => {
                marbles[i].velocity *= specials.fortress_velocity_retention;
            }
            SpecialMoveKind::Dance => {
                marbles[i].velocity *= specials.dance_speed_multiplier;
            }
            SpecialMoveKind::Bombard => {
                if let Some(t) = target {
                    let victim = &marbles[t];
                    events.push(
                        SimulationEvent::new(
                            ctx.tick,
                            EventKind::BombardImpact,
                            id,
                            format!(
                                "{} bombards {}",
                                marbles[i].identity.name, victim.identity.name
                            ),
                        )
                        .with_other(victim.id)
                        .at(victim.position),
                    );
                }
            }
            SpecialMoveKind::Charge | SpecialMoveKind::None => {}
        }
    }
}

// ============================================================================
// Phase 5: collisions and damage
// ============================================================================

/// Geometry of one contact.
#[derive(Debug, Clone, Copy)]
struct Contact {
    /// Unit vector from the first entity toward the second.
    normal: Vec2,
    /// Relative speed before the impulse.
    relative_speed: f64,
}

/// Push overlapping entities apart and exchange an elastic impulse.
fn separate(
    a: &mut Marble,
    b: &mut Marble,
    hold_a: f64,
    hold_b: f64,
    restitution: f64,
) -> Option<Contact> {
    let delta = b.position - a.position;
    let distance = delta.length();
    let overlap = a.radius + b.radius - distance;
    if overlap <= 0.0 {
        return None;
    }

    let normal = if distance > EPSILON {
        delta * (1.0 / distance)
    } else {
        Vec2::new(1.0, 0.0)
    };

    let total_mass = a.mass + b.mass;
    let (share_a, share_b) = if total_mass > EPSILON {
        (b.mass / total_mass, a.mass / total_mass)
    } else {
        (0.5, 0.5)
    };
    a.position -= normal * (overlap * share_a);
    b.position += normal * (overlap * share_b);

    let relative = b.velocity - a.velocity;
    let relative_speed = relative.length();
    let approach = relative.dot(normal);
    if approach < 0.0 {
        let inv_a = 1.0 / a.mass.max(EPSILON);
        let inv_b = 1.0 / b.mass.max(EPSILON);
        let impulse = -(1.0 + restitution) * approach / (inv_a + inv_b);
        a.velocity -= normal * (impulse * inv_a * hold_a);
        b.velocity += normal * (impulse * inv_b * hold_b);
    }

    Some(Contact {
        normal,
        relative_speed,
    })
}

fn attack_profile(marble: &Marble, skill: &Skill) -> AttackProfile {
    AttackProfile {
        attack: marble.effective_attack(),
        crit_chance: marble.stats.crit_chance,
        skill: *skill,
        attack_multiplier: marble.skill.attack_multiplier(skill),
    }
}

fn defense_profile(marble: &Marble, skill: &Skill, blocked: bool) -> DefenseProfile {
    DefenseProfile {
        defense: marble.effective_defense(),
        debt_factor: marble.stats.debt_factor,
        skill: *skill,
        damage_taken_multiplier: marble.skill.damage_taken_multiplier(skill),
        blocked,
    }
}

/// Resolve overlaps every tick and damage exchanges for pairs whose
/// cooldown has elapsed.
///
/// Both sides of an exchange are computed from the state before either
/// hit lands, so the exchange is simultaneous.
pub fn collision_system<R: Rng + ?Sized>(
    marbles: &mut [Marble],
    cooldowns: &mut PairCooldown,
    ctx: &TickContext<'_>,
    rng: &mut R,
    events: &mut Vec<SimulationEvent>,
) {
    let config = ctx.config;
    let restitution = config.escalation.restitution(ctx.tick);
    let window = config.combat.pair_cooldown_at(ctx.tick);

    for i in 0..marbles.len() {
        for j in (i + 1)..marbles.len() {
            if !marbles[i].alive || !marbles[j].alive {
                continue;
            }
            let hold_i = knockback_retention(&marbles[i], ctx.specials[i], config);
            let hold_j = knockback_retention(&marbles[j], ctx.specials[j], config);
            let (a, b) = pair_mut(marbles, i, j);

            let Some(contact) = separate(a, b, hold_i, hold_j, restitution) else {
                continue;
            };
            if a.health == 0 || b.health == 0 || !cooldowns.is_ready(a.id, b.id, ctx.tick, window) {
                continue;
            }
            cooldowns.record(a.id, b.id, ctx.tick);

            let (skill_a, skill_b) = (ctx.skills[i], ctx.skills[j]);
            let blocked_b = b.skill.register_hit(&skill_b);
            let blocked_a = a.skill.register_hit(&skill_a);
            let hit_ab = resolve_hit(
                &attack_profile(a, &skill_a),
                &defense_profile(b, &skill_b, blocked_b),
                contact.relative_speed,
                ctx.tick,
                config,
                rng,
            );
            let hit_ba = resolve_hit(
                &attack_profile(b, &skill_b),
                &defense_profile(a, &skill_a, blocked_a),
                contact.relative_speed,
                ctx.tick,
                config,
                rng,
            );

            let dealt_ab = land_hit(a, b, hit_ab, contact.normal, hold_j, ctx, events);
            let dealt_ba = land_hit(b, a, hit_ba, -contact.normal, hold_i, ctx, events);
            apply_drain(a, dealt_ab, ctx.tick, events);
            apply_drain(b, dealt_ba, ctx.tick, events);

            trigger_threshold(a, &skill_a, ctx.tick, events);
            trigger_threshold(b, &skill_b, ctx.tick, events);
        }
    }
}

/// Apply one side of an exchange. Returns the health actually removed.
fn land_hit(
    attacker: &mut Marble,
    defender: &mut Marble,
    hit: HitOutcome,
    push: Vec2,
    hold: f64,
    ctx: &TickContext<'_>,
    events: &mut Vec<SimulationEvent>,
) -> u32 {
    let avoided = match hit.kind {
        HitKind::Dodged => Some((EventKind::Dodge, "dodges")),
        HitKind::Blocked => Some((EventKind::Block, "blocks")),
        HitKind::Landed => None,
    };
    if let Some((kind, verb)) = avoided {
        events.push(
            SimulationEvent::new(
                ctx.tick,
                kind,
                defender.id,
                format!("{} {verb} {}", defender.identity.name, attacker.identity.name),
            )
            .with_other(attacker.id)
            .at(defender.position),
        );
        return 0;
    }

    let lost = defender.take_damage(hit.damage);
    attacker.totals.damage_dealt += u64::from(lost);
    defender.totals.damage_taken += u64::from(lost);
    defender.last_hit_by = Some(attacker.id);

    let (kind, text) = if hit.crit {
        attacker.totals.crits += 1;
        defender.velocity += push * (crit_knockback(hit.damage, &ctx.config.combat) * hold);
        (
            EventKind::CriticalHit,
            format!(
                "{} crits {} for {lost}",
                attacker.identity.name, defender.identity.name
            ),
        )
    } else {
        (
            EventKind::Hit,
            format!(
                "{} hits {} for {lost}",
                attacker.identity.name, defender.identity.name
            ),
        )
    };
    events.push(
        SimulationEvent::new(ctx.tick, kind, attacker.id, text)
            .with_other(defender.id)
            .with_magnitude(f64::from(lost))
            .at(defender.position),
    );
    lost
}

fn apply_drain(marble: &mut Marble, dealt: u32, tick: u64, events: &mut Vec<SimulationEvent>) {
    if marble.health == 0 {
        return;
    }
    let restored = marble.heal(drain_heal(dealt, marble.stats.drain));
    if restored > 0 {
        events.push(
            SimulationEvent::new(
                tick,
                EventKind::Heal,
                marble.id,
                format!("{} drains {restored} health", marble.identity.name),
            )
            .with_magnitude(f64::from(restored)),
        );
    }
}

// ============================================================================
// Phase 6: elimination and absorption
// ============================================================================

/// Grow `killer` by `fraction` of a victim's max health.
///
/// Max health and current health rise by the same amount; mass scales with
/// the max-health ratio and base radius with its square root, up to the
/// arena's radius cap. Returns the max health gained.
pub fn absorb(killer: &mut Marble, victim_max_health: u32, fraction: f64, arena: &ArenaConfig) -> u32 {
    let gained = ((f64::from(victim_max_health) * fraction.max(0.0)).round() as u32).max(1);
    let old_max = killer.max_health.max(1);

    killer.max_health = killer.max_health.saturating_add(gained);
    killer.absorbed_health = killer.absorbed_health.saturating_add(gained);
    killer.heal(gained);

    let factor = f64::from(killer.max_health) / f64::from(old_max);
    killer.mass *= factor;
    let cap = arena.radius_cap.max(killer.base_radius);
    killer.base_radius = (killer.base_radius * factor.sqrt()).min(cap);
    gained
}

/// Retire entities at zero health and let their killers absorb them.
///
/// Every victim is retired before any absorption, so a killer that died in
/// the same tick absorbs nothing (its kill is still credited). Returns the
/// ids eliminated this tick.
pub fn elimination_system(
    marbles: &mut [Marble],
    cooldowns: &mut PairCooldown,
    ctx: &TickContext<'_>,
    events: &mut Vec<SimulationEvent>,
) -> Vec<EntityId> {
    let mut victims = Vec::new();
    for marble in marbles.iter_mut().filter(|m| m.alive && m.health == 0) {
        marble.alive = false;
        marble.velocity = Vec2::ZERO;
        marble.totals.eliminated_at = Some(ctx.tick);
        marble.totals.eliminated_by = marble.last_hit_by;
        cooldowns.forget(marble.id);
        victims.push((marble.id, marble.max_health, marble.last_hit_by));
    }

    let combat = &ctx.config.combat;
    for &(victim, victim_max, killer) in &victims {
        let victim_index = find_index(marbles, victim);
        let victim_name = victim_index.map_or_else(String::new, |v| marbles[v].identity.name.clone());
        let victim_position = victim_index.map_or(Vec2::ZERO, |v| marbles[v].position);
        let killer_index = killer.and_then(|id| find_index(marbles, id));

        let mut event = SimulationEvent::new(
            ctx.tick,
            EventKind::Elimination,
            victim,
            format!("{victim_name} is eliminated"),
        )
        .at(victim_position);

        if let Some(k) = killer_index {
            let killer = &mut marbles[k];
            killer.totals.kills += 1;
            event = event.with_other(killer.id);
            event.text = format!("{victim_name} is eliminated by {}", killer.identity.name);
            debug!(tick = ctx.tick, victim, killer = killer.id, "Entity eliminated");
            events.push(event);

            if killer.alive {
                let fraction =
                    ctx.skills[k].absorb_fraction(combat.absorb_fraction, combat.max_absorb_fraction);
                let gained = absorb(killer, victim_max, fraction, &ctx.config.arena);
                events.push(
                    SimulationEvent::new(
                        ctx.tick,
                        EventKind::Absorption,
                        killer.id,
                        format!("{} absorbs {gained} max health from {victim_name}", killer.identity.name),
                    )
                    .with_other(victim)
                    .with_magnitude(f64::from(gained)),
                );
            }
        } else {
            debug!(tick = ctx.tick, victim, "Entity eliminated");
            events.push(event);
        }
    }

    victims.into_iter().map(|(id, _, _)| id).collect()
}

// ============================================================================
// Phase 7: rage
// ============================================================================

/// Enrage entities the first time they drop below the rage threshold.
pub fn rage_system(marbles: &mut [Marble], ctx: &TickContext<'_>, events: &mut Vec<SimulationEvent>) {
    let threshold = ctx.config.combat.rage_threshold;
    for marble in marbles
        .iter_mut()
        .filter(|m| m.alive && !m.enraged && m.health_ratio() < threshold)
    {
        marble.enraged = true;
        events.push(SimulationEvent::new(
            ctx.tick,
            EventKind::Rage,
            marble.id,
            format!("{} flies into a rage", marble.identity.name),
        ));
    }
}
