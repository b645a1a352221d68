//! Initial roster placement.
//!
//! Entities start evenly spaced on a ring around the arena center, each
//! heading in a random direction. Size is normalized against the most
//! populous entity in *this* roster, so the same country can be large in
//! one match and small in another.

use std::f64::consts::TAU;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::components::{CombatTotals, EntityId, Identity, Marble, TargetingState};
use crate::config::{ArenaConfig, BattleConfig};
use crate::error::{BattleError, Result};
use crate::math::Vec2;
use crate::skills::SkillState;
use crate::special_moves::{SpecialMoveState, SpecialMoveTable};
use crate::stats::{population_scale, StatBundle};

/// One combatant ready to be placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// Who the entity is.
    pub identity: Identity,
    /// Opening stat bundle.
    pub stats: StatBundle,
    /// Year `stats` was derived from.
    pub stats_year: i32,
}

impl RosterEntry {
    /// Create a roster entry.
    #[must_use]
    pub fn new(identity: Identity, stats: StatBundle, stats_year: i32) -> Self {
        Self {
            identity,
            stats,
            stats_year,
        }
    }
}

/// Base radius for `population` relative to the roster's largest population.
#[must_use]
pub fn base_radius(population: f64, max_population: f64, arena: &ArenaConfig) -> f64 {
    let ratio = population_scale(population) / population_scale(max_population);
    (arena.max_radius * ratio).max(arena.min_radius)
}

/// Collision mass for a radius.
#[must_use]
pub fn mass_for_radius(radius: f64) -> f64 {
    radius * radius
}

/// Place every entry in the arena.
///
/// Entity ids are assigned in roster order starting at 0.
///
/// # Errors
///
/// [`BattleError::NotEnoughCombatants`] when fewer than two entries are
/// supplied.
pub fn spawn_roster<M, R>(
    entries: &[RosterEntry],
    specials: &M,
    config: &BattleConfig,
    rng: &mut R,
) -> Result<Vec<Marble>>
where
    M: SpecialMoveTable + ?Sized,
    R: Rng + ?Sized,
{
    if entries.len() < 2 {
        return Err(BattleError::NotEnoughCombatants {
            found: entries.len(),
        });
    }

    let arena = &config.arena;
    let center = Vec2::new(arena.width / 2.0, arena.height / 2.0);
    let ring = arena.width.min(arena.height) * arena.spawn_ring_fraction;
    let max_population = entries
        .iter()
        .map(|e| e.stats.population_mass)
        .fold(1.0_f64, f64::max);
    let phase = rng.gen_range(0.0..TAU);
    let count = entries.len() as f64;

    let marbles = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let angle = phase + TAU * index as f64 / count;
            let radius = base_radius(entry.stats.population_mass, max_population, arena);
            let heading = Vec2::from_angle(rng.gen_range(0.0..TAU));
            let speed = entry.stats.speed * config.movement.initial_speed_factor;
            let retarget = config.movement.retarget_interval;
            let kind = specials.special_move_for(&entry.identity.code);

            Marble {
                id: index as EntityId,
                identity: entry.identity.clone(),
                stats: entry.stats,
                stats_year: entry.stats_year,
                health: entry.stats.max_health,
                max_health: entry.stats.max_health,
                absorbed_health: 0,
                alive: true,
                position: center + Vec2::from_angle(angle) * ring,
                velocity: heading * speed,
                base_radius: radius,
                radius,
                mass: mass_for_radius(radius),
                targeting: TargetingState {
                    target: None,
                    next_retarget_tick: u64::from(rng.gen_range(0..=retarget.max)),
                },
                skill: SkillState::default(),
                special: SpecialMoveState::new(kind, &config.special_moves, rng),
                enraged: false,
                last_hit_by: None,
                totals: CombatTotals::default(),
            }
        })
        .collect();

    Ok(marbles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn entry(code: &str, population: f64) -> RosterEntry {
        let stats = StatBundle {
            population_mass: population,
            ..StatBundle::neutral()
        };
        RosterEntry::new(Identity::new(code, code), stats, 2000)
    }

    #[test]
    fn test_rejects_single_entry() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let result = spawn_roster(
            &[entry("AAA", 1e6)],
            &Catalog::empty(),
            &BattleConfig::default(),
            &mut rng,
        );
        assert!(matches!(
            result,
            Err(BattleError::NotEnoughCombatants { found: 1 })
        ));
    }

    #[test]
    fn test_radius_normalized_to_roster() {
        let config = BattleConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let marbles = spawn_roster(
            &[entry("BIG", 1e9), entry("MID", 1e8), entry("TNY", 1e3)],
            &Catalog::empty(),
            &config,
            &mut rng,
        )
        .unwrap();

        assert!((marbles[0].base_radius - config.arena.max_radius).abs() < 1e-9);
        assert!(marbles[1].base_radius < marbles[0].base_radius);
        assert!((marbles[2].base_radius - config.arena.min_radius).abs() < 1e-9);
        assert!((marbles[0].mass - marbles[0].radius.powi(2)).abs() < 1e-9);
    }

    #[test]
    fn test_spawn_on_ring_at_full_health() {
        let config = BattleConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let marbles = spawn_roster(
            &[entry("AAA", 1e7), entry("BBB", 1e7), entry("CCC", 1e7), entry("DDD", 1e7)],
            &Catalog::builtin(),
            &config,
            &mut rng,
        )
        .unwrap();

        let center = Vec2::new(config.arena.width / 2.0, config.arena.height / 2.0);
        let ring = config.arena.width.min(config.arena.height) * config.arena.spawn_ring_fraction;
        for (i, m) in marbles.iter().enumerate() {
            assert_eq!(m.id, i as EntityId);
            assert_eq!(m.health, m.max_health);
            assert!(m.alive);
            assert!((m.position.distance(center) - ring).abs() < 1e-6);
        }
    }
}
