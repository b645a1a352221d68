//! Year-based stat progression.
//!
//! On a fixed match-time cadence every living entity steps to the next year
//! its indicator series has data for, skipping gaps, and re-derives its
//! stats. Applying a new bundle:
//!
//! - preserves the health ratio across the max-health change
//! - keeps max health gained through absorption
//! - rescales size by the population power-law ratio
//! - adds cumulative year-change skill bonuses
//!
//! Nothing else (targeting, cooldowns, buffs, rage) is reset.

use std::collections::BTreeMap;

use tracing::debug;

use crate::components::{EntityId, Marble};
use crate::config::ArenaConfig;
use crate::events::{EventKind, SimulationEvent};
use crate::indicators::IndicatorSeries;
use crate::skills::Skill;
use crate::stats::{derive_stats, population_scale, StatBundle};

/// Apply `bundle` (derived for `year`) to a live entity.
pub fn apply_year(
    marble: &mut Marble,
    bundle: StatBundle,
    year: i32,
    skill: &Skill,
    arena: &ArenaConfig,
) {
    let ratio = marble.health_ratio();
    let new_max = bundle.max_health.saturating_add(marble.absorbed_health);
    marble.max_health = new_max;
    marble.health = if marble.health == 0 {
        0
    } else {
        ((ratio * f64::from(new_max)).round() as u32).clamp(1, new_max.max(1))
    };

    let scale =
        population_scale(bundle.population_mass) / population_scale(marble.stats.population_mass);
    let old_radius = marble.base_radius;
    let upper = arena.radius_cap.max(arena.min_radius);
    marble.base_radius = (old_radius * scale).clamp(arena.min_radius, upper);
    if old_radius > 0.0 {
        let growth = marble.base_radius / old_radius;
        marble.mass *= growth * growth;
    }

    if let Skill::YearChange {
        attack_bonus,
        defense_bonus,
    } = *skill
    {
        marble.skill.year_attack_bonus += attack_bonus;
        marble.skill.year_defense_bonus += defense_bonus;
        marble.skill.triggers += 1;
    }

    marble.stats = bundle;
    marble.stats_year = year;
}

/// Progress every living entity to its next available data year.
///
/// Entities whose series has nothing after their current year are left
/// untouched. `skills` is aligned with `marbles`. Returns the number of
/// entities that progressed.
pub fn progression_system(
    marbles: &mut [Marble],
    series: &BTreeMap<EntityId, IndicatorSeries>,
    skills: &[Skill],
    arena: &ArenaConfig,
    tick: u64,
    events: &mut Vec<SimulationEvent>,
) -> usize {
    let mut progressed = 0;
    for (marble, skill) in marbles.iter_mut().zip(skills) {
        if !marble.alive {
            continue;
        }
        let Some((data_year, snapshot)) = series
            .get(&marble.id)
            .and_then(|s| s.next_after(marble.stats_year))
        else {
            continue;
        };

        let old_max = marble.max_health;
        apply_year(marble, derive_stats(snapshot), data_year, skill, arena);
        progressed += 1;

        debug!(
            tick,
            entity = marble.id,
            year = data_year,
            old_max,
            new_max = marble.max_health,
            "Year progression"
        );
        events.push(
            SimulationEvent::new(
                tick,
                EventKind::YearProgression,
                marble.id,
                format!("{} advances to {data_year}", marble.identity.name),
            )
            .with_magnitude(f64::from(data_year)),
        );
    }
    progressed
}
