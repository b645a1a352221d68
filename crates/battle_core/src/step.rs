//! One full simulation tick.
//!
//! [`step`] is a pure function of the battle state, the injected lookup
//! tables, the config and the random source. It cannot fail: every numeric
//! edge case is clamped inside the systems.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::components::Marble;
use crate::config::BattleConfig;
use crate::cooldown::PairCooldown;
use crate::events::SimulationEvent;
use crate::skills::{Skill, SkillTable};
use crate::special_moves::{SpecialMoveKind, SpecialMoveTable};
use crate::systems::{
    collision_system, elimination_system, movement_system, radius_system, rage_system,
    skill_system, special_move_system, targeting_system, TickContext,
};

/// Mutable state advanced by [`step`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleState {
    /// Ticks simulated so far.
    pub tick: u64,
    /// Every entity, alive or eliminated.
    pub marbles: Vec<Marble>,
    /// Per-pair damage cooldowns.
    pub cooldowns: PairCooldown,
}

impl BattleState {
    /// State at tick 0 for a freshly spawned roster.
    #[must_use]
    pub fn new(marbles: Vec<Marble>) -> Self {
        Self {
            tick: 0,
            marbles,
            cooldowns: PairCooldown::new(),
        }
    }

    /// Number of entities still alive.
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.marbles.iter().filter(|m| m.alive).count()
    }

    /// Skill of every entity, aligned with `marbles`.
    pub fn skills_of<S: SkillTable + ?Sized>(&self, table: &S) -> Vec<Skill> {
        self.marbles
            .iter()
            .map(|m| table.skill_for(&m.identity.code))
            .collect()
    }

    /// Special move of every entity, aligned with `marbles`.
    pub fn specials_of<M: SpecialMoveTable + ?Sized>(&self, table: &M) -> Vec<SpecialMoveKind> {
        self.marbles
            .iter()
            .map(|m| table.special_move_for(&m.identity.code))
            .collect()
    }
}

/// Advance `state` by one tick and return the events it produced.
///
/// Phases run in a fixed order: skills, radius, targeting and movement,
/// special moves, collisions and damage, elimination and absorption, rage.
pub fn step<S, M, R>(
    state: &mut BattleState,
    skills: &S,
    specials: &M,
    config: &BattleConfig,
    rng: &mut R,
) -> Vec<SimulationEvent>
where
    S: SkillTable + ?Sized,
    M: SpecialMoveTable + ?Sized,
    R: Rng + ?Sized,
{
    let skill_of = state.skills_of(skills);
    let special_of = state.specials_of(specials);
    let ctx = TickContext {
        tick: state.tick,
        config,
        skills: &skill_of,
        specials: &special_of,
    };
    let mut events = Vec::new();
    let marbles = &mut state.marbles;

    skill_system(marbles, &ctx, rng, &mut events);
    radius_system(marbles);
    targeting_system(marbles, &ctx, rng);
    movement_system(marbles, &ctx, rng);
    special_move_system(marbles, &ctx, rng, &mut events);
    collision_system(marbles, &mut state.cooldowns, &ctx, rng, &mut events);
    elimination_system(marbles, &mut state.cooldowns, &ctx, &mut events);
    rage_system(marbles, &ctx, &mut events);

    #[cfg(feature = "debug-validation")]
    validate_state(state);

    state.tick += 1;
    events
}

/// Panic if any health or position invariant is broken.
#[cfg(feature = "debug-validation")]
fn validate_state(state: &BattleState) {
    for m in &state.marbles {
        assert!(m.health <= m.max_health, "entity {} health above max", m.id);
        assert!(m.alive || m.health == 0, "entity {} dead with health", m.id);
        assert!(m.position.is_finite(), "entity {} position not finite", m.id);
        assert!(m.velocity.is_finite(), "entity {} velocity not finite", m.id);
    }
}
