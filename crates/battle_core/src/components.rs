//! Entity data.
//!
//! A [`Marble`] is one country in the arena. It is plain data with no
//! behavior of its own; the systems in [`crate::systems`] and
//! [`crate::progression`] are the only code that mutates it.

use serde::{Deserialize, Serialize};

use crate::math::Vec2;
use crate::skills::SkillState;
use crate::special_moves::SpecialMoveState;
use crate::stats::StatBundle;

/// Unique identifier for entities within one match.
pub type EntityId = u32;

/// Who an entity is: country code, display name and colors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    /// ISO-style country code, used for skill and special-move lookup.
    pub code: String,
    /// Display name (not localized).
    pub name: String,
    /// Primary and secondary colors as RGB.
    pub palette: [[u8; 3]; 2],
}

impl Identity {
    /// Create an identity with a neutral palette.
    #[must_use]
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            palette: [[100, 100, 200], [255, 255, 255]],
        }
    }

    /// Builder: set the palette.
    #[must_use]
    pub fn with_palette(mut self, primary: [u8; 3], secondary: [u8; 3]) -> Self {
        self.palette = [primary, secondary];
        self
    }
}

/// Current target and when to pick a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TargetingState {
    /// Entity being chased, if any.
    pub target: Option<EntityId>,
    /// Tick at which the target is re-evaluated.
    pub next_retarget_tick: u64,
}

/// Running totals used for ranking and the match report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CombatTotals {
    /// Health removed from opponents.
    pub damage_dealt: u64,
    /// Health lost to opponents.
    pub damage_taken: u64,
    /// Eliminations credited.
    pub kills: u32,
    /// Critical hits landed.
    pub crits: u32,
    /// Tick of elimination.
    pub eliminated_at: Option<u64>,
    /// Entity credited with the elimination.
    pub eliminated_by: Option<EntityId>,
}

/// One combatant in the arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marble {
    /// Unique identifier within the match.
    pub id: EntityId,
    /// Country identity.
    pub identity: Identity,
    /// Stat bundle for the current year.
    pub stats: StatBundle,
    /// Year the current bundle was derived from.
    pub stats_year: i32,
    /// Current health, within `0..=max_health`.
    pub health: u32,
    /// Current maximum health (bundle value plus absorbed health).
    pub max_health: u32,
    /// Max health gained through absorption; survives year progression.
    pub absorbed_health: u32,
    /// False once eliminated; dead entities stay in the roster for reporting.
    pub alive: bool,
    /// Arena position.
    pub position: Vec2,
    /// Velocity in arena units per tick.
    pub velocity: Vec2,
    /// Radius at full health.
    pub base_radius: f64,
    /// Radius after health scaling, recomputed every tick.
    pub radius: f64,
    /// Collision mass.
    pub mass: f64,
    /// Targeting state.
    pub targeting: TargetingState,
    /// Skill runtime state.
    pub skill: SkillState,
    /// Special-move runtime state.
    pub special: SpecialMoveState,
    /// One-shot low-health aggression flag.
    pub enraged: bool,
    /// Last entity to deal damage, credited on elimination.
    pub last_hit_by: Option<EntityId>,
    /// Running totals.
    pub totals: CombatTotals,
}

impl Marble {
    /// Current health as a fraction of max health.
    #[must_use]
    pub fn health_ratio(&self) -> f64 {
        if self.max_health == 0 {
            return 0.0;
        }
        f64::from(self.health) / f64::from(self.max_health)
    }

    /// Attack including cumulative year bonuses.
    #[must_use]
    pub fn effective_attack(&self) -> f64 {
        self.stats.attack + self.skill.year_attack_bonus
    }

    /// Defense including cumulative year bonuses.
    #[must_use]
    pub fn effective_defense(&self) -> f64 {
        self.stats.defense + self.skill.year_defense_bonus
    }

    /// Heal by `amount`, capped at max health. Returns the health restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let before = self.health;
        self.health = self.health.saturating_add(amount).min(self.max_health);
        self.health - before
    }

    /// Remove up to `amount` health. Returns the health actually lost.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let lost = amount.min(self.health);
        self.health -= lost;
        lost
    }
}

/// Minimal entity builders for unit tests.
#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A neutral entity with the given health at `position`.
    pub(crate) fn marble(id: EntityId, health: u32, max_health: u32, position: Vec2) -> Marble {
        Marble {
            id,
            identity: Identity::new(format!("T{id:02}"), format!("Testland {id}")),
            stats: StatBundle::neutral(),
            stats_year: 2000,
            health,
            max_health,
            absorbed_health: 0,
            alive: true,
            position,
            velocity: Vec2::ZERO,
            base_radius: 20.0,
            radius: 20.0,
            mass: 400.0,
            targeting: TargetingState::default(),
            skill: SkillState::default(),
            special: SpecialMoveState::default(),
            enraged: false,
            last_hit_by: None,
            totals: CombatTotals::default(),
        }
    }
}
