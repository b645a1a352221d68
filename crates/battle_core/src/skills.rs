//! Passive skills.
//!
//! Every country carries at most one [`Skill`]. Skills are grouped by the
//! condition that triggers them, and each variant carries only the
//! parameters it needs:
//!
//! - **Periodic** - fires every `interval` ticks (heal, stat roll, enemy slow)
//! - **Threshold** - fires once when health first drops below a ratio
//! - **OnAttack** - modifies outgoing damage
//! - **OnDamaged** - modifies incoming damage
//! - **OnKill** - raises the absorption share on eliminations
//! - **YearChange** - adds cumulative bonuses on each year progression
//!
//! The mapping from country to skill is injected through [`SkillTable`].

use serde::{Deserialize, Serialize};

/// Effect of a periodic skill.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PeriodicEffect {
    /// Restore a fraction of max health.
    Heal {
        /// Fraction of max health restored.
        fraction: f64,
    },
    /// Roll a random attack multiplier that lasts for `duration` ticks.
    StatRoll {
        /// Lowest multiplier.
        min_multiplier: f64,
        /// Highest multiplier.
        max_multiplier: f64,
        /// Buff duration in ticks.
        duration: u32,
    },
    /// Scale down the velocity of every enemy within `radius`.
    EnemySlow {
        /// Reach of the slow.
        radius: f64,
        /// Share of velocity the enemies keep.
        retention: f64,
    },
}

/// Effect of a threshold skill, applied once and kept for the match.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ThresholdEffect {
    /// Multiply outgoing damage.
    AttackBoost {
        /// Damage multiplier.
        multiplier: f64,
    },
    /// Multiply incoming damage (values below 1 reduce it).
    Fortify {
        /// Incoming damage multiplier.
        damage_taken: f64,
    },
    /// Restore a fraction of max health once.
    Recover {
        /// Fraction of max health restored.
        fraction: f64,
    },
}

/// Outgoing-damage modifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AttackSkill {
    /// Flat damage multiplier.
    DamageBoost {
        /// Damage multiplier.
        multiplier: f64,
    },
    /// Extra critical chance in percentage points.
    CritChance {
        /// Added crit chance.
        bonus: f64,
    },
    /// Extra multiplier applied on top of the normal critical multiplier.
    CritAmplify {
        /// Extra crit multiplier (2.0 doubles crit damage).
        multiplier: f64,
    },
    /// Chance to ignore the opponent's defense entirely.
    IgnoreDefense {
        /// Probability in `[0, 1]`.
        chance: f64,
    },
}

/// Incoming-damage modifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DefenseSkill {
    /// Reduce incoming damage by a fraction.
    DamageReduction {
        /// Fraction removed.
        fraction: f64,
    },
    /// Chance to avoid a hit entirely.
    Dodge {
        /// Probability in `[0, 1]`.
        chance: f64,
    },
    /// Every `n`th hit taken is blocked entirely.
    BlockEveryNth {
        /// Hit interval.
        n: u32,
    },
}

/// A country's passive skill.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Skill {
    /// No skill.
    #[default]
    None,
    /// Fires every `interval` ticks.
    Periodic {
        /// Ticks between firings.
        interval: u32,
        /// What happens.
        effect: PeriodicEffect,
    },
    /// Fires once when health drops below `health_ratio`.
    Threshold {
        /// Trigger ratio.
        health_ratio: f64,
        /// What happens.
        effect: ThresholdEffect,
    },
    /// Modifies outgoing damage.
    OnAttack(AttackSkill),
    /// Modifies incoming damage.
    OnDamaged(DefenseSkill),
    /// Raises the absorbed share of a victim's max health.
    OnKill {
        /// Absorbed fraction (clamped by config).
        absorb_fraction: f64,
    },
    /// Cumulative bonuses on each year progression.
    YearChange {
        /// Attack added per progression.
        attack_bonus: f64,
        /// Defense added per progression.
        defense_bonus: f64,
    },
}

impl Skill {
    /// Short label for event text.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Skill::None => "none",
            Skill::Periodic { effect, .. } => match effect {
                PeriodicEffect::Heal { .. } => "regeneration",
                PeriodicEffect::StatRoll { .. } => "market swing",
                PeriodicEffect::EnemySlow { .. } => "sanctions",
            },
            Skill::Threshold { effect, .. } => match effect {
                ThresholdEffect::AttackBoost { .. } => "last stand",
                ThresholdEffect::Fortify { .. } => "entrenchment",
                ThresholdEffect::Recover { .. } => "bailout",
            },
            Skill::OnAttack(attack) => match attack {
                AttackSkill::DamageBoost { .. } => "industrial might",
                AttackSkill::CritChance { .. } => "precision",
                AttackSkill::CritAmplify { .. } => "overwhelming force",
                AttackSkill::IgnoreDefense { .. } => "piercing strike",
            },
            Skill::OnDamaged(defense) => match defense {
                DefenseSkill::DamageReduction { .. } => "resilience",
                DefenseSkill::Dodge { .. } => "neutrality",
                DefenseSkill::BlockEveryNth { .. } => "shield wall",
            },
            Skill::OnKill { .. } => "annexation",
            Skill::YearChange { .. } => "growth engine",
        }
    }
}

/// Lookup from country code to skill.
pub trait SkillTable {
    /// Skill for `code`, or [`Skill::None`] when the country has none.
    fn skill_for(&self, code: &str) -> Skill;
}

/// Per-entity skill runtime.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SkillState {
    /// Ticks since the periodic skill last fired.
    pub elapsed: u32,
    /// Whether the threshold skill has fired.
    pub activated: bool,
    /// Remaining ticks of the stat-roll buff.
    pub buff_ticks: u32,
    /// Attack multiplier of the stat-roll buff.
    pub buff_multiplier: f64,
    /// Hits taken so far, for block-every-nth.
    pub hits_taken: u32,
    /// Cumulative attack bonus from year progressions.
    pub year_attack_bonus: f64,
    /// Cumulative defense bonus from year progressions.
    pub year_defense_bonus: f64,
    /// Times this skill has fired.
    pub triggers: u32,
}

impl SkillState {
    /// Whether a timed buff is currently running.
    #[must_use]
    pub fn buff_active(&self) -> bool {
        self.buff_ticks > 0
    }

    /// Advance the periodic timer. Returns true when `interval` elapses.
    pub fn advance_timer(&mut self, interval: u32) -> bool {
        self.elapsed = self.elapsed.saturating_add(1);
        if interval > 0 && self.elapsed >= interval {
            self.elapsed = 0;
            return true;
        }
        false
    }

    /// Count down the buff.
    pub fn tick_buff(&mut self) {
        if self.buff_ticks > 0 {
            self.buff_ticks -= 1;
            if self.buff_ticks == 0 {
                self.buff_multiplier = 1.0;
            }
        }
    }

    /// Start a stat-roll buff.
    pub fn start_buff(&mut self, multiplier: f64, duration: u32) {
        self.buff_multiplier = multiplier;
        self.buff_ticks = duration;
    }

    /// Outgoing damage multiplier from this skill and its runtime.
    #[must_use]
    pub fn attack_multiplier(&self, skill: &Skill) -> f64 {
        let mut multiplier = if self.buff_active() {
            self.buff_multiplier
        } else {
            1.0
        };
        match skill {
            Skill::OnAttack(AttackSkill::DamageBoost { multiplier: m }) => multiplier *= m,
            Skill::Threshold {
                effect: ThresholdEffect::AttackBoost { multiplier: m },
                ..
            } if self.activated => multiplier *= m,
            _ => {}
        }
        multiplier.max(0.0)
    }

    /// Incoming damage multiplier from this skill and its runtime.
    #[must_use]
    pub fn damage_taken_multiplier(&self, skill: &Skill) -> f64 {
        match skill {
            Skill::OnDamaged(DefenseSkill::DamageReduction { fraction }) => {
                (1.0 - fraction).clamp(0.0, 1.0)
            }
            Skill::Threshold {
                effect: ThresholdEffect::Fortify { damage_taken },
                ..
            } if self.activated => damage_taken.max(0.0),
            _ => 1.0,
        }
    }

    /// Whether the next hit taken is blocked. Call once per hit.
    pub fn register_hit(&mut self, skill: &Skill) -> bool {
        self.hits_taken = self.hits_taken.saturating_add(1);
        match skill {
            Skill::OnDamaged(DefenseSkill::BlockEveryNth { n }) if *n > 0 => {
                self.hits_taken % n == 0
            }
            _ => false,
        }
    }
}

impl Skill {
    /// Extra crit chance in percentage points.
    #[must_use]
    pub fn crit_chance_bonus(&self) -> f64 {
        match self {
            Skill::OnAttack(AttackSkill::CritChance { bonus }) => *bonus,
            _ => 0.0,
        }
    }

    /// Extra crit damage multiplier.
    #[must_use]
    pub fn crit_amplifier(&self) -> f64 {
        match self {
            Skill::OnAttack(AttackSkill::CritAmplify { multiplier }) => multiplier.max(1.0),
            _ => 1.0,
        }
    }

    /// Chance to ignore the opponent's defense.
    #[must_use]
    pub fn ignore_defense_chance(&self) -> f64 {
        match self {
            Skill::OnAttack(AttackSkill::IgnoreDefense { chance }) => chance.clamp(0.0, 1.0),
            _ => 0.0,
        }
    }

    /// Chance to dodge an incoming hit.
    #[must_use]
    pub fn dodge_chance(&self) -> f64 {
        match self {
            Skill::OnDamaged(DefenseSkill::Dodge { chance }) => chance.clamp(0.0, 1.0),
            _ => 0.0,
        }
    }

    /// Absorption share on a kill, bounded by `[base, max]`.
    #[must_use]
    pub fn absorb_fraction(&self, base: f64, max: f64) -> f64 {
        match self {
            Skill::OnKill { absorb_fraction } => absorb_fraction.clamp(base, max),
            _ => base,
        }
    }
}
