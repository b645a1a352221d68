//! Data-driven skill and special-move tables.
//!
//! A [`Catalog`] maps country codes to a [`Skill`] and a
//! [`SpecialMoveKind`]. It ships with a built-in roster and can be replaced
//! or extended from RON:
//!
//! ```ron
//! Catalog(
//!     skills: {
//!         "USA": OnAttack(CritAmplify(multiplier: 2.0)),
//!         "FRA": Periodic(interval: 300, effect: Heal(fraction: 0.03)),
//!     },
//!     special_moves: {
//!         "USA": charge,
//!     },
//! )
//! ```
//!
//! Codes missing from either table resolve to `None`.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BattleError, Result};
use crate::skills::{
    AttackSkill, DefenseSkill, PeriodicEffect, Skill, SkillTable, ThresholdEffect,
};
use crate::special_moves::{SpecialMoveKind, SpecialMoveTable};

/// Skill and special-move lookup by country code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    /// Skill per country code.
    pub skills: BTreeMap<String, Skill>,
    /// Special move per country code.
    pub special_moves: BTreeMap<String, SpecialMoveKind>,
}

impl Catalog {
    /// Empty catalog: every country resolves to no skill and no special move.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Built-in catalog covering the major economies.
    #[must_use]
    pub fn builtin() -> Self {
        use SpecialMoveKind::{Bombard, Charge, Dance, Fortress, Wave};

        let skills = [
            ("USA", Skill::OnAttack(AttackSkill::CritAmplify { multiplier: 2.0 })),
            (
                "CHN",
                Skill::YearChange {
                    attack_bonus: 3.0,
                    defense_bonus: 1.0,
                },
            ),
            ("JPN", Skill::OnDamaged(DefenseSkill::BlockEveryNth { n: 4 })),
            ("DEU", Skill::OnDamaged(DefenseSkill::DamageReduction { fraction: 0.15 })),
            (
                "GBR",
                Skill::Threshold {
                    health_ratio: 0.3,
                    effect: ThresholdEffect::AttackBoost { multiplier: 1.2 },
                },
            ),
            (
                "FRA",
                Skill::Periodic {
                    interval: 300,
                    effect: PeriodicEffect::Heal { fraction: 0.03 },
                },
            ),
            ("IND", Skill::OnKill { absorb_fraction: 0.4 }),
            (
                "BRA",
                Skill::Periodic {
                    interval: 240,
                    effect: PeriodicEffect::StatRoll {
                        min_multiplier: 0.8,
                        max_multiplier: 1.5,
                        duration: 120,
                    },
                },
            ),
            (
                "RUS",
                Skill::Threshold {
                    health_ratio: 0.3,
                    effect: ThresholdEffect::Fortify { damage_taken: 0.7 },
                },
            ),
            ("KOR", Skill::OnAttack(AttackSkill::CritChance { bonus: 10.0 })),
            (
                "CAN",
                Skill::Periodic {
                    interval: 360,
                    effect: PeriodicEffect::EnemySlow {
                        radius: 200.0,
                        retention: 0.5,
                    },
                },
            ),
            ("AUS", Skill::OnDamaged(DefenseSkill::Dodge { chance: 0.12 })),
            ("ITA", Skill::OnAttack(AttackSkill::DamageBoost { multiplier: 1.1 })),
            (
                "MEX",
                Skill::Threshold {
                    health_ratio: 0.3,
                    effect: ThresholdEffect::Recover { fraction: 0.25 },
                },
            ),
            (
                "IDN",
                Skill::YearChange {
                    attack_bonus: 2.0,
                    defense_bonus: 2.0,
                },
            ),
            ("TUR", Skill::OnAttack(AttackSkill::IgnoreDefense { chance: 0.3 })),
            ("SAU", Skill::OnDamaged(DefenseSkill::DamageReduction { fraction: 0.1 })),
            ("CHE", Skill::OnDamaged(DefenseSkill::Dodge { chance: 0.18 })),
            ("ESP", Skill::OnKill { absorb_fraction: 0.3 }),
            (
                "NLD",
                Skill::Periodic {
                    interval: 420,
                    effect: PeriodicEffect::Heal { fraction: 0.05 },
                },
            ),
        ];

        let special_moves = [
            ("USA", Charge),
            ("CHN", Wave),
            ("RUS", Fortress),
            ("BRA", Dance),
            ("GBR", Bombard),
            ("DEU", Fortress),
            ("FRA", Charge),
            ("JPN", Dance),
            ("IND", Wave),
            ("KOR", Bombard),
            ("CAN", Wave),
            ("AUS", Dance),
            ("ITA", Charge),
            ("TUR", Charge),
            ("SAU", Bombard),
            ("CHE", Fortress),
        ];

        Self {
            skills: skills
                .into_iter()
                .map(|(code, skill)| (code.to_string(), skill))
                .collect(),
            special_moves: special_moves
                .into_iter()
                .map(|(code, kind)| (code.to_string(), kind))
                .collect(),
        }
    }

    /// Parse a catalog from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        ron::from_str(ron).map_err(|e| BattleError::DataParseError {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })
    }

    /// Load a catalog from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| BattleError::DataParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        ron::from_str(&contents).map_err(|e| BattleError::DataParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Builder: assign a skill to `code`.
    #[must_use]
    pub fn with_skill(mut self, code: impl Into<String>, skill: Skill) -> Self {
        self.skills.insert(code.into(), skill);
        self
    }

    /// Builder: assign a special move to `code`.
    #[must_use]
    pub fn with_special_move(mut self, code: impl Into<String>, kind: SpecialMoveKind) -> Self {
        self.special_moves.insert(code.into(), kind);
        self
    }

    /// Overlay `other` on top of this catalog; entries in `other` win.
    #[must_use]
    pub fn merged(mut self, other: Catalog) -> Self {
        self.skills.extend(other.skills);
        self.special_moves.extend(other.special_moves);
        self
    }
}

impl SkillTable for Catalog {
    fn skill_for(&self, code: &str) -> Skill {
        self.skills.get(code).copied().unwrap_or_default()
    }
}

impl SpecialMoveTable for Catalog {
    fn special_move_for(&self, code: &str) -> SpecialMoveKind {
        self.special_moves.get(code).copied().unwrap_or_default()
    }
}
