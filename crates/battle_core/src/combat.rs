//! Damage exchange resolution.
//!
//! One side of a contact exchange is resolved by [`resolve_hit`]. The
//! modifiers apply in a fixed order:
//!
//! 1. Base: attack × relative-speed factor × uniform roll
//! 2. Attacker skill multipliers (damage boost, threshold boost, stat roll)
//! 3. Critical roll against crit chance plus skill bonus
//! 4. Defender dodge or block (forces zero and stops here)
//! 5. Defender defense and skill reduction, capped at `max_damage_reduction`
//! 6. Defender debt surcharge
//! 7. Time-based escalation
//!
//! Landed damage is rounded and floored at 1.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{BattleConfig, CombatConfig};
use crate::skills::Skill;

/// Everything about the attacking side that affects damage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackProfile {
    /// Attack stat including year bonuses.
    pub attack: f64,
    /// Crit chance in percent.
    pub crit_chance: f64,
    /// Attacker's skill.
    pub skill: Skill,
    /// Combined outgoing multiplier from the skill runtime.
    pub attack_multiplier: f64,
}

/// Everything about the defending side that affects damage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefenseProfile {
    /// Defense stat in percent, including year bonuses.
    pub defense: f64,
    /// Debt ratio driving the damage surcharge.
    pub debt_factor: f64,
    /// Defender's skill.
    pub skill: Skill,
    /// Incoming multiplier from the skill runtime.
    pub damage_taken_multiplier: f64,
    /// Whether block-every-nth blocks this hit.
    pub blocked: bool,
}

/// How a hit ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitKind {
    /// Damage landed.
    Landed,
    /// Defender dodged.
    Dodged,
    /// Defender blocked.
    Blocked,
}

/// Result of one side of an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitOutcome {
    /// Damage to apply (0 when dodged or blocked).
    pub damage: u32,
    /// Whether the hit was critical.
    pub crit: bool,
    /// How the hit ended.
    pub kind: HitKind,
}

impl HitOutcome {
    fn avoided(kind: HitKind) -> Self {
        Self {
            damage: 0,
            crit: false,
            kind,
        }
    }
}

/// Relative-speed damage factor.
#[must_use]
pub fn speed_factor(relative_speed: f64, config: &CombatConfig) -> f64 {
    let reference = config.speed_reference.max(f64::EPSILON);
    (relative_speed / reference).clamp(config.speed_factor_min, config.speed_factor_max)
}

/// Resolve the damage `attacker` deals to `defender` on contact.
pub fn resolve_hit<R: Rng + ?Sized>(
    attacker: &AttackProfile,
    defender: &DefenseProfile,
    relative_speed: f64,
    tick: u64,
    config: &BattleConfig,
    rng: &mut R,
) -> HitOutcome {
    let combat = &config.combat;

    let roll = rng.gen_range(combat.damage_roll_min..=combat.damage_roll_max);
    let mut damage = attacker.attack.max(0.0) * speed_factor(relative_speed, combat) * roll;
    damage *= attacker.attack_multiplier;

    let crit_chance = attacker.crit_chance + attacker.skill.crit_chance_bonus();
    let crit = rng.gen::<f64>() * 100.0 < crit_chance;
    if crit {
        damage *= combat.crit_multiplier * attacker.skill.crit_amplifier();
    }

    let dodge = defender.skill.dodge_chance();
    if dodge > 0.0 && rng.gen::<f64>() < dodge {
        return HitOutcome::avoided(HitKind::Dodged);
    }
    if defender.blocked {
        return HitOutcome::avoided(HitKind::Blocked);
    }

    let ignore = attacker.skill.ignore_defense_chance();
    let pierced = ignore > 0.0 && rng.gen::<f64>() < ignore;
    let defense_share = if pierced {
        0.0
    } else {
        (defender.defense / 100.0).clamp(0.0, 1.0)
    };
    let kept = (1.0 - defense_share) * defender.damage_taken_multiplier.max(0.0);
    let reduction = (1.0 - kept).clamp(0.0, combat.max_damage_reduction);
    damage *= 1.0 - reduction;

    damage *= 1.0 + defender.debt_factor.max(0.0) * combat.debt_surcharge_per_point;
    damage *= config.escalation.damage_multiplier(tick);

    HitOutcome {
        damage: round_damage(damage),
        crit,
        kind: HitKind::Landed,
    }
}

fn round_damage(value: f64) -> u32 {
    if !value.is_finite() {
        return 1;
    }
    value.round().clamp(1.0, f64::from(u32::MAX)) as u32
}

/// Self-heal from `drain` percent of `damage` dealt. At least 1 when both
/// are positive.
#[must_use]
pub fn drain_heal(damage: u32, drain: f64) -> u32 {
    if damage == 0 || drain <= 0.0 {
        return 0;
    }
    let heal = (f64::from(damage) * drain / 100.0).round();
    (heal as u32).max(1)
}

/// Knockback impulse for a critical hit of `damage`.
#[must_use]
pub fn crit_knockback(damage: u32, config: &CombatConfig) -> f64 {
    (f64::from(damage) * config.crit_knockback_per_damage).clamp(1.0, config.crit_knockback_max.max(1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skills::{AttackSkill, DefenseSkill};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn attacker(attack: f64) -> AttackProfile {
        AttackProfile {
            attack,
            crit_chance: 0.0,
            skill: Skill::None,
            attack_multiplier: 1.0,
        }
    }

    fn defender() -> DefenseProfile {
        DefenseProfile {
            defense: 0.0,
            debt_factor: 0.0,
            skill: Skill::None,
            damage_taken_multiplier: 1.0,
            blocked: false,
        }
    }

    #[test]
    fn test_damage_within_roll_bounds() {
        let config = BattleConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..500 {
            let out = resolve_hit(&attacker(50.0), &defender(), 4.0, 0, &config, &mut rng);
            assert_eq!(out.kind, HitKind::Landed);
            assert!(!out.crit);
            assert!((40..=70).contains(&out.damage), "damage {}", out.damage);
        }
    }

    #[test]
    fn test_block_short_circuits() {
        let config = BattleConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let def = DefenseProfile {
            blocked: true,
            ..defender()
        };
        let out = resolve_hit(&attacker(100.0), &def, 4.0, 10_000, &config, &mut rng);
        assert_eq!(out, HitOutcome::avoided(HitKind::Blocked));
    }

    #[test]
    fn test_certain_dodge() {
        let config = BattleConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let def = DefenseProfile {
            skill: Skill::OnDamaged(DefenseSkill::Dodge { chance: 1.0 }),
            ..defender()
        };
        let out = resolve_hit(&attacker(80.0), &def, 4.0, 0, &config, &mut rng);
        assert_eq!(out.kind, HitKind::Dodged);
        assert_eq!(out.damage, 0);
    }

    #[test]
    fn test_certain_crit_doubles() {
        let config = BattleConfig {
            combat: CombatConfig {
                damage_roll_min: 1.0,
                damage_roll_max: 1.0,
                ..CombatConfig::default()
            },
            ..BattleConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let att = AttackProfile {
            crit_chance: 100.0,
            ..attacker(50.0)
        };
        let out = resolve_hit(&att, &defender(), 4.0, 0, &config, &mut rng);
        assert!(out.crit);
        assert_eq!(out.damage, 100);

        let amplified = AttackProfile {
            skill: Skill::OnAttack(AttackSkill::CritAmplify { multiplier: 2.0 }),
            ..att
        };
        let out = resolve_hit(&amplified, &defender(), 4.0, 0, &config, &mut rng);
        assert_eq!(out.damage, 200);
    }

    #[test]
    fn test_reduction_is_capped() {
        let config = BattleConfig {
            combat: CombatConfig {
                damage_roll_min: 1.0,
                damage_roll_max: 1.0,
                ..CombatConfig::default()
            },
            ..BattleConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let def = DefenseProfile {
            defense: 30.0,
            damage_taken_multiplier: 0.1,
            ..defender()
        };
        let out = resolve_hit(&attacker(100.0), &def, 4.0, 0, &config, &mut rng);
        assert_eq!(out.damage, 25);
    }

    #[test]
    fn test_debt_and_escalation_increase_damage() {
        let config = BattleConfig {
            combat: CombatConfig {
                damage_roll_min: 1.0,
                damage_roll_max: 1.0,
                ..CombatConfig::default()
            },
            ..BattleConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let base = resolve_hit(&attacker(100.0), &defender(), 4.0, 0, &config, &mut rng).damage;
        let indebted = DefenseProfile {
            debt_factor: 200.0,
            ..defender()
        };
        let with_debt = resolve_hit(&attacker(100.0), &indebted, 4.0, 0, &config, &mut rng).damage;
        assert_eq!(base, 100);
        assert_eq!(with_debt, 150);

        let late = resolve_hit(&attacker(100.0), &defender(), 4.0, 5_000, &config, &mut rng).damage;
        assert_eq!(late, 200);
    }

    #[test]
    fn test_minimum_damage_is_one() {
        let config = BattleConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let out = resolve_hit(&attacker(0.0), &defender(), 0.0, 0, &config, &mut rng);
        assert_eq!(out.damage, 1);
    }

    #[test]
    fn test_drain_and_knockback_floors() {
        assert_eq!(drain_heal(10, 1.0), 1);
        assert_eq!(drain_heal(100, 20.0), 20);
        assert_eq!(drain_heal(0, 20.0), 0);
        assert_eq!(drain_heal(50, 0.0), 0);

        let combat = CombatConfig::default();
        assert_eq!(crit_knockback(1, &combat), 1.0);
        assert_eq!(crit_knockback(100_000, &combat), combat.crit_knockback_max);
    }
}
