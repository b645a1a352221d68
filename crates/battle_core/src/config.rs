//! Tunable simulation parameters.
//!
//! Everything the step reads that is not a per-entity stat lives here so a
//! match can be re-tuned from a RON file without touching code. Every
//! section is `#[serde(default)]`, so a config file only needs to name the
//! values it changes.
//!
//! # Example RON
//!
//! ```ron
//! BattleConfig(
//!     arena: (width: 1200.0, height: 800.0),
//!     escalation: (damage_per_tick: 0.0003, damage_cap: Some(4.0)),
//! )
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BattleError, Result};

/// Simulated ticks per second of match time.
pub const TICK_RATE: u32 = 60;

/// Inclusive tick range for randomized timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickRange {
    /// Shortest duration in ticks.
    pub min: u32,
    /// Longest duration in ticks.
    pub max: u32,
}

impl TickRange {
    /// Create a new range.
    #[must_use]
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    fn is_valid(self) -> bool {
        self.min <= self.max
    }
}

/// Complete configuration for a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Ticks per simulated second.
    pub tick_rate: u32,
    /// Arena geometry and entity sizing.
    pub arena: ArenaConfig,
    /// Targeting and steering.
    pub movement: MovementConfig,
    /// Damage exchange parameters.
    pub combat: CombatConfig,
    /// Time-based escalation of speed, damage and restitution.
    pub escalation: EscalationConfig,
    /// Special-move cooldowns and effect strengths.
    pub special_moves: SpecialMoveConfig,
    /// Year progression cadence.
    pub progression: ProgressionConfig,
    /// Fast-forward safety cap in ticks.
    pub fast_forward_cap: u64,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            tick_rate: TICK_RATE,
            arena: ArenaConfig::default(),
            movement: MovementConfig::default(),
            combat: CombatConfig::default(),
            escalation: EscalationConfig::default(),
            special_moves: SpecialMoveConfig::default(),
            progression: ProgressionConfig::default(),
            fast_forward_cap: 200_000,
        }
    }
}

impl BattleConfig {
    /// Parse a config from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        let config: Self = ron::from_str(ron).map_err(|e| BattleError::DataParseError {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| BattleError::DataParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config: Self = ron::from_str(&contents).map_err(|e| BattleError::DataParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable by the step.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: &str| Err(BattleError::InvalidConfig(msg.to_string()));

        if self.tick_rate == 0 {
            return fail("tick_rate must be > 0");
        }
        if self.arena.width <= 0.0 || self.arena.height <= 0.0 {
            return fail("arena dimensions must be > 0");
        }
        if self.arena.min_radius <= 0.0 || self.arena.min_radius > self.arena.max_radius {
            return fail("arena radii must satisfy 0 < min_radius <= max_radius");
        }
        if self.arena.radius_cap < self.arena.max_radius {
            return fail("radius_cap must be >= max_radius");
        }
        if !self.movement.retarget_interval.is_valid() {
            return fail("retarget_interval min must be <= max");
        }
        if !(0.0..=1.0).contains(&self.movement.focus_chance) {
            return fail("focus_chance must be within [0, 1]");
        }
        if self.combat.damage_roll_min <= 0.0 || self.combat.damage_roll_min > self.combat.damage_roll_max {
            return fail("damage roll must satisfy 0 < min <= max");
        }
        if self.combat.pair_cooldown_min > self.combat.pair_cooldown_base {
            return fail("pair_cooldown_min must be <= pair_cooldown_base");
        }
        if self.combat.absorb_fraction < 0.0
            || self.combat.absorb_fraction > self.combat.max_absorb_fraction
        {
            return fail("absorb_fraction must be within [0, max_absorb_fraction]");
        }
        if !(0.0..1.0).contains(&self.combat.max_damage_reduction) {
            return fail("max_damage_reduction must be within [0, 1)");
        }
        let sm = &self.special_moves;
        if ![
            sm.charge_cooldown,
            sm.wave_cooldown,
            sm.fortress_cooldown,
            sm.dance_cooldown,
            sm.bombard_cooldown,
        ]
        .iter()
        .all(|r| r.is_valid())
        {
            return fail("special move cooldown ranges must have min <= max");
        }
        if self.progression.year_interval_secs <= 0.0 {
            return fail("year_interval_secs must be > 0");
        }
        if self.fast_forward_cap == 0 {
            return fail("fast_forward_cap must be > 0");
        }
        Ok(())
    }

    /// Elapsed match time in seconds at `tick`.
    #[must_use]
    pub fn match_seconds(&self, tick: u64) -> f64 {
        tick as f64 / f64::from(self.tick_rate)
    }
}

/// Arena geometry and entity sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Arena width.
    pub width: f64,
    /// Arena height.
    pub height: f64,
    /// Spawn ring radius as a fraction of the smaller arena dimension.
    pub spawn_ring_fraction: f64,
    /// Radius of the most populous entity in the roster.
    pub max_radius: f64,
    /// Radius floor for small populations.
    pub min_radius: f64,
    /// Upper bound on base radius after absorptions.
    pub radius_cap: f64,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 1000.0,
            spawn_ring_fraction: 0.35,
            max_radius: 60.0,
            min_radius: 14.0,
            radius_cap: 140.0,
        }
    }
}

/// Targeting and steering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Random retarget interval.
    pub retarget_interval: TickRange,
    /// Health ratio below which an entity may focus the largest foe.
    pub focus_health_ratio: f64,
    /// Chance of focusing the largest foe when under pressure.
    pub focus_chance: f64,
    /// Initial velocity as a fraction of `speed`.
    pub initial_speed_factor: f64,
    /// Steering acceleration per tick per point of `speed`.
    pub steering_per_speed: f64,
    /// Top speed as a fraction of `speed`, before escalation.
    pub max_speed_factor: f64,
    /// Magnitude of per-tick random jitter.
    pub jitter: f64,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            retarget_interval: TickRange::new(60, 100),
            focus_health_ratio: 0.5,
            focus_chance: 0.4,
            initial_speed_factor: 0.25,
            steering_per_speed: 0.01,
            max_speed_factor: 0.4,
            jitter: 0.05,
        }
    }
}

/// Damage exchange parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Pair re-hit interval at tick 0.
    pub pair_cooldown_base: u32,
    /// Pair re-hit interval floor.
    pub pair_cooldown_min: u32,
    /// Ticks of match time per one-tick reduction of the pair cooldown.
    pub pair_cooldown_shrink_every: u32,
    /// Lower bound of the uniform damage roll.
    pub damage_roll_min: f64,
    /// Upper bound of the uniform damage roll.
    pub damage_roll_max: f64,
    /// Relative speed that yields a speed factor of 1.0.
    pub speed_reference: f64,
    /// Lower clamp of the relative-speed factor.
    pub speed_factor_min: f64,
    /// Upper clamp of the relative-speed factor.
    pub speed_factor_max: f64,
    /// Damage multiplier on a critical hit.
    pub crit_multiplier: f64,
    /// Knockback impulse per point of critical damage.
    pub crit_knockback_per_damage: f64,
    /// Knockback impulse ceiling.
    pub crit_knockback_max: f64,
    /// Extra damage taken per point of `debt_factor`.
    pub debt_surcharge_per_point: f64,
    /// Ceiling on combined defense and skill damage reduction.
    pub max_damage_reduction: f64,
    /// Share of the victim's max health absorbed by the killer.
    pub absorb_fraction: f64,
    /// Ceiling on skill-modified absorption.
    pub max_absorb_fraction: f64,
    /// Health ratio that triggers rage.
    pub rage_threshold: f64,
    /// Steering multiplier while enraged.
    pub rage_steering_multiplier: f64,
    /// Top-speed multiplier while enraged.
    pub rage_speed_multiplier: f64,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            pair_cooldown_base: 30,
            pair_cooldown_min: 8,
            pair_cooldown_shrink_every: 600,
            damage_roll_min: 0.8,
            damage_roll_max: 1.4,
            speed_reference: 4.0,
            speed_factor_min: 0.5,
            speed_factor_max: 2.5,
            crit_multiplier: 2.0,
            crit_knockback_per_damage: 0.04,
            crit_knockback_max: 12.0,
            debt_surcharge_per_point: 0.0025,
            max_damage_reduction: 0.75,
            absorb_fraction: 0.2,
            max_absorb_fraction: 0.4,
            rage_threshold: 0.25,
            rage_steering_multiplier: 1.6,
            rage_speed_multiplier: 1.3,
        }
    }
}

impl CombatConfig {
    /// Pair re-hit interval in effect at `tick`.
    #[must_use]
    pub fn pair_cooldown_at(&self, tick: u64) -> u64 {
        let shrink = tick / u64::from(self.pair_cooldown_shrink_every.max(1));
        u64::from(self.pair_cooldown_base)
            .saturating_sub(shrink)
            .max(u64::from(self.pair_cooldown_min))
    }
}

/// Time-based escalation, keyed to the tick counter.
///
/// Each multiplier grows linearly with elapsed ticks. The caps default to
/// `None`, so escalation is unbounded unless a config names a ceiling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EscalationConfig {
    /// Top-speed growth per tick.
    pub speed_per_tick: f64,
    /// Optional top-speed multiplier ceiling.
    pub speed_cap: Option<f64>,
    /// Damage growth per tick.
    pub damage_per_tick: f64,
    /// Optional damage multiplier ceiling.
    pub damage_cap: Option<f64>,
    /// Restitution at tick 0.
    pub restitution_base: f64,
    /// Restitution growth per tick.
    pub restitution_per_tick: f64,
    /// Optional restitution ceiling.
    pub restitution_cap: Option<f64>,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            speed_per_tick: 0.000_15,
            speed_cap: None,
            damage_per_tick: 0.000_2,
            damage_cap: None,
            restitution_base: 0.9,
            restitution_per_tick: 0.000_05,
            restitution_cap: None,
        }
    }
}

fn ramp(base: f64, per_tick: f64, tick: u64, cap: Option<f64>) -> f64 {
    let value = base + per_tick * tick as f64;
    match cap {
        Some(cap) => value.min(cap),
        None => value,
    }
}

impl EscalationConfig {
    /// Top-speed multiplier at `tick` (the "chaos" ramp).
    #[must_use]
    pub fn speed_multiplier(&self, tick: u64) -> f64 {
        ramp(1.0, self.speed_per_tick, tick, self.speed_cap).max(1.0)
    }

    /// Damage multiplier at `tick`, floored at 1.0.
    #[must_use]
    pub fn damage_multiplier(&self, tick: u64) -> f64 {
        ramp(1.0, self.damage_per_tick, tick, self.damage_cap).max(1.0)
    }

    /// Restitution for entity and wall bounces at `tick`.
    #[must_use]
    pub fn restitution(&self, tick: u64) -> f64 {
        ramp(
            self.restitution_base,
            self.restitution_per_tick,
            tick,
            self.restitution_cap,
        )
        .max(0.0)
    }
}

/// Special-move cooldowns and effect strengths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecialMoveConfig {
    /// Charge cooldown range.
    pub charge_cooldown: TickRange,
    /// Charge dash duration.
    pub charge_duration: u32,
    /// Dash speed as a multiple of current top speed.
    pub charge_speed_multiplier: f64,
    /// Wave cooldown range.
    pub wave_cooldown: TickRange,
    /// Wave reach.
    pub wave_radius: f64,
    /// Impulse at the wave's center, falling off linearly to zero at its edge.
    pub wave_strength: f64,
    /// Fortress cooldown range.
    pub fortress_cooldown: TickRange,
    /// Fortress duration.
    pub fortress_duration: u32,
    /// Velocity retained each tick while fortified.
    pub fortress_velocity_retention: f64,
    /// Share of incoming knockback retained while fortified.
    pub fortress_knockback_retention: f64,
    /// Dance cooldown range.
    pub dance_cooldown: TickRange,
    /// Dance duration.
    pub dance_duration: u32,
    /// Velocity multiplier while dancing.
    pub dance_speed_multiplier: f64,
    /// Lateral zig-zag impulse.
    pub dance_zigzag: f64,
    /// Ticks per zig-zag half period.
    pub dance_zigzag_period: u32,
    /// Bombard cooldown range.
    pub bombard_cooldown: TickRange,
}

impl Default for SpecialMoveConfig {
    fn default() -> Self {
        Self {
            charge_cooldown: TickRange::new(100, 160),
            charge_duration: 18,
            charge_speed_multiplier: 2.5,
            wave_cooldown: TickRange::new(120, 180),
            wave_radius: 180.0,
            wave_strength: 6.0,
            fortress_cooldown: TickRange::new(120, 180),
            fortress_duration: 60,
            fortress_velocity_retention: 0.05,
            fortress_knockback_retention: 0.2,
            dance_cooldown: TickRange::new(100, 150),
            dance_duration: 45,
            dance_speed_multiplier: 1.6,
            dance_zigzag: 1.5,
            dance_zigzag_period: 10,
            bombard_cooldown: TickRange::new(110, 170),
        }
    }
}

/// Year progression cadence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    /// Whether stats advance through the years during a match.
    pub enabled: bool,
    /// Simulated seconds between progressions.
    pub year_interval_secs: f64,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            year_interval_secs: 10.0,
        }
    }
}

impl ProgressionConfig {
    /// Ticks between progressions at `tick_rate`.
    #[must_use]
    pub fn interval_ticks(&self, tick_rate: u32) -> u64 {
        (self.year_interval_secs * f64::from(tick_rate)).round().max(1.0) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(BattleConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config = BattleConfig::from_ron_str(
            "(arena: (width: 1200.0), escalation: (damage_cap: Some(4.0)))",
        )
        .unwrap();
        assert_eq!(config.arena.width, 1200.0);
        assert_eq!(config.arena.height, ArenaConfig::default().height);
        assert_eq!(config.escalation.damage_cap, Some(4.0));
        assert_eq!(config.tick_rate, TICK_RATE);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = BattleConfig::from_ron_str("(movement: (retarget_interval: (min: 90, max: 10)))");
        assert!(matches!(result, Err(BattleError::InvalidConfig(_))));

        let result = BattleConfig::from_ron_str("(tick_rate: 0)");
        assert!(result.is_err());
    }

    #[test]
    fn test_escalation_grows_with_ticks() {
        let esc = EscalationConfig::default();
        assert_eq!(esc.damage_multiplier(0), 1.0);
        assert!(esc.damage_multiplier(10_000) > esc.damage_multiplier(1_000));
        assert!(esc.speed_multiplier(10_000) > 1.0);
        assert!(esc.restitution(10_000) > esc.restitution(0));
    }

    #[test]
    fn test_escalation_caps() {
        let esc = EscalationConfig {
            damage_cap: Some(1.5),
            restitution_cap: Some(1.0),
            ..EscalationConfig::default()
        };
        assert_eq!(esc.damage_multiplier(1_000_000), 1.5);
        assert_eq!(esc.restitution(1_000_000), 1.0);
    }

    #[test]
    fn test_damage_multiplier_floor() {
        let esc = EscalationConfig {
            damage_per_tick: -1.0,
            ..EscalationConfig::default()
        };
        assert_eq!(esc.damage_multiplier(500), 1.0);
    }

    #[test]
    fn test_pair_cooldown_shrinks_to_floor() {
        let combat = CombatConfig::default();
        assert_eq!(combat.pair_cooldown_at(0), 30);
        assert_eq!(combat.pair_cooldown_at(600 * 5), 25);
        assert_eq!(combat.pair_cooldown_at(u64::MAX / 2), 8);
    }

    #[test]
    fn test_progression_interval_ticks() {
        let progression = ProgressionConfig::default();
        assert_eq!(progression.interval_ticks(60), 600);
    }
}
