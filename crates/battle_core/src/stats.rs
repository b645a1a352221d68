//! Stat derivation from economic indicators.
//!
//! Each combat stat is driven by one or two indicators and clamped to its
//! own range, so an outlier (hyperinflation, a city-state's per-capita
//! output) moves exactly one gameplay axis and never breaks the physics.
//!
//! | Stat | Driver | Range |
//! |---|---|---|
//! | `max_health` | population | 500 – 10 000 |
//! | `attack` | GDP, GDP growth | 25 – 110 |
//! | `speed` | exports % GDP | 3 – 20 |
//! | `crit_chance` | inflation | 5 – 35 (%) |
//! | `defense` | GDP per capita | 0 – 30 |
//! | `drain` | net investment % GDP | 0 – 30 (%) |
//! | `debt_factor` | debt % GDP | 0 – 250 |
//! | `population_mass` | population | unclamped, > 0 |

use serde::{Deserialize, Serialize};

use crate::indicators::IndicatorSnapshot;

/// Exponent of the population power law used for entity size.
pub const POPULATION_SIZE_EXPONENT: f64 = 0.4;

/// Inclusive numeric range a derived stat is clamped into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatRange {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

impl StatRange {
    const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Clamp `value` into the range.
    #[must_use]
    pub fn clamp(self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Whether `value` lies inside the range.
    #[must_use]
    pub fn contains(self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Range of the health base before the ×5 multiplier.
pub const HEALTH_BASE_RANGE: StatRange = StatRange::new(100.0, 2000.0);
/// Multiplier applied to the clamped health base.
pub const HEALTH_MULTIPLIER: f64 = 5.0;
/// Range of `max_health`.
pub const MAX_HEALTH_RANGE: StatRange = StatRange::new(500.0, 10_000.0);
/// Range of `attack`.
pub const ATTACK_RANGE: StatRange = StatRange::new(25.0, 110.0);
/// Range of `speed`.
pub const SPEED_RANGE: StatRange = StatRange::new(3.0, 20.0);
/// Range of `crit_chance` (percent).
pub const CRIT_RANGE: StatRange = StatRange::new(5.0, 35.0);
/// Range of `defense`.
pub const DEFENSE_RANGE: StatRange = StatRange::new(0.0, 30.0);
/// Range of `drain` (percent of damage dealt).
pub const DRAIN_RANGE: StatRange = StatRange::new(0.0, 30.0);
/// Range of `debt_factor` (debt percent of GDP).
pub const DEBT_RANGE: StatRange = StatRange::new(0.0, 250.0);

/// Neutral values substituted for missing or invalid indicators.
pub mod defaults {
    /// Population when unknown.
    pub const POPULATION: f64 = 10_000_000.0;
    /// GDP (current USD) when unknown.
    pub const GDP: f64 = 100_000_000_000.0;
    /// GDP growth (percent) when unknown.
    pub const GDP_GROWTH: f64 = 2.0;
    /// Exports (percent of GDP) when unknown.
    pub const EXPORTS_PCT_GDP: f64 = 30.0;
    /// Inflation (percent) when unknown.
    pub const INFLATION: f64 = 2.0;
    /// GDP per capita (USD) when unknown.
    pub const GDP_PER_CAPITA: f64 = 10_000.0;
    /// Net investment (percent of GDP) when unknown.
    pub const INVESTMENT_PCT_GDP: f64 = 1.0;
    /// Debt (percent of GDP) when unknown.
    pub const DEBT_PCT_GDP: f64 = 60.0;
}

/// Combat profile of one country for one year.
///
/// Immutable once derived; a new bundle is derived on each year progression.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatBundle {
    /// Maximum health points.
    pub max_health: u32,
    /// Base damage per exchange.
    pub attack: f64,
    /// Cruise speed, also the initial velocity scale.
    pub speed: f64,
    /// Critical hit chance in percent.
    pub crit_chance: f64,
    /// Percent damage reduction applied to incoming hits.
    pub defense: f64,
    /// Percent of damage dealt converted into self-heal.
    pub drain: f64,
    /// Raw population, used for size and mass.
    pub population_mass: f64,
    /// Debt burden; every point adds 0.25% to damage taken.
    pub debt_factor: f64,
}

impl StatBundle {
    /// Bundle derived from an entirely empty snapshot.
    #[must_use]
    pub fn neutral() -> Self {
        derive_stats(&IndicatorSnapshot::EMPTY)
    }

    /// Whether every field lies in its documented range.
    #[must_use]
    pub fn is_within_ranges(&self) -> bool {
        MAX_HEALTH_RANGE.contains(f64::from(self.max_health))
            && ATTACK_RANGE.contains(self.attack)
            && SPEED_RANGE.contains(self.speed)
            && CRIT_RANGE.contains(self.crit_chance)
            && DEFENSE_RANGE.contains(self.defense)
            && DRAIN_RANGE.contains(self.drain)
            && DEBT_RANGE.contains(self.debt_factor)
            && self.population_mass.is_finite()
            && self.population_mass > 0.0
    }
}

/// Finite value or the neutral default.
fn finite_or(value: Option<f64>, default: f64) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(default)
}

/// Finite, strictly positive value or the neutral default.
fn positive_or(value: Option<f64>, default: f64) -> f64 {
    value
        .filter(|v| v.is_finite() && *v > 0.0)
        .unwrap_or(default)
}

/// Derive a [`StatBundle`] from one indicator snapshot.
///
/// Never fails: any missing, negative-where-impossible, or non-finite
/// indicator is replaced by its neutral default before the mapping runs.
#[must_use]
pub fn derive_stats(snapshot: &IndicatorSnapshot) -> StatBundle {
    let population = positive_or(snapshot.population, defaults::POPULATION);
    let per_capita = positive_or(snapshot.gdp_per_capita, defaults::GDP_PER_CAPITA);
    let gdp = positive_or(snapshot.gdp, defaults::GDP);
    let growth = finite_or(snapshot.gdp_growth, defaults::GDP_GROWTH);
    let exports = finite_or(snapshot.exports_pct_gdp, defaults::EXPORTS_PCT_GDP);
    let inflation = finite_or(snapshot.inflation, defaults::INFLATION);
    let investment = finite_or(snapshot.investment_pct_gdp, defaults::INVESTMENT_PCT_GDP);
    let debt = finite_or(snapshot.debt_pct_gdp, defaults::DEBT_PCT_GDP);

    let health_base = HEALTH_BASE_RANGE.clamp(population.powf(0.4) / 2.5);
    let max_health = (health_base * HEALTH_MULTIPLIER).round() as u32;

    StatBundle {
        max_health,
        attack: ATTACK_RANGE.clamp(gdp.powf(0.3) / 130.0 + growth * 3.0),
        speed: SPEED_RANGE.clamp(4.0 + exports * 0.12),
        crit_chance: CRIT_RANGE.clamp(5.0 + inflation * 2.0),
        defense: DEFENSE_RANGE.clamp((per_capita.max(500.0).log10() - 3.0) * 15.0),
        drain: DRAIN_RANGE.clamp(investment * 6.0),
        population_mass: population,
        debt_factor: DEBT_RANGE.clamp(debt),
    }
}

/// Power-law size scale of a population.
#[must_use]
pub fn population_scale(population: f64) -> f64 {
    population.max(1.0).powf(POPULATION_SIZE_EXPONENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> IndicatorSnapshot {
        IndicatorSnapshot {
            population: Some(50_000_000.0),
            gdp: Some(1.5e12),
            gdp_growth: Some(3.0),
            exports_pct_gdp: Some(40.0),
            inflation: Some(4.0),
            gdp_per_capita: Some(30_000.0),
            investment_pct_gdp: Some(2.0),
            debt_pct_gdp: Some(80.0),
        }
    }

    #[test]
    fn test_neutral_bundle_in_range() {
        let neutral = StatBundle::neutral();
        assert!(neutral.is_within_ranges());
        assert_eq!(neutral.population_mass, defaults::POPULATION);
        assert!((neutral.debt_factor - defaults::DEBT_PCT_GDP).abs() < 1e-9);
    }

    #[test]
    fn test_known_values() {
        let stats = derive_stats(&snapshot());

        // 5e7^0.4 / 2.5 ≈ 480.4, × 5 ≈ 2402
        assert!((2390..=2410).contains(&stats.max_health));
        assert!((stats.speed - 8.8).abs() < 1e-9);
        assert!((stats.crit_chance - 13.0).abs() < 1e-9);
        assert!((stats.drain - 12.0).abs() < 1e-9);
        assert!((stats.debt_factor - 80.0).abs() < 1e-9);
        // log10(30000) = 4.477 → (4.477 - 3) × 15 ≈ 22.2
        assert!((stats.defense - 22.16).abs() < 0.05);
    }

    #[test]
    fn test_outliers_are_clamped() {
        let stats = derive_stats(&IndicatorSnapshot {
            population: Some(1.0e12),
            gdp: Some(1.0e16),
            gdp_growth: Some(90.0),
            exports_pct_gdp: Some(400.0),
            inflation: Some(5000.0),
            gdp_per_capita: Some(1.0e7),
            investment_pct_gdp: Some(300.0),
            debt_pct_gdp: Some(900.0),
        });

        assert_eq!(stats.max_health, 10_000);
        assert_eq!(stats.attack, ATTACK_RANGE.max);
        assert_eq!(stats.speed, SPEED_RANGE.max);
        assert_eq!(stats.crit_chance, CRIT_RANGE.max);
        assert_eq!(stats.defense, DEFENSE_RANGE.max);
        assert_eq!(stats.drain, DRAIN_RANGE.max);
        assert_eq!(stats.debt_factor, DEBT_RANGE.max);
    }

    #[test]
    fn test_tiny_and_negative_values_are_clamped() {
        let stats = derive_stats(&IndicatorSnapshot {
            population: Some(500.0),
            gdp: Some(1.0),
            gdp_growth: Some(-40.0),
            exports_pct_gdp: Some(-10.0),
            inflation: Some(-5.0),
            gdp_per_capita: Some(50.0),
            investment_pct_gdp: Some(-3.0),
            debt_pct_gdp: Some(-1.0),
        });

        assert_eq!(stats.max_health, 500);
        assert_eq!(stats.attack, ATTACK_RANGE.min);
        assert_eq!(stats.speed, SPEED_RANGE.min);
        assert_eq!(stats.crit_chance, CRIT_RANGE.min);
        assert_eq!(stats.defense, 0.0);
        assert_eq!(stats.drain, 0.0);
        assert_eq!(stats.debt_factor, 0.0);
    }

    #[test]
    fn test_invalid_indicators_fall_back_to_defaults() {
        let stats = derive_stats(&IndicatorSnapshot {
            population: Some(f64::NAN),
            gdp: Some(f64::INFINITY),
            inflation: Some(f64::NEG_INFINITY),
            gdp_per_capita: Some(-3.0),
            ..IndicatorSnapshot::EMPTY
        });

        assert_eq!(stats, StatBundle::neutral());
    }

    #[test]
    fn test_missing_gdp_ignores_population() {
        let small = derive_stats(&IndicatorSnapshot {
            population: Some(1.0e6),
            gdp_growth: Some(0.0),
            ..IndicatorSnapshot::EMPTY
        });
        let large = derive_stats(&IndicatorSnapshot {
            population: Some(1.0e9),
            gdp_growth: Some(0.0),
            ..IndicatorSnapshot::EMPTY
        });
        assert!(large.max_health > small.max_health);
        assert_eq!(small.attack, large.attack);
        assert_eq!(
            small.attack,
            derive_stats(&IndicatorSnapshot {
                gdp: Some(defaults::GDP),
                gdp_growth: Some(0.0),
                ..IndicatorSnapshot::EMPTY
            })
            .attack
        );
    }

    #[test]
    fn test_population_drives_health_monotonically() {
        let mut previous = 0;
        for exponent in 3..12 {
            let stats = derive_stats(&IndicatorSnapshot {
                population: Some(10f64.powi(exponent)),
                ..snapshot()
            });
            assert!(stats.max_health >= previous);
            previous = stats.max_health;
        }
    }

    #[test]
    fn test_population_scale_monotonic() {
        assert!(population_scale(1.0e9) > population_scale(1.0e6));
        assert!((population_scale(0.0) - 1.0).abs() < 1e-12);
    }
}
