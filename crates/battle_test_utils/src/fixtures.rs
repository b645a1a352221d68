//! Test fixtures and helpers.
//!
//! Pre-built indicator data, rosters and matches for consistent testing.
//! Numbers are rounded real-world magnitudes; they only need to be
//! plausible, not accurate.

use battle_core::catalog::Catalog;
use battle_core::components::Identity;
use battle_core::config::BattleConfig;
use battle_core::indicators::{IndicatorSeries, IndicatorSnapshot, StaticIndicatorProvider};
use battle_core::simulation::{MatchSetup, Simulation};

/// Year every fixture series starts in.
pub const FIXTURE_START_YEAR: i32 = 2000;

/// Fixture countries: code, name, population, GDP (USD).
pub const COUNTRIES: &[(&str, &str, f64, f64)] = &[
    ("USA", "United States", 3.3e8, 2.1e13),
    ("CHN", "China", 1.4e9, 1.4e13),
    ("JPN", "Japan", 1.26e8, 5.0e12),
    ("DEU", "Germany", 8.3e7, 3.8e12),
    ("GBR", "United Kingdom", 6.7e7, 2.8e12),
    ("FRA", "France", 6.7e7, 2.7e12),
    ("IND", "India", 1.38e9, 2.8e12),
    ("BRA", "Brazil", 2.1e8, 1.8e12),
    ("RUS", "Russia", 1.44e8, 1.7e12),
    ("KOR", "South Korea", 5.2e7, 1.6e12),
    ("CAN", "Canada", 3.8e7, 1.7e12),
    ("AUS", "Australia", 2.5e7, 1.4e12),
];

/// RON text for a two-country setup, used to exercise data loading.
pub const SAMPLE_SETUP_RON: &str = r#"(
    entries: [
        (
            identity: (code: "AAA", name: "Alphaland", palette: ((200, 30, 30), (255, 255, 255))),
            series: {
                2000: (population: Some(20000000.0), gdp: Some(400000000000.0)),
                2001: (population: Some(21000000.0), gdp_growth: Some(4.0)),
            },
        ),
        (
            identity: (code: "BBB", name: "Betastan", palette: ((30, 30, 200), (255, 255, 0))),
            series: {
                2000: (population: Some(15000000.0), inflation: Some(9.0)),
            },
        ),
    ],
    start_year: 2000,
)"#;

/// A complete snapshot for a country of `population` and `gdp`.
#[must_use]
pub fn snapshot(population: f64, gdp: f64) -> IndicatorSnapshot {
    IndicatorSnapshot {
        population: Some(population),
        gdp: Some(gdp),
        gdp_growth: Some(2.5),
        exports_pct_gdp: Some(25.0),
        inflation: Some(3.0),
        gdp_per_capita: Some(gdp / population),
        investment_pct_gdp: Some(2.0),
        debt_pct_gdp: Some(70.0),
    }
}

/// `years` consecutive snapshots growing 2% a year from `FIXTURE_START_YEAR`.
#[must_use]
pub fn growing_series(population: f64, gdp: f64, years: i32) -> IndicatorSeries {
    (0..years.max(1)).fold(IndicatorSeries::new(), |series, offset| {
        let growth = 1.02_f64.powi(offset);
        series.with_year(
            FIXTURE_START_YEAR + offset,
            snapshot(population * growth, gdp * growth * growth),
        )
    })
}

/// Setup with the first `n` fixture countries, each with `years` of data.
///
/// # Panics
///
/// Panics if `n` exceeds the number of fixture countries.
#[must_use]
pub fn sample_setup(n: usize, years: i32) -> MatchSetup {
    assert!(n <= COUNTRIES.len(), "only {} fixture countries", COUNTRIES.len());
    COUNTRIES[..n]
        .iter()
        .fold(MatchSetup::new(FIXTURE_START_YEAR), |setup, (code, name, pop, gdp)| {
            setup.with_entry(Identity::new(*code, *name), growing_series(*pop, *gdp, years))
        })
}

/// Two identical countries with no skills in the built-in catalog.
#[must_use]
pub fn mirror_duel_setup() -> MatchSetup {
    let series = IndicatorSeries::new().with_year(FIXTURE_START_YEAR, snapshot(5.0e7, 1.0e12));
    MatchSetup::new(FIXTURE_START_YEAR)
        .with_entry(Identity::new("AAA", "Alphaland"), series.clone())
        .with_entry(Identity::new("BBB", "Betastan"), series)
}

/// Provider serving every fixture country.
#[must_use]
pub fn sample_provider(years: i32) -> StaticIndicatorProvider {
    COUNTRIES
        .iter()
        .fold(StaticIndicatorProvider::new(), |provider, (code, _, pop, gdp)| {
            provider.with_series(*code, growing_series(*pop, *gdp, years))
        })
}

/// Parse a [`MatchSetup`] from RON.
///
/// # Errors
///
/// Returns the RON error on malformed input.
pub fn setup_from_ron(text: &str) -> Result<MatchSetup, ron::error::SpannedError> {
    ron::from_str(text)
}

/// Seeded match over the first `n` fixture countries with the built-in
/// catalog and default config.
///
/// # Panics
///
/// Panics if the fixture setup is rejected.
#[must_use]
pub fn seeded_simulation(n: usize, seed: u64) -> Simulation {
    Simulation::with_seed(&sample_setup(n, 5), Catalog::builtin(), BattleConfig::default(), seed)
        .expect("fixture setup is valid")
}
