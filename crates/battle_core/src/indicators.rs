//! Raw economic indicators and the provider seam.
//!
//! Indicator retrieval happens outside the simulation. A provider hands the
//! core one [`IndicatorSeries`] per country; every field of every snapshot may
//! be missing, and stat derivation substitutes neutral defaults.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One country's indicators for a single year.
///
/// Every field is optional because upstream data sources routinely leave
/// gaps. Non-finite values are treated the same as missing ones.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorSnapshot {
    /// Total population (people).
    pub population: Option<f64>,
    /// Gross domestic product (current USD).
    pub gdp: Option<f64>,
    /// Annual GDP growth (percent).
    pub gdp_growth: Option<f64>,
    /// Exports of goods and services (percent of GDP).
    pub exports_pct_gdp: Option<f64>,
    /// Consumer price inflation (annual percent).
    pub inflation: Option<f64>,
    /// GDP per capita (current USD).
    pub gdp_per_capita: Option<f64>,
    /// Net investment (percent of GDP).
    pub investment_pct_gdp: Option<f64>,
    /// Government debt (percent of GDP).
    pub debt_pct_gdp: Option<f64>,
}

impl IndicatorSnapshot {
    /// A snapshot with every indicator missing.
    pub const EMPTY: Self = Self {
        population: None,
        gdp: None,
        gdp_growth: None,
        exports_pct_gdp: None,
        inflation: None,
        gdp_per_capita: None,
        investment_pct_gdp: None,
        debt_pct_gdp: None,
    };

    /// Whether at least one indicator is present and finite.
    #[must_use]
    pub fn has_any(&self) -> bool {
        [
            self.population,
            self.gdp,
            self.gdp_growth,
            self.exports_pct_gdp,
            self.inflation,
            self.gdp_per_capita,
            self.investment_pct_gdp,
            self.debt_pct_gdp,
        ]
        .iter()
        .any(|v| v.is_some_and(f64::is_finite))
    }
}

/// Year-indexed indicator snapshots for one country.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndicatorSeries {
    years: BTreeMap<i32, IndicatorSnapshot>,
}

impl IndicatorSeries {
    /// Create an empty series.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add the snapshot for `year`.
    #[must_use]
    pub fn with_year(mut self, year: i32, snapshot: IndicatorSnapshot) -> Self {
        self.insert(year, snapshot);
        self
    }

    /// Insert or replace the snapshot for `year`.
    pub fn insert(&mut self, year: i32, snapshot: IndicatorSnapshot) {
        self.years.insert(year, snapshot);
    }

    /// Snapshot recorded for exactly `year`.
    #[must_use]
    pub fn get(&self, year: i32) -> Option<&IndicatorSnapshot> {
        self.years.get(&year)
    }

    /// Latest snapshot at or before `year`.
    #[must_use]
    pub fn at_or_before(&self, year: i32) -> Option<(i32, &IndicatorSnapshot)> {
        self.years.range(..=year).next_back().map(|(y, s)| (*y, s))
    }

    /// First snapshot strictly after `year`.
    #[must_use]
    pub fn next_after(&self, year: i32) -> Option<(i32, &IndicatorSnapshot)> {
        self.years
            .range(year.saturating_add(1)..)
            .next()
            .map(|(y, s)| (*y, s))
    }

    /// Earliest recorded snapshot.
    #[must_use]
    pub fn earliest(&self) -> Option<(i32, &IndicatorSnapshot)> {
        self.years.iter().next().map(|(y, s)| (*y, s))
    }

    /// Snapshot used to open a match starting in `start_year`.
    ///
    /// Prefers the latest year at or before the start; falls back to the
    /// earliest year on record when the series begins later.
    #[must_use]
    pub fn opening(&self, start_year: i32) -> Option<(i32, &IndicatorSnapshot)> {
        self.at_or_before(start_year).or_else(|| self.earliest())
    }

    /// Drop every year before `year`.
    #[must_use]
    pub fn from_year(&self, year: i32) -> Self {
        Self {
            years: self
                .years
                .range(year..)
                .map(|(y, s)| (*y, *s))
                .collect(),
        }
    }

    /// Number of years recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.years.len()
    }

    /// Whether no years are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}

/// Source of indicator data for a set of countries.
///
/// Implementations may be backed by files, caches or a remote API; the
/// simulation never calls a provider once a match has started.
pub trait IndicatorProvider {
    /// Fetch series for `codes`, optionally restricted to `year` onward.
    ///
    /// Countries the provider knows nothing about are omitted from the map
    /// rather than reported as errors.
    fn fetch(&self, codes: &[String], year: Option<i32>) -> Result<HashMap<String, IndicatorSeries>>;
}

/// In-memory provider, used by tests and by callers that already hold data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticIndicatorProvider {
    series: HashMap<String, IndicatorSeries>,
}

impl StaticIndicatorProvider {
    /// Create an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: register a country's series.
    #[must_use]
    pub fn with_series(mut self, code: impl Into<String>, series: IndicatorSeries) -> Self {
        self.series.insert(code.into(), series);
        self
    }

    /// Register a country's series.
    pub fn insert(&mut self, code: impl Into<String>, series: IndicatorSeries) {
        self.series.insert(code.into(), series);
    }
}

impl IndicatorProvider for StaticIndicatorProvider {
    fn fetch(&self, codes: &[String], year: Option<i32>) -> Result<HashMap<String, IndicatorSeries>> {
        let found = codes
            .iter()
            .filter_map(|code| {
                let series = self.series.get(code)?;
                let series = match year {
                    Some(y) => series.from_year(y),
                    None => series.clone(),
                };
                (!series.is_empty()).then(|| (code.clone(), series))
            })
            .collect();
        Ok(found)
    }
}
