//! Roster and indicator data loading.
//!
//! A roster file (RON) names the countries in a match and points at an
//! indicator file holding their yearly data. Indicator files map country
//! code to year to snapshot and may be RON or JSON (chosen by extension).
//! Optional catalog and config paths override the built-in defaults.
//!
//! ```ron
//! (
//!     start_year: 2000,
//!     indicators: "indicators.json",
//!     catalog: Some("catalog.ron"),
//!     countries: [
//!         (code: "USA", name: "United States", palette: Some(((60, 59, 110), (178, 34, 52)))),
//!         (code: "JPN", name: "Japan"),
//!     ],
//! )
//! ```
//!
//! Relative paths resolve against the roster file's directory.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use battle_core::catalog::Catalog;
use battle_core::components::Identity;
use battle_core::config::BattleConfig;
use battle_core::error::BattleError;
use battle_core::factory::RosterEntry;
use battle_core::indicators::{IndicatorProvider, IndicatorSeries};
use battle_core::simulation::MatchSetup;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Errors while loading match inputs from disk.
#[derive(Debug, Error)]
pub enum RosterError {
    /// File could not be read.
    #[error("Failed to read '{path}': {message}")]
    Io {
        /// Offending path.
        path: String,
        /// OS error text.
        message: String,
    },

    /// File contents could not be parsed.
    #[error("Failed to parse '{path}': {message}")]
    Parse {
        /// Offending path.
        path: String,
        /// Parser error text.
        message: String,
    },

    /// Indicator file has an extension other than `.ron` or `.json`.
    #[error("Unsupported indicator format '{0}' (expected .ron or .json)")]
    UnsupportedFormat(String),

    /// The assembled inputs were rejected by the simulation.
    #[error(transparent)]
    Battle(#[from] BattleError),
}

/// Result alias for roster loading.
pub type Result<T> = std::result::Result<T, RosterError>;

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| RosterError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

fn parse_error(path: &Path, e: impl std::fmt::Display) -> RosterError {
    RosterError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

// ============================================================================
// Indicator files
// ============================================================================

/// Indicator provider backed by a RON or JSON file.
#[derive(Debug, Clone, Default)]
pub struct FileIndicatorProvider {
    series: BTreeMap<String, IndicatorSeries>,
}

impl FileIndicatorProvider {
    /// Load every country's series from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = read(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let series: BTreeMap<String, IndicatorSeries> = match extension.as_str() {
            "ron" => ron::from_str(&contents).map_err(|e| parse_error(path, e))?,
            "json" => serde_json::from_str(&contents).map_err(|e| parse_error(path, e))?,
            other => return Err(RosterError::UnsupportedFormat(other.to_string())),
        };

        info!(path = %path.display(), countries = series.len(), "Loaded indicator data");
        Ok(Self { series })
    }

    /// Number of countries with data.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Whether the file held no countries.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl IndicatorProvider for FileIndicatorProvider {
    fn fetch(
        &self,
        codes: &[String],
        year: Option<i32>,
    ) -> battle_core::error::Result<HashMap<String, IndicatorSeries>> {
        Ok(codes
            .iter()
            .filter_map(|code| {
                let series = self.series.get(code)?;
                let series = year.map_or_else(|| series.clone(), |y| series.from_year(y));
                (!series.is_empty()).then(|| (code.clone(), series))
            })
            .collect())
    }
}

// ============================================================================
// Roster files
// ============================================================================

/// Country listed in a roster file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterCountry {
    /// Country code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Primary and secondary colors.
    #[serde(default)]
    pub palette: Option<([u8; 3], [u8; 3])>,
}

impl RosterCountry {
    fn identity(&self) -> Identity {
        let identity = Identity::new(self.code.clone(), self.name.clone());
        match self.palette {
            Some((primary, secondary)) => identity.with_palette(primary, secondary),
            None => identity,
        }
    }
}

/// On-disk roster description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterFile {
    /// Calendar year the match opens in.
    pub start_year: i32,
    /// Indicator file path.
    pub indicators: PathBuf,
    /// Optional catalog override.
    #[serde(default)]
    pub catalog: Option<PathBuf>,
    /// Optional config override.
    #[serde(default)]
    pub config: Option<PathBuf>,
    /// Participants in spawn order.
    pub countries: Vec<RosterCountry>,
}

impl RosterFile {
    /// Parse a roster from RON text.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| parse_error(Path::new("<inline>"), e))
    }
}

/// Everything needed to start matches, resolved from a roster file.
#[derive(Debug, Clone)]
pub struct LoadedRoster {
    /// Participants with their data.
    pub setup: MatchSetup,
    /// Skill and special-move tables.
    pub catalog: Catalog,
    /// Match configuration.
    pub config: BattleConfig,
}

impl LoadedRoster {
    /// Load a roster file and everything it references.
    pub fn load(path: &Path) -> Result<Self> {
        let text = read(path)?;
        let roster: RosterFile = ron::from_str(&text).map_err(|e| parse_error(path, e))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Self::resolve(&roster, base)
    }

    /// Resolve a parsed roster, reading referenced files relative to `base`.
    pub fn resolve(roster: &RosterFile, base: &Path) -> Result<Self> {
        let provider = FileIndicatorProvider::load(&base.join(&roster.indicators))?;

        let catalog = match &roster.catalog {
            Some(p) => Catalog::builtin().merged(Catalog::load(base.join(p))?),
            None => Catalog::builtin(),
        };
        let config = match &roster.config {
            Some(p) => BattleConfig::load(base.join(p))?,
            None => BattleConfig::default(),
        };

        let identities: Vec<Identity> = roster.countries.iter().map(RosterCountry::identity).collect();
        let setup = MatchSetup::from_provider(&provider, identities, roster.start_year)?;
        if setup.entries.len() < roster.countries.len() {
            warn!(
                requested = roster.countries.len(),
                playable = setup.entries.len(),
                "Some countries have no data and were dropped"
            );
        }

        Ok(Self {
            setup,
            catalog,
            config,
        })
    }
}

/// Check that a loaded roster can start a match.
///
/// Returns the opening roster (stats per country) on success.
pub fn validate(roster: &LoadedRoster) -> Result<Vec<RosterEntry>> {
    roster.config.validate()?;
    let entries = roster.setup.roster()?;
    if entries.len() < 2 {
        return Err(BattleError::NotEnoughCombatants {
            found: entries.len(),
        }
        .into());
    }
    Ok(entries)
}
