//! Error types for the battle simulation.
//!
//! Nothing inside a tick can fail. Errors only surface while a match is
//! being assembled, configured, or (de)serialized.

use thiserror::Error;

use crate::components::EntityId;

/// Result type alias using [`BattleError`].
pub type Result<T> = std::result::Result<T, BattleError>;

/// Top-level error type for all battle simulation errors.
#[derive(Debug, Error)]
pub enum BattleError {
    /// A match needs at least two combatants.
    #[error("At least 2 combatants are required to start a match, found {found}")]
    NotEnoughCombatants {
        /// Number of viable combatants supplied.
        found: usize,
    },

    /// Invalid entity reference.
    #[error("Entity not found: {0}")]
    UnknownEntity(EntityId),

    /// The indicator provider returned nothing usable for a country.
    #[error("No indicator data for country '{0}'")]
    MissingIndicators(String),

    /// Configuration values are out of their allowed range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParseError {
        /// Path to the file that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// State could not be encoded or decoded.
    #[error("Serialization failed: {0}")]
    Serialization(String),
}
