//! # Battle Core
//!
//! Real-time multi-entity battle simulation for the country battle mode.
//!
//! This crate contains **only** simulation logic:
//! - No rendering (the core emits positions, health and events as plain data)
//! - No IO (indicator data arrives through [`indicators::IndicatorProvider`])
//! - No ambient randomness (every random draw goes through an injected [`rand::Rng`])
//!
//! This separation enables:
//! - Headless fast-forward of whole matches
//! - Seeded, reproducible test runs
//! - Any renderer consuming [`simulation::EntitySnapshot`]s
//!
//! ## Crate Structure
//!
//! - [`indicators`] - Raw economic indicator snapshots and the provider seam
//! - [`stats`] - Stat derivation from indicators
//! - [`skills`] - Skill table and per-entity skill runtime
//! - [`special_moves`] - Special-move table and state machine
//! - [`catalog`] - Data-driven skill/special-move lookup tables
//! - [`components`] - Entity data
//! - [`factory`] - Initial roster placement
//! - [`combat`] - Damage exchange resolution
//! - [`systems`] - Per-tick simulation phases
//! - [`step`] - One full simulation tick
//! - [`progression`] - Year-based stat progression
//! - [`simulation`] - Match driver: tick loop, termination, ranking
//! - [`math`] - 2D vector utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod catalog;
pub mod combat;
pub mod components;
pub mod config;
pub mod cooldown;
pub mod error;
pub mod events;
pub mod factory;
pub mod indicators;
pub mod math;
pub mod progression;
pub mod simulation;
pub mod skills;
pub mod special_moves;
pub mod stats;
pub mod step;
pub mod systems;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::catalog::Catalog;
    pub use crate::components::{EntityId, Identity, Marble};
    pub use crate::config::BattleConfig;
    pub use crate::error::{BattleError, Result};
    pub use crate::events::{EventKind, SimulationEvent};
    pub use crate::indicators::{
        IndicatorProvider, IndicatorSeries, IndicatorSnapshot, StaticIndicatorProvider,
    };
    pub use crate::math::Vec2;
    pub use crate::simulation::{
        EntitySnapshot, MatchResult, MatchSetup, RankEntry, Simulation, Termination,
    };
    pub use crate::skills::{Skill, SkillTable};
    pub use crate::special_moves::{SpecialMoveKind, SpecialMoveTable};
    pub use crate::stats::{derive_stats, StatBundle};
}
