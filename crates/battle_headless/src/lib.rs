//! Headless battle runner for balance runs and CI verification.
//!
//! This crate drives `battle_core` matches without graphics:
//!
//! - **Playback**: stream one match as JSON lines at a chosen speed
//! - **Batch runs**: fast-forward many seeded matches in parallel and
//!   summarize win rates and match lengths
//! - **Validation**: check that a roster and its data can start a match
//!
//! # Output
//!
//! - **stdout**: protocol lines (JSON, one object per line)
//! - **stderr**: logs (human-readable)
//!
//! See the [`protocol`] module for the line format.
//!
//! # Example
//!
//! ```bash
//! # Play one match at 8 ticks per frame
//! cargo run -p battle_headless -- run --roster data/roster.ron --speed 8
//!
//! # Run 1000 seeded matches
//! cargo run -p battle_headless -- batch --roster data/roster.ron --count 1000
//! ```

pub mod batch;
pub mod metrics;
pub mod protocol;
pub mod roster;
pub mod runner;

pub use batch::{run_batch, BatchConfig, BatchResults};
pub use metrics::{BatchSummary, GameMetrics};
pub use protocol::Response;
pub use roster::{FileIndicatorProvider, LoadedRoster, RosterError, RosterFile};
pub use runner::{MatchRunner, RunConfig};
