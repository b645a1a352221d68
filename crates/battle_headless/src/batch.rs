//! Batch match runner for balance testing.
//!
//! Fast-forwards many seeded matches of the same roster in parallel using
//! rayon and collects their metrics.

use std::path::{Path, PathBuf};
use std::time::Instant;

use battle_core::simulation::Simulation;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::metrics::{BatchSummary, GameMetrics};
use crate::roster::LoadedRoster;

/// Configuration for a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Roster file the batch was built from (informational).
    pub roster: Option<PathBuf>,
    /// Number of matches to run.
    pub game_count: u32,
    /// Maximum parallel matches (0 = use rayon default).
    pub parallel_games: u32,
    /// Seed of the first match; match `i` uses `seed_start + i`.
    pub seed_start: u64,
    /// Per-match safety cap in ticks (0 = use the roster config's cap).
    pub max_ticks: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            roster: None,
            game_count: 100,
            parallel_games: 0,
            seed_start: 0,
            max_ticks: 0,
        }
    }
}

impl BatchConfig {
    /// Config for `game_count` matches.
    pub fn new(game_count: u32) -> Self {
        Self {
            game_count,
            ..Default::default()
        }
    }

    /// Set seed start.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    /// Set the per-match tick cap.
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = max_ticks;
        self
    }
}

/// Match that could not be run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchError {
    /// Match index.
    pub game_index: u32,
    /// Seed used.
    pub seed: u64,
    /// Error message.
    pub message: String,
}

/// Results from a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used.
    pub config: BatchConfig,
    /// Per-match metrics, in seed order.
    pub games: Vec<GameMetrics>,
    /// Aggregate summary.
    pub summary: BatchSummary,
    /// Wall-clock runtime.
    pub duration_seconds: f64,
    /// Matches that failed to build.
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to a JSON file.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from a JSON file.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// Fast-forward one seeded match.
pub fn run_single_game(
    roster: &LoadedRoster,
    seed: u64,
    max_ticks: u64,
) -> battle_core::error::Result<GameMetrics> {
    let mut sim = Simulation::with_seed(
        &roster.setup,
        roster.catalog.clone(),
        roster.config.clone(),
        seed,
    )?;
    let result = if max_ticks > 0 {
        sim.fast_forward_with_cap(max_ticks)
    } else {
        sim.fast_forward()
    };
    Ok(GameMetrics::from_result(seed, &result, sim.state_hash()))
}

/// Run a batch of matches.
pub fn run_batch(roster: &LoadedRoster, config: BatchConfig) -> BatchResults {
    let start = Instant::now();
    info!(
        games = config.game_count,
        combatants = roster.setup.entries.len(),
        "Starting batch run"
    );

    let play = |i: u32| {
        let seed = config.seed_start.wrapping_add(u64::from(i));
        run_single_game(roster, seed, config.max_ticks).map_err(|e| {
            warn!(game = i, seed, error = %e, "Match failed");
            BatchError {
                game_index: i,
                seed,
                message: e.to_string(),
            }
        })
    };

    let results: Vec<Result<GameMetrics, BatchError>> = if config.parallel_games > 0 {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel_games as usize)
            .build()
        {
            Ok(pool) => pool.install(|| (0..config.game_count).into_par_iter().map(play).collect()),
            Err(e) => {
                warn!(error = %e, "Failed to build thread pool, using the global pool");
                (0..config.game_count).into_par_iter().map(play).collect()
            }
        }
    } else {
        (0..config.game_count).into_par_iter().map(play).collect()
    };

    let (games, errors): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);
    let games: Vec<GameMetrics> = games.into_iter().filter_map(Result::ok).collect();
    let errors: Vec<BatchError> = errors.into_iter().filter_map(Result::err).collect();
    debug!(completed = games.len(), failed = errors.len(), "Batch matches collected");

    let summary = BatchSummary::from_games(&games);
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        "Batch complete: {} matches in {:.1}s ({:.1} matches/sec)",
        games.len(),
        duration_seconds,
        games.len() as f64 / duration_seconds.max(0.001)
    );

    BatchResults {
        config,
        games,
        summary,
        duration_seconds,
        errors,
    }
}

/// Run the same seed `runs` times and check every final hash agrees.
pub fn verify_determinism(roster: &LoadedRoster, seed: u64, runs: u32, max_ticks: u64) -> bool {
    let hashes: Vec<u64> = (0..runs.max(1))
        .into_par_iter()
        .filter_map(|_| run_single_game(roster, seed, max_ticks).ok())
        .map(|m| m.final_state_hash)
        .collect();
    hashes.len() == runs.max(1) as usize && hashes.windows(2).all(|w| w[0] == w[1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::catalog::Catalog;
    use battle_core::config::BattleConfig;
    use battle_test_utils::fixtures::sample_setup;

    fn roster(n: usize) -> LoadedRoster {
        LoadedRoster {
            setup: sample_setup(n, 3),
            catalog: Catalog::builtin(),
            config: BattleConfig::default(),
        }
    }

    #[test]
    fn test_batch_config_builder() {
        let config = BatchConfig::new(500).with_seed(12345).with_max_ticks(9000);
        assert_eq!(config.game_count, 500);
        assert_eq!(config.seed_start, 12345);
        assert_eq!(config.max_ticks, 9000);
    }

    #[test]
    fn test_run_batch_small() {
        let results = run_batch(&roster(4), BatchConfig::new(8).with_seed(100));
        assert_eq!(results.games.len(), 8);
        assert!(results.errors.is_empty());
        assert_eq!(results.summary.total_games, 8);

        let total: f64 = results.summary.win_rates.values().sum();
        let decided = results.games.iter().filter(|g| g.winner.is_some()).count();
        assert!((total - decided as f64 / 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_batch_matches_serial_runs() {
        let roster = roster(3);
        let results = run_batch(
            &roster,
            BatchConfig {
                parallel_games: 2,
                ..BatchConfig::new(4).with_seed(7)
            },
        );
        for game in &results.games {
            let serial = run_single_game(&roster, game.seed, 0).unwrap();
            assert_eq!(&serial, game);
        }
    }

    #[test]
    fn test_max_ticks_caps_matches() {
        let results = run_batch(&roster(6), BatchConfig::new(3).with_max_ticks(50));
        assert!(results.games.iter().all(|g| g.duration_ticks <= 50));
        assert_eq!(results.summary.safety_caps, 3);
    }

    #[test]
    fn test_verify_determinism() {
        assert!(verify_determinism(&roster(4), 12345, 3, 0));
    }

    #[test]
    fn test_batch_results_save_load() {
        let results = run_batch(&roster(2), BatchConfig::new(5));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("results.json");

        results.save(&path).unwrap();
        assert!(path.exists());

        let loaded = BatchResults::load(&path).unwrap();
        assert_eq!(loaded.games, results.games);
        assert_eq!(loaded.config.game_count, 5);
    }
}
