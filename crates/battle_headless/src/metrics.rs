//! Match metrics for balance analysis.
//!
//! One [`GameMetrics`] per finished match, folded into a [`BatchSummary`]
//! of win rates and match lengths.

use std::collections::BTreeMap;

use battle_core::simulation::{MatchResult, Termination};
use serde::{Deserialize, Serialize};

/// Outcome of a single match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameMetrics {
    /// Seed the match was built from.
    pub seed: u64,
    /// Ticks simulated.
    pub duration_ticks: u64,
    /// Latest data year reached by the end.
    pub final_year: i32,
    /// Winning country code (None = annihilation).
    pub winner: Option<String>,
    /// How the match ended.
    pub termination: Termination,
    /// Country codes best first.
    pub ranking: Vec<String>,
    /// Damage dealt per country.
    pub damage_dealt: BTreeMap<String, u64>,
    /// Kills per country.
    pub kills: BTreeMap<String, u32>,
    /// Final simulation state hash (for determinism validation).
    pub final_state_hash: u64,
}

impl GameMetrics {
    /// Collect metrics from a finished match.
    pub fn from_result(seed: u64, result: &MatchResult, final_state_hash: u64) -> Self {
        let winner = result.winner.and_then(|id| {
            result
                .ranking
                .iter()
                .find(|r| r.id == id)
                .map(|r| r.code.clone())
        });
        Self {
            seed,
            duration_ticks: result.ticks,
            final_year: result.final_year,
            winner,
            termination: result.termination.unwrap_or(Termination::SafetyCap),
            ranking: result.ranking.iter().map(|r| r.code.clone()).collect(),
            damage_dealt: result
                .ranking
                .iter()
                .map(|r| (r.code.clone(), r.totals.damage_dealt))
                .collect(),
            kills: result
                .ranking
                .iter()
                .map(|r| (r.code.clone(), r.totals.kills))
                .collect(),
            final_state_hash,
        }
    }
}

/// Aggregate over a batch of matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Matches summarized.
    pub total_games: u32,
    /// Win rate per country code, over all matches.
    pub win_rates: BTreeMap<String, f64>,
    /// Average finishing position per country code (1 = best).
    pub average_rank: BTreeMap<String, f64>,
    /// Mean match length in ticks.
    pub average_ticks: f64,
    /// Longest match in ticks.
    pub max_ticks: u64,
    /// Matches with no survivor.
    pub annihilations: u32,
    /// Matches cut off by the safety cap.
    pub safety_caps: u32,
}

impl BatchSummary {
    /// Summarize finished matches.
    pub fn from_games(games: &[GameMetrics]) -> Self {
        if games.is_empty() {
            return Self::default();
        }

        let total = games.len() as f64;
        let mut wins: BTreeMap<String, u32> = BTreeMap::new();
        let mut rank_sums: BTreeMap<String, (f64, u32)> = BTreeMap::new();
        let mut summary = Self {
            total_games: games.len() as u32,
            ..Self::default()
        };

        for game in games {
            if let Some(winner) = &game.winner {
                *wins.entry(winner.clone()).or_insert(0) += 1;
            }
            for (index, code) in game.ranking.iter().enumerate() {
                let entry = rank_sums.entry(code.clone()).or_insert((0.0, 0));
                entry.0 += (index + 1) as f64;
                entry.1 += 1;
            }
            match game.termination {
                Termination::Annihilation => summary.annihilations += 1,
                Termination::SafetyCap => summary.safety_caps += 1,
                Termination::SingleSurvivor => {}
            }
            summary.max_ticks = summary.max_ticks.max(game.duration_ticks);
        }

        summary.win_rates = rank_sums
            .keys()
            .map(|code| {
                let won = wins.get(code).copied().unwrap_or(0);
                (code.clone(), f64::from(won) / total)
            })
            .collect();
        summary.average_rank = rank_sums
            .into_iter()
            .map(|(code, (sum, count))| (code, sum / f64::from(count.max(1))))
            .collect();
        summary.average_ticks =
            games.iter().map(|g| g.duration_ticks as f64).sum::<f64>() / total;
        summary
    }
}
