//! Single-match runner.
//!
//! Plays one match at a speed multiplier: every frame advances
//! `ticks_per_frame` ticks and emits a frame line plus that frame's events.
//! Speed only changes how many ticks are grouped into a frame, never what
//! the simulation does, so the outcome for a given seed is identical at
//! every speed.

use std::io::{self, Write};

use battle_core::error::Result as BattleResult;
use battle_core::simulation::{MatchResult, Simulation};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::protocol::Response;
use crate::roster::LoadedRoster;

/// Playback configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Ticks advanced per frame (1 = real time at the match tick rate).
    pub ticks_per_frame: u32,
    /// Seed for a reproducible match; `None` draws from OS entropy.
    pub seed: Option<u64>,
    /// Emit event lines.
    pub emit_events: bool,
    /// Emit a frame line every this many frames (1 = every frame).
    pub frame_every: u32,
    /// Frames before the match is cut off with a forced ranking.
    pub max_frames: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            ticks_per_frame: 1,
            seed: None,
            emit_events: true,
            frame_every: 1,
            max_frames: 200_000,
        }
    }
}

impl RunConfig {
    /// Set the speed multiplier.
    pub fn with_speed(mut self, ticks_per_frame: u32) -> Self {
        self.ticks_per_frame = ticks_per_frame.max(1);
        self
    }

    /// Set the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Runs one match and streams it as JSON lines.
pub struct MatchRunner {
    config: RunConfig,
}

impl MatchRunner {
    /// Create a runner.
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    /// Build the simulation for `roster` honoring the configured seed.
    pub fn build(&self, roster: &LoadedRoster) -> BattleResult<Simulation> {
        let catalog = roster.catalog.clone();
        let config = roster.config.clone();
        match self.config.seed {
            Some(seed) => Simulation::with_seed(&roster.setup, catalog, config, seed),
            None => Simulation::new(&roster.setup, catalog, config),
        }
    }

    /// Play `sim` to the end, writing protocol lines to `out`.
    pub fn play<W: Write>(&self, sim: &mut Simulation, out: &mut W) -> io::Result<MatchResult> {
        let per_frame = u64::from(self.config.ticks_per_frame.max(1));
        let frame_every = u64::from(self.config.frame_every.max(1));

        write_line(out, &Response::ready(sim.marbles().len(), sim.current_year()))?;
        info!(
            combatants = sim.marbles().len(),
            ticks_per_frame = per_frame,
            "Playing match"
        );

        let mut frame = 0u64;
        while !sim.is_finished() && frame < self.config.max_frames {
            let events = sim.advance(per_frame);
            frame += 1;

            if frame % frame_every == 0 || sim.is_finished() {
                write_line(
                    out,
                    &Response::Frame {
                        tick: sim.get_tick(),
                        year: sim.current_year(),
                        alive: sim.alive_count(),
                        entities: sim.snapshots(),
                    },
                )?;
            }
            if self.config.emit_events {
                for event in events {
                    write_line(out, &Response::Event(event))?;
                }
            }
        }

        // Frame budget spent; a zero cap forces the ranking from the current state.
        let result = if sim.is_finished() {
            sim.result()
        } else {
            debug!(frame, "Frame budget exhausted");
            sim.fast_forward_with_cap(0)
        };
        write_line(out, &Response::Result(result.clone()))?;
        out.flush()?;
        Ok(result)
    }
}

fn write_line<W: Write>(out: &mut W, response: &Response) -> io::Result<()> {
    out.write_all(response.to_json_line().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::catalog::Catalog;
    use battle_core::config::BattleConfig;
    use battle_test_utils::fixtures::sample_setup;

    fn roster() -> LoadedRoster {
        LoadedRoster {
            setup: sample_setup(4, 3),
            catalog: Catalog::builtin(),
            config: BattleConfig::default(),
        }
    }

    fn lines(out: &[u8]) -> Vec<Response> {
        String::from_utf8_lossy(out)
            .lines()
            .map(|l| Response::from_json(l).unwrap())
            .collect()
    }

    #[test]
    fn test_play_streams_ready_frames_result() {
        let runner = MatchRunner::new(RunConfig::default().with_speed(30).with_seed(3));
        let mut sim = runner.build(&roster()).unwrap();
        let mut out = Vec::new();
        let result = runner.play(&mut sim, &mut out).unwrap();

        let lines = lines(&out);
        assert!(matches!(lines.first(), Some(Response::Ready { combatants: 4, .. })));
        assert!(matches!(lines.last(), Some(Response::Result(r)) if *r == result));
        assert!(lines.iter().any(|l| matches!(l, Response::Frame { .. })));
        assert!(result.termination.is_some());
    }

    #[test]
    fn test_speed_does_not_change_outcome() {
        let play = |speed| {
            let runner = MatchRunner::new(RunConfig {
                emit_events: false,
                ..RunConfig::default().with_speed(speed).with_seed(17)
            });
            let mut sim = runner.build(&roster()).unwrap();
            runner.play(&mut sim, &mut io::sink()).unwrap()
        };
        assert_eq!(play(1), play(64));
    }

    #[test]
    fn test_frame_budget_forces_ranking() {
        let runner = MatchRunner::new(RunConfig {
            max_frames: 3,
            ..RunConfig::default().with_speed(2).with_seed(5)
        });
        let mut sim = runner.build(&roster()).unwrap();
        let result = runner.play(&mut sim, &mut io::sink()).unwrap();
        assert_eq!(result.ticks, 6);
        assert_eq!(
            result.termination,
            Some(battle_core::simulation::Termination::SafetyCap)
        );
    }
}
