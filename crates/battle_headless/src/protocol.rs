//! JSON-lines output protocol for headless matches.
//!
//! The runner writes one JSON object per line to stdout:
//!
//! 1. `{"type":"ready","version":"1.0","combatants":N,"start_year":Y}`
//! 2. One `frame` per rendered frame, followed by that frame's `event`s
//! 3. One `result` when the match ends
//!
//! Logs go to stderr so stdout stays machine-readable.
//!
//! # Example Session
//!
//! ```text
//! <- {"type":"ready","version":"1.0","combatants":2,"start_year":2000}
//! <- {"type":"frame","tick":4,"year":2000,"alive":2,"entities":[...]}
//! <- {"type":"event","tick":3,"kind":"hit","subject":0,"other":1,...}
//! <- {"type":"result","ranking":[...],"winner":1,"ticks":5120,...}
//! ```

use battle_core::events::SimulationEvent;
use battle_core::simulation::{EntitySnapshot, MatchResult};
use serde::{Deserialize, Serialize};

/// Protocol version reported in the `ready` line.
pub const PROTOCOL_VERSION: &str = "1.0";

/// Lines written by the headless runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Match built and about to start.
    Ready {
        version: String,
        combatants: usize,
        start_year: i32,
    },

    /// Entity snapshots after a frame's ticks.
    Frame {
        tick: u64,
        year: i32,
        alive: usize,
        entities: Vec<EntitySnapshot>,
    },

    /// One simulation event.
    Event(SimulationEvent),

    /// Final standings.
    Result(MatchResult),

    /// Fatal problem before or during the run.
    Error { message: String },
}

impl Response {
    /// Create a ready line.
    pub fn ready(combatants: usize, start_year: i32) -> Self {
        Self::Ready {
            version: PROTOCOL_VERSION.to_string(),
            combatants,
            start_year,
        }
    }

    /// Create an error line.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Serialize to a JSON line (with newline).
    pub fn to_json_line(&self) -> String {
        let mut json = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"type":"error","message":"Serialization failed: {e}"}}"#)
        });
        json.push('\n');
        json
    }

    /// Parse one line back, for consumers and tests.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::events::EventKind;
    use battle_test_utils::fixtures::seeded_simulation;

    #[test]
    fn test_ready_line() {
        let json = Response::ready(4, 2000).to_json_line();
        assert!(json.ends_with('\n'));
        assert!(json.contains(r#""type":"ready""#));
        assert!(json.contains(r#""combatants":4"#));
    }

    #[test]
    fn test_event_line_is_flat() {
        let event = SimulationEvent::new(12, EventKind::CriticalHit, 0, "A crits B for 40")
            .with_other(1)
            .with_magnitude(40.0);
        let json = Response::Event(event.clone()).to_json_line();
        assert!(json.contains(r#""type":"event""#));
        assert!(json.contains(r#""kind":"critical_hit""#));
        assert_eq!(Response::from_json(json.trim()).unwrap(), Response::Event(event));
    }

    #[test]
    fn test_frame_and_result_lines() {
        let mut sim = seeded_simulation(3, 8);
        let frame = Response::Frame {
            tick: sim.get_tick(),
            year: sim.current_year(),
            alive: sim.alive_count(),
            entities: sim.snapshots(),
        };
        let json = frame.to_json_line();
        assert!(json.contains(r#""type":"frame""#));
        assert!(json.contains(r#""code":"USA""#));

        let result = Response::Result(sim.fast_forward()).to_json_line();
        assert!(result.contains(r#""type":"result""#));
        assert!(result.contains(r#""ranking""#));
    }
}
