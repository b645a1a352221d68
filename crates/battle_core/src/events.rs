//! Events emitted by the simulation for renderers and logs.
//!
//! Events are produced fresh every tick and never read back by the
//! simulation. Text is plain English for logs; localization belongs to the
//! consumer.

use serde::{Deserialize, Serialize};

use crate::components::EntityId;
use crate::math::Vec2;

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Damage landed on contact.
    Hit,
    /// Critical damage landed on contact.
    CriticalHit,
    /// A hit was fully dodged.
    Dodge,
    /// A hit was fully blocked.
    Block,
    /// Health restored by a skill or by drain.
    Heal,
    /// A skill fired (periodic, threshold or year bonus).
    SkillTriggered,
    /// A special move fired.
    SpecialMove,
    /// Bombard impact marker at the target's location. Deals no damage.
    BombardImpact,
    /// Entity entered rage.
    Rage,
    /// Entity was eliminated.
    Elimination,
    /// Killer absorbed part of the victim's max health.
    Absorption,
    /// Stats advanced to a later year.
    YearProgression,
}

/// One event produced during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationEvent {
    /// Tick that produced the event.
    pub tick: u64,
    /// Event kind.
    pub kind: EventKind,
    /// Primary entity.
    pub subject: EntityId,
    /// Secondary entity (victim, killer, target).
    pub other: Option<EntityId>,
    /// Damage, heal amount, impulse or similar.
    pub magnitude: f64,
    /// Where a location-bound effect happens.
    pub position: Option<Vec2>,
    /// Human-readable description.
    pub text: String,
}

impl SimulationEvent {
    /// Create an event about a single entity.
    #[must_use]
    pub fn new(tick: u64, kind: EventKind, subject: EntityId, text: impl Into<String>) -> Self {
        Self {
            tick,
            kind,
            subject,
            other: None,
            magnitude: 0.0,
            position: None,
            text: text.into(),
        }
    }

    /// Builder: set the secondary entity.
    #[must_use]
    pub fn with_other(mut self, other: EntityId) -> Self {
        self.other = Some(other);
        self
    }

    /// Builder: set the magnitude.
    #[must_use]
    pub fn with_magnitude(mut self, magnitude: f64) -> Self {
        self.magnitude = magnitude;
        self
    }

    /// Builder: set the location.
    #[must_use]
    pub fn at(mut self, position: Vec2) -> Self {
        self.position = Some(position);
        self
    }
}
