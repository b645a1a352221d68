//! Per-pair damage cooldowns.
//!
//! Two entities in contact separate physically every tick, but may only
//! trade damage once per cooldown window. The window itself shrinks as the
//! match goes on (see [`crate::config::CombatConfig::pair_cooldown_at`]).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::components::EntityId;

/// Tick of the last damage exchange for each unordered entity pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairCooldown {
    last_exchange: BTreeMap<(EntityId, EntityId), u64>,
}

/// Order-independent key for a pair.
fn key(a: EntityId, b: EntityId) -> (EntityId, EntityId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl PairCooldown {
    /// Create an empty cooldown map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `a` and `b` may exchange damage at `tick` given `window` ticks.
    #[must_use]
    pub fn is_ready(&self, a: EntityId, b: EntityId, tick: u64, window: u64) -> bool {
        match self.last_exchange.get(&key(a, b)) {
            Some(&last) => tick.saturating_sub(last) >= window,
            None => true,
        }
    }

    /// Record an exchange between `a` and `b` at `tick`.
    pub fn record(&mut self, a: EntityId, b: EntityId, tick: u64) {
        self.last_exchange.insert(key(a, b), tick);
    }

    /// Tick of the last exchange between `a` and `b`.
    #[must_use]
    pub fn last_exchange(&self, a: EntityId, b: EntityId) -> Option<u64> {
        self.last_exchange.get(&key(a, b)).copied()
    }

    /// Forget every pair involving `id`.
    pub fn forget(&mut self, id: EntityId) {
        self.last_exchange.retain(|&(a, b), _| a != id && b != id);
    }

    /// Number of tracked pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.last_exchange.len()
    }

    /// Whether no pairs are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.last_exchange.is_empty()
    }

    /// Iterate pairs in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = (&(EntityId, EntityId), &u64)> {
        self.last_exchange.iter()
    }
}
