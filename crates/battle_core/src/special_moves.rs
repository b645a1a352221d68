//! Special moves.
//!
//! Each country has one [`SpecialMoveKind`]. The per-entity state machine
//! is simple:
//!
//! ```text
//!   Cooling (cooldown > 0) --expires--> fire once --> Active (duration > 0)
//!        ^                                                 |
//!        +------------ new randomized cooldown ------------+
//! ```
//!
//! Instant kinds (wave, bombard) have no active phase. While a move is
//! active its cooldown does not count down.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{SpecialMoveConfig, TickRange};
use crate::math::Vec2;

/// Special-move category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialMoveKind {
    /// No special move.
    #[default]
    None,
    /// Dash toward the current target.
    Charge,
    /// Radial push on every nearby enemy.
    Wave,
    /// Stand still and shrug off knockback.
    Fortress,
    /// Fast zig-zag movement.
    Dance,
    /// Ranged visual strike on the target. Deals no damage.
    Bombard,
}

impl SpecialMoveKind {
    /// Cooldown range for this kind.
    #[must_use]
    pub fn cooldown_range(self, config: &SpecialMoveConfig) -> Option<TickRange> {
        match self {
            SpecialMoveKind::None => None,
            SpecialMoveKind::Charge => Some(config.charge_cooldown),
            SpecialMoveKind::Wave => Some(config.wave_cooldown),
            SpecialMoveKind::Fortress => Some(config.fortress_cooldown),
            SpecialMoveKind::Dance => Some(config.dance_cooldown),
            SpecialMoveKind::Bombard => Some(config.bombard_cooldown),
        }
    }

    /// Active duration in ticks (0 for instant kinds).
    #[must_use]
    pub fn duration(self, config: &SpecialMoveConfig) -> u32 {
        match self {
            SpecialMoveKind::Charge => config.charge_duration,
            SpecialMoveKind::Fortress => config.fortress_duration,
            SpecialMoveKind::Dance => config.dance_duration,
            SpecialMoveKind::None | SpecialMoveKind::Wave | SpecialMoveKind::Bombard => 0,
        }
    }

    /// Short label for event text.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            SpecialMoveKind::None => "none",
            SpecialMoveKind::Charge => "charge",
            SpecialMoveKind::Wave => "wave",
            SpecialMoveKind::Fortress => "fortress",
            SpecialMoveKind::Dance => "dance",
            SpecialMoveKind::Bombard => "bombard",
        }
    }
}

/// Lookup from country code to special-move kind.
pub trait SpecialMoveTable {
    /// Special move for `code`, or [`SpecialMoveKind::None`].
    fn special_move_for(&self, code: &str) -> SpecialMoveKind;
}

/// Per-entity special-move runtime.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpecialMoveState {
    /// Ticks until the move can fire again.
    pub cooldown: u32,
    /// Remaining active ticks.
    pub active: u32,
    /// Aim direction captured when the move fired.
    pub aim: Vec2,
    /// Times the move has fired.
    pub uses: u32,
}

/// Draw a cooldown for `kind` uniformly from its range.
pub fn roll_cooldown<R: Rng + ?Sized>(
    kind: SpecialMoveKind,
    config: &SpecialMoveConfig,
    rng: &mut R,
) -> u32 {
    match kind.cooldown_range(config) {
        Some(range) => rng.gen_range(range.min..=range.max),
        None => 0,
    }
}

impl SpecialMoveState {
    /// Fresh state with a randomized first cooldown.
    pub fn new<R: Rng + ?Sized>(kind: SpecialMoveKind, config: &SpecialMoveConfig, rng: &mut R) -> Self {
        Self {
            cooldown: roll_cooldown(kind, config, rng),
            ..Self::default()
        }
    }

    /// Whether the move is in its active phase.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active > 0
    }

    /// Advance one tick. Returns true exactly when the move fires.
    ///
    /// On firing the move enters its active phase with `aim` and a new
    /// cooldown is rolled.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        kind: SpecialMoveKind,
        aim: Vec2,
        config: &SpecialMoveConfig,
        rng: &mut R,
    ) -> bool {
        if kind == SpecialMoveKind::None {
            return false;
        }
        if self.active > 0 {
            self.active -= 1;
            return false;
        }
        if self.cooldown > 0 {
            self.cooldown -= 1;
            return false;
        }

        self.active = kind.duration(config);
        self.aim = aim.normalize();
        self.cooldown = roll_cooldown(kind, config, rng);
        self.uses += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_cooldown_within_range() {
        let config = SpecialMoveConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            let cd = roll_cooldown(SpecialMoveKind::Wave, &config, &mut rng);
            assert!((config.wave_cooldown.min..=config.wave_cooldown.max).contains(&cd));
        }
        assert_eq!(roll_cooldown(SpecialMoveKind::None, &config, &mut rng), 0);
    }

    #[test]
    fn test_fires_exactly_once_per_cooldown() {
        let config = SpecialMoveConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut state = SpecialMoveState {
            cooldown: 3,
            ..SpecialMoveState::default()
        };

        let fired: Vec<bool> = (0..4)
            .map(|_| state.advance(SpecialMoveKind::Charge, Vec2::new(1.0, 0.0), &config, &mut rng))
            .collect();
        assert_eq!(fired, vec![false, false, false, true]);
        assert_eq!(state.active, config.charge_duration);
        assert!(state.cooldown >= config.charge_cooldown.min);

        // Active phase never re-fires.
        for _ in 0..config.charge_duration {
            assert!(!state.advance(SpecialMoveKind::Charge, Vec2::ZERO, &config, &mut rng));
        }
        assert!(!state.is_active());
        assert_eq!(state.uses, 1);
    }

    #[test]
    fn test_instant_kind_has_no_active_phase() {
        let config = SpecialMoveConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut state = SpecialMoveState::default();
        assert!(state.advance(SpecialMoveKind::Bombard, Vec2::new(0.0, 1.0), &config, &mut rng));
        assert!(!state.is_active());
    }

    #[test]
    fn test_none_never_fires() {
        let config = SpecialMoveConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut state = SpecialMoveState::default();
        for _ in 0..500 {
            assert!(!state.advance(SpecialMoveKind::None, Vec2::ZERO, &config, &mut rng));
        }
    }
}
