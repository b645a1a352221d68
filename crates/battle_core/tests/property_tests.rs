//! Property tests for stat derivation and match invariants.

use battle_core::catalog::Catalog;
use battle_core::config::BattleConfig;
use battle_core::indicators::IndicatorSnapshot;
use battle_core::simulation::{Simulation, Termination};
use battle_core::stats::{
    derive_stats, ATTACK_RANGE, CRIT_RANGE, DEBT_RANGE, DEFENSE_RANGE, DRAIN_RANGE,
    MAX_HEALTH_RANGE, SPEED_RANGE,
};
use battle_test_utils::determinism::strategies::{
    arb_plausible_snapshot, arb_population, arb_roster_size, arb_snapshot,
};
use battle_test_utils::fixtures::sample_setup;
use proptest::prelude::*;

proptest! {
    /// Every derived stat stays inside its range, whatever the input.
    #[test]
    fn prop_derived_stats_in_range(snapshot in arb_snapshot()) {
        let stats = derive_stats(&snapshot);
        prop_assert!(MAX_HEALTH_RANGE.contains(f64::from(stats.max_health)));
        prop_assert!(ATTACK_RANGE.contains(stats.attack));
        prop_assert!(SPEED_RANGE.contains(stats.speed));
        prop_assert!(CRIT_RANGE.contains(stats.crit_chance));
        prop_assert!(DEFENSE_RANGE.contains(stats.defense));
        prop_assert!(DRAIN_RANGE.contains(stats.drain));
        prop_assert!(DEBT_RANGE.contains(stats.debt_factor));
        prop_assert!(stats.is_within_ranges());
    }

    /// More population never means less max health.
    #[test]
    fn prop_max_health_monotonic_in_population(
        base in arb_plausible_snapshot(),
        a in arb_population(),
        b in arb_population(),
    ) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let small = derive_stats(&IndicatorSnapshot { population: Some(low), ..base });
        let large = derive_stats(&IndicatorSnapshot { population: Some(high), ..base });
        prop_assert!(large.max_health >= small.max_health);
    }

    /// More GDP never means less attack.
    #[test]
    fn prop_attack_monotonic_in_gdp(
        base in arb_plausible_snapshot(),
        a in 1.0e6..1.0e14_f64,
        b in 1.0e6..1.0e14_f64,
    ) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let poor = derive_stats(&IndicatorSnapshot { gdp: Some(low), ..base });
        let rich = derive_stats(&IndicatorSnapshot { gdp: Some(high), ..base });
        prop_assert!(rich.attack >= poor.attack);
    }

    /// Exports drive speed and inflation drives crit, both monotonically.
    #[test]
    fn prop_speed_and_crit_monotonic(
        base in arb_plausible_snapshot(),
        low in 0.0..100.0_f64,
        delta in 0.0..100.0_f64,
    ) {
        let high = low + delta;
        let slow = derive_stats(&IndicatorSnapshot { exports_pct_gdp: Some(low), ..base });
        let fast = derive_stats(&IndicatorSnapshot { exports_pct_gdp: Some(high), ..base });
        prop_assert!(fast.speed >= slow.speed);

        let calm = derive_stats(&IndicatorSnapshot { inflation: Some(low), ..base });
        let hot = derive_stats(&IndicatorSnapshot { inflation: Some(high), ..base });
        prop_assert!(hot.crit_chance >= calm.crit_chance);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    /// Health stays within `[0, max_health]` at every tick of a match.
    #[test]
    fn prop_health_bounded_during_match(n in arb_roster_size(), seed in any::<u64>()) {
        let mut sim = Simulation::with_seed(
            &sample_setup(n, 4),
            Catalog::builtin(),
            BattleConfig::default(),
            seed,
        )
        .expect("fixture setup is valid");

        for _ in 0..1_500 {
            sim.tick();
            for m in sim.marbles() {
                prop_assert!(m.health <= m.max_health);
                prop_assert!(m.alive || m.health == 0);
            }
            if sim.is_finished() {
                break;
            }
        }
    }

    /// Every match ends in a single survivor, an annihilation, or the cap.
    #[test]
    fn prop_match_always_terminates(n in arb_roster_size(), seed in any::<u64>()) {
        let mut sim = Simulation::with_seed(
            &sample_setup(n, 4),
            Catalog::builtin(),
            BattleConfig::default(),
            seed,
        )
        .expect("fixture setup is valid");
        let cap = 20_000;

        let result = sim.fast_forward_with_cap(cap);
        prop_assert!(sim.is_finished());
        prop_assert!(result.ticks <= cap);
        match result.termination {
            Some(Termination::SingleSurvivor) => {
                prop_assert_eq!(sim.alive_count(), 1);
                prop_assert!(result.winner.is_some());
            }
            Some(Termination::Annihilation) => {
                prop_assert_eq!(sim.alive_count(), 0);
                prop_assert!(result.winner.is_none());
            }
            Some(Termination::SafetyCap) => {
                prop_assert_eq!(result.ticks, cap);
                prop_assert!(sim.alive_count() >= 2);
            }
            None => prop_assert!(false, "finished match without termination"),
        }
    }
}
