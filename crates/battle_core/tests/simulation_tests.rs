//! Whole-match tests through the driver.

use battle_core::prelude::*;
use battle_core::special_moves::SpecialMoveKind;
use battle_test_utils::determinism::{
    find_first_divergence, verify_serialization_determinism, verify_simulation_determinism,
};
use battle_test_utils::fixtures::{
    mirror_duel_setup, sample_provider, sample_setup, seeded_simulation, setup_from_ron,
    COUNTRIES, FIXTURE_START_YEAR, SAMPLE_SETUP_RON,
};

#[test]
fn test_ron_setup_plays_to_completion() {
    let setup = setup_from_ron(SAMPLE_SETUP_RON).expect("fixture RON parses");
    let mut sim = Simulation::with_seed(&setup, Catalog::builtin(), BattleConfig::default(), 21)
        .expect("valid setup");

    let snapshots = sim.snapshots();
    assert_eq!(snapshots[0].code, "AAA");
    assert_eq!(snapshots[1].palette, [[30, 30, 200], [255, 255, 0]]);
    // Population dominates size.
    assert!(snapshots[0].radius > snapshots[1].radius);

    let result = sim.fast_forward();
    assert!(result.termination.is_some());
    assert_eq!(result.ranking.len(), 2);
    assert_eq!(result.ranking[0].rank, 1);
}

#[test]
fn test_provider_roster_matches_fixture() {
    let identities: Vec<Identity> = COUNTRIES
        .iter()
        .take(5)
        .map(|(code, name, _, _)| Identity::new(*code, *name))
        .chain(std::iter::once(Identity::new("ZZZ", "Atlantis")))
        .collect();

    let setup = MatchSetup::from_provider(&sample_provider(3), identities, FIXTURE_START_YEAR)
        .expect("five countries have data");
    assert_eq!(setup.entries.len(), 5);
    assert!(setup.entries.iter().all(|e| e.identity.code != "ZZZ"));
}

#[test]
fn test_year_advances_and_stats_follow() {
    let config = BattleConfig::default();
    let interval = config.progression.interval_ticks(config.tick_rate);
    let mut sim =
        Simulation::with_seed(&sample_setup(4, 3), Catalog::empty(), config, 31).expect("valid");

    let events = sim.advance(interval);
    if sim.is_finished() {
        return;
    }
    assert_eq!(sim.current_year(), FIXTURE_START_YEAR + 1);
    let progressed: Vec<&SimulationEvent> = events
        .iter()
        .filter(|e| e.kind == EventKind::YearProgression)
        .collect();
    assert_eq!(progressed.len(), sim.alive_count());
    assert!(sim
        .marbles()
        .iter()
        .filter(|m| m.alive)
        .all(|m| m.stats_year == FIXTURE_START_YEAR + 1));
}

#[test]
fn test_progression_stops_when_data_runs_out() {
    let config = BattleConfig::default();
    let interval = config.progression.interval_ticks(config.tick_rate);
    let mut sim =
        Simulation::with_seed(&sample_setup(3, 1), Catalog::empty(), config, 32).expect("valid");

    let events = sim.advance(interval * 2);
    assert!(!events.iter().any(|e| e.kind == EventKind::YearProgression));
    assert!(sim.marbles().iter().all(|m| m.stats_year == FIXTURE_START_YEAR));
}

#[test]
fn test_snapshots_report_special_moves() {
    let sim = seeded_simulation(5, 41);
    let snapshots = sim.snapshots();
    let usa = snapshots.iter().find(|s| s.code == "USA").expect("USA present");
    assert_eq!(usa.special_move, SpecialMoveKind::Charge);
    assert_eq!(usa.skill, "overwhelming force");
    assert!(snapshots.iter().all(|s| s.alive && s.health == s.max_health));
}

#[test]
fn test_events_carry_text() {
    let mut sim = seeded_simulation(6, 42);
    let events = sim.advance(2_000);
    assert!(!events.is_empty());
    assert!(events.iter().all(|e| !e.text.is_empty()));
}

#[test]
fn test_totals_balance_across_match() {
    let mut sim = seeded_simulation(6, 43);
    sim.fast_forward();
    let dealt: u64 = sim.marbles().iter().map(|m| m.totals.damage_dealt).sum();
    let taken: u64 = sim.marbles().iter().map(|m| m.totals.damage_taken).sum();
    assert_eq!(dealt, taken);

    let kills: u32 = sim.marbles().iter().map(|m| m.totals.kills).sum();
    let credited = sim
        .marbles()
        .iter()
        .filter(|m| m.totals.eliminated_by.is_some())
        .count();
    assert_eq!(kills as usize, credited);
}

#[test]
fn test_config_loaded_from_ron() {
    let config = BattleConfig::from_ron_str(
        "(fast_forward_cap: 50, escalation: (damage_cap: Some(3.0)))",
    )
    .expect("partial RON config");
    let mut sim = Simulation::with_seed(&mirror_duel_setup(), Catalog::builtin(), config, 51)
        .expect("valid setup");
    let result = sim.fast_forward();
    assert!(result.ticks <= 50);
}

#[test]
fn test_invalid_config_rejected() {
    let config = BattleConfig {
        tick_rate: 0,
        ..BattleConfig::default()
    };
    let result = Simulation::with_seed(&mirror_duel_setup(), Catalog::builtin(), config, 1);
    assert!(matches!(result, Err(BattleError::InvalidConfig(_))));
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn test_seeded_matches_deterministic() {
    assert!(verify_simulation_determinism(|| seeded_simulation(8, 1234), 1_500));
}

#[test]
fn test_first_divergence_none() {
    assert_eq!(find_first_divergence(|| seeded_simulation(4, 99), 500), None);
}

#[test]
fn test_resume_after_save() {
    assert!(verify_serialization_determinism(
        || seeded_simulation(6, 5),
        400,
        600
    ));
}
