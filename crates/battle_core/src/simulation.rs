//! Match driver.
//!
//! [`Simulation`] owns the battle state, the lookup tables, the match year
//! and the random source. It exposes [`Simulation::advance`] for normal
//! playback and [`Simulation::fast_forward`] for headless runs, both of
//! which call the same [`crate::step::step`].
//!
//! # Tick Order
//!
//! Each [`Simulation::tick`]:
//! 1. Runs one [`step`]
//! 2. Applies year progression when due, stepping each entity to its next
//!    data year
//! 3. Checks termination (at most one entity alive)
//!
//! Year progression is scheduled in simulated seconds converted to ticks,
//! so playback speed never changes when it happens.

use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::components::{CombatTotals, EntityId, Identity, Marble};
use crate::config::BattleConfig;
use crate::error::{BattleError, Result};
use crate::events::SimulationEvent;
use crate::factory::{spawn_roster, RosterEntry};
use crate::indicators::{IndicatorProvider, IndicatorSeries};
use crate::math::Vec2;
use crate::progression::progression_system;
use crate::skills::{Skill, SkillTable};
use crate::special_moves::{SpecialMoveKind, SpecialMoveTable};
use crate::stats::derive_stats;
use crate::step::{step, BattleState};

// ============================================================================
// Match setup
// ============================================================================

/// One participant before the match starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEntry {
    /// Who the participant is.
    pub identity: Identity,
    /// Indicator data by year.
    pub series: IndicatorSeries,
}

/// Everything needed to start a match except tables and config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSetup {
    /// Participants in spawn order.
    pub entries: Vec<MatchEntry>,
    /// Calendar year the match opens in.
    pub start_year: i32,
}

impl MatchSetup {
    /// Empty setup opening in `start_year`.
    #[must_use]
    pub fn new(start_year: i32) -> Self {
        Self {
            entries: Vec::new(),
            start_year,
        }
    }

    /// Builder: add a participant.
    #[must_use]
    pub fn with_entry(mut self, identity: Identity, series: IndicatorSeries) -> Self {
        self.entries.push(MatchEntry { identity, series });
        self
    }

    /// Assemble a setup from a provider.
    ///
    /// Identities the provider has no data for are dropped with a warning.
    ///
    /// # Errors
    ///
    /// Provider errors propagate. [`BattleError::NotEnoughCombatants`] if
    /// fewer than two identities have data.
    pub fn from_provider<P: IndicatorProvider + ?Sized>(
        provider: &P,
        identities: Vec<Identity>,
        start_year: i32,
    ) -> Result<Self> {
        let codes: Vec<String> = identities.iter().map(|i| i.code.clone()).collect();
        let mut data = provider.fetch(&codes, None)?;

        let mut setup = Self::new(start_year);
        for identity in identities {
            match data.remove(&identity.code) {
                Some(series) if !series.is_empty() => {
                    setup.entries.push(MatchEntry { identity, series });
                }
                _ => warn!(code = %identity.code, "No indicator data, dropping from roster"),
            }
        }

        if setup.entries.len() < 2 {
            return Err(BattleError::NotEnoughCombatants {
                found: setup.entries.len(),
            });
        }
        Ok(setup)
    }

    /// Opening roster: each entry's stats from its latest data at or before
    /// the start year, or its earliest data if the series starts later.
    ///
    /// # Errors
    ///
    /// [`BattleError::MissingIndicators`] for an entry with an empty series.
    pub fn roster(&self) -> Result<Vec<RosterEntry>> {
        self.entries
            .iter()
            .map(|entry| {
                let (year, snapshot) = entry
                    .series
                    .opening(self.start_year)
                    .ok_or_else(|| BattleError::MissingIndicators(entry.identity.code.clone()))?;
                Ok(RosterEntry::new(
                    entry.identity.clone(),
                    derive_stats(snapshot),
                    year,
                ))
            })
            .collect()
    }
}

// ============================================================================
// Outputs
// ============================================================================

/// Why a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Exactly one entity left alive.
    SingleSurvivor,
    /// The last entities were eliminated in the same tick.
    Annihilation,
    /// Fast-forward hit its iteration cap; the ranking is forced from the
    /// current state.
    SafetyCap,
}

/// Read-only view of one entity for renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    /// Entity id.
    pub id: EntityId,
    /// Country code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Primary and secondary colors.
    pub palette: [[u8; 3]; 2],
    /// Arena position.
    pub position: Vec2,
    /// Velocity per tick.
    pub velocity: Vec2,
    /// Current (health-scaled) radius.
    pub radius: f64,
    /// Current health.
    pub health: u32,
    /// Current max health.
    pub max_health: u32,
    /// Whether still in the match.
    pub alive: bool,
    /// Skill label.
    pub skill: String,
    /// A timed skill buff is running.
    pub buff_active: bool,
    /// The threshold skill has fired.
    pub threshold_active: bool,
    /// Rage is on.
    pub enraged: bool,
    /// Special-move category.
    pub special_move: SpecialMoveKind,
    /// The special move is in its active phase.
    pub special_active: bool,
    /// Aim captured when the special move last fired.
    pub aim: Vec2,
    /// Year the current stats come from.
    pub stats_year: i32,
}

/// One line of the final ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankEntry {
    /// 1-based rank.
    pub rank: usize,
    /// Entity id.
    pub id: EntityId,
    /// Country code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Alive at the end.
    pub alive: bool,
    /// Health at the end.
    pub health: u32,
    /// Max health at the end.
    pub max_health: u32,
    /// Damage, kills, crits and elimination info.
    pub totals: CombatTotals,
}

/// Final (or current) standings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Entities best first.
    pub ranking: Vec<RankEntry>,
    /// Survivor, or the leader when the safety cap ended the match.
    pub winner: Option<EntityId>,
    /// Ticks simulated.
    pub ticks: u64,
    /// Latest data year reached by the end.
    pub final_year: i32,
    /// Why the match ended, if it has.
    pub termination: Option<Termination>,
}

/// Ranking order: alive first, then later elimination, then more damage
/// dealt, then lower id.
fn rank_order(a: &Marble, b: &Marble) -> Ordering {
    b.alive
        .cmp(&a.alive)
        .then_with(|| b.totals.eliminated_at.cmp(&a.totals.eliminated_at))
        .then_with(|| b.totals.damage_dealt.cmp(&a.totals.damage_dealt))
        .then_with(|| a.id.cmp(&b.id))
}

// ============================================================================
// Driver
// ============================================================================

/// A running match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Simulation {
    state: BattleState,
    catalog: Catalog,
    config: BattleConfig,
    series: BTreeMap<EntityId, IndicatorSeries>,
    year: i32,
    next_progression_tick: u64,
    rng: ChaCha8Rng,
    termination: Option<Termination>,
}

impl Simulation {
    /// Start a match with an unseeded random source.
    ///
    /// # Errors
    ///
    /// Invalid config, a participant without data, or fewer than two
    /// participants.
    pub fn new(setup: &MatchSetup, catalog: Catalog, config: BattleConfig) -> Result<Self> {
        Self::build(setup, catalog, config, ChaCha8Rng::from_entropy())
    }

    /// Start a reproducible match from `seed`.
    ///
    /// # Errors
    ///
    /// Same as [`Simulation::new`].
    pub fn with_seed(
        setup: &MatchSetup,
        catalog: Catalog,
        config: BattleConfig,
        seed: u64,
    ) -> Result<Self> {
        Self::build(setup, catalog, config, ChaCha8Rng::seed_from_u64(seed))
    }

    fn build(
        setup: &MatchSetup,
        catalog: Catalog,
        config: BattleConfig,
        mut rng: ChaCha8Rng,
    ) -> Result<Self> {
        config.validate()?;
        let roster = setup.roster()?;
        let marbles = spawn_roster(&roster, &catalog, &config, &mut rng)?;

        let series = marbles
            .iter()
            .zip(&setup.entries)
            .map(|(m, entry)| (m.id, entry.series.clone()))
            .collect();

        info!(
            combatants = marbles.len(),
            start_year = setup.start_year,
            "Match started"
        );

        let next_progression_tick = config.progression.interval_ticks(config.tick_rate);
        Ok(Self {
            state: BattleState::new(marbles),
            catalog,
            config,
            series,
            year: setup.start_year,
            next_progression_tick,
            rng,
            termination: None,
        })
    }

    /// Current tick number.
    #[must_use]
    pub const fn get_tick(&self) -> u64 {
        self.state.tick
    }

    /// Latest data year any living entity has progressed to, or the start
    /// year before the first progression.
    #[must_use]
    pub const fn current_year(&self) -> i32 {
        self.year
    }

    /// Match configuration.
    #[must_use]
    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    /// Skill and special-move tables.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Every entity, alive or eliminated.
    #[must_use]
    pub fn marbles(&self) -> &[Marble] {
        &self.state.marbles
    }

    /// Look up one entity.
    ///
    /// # Errors
    ///
    /// [`BattleError::UnknownEntity`] if no entity has `id`.
    pub fn marble(&self, id: EntityId) -> Result<&Marble> {
        self.state
            .marbles
            .iter()
            .find(|m| m.id == id)
            .ok_or(BattleError::UnknownEntity(id))
    }

    /// Number of entities still alive.
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.state.alive_count()
    }

    /// Whether the match has ended.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.termination.is_some()
    }

    /// Why the match ended, if it has.
    #[must_use]
    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    /// Advance one tick. Does nothing once the match has ended.
    pub fn tick(&mut self) -> Vec<SimulationEvent> {
        if self.is_finished() {
            return Vec::new();
        }

        let mut events = step(
            &mut self.state,
            &self.catalog,
            &self.catalog,
            &self.config,
            &mut self.rng,
        );

        if self.config.progression.enabled && self.state.tick >= self.next_progression_tick {
            self.next_progression_tick += self.config.progression.interval_ticks(self.config.tick_rate);
            let skills: Vec<Skill> = self.state.skills_of(&self.catalog);
            let progressed = progression_system(
                &mut self.state.marbles,
                &self.series,
                &skills,
                &self.config.arena,
                self.state.tick,
                &mut events,
            );
            let latest = self.state.marbles.iter().filter(|m| m.alive).map(|m| m.stats_year).max();
            if let Some(latest) = latest {
                self.year = self.year.max(latest);
            }
            debug!(tick = self.state.tick, year = self.year, progressed, "Year progression");
        }

        match self.state.alive_count() {
            0 => self.finish(Termination::Annihilation),
            1 => self.finish(Termination::SingleSurvivor),
            _ => {}
        }

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            tracing::trace!(tick = self.state.tick, state_hash = hash, "Simulation state hash");
        }

        events
    }

    /// Advance up to `ticks` ticks, stopping early if the match ends.
    pub fn advance(&mut self, ticks: u64) -> Vec<SimulationEvent> {
        let mut events = Vec::new();
        for _ in 0..ticks {
            if self.is_finished() {
                break;
            }
            events.extend(self.tick());
        }
        events
    }

    /// Run to the end, bounded by the configured safety cap.
    pub fn fast_forward(&mut self) -> MatchResult {
        self.fast_forward_with_cap(self.config.fast_forward_cap)
    }

    /// Run to the end without collecting events, at most `cap` ticks.
    ///
    /// Hitting the cap is a soft termination: the match ends with
    /// [`Termination::SafetyCap`] and the ranking is forced from the
    /// current state.
    pub fn fast_forward_with_cap(&mut self, cap: u64) -> MatchResult {
        let mut iterations = 0;
        while !self.is_finished() && iterations < cap {
            self.tick();
            iterations += 1;
        }
        if !self.is_finished() {
            warn!(
                tick = self.state.tick,
                cap,
                alive = self.alive_count(),
                "Fast-forward safety cap reached, forcing ranking"
            );
            self.finish(Termination::SafetyCap);
        }
        self.result()
    }

    fn finish(&mut self, termination: Termination) {
        self.termination = Some(termination);
        let winner = self.result().winner;
        info!(
            tick = self.state.tick,
            ?termination,
            ?winner,
            "Match finished"
        );
    }

    /// Renderer snapshot of every entity.
    #[must_use]
    pub fn snapshots(&self) -> Vec<EntitySnapshot> {
        self.state
            .marbles
            .iter()
            .map(|m| {
                let skill = self.catalog.skill_for(&m.identity.code);
                let special_move = self.catalog.special_move_for(&m.identity.code);
                EntitySnapshot {
                    id: m.id,
                    code: m.identity.code.clone(),
                    name: m.identity.name.clone(),
                    palette: m.identity.palette,
                    position: m.position,
                    velocity: m.velocity,
                    radius: m.radius,
                    health: m.health,
                    max_health: m.max_health,
                    alive: m.alive,
                    skill: skill.label().to_string(),
                    buff_active: m.skill.buff_active(),
                    threshold_active: m.skill.activated,
                    enraged: m.enraged,
                    special_move,
                    special_active: m.special.is_active(),
                    aim: m.special.aim,
                    stats_year: m.stats_year,
                }
            })
            .collect()
    }

    /// Standings from the current state.
    #[must_use]
    pub fn result(&self) -> MatchResult {
        let mut order: Vec<&Marble> = self.state.marbles.iter().collect();
        order.sort_by(|a, b| rank_order(a, b));

        let ranking: Vec<RankEntry> = order
            .into_iter()
            .enumerate()
            .map(|(index, m)| RankEntry {
                rank: index + 1,
                id: m.id,
                code: m.identity.code.clone(),
                name: m.identity.name.clone(),
                alive: m.alive,
                health: m.health,
                max_health: m.max_health,
                totals: m.totals,
            })
            .collect();

        let winner = match self.termination {
            Some(Termination::SingleSurvivor | Termination::SafetyCap) => {
                ranking.first().map(|r| r.id)
            }
            Some(Termination::Annihilation) | None => None,
        };

        MatchResult {
            ranking,
            winner,
            ticks: self.state.tick,
            final_year: self.year,
            termination: self.termination,
        }
    }

    /// Hash of the state that matters for determinism checks.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.state.tick.hash(&mut hasher);
        self.year.hash(&mut hasher);
        self.state.marbles.len().hash(&mut hasher);
        for m in &self.state.marbles {
            m.id.hash(&mut hasher);
            m.alive.hash(&mut hasher);
            m.health.hash(&mut hasher);
            m.max_health.hash(&mut hasher);
            m.position.x.to_bits().hash(&mut hasher);
            m.position.y.to_bits().hash(&mut hasher);
            m.velocity.x.to_bits().hash(&mut hasher);
            m.velocity.y.to_bits().hash(&mut hasher);
            m.base_radius.to_bits().hash(&mut hasher);
            m.targeting.target.hash(&mut hasher);
            m.special.cooldown.hash(&mut hasher);
            m.special.active.hash(&mut hasher);
            m.skill.activated.hash(&mut hasher);
            m.enraged.hash(&mut hasher);
        }
        for (pair, tick) in self.state.cooldowns.iter() {
            pair.hash(&mut hasher);
            tick.hash(&mut hasher);
        }
        hasher.finish()
    }

    /// Serialize the full match, including the random source.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| BattleError::Serialization(format!("Failed to serialize simulation: {e}")))
    }

    /// Restore a match from [`Simulation::serialize`] output.
    ///
    /// # Errors
    ///
    /// Returns an error if decoding fails.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data).map_err(|e| {
            BattleError::Serialization(format!("Failed to deserialize simulation: {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{IndicatorSnapshot, StaticIndicatorProvider};

    fn country(population: f64, gdp: f64) -> IndicatorSeries {
        IndicatorSeries::new().with_year(
            2000,
            IndicatorSnapshot {
                population: Some(population),
                gdp: Some(gdp),
                ..IndicatorSnapshot::EMPTY
            },
        )
    }

    fn setup() -> MatchSetup {
        MatchSetup::new(2000)
            .with_entry(Identity::new("USA", "United States"), country(3e8, 1e13))
            .with_entry(Identity::new("CHN", "China"), country(1.3e9, 5e12))
            .with_entry(Identity::new("DEU", "Germany"), country(8e7, 3e12))
            .with_entry(Identity::new("BRA", "Brazil"), country(2e8, 1.5e12))
    }

    #[test]
    fn test_single_entry_rejected() {
        let one = MatchSetup::new(2000).with_entry(Identity::new("USA", "USA"), country(3e8, 1e13));
        let result = Simulation::with_seed(&one, Catalog::builtin(), BattleConfig::default(), 1);
        assert!(matches!(
            result,
            Err(BattleError::NotEnoughCombatants { found: 1 })
        ));
    }

    #[test]
    fn test_empty_series_rejected() {
        let setup = setup().with_entry(Identity::new("NIL", "Nowhere"), IndicatorSeries::new());
        let result = Simulation::with_seed(&setup, Catalog::builtin(), BattleConfig::default(), 1);
        assert!(matches!(result, Err(BattleError::MissingIndicators(code)) if code == "NIL"));
    }

    #[test]
    fn test_from_provider_drops_unknown() {
        let provider = StaticIndicatorProvider::new()
            .with_series("USA", country(3e8, 1e13))
            .with_series("CHN", country(1.3e9, 5e12));
        let setup = MatchSetup::from_provider(
            &provider,
            vec![
                Identity::new("USA", "United States"),
                Identity::new("XXX", "Unknown"),
                Identity::new("CHN", "China"),
            ],
            2000,
        )
        .unwrap();
        let codes: Vec<&str> = setup.entries.iter().map(|e| e.identity.code.as_str()).collect();
        assert_eq!(codes, vec!["USA", "CHN"]);

        let lonely = StaticIndicatorProvider::new().with_series("USA", country(3e8, 1e13));
        let result = MatchSetup::from_provider(
            &lonely,
            vec![Identity::new("USA", "USA"), Identity::new("CHN", "China")],
            2000,
        );
        assert!(matches!(
            result,
            Err(BattleError::NotEnoughCombatants { found: 1 })
        ));
    }

    #[test]
    fn test_fast_forward_terminates() {
        let mut sim = Simulation::with_seed(&setup(), Catalog::builtin(), BattleConfig::default(), 7)
            .unwrap();
        let result = sim.fast_forward();
        assert!(sim.is_finished());
        assert!(result.termination.is_some());
        assert_eq!(result.ranking.len(), 4);
        assert!(result.ticks <= sim.config().fast_forward_cap);
        if result.termination == Some(Termination::SingleSurvivor) {
            assert_eq!(sim.alive_count(), 1);
            assert!(result.ranking[0].alive);
            assert_eq!(result.winner, Some(result.ranking[0].id));
        }
    }

    #[test]
    fn test_safety_cap_forces_ranking() {
        let mut sim = Simulation::with_seed(&setup(), Catalog::builtin(), BattleConfig::default(), 3)
            .unwrap();
        let result = sim.fast_forward_with_cap(5);
        assert_eq!(result.termination, Some(Termination::SafetyCap));
        assert_eq!(result.ticks, 5);
        assert_eq!(result.winner, Some(result.ranking[0].id));

        // Finished matches stop ticking.
        assert!(sim.tick().is_empty());
        assert_eq!(sim.get_tick(), 5);
    }

    #[test]
    fn test_advance_counts_ticks() {
        let mut sim = Simulation::with_seed(&setup(), Catalog::builtin(), BattleConfig::default(), 4)
            .unwrap();
        sim.advance(30);
        assert_eq!(sim.get_tick(), 30);
        assert_eq!(sim.snapshots().len(), 4);
    }

    #[test]
    fn test_seeded_matches_agree() {
        let run = || {
            let mut sim =
                Simulation::with_seed(&setup(), Catalog::builtin(), BattleConfig::default(), 99)
                    .unwrap();
            sim.advance(1_000);
            sim.state_hash()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_serialization_roundtrip_continues_identically() {
        let mut sim = Simulation::with_seed(&setup(), Catalog::builtin(), BattleConfig::default(), 12)
            .unwrap();
        sim.advance(200);

        let bytes = sim.serialize().unwrap();
        let mut restored = Simulation::deserialize(&bytes).unwrap();
        assert_eq!(sim.state_hash(), restored.state_hash());

        sim.advance(300);
        restored.advance(300);
        assert_eq!(sim.state_hash(), restored.state_hash());
    }

    fn two_year_setup(second_year: i32) -> MatchSetup {
        let series = |population: f64| {
            country(population, 2e12).with_year(
                second_year,
                IndicatorSnapshot {
                    population: Some(population * 1.5),
                    gdp: Some(3e12),
                    ..IndicatorSnapshot::EMPTY
                },
            )
        };
        MatchSetup::new(2000)
            .with_entry(Identity::new("AAA", "Alphaland"), series(5e7))
            .with_entry(Identity::new("BBB", "Betastan"), series(6e7))
    }

    #[test]
    fn test_year_advances_on_schedule() {
        let config = BattleConfig::default();
        let interval = config.progression.interval_ticks(config.tick_rate);
        let mut sim =
            Simulation::with_seed(&two_year_setup(2001), Catalog::empty(), config, 5).unwrap();
        sim.advance(interval - 1);
        assert_eq!(sim.current_year(), 2000);
        sim.advance(1);
        if !sim.is_finished() {
            assert_eq!(sim.current_year(), 2001);
        }
    }

    #[test]
    fn test_gap_in_data_progresses_on_first_cadence() {
        let config = BattleConfig::default();
        let interval = config.progression.interval_ticks(config.tick_rate);
        let mut sim =
            Simulation::with_seed(&two_year_setup(2005), Catalog::empty(), config, 6).unwrap();
        sim.advance(interval);
        if sim.is_finished() {
            return;
        }
        assert_eq!(sim.current_year(), 2005);
        assert!(sim
            .marbles()
            .iter()
            .filter(|m| m.alive)
            .all(|m| m.stats_year == 2005));

        // Data exhausted: later cadences leave the year alone.
        sim.advance(interval);
        assert_eq!(sim.current_year(), 2005);
    }

    #[test]
    fn test_ranking_order() {
        let mut sim = Simulation::with_seed(&setup(), Catalog::builtin(), BattleConfig::default(), 8)
            .unwrap();
        sim.state.marbles[0].alive = false;
        sim.state.marbles[0].totals.eliminated_at = Some(100);
        sim.state.marbles[1].alive = false;
        sim.state.marbles[1].totals.eliminated_at = Some(200);
        sim.state.marbles[2].totals.damage_dealt = 10;
        sim.state.marbles[3].totals.damage_dealt = 500;

        let ids: Vec<EntityId> = sim.result().ranking.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 2, 1, 0]);
    }

    #[test]
    fn test_unknown_entity() {
        let sim = Simulation::with_seed(&setup(), Catalog::builtin(), BattleConfig::default(), 2)
            .unwrap();
        assert!(sim.marble(0).is_ok());
        assert!(matches!(sim.marble(42), Err(BattleError::UnknownEntity(42))));
    }
}
