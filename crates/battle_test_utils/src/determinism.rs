//! Determinism testing utilities.
//!
//! Production matches are unseeded, but every random draw goes through
//! the simulation's own generator, so two matches built from the same
//! seed must agree hash-for-hash. This harness checks that.
//!
//! # Sources of divergence to watch for
//!
//! - **HashMap iteration order**: the core iterates entities by slice
//!   position and pairs through a `BTreeMap`.
//! - **Ambient randomness**: any `rand::thread_rng()` call in the core is a bug.
//! - **Serialization gaps**: state that is not serialized (or not restored)
//!   makes a resumed match drift from the original.

use std::thread;

use battle_core::simulation::Simulation;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic run).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run agreed, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a state machine several times and compare final hashes.
///
/// # Example
///
/// ```ignore
/// use battle_test_utils::determinism::verify_determinism;
/// use battle_test_utils::fixtures::seeded_simulation;
///
/// let result = verify_determinism(
///     3,
///     500,
///     || seeded_simulation(4, 42),
///     |sim| { sim.tick(); },
///     |sim| sim.state_hash(),
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();
        for _ in 0..ticks {
            step(&mut state);
        }
        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Run the match from `setup_fn` twice and compare final state hashes.
pub fn verify_simulation_determinism<F>(setup_fn: F, num_ticks: u64) -> bool
where
    F: Fn() -> Simulation,
{
    verify_determinism(
        2,
        num_ticks,
        &setup_fn,
        |sim| {
            sim.tick();
        },
        Simulation::state_hash,
    )
    .is_deterministic
}

/// Run `num_sims` copies of a match on scoped threads and collect hashes.
///
/// Catches divergence that only shows up under different thread
/// scheduling or memory layout.
pub fn run_parallel_simulations<F>(setup_fn: F, num_sims: usize, num_ticks: u64) -> Vec<u64>
where
    F: Fn() -> Simulation + Sync,
{
    thread::scope(|s| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| {
                s.spawn(|| {
                    let mut sim = setup_fn();
                    sim.advance(num_ticks);
                    sim.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("simulation thread panicked"))
            .collect()
    })
}

/// Compare two runs tick by tick.
///
/// Returns `None` if they never diverge, or the first tick at which the
/// state hashes differ.
pub fn find_first_divergence<F>(setup_fn: F, num_ticks: u64) -> Option<u64>
where
    F: Fn() -> Simulation,
{
    let mut sim1 = setup_fn();
    let mut sim2 = setup_fn();

    if sim1.state_hash() != sim2.state_hash() {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        sim1.tick();
        sim2.tick();

        if sim1.state_hash() != sim2.state_hash() {
            return Some(tick);
        }
    }

    None
}

/// Check that a save/restore round-trip mid-match changes nothing, both
/// immediately and after `resume_ticks` more ticks on each copy.
pub fn verify_serialization_determinism<F>(setup_fn: F, num_ticks: u64, resume_ticks: u64) -> bool
where
    F: Fn() -> Simulation,
{
    let mut sim = setup_fn();
    sim.advance(num_ticks);

    let Ok(bytes) = sim.serialize() else {
        return false;
    };
    let Ok(mut restored) = Simulation::deserialize(&bytes) else {
        return false;
    };
    if sim.state_hash() != restored.state_hash() {
        return false;
    }

    sim.advance(resume_ticks);
    restored.advance(resume_ticks);
    sim.state_hash() == restored.state_hash()
}

/// Proptest strategies for indicator data and rosters.
pub mod strategies {
    use battle_core::indicators::IndicatorSnapshot;
    use proptest::prelude::*;

    /// Any value an indicator field might carry, including garbage.
    pub fn arb_raw_indicator() -> impl Strategy<Value = Option<f64>> {
        prop_oneof![
            4 => any::<f64>().prop_map(Some),
            4 => (-1.0e3..1.0e3_f64).prop_map(Some),
            1 => Just(Some(f64::NAN)),
            1 => Just(Some(f64::INFINITY)),
            2 => Just(None),
        ]
    }

    /// Snapshot with arbitrary, possibly missing or invalid, fields.
    pub fn arb_snapshot() -> impl Strategy<Value = IndicatorSnapshot> {
        (
            (
                arb_raw_indicator(),
                arb_raw_indicator(),
                arb_raw_indicator(),
                arb_raw_indicator(),
            ),
            (
                arb_raw_indicator(),
                arb_raw_indicator(),
                arb_raw_indicator(),
                arb_raw_indicator(),
            ),
        )
            .prop_map(
                |(
                    (population, gdp, gdp_growth, exports_pct_gdp),
                    (inflation, gdp_per_capita, investment_pct_gdp, debt_pct_gdp),
                )| IndicatorSnapshot {
                    population,
                    gdp,
                    gdp_growth,
                    exports_pct_gdp,
                    inflation,
                    gdp_per_capita,
                    investment_pct_gdp,
                    debt_pct_gdp,
                },
            )
    }

    /// Realistic population (thousands to billions).
    pub fn arb_population() -> impl Strategy<Value = f64> {
        1.0e3..2.0e9_f64
    }

    /// Realistic, complete snapshot.
    pub fn arb_plausible_snapshot() -> impl Strategy<Value = IndicatorSnapshot> {
        (
            arb_population(),
            1.0e2..1.0e5_f64,
            -10.0..15.0_f64,
            0.0..120.0_f64,
            -2.0..40.0_f64,
            -2.0..8.0_f64,
            0.0..200.0_f64,
        )
            .prop_map(
                |(population, per_capita, growth, exports, inflation, investment, debt)| {
                    IndicatorSnapshot {
                        population: Some(population),
                        gdp: Some(population * per_capita),
                        gdp_growth: Some(growth),
                        exports_pct_gdp: Some(exports),
                        inflation: Some(inflation),
                        gdp_per_capita: Some(per_capita),
                        investment_pct_gdp: Some(investment),
                        debt_pct_gdp: Some(debt),
                    }
                },
            )
    }

    /// Number of combatants for a match.
    pub fn arb_roster_size() -> impl Strategy<Value = usize> {
        2usize..=8
    }
}
