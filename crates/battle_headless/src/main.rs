//! Headless battle runner.
//!
//! # Usage
//!
//! ```bash
//! # Stream a single match as JSON lines
//! cargo run -p battle_headless -- run --roster data/roster.ron --speed 4 --seed 7
//!
//! # Batch balance run
//! cargo run -p battle_headless -- batch --roster data/roster.ron --count 500 --output results/
//!
//! # Check a roster before using it
//! cargo run -p battle_headless -- validate --roster data/roster.ron
//! ```
//!
//! Logs go to stderr; stdout carries protocol lines only.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use battle_headless::{
    batch::{run_batch, verify_determinism, BatchConfig},
    protocol::Response,
    roster::{validate, LoadedRoster},
    runner::{MatchRunner, RunConfig},
};

#[derive(Parser)]
#[command(name = "battle_headless")]
#[command(about = "Headless country battle runner")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one match, streaming frames and events to stdout
    Run {
        /// Roster file (RON)
        #[arg(short, long)]
        roster: PathBuf,

        /// Ticks per frame (speed multiplier)
        #[arg(short, long, default_value = "1")]
        speed: u32,

        /// Seed for a reproducible match (default: unseeded)
        #[arg(long)]
        seed: Option<u64>,

        /// Emit a frame line every N frames
        #[arg(long, default_value = "1")]
        frame_every: u32,

        /// Suppress event lines
        #[arg(long)]
        no_events: bool,
    },

    /// Fast-forward many seeded matches in parallel
    Batch {
        /// Roster file (RON)
        #[arg(short, long)]
        roster: PathBuf,

        /// Number of matches to run
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Maximum parallel matches (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Starting random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Per-match tick cap (0 = config safety cap)
        #[arg(long, default_value = "0")]
        max_ticks: u64,

        /// Re-run the first seed this many times and check hashes agree
        #[arg(long, default_value = "0")]
        verify_runs: u32,
    },

    /// Check that a roster, its data and its config can start a match
    Validate {
        /// Roster file (RON)
        #[arg(short, long)]
        roster: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for protocol)
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    match cli.command {
        Commands::Run {
            roster,
            speed,
            seed,
            frame_every,
            no_events,
        } => cmd_run(&roster, speed, seed, frame_every, no_events),
        Commands::Batch {
            roster,
            count,
            parallel,
            output,
            seed,
            max_ticks,
            verify_runs,
        } => cmd_batch(&roster, count, parallel, &output, seed, max_ticks, verify_runs),
        Commands::Validate { roster } => cmd_validate(&roster),
    }
}

/// Load a roster or exit with a protocol error line.
fn load_roster(path: &Path) -> LoadedRoster {
    match LoadedRoster::load(path) {
        Ok(roster) => roster,
        Err(e) => {
            tracing::error!(error = %e, path = %path.display(), "Failed to load roster");
            print!("{}", Response::error(e.to_string()).to_json_line());
            std::process::exit(1);
        }
    }
}

/// Play a single match
fn cmd_run(roster_path: &Path, speed: u32, seed: Option<u64>, frame_every: u32, no_events: bool) {
    let roster = load_roster(roster_path);
    let config = RunConfig {
        seed,
        frame_every,
        emit_events: !no_events,
        ..RunConfig::default().with_speed(speed)
    };
    let runner = MatchRunner::new(config);

    let mut sim = match runner.build(&roster) {
        Ok(sim) => sim,
        Err(e) => {
            tracing::error!(error = %e, "Failed to start match");
            print!("{}", Response::error(e.to_string()).to_json_line());
            std::process::exit(1);
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match runner.play(&mut sim, &mut out) {
        Ok(result) => {
            tracing::info!(
                ticks = result.ticks,
                leader = ?result.ranking.first().map(|r| r.code.as_str()),
                termination = ?result.termination,
                "Match complete"
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to write output");
            std::process::exit(1);
        }
    }
}

/// Run a batch of matches
fn cmd_batch(
    roster_path: &Path,
    count: u32,
    parallel: u32,
    output: &Path,
    seed: u64,
    max_ticks: u64,
    verify_runs: u32,
) {
    let batch_start = Instant::now();
    let roster = load_roster(roster_path);

    tracing::info!(
        roster = %roster_path.display(),
        count,
        parallel,
        seed,
        max_ticks,
        output = %output.display(),
        "Batch configuration"
    );

    if let Err(e) = std::fs::create_dir_all(output) {
        tracing::error!(error = %e, path = %output.display(), "Failed to create output directory");
        std::process::exit(1);
    }

    if verify_runs > 0 {
        if verify_determinism(&roster, seed, verify_runs, max_ticks) {
            eprintln!("PASS: {verify_runs} runs of seed {seed} produced identical hashes");
        } else {
            eprintln!("FAIL: Non-determinism detected for seed {seed}!");
            std::process::exit(1);
        }
    }

    let config = BatchConfig {
        roster: Some(roster_path.to_path_buf()),
        game_count: count,
        parallel_games: parallel,
        seed_start: seed,
        max_ticks,
    };
    let results = run_batch(&roster, config);

    let results_path = output.join("batch_results.json");
    if let Err(e) = results.save(&results_path) {
        tracing::error!(error = %e, path = %results_path.display(), "Failed to save results");
        std::process::exit(1);
    }

    let summary = &results.summary;
    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BATCH COMPLETE");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Matches played: {}", results.games.len());
    if !results.errors.is_empty() {
        eprintln!("Matches FAILED: {}", results.errors.len());
    }
    eprintln!("Duration: {:.1}s", batch_start.elapsed().as_secs_f64());
    eprintln!("Average length: {:.0} ticks (max {})", summary.average_ticks, summary.max_ticks);
    eprintln!(
        "Annihilations: {}  Safety caps: {}",
        summary.annihilations, summary.safety_caps
    );

    let mut rates: Vec<(&String, &f64)> = summary.win_rates.iter().collect();
    rates.sort_by(|a, b| b.1.total_cmp(a.1));
    eprintln!("\nWin Rates:");
    for (code, rate) in rates {
        let rank = summary.average_rank.get(code).copied().unwrap_or_default();
        eprintln!("  {code}: {:.1}% (avg rank {rank:.2})", rate * 100.0);
    }

    for error in results.errors.iter().take(10) {
        eprintln!("  Match {} (seed {}): {}", error.game_index, error.seed, error.message);
    }

    eprintln!("\nResults saved to: {}", results_path.display());
}

/// Validate a roster
fn cmd_validate(roster_path: &Path) {
    let roster = load_roster(roster_path);
    match validate(&roster) {
        Ok(entries) => {
            eprintln!("OK: {} combatants, start year {}", entries.len(), roster.setup.start_year);
            for entry in &entries {
                let s = &entry.stats;
                eprintln!(
                    "  {:<4} {:<24} hp {:>5}  atk {:>5.1}  spd {:>4.1}  crit {:>4.1}  def {:>4.1}  ({})",
                    entry.identity.code,
                    entry.identity.name,
                    s.max_health,
                    s.attack,
                    s.speed,
                    s.crit_chance,
                    s.defense,
                    entry.stats_year
                );
            }
        }
        Err(e) => {
            eprintln!("INVALID: {e}");
            std::process::exit(1);
        }
    }
}
