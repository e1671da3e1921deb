//! Table simulator CLI - plays whole games in memory with random bots.
//!
//! Every step is checked against the engine's structural invariants, so a
//! long run doubles as a soak test of the rules.

mod output;
mod simulator;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use output::{OutputFormat, OutputWriter};
use party_backend::telemetry::init_tracing_with;
use simulator::{GameResult, Simulator};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "table-simulator")]
#[command(about = "In-memory self-play for the social deduction engine")]
struct Args {
    /// Number of games to simulate
    #[arg(short, long, default_value = "1")]
    games: u32,

    /// Seats per table (3-20)
    #[arg(short, long, default_value = "7", value_parser = clap::value_parser!(u8).range(3..=20))]
    players: u8,

    /// Bot type for every seat
    #[arg(long, default_value = "random")]
    bot: String,

    /// Base seed; game N uses seed + N. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Output format
    #[arg(long, value_enum, default_value = "jsonl")]
    format: OutputFormat,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Give up on a game after this many applied actions
    #[arg(long, default_value = "10000")]
    max_steps: u32,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing_with(if args.verbose { "debug" } else { "warn" });

    let base_seed = args.seed.unwrap_or_else(rand::random);
    info!(games = args.games, players = args.players, base_seed, "Starting simulation");

    let mut writer = OutputWriter::new(args.output.as_deref(), args.format)?;
    let start = Instant::now();
    let mut results = Vec::new();
    let mut errors = 0u32;

    for game in 1..=args.games {
        let seed = base_seed.wrapping_add(u64::from(game));
        let players = usize::from(args.players);
        let outcome =
            Simulator::new(game, seed, players, &args.bot, args.max_steps).and_then(Simulator::run);
        match outcome {
            Ok(result) => {
                if let Err(e) = writer.write_game(&result) {
                    warn!(game, error = %e, "Failed to write result");
                }
                results.push(result);
            }
            Err(e) => {
                errors += 1;
                warn!(game, seed, error = %e, "Game failed");
            }
        }
    }
    writer.finish()?;

    print_summary(&results, errors, start.elapsed(), args.games);
    if errors > 0 {
        return Err(format!("{errors} game(s) failed").into());
    }
    Ok(())
}

fn print_summary(results: &[GameResult], errors: u32, elapsed: std::time::Duration, total: u32) {
    eprintln!("\n=== Simulation Summary ===");
    eprintln!("Games completed: {}/{}", results.len(), total);
    if errors > 0 {
        eprintln!("Errors: {errors}");
    }
    eprintln!("Total time: {elapsed:?}");
    if results.is_empty() {
        return;
    }

    let mut by_team: BTreeMap<String, u32> = BTreeMap::new();
    let mut by_reason: BTreeMap<String, u32> = BTreeMap::new();
    for result in results {
        let team = result
            .winner
            .map_or_else(|| "Unfinished".to_string(), |p| format!("{p:?}"));
        *by_team.entry(team).or_default() += 1;
        if let Some(reason) = result.reason {
            *by_reason.entry(format!("{reason:?}")).or_default() += 1;
        }
    }

    let n = results.len() as f64;
    eprintln!("\n=== Wins by Team ===");
    for (team, count) in &by_team {
        eprintln!("{team}: {count} ({:.1}%)", f64::from(*count) / n * 100.0);
    }
    eprintln!("\n=== Wins by Reason ===");
    for (reason, count) in &by_reason {
        eprintln!("{reason}: {count}");
    }
    let avg_steps = results.iter().map(|r| f64::from(r.steps)).sum::<f64>() / n;
    eprintln!("\nAverage steps per game: {avg_steps:.1}");
}
