//! Headless Land War Runner
//!
//! Loads a scenario, runs every requested land's bracket to completion and
//! prints one report per land.

use std::process::ExitCode;

use alliance_war::core::config::WarConfig;
use alliance_war::core::error::{Outcome, Result};
use alliance_war::core::types::LandId;
use alliance_war::scenario::Scenario;
use alliance_war::war::{LandWarReport, Response};
use clap::{Parser, ValueEnum};
use rayon::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Text,
}

/// Headless Land War Runner - pair and fight alliance land brackets
#[derive(Parser, Debug)]
#[command(name = "alliance-war")]
#[command(about = "Run land-war brackets from a scenario file and report the occupiers")]
struct Args {
    /// Scenario TOML with players, alliances and registrations
    #[arg(long)]
    scenario: String,

    /// Land to run (repeatable); defaults to every land in the scenario
    #[arg(long = "land")]
    lands: Vec<u64>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Config TOML overriding the scenario's [config] table
    #[arg(long)]
    config: Option<String>,

    /// Fight even outside Wednesday/Saturday 20:00-22:00 UTC
    #[arg(long)]
    any_time: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "json")]
    format: Format,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("alliance_war=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let seed = args.seed.unwrap_or_else(rand::random);
    let mut scenario = Scenario::load(&args.scenario)?;
    if let Some(path) = &args.config {
        scenario.config = WarConfig::load(path)?;
    }
    if args.any_time {
        scenario.config.allow_time_bypass = true;
    }
    let lands: Vec<LandId> = if args.lands.is_empty() {
        scenario.lands()
    } else {
        args.lands.iter().copied().map(LandId).collect()
    };

    tracing::info!(seed, lands = lands.len(), "running land wars");
    let service = scenario.into_service()?;

    // Lands are independent keys
    let reports = lands
        .par_iter()
        .map(|&land| {
            service
                .run_land_war(land, seed.wrapping_add(land.0))
                .map(|outcome| (land, outcome))
        })
        .collect::<Result<Vec<_>>>()?;

    for (land, outcome) in reports {
        match args.format {
            Format::Json => {
                println!("{}", serde_json::to_string(&Response::from(outcome))?);
            }
            Format::Text => print_text(land, &outcome),
        }
    }
    Ok(())
}

fn print_text(land: LandId, outcome: &Outcome<LandWarReport>) {
    let report = match outcome {
        Ok(report) => report,
        Err(rejection) => {
            println!("land {}: {}", land, rejection);
            return;
        }
    };

    println!("=== Land {} (seed {}) ===", land, report.seed);
    for (cycle, pairing) in report.pairings.iter().enumerate() {
        let bye = pairing
            .bye
            .as_ref()
            .map(|b| format!(", bye: alliance {}", b.alliance_id))
            .unwrap_or_default();
        println!("cycle {}: {} battle(s){}", cycle + 1, pairing.battles.len(), bye);
    }
    for battle in &report.battles {
        let verdict = battle
            .verdict
            .map(|v| format!("{:?}", v))
            .unwrap_or_else(|| "unfinished".to_string());
        println!(
            "  battle {}: alliance {} vs alliance {} -> {} in {} round(s)",
            battle.battle_id, battle.left_alliance_id, battle.right_alliance_id, verdict, battle.rounds
        );
    }
    match report.occupier {
        Some(alliance) => println!("occupied by alliance {}", alliance),
        None => println!("no occupier"),
    }
    if let Some(stopped) = &report.stopped {
        println!("stopped: {}", stopped);
    }
}
