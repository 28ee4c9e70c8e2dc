#![deny(warnings)]

//! Headless CLI: load a coop file, run the simulation or a deflector sweep,
//! print the results.

mod coop_file;

use std::path::PathBuf;

use anyhow::Result;
use coop_runtime::{format_duration, simulate, Outcome};
use coop_scenarios::{run_presets, standard_presets, ScenarioOutcome};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use coop_file::CoopFile;

#[derive(Default)]
struct Args {
    config: Option<PathBuf>,
    scenarios: bool,
    json: bool,
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => args.config = it.next().map(PathBuf::from),
            "--scenarios" => args.scenarios = true,
            "--json" => args.json = true,
            _ => {}
        }
    }
    args
}

fn print_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Completed(r) => {
            println!(
                "Completed in {} | coop rate: {:.3e}/h | deflector: {:.0}% | safe drop: {:.1}%",
                format_duration(r.completion_time),
                r.aggregate_rate,
                r.total_deflector_percent,
                r.safe_deflector_drop_percent
            );
            if let Some(t) = r.steady_state_at {
                println!("All habitats full at {}", format_duration(t));
            }
            if let Some(t) = r.siab_swap_at {
                println!("Shields off at {}", format_duration(t));
            }
            println!(
                "{:<12} {:>10} {:>10} {:>6} {:>8} {:>6} {:>6} {:>7}",
                "player", "lay/h", "ship/h", "T/Q", "boost", "cr", "btv", "score"
            );
            for p in &r.players {
                let boost = p
                    .time_to_boost
                    .map_or_else(|| "-".to_string(), format_duration);
                println!(
                    "{:<12} {:>10.3e} {:>10.3e} {:>3}/{:<2} {:>8} {:>6.2} {:>6.2} {:>7}",
                    p.name,
                    p.lay_rate,
                    p.ship_rate,
                    p.stones.tachyon,
                    p.stones.quantum,
                    boost,
                    p.contribution_ratio,
                    p.btv_ratio,
                    p.score
                );
            }
            println!(
                "Scores | min: {} | mean: {:.1} | max: {}",
                r.min_score(),
                r.mean_score,
                r.max_score
            );
        }
        Outcome::Failed(f) => println!("FAILED | {}", f.summary),
    }
}

fn print_scenarios(results: &[ScenarioOutcome]) {
    println!("{:<20} {:>7} {:>7} {:>12}", "preset", "min", "max", "completion");
    for r in results {
        let done = r
            .completion_time
            .map_or_else(|| "FAILED".to_string(), format_duration);
        println!(
            "{:<20} {:>7} {:>7} {:>12}",
            r.preset, r.min_score, r.max_score, done
        );
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::DEBUG)
        .init();

    let args = parse_args();
    info!(config = ?args.config, scenarios = args.scenarios, "starting CLI");

    let file = match &args.config {
        Some(path) => CoopFile::load(path)?,
        None => coop_file::demo(),
    };
    let coop = file.into_coop()?;

    if args.scenarios {
        let presets = if coop.presets.is_empty() {
            standard_presets()
        } else {
            coop.presets
        };
        let results = run_presets(&coop.players, &coop.params, &coop.catalog, &presets)?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&results)?);
        } else {
            print_scenarios(&results);
        }
        return Ok(());
    }

    let outcome = simulate(&coop.players, &coop.params, &coop.catalog)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }
    Ok(())
}
