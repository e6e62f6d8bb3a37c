use std::error::Error;
use std::path::PathBuf;

use clap::Parser;

mod scenario;
mod sim;

use scenario::Scenario;
use sim::Simulation;

#[derive(Parser, Debug)]
#[command(name = "alchemy", about = "Run exploration and discovery over a sparse voxel world")]
struct Args {
    /// Scenario TOML; built-in defaults when omitted.
    #[arg(long)]
    scenario: Option<PathBuf>,
    /// Override the scenario's step count.
    #[arg(long)]
    steps: Option<usize>,
    /// Print every explored block after the run.
    #[arg(long)]
    report: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let scenario = match &args.scenario {
        Some(path) => {
            log::info!("loading scenario {}", path.display());
            Scenario::from_path(path)?
        }
        None => Scenario::default(),
    };
    let steps = args.steps.unwrap_or(scenario.steps);

    let mut sim = Simulation::from_scenario(&scenario);
    for r in sim.run(steps) {
        log::info!(
            "[step {}] explored={} observed+={} remembered+={}",
            r.step,
            r.explored,
            r.observed_writes,
            r.remembered_writes
        );
    }

    log::info!(
        "done after {} step(s): bounds {}, {} observed, {} remembered, {} stale",
        sim.steps_taken(),
        sim.explored()
            .bounds()
            .map_or_else(|| "empty".to_string(), |b| b.to_string()),
        sim.observed().cell_count(),
        sim.memory().cell_count(),
        sim.stale_cells()
    );
    for (name, n) in sim.memory_histogram() {
        println!("{:>12} {}", name, n);
    }
    if args.report {
        for (extent, value) in sim.explored_blocks() {
            let seen: Vec<String> = sim
                .remembered_in(extent)
                .into_iter()
                .map(|(name, n)| format!("{}:{}", name, n))
                .collect();
            println!("{} {} {}", extent, value, seen.join(" "));
        }
    }
    Ok(())
}
