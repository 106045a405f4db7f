use clap::Parser;
use mmsim::{
    export_run, format_comparison, format_summary, init_logging_with_level, log_sim_error,
    RunSummary, SimConfig, SimError, Simulator,
};
use std::path::PathBuf;
use std::process;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Single-asset market-making simulator
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path; without it ./config.toml is used when present
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override the number of simulation steps
    #[arg(long)]
    steps: Option<i64>,

    /// Override the export directory
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Skip writing CSV/JSON exports
    #[arg(long)]
    no_export: bool,

    /// Write a default configuration file to ./config.toml and exit
    #[arg(long)]
    generate_config: bool,
}

fn main() {
    let args = Args::parse();

    if args.generate_config {
        if let Err(e) = SimConfig::generate_default_config_file() {
            eprintln!("Failed to write config.toml: {}", e);
            process::exit(1);
        }
        return;
    }

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    if let Err(e) = init_logging_with_level(&config.logging.level) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    if let Err(e) = run(&config, args.no_export) {
        log_sim_error(&e, Some("Simulation run"));
        eprintln!("{}", e);
        process::exit(1);
    }
}

fn load_config(args: &Args) -> Result<SimConfig, SimError> {
    let mut config = match &args.config {
        Some(path) => SimConfig::load_from_existing_file(path)?,
        None => SimConfig::load_from_file(DEFAULT_CONFIG_PATH)?,
    };
    config.apply_env_overrides()?;

    if let Some(seed) = args.seed {
        config.market.random_seed = seed;
    }
    if let Some(steps) = args.steps {
        config.market.sim_duration = steps;
    }
    if let Some(dir) = &args.output_dir {
        config.output.directory = dir.clone();
    }

    config.validate()?;
    Ok(config)
}

fn run(config: &SimConfig, no_export: bool) -> Result<(), SimError> {
    let mut sim = Simulator::from_config(config)?;
    sim.run()?;

    let summaries = RunSummary::collect(&sim);
    for summary in &summaries {
        println!("{}", format_summary(summary));
    }
    if summaries.len() > 1 {
        println!("{}", format_comparison(&summaries));
    }

    let counters = sim.counters();
    println!(
        "Steps: {}  Order events: {} ({:.2}/step)  Fills: {} ({:.3} per event)  Final fair price: {:.2}",
        counters.steps,
        counters.order_events,
        counters.mean_events_per_step(),
        counters.total_fills(),
        counters.fill_ratio(),
        sim.final_price()
    );

    if !no_export {
        let written = export_run(&sim, &config.output)?;
        println!(
            "Wrote {} files to {}",
            written.len(),
            config.output.directory.display()
        );
    }

    Ok(())
}
