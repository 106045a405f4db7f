use mmsim::{format_comparison, QuoteStrategy, RunSummary, SimConfig, Simulator, MarketParams};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    let _ = mmsim::init_logging();

    println!("=== Market Making Strategy Comparison ===\n");

    let config = SimConfig::comparison();
    let params = MarketParams::from_config(&config)?;

    println!("Market configured:");
    println!("- Start price: {:.2}", params.fair_price_start);
    println!("- Volatility per step: {}", params.volatility);
    println!("- Orders per step (mean): {}", params.lambda);
    println!("- Steps: {}", params.sim_duration);
    println!("- Seed: {}\n", params.random_seed);

    // Add a wide-spread variant to the standard three
    let mut strategies = config.strategies();
    strategies.push(QuoteStrategy::new("wide", 2.0, 0.0));

    let mut simulator = Simulator::new(params, strategies)?;

    for chunk in 0..4 {
        let records = simulator.run_steps(25)?;
        let events: usize = records.iter().map(|r| r.event_count()).sum();
        println!(
            "Steps {:>3}-{:>3}: fair price {:.2}, {} order events",
            chunk * 25,
            chunk * 25 + 24,
            simulator.final_price(),
            events
        );
        for run in simulator.runs() {
            println!(
                "  {:<10} inventory {:>4}  pnl {:>8.2}",
                run.name(),
                run.ledger.inventory(),
                run.pnl_series.last().copied().unwrap_or(0.0)
            );
        }
    }

    println!("\n=== Final Results ===");
    let summaries = RunSummary::collect(&simulator);
    println!("{}", format_comparison(&summaries));

    Ok(())
}
