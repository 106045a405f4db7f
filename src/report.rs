//! Exported logs and console summaries built from a finished run.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::OutputConfig;
use crate::error::{SimError, SimResult};
use crate::performance::PerformanceReport;
use crate::price::PricePath;
use crate::sim::{Simulator, StepRecord, StrategyRun};
use crate::types::{Fill, Side, Step};

/// One row of a fill log
#[derive(Debug, Clone, Serialize)]
pub struct FillRecord {
    pub step: Step,
    pub side: Side,
    pub price: f64,
}

impl From<&Fill> for FillRecord {
    fn from(fill: &Fill) -> Self {
        Self {
            step: fill.step,
            side: fill.side,
            price: fill.price,
        }
    }
}

/// One row of a strategy's per-step series
#[derive(Debug, Clone, Serialize)]
pub struct SeriesRecord {
    pub step: Step,
    pub fair_price: f64,
    pub bid: f64,
    pub ask: f64,
    pub inventory: i64,
    pub total_pnl: f64,
}

/// One row of the fair-price path; step 0 is the starting price
#[derive(Debug, Clone, Serialize)]
pub struct PriceRecord {
    pub step: usize,
    pub fair_price: f64,
}

/// Terminal figures for one strategy
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub strategy: String,
    pub final_cash: f64,
    pub final_inventory: i64,
    pub inventory_value: f64,
    pub total_pnl: f64,
    pub fills: usize,
    pub performance: PerformanceReport,
}

impl RunSummary {
    pub fn from_run(run: &StrategyRun, final_price: f64) -> Self {
        Self {
            strategy: run.strategy.name.clone(),
            final_cash: run.ledger.cash(),
            final_inventory: run.ledger.inventory(),
            inventory_value: run.ledger.inventory_value(final_price),
            total_pnl: run.ledger.total_pnl(final_price),
            fills: run.fills.len(),
            performance: run.report(final_price),
        }
    }

    /// Summaries for every strategy of a simulator, in strategy order
    pub fn collect(sim: &Simulator) -> Vec<Self> {
        let final_price = sim.final_price();
        sim.runs()
            .iter()
            .map(|run| Self::from_run(run, final_price))
            .collect()
    }

    /// Key/value view for console or file reporting
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Strategy", self.strategy.clone()),
            ("Final Cash", format!("{:.2}", self.final_cash)),
            ("Final Inventory", self.final_inventory.to_string()),
            ("Inventory Value", format!("{:.2}", self.inventory_value)),
            ("Total P&L", format!("{:.2}", self.total_pnl)),
            ("Fills", self.fills.to_string()),
            ("Sharpe Ratio", format_ratio(self.performance.sharpe)),
            ("Sortino Ratio", format_ratio(self.performance.sortino)),
            ("Max Drawdown", format!("{:.2}", self.performance.max_drawdown)),
            ("Realized P&L", format!("{:.2}", self.performance.realized)),
            ("Unrealized P&L", format!("{:.2}", self.performance.unrealized)),
        ]
    }
}

fn format_ratio(value: f64) -> String {
    if value.is_infinite() {
        if value > 0.0 { "inf".to_string() } else { "-inf".to_string() }
    } else {
        format!("{:.4}", value)
    }
}

/// Render one summary as `Key: value` lines
pub fn format_summary(summary: &RunSummary) -> String {
    let mut out = String::new();
    for (key, value) in summary.pairs() {
        let _ = writeln!(out, "{}: {}", key, value);
    }
    out
}

/// Render a side-by-side comparison table of several strategies
pub fn format_comparison(summaries: &[RunSummary]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<16} {:>12} {:>10} {:>12} {:>8} {:>10} {:>10} {:>12}",
        "strategy", "cash", "inventory", "total_pnl", "fills", "sharpe", "sortino", "max_dd"
    );
    for s in summaries {
        let _ = writeln!(
            out,
            "{:<16} {:>12.2} {:>10} {:>12.2} {:>8} {:>10} {:>10} {:>12.2}",
            s.strategy,
            s.final_cash,
            s.final_inventory,
            s.total_pnl,
            s.fills,
            format_ratio(s.performance.sharpe),
            format_ratio(s.performance.sortino),
            s.performance.max_drawdown
        );
    }
    out
}

/// Write a fill log as CSV with columns `step,side,price`
pub fn write_fills_csv<W: Write>(writer: W, fills: &[Fill]) -> SimResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for fill in fills {
        wtr.serialize(FillRecord::from(fill))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write a strategy's per-step quotes, inventory and PnL as CSV
pub fn write_series_csv<W: Write>(
    writer: W,
    run: &StrategyRun,
    records: &[StepRecord],
) -> SimResult<()> {
    if run.quotes.len() != records.len() {
        return Err(SimError::export(format!(
            "strategy '{}' has {} steps but the market has {}",
            run.strategy.name,
            run.quotes.len(),
            records.len()
        )));
    }

    let mut wtr = csv::Writer::from_writer(writer);
    for (t, record) in records.iter().enumerate() {
        wtr.serialize(SeriesRecord {
            step: record.step,
            fair_price: record.fair_price,
            bid: run.quotes[t].bid,
            ask: run.quotes[t].ask,
            inventory: run.inventory_series[t],
            total_pnl: run.pnl_series[t],
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the fair-price path as CSV with columns `step,fair_price`
pub fn write_price_path_csv<W: Write>(writer: W, path: &PricePath) -> SimResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for (step, fair_price) in path.as_slice().iter().enumerate() {
        wtr.serialize(PriceRecord {
            step,
            fair_price: *fair_price,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write all summaries as a pretty-printed JSON array
pub fn write_summary_json<W: Write>(writer: W, summaries: &[RunSummary]) -> SimResult<()> {
    serde_json::to_writer_pretty(writer, summaries)?;
    Ok(())
}

/// File-name-safe form of a strategy name
pub(crate) fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

fn create(dir: &Path, name: &str, written: &mut Vec<PathBuf>) -> SimResult<File> {
    let path = dir.join(name);
    let file = File::create(&path)?;
    written.push(path);
    Ok(file)
}

/// Write every enabled export for a finished run into `output.directory`.
///
/// Returns the paths written.
pub fn export_run(sim: &Simulator, output: &OutputConfig) -> SimResult<Vec<PathBuf>> {
    let dir = output.directory.as_path();
    fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    if output.write_series {
        let file = create(dir, "price_path.csv", &mut written)?;
        write_price_path_csv(file, sim.price_path())?;
    }

    let mut stems = HashSet::new();
    for run in sim.runs() {
        let stem = file_stem(run.name());
        if !stems.insert(stem.clone()) {
            return Err(SimError::export(format!(
                "strategy '{}' would overwrite the export files of another strategy ({}_*.csv)",
                run.name(),
                stem
            )));
        }
        if output.write_fills {
            let file = create(dir, &format!("{}_fills.csv", stem), &mut written)?;
            write_fills_csv(file, &run.fills)?;
        }
        if output.write_series {
            let file = create(dir, &format!("{}_series.csv", stem), &mut written)?;
            write_series_csv(file, run, sim.records())?;
        }
    }

    if output.write_summary {
        let file = create(dir, "summary.json", &mut written)?;
        write_summary_json(file, &RunSummary::collect(sim))?;
    }

    tracing::info!(
        directory = %dir.display(),
        files = written.len(),
        "Exported simulation results"
    );
    Ok(written)
}
