//! Risk/return statistics over a PnL series.
//!
//! Returns are first differences of the PnL series and standard deviations
//! are population (n) deviations. Ratios are annualized with a fixed 252
//! trading-day factor regardless of how many steps a run has; a step is
//! treated as one trading day.

use serde::Serialize;

use crate::ledger::Ledger;

/// Trading days per year used to annualize ratios
pub const ANNUALIZATION_FACTOR: f64 = 252.0;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation; 0.0 for an empty slice
pub fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Sample (n - 1) standard deviation; 0.0 with fewer than two values
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// First differences of a PnL series
pub fn returns(pnl_series: &[f64]) -> Vec<f64> {
    pnl_series.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Annualized mean return over return volatility.
///
/// 0.0 when returns are empty or constant.
pub fn sharpe_ratio(pnl_series: &[f64]) -> f64 {
    let returns = returns(pnl_series);
    let std = population_std(&returns);
    if std == 0.0 {
        return 0.0;
    }
    mean(&returns) / std * ANNUALIZATION_FACTOR.sqrt()
}

/// Annualized mean return over downside volatility.
///
/// `+inf` when no return is negative. When the negative returns have zero
/// dispersion the ratio is `±inf` by the sign of the mean return, or 0.0 if
/// the mean is exactly zero.
pub fn sortino_ratio(pnl_series: &[f64]) -> f64 {
    let returns = returns(pnl_series);
    let downside: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
    if downside.is_empty() {
        return f64::INFINITY;
    }

    let numerator = mean(&returns);
    let downside_std = population_std(&downside);
    if downside_std == 0.0 {
        return if numerator == 0.0 {
            0.0
        } else {
            numerator.signum() * f64::INFINITY
        };
    }
    numerator / downside_std * ANNUALIZATION_FACTOR.sqrt()
}

/// Largest peak-to-trough decline of the series in absolute units
pub fn max_drawdown(pnl_series: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst: f64 = 0.0;
    for &value in pnl_series {
        peak = peak.max(value);
        worst = worst.max(peak - value);
    }
    worst
}

/// Split a terminal position into (realized, unrealized) PnL.
///
/// Realized is the cash balance, unrealized the open inventory marked at
/// `current_price`.
pub fn realized_unrealized_pnl(cash: f64, inventory: i64, current_price: f64) -> (f64, f64) {
    (cash, inventory as f64 * current_price)
}

/// Summary statistics for one strategy's run
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PerformanceReport {
    pub sharpe: f64,
    /// Serialized as `null` when infinite
    pub sortino: f64,
    pub max_drawdown: f64,
    pub realized: f64,
    pub unrealized: f64,
}

impl PerformanceReport {
    /// Compute the report from a PnL series and the terminal ledger
    pub fn compute(pnl_series: &[f64], ledger: &Ledger, final_price: f64) -> Self {
        let (realized, unrealized) =
            realized_unrealized_pnl(ledger.cash(), ledger.inventory(), final_price);
        Self {
            sharpe: sharpe_ratio(pnl_series),
            sortino: sortino_ratio(pnl_series),
            max_drawdown: max_drawdown(pnl_series),
            realized,
            unrealized,
        }
    }

    pub fn total(&self) -> f64 {
        self.realized + self.unrealized
    }
}
