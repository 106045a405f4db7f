use serde::{Deserialize, Serialize};

use crate::types::Quote;

/// Weight of the volatility estimate added to the spread of adaptive strategies
pub const VOLATILITY_SPREAD_WEIGHT: f64 = 0.5;

/// Market-making quoting policy.
///
/// Immutable once built; one instance per strategy under comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteStrategy {
    /// Display name, unique within a run
    pub name: String,
    /// Spread quoted around the fair price before any volatility widening
    pub base_spread: f64,
    /// Quote shift per unit of inventory
    pub skew_factor: f64,
    /// Widen the spread by half the rolling volatility estimate
    pub volatility_aware: bool,
}

impl QuoteStrategy {
    pub fn new<S: Into<String>>(name: S, base_spread: f64, skew_factor: f64) -> Self {
        Self {
            name: name.into(),
            base_spread,
            skew_factor,
            volatility_aware: false,
        }
    }

    /// Enable volatility-adaptive spread
    pub fn volatility_aware(mut self) -> Self {
        self.volatility_aware = true;
        self
    }

    /// Quote shift for the given inventory
    pub fn skew(&self, inventory: i64) -> f64 {
        self.skew_factor * inventory as f64
    }

    /// Spread after volatility widening
    pub fn effective_spread(&self, volatility_estimate: f64) -> f64 {
        if self.volatility_aware {
            self.base_spread + VOLATILITY_SPREAD_WEIGHT * volatility_estimate
        } else {
            self.base_spread
        }
    }

    /// Compute bid/ask around `fair_price`.
    ///
    /// Both sides move by `skew_factor * inventory`. Nothing stops a large
    /// skew from producing a crossed quote (bid above ask).
    pub fn quote(&self, fair_price: f64, inventory: i64, volatility_estimate: f64) -> Quote {
        let skew = self.skew(inventory);
        let half_spread = self.effective_spread(volatility_estimate) / 2.0;

        let bid = fair_price - half_spread + skew;
        let ask = fair_price + half_spread + skew;
        Quote::new(bid, ask)
    }
}
