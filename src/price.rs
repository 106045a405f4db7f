//! Fair-price process: a Gaussian random walk and the path it leaves behind.

use rand::distributions::Distribution;
use rand::Rng;
use serde::{Deserialize, Serialize};
use statrs::distribution::Normal;

use crate::error::SimResult;
use crate::performance::sample_std;
use crate::types::Step;

/// Gaussian random-walk generator for the fair price.
///
/// Every call to [`PriceProcess::step`] consumes exactly one draw from the
/// supplied generator, so a fixed seed reproduces the same path.
#[derive(Debug, Clone)]
pub struct PriceProcess {
    standard_normal: Normal,
}

impl PriceProcess {
    pub fn new() -> SimResult<Self> {
        Ok(Self {
            standard_normal: Normal::new(0.0, 1.0)?,
        })
    }

    /// Advance `previous` by one N(0, volatility²) increment.
    ///
    /// The result is unbounded; negative prices are valid outputs.
    pub fn step<R: Rng>(&self, rng: &mut R, previous: f64, volatility: f64) -> f64 {
        let z: f64 = self.standard_normal.sample(rng);
        previous + volatility * z
    }
}

/// Append-only sequence of fair prices.
///
/// Index 0 is the starting price; index `t + 1` is the price after step `t`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePath {
    prices: Vec<f64>,
}

impl PricePath {
    pub fn new(start: f64) -> Self {
        Self {
            prices: vec![start],
        }
    }

    pub fn with_capacity(start: f64, steps: usize) -> Self {
        let mut prices = Vec::with_capacity(steps + 1);
        prices.push(start);
        Self { prices }
    }

    pub(crate) fn push(&mut self, price: f64) {
        self.prices.push(price);
    }

    pub fn start(&self) -> f64 {
        self.prices[0]
    }

    /// Latest fair price
    pub fn last(&self) -> f64 {
        self.prices[self.prices.len() - 1]
    }

    /// Fair price in effect after `step` was applied
    pub fn after_step(&self, step: Step) -> Option<f64> {
        self.prices.get(step + 1).copied()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.prices.get(index).copied()
    }

    /// Number of stored prices, including the start price
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// Always false: the start price is present from construction
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.prices
    }

    /// Step-to-step price changes
    pub fn increments(&self) -> Vec<f64> {
        self.prices.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// Sample standard deviation of the last `window` price increments.
    ///
    /// Uses at most `window + 1` trailing prices. Returns 0.0 while fewer
    /// than two increments are available.
    pub fn rolling_volatility(&self, window: usize) -> f64 {
        let start = self.prices.len().saturating_sub(window + 1);
        let increments: Vec<f64> = self.prices[start..]
            .windows(2)
            .map(|w| w[1] - w[0])
            .collect();
        sample_std(&increments)
    }
}
