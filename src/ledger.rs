use serde::{Deserialize, Serialize};

use crate::types::Side;

/// Cash and inventory of one strategy.
///
/// Both fields move together inside [`Ledger::buy`] / [`Ledger::sell`];
/// there is no way to adjust one without the other. Inventory is unbounded
/// in both directions; sizes are not checked here, configuration caps them
/// at [`MAX_ORDER_SIZE`](crate::config::MAX_ORDER_SIZE).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    cash: f64,
    inventory: i64,
}

impl Ledger {
    /// Create a flat ledger
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    /// Current position (positive = long, negative = short)
    pub fn inventory(&self) -> i64 {
        self.inventory
    }

    /// Buying increases inventory, decreases cash
    pub fn buy(&mut self, price: f64, size: i64) {
        self.inventory += size;
        self.cash -= price * size as f64;
    }

    /// Selling decreases inventory, increases cash
    pub fn sell(&mut self, price: f64, size: i64) {
        self.inventory -= size;
        self.cash += price * size as f64;
    }

    /// Apply a trade in the ledger's own direction
    pub fn apply(&mut self, side: Side, price: f64, size: i64) {
        match side {
            Side::Buy => self.buy(price, size),
            Side::Sell => self.sell(price, size),
        }
    }

    /// Mark-to-market value: cash + inventory * current_price
    pub fn total_pnl(&self, current_price: f64) -> f64 {
        self.cash + self.inventory as f64 * current_price
    }

    /// Value of the open inventory at `current_price`
    pub fn inventory_value(&self, current_price: f64) -> f64 {
        self.inventory as f64 * current_price
    }
}
