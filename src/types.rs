use serde::{Deserialize, Serialize};

/// Simulation step index in `[0, sim_duration)`
pub type Step = usize;

/// Order side (Buy or Sell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// Lowercase label used in logs and exports
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A trader order arriving during one step.
///
/// Events only live for the step that produced them and are replayed,
/// unchanged, against every strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEvent {
    pub side: Side,
}

impl OrderEvent {
    pub fn new(side: Side) -> Self {
        Self { side }
    }
}

/// Two-sided quote published by a strategy for one step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub bid: f64,
    pub ask: f64,
}

impl Quote {
    pub fn new(bid: f64, ask: f64) -> Self {
        Self { bid, ask }
    }

    /// Ask minus bid. Negative when extreme skew crosses the quote.
    pub fn spread(&self) -> f64 {
        self.ask - self.bid
    }

    pub fn mid(&self) -> f64 {
        (self.bid + self.ask) / 2.0
    }

    /// Price the strategy trades at when an incoming order of `taker_side` fills.
    ///
    /// A buy order lifts the ask, a sell order hits the bid.
    pub fn fill_price(&self, taker_side: Side) -> f64 {
        match taker_side {
            Side::Buy => self.ask,
            Side::Sell => self.bid,
        }
    }

    pub fn is_crossed(&self) -> bool {
        self.bid > self.ask
    }
}

/// Trade executed against a strategy's quote.
///
/// `side` is the strategy's own direction: `Buy` grows inventory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub step: Step,
    pub side: Side,
    pub price: f64,
}

impl Fill {
    pub fn new(step: Step, side: Side, price: f64) -> Self {
        Self { step, side, price }
    }
}
