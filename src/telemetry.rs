use std::time::{Duration, Instant};
use serde::{Deserialize, Serialize};
use metrics::{counter, histogram};

use crate::types::Side;

/// Run counters for the simulation driver.
///
/// Values are kept locally for the run summary and mirrored to the
/// `metrics` facade, which is a no-op unless the host installs a recorder.
#[derive(Debug, Clone)]
pub struct SimCounters {
    steps: u64,
    order_events: u64,
    buy_fills: u64,
    sell_fills: u64,
    last_step_ns: u64,
    start_time: Instant,
}

impl Default for SimCounters {
    fn default() -> Self {
        Self::new()
    }
}

impl SimCounters {
    pub fn new() -> Self {
        Self {
            steps: 0,
            order_events: 0,
            buy_fills: 0,
            sell_fills: 0,
            last_step_ns: 0,
            start_time: Instant::now(),
        }
    }

    /// Record one completed driver step
    pub fn record_step(&mut self, duration: Duration, events: usize) {
        let duration_ns = duration.as_nanos() as u64;

        self.steps += 1;
        self.order_events += events as u64;
        self.last_step_ns = duration_ns;

        counter!("mmsim_steps_total", 1);
        counter!("mmsim_order_events_total", events as u64);
        histogram!("mmsim_step_duration_ns", duration_ns as f64);
    }

    /// Record a fill for `strategy` in the strategy's own direction
    pub fn record_fill(&mut self, strategy: &str, side: Side) {
        match side {
            Side::Buy => self.buy_fills += 1,
            Side::Sell => self.sell_fills += 1,
        }
        counter!(
            "mmsim_fills_total",
            1,
            "strategy" => strategy.to_string(),
            "side" => side.as_str()
        );
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        let steps_per_second = if elapsed > 0.0 {
            self.steps as f64 / elapsed
        } else {
            0.0
        };

        CounterSnapshot {
            steps: self.steps,
            order_events: self.order_events,
            buy_fills: self.buy_fills,
            sell_fills: self.sell_fills,
            last_step_ns: self.last_step_ns,
            steps_per_second,
        }
    }
}

/// Point-in-time copy of [`SimCounters`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterSnapshot {
    pub steps: u64,
    pub order_events: u64,
    pub buy_fills: u64,
    pub sell_fills: u64,
    pub last_step_ns: u64,
    pub steps_per_second: f64,
}

impl CounterSnapshot {
    pub fn total_fills(&self) -> u64 {
        self.buy_fills + self.sell_fills
    }

    /// Fills per order event, summed over all strategies
    pub fn fill_ratio(&self) -> f64 {
        if self.order_events == 0 {
            0.0
        } else {
            self.total_fills() as f64 / self.order_events as f64
        }
    }

    pub fn mean_events_per_step(&self) -> f64 {
        if self.steps == 0 {
            0.0
        } else {
            self.order_events as f64 / self.steps as f64
        }
    }
}
