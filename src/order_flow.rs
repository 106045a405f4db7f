//! Random trader order flow.

use rand::distributions::Distribution;
use rand::Rng;
use statrs::distribution::Poisson;

use crate::error::SimResult;
use crate::types::{OrderEvent, Side};

/// Poisson order-arrival generator.
///
/// Draw order per call: the event count first, then one side coin per
/// event. A zero arrival rate yields no events and draws nothing.
#[derive(Debug, Clone)]
pub struct OrderFlowGenerator {
    lambda: f64,
    arrivals: Option<Poisson>,
}

impl OrderFlowGenerator {
    /// Create a generator with mean `lambda` orders per step
    pub fn new(lambda: f64) -> SimResult<Self> {
        let arrivals = if lambda == 0.0 {
            None
        } else {
            Some(Poisson::new(lambda)?)
        };
        Ok(Self { lambda, arrivals })
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// Produce this step's order events
    pub fn generate<R: Rng>(&self, rng: &mut R) -> Vec<OrderEvent> {
        let Some(arrivals) = &self.arrivals else {
            return Vec::new();
        };

        let count = arrivals.sample(rng) as usize;
        (0..count)
            .map(|_| {
                let side = if rng.gen::<bool>() { Side::Buy } else { Side::Sell };
                OrderEvent::new(side)
            })
            .collect()
    }
}

/// Count buy and sell events in a batch
pub fn side_counts(events: &[OrderEvent]) -> (usize, usize) {
    events.iter().fold((0, 0), |(buys, sells), event| match event.side {
        Side::Buy => (buys + 1, sells),
        Side::Sell => (buys, sells + 1),
    })
}
