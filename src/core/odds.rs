//! Profit statistics

use serde::{Deserialize, Serialize};

/// Probability of finishing with a profit and of finishing in the money
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfitOdds {
    pub probability_of_profit: f64,
    pub probability_itm: f64,
}

impl ProfitOdds {
    pub fn new(probability_of_profit: f64, probability_itm: f64) -> Self {
        Self {
            probability_of_profit,
            probability_itm,
        }
    }

    /// As a `(pop, itm)` tuple
    pub fn as_tuple(&self) -> (f64, f64) {
        (self.probability_of_profit, self.probability_itm)
    }
}
