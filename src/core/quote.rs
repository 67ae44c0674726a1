//! Option quote data
//!
//! Market inputs handed over by the market-data provider: the underlying
//! snapshot and per-strike option quotes for one expiry.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Days per year used to turn calendar days into a time to maturity
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Underlying snapshot for one pricing request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Last close of the underlying
    pub spot: f64,
    /// Trailing (historical) annualized volatility
    pub volatility: f64,
    /// Risk-free rate
    pub risk_free_rate: f64,
    /// Dividend yield
    pub dividend_yield: f64,
}

/// Option market quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionQuote {
    /// Expiration date
    pub expiry: NaiveDate,
    /// Strike price
    pub strike: f64,
    /// Bid price
    pub bid: f64,
    /// Ask price
    pub ask: f64,
    /// Last traded price
    pub last_price: f64,
    /// Trading volume
    pub volume: Option<u64>,
    /// Implied volatility reported by the provider
    pub implied_volatility: Option<f64>,
}

impl OptionQuote {
    pub fn new(expiry: NaiveDate, strike: f64, bid: f64, ask: f64) -> Self {
        Self {
            expiry,
            strike,
            bid,
            ask,
            last_price: (bid + ask) / 2.0,
            volume: None,
            implied_volatility: None,
        }
    }

    /// Market mid price
    pub fn mid(&self) -> f64 {
        (self.bid + self.ask).abs() / 2.0
    }

    /// Bid-ask spread
    pub fn spread(&self) -> f64 {
        self.ask - self.bid
    }

    /// Calendar days to expiry, counting the expiry day itself
    pub fn days_to_maturity(&self, as_of: NaiveDate) -> i64 {
        (self.expiry - as_of).num_days() + 1
    }

    /// Time to maturity in years
    pub fn time_to_maturity(&self, as_of: NaiveDate) -> f64 {
        self.days_to_maturity(as_of) as f64 / DAYS_PER_YEAR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mid_and_spread() {
        let expiry = NaiveDate::from_ymd_opt(2025, 6, 20).unwrap();
        let quote = OptionQuote::new(expiry, 500.0, 10.0, 10.5);

        assert!((quote.mid() - 10.25).abs() < 1e-12);
        assert!((quote.spread() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_time_to_maturity() {
        let expiry = NaiveDate::from_ymd_opt(2025, 6, 20).unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 6, 19).unwrap();
        let quote = OptionQuote::new(expiry, 100.0, 1.0, 1.2);

        assert_eq!(quote.days_to_maturity(today), 2);
        assert!((quote.time_to_maturity(today) - 2.0 / 365.0).abs() < 1e-12);

        // Expired quotes come out non-positive
        let later = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        assert!(quote.time_to_maturity(later) <= 0.0);
    }
}
