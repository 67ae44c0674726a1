//! Quote reconciliation
//!
//! Prices one expiry's worth of observed option quotes with both models,
//! once under the trailing historical volatility and once under the
//! provider's implied volatility, and backs out the volatility implied by
//! each quote's mid price. Each batch goes through the lattice in a single
//! batched call.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::core::{
    Contract, ExerciseStyle, MarketSnapshot, OptionQuote, OptionType, PricingResult,
};
use crate::models::{black_scholes, BinomialTree, ImpliedVolSolver};

/// Model prices next to the market price of one quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteValuation {
    pub expiry: NaiveDate,
    pub strike: f64,
    /// Calendar days to expiry, expiry day included
    pub days_to_maturity: i64,
    /// Market mid price
    pub market: f64,
    /// Black-Scholes price at the historical volatility
    pub analytic_historical: f64,
    /// Black-Scholes price at the quoted implied volatility
    pub analytic_implied: f64,
    /// Lattice price at the historical volatility
    pub lattice_historical: f64,
    /// Lattice price at the quoted implied volatility
    pub lattice_implied: f64,
    /// Volatility that reproduces the mid price, NaN if the solver failed
    pub solved_volatility: f64,
}

impl QuoteValuation {
    /// Market price minus the historical-volatility Black-Scholes price
    pub fn analytic_mispricing(&self) -> f64 {
        self.market - self.analytic_historical
    }
}

/// Price every live quote of one option type.
///
/// Quotes at or past expiry as of `as_of` are skipped. A quote without a
/// provider implied volatility is priced at the historical volatility in
/// the implied columns.
pub fn reconcile_chain(
    snapshot: &MarketSnapshot,
    quotes: &[OptionQuote],
    option_type: OptionType,
    exercise: ExerciseStyle,
    as_of: NaiveDate,
    config: &EngineConfig,
) -> PricingResult<Vec<QuoteValuation>> {
    config.validate()?;

    let live: Vec<&OptionQuote> = quotes
        .iter()
        .filter(|quote| {
            let live = quote.time_to_maturity(as_of) > 0.0;
            if !live {
                tracing::warn!(
                    expiry = %quote.expiry,
                    strike = quote.strike,
                    "skipping expired quote"
                );
            }
            live
        })
        .collect();

    if live.is_empty() {
        return Ok(Vec::new());
    }

    let historical = Contract::builder()
        .time_to_maturity(live.iter().map(|q| q.time_to_maturity(as_of)).collect::<Vec<_>>())
        .spot(snapshot.spot)
        .strike(live.iter().map(|q| q.strike).collect::<Vec<_>>())
        .volatility(snapshot.volatility)
        .risk_free_rate(snapshot.risk_free_rate)
        .dividend_yield(snapshot.dividend_yield)
        .option_type(option_type)
        .exercise(exercise)
        .build()?;

    let quoted_vols: Vec<f64> = live
        .iter()
        .map(|q| {
            q.implied_volatility
                .filter(|v| *v > 0.0)
                .unwrap_or(snapshot.volatility)
        })
        .collect();
    let implied = historical.with_volatility(quoted_vols)?;

    let tree = BinomialTree::from(config.lattice);
    let solver = ImpliedVolSolver::from(config.solver);
    let mids: Vec<f64> = live.iter().map(|q| q.mid()).collect();

    let analytic_historical = black_scholes::price(&historical).into_vec();
    let analytic_implied = black_scholes::price(&implied).into_vec();
    let lattice_historical = tree.price(&historical)?.into_vec();
    let lattice_implied = tree.price(&implied)?.into_vec();
    let solved = solver
        .solve(&historical, snapshot.volatility, mids.clone())?
        .into_vec();

    let valuations: Vec<QuoteValuation> = live
        .iter()
        .enumerate()
        .map(|(i, quote)| QuoteValuation {
            expiry: quote.expiry,
            strike: quote.strike,
            days_to_maturity: quote.days_to_maturity(as_of),
            market: mids[i],
            analytic_historical: analytic_historical[i],
            analytic_implied: analytic_implied[i],
            lattice_historical: lattice_historical[i],
            lattice_implied: lattice_implied[i],
            solved_volatility: solved[i],
        })
        .collect();

    let unsolved = valuations
        .iter()
        .filter(|v| v.solved_volatility.is_nan())
        .count();
    tracing::info!(
        quotes = quotes.len(),
        priced = valuations.len(),
        unsolved,
        %option_type,
        "reconciled option chain"
    );

    Ok(valuations)
}
