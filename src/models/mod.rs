//! Pricing Models
//!
//! Implements:
//! - Black-Scholes (closed-form price, Greeks, implied volatility, profit odds)
//! - Binomial lattice (European/American, scalar and batched)
//! - Real-world probabilities on the lattice's terminal nodes

pub mod binomial;
pub mod black_scholes;
pub mod probability;

pub use binomial::BinomialTree;
pub use black_scholes::{
    expected_return, greeks, implied_volatility, norm_cdf, norm_pdf, price, probability_of_profit,
    ImpliedVolSolver,
};
pub use probability::TerminalNode;
