//! Core data types for the pricing engine
//!
//! Defines fundamental types:
//! - Shaped: scalar-or-batch values
//! - Contract: validated option contract (scalar or batched)
//! - Greeks: option sensitivities
//! - ProfitOdds: probability of profit / in the money
//! - OptionQuote / MarketSnapshot: observed market inputs

pub mod error;
pub mod greeks;
pub mod odds;
pub mod option;
pub mod quote;
pub mod shaped;

pub use error::*;
pub use greeks::*;
pub use odds::*;
pub use option::*;
pub use quote::*;
pub use shaped::*;
