//! # Vanilla Options - Analytic and Lattice Pricing
//!
//! Prices vanilla equity calls and puts two ways and reconciles them against
//! observed market prices.
//!
//! ## Overview
//!
//! - **Black-Scholes**: closed-form price, Greeks, Newton-Raphson implied
//!   volatility, probability of profit, expected return
//! - **Binomial lattice**: European and American exercise, one contract or a
//!   whole batch per call
//! - **Real-world probabilities**: profit / in-the-money odds from the
//!   lattice's terminal nodes under an assumed drift
//!
//! ## Usage
//!
//! ```rust
//! use vanilla_options::prelude::*;
//!
//! let contract = Contract::builder()
//!     .spot(100.0)
//!     .strike(vec![85.0, 90.0, 95.0])
//!     .volatility(0.2)
//!     .exercise(ExerciseStyle::American)
//!     .build()
//!     .unwrap();
//!
//! let analytic = bs_price(&contract);
//! let lattice = BinomialTree::new(200).price(&contract).unwrap();
//! assert_eq!(lattice.batch_len(), Some(3));
//! # let _ = analytic;
//! ```
//!
//! ## Conventions
//!
//! - Batched contracts return batched results in input order; scalar
//!   contracts return scalars.
//! - The closed-form formulas assume σ > 0 and τ > 0.
//! - A failed implied-volatility solve returns NaN, not an error.

pub mod config;
pub mod core;
pub mod models;
pub mod pricing;

/// Prelude with commonly used types
pub mod prelude {
    // Core types
    pub use crate::core::{
        Contract, ContractBuilder, ContractPoint, ExerciseStyle, Greeks, MarketSnapshot,
        OptionQuote, OptionType, PricingError, PricingResult, ProfitOdds, Shaped,
    };

    // Configuration
    pub use crate::config::{EngineConfig, LatticeConfig, SolverConfig};

    // Models
    pub use crate::models::{
        expected_return,
        greeks as bs_greeks,
        implied_volatility,
        norm_cdf,
        norm_pdf,

        // Black-Scholes
        price as bs_price,
        probability_of_profit as bs_probability_of_profit,

        // Lattice
        BinomialTree,
        ImpliedVolSolver,
        TerminalNode,
    };

    // Reconciliation
    pub use crate::pricing::{reconcile_chain, QuoteValuation};
}

// Re-export main types at crate root
pub use crate::core::{Contract, PricingError, PricingResult, Shaped};
pub use crate::models::BinomialTree;
