//! Vanilla Options CLI
//!
//! Prices one contract (or batch) with both models.
//!
//! Usage: `vanilla-cli [contract.json] [config.json]`
//!
//! Without arguments the default contract is priced (τ=1, S=100, K=90,
//! σ=0.2, r=0.02, European call). Set `RUST_LOG=debug` for solver and
//! lattice diagnostics.

use std::fs;
use std::process::ExitCode;

use vanilla_options::prelude::*;

/// Drift assumed for the real-world probability estimates
const ASSET_EXPECTED_RETURN: f64 = 0.08;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> PricingResult<()> {
    let mut args = std::env::args().skip(1);

    let contract = match args.next() {
        Some(path) => serde_json::from_str::<Contract>(&fs::read_to_string(path)?)?,
        None => Contract::builder().build()?,
    };
    let config = match args.next() {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };

    println!("Vanilla Options Pricing");
    println!("=======================\n");

    for (row, point) in contract.points().iter().enumerate() {
        println!("Contract #{row}:");
        println!("  Type: {} ({})", point.option_type, point.exercise);
        println!("  Spot: ${:.2}", point.spot);
        println!("  Strike: ${:.2}", point.strike);
        println!("  Time: {:.0} days", point.time_to_maturity * 365.0);
        println!("  Rate: {:.2}%", point.risk_free_rate * 100.0);
        println!("  Div: {:.2}%", point.dividend_yield * 100.0);
        println!("  Vol: {:.1}%", point.volatility * 100.0);
    }

    let tree = BinomialTree::from(config.lattice);
    let analytic = bs_price(&contract).into_vec();
    let lattice = tree.price(&contract)?.into_vec();
    let greeks = bs_greeks(&contract).into_vec();
    let analytic_odds = bs_probability_of_profit(&contract).into_vec();
    let lattice_odds = tree
        .probability_of_profit(&contract, ASSET_EXPECTED_RETURN)?
        .into_vec();
    let expected = expected_return(&contract, ASSET_EXPECTED_RETURN).into_vec();

    // Round-trip the analytic price through the solver
    let solver = ImpliedVolSolver::from(config.solver);
    let recovered = solver.solve(&contract, 0.5, analytic.clone())?.into_vec();

    for row in 0..contract.rows() {
        println!("\nContract #{row} results:");
        println!("  Black-Scholes: ${:.4}", analytic[row]);
        println!("  Binomial ({} levels): ${:.4}", tree.levels, lattice[row]);

        let g = &greeks[row];
        println!("  Delta: {:.4}", g.delta);
        println!("  Gamma: {:.6}", g.gamma);
        println!("  Vega: {:.4}", g.vega);
        println!("  Theta: {:.4}", g.theta);
        println!("  Rho: {:.4}", g.rho);

        let (pop, itm) = analytic_odds[row].as_tuple();
        println!("  Analytic POP / ITM: {:.1}% / {:.1}%", pop * 100.0, itm * 100.0);
        let (pop, itm) = lattice_odds[row].as_tuple();
        println!(
            "  Lattice POP / ITM (μ={:.0}%): {:.1}% / {:.1}%",
            ASSET_EXPECTED_RETURN * 100.0,
            pop * 100.0,
            itm * 100.0
        );
        println!(
            "  Expected return (μ={:.0}%): {:.2}%",
            ASSET_EXPECTED_RETURN * 100.0,
            expected[row] * 100.0
        );

        if recovered[row].is_nan() {
            println!("  IV solve failed to converge");
        } else {
            println!("  Recovered IV: {:.2}%", recovered[row] * 100.0);
        }
    }

    println!("\n--- Done ---");
    Ok(())
}
