//! Black-Scholes Model
//!
//! Provides:
//! - European option pricing
//! - Greeks computation
//! - Implied volatility solver (Newton-Raphson, NaN on non-convergence)
//! - Probability of profit / in-the-money and expected return
//!
//! Every formula assumes σ > 0 and τ > 0. Degenerate inputs are not guarded
//! and produce non-finite results.
//!
//! The formulas are the Merton form with a continuous dividend yield q: the
//! spot is carried as `S·e^{-qτ}` and d1 uses the drift `r - q`. Only this
//! form keeps put-call parity `C - P = S·e^{-qτ} - K·e^{-rτ}` and agrees with
//! the lattice (which grows at `r - q`) when q > 0. At q = 0 everything here
//! is the plain Black-Scholes formula exactly.
//!
//! The contract-level functions evaluate every row of a batched contract and
//! return a [`Shaped`] result of the same shape; the `*_point` kernels work on
//! a single scalar row.

use std::f64::consts::PI;

use statrs::distribution::{ContinuousCDF, Normal};

use crate::config::SolverConfig;
use crate::core::{Contract, ContractPoint, Greeks, OptionType, PricingResult, ProfitOdds, Shaped};

/// Standard normal CDF
pub fn norm_cdf(x: f64) -> f64 {
    Normal::standard().cdf(x)
}

/// Standard normal PDF
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// Black-Scholes d1 (d+) parameter
pub fn d1(point: &ContractPoint) -> f64 {
    let ContractPoint {
        spot,
        strike,
        volatility: vol,
        risk_free_rate: rate,
        dividend_yield: div,
        time_to_maturity: time,
        ..
    } = *point;
    ((spot / strike).ln() + (rate - div + 0.5 * vol * vol) * time) / (vol * time.sqrt())
}

/// Black-Scholes d2 (d-) parameter
pub fn d2(point: &ContractPoint) -> f64 {
    d1(point) - point.volatility * point.time_to_maturity.sqrt()
}

/// European option price for one row
pub fn price_point(point: &ContractPoint) -> f64 {
    let d1 = d1(point);
    let d2 = d2(point);
    let df = (-point.risk_free_rate * point.time_to_maturity).exp();
    let div_factor = (-point.dividend_yield * point.time_to_maturity).exp();
    let spot = point.spot * div_factor;

    match point.option_type {
        OptionType::Call => norm_cdf(d1) * spot - norm_cdf(d2) * point.strike * df,
        OptionType::Put => norm_cdf(-d2) * point.strike * df - norm_cdf(-d1) * spot,
    }
}

/// European option price
pub fn price(contract: &Contract) -> Shaped<f64> {
    contract.map_points(price_point)
}

/// Vega for one row (per unit of volatility)
pub fn vega_point(point: &ContractPoint) -> f64 {
    let div_factor = (-point.dividend_yield * point.time_to_maturity).exp();
    point.spot * div_factor * norm_pdf(d1(point)) * point.time_to_maturity.sqrt()
}

/// Greeks for one row
pub fn greeks_point(point: &ContractPoint) -> Greeks {
    let ContractPoint {
        spot,
        strike,
        volatility: vol,
        risk_free_rate: rate,
        dividend_yield: div,
        time_to_maturity: time,
        option_type,
        ..
    } = *point;

    let d1 = d1(point);
    let d2 = d2(point);
    let df = (-rate * time).exp();
    let sqrt_t = time.sqrt();
    let pdf_d1 = norm_pdf(d1);
    let div_factor = (-div * time).exp();

    // Gamma and vega are the same for call and put
    let gamma = div_factor * pdf_d1 / (spot * vol * sqrt_t);
    let vega = vega_point(point);

    let decay = -spot * div_factor * pdf_d1 * vol / (2.0 * sqrt_t);

    let (delta, theta, rho) = match option_type {
        OptionType::Call => (
            div_factor * norm_cdf(d1),
            decay - rate * strike * df * norm_cdf(d2) + div * spot * div_factor * norm_cdf(d1),
            strike * time * df * norm_cdf(d2),
        ),
        OptionType::Put => (
            div_factor * (norm_cdf(d1) - 1.0),
            decay + rate * strike * df * norm_cdf(-d2) - div * spot * div_factor * norm_cdf(-d1),
            -strike * time * df * norm_cdf(-d2),
        ),
    };

    Greeks::new(delta, gamma, vega, theta, rho)
}

/// Greeks (delta, gamma, vega, theta, rho)
pub fn greeks(contract: &Contract) -> Shaped<Greeks> {
    contract.map_points(greeks_point)
}

/// Newton-Raphson implied volatility solver.
///
/// Iterates `σ ← σ - (price(σ) - observed) / vega(σ)` and returns the new
/// iterate once a step is smaller than `tolerance`. Returns NaN when
/// `max_iterations` steps pass without converging; callers must check.
/// The candidate volatility lives in the solver, never on the contract.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpliedVolSolver {
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for ImpliedVolSolver {
    fn default() -> Self {
        SolverConfig::default().into()
    }
}

impl From<SolverConfig> for ImpliedVolSolver {
    fn from(config: SolverConfig) -> Self {
        Self {
            max_iterations: config.max_iterations,
            tolerance: config.tolerance,
        }
    }
}

impl ImpliedVolSolver {
    /// Solve a single row. The row's own volatility is ignored.
    pub fn solve_point(&self, point: &ContractPoint, initial_guess: f64, observed_price: f64) -> f64 {
        let mut sigma = initial_guess;

        for _ in 0..self.max_iterations {
            let candidate = point.with_volatility(sigma);
            let f = price_point(&candidate) - observed_price;
            let df = vega_point(&candidate);
            let sigma_new = sigma - f / df;

            if (sigma_new - sigma).abs() < self.tolerance {
                return sigma_new;
            }
            sigma = sigma_new;
        }

        tracing::debug!(
            strike = point.strike,
            observed_price,
            initial_guess,
            iterations = self.max_iterations,
            "implied volatility did not converge"
        );
        f64::NAN
    }

    /// Solve every row of `contract`; guess and observed price broadcast
    /// against the contract's batch.
    pub fn solve(
        &self,
        contract: &Contract,
        initial_guess: impl Into<Shaped<f64>>,
        observed_price: impl Into<Shaped<f64>>,
    ) -> PricingResult<Shaped<f64>> {
        let rows = contract.rows();
        let guesses = initial_guess.into().broadcast("initial_guess", rows)?;
        let observed = observed_price.into().broadcast("observed_price", rows)?;

        let vols = contract
            .points()
            .iter()
            .zip(guesses)
            .zip(observed)
            .map(|((point, guess), price)| self.solve_point(point, guess, price))
            .collect();
        contract.shape(vols)
    }
}

/// Implied volatility with the default solver (100 iterations, 1e-5)
pub fn implied_volatility(
    contract: &Contract,
    initial_guess: impl Into<Shaped<f64>>,
    observed_price: impl Into<Shaped<f64>>,
) -> PricingResult<Shaped<f64>> {
    ImpliedVolSolver::default().solve(contract, initial_guess, observed_price)
}

/// Probability of profit and of finishing in the money for one row.
///
/// Profit is judged against a breakeven strike shifted by the option's own
/// premium: `K + premium` for calls, `K - premium` for puts.
pub fn probability_of_profit_point(point: &ContractPoint) -> ProfitOdds {
    let premium = price_point(point);
    let breakeven = match point.option_type {
        OptionType::Call => point.strike + premium,
        OptionType::Put => point.strike - premium,
    };
    let d2_breakeven = d2(&ContractPoint {
        strike: breakeven,
        ..*point
    });
    let d2 = d2(point);

    match point.option_type {
        OptionType::Call => ProfitOdds::new(norm_cdf(d2_breakeven), norm_cdf(d2)),
        OptionType::Put => ProfitOdds::new(1.0 - norm_cdf(d2_breakeven), 1.0 - norm_cdf(d2)),
    }
}

/// Probability of profit and of finishing in the money
pub fn probability_of_profit(contract: &Contract) -> Shaped<ProfitOdds> {
    contract.map_points(probability_of_profit_point)
}

/// Expected return of the option given the underlying's expected return `mu`.
///
/// `r + ω(μ - r)` with leverage `ω = delta · S / price`.
pub fn expected_return_point(point: &ContractPoint, mu: f64) -> f64 {
    let omega = greeks_point(point).delta * point.spot / price_point(point);
    point.risk_free_rate + omega * (mu - point.risk_free_rate)
}

/// Expected return of the option given the underlying's expected return `mu`
pub fn expected_return(contract: &Contract, mu: f64) -> Shaped<f64> {
    contract.map_points(|point| expected_return_point(point, mu))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ExerciseStyle, PricingError};

    fn contract(option_type: OptionType) -> Contract {
        Contract::builder().option_type(option_type).build().unwrap()
    }

    fn scalar<T: Copy>(s: Shaped<T>) -> T {
        *s.as_scalar().unwrap()
    }

    #[test]
    fn test_norm_cdf() {
        assert!((norm_cdf(0.0) - 0.5).abs() < 1e-10);
        assert!((norm_cdf(1.96) - 0.975).abs() < 0.001);
        assert!((norm_cdf(-1.96) - 0.025).abs() < 0.001);
        assert!((norm_pdf(0.0) - 0.398_942_28).abs() < 1e-8);
    }

    #[test]
    fn test_bs_price() {
        // ATM call, 20% vol, 1 year, 5% rate
        let atm = Contract::builder()
            .strike(100.0)
            .risk_free_rate(0.05)
            .build()
            .unwrap();
        let call_price = scalar(price(&atm));

        // Should be around 10.45 for these parameters
        assert!(call_price > 10.0 && call_price < 11.0);

        // Reference values for the default contract (S=100, K=90)
        assert!((scalar(price(&contract(OptionType::Call))) - 14.806_507).abs() < 1e-5);
        assert!((scalar(price(&contract(OptionType::Put))) - 3.024_388).abs() < 1e-5);
    }

    #[test]
    fn test_put_call_parity_with_dividend() {
        let base = Contract::builder()
            .spot(105.0)
            .strike(100.0)
            .time_to_maturity(0.75)
            .volatility(0.3)
            .risk_free_rate(0.04)
            .dividend_yield(0.02);
        let call = scalar(price(&base.clone().build().unwrap()));
        let put = scalar(price(&base.option_type(OptionType::Put).build().unwrap()));

        let parity = 105.0 * (-0.02_f64 * 0.75).exp() - 100.0 * (-0.04_f64 * 0.75).exp();
        assert!((call - put - parity).abs() < 1e-10);
    }

    #[test]
    fn test_greeks() {
        let g = scalar(greeks(&contract(OptionType::Call)));

        assert!((g.delta - 0.766_327).abs() < 1e-5);
        assert!((g.gamma - 0.015_317).abs() < 1e-5);
        assert!((g.vega - 30.634_005).abs() < 1e-4);
        assert!((g.theta + 4.299_923).abs() < 1e-4);
        assert!((g.rho - 61.826_148).abs() < 1e-4);
    }

    #[test]
    fn test_put_greeks_sign_conventions() {
        let call = scalar(greeks(&contract(OptionType::Call)));
        let put = scalar(greeks(&contract(OptionType::Put)));

        // put delta = N(d+) - 1
        assert!((put.delta - (call.delta - 1.0)).abs() < 1e-12);
        assert_eq!(put.gamma, call.gamma);
        assert_eq!(put.vega, call.vega);
        assert!((put.theta + 2.535_566).abs() < 1e-4);
        assert!((put.rho + 26.391_733).abs() < 1e-4);
        assert!(put.rho < 0.0);
    }

    #[test]
    fn test_implied_vol() {
        let c = contract(OptionType::Call);
        let market_price = scalar(price(&c));

        let iv = scalar(implied_volatility(&c, 0.5, market_price).unwrap());
        assert!((iv - 0.2).abs() < 1e-4);

        // Solving does not touch the contract
        assert_eq!(c.volatility(), &Shaped::Scalar(0.2));
    }

    #[test]
    fn test_iv_otm_put() {
        let c = Contract::builder()
            .spot(100.0)
            .strike(90.0)
            .risk_free_rate(0.05)
            .dividend_yield(0.01)
            .volatility(0.30)
            .time_to_maturity(0.25)
            .option_type(OptionType::Put)
            .build()
            .unwrap();
        let market_price = scalar(price(&c));

        let iv = scalar(implied_volatility(&c, 0.2, market_price).unwrap());
        assert!((iv - 0.30).abs() < 1e-4);
    }

    #[test]
    fn test_iv_non_convergence_is_nan() {
        let c = contract(OptionType::Call);

        // A call can never be worth more than the spot
        let iv = scalar(implied_volatility(&c, 0.2, 150.0).unwrap());
        assert!(iv.is_nan());

        // Too few iterations to get anywhere from a poor guess
        let solver = ImpliedVolSolver {
            max_iterations: 1,
            tolerance: 1e-5,
        };
        let market_price = scalar(price(&c));
        assert!(scalar(solver.solve(&c, 0.8, market_price).unwrap()).is_nan());
    }

    #[test]
    fn test_iv_batch() {
        let c = Contract::builder()
            .strike(vec![85.0, 90.0, 95.0])
            .volatility(vec![0.15, 0.2, 0.25])
            .build()
            .unwrap();
        let observed = price(&c).into_vec();
        let flat = c.with_volatility(0.3).unwrap();

        let ivs = implied_volatility(&flat, 0.3, observed).unwrap();
        let ivs = ivs.as_batch().unwrap();
        assert!((ivs[0] - 0.15).abs() < 1e-4);
        assert!((ivs[1] - 0.20).abs() < 1e-4);
        assert!((ivs[2] - 0.25).abs() < 1e-4);

        let err = implied_volatility(&flat, 0.3, vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(err, PricingError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_probability_of_profit() {
        let call = scalar(probability_of_profit(&contract(OptionType::Call)));
        assert!((call.probability_of_profit - 0.407_210).abs() < 1e-5);
        assert!((call.probability_itm - 0.700_835).abs() < 1e-5);
        assert!(call.probability_of_profit < call.probability_itm);

        let put = scalar(probability_of_profit(&contract(OptionType::Put)));
        assert!((put.probability_of_profit - 0.242_679).abs() < 1e-5);
        assert!((put.probability_itm - 0.299_165).abs() < 1e-5);
    }

    #[test]
    fn test_expected_return() {
        let c = contract(OptionType::Call);

        // No risk premium on the underlying, none on the option
        assert!((scalar(expected_return(&c, 0.02)) - 0.02).abs() < 1e-12);

        // Leverage amplifies the premium
        let er = scalar(expected_return(&c, 0.08));
        assert!((er - 0.330_536).abs() < 1e-5);
        assert!(er > 0.08);

        // Puts have negative leverage
        let put = contract(OptionType::Put);
        assert!(scalar(expected_return(&put, 0.08)) < 0.02);
    }

    #[test]
    fn test_batch_matches_scalar() {
        let batch = Contract::builder()
            .strike(vec![85.0, 90.0, 95.0])
            .exercise(ExerciseStyle::European)
            .build()
            .unwrap();
        let prices = price(&batch);
        let prices = prices.as_batch().unwrap();

        for (i, strike) in [85.0, 90.0, 95.0].into_iter().enumerate() {
            let single = Contract::builder().strike(strike).build().unwrap();
            assert_eq!(prices[i], scalar(price(&single)));
        }
    }
}
