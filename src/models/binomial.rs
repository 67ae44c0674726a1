//! Binomial Lattice Model
//!
//! Recombining Cox-Ross-Rubinstein tree priced by backward induction, with
//! an early-exercise comparison at every node for American options.
//!
//! A batched contract of M rows is priced in one pass: per-contract
//! parameters are `(M, 1)` columns, tree-step indices a `(1, n+1)` row, and
//! node values an `(M, n+1)` matrix that shrinks by one column per level.
//!
//! Per step:
//! - dt = τ/n
//! - u = exp(σ√dt), d = 1/u
//! - p = (exp((r - q)dt) - d) / (u - d)
//!
//! The lattice is only well formed for 0 < p < 1. Parameters outside that
//! range (or σ = 0, τ = 0) are not rejected; the result degrades to
//! deterministic but meaningless numbers.

use ndarray::{s, Array2, Zip};

use crate::config::LatticeConfig;
use crate::core::{Contract, ExerciseStyle, OptionType, PricingError, PricingResult, Shaped};

/// Binomial tree pricer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinomialTree {
    /// Number of tree levels (time steps), at least 1
    pub levels: usize,
}

impl Default for BinomialTree {
    fn default() -> Self {
        LatticeConfig::default().into()
    }
}

impl From<LatticeConfig> for BinomialTree {
    fn from(config: LatticeConfig) -> Self {
        Self {
            levels: config.levels,
        }
    }
}

/// Per-contract tree parameters, each an `(M, 1)` column
#[derive(Debug, Clone)]
pub(crate) struct LatticeParams {
    pub levels: usize,
    pub spot: Array2<f64>,
    pub strike: Array2<f64>,
    pub tau: Array2<f64>,
    pub rate: Array2<f64>,
    pub dt: Array2<f64>,
    pub up: Array2<f64>,
    pub down: Array2<f64>,
    pub prob: Array2<f64>,
    pub discount: Array2<f64>,
}

impl LatticeParams {
    pub fn new(contract: &Contract, levels: usize) -> Self {
        let rows = contract.rows();
        let column = |field: &Shaped<f64>| {
            Array2::from_shape_fn((rows, 1), |(row, _)| {
                field.at(row).copied().unwrap_or(f64::NAN)
            })
        };

        let spot = column(contract.spot());
        let strike = column(contract.strike());
        let tau = column(contract.time_to_maturity());
        let sigma = column(contract.volatility());
        let rate = column(contract.risk_free_rate());
        let div = column(contract.dividend_yield());

        let dt = tau.mapv(|t| t / levels as f64);
        let up = (&sigma * &dt.mapv(f64::sqrt)).mapv(f64::exp);
        let down = up.mapv(|u| 1.0 / u);
        let growth = ((&rate - &div) * &dt).mapv(f64::exp);
        let prob = (&growth - &down) / (&up - &down);
        let discount = (&rate * &dt).mapv(|x| (-x).exp());

        Self {
            levels,
            spot,
            strike,
            tau,
            rate,
            dt,
            up,
            down,
            prob,
            discount,
        }
    }

    pub fn rows(&self) -> usize {
        self.spot.nrows()
    }

    /// Asset prices at `level`: node j (j down-moves) holds S·u^(level-j)·d^j.
    /// Shape `(M, level + 1)`.
    pub fn asset_prices(&self, level: usize) -> Array2<f64> {
        let steps = Array2::from_shape_fn((1, level + 1), |(_, j)| j as f64);
        let mut prices = Array2::zeros((self.rows(), level + 1));
        Zip::from(&mut prices)
            .and_broadcast(&self.spot)
            .and_broadcast(&self.up)
            .and_broadcast(&self.down)
            .and_broadcast(&steps)
            .for_each(|price, &spot, &u, &d, &j| {
                *price = spot * u.powf(level as f64 - j) * d.powf(j);
            });
        prices
    }

    /// Exercise value of every node in `assets`
    pub fn payoff(&self, assets: &Array2<f64>, option_type: OptionType) -> Array2<f64> {
        let mut payoff = Array2::zeros(assets.raw_dim());
        Zip::from(&mut payoff)
            .and(assets)
            .and_broadcast(&self.strike)
            .for_each(|value, &spot, &strike| *value = option_type.intrinsic(spot, strike));
        payoff
    }
}

impl BinomialTree {
    pub fn new(levels: usize) -> Self {
        Self { levels }
    }

    fn check_levels(&self) -> PricingResult<()> {
        if self.levels == 0 {
            return Err(PricingError::invalid_input(
                "binomial tree needs at least 1 level",
            ));
        }
        Ok(())
    }

    /// Root values for every row of `contract`, in batch order, together
    /// with the tree parameters they were priced on
    pub(crate) fn price_rows(
        &self,
        contract: &Contract,
    ) -> PricingResult<(LatticeParams, Vec<f64>)> {
        self.check_levels()?;
        let params = LatticeParams::new(contract, self.levels);
        let option_type = contract.option_type();
        let early_exercise = contract.exercise() == ExerciseStyle::American;

        tracing::debug!(
            rows = params.rows(),
            levels = self.levels,
            %option_type,
            exercise = %contract.exercise(),
            "pricing binomial lattice"
        );

        let mut values = params.payoff(&params.asset_prices(self.levels), option_type);

        for level in (0..self.levels).rev() {
            let mut continuation = Array2::zeros((params.rows(), level + 1));
            Zip::from(&mut continuation)
                .and(values.slice(s![.., ..=level]))
                .and(values.slice(s![.., 1..]))
                .and_broadcast(&params.prob)
                .and_broadcast(&params.discount)
                .for_each(|value, &up, &down, &p, &disc| {
                    *value = disc * (p * up + (1.0 - p) * down);
                });

            if early_exercise {
                // Rebuild this level's asset row rather than storing the lattice
                let exercise = params.payoff(&params.asset_prices(level), option_type);
                continuation.zip_mut_with(&exercise, |value, &intrinsic| {
                    *value = value.max(intrinsic);
                });
            }

            values = continuation;
        }

        let prices = values.column(0).to_vec();
        Ok((params, prices))
    }

    /// Option price. A scalar contract yields a scalar, a batch of M
    /// contracts a batch of M prices in the same order.
    pub fn price(&self, contract: &Contract) -> PricingResult<Shaped<f64>> {
        let (_, prices) = self.price_rows(contract)?;
        contract.shape(prices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(s: Shaped<f64>) -> f64 {
        *s.as_scalar().unwrap()
    }

    #[test]
    fn test_single_step_by_hand() {
        let c = Contract::builder().strike(100.0).build().unwrap();
        let value = scalar(BinomialTree::new(1).price(&c).unwrap());

        let u = 0.2_f64.exp();
        let d = 1.0 / u;
        let p = (0.02_f64.exp() - d) / (u - d);
        let expected = (-0.02_f64).exp() * (p * (100.0 * u - 100.0) + (1.0 - p) * 0.0);

        assert!((value - expected).abs() < 1e-12);
        assert!((value - 10.858_188).abs() < 1e-5);
    }

    #[test]
    fn test_default_levels() {
        let c = Contract::builder().build().unwrap();
        let value = scalar(BinomialTree::default().price(&c).unwrap());
        assert!((value - 14.818_876).abs() < 1e-5);
    }

    #[test]
    fn test_converges_to_analytic() {
        let c = Contract::builder().build().unwrap();
        let value = scalar(BinomialTree::new(500).price(&c).unwrap());
        assert!((value - 14.806_507).abs() < 0.05);
    }

    #[test]
    fn test_american_put_early_exercise() {
        let put = Contract::builder()
            .strike(100.0)
            .risk_free_rate(0.05)
            .option_type(OptionType::Put);
        let european = scalar(
            BinomialTree::default()
                .price(&put.clone().build().unwrap())
                .unwrap(),
        );
        let american = scalar(
            BinomialTree::default()
                .price(&put.exercise(ExerciseStyle::American).build().unwrap())
                .unwrap(),
        );

        assert!((european - 5.553_554).abs() < 1e-5);
        assert!((american - 6.082_354).abs() < 1e-5);
    }

    #[test]
    fn test_american_call_without_dividend_matches_european() {
        let call = Contract::builder();
        let european = scalar(
            BinomialTree::default()
                .price(&call.clone().build().unwrap())
                .unwrap(),
        );
        let american = scalar(
            BinomialTree::default()
                .price(&call.exercise(ExerciseStyle::American).build().unwrap())
                .unwrap(),
        );
        assert!((american - european).abs() < 1e-10);
    }

    #[test]
    fn test_batch_matches_scalar_calls() {
        let batch = Contract::builder()
            .strike(vec![85.0, 90.0, 95.0])
            .build()
            .unwrap();
        let tree = BinomialTree::default();
        let prices = tree.price(&batch).unwrap();
        let prices = prices.as_batch().unwrap();

        assert_eq!(prices.len(), 3);
        for (i, strike) in [85.0, 90.0, 95.0].into_iter().enumerate() {
            let single = Contract::builder().strike(strike).build().unwrap();
            let expected = scalar(tree.price(&single).unwrap());
            assert!((prices[i] - expected).abs() < 1e-12);
        }
        assert!((prices[0] - 18.460_355).abs() < 1e-5);
        assert!((prices[2] - 11.624_314).abs() < 1e-5);
    }

    #[test]
    fn test_batch_of_one_stays_batch() {
        let c = Contract::builder().spot(vec![100.0]).build().unwrap();
        let prices = BinomialTree::new(10).price(&c).unwrap();
        assert_eq!(prices.batch_len(), Some(1));
    }

    #[test]
    fn test_zero_levels_rejected() {
        let c = Contract::builder().build().unwrap();
        assert!(matches!(
            BinomialTree::new(0).price(&c),
            Err(PricingError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_zero_volatility_does_not_panic() {
        let c = Contract::builder().volatility(0.0).build().unwrap();
        let value = BinomialTree::new(10).price(&c).unwrap();
        assert!(value.is_scalar());
    }

    #[test]
    fn test_asset_prices_recombine() {
        let c = Contract::builder().build().unwrap();
        let params = LatticeParams::new(&c, 4);
        let assets = params.asset_prices(2);

        assert_eq!(assets.dim(), (1, 3));
        // Middle node of an even level sits at the spot
        assert!((assets[[0, 1]] - 100.0).abs() < 1e-10);
        assert!(assets[[0, 0]] > assets[[0, 1]] && assets[[0, 1]] > assets[[0, 2]]);
    }
}
