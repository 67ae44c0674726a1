//! Real-world probabilities on the binomial lattice
//!
//! Re-weights the terminal nodes of the risk-neutral tree with a real-world
//! up-probability `p_real = (exp(μ·dt) - d) / (u - d)` (same u, d as the
//! pricing lattice), then sums Binomial(n, p_real) mass over the nodes that
//! finish profitable or in the money.
//!
//! A node is profitable when its payoff exceeds the premium compounded to
//! maturity, `price · exp(rτ)`. It is in the money when the terminal spot is
//! strictly beyond the strike.

use serde::{Deserialize, Serialize};
use statrs::distribution::{Binomial, Discrete};

use super::binomial::{BinomialTree, LatticeParams};
use crate::core::{Contract, OptionType, PricingResult, ProfitOdds, Shaped};

/// One terminal node of the lattice under the real-world measure
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerminalNode {
    /// Number of down-moves to reach this node
    pub down_moves: usize,
    /// Underlying price at maturity
    pub spot: f64,
    /// Option payoff at maturity
    pub payoff: f64,
    /// Real-world probability of ending here
    pub probability: f64,
    /// Payoff exceeds the compounded premium
    pub profitable: bool,
    /// Finishes strictly in the money
    pub in_the_money: bool,
}

impl BinomialTree {
    /// Terminal distribution of every row under real-world drift `mu`
    pub fn terminal_distribution(
        &self,
        contract: &Contract,
        mu: f64,
    ) -> PricingResult<Shaped<Vec<TerminalNode>>> {
        let (params, prices) = self.price_rows(contract)?;
        let option_type = contract.option_type();

        let nodes = prices
            .iter()
            .enumerate()
            .map(|(row, &price)| row_distribution(&params, row, price, mu, option_type))
            .collect();
        contract.shape(nodes)
    }

    /// Probability of profit and of finishing in the money under real-world
    /// drift `mu`
    pub fn probability_of_profit(
        &self,
        contract: &Contract,
        mu: f64,
    ) -> PricingResult<Shaped<ProfitOdds>> {
        Ok(self
            .terminal_distribution(contract, mu)?
            .map(|nodes| odds(&nodes)))
    }
}

/// Sum node probabilities over the profitable and in-the-money subsets.
///
/// A distribution with any undefined node mass yields NaN for both odds,
/// even when a subset is empty.
pub fn odds(nodes: &[TerminalNode]) -> ProfitOdds {
    if nodes.iter().any(|n| n.probability.is_nan()) {
        return ProfitOdds::new(f64::NAN, f64::NAN);
    }
    // An empty f64 sum is -0.0
    let mass = |pred: fn(&TerminalNode) -> bool| -> f64 {
        nodes.iter().filter(|n| pred(n)).map(|n| n.probability).sum::<f64>() + 0.0
    };
    ProfitOdds::new(mass(|n| n.profitable), mass(|n| n.in_the_money))
}

fn row_distribution(
    params: &LatticeParams,
    row: usize,
    price: f64,
    mu: f64,
    option_type: OptionType,
) -> Vec<TerminalNode> {
    let n = params.levels;
    let up = params.up[[row, 0]];
    let down = params.down[[row, 0]];
    let dt = params.dt[[row, 0]];
    let strike = params.strike[[row, 0]];
    let hurdle = price * (params.rate[[row, 0]] * params.tau[[row, 0]]).exp();

    let p_real = ((mu * dt).exp() - down) / (up - down);
    let binomial = match Binomial::new(p_real, n as u64) {
        Ok(binomial) => Some(binomial),
        Err(err) => {
            tracing::warn!(
                row,
                p_real,
                mu,
                error = %err,
                "real-world probability outside [0, 1], node masses undefined"
            );
            None
        }
    };

    let spot = params.spot[[row, 0]];
    (0..=n)
        .map(|j| {
            let terminal = spot * up.powf((n - j) as f64) * down.powf(j as f64);
            let payoff = option_type.intrinsic(terminal, strike);
            // j down-moves means n - j up-moves
            let probability = binomial
                .as_ref()
                .map_or(f64::NAN, |b| b.pmf((n - j) as u64));
            TerminalNode {
                down_moves: j,
                spot: terminal,
                payoff,
                probability,
                profitable: payoff > hurdle,
                in_the_money: option_type.is_itm(terminal, strike),
            }
        })
        .collect()
}
