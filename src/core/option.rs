//! Option contract definitions
//!
//! Represents a vanilla European/American option, or a parallel batch of
//! them, with all the parameters the pricers need.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::{PricingError, PricingResult};
use super::shaped::{common_len, Shaped};

/// Option type (Call or Put)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// Intrinsic value at given spot
    pub fn intrinsic(&self, spot: f64, strike: f64) -> f64 {
        match self {
            OptionType::Call => (spot - strike).max(0.0),
            OptionType::Put => (strike - spot).max(0.0),
        }
    }

    /// Strictly in the money at `spot`
    pub fn is_itm(&self, spot: f64, strike: f64) -> bool {
        match self {
            OptionType::Call => spot > strike,
            OptionType::Put => spot < strike,
        }
    }
}

impl FromStr for OptionType {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "call" => Ok(OptionType::Call),
            "put" => Ok(OptionType::Put),
            other => Err(PricingError::invalid_input(format!(
                "invalid option type '{other}' (expected 'call' or 'put')"
            ))),
        }
    }
}

impl TryFrom<String> for OptionType {
    type Error = PricingError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => f.write_str("call"),
            OptionType::Put => f.write_str("put"),
        }
    }
}

/// Exercise style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ExerciseStyle {
    European,
    American,
}

impl FromStr for ExerciseStyle {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "european" => Ok(ExerciseStyle::European),
            "american" => Ok(ExerciseStyle::American),
            other => Err(PricingError::invalid_input(format!(
                "invalid exercise style '{other}' (expected 'european' or 'american')"
            ))),
        }
    }
}

impl TryFrom<String> for ExerciseStyle {
    type Error = PricingError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for ExerciseStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExerciseStyle::European => f.write_str("european"),
            ExerciseStyle::American => f.write_str("american"),
        }
    }
}

/// One fully scalar contract, a single row of a [`Contract`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContractPoint {
    pub time_to_maturity: f64,
    pub spot: f64,
    pub strike: f64,
    pub volatility: f64,
    pub risk_free_rate: f64,
    pub dividend_yield: f64,
    pub option_type: OptionType,
    pub exercise: ExerciseStyle,
}

impl ContractPoint {
    /// Same contract under a different volatility
    pub fn with_volatility(self, volatility: f64) -> Self {
        Self { volatility, ..self }
    }
}

/// Validated option contract specification.
///
/// Numeric fields are either scalars or equal-length batches; a batched
/// contract stands for a parallel array of contracts sharing one option type
/// and exercise style. Build one through [`Contract::builder`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ContractBuilder")]
pub struct Contract {
    time_to_maturity: Shaped<f64>,
    spot: Shaped<f64>,
    strike: Shaped<f64>,
    volatility: Shaped<f64>,
    risk_free_rate: Shaped<f64>,
    dividend_yield: Shaped<f64>,
    option_type: OptionType,
    exercise: ExerciseStyle,
    #[serde(skip)]
    rows: Option<usize>,
}

impl Contract {
    /// Builder starting from the default contract
    /// (τ=1, spot=100, strike=90, σ=0.2, r=0.02, q=0, European call)
    pub fn builder() -> ContractBuilder {
        ContractBuilder::default()
    }

    pub fn time_to_maturity(&self) -> &Shaped<f64> {
        &self.time_to_maturity
    }

    pub fn spot(&self) -> &Shaped<f64> {
        &self.spot
    }

    pub fn strike(&self) -> &Shaped<f64> {
        &self.strike
    }

    pub fn volatility(&self) -> &Shaped<f64> {
        &self.volatility
    }

    pub fn risk_free_rate(&self) -> &Shaped<f64> {
        &self.risk_free_rate
    }

    pub fn dividend_yield(&self) -> &Shaped<f64> {
        &self.dividend_yield
    }

    pub fn option_type(&self) -> OptionType {
        self.option_type
    }

    pub fn exercise(&self) -> ExerciseStyle {
        self.exercise
    }

    /// Number of contracts in the batch, `None` if every field is scalar
    pub fn batch_len(&self) -> Option<usize> {
        self.rows
    }

    /// Number of rows the pricers evaluate (1 for a scalar contract)
    pub fn rows(&self) -> usize {
        self.rows.unwrap_or(1)
    }

    /// Scalar row `row`, with scalar fields broadcast
    pub fn point(&self, row: usize) -> ContractPoint {
        let at = |field: &Shaped<f64>| field.at(row).copied().unwrap_or(f64::NAN);
        ContractPoint {
            time_to_maturity: at(&self.time_to_maturity),
            spot: at(&self.spot),
            strike: at(&self.strike),
            volatility: at(&self.volatility),
            risk_free_rate: at(&self.risk_free_rate),
            dividend_yield: at(&self.dividend_yield),
            option_type: self.option_type,
            exercise: self.exercise,
        }
    }

    /// All rows as scalar contracts, in batch order
    pub fn points(&self) -> Vec<ContractPoint> {
        (0..self.rows()).map(|row| self.point(row)).collect()
    }

    /// Evaluate `f` on every row, shaping the result like the contract
    pub fn map_points<T>(&self, mut f: impl FnMut(&ContractPoint) -> T) -> Shaped<T> {
        match self.rows {
            None => Shaped::Scalar(f(&self.point(0))),
            Some(rows) => Shaped::Batch((0..rows).map(|row| f(&self.point(row))).collect()),
        }
    }

    /// Shape per-row results like the contract (scalar stays scalar)
    pub fn shape<T>(&self, mut values: Vec<T>) -> PricingResult<Shaped<T>> {
        if values.len() != self.rows() {
            return Err(PricingError::shape_mismatch("result", self.rows(), values.len()));
        }
        match self.rows {
            None => match values.pop() {
                Some(value) => Ok(Shaped::Scalar(value)),
                None => Err(PricingError::shape_mismatch("result", 1, 0)),
            },
            Some(_) => Ok(Shaped::Batch(values)),
        }
    }

    /// Copy of this contract under a different (validated) volatility
    pub fn with_volatility(&self, volatility: impl Into<Shaped<f64>>) -> PricingResult<Self> {
        ContractBuilder::from(self.clone())
            .volatility(volatility)
            .build()
    }
}

/// Builder for [`Contract`]; validation happens in [`ContractBuilder::build`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractBuilder {
    pub time_to_maturity: Shaped<f64>,
    pub spot: Shaped<f64>,
    pub strike: Shaped<f64>,
    pub volatility: Shaped<f64>,
    pub risk_free_rate: Shaped<f64>,
    pub dividend_yield: Shaped<f64>,
    pub option_type: OptionType,
    pub exercise: ExerciseStyle,
}

impl Default for ContractBuilder {
    fn default() -> Self {
        Self {
            time_to_maturity: Shaped::Scalar(1.0),
            spot: Shaped::Scalar(100.0),
            strike: Shaped::Scalar(90.0),
            volatility: Shaped::Scalar(0.2),
            risk_free_rate: Shaped::Scalar(0.02),
            dividend_yield: Shaped::Scalar(0.0),
            option_type: OptionType::Call,
            exercise: ExerciseStyle::European,
        }
    }
}

impl From<Contract> for ContractBuilder {
    fn from(contract: Contract) -> Self {
        Self {
            time_to_maturity: contract.time_to_maturity,
            spot: contract.spot,
            strike: contract.strike,
            volatility: contract.volatility,
            risk_free_rate: contract.risk_free_rate,
            dividend_yield: contract.dividend_yield,
            option_type: contract.option_type,
            exercise: contract.exercise,
        }
    }
}

impl ContractBuilder {
    /// Time to maturity in years
    pub fn time_to_maturity(mut self, tau: impl Into<Shaped<f64>>) -> Self {
        self.time_to_maturity = tau.into();
        self
    }

    pub fn spot(mut self, spot: impl Into<Shaped<f64>>) -> Self {
        self.spot = spot.into();
        self
    }

    pub fn strike(mut self, strike: impl Into<Shaped<f64>>) -> Self {
        self.strike = strike.into();
        self
    }

    pub fn volatility(mut self, sigma: impl Into<Shaped<f64>>) -> Self {
        self.volatility = sigma.into();
        self
    }

    pub fn risk_free_rate(mut self, rate: impl Into<Shaped<f64>>) -> Self {
        self.risk_free_rate = rate.into();
        self
    }

    pub fn dividend_yield(mut self, div: impl Into<Shaped<f64>>) -> Self {
        self.dividend_yield = div.into();
        self
    }

    pub fn option_type(mut self, option_type: OptionType) -> Self {
        self.option_type = option_type;
        self
    }

    pub fn exercise(mut self, exercise: ExerciseStyle) -> Self {
        self.exercise = exercise;
        self
    }

    /// Validate and build the contract
    pub fn build(self) -> PricingResult<Contract> {
        let non_negative = [
            ("time to maturity", &self.time_to_maturity),
            ("spot price", &self.spot),
            ("strike price", &self.strike),
            ("volatility", &self.volatility),
            ("dividend yield", &self.dividend_yield),
        ];
        for (name, field) in non_negative {
            if !field.all(|v| v >= 0.0) {
                return Err(PricingError::invalid_input(format!(
                    "invalid {name} (must be a non-negative number)"
                )));
            }
        }
        if !self.risk_free_rate.all(|v| !v.is_nan()) {
            return Err(PricingError::invalid_input("invalid risk-free rate (NaN)"));
        }

        let rows = common_len([
            ("time_to_maturity", &self.time_to_maturity),
            ("spot", &self.spot),
            ("strike", &self.strike),
            ("volatility", &self.volatility),
            ("risk_free_rate", &self.risk_free_rate),
            ("dividend_yield", &self.dividend_yield),
        ])?;

        Ok(Contract {
            time_to_maturity: self.time_to_maturity,
            spot: self.spot,
            strike: self.strike,
            volatility: self.volatility,
            risk_free_rate: self.risk_free_rate,
            dividend_yield: self.dividend_yield,
            option_type: self.option_type,
            exercise: self.exercise,
            rows,
        })
    }
}

impl TryFrom<ContractBuilder> for Contract {
    type Error = PricingError;

    fn try_from(builder: ContractBuilder) -> Result<Self, Self::Error> {
        builder.build()
    }
}
