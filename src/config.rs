//! Configuration for the pricing engine

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{PricingError, PricingResult};

/// Engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Binomial lattice settings
    pub lattice: LatticeConfig,
    /// Implied-volatility solver settings
    pub solver: SolverConfig,
}

impl EngineConfig {
    /// Coarse lattice for quick screening of whole chains
    pub fn fast() -> Self {
        Self {
            lattice: LatticeConfig { levels: 50 },
            ..Default::default()
        }
    }

    /// Fine lattice for close agreement with the analytic price
    pub fn precise() -> Self {
        Self {
            lattice: LatticeConfig { levels: 500 },
            ..Default::default()
        }
    }

    /// Parse from JSON; missing fields take their defaults
    pub fn from_json_str(json: &str) -> PricingResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> PricingResult<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> PricingResult<()> {
        if self.lattice.levels == 0 {
            return Err(PricingError::invalid_input("lattice levels must be at least 1"));
        }
        if self.solver.max_iterations == 0 {
            return Err(PricingError::invalid_input(
                "solver max_iterations must be at least 1",
            ));
        }
        if self.solver.tolerance.is_nan() || self.solver.tolerance <= 0.0 {
            return Err(PricingError::invalid_input("solver tolerance must be positive"));
        }
        Ok(())
    }
}

/// Binomial lattice configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatticeConfig {
    /// Number of tree levels (time steps)
    /// Default: 100
    pub levels: usize,
}

impl Default for LatticeConfig {
    fn default() -> Self {
        Self { levels: 100 }
    }
}

/// Newton-Raphson implied-volatility solver configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Iteration cap before reporting non-convergence
    /// Default: 100
    pub max_iterations: usize,

    /// Step size below which the iteration has converged
    /// Default: 1e-5
    pub tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.lattice.levels, 100);
        assert_eq!(config.solver.max_iterations, 100);
        assert_eq!(config.solver.tolerance, 1e-5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config = EngineConfig::from_json_str(r#"{"lattice": {"levels": 250}}"#).unwrap();
        assert_eq!(config.lattice.levels, 250);
        assert_eq!(config.solver, SolverConfig::default());
    }

    #[test]
    fn test_rejects_invalid() {
        assert!(EngineConfig::from_json_str(r#"{"lattice": {"levels": 0}}"#).is_err());
        assert!(EngineConfig::from_json_str(r#"{"solver": {"tolerance": -1.0}}"#).is_err());
        assert!(matches!(
            EngineConfig::from_json_str("not json"),
            Err(PricingError::Serialization(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"solver": {{"max_iterations": 20}}}}"#).unwrap();

        let config = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.solver.max_iterations, 20);
        assert_eq!(config.lattice.levels, 100);

        assert!(matches!(
            EngineConfig::from_file("/nonexistent/engine.json"),
            Err(PricingError::Io(_))
        ));
    }

    #[test]
    fn test_presets() {
        assert!(EngineConfig::fast().lattice.levels < EngineConfig::default().lattice.levels);
        assert!(EngineConfig::precise().lattice.levels > EngineConfig::default().lattice.levels);
    }
}
