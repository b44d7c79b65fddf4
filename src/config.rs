//! Numerical tolerances and iteration budgets.
//!
//! Every iterative algorithm in the crate takes its limits from one of these
//! configurations so that a failing evaluation can be retried with a relaxed
//! setting instead of looping without bound.

use serde::{Deserialize, Serialize};

use crate::error::{DistributionError, Result};

/// Root-finding configuration used by quantile inversion and
/// confidence-region searches.
///
/// # Examples
/// ```
/// use u_probdist::config::SolverConfig;
/// let cfg = SolverConfig::default().with_max_iterations(500);
/// assert_eq!(cfg.max_iterations, 500);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Hard cap on solver iterations.
    pub max_iterations: usize,
    /// Absolute tolerance on the root location.
    pub absolute_tolerance: f64,
    /// Relative tolerance on the root location.
    pub relative_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            absolute_tolerance: 1e-14,
            relative_tolerance: 4.0 * f64::EPSILON,
        }
    }
}

impl SolverConfig {
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_absolute_tolerance(mut self, tol: f64) -> Self {
        self.absolute_tolerance = tol;
        self
    }

    pub fn with_relative_tolerance(mut self, tol: f64) -> Self {
        self.relative_tolerance = tol;
        self
    }

    /// Convergence width for a root located near `x`.
    pub(crate) fn tolerance_at(&self, x: f64) -> f64 {
        self.absolute_tolerance + self.relative_tolerance * x.abs()
    }

    /// Rejects budgets that cannot make progress.
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(DistributionError::invalid(
                "solver needs at least one iteration",
            ));
        }
        if !(self.absolute_tolerance >= 0.0 && self.relative_tolerance >= 0.0)
            || self.absolute_tolerance + self.relative_tolerance <= 0.0
        {
            return Err(DistributionError::invalid(format!(
                "solver tolerances must be non-negative and not both zero, got abs={}, rel={}",
                self.absolute_tolerance, self.relative_tolerance
            )));
        }
        Ok(())
    }
}

/// Budget for composite Gauss–Legendre integration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuadratureConfig {
    /// Maximum number of panels a single integral may use.
    pub max_panels: usize,
}

impl Default for QuadratureConfig {
    fn default() -> Self {
        Self { max_panels: 4096 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SolverConfig::default().validate().is_ok());
    }

    #[test]
    fn test_builder_setters() {
        let cfg = SolverConfig::default()
            .with_max_iterations(7)
            .with_absolute_tolerance(1e-8)
            .with_relative_tolerance(0.0);
        assert_eq!(cfg.max_iterations, 7);
        assert_eq!(cfg.absolute_tolerance, 1e-8);
        assert!((cfg.tolerance_at(1e6) - 1e-8).abs() < 1e-20);
    }

    #[test]
    fn test_invalid_configs() {
        assert!(SolverConfig::default()
            .with_max_iterations(0)
            .validate()
            .is_err());
        assert!(SolverConfig::default()
            .with_absolute_tolerance(0.0)
            .with_relative_tolerance(0.0)
            .validate()
            .is_err());
        assert!(SolverConfig::default()
            .with_absolute_tolerance(f64::NAN)
            .validate()
            .is_err());
    }
}
