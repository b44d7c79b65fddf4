//! Error taxonomy shared by every distribution family.
//!
//! Construction and argument errors surface immediately. Solver failures are
//! distinguishable ([`DistributionError::NonConvergence`]) so callers can
//! retry with a relaxed [`SolverConfig`](crate::config::SolverConfig).
//! [`DistributionError::Unsupported`] marks a family-specific feature that has
//! no implementation for the receiving family; callers probing for optional
//! features are expected to handle it locally.

use thiserror::Error;

/// Error type for distribution construction and evaluation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DistributionError {
    /// Malformed parameters or query arguments.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A point, sample or parameter vector has the wrong length.
    #[error("invalid dimension: expected {expected}, got {got}")]
    InvalidDimension {
        /// Dimension required by the receiver.
        expected: usize,
        /// Dimension supplied by the caller.
        got: usize,
    },

    /// An iterative solver exhausted its iteration budget.
    #[error("{solver} did not converge after {iterations} iterations (residual {residual:e})")]
    NonConvergence {
        /// Name of the solver that failed.
        solver: &'static str,
        /// Number of iterations performed.
        iterations: usize,
        /// Last residual observed.
        residual: f64,
    },

    /// The operation is not available for this family.
    #[error("unsupported operation: {0}")]
    Unsupported(String),
}

impl DistributionError {
    /// Whether retrying with a relaxed solver configuration may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DistributionError::NonConvergence { .. })
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        DistributionError::InvalidArgument(msg.into())
    }
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, DistributionError>;

/// Checks that `p` is a probability in `[0, 1]`.
pub(crate) fn check_probability(p: f64) -> Result<()> {
    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return Err(DistributionError::invalid(format!(
            "probability must be in [0, 1], got {p}"
        )));
    }
    Ok(())
}

/// Checks that a point or vector has the expected length.
pub(crate) fn check_dimension(expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(DistributionError::InvalidDimension { expected, got });
    }
    Ok(())
}
