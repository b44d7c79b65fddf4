//! Correctness relationships every family must satisfy.
//!
//! These checks tie the independently implemented operations of a
//! [`Distribution`] together:
//!
//! - analytic parameter gradients against central finite differences
//!   (perturbed instances are rebuilt through `with_parameters`, so the
//!   constructor's validation is part of the check);
//! - quantile inversion against the CDF;
//! - analytic moments and entropy against Monte Carlo estimates with
//!   standard errors.

use std::fmt;

use log::debug;
use nalgebra::DVector;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::distribution::Distribution;
use crate::error::{DistributionError, Result};
use crate::finite_diff::central_gradient;
use crate::stats::{self, MomentAccumulator};

/// Batches used to estimate the spread of the higher-moment estimators.
const BATCHES: usize = 20;

/// Minimum Monte Carlo size: every batch needs a few points for kurtosis.
const MIN_MONTE_CARLO_SIZE: usize = 5 * BATCHES;

// ============================================================================
// Gradients
// ============================================================================

/// An analytic gradient next to its finite-difference approximation.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientCheck {
    pub analytic: DVector<f64>,
    pub finite_difference: DVector<f64>,
}

impl GradientCheck {
    /// Largest component-wise absolute difference.
    pub fn max_abs_error(&self) -> f64 {
        (&self.analytic - &self.finite_difference).amax()
    }

    /// [`max_abs_error`](Self::max_abs_error) relative to the largest analytic
    /// component; the absolute error when the gradient vanishes.
    pub fn max_rel_error(&self) -> f64 {
        let scale = self.analytic.amax();
        let err = self.max_abs_error();
        if scale > 0.0 {
            err / scale
        } else {
            err
        }
    }
}

/// Compares [`Distribution::pdf_gradient`] at `x` with central differences
/// of step `eps` in every parameter.
///
/// # Errors
/// Propagates construction failures of perturbed instances (e.g. `eps`
/// large enough to make `σ ≤ 0`) and rejects a non-positive `eps`.
///
/// # Examples
/// ```
/// use u_probdist::finite_diff::DEFAULT_STEP;
/// use u_probdist::truncated_normal::TruncatedNormal;
/// use u_probdist::validation::check_pdf_gradient;
///
/// let d = TruncatedNormal::new(1.5, 3.0, -2.0, 5.0).unwrap();
/// let check = check_pdf_gradient(&d, 3.5, DEFAULT_STEP).unwrap();
/// assert!(check.max_rel_error() < 1e-6);
/// ```
pub fn check_pdf_gradient<D: Distribution>(distribution: &D, x: f64, eps: f64) -> Result<GradientCheck> {
    check_gradient(distribution, eps, distribution.pdf_gradient(x), |d| d.pdf(x))
}

/// Compares [`Distribution::log_pdf_gradient`] at `x` with central
/// differences.
///
/// # Errors
/// As [`check_pdf_gradient`].
pub fn check_log_pdf_gradient<D: Distribution>(distribution: &D, x: f64, eps: f64) -> Result<GradientCheck> {
    check_gradient(distribution, eps, distribution.log_pdf_gradient(x), |d| d.log_pdf(x))
}

/// Compares [`Distribution::cdf_gradient`] at `x` with central differences.
///
/// # Errors
/// As [`check_pdf_gradient`].
pub fn check_cdf_gradient<D: Distribution>(distribution: &D, x: f64, eps: f64) -> Result<GradientCheck> {
    check_gradient(distribution, eps, distribution.cdf_gradient(x), |d| d.cdf(x))
}

fn check_gradient<D, F>(distribution: &D, eps: f64, analytic: DVector<f64>, value: F) -> Result<GradientCheck>
where
    D: Distribution,
    F: Fn(&D) -> f64,
{
    let params = distribution.parameters().values();
    let finite_difference = central_gradient(&params, eps, |p| Ok(value(&distribution.with_parameters(p)?)))?;
    if analytic.len() != finite_difference.len() {
        return Err(DistributionError::InvalidDimension {
            expected: finite_difference.len(),
            got: analytic.len(),
        });
    }
    Ok(GradientCheck {
        analytic,
        finite_difference,
    })
}

// ============================================================================
// Quantiles
// ============================================================================

/// Largest of `|cdf(quantile(p)) − p|` and
/// `|survival(inverse_survival(p)) − p|` over `probabilities`.
///
/// # Errors
/// Propagates quantile failures (invalid `p`, solver non-convergence).
pub fn check_quantile_roundtrip(distribution: &dyn Distribution, probabilities: &[f64]) -> Result<f64> {
    let mut worst = 0.0_f64;
    for &p in probabilities {
        let q = distribution.quantile(p)?;
        worst = worst.max((distribution.cdf(q) - p).abs());
        let s = distribution.inverse_survival_function(p)?;
        worst = worst.max((distribution.survival_function(s) - p).abs());
    }
    Ok(worst)
}

// ============================================================================
// Monte Carlo
// ============================================================================

/// An analytic value with its Monte Carlo estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub analytic: f64,
    pub empirical: f64,
    /// Standard error of `empirical`.
    pub standard_error: f64,
}

impl Estimate {
    /// `(empirical − analytic) / standard_error`.
    pub fn z_score(&self) -> f64 {
        let diff = self.empirical - self.analytic;
        if self.standard_error > 0.0 {
            diff / self.standard_error
        } else if diff == 0.0 {
            0.0
        } else {
            f64::INFINITY
        }
    }

    /// Whether the estimate lies within `k` standard errors.
    pub fn is_consistent(&self, k: f64) -> bool {
        self.z_score().abs() <= k
    }
}

impl fmt::Display for Estimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.6} vs {:.6} (se {:.2e}, z {:+.2})",
            self.analytic,
            self.empirical,
            self.standard_error,
            self.z_score()
        )
    }
}

/// Analytic moments and entropy next to their Monte Carlo estimates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloReport {
    pub size: usize,
    pub mean: Estimate,
    pub standard_deviation: Estimate,
    pub skewness: Estimate,
    pub kurtosis: Estimate,
    /// Against `−mean(log_pdf(sample))`.
    pub entropy: Estimate,
}

impl MonteCarloReport {
    pub fn estimates(&self) -> [(&'static str, &Estimate); 5] {
        [
            ("mean", &self.mean),
            ("standard deviation", &self.standard_deviation),
            ("skewness", &self.skewness),
            ("kurtosis", &self.kurtosis),
            ("entropy", &self.entropy),
        ]
    }

    /// Whether every estimate lies within `k` standard errors.
    pub fn is_consistent(&self, k: f64) -> bool {
        self.estimates().iter().all(|(_, e)| e.is_consistent(k))
    }
}

impl fmt::Display for MonteCarloReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Monte Carlo, n = {}", self.size)?;
        for (name, e) in self.estimates() {
            writeln!(f, "  {name}: {e}")?;
        }
        Ok(())
    }
}

/// Draws `size` realizations and compares them with the analytic mean,
/// standard deviation, skewness, kurtosis and entropy.
///
/// The mean and entropy standard errors follow from the sample standard
/// deviation of `X` and of `ln f(X)`; the higher moments use the spread of
/// the estimator over batches.
///
/// # Errors
/// `InvalidArgument` if `size` is too small to form batches, or the draws
/// give an undefined estimator (e.g. a constant sample).
///
/// # Examples
/// ```
/// use u_probdist::random::create_rng;
/// use u_probdist::truncated_normal::TruncatedNormal;
/// use u_probdist::validation::monte_carlo_report;
///
/// let d = TruncatedNormal::new(1.5, 3.0, -2.0, 5.0).unwrap();
/// let report = monte_carlo_report(&d, 10_000, &mut create_rng(1)).unwrap();
/// assert!(report.mean.is_consistent(5.0));
/// ```
pub fn monte_carlo_report(
    distribution: &dyn Distribution,
    size: usize,
    rng: &mut dyn RngCore,
) -> Result<MonteCarloReport> {
    if size < MIN_MONTE_CARLO_SIZE {
        return Err(DistributionError::invalid(format!(
            "Monte Carlo check needs at least {MIN_MONTE_CARLO_SIZE} draws, got {size}"
        )));
    }
    let draws: Vec<f64> = (0..size).map(|_| distribution.realization(rng)).collect();
    let undefined = |what: &str| DistributionError::invalid(format!("Monte Carlo {what} is undefined"));

    let all = MomentAccumulator::from_slice(&draws);
    let n = size as f64;
    let sd = all.sample_std_dev().ok_or_else(|| undefined("standard deviation"))?;

    let neg_log: Vec<f64> = draws.iter().map(|&x| -distribution.log_pdf(x)).collect();
    let log_moments = MomentAccumulator::from_slice(&neg_log);

    let batch_len = size / BATCHES;
    let batches: Vec<MomentAccumulator> = draws
        .chunks_exact(batch_len)
        .take(BATCHES)
        .map(MomentAccumulator::from_slice)
        .collect();
    let batch_error = |stat: fn(&MomentAccumulator) -> Option<f64>| -> Result<f64> {
        let values = batches
            .iter()
            .map(stat)
            .collect::<Option<Vec<f64>>>()
            .ok_or_else(|| undefined("batch statistic"))?;
        let spread = MomentAccumulator::from_slice(&values)
            .sample_std_dev()
            .ok_or_else(|| undefined("batch spread"))?;
        Ok(spread / (BATCHES as f64).sqrt())
    };

    let report = MonteCarloReport {
        size,
        mean: Estimate {
            analytic: distribution.mean(),
            empirical: stats::mean(&draws).ok_or_else(|| undefined("mean"))?,
            standard_error: sd / n.sqrt(),
        },
        standard_deviation: Estimate {
            analytic: distribution.standard_deviation(),
            empirical: sd,
            standard_error: batch_error(MomentAccumulator::sample_std_dev)?,
        },
        skewness: Estimate {
            analytic: distribution.skewness(),
            empirical: all.skewness().ok_or_else(|| undefined("skewness"))?,
            standard_error: batch_error(MomentAccumulator::skewness)?,
        },
        kurtosis: Estimate {
            analytic: distribution.kurtosis(),
            empirical: all.kurtosis().ok_or_else(|| undefined("kurtosis"))?,
            standard_error: batch_error(MomentAccumulator::kurtosis)?,
        },
        entropy: Estimate {
            analytic: distribution.entropy(),
            empirical: stats::mean(&neg_log).ok_or_else(|| undefined("entropy"))?,
            standard_error: log_moments.sample_std_dev().unwrap_or(0.0) / n.sqrt(),
        },
    };
    debug!("{} {report}", distribution.name());
    Ok(report)
}
