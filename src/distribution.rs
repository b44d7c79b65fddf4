//! The distribution evaluation contract.
//!
//! [`Distribution`] is the numerical interface every family implements:
//! densities, cumulative functions, their parameter gradients, quantiles,
//! confidence regions, moments and sampling. The trait is object safe, so
//! heterogeneous families can be held as `Box<dyn Distribution>`; the few
//! constructors that return `Self` are restricted to `Self: Sized`.
//!
//! # Conventions
//!
//! - Evaluation at points outside the support never fails: densities are 0
//!   (log-density `-inf`), the CDF saturates at 0 or 1 and gradients vanish.
//! - Probabilities outside `[0, 1]` are rejected with
//!   [`DistributionError::InvalidArgument`].
//! - Kurtosis is **not** excess: 3 for the normal.
//! - Confidence-region queries return structured results carrying the
//!   probability they actually enclose.

use std::fmt;

use nalgebra::{DMatrix, DVector};
use num_complex::Complex64;
use rand::RngCore;

use crate::error::{check_dimension, check_probability, DistributionError, Result};
use crate::interval::{
    ConfidenceInterval, Interval, LevelSet, MinimumVolumeInterval, MinimumVolumeLevelSet,
};
use crate::parameters::ParameterCollection;
use crate::sample::Sample;

/// A univariate continuous probability distribution.
///
/// Required methods carry the family-specific mathematics; every other
/// method has a generic default expressed through them.
pub trait Distribution: fmt::Debug + Send + Sync {
    // ========================================================================
    // Identity and parameters
    // ========================================================================

    /// Family name, e.g. `"TruncatedNormal"`.
    fn name(&self) -> &'static str;

    /// Dimension of the points the distribution is defined on.
    fn dimension(&self) -> usize {
        1
    }

    /// Named parameter vector.
    fn parameters(&self) -> ParameterCollection;

    /// Length of the parameter vector; the length of every gradient.
    fn parameter_dimension(&self) -> usize {
        self.parameters().len()
    }

    /// New instance of the same family with the given parameter values, in
    /// the order of [`parameters`](Self::parameters).
    ///
    /// # Errors
    /// `InvalidDimension` on a length mismatch, `InvalidArgument` if the
    /// family rejects the values.
    fn with_parameters(&self, values: &[f64]) -> Result<Self>
    where
        Self: Sized;

    /// Closed support interval.
    fn range(&self) -> Interval;

    // ========================================================================
    // Density and distribution functions
    // ========================================================================

    /// Probability density; 0 outside the support.
    fn pdf(&self, x: f64) -> f64;

    /// Natural log of the density; `-inf` outside the support.
    fn log_pdf(&self, x: f64) -> f64 {
        let p = self.pdf(x);
        if p > 0.0 {
            p.ln()
        } else {
            f64::NEG_INFINITY
        }
    }

    /// Derivative of the density with respect to `x`.
    fn ddf(&self, x: f64) -> f64;

    /// `P(X ≤ x)`.
    fn cdf(&self, x: f64) -> f64;

    /// `P(X > x)`. Families override this to avoid the cancellation of
    /// `1 − cdf(x)` in the upper tail.
    fn complementary_cdf(&self, x: f64) -> f64 {
        1.0 - self.cdf(x)
    }

    /// `P(X > x)`; equal to the complementary CDF for univariate families.
    fn survival_function(&self, x: f64) -> f64 {
        self.complementary_cdf(x)
    }

    /// Quantile: smallest `x` with `cdf(x) ≥ p`.
    fn quantile(&self, p: f64) -> Result<f64> {
        self.quantile_with_tail(p, false)
    }

    /// Quantile of the lower tail (`tail = false`, solves `cdf(x) = p`) or of
    /// the upper tail (`tail = true`, solves `complementary_cdf(x) = p`).
    ///
    /// `p = 0` and `p = 1` map exactly onto the support bounds.
    ///
    /// # Errors
    /// `InvalidArgument` if `p ∉ [0, 1]`; `NonConvergence` if the inversion
    /// runs out of iterations.
    fn quantile_with_tail(&self, p: f64, tail: bool) -> Result<f64>;

    /// Inverse of the survival function.
    fn inverse_survival_function(&self, p: f64) -> Result<f64> {
        self.quantile_with_tail(p, true)
    }

    // ========================================================================
    // Parameter gradients
    // ========================================================================

    /// Gradient of `pdf(x)` with respect to the parameter vector.
    fn pdf_gradient(&self, x: f64) -> DVector<f64>;

    /// Gradient of `log_pdf(x)`; zero where the density vanishes.
    fn log_pdf_gradient(&self, x: f64) -> DVector<f64> {
        let p = self.pdf(x);
        if p > 0.0 {
            self.pdf_gradient(x) / p
        } else {
            DVector::zeros(self.parameter_dimension())
        }
    }

    /// Gradient of `cdf(x)` with respect to the parameter vector.
    fn cdf_gradient(&self, x: f64) -> DVector<f64>;

    // ========================================================================
    // Characteristic function
    // ========================================================================

    /// `E[e^{itX}]`.
    ///
    /// # Errors
    /// `Unsupported` unless the family provides it.
    fn characteristic_function(&self, t: f64) -> Result<Complex64> {
        let _ = t;
        Err(DistributionError::Unsupported(format!(
            "{} has no characteristic function",
            self.name()
        )))
    }

    /// Principal logarithm of the characteristic function.
    fn log_characteristic_function(&self, t: f64) -> Result<Complex64> {
        self.characteristic_function(t).map(|phi| phi.ln())
    }

    // ========================================================================
    // Moments
    // ========================================================================

    fn mean(&self) -> f64;

    fn standard_deviation(&self) -> f64;

    /// Third standardized moment.
    fn skewness(&self) -> f64;

    /// Fourth standardized moment (not excess).
    fn kurtosis(&self) -> f64;

    /// Covariance matrix; `1 × 1` holding the variance.
    fn covariance(&self) -> DMatrix<f64> {
        let s = self.standard_deviation();
        DMatrix::from_element(1, 1, s * s)
    }

    /// Pearson correlation matrix.
    fn correlation(&self) -> DMatrix<f64> {
        DMatrix::identity(self.dimension(), self.dimension())
    }

    /// Spearman rank correlation matrix.
    fn spearman_correlation(&self) -> DMatrix<f64> {
        DMatrix::identity(self.dimension(), self.dimension())
    }

    /// Kendall tau matrix.
    fn kendall_tau(&self) -> DMatrix<f64> {
        DMatrix::identity(self.dimension(), self.dimension())
    }

    /// Differential entropy `−E[ln f(X)]`.
    fn entropy(&self) -> f64;

    // ========================================================================
    // Sampling
    // ========================================================================

    /// One draw, always inside [`range`](Self::range).
    fn realization(&self, rng: &mut dyn RngCore) -> f64;

    /// `size` independent draws.
    fn sample(&self, size: usize, rng: &mut dyn RngCore) -> Sample {
        Sample::from_values((0..size).map(|_| self.realization(rng)).collect())
    }

    // ========================================================================
    // Confidence regions
    // ========================================================================

    /// Shortest interval of probability `p`: the density is at least
    /// `threshold` inside and at most `threshold` outside.
    ///
    /// # Errors
    /// `InvalidArgument` if `p ∉ [0, 1]`; `NonConvergence` from the solver.
    fn minimum_volume_interval(&self, p: f64) -> Result<MinimumVolumeInterval>;

    /// Level-set view of [`minimum_volume_interval`](Self::minimum_volume_interval),
    /// with level `−ln(threshold)`.
    fn minimum_volume_level_set(&self, p: f64) -> Result<MinimumVolumeLevelSet> {
        let mvi = self.minimum_volume_interval(p)?;
        Ok(MinimumVolumeLevelSet {
            level_set: LevelSet {
                level: -mvi.threshold.ln(),
                bounds: mvi.interval,
            },
            probability: mvi.probability,
        })
    }

    /// Interval leaving mass `(1 − p)/2` in each tail.
    ///
    /// # Examples
    /// ```
    /// use u_probdist::distribution::Distribution;
    /// use u_probdist::normal::Normal;
    /// let n = Normal::new(0.0, 1.0).unwrap();
    /// let ci = n.bilateral_confidence_interval(0.95).unwrap();
    /// assert!((ci.interval.upper() - 1.959963984540054).abs() < 1e-9);
    /// assert!((ci.probability - 0.95).abs() < 1e-12);
    /// ```
    fn bilateral_confidence_interval(&self, p: f64) -> Result<ConfidenceInterval> {
        check_probability(p)?;
        let tail = 0.5 * (1.0 - p);
        let lower = self.quantile(tail)?;
        // The two inversions are independent; keep them ordered at p = 0.
        let upper = self.quantile_with_tail(tail, true)?.max(lower);
        let probability = (1.0 - self.cdf(lower) - self.complementary_cdf(upper)).clamp(0.0, 1.0);
        Ok(ConfidenceInterval {
            interval: Interval::new(lower, upper)?,
            probability,
        })
    }

    /// One-sided interval of probability `p`: `[range.lower, quantile(p)]`
    /// when `upper_tail` is false, `[quantile_with_tail(p, true), range.upper]`
    /// otherwise.
    fn unilateral_confidence_interval(&self, p: f64, upper_tail: bool) -> Result<ConfidenceInterval> {
        check_probability(p)?;
        let range = self.range();
        if upper_tail {
            let lower = self.quantile_with_tail(p, true)?;
            Ok(ConfidenceInterval {
                interval: Interval::new(lower, range.upper())?,
                probability: self.complementary_cdf(lower),
            })
        } else {
            let upper = self.quantile(p)?;
            Ok(ConfidenceInterval {
                interval: Interval::new(range.lower(), upper)?,
                probability: self.cdf(upper),
            })
        }
    }

    // ========================================================================
    // Classification
    // ========================================================================

    fn is_elliptical(&self) -> bool;

    fn is_continuous(&self) -> bool {
        true
    }

    /// Member of the family in standard position (location 0, scale 1).
    fn standard_representative(&self) -> Box<dyn Distribution>;

    // ========================================================================
    // Point-based evaluation
    // ========================================================================

    /// Density at a point given as a slice.
    ///
    /// # Errors
    /// `InvalidDimension` if `point.len() != dimension()`.
    fn pdf_at(&self, point: &[f64]) -> Result<f64> {
        check_dimension(self.dimension(), point.len())?;
        Ok(self.pdf(point[0]))
    }

    /// Log-density at a point given as a slice.
    fn log_pdf_at(&self, point: &[f64]) -> Result<f64> {
        check_dimension(self.dimension(), point.len())?;
        Ok(self.log_pdf(point[0]))
    }

    /// CDF at a point given as a slice.
    fn cdf_at(&self, point: &[f64]) -> Result<f64> {
        check_dimension(self.dimension(), point.len())?;
        Ok(self.cdf(point[0]))
    }

    /// Log-density of every point of `sample`.
    ///
    /// # Errors
    /// `InvalidDimension` if the sample dimension differs.
    fn log_pdf_sample(&self, sample: &Sample) -> Result<Vec<f64>> {
        check_dimension(self.dimension(), sample.dimension())?;
        Ok(sample.rows().map(|r| self.log_pdf(r[0])).collect())
    }
}
