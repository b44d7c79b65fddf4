//! Normal (Gaussian) distribution N(μ, σ²).
//!
//! Every operation has a closed form; the family serves as the unbounded,
//! elliptical member of the crate and as the limit the truncated normal is
//! checked against.

use std::fmt;

use nalgebra::DVector;
use num_complex::Complex64;
use rand::{Rng, RngCore};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::distribution::Distribution;
use crate::error::{check_dimension, check_probability, DistributionError, Result};
use crate::interval::{Interval, MinimumVolumeInterval};
use crate::parameters::ParameterCollection;
use crate::special::{self, FRAC_1_SQRT_2PI, LN_SQRT_2PI};

/// Normal distribution N(μ, σ²).
///
/// # Mathematical Definition
/// - PDF: φ(x) = (1/(σ√(2π))) exp(−(x−μ)²/(2σ²))
/// - CDF: Φ((x−μ)/σ) (via standard normal CDF)
/// - Characteristic function: exp(iμt − σ²t²/2)
/// - Mean: μ, Variance: σ², Kurtosis: 3
///
/// # Examples
/// ```
/// use u_probdist::distribution::Distribution;
/// use u_probdist::normal::Normal;
/// let n = Normal::new(10.0, 2.0).unwrap();
/// assert!((n.cdf(10.0) - 0.5).abs() < 1e-15);
/// assert!((n.quantile(0.975).unwrap() - (10.0 + 2.0 * 1.959963984540054)).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NormalParameters", into = "NormalParameters")]
pub struct Normal {
    mu: f64,
    sigma: f64,
}

/// Serialized form of [`Normal`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NormalParameters {
    pub mu: f64,
    pub sigma: f64,
}

impl TryFrom<NormalParameters> for Normal {
    type Error = DistributionError;

    fn try_from(p: NormalParameters) -> Result<Self> {
        Normal::new(p.mu, p.sigma)
    }
}

impl From<Normal> for NormalParameters {
    fn from(n: Normal) -> Self {
        Self {
            mu: n.mu,
            sigma: n.sigma,
        }
    }
}

impl Normal {
    /// Creates a new normal distribution N(μ, σ).
    ///
    /// # Errors
    /// Returns `Err` if `sigma ≤ 0` or parameters are not finite.
    pub fn new(mu: f64, sigma: f64) -> Result<Self> {
        if !mu.is_finite() || !sigma.is_finite() || sigma <= 0.0 {
            return Err(DistributionError::invalid(format!(
                "Normal requires finite μ and σ > 0, got μ={mu}, σ={sigma}"
            )));
        }
        Ok(Self { mu, sigma })
    }

    pub fn mu(&self) -> f64 {
        self.mu
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    fn standardize(&self, x: f64) -> f64 {
        (x - self.mu) / self.sigma
    }
}

impl Default for Normal {
    fn default() -> Self {
        Self {
            mu: 0.0,
            sigma: 1.0,
        }
    }
}

impl fmt::Display for Normal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.parameters())
    }
}

impl Distribution for Normal {
    fn name(&self) -> &'static str {
        "Normal"
    }

    fn parameters(&self) -> ParameterCollection {
        ParameterCollection::from_pairs("Normal", &[("mu", self.mu), ("sigma", self.sigma)])
    }

    fn with_parameters(&self, values: &[f64]) -> Result<Self> {
        check_dimension(2, values.len())?;
        Normal::new(values[0], values[1])
    }

    fn range(&self) -> Interval {
        Interval::real_line()
    }

    fn pdf(&self, x: f64) -> f64 {
        special::standard_normal_pdf(self.standardize(x)) / self.sigma
    }

    fn log_pdf(&self, x: f64) -> f64 {
        special::log_standard_normal_pdf(self.standardize(x)) - self.sigma.ln()
    }

    fn ddf(&self, x: f64) -> f64 {
        -self.standardize(x) / self.sigma * self.pdf(x)
    }

    fn cdf(&self, x: f64) -> f64 {
        special::standard_normal_cdf(self.standardize(x))
    }

    fn complementary_cdf(&self, x: f64) -> f64 {
        special::standard_normal_cdf(-self.standardize(x))
    }

    /// μ + σ·Φ⁻¹(p), mirrored for the upper tail.
    fn quantile_with_tail(&self, p: f64, tail: bool) -> Result<f64> {
        check_probability(p)?;
        let z = special::inverse_normal_cdf(p);
        Ok(if tail {
            self.mu - self.sigma * z
        } else {
            self.mu + self.sigma * z
        })
    }

    /// `[∂f/∂μ, ∂f/∂σ] = f · [z/σ, (z² − 1)/σ]`.
    fn pdf_gradient(&self, x: f64) -> DVector<f64> {
        self.log_pdf_gradient(x) * self.pdf(x)
    }

    fn log_pdf_gradient(&self, x: f64) -> DVector<f64> {
        let z = self.standardize(x);
        DVector::from_vec(vec![z / self.sigma, (z * z - 1.0) / self.sigma])
    }

    /// `[∂F/∂μ, ∂F/∂σ] = −φ(z)/σ · [1, z]`.
    fn cdf_gradient(&self, x: f64) -> DVector<f64> {
        let z = self.standardize(x);
        let phi = special::standard_normal_pdf(z) / self.sigma;
        DVector::from_vec(vec![-phi, -z * phi])
    }

    fn characteristic_function(&self, t: f64) -> Result<Complex64> {
        Ok(self.log_characteristic_function(t)?.exp())
    }

    /// `iμt − σ²t²/2`, with the imaginary part left unwrapped.
    fn log_characteristic_function(&self, t: f64) -> Result<Complex64> {
        let s = self.sigma * t;
        Ok(Complex64::new(-0.5 * s * s, self.mu * t))
    }

    fn mean(&self) -> f64 {
        self.mu
    }

    fn standard_deviation(&self) -> f64 {
        self.sigma
    }

    fn skewness(&self) -> f64 {
        0.0
    }

    fn kurtosis(&self) -> f64 {
        3.0
    }

    /// ½ ln(2πe σ²).
    fn entropy(&self) -> f64 {
        0.5 + LN_SQRT_2PI + self.sigma.ln()
    }

    fn realization(&self, rng: &mut dyn RngCore) -> f64 {
        let z: f64 = rng.sample(StandardNormal);
        self.mu + self.sigma * z
    }

    /// `μ ± σ·Φ⁻¹((1 + p)/2)`.
    fn minimum_volume_interval(&self, p: f64) -> Result<MinimumVolumeInterval> {
        check_probability(p)?;
        let z = special::inverse_normal_cdf(0.5 * (1.0 + p));
        let half = self.sigma * z;
        Ok(MinimumVolumeInterval {
            interval: Interval::new(self.mu - half, self.mu + half)?,
            threshold: FRAC_1_SQRT_2PI * (-0.5 * z * z).exp() / self.sigma,
            probability: special::erf(z * std::f64::consts::FRAC_1_SQRT_2),
        })
    }

    fn is_elliptical(&self) -> bool {
        true
    }

    fn standard_representative(&self) -> Box<dyn Distribution> {
        Box::new(Normal::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_diff::{central_gradient, DEFAULT_STEP};

    #[test]
    fn test_normal_standard() {
        let n = Normal::default();
        assert!(n.mean().abs() < 1e-15);
        assert!((n.covariance()[(0, 0)] - 1.0).abs() < 1e-15);
        assert!((n.cdf(0.0) - 0.5).abs() < 1e-15);
        assert!((n.pdf(0.0) - FRAC_1_SQRT_2PI).abs() < 1e-16);
    }

    #[test]
    fn test_normal_shifted() {
        let n = Normal::new(10.0, 2.0).unwrap();
        assert!((n.mean() - 10.0).abs() < 1e-15);
        assert!((n.standard_deviation() - 2.0).abs() < 1e-15);
        assert!((n.cdf(10.0) - 0.5).abs() < 1e-15);
        assert!((n.log_pdf(12.0) - n.pdf(12.0).ln()).abs() < 1e-14);
    }

    #[test]
    fn test_normal_invalid() {
        assert!(Normal::new(0.0, 0.0).is_err());
        assert!(Normal::new(0.0, -1.0).is_err());
        assert!(Normal::new(f64::NAN, 1.0).is_err());
        assert!(Normal::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_normal_quantile_bounds_and_tails() {
        let n = Normal::new(1.0, 3.0).unwrap();
        assert_eq!(n.quantile(0.0).unwrap(), f64::NEG_INFINITY);
        assert_eq!(n.quantile(1.0).unwrap(), f64::INFINITY);
        assert_eq!(n.inverse_survival_function(0.0).unwrap(), f64::INFINITY);
        let q = n.inverse_survival_function(1e-10).unwrap();
        assert!((n.survival_function(q) / 1e-10 - 1.0).abs() < 1e-9);
        assert!(n.quantile(-0.1).is_err());
    }

    #[test]
    fn test_normal_upper_tail_has_relative_accuracy() {
        let n = Normal::default();
        // Q(10) ≈ 7.62e-24, unreachable through 1 − Φ(10)
        let q = n.complementary_cdf(10.0);
        assert!((q / 7.619853024160527e-24 - 1.0).abs() < 1e-12, "Q(10) = {q}");
    }

    #[test]
    fn test_normal_gradients_match_finite_differences() {
        let n = Normal::new(0.5, 1.7).unwrap();
        let params = n.parameters().values();
        for &x in &[-2.0, 0.3, 4.1] {
            let fd = central_gradient(&params, DEFAULT_STEP, |p| Ok(n.with_parameters(p)?.pdf(x))).unwrap();
            assert!((n.pdf_gradient(x) - &fd).amax() < 1e-8);

            let fd = central_gradient(&params, DEFAULT_STEP, |p| Ok(n.with_parameters(p)?.cdf(x))).unwrap();
            assert!((n.cdf_gradient(x) - &fd).amax() < 1e-8);

            let fd =
                central_gradient(&params, DEFAULT_STEP, |p| Ok(n.with_parameters(p)?.log_pdf(x))).unwrap();
            assert!((n.log_pdf_gradient(x) - &fd).amax() < 1e-7);
        }
    }

    #[test]
    fn test_normal_ddf() {
        let n = Normal::new(-1.0, 0.8).unwrap();
        let x = 0.2;
        let h = 1e-6;
        let fd = (n.pdf(x + h) - n.pdf(x - h)) / (2.0 * h);
        assert!((n.ddf(x) - fd).abs() < 1e-8);
    }

    #[test]
    fn test_normal_characteristic_function() {
        let n = Normal::new(2.0, 0.5).unwrap();
        let phi = n.characteristic_function(0.0).unwrap();
        assert!((phi - Complex64::new(1.0, 0.0)).norm() < 1e-15);

        let t = 3.5_f64;
        let phi = n.characteristic_function(t).unwrap();
        let modulus = (-0.5 * 0.25 * t * t).exp();
        assert!((phi.norm() - modulus).abs() < 1e-15);
        assert!((phi.arg() - Complex64::new(0.0, 2.0 * t).exp().arg()).abs() < 1e-12);
    }

    #[test]
    fn test_normal_minimum_volume_interval() {
        let n = Normal::new(3.0, 2.0).unwrap();
        let mvi = n.minimum_volume_interval(0.95).unwrap();
        assert!((mvi.probability - 0.95).abs() < 1e-12);
        assert!((mvi.interval.upper() - (3.0 + 2.0 * 1.959963984540054)).abs() < 1e-9);
        assert!((n.pdf(mvi.interval.lower()) - mvi.threshold).abs() < 1e-15);

        let all = n.minimum_volume_interval(1.0).unwrap();
        assert_eq!(all.interval, Interval::real_line());
        assert_eq!(all.threshold, 0.0);

        let none = n.minimum_volume_interval(0.0).unwrap();
        assert_eq!(none.interval.volume(), 0.0);
        assert!((none.threshold - n.pdf(3.0)).abs() < 1e-16);
    }

    #[test]
    fn test_normal_standard_representative_and_display() {
        let n = Normal::new(4.0, 9.0).unwrap();
        let std = n.standard_representative();
        assert_eq!(std.parameters().values(), vec![0.0, 1.0]);
        assert!(n.is_elliptical());
        assert_eq!(n.to_string(), "Normal(mu = 4, sigma = 9)");
    }

    #[test]
    fn test_normal_serde_validates() {
        let n = Normal::new(1.5, 0.25).unwrap();
        let json = serde_json::to_string(&n).unwrap();
        assert_eq!(json, r#"{"mu":1.5,"sigma":0.25}"#);
        let back: Normal = serde_json::from_str(&json).unwrap();
        assert_eq!(back, n);
        assert!(serde_json::from_str::<Normal>(r#"{"mu":0.0,"sigma":-1.0}"#).is_err());
    }
}
