//! Goodness-of-fit testing.
//!
//! The Kolmogorov–Smirnov test compares the empirical CDF of a sample with
//! a fully specified distribution. The statistic is
//!
//! ```text
//! D = sup |F_n(x) − F(x)| = max_i max(i/n − F(x_(i)), F(x_(i)) − (i−1)/n)
//! ```
//!
//! and its p-value comes from the asymptotic Kolmogorov distribution with
//! Stephens' finite-sample correction `λ = (√n + 0.12 + 0.11/√n) D`.
//!
//! Reference: Stephens (1970), "Use of the Kolmogorov–Smirnov, Cramér–von
//! Mises and related statistics without extensive tables", *JRSS B* 32(1).

use std::f64::consts::PI;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::distribution::Distribution;
use crate::error::{check_dimension, DistributionError, Result};
use crate::sample::Sample;

/// Outcome of a goodness-of-fit test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    /// Test statistic (`D` for Kolmogorov–Smirnov).
    pub statistic: f64,
    pub p_value: f64,
    /// Smallest p-value still accepted, `1 − level`.
    pub threshold: f64,
    /// `true` when the hypothesis is accepted.
    pub binary_quality_measure: bool,
}

/// Kolmogorov–Smirnov test of `sample` against `distribution` at
/// confidence `level` (e.g. `0.95`).
///
/// # Errors
/// - `InvalidArgument` if `level` is not in `(0, 1)`, the sample is empty or
///   holds NaN.
/// - `InvalidDimension` if the sample dimension differs from the
///   distribution's.
///
/// # Examples
/// ```
/// use u_probdist::distribution::Distribution;
/// use u_probdist::fitting_test::kolmogorov;
/// use u_probdist::normal::Normal;
/// use u_probdist::random::create_rng;
///
/// let d = Normal::new(0.0, 1.0).unwrap();
/// let mut rng = create_rng(3);
/// let sample = d.sample(500, &mut rng);
/// let result = kolmogorov(&sample, &d, 0.95).unwrap();
/// assert!(result.statistic > 0.0 && result.statistic < 0.2);
/// ```
pub fn kolmogorov(sample: &Sample, distribution: &dyn Distribution, level: f64) -> Result<TestResult> {
    if !(level > 0.0 && level < 1.0) {
        return Err(DistributionError::invalid(format!(
            "test level must be in (0, 1), got {level}"
        )));
    }
    check_dimension(distribution.dimension(), sample.dimension())?;
    if sample.is_empty() {
        return Err(DistributionError::invalid("Kolmogorov test needs a non-empty sample"));
    }

    let mut values = sample.marginal(0)?;
    if values.iter().any(|v| v.is_nan()) {
        return Err(DistributionError::invalid("Kolmogorov test sample contains NaN"));
    }
    values.sort_by(f64::total_cmp);

    let n = values.len() as f64;
    let statistic = values
        .iter()
        .enumerate()
        .map(|(i, &x)| {
            let f = distribution.cdf(x);
            ((i + 1) as f64 / n - f).max(f - i as f64 / n)
        })
        .fold(0.0_f64, f64::max);

    let root_n = n.sqrt();
    let lambda = (root_n + 0.12 + 0.11 / root_n) * statistic;
    let p_value = kolmogorov_survival(lambda);
    let threshold = 1.0 - level;
    debug!(
        "Kolmogorov test vs {}: n={}, D={statistic:.6}, p={p_value:.4}",
        distribution.name(),
        values.len()
    );

    Ok(TestResult {
        statistic,
        p_value,
        threshold,
        binary_quality_measure: p_value >= threshold,
    })
}

/// `Q(λ) = P(K > λ)` for the Kolmogorov distribution.
///
/// Two series cover the range: the Jacobi-transformed form converges fast
/// for small `λ`, the alternating form for large `λ`.
pub fn kolmogorov_survival(lambda: f64) -> f64 {
    if lambda.is_nan() {
        return f64::NAN;
    }
    // Q(0.1) rounds to 1.
    if lambda <= 0.1 {
        return 1.0;
    }
    let q = if lambda < 1.18 {
        let k = PI * PI / (8.0 * lambda * lambda);
        let series: f64 = (1..=5)
            .map(|j| {
                let m = (2 * j - 1) as f64;
                (-m * m * k).exp()
            })
            .sum();
        1.0 - (2.0 * PI).sqrt() / lambda * series
    } else {
        let series: f64 = (1..=5)
            .map(|j: i32| {
                let sign = if j % 2 == 1 { 1.0 } else { -1.0 };
                let j = f64::from(j);
                sign * (-2.0 * j * j * lambda * lambda).exp()
            })
            .sum();
        2.0 * series
    };
    q.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normal::Normal;
    use crate::random::create_rng;
    use crate::truncated_normal::TruncatedNormal;
    use test_log::test;

    #[test]
    fn test_kolmogorov_survival_values() {
        assert_eq!(kolmogorov_survival(0.0), 1.0);
        assert!((kolmogorov_survival(0.5) - 0.963_945_243_664_875).abs() < 1e-12);
        assert!((kolmogorov_survival(1.0) - 0.269_999_671_677_354_6).abs() < 1e-12);
        assert!((kolmogorov_survival(1.36) - 0.049_485_876_755_377_9).abs() < 1e-12);
        assert!((kolmogorov_survival(2.0) - 6.709_252_557_796_953e-4).abs() < 1e-15);
        // The two series agree where they meet.
        let below = kolmogorov_survival(1.18 - 1e-12);
        let above = kolmogorov_survival(1.18);
        assert!((below - above).abs() < 1e-9);
    }

    #[test]
    fn test_statistic_on_small_sample() {
        let d = Normal::new(0.0, 1.0).unwrap();
        let s = Sample::from_values(vec![0.5, -1.0, 0.0]);
        let r = kolmogorov(&s, &d, 0.95).unwrap();
        // Sorted: −1, 0, 0.5 with F = 0.1587, 0.5, 0.6915.
        let f = [d.cdf(-1.0), 0.5, d.cdf(0.5)];
        let expected = (0..3)
            .map(|i| ((i + 1) as f64 / 3.0 - f[i]).max(f[i] - i as f64 / 3.0))
            .fold(0.0_f64, f64::max);
        assert!((r.statistic - expected).abs() < 1e-15);
        assert!((r.threshold - 0.05).abs() < 1e-15);
    }

    #[test]
    fn test_accepts_matching_distribution() {
        let d = TruncatedNormal::new(1.5, 3.0, -2.0, 5.0).unwrap();
        let mut rng = create_rng(11);
        let accepted = (0..20)
            .filter(|_| {
                let s = d.sample(1000, &mut rng);
                kolmogorov(&s, &d, 0.95).unwrap().binary_quality_measure
            })
            .count();
        assert!(accepted >= 15, "accepted {accepted} of 20");
    }

    #[test]
    fn test_rejects_shifted_distribution() {
        let d = TruncatedNormal::new(1.5, 3.0, -2.0, 5.0).unwrap();
        let other = TruncatedNormal::new(2.5, 3.0, -2.0, 5.0).unwrap();
        let mut rng = create_rng(12);
        let s = other.sample(1000, &mut rng);
        let r = kolmogorov(&s, &d, 0.95).unwrap();
        assert!(!r.binary_quality_measure, "p = {}", r.p_value);
        assert!(r.p_value < 1e-3);
    }

    #[test]
    fn test_invalid_inputs() {
        let d = Normal::new(0.0, 1.0).unwrap();
        let s = Sample::from_values(vec![0.1, 0.2]);
        assert!(kolmogorov(&s, &d, 1.0).is_err());
        assert!(kolmogorov(&s, &d, 0.0).is_err());
        assert!(kolmogorov(&Sample::from_values(vec![]), &d, 0.95).is_err());
        assert!(kolmogorov(&Sample::from_values(vec![f64::NAN]), &d, 0.95).is_err());
        let two = Sample::from_rows(&[vec![0.0, 1.0]]).unwrap();
        assert!(matches!(
            kolmogorov(&two, &d, 0.95),
            Err(DistributionError::InvalidDimension { expected: 1, got: 2 })
        ));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn survival_is_a_decreasing_probability(x in 0.0_f64..4.0, dx in 0.0_f64..1.0) {
            let q = kolmogorov_survival(x);
            prop_assert!((0.0..=1.0).contains(&q));
            prop_assert!(kolmogorov_survival(x + dx) <= q + 1e-9);
        }
    }
}
