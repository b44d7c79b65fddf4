//! Special mathematical functions.
//!
//! Error functions and standard normal building blocks, with log-space
//! variants that stay accurate where `Φ` itself underflows. The truncated
//! normal relies on these for masses such as `Φ(-46) − Φ(-47) ≈ 1e-463`,
//! which are far below `f64::MIN_POSITIVE` but have perfectly ordinary
//! logarithms.

use std::f64::consts::{FRAC_1_SQRT_2, LN_2, PI, SQRT_2};

/// 1/√(2π) ≈ 0.3989422804014327
pub const FRAC_1_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

/// ln √(2π) ≈ 0.9189385332046728
pub const LN_SQRT_2PI: f64 = 0.918_938_533_204_672_7;

/// Below this argument `ln Φ(x)` switches to the scaled complementary error
/// function.
const LOG_CDF_TAIL: f64 = -5.0;

/// From this argument on `erfcx` uses its continued fraction.
const ERFCX_CF_THRESHOLD: f64 = 6.0;

// ============================================================================
// Error Function
// ============================================================================

/// Error function erf(x).
///
/// # Definition
/// ```text
/// erf(x) = (2/√π) ∫₀ˣ exp(-t²) dt
/// ```
///
/// Delegates to the rational approximations of `statrs` (ported from Boost),
/// accurate to a few ulps over the whole real line.
///
/// # Examples
/// ```
/// use u_probdist::special::erf;
/// assert!(erf(0.0).abs() < 1e-15);
/// assert!((erf(1.0) - 0.8427007929497149).abs() < 1e-15);
/// ```
pub fn erf(x: f64) -> f64 {
    statrs::function::erf::erf(x)
}

/// Complementary error function erfc(x) = 1 − erf(x).
///
/// Relative accuracy is preserved in the right tail, unlike `1.0 - erf(x)`.
///
/// # Examples
/// ```
/// use u_probdist::special::erfc;
/// assert!((erfc(0.0) - 1.0).abs() < 1e-15);
/// assert!((erfc(5.0) - 1.5374597944280349e-12).abs() < 1e-25);
/// ```
pub fn erfc(x: f64) -> f64 {
    statrs::function::erf::erfc(x)
}

/// Scaled complementary error function erfcx(x) = exp(x²)·erfc(x).
///
/// # Algorithm
/// - `x < 6`: direct product, using the reflection
///   `erfcx(x) = 2exp(x²) − erfcx(−x)` for negative arguments.
/// - `x ≥ 6`: Laplace continued fraction
///   `erfcx(x) = 1/(√π (x + ½/(x + 1/(x + (3/2)/(x + …)))))`,
///   evaluated with the modified Lentz algorithm.
///
/// Reference: Abramowitz & Stegun (1964), formula 7.1.14.
///
/// # Examples
/// ```
/// use u_probdist::special::erfcx;
/// assert!((erfcx(0.0) - 1.0).abs() < 1e-15);
/// // erfcx(x) ~ 1/(x√π) for large x
/// let x = 1e4;
/// assert!((erfcx(x) * x * std::f64::consts::PI.sqrt() - 1.0).abs() < 1e-8);
/// ```
pub fn erfcx(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x < 0.0 {
        return 2.0 * (x * x).exp() - erfcx(-x);
    }
    if x < ERFCX_CF_THRESHOLD {
        return (x * x).exp() * erfc(x);
    }
    if x == f64::INFINITY {
        return 0.0;
    }

    const MAX_ITER: usize = 500;
    const EPS: f64 = 1e-16;
    const TINY: f64 = 1e-300;

    let mut f = x;
    let mut c = f;
    let mut d = 0.0;
    for j in 1..=MAX_ITER {
        let a = j as f64 / 2.0;
        d = x + a * d;
        if d.abs() < TINY {
            d = TINY;
        }
        c = x + a / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        let delta = c * d;
        f *= delta;
        if (delta - 1.0).abs() < EPS {
            break;
        }
    }
    1.0 / (PI.sqrt() * f)
}

// ============================================================================
// Standard Normal
// ============================================================================

/// Standard normal PDF φ(x) = (1/√(2π)) exp(-x²/2).
///
/// # Examples
/// ```
/// use u_probdist::special::standard_normal_pdf;
/// let peak = standard_normal_pdf(0.0);
/// assert!((peak - 0.3989422804014327).abs() < 1e-15);
/// ```
pub fn standard_normal_pdf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    FRAC_1_SQRT_2PI * (-0.5 * x * x).exp()
}

/// ln φ(x) = −x²/2 − ln √(2π).
pub fn log_standard_normal_pdf(x: f64) -> f64 {
    -0.5 * x * x - LN_SQRT_2PI
}

/// Standard normal CDF Φ(x) = P(Z ≤ x) for Z ~ N(0,1).
///
/// Computed as `½·erfc(−x/√2)`, which keeps full relative accuracy in the
/// left tail.
///
/// # Examples
/// ```
/// use u_probdist::special::standard_normal_cdf;
/// assert!((standard_normal_cdf(0.0) - 0.5).abs() < 1e-15);
/// assert!((standard_normal_cdf(1.96) - 0.9750021048517795).abs() < 1e-14);
/// ```
pub fn standard_normal_cdf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    0.5 * erfc(-x * FRAC_1_SQRT_2)
}

/// Natural log of the standard normal CDF, ln Φ(x).
///
/// Finite for every finite `x`: deep in the left tail it is evaluated as
/// `−x²/2 − ln 2 + ln erfcx(−x/√2)`; in the right half as `ln(1 − Q(x))`
/// through `ln_1p`.
///
/// # Examples
/// ```
/// use u_probdist::special::log_standard_normal_cdf;
/// // Φ(-40) underflows nothing in log space
/// let l = log_standard_normal_cdf(-40.0);
/// assert!(l.is_finite() && l < -800.0);
/// ```
pub fn log_standard_normal_cdf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    if x < LOG_CDF_TAIL {
        let t = -x * FRAC_1_SQRT_2;
        -0.5 * x * x - LN_2 + erfcx(t).ln()
    } else if x < 0.0 {
        standard_normal_cdf(x).ln()
    } else {
        (-0.5 * erfc(x * FRAC_1_SQRT_2)).ln_1p()
    }
}

/// Inverse of the standard normal CDF (quantile function).
///
/// Given a probability `p ∈ (0, 1)`, returns `z` such that `Φ(z) = p`,
/// through `Φ⁻¹(p) = −√2·erfc⁻¹(2p)`.
///
/// # Returns
/// - `f64::NAN` if `p` is outside `[0, 1]` or NaN.
/// - `f64::NEG_INFINITY` if `p == 0.0`.
/// - `f64::INFINITY` if `p == 1.0`.
///
/// # Examples
/// ```
/// use u_probdist::special::inverse_normal_cdf;
/// assert!(inverse_normal_cdf(0.5).abs() < 1e-15);
/// assert!((inverse_normal_cdf(0.975) - 1.959963984540054).abs() < 1e-12);
/// ```
pub fn inverse_normal_cdf(p: f64) -> f64 {
    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    if p == 0.0 {
        return f64::NEG_INFINITY;
    }
    if p == 1.0 {
        return f64::INFINITY;
    }
    -SQRT_2 * statrs::function::erf::erfc_inv(2.0 * p)
}

// ============================================================================
// Log-space helpers
// ============================================================================

/// ln(exp(u) − exp(v)) for `u ≥ v`, without leaving log space.
///
/// Returns `-inf` when `u == v` (empty difference).
///
/// # Examples
/// ```
/// use u_probdist::special::log_sub_exp;
/// let r = log_sub_exp(3.0_f64.ln(), 1.0_f64.ln());
/// assert!((r - 2.0_f64.ln()).abs() < 1e-15);
/// ```
pub fn log_sub_exp(u: f64, v: f64) -> f64 {
    if v == f64::NEG_INFINITY {
        return u;
    }
    if u <= v {
        return f64::NEG_INFINITY;
    }
    u + (-(v - u).exp_m1()).ln()
}

/// ln(Φ(hi) − Φ(lo)), the log standard normal mass of `[lo, hi]`.
///
/// The interval is reflected into the left tail when it lies right of the
/// origin, so that no difference of two numbers close to one is ever formed.
/// Intervals straddling the origin add two positive `erf` terms.
///
/// # Examples
/// ```
/// use u_probdist::special::log_normal_mass;
/// assert!((log_normal_mass(f64::NEG_INFINITY, f64::INFINITY)).abs() < 1e-15);
/// // Mass of [46, 47] is ~1e-463: not representable, but its log is.
/// let l = log_normal_mass(46.0, 47.0);
/// assert!(l.is_finite() && l < -1000.0);
/// ```
pub fn log_normal_mass(lo: f64, hi: f64) -> f64 {
    if lo.is_nan() || hi.is_nan() {
        return f64::NAN;
    }
    if lo >= hi {
        return f64::NEG_INFINITY;
    }
    if lo >= 0.0 {
        log_sub_exp(log_standard_normal_cdf(-lo), log_standard_normal_cdf(-hi))
    } else if hi <= 0.0 {
        log_sub_exp(log_standard_normal_cdf(hi), log_standard_normal_cdf(lo))
    } else {
        (0.5 * (erf(hi * FRAC_1_SQRT_2) + erf(-lo * FRAC_1_SQRT_2))).ln()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- erf / erfc / erfcx ---

    #[test]
    fn test_erf_known_values() {
        assert!((erf(0.5) - 0.5204998778130465).abs() < 1e-15);
        assert!((erf(-1.0) + 0.8427007929497149).abs() < 1e-15);
        assert!((erfc(2.0) - 0.004677734981047266).abs() < 1e-17);
    }

    #[test]
    fn test_erfcx_matches_definition_in_moderate_range() {
        for &x in &[0.0, 0.3, 1.0, 2.5, 4.0, 5.5] {
            let direct = erfc(x) * (x * x).exp();
            assert!(
                (erfcx(x) - direct).abs() < 1e-13 * direct,
                "erfcx({x}) = {} vs {direct}",
                erfcx(x)
            );
        }
    }

    #[test]
    fn test_erfcx_continuous_at_switch() {
        let below = erfcx(ERFCX_CF_THRESHOLD - 1e-12);
        let above = erfcx(ERFCX_CF_THRESHOLD);
        assert!(
            (below - above).abs() < 1e-12 * above,
            "discontinuity at switch: {below} vs {above}"
        );
    }

    #[test]
    fn test_erfcx_asymptotic() {
        // erfcx(x) ≈ (1/(x√π))(1 − 1/(2x²) + 3/(4x⁴))
        let x: f64 = 30.0;
        let approx = (1.0 - 0.5 / (x * x) + 0.75 / x.powi(4)) / (x * PI.sqrt());
        assert!((erfcx(x) - approx).abs() < 1e-9 * approx);
    }

    #[test]
    fn test_erfcx_negative_reflection() {
        let x = -1.5;
        let direct = erfc(x) * (x * x).exp();
        assert!((erfcx(x) - direct).abs() < 1e-13 * direct);
    }

    // --- standard normal ---

    #[test]
    fn test_cdf_known_values() {
        assert!((standard_normal_cdf(1.0) - 0.8413447460685429).abs() < 1e-15);
        assert!((standard_normal_cdf(-3.0) - 0.0013498980316300946).abs() < 1e-17);
        assert!((standard_normal_cdf(-10.0) - 7.619853024160527e-24).abs() < 1e-36);
    }

    #[test]
    fn test_cdf_extremes() {
        assert_eq!(standard_normal_cdf(f64::INFINITY), 1.0);
        assert_eq!(standard_normal_cdf(f64::NEG_INFINITY), 0.0);
        assert!(standard_normal_cdf(f64::NAN).is_nan());
    }

    #[test]
    fn test_log_cdf_agrees_with_cdf() {
        for &x in &[-30.0, -8.0, -5.0, -4.999, -1.0, 0.0, 0.5, 3.0] {
            let expected = standard_normal_cdf(x).ln();
            let got = log_standard_normal_cdf(x);
            assert!(
                (got - expected).abs() < 1e-12 * expected.abs() + 1e-15,
                "ln Φ({x}) = {got}, expected {expected}"
            );
        }
    }

    #[test]
    fn test_log_cdf_deep_tail() {
        // ln Φ(x) = −x²/2 − ln(−x) − ln√(2π) + ln(1 − 1/x² + …)
        let x: f64 = -100.0;
        let approx = -0.5 * x * x - (-x).ln() - LN_SQRT_2PI + (1.0 - 1.0 / (x * x)).ln();
        assert!((log_standard_normal_cdf(x) - approx).abs() < 1e-7);
    }

    #[test]
    fn test_inverse_normal_cdf_extremes() {
        assert_eq!(inverse_normal_cdf(0.0), f64::NEG_INFINITY);
        assert_eq!(inverse_normal_cdf(1.0), f64::INFINITY);
        assert!(inverse_normal_cdf(-0.1).is_nan());
        assert!(inverse_normal_cdf(f64::NAN).is_nan());
    }

    #[test]
    fn test_inverse_normal_cdf_tail_precision() {
        let p = 1e-200;
        let z = inverse_normal_cdf(p);
        let back = log_standard_normal_cdf(z);
        assert!((back - p.ln()).abs() < 1e-10 * p.ln().abs());
    }

    // --- log-space helpers ---

    #[test]
    fn test_log_sub_exp_edge_cases() {
        assert_eq!(log_sub_exp(1.0, f64::NEG_INFINITY), 1.0);
        assert_eq!(log_sub_exp(1.0, 1.0), f64::NEG_INFINITY);
        assert_eq!(log_sub_exp(0.0, 1.0), f64::NEG_INFINITY);
    }

    #[test]
    fn test_log_normal_mass_matches_direct() {
        let cases = [(-1.0, 1.0), (-3.0, -1.0), (0.5, 2.0), (-0.1, 4.0), (1e-3, 2e-3)];
        for &(lo, hi) in &cases {
            let direct = standard_normal_cdf(hi) - standard_normal_cdf(lo);
            let got = log_normal_mass(lo, hi).exp();
            assert!(
                (got - direct).abs() < 1e-12 * direct,
                "mass[{lo}, {hi}] = {got}, expected {direct}"
            );
        }
    }

    #[test]
    fn test_log_normal_mass_symmetric() {
        let l = log_normal_mass(-47.0, -46.0);
        let r = log_normal_mass(46.0, 47.0);
        assert!((l - r).abs() < 1e-12 * l.abs());
        assert_eq!(log_normal_mass(2.0, 2.0), f64::NEG_INFINITY);
    }
}
