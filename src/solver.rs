//! Bounded one-dimensional root finding.
//!
//! Both solvers work on a bracket and stop after
//! [`SolverConfig::max_iterations`] steps, returning
//! [`DistributionError::NonConvergence`] instead of looping.
//!
//! # Algorithms
//!
//! - [`brent`]: Brent's method (inverse quadratic interpolation, secant and
//!   bisection). Needs only function values.
//!   Reference: Brent (1973), *Algorithms for Minimization without
//!   Derivatives*, Chapter 4.
//! - [`newton_bisection`]: Newton–Raphson safeguarded by bisection, for
//!   monotone functions with a cheap derivative (CDF inversion, where the
//!   derivative is the density).
//!   Reference: Press et al. (2007), *Numerical Recipes*, 3rd ed., §9.4.

use log::{debug, warn};

use crate::config::SolverConfig;
use crate::error::{DistributionError, Result};

fn not_bracketed(lo: f64, hi: f64, flo: f64, fhi: f64) -> DistributionError {
    DistributionError::invalid(format!(
        "root not bracketed: f({lo}) = {flo}, f({hi}) = {fhi}"
    ))
}

fn non_finite(solver: &'static str, x: f64) -> DistributionError {
    DistributionError::invalid(format!("{solver}: function is not finite at {x}"))
}

/// Finds a root of `f` in `[lo, hi]` with Brent's method.
///
/// # Errors
/// - `InvalidArgument` if `f(lo)` and `f(hi)` have the same strict sign or a
///   function value is NaN.
/// - `NonConvergence` if the iteration budget is exhausted.
///
/// # Examples
/// ```
/// use u_probdist::config::SolverConfig;
/// use u_probdist::solver::brent;
/// let root = brent(|x| x * x - 2.0, 0.0, 2.0, &SolverConfig::default()).unwrap();
/// assert!((root - std::f64::consts::SQRT_2).abs() < 1e-12);
/// ```
pub fn brent<F>(mut f: F, lo: f64, hi: f64, config: &SolverConfig) -> Result<f64>
where
    F: FnMut(f64) -> f64,
{
    config.validate()?;
    let (mut a, mut b) = (lo, hi);
    let mut fa = f(a);
    let mut fb = f(b);
    if fa.is_nan() {
        return Err(non_finite("brent", a));
    }
    if fb.is_nan() {
        return Err(non_finite("brent", b));
    }
    if fa == 0.0 {
        return Ok(a);
    }
    if fb == 0.0 {
        return Ok(b);
    }
    if fa.signum() == fb.signum() {
        return Err(not_bracketed(lo, hi, fa, fb));
    }

    let mut c = b;
    let mut fc = fb;
    let mut d = b - a;
    let mut e = d;

    for iter in 0..config.max_iterations {
        if fb.signum() == fc.signum() {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }

        let tol = 0.5 * config.tolerance_at(b);
        let xm = 0.5 * (c - b);
        if xm.abs() <= tol || fb == 0.0 {
            debug!("brent: root {b} after {iter} iterations");
            return Ok(b);
        }

        if e.abs() >= tol && fa.abs() > fb.abs() {
            let s = fb / fa;
            let (mut p, mut q) = if a == c {
                (2.0 * xm * s, 1.0 - s)
            } else {
                let qa = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * xm * qa * (qa - r) - (b - a) * (r - 1.0)),
                    (qa - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            if p > 0.0 {
                q = -q;
            }
            p = p.abs();
            let min1 = 3.0 * xm * q - (tol * q).abs();
            let min2 = (e * q).abs();
            if 2.0 * p < min1.min(min2) {
                e = d;
                d = p / q;
            } else {
                d = xm;
                e = d;
            }
        } else {
            d = xm;
            e = d;
        }

        a = b;
        fa = fb;
        b += if d.abs() > tol { d } else { tol.copysign(xm) };
        fb = f(b);
        if fb.is_nan() {
            return Err(non_finite("brent", b));
        }
    }

    warn!(
        "brent: budget of {} iterations exhausted, residual {fb:e}",
        config.max_iterations
    );
    Err(DistributionError::NonConvergence {
        solver: "brent",
        iterations: config.max_iterations,
        residual: fb.abs(),
    })
}

/// Finds a root of `f` in `[lo, hi]` with Newton steps safeguarded by
/// bisection.
///
/// `f_df` returns the function value and its derivative. `guess` seeds the
/// first Newton step; a non-finite or out-of-bracket guess is replaced by the
/// midpoint. A Newton step that leaves the bracket, or does not halve the
/// previous step, is replaced by bisection, so the bracket always shrinks.
///
/// # Errors
/// - `InvalidArgument` if the root is not bracketed or `f` is not finite.
/// - `NonConvergence` if the iteration budget is exhausted.
///
/// # Examples
/// ```
/// use u_probdist::config::SolverConfig;
/// use u_probdist::solver::newton_bisection;
/// let root = newton_bisection(
///     |x| (x.exp() - 3.0, x.exp()),
///     0.0,
///     5.0,
///     1.0,
///     &SolverConfig::default(),
/// )
/// .unwrap();
/// assert!((root - 3.0_f64.ln()).abs() < 1e-13);
/// ```
pub fn newton_bisection<F>(
    mut f_df: F,
    lo: f64,
    hi: f64,
    guess: f64,
    config: &SolverConfig,
) -> Result<f64>
where
    F: FnMut(f64) -> (f64, f64),
{
    config.validate()?;
    let (flo, _) = f_df(lo);
    let (fhi, _) = f_df(hi);
    if !flo.is_finite() {
        return Err(non_finite("newton", lo));
    }
    if !fhi.is_finite() {
        return Err(non_finite("newton", hi));
    }
    if flo == 0.0 {
        return Ok(lo);
    }
    if fhi == 0.0 {
        return Ok(hi);
    }
    if flo.signum() == fhi.signum() {
        return Err(not_bracketed(lo, hi, flo, fhi));
    }

    // Orient so that f(xl) < 0 < f(xh).
    let (mut xl, mut xh) = if flo < 0.0 { (lo, hi) } else { (hi, lo) };
    let mut x = if guess.is_finite() && guess > lo.min(hi) && guess < lo.max(hi) {
        guess
    } else {
        0.5 * (lo + hi)
    };
    let mut dx_old = (hi - lo).abs();
    let mut dx = dx_old;
    let (mut fx, mut dfx) = f_df(x);
    if fx < 0.0 {
        xl = x;
    } else if fx > 0.0 {
        xh = x;
    }

    for iter in 0..config.max_iterations {
        if !fx.is_finite() {
            return Err(non_finite("newton", x));
        }
        if fx == 0.0 {
            debug!("newton: exact root {x} after {iter} iterations");
            return Ok(x);
        }

        let leaves_bracket = ((x - xh) * dfx - fx) * ((x - xl) * dfx - fx) > 0.0;
        let too_slow = (2.0 * fx).abs() > (dx_old * dfx).abs();
        if leaves_bracket || too_slow || !dfx.is_finite() {
            dx_old = dx;
            dx = 0.5 * (xh - xl);
            x = xl + dx;
        } else {
            dx_old = dx;
            dx = fx / dfx;
            x -= dx;
        }

        let tol = config.tolerance_at(x);
        if dx.abs() < tol || (xh - xl).abs() < tol {
            debug!("newton: root {x} after {} iterations", iter + 1);
            return Ok(x);
        }

        (fx, dfx) = f_df(x);
        if fx < 0.0 {
            xl = x;
        } else {
            xh = x;
        }
    }

    warn!(
        "newton: budget of {} iterations exhausted, residual {fx:e}",
        config.max_iterations
    );
    Err(DistributionError::NonConvergence {
        solver: "newton",
        iterations: config.max_iterations,
        residual: fx.abs(),
    })
}
