//! Central finite differences.
//!
//! Analytic parameter gradients are validated against these approximations;
//! the truncation error of a central difference with step `ε` is `O(ε²)`.
//!
//! The differencing itself is [`finitediff::FiniteDiff::central_diff`]. It
//! perturbs each coordinate by a fixed `√ε_mach`, so the caller's point is
//! reached through offsets scaled to make that an `eps` step. Errors raised
//! by the differentiated function are captured in a `RefCell` while
//! `finitediff` runs and surfaced afterwards.

use std::cell::RefCell;

use finitediff::FiniteDiff;
use nalgebra::DVector;

use crate::error::{DistributionError, Result};

/// Default step used by the validation protocol.
pub const DEFAULT_STEP: f64 = 1e-5;

/// Central difference `(f(x + ε) − f(x − ε)) / 2ε` of a scalar function.
///
/// Returns `NaN` when `eps` is not a positive finite step.
///
/// # Examples
/// ```
/// use u_probdist::finite_diff::central_difference;
/// let d = central_difference(|x| x.sin(), 0.3, 1e-5);
/// assert!((d - 0.3_f64.cos()).abs() < 1e-9);
/// ```
pub fn central_difference<F>(f: F, x: f64, eps: f64) -> f64
where
    F: Fn(f64) -> f64,
{
    central_gradient(&[x], eps, |p| Ok(f(p[0])))
        .map(|g| g[0])
        .unwrap_or(f64::NAN)
}

/// Central-difference gradient of a fallible function of a parameter vector.
///
/// Each coordinate `i` is perturbed by `±ε` while the others stay fixed. The
/// first error raised by `f` at a perturbed point (e.g. a constructor
/// rejecting the perturbed parameters) is propagated.
///
/// # Errors
/// `InvalidArgument` if `eps` is not a positive finite number, or whatever
/// `f` returns.
///
/// # Examples
/// ```
/// use u_probdist::finite_diff::central_gradient;
/// let g = central_gradient(&[1.0, 2.0], 1e-5, |p| Ok(p[0] * p[1] * p[1])).unwrap();
/// assert!((g[0] - 4.0).abs() < 1e-8);
/// assert!((g[1] - 4.0).abs() < 1e-8);
/// ```
pub fn central_gradient<F>(params: &[f64], eps: f64, f: F) -> Result<DVector<f64>>
where
    F: Fn(&[f64]) -> Result<f64>,
{
    if !(eps.is_finite() && eps > 0.0) {
        return Err(DistributionError::invalid(format!(
            "finite-difference step must be positive, got {eps}"
        )));
    }
    let scale = eps / f64::EPSILON.sqrt();
    let closure_err: RefCell<Option<DistributionError>> = RefCell::new(None);
    let shifted = |offsets: &Vec<f64>| -> f64 {
        let point: Vec<f64> = params.iter().zip(offsets).map(|(p, o)| p + o * scale).collect();
        match f(point.as_slice()) {
            Ok(val) => val,
            Err(e) => {
                let mut slot = closure_err.borrow_mut();
                if slot.is_none() {
                    *slot = Some(e);
                }
                f64::NAN
            }
        }
    };
    let fd_grad = vec![0.0; params.len()].central_diff(&shifted);
    if let Some(err) = closure_err.take() {
        return Err(err);
    }
    Ok(DVector::from_iterator(fd_grad.len(), fd_grad.into_iter().map(|g| g / scale)))
}
