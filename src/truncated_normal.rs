//! Normal distribution truncated to a finite interval.
//!
//! `TruncatedNormal(μ, σ, a, b)` is N(μ, σ²) conditioned on `a ≤ X ≤ b`.
//! With standardized bounds `α = (a − μ)/σ`, `β = (b − μ)/σ` and the
//! normalizing mass `Z = Φ(β) − Φ(α)`:
//!
//! ```text
//! f(x) = φ(z) / (σ Z),   z = (x − μ)/σ,   a ≤ x ≤ b
//! F(x) = (Φ(z) − Φ(α)) / Z
//! ```
//!
//! # Numerical strategy
//!
//! Intervals far in a tail are the hard case: for `μ = 50, σ = 1, [3, 4]`
//! the mass `Z ≈ 1e-462` underflows `f64`, and `ln Z ≈ −1062.8` carries an
//! absolute rounding error of ~1e-13 that would leak into every ratio.
//!
//! - Probabilities are ratios of normal masses taken in log space
//!   ([`special::log_normal_mass`]).
//! - The density is normalized relative to its peak: with the *anchor*
//!   `z*` (the point of `[α, β]` closest to 0), `Z / φ(z*)` is an `O(1)`
//!   integral of `exp((z*² − z²)/2)`, computed by Gauss–Legendre quadrature
//!   over the effective support (where the density is above `e^{−745}` of
//!   its peak). `φ(z)/Z` then never forms a difference of large logs.
//! - Moments are integrated in offsets `u = z − z*` from the anchor with
//!   the same quadrature: `E[u]` first, then central moments of order 2–4
//!   about it. Offsets never subtract two nearby standardized values, so
//!   narrow supports keep their relative precision and far tails avoid the
//!   cancellation of the classical moment recurrence.
//! - The boundary terms `r_α − r_β` and `α r_α − β r_β` of the gradients
//!   and the entropy, with `r_α = φ(α)/Z`, `r_β = φ(β)/Z`, are factored
//!   through the larger ratio with `expm1`.
//!
//! Reference: Johnson, Kotz & Balakrishnan (1994), *Continuous Univariate
//! Distributions*, Vol. 1, §10.1.

use std::fmt;
use std::ops::{Add, Mul};

use log::{debug, warn};
use nalgebra::DVector;
use num_complex::Complex64;
use rand::{Rng, RngCore};
use rand_distr::{Exp1, StandardNormal};
use serde::{Deserialize, Serialize};

use crate::config::{QuadratureConfig, SolverConfig};
use crate::distribution::Distribution;
use crate::error::{check_dimension, check_probability, DistributionError, Result};
use crate::interval::{Interval, MinimumVolumeInterval};
use crate::parameters::ParameterCollection;
use crate::quadrature::GaussLegendre;
use crate::solver::{brent, newton_bisection};
use crate::special;

/// Below this normalizing mass, plain rejection from N(0, 1) is abandoned.
const NORMAL_REJECTION_MASS: f64 = 0.25;

/// Phase (in radians, or density log-variation) one quadrature panel covers.
const PANEL_SPAN: f64 = 8.0;

/// Log-density drop beyond which mass is ignored (`e^{−745}` underflows).
const NEGLIGIBLE_LOG_DENSITY: f64 = 745.0;

/// Distance from the anchor `m` at which `(z² − m²)/2` reaches
/// [`NEGLIGIBLE_LOG_DENSITY`].
fn negligible_distance(anchor: f64) -> f64 {
    let two_l = 2.0 * NEGLIGIBLE_LOG_DENSITY;
    two_l / (anchor.hypot(two_l.sqrt()) + anchor.abs())
}

/// `(m² − (m + u)²)/2`, the log-density at offset `u` from `m` relative to
/// its value at `m`.
fn log_drop(anchor: f64, u: f64) -> f64 {
    -0.5 * u * (2.0 * anchor + u)
}

/// Panel count for a Gauss–Legendre pass over the offsets `[lo, hi]` from
/// `anchor`: the log-density variation `(hi − lo)·max|z|` plus `phase`.
fn standardized_panels(anchor: f64, (lo, hi): (f64, f64), phase: f64) -> f64 {
    let steepness = (anchor + lo).abs().max((anchor + hi).abs()).max(1.0);
    ((phase + (hi - lo) * steepness) / PANEL_SPAN).ceil().max(1.0)
}

/// Rejection scheme, fixed at construction from the standardized bounds.
///
/// Reference: Robert (1995), "Simulation of truncated normal variables",
/// *Statistics and Computing* 5(2), pp. 121–125.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sampler {
    /// Draw N(0, 1) until it lands in `[α, β]`.
    NormalRejection,
    /// Translated exponential proposal on a one-sided tail interval.
    ExponentialTail,
    /// Uniform proposal, accepted against the density ratio to the mode.
    UniformRejection,
}

impl Sampler {
    fn choose(alpha: f64, beta: f64, log_mass: f64) -> Self {
        if log_mass >= NORMAL_REJECTION_MASS.ln() {
            return Sampler::NormalRejection;
        }
        let (lo, hi) = if alpha >= 0.0 {
            (alpha, beta)
        } else if beta <= 0.0 {
            (-beta, -alpha)
        } else {
            // Straddles the origin with little mass: the interval is narrow.
            return Sampler::UniformRejection;
        };
        if hi - lo < robert_uniform_width(lo) {
            Sampler::UniformRejection
        } else {
            Sampler::ExponentialTail
        }
    }
}

/// Width below which uniform rejection beats the exponential proposal on
/// `[lo, lo + width]`, `lo ≥ 0`.
fn robert_uniform_width(lo: f64) -> f64 {
    let root = (lo * lo + 4.0).sqrt();
    2.0 * std::f64::consts::E.sqrt() / (lo + root) * (0.25 * (lo * lo - lo * root)).exp()
}

/// Standard normal truncated to `[lo, hi]`, `0 ≤ lo < hi`, by rejection
/// from `lo + Exp(λ)` with the optimal rate `λ = (lo + √(lo² + 4))/2`.
fn exponential_tail(lo: f64, hi: f64, rng: &mut dyn RngCore) -> f64 {
    let lambda = 0.5 * (lo + (lo * lo + 4.0).sqrt());
    loop {
        let e: f64 = rng.sample(Exp1);
        let z = lo + e / lambda;
        if z > hi {
            continue;
        }
        let u: f64 = rng.random();
        if u <= (-0.5 * (z - lambda) * (z - lambda)).exp() {
            return z;
        }
    }
}

/// Normal distribution N(μ, σ²) truncated to `[a, b]`.
///
/// # Examples
/// ```
/// use u_probdist::distribution::Distribution;
/// use u_probdist::truncated_normal::TruncatedNormal;
///
/// let d = TruncatedNormal::new(1.5, 3.0, -2.0, 5.0).unwrap();
/// assert_eq!(d.cdf(-2.0), 0.0);
/// assert_eq!(d.cdf(5.0), 1.0);
/// let q = d.quantile(0.95).unwrap();
/// assert!((d.cdf(q) - 0.95).abs() < 1e-12);
///
/// // Far in the tail the normalizing mass underflows, the density does not.
/// let tail = TruncatedNormal::new(50.0, 1.0, 3.0, 4.0).unwrap();
/// assert!(tail.pdf(4.0) > 40.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TruncatedNormalParameters", into = "TruncatedNormalParameters")]
pub struct TruncatedNormal {
    mu: f64,
    sigma: f64,
    a: f64,
    b: f64,
    alpha: f64,
    beta: f64,
    /// ln(Φ(β) − Φ(α))
    log_mass: f64,
    /// Point of `[α, β]` closest to the origin; the density peaks there.
    anchor: f64,
    /// ln(Z / φ(anchor))
    log_anchor_mass: f64,
    /// Offsets from the anchor bounding all representable mass.
    offsets: (f64, f64),
    range: Interval,
    sampler: Sampler,
    solver: SolverConfig,
    quadrature: QuadratureConfig,
}

/// Serialized form of [`TruncatedNormal`]: the parameters only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TruncatedNormalParameters {
    pub mu: f64,
    pub sigma: f64,
    pub a: f64,
    pub b: f64,
}

impl TryFrom<TruncatedNormalParameters> for TruncatedNormal {
    type Error = DistributionError;

    fn try_from(p: TruncatedNormalParameters) -> Result<Self> {
        TruncatedNormal::new(p.mu, p.sigma, p.a, p.b)
    }
}

impl From<TruncatedNormal> for TruncatedNormalParameters {
    fn from(d: TruncatedNormal) -> Self {
        Self {
            mu: d.mu,
            sigma: d.sigma,
            a: d.a,
            b: d.b,
        }
    }
}

impl TruncatedNormal {
    /// Creates N(μ, σ²) truncated to `[a, b]`.
    ///
    /// # Errors
    /// Returns `Err` if a parameter is not finite, `sigma ≤ 0`, `a ≥ b`, or
    /// `[a, b]` is below the resolution of `f64` at `μ/σ`, so that the
    /// standardized bounds coincide.
    pub fn new(mu: f64, sigma: f64, a: f64, b: f64) -> Result<Self> {
        if ![mu, sigma, a, b].iter().all(|v| v.is_finite()) {
            return Err(DistributionError::invalid(format!(
                "TruncatedNormal requires finite parameters, got μ={mu}, σ={sigma}, a={a}, b={b}"
            )));
        }
        if sigma <= 0.0 {
            return Err(DistributionError::invalid(format!(
                "TruncatedNormal requires σ > 0, got σ={sigma}"
            )));
        }
        if a >= b {
            return Err(DistributionError::invalid(format!(
                "TruncatedNormal requires a < b, got a={a}, b={b}"
            )));
        }

        let d = Self::from_valid(mu, sigma, a, b);
        if d.alpha >= d.beta {
            return Err(DistributionError::invalid(format!(
                "TruncatedNormal: [{a}, {b}] collapses to a point once standardized by μ={mu}, σ={sigma}"
            )));
        }
        let finite = [d.alpha, d.beta, d.log_mass, d.log_anchor_mass];
        if !finite.iter().all(|v| v.is_finite()) {
            return Err(DistributionError::invalid(format!(
                "TruncatedNormal: standardized bounds α={}, β={} overflow f64 arithmetic",
                d.alpha, d.beta
            )));
        }
        debug!(
            "TruncatedNormal: α={}, β={}, ln Z={}, sampler {:?}",
            d.alpha, d.beta, d.log_mass, d.sampler
        );
        Ok(d)
    }

    /// Derived state for parameters already known to satisfy `σ > 0`,
    /// `a < b`.
    fn from_valid(mu: f64, sigma: f64, a: f64, b: f64) -> Self {
        let alpha = (a - mu) / sigma;
        let beta = (b - mu) / sigma;
        let log_mass = special::log_normal_mass(alpha, beta);

        let anchor = 0.0_f64.clamp(alpha, beta);
        let reach = negligible_distance(anchor);
        let offsets = ((alpha - anchor).max(-reach), (beta - anchor).min(reach));
        let panels = standardized_panels(anchor, offsets, 0.0) as usize;
        let relative_mass: f64 = GaussLegendre::get().integrate(
            |u| log_drop(anchor, u).exp(),
            offsets.0,
            offsets.1,
            panels,
        );

        Self {
            mu,
            sigma,
            a,
            b,
            alpha,
            beta,
            log_mass,
            anchor,
            log_anchor_mass: relative_mass.ln(),
            offsets,
            range: Interval::ordered(a, b),
            sampler: Sampler::choose(alpha, beta, log_mass),
            solver: SolverConfig::default(),
            quadrature: QuadratureConfig::default(),
        }
    }

    /// Replaces the root-finding configuration used by quantiles and
    /// minimum-volume intervals.
    pub fn with_solver_config(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    /// Replaces the panel budget of the characteristic function.
    pub fn with_quadrature_config(mut self, quadrature: QuadratureConfig) -> Self {
        self.quadrature = quadrature;
        self
    }

    pub fn mu(&self) -> f64 {
        self.mu
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn a(&self) -> f64 {
        self.a
    }

    pub fn b(&self) -> f64 {
        self.b
    }

    /// Natural log of the normalizing mass `Φ(β) − Φ(α)`.
    pub fn log_normalization(&self) -> f64 {
        self.log_mass
    }

    pub fn solver_config(&self) -> &SolverConfig {
        &self.solver
    }

    fn standardize(&self, x: f64) -> f64 {
        (x - self.mu) / self.sigma
    }

    /// `ln(φ(z)/Z)`, relative to the anchor.
    fn log_ratio(&self, z: f64) -> f64 {
        0.5 * (self.anchor - z) * (self.anchor + z) - self.log_anchor_mass
    }

    /// `φ(z)/Z`.
    fn ratio(&self, z: f64) -> f64 {
        self.log_ratio(z).exp()
    }

    /// `∫ g(u) φ(z* + u)/Z du` over the offsets `u` from the anchor `z*`
    /// that carry representable mass.
    fn integrate_offsets<T, G>(&self, mut g: G, panels: usize) -> T
    where
        T: Copy + Default + Add<Output = T> + Mul<f64, Output = T>,
        G: FnMut(f64) -> T,
    {
        let (lo, hi) = self.offsets;
        let anchor = self.anchor;
        let log_anchor_mass = self.log_anchor_mass;
        GaussLegendre::get().integrate(
            |u| g(u) * (log_drop(anchor, u) - log_anchor_mass).exp(),
            lo,
            hi,
            panels,
        )
    }

    fn panels(&self, phase: f64) -> f64 {
        standardized_panels(self.anchor, self.offsets, phase)
    }

    /// `P(α ≤ Z ≤ z)` for the standardized variable.
    fn lower_mass(&self, z: f64) -> f64 {
        (special::log_normal_mass(self.alpha, z) - self.log_mass).exp().min(1.0)
    }

    /// `P(z ≤ Z ≤ β)` for the standardized variable.
    fn upper_mass(&self, z: f64) -> f64 {
        (special::log_normal_mass(z, self.beta) - self.log_mass).exp().min(1.0)
    }

    /// `(r_α, r_β)`.
    fn boundary_ratios(&self) -> (f64, f64) {
        (self.ratio(self.alpha), self.ratio(self.beta))
    }

    /// `(r_α − r_β, α r_α − β r_β)`, factored through the larger ratio.
    ///
    /// With `d = −(β − α)(β + α)/2 = ln(r_β/r_α)`, `r_α − r_β = −r_α expm1(d)`,
    /// so a narrow support never subtracts two ratios close to `1/(β − α)`.
    fn boundary_differences(&self) -> (f64, f64) {
        let (alpha, beta) = (self.alpha, self.beta);
        let d = -0.5 * (beta - alpha) * (beta + alpha);
        if d <= 0.0 {
            let ra = self.ratio(alpha);
            let e = d.exp_m1();
            (-ra * e, ra * (alpha - beta - beta * e))
        } else {
            let rb = self.ratio(beta);
            let e = (-d).exp_m1();
            (rb * e, rb * (alpha - beta + alpha * e))
        }
    }

    fn in_open_support(&self, x: f64) -> bool {
        x > self.a && x < self.b
    }

    /// Probability of `[lo, hi]`.
    fn mass_between(&self, lo: f64, hi: f64) -> f64 {
        let l = self.standardize(lo.max(self.a));
        let h = self.standardize(hi.min(self.b));
        (special::log_normal_mass(l, h) - self.log_mass).exp().min(1.0)
    }

    /// `E[Z − z*]`.
    fn mean_offset(&self) -> f64 {
        self.integrate_offsets(|u| u, self.panels(0.0) as usize)
    }

    /// Central moments `(M₂, M₃, M₄)` of the standardized variable.
    fn standardized_moments(&self) -> (f64, f64, f64) {
        let shift = self.mean_offset();
        let panels = self.panels(0.0) as usize;
        let moment = |k: i32| -> f64 { self.integrate_offsets(|u: f64| (u - shift).powi(k), panels) };
        (moment(2), moment(3), moment(4))
    }

    /// Untruncated-normal inversion of the lower-tail probability `p`, used
    /// to seed Newton; the midpoint when it is not representable.
    fn quantile_guess(&self, p: f64) -> f64 {
        let base = special::standard_normal_cdf(self.alpha);
        let z = special::inverse_normal_cdf(base + p * self.log_mass.exp());
        let x = self.mu + self.sigma * z;
        if x.is_finite() {
            x
        } else {
            0.5 * (self.a + self.b)
        }
    }

    fn sample_standardized(&self, rng: &mut dyn RngCore) -> f64 {
        let (alpha, beta) = (self.alpha, self.beta);
        match self.sampler {
            Sampler::NormalRejection => loop {
                let z: f64 = rng.sample(StandardNormal);
                if z >= alpha && z <= beta {
                    return z;
                }
            },
            Sampler::ExponentialTail => {
                if alpha >= 0.0 {
                    exponential_tail(alpha, beta, rng)
                } else {
                    -exponential_tail(-beta, -alpha, rng)
                }
            }
            Sampler::UniformRejection => {
                let mode = 0.0_f64.clamp(alpha, beta);
                loop {
                    let z = alpha + (beta - alpha) * rng.random::<f64>();
                    let u: f64 = rng.random();
                    if u <= (0.5 * (mode * mode - z * z)).exp() {
                        return z;
                    }
                }
            }
        }
    }
}

impl Default for TruncatedNormal {
    /// `TruncatedNormal(0, 1, −1, 1)`.
    fn default() -> Self {
        Self::from_valid(0.0, 1.0, -1.0, 1.0)
    }
}

impl fmt::Display for TruncatedNormal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.parameters())
    }
}

impl Distribution for TruncatedNormal {
    fn name(&self) -> &'static str {
        "TruncatedNormal"
    }

    fn parameters(&self) -> ParameterCollection {
        ParameterCollection::from_pairs(
            "TruncatedNormal",
            &[("mu", self.mu), ("sigma", self.sigma), ("a", self.a), ("b", self.b)],
        )
    }

    /// Keeps the solver and quadrature configuration of `self`.
    fn with_parameters(&self, values: &[f64]) -> Result<Self> {
        check_dimension(4, values.len())?;
        Ok(TruncatedNormal::new(values[0], values[1], values[2], values[3])?
            .with_solver_config(self.solver)
            .with_quadrature_config(self.quadrature))
    }

    fn range(&self) -> Interval {
        self.range
    }

    fn pdf(&self, x: f64) -> f64 {
        self.log_pdf(x).exp()
    }

    fn log_pdf(&self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        if x < self.a || x > self.b {
            return f64::NEG_INFINITY;
        }
        self.log_ratio(self.standardize(x)) - self.sigma.ln()
    }

    fn ddf(&self, x: f64) -> f64 {
        -self.standardize(x) / self.sigma * self.pdf(x)
    }

    fn cdf(&self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        if x <= self.a {
            return 0.0;
        }
        if x >= self.b {
            return 1.0;
        }
        let z = self.standardize(x);
        let lower = self.lower_mass(z);
        if lower <= 0.5 {
            lower
        } else {
            1.0 - self.upper_mass(z)
        }
    }

    fn complementary_cdf(&self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        if x <= self.a {
            return 1.0;
        }
        if x >= self.b {
            return 0.0;
        }
        let z = self.standardize(x);
        let upper = self.upper_mass(z);
        if upper <= 0.5 {
            upper
        } else {
            1.0 - self.lower_mass(z)
        }
    }

    /// Safeguarded Newton on `[a, b]` with the density as derivative.
    fn quantile_with_tail(&self, p: f64, tail: bool) -> Result<f64> {
        check_probability(p)?;
        if p == 0.0 {
            return Ok(if tail { self.b } else { self.a });
        }
        if p == 1.0 {
            return Ok(if tail { self.a } else { self.b });
        }
        let x = if tail {
            let guess = self.quantile_guess(1.0 - p);
            newton_bisection(
                |x| (p - self.complementary_cdf(x), self.pdf(x)),
                self.a,
                self.b,
                guess,
                &self.solver,
            )?
        } else {
            let guess = self.quantile_guess(p);
            newton_bisection(
                |x| (self.cdf(x) - p, self.pdf(x)),
                self.a,
                self.b,
                guess,
                &self.solver,
            )?
        };
        Ok(x.clamp(self.a, self.b))
    }

    /// `f · ∇ln f`; zero outside `(a, b)`.
    fn pdf_gradient(&self, x: f64) -> DVector<f64> {
        if !self.in_open_support(x) {
            return DVector::zeros(4);
        }
        self.log_pdf_gradient(x) * self.pdf(x)
    }

    /// ```text
    /// ∂/∂μ = (z − (r_α − r_β)) / σ
    /// ∂/∂σ = (z² − 1 − (α r_α − β r_β)) / σ
    /// ∂/∂a = r_α / σ
    /// ∂/∂b = −r_β / σ
    /// ```
    fn log_pdf_gradient(&self, x: f64) -> DVector<f64> {
        if !self.in_open_support(x) {
            return DVector::zeros(4);
        }
        let z = self.standardize(x);
        let (ra, rb) = self.boundary_ratios();
        let (dr, dzr) = self.boundary_differences();
        let s = self.sigma;
        DVector::from_vec(vec![
            (z - dr) / s,
            (z * z - 1.0 - dzr) / s,
            ra / s,
            -rb / s,
        ])
    }

    /// With `r_z = φ(z)/Z`:
    ///
    /// ```text
    /// ∂F/∂μ = ((r_α − r_z) − F (r_α − r_β)) / σ
    /// ∂F/∂σ = ((α r_α − z r_z) − F (α r_α − β r_β)) / σ
    /// ∂F/∂a = −(1 − F) r_α / σ
    /// ∂F/∂b = −F r_β / σ
    /// ```
    fn cdf_gradient(&self, x: f64) -> DVector<f64> {
        if !self.in_open_support(x) {
            return DVector::zeros(4);
        }
        let z = self.standardize(x);
        let (ra, rb) = self.boundary_ratios();
        let (dr, dzr) = self.boundary_differences();
        let rz = self.ratio(z);
        let f = self.cdf(x);
        let q = self.complementary_cdf(x);
        let s = self.sigma;
        DVector::from_vec(vec![
            ((ra - rz) - f * dr) / s,
            ((self.alpha * ra - z * rz) - f * dzr) / s,
            -q * ra / s,
            -f * rb / s,
        ])
    }

    /// `e^{it(μ + σz*)} ∫ e^{itσu} φ(z* + u)/Z du` by composite
    /// Gauss–Legendre quadrature over the offsets from the anchor.
    ///
    /// # Errors
    /// - `InvalidArgument` if `t` is not finite.
    /// - `Unsupported` when the oscillation at `t` needs more panels than
    ///   [`QuadratureConfig::max_panels`] allows.
    fn characteristic_function(&self, t: f64) -> Result<Complex64> {
        if !t.is_finite() {
            return Err(DistributionError::invalid(format!(
                "characteristic function needs a finite argument, got {t}"
            )));
        }
        let (lo, hi) = self.offsets;
        let panels = self.panels((t * self.sigma * (hi - lo)).abs());
        if panels > self.quadrature.max_panels as f64 {
            warn!(
                "TruncatedNormal: characteristic function at t={t} needs {panels} panels, budget {}",
                self.quadrature.max_panels
            );
            return Err(DistributionError::Unsupported(format!(
                "TruncatedNormal characteristic function at t = {t} exceeds the quadrature budget of {} panels",
                self.quadrature.max_panels
            )));
        }
        let st = t * self.sigma;
        let centered: Complex64 =
            self.integrate_offsets(|u| Complex64::from_polar(1.0, st * u), panels as usize);
        let origin = self.mu + self.sigma * self.anchor;
        Ok(Complex64::from_polar(1.0, t * origin) * centered)
    }

    /// `μ + σ(z* + E[Z − z*])`, kept in `[a, b]` under rounding.
    fn mean(&self) -> f64 {
        let z = self.anchor + self.mean_offset();
        (self.mu + self.sigma * z).clamp(self.a, self.b)
    }

    fn standard_deviation(&self) -> f64 {
        let (m2, _, _) = self.standardized_moments();
        self.sigma * m2.sqrt()
    }

    fn skewness(&self) -> f64 {
        let (m2, m3, _) = self.standardized_moments();
        m3 / m2.powf(1.5)
    }

    fn kurtosis(&self) -> f64 {
        let (m2, _, m4) = self.standardized_moments();
        m4 / (m2 * m2)
    }

    /// `ln(√(2πe) σ Z) + (α r_α − β r_β)/2`, with `ln Z` split as
    /// `ln φ(z*) + ln(Z/φ(z*))`.
    fn entropy(&self) -> f64 {
        let (_, dzr) = self.boundary_differences();
        0.5 + self.sigma.ln() + self.log_anchor_mass + 0.5 * (dzr - self.anchor * self.anchor)
    }

    fn realization(&self, rng: &mut dyn RngCore) -> f64 {
        let z = self.sample_standardized(rng);
        (self.mu + self.sigma * z).clamp(self.a, self.b)
    }

    /// The density is the normal shape clipped to `[a, b]`, so its
    /// super-level sets are `[μ − h, μ + h] ∩ [a, b]`; `h` is found by
    /// Brent's method on the enclosed mass.
    fn minimum_volume_interval(&self, p: f64) -> Result<MinimumVolumeInterval> {
        check_probability(p)?;
        let mode = self.mu.clamp(self.a, self.b);
        if p == 0.0 {
            return Ok(MinimumVolumeInterval {
                interval: Interval::new(mode, mode)?,
                threshold: self.pdf(mode),
                probability: 0.0,
            });
        }

        let bounds = |h: f64| ((self.mu - h).max(self.a), (self.mu + h).min(self.b));
        let h_min = (self.mu - mode).abs();
        let h_max = (self.mu - self.a).abs().max((self.b - self.mu).abs());
        let h = if p == 1.0 {
            h_max
        } else {
            brent(
                |h| {
                    let (lo, hi) = bounds(h);
                    self.mass_between(lo, hi) - p
                },
                h_min,
                h_max,
                &self.solver,
            )?
        };

        let (lo, hi) = bounds(h);
        let hi = hi.max(lo);
        Ok(MinimumVolumeInterval {
            interval: Interval::new(lo, hi)?,
            threshold: self.pdf(lo).min(self.pdf(hi)),
            probability: self.mass_between(lo, hi),
        })
    }

    /// True only when `μ` is the midpoint of `[a, b]`.
    fn is_elliptical(&self) -> bool {
        let scale = self.a.abs().max(self.b.abs()).max(1.0);
        (self.mu - 0.5 * (self.a + self.b)).abs() <= f64::EPSILON * scale
    }

    /// `TruncatedNormal(0, 1, α, β)`. Standardizing `(α, β)` again is the
    /// identity, so the derived state is as valid as that of `self`.
    fn standard_representative(&self) -> Box<dyn Distribution> {
        Box::new(
            Self::from_valid(0.0, 1.0, self.alpha, self.beta)
                .with_solver_config(self.solver)
                .with_quadrature_config(self.quadrature),
        )
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_truncated_normal() -> impl Strategy<Value = TruncatedNormal> {
        (-10.0_f64..10.0, 0.1_f64..5.0, -20.0_f64..20.0, 0.01_f64..20.0).prop_map(
            |(mu, sigma, a, width)| TruncatedNormal::new(mu, sigma, a, a + width).unwrap(),
        )
    }

    /// Supports down to 1e-12 σ wide, placed up to 40 σ into either tail.
    fn arb_hard_truncated_normal() -> impl Strategy<Value = TruncatedNormal> {
        (-10.0_f64..10.0, 0.1_f64..5.0, -40.0_f64..40.0, -12.0_f64..1.0).prop_map(
            |(mu, sigma, offset, log_width)| {
                let a = mu + sigma * offset;
                TruncatedNormal::new(mu, sigma, a, a + sigma * 10f64.powf(log_width)).unwrap()
            },
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn hard_moments_stay_within_support(d in arb_hard_truncated_normal()) {
            let m = d.mean();
            prop_assert!(m >= d.a() && m <= d.b(), "{} mean {}", d, m);
            // A truncated normal is never more spread out than the uniform law
            // on its (standardized) support.
            let uniform_sd = d.sigma() * (d.beta - d.alpha) / 12f64.sqrt();
            let s = d.standard_deviation();
            prop_assert!(s > 0.0 && s <= uniform_sd * (1.0 + 1e-9), "{} sd {} vs {}", d, s, uniform_sd);
            prop_assert!(d.kurtosis() > 1.0, "{} kurtosis {}", d, d.kurtosis());
        }

        #[test]
        fn hard_realizations_in_support(d in arb_hard_truncated_normal(), seed in 0_u64..1000) {
            let mut rng = crate::random::create_rng(seed);
            for _ in 0..20 {
                prop_assert!(d.range().contains(d.realization(&mut rng)));
            }
        }

        #[test]
        fn cdf_is_monotone(d in arb_truncated_normal(), u in 0.0_f64..1.0, v in 0.0_f64..1.0) {
            let (lo, hi) = if u <= v { (u, v) } else { (v, u) };
            let x = d.a() + lo * (d.b() - d.a());
            let y = d.a() + hi * (d.b() - d.a());
            prop_assert!(d.cdf(x) <= d.cdf(y) + 1e-12);
        }

        #[test]
        fn quantile_roundtrip(d in arb_truncated_normal(), p in 0.001_f64..0.999) {
            let q = d.quantile(p).unwrap();
            prop_assert!(d.range().contains(q));
            prop_assert!((d.cdf(q) - p).abs() < 1e-9, "{} p={} q={}", d, p, q);
            let s = d.inverse_survival_function(p).unwrap();
            prop_assert!((d.survival_function(s) - p).abs() < 1e-9);
        }

        #[test]
        fn moments_are_within_support(d in arb_truncated_normal()) {
            let m = d.mean();
            prop_assert!(m >= d.a() && m <= d.b(), "{} mean {}", d, m);
            let s = d.standard_deviation();
            prop_assert!(s > 0.0 && s <= 0.5 * (d.b() - d.a()) * (1.0 + 1e-9));
        }

        #[test]
        fn realizations_in_support(d in arb_truncated_normal(), seed in 0_u64..1000) {
            let mut rng = crate::random::create_rng(seed);
            for _ in 0..20 {
                prop_assert!(d.range().contains(d.realization(&mut rng)));
            }
        }
    }
}
