//! # u-probdist
//!
//! Probability distributions with a complete numerical evaluation contract.
//!
//! Every family implements [`Distribution`]: density and log-density,
//! cumulative, complementary and survival functions, their gradients with
//! respect to the parameters, quantile inversion, confidence regions,
//! moments, entropy, the characteristic function and sampling. The
//! relationships between these quantities are checked by [`validation`].
//!
//! ## Families
//!
//! - [`TruncatedNormal`] — N(μ, σ²) restricted to `[a, b]`, accurate far in
//!   the tails where the normalizing mass underflows `f64`
//! - [`Normal`] — the unbounded normal, closed form throughout
//!
//! ## Modules
//!
//! - [`distribution`] — The evaluation contract and its generic defaults
//! - [`special`] — Error functions and standard normal kernels in log space
//! - [`solver`] — Bracketed root finding for quantiles and confidence regions
//! - [`quadrature`] — Gauss–Legendre integration
//! - [`finite_diff`] — Central differences for gradient validation
//! - [`sample`], [`stats`] — Samples and their descriptive statistics
//! - [`fitting_test`] — Kolmogorov–Smirnov goodness of fit
//! - [`interval`], [`parameters`] — Value types of the contract
//! - [`random`] — Seeded generators
//!
//! ## Design Philosophy
//!
//! - **Numerical stability first**: log-space normalizing masses, Kahan
//!   summation, Welford moments
//! - **Errors are values**: invalid parameters, non-convergent solvers and
//!   unsupported operations are distinct [`DistributionError`] variants
//! - **Property-based testing**: Mathematical invariants verified via proptest
//!
//! # Examples
//! ```
//! use u_probdist::{Distribution, TruncatedNormal};
//!
//! let d = TruncatedNormal::new(1.5, 3.0, -2.0, 5.0).unwrap();
//! let ci = d.bilateral_confidence_interval(0.95).unwrap();
//! assert!((ci.probability - 0.95).abs() < 1e-10);
//! assert!(d.range().contains(d.mean()));
//! ```

pub mod config;
pub mod distribution;
pub mod error;
pub mod finite_diff;
pub mod fitting_test;
pub mod interval;
pub mod normal;
pub mod parameters;
pub mod quadrature;
pub mod random;
pub mod sample;
pub mod solver;
pub mod special;
pub mod stats;
pub mod truncated_normal;
pub mod validation;

pub use config::{QuadratureConfig, SolverConfig};
pub use distribution::Distribution;
pub use error::{DistributionError, Result};
pub use interval::{ConfidenceInterval, Interval, LevelSet, MinimumVolumeInterval, MinimumVolumeLevelSet};
pub use normal::Normal;
pub use parameters::ParameterCollection;
pub use sample::Sample;
pub use truncated_normal::TruncatedNormal;
