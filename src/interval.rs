//! Intervals, level sets and the structured results of confidence-region
//! queries.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DistributionError, Result};

/// Closed interval `[lower, upper]`; either bound may be infinite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    lower: f64,
    upper: f64,
}

impl Interval {
    /// # Errors
    /// Returns `Err` if a bound is NaN or `lower > upper`.
    pub fn new(lower: f64, upper: f64) -> Result<Self> {
        if lower.is_nan() || upper.is_nan() || lower > upper {
            return Err(DistributionError::invalid(format!(
                "interval requires lower <= upper, got [{lower}, {upper}]"
            )));
        }
        Ok(Self { lower, upper })
    }

    /// Bounds already known to satisfy `lower <= upper`.
    pub(crate) fn ordered(lower: f64, upper: f64) -> Self {
        debug_assert!(lower <= upper);
        Self { lower, upper }
    }

    /// The whole real line.
    pub fn real_line() -> Self {
        Self {
            lower: f64::NEG_INFINITY,
            upper: f64::INFINITY,
        }
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    pub fn contains(&self, x: f64) -> bool {
        x >= self.lower && x <= self.upper
    }

    /// Length of the interval (its one-dimensional volume).
    pub fn volume(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn is_finite(&self) -> bool {
        self.lower.is_finite() && self.upper.is_finite()
    }

    /// Intersection, or `None` when the intervals are disjoint.
    pub fn intersect(&self, other: &Interval) -> Option<Interval> {
        let lower = self.lower.max(other.lower);
        let upper = self.upper.min(other.upper);
        (lower <= upper).then_some(Interval { lower, upper })
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lower, self.upper)
    }
}

/// Density super-level set `{x : −ln f(x) ≤ level}`.
///
/// For the unimodal families of this crate the set is an interval, stored
/// as `bounds`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelSet {
    /// Level on the negative log-density scale.
    pub level: f64,
    /// The set itself.
    pub bounds: Interval,
}

impl LevelSet {
    /// Density threshold `exp(−level)`.
    pub fn threshold(&self) -> f64 {
        (-self.level).exp()
    }

    pub fn contains(&self, x: f64) -> bool {
        self.bounds.contains(x)
    }
}

impl fmt::Display for LevelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{x | -log pdf(x) <= {}}} = {}", self.level, self.bounds)
    }
}

/// Smallest interval with a given probability, with the density threshold
/// defining its boundary: inside the interval the density is at least
/// `threshold`, outside at most `threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinimumVolumeInterval {
    pub interval: Interval,
    pub threshold: f64,
    /// Probability actually enclosed.
    pub probability: f64,
}

/// Minimum-volume level set with the probability it actually encloses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinimumVolumeLevelSet {
    pub level_set: LevelSet,
    pub probability: f64,
}

/// Bilateral or unilateral confidence interval with its achieved coverage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub interval: Interval,
    pub probability: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_basic() {
        let i = Interval::new(-2.0, 3.0).unwrap();
        assert_eq!(i.volume(), 5.0);
        assert!(i.contains(-2.0) && i.contains(3.0) && i.contains(0.0));
        assert!(!i.contains(3.5));
        assert!(i.is_finite());
        assert_eq!(i.to_string(), "[-2, 3]");
    }

    #[test]
    fn test_interval_invalid() {
        assert!(Interval::new(1.0, 0.0).is_err());
        assert!(Interval::new(f64::NAN, 0.0).is_err());
        assert!(Interval::new(1.0, 1.0).is_ok());
    }

    #[test]
    fn test_interval_intersect() {
        let a = Interval::new(0.0, 2.0).unwrap();
        let b = Interval::new(1.0, 5.0).unwrap();
        assert_eq!(a.intersect(&b), Some(Interval::new(1.0, 2.0).unwrap()));
        let c = Interval::new(3.0, 4.0).unwrap();
        assert_eq!(a.intersect(&c), None);
        assert_eq!(Interval::real_line().intersect(&a), Some(a));
    }

    #[test]
    fn test_level_set_threshold() {
        let ls = LevelSet {
            level: 2.0_f64.ln(),
            bounds: Interval::new(-1.0, 1.0).unwrap(),
        };
        assert!((ls.threshold() - 0.5).abs() < 1e-15);
        assert!(ls.contains(0.0));
        assert!(!ls.contains(1.5));
    }
}
