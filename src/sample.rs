//! Ordered collections of points.
//!
//! A [`Sample`] stores `n` points of dimension `d` row-major and provides the
//! reductions used to compare draws against analytic moments. Reductions
//! are computed per marginal with the estimators of [`crate::stats`].

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::{check_dimension, DistributionError, Result};
use crate::stats::{self, MomentAccumulator};

/// `n × d` collection of points.
///
/// # Examples
/// ```
/// use u_probdist::sample::Sample;
/// let s = Sample::from_values(vec![1.0, 2.0, 3.0, 4.0]);
/// assert_eq!(s.len(), 4);
/// assert_eq!(s.dimension(), 1);
/// assert!((s.compute_mean().unwrap()[0] - 2.5).abs() < 1e-15);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSample")]
pub struct Sample {
    dimension: usize,
    data: Vec<f64>,
}

#[derive(Deserialize)]
struct RawSample {
    dimension: usize,
    data: Vec<f64>,
}

impl TryFrom<RawSample> for Sample {
    type Error = DistributionError;

    fn try_from(raw: RawSample) -> Result<Self> {
        if raw.dimension == 0 || raw.data.len() % raw.dimension != 0 {
            return Err(DistributionError::invalid(format!(
                "{} values do not form points of dimension {}",
                raw.data.len(),
                raw.dimension
            )));
        }
        Ok(Self {
            dimension: raw.dimension,
            data: raw.data,
        })
    }
}

impl Sample {
    /// Empty sample of the given dimension.
    ///
    /// # Errors
    /// `InvalidArgument` if `dimension` is zero.
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(DistributionError::invalid("sample dimension must be >= 1"));
        }
        Ok(Self {
            dimension,
            data: Vec::new(),
        })
    }

    /// One-dimensional sample, one point per value.
    pub fn from_values(values: Vec<f64>) -> Self {
        Self {
            dimension: 1,
            data: values,
        }
    }

    /// Builds a sample from points that must all share one dimension.
    ///
    /// # Errors
    /// `InvalidArgument` if `rows` is empty or a row has zero length;
    /// `InvalidDimension` if rows differ in length.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let first = rows
            .first()
            .ok_or_else(|| DistributionError::invalid("cannot infer dimension of an empty sample"))?;
        let mut sample = Self::new(first.len())?;
        for row in rows {
            sample.push(row)?;
        }
        Ok(sample)
    }

    /// Appends a point.
    ///
    /// # Errors
    /// `InvalidDimension` if `point` does not have the sample's dimension.
    pub fn push(&mut self, point: &[f64]) -> Result<()> {
        check_dimension(self.dimension, point.len())?;
        self.data.extend_from_slice(point);
        Ok(())
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.data.len() / self.dimension
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Point `i`, or `None` past the end.
    pub fn row(&self, i: usize) -> Option<&[f64]> {
        let start = i.checked_mul(self.dimension)?;
        self.data.get(start..start + self.dimension)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.dimension)
    }

    /// Component `j` of every point.
    ///
    /// # Errors
    /// `InvalidArgument` if `j >= dimension`.
    pub fn marginal(&self, j: usize) -> Result<Vec<f64>> {
        if j >= self.dimension {
            return Err(DistributionError::invalid(format!(
                "marginal index {j} out of range for dimension {}",
                self.dimension
            )));
        }
        Ok(self.rows().map(|r| r[j]).collect())
    }

    /// Component-wise mean.
    ///
    /// # Errors
    /// `InvalidArgument` if the sample is empty or holds non-finite values.
    pub fn compute_mean(&self) -> Result<DVector<f64>> {
        self.per_marginal("mean", 1, stats::mean)
    }

    /// Unbiased covariance matrix.
    ///
    /// # Errors
    /// `InvalidArgument` with fewer than two points or non-finite values.
    pub fn compute_covariance(&self) -> Result<DMatrix<f64>> {
        let d = self.dimension;
        let marginals = self.marginals()?;
        let mut cov = DMatrix::zeros(d, d);
        for i in 0..d {
            for j in 0..=i {
                let c = stats::covariance(&marginals[i], &marginals[j])
                    .ok_or_else(|| self.undefined("covariance", 2))?;
                cov[(i, j)] = c;
                cov[(j, i)] = c;
            }
        }
        Ok(cov)
    }

    /// Spearman rank correlation matrix.
    ///
    /// # Errors
    /// `InvalidArgument` with fewer than two points, NaN values or a
    /// constant marginal.
    pub fn compute_spearman_correlation(&self) -> Result<DMatrix<f64>> {
        let d = self.dimension;
        let ranked = self
            .marginals()?
            .iter()
            .map(|m| stats::ranks(m).ok_or_else(|| self.undefined("ranks", 1)))
            .collect::<Result<Vec<_>>>()?;
        let mut rho = DMatrix::identity(d, d);
        for i in 0..d {
            for j in 0..i {
                let r = stats::pearson_correlation(&ranked[i], &ranked[j])
                    .ok_or_else(|| self.undefined("spearman correlation", 2))?;
                rho[(i, j)] = r;
                rho[(j, i)] = r;
            }
        }
        Ok(rho)
    }

    /// Component-wise sample standard deviation.
    pub fn compute_standard_deviation(&self) -> Result<DVector<f64>> {
        self.per_marginal("standard deviation", 2, |x| {
            MomentAccumulator::from_slice(x).sample_std_dev()
        })
    }

    /// Component-wise skewness.
    pub fn compute_skewness(&self) -> Result<DVector<f64>> {
        self.per_marginal("skewness", 3, |x| MomentAccumulator::from_slice(x).skewness())
    }

    /// Component-wise kurtosis (not excess).
    pub fn compute_kurtosis(&self) -> Result<DVector<f64>> {
        self.per_marginal("kurtosis", 4, |x| MomentAccumulator::from_slice(x).kurtosis())
    }

    fn marginals(&self) -> Result<Vec<Vec<f64>>> {
        (0..self.dimension).map(|j| self.marginal(j)).collect()
    }

    fn per_marginal<F>(&self, what: &str, min_len: usize, f: F) -> Result<DVector<f64>>
    where
        F: Fn(&[f64]) -> Option<f64>,
    {
        let values = self
            .marginals()?
            .iter()
            .map(|m| f(m).ok_or_else(|| self.undefined(what, min_len)))
            .collect::<Result<Vec<_>>>()?;
        Ok(DVector::from_vec(values))
    }

    fn undefined(&self, what: &str, min_len: usize) -> DistributionError {
        DistributionError::invalid(format!(
            "sample {what} undefined for {} points (needs >= {min_len} finite, non-constant values)",
            self.len()
        ))
    }
}
