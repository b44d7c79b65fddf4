//! Named, described parameter collections.
//!
//! A [`ParameterCollection`] is the introspection view of a distribution's
//! parameter vector. Turning a (possibly edited) collection back into a
//! distribution always goes through the family's validating constructor.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DistributionError, Result};

/// Ordered `(name, value)` pairs with a description.
///
/// # Examples
/// ```
/// use u_probdist::parameters::ParameterCollection;
/// let mut p = ParameterCollection::new("Normal", &["mu", "sigma"], &[0.0, 1.0]).unwrap();
/// p.set("sigma", 2.0).unwrap();
/// assert_eq!(p.get("sigma"), Some(2.0));
/// assert_eq!(p.values(), vec![0.0, 2.0]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterCollection {
    description: String,
    names: Vec<String>,
    values: Vec<f64>,
}

impl ParameterCollection {
    /// # Errors
    /// `InvalidDimension` if `names` and `values` differ in length.
    pub fn new(description: impl Into<String>, names: &[&str], values: &[f64]) -> Result<Self> {
        if names.len() != values.len() {
            return Err(DistributionError::InvalidDimension {
                expected: names.len(),
                got: values.len(),
            });
        }
        Ok(Self {
            description: description.into(),
            names: names.iter().map(|s| s.to_string()).collect(),
            values: values.to_vec(),
        })
    }

    /// Builds a collection from `(name, value)` pairs; used by families
    /// whose parameter names are fixed.
    pub fn from_pairs(description: impl Into<String>, pairs: &[(&str, f64)]) -> Self {
        Self {
            description: description.into(),
            names: pairs.iter().map(|(n, _)| n.to_string()).collect(),
            values: pairs.iter().map(|&(_, v)| v).collect(),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> Vec<f64> {
        self.values.clone()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values[i])
    }

    /// Replaces the value of `name`.
    ///
    /// # Errors
    /// `InvalidArgument` if no parameter has that name.
    pub fn set(&mut self, name: &str, value: f64) -> Result<()> {
        let i = self
            .names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| {
                DistributionError::invalid(format!(
                    "{} has no parameter named '{name}'",
                    self.description
                ))
            })?;
        self.values[i] = value;
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

impl fmt::Display for ParameterCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.description)?;
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name} = {value}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let p = ParameterCollection::new("TruncatedNormal", &["mu", "sigma"], &[0.5, 3.0]).unwrap();
        assert_eq!(p.to_string(), "TruncatedNormal(mu = 0.5, sigma = 3)");
    }

    #[test]
    fn test_length_mismatch() {
        let err = ParameterCollection::new("X", &["a", "b"], &[1.0]).unwrap_err();
        assert_eq!(
            err,
            DistributionError::InvalidDimension {
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn test_set_unknown_name() {
        let mut p = ParameterCollection::new("X", &["a"], &[1.0]).unwrap();
        assert!(p.set("b", 2.0).is_err());
        assert_eq!(p.get("a"), Some(1.0));
        assert_eq!(p.len(), 1);
        assert!(!p.is_empty());
    }
}
