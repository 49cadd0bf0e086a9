//! Common data types for the reference oracles

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Integration domain of a single variable.
///
/// Either bound may be infinite; the quadrature primitive decides how to map
/// infinite ranges. `lower < upper` always holds for a constructed domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    lower: f64,
    upper: f64,
}

impl Domain {
    /// Create a domain from raw bounds.
    ///
    /// NaN bounds, `lower >= upper`, or a range lying entirely at one infinity
    /// are rejected.
    pub fn new(lower: f64, upper: f64) -> Result<Self> {
        if lower.is_nan() || upper.is_nan() {
            return Err(Error::Validation(format!(
                "domain bounds must not be NaN, got ({}, {})",
                lower, upper
            )));
        }
        if lower >= upper || lower == f64::INFINITY || upper == f64::NEG_INFINITY {
            return Err(Error::Validation(format!(
                "domain requires lower < upper, got ({}, {})",
                lower, upper
            )));
        }
        Ok(Self { lower, upper })
    }

    /// Finite interval `[lower, upper]`.
    pub fn interval(lower: f64, upper: f64) -> Result<Self> {
        if !lower.is_finite() || !upper.is_finite() {
            return Err(Error::Validation(format!(
                "interval bounds must be finite, got ({}, {})",
                lower, upper
            )));
        }
        Self::new(lower, upper)
    }

    /// The whole real line `(-inf, inf)`.
    pub fn real_line() -> Self {
        Self { lower: f64::NEG_INFINITY, upper: f64::INFINITY }
    }

    /// Half line `[lower, inf)`.
    pub fn lower_bounded(lower: f64) -> Result<Self> {
        if !lower.is_finite() {
            return Err(Error::Validation(format!("lower bound must be finite, got {}", lower)));
        }
        Self::new(lower, f64::INFINITY)
    }

    /// Half line `(-inf, upper]`.
    pub fn upper_bounded(upper: f64) -> Result<Self> {
        if !upper.is_finite() {
            return Err(Error::Validation(format!("upper bound must be finite, got {}", upper)));
        }
        Self::new(f64::NEG_INFINITY, upper)
    }

    /// Lower bound (possibly `-inf`).
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// Upper bound (possibly `+inf`).
    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// `(lower, upper)` pair, the shape bounds are passed around in elsewhere.
    pub fn bounds(&self) -> (f64, f64) {
        (self.lower, self.upper)
    }

    /// Whether both bounds are finite.
    pub fn is_bounded(&self) -> bool {
        self.lower.is_finite() && self.upper.is_finite()
    }

    /// Whether `x` lies inside the closed domain.
    pub fn contains(&self, x: f64) -> bool {
        x >= self.lower && x <= self.upper
    }
}

/// Posterior means produced by the expectation oracle, in declaration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PosteriorMeans {
    /// Posterior mean of each declared variable
    pub means: Vec<f64>,

    /// Normalizing constant `∫ p(θ) dθ` over the joint domain
    pub evidence: f64,
}

impl PosteriorMeans {
    /// Create a new result.
    pub fn new(means: Vec<f64>, evidence: f64) -> Self {
        Self { means, evidence }
    }

    /// Means in declaration order.
    pub fn values(&self) -> &[f64] {
        &self.means
    }

    /// Number of variables.
    pub fn dim(&self) -> usize {
        self.means.len()
    }

    /// Mean of variable `i`, `None` if out of range.
    pub fn get(&self, i: usize) -> Option<f64> {
        self.means.get(i).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_constructors() {
        let d = Domain::interval(0.0, 2.0).unwrap();
        assert!(d.is_bounded());
        assert_eq!(d.bounds(), (0.0, 2.0));
        assert!(d.contains(1.0));
        assert!(!d.contains(2.5));

        let r = Domain::real_line();
        assert!(!r.is_bounded());
        assert_eq!(r.lower(), f64::NEG_INFINITY);

        let l = Domain::lower_bounded(0.5).unwrap();
        assert_eq!(l.upper(), f64::INFINITY);
        let u = Domain::upper_bounded(-1.0).unwrap();
        assert_eq!(u.lower(), f64::NEG_INFINITY);
    }

    #[test]
    fn test_domain_rejects_malformed_bounds() {
        assert!(Domain::new(1.0, 1.0).is_err());
        assert!(Domain::new(2.0, 1.0).is_err());
        assert!(Domain::new(f64::NAN, 1.0).is_err());
        assert!(Domain::new(f64::INFINITY, f64::INFINITY).is_err());
        assert!(Domain::interval(0.0, f64::INFINITY).is_err());
        assert!(Domain::lower_bounded(f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_posterior_means_accessors() {
        let pm = PosteriorMeans::new(vec![1.0, 0.5], 0.02);
        assert_eq!(pm.dim(), 2);
        assert_eq!(pm.get(1), Some(0.5));
        assert_eq!(pm.get(2), None);
        assert_eq!(pm.values(), &[1.0, 0.5]);
    }
}
