//! Link functions for unconstrained parameterization.
//!
//! Gradient oracles are stated with respect to unconstrained coordinates
//! `z ∈ R`, while priors and likelihoods are written in terms of the
//! constrained parameter `theta`. Every derivative that crosses this boundary
//! must pick up `dtheta/dz`, and every unconstrained density must add
//! `log|dtheta/dz|`. This module keeps those pieces in one table so the chain
//! rule is applied mechanically instead of re-derived per model.

use po_core::{Error, Result};

use crate::math::{log_sigmoid, logit, sigmoid, sigmoid_deriv};

/// A bijective transform from unconstrained `z` to constrained `theta`.
pub trait Bijector: Send + Sync {
    /// Map unconstrained -> constrained: `theta = forward(z)`
    fn forward(&self, z: f64) -> f64;
    /// Map constrained -> unconstrained: `z = inverse(theta)`
    fn inverse(&self, theta: f64) -> f64;
    /// Jacobian element: `dtheta/dz`
    fn jacobian(&self, z: f64) -> f64;
    /// Log absolute determinant of Jacobian: `log|dtheta/dz|`
    fn log_abs_det_jacobian(&self, z: f64) -> f64;
    /// Derivative of log|J| w.r.t. z: `d/dz log|dtheta/dz|`
    fn grad_log_abs_det_jacobian(&self, z: f64) -> f64;
}

/// Named link functions.
///
/// The name follows the statistical convention: the link maps the constrained
/// parameter to the real line (`Log`: `z = ln(theta)`), so [`Bijector::forward`]
/// applies the *inverse* link.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Link {
    /// `(-inf, inf) -> (-inf, inf)`, `theta = z`.
    Identity,
    /// `(0, inf)`: `z = ln(theta)`, `theta = exp(z)`, `dtheta/dz = exp(z)`.
    Log,
    /// `(lower, upper)`: `z = logit((theta - lower) / (upper - lower))`,
    /// `theta = lower + (upper - lower) * inv_logit(z)`,
    /// `dtheta/dz = (upper - lower) * inv_logit(z) * (1 - inv_logit(z))`.
    Logit {
        /// Lower bound of the support.
        lower: f64,
        /// Upper bound of the support.
        upper: f64,
    },
}

impl Link {
    /// Interval logit link on `(lower, upper)`.
    pub fn logit(lower: f64, upper: f64) -> Result<Self> {
        if !lower.is_finite() || !upper.is_finite() || lower >= upper {
            return Err(Error::Validation(format!(
                "logit link requires finite lower < upper, got ({}, {})",
                lower, upper
            )));
        }
        Ok(Link::Logit { lower, upper })
    }

    /// Select the link for a support given as `(lower, upper)` bounds.
    ///
    /// - `(-inf, inf)` -> Identity
    /// - `(0, inf)` -> Log
    /// - `(a, b)` with both finite -> Logit(a, b)
    ///
    /// Other half-lines have no entry in the table and are rejected.
    pub fn from_bounds(lower: f64, upper: f64) -> Result<Self> {
        match (lower.is_finite(), upper.is_finite()) {
            (false, false) if lower < 0.0 && upper > 0.0 => Ok(Link::Identity),
            (true, false) if lower == 0.0 && upper > 0.0 => Ok(Link::Log),
            (true, true) => Self::logit(lower, upper),
            _ => Err(Error::Validation(format!(
                "no link function for support ({}, {})",
                lower, upper
            ))),
        }
    }

    /// Short name, for messages.
    pub fn name(&self) -> &'static str {
        match self {
            Link::Identity => "identity",
            Link::Log => "log",
            Link::Logit { .. } => "logit",
        }
    }

    /// Whether `theta` lies strictly inside the support.
    pub fn in_support(&self, theta: f64) -> bool {
        match *self {
            Link::Identity => theta.is_finite(),
            Link::Log => theta.is_finite() && theta > 0.0,
            Link::Logit { lower, upper } => theta > lower && theta < upper,
        }
    }
}

impl Bijector for Link {
    #[inline]
    fn forward(&self, z: f64) -> f64 {
        match *self {
            Link::Identity => z,
            Link::Log => z.exp(),
            Link::Logit { lower, upper } => lower + (upper - lower) * sigmoid(z),
        }
    }

    #[inline]
    fn inverse(&self, theta: f64) -> f64 {
        match *self {
            Link::Identity => theta,
            Link::Log => theta.ln(),
            Link::Logit { lower, upper } => logit((theta - lower) / (upper - lower)),
        }
    }

    #[inline]
    fn jacobian(&self, z: f64) -> f64 {
        match *self {
            Link::Identity => 1.0,
            Link::Log => z.exp(),
            Link::Logit { lower, upper } => (upper - lower) * sigmoid_deriv(z),
        }
    }

    #[inline]
    fn log_abs_det_jacobian(&self, z: f64) -> f64 {
        match *self {
            Link::Identity => 0.0,
            Link::Log => z,
            // log(b-a) + log_sigmoid(z) + log_sigmoid(-z)
            Link::Logit { lower, upper } => (upper - lower).ln() + log_sigmoid(z) + log_sigmoid(-z),
        }
    }

    #[inline]
    fn grad_log_abs_det_jacobian(&self, z: f64) -> f64 {
        match *self {
            Link::Identity => 0.0,
            Link::Log => 1.0,
            // sigmoid(-z) - sigmoid(z)
            Link::Logit { .. } => 1.0 - 2.0 * sigmoid(z),
        }
    }
}

/// Per-parameter links for a vector of parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterTransform {
    links: Vec<Link>,
}

impl ParameterTransform {
    /// Build from explicit links.
    pub fn new(links: Vec<Link>) -> Self {
        Self { links }
    }

    /// Build from parameter supports; see [`Link::from_bounds`].
    pub fn from_bounds(bounds: &[(f64, f64)]) -> Result<Self> {
        let links =
            bounds.iter().map(|&(lo, hi)| Link::from_bounds(lo, hi)).collect::<Result<Vec<_>>>()?;
        Ok(Self { links })
    }

    /// Number of parameters.
    pub fn dim(&self) -> usize {
        self.links.len()
    }

    /// Link of parameter `i`.
    pub fn link(&self, i: usize) -> Option<&Link> {
        self.links.get(i)
    }

    /// Map unconstrained -> constrained.
    pub fn forward(&self, z: &[f64]) -> Result<Vec<f64>> {
        self.check_len(z.len())?;
        Ok(z.iter().zip(&self.links).map(|(&zi, l)| l.forward(zi)).collect())
    }

    /// Map constrained -> unconstrained. Values outside a link's support are rejected.
    pub fn inverse(&self, theta: &[f64]) -> Result<Vec<f64>> {
        self.check_len(theta.len())?;
        theta
            .iter()
            .zip(&self.links)
            .enumerate()
            .map(|(i, (&ti, l))| {
                if !l.in_support(ti) {
                    return Err(Error::Validation(format!(
                        "parameter {} = {} is outside the support of its {} link",
                        i,
                        ti,
                        l.name()
                    )));
                }
                Ok(l.inverse(ti))
            })
            .collect()
    }

    /// Sum of log|J| over all parameters.
    pub fn log_abs_det_jacobian(&self, z: &[f64]) -> Result<f64> {
        self.check_len(z.len())?;
        Ok(z.iter().zip(&self.links).map(|(&zi, l)| l.log_abs_det_jacobian(zi)).sum())
    }

    /// Gradient of sum(log|J|) w.r.t. z.
    pub fn grad_log_abs_det_jacobian(&self, z: &[f64]) -> Result<Vec<f64>> {
        self.check_len(z.len())?;
        Ok(z.iter().zip(&self.links).map(|(&zi, l)| l.grad_log_abs_det_jacobian(zi)).collect())
    }

    /// Diagonal Jacobian: `dtheta_i/dz_i` for each parameter.
    pub fn jacobian_diag(&self, z: &[f64]) -> Result<Vec<f64>> {
        self.check_len(z.len())?;
        Ok(z.iter().zip(&self.links).map(|(&zi, l)| l.jacobian(zi)).collect())
    }

    fn check_len(&self, n: usize) -> Result<()> {
        if n != self.links.len() {
            return Err(Error::Validation(format!(
                "expected {} parameters, got {}",
                self.links.len(),
                n
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_roundtrip(b: &dyn Bijector, z_values: &[f64], rtol: f64) {
        for &z in z_values {
            let theta = b.forward(z);
            let z_back = b.inverse(theta);
            let diff = (z - z_back).abs();
            let scale = z.abs().max(1.0);
            assert!(
                diff / scale < rtol,
                "Roundtrip failed: z={}, theta={}, z_back={}, diff={}",
                z,
                theta,
                z_back,
                diff
            );
        }
    }

    fn check_jacobian(b: &dyn Bijector, z_values: &[f64], rtol: f64) {
        let eps = 1e-7;
        for &z in z_values {
            let fd = (b.forward(z + eps) - b.forward(z - eps)) / (2.0 * eps);
            let j = b.jacobian(z);
            assert!(
                (j - fd).abs() / j.abs().max(1.0) < rtol,
                "Jacobian failed: z={}, analytical={}, fd={}",
                z,
                j,
                fd
            );
            assert!((j.abs().ln() - b.log_abs_det_jacobian(z)).abs() < 1e-10);
        }
    }

    fn check_grad_log_jac(b: &dyn Bijector, z_values: &[f64], rtol: f64) {
        let eps = 1e-7;
        for &z in z_values {
            let grad = b.grad_log_abs_det_jacobian(z);
            let f_plus = b.log_abs_det_jacobian(z + eps);
            let f_minus = b.log_abs_det_jacobian(z - eps);
            let grad_fd = (f_plus - f_minus) / (2.0 * eps);
            let diff = (grad - grad_fd).abs();
            let scale = grad.abs().max(1.0);
            assert!(
                diff / scale < rtol,
                "Grad log|J| failed: z={}, analytical={}, fd={}, diff={}",
                z,
                grad,
                grad_fd,
                diff
            );
        }
    }

    #[test]
    fn test_identity_link() {
        let l = Link::Identity;
        check_roundtrip(&l, &[-3.0, 0.0, 10.0], 1e-15);
        assert_eq!(l.jacobian(1.0), 1.0);
        assert_eq!(l.log_abs_det_jacobian(1.0), 0.0);
        assert_eq!(l.grad_log_abs_det_jacobian(1.0), 0.0);
    }

    #[test]
    fn test_log_link() {
        let l = Link::Log;
        let zs = [-5.0, -1.0, 0.0, 1.0, 3.0];
        check_roundtrip(&l, &zs, 1e-10);
        check_jacobian(&l, &zs, 1e-7);
        check_grad_log_jac(&l, &zs, 1e-7);
    }

    #[test]
    fn test_logit_link() {
        let l = Link::logit(-1.0, 1.0).unwrap();
        let zs = [-6.0, -1.0, 0.0, 1.5, 6.0];
        check_roundtrip(&l, &zs, 1e-9);
        check_jacobian(&l, &zs, 1e-7);
        check_grad_log_jac(&l, &zs, 1e-6);
    }

    #[test]
    fn test_persistence_link_values() {
        // phi = 0.95 on (-1, 1): Phi = logit((phi + 1) / 2)
        let l = Link::logit(-1.0, 1.0).unwrap();
        let phi = 0.95;
        let z = l.inverse(phi);
        let u: f64 = (phi + 1.0) / 2.0;
        assert!((z - (u / (1.0 - u)).ln()).abs() < 1e-12);
        // dphi/dPhi = 2 * s * (1 - s) with s = inv_logit(Phi) = u
        assert!((l.jacobian(z) - 2.0 * u * (1.0 - u)).abs() < 1e-12);
    }

    #[test]
    fn test_from_bounds_selection() {
        assert_eq!(Link::from_bounds(f64::NEG_INFINITY, f64::INFINITY).unwrap(), Link::Identity);
        assert_eq!(Link::from_bounds(0.0, f64::INFINITY).unwrap(), Link::Log);
        assert_eq!(
            Link::from_bounds(-1.0, 1.0).unwrap(),
            Link::Logit { lower: -1.0, upper: 1.0 }
        );
        assert!(Link::from_bounds(2.0, f64::INFINITY).is_err());
        assert!(Link::from_bounds(f64::NEG_INFINITY, 0.0).is_err());
        assert!(Link::logit(1.0, 1.0).is_err());
    }

    #[test]
    fn test_parameter_transform_roundtrip_and_support() {
        let t = ParameterTransform::from_bounds(&[
            (-1.0, 1.0),
            (0.0, f64::INFINITY),
            (f64::NEG_INFINITY, f64::INFINITY),
        ])
        .unwrap();
        assert_eq!(t.dim(), 3);

        let theta = [0.95, 0.25, -1.02];
        let z = t.inverse(&theta).unwrap();
        let back = t.forward(&z).unwrap();
        for (a, b) in theta.iter().zip(&back) {
            assert!((a - b).abs() < 1e-12);
        }

        assert!(t.inverse(&[1.5, 0.25, 0.0]).is_err());
        assert!(t.inverse(&[0.0, -0.25, 0.0]).is_err());
        assert!(t.forward(&[0.0, 0.0]).is_err());
    }

    #[test]
    fn test_parameter_transform_grad_log_jac_matches_finite_difference() {
        let t = ParameterTransform::from_bounds(&[(0.0, 10.0), (0.0, f64::INFINITY)]).unwrap();
        let z = vec![0.5, -0.3];
        let grad = t.grad_log_abs_det_jacobian(&z).unwrap();
        let eps = 1e-7;
        for (i, &g) in grad.iter().enumerate() {
            let mut z_plus = z.clone();
            z_plus[i] += eps;
            let mut z_minus = z.clone();
            z_minus[i] -= eps;
            let g_fd = (t.log_abs_det_jacobian(&z_plus).unwrap()
                - t.log_abs_det_jacobian(&z_minus).unwrap())
                / (2.0 * eps);
            assert!((g - g_fd).abs() < 1e-6, "grad_log_jac[{}]: {} vs {}", i, g, g_fd);
        }
        let diag = t.jacobian_diag(&z).unwrap();
        assert!((diag[1] - (-0.3f64).exp()).abs() < 1e-15);
    }
}
