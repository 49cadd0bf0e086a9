//! Cauchy distribution utilities.

use po_core::{Error, Result};

use crate::math::LN_PI;

#[inline]
fn check_gamma(gamma: f64) -> Result<()> {
    if !gamma.is_finite() || gamma <= 0.0 {
        return Err(Error::Validation(format!("gamma must be finite and > 0, got {}", gamma)));
    }
    Ok(())
}

/// Kernel of the Cauchy log-PDF, without the `ln(π)` constant.
///
/// `k(x) = -ln(gamma + (x - x0)^2 / gamma)`
pub fn log_kernel(x: f64, x0: f64, gamma: f64) -> Result<f64> {
    check_gamma(gamma)?;
    let d = x - x0;
    Ok(-(gamma + d * d / gamma).ln())
}

/// Log-PDF of `Cauchy(x0, gamma)` at `x`.
pub fn logpdf(x: f64, x0: f64, gamma: f64) -> Result<f64> {
    Ok(log_kernel(x, x0, gamma)? - LN_PI)
}

/// `d/dx log p(x) = -2 (x - x0) / (gamma^2 + (x - x0)^2)`.
pub fn dlogpdf_dx(x: f64, x0: f64, gamma: f64) -> Result<f64> {
    check_gamma(gamma)?;
    let d = x - x0;
    Ok(-2.0 * d / (gamma * gamma + d * d))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_matches_statrs() {
        use statrs::distribution::{Cauchy, Continuous};
        for &(x, x0, g) in &[(0.0, 0.0, 1.0), (0.25, 0.0, 5.0), (-1.02, 0.0, 10.0)] {
            let reference = Cauchy::new(x0, g).unwrap().ln_pdf(x);
            assert_relative_eq!(logpdf(x, x0, g).unwrap(), reference, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_derivative_matches_finite_difference() {
        let eps = 1e-6;
        for x in [-3.0, -0.5, 0.0, 0.25, 7.0] {
            let fd = (logpdf(x + eps, 0.0, 5.0).unwrap() - logpdf(x - eps, 0.0, 5.0).unwrap())
                / (2.0 * eps);
            assert_relative_eq!(dlogpdf_dx(x, 0.0, 5.0).unwrap(), fd, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_invalid_gamma() {
        assert!(logpdf(0.0, 0.0, 0.0).is_err());
        assert!(dlogpdf_dx(0.0, 0.0, -1.0).is_err());
    }
}
