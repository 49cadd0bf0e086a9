//! Normal distribution utilities.

use po_core::{Error, Result};

use crate::math::LN_SQRT_2PI;

#[inline]
fn check_sigma(sigma: f64) -> Result<()> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(Error::Validation(format!("sigma must be finite and > 0, got {}", sigma)));
    }
    Ok(())
}

/// Kernel of the Normal log-PDF, without the `ln(sqrt(2π))` constant.
///
/// `k(x) = -0.5 * ((x-mu)/sigma)^2 - ln(sigma)`
pub fn log_kernel(x: f64, mu: f64, sigma: f64) -> Result<f64> {
    check_sigma(sigma)?;
    let z = (x - mu) / sigma;
    Ok(-0.5 * z * z - sigma.ln())
}

/// Log-PDF of a Normal distribution `N(mu, sigma)` at `x`.
///
/// `log p(x) = -0.5 * ((x-mu)/sigma)^2 - ln(sigma) - ln(sqrt(2π))`
pub fn logpdf(x: f64, mu: f64, sigma: f64) -> Result<f64> {
    Ok(log_kernel(x, mu, sigma)? - LN_SQRT_2PI)
}

/// PDF of a Normal distribution `N(mu, sigma)` at `x`.
pub fn pdf(x: f64, mu: f64, sigma: f64) -> Result<f64> {
    Ok(logpdf(x, mu, sigma)?.exp())
}

/// `d/dx log p(x) = -(x - mu) / sigma^2`.
pub fn dlogpdf_dx(x: f64, mu: f64, sigma: f64) -> Result<f64> {
    check_sigma(sigma)?;
    Ok(-(x - mu) / (sigma * sigma))
}

/// `d/dsigma log p(x) = ((x - mu)^2 / sigma^2 - 1) / sigma`.
pub fn dlogpdf_dsigma(x: f64, mu: f64, sigma: f64) -> Result<f64> {
    check_sigma(sigma)?;
    let z = (x - mu) / sigma;
    Ok((z * z - 1.0) / sigma)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_standard_at_zero() {
        let lp = logpdf(0.0, 0.0, 1.0).unwrap();
        assert!((lp + LN_SQRT_2PI).abs() < 1e-12);
        assert_eq!(log_kernel(0.0, 0.0, 1.0).unwrap(), 0.0);
    }

    #[test]
    fn test_symmetry() {
        let lp1 = logpdf(1.3, 0.0, 2.0).unwrap();
        let lp2 = logpdf(-1.3, 0.0, 2.0).unwrap();
        assert!((lp1 - lp2).abs() < 1e-12);
    }

    #[test]
    fn test_matches_statrs() {
        use statrs::distribution::{Continuous, Normal};
        for &(x, mu, sigma) in &[(-0.2, 0.0, 1.0), (2.0, 1.0, 3.0), (0.4, 0.0, 0.7)] {
            let reference = Normal::new(mu, sigma).unwrap().ln_pdf(x);
            assert_relative_eq!(logpdf(x, mu, sigma).unwrap(), reference, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_derivatives_match_finite_difference() {
        let (x, mu, sigma) = (0.4, -0.3, 0.8);
        let eps = 1e-6;
        let fd_x = (logpdf(x + eps, mu, sigma).unwrap() - logpdf(x - eps, mu, sigma).unwrap())
            / (2.0 * eps);
        let fd_s = (logpdf(x, mu, sigma + eps).unwrap() - logpdf(x, mu, sigma - eps).unwrap())
            / (2.0 * eps);
        assert_relative_eq!(dlogpdf_dx(x, mu, sigma).unwrap(), fd_x, epsilon = 1e-8);
        assert_relative_eq!(dlogpdf_dsigma(x, mu, sigma).unwrap(), fd_s, epsilon = 1e-8);
    }

    #[test]
    fn test_invalid_sigma() {
        assert!(logpdf(0.0, 0.0, 0.0).is_err());
        assert!(logpdf(0.0, 0.0, -1.0).is_err());
        assert!(pdf(0.0, 0.0, f64::NAN).is_err());
        assert!(dlogpdf_dsigma(0.0, 0.0, 0.0).is_err());
    }
}
