//! Uniform distribution utilities.

use po_core::{Error, Result};

#[inline]
fn check_bounds(lower: f64, upper: f64) -> Result<()> {
    if !lower.is_finite() || !upper.is_finite() || lower >= upper {
        return Err(Error::Validation(format!(
            "uniform bounds must be finite with lower < upper, got ({}, {})",
            lower, upper
        )));
    }
    Ok(())
}

/// Log-PDF of `Uniform(lower, upper)` at `x`; `-inf` outside the closed support.
pub fn logpdf(x: f64, lower: f64, upper: f64) -> Result<f64> {
    check_bounds(lower, upper)?;
    if x < lower || x > upper {
        return Ok(f64::NEG_INFINITY);
    }
    Ok(-(upper - lower).ln())
}

/// PDF of `Uniform(lower, upper)` at `x`; zero outside the closed support.
pub fn pdf(x: f64, lower: f64, upper: f64) -> Result<f64> {
    check_bounds(lower, upper)?;
    if x < lower || x > upper {
        return Ok(0.0);
    }
    Ok(1.0 / (upper - lower))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inside_and_outside() {
        assert!((pdf(1.0, 0.0, 2.0).unwrap() - 0.5).abs() < 1e-15);
        assert!((logpdf(1.0, 0.0, 2.0).unwrap() + 2.0_f64.ln()).abs() < 1e-15);
        assert_eq!(pdf(2.5, 0.0, 2.0).unwrap(), 0.0);
        assert_eq!(logpdf(-0.1, 0.0, 2.0).unwrap(), f64::NEG_INFINITY);
        // Closed support
        assert_eq!(pdf(0.0, 0.0, 2.0).unwrap(), 0.5);
        assert_eq!(pdf(2.0, 0.0, 2.0).unwrap(), 0.5);
    }

    #[test]
    fn test_invalid_bounds() {
        assert!(pdf(0.0, 1.0, 1.0).is_err());
        assert!(logpdf(0.0, 0.0, f64::INFINITY).is_err());
    }
}
