//! Central finite differences for cross-checking analytic gradients.

use po_core::{Error, Result};

/// Step for coordinate value `x`: `eps^(1/3) * max(|x|, 1)`.
///
/// Balances truncation error against cancellation for a central difference.
pub fn step_size(x: f64) -> f64 {
    f64::EPSILON.cbrt() * x.abs().max(1.0)
}

/// `df/dx_i` at `x` by central difference.
pub fn central_difference<F>(f: F, x: &[f64], i: usize) -> Result<f64>
where
    F: Fn(&[f64]) -> Result<f64>,
{
    if i >= x.len() {
        return Err(Error::Validation(format!(
            "coordinate {} out of range for a point of dimension {}",
            i,
            x.len()
        )));
    }
    let h = step_size(x[i]);
    let mut probe = x.to_vec();
    probe[i] = x[i] + h;
    let f_plus = f(&probe)?;
    probe[i] = x[i] - h;
    let f_minus = f(&probe)?;
    Ok((f_plus - f_minus) / (2.0 * h))
}

/// Full gradient of `f` at `x` by central differences.
pub fn central_gradient<F>(f: F, x: &[f64]) -> Result<Vec<f64>>
where
    F: Fn(&[f64]) -> Result<f64>,
{
    (0..x.len()).map(|i| central_difference(&f, x, i)).collect()
}

/// `|a - b| / max(|a|, |b|, 1)`.
pub fn relative_error(a: f64, b: f64) -> f64 {
    (a - b).abs() / a.abs().max(b.abs()).max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_quadratic_gradient() {
        let f = |x: &[f64]| Ok(x[0] * x[0] + 3.0 * x[0] * x[1]);
        let g = central_gradient(f, &[2.0, -1.0]).unwrap();
        assert_relative_eq!(g[0], 1.0, epsilon = 1e-8);
        assert_relative_eq!(g[1], 6.0, epsilon = 1e-8);
    }

    #[test]
    fn test_step_scales_with_magnitude() {
        assert_eq!(step_size(0.0), step_size(1.0));
        assert_relative_eq!(step_size(100.0), 100.0 * step_size(1.0));
    }

    #[test]
    fn test_relative_error() {
        assert_eq!(relative_error(1.0, 1.0), 0.0);
        assert_relative_eq!(relative_error(200.0, 202.0), 2.0 / 202.0);
        assert_relative_eq!(relative_error(1e-3, 2e-3), 1e-3);
    }

    #[test]
    fn test_out_of_range_and_errors() {
        assert!(central_difference(|_: &[f64]| Ok(0.0), &[1.0], 1).is_err());
        let failing = |_: &[f64]| -> Result<f64> { Err(Error::Computation("nan".into())) };
        assert!(central_gradient(failing, &[1.0]).is_err());
    }
}
