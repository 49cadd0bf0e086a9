//! Small numerically-stable math utilities used across probability code.

/// Natural log of `2π`.
pub const LN_2PI: f64 = 1.837_877_066_409_345_5;

/// Natural log of `sqrt(2π)`.
pub const LN_SQRT_2PI: f64 = 0.918_938_533_204_672_7;

/// Natural log of π.
pub const LN_PI: f64 = 1.144_729_885_849_400_2;

/// Stable sigmoid (inverse logit): `1 / (1 + exp(-x))`.
///
/// Single `exp(-|x|)`, then a sign flip so neither branch overflows.
#[inline]
pub fn sigmoid(x: f64) -> f64 {
    let e = (-x.abs()).exp();
    let recip = 1.0 / (1.0 + e);
    if x >= 0.0 { recip } else { e * recip }
}

/// Derivative of the sigmoid: `sigmoid(x) * (1 - sigmoid(x))`.
#[inline]
pub fn sigmoid_deriv(x: f64) -> f64 {
    let s = sigmoid(x);
    s * (1.0 - s)
}

/// Stable `log(sigmoid(x))`.
#[inline]
pub fn log_sigmoid(x: f64) -> f64 {
    // log(sigmoid(x)) = -log(1 + exp(-x))
    if x >= 0.0 { -(-x).exp().ln_1p() } else { x - x.exp().ln_1p() }
}

/// Logit: `log(p / (1 - p))`, the inverse of [`sigmoid`] on `(0, 1)`.
///
/// Returns `±inf` at the endpoints and NaN outside `[0, 1]`.
#[inline]
pub fn logit(p: f64) -> f64 {
    p.ln() - (-p).ln_1p()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        let two_pi = 2.0 * std::f64::consts::PI;
        assert!((LN_2PI - two_pi.ln()).abs() < 1e-15);
        assert!((LN_SQRT_2PI - 0.5 * two_pi.ln()).abs() < 1e-15);
        assert!((LN_PI - std::f64::consts::PI.ln()).abs() < 1e-15);
    }

    #[test]
    fn test_sigmoid_bounds_and_symmetry() {
        let xs: [f64; 7] = [-50.0, -10.0, -1.0, 0.0, 1.0, 10.0, 50.0];
        for x in xs {
            let s = sigmoid(x);
            assert!((0.0..=1.0).contains(&s), "sigmoid({})={}", x, s);
            let t = sigmoid(-x);
            assert!((s + t - 1.0).abs() < 1e-15, "sigmoid symmetry failed at {}", x);
        }
    }

    #[test]
    fn test_logit_inverts_sigmoid() {
        for x in [-8.0, -2.0, -0.3, 0.0, 0.7, 3.0, 8.0] {
            let back = logit(sigmoid(x));
            assert!((back - x).abs() < 1e-9, "x={}: logit(sigmoid(x))={}", x, back);
        }
        assert_eq!(logit(0.5), 0.0);
        assert!(logit(0.0).is_infinite() && logit(0.0) < 0.0);
    }

    #[test]
    fn test_sigmoid_deriv_matches_finite_difference() {
        let eps = 1e-6;
        for x in [-4.0, -1.0, 0.0, 0.5, 3.0] {
            let fd = (sigmoid(x + eps) - sigmoid(x - eps)) / (2.0 * eps);
            assert!((sigmoid_deriv(x) - fd).abs() < 1e-9, "x={}", x);
        }
    }

    #[test]
    fn test_log_sigmoid_matches_naive_moderate_values() {
        let xs: [f64; 7] = [-10.0, -2.0, -0.1, 0.0, 0.1, 2.0, 10.0];
        for x in xs {
            let naive = sigmoid(x).ln();
            let stable = log_sigmoid(x);
            assert!((naive - stable).abs() < 1e-12, "x={}: {} vs {}", x, naive, stable);
        }
    }
}
