//! Core traits for the reference oracles
//!
//! The expectation oracle depends only on [`Integrator`], not on a concrete
//! quadrature rule, so the one-dimensional primitive can be swapped without
//! touching the nesting logic.

use crate::Result;

/// One-dimensional definite integration primitive.
///
/// Implementations accept finite or infinite bounds (`f64::NEG_INFINITY`,
/// `f64::INFINITY`) and run their own convergence loop. Errors raised by the
/// integrand are propagated unchanged; failure to reach the requested accuracy
/// is reported as [`crate::Error::Computation`].
pub trait Integrator: Send + Sync {
    /// Compute `∫_lower^upper f(x) dx`.
    fn integrate(&self, f: &dyn Fn(f64) -> Result<f64>, lower: f64, upper: f64) -> Result<f64>;

    /// Integrator name (e.g., "gauss-kronrod-15")
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Midpoint rule on finite bounds only; enough to exercise the trait surface.
    struct Midpoint {
        n: usize,
    }

    impl Integrator for Midpoint {
        fn integrate(
            &self,
            f: &dyn Fn(f64) -> Result<f64>,
            lower: f64,
            upper: f64,
        ) -> Result<f64> {
            let h = (upper - lower) / self.n as f64;
            let mut acc = 0.0;
            for i in 0..self.n {
                acc += f(lower + (i as f64 + 0.5) * h)?;
            }
            Ok(acc * h)
        }

        fn name(&self) -> &str {
            "midpoint"
        }
    }

    #[test]
    fn test_dyn_integrator() {
        let q: Box<dyn Integrator> = Box::new(Midpoint { n: 1000 });
        let v = q.integrate(&|x| Ok(2.0 * x), 0.0, 1.0).unwrap();
        assert_eq!(q.name(), "midpoint");
        approx::assert_relative_eq!(v, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_integrand_error_propagates() {
        let q = Midpoint { n: 4 };
        let r = q.integrate(&|_| Err(crate::Error::Computation("boom".into())), 0.0, 1.0);
        assert!(r.is_err());
    }
}
