//! Bernoulli distribution utilities.

use po_core::{Error, Result};

#[inline]
fn check_p(p: f64) -> Result<()> {
    if !p.is_finite() || !(0.0..=1.0).contains(&p) {
        return Err(Error::Validation(format!("p must be finite and in [0,1], got {}", p)));
    }
    Ok(())
}

/// Log-PMF of a Bernoulli distribution at `k ∈ {0, 1}` with success probability `p`.
pub fn logpmf(k: u8, p: f64) -> Result<f64> {
    check_p(p)?;
    match k {
        0 => Ok((-p).ln_1p()),
        1 => Ok(p.ln()),
        _ => Err(Error::Validation(format!("k must be 0 or 1, got {}", k))),
    }
}

/// PMF of a Bernoulli distribution at `k ∈ {0, 1}`.
///
/// Computed directly rather than through `exp(logpmf)` so `p ∈ {0, 1}` yields
/// exact zeros and ones.
pub fn pmf(k: u8, p: f64) -> Result<f64> {
    check_p(p)?;
    match k {
        0 => Ok(1.0 - p),
        1 => Ok(p),
        _ => Err(Error::Validation(format!("k must be 0 or 1, got {}", k))),
    }
}

/// Joint likelihood `prod_i p^k_i (1-p)^(1-k_i)` of independent draws.
pub fn likelihood(ks: &[u8], p: f64) -> Result<f64> {
    ks.iter().try_fold(1.0, |acc, &k| Ok(acc * pmf(k, p)?))
}
