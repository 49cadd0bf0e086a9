//! Posterior expectations by nested one-dimensional quadrature.
//!
//! For a density `p(θ)` over a box of per-variable domains the oracle computes
//!
//! ```text
//! evidence = ∫ p(θ) dθ
//! mean_i   = ∫ θ_i p(θ) dθ / evidence
//! ```
//!
//! The multi-dimensional integral is a stack of 1-D integrals. Variable 0 (the
//! first declared) is the innermost integral and the last declared variable is
//! the outermost. Each level fixes one coordinate and hands the remaining
//! domains to the next level; only the 1-D primitive knows about infinite
//! bounds.
//!
//! Cost is the product of per-level evaluation counts, so more than four
//! variables is accepted but logged as a warning.

use po_core::{Domain, Error, Integrator, PosteriorMeans, Result};

use crate::quadrature::{GaussKronrod, QuadratureConfig};

/// Nesting depth above which a warning is logged.
pub const MAX_RECOMMENDED_DIM: usize = 4;

/// Integrate `f` over `remaining`, with the already-fixed outer coordinates in `outer`.
///
/// `outer` holds the values of the variables after `remaining` in declaration
/// order, so once `remaining` is empty it is the full point.
fn integrate_remaining(
    integrator: &dyn Integrator,
    f: &dyn Fn(&[f64]) -> Result<f64>,
    remaining: &[Domain],
    outer: &[f64],
) -> Result<f64> {
    let Some((current, inner)) = remaining.split_last() else {
        return f(outer);
    };

    let level = |x: f64| -> Result<f64> {
        let mut point = Vec::with_capacity(outer.len() + 1);
        point.push(x);
        point.extend_from_slice(outer);
        integrate_remaining(integrator, f, inner, &point)
    };
    integrator.integrate(&level, current.lower(), current.upper())
}

/// Ground-truth posterior expectations for low-dimensional densities.
pub struct ExpectationOracle {
    integrator: Box<dyn Integrator>,
}

impl std::fmt::Debug for ExpectationOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpectationOracle").field("integrator", &self.integrator.name()).finish()
    }
}

impl Default for ExpectationOracle {
    fn default() -> Self {
        Self::with_integrator(Box::new(GaussKronrod::default()))
    }
}

impl ExpectationOracle {
    /// Oracle backed by adaptive Gauss–Kronrod with the given tolerances.
    pub fn new(config: QuadratureConfig) -> Result<Self> {
        Ok(Self::with_integrator(Box::new(GaussKronrod::new(config)?)))
    }

    /// Oracle backed by an arbitrary 1-D integrator.
    pub fn with_integrator(integrator: Box<dyn Integrator>) -> Self {
        Self { integrator }
    }

    /// Name of the underlying 1-D integrator.
    pub fn integrator_name(&self) -> &str {
        self.integrator.name()
    }

    /// `∫ f(θ) dθ` over the box `domains`.
    pub fn integrate<F>(&self, f: F, domains: &[Domain]) -> Result<f64>
    where
        F: Fn(&[f64]) -> Result<f64>,
    {
        check_dim(domains)?;
        integrate_remaining(self.integrator.as_ref(), &f, domains, &[])
    }

    /// Normalizing constant `∫ p(θ) dθ`. Must come out finite and positive.
    pub fn evidence<D>(&self, density: D, domains: &[Domain]) -> Result<f64>
    where
        D: Fn(&[f64]) -> Result<f64>,
    {
        let z = self.integrate(density, domains)?;
        if !z.is_finite() || z <= 0.0 {
            log::warn!("evidence is not finite and positive: {}", z);
            return Err(Error::Computation(format!(
                "evidence must be finite and > 0, got {}",
                z
            )));
        }
        log::debug!("evidence over {} variable(s): {:.10e}", domains.len(), z);
        Ok(z)
    }

    /// Posterior expectation `E[g(θ)] = ∫ g(θ) p(θ) dθ / evidence`.
    pub fn expectation<D, G>(&self, density: D, g: G, domains: &[Domain]) -> Result<f64>
    where
        D: Fn(&[f64]) -> Result<f64>,
        G: Fn(&[f64]) -> f64,
    {
        let z = self.evidence(&density, domains)?;
        let num = self.integrate(|theta| Ok(g(theta) * density(theta)?), domains)?;
        Ok(num / z)
    }

    /// Posterior mean of every variable, in declaration order, plus the evidence.
    pub fn posterior_mean<D>(&self, density: D, domains: &[Domain]) -> Result<PosteriorMeans>
    where
        D: Fn(&[f64]) -> Result<f64>,
    {
        let z = self.evidence(&density, domains)?;
        let means = (0..domains.len())
            .map(|i| {
                let num = self.integrate(|theta| Ok(theta[i] * density(theta)?), domains)?;
                Ok(num / z)
            })
            .collect::<Result<Vec<_>>>()?;
        log::debug!("posterior means: {:?}", means);
        Ok(PosteriorMeans::new(means, z))
    }

    /// Posterior variance of every variable, from the first two moments.
    pub fn posterior_variance<D>(&self, density: D, domains: &[Domain]) -> Result<Vec<f64>>
    where
        D: Fn(&[f64]) -> Result<f64>,
    {
        let means = self.posterior_mean(&density, domains)?;
        let z = means.evidence;
        means
            .values()
            .iter()
            .enumerate()
            .map(|(i, &m)| {
                let second = self
                    .integrate(|theta| Ok((theta[i] - m).powi(2) * density(theta)?), domains)?;
                Ok(second / z)
            })
            .collect()
    }
}

fn check_dim(domains: &[Domain]) -> Result<()> {
    if domains.is_empty() {
        return Err(Error::Validation("at least one integration variable is required".into()));
    }
    if domains.len() > MAX_RECOMMENDED_DIM {
        log::warn!(
            "nested quadrature over {} variables; cost grows geometrically with depth",
            domains.len()
        );
    }
    Ok(())
}

/// Posterior means of `density` over `domains` with the default oracle.
pub fn posterior_mean<D>(density: D, domains: &[Domain]) -> Result<PosteriorMeans>
where
    D: Fn(&[f64]) -> Result<f64>,
{
    ExpectationOracle::default().posterior_mean(density, domains)
}
