//! Analytic gradients of the non-centered stochastic-volatility model.
//!
//! ```text
//! phi      ~ Uniform(-1, 1)          (sampled as Phi = logit((phi + 1) / 2))
//! sigma    ~ HalfCauchy(0, g_sigma)  (sampled as Sigma = ln sigma)
//! mu       ~ Cauchy(0, g_mu)
//! h_std[t] ~ N(0, 1)
//! h[0]     = h_std[0] * sigma / sqrt(1 - phi^2) + mu
//! h[t]     = h_std[t] * sigma + mu + phi * (h[t-1] - mu)
//! y[t]     ~ N(0, exp(h[t] / 2))
//! ```
//!
//! Log-densities drop the constants an AD engine drops (`ln sqrt(2π)`, `ln π`,
//! the half-Cauchy factor 2), so [`StochasticVolatility::log_posterior`] is the
//! unnormalized value a sampler sees in unconstrained space.
//!
//! Every gradient is `prior term + sum_t dlogN(y[t])/dh[t] * dh[t]/dtarget`.
//! `dh/dtarget` comes from a single forward tangent sweep through the
//! recursion, seeded per target.

use po_core::{Error, Result};
use po_prob::transforms::{Link, ParameterTransform};
use po_prob::{cauchy, normal, uniform};
use serde::{Deserialize, Serialize};

/// Number of global parameters `(phi, sigma, mu)` ahead of the innovations.
pub const N_GLOBAL: usize = 3;

/// Prior scales.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvPriors {
    /// Scale of the half-Cauchy prior on `sigma`.
    pub sigma_scale: f64,
    /// Scale of the Cauchy prior on `mu`.
    pub mu_scale: f64,
}

impl Default for SvPriors {
    fn default() -> Self {
        Self { sigma_scale: 5.0, mu_scale: 10.0 }
    }
}

impl SvPriors {
    fn validate(&self) -> Result<()> {
        for (name, v) in [("sigma_scale", self.sigma_scale), ("mu_scale", self.mu_scale)] {
            if !v.is_finite() || v <= 0.0 {
                return Err(Error::Validation(format!("{} must be finite and > 0, got {}", name, v)));
            }
        }
        Ok(())
    }
}

/// A point in parameter space, held in constrained coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct SvPoint {
    /// Persistence, in `(-1, 1)`.
    pub phi: f64,
    /// Innovation scale, `> 0`.
    pub sigma: f64,
    /// Level.
    pub mu: f64,
    /// Standardized innovations.
    pub h_std: Vec<f64>,
}

impl SvPoint {
    /// Validate and build from constrained values.
    pub fn from_constrained(phi: f64, sigma: f64, mu: f64, h_std: Vec<f64>) -> Result<Self> {
        let point = Self { phi, sigma, mu, h_std };
        point.validate()?;
        Ok(point)
    }

    /// Check the parameter supports. Every model entry point re-runs this.
    pub fn validate(&self) -> Result<()> {
        if !(self.phi > -1.0 && self.phi < 1.0) {
            return Err(Error::Validation(format!("phi must lie in (-1, 1), got {}", self.phi)));
        }
        if !self.sigma.is_finite() || self.sigma <= 0.0 {
            return Err(Error::Validation(format!(
                "sigma must be finite and > 0, got {}",
                self.sigma
            )));
        }
        if !self.mu.is_finite() {
            return Err(Error::Validation(format!("mu must be finite, got {}", self.mu)));
        }
        if self.h_std.is_empty() {
            return Err(Error::Validation("h_std must not be empty".into()));
        }
        if let Some(bad) = self.h_std.iter().find(|v| !v.is_finite()) {
            return Err(Error::Validation(format!("h_std entries must be finite, got {}", bad)));
        }
        Ok(())
    }

    /// Build from the flat unconstrained vector `[Phi, Sigma, mu, h_std...]`.
    pub fn from_unconstrained(z: &[f64]) -> Result<Self> {
        if z.len() <= N_GLOBAL {
            return Err(Error::Validation(format!(
                "unconstrained vector needs {} globals and at least one innovation, got {} entries",
                N_GLOBAL,
                z.len()
            )));
        }
        let theta = global_transform()?.forward(&z[..N_GLOBAL])?;
        Self::from_constrained(theta[0], theta[1], theta[2], z[N_GLOBAL..].to_vec())
    }

    /// Flat unconstrained vector `[Phi, Sigma, mu, h_std...]`.
    pub fn to_unconstrained(&self) -> Result<Vec<f64>> {
        let mut z = global_transform()?.inverse(&[self.phi, self.sigma, self.mu])?;
        z.extend_from_slice(&self.h_std);
        Ok(z)
    }

    /// Number of time steps.
    pub fn len(&self) -> usize {
        self.h_std.len()
    }

    /// Always false for a validated point.
    pub fn is_empty(&self) -> bool {
        self.h_std.is_empty()
    }
}

/// Which unconstrained coordinate to differentiate with respect to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GradientTarget {
    /// Standardized innovation `h_std[k]`.
    Innovation(usize),
    /// `Phi`, the logit-linked persistence.
    Persistence,
    /// `Sigma = ln sigma`.
    Scale,
    /// `mu` (identity link).
    Level,
}

impl GradientTarget {
    /// Position in the flat unconstrained vector.
    pub fn flat_index(&self) -> usize {
        match *self {
            GradientTarget::Persistence => 0,
            GradientTarget::Scale => 1,
            GradientTarget::Level => 2,
            GradientTarget::Innovation(k) => N_GLOBAL + k,
        }
    }
}

fn global_transform() -> Result<ParameterTransform> {
    Ok(ParameterTransform::new(vec![Link::logit(-1.0, 1.0)?, Link::Log, Link::Identity]))
}

/// Tangent seed: derivatives of `(phi, sigma, mu)` w.r.t. the target, plus
/// the innovation it points at, if any.
#[derive(Debug, Clone, Copy, Default)]
struct Seed {
    d_phi: f64,
    d_sigma: f64,
    d_mu: f64,
    innovation: Option<usize>,
}

/// The stochastic-volatility model bound to an observed series.
#[derive(Debug, Clone)]
pub struct StochasticVolatility {
    y: Vec<f64>,
    priors: SvPriors,
    transform: ParameterTransform,
}

impl StochasticVolatility {
    /// Model with default priors.
    pub fn new(observed_y: Vec<f64>) -> Result<Self> {
        Self::with_priors(observed_y, SvPriors::default())
    }

    /// Model with explicit prior scales.
    pub fn with_priors(observed_y: Vec<f64>, priors: SvPriors) -> Result<Self> {
        if observed_y.is_empty() {
            return Err(Error::Validation("observed series must not be empty".into()));
        }
        if let Some(bad) = observed_y.iter().find(|v| !v.is_finite()) {
            return Err(Error::Validation(format!("observations must be finite, got {}", bad)));
        }
        priors.validate()?;
        Ok(Self { y: observed_y, priors, transform: global_transform()? })
    }

    /// Observed series.
    pub fn observed(&self) -> &[f64] {
        &self.y
    }

    /// Prior scales.
    pub fn priors(&self) -> &SvPriors {
        &self.priors
    }

    /// Length of the flat unconstrained vector.
    pub fn dim(&self) -> usize {
        N_GLOBAL + self.y.len()
    }

    fn check_point(&self, point: &SvPoint) -> Result<()> {
        point.validate()?;
        if point.h_std.len() != self.y.len() {
            return Err(Error::Validation(format!(
                "h_std has {} entries but the series has {} observations",
                point.h_std.len(),
                self.y.len()
            )));
        }
        Ok(())
    }

    /// Log-volatility path `h[0..T]`.
    pub fn latent_states(&self, point: &SvPoint) -> Result<Vec<f64>> {
        self.check_point(point)?;
        Ok(latent_path(point))
    }

    /// Unnormalized log-posterior in unconstrained space at `point`.
    pub fn log_posterior(&self, point: &SvPoint) -> Result<f64> {
        self.check_point(point)?;
        let z = self.transform.inverse(&[point.phi, point.sigma, point.mu])?;

        let mut lp = uniform::logpdf(point.phi, -1.0, 1.0)?
            + cauchy::log_kernel(point.sigma, 0.0, self.priors.sigma_scale)?
            + cauchy::log_kernel(point.mu, 0.0, self.priors.mu_scale)?
            + self.transform.log_abs_det_jacobian(&z)?;

        for &e in &point.h_std {
            lp += normal::log_kernel(e, 0.0, 1.0)?;
        }
        for (&y, h) in self.y.iter().zip(latent_path(point)) {
            lp += normal::log_kernel(y, 0.0, (0.5 * h).exp())?;
        }
        Ok(lp)
    }

    /// [`log_posterior`](Self::log_posterior) at a flat unconstrained vector.
    pub fn log_posterior_unconstrained(&self, z: &[f64]) -> Result<f64> {
        self.check_flat(z)?;
        self.log_posterior(&SvPoint::from_unconstrained(z)?)
    }

    /// `d log_posterior / d target` at `point`.
    pub fn gradient(&self, point: &SvPoint, target: GradientTarget) -> Result<f64> {
        self.check_point(point)?;
        let h = latent_path(point);
        let z = self.transform.inverse(&[point.phi, point.sigma, point.mu])?;
        let jac = self.transform.jacobian_diag(&z)?;
        let grad_log_jac = self.transform.grad_log_abs_det_jacobian(&z)?;

        let (prior, seed) = match target {
            GradientTarget::Innovation(k) => {
                if k >= point.h_std.len() {
                    return Err(Error::Validation(format!(
                        "innovation index {} out of range for {} time steps",
                        k,
                        point.h_std.len()
                    )));
                }
                let prior = normal::dlogpdf_dx(point.h_std[k], 0.0, 1.0)?;
                (prior, Seed { innovation: Some(k), ..Seed::default() })
            }
            // The uniform prior on phi is flat; only the link contributes.
            GradientTarget::Persistence => {
                (grad_log_jac[0], Seed { d_phi: jac[0], ..Seed::default() })
            }
            GradientTarget::Scale => {
                let d = cauchy::dlogpdf_dx(point.sigma, 0.0, self.priors.sigma_scale)?;
                (d * jac[1] + grad_log_jac[1], Seed { d_sigma: jac[1], ..Seed::default() })
            }
            GradientTarget::Level => {
                let d = cauchy::dlogpdf_dx(point.mu, 0.0, self.priors.mu_scale)?;
                (d * jac[2] + grad_log_jac[2], Seed { d_mu: jac[2], ..Seed::default() })
            }
        };

        let dh = tangent(point, &h, seed);
        let mut likelihood = 0.0;
        for ((&y, &ht), &dht) in self.y.iter().zip(&h).zip(&dh) {
            let scale = (0.5 * ht).exp();
            // d scale / d h = scale / 2
            likelihood += normal::dlogpdf_dsigma(y, 0.0, scale)? * 0.5 * scale * dht;
        }
        Ok(prior + likelihood)
    }

    /// Gradient w.r.t. the flat unconstrained vector `[Phi, Sigma, mu, h_std...]`.
    pub fn full_gradient(&self, point: &SvPoint) -> Result<Vec<f64>> {
        self.check_point(point)?;
        let globals = [GradientTarget::Persistence, GradientTarget::Scale, GradientTarget::Level];
        globals
            .into_iter()
            .chain((0..point.len()).map(GradientTarget::Innovation))
            .map(|t| self.gradient(point, t))
            .collect()
    }

    fn check_flat(&self, z: &[f64]) -> Result<()> {
        if z.len() != self.dim() {
            return Err(Error::Validation(format!(
                "expected {} unconstrained coordinates, got {}",
                self.dim(),
                z.len()
            )));
        }
        Ok(())
    }
}

fn latent_path(point: &SvPoint) -> Vec<f64> {
    let (phi, sigma, mu) = (point.phi, point.sigma, point.mu);
    let h_std = &point.h_std;
    let mut h = Vec::with_capacity(h_std.len());
    let mut prev = h_std[0] * sigma / (1.0 - phi * phi).sqrt() + mu;
    h.push(prev);
    for &e in &h_std[1..] {
        prev = e * sigma + mu + phi * (prev - mu);
        h.push(prev);
    }
    h
}

/// Forward-mode derivative of the latent path for one seed.
fn tangent(point: &SvPoint, h: &[f64], seed: Seed) -> Vec<f64> {
    let (phi, sigma, mu) = (point.phi, point.sigma, point.mu);
    let h_std = &point.h_std;
    let Seed { d_phi, d_sigma, d_mu, innovation } = seed;
    let unit = |t: usize| if innovation == Some(t) { 1.0 } else { 0.0 };

    let r2 = 1.0 - phi * phi;
    let r = r2.sqrt();
    let mut dh = Vec::with_capacity(h.len());
    let mut prev = unit(0) * sigma / r
        + h_std[0] * d_sigma / r
        + h_std[0] * sigma * phi * d_phi / (r2 * r)
        + d_mu;
    dh.push(prev);
    for t in 1..h.len() {
        prev = unit(t) * sigma
            + h_std[t] * d_sigma
            + d_mu
            + d_phi * (h[t - 1] - mu)
            + phi * (prev - d_mu);
        dh.push(prev);
    }
    dh
}

/// `d log p / d h_std[k]` for every innovation, default priors.
///
/// Closed form: `-h_std[k] - 1/2 sum_{t>=k} (1 - y[t]^2 exp(-h[t])) dh[t]/dh_std[k]`
/// with `dh[k]/dh_std[k]` equal to `sigma / sqrt(1 - phi^2)` at `k = 0` and
/// `sigma` otherwise, and `dh[t]/dh_std[k] = phi dh[t-1]/dh_std[k]` after that.
pub fn gradient_wrt_innovations(
    observed_y: &[f64],
    phi: f64,
    sigma: f64,
    mu: f64,
    h_std: &[f64],
) -> Result<Vec<f64>> {
    let model = StochasticVolatility::new(observed_y.to_vec())?;
    let point = SvPoint::from_constrained(phi, sigma, mu, h_std.to_vec())?;
    model.check_point(&point)?;
    (0..point.len()).map(|k| model.gradient(&point, GradientTarget::Innovation(k))).collect()
}
