//! Canonical low-dimensional models with known posterior means.
//!
//! Each scenario owns its observed data and prior parameters; nothing is
//! shared through globals. Densities are unnormalized joint densities
//! `prior(θ) * likelihood(data | θ)` over the declared domains.

use po_core::{Domain, Error, PosteriorMeans, Result};
use po_prob::{bernoulli, evaluate_density, normal, uniform};

use crate::expectation::ExpectationOracle;

/// A model whose posterior means the expectation oracle can compute.
pub trait Scenario: Send + Sync {
    /// Short identifier.
    fn name(&self) -> &'static str;

    /// Parameter names in declaration order.
    fn parameter_names(&self) -> &'static [&'static str];

    /// Integration domain of each parameter, in declaration order.
    fn domains(&self) -> Result<Vec<Domain>>;

    /// Unnormalized joint density at `theta`.
    fn density(&self, theta: &[f64]) -> Result<f64>;

    /// Posterior means under `oracle`.
    fn posterior_mean(&self, oracle: &ExpectationOracle) -> Result<PosteriorMeans> {
        let domains = self.domains()?;
        log::debug!("scenario {}: {} parameter(s)", self.name(), domains.len());
        oracle.posterior_mean(|theta| self.density(theta), &domains)
    }
}

fn check_arity(name: &str, expected: usize, theta: &[f64]) -> Result<()> {
    if theta.len() != expected {
        return Err(Error::Validation(format!(
            "{} expects {} parameter(s), got {}",
            name,
            expected,
            theta.len()
        )));
    }
    Ok(())
}

fn check_positive(what: &str, v: f64) -> Result<()> {
    if !v.is_finite() || v <= 0.0 {
        return Err(Error::Validation(format!("{} must be finite and > 0, got {}", what, v)));
    }
    Ok(())
}

/// Paired `(x, y)` observations for the linear models.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearData {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl LinearData {
    /// Validate and wrap a data set.
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        if x.is_empty() || x.len() != y.len() {
            return Err(Error::Validation(format!(
                "x and y must be non-empty with equal lengths, got {} and {}",
                x.len(),
                y.len()
            )));
        }
        if x.iter().chain(&y).any(|v| !v.is_finite()) {
            return Err(Error::Validation("observations must be finite".into()));
        }
        Ok(Self { x, y })
    }

    /// Points on the line `y = x + 1`, `x = 2.5, 3, ..., 5`.
    pub fn exact_line() -> Self {
        Self {
            x: vec![2.5, 3.0, 3.5, 4.0, 4.5, 5.0],
            y: vec![3.5, 4.0, 4.5, 5.0, 5.5, 6.0],
        }
    }

    /// Both coordinates perturbed off the line.
    pub fn fuzzy() -> Self {
        Self {
            x: vec![2.4, 3.1, 3.6, 4.0, 4.5, 5.0],
            y: vec![3.5, 4.0, 4.4, 5.01, 5.46, 6.1],
        }
    }

    /// Perturbed inputs against nearly exact outputs.
    pub fn end_to_end() -> Self {
        Self {
            x: vec![2.4, 3.1, 3.6, 4.0, 4.5, 5.0],
            y: vec![3.5, 4.0, 4.5, 5.0, 5.5, 6.1],
        }
    }

    /// Three points with mixed signs.
    pub fn dot() -> Self {
        Self { x: vec![1.0, -1.0, 0.5], y: vec![2.0, -0.13, 1.32] }
    }

    /// Inputs.
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// Outputs.
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Always false for validated data.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// `x * w + b` for every input.
    fn line(&self, w: f64, b: f64) -> Vec<f64> {
        self.x.iter().map(|&xi| xi * w + b).collect()
    }

    /// `prod_i N(y_i | x_i w + b, scale_i)`; `scale` is a scalar or one entry per point.
    fn likelihood(&self, w: f64, b: f64, scale: &[f64]) -> Result<f64> {
        let mean = self.line(w, b);
        match scale {
            [s] => evaluate_density(&self.y, &mean, *s),
            _ => evaluate_density(&self.y, &mean, scale),
        }
    }
}

/// One mean `w ~ Uniform(-bound, bound)` with a single observation `x ~ N(w, noise)`.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformNormalMean {
    /// Half-width of the uniform prior.
    pub bound: f64,
    /// The observation.
    pub observation: f64,
    /// Observation noise.
    pub noise: f64,
}

impl Default for UniformNormalMean {
    fn default() -> Self {
        Self { bound: 20.0, observation: 3.0, noise: 1.0 }
    }
}

impl Scenario for UniformNormalMean {
    fn name(&self) -> &'static str {
        "uniform_normal_mean"
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        &["w"]
    }

    fn domains(&self) -> Result<Vec<Domain>> {
        check_positive("bound", self.bound)?;
        Ok(vec![Domain::interval(-self.bound, self.bound)?])
    }

    fn density(&self, theta: &[f64]) -> Result<f64> {
        check_arity(self.name(), 1, theta)?;
        let w = theta[0];
        Ok(uniform::pdf(w, -self.bound, self.bound)? * normal::pdf(self.observation, w, self.noise)?)
    }
}

/// Slope only: `w ~ N(0, prior_scale)`, `y ~ N(x w + bias, noise)`.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionWeight {
    /// Observations.
    pub data: LinearData,
    /// Known intercept.
    pub bias: f64,
    /// Standard deviation of the prior on `w`.
    pub prior_scale: f64,
    /// Observation noise.
    pub noise: f64,
}

impl Default for RegressionWeight {
    fn default() -> Self {
        Self { data: LinearData::exact_line(), bias: 1.0, prior_scale: 2.0, noise: 0.5 }
    }
}

impl Scenario for RegressionWeight {
    fn name(&self) -> &'static str {
        "regression_weight"
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        &["w"]
    }

    fn domains(&self) -> Result<Vec<Domain>> {
        Ok(vec![Domain::real_line()])
    }

    fn density(&self, theta: &[f64]) -> Result<f64> {
        check_arity(self.name(), 1, theta)?;
        let w = theta[0];
        Ok(normal::pdf(w, 0.0, self.prior_scale)? * self.data.likelihood(w, self.bias, &[self.noise])?)
    }
}

/// Slope and intercept with Normal priors: `w, b ~ N(0, prior_scale)`.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionNormalPriors {
    /// Observations.
    pub data: LinearData,
    /// Standard deviation of both priors.
    pub prior_scale: f64,
    /// Observation noise.
    pub noise: f64,
}

impl Default for RegressionNormalPriors {
    fn default() -> Self {
        Self { data: LinearData::exact_line(), prior_scale: 2.0, noise: 0.5 }
    }
}

impl Scenario for RegressionNormalPriors {
    fn name(&self) -> &'static str {
        "regression_normal_priors"
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        &["w", "b"]
    }

    fn domains(&self) -> Result<Vec<Domain>> {
        Ok(vec![Domain::real_line(), Domain::real_line()])
    }

    fn density(&self, theta: &[f64]) -> Result<f64> {
        check_arity(self.name(), 2, theta)?;
        let (w, b) = (theta[0], theta[1]);
        let prior = normal::pdf(w, 0.0, self.prior_scale)? * normal::pdf(b, 0.0, self.prior_scale)?;
        Ok(prior * self.data.likelihood(w, b, &[self.noise])?)
    }
}

/// Slope and intercept with `Uniform(lower, upper)` priors.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionUniformPriors {
    /// Observations.
    pub data: LinearData,
    /// Lower bound of both priors.
    pub lower: f64,
    /// Upper bound of both priors.
    pub upper: f64,
    /// Observation noise.
    pub noise: f64,
}

impl RegressionUniformPriors {
    /// `Uniform(0, 2)` priors and noise 0.5 on the given data.
    pub fn with_data(data: LinearData) -> Self {
        Self { data, lower: 0.0, upper: 2.0, noise: 0.5 }
    }

    /// Data exactly on `y = x + 1`.
    pub fn exact() -> Self {
        Self::with_data(LinearData::exact_line())
    }

    /// Perturbed inputs and outputs.
    pub fn fuzzy() -> Self {
        Self::with_data(LinearData::fuzzy())
    }

    /// Perturbed inputs, nearly exact outputs.
    pub fn end_to_end() -> Self {
        Self::with_data(LinearData::end_to_end())
    }

    /// Three mixed-sign points.
    pub fn dot() -> Self {
        Self::with_data(LinearData::dot())
    }
}

impl Default for RegressionUniformPriors {
    fn default() -> Self {
        Self::exact()
    }
}

impl Scenario for RegressionUniformPriors {
    fn name(&self) -> &'static str {
        "regression_uniform_priors"
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        &["w", "b"]
    }

    fn domains(&self) -> Result<Vec<Domain>> {
        let d = Domain::interval(self.lower, self.upper)?;
        Ok(vec![d, d])
    }

    fn density(&self, theta: &[f64]) -> Result<f64> {
        check_arity(self.name(), 2, theta)?;
        let (w, b) = (theta[0], theta[1]);
        let prior = uniform::pdf(w, self.lower, self.upper)? * uniform::pdf(b, self.lower, self.upper)?;
        Ok(prior * self.data.likelihood(w, b, &[self.noise])?)
    }
}

/// Coin bias `t ~ Uniform(0, 1)` with Bernoulli flips.
#[derive(Debug, Clone, PartialEq)]
pub struct CoinFlip {
    flips: Vec<u8>,
}

impl CoinFlip {
    /// Flips must be 0 or 1.
    pub fn new(flips: Vec<u8>) -> Result<Self> {
        if let Some(bad) = flips.iter().find(|&&k| k > 1) {
            return Err(Error::Validation(format!("flips must be 0 or 1, got {}", bad)));
        }
        Ok(Self { flips })
    }

    /// Observed flips.
    pub fn flips(&self) -> &[u8] {
        &self.flips
    }

    /// Closed-form posterior mean of the `Beta(heads + 1, tails + 1)` posterior.
    pub fn beta_posterior_mean(&self) -> f64 {
        let heads = self.flips.iter().filter(|&&k| k == 1).count();
        (heads as f64 + 1.0) / (self.flips.len() as f64 + 2.0)
    }
}

impl Default for CoinFlip {
    fn default() -> Self {
        Self { flips: vec![0, 1, 1] }
    }
}

impl Scenario for CoinFlip {
    fn name(&self) -> &'static str {
        "coin_flip"
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        &["t"]
    }

    fn domains(&self) -> Result<Vec<Domain>> {
        Ok(vec![Domain::interval(0.0, 1.0)?])
    }

    fn density(&self, theta: &[f64]) -> Result<f64> {
        check_arity(self.name(), 1, theta)?;
        let t = theta[0];
        Ok(uniform::pdf(t, 0.0, 1.0)? * bernoulli::likelihood(&self.flips, t)?)
    }
}

/// Two observations with their own noise scales: `(s1, s2, w, b)`.
///
/// `s1, s2 ~ Uniform(scale_lower, scale_upper)`,
/// `w, b ~ Uniform(coef_lower, coef_upper)`, `y ~ N(x w + b, [s1, s2])`.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorScaleRegression {
    data: LinearData,
    /// Prior support of both scales.
    pub scale_bounds: (f64, f64),
    /// Prior support of slope and intercept.
    pub coef_bounds: (f64, f64),
}

impl VectorScaleRegression {
    /// Exactly two observations are required, one per scale parameter.
    pub fn new(data: LinearData) -> Result<Self> {
        if data.len() != 2 {
            return Err(Error::Validation(format!(
                "vector-scale regression needs exactly 2 observations, got {}",
                data.len()
            )));
        }
        Ok(Self { data, scale_bounds: (0.5, 5.0), coef_bounds: (0.0, 2.0) })
    }

    /// Observations.
    pub fn data(&self) -> &LinearData {
        &self.data
    }
}

impl Default for VectorScaleRegression {
    fn default() -> Self {
        Self {
            data: LinearData { x: vec![2.5, 3.0], y: vec![3.5, 4.0] },
            scale_bounds: (0.5, 5.0),
            coef_bounds: (0.0, 2.0),
        }
    }
}

impl Scenario for VectorScaleRegression {
    fn name(&self) -> &'static str {
        "vector_scale_regression"
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        &["s1", "s2", "w", "b"]
    }

    fn domains(&self) -> Result<Vec<Domain>> {
        let (slo, shi) = self.scale_bounds;
        let (clo, chi) = self.coef_bounds;
        check_positive("scale lower bound", slo)?;
        let s = Domain::interval(slo, shi)?;
        let c = Domain::interval(clo, chi)?;
        Ok(vec![s, s, c, c])
    }

    fn density(&self, theta: &[f64]) -> Result<f64> {
        check_arity(self.name(), 4, theta)?;
        let (slo, shi) = self.scale_bounds;
        let (clo, chi) = self.coef_bounds;
        let (s1, s2, w, b) = (theta[0], theta[1], theta[2], theta[3]);
        let prior = uniform::pdf(s1, slo, shi)?
            * uniform::pdf(s2, slo, shi)?
            * uniform::pdf(w, clo, chi)?
            * uniform::pdf(b, clo, chi)?;
        Ok(prior * self.data.likelihood(w, b, &[s1, s2])?)
    }
}

/// Every scenario with its default data.
pub fn catalogue() -> Vec<Box<dyn Scenario>> {
    vec![
        Box::new(UniformNormalMean::default()),
        Box::new(RegressionWeight::default()),
        Box::new(RegressionNormalPriors::default()),
        Box::new(RegressionUniformPriors::exact()),
        Box::new(RegressionUniformPriors::fuzzy()),
        Box::new(RegressionUniformPriors::end_to_end()),
        Box::new(RegressionUniformPriors::dot()),
        Box::new(CoinFlip::default()),
        Box::new(VectorScaleRegression::default()),
    ]
}
