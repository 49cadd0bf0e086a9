//! # po-oracle
//!
//! Reference oracles for checking a probabilistic-programming backend.
//!
//! This crate provides:
//! - Analytic gradients of the non-centered stochastic-volatility model
//! - Ground-truth posterior means by nested adaptive quadrature
//! - A catalogue of low-dimensional models with known posteriors
//!
//! ## Architecture
//!
//! The expectation oracle depends on the `Integrator` trait from po-core, not
//! on the Gauss–Kronrod rule shipped here.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Posterior expectations by nested 1-D quadrature.
pub mod expectation;
/// Central finite differences for gradient cross-checks.
pub mod finite_diff;
/// Adaptive Gauss–Kronrod quadrature.
pub mod quadrature;
/// Canonical scenarios with known posteriors.
pub mod scenarios;
/// Stochastic-volatility log-posterior and analytic gradients.
pub mod stochastic_volatility;

pub use expectation::{ExpectationOracle, posterior_mean};
pub use quadrature::{GaussKronrod, QuadratureConfig};
pub use scenarios::{
    CoinFlip, LinearData, RegressionNormalPriors, RegressionUniformPriors, RegressionWeight,
    Scenario, UniformNormalMean, VectorScaleRegression,
};
pub use stochastic_volatility::{
    GradientTarget, StochasticVolatility, SvPoint, SvPriors, gradient_wrt_innovations,
};
