//! Probability building blocks for the reference oracles.
//!
//! This crate hosts the probability math shared by the oracles:
//! - base distributions (log-densities, kernels, derivatives)
//! - link functions (for unconstrained parameterizations)
//! - the broadcast Normal log-density evaluator
//! - small numeric helpers (stable sigmoid/logit primitives)

pub mod bernoulli;
pub mod broadcast;
pub mod cauchy;
pub mod math;
pub mod normal;
pub mod transforms;
pub mod uniform;

pub use broadcast::{
    Arg, BroadcastCase, evaluate_density, evaluate_log_density, evaluate_log_density_kernel,
};
pub use transforms::{Bijector, Link, ParameterTransform};
