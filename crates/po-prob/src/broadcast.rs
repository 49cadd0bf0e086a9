//! Broadcast Normal log-density evaluator.
//!
//! Each of observation, location and scale is either a scalar or a vector.
//! Scalars are repeated across the common vector length, the Normal kernel is
//! evaluated pointwise, and the normalizing constant is added once per summed
//! term:
//!
//! ```text
//! log p = sum_i [-(x_i - m_i)^2 / (2 s_i^2) - ln s_i]  -  n/2 * ln(2π)
//! ```
//!
//! Only five argument shapes have defined semantics (observation / location /
//! scale): `sss`, `vss`, `vsv`, `vvs`, `vvv`. A scalar observation paired with
//! a vector location or scale is reported as [`Error::NotImplemented`]; vector
//! arguments of different lengths are a contract violation.

use po_core::{Error, Result};

use crate::math::LN_2PI;
use crate::normal;

/// One argument of the density: a scalar or a borrowed vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Arg<'a> {
    /// Repeated across the broadcast length.
    Scalar(f64),
    /// One value per element.
    Vector(&'a [f64]),
}

impl Arg<'_> {
    /// `None` for scalars, the length for vectors.
    pub fn vector_len(&self) -> Option<usize> {
        match self {
            Arg::Scalar(_) => None,
            Arg::Vector(v) => Some(v.len()),
        }
    }

    /// Whether this is a vector argument.
    pub fn is_vector(&self) -> bool {
        matches!(self, Arg::Vector(_))
    }

    /// Element `i` after broadcasting.
    #[inline]
    fn at(&self, i: usize) -> f64 {
        match self {
            Arg::Scalar(v) => *v,
            Arg::Vector(v) => v[i],
        }
    }
}

impl From<f64> for Arg<'_> {
    fn from(v: f64) -> Self {
        Arg::Scalar(v)
    }
}

impl<'a> From<&'a [f64]> for Arg<'a> {
    fn from(v: &'a [f64]) -> Self {
        Arg::Vector(v)
    }
}

impl<'a> From<&'a Vec<f64>> for Arg<'a> {
    fn from(v: &'a Vec<f64>) -> Self {
        Arg::Vector(v.as_slice())
    }
}

impl<'a, const N: usize> From<&'a [f64; N]> for Arg<'a> {
    fn from(v: &'a [f64; N]) -> Self {
        Arg::Vector(v.as_slice())
    }
}

/// The argument shapes with defined semantics, named observation/location/scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastCase {
    /// All scalar.
    Sss,
    /// Vector observation, scalar location and scale.
    Vss,
    /// Vector observation and scale, scalar location.
    Vsv,
    /// Vector observation and location, scalar scale.
    Vvs,
    /// All vector.
    Vvv,
}

impl BroadcastCase {
    /// Classify an argument triple.
    ///
    /// Fails with [`Error::Validation`] on empty vectors or unequal vector
    /// lengths, and with [`Error::NotImplemented`] on shapes outside the five
    /// defined cases.
    pub fn classify(observation: &Arg<'_>, location: &Arg<'_>, scale: &Arg<'_>) -> Result<Self> {
        let mut len: Option<usize> = None;
        for (name, arg) in [("observation", observation), ("location", location), ("scale", scale)]
        {
            if let Some(n) = arg.vector_len() {
                if n == 0 {
                    return Err(Error::Validation(format!("{} vector is empty", name)));
                }
                match len {
                    Some(m) if m != n => {
                        return Err(Error::Validation(format!(
                            "vector arguments have unequal lengths: {} has {}, expected {}",
                            name, n, m
                        )));
                    }
                    _ => len = Some(n),
                }
            }
        }

        match (observation.is_vector(), location.is_vector(), scale.is_vector()) {
            (false, false, false) => Ok(BroadcastCase::Sss),
            (true, false, false) => Ok(BroadcastCase::Vss),
            (true, false, true) => Ok(BroadcastCase::Vsv),
            (true, true, false) => Ok(BroadcastCase::Vvs),
            (true, true, true) => Ok(BroadcastCase::Vvv),
            (false, loc, sd) => Err(Error::NotImplemented(format!(
                "broadcast of a scalar observation against a {} location and {} scale",
                if loc { "vector" } else { "scalar" },
                if sd { "vector" } else { "scalar" },
            ))),
        }
    }

    /// Three-letter label (`"vsv"` etc.).
    pub fn label(&self) -> &'static str {
        match self {
            BroadcastCase::Sss => "sss",
            BroadcastCase::Vss => "vss",
            BroadcastCase::Vsv => "vsv",
            BroadcastCase::Vvs => "vvs",
            BroadcastCase::Vvv => "vvv",
        }
    }

    /// Number of independent terms `n` the normalizing constant scales with.
    ///
    /// The argument supplying the per-element degrees of freedom: the scale
    /// vector for `vsv`, the observation vector otherwise, `1` when all scalar.
    pub fn correction_len(&self, observation: &Arg<'_>, scale: &Arg<'_>) -> usize {
        match self {
            BroadcastCase::Sss => 1,
            BroadcastCase::Vsv => scale.vector_len().unwrap_or(1),
            BroadcastCase::Vss | BroadcastCase::Vvs | BroadcastCase::Vvv => {
                observation.vector_len().unwrap_or(1)
            }
        }
    }
}

/// Normalizing constant magnitude `n/2 * ln(2π)`.
#[inline]
pub fn normal_correction(n: usize) -> f64 {
    0.5 * n as f64 * LN_2PI
}

struct Evaluation {
    kernel_sum: f64,
    n: usize,
}

fn evaluate(observation: Arg<'_>, location: Arg<'_>, scale: Arg<'_>) -> Result<Evaluation> {
    let case = BroadcastCase::classify(&observation, &location, &scale)?;
    let n = case.correction_len(&observation, &scale);
    let mut kernel_sum = 0.0;
    for i in 0..n {
        kernel_sum += normal::log_kernel(observation.at(i), location.at(i), scale.at(i))?;
    }
    Ok(Evaluation { kernel_sum, n })
}

/// Normal log-density of `observation` under `N(location, scale)` with broadcasting.
///
/// Sum of the pointwise kernels plus `-n/2 * ln(2π)`; equal to the sum of
/// independent scalar Normal log-densities over the broadcast shape.
pub fn evaluate_log_density<'a>(
    observation: impl Into<Arg<'a>>,
    location: impl Into<Arg<'a>>,
    scale: impl Into<Arg<'a>>,
) -> Result<f64> {
    let e = evaluate(observation.into(), location.into(), scale.into())?;
    Ok(e.kernel_sum - normal_correction(e.n))
}

/// Same as [`evaluate_log_density`] without the normalizing constant.
///
/// This is the value reported by AD engines that drop constant terms.
pub fn evaluate_log_density_kernel<'a>(
    observation: impl Into<Arg<'a>>,
    location: impl Into<Arg<'a>>,
    scale: impl Into<Arg<'a>>,
) -> Result<f64> {
    Ok(evaluate(observation.into(), location.into(), scale.into())?.kernel_sum)
}

/// Joint density, `exp` of [`evaluate_log_density`].
pub fn evaluate_density<'a>(
    observation: impl Into<Arg<'a>>,
    location: impl Into<Arg<'a>>,
    scale: impl Into<Arg<'a>>,
) -> Result<f64> {
    Ok(evaluate_log_density(observation, location, scale)?.exp())
}
