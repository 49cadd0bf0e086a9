//! # po-core
//!
//! Core types, traits, and error handling for the reference oracles.
//!
//! This crate provides:
//! - The shared error type
//! - Core traits (Integrator)
//! - Shared data structures (integration domains, posterior means)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use traits::Integrator;
pub use types::{Domain, PosteriorMeans};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
