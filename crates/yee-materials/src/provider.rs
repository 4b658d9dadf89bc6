//! Material trait and resonance terms.
//!
//! All media implement [`Material`], which returns the static relative
//! permittivity and the polarizability resonances registered with the engine.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from material construction.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MaterialError {
    #[error("material must be a Material or a real value for epsilon, got {0}")]
    InvalidSpecification(String),
}

/// A single Lorentzian polarizability resonance.
///
/// The conductivity-equivalent coefficient is
/// $\sigma = f \omega_p^2 / \omega^2$ where $f$ is the resonance strength and
/// $\omega_p$ the plasma frequency, all in engine frequency units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Polarizability {
    /// Conductivity-equivalent coefficient.
    pub sigma: f64,
    /// Resonance frequency.
    pub omega: f64,
    /// Damping rate.
    pub gamma: f64,
}

impl Polarizability {
    pub fn new(sigma: f64, omega: f64, gamma: f64) -> Self {
        Self { sigma, omega, gamma }
    }

    /// The `(sigma, omega, gamma)` triple.
    pub fn as_tuple(&self) -> (f64, f64, f64) {
        (self.sigma, self.omega, self.gamma)
    }
}

/// An electromagnetic medium.
///
/// Implementations are shared between regions behind an `Arc`, so the trait
/// only exposes read access.
pub trait Material: Debug + Send + Sync {
    /// Human-readable name of this material.
    fn name(&self) -> &str;

    /// Relative dielectric constant. Complex values are not supported.
    fn epsilon(&self) -> f64;

    /// Polarizability resonances in registration order.
    fn polarizabilities(&self) -> &[Polarizability];
}
