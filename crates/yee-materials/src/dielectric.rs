//! Dielectric media with optional polarizability resonances.

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::provider::{Material, Polarizability};

static AIR: Lazy<Arc<dyn Material>> = Lazy::new(|| Dielectric::named("air", 1.0).shared());

/// Ideal air or vacuum (epsilon 1.0, no resonances).
///
/// Every call returns the same shared instance.
pub fn air() -> Arc<dyn Material> {
    Arc::clone(&*AIR)
}

/// Another name for [`air`].
pub fn vacuum() -> Arc<dyn Material> {
    air()
}

/// A material with a dielectric constant and polarizability resonances.
#[derive(Debug, Clone, PartialEq)]
pub struct Dielectric {
    name: String,
    epsilon: f64,
    polarizabilities: Vec<Polarizability>,
}

impl Dielectric {
    /// Create a dielectric with the given relative permittivity.
    pub fn new(epsilon: f64) -> Self {
        Self::named("dielectric", epsilon)
    }

    /// Create a dielectric with a display name.
    pub fn named(name: impl Into<String>, epsilon: f64) -> Self {
        Self {
            name: name.into(),
            epsilon,
            polarizabilities: Vec::new(),
        }
    }

    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.epsilon = epsilon;
    }

    /// Append a polarizability resonance. This can be used to model metals.
    ///
    /// # Arguments
    /// * `sigma` - Conductivity-equivalent coefficient $f \omega_p^2 / \omega^2$.
    /// * `omega` - Resonance frequency (engine frequency units).
    /// * `gamma` - Damping frequency (engine frequency units).
    pub fn add_polarizability(&mut self, sigma: f64, omega: f64, gamma: f64) {
        self.polarizabilities
            .push(Polarizability::new(sigma, omega, gamma));
    }

    /// Builder form of [`add_polarizability`](Self::add_polarizability).
    pub fn with_polarizability(mut self, sigma: f64, omega: f64, gamma: f64) -> Self {
        self.add_polarizability(sigma, omega, gamma);
        self
    }

    /// Wrap into a shareable material reference.
    pub fn shared(self) -> Arc<dyn Material> {
        Arc::new(self)
    }
}

impl Default for Dielectric {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Material for Dielectric {
    fn name(&self) -> &str {
        &self.name
    }

    fn epsilon(&self) -> f64 {
        self.epsilon
    }

    fn polarizabilities(&self) -> &[Polarizability] {
        &self.polarizabilities
    }
}
