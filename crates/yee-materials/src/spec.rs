//! Conversion of user-supplied material arguments into shared materials.

use std::sync::Arc;

use num_complex::Complex64;

use crate::dielectric::{air, Dielectric};
use crate::provider::{Material, MaterialError};

/// Anything a region accepts as its material.
#[derive(Debug, Clone)]
pub enum MaterialSpec {
    /// An existing material, shared by reference.
    Material(Arc<dyn Material>),
    /// A real relative permittivity.
    Epsilon(f64),
    /// A complex permittivity. Always rejected.
    Complex(Complex64),
    /// A material name (`"air"`, `"vacuum"`) or a numeric epsilon as text.
    Text(String),
}

impl MaterialSpec {
    /// Resolve into a shared material.
    pub fn resolve(self) -> Result<Arc<dyn Material>, MaterialError> {
        match self {
            MaterialSpec::Material(material) => Ok(material),
            MaterialSpec::Epsilon(epsilon) => Ok(Dielectric::new(epsilon).shared()),
            MaterialSpec::Complex(epsilon) => Err(MaterialError::InvalidSpecification(format!(
                "complex epsilon {epsilon} (complex dielectric constants are not supported)"
            ))),
            MaterialSpec::Text(text) => {
                let trimmed = text.trim();
                match trimmed.to_ascii_lowercase().as_str() {
                    "air" | "vacuum" => Ok(air()),
                    _ => trimmed
                        .parse::<f64>()
                        .map(|epsilon| Dielectric::new(epsilon).shared())
                        .map_err(|_| MaterialError::InvalidSpecification(format!("'{text}'"))),
                }
            }
        }
    }
}

impl From<Arc<dyn Material>> for MaterialSpec {
    fn from(material: Arc<dyn Material>) -> Self {
        MaterialSpec::Material(material)
    }
}

impl From<Dielectric> for MaterialSpec {
    fn from(material: Dielectric) -> Self {
        MaterialSpec::Material(material.shared())
    }
}

impl From<f64> for MaterialSpec {
    fn from(epsilon: f64) -> Self {
        MaterialSpec::Epsilon(epsilon)
    }
}

impl From<Complex64> for MaterialSpec {
    fn from(epsilon: Complex64) -> Self {
        MaterialSpec::Complex(epsilon)
    }
}

impl From<&str> for MaterialSpec {
    fn from(text: &str) -> Self {
        MaterialSpec::Text(text.to_owned())
    }
}

impl From<String> for MaterialSpec {
    fn from(text: String) -> Self {
        MaterialSpec::Text(text)
    }
}
