//! Errors raised while composing and running a scenario.

use thiserror::Error;
use yee_engine::EngineError;
use yee_geometry::GeometryError;
use yee_materials::MaterialError;

use crate::domain::MaterialMode;

/// Errors from scenario composition and sessions.
///
/// Validation errors are raised before anything is stored, so a failed call
/// leaves the entity unchanged. Engine errors pass through untranslated.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Dimension mismatch in {what}: expected {expected}, got {}", describe(.found))]
    DimensionMismatch {
        what: String,
        expected: usize,
        found: Option<usize>,
    },

    #[error("Unknown {kind}: {value}")]
    UnknownEnumValue { kind: &'static str, value: String },

    #[error("Cannot use {requested} materials in a domain whose material function is already defined in {active} mode")]
    IncompatibleMaterialMode {
        active: MaterialMode,
        requested: MaterialMode,
    },

    #[error("Invalid material specification: {0}")]
    InvalidMaterialSpecification(String),

    #[error("Specify exactly one of wavelength or frequency (wavelength: {wavelength:?}, frequency: {frequency:?})")]
    AmbiguousSourceFrequency {
        wavelength: Option<f64>,
        frequency: Option<f64>,
    },

    #[error("{entity} has no {property}")]
    MissingCoordinates {
        entity: &'static str,
        property: &'static str,
    },

    #[error("Unsupported number of dimensions: {0} (expected 1, 2 or 3)")]
    UnsupportedDimensions(usize),

    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("{entity} belongs to a different engine than the domain")]
    ForeignEngine { entity: &'static str },

    #[error("Domain has a region the engine only partially registered; rebuild the domain")]
    IncompleteDomain,

    #[error(transparent)]
    Engine(#[from] EngineError),
}

fn describe(found: &Option<usize>) -> String {
    match found {
        Some(n) => n.to_string(),
        None => "unspecified".into(),
    }
}

impl From<GeometryError> for SceneError {
    fn from(err: GeometryError) -> Self {
        match err {
            GeometryError::DimensionMismatch {
                property,
                expected,
                found,
            } => SceneError::DimensionMismatch {
                what: format!("{property} coordinates"),
                expected,
                found: Some(found),
            },
            GeometryError::Empty { .. } => SceneError::UnsupportedDimensions(0),
        }
    }
}

impl From<MaterialError> for SceneError {
    fn from(err: MaterialError) -> Self {
        match err {
            MaterialError::InvalidSpecification(detail) => {
                SceneError::InvalidMaterialSpecification(detail)
            }
        }
    }
}
