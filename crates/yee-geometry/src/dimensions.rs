//! Dimensional contract for coordinate-bearing entities.
//!
//! An entity starts with an unknown number of dimensions. The first
//! coordinate tuple assigned to any of its coordinate properties fixes it;
//! every later tuple, on the same or another property, must have the same
//! length.
//!
//! ```
//! use yee_geometry::Dimensions;
//!
//! let mut dims = Dimensions::unset();
//! let center = dims.agree("center", &[2.0, 3.0]).unwrap();
//! assert_eq!(center.len(), 2);
//! assert_eq!(dims.get(), Some(2));
//! assert!(dims.agree("size", &[1.0, 1.0, 1.0]).is_err());
//! ```

use ndarray::Array1;
use thiserror::Error;

/// A fixed-length coordinate vector.
pub type Coords = Array1<f64>;

/// Errors from coordinate assignment.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("{property} coordinates have wrong number of dimensions, expected {expected} (got {found})")]
    DimensionMismatch {
        property: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{property} coordinates must have at least one component")]
    Empty { property: &'static str },
}

/// Number of spatial dimensions of an entity, unset until inferred.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Dimensions(Option<usize>);

impl Dimensions {
    /// Dimensions not yet known.
    pub const fn unset() -> Self {
        Self(None)
    }

    /// Dimensions known up front.
    pub const fn fixed(n: usize) -> Self {
        Self(Some(n))
    }

    #[inline]
    pub fn get(&self) -> Option<usize> {
        self.0
    }

    /// Validate a coordinate tuple assigned to `property`.
    ///
    /// Locks the dimension count on first use. Returns the tuple as a
    /// [`Coords`] vector ready to be stored; on error nothing is locked.
    /// An empty tuple is never accepted, so a locked count is always positive.
    pub fn agree(&mut self, property: &'static str, value: &[f64]) -> Result<Coords, GeometryError> {
        let found = value.len();
        if found == 0 {
            return Err(GeometryError::Empty { property });
        }
        match self.0 {
            None => self.0 = Some(found),
            Some(expected) if expected != found => {
                return Err(GeometryError::DimensionMismatch {
                    property,
                    expected,
                    found,
                });
            }
            Some(_) => {}
        }
        Ok(Array1::from(value.to_vec()))
    }
}

/// Entities that carry a dimension count.
pub trait HasDimensions {
    /// Number of dimensions, or `None` if not yet known.
    fn dimensions(&self) -> Option<usize>;
}
