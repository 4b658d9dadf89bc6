//! Region primitives.
//!
//! A region is a rectangular sub-volume of the domain with a material
//! attached. Only axis-aligned blocks are supported.

use std::sync::Arc;

use yee_materials::{air, Material, MaterialError, MaterialSpec};

use crate::dimensions::{Coords, Dimensions, GeometryError, HasDimensions};

/// An axis-aligned block of material.
#[derive(Debug, Clone)]
pub struct Block {
    dims: Dimensions,
    center: Option<Coords>,
    size: Option<Coords>,
    material: Arc<dyn Material>,
}

impl Default for Block {
    fn default() -> Self {
        Self::new()
    }
}

impl Block {
    /// A block with no coordinates yet, made of air.
    pub fn new() -> Self {
        Self {
            dims: Dimensions::unset(),
            center: None,
            size: None,
            material: air(),
        }
    }

    pub fn with_center(mut self, center: impl AsRef<[f64]>) -> Result<Self, GeometryError> {
        self.set_center(center)?;
        Ok(self)
    }

    pub fn with_size(mut self, size: impl AsRef<[f64]>) -> Result<Self, GeometryError> {
        self.set_size(size)?;
        Ok(self)
    }

    pub fn with_material(mut self, material: impl Into<MaterialSpec>) -> Result<Self, MaterialError> {
        self.set_material(material)?;
        Ok(self)
    }

    pub fn center(&self) -> Option<&Coords> {
        self.center.as_ref()
    }

    pub fn set_center(&mut self, center: impl AsRef<[f64]>) -> Result<(), GeometryError> {
        self.center = Some(self.dims.agree("center", center.as_ref())?);
        Ok(())
    }

    pub fn size(&self) -> Option<&Coords> {
        self.size.as_ref()
    }

    pub fn set_size(&mut self, size: impl AsRef<[f64]>) -> Result<(), GeometryError> {
        self.size = Some(self.dims.agree("size", size.as_ref())?);
        Ok(())
    }

    pub fn material(&self) -> &Arc<dyn Material> {
        &self.material
    }

    /// Attach a material, or a real epsilon from which one is built.
    pub fn set_material(&mut self, material: impl Into<MaterialSpec>) -> Result<(), MaterialError> {
        self.material = material.into().resolve()?;
        Ok(())
    }

    /// Corner with the smallest coordinates: `center - size / 2`.
    pub fn min_corner(&self) -> Option<Coords> {
        match (&self.center, &self.size) {
            (Some(c), Some(s)) => Some(c - &(s / 2.0)),
            _ => None,
        }
    }

    /// Corner with the largest coordinates: `center + size / 2`.
    pub fn max_corner(&self) -> Option<Coords> {
        match (&self.center, &self.size) {
            (Some(c), Some(s)) => Some(c + &(s / 2.0)),
            _ => None,
        }
    }

    /// Check whether a point lies inside this block (boundary inclusive).
    pub fn contains(&self, point: &[f64]) -> bool {
        match (self.min_corner(), self.max_corner()) {
            (Some(min), Some(max)) if min.len() == point.len() => point
                .iter()
                .zip(min.iter().zip(max.iter()))
                .all(|(p, (lo, hi))| *p >= *lo && *p <= *hi),
            _ => false,
        }
    }
}

impl HasDimensions for Block {
    fn dimensions(&self) -> Option<usize> {
        self.dims.get()
    }
}
