//! Absorbing boundary layers.

use yee_engine::{BoundaryHandle, EngineRef, Owned};

use crate::error::SceneError;

/// A perfectly matched layer of fixed thickness on every domain face.
///
/// Layers carry no dimension count and can be added to any domain.
#[derive(Debug)]
pub struct Pml {
    thickness: f64,
    boundary: Owned<BoundaryHandle>,
}

impl Pml {
    pub fn new(engine: &EngineRef, thickness: f64) -> Result<Self, SceneError> {
        let boundary = Owned::acquire(engine, |e| e.create_pml(thickness))?;
        Ok(Self {
            thickness,
            boundary,
        })
    }

    pub fn thickness(&self) -> f64 {
        self.thickness
    }

    #[inline]
    pub fn handle(&self) -> BoundaryHandle {
        self.boundary.handle()
    }

    pub fn engine(&self) -> &EngineRef {
        self.boundary.engine()
    }
}
