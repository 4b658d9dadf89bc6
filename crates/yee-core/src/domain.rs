//! The simulation domain.
//!
//! A [`Domain`] is the fixed-size, fixed-resolution computational volume.
//! Its dimension count is locked from the size it is created with, and
//! every region and source added afterwards must agree with it. Coordinates
//! are measured from the centre of the volume.

use std::fmt;
use std::rc::Rc;

use yee_engine::{EngineError, EngineRef, GridHandle, MaterialHandle, Owned};
use yee_geometry::{Block, Coords, Dimensions, HasDimensions};

use crate::boundary::Pml;
use crate::error::SceneError;
use crate::source::Source;

/// How the domain's material function is composed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum MaterialMode {
    /// Rectangular regions, each with its own material.
    Region,
}

impl fmt::Display for MaterialMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaterialMode::Region => f.write_str("region"),
        }
    }
}

#[derive(Debug)]
struct MaterialFunction {
    mode: MaterialMode,
    handle: Owned<MaterialHandle>,
}

/// The simulation geometry: size, resolution, regions, sources and
/// boundary layers.
///
/// Fields are dropped in declaration order, so entity handles are released
/// before the material function and the grid.
#[derive(Debug)]
pub struct Domain {
    regions: Vec<Block>,
    sources: Vec<Source>,
    boundary_layers: Vec<Pml>,
    material: Option<MaterialFunction>,
    grid: Owned<GridHandle>,
    dims: Dimensions,
    size: Coords,
    resolution: f64,
    incomplete: bool,
}

impl Domain {
    /// Create a domain of the given size at `resolution` cells per unit length.
    ///
    /// # Errors
    /// [`SceneError::UnsupportedDimensions`] unless `size` has 1 to 3
    /// components; engine errors for invalid sizes or resolutions.
    pub fn new(
        engine: &EngineRef,
        size: impl AsRef<[f64]>,
        resolution: f64,
    ) -> Result<Self, SceneError> {
        let raw = size.as_ref();
        if raw.is_empty() || raw.len() > 3 {
            return Err(SceneError::UnsupportedDimensions(raw.len()));
        }

        let mut dims = Dimensions::unset();
        let size = dims.agree("size", raw)?;
        let grid = Owned::acquire(engine, |e| e.create_grid(raw, resolution))?;
        log::debug!(
            "created {}-D domain of size {:?} at resolution {}",
            raw.len(),
            raw,
            resolution
        );

        Ok(Self {
            regions: Vec::new(),
            sources: Vec::new(),
            boundary_layers: Vec::new(),
            material: None,
            grid,
            dims,
            size,
            resolution,
            incomplete: false,
        })
    }

    /// Add a region. Regions added later take precedence where they overlap.
    ///
    /// The first region switches the domain's material function to
    /// [`MaterialMode::Region`]. The region's box and epsilon are registered
    /// with the engine, followed by each of its polarizabilities in order.
    ///
    /// If the engine accepts the box but then rejects the epsilon or a
    /// polarizability, the engine is left holding a partial region that
    /// cannot be withdrawn. The region is not stored, the domain is marked
    /// incomplete, and [`Simulation::new`](crate::Simulation::new) refuses it
    /// with [`SceneError::IncompleteDomain`].
    pub fn add_region(&mut self, region: Block) -> Result<(), SceneError> {
        self.check_dimensions("region", region.dimensions())?;
        let size = region.size().ok_or(SceneError::MissingCoordinates {
            entity: "region",
            property: "size",
        })?;
        let center = region
            .center()
            .cloned()
            .unwrap_or_else(|| Coords::zeros(size.len()));
        let half = size / 2.0;
        let min_corner = (&center - &half).to_vec();
        let max_corner = (&center + &half).to_vec();

        let material = self.material_function(MaterialMode::Region)?;
        let engine = Rc::clone(self.engine());
        {
            let mut engine = engine.borrow_mut();
            let index = engine.add_region(material, &min_corner, &max_corner)?;
            let described = (|| {
                engine.set_region_epsilon(material, index, region.material().epsilon())?;
                for p in region.material().polarizabilities() {
                    engine.add_region_polarizability(material, index, p.sigma, p.omega, p.gamma)?;
                }
                Ok::<_, EngineError>(())
            })();
            if let Err(err) = described {
                log::warn!("region {} was only partially registered: {}", index, err);
                self.incomplete = true;
                return Err(err.into());
            }
            log::debug!(
                "region {} spans {:?}..{:?} (epsilon {}, {} resonances)",
                index,
                min_corner,
                max_corner,
                region.material().epsilon(),
                region.material().polarizabilities().len()
            );
        }

        self.regions.push(region);
        Ok(())
    }

    /// Add a source of matching dimensionality, created on this domain's engine.
    pub fn add_source(&mut self, source: Source) -> Result<(), SceneError> {
        self.check_engine("source", source.engine())?;
        self.check_dimensions("source", source.dimensions())?;
        self.sources.push(source);
        Ok(())
    }

    /// Add an absorbing boundary layer created on this domain's engine.
    pub fn add_pml(&mut self, pml: Pml) -> Result<(), SceneError> {
        self.check_engine("boundary layer", pml.engine())?;
        self.boundary_layers.push(pml);
        Ok(())
    }

    /// Size of the computational volume.
    pub fn size(&self) -> &Coords {
        &self.size
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn regions(&self) -> &[Block] {
        &self.regions
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn boundary_layers(&self) -> &[Pml] {
        &self.boundary_layers
    }

    /// Material composition mode, `None` until the first region is added.
    pub fn material_mode(&self) -> Option<MaterialMode> {
        self.material.as_ref().map(|m| m.mode)
    }

    pub fn engine(&self) -> &EngineRef {
        self.grid.engine()
    }

    pub fn grid_handle(&self) -> GridHandle {
        self.grid.handle()
    }

    pub fn material_handle(&self) -> Option<MaterialHandle> {
        self.material.as_ref().map(|m| m.handle.handle())
    }

    /// Whether a failed [`add_region`](Self::add_region) left engine state behind.
    pub fn is_incomplete(&self) -> bool {
        self.incomplete
    }

    fn check_engine(&self, entity: &'static str, engine: &EngineRef) -> Result<(), SceneError> {
        if !Rc::ptr_eq(engine, self.engine()) {
            return Err(SceneError::ForeignEngine { entity });
        }
        Ok(())
    }

    fn check_dimensions(&self, what: &str, found: Option<usize>) -> Result<(), SceneError> {
        let expected = self.dims.get().unwrap_or(self.size.len());
        if found != Some(expected) {
            return Err(SceneError::DimensionMismatch {
                what: what.to_string(),
                expected,
                found,
            });
        }
        Ok(())
    }

    /// Material function in `requested` mode, creating it on first use.
    fn material_function(&mut self, requested: MaterialMode) -> Result<MaterialHandle, SceneError> {
        if let Some(function) = &self.material {
            if function.mode != requested {
                return Err(SceneError::IncompatibleMaterialMode {
                    active: function.mode,
                    requested,
                });
            }
            return Ok(function.handle.handle());
        }

        let handle = match requested {
            MaterialMode::Region => {
                Owned::acquire(self.grid.engine(), |e| e.create_region_material())?
            }
        };
        log::debug!("material function initialised in {} mode", requested);
        let raw = handle.handle();
        self.material = Some(MaterialFunction {
            mode: requested,
            handle,
        });
        Ok(raw)
    }
}

impl HasDimensions for Domain {
    fn dimensions(&self) -> Option<usize> {
        self.dims.get()
    }
}
