//! Simulation sessions.
//!
//! A [`Simulation`] takes ownership of a fully assembled [`Domain`], builds
//! the engine's structure and fields from it, and exposes time stepping and
//! field access. Because the domain is moved in, it cannot be changed once
//! handed over.

use std::rc::Rc;

use yee_engine::{BoundaryHandle, EngineRef, FieldsHandle, Owned, StructureHandle};

use crate::domain::Domain;
use crate::error::SceneError;
use crate::quantity::{Quantity, QuantityKind};

/// The runtime pairing of a domain with engine structure and fields.
///
/// Fields are dropped in declaration order: the engine fields first, then
/// the structure, then the domain and everything it owns.
#[derive(Debug)]
pub struct Simulation {
    fields: Owned<FieldsHandle>,
    structure: Owned<StructureHandle>,
    domain: Domain,
}

impl Simulation {
    /// Hand a domain to the engine.
    ///
    /// Region polarizabilities are registered against the structure in
    /// region order, then sources are registered in the order they were
    /// added: as point sources when their size is zero, otherwise as volume
    /// sources spanning `center ± size / 2`.
    ///
    /// On error the domain is dropped and every handle acquired so far is
    /// released. A domain marked incomplete by a failed region registration
    /// is refused with [`SceneError::IncompleteDomain`].
    pub fn new(domain: Domain) -> Result<Self, SceneError> {
        if domain.is_incomplete() {
            return Err(SceneError::IncompleteDomain);
        }
        let engine = Rc::clone(domain.engine());
        let grid = domain.grid_handle();
        let material = domain.material_handle();
        let boundaries: Vec<BoundaryHandle> =
            domain.boundary_layers().iter().map(|b| b.handle()).collect();

        let structure =
            Owned::acquire(&engine, |e| e.create_structure(grid, material, &boundaries))?;
        if let Some(material) = material {
            let mut e = engine.borrow_mut();
            for region in domain.regions() {
                for p in region.material().polarizabilities() {
                    e.add_structure_polarizability(structure.handle(), material, p.omega, p.gamma)?;
                }
            }
        }

        let fields = Owned::acquire(&engine, |e| e.create_fields(structure.handle()))?;
        {
            let mut e = engine.borrow_mut();
            for source in domain.sources() {
                let time = source.profile().handle();
                if source.is_point_source() {
                    let at = source.center_or_origin().to_vec();
                    e.add_point_source(fields.handle(), source.component(), time, &at, source.amplitude())?;
                } else {
                    let (min_corner, max_corner) = source.corners();
                    e.add_volume_source(
                        fields.handle(),
                        source.component(),
                        time,
                        &min_corner.to_vec(),
                        &max_corner.to_vec(),
                        source.amplitude(),
                    )?;
                }
            }
        }

        log::info!(
            "simulation ready on {} engine: {} regions, {} sources, {} boundary layers",
            engine.borrow().name(),
            domain.regions().len(),
            domain.sources().len(),
            domain.boundary_layers().len()
        );

        Ok(Self {
            fields,
            structure,
            domain,
        })
    }

    /// Advance the fields by one time step.
    pub fn step(&mut self) -> Result<(), SceneError> {
        self.engine().borrow_mut().step(self.fields.handle())?;
        Ok(())
    }

    /// Current simulated time.
    pub fn time(&self) -> Result<f64, SceneError> {
        Ok(self.engine().borrow().time(self.fields.handle())?)
    }

    /// Step until the simulated time reaches `until`; returns the number of steps taken.
    pub fn run_until(&mut self, until: f64) -> Result<usize, SceneError> {
        let mut steps = 0;
        while self.time()? < until {
            self.step()?;
            steps += 1;
        }
        Ok(steps)
    }

    /// The dielectric function over the domain.
    pub fn epsilon(&self) -> Quantity<'_> {
        Quantity::new(QuantityKind::Epsilon, self)
    }

    /// All three electric field components over the domain.
    pub fn efield(&self) -> Quantity<'_> {
        Quantity::new(QuantityKind::Efield, self)
    }

    /// A quantity by name: `epsilon` (or `dielectric`), `efield`, `ex`, `ey`, `ez`.
    pub fn quantity(&self, name: &str) -> Result<Quantity<'_>, SceneError> {
        Ok(Quantity::new(name.parse()?, self))
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn engine(&self) -> &EngineRef {
        self.domain.engine()
    }

    pub fn fields_handle(&self) -> FieldsHandle {
        self.fields.handle()
    }

    pub fn structure_handle(&self) -> StructureHandle {
        self.structure.handle()
    }
}
