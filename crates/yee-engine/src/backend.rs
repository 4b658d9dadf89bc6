//! Engine trait and shared engine reference.
//!
//! The [`Engine`] trait mirrors the capability set of the external field
//! solver: grid volumes, region material functions, absorbing boundaries,
//! discretised structures, fields and continuous time profiles. Every object
//! the engine creates is referred to by an opaque handle and must be released
//! through the matching `destroy_*` call.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use ndarray::ArrayD;
use thiserror::Error;

use crate::handle::{
    BoundaryHandle, FieldsHandle, GridHandle, MaterialHandle, SourceTimeHandle, StructureHandle,
};

/// Errors originating from the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid {kind} handle: {id}")]
    InvalidHandle { kind: &'static str, id: u64 },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unsupported component: {0}")]
    UnsupportedComponent(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialisation error: {0}")]
    Serialisation(String),
}

/// Electric field component a source drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    Ex,
    Ey,
    Ez,
}

impl Component {
    /// All components, in axis order.
    pub const ALL: [Component; 3] = [Component::Ex, Component::Ey, Component::Ez];

    /// Lowercase engine name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Component::Ex => "ex",
            Component::Ey => "ey",
            Component::Ez => "ez",
        }
    }

    /// Axis index (x = 0, y = 1, z = 2).
    pub fn axis(&self) -> usize {
        match self {
            Component::Ex => 0,
            Component::Ey => 1,
            Component::Ez => 2,
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared, single-threaded reference to an engine.
pub type EngineRef = Rc<RefCell<dyn Engine>>;

/// Wrap an engine into an [`EngineRef`].
pub fn shared<E: Engine + 'static>(engine: E) -> EngineRef {
    Rc::new(RefCell::new(engine))
}

/// Abstraction over the external field-solving engine.
///
/// Coordinates are passed as slices whose length is the number of spatial
/// dimensions; the origin is the centre of the computational volume.
/// Teardown calls are infallible: releasing an unknown handle is a no-op.
pub trait Engine {
    /// Human-readable name of the engine.
    fn name(&self) -> &str;

    /// Create a grid volume of the given size at `resolution` cells per unit.
    fn create_grid(&mut self, size: &[f64], resolution: f64) -> Result<GridHandle, EngineError>;

    fn destroy_grid(&mut self, grid: GridHandle);

    /// Create a material function composed of rectangular regions.
    fn create_region_material(&mut self) -> Result<MaterialHandle, EngineError>;

    /// Register a box region; returns its index within the material function.
    ///
    /// Later regions take precedence where regions overlap.
    fn add_region(
        &mut self,
        material: MaterialHandle,
        min_corner: &[f64],
        max_corner: &[f64],
    ) -> Result<usize, EngineError>;

    fn set_region_epsilon(
        &mut self,
        material: MaterialHandle,
        region: usize,
        epsilon: f64,
    ) -> Result<(), EngineError>;

    fn add_region_polarizability(
        &mut self,
        material: MaterialHandle,
        region: usize,
        sigma: f64,
        omega: f64,
        gamma: f64,
    ) -> Result<(), EngineError>;

    fn destroy_region_material(&mut self, material: MaterialHandle);

    /// Create a perfectly matched layer of the given thickness.
    fn create_pml(&mut self, thickness: f64) -> Result<BoundaryHandle, EngineError>;

    fn destroy_boundary(&mut self, boundary: BoundaryHandle);

    /// Discretise a material function onto a grid, surrounded by boundary layers.
    fn create_structure(
        &mut self,
        grid: GridHandle,
        material: Option<MaterialHandle>,
        boundaries: &[BoundaryHandle],
    ) -> Result<StructureHandle, EngineError>;

    /// Register a polarizability resonance of `material` with the structure.
    fn add_structure_polarizability(
        &mut self,
        structure: StructureHandle,
        material: MaterialHandle,
        omega: f64,
        gamma: f64,
    ) -> Result<(), EngineError>;

    fn destroy_structure(&mut self, structure: StructureHandle);

    /// Allocate fields over a structure.
    fn create_fields(&mut self, structure: StructureHandle) -> Result<FieldsHandle, EngineError>;

    fn add_point_source(
        &mut self,
        fields: FieldsHandle,
        component: Component,
        time: SourceTimeHandle,
        at: &[f64],
        amplitude: f64,
    ) -> Result<(), EngineError>;

    fn add_volume_source(
        &mut self,
        fields: FieldsHandle,
        component: Component,
        time: SourceTimeHandle,
        min_corner: &[f64],
        max_corner: &[f64],
        amplitude: f64,
    ) -> Result<(), EngineError>;

    /// Advance the fields by one time step.
    fn step(&mut self, fields: FieldsHandle) -> Result<(), EngineError>;

    /// Current simulated time.
    fn time(&self, fields: FieldsHandle) -> Result<f64, EngineError>;

    /// Extract a named scalar quantity over the grid.
    fn field_array(
        &self,
        fields: FieldsHandle,
        grid: GridHandle,
        component: &str,
    ) -> Result<ArrayD<f64>, EngineError>;

    /// Persist a named quantity in the engine's native output format.
    fn output_field(
        &mut self,
        fields: FieldsHandle,
        component: &str,
        grid: GridHandle,
    ) -> Result<(), EngineError>;

    fn destroy_fields(&mut self, fields: FieldsHandle);

    /// Create a continuous-wave time profile.
    fn create_continuous_time(&mut self, frequency: f64) -> Result<SourceTimeHandle, EngineError>;

    fn source_frequency(&self, time: SourceTimeHandle) -> Result<f64, EngineError>;

    fn set_source_frequency(
        &mut self,
        time: SourceTimeHandle,
        frequency: f64,
    ) -> Result<(), EngineError>;

    fn destroy_source_time(&mut self, time: SourceTimeHandle);
}
