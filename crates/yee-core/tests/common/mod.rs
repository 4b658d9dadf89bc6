//! Shared helpers for the integration tests.

use ndarray::ArrayD;

use yee_engine::{
    BoundaryHandle, Component, Engine, EngineError, FieldsHandle, GridHandle, MaterialHandle,
    ReferenceEngine, SourceTimeHandle, StructureHandle,
};

/// Reference engine that fails one named operation.
///
/// Every other call, including releases, goes straight to the inner engine,
/// so its handle accounting stays observable through `inner`.
pub struct FailingEngine {
    pub inner: ReferenceEngine,
    fail_on: &'static str,
}

impl FailingEngine {
    pub fn failing_on(operation: &'static str) -> Self {
        Self {
            inner: ReferenceEngine::new(),
            fail_on: operation,
        }
    }

    fn check(&self, operation: &str) -> Result<(), EngineError> {
        if operation == self.fail_on {
            return Err(EngineError::InvalidArgument(format!("{operation} refused")));
        }
        Ok(())
    }
}

impl Engine for FailingEngine {
    fn name(&self) -> &str {
        "failing"
    }

    fn create_grid(&mut self, size: &[f64], resolution: f64) -> Result<GridHandle, EngineError> {
        self.check("create_grid")?;
        self.inner.create_grid(size, resolution)
    }

    fn destroy_grid(&mut self, grid: GridHandle) {
        self.inner.destroy_grid(grid)
    }

    fn create_region_material(&mut self) -> Result<MaterialHandle, EngineError> {
        self.check("create_region_material")?;
        self.inner.create_region_material()
    }

    fn add_region(
        &mut self,
        material: MaterialHandle,
        min_corner: &[f64],
        max_corner: &[f64],
    ) -> Result<usize, EngineError> {
        self.check("add_region")?;
        self.inner.add_region(material, min_corner, max_corner)
    }

    fn set_region_epsilon(
        &mut self,
        material: MaterialHandle,
        region: usize,
        epsilon: f64,
    ) -> Result<(), EngineError> {
        self.check("set_region_epsilon")?;
        self.inner.set_region_epsilon(material, region, epsilon)
    }

    fn add_region_polarizability(
        &mut self,
        material: MaterialHandle,
        region: usize,
        sigma: f64,
        omega: f64,
        gamma: f64,
    ) -> Result<(), EngineError> {
        self.check("add_region_polarizability")?;
        self.inner
            .add_region_polarizability(material, region, sigma, omega, gamma)
    }

    fn destroy_region_material(&mut self, material: MaterialHandle) {
        self.inner.destroy_region_material(material)
    }

    fn create_pml(&mut self, thickness: f64) -> Result<BoundaryHandle, EngineError> {
        self.check("create_pml")?;
        self.inner.create_pml(thickness)
    }

    fn destroy_boundary(&mut self, boundary: BoundaryHandle) {
        self.inner.destroy_boundary(boundary)
    }

    fn create_structure(
        &mut self,
        grid: GridHandle,
        material: Option<MaterialHandle>,
        boundaries: &[BoundaryHandle],
    ) -> Result<StructureHandle, EngineError> {
        self.check("create_structure")?;
        self.inner.create_structure(grid, material, boundaries)
    }

    fn add_structure_polarizability(
        &mut self,
        structure: StructureHandle,
        material: MaterialHandle,
        omega: f64,
        gamma: f64,
    ) -> Result<(), EngineError> {
        self.check("add_structure_polarizability")?;
        self.inner
            .add_structure_polarizability(structure, material, omega, gamma)
    }

    fn destroy_structure(&mut self, structure: StructureHandle) {
        self.inner.destroy_structure(structure)
    }

    fn create_fields(&mut self, structure: StructureHandle) -> Result<FieldsHandle, EngineError> {
        self.check("create_fields")?;
        self.inner.create_fields(structure)
    }

    fn add_point_source(
        &mut self,
        fields: FieldsHandle,
        component: Component,
        time: SourceTimeHandle,
        at: &[f64],
        amplitude: f64,
    ) -> Result<(), EngineError> {
        self.check("add_point_source")?;
        self.inner.add_point_source(fields, component, time, at, amplitude)
    }

    fn add_volume_source(
        &mut self,
        fields: FieldsHandle,
        component: Component,
        time: SourceTimeHandle,
        min_corner: &[f64],
        max_corner: &[f64],
        amplitude: f64,
    ) -> Result<(), EngineError> {
        self.check("add_volume_source")?;
        self.inner
            .add_volume_source(fields, component, time, min_corner, max_corner, amplitude)
    }

    fn step(&mut self, fields: FieldsHandle) -> Result<(), EngineError> {
        self.check("step")?;
        self.inner.step(fields)
    }

    fn time(&self, fields: FieldsHandle) -> Result<f64, EngineError> {
        self.inner.time(fields)
    }

    fn field_array(
        &self,
        fields: FieldsHandle,
        grid: GridHandle,
        component: &str,
    ) -> Result<ArrayD<f64>, EngineError> {
        self.inner.field_array(fields, grid, component)
    }

    fn output_field(
        &mut self,
        fields: FieldsHandle,
        component: &str,
        grid: GridHandle,
    ) -> Result<(), EngineError> {
        self.check("output_field")?;
        self.inner.output_field(fields, component, grid)
    }

    fn destroy_fields(&mut self, fields: FieldsHandle) {
        self.inner.destroy_fields(fields)
    }

    fn create_continuous_time(&mut self, frequency: f64) -> Result<SourceTimeHandle, EngineError> {
        self.check("create_continuous_time")?;
        self.inner.create_continuous_time(frequency)
    }

    fn source_frequency(&self, time: SourceTimeHandle) -> Result<f64, EngineError> {
        self.inner.source_frequency(time)
    }

    fn set_source_frequency(
        &mut self,
        time: SourceTimeHandle,
        frequency: f64,
    ) -> Result<(), EngineError> {
        self.check("set_source_frequency")?;
        self.inner.set_source_frequency(time, frequency)
    }

    fn destroy_source_time(&mut self, time: SourceTimeHandle) {
        self.inner.destroy_source_time(time)
    }
}
