//! In-process reference engine.
//!
//! Keeps every engine object in memory and performs no time integration.
//! Materials are rasterised onto cell centres when a structure is created
//! (later regions override earlier ones), and each step writes every
//! source's continuous drive $A \cos(2\pi f t)$ into the cells the source
//! covers. All calls are journaled as [`Event`]s.

use std::collections::HashMap;
use std::f64::consts::PI;
use std::path::{Path, PathBuf};

use ndarray::{ArrayD, Dimension, IxDyn};
use serde::Serialize;

use crate::backend::{Component, Engine, EngineError};
use crate::handle::{
    BoundaryHandle, FieldsHandle, GridHandle, Handle, MaterialHandle, SourceTimeHandle,
    StructureHandle,
};

/// Courant factor: time step in units of the cell size.
const COURANT: f64 = 0.5;

/// A call observed by the reference engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    GridCreated { grid: u64, shape: Vec<usize> },
    RegionAdded { material: u64, region: usize, min_corner: Vec<f64>, max_corner: Vec<f64> },
    RegionEpsilon { material: u64, region: usize, epsilon: f64 },
    RegionPolarizability { material: u64, region: usize, sigma: f64, omega: f64, gamma: f64 },
    PmlCreated { boundary: u64, thickness: f64 },
    StructureCreated { structure: u64, boundaries: Vec<u64> },
    StructurePolarizability { structure: u64, omega: f64, gamma: f64 },
    FieldsCreated { fields: u64 },
    PointSource { component: Component, at: Vec<f64>, amplitude: f64 },
    VolumeSource { component: Component, min_corner: Vec<f64>, max_corner: Vec<f64>, amplitude: f64 },
    Output { component: String, path: PathBuf },
    Released { kind: &'static str, id: u64 },
}

#[derive(Debug)]
struct Grid {
    size: Vec<f64>,
    resolution: f64,
    shape: Vec<usize>,
}

impl Grid {
    /// Cell-centre coordinate of `index` along `axis`, origin at the volume centre.
    fn coordinate(&self, axis: usize, index: usize) -> f64 {
        -self.size[axis] / 2.0 + (index as f64 + 0.5) / self.resolution
    }

    /// Index of the cell containing `x` along `axis`, clamped to the grid.
    fn nearest_index(&self, axis: usize, x: f64) -> usize {
        let raw = ((x + self.size[axis] / 2.0) * self.resolution).floor();
        (raw.max(0.0) as usize).min(self.shape[axis] - 1)
    }

    fn centre_of(&self, index: &[usize]) -> Vec<f64> {
        index
            .iter()
            .enumerate()
            .map(|(axis, &i)| self.coordinate(axis, i))
            .collect()
    }
}

#[derive(Debug, Clone)]
struct Region {
    min_corner: Vec<f64>,
    max_corner: Vec<f64>,
    epsilon: f64,
}

impl Region {
    fn contains(&self, point: &[f64]) -> bool {
        point
            .iter()
            .zip(self.min_corner.iter().zip(&self.max_corner))
            .all(|(p, (lo, hi))| p >= lo && p <= hi)
    }
}

#[derive(Debug)]
struct Structure {
    grid: u64,
    epsilon: ArrayD<f64>,
    pml_thicknesses: Vec<f64>,
    polarizabilities: Vec<(f64, f64)>,
}

#[derive(Debug)]
struct DrivenSource {
    component: Component,
    time: SourceTimeHandle,
    cells: Vec<Vec<usize>>,
    amplitude: f64,
}

#[derive(Debug)]
struct Fields {
    structure: u64,
    time: f64,
    dt: f64,
    sources: Vec<DrivenSource>,
    components: [ArrayD<f64>; 3],
}

#[derive(Serialize)]
struct FieldDump<'a> {
    component: &'a str,
    time: f64,
    shape: &'a [usize],
    data: Vec<f64>,
}

/// Reference engine holding all state in memory.
#[derive(Debug, Default)]
pub struct ReferenceEngine {
    next_id: u64,
    output_dir: PathBuf,
    grids: HashMap<u64, Grid>,
    materials: HashMap<u64, Vec<Region>>,
    boundaries: HashMap<u64, f64>,
    structures: HashMap<u64, Structure>,
    fields: HashMap<u64, Fields>,
    source_times: HashMap<u64, f64>,
    events: Vec<Event>,
}

impl ReferenceEngine {
    /// Create an engine that writes output into the current directory.
    pub fn new() -> Self {
        Self::with_output_dir(".")
    }

    /// Create an engine that writes output into `dir`.
    pub fn with_output_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: dir.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Every call observed so far, in order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of engine objects not yet released.
    pub fn live_handles(&self) -> usize {
        self.grids.len()
            + self.materials.len()
            + self.boundaries.len()
            + self.structures.len()
            + self.fields.len()
            + self.source_times.len()
    }

    /// Polarizability `(omega, gamma)` pairs registered against a structure.
    pub fn structure_polarizabilities(&self, structure: StructureHandle) -> Option<&[(f64, f64)]> {
        self.structures
            .get(&structure.0)
            .map(|s| s.polarizabilities.as_slice())
    }

    /// PML thicknesses a structure was built with.
    pub fn structure_pml(&self, structure: StructureHandle) -> Option<&[f64]> {
        self.structures
            .get(&structure.0)
            .map(|s| s.pml_thicknesses.as_slice())
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn release<H: Handle>(&mut self, handle: H, removed: bool) {
        if removed {
            self.events.push(Event::Released {
                kind: H::KIND,
                id: handle.id(),
            });
        }
    }

    fn grid(&self, grid: GridHandle) -> Result<&Grid, EngineError> {
        self.grids.get(&grid.0).ok_or(EngineError::InvalidHandle {
            kind: GridHandle::KIND,
            id: grid.0,
        })
    }

    fn region_mut(&mut self, material: MaterialHandle, region: usize) -> Result<&mut Region, EngineError> {
        let regions = self
            .materials
            .get_mut(&material.0)
            .ok_or(EngineError::InvalidHandle {
                kind: MaterialHandle::KIND,
                id: material.0,
            })?;
        regions
            .get_mut(region)
            .ok_or_else(|| EngineError::InvalidArgument(format!("no region {region} in material {}", material.0)))
    }

    fn fields_ref(&self, fields: FieldsHandle) -> Result<&Fields, EngineError> {
        self.fields.get(&fields.0).ok_or(EngineError::InvalidHandle {
            kind: FieldsHandle::KIND,
            id: fields.0,
        })
    }

    /// Grid backing a set of fields.
    fn fields_grid(&self, fields: &Fields) -> Result<&Grid, EngineError> {
        let structure = self
            .structures
            .get(&fields.structure)
            .ok_or(EngineError::InvalidHandle {
                kind: StructureHandle::KIND,
                id: fields.structure,
            })?;
        self.grid(GridHandle(structure.grid))
    }

    fn check_time(&self, time: SourceTimeHandle) -> Result<(), EngineError> {
        if self.source_times.contains_key(&time.0) {
            Ok(())
        } else {
            Err(EngineError::InvalidHandle {
                kind: SourceTimeHandle::KIND,
                id: time.0,
            })
        }
    }

    fn add_source(
        &mut self,
        fields: FieldsHandle,
        component: Component,
        time: SourceTimeHandle,
        min_corner: &[f64],
        max_corner: &[f64],
        amplitude: f64,
    ) -> Result<(), EngineError> {
        self.check_time(time)?;
        let target = self.fields_ref(fields)?;
        let grid = self.fields_grid(target)?;
        if min_corner.len() != grid.shape.len() || max_corner.len() != grid.shape.len() {
            return Err(EngineError::InvalidArgument(format!(
                "source has {} coordinates, grid has {} dimensions",
                min_corner.len(),
                grid.shape.len()
            )));
        }

        let mut cells: Vec<Vec<usize>> = Vec::new();
        for (index, _) in ArrayD::<f64>::zeros(IxDyn(&grid.shape)).indexed_iter() {
            let idx = index.slice().to_vec();
            let centre = grid.centre_of(&idx);
            let inside = centre
                .iter()
                .zip(min_corner.iter().zip(max_corner))
                .all(|(c, (lo, hi))| c >= lo && c <= hi);
            if inside {
                cells.push(idx);
            }
        }
        if cells.is_empty() {
            // Smaller than a cell: drive the cell holding the source centre.
            cells.push(
                min_corner
                    .iter()
                    .zip(max_corner)
                    .enumerate()
                    .map(|(axis, (lo, hi))| grid.nearest_index(axis, (lo + hi) / 2.0))
                    .collect(),
            );
        }

        if let Some(target) = self.fields.get_mut(&fields.0) {
            target.sources.push(DrivenSource {
                component,
                time,
                cells,
                amplitude,
            });
        }
        Ok(())
    }
}

impl Engine for ReferenceEngine {
    fn name(&self) -> &str {
        "reference"
    }

    fn create_grid(&mut self, size: &[f64], resolution: f64) -> Result<GridHandle, EngineError> {
        if size.is_empty() || size.len() > 3 {
            return Err(EngineError::InvalidArgument(format!(
                "grid must have 1 to 3 dimensions, got {}",
                size.len()
            )));
        }
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(resolution) || !size.iter().all(|&s| positive(s)) {
            return Err(EngineError::InvalidArgument(format!(
                "grid size {size:?} and resolution {resolution} must be positive and finite"
            )));
        }

        // Array shapes are limited to isize::MAX elements.
        let too_large = || {
            EngineError::InvalidArgument(format!(
                "grid of size {size:?} at resolution {resolution} has too many cells"
            ))
        };
        let mut shape = Vec::with_capacity(size.len());
        let mut cells: usize = 1;
        for s in size {
            let n = (s * resolution).round().max(1.0);
            if n > isize::MAX as f64 {
                return Err(too_large());
            }
            let n = n as usize;
            cells = cells
                .checked_mul(n)
                .filter(|&c| c <= isize::MAX as usize)
                .ok_or_else(too_large)?;
            shape.push(n);
        }
        let id = self.allocate_id();
        self.events.push(Event::GridCreated {
            grid: id,
            shape: shape.clone(),
        });
        self.grids.insert(
            id,
            Grid {
                size: size.to_vec(),
                resolution,
                shape,
            },
        );
        Ok(GridHandle(id))
    }

    fn destroy_grid(&mut self, grid: GridHandle) {
        let removed = self.grids.remove(&grid.0).is_some();
        self.release(grid, removed);
    }

    fn create_region_material(&mut self) -> Result<MaterialHandle, EngineError> {
        let id = self.allocate_id();
        self.materials.insert(id, Vec::new());
        Ok(MaterialHandle(id))
    }

    fn add_region(
        &mut self,
        material: MaterialHandle,
        min_corner: &[f64],
        max_corner: &[f64],
    ) -> Result<usize, EngineError> {
        if min_corner.len() != max_corner.len() {
            return Err(EngineError::InvalidArgument(
                "region corners have different lengths".into(),
            ));
        }
        let regions = self
            .materials
            .get_mut(&material.0)
            .ok_or(EngineError::InvalidHandle {
                kind: MaterialHandle::KIND,
                id: material.0,
            })?;
        regions.push(Region {
            min_corner: min_corner.to_vec(),
            max_corner: max_corner.to_vec(),
            epsilon: 1.0,
        });
        let region = regions.len() - 1;
        self.events.push(Event::RegionAdded {
            material: material.0,
            region,
            min_corner: min_corner.to_vec(),
            max_corner: max_corner.to_vec(),
        });
        Ok(region)
    }

    fn set_region_epsilon(
        &mut self,
        material: MaterialHandle,
        region: usize,
        epsilon: f64,
    ) -> Result<(), EngineError> {
        self.region_mut(material, region)?.epsilon = epsilon;
        self.events.push(Event::RegionEpsilon {
            material: material.0,
            region,
            epsilon,
        });
        Ok(())
    }

    fn add_region_polarizability(
        &mut self,
        material: MaterialHandle,
        region: usize,
        sigma: f64,
        omega: f64,
        gamma: f64,
    ) -> Result<(), EngineError> {
        // Dispersion is not modelled; the structure call carries the resonance.
        self.region_mut(material, region)?;
        self.events.push(Event::RegionPolarizability {
            material: material.0,
            region,
            sigma,
            omega,
            gamma,
        });
        Ok(())
    }

    fn destroy_region_material(&mut self, material: MaterialHandle) {
        let removed = self.materials.remove(&material.0).is_some();
        self.release(material, removed);
    }

    fn create_pml(&mut self, thickness: f64) -> Result<BoundaryHandle, EngineError> {
        if thickness.is_nan() || thickness < 0.0 {
            return Err(EngineError::InvalidArgument(format!(
                "PML thickness must be non-negative, got {thickness}"
            )));
        }
        let id = self.allocate_id();
        self.boundaries.insert(id, thickness);
        self.events.push(Event::PmlCreated {
            boundary: id,
            thickness,
        });
        Ok(BoundaryHandle(id))
    }

    fn destroy_boundary(&mut self, boundary: BoundaryHandle) {
        let removed = self.boundaries.remove(&boundary.0).is_some();
        self.release(boundary, removed);
    }

    fn create_structure(
        &mut self,
        grid: GridHandle,
        material: Option<MaterialHandle>,
        boundaries: &[BoundaryHandle],
    ) -> Result<StructureHandle, EngineError> {
        let pml_thicknesses = boundaries
            .iter()
            .map(|b| {
                self.boundaries
                    .get(&b.0)
                    .copied()
                    .ok_or(EngineError::InvalidHandle {
                        kind: BoundaryHandle::KIND,
                        id: b.0,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let regions: &[Region] = match material {
            Some(m) => self.materials.get(&m.0).ok_or(EngineError::InvalidHandle {
                kind: MaterialHandle::KIND,
                id: m.0,
            })?,
            None => &[],
        };
        let g = self.grid(grid)?;
        if let Some(bad) = regions.iter().find(|r| r.min_corner.len() != g.shape.len()) {
            return Err(EngineError::InvalidArgument(format!(
                "region with {} coordinates on a {}-dimensional grid",
                bad.min_corner.len(),
                g.shape.len()
            )));
        }

        let mut epsilon = ArrayD::<f64>::ones(IxDyn(&g.shape));
        for (index, value) in epsilon.indexed_iter_mut() {
            let centre = g.centre_of(index.slice());
            if let Some(region) = regions.iter().rev().find(|r| r.contains(&centre)) {
                *value = region.epsilon;
            }
        }

        let id = self.allocate_id();
        self.structures.insert(
            id,
            Structure {
                grid: grid.0,
                epsilon,
                pml_thicknesses,
                polarizabilities: Vec::new(),
            },
        );
        self.events.push(Event::StructureCreated {
            structure: id,
            boundaries: boundaries.iter().map(|b| b.0).collect(),
        });
        Ok(StructureHandle(id))
    }

    fn add_structure_polarizability(
        &mut self,
        structure: StructureHandle,
        material: MaterialHandle,
        omega: f64,
        gamma: f64,
    ) -> Result<(), EngineError> {
        if !self.materials.contains_key(&material.0) {
            return Err(EngineError::InvalidHandle {
                kind: MaterialHandle::KIND,
                id: material.0,
            });
        }
        let target = self
            .structures
            .get_mut(&structure.0)
            .ok_or(EngineError::InvalidHandle {
                kind: StructureHandle::KIND,
                id: structure.0,
            })?;
        target.polarizabilities.push((omega, gamma));
        self.events.push(Event::StructurePolarizability {
            structure: structure.0,
            omega,
            gamma,
        });
        Ok(())
    }

    fn destroy_structure(&mut self, structure: StructureHandle) {
        let removed = self.structures.remove(&structure.0).is_some();
        self.release(structure, removed);
    }

    fn create_fields(&mut self, structure: StructureHandle) -> Result<FieldsHandle, EngineError> {
        let s = self
            .structures
            .get(&structure.0)
            .ok_or(EngineError::InvalidHandle {
                kind: StructureHandle::KIND,
                id: structure.0,
            })?;
        let grid = self.grid(GridHandle(s.grid))?;
        let zeros = ArrayD::<f64>::zeros(IxDyn(&grid.shape));
        let fields = Fields {
            structure: structure.0,
            time: 0.0,
            dt: COURANT / grid.resolution,
            sources: Vec::new(),
            components: [zeros.clone(), zeros.clone(), zeros],
        };

        let id = self.allocate_id();
        self.fields.insert(id, fields);
        self.events.push(Event::FieldsCreated { fields: id });
        Ok(FieldsHandle(id))
    }

    fn add_point_source(
        &mut self,
        fields: FieldsHandle,
        component: Component,
        time: SourceTimeHandle,
        at: &[f64],
        amplitude: f64,
    ) -> Result<(), EngineError> {
        self.add_source(fields, component, time, at, at, amplitude)?;
        self.events.push(Event::PointSource {
            component,
            at: at.to_vec(),
            amplitude,
        });
        Ok(())
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
        self.add_source(fields, component, time, min_corner, max_corner, amplitude)?;
        self.events.push(Event::VolumeSource {
            component,
            min_corner: min_corner.to_vec(),
            max_corner: max_corner.to_vec(),
            amplitude,
        });
        Ok(())
    }

    fn step(&mut self, fields: FieldsHandle) -> Result<(), EngineError> {
        let source_times = &self.source_times;
        let target = self
            .fields
            .get_mut(&fields.0)
            .ok_or(EngineError::InvalidHandle {
                kind: FieldsHandle::KIND,
                id: fields.0,
            })?;

        target.time += target.dt;
        let t = target.time;
        for source in &target.sources {
            let frequency = source_times
                .get(&source.time.0)
                .copied()
                .ok_or(EngineError::InvalidHandle {
                    kind: SourceTimeHandle::KIND,
                    id: source.time.0,
                })?;
            let value = source.amplitude * (2.0 * PI * frequency * t).cos();
            let array = &mut target.components[source.component.axis()];
            for cell in &source.cells {
                array[IxDyn(cell)] = value;
            }
        }
        Ok(())
    }

    fn time(&self, fields: FieldsHandle) -> Result<f64, EngineError> {
        Ok(self.fields_ref(fields)?.time)
    }

    fn field_array(
        &self,
        fields: FieldsHandle,
        grid: GridHandle,
        component: &str,
    ) -> Result<ArrayD<f64>, EngineError> {
        let target = self.fields_ref(fields)?;
        let structure = self
            .structures
            .get(&target.structure)
            .ok_or(EngineError::InvalidHandle {
                kind: StructureHandle::KIND,
                id: target.structure,
            })?;
        self.grid(grid)?;
        if structure.grid != grid.0 {
            return Err(EngineError::InvalidArgument(format!(
                "fields {} were not built on grid {}",
                fields.0, grid.0
            )));
        }

        match component {
            "epsilon" => Ok(structure.epsilon.clone()),
            "ex" => Ok(target.components[0].clone()),
            "ey" => Ok(target.components[1].clone()),
            "ez" => Ok(target.components[2].clone()),
            other => Err(EngineError::UnsupportedComponent(other.to_string())),
        }
    }

    fn output_field(
        &mut self,
        fields: FieldsHandle,
        component: &str,
        grid: GridHandle,
    ) -> Result<(), EngineError> {
        let array = self.field_array(fields, grid, component)?;
        let time = self.time(fields)?;

        std::fs::create_dir_all(&self.output_dir)?;
        let path = self
            .output_dir
            .join(format!("{component}-{:09.3}.json", time));
        let dump = FieldDump {
            component,
            time,
            shape: array.shape(),
            data: array.iter().copied().collect(),
        };
        let json = serde_json::to_string_pretty(&dump)
            .map_err(|e| EngineError::Serialisation(e.to_string()))?;
        std::fs::write(&path, json)?;

        log::info!("{} written to {}", component, path.display());
        self.events.push(Event::Output {
            component: component.to_string(),
            path,
        });
        Ok(())
    }

    fn destroy_fields(&mut self, fields: FieldsHandle) {
        let removed = self.fields.remove(&fields.0).is_some();
        self.release(fields, removed);
    }

    fn create_continuous_time(&mut self, frequency: f64) -> Result<SourceTimeHandle, EngineError> {
        if !frequency.is_finite() {
            return Err(EngineError::InvalidArgument(format!(
                "source frequency must be finite, got {frequency}"
            )));
        }
        let id = self.allocate_id();
        self.source_times.insert(id, frequency);
        Ok(SourceTimeHandle(id))
    }

    fn source_frequency(&self, time: SourceTimeHandle) -> Result<f64, EngineError> {
        self.source_times
            .get(&time.0)
            .copied()
            .ok_or(EngineError::InvalidHandle {
                kind: SourceTimeHandle::KIND,
                id: time.0,
            })
    }

    fn set_source_frequency(
        &mut self,
        time: SourceTimeHandle,
        frequency: f64,
    ) -> Result<(), EngineError> {
        let slot = self
            .source_times
            .get_mut(&time.0)
            .ok_or(EngineError::InvalidHandle {
                kind: SourceTimeHandle::KIND,
                id: time.0,
            })?;
        *slot = frequency;
        Ok(())
    }

    fn destroy_source_time(&mut self, time: SourceTimeHandle) {
        let removed = self.source_times.remove(&time.0).is_some();
        self.release(time, removed);
    }
}
