//! # Yee Core
//!
//! Scenario composition for the Yee framework. A scenario is assembled from
//! declarative objects before it is handed to the field-solving engine:
//!
//! 1. Create a [`Domain`] with a size and resolution. Its dimension count is
//!    locked from the size.
//! 2. Add [`Block`](yee_geometry::Block) regions, [`Source`]s and [`Pml`]
//!    boundary layers. Each addition is checked against the domain's
//!    dimension count before anything is registered.
//! 3. Move the domain into a [`Simulation`], then step it and read
//!    [`Quantity`] values.
//!
//! ## Modules
//!
//! - [`domain`]: The computational volume and its material function.
//! - [`source`]: Continuous-wave field excitations.
//! - [`boundary`]: Absorbing boundary layers.
//! - [`simulation`]: Engine handoff and time stepping.
//! - [`quantity`]: Lazily read field and material arrays.
//! - [`error`]: The [`SceneError`] taxonomy.

pub mod boundary;
pub mod domain;
pub mod error;
pub mod quantity;
pub mod simulation;
pub mod source;

pub use boundary::Pml;
pub use domain::{Domain, MaterialMode};
pub use error::SceneError;
pub use quantity::{Quantity, QuantityKind};
pub use simulation::Simulation;
pub use source::{parse_component, ContinuousProfile, Source, SourceBuilder};
