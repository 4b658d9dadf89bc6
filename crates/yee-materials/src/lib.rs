//! # Yee Materials
//!
//! Material models for Yee scenarios. Every medium implements the
//! [`Material`](provider::Material) trait, which exposes a real relative
//! permittivity and an ordered list of Lorentzian polarizability resonances.
//!
//! ## Available materials
//!
//! | Material | Module | Notes |
//! |----------|--------|-------|
//! | Dielectric with resonances | [`dielectric`] | General purpose |
//! | Air / vacuum | [`dielectric::air`] | Shared immutable default |
//!
//! Regions accept anything convertible into a [`MaterialSpec`](spec::MaterialSpec):
//! an existing material, a real epsilon, or text naming one of those.

pub mod dielectric;
pub mod provider;
pub mod spec;

pub use dielectric::{air, vacuum, Dielectric};
pub use provider::{Material, MaterialError, Polarizability};
pub use spec::MaterialSpec;
