//! # Yee Engine
//!
//! The boundary between scenario composition and the field-solving engine.
//! This crate provides an [`Engine`](backend::Engine) trait exposing the
//! engine's capabilities through opaque, typed handles, and an
//! [`Owned`](handle::Owned) guard that releases a handle deterministically
//! when its owner goes out of scope.
//!
//! ## Available engines
//!
//! | Engine | Feature flag | Status |
//! |--------|-------------|--------|
//! | Reference (in-process, no solver) | `reference` (default) | Implemented |
//!
//! The reference engine performs no numerical time integration. It keeps
//! enough state to rasterise materials, drive sources and hand back arrays,
//! which is what the composition layer and its tests need.

pub mod backend;
pub mod handle;

#[cfg(feature = "reference")]
pub mod reference;

pub use backend::{shared, Component, Engine, EngineError, EngineRef};
pub use handle::{
    BoundaryHandle, FieldsHandle, GridHandle, Handle, MaterialHandle, Owned, SourceTimeHandle,
    StructureHandle,
};

#[cfg(feature = "reference")]
pub use reference::{Event, ReferenceEngine};
