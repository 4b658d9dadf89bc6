//! # Yee Geometry
//!
//! Coordinate handling for Yee scenarios. This crate provides:
//!
//! - **Dimensional contract** ([`dimensions`]): infers an entity's number of
//!   spatial dimensions from the first coordinate tuple it receives and
//!   rejects every later tuple of a different length.
//! - **Primitives** ([`primitives`]): the rectangular [`Block`] region with
//!   an attached material.
//!
//! This keeps a 3-D region from being placed into a 2-D computational
//! domain: the mismatch is reported where the coordinates are assigned.

pub mod dimensions;
pub mod primitives;

pub use dimensions::{Coords, Dimensions, GeometryError, HasDimensions};
pub use primitives::Block;
