//! Field accessors.
//!
//! A [`Quantity`] names a field or material value over the domain. It holds
//! no data: every [`materialize`](Quantity::materialize) call reads the
//! engine's current state, since fields change between steps.

use std::fmt;
use std::str::FromStr;

use ndarray::{stack, ArrayD, Axis};
use yee_engine::Component;
use yee_geometry::HasDimensions;

use crate::error::SceneError;
use crate::simulation::Simulation;

/// Quantities that can be read from a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuantityKind {
    /// Dielectric function.
    Epsilon,
    /// Electric field, all three components.
    Efield,
    Ex,
    Ey,
    Ez,
}

impl QuantityKind {
    /// Engine name of the quantity.
    pub fn name(&self) -> &'static str {
        match self {
            QuantityKind::Epsilon => "epsilon",
            QuantityKind::Efield => "efield",
            QuantityKind::Ex => "ex",
            QuantityKind::Ey => "ey",
            QuantityKind::Ez => "ez",
        }
    }
}

impl FromStr for QuantityKind {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "epsilon" | "dielectric" => Ok(QuantityKind::Epsilon),
            "efield" => Ok(QuantityKind::Efield),
            "ex" => Ok(QuantityKind::Ex),
            "ey" => Ok(QuantityKind::Ey),
            "ez" => Ok(QuantityKind::Ez),
            _ => Err(SceneError::UnknownEnumValue {
                kind: "component type",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for QuantityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A lazily read quantity over a simulation's domain.
#[derive(Debug, Clone, Copy)]
pub struct Quantity<'a> {
    kind: QuantityKind,
    simulation: &'a Simulation,
}

impl<'a> Quantity<'a> {
    pub fn new(kind: QuantityKind, simulation: &'a Simulation) -> Self {
        Self { kind, simulation }
    }

    pub fn kind(&self) -> QuantityKind {
        self.kind
    }

    /// Read the quantity from the engine.
    ///
    /// `efield` fetches `ex`, `ey` and `ez` separately and stacks them along
    /// a new trailing axis of length 3, in that order.
    pub fn materialize(&self) -> Result<ArrayD<f64>, SceneError> {
        let engine = self.simulation.engine().borrow();
        let fields = self.simulation.fields_handle();
        let grid = self.simulation.domain().grid_handle();

        if self.kind != QuantityKind::Efield {
            return Ok(engine.field_array(fields, grid, self.kind.name())?);
        }

        let parts = Component::ALL
            .iter()
            .map(|c| engine.field_array(fields, grid, c.as_str()))
            .collect::<Result<Vec<_>, _>>()?;
        let views: Vec<_> = parts.iter().map(|a| a.view()).collect();
        let trailing = Axis(parts[0].ndim());
        Ok(stack(trailing, &views)?)
    }

    /// Ask the engine to write the quantity in its native output format.
    pub fn output(&self) -> Result<(), SceneError> {
        let mut engine = self.simulation.engine().borrow_mut();
        engine.output_field(
            self.simulation.fields_handle(),
            self.kind.name(),
            self.simulation.domain().grid_handle(),
        )?;
        Ok(())
    }
}

impl HasDimensions for Quantity<'_> {
    fn dimensions(&self) -> Option<usize> {
        self.simulation.domain().dimensions()
    }
}
