//! Field excitations.
//!
//! A [`Source`] drives one electric field component at a point or over a
//! box. Its time dependence is a continuous wave held by the engine as an
//! opaque time profile, released when the source is dropped.

use ndarray::Array1;
use yee_engine::{Component, EngineRef, Owned, SourceTimeHandle};
use yee_geometry::{Coords, Dimensions, HasDimensions};

use crate::error::SceneError;

/// Parse a field component name (`ex`, `ey`, `ez`), ignoring case.
pub fn parse_component(value: &str) -> Result<Component, SceneError> {
    match value.to_ascii_lowercase().as_str() {
        "ex" => Ok(Component::Ex),
        "ey" => Ok(Component::Ey),
        "ez" => Ok(Component::Ez),
        _ => Err(SceneError::UnknownEnumValue {
            kind: "component",
            value: value.to_string(),
        }),
    }
}

/// A continuous-wave time profile owned by the engine.
#[derive(Debug)]
pub struct ContinuousProfile {
    time: Owned<SourceTimeHandle>,
}

impl ContinuousProfile {
    /// Create a profile oscillating at `frequency`.
    pub fn new(engine: &EngineRef, frequency: f64) -> Result<Self, SceneError> {
        let time = Owned::acquire(engine, |e| e.create_continuous_time(frequency))?;
        Ok(Self { time })
    }

    /// Create a profile from exactly one of a wavelength or a frequency.
    ///
    /// A wavelength $\lambda$ is converted to the frequency $1/\lambda$.
    pub fn from_wavelength_or_frequency(
        engine: &EngineRef,
        wavelength: Option<f64>,
        frequency: Option<f64>,
    ) -> Result<Self, SceneError> {
        let frequency = match (wavelength, frequency) {
            (Some(w), None) => 1.0 / w,
            (None, Some(f)) => f,
            _ => {
                return Err(SceneError::AmbiguousSourceFrequency {
                    wavelength,
                    frequency,
                })
            }
        };
        Self::new(engine, frequency)
    }

    pub fn frequency(&self) -> Result<f64, SceneError> {
        let engine = self.time.engine().borrow();
        Ok(engine.source_frequency(self.time.handle())?)
    }

    pub fn set_frequency(&mut self, frequency: f64) -> Result<(), SceneError> {
        let mut engine = self.time.engine().borrow_mut();
        Ok(engine.set_source_frequency(self.time.handle(), frequency)?)
    }

    #[inline]
    pub fn handle(&self) -> SourceTimeHandle {
        self.time.handle()
    }

    /// Engine that owns the time profile.
    pub fn engine(&self) -> &EngineRef {
        self.time.engine()
    }
}

/// A continuous-wave source.
#[derive(Debug)]
pub struct Source {
    dims: Dimensions,
    component: Component,
    center: Option<Coords>,
    size: Option<Coords>,
    amplitude: f64,
    profile: ContinuousProfile,
}

impl Source {
    pub fn builder() -> SourceBuilder {
        SourceBuilder::default()
    }

    pub fn component(&self) -> Component {
        self.component
    }

    /// Set the driven component by name (case-insensitive).
    pub fn set_component(&mut self, value: &str) -> Result<(), SceneError> {
        self.component = parse_component(value)?;
        Ok(())
    }

    pub fn center(&self) -> Option<&Coords> {
        self.center.as_ref()
    }

    pub fn set_center(&mut self, center: impl AsRef<[f64]>) -> Result<(), SceneError> {
        self.center = Some(self.dims.agree("center", center.as_ref())?);
        Ok(())
    }

    pub fn size(&self) -> Option<&Coords> {
        self.size.as_ref()
    }

    pub fn set_size(&mut self, size: impl AsRef<[f64]>) -> Result<(), SceneError> {
        self.size = Some(self.dims.agree("size", size.as_ref())?);
        Ok(())
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    pub fn set_amplitude(&mut self, amplitude: f64) {
        self.amplitude = amplitude;
    }

    /// True iff every size component is exactly zero. A source without a
    /// size is a point source.
    pub fn is_point_source(&self) -> bool {
        self.size
            .as_ref()
            .map_or(true, |size| size.iter().all(|&s| s == 0.0))
    }

    pub fn frequency(&self) -> Result<f64, SceneError> {
        self.profile.frequency()
    }

    pub fn set_frequency(&mut self, frequency: f64) -> Result<(), SceneError> {
        self.profile.set_frequency(frequency)
    }

    pub fn profile(&self) -> &ContinuousProfile {
        &self.profile
    }

    pub fn engine(&self) -> &EngineRef {
        self.profile.engine()
    }

    /// Center, or the origin when none was given.
    pub(crate) fn center_or_origin(&self) -> Coords {
        match &self.center {
            Some(center) => center.clone(),
            None => Array1::zeros(self.dims.get().unwrap_or(0)),
        }
    }

    /// `(center - size / 2, center + size / 2)`.
    pub(crate) fn corners(&self) -> (Coords, Coords) {
        let center = self.center_or_origin();
        match &self.size {
            Some(size) => {
                let half = size / 2.0;
                (&center - &half, &center + &half)
            }
            None => (center.clone(), center),
        }
    }
}

impl HasDimensions for Source {
    fn dimensions(&self) -> Option<usize> {
        self.dims.get()
    }
}

/// Builder for [`Source`].
///
/// ```no_run
/// # use yee_core::Source;
/// # fn demo(engine: &yee_engine::EngineRef) -> Result<(), yee_core::SceneError> {
/// let source = Source::builder()
///     .component("Ez")
///     .center([0.0, 0.0])
///     .size([0.0, 0.0])
///     .wavelength(1.5)
///     .build(engine)?;
/// assert!(source.is_point_source());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SourceBuilder {
    component: String,
    center: Option<Vec<f64>>,
    size: Option<Vec<f64>>,
    amplitude: f64,
    wavelength: Option<f64>,
    frequency: Option<f64>,
}

impl Default for SourceBuilder {
    fn default() -> Self {
        Self {
            component: "ex".into(),
            center: None,
            size: None,
            amplitude: 1.0,
            wavelength: None,
            frequency: None,
        }
    }
}

impl SourceBuilder {
    pub fn component(mut self, component: impl Into<String>) -> Self {
        self.component = component.into();
        self
    }

    pub fn center(mut self, center: impl AsRef<[f64]>) -> Self {
        self.center = Some(center.as_ref().to_vec());
        self
    }

    pub fn size(mut self, size: impl AsRef<[f64]>) -> Self {
        self.size = Some(size.as_ref().to_vec());
        self
    }

    pub fn amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }

    pub fn wavelength(mut self, wavelength: f64) -> Self {
        self.wavelength = Some(wavelength);
        self
    }

    pub fn frequency(mut self, frequency: f64) -> Self {
        self.frequency = Some(frequency);
        self
    }

    /// Validate the configuration and acquire the engine time profile.
    pub fn build(self, engine: &EngineRef) -> Result<Source, SceneError> {
        let component = parse_component(&self.component)?;

        let mut dims = Dimensions::unset();
        let size = self
            .size
            .as_deref()
            .map(|s| dims.agree("size", s))
            .transpose()?;
        let center = self
            .center
            .as_deref()
            .map(|c| dims.agree("center", c))
            .transpose()?;

        let profile =
            ContinuousProfile::from_wavelength_or_frequency(engine, self.wavelength, self.frequency)?;

        Ok(Source {
            dims,
            component,
            center,
            size,
            amplitude: self.amplitude,
            profile,
        })
    }
}
