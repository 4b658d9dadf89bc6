//! Opaque engine handles and scoped release.
//!
//! Each engine object kind has its own handle type so a grid can never be
//! passed where a structure is expected. [`Owned`] ties a handle to the
//! lifetime of its owner and releases it on drop.

use std::fmt;
use std::rc::Rc;

use crate::backend::{Engine, EngineError, EngineRef};

/// A typed engine handle that knows how to release itself.
pub trait Handle: Copy + fmt::Debug {
    /// Kind name used in diagnostics.
    const KIND: &'static str;

    /// Raw identifier assigned by the engine.
    fn id(&self) -> u64;

    /// Call the engine teardown for this handle.
    fn release(self, engine: &mut dyn Engine);
}

/// Grid volume handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridHandle(pub u64);

/// Material function handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialHandle(pub u64);

/// Boundary region (PML) handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundaryHandle(pub u64);

/// Discretised structure handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StructureHandle(pub u64);

/// Fields handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldsHandle(pub u64);

/// Source time-profile handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceTimeHandle(pub u64);

impl Handle for GridHandle {
    const KIND: &'static str = "grid";

    fn id(&self) -> u64 {
        self.0
    }

    fn release(self, engine: &mut dyn Engine) {
        engine.destroy_grid(self);
    }
}

impl Handle for MaterialHandle {
    const KIND: &'static str = "material";

    fn id(&self) -> u64 {
        self.0
    }

    fn release(self, engine: &mut dyn Engine) {
        engine.destroy_region_material(self);
    }
}

impl Handle for BoundaryHandle {
    const KIND: &'static str = "boundary";

    fn id(&self) -> u64 {
        self.0
    }

    fn release(self, engine: &mut dyn Engine) {
        engine.destroy_boundary(self);
    }
}

impl Handle for StructureHandle {
    const KIND: &'static str = "structure";

    fn id(&self) -> u64 {
        self.0
    }

    fn release(self, engine: &mut dyn Engine) {
        engine.destroy_structure(self);
    }
}

impl Handle for FieldsHandle {
    const KIND: &'static str = "fields";

    fn id(&self) -> u64 {
        self.0
    }

    fn release(self, engine: &mut dyn Engine) {
        engine.destroy_fields(self);
    }
}

impl Handle for SourceTimeHandle {
    const KIND: &'static str = "source time";

    fn id(&self) -> u64 {
        self.0
    }

    fn release(self, engine: &mut dyn Engine) {
        engine.destroy_source_time(self);
    }
}

/// A handle owned by a scenario object, released when dropped.
pub struct Owned<H: Handle> {
    handle: H,
    engine: EngineRef,
}

impl<H: Handle> Owned<H> {
    /// Run `create` against the engine and take ownership of the result.
    pub fn acquire<F>(engine: &EngineRef, create: F) -> Result<Self, EngineError>
    where
        F: FnOnce(&mut dyn Engine) -> Result<H, EngineError>,
    {
        let handle = create(&mut *engine.borrow_mut())?;
        log::debug!("acquired {} handle {}", H::KIND, handle.id());
        Ok(Self {
            handle,
            engine: Rc::clone(engine),
        })
    }

    #[inline]
    pub fn handle(&self) -> H {
        self.handle
    }

    /// The engine this handle belongs to.
    pub fn engine(&self) -> &EngineRef {
        &self.engine
    }
}

impl<H: Handle> fmt::Debug for Owned<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Owned").field(&self.handle).finish()
    }
}

impl<H: Handle> Drop for Owned<H> {
    fn drop(&mut self) {
        match self.engine.try_borrow_mut() {
            Ok(mut engine) => {
                log::debug!("releasing {} handle {}", H::KIND, self.handle.id());
                self.handle.release(&mut *engine);
            }
            Err(_) => log::error!(
                "engine is borrowed; leaking {} handle {}",
                H::KIND,
                self.handle.id()
            ),
        }
    }
}
