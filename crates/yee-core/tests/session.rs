//! Integration tests for simulation sessions and field accessors.
//!
//! Covers engine handoff ordering, time stepping, `efield` stacking,
//! quantity output, and deterministic handle release.

use std::cell::RefCell;
use std::rc::Rc;

use approx::assert_relative_eq;
use ndarray::{s, Axis, Ix3};

use yee_core::{Domain, Pml, QuantityKind, SceneError, Simulation, Source};
use yee_engine::{Component, EngineError, EngineRef, Event, ReferenceEngine};
use yee_geometry::{Block, HasDimensions};
use yee_materials::Dielectric;

mod common;

use common::FailingEngine;

// ─────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────

fn engines_in(dir: &std::path::Path) -> (Rc<RefCell<ReferenceEngine>>, EngineRef) {
    let concrete = Rc::new(RefCell::new(ReferenceEngine::with_output_dir(dir)));
    let engine: EngineRef = concrete.clone();
    (concrete, engine)
}

fn engines() -> (Rc<RefCell<ReferenceEngine>>, EngineRef) {
    engines_in(std::path::Path::new("."))
}

fn failing_engines(operation: &'static str) -> (Rc<RefCell<FailingEngine>>, EngineRef) {
    let concrete = Rc::new(RefCell::new(FailingEngine::failing_on(operation)));
    let engine: EngineRef = concrete.clone();
    (concrete, engine)
}

fn block(center: [f64; 2], size: [f64; 2], material: Dielectric) -> Block {
    Block::new()
        .with_center(center)
        .unwrap()
        .with_size(size)
        .unwrap()
        .with_material(material)
        .unwrap()
}

/// A 4 x 2 domain at resolution 2 (an 8 x 4 cell grid) with a single
/// static point source driving `ez` at amplitude 2.
fn driven_domain(engine: &EngineRef) -> Domain {
    let mut domain = Domain::new(engine, [4.0, 2.0], 2.0).unwrap();
    let source = Source::builder()
        .component("ez")
        .center([0.1, 0.1])
        .size([0.0, 0.0])
        .amplitude(2.0)
        .frequency(0.0)
        .build(engine)
        .unwrap();
    domain.add_source(source).unwrap();
    domain
}

// ─────────────────────────────────────────────────────────────
// Engine handoff
// ─────────────────────────────────────────────────────────────

#[test]
fn test_structure_polarizabilities_follow_region_order() {
    let (concrete, engine) = engines();
    let mut domain = Domain::new(&engine, [4.0, 4.0], 2.0).unwrap();
    domain
        .add_region(block(
            [0.0, 0.0],
            [2.0, 2.0],
            Dielectric::new(1.0)
                .with_polarizability(5.0, 1.0, 0.1)
                .with_polarizability(4.0, 2.0, 0.2),
        ))
        .unwrap();
    domain
        .add_region(block([1.0, 1.0], [1.0, 1.0], Dielectric::new(3.0)))
        .unwrap();
    domain
        .add_region(block(
            [-1.0, -1.0],
            [1.0, 1.0],
            Dielectric::new(1.0).with_polarizability(3.0, 3.0, 0.3),
        ))
        .unwrap();

    let sim = Simulation::new(domain).unwrap();
    let engine = concrete.borrow();
    assert_eq!(
        engine.structure_polarizabilities(sim.structure_handle()).unwrap(),
        &[(1.0, 0.1), (2.0, 0.2), (3.0, 0.3)]
    );
}

#[test]
fn test_sources_registered_in_order_as_point_or_volume() {
    let (concrete, engine) = engines();
    let mut domain = Domain::new(&engine, [4.0, 4.0], 2.0).unwrap();
    let point = Source::builder()
        .component("ex")
        .center([0.5, 0.0])
        .size([0.0, 0.0])
        .amplitude(2.0)
        .frequency(1.0)
        .build(&engine)
        .unwrap();
    let volume = Source::builder()
        .component("ey")
        .center([0.0, 0.0])
        .size([1.0, 2.0])
        .frequency(1.0)
        .build(&engine)
        .unwrap();
    let unplaced = Source::builder()
        .component("ez")
        .size([0.0, 0.0])
        .frequency(1.0)
        .build(&engine)
        .unwrap();
    domain.add_source(point).unwrap();
    domain.add_source(volume).unwrap();
    domain.add_source(unplaced).unwrap();

    let _sim = Simulation::new(domain).unwrap();
    let engine = concrete.borrow();
    let sources: Vec<_> = engine
        .events()
        .iter()
        .filter(|e| matches!(e, Event::PointSource { .. } | Event::VolumeSource { .. }))
        .cloned()
        .collect();
    assert_eq!(
        sources,
        vec![
            Event::PointSource { component: Component::Ex, at: vec![0.5, 0.0], amplitude: 2.0 },
            Event::VolumeSource {
                component: Component::Ey,
                min_corner: vec![-0.5, -1.0],
                max_corner: vec![0.5, 1.0],
                amplitude: 1.0,
            },
            Event::PointSource { component: Component::Ez, at: vec![0.0, 0.0], amplitude: 1.0 },
        ]
    );
}

#[test]
fn test_structure_uses_boundary_layers() {
    let (concrete, engine) = engines();
    let mut domain = Domain::new(&engine, [4.0, 4.0], 2.0).unwrap();
    domain.add_pml(Pml::new(&engine, 1.0).unwrap()).unwrap();
    domain.add_pml(Pml::new(&engine, 0.5).unwrap()).unwrap();

    let sim = Simulation::new(domain).unwrap();
    assert_eq!(
        concrete.borrow().structure_pml(sim.structure_handle()).unwrap(),
        &[1.0, 0.5]
    );
}

// ─────────────────────────────────────────────────────────────
// Time stepping
// ─────────────────────────────────────────────────────────────

#[test]
fn test_time_increases_with_each_step() {
    let (_, engine) = engines();
    let mut sim = Simulation::new(driven_domain(&engine)).unwrap();
    assert_eq!(sim.time().unwrap(), 0.0);

    let mut last = 0.0;
    for _ in 0..5 {
        sim.step().unwrap();
        let now = sim.time().unwrap();
        assert!(now > last);
        last = now;
    }
    assert_relative_eq!(last, 1.25);
}

#[test]
fn test_run_until_counts_steps() {
    let (_, engine) = engines();
    let mut sim = Simulation::new(driven_domain(&engine)).unwrap();
    // dt = 0.5 / resolution = 0.25
    assert_eq!(sim.run_until(1.0).unwrap(), 4);
    assert_eq!(sim.run_until(1.0).unwrap(), 0);
}

// ─────────────────────────────────────────────────────────────
// Quantities
// ─────────────────────────────────────────────────────────────

#[test]
fn test_efield_stacks_components_on_trailing_axis() {
    let (_, engine) = engines();
    let mut sim = Simulation::new(driven_domain(&engine)).unwrap();
    sim.step().unwrap();

    let efield = sim.efield().materialize().unwrap();
    assert_eq!(efield.shape(), &[8, 4, 3]);

    let ex = sim.quantity("ex").unwrap().materialize().unwrap();
    let ez = sim.quantity("ez").unwrap().materialize().unwrap();
    assert_eq!(efield.index_axis(Axis(2), 0), ex);
    assert_eq!(efield.index_axis(Axis(2), 2), ez);
    assert_relative_eq!(ez.sum(), 2.0);

    let efield = efield.into_dimensionality::<Ix3>().unwrap();
    assert_relative_eq!(efield.slice(s![.., .., 2]).sum(), 2.0);
    assert_relative_eq!(efield.slice(s![.., .., 0..2]).sum(), 0.0);
}

#[test]
fn test_materialize_rereads_engine_state() {
    let (_, engine) = engines();
    let mut sim = Simulation::new(driven_domain(&engine)).unwrap();

    let before = sim.quantity("Ez").unwrap().materialize().unwrap();
    sim.step().unwrap();
    let after = sim.quantity("Ez").unwrap().materialize().unwrap();

    assert_relative_eq!(before.sum(), 0.0);
    assert_relative_eq!(after.sum(), 2.0);
}

#[test]
fn test_epsilon_reflects_region_precedence() {
    let (_, engine) = engines();
    let mut domain = Domain::new(&engine, [4.0, 2.0], 2.0).unwrap();
    domain
        .add_region(block([0.0, 0.0], [4.0, 2.0], Dielectric::new(4.0)))
        .unwrap();
    domain
        .add_region(block([1.0, 0.0], [2.0, 2.0], Dielectric::new(9.0)))
        .unwrap();
    let sim = Simulation::new(domain).unwrap();

    let eps = sim.epsilon().materialize().unwrap();
    assert_eq!(eps.shape(), &[8, 4]);
    assert_relative_eq!(eps[[0, 0]], 4.0);
    assert_relative_eq!(eps[[7, 3]], 9.0);

    let dielectric = sim.quantity("dielectric").unwrap();
    assert_eq!(dielectric.kind(), QuantityKind::Epsilon);
    assert_eq!(dielectric.materialize().unwrap(), eps);
}

#[test]
fn test_domain_without_regions_is_vacuum() {
    let (_, engine) = engines();
    let domain = Domain::new(&engine, [1.0, 1.0, 1.0], 4.0).unwrap();
    let sim = Simulation::new(domain).unwrap();
    let eps = sim.epsilon().materialize().unwrap();
    assert_eq!(eps.shape(), &[4, 4, 4]);
    assert!(eps.iter().all(|&v| v == 1.0));
}

#[test]
fn test_quantity_names() {
    let (_, engine) = engines();
    let sim = Simulation::new(driven_domain(&engine)).unwrap();
    assert_eq!(sim.quantity("EFIELD").unwrap().kind(), QuantityKind::Efield);
    assert_eq!(sim.epsilon().dimensions(), Some(2));

    let err = sim.quantity("hfield").unwrap_err();
    assert!(matches!(err, SceneError::UnknownEnumValue { .. }));
}

#[test]
fn test_output_writes_through_engine() {
    let dir = tempfile::tempdir().unwrap();
    let (concrete, engine) = engines_in(dir.path());
    let mut sim = Simulation::new(driven_domain(&engine)).unwrap();
    sim.step().unwrap();

    sim.quantity("ez").unwrap().output().unwrap();
    let written: Vec<_> = concrete
        .borrow()
        .events()
        .iter()
        .filter_map(|e| match e {
            Event::Output { path, .. } => Some(path.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(written.len(), 1);
    assert!(written[0].exists());

    let err = sim.efield().output().unwrap_err();
    assert!(matches!(
        err,
        SceneError::Engine(EngineError::UnsupportedComponent(ref c)) if c == "efield"
    ));
}

// ─────────────────────────────────────────────────────────────
// Teardown
// ─────────────────────────────────────────────────────────────

#[test]
fn test_dropping_session_releases_every_handle_in_order() {
    let (concrete, engine) = engines();
    let mut domain = driven_domain(&engine);
    domain
        .add_region(block([0.0, 0.0], [1.0, 1.0], Dielectric::new(2.0)))
        .unwrap();
    domain.add_pml(Pml::new(&engine, 0.5).unwrap()).unwrap();

    let sim = Simulation::new(domain).unwrap();
    assert!(concrete.borrow().live_handles() > 0);
    drop(sim);

    let engine = concrete.borrow();
    assert_eq!(engine.live_handles(), 0);
    let released: Vec<&str> = engine
        .events()
        .iter()
        .filter_map(|e| match e {
            Event::Released { kind, .. } => Some(*kind),
            _ => None,
        })
        .collect();
    assert_eq!(
        released,
        vec!["fields", "structure", "source time", "boundary", "material", "grid"]
    );
}

#[test]
fn test_failed_handoff_releases_every_handle() {
    let (concrete, engine) = failing_engines("create_fields");
    let mut domain = driven_domain(&engine);
    domain
        .add_region(block(
            [0.0, 0.0],
            [1.0, 1.0],
            Dielectric::new(2.0).with_polarizability(1.0, 1.0, 0.1),
        ))
        .unwrap();
    domain.add_pml(Pml::new(&engine, 0.5).unwrap()).unwrap();
    assert_eq!(concrete.borrow().inner.live_handles(), 4);

    let err = Simulation::new(domain).unwrap_err();
    assert!(matches!(err, SceneError::Engine(EngineError::InvalidArgument(_))));

    let engine = concrete.borrow();
    assert_eq!(engine.inner.live_handles(), 0);
    assert!(engine
        .inner
        .events()
        .iter()
        .any(|e| matches!(e, Event::Released { kind: "structure", .. })));
}

#[test]
fn test_partially_registered_region_blocks_handoff() {
    let (concrete, engine) = failing_engines("set_region_epsilon");
    let mut domain = Domain::new(&engine, [4.0, 4.0], 2.0).unwrap();
    assert!(!domain.is_incomplete());

    let err = domain
        .add_region(block([0.0, 0.0], [2.0, 2.0], Dielectric::new(4.0)))
        .unwrap_err();
    assert!(matches!(err, SceneError::Engine(_)));
    assert!(domain.regions().is_empty());
    assert!(domain.is_incomplete());

    let err = Simulation::new(domain).unwrap_err();
    assert!(matches!(err, SceneError::IncompleteDomain));
    assert_eq!(concrete.borrow().inner.live_handles(), 0);
}

#[test]
fn test_region_rejected_before_registration_keeps_domain_usable() {
    let (_, engine) = failing_engines("add_region");
    let mut domain = Domain::new(&engine, [4.0, 4.0], 2.0).unwrap();
    assert!(domain
        .add_region(block([0.0, 0.0], [2.0, 2.0], Dielectric::new(4.0)))
        .is_err());
    assert!(!domain.is_incomplete());
    assert!(Simulation::new(domain).is_ok());
}

#[test]
fn test_dropping_unused_domain_releases_handles() {
    let (concrete, engine) = engines();
    let domain = driven_domain(&engine);
    assert_eq!(concrete.borrow().live_handles(), 2);
    drop(domain);
    assert_eq!(concrete.borrow().live_handles(), 0);
}
