//! Scenario runner: builds a domain from a job, hands it to the engine,
//! steps it and writes the requested quantities.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result};
use serde::Serialize;

use yee_core::{Domain, Pml, QuantityKind, Simulation, Source};
use yee_engine::{Component, Engine, EngineRef, Event, ReferenceEngine};
use yee_geometry::Block;

use crate::config::{BlockConfig, JobConfig, SourceConfig};

/// Summary of one quantity at the end of a run.
#[derive(Debug, Serialize)]
pub struct QuantitySummary {
    pub name: String,
    pub shape: Vec<usize>,
    pub min: f64,
    pub max: f64,
}

/// Everything a run reports back, written to `summary.json`.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub engine: String,
    pub dimensions: usize,
    pub size: Vec<f64>,
    pub resolution: f64,
    pub regions: usize,
    pub sources: usize,
    pub boundary_layers: usize,
    pub steps: usize,
    pub time: f64,
    pub quantities: Vec<QuantitySummary>,
    pub files: Vec<PathBuf>,
}

/// Assemble a domain from the job description.
pub fn build_domain(job: &JobConfig, engine: &EngineRef) -> Result<Domain> {
    let mut domain = Domain::new(engine, &job.domain.size, job.domain.resolution)
        .context("invalid [domain]")?;

    for (i, pml) in job.pml.iter().enumerate() {
        Pml::new(engine, pml.thickness)
            .and_then(|layer| domain.add_pml(layer))
            .with_context(|| format!("invalid [[pml]] #{}", i + 1))?;
    }

    for (i, cfg) in job.block.iter().enumerate() {
        let label = cfg
            .name
            .clone()
            .unwrap_or_else(|| format!("#{}", i + 1));
        let block = build_block(cfg).with_context(|| format!("invalid block '{label}'"))?;
        domain
            .add_region(block)
            .with_context(|| format!("cannot add block '{label}'"))?;
        log::info!("added block '{}'", label);
    }

    for (i, cfg) in job.source.iter().enumerate() {
        build_source(cfg, engine)
            .and_then(|s| domain.add_source(s))
            .with_context(|| format!("invalid [[source]] #{}", i + 1))?;
        log::info!("added {} source #{}", cfg.component, i + 1);
    }

    Ok(domain)
}

fn build_block(cfg: &BlockConfig) -> Result<Block> {
    let mut block = Block::new().with_size(&cfg.size)?;
    if let Some(center) = &cfg.center {
        block.set_center(center)?;
    }
    if let Some(material) = &cfg.material {
        block.set_material(material.to_spec())?;
    }
    Ok(block)
}

fn build_source(cfg: &SourceConfig, engine: &EngineRef) -> Result<Source, yee_core::SceneError> {
    let mut builder = Source::builder()
        .component(cfg.component.as_str())
        .amplitude(cfg.amplitude);
    if let Some(center) = &cfg.center {
        builder = builder.center(center);
    }
    if let Some(size) = &cfg.size {
        builder = builder.size(size);
    }
    if let Some(wavelength) = cfg.wavelength {
        builder = builder.wavelength(wavelength);
    }
    if let Some(frequency) = cfg.frequency {
        builder = builder.frequency(frequency);
    }
    builder.build(engine)
}

/// Build the scenario on a throwaway engine without stepping it.
pub fn validate_job(job: &JobConfig) -> Result<()> {
    let engine: EngineRef = Rc::new(RefCell::new(ReferenceEngine::new()));
    let domain = build_domain(job, &engine)?;
    for name in &job.output.quantities {
        name.parse::<QuantityKind>()
            .with_context(|| format!("invalid output quantity '{name}'"))?;
    }
    Simulation::new(domain).context("engine rejected the scenario")?;
    Ok(())
}

/// Run a job on the reference engine, writing field output into `out_dir`.
pub fn run_simulation(job: &JobConfig, out_dir: &Path) -> Result<RunSummary> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("cannot create {}", out_dir.display()))?;
    let reference = Rc::new(RefCell::new(ReferenceEngine::with_output_dir(out_dir)));
    let engine: EngineRef = reference.clone();

    let domain = build_domain(job, &engine)?;
    let mut sim = Simulation::new(domain).context("engine rejected the scenario")?;

    let steps = match (job.run.until, job.run.steps) {
        (Some(until), _) => sim.run_until(until)?,
        (None, Some(steps)) => {
            for _ in 0..steps {
                sim.step()?;
            }
            steps
        }
        (None, None) => 0,
    };
    let time = sim.time()?;
    println!("Ran {} steps, t = {:.4}", steps, time);

    let mut quantities = Vec::with_capacity(job.output.quantities.len());
    for name in &job.output.quantities {
        let quantity = sim
            .quantity(name)
            .with_context(|| format!("invalid output quantity '{name}'"))?;
        let values = quantity.materialize()?;
        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        println!("  {:<8} shape {:?}, range [{:.4e}, {:.4e}]", name, values.shape(), min, max);
        quantities.push(QuantitySummary {
            name: quantity.kind().to_string(),
            shape: values.shape().to_vec(),
            min,
            max,
        });

        // The engine writes single components; efield goes out as ex, ey, ez.
        if quantity.kind() == QuantityKind::Efield {
            for component in Component::ALL {
                sim.quantity(component.as_str())?.output()?;
            }
        } else {
            quantity.output()?;
        }
    }

    let files = reference
        .borrow()
        .events()
        .iter()
        .filter_map(|e| match e {
            Event::Output { path, .. } => Some(path.clone()),
            _ => None,
        })
        .collect();

    let domain = sim.domain();
    let engine = reference.borrow().name().to_string();
    Ok(RunSummary {
        engine,
        dimensions: domain.size().len(),
        size: domain.size().to_vec(),
        resolution: domain.resolution(),
        regions: domain.regions().len(),
        sources: domain.sources().len(),
        boundary_layers: domain.boundary_layers().len(),
        steps,
        time,
        quantities,
        files,
    })
}

/// Write a run summary as pretty-printed JSON.
pub fn write_summary(summary: &RunSummary, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(summary)
        .map_err(|e| anyhow::anyhow!("JSON serialisation error: {}", e))?;
    std::fs::write(path, json)?;
    println!("Summary written to: {}", path.display());
    Ok(())
}
