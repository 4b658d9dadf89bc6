//! TOML configuration deserialisation for scenario jobs.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use yee_materials::{Dielectric, MaterialSpec};

/// Top-level job configuration.
#[derive(Debug, Deserialize)]
pub struct JobConfig {
    pub domain: DomainConfig,
    #[serde(default)]
    pub pml: Vec<PmlConfig>,
    #[serde(default)]
    pub block: Vec<BlockConfig>,
    #[serde(default)]
    pub source: Vec<SourceConfig>,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Computational volume.
#[derive(Debug, Deserialize)]
pub struct DomainConfig {
    /// Extent along each axis; its length sets the dimension count.
    pub size: Vec<f64>,
    /// Cells per unit length (default: 10).
    #[serde(default = "default_resolution")]
    pub resolution: f64,
}

fn default_resolution() -> f64 {
    10.0
}

/// Absorbing boundary layer.
#[derive(Debug, Deserialize)]
pub struct PmlConfig {
    pub thickness: f64,
}

/// Rectangular material region.
#[derive(Debug, Deserialize)]
pub struct BlockConfig {
    /// Label used in log output and error messages.
    pub name: Option<String>,
    /// Block centre (default: origin).
    pub center: Option<Vec<f64>>,
    pub size: Vec<f64>,
    /// Block material (default: air).
    pub material: Option<MaterialConfig>,
}

/// Material specification: a bare epsilon, a named material, or a
/// dispersive dielectric.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MaterialConfig {
    Epsilon(f64),
    Name(String),
    Dispersive {
        #[serde(default = "default_epsilon")]
        epsilon: f64,
        /// `[sigma, omega, gamma]` triples, in registration order.
        #[serde(default)]
        polarizabilities: Vec<[f64; 3]>,
    },
}

fn default_epsilon() -> f64 {
    1.0
}

impl MaterialConfig {
    pub fn to_spec(&self) -> MaterialSpec {
        match self {
            MaterialConfig::Epsilon(epsilon) => MaterialSpec::Epsilon(*epsilon),
            MaterialConfig::Name(name) => MaterialSpec::Text(name.clone()),
            MaterialConfig::Dispersive {
                epsilon,
                polarizabilities,
            } => {
                let mut material = Dielectric::new(*epsilon);
                for &[sigma, omega, gamma] in polarizabilities {
                    material.add_polarizability(sigma, omega, gamma);
                }
                material.into()
            }
        }
    }
}

/// Continuous-wave source.
#[derive(Debug, Deserialize)]
pub struct SourceConfig {
    /// Field component: `ex`, `ey` or `ez` (default: `ex`).
    #[serde(default = "default_component")]
    pub component: String,
    /// Source centre (default: origin).
    pub center: Option<Vec<f64>>,
    /// Source extent; all zeros or absent means a point source.
    pub size: Option<Vec<f64>>,
    #[serde(default = "default_amplitude")]
    pub amplitude: f64,
    pub wavelength: Option<f64>,
    pub frequency: Option<f64>,
}

fn default_component() -> String {
    "ex".into()
}

fn default_amplitude() -> f64 {
    1.0
}

/// How long to run. With neither field set the scenario is built and
/// sampled at time zero.
#[derive(Debug, Default, Deserialize)]
pub struct RunConfig {
    /// Step until the simulated time reaches this value.
    pub until: Option<f64>,
    /// Take exactly this many steps.
    pub steps: Option<usize>,
}

/// Output configuration.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Output directory (default: "./output").
    #[serde(default = "default_output_dir")]
    pub directory: String,
    /// Quantities to write at the end of the run (default: epsilon).
    #[serde(default = "default_quantities")]
    pub quantities: Vec<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            quantities: default_quantities(),
        }
    }
}

fn default_output_dir() -> String {
    "./output".into()
}

fn default_quantities() -> Vec<String> {
    vec!["epsilon".into()]
}

impl JobConfig {
    /// Checks that cannot be expressed through deserialisation alone.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.run.until.is_some() && self.run.steps.is_some() {
            anyhow::bail!("[run] accepts either 'until' or 'steps', not both");
        }
        if let Some(until) = self.run.until {
            if !until.is_finite() || until < 0.0 {
                anyhow::bail!("[run] until must be a non-negative time, got {until}");
            }
        }
        Ok(())
    }
}

/// Load and parse a TOML job configuration file.
pub fn load_config(path: &Path) -> anyhow::Result<JobConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let config: JobConfig = toml::from_str(&content)
        .with_context(|| format!("cannot parse {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use yee_materials::Material;

    const JOB: &str = r#"
        [domain]
        size = [4.0, 4.0]
        resolution = 20

        [[pml]]
        thickness = 0.5

        [[block]]
        name = "slab"
        size = [1.0, 4.0]
        material = 12

        [[block]]
        center = [1.0, 0.0]
        size = [1.0, 1.0]
        material = { epsilon = 2.0, polarizabilities = [[5.0, 1.0, 0.1]] }

        [[block]]
        size = [0.5, 0.5]
        material = "air"

        [[source]]
        component = "Ez"
        center = [-1.0, 0.0]
        wavelength = 1.5

        [run]
        until = 2.0

        [output]
        directory = "out"
        quantities = ["epsilon", "efield"]
    "#;

    #[test]
    fn test_parse_full_job() {
        let job: JobConfig = toml::from_str(JOB).unwrap();
        job.validate().unwrap();

        assert_eq!(job.domain.size, vec![4.0, 4.0]);
        assert_eq!(job.domain.resolution, 20.0);
        assert_eq!(job.pml.len(), 1);
        assert_eq!(job.block.len(), 3);
        assert_eq!(job.block[0].name.as_deref(), Some("slab"));
        assert!(job.block[0].center.is_none());
        assert!(matches!(job.block[0].material, Some(MaterialConfig::Epsilon(e)) if e == 12.0));
        assert!(matches!(
            &job.block[1].material,
            Some(MaterialConfig::Dispersive { epsilon, polarizabilities })
                if *epsilon == 2.0 && polarizabilities == &vec![[5.0, 1.0, 0.1]]
        ));
        assert!(matches!(&job.block[2].material, Some(MaterialConfig::Name(n)) if n == "air"));

        let source = &job.source[0];
        assert_eq!(source.component, "Ez");
        assert_eq!(source.amplitude, 1.0);
        assert_eq!(source.wavelength, Some(1.5));
        assert!(source.frequency.is_none());

        assert_eq!(job.run.until, Some(2.0));
        assert_eq!(job.output.directory, "out");
        assert_eq!(job.output.quantities, vec!["epsilon", "efield"]);
    }

    #[test]
    fn test_defaults() {
        let job: JobConfig = toml::from_str("[domain]\nsize = [1.0]\n").unwrap();
        assert_eq!(job.domain.resolution, 10.0);
        assert!(job.block.is_empty() && job.source.is_empty() && job.pml.is_empty());
        assert!(job.run.until.is_none() && job.run.steps.is_none());
        assert_eq!(job.output.directory, "./output");
        assert_eq!(job.output.quantities, vec!["epsilon"]);
    }

    #[test]
    fn test_until_and_steps_are_exclusive() {
        let job: JobConfig =
            toml::from_str("[domain]\nsize = [1.0]\n[run]\nuntil = 1.0\nsteps = 3\n").unwrap();
        assert!(job.validate().is_err());
    }

    #[test]
    fn test_dispersive_material_spec_keeps_resonance_order() {
        let config = MaterialConfig::Dispersive {
            epsilon: 3.0,
            polarizabilities: vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]],
        };
        let material = config.to_spec().resolve().unwrap();
        assert_eq!(material.epsilon(), 3.0);
        let triples: Vec<_> = material
            .polarizabilities()
            .iter()
            .map(|p| p.as_tuple())
            .collect();
        assert_eq!(triples, vec![(1.0, 2.0, 3.0), (4.0, 5.0, 6.0)]);
    }
}
