//! Yee command-line interface.
//!
//! Build and run scenarios from TOML configuration files:
//! ```sh
//! yee-cli run job.toml
//! yee-cli validate job.toml
//! yee-cli components
//! ```

mod config;
mod runner;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use yee_core::QuantityKind;
use yee_engine::Component;

#[derive(Parser)]
#[command(name = "yee-cli")]
#[command(about = "Yee: declarative FDTD scenario composition")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario from a TOML configuration file.
    Run {
        /// Path to the job configuration file.
        config: PathBuf,
        /// Output directory (overrides config file setting).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Build a scenario without stepping it, reporting the first error.
    Validate {
        /// Path to the job configuration file.
        config: PathBuf,
    },
    /// List source components and output quantities.
    Components,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, output } => {
            println!("Yee scenario runner");
            println!("===================");
            let job = config::load_config(&config)?;
            println!("Configuration: {}", config.display());

            let out_dir = output.unwrap_or_else(|| PathBuf::from(&job.output.directory));
            let summary = runner::run_simulation(&job, &out_dir)?;
            runner::write_summary(&summary, &out_dir.join("summary.json"))?;

            println!("Run complete.");
            Ok(())
        }
        Commands::Validate { config } => {
            let job = config::load_config(&config)?;
            runner::validate_job(&job)?;
            println!("Configuration is valid: {}", config.display());
            Ok(())
        }
        Commands::Components => {
            println!("Source components:");
            for component in Component::ALL {
                println!("  {component}");
            }
            println!();
            println!("Output quantities:");
            for kind in [
                QuantityKind::Epsilon,
                QuantityKind::Efield,
                QuantityKind::Ex,
                QuantityKind::Ey,
                QuantityKind::Ez,
            ] {
                println!("  {kind}");
            }
            println!("  (\"dielectric\" is accepted for epsilon)");
            Ok(())
        }
    }
}
