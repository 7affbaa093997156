//! Beam dump command-line interface.
//!
//! Build the GDML geometry from an optional TOML job file:
//! ```sh
//! beamdump build job.toml -o output/
//! beamdump validate job.toml
//! beamdump check job.toml --strict
//! beamdump materials
//! ```

mod runner;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "beamdump")]
#[command(about = "Beam dump geometry builder: GDML output for Geant4 and BDSIM")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the geometry and write it as GDML.
    Build {
        /// Path to the job configuration file (defaults if omitted).
        config: Option<PathBuf>,
        /// Output directory (overrides config file setting).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file and build the model without writing it.
    Validate {
        /// Path to the job configuration file.
        config: PathBuf,
    },
    /// Build the geometry and check it for overlaps and protrusions.
    Check {
        /// Path to the job configuration file (defaults if omitted).
        config: Option<PathBuf>,
        /// Exit with an error if anything is found.
        #[arg(long)]
        strict: bool,
        /// Surface samples per direction and solid face.
        #[arg(long, default_value_t = 12)]
        resolution: usize,
    },
    /// List the predefined materials and the compounds built from them.
    Materials,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { config, output } => {
            println!("Beam Dump Geometry Builder");
            println!("==========================");
            let job = runner::load_job(config.as_deref())?;
            if let Some(path) = &config {
                println!("Configuration: {}", path.display());
            }

            let out_dir = output.unwrap_or_else(|| PathBuf::from(&job.output.directory));
            runner::run_build(&job, &out_dir)?;

            println!("Build complete.");
            Ok(())
        }
        Commands::Validate { config } => {
            let job = runner::load_job(Some(config.as_path()))?;
            let registry = runner::build_registry(&job)?;
            println!("Configuration is valid: {}", config.display());
            println!(
                "  {} solids, {} placements",
                registry.solids().len(),
                registry.physical_volumes().count()
            );
            Ok(())
        }
        Commands::Check {
            config,
            strict,
            resolution,
        } => {
            let job = runner::load_job(config.as_deref())?;
            runner::run_check(&job, resolution, strict)
        }
        Commands::Materials => {
            runner::print_materials();
            Ok(())
        }
    }
}
