//! filmgen command-line interface.
//!
//! Generate thin-film datasets from TOML configuration files:
//! ```sh
//! filmgen generate job.toml
//! filmgen validate job.toml
//! filmgen bootstrap --dir resources/materials/bb_metals
//! filmgen materials
//! ```

mod config;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use filmgen_materials::binary::DEFAULT_DIRECTORY;
use filmgen_materials::bootstrap::bootstrap_catalog;

#[derive(Parser)]
#[command(name = "filmgen")]
#[command(about = "filmgen: synthetic thin-film optics datasets")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a dataset from a TOML configuration file.
    Generate {
        /// Path to the job configuration file.
        config: PathBuf,
        /// Output directory (overrides config file setting).
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Number of samples (overrides config file setting).
        #[arg(short = 'n', long)]
        samples: Option<usize>,
        /// Worker threads, 0 for all cores (overrides config file setting).
        #[arg(short = 'j', long)]
        threads: Option<usize>,
        /// Extend an existing dataset instead of replacing it.
        #[arg(long)]
        append: bool,
    },
    /// Validate a configuration file without generating anything.
    Validate {
        /// Path to the job configuration file.
        config: PathBuf,
    },
    /// Write the built-in Brendel-Bormann metals to disk and verify them.
    Bootstrap {
        /// Target directory for the material files.
        #[arg(short, long, default_value = DEFAULT_DIRECTORY)]
        dir: PathBuf,
    },
    /// Display information about available materials.
    Materials {
        /// Directory of additional material files.
        #[arg(short, long)]
        library_dir: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            config,
            output,
            samples,
            threads,
            append,
        } => {
            println!("filmgen dataset generator");
            println!("=========================");
            let mut job = config::load_config(&config)?;
            if let Some(samples) = samples {
                job.run.samples = samples;
            }
            if let Some(threads) = threads {
                job.run.threads = threads;
            }
            config::validate_config(&job)?;
            println!("Configuration: {}", config.display());

            let out_dir = output.unwrap_or_else(|| PathBuf::from(&job.output.directory));
            let result = runner::run_generation(&job, &out_dir, append)?;

            println!(
                "Generated {} samples ({} rows total) in {:.2?}",
                result.summary.samples, result.summary.total_rows, result.summary.elapsed
            );
            println!("Columns: {}", result.layout.semantics());
            Ok(())
        }
        Commands::Validate { config } => {
            let job = config::load_config(&config)?;
            let library = runner::build_library(job.materials.library_dir.as_deref())?;
            let batch = runner::build_orchestrator(&job, &library)?;
            let layout = batch.layout();
            println!("Configuration is valid: {}", config.display());
            println!("  Record width: {} {}", layout.width(), layout.semantics());
            println!("  Dataset stem: {}", job.dataset_stem());
            println!("  Example structure: {}", runner::preview(&batch, &library, &job)?);
            Ok(())
        }
        Commands::Bootstrap { dir } => {
            let reports = bootstrap_catalog(&dir)?;
            for report in &reports {
                print!("{}", report);
            }
            let failed = reports.iter().filter(|r| !r.all_passed()).count();
            if failed == 0 {
                println!("All {} materials verified in {}", reports.len(), dir.display());
            } else {
                println!(
                    "{} of {} materials failed verification in {}",
                    failed,
                    reports.len(),
                    dir.display()
                );
            }
            Ok(())
        }
        Commands::Materials { library_dir } => {
            let library = runner::build_library(library_dir.as_deref())?;
            runner::list_materials(&library);
            Ok(())
        }
    }
}
