//! cloud-cli: Command-line interface for point-cloud reconstruction.
//!
//! This tool exposes the cloud-recon pipeline from the command line,
//! suitable for scripting and batch processing of scanner exports.
//!
//! # Logging
//!
//! Set the `RUST_LOG` environment variable to control log output:
//! - `RUST_LOG=cloud_recon=info` - Basic stage logging
//! - `RUST_LOG=cloud_recon=debug` - Detailed progress logging
//! - `RUST_LOG=cloud_recon::timing=debug` - Performance timing
//!
//! # Example
//!
//! ```bash
//! # Reconstruct a distance field with auto-estimated spacing
//! RUST_LOG=cloud_recon=info cloud reconstruct scan.ply -o field.vtk
//!
//! # Finer lattice and a larger neighborhood
//! cloud reconstruct scan.xyz -o field.vtk --spacing 0.5 -k 30
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;
mod output;

use commands::{info, normals, reconstruct};

/// cloud - Reconstruct signed-distance fields from point clouds.
#[derive(Parser)]
#[command(name = "cloud")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format for results
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Suppress all non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Increase output verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for scripting
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Display point cloud statistics
    Info {
        /// Input point cloud file (PLY or XYZ)
        input: PathBuf,
    },

    /// Estimate consistently oriented normals and save the cloud
    Normals {
        /// Input point cloud file
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Number of nearest neighbors per point
        #[arg(short = 'k', long, default_value = "20")]
        neighborhood_size: usize,
    },

    /// Reconstruct a signed-distance field and save it as legacy VTK
    Reconstruct {
        /// Input point cloud file
        input: PathBuf,

        /// Output VTK file path
        #[arg(short, long)]
        output: PathBuf,

        /// Number of nearest neighbors per point
        #[arg(short = 'k', long, default_value = "20")]
        neighborhood_size: usize,

        /// Lattice node spacing (omit to auto-estimate from point density)
        #[arg(long)]
        spacing: Option<f64>,
    },
}

/// Initialize the tracing subscriber based on verbosity level.
fn init_tracing(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    // RUST_LOG wins over -v flags when set.
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "warn",
            1 => "cloud_recon=info",
            2 => "cloud_recon=debug",
            _ => "trace",
        };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    // Install miette's panic hook for better error display in development.
    #[cfg(debug_assertions)]
    miette::set_panic_hook();

    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Info { input } => info::run(input, &cli),
        Commands::Normals {
            input,
            output,
            neighborhood_size,
        } => normals::run(input, output, *neighborhood_size, &cli),
        Commands::Reconstruct {
            input,
            output,
            neighborhood_size,
            spacing,
        } => reconstruct::run(input, output, *neighborhood_size, *spacing, &cli),
    };

    if let Err(e) = &result {
        if !cli.quiet {
            if let Some(recon_err) = e.downcast_ref::<cloud_recon::ReconError>() {
                eprintln!("{}: {}", "Error".red().bold(), recon_err);
                eprintln!("  {}: {}", "Code".cyan(), recon_err.code());
            } else {
                eprintln!("{}: {}", "Error".red().bold(), e);
                for cause in e.chain().skip(1) {
                    eprintln!("  {}: {}", "Caused by".yellow(), cause);
                }
            }
        }
        std::process::exit(1);
    }

    Ok(())
}
