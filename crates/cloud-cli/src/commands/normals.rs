//! cloud normals command - estimate and orient normals, save the cloud.

use std::path::Path;

use anyhow::{Context, Result};
use cloud_recon::PointCloud;
use colored::Colorize;
use serde::Serialize;

use crate::{Cli, OutputFormat, output};

#[derive(Serialize)]
struct NormalsReport {
    input: String,
    output: String,
    points: usize,
    neighborhood_size: usize,
}

pub fn run(input: &Path, output_path: &Path, neighborhood_size: usize, cli: &Cli) -> Result<()> {
    let cloud = PointCloud::load(input)
        .with_context(|| format!("Failed to load point cloud from {:?}", input))?;

    let oriented = cloud
        .with_estimated_normals(neighborhood_size)
        .context("Normal estimation failed")?;

    oriented
        .save(output_path)
        .with_context(|| format!("Failed to save point cloud to {:?}", output_path))?;

    let report = NormalsReport {
        input: input.display().to_string(),
        output: output_path.display().to_string(),
        points: oriented.len(),
        neighborhood_size,
    };

    match cli.format {
        OutputFormat::Json => {
            output::print(&report, cli.format, cli.quiet);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                println!(
                    "{} normals for {} points (k = {})",
                    "Estimated".green().bold(),
                    report.points,
                    neighborhood_size
                );
                println!("  {}: {}", "Saved to".cyan(), output_path.display());
            }
        }
    }

    Ok(())
}
