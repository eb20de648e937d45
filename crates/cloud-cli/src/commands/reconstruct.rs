//! cloud reconstruct command - point cloud to signed-distance field.

use std::path::Path;

use anyhow::{Context, Result};
use cloud_recon::{PointCloud, ReconstructionParams};
use colored::Colorize;
use serde::Serialize;

use crate::{Cli, OutputFormat, output};

#[derive(Serialize)]
struct ReconstructReport {
    input: String,
    output: String,
    points: usize,
    visited_points: usize,
    sample_spacing: f64,
    spacing_estimated: bool,
    dims: [usize; 3],
    nodes: usize,
}

pub fn run(
    input: &Path,
    output_path: &Path,
    neighborhood_size: usize,
    spacing: Option<f64>,
    cli: &Cli,
) -> Result<()> {
    let cloud = PointCloud::load(input)
        .with_context(|| format!("Failed to load point cloud from {:?}", input))?;

    let params = ReconstructionParams {
        neighborhood_size,
        sample_spacing: spacing,
    };

    let result = cloud
        .to_distance_field(&params)
        .context("Reconstruction failed")?;

    result
        .field
        .save_vtk(output_path)
        .with_context(|| format!("Failed to save distance field to {:?}", output_path))?;

    let report = ReconstructReport {
        input: input.display().to_string(),
        output: output_path.display().to_string(),
        points: result.point_count,
        visited_points: result.visited_points,
        sample_spacing: result.sample_spacing,
        spacing_estimated: result.spacing_estimated,
        dims: result.field.dims,
        nodes: result.field.node_count(),
    };

    match cli.format {
        OutputFormat::Json => {
            output::print(&report, cli.format, cli.quiet);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                println!(
                    "{} {} points into a {} x {} x {} field ({} nodes)",
                    "Reconstructed".green().bold(),
                    report.points,
                    report.dims[0],
                    report.dims[1],
                    report.dims[2],
                    report.nodes
                );
                println!(
                    "  {}: {}{}",
                    "Spacing".cyan(),
                    report.sample_spacing,
                    if report.spacing_estimated {
                        " (estimated)"
                    } else {
                        ""
                    }
                );
                if report.visited_points < report.points {
                    println!(
                        "  {}: {} of {} points unreachable from the propagation seed",
                        "Warning".yellow(),
                        report.points - report.visited_points,
                        report.points
                    );
                }
                println!("  {}: {}", "Saved to".cyan(), output_path.display());
            }
        }
    }

    Ok(())
}
