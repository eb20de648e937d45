//! Point cloud file I/O.
//!
//! Two formats are supported, auto-detected from the file extension:
//!
//! - **PLY** (Stanford polygon format): positions as `x y z` vertex
//!   properties, normals as optional `nx ny nz`.
//! - **XYZ** (plain ASCII): one `x y z [nx ny nz]` line per point; `#` and
//!   `//` comment lines are skipped.
//!
//! The reconstruction contract itself is purely in-memory; these loaders
//! exist so the CLI and tests can feed real scanner exports through the
//! pipeline.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use nalgebra::Vector3;
use ply_rs::ply::Property;
use tracing::{info, warn};

use crate::cloud::{CloudPoint, PointCloud};
use crate::error::{ReconError, ReconResult};

/// Supported point cloud file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointCloudFormat {
    /// PLY (Stanford Polygon File Format)
    Ply,
    /// XYZ (simple ASCII x y z [nx ny nz] format)
    Xyz,
}

impl PointCloudFormat {
    /// Detect format from file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .and_then(|ext| match ext.as_str() {
                "ply" => Some(PointCloudFormat::Ply),
                "xyz" | "txt" | "asc" | "pts" => Some(PointCloudFormat::Xyz),
                _ => None,
            })
    }
}

/// Load a point cloud, auto-detecting format from the extension.
pub fn load_cloud(path: &Path) -> ReconResult<PointCloud> {
    let format = PointCloudFormat::from_path(path).ok_or_else(|| {
        ReconError::unsupported_format(
            path.extension().and_then(|e| e.to_str()).map(String::from),
        )
    })?;

    info!("Loading point cloud from {:?} (format: {:?})", path, format);

    let cloud = match format {
        PointCloudFormat::Ply => load_ply(path)?,
        PointCloudFormat::Xyz => load_xyz(path)?,
    };

    info!(
        "Loaded {} points (has_normals: {})",
        cloud.len(),
        cloud.has_normals()
    );

    Ok(cloud)
}

/// Save a point cloud, auto-detecting format from the extension.
pub fn save_cloud(cloud: &PointCloud, path: &Path) -> ReconResult<()> {
    let format = PointCloudFormat::from_path(path).ok_or_else(|| {
        ReconError::unsupported_format(
            path.extension().and_then(|e| e.to_str()).map(String::from),
        )
    })?;

    info!("Saving {} points to {:?} (format: {:?})", cloud.len(), path, format);

    match format {
        PointCloudFormat::Ply => save_ply(cloud, path),
        PointCloudFormat::Xyz => save_xyz(cloud, path),
    }
}

fn load_ply(path: &Path) -> ReconResult<PointCloud> {
    use ply_rs::parser::Parser;

    let file = File::open(path).map_err(|e| ReconError::io_read(path, e))?;
    let mut reader = BufReader::new(file);

    let parser = Parser::<ply_rs::ply::DefaultElement>::new();
    let ply = parser
        .read_ply(&mut reader)
        .map_err(|e| ReconError::parse_error(path, format!("PLY parse error: {:?}", e)))?;

    let mut cloud = PointCloud::new();

    if let Some(vertices) = ply.payload.get("vertex") {
        cloud = PointCloud::with_capacity(vertices.len());

        for element in vertices {
            let x = ply_float(element.get("x"))
                .ok_or_else(|| ReconError::parse_error(path, "vertex missing x property"))?;
            let y = ply_float(element.get("y"))
                .ok_or_else(|| ReconError::parse_error(path, "vertex missing y property"))?;
            let z = ply_float(element.get("z"))
                .ok_or_else(|| ReconError::parse_error(path, "vertex missing z property"))?;

            let mut point = CloudPoint::from_coords(x, y, z);

            if let (Some(nx), Some(ny), Some(nz)) = (
                ply_float(element.get("nx")),
                ply_float(element.get("ny")),
                ply_float(element.get("nz")),
            ) {
                point.normal = Some(Vector3::new(nx, ny, nz));
            }

            cloud.push(point);
        }
    }

    Ok(cloud)
}

/// Coerce a numeric PLY property to f64.
fn ply_float(prop: Option<&Property>) -> Option<f64> {
    match prop {
        Some(Property::Float(v)) => Some(*v as f64),
        Some(Property::Double(v)) => Some(*v),
        Some(Property::Int(v)) => Some(*v as f64),
        Some(Property::UInt(v)) => Some(*v as f64),
        Some(Property::Short(v)) => Some(*v as f64),
        Some(Property::UShort(v)) => Some(*v as f64),
        Some(Property::Char(v)) => Some(*v as f64),
        Some(Property::UChar(v)) => Some(*v as f64),
        _ => None,
    }
}

fn save_ply(cloud: &PointCloud, path: &Path) -> ReconResult<()> {
    let file = File::create(path).map_err(|e| ReconError::io_write(path, e))?;
    let mut writer = BufWriter::new(file);

    write_ply(cloud, &mut writer).map_err(|e| ReconError::io_write(path, e))
}

fn write_ply(cloud: &PointCloud, writer: &mut impl Write) -> std::io::Result<()> {
    let has_normals = cloud.has_normals();

    writeln!(writer, "ply")?;
    writeln!(writer, "format ascii 1.0")?;
    writeln!(writer, "element vertex {}", cloud.len())?;
    writeln!(writer, "property float x")?;
    writeln!(writer, "property float y")?;
    writeln!(writer, "property float z")?;
    if has_normals {
        writeln!(writer, "property float nx")?;
        writeln!(writer, "property float ny")?;
        writeln!(writer, "property float nz")?;
    }
    writeln!(writer, "end_header")?;

    for point in &cloud.points {
        let p = &point.position;
        if has_normals {
            let n = point.normal.unwrap_or_default();
            writeln!(writer, "{} {} {} {} {} {}", p.x, p.y, p.z, n.x, n.y, n.z)?;
        } else {
            writeln!(writer, "{} {} {}", p.x, p.y, p.z)?;
        }
    }

    Ok(())
}

fn load_xyz(path: &Path) -> ReconResult<PointCloud> {
    let file = File::open(path).map_err(|e| ReconError::io_read(path, e))?;
    let reader = BufReader::new(file);

    let mut cloud = PointCloud::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| ReconError::io_read(path, e))?;

        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 3 {
            warn!("Skipping invalid line {} in XYZ file", line_num + 1);
            continue;
        }

        let coord = |idx: usize, axis: &str| -> ReconResult<f64> {
            parts[idx].parse().map_err(|_| {
                ReconError::parse_error(
                    path,
                    format!("invalid {} coordinate on line {}", axis, line_num + 1),
                )
            })
        };

        let mut point = CloudPoint::from_coords(coord(0, "x")?, coord(1, "y")?, coord(2, "z")?);

        // Six or more values: x y z nx ny nz.
        if parts.len() >= 6 {
            if let (Ok(nx), Ok(ny), Ok(nz)) = (
                parts[3].parse::<f64>(),
                parts[4].parse::<f64>(),
                parts[5].parse::<f64>(),
            ) {
                point.normal = Some(Vector3::new(nx, ny, nz));
            }
        }

        cloud.push(point);
    }

    Ok(cloud)
}

fn save_xyz(cloud: &PointCloud, path: &Path) -> ReconResult<()> {
    let file = File::create(path).map_err(|e| ReconError::io_write(path, e))?;
    let mut writer = BufWriter::new(file);

    for point in &cloud.points {
        let p = &point.position;
        let result = match &point.normal {
            Some(n) => writeln!(writer, "{} {} {} {} {} {}", p.x, p.y, p.z, n.x, n.y, n.z),
            None => writeln!(writer, "{} {} {}", p.x, p.y, p.z),
        };
        result.map_err(|e| ReconError::io_write(path, e))?;
    }

    Ok(())
}
