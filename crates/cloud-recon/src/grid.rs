//! The output lattice: a regular grid of signed-distance values.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;
use tracing::info;

use crate::error::{ReconError, ReconResult};

/// A regular 3D lattice of signed-distance values.
///
/// The origin is the minimum corner of the sampled volume (the input
/// bounding box expanded by two spacings per side), spacing is isotropic,
/// and `values` holds one `f64` per lattice node in x-fastest row-major
/// order: index = `x + y·dims[0] + z·dims[0]·dims[1]`.
///
/// Node positions sit on the lattice itself: node (x, y, z) is at
/// `origin + (x, y, z) · spacing`.
#[derive(Debug, Clone)]
pub struct DistanceField {
    /// Minimum corner of the sampled volume.
    pub origin: Point3<f64>,

    /// Isotropic node spacing, replicated across the three axes.
    pub spacing: f64,

    /// Node counts per axis [x, y, z].
    pub dims: [usize; 3],

    /// Signed distances, x-fastest row-major, one per node.
    pub values: Vec<f64>,
}

impl DistanceField {
    /// Create a zero-filled field.
    pub(crate) fn new(origin: Point3<f64>, spacing: f64, dims: [usize; 3]) -> Self {
        let total = dims[0] * dims[1] * dims[2];
        Self {
            origin,
            spacing,
            dims,
            values: vec![0.0; total],
        }
    }

    /// Total number of lattice nodes.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.dims[0] * self.dims[1] * self.dims[2]
    }

    /// Convert 3D node coordinates to a linear index.
    #[inline]
    pub fn linearize(&self, x: usize, y: usize, z: usize) -> usize {
        x + y * self.dims[0] + z * self.dims[0] * self.dims[1]
    }

    /// Convert a linear index back to 3D node coordinates.
    #[inline]
    pub fn delinearize(&self, idx: usize) -> [usize; 3] {
        let z = idx / (self.dims[0] * self.dims[1]);
        let rem = idx % (self.dims[0] * self.dims[1]);
        let y = rem / self.dims[0];
        let x = rem % self.dims[0];
        [x, y, z]
    }

    /// World position of a lattice node.
    #[inline]
    pub fn node_position(&self, x: usize, y: usize, z: usize) -> Point3<f64> {
        Point3::new(
            self.origin.x + x as f64 * self.spacing,
            self.origin.y + y as f64 * self.spacing,
            self.origin.z + z as f64 * self.spacing,
        )
    }

    /// Signed distance stored at a lattice node.
    #[inline]
    pub fn value_at(&self, x: usize, y: usize, z: usize) -> f64 {
        self.values[self.linearize(x, y, z)]
    }

    /// Save the field as a legacy ASCII VTK STRUCTURED_POINTS file.
    ///
    /// The exported grid can be fed straight into any isosurface tool that
    /// reads legacy VTK; thresholding at 0.0 recovers the surface.
    pub fn save_vtk(&self, path: impl AsRef<Path>) -> ReconResult<()> {
        let path = path.as_ref();
        info!(path = ?path, dims = ?self.dims, "Saving distance field");

        let file = File::create(path).map_err(|e| ReconError::io_write(path, e))?;
        let mut writer = BufWriter::new(file);
        self.write_vtk(&mut writer)
            .map_err(|e| ReconError::io_write(path, e))
    }

    fn write_vtk(&self, writer: &mut impl Write) -> std::io::Result<()> {
        writeln!(writer, "# vtk DataFile Version 3.0")?;
        writeln!(writer, "signed distance field")?;
        writeln!(writer, "ASCII")?;
        writeln!(writer, "DATASET STRUCTURED_POINTS")?;
        writeln!(
            writer,
            "DIMENSIONS {} {} {}",
            self.dims[0], self.dims[1], self.dims[2]
        )?;
        writeln!(
            writer,
            "ORIGIN {} {} {}",
            self.origin.x, self.origin.y, self.origin.z
        )?;
        writeln!(
            writer,
            "SPACING {} {} {}",
            self.spacing, self.spacing, self.spacing
        )?;
        writeln!(writer, "POINT_DATA {}", self.node_count())?;
        writeln!(writer, "SCALARS signed_distance double 1")?;
        writeln!(writer, "LOOKUP_TABLE default")?;

        // Legacy VTK expects x-fastest order, which is exactly how the
        // values are stored.
        for value in &self.values {
            writeln!(writer, "{}", value)?;
        }

        Ok(())
    }
}
