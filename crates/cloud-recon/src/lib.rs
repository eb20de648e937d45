//! Signed-distance-field reconstruction from unorganized point clouds.
//!
//! This crate turns a bag of 3D sample positions (a scanner or LiDAR
//! export with no connectivity) into a volumetric signed-distance field
//! whose zero level set approximates the sampled surface. Feeding the field
//! to any isosurface extractor (thresholded at 0.0) recovers a mesh; that
//! downstream step is deliberately out of scope here.
//!
//! # Pipeline
//!
//! Four stages run strictly in sequence:
//!
//! 1. **Neighbor graph** ([`build_graph`]): a symmetric K-nearest-neighbor
//!    adjacency over the input points, backed by a k-d tree.
//! 2. **Plane estimation** ([`estimate_normals`]): a PCA normal per point
//!    from its local neighborhood; signs still arbitrary.
//! 3. **Orientation propagation** ([`propagate_orientation`]): a greedy,
//!    cost-weighted walk over the graph flips normals into global agreement.
//! 4. **Distance sampling** ([`sample_field`]): a regular lattice over the
//!    expanded bounding volume, one signed distance per node.
//!
//! # Quick Start
//!
//! ```
//! use cloud_recon::{PointCloud, ReconstructionParams};
//!
//! let mut cloud = PointCloud::new();
//! cloud.push_coords(0.0, 0.0, 0.0);
//! cloud.push_coords(1.0, 0.0, 0.0);
//! cloud.push_coords(0.0, 1.0, 0.0);
//! cloud.push_coords(1.0, 1.0, 0.0);
//!
//! let params = ReconstructionParams::with_neighborhood_size(3).sample_spacing(0.25);
//! let result = cloud.to_distance_field(&params).unwrap();
//! println!("{} lattice nodes", result.field.node_count());
//! ```
//!
//! # Limitations
//!
//! The algorithm is faithful to its classic form and inherits its known
//! gaps: no outlier rejection, no handling of ill-conditioned local
//! neighborhoods, and no detection of disconnected neighbor graphs (points
//! unreachable from the propagation seed keep arbitrary normal signs). The
//! field is not guaranteed watertight for sparse or disconnected samples.
//!
//! # Error Handling
//!
//! Operations return [`ReconResult`], which is `Result<T, ReconError>`.
//! Input problems (empty cloud, zero neighborhood size) abort before any
//! work; violated pipeline invariants abort the whole run rather than emit
//! a possibly-wrong field.

mod cloud;
mod error;
mod grid;
mod reconstruct;

pub mod graph;
pub mod io;
pub mod normals;
pub mod orient;
pub mod progress;
pub mod sample;
pub mod tracing_ext;

// Re-export core types at crate root
pub use cloud::{CloudPoint, PointCloud};
pub use error::{ErrorCode, ReconError, ReconResult};
pub use grid::DistanceField;
pub use reconstruct::{
    ReconstructionParams, ReconstructionResult, reconstruct_field,
    reconstruct_field_with_progress,
};

// Re-export the individual stages for callers that want partial runs
pub use graph::{NeighborGraph, build_graph};
pub use normals::estimate_normals;
pub use orient::propagate_orientation;
pub use sample::sample_field;

pub use progress::{Progress, ProgressCallback, ProgressTracker};

// Convenience methods on PointCloud
impl PointCloud {
    /// Load a point cloud from a file, auto-detecting format from extension.
    pub fn load(path: impl AsRef<std::path::Path>) -> ReconResult<Self> {
        io::load_cloud(path.as_ref())
    }

    /// Save the point cloud to a file, auto-detecting format from extension.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> ReconResult<()> {
        io::save_cloud(self, path.as_ref())
    }

    /// Return a copy of this cloud with estimated, consistently oriented
    /// normals.
    ///
    /// Runs the first three pipeline stages (graph, PCA, orientation) and
    /// writes the resulting normals back onto the points.
    pub fn with_estimated_normals(&self, neighborhood_size: usize) -> ReconResult<Self> {
        let mut graph = graph::build_graph(self, neighborhood_size)?;
        normals::estimate_normals(&mut graph)?;
        orient::propagate_orientation(&mut graph)?;

        let mut result = self.clone();
        for (i, point) in result.points.iter_mut().enumerate() {
            point.normal = Some(graph.normal(i));
        }
        Ok(result)
    }

    /// Reconstruct the signed-distance field of this cloud.
    ///
    /// Shorthand for [`reconstruct_field`].
    pub fn to_distance_field(
        &self,
        params: &ReconstructionParams,
    ) -> ReconResult<ReconstructionResult> {
        reconstruct_field(self, params)
    }
}
