//! The four-stage reconstruction pipeline.
//!
//! `reconstruct_field` runs, in order: neighbor-graph construction, local
//! plane estimation, orientation propagation, and distance sampling. Each
//! stage's output is a strict precondition of the next, so the stages run
//! sequentially to completion, or the whole operation aborts at the first
//! error with no output. No state survives a run except the returned field.

use tracing::info;

use crate::cloud::PointCloud;
use crate::error::{ReconError, ReconResult};
use crate::graph::build_graph_with_progress;
use crate::grid::DistanceField;
use crate::normals::estimate_normals_with_progress;
use crate::orient::propagate_orientation_with_progress;
use crate::progress::ProgressCallback;
use crate::sample::sample_field_with_progress;
use crate::tracing_ext::OperationTimer;

/// Parameters for signed-distance-field reconstruction.
#[derive(Debug, Clone)]
pub struct ReconstructionParams {
    /// Number of nearest neighbors per point in the neighbor graph.
    /// Must be greater than zero.
    pub neighborhood_size: usize,

    /// Lattice node spacing. `None` (or a non-positive value) requests
    /// automatic estimation from the cloud's bounding box.
    pub sample_spacing: Option<f64>,
}

impl Default for ReconstructionParams {
    fn default() -> Self {
        Self {
            neighborhood_size: 20,
            sample_spacing: None,
        }
    }
}

impl ReconstructionParams {
    /// Create params with a specific neighborhood size.
    pub fn with_neighborhood_size(neighborhood_size: usize) -> Self {
        Self {
            neighborhood_size,
            ..Default::default()
        }
    }

    /// Create params with a specific sample spacing.
    pub fn with_sample_spacing(sample_spacing: f64) -> Self {
        Self {
            sample_spacing: Some(sample_spacing),
            ..Default::default()
        }
    }

    /// Set the sample spacing, keeping other fields.
    pub fn sample_spacing(mut self, sample_spacing: f64) -> Self {
        self.sample_spacing = Some(sample_spacing);
        self
    }
}

/// Result of a reconstruction run.
#[derive(Debug)]
pub struct ReconstructionResult {
    /// The sampled signed-distance field.
    pub field: DistanceField,

    /// Number of input points.
    pub point_count: usize,

    /// Points reached by orientation propagation. Less than `point_count`
    /// means the neighbor graph was disconnected and the unreached points
    /// kept arbitrary normal signs.
    pub visited_points: usize,

    /// Effective lattice spacing.
    pub sample_spacing: f64,

    /// Whether the spacing was estimated rather than supplied.
    pub spacing_estimated: bool,
}

/// Reconstruct a signed-distance field from an unorganized point cloud.
///
/// The zero level set of the returned field approximates the surface the
/// points were sampled from; thresholding it at 0.0 with any isosurface
/// extractor recovers a mesh.
///
/// # Errors
/// - [`ReconError::EmptyCloud`] for a cloud with no points.
/// - [`ReconError::InvalidParameter`] for a zero neighborhood size.
/// - [`ReconError::InternalConsistency`] if a pipeline invariant breaks
///   (a bug, not an input problem).
///
/// # Example
///
/// ```
/// use cloud_recon::{PointCloud, ReconstructionParams, reconstruct_field};
///
/// let mut cloud = PointCloud::new();
/// cloud.push_coords(0.0, 0.0, 0.0);
/// cloud.push_coords(1.0, 0.0, 0.0);
/// cloud.push_coords(0.0, 1.0, 0.0);
/// cloud.push_coords(1.0, 1.0, 0.0);
///
/// let params = ReconstructionParams::with_neighborhood_size(3).sample_spacing(0.25);
/// let result = reconstruct_field(&cloud, &params).unwrap();
/// assert_eq!(result.visited_points, 4);
/// ```
pub fn reconstruct_field(
    cloud: &PointCloud,
    params: &ReconstructionParams,
) -> ReconResult<ReconstructionResult> {
    reconstruct_field_with_progress(cloud, params, None)
}

/// [`reconstruct_field`] with progress reporting and cancellation.
///
/// The callback is polled once per outer-loop iteration of every stage;
/// returning `false` aborts the run with [`ReconError::Cancelled`].
pub fn reconstruct_field_with_progress(
    cloud: &PointCloud,
    params: &ReconstructionParams,
    callback: Option<&ProgressCallback>,
) -> ReconResult<ReconstructionResult> {
    let _timer = OperationTimer::with_context("reconstruct_field", cloud.len());

    let mut graph = build_graph_with_progress(cloud, params.neighborhood_size, callback)?;
    estimate_normals_with_progress(&mut graph, callback)?;
    let visited_points = propagate_orientation_with_progress(&mut graph, callback)?;
    let (field, spacing_estimated) =
        sample_field_with_progress(&graph, params.sample_spacing, callback)?;

    info!(
        points = cloud.len(),
        visited = visited_points,
        nodes = field.node_count(),
        spacing = field.spacing,
        "Reconstruction complete"
    );

    Ok(ReconstructionResult {
        point_count: cloud.len(),
        visited_points,
        sample_spacing: field.spacing,
        spacing_estimated,
        field,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = ReconstructionParams::default();
        assert_eq!(params.neighborhood_size, 20);
        assert!(params.sample_spacing.is_none());
    }

    #[test]
    fn test_empty_cloud_aborts() {
        let cloud = PointCloud::new();
        let err = reconstruct_field(&cloud, &ReconstructionParams::default()).unwrap_err();
        assert!(matches!(err, ReconError::EmptyCloud { .. }));
    }

    #[test]
    fn test_zero_neighborhood_aborts() {
        let mut cloud = PointCloud::new();
        cloud.push_coords(0.0, 0.0, 0.0);
        let err =
            reconstruct_field(&cloud, &ReconstructionParams::with_neighborhood_size(0)).unwrap_err();
        assert!(matches!(err, ReconError::InvalidParameter { .. }));
    }

    #[test]
    fn test_result_statistics() {
        let mut cloud = PointCloud::new();
        cloud.push_coords(0.0, 0.0, 0.0);
        cloud.push_coords(1.0, 0.0, 0.0);
        cloud.push_coords(0.0, 1.0, 0.0);
        cloud.push_coords(1.0, 1.0, 0.0);

        let params = ReconstructionParams::with_neighborhood_size(3).sample_spacing(0.5);
        let result = reconstruct_field(&cloud, &params).expect("quad reconstructs");

        assert_eq!(result.point_count, 4);
        assert_eq!(result.visited_points, 4);
        assert!(!result.spacing_estimated);
        assert!((result.sample_spacing - 0.5).abs() < 1e-12);
        assert_eq!(result.field.node_count(), result.field.values.len());
    }
}
