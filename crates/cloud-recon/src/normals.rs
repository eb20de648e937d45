//! Local tangent-plane estimation via principal component analysis.
//!
//! For each point the covariance of its neighborhood (the point itself plus
//! its graph neighbors) is eigendecomposed; the least-variance eigenvector is
//! taken as the plane normal. The sign of the normal is arbitrary at this
//! stage and is resolved later by orientation propagation.
//!
//! Near-collinear or otherwise degenerate neighborhoods are not detected;
//! such points receive whatever least-variance direction the eigensolver
//! produces.

use nalgebra::{Matrix3, Vector3};
use tracing::info;

use crate::error::{ReconError, ReconResult};
use crate::graph::NeighborGraph;
use crate::progress::{ProgressCallback, ProgressTracker};

/// Estimate a unit normal for every point in the graph.
///
/// Normals are unit length by construction (symmetric eigendecomposition
/// yields orthonormal eigenvectors); their signs are unresolved.
pub fn estimate_normals(graph: &mut NeighborGraph) -> ReconResult<()> {
    estimate_normals_with_progress(graph, None)
}

/// [`estimate_normals`] with cancellation support, polled once per point.
pub fn estimate_normals_with_progress(
    graph: &mut NeighborGraph,
    callback: Option<&ProgressCallback>,
) -> ReconResult<()> {
    let n = graph.point_count();
    info!(points = n, "Estimating surface normals");

    let tracker = ProgressTracker::new(n as u64);
    for i in 0..n {
        if !tracker.poll(callback, "estimating normals") {
            return Err(ReconError::cancelled("normal estimation"));
        }

        graph.points[i].normal = plane_normal(graph, i);
        tracker.increment();
    }

    Ok(())
}

/// Least-variance direction of {i} ∪ neighbors(i).
fn plane_normal(graph: &NeighborGraph, i: usize) -> Vector3<f64> {
    let record = &graph.points[i];
    let count = (record.neighbors.len() + 1) as f64;

    // Centroid over the point and its neighbors.
    let mut centroid = record.position.coords;
    for &j in &record.neighbors {
        centroid += graph.points[j as usize].position.coords;
    }
    centroid /= count;

    // Covariance as the mean outer product about the centroid. Stack
    // allocated and discarded after the decomposition.
    let mut covariance = Matrix3::zeros();
    let d = record.position.coords - centroid;
    covariance += d * d.transpose();
    for &j in &record.neighbors {
        let d = graph.points[j as usize].position.coords - centroid;
        covariance += d * d.transpose();
    }
    covariance /= count;

    let eigen = covariance.symmetric_eigen();
    let mut min_idx = 0;
    let mut min_val = eigen.eigenvalues[0];
    for k in 1..3 {
        if eigen.eigenvalues[k] < min_val {
            min_val = eigen.eigenvalues[k];
            min_idx = k;
        }
    }

    eigen.eigenvectors.column(min_idx).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::PointCloud;
    use crate::graph::build_graph;

    #[test]
    fn test_coplanar_points_get_plane_normal() {
        let mut cloud = PointCloud::new();
        cloud.push_coords(0.0, 0.0, 0.0);
        cloud.push_coords(1.0, 0.0, 0.0);
        cloud.push_coords(0.0, 1.0, 0.0);
        cloud.push_coords(1.0, 1.0, 0.0);

        let mut graph = build_graph(&cloud, 3).expect("quad");
        estimate_normals(&mut graph).expect("normals");

        for i in 0..4 {
            let n = graph.normal(i);
            assert!(
                (n.norm() - 1.0).abs() < 1e-12,
                "normal {} not unit length: {}",
                i,
                n.norm()
            );
            assert!(
                (n.z.abs() - 1.0).abs() < 1e-9,
                "normal {} should be ±z for a z=0 plane, got {:?}",
                i,
                n
            );
        }
    }

    #[test]
    fn test_tilted_plane_normal() {
        // Points on the plane x + z = 0; expected normal ±(1,0,1)/√2.
        let mut cloud = PointCloud::new();
        for ix in 0..4 {
            for iy in 0..4 {
                let x = ix as f64;
                cloud.push_coords(x, iy as f64, -x);
            }
        }

        let mut graph = build_graph(&cloud, 8).expect("grid");
        estimate_normals(&mut graph).expect("normals");

        let expected = Vector3::new(1.0, 0.0, 1.0).normalize();
        for i in 0..graph.point_count() {
            let n = graph.normal(i);
            assert!(
                (n.dot(&expected).abs() - 1.0).abs() < 1e-9,
                "normal {} off plane: {:?}",
                i,
                n
            );
        }
    }

    #[test]
    fn test_single_point_normal_is_unit() {
        // Zero covariance; whatever direction comes out must still be unit.
        let mut cloud = PointCloud::new();
        cloud.push_coords(5.0, 5.0, 5.0);

        let mut graph = build_graph(&cloud, 20).expect("single point");
        estimate_normals(&mut graph).expect("normals");

        assert!((graph.normal(0).norm() - 1.0).abs() < 1e-12);
    }
}
