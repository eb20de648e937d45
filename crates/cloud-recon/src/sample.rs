//! Dense signed-distance sampling over the oriented point set.
//!
//! The final stage lays a regular lattice over the cloud's bounding volume
//! (expanded by two spacings per side) and stores, at every node, the signed
//! distance to the tangent plane of the nearest oriented point:
//! `dot(node − q.position, q.normal)`.
//!
//! This is normally the most expensive stage (the node count is the product
//! of three lattice dimensions and can dwarf the input size), so the
//! cancellation callback is polled once per z-slab.

use kiddo::{KdTree, SquaredEuclidean};
use nalgebra::Point3;
use tracing::{debug, info};

use crate::error::{ReconError, ReconResult};
use crate::graph::NeighborGraph;
use crate::grid::DistanceField;
use crate::progress::{ProgressCallback, ProgressTracker};

/// The bounding box is widened by this many spacings on every side.
const MARGIN_SPACINGS: f64 = 2.0;

/// Sample the signed-distance field of an oriented graph.
///
/// `sample_spacing` of `None` (or a non-positive value) requests automatic
/// estimation: the cube root of bounding-box volume over point count.
/// Returns the field together with a flag saying whether the spacing was
/// estimated.
pub fn sample_field(
    graph: &NeighborGraph,
    sample_spacing: Option<f64>,
) -> ReconResult<(DistanceField, bool)> {
    sample_field_with_progress(graph, sample_spacing, None)
}

/// [`sample_field`] with cancellation support, polled once per z-slab.
pub fn sample_field_with_progress(
    graph: &NeighborGraph,
    sample_spacing: Option<f64>,
    callback: Option<&ProgressCallback>,
) -> ReconResult<(DistanceField, bool)> {
    let n = graph.point_count();
    if n == 0 {
        return Err(ReconError::empty_cloud(
            "cannot sample a distance field over zero points",
        ));
    }

    let (min, max) = point_bounds(graph);
    let extent = max - min;

    let (spacing, estimated) = match sample_spacing {
        Some(s) if s > 0.0 => (s, false),
        _ => (estimate_spacing(extent.x * extent.y * extent.z, n), true),
    };

    // Two-spacing margin on every side.
    let margin = MARGIN_SPACINGS * spacing;
    let origin = Point3::new(min.x - margin, min.y - margin, min.z - margin);
    let top = Point3::new(max.x + margin, max.y + margin, max.z + margin);

    let dims = [
        ((top.x - origin.x) / spacing).floor() as usize,
        ((top.y - origin.y) / spacing).floor() as usize,
        ((top.z - origin.z) / spacing).floor() as usize,
    ];

    info!(
        points = n,
        spacing,
        estimated,
        dims = ?dims,
        "Sampling signed distance field"
    );

    let mut tree: KdTree<f64, 3> = KdTree::new();
    for (i, point) in graph.points.iter().enumerate() {
        tree.add(
            &[point.position.x, point.position.y, point.position.z],
            i as u64,
        );
    }

    let mut field = DistanceField::new(origin, spacing, dims);

    let tracker = ProgressTracker::new(dims[2] as u64);
    for z in 0..dims[2] {
        if !tracker.poll(callback, "sampling distance field") {
            return Err(ReconError::cancelled("distance sampling"));
        }

        for y in 0..dims[1] {
            for x in 0..dims[0] {
                let node = field.node_position(x, y, z);

                let nearest = tree
                    .nearest_n::<SquaredEuclidean>(&[node.x, node.y, node.z], 1)
                    .into_iter()
                    .next()
                    .ok_or_else(|| {
                        ReconError::internal(
                            "distance sampling",
                            format!("no nearest point for lattice node ({x}, {y}, {z})"),
                        )
                    })?;

                let record = &graph.points[nearest.item as usize];
                let idx = field.linearize(x, y, z);
                field.values[idx] = (node - record.position).dot(&record.normal);
            }
        }

        tracker.increment();
    }

    debug!(nodes = field.node_count(), "Distance field complete");
    Ok((field, estimated))
}

/// Cube root of bounding-box volume over point count.
///
/// A degenerate bounding box (single point, coincident points, or a flat
/// cloud) yields zero volume; fall back to unit spacing so the lattice stays
/// computable. Callers wanting a specific lattice pass the spacing
/// explicitly.
fn estimate_spacing(bbox_volume: f64, point_count: usize) -> f64 {
    let spacing = (bbox_volume / point_count as f64).cbrt();
    if spacing.is_finite() && spacing > 0.0 {
        spacing
    } else {
        1.0
    }
}

fn point_bounds(graph: &NeighborGraph) -> (Point3<f64>, Point3<f64>) {
    let mut min = graph.points[0].position;
    let mut max = min;
    for record in &graph.points[1..] {
        let p = record.position;
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        min.z = min.z.min(p.z);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
        max.z = max.z.max(p.z);
    }
    (min, max)
}
