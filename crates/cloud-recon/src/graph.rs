//! Neighbor graph construction over the input points.
//!
//! The graph is the working set for the whole pipeline: one [`SurfacePoint`]
//! record per input point, addressed by index, holding the point's neighbor
//! list, its (eventually oriented) normal, and per-neighbor edge costs.
//!
//! Adjacency is symmetric by construction: whenever point i's K-nearest
//! query returns j, the directed edges i→j and j→i are both inserted,
//! whether or not j's own query would have returned i.

use kiddo::{KdTree, SquaredEuclidean};
use nalgebra::{Point3, Vector3};
use tracing::{debug, info};

use crate::cloud::PointCloud;
use crate::error::{ReconError, ReconResult};
use crate::progress::{ProgressCallback, ProgressTracker};

/// Per-point working record, owned by one reconstruction run.
#[derive(Debug, Clone)]
pub(crate) struct SurfacePoint {
    /// Copy of the input position.
    pub position: Point3<f64>,

    /// Indices of neighboring points. Symmetric: `j ∈ neighbors(i)` iff
    /// `i ∈ neighbors(j)`.
    pub neighbors: Vec<u32>,

    /// Edge cost cache, parallel to `neighbors`. Filled by the orientation
    /// stage; `1 − |dot(n_i, n_j)|` per edge.
    pub costs: Vec<f64>,

    /// Estimated unit normal. Sign is arbitrary until orientation runs.
    pub normal: Vector3<f64>,

    /// Set once by the orientation walk.
    pub visited: bool,
}

/// Symmetric K-nearest-neighbor graph over a point cloud.
///
/// Built by [`build_graph`]; consumed by the normal-estimation, orientation,
/// and distance-sampling stages. All records are created fresh for one
/// reconstruction run and discarded with the graph.
#[derive(Debug)]
pub struct NeighborGraph {
    pub(crate) points: Vec<SurfacePoint>,
}

impl NeighborGraph {
    /// Number of points in the graph.
    #[inline]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Position of the point at `index`.
    #[inline]
    pub fn position(&self, index: usize) -> Point3<f64> {
        self.points[index].position
    }

    /// Neighbor indices of the point at `index`.
    #[inline]
    pub fn neighbors(&self, index: usize) -> &[u32] {
        &self.points[index].neighbors
    }

    /// Normal of the point at `index`. Zero until normal estimation runs.
    #[inline]
    pub fn normal(&self, index: usize) -> Vector3<f64> {
        self.points[index].normal
    }

    /// Whether the orientation walk reached the point at `index`.
    #[inline]
    pub fn is_visited(&self, index: usize) -> bool {
        self.points[index].visited
    }
}

/// Insert `neighbor` into `point`'s neighbor list unless already present.
fn add_neighbor(points: &mut [SurfacePoint], point: u32, neighbor: u32) {
    let list = &mut points[point as usize].neighbors;
    if !list.contains(&neighbor) {
        list.push(neighbor);
    }
}

/// Build the symmetric K-nearest-neighbor graph over `cloud`.
///
/// `neighborhood_size` is the number of true neighbors per query (the point
/// itself is excluded from its own results) and must be greater than zero.
///
/// # Errors
/// - [`ReconError::EmptyCloud`] if the cloud has no points.
/// - [`ReconError::InvalidParameter`] if `neighborhood_size` is zero.
pub fn build_graph(cloud: &PointCloud, neighborhood_size: usize) -> ReconResult<NeighborGraph> {
    build_graph_with_progress(cloud, neighborhood_size, None)
}

/// [`build_graph`] with cancellation support.
///
/// The callback is polled once per input point; returning `false` aborts
/// with [`ReconError::Cancelled`].
pub fn build_graph_with_progress(
    cloud: &PointCloud,
    neighborhood_size: usize,
    callback: Option<&ProgressCallback>,
) -> ReconResult<NeighborGraph> {
    if cloud.is_empty() {
        return Err(ReconError::empty_cloud(
            "cannot build a neighbor graph over zero points",
        ));
    }
    if neighborhood_size == 0 {
        return Err(ReconError::invalid_parameter(
            "neighborhood_size",
            "must be greater than zero",
        ));
    }

    let n = cloud.len();
    info!(points = n, k = neighborhood_size, "Building neighbor graph");

    let mut tree: KdTree<f64, 3> = KdTree::new();
    for (i, point) in cloud.points.iter().enumerate() {
        tree.add(
            &[point.position.x, point.position.y, point.position.z],
            i as u64,
        );
    }

    let mut points: Vec<SurfacePoint> = cloud
        .points
        .iter()
        .map(|p| SurfacePoint {
            position: p.position,
            neighbors: Vec::with_capacity(neighborhood_size),
            costs: Vec::new(),
            normal: Vector3::zeros(),
            visited: false,
        })
        .collect();

    let tracker = ProgressTracker::new(n as u64);
    for i in 0..n {
        if !tracker.poll(callback, "building neighbor graph") {
            return Err(ReconError::cancelled("neighbor graph"));
        }

        let p = points[i].position;
        // The query point sits in the tree, so ask for one extra result and
        // skip it below.
        let nearest = tree.nearest_n::<SquaredEuclidean>(&[p.x, p.y, p.z], neighborhood_size + 1);

        for found in &nearest {
            let j = found.item as u32;
            if j as usize == i {
                continue;
            }
            add_neighbor(&mut points, i as u32, j);
            add_neighbor(&mut points, j, i as u32);
        }

        tracker.increment();
    }

    let edge_refs: usize = points.iter().map(|p| p.neighbors.len()).sum();
    debug!(
        points = n,
        edge_refs,
        "Neighbor graph complete (directed references, both ways counted)"
    );

    Ok(NeighborGraph { points })
}
