//! Orientation propagation: making all normal signs agree.
//!
//! PCA leaves each normal with an arbitrary sign. This stage walks the
//! neighbor graph greedily from point 0, always consuming the globally
//! cheapest edge between the frontier and the visited set, flipping the
//! frontier point's normal whenever it disagrees with its visited neighbor.
//!
//! An edge's cost is `1 − |dot(n_i, n_j)|`: parallel normals cost 0 and are
//! maximally trustworthy, orthogonal normals cost 1. There is deliberately no
//! priority queue here; each round performs a linear scan over the frontier.
//! A heap would change which of several near-equal-cost candidates wins and
//! therefore the output on graphs with ties. The scan order is part of the
//! algorithm's observable behavior.
//!
//! Points unreachable from point 0 (a disconnected neighbor graph) are never
//! visited and keep their arbitrary sign. The walk logs how many were left
//! behind but does not treat this as an error.

use hashbrown::HashSet;
use tracing::{debug, info, warn};

use crate::error::{ReconError, ReconResult};
use crate::graph::NeighborGraph;
use crate::progress::{ProgressCallback, ProgressTracker};

/// A per-point neighbor scan may stop early once it finds an edge at least
/// this trustworthy. Local shortcut only; the global minimum over the
/// frontier is still taken.
const EARLY_EXIT_COST: f64 = 0.1;

/// Propagate a consistent sign to every normal reachable from point 0.
///
/// Returns the number of points visited (including the start point). A value
/// below [`NeighborGraph::point_count`] means the graph was disconnected and
/// the remainder kept their unresolved signs.
///
/// # Errors
/// [`ReconError::InternalConsistency`] if the walk ever selects a point as
/// its own visited neighbor. That state is unreachable given a well-formed
/// graph, so its occurrence signals a bug rather than bad input.
pub fn propagate_orientation(graph: &mut NeighborGraph) -> ReconResult<usize> {
    propagate_orientation_with_progress(graph, None)
}

/// [`propagate_orientation`] with cancellation support, polled once per
/// propagation round.
pub fn propagate_orientation_with_progress(
    graph: &mut NeighborGraph,
    callback: Option<&ProgressCallback>,
) -> ReconResult<usize> {
    let n = graph.point_count();
    info!(points = n, "Propagating normal orientation");

    cache_edge_costs(graph);

    // Seed: point 0 keeps its sign as-is.
    graph.points[0].visited = true;
    let mut visited_count = 1usize;

    let mut frontier: Vec<u32> = Vec::new();
    let mut in_frontier: HashSet<u32> = HashSet::new();
    enqueue_unvisited_neighbors(graph, 0, &mut frontier, &mut in_frontier);

    let tracker = ProgressTracker::new(n as u64);
    tracker.increment();

    while !frontier.is_empty() {
        if !tracker.poll(callback, "propagating orientation") {
            return Err(ReconError::cancelled("orientation propagation"));
        }

        let (frontier_pos, point, anchor) = cheapest_frontier_edge(graph, &frontier)?;

        if point == anchor {
            return Err(ReconError::internal(
                "orientation propagation",
                format!("point {} selected itself as its visited neighbor", point),
            ));
        }

        // Flip the frontier normal if it disagrees with the visited anchor.
        let anchor_normal = graph.points[anchor as usize].normal;
        let record = &mut graph.points[point as usize];
        if record.normal.dot(&anchor_normal) < 0.0 {
            record.normal = -record.normal;
        }
        record.visited = true;
        visited_count += 1;

        // Preserve scan order for the remaining frontier entries.
        frontier.remove(frontier_pos);
        in_frontier.remove(&point);
        enqueue_unvisited_neighbors(graph, point as usize, &mut frontier, &mut in_frontier);

        tracker.increment();
    }

    if visited_count < n {
        warn!(
            unvisited = n - visited_count,
            "Neighbor graph is disconnected; unreachable points keep arbitrary normal signs"
        );
    } else {
        debug!(visited = visited_count, "Orientation propagation complete");
    }

    Ok(visited_count)
}

/// Fill each record's cost cache: `1 − |dot(n_i, n_j)|` per neighbor.
///
/// The cost is invariant under sign flips on either end, so caching before
/// the walk is safe.
fn cache_edge_costs(graph: &mut NeighborGraph) {
    for i in 0..graph.point_count() {
        let normal = graph.points[i].normal;
        let costs: Vec<f64> = graph.points[i]
            .neighbors
            .iter()
            .map(|&j| 1.0 - normal.dot(&graph.points[j as usize].normal).abs())
            .collect();
        graph.points[i].costs = costs;
    }
}

/// Scan the whole frontier for the globally cheapest edge into the visited
/// set. Returns (position in frontier, frontier point, visited anchor).
fn cheapest_frontier_edge(
    graph: &NeighborGraph,
    frontier: &[u32],
) -> ReconResult<(usize, u32, u32)> {
    let mut best: Option<(usize, u32, u32, f64)> = None;

    for (pos, &candidate) in frontier.iter().enumerate() {
        let record = &graph.points[candidate as usize];

        // Cheapest edge from this candidate to an already-visited point,
        // stopping early once a sufficiently cheap edge appears.
        let mut local: Option<(u32, f64)> = None;
        for (slot, &neighbor) in record.neighbors.iter().enumerate() {
            if !graph.points[neighbor as usize].visited {
                continue;
            }
            let cost = record.costs[slot];
            if local.is_none_or(|(_, c)| cost < c) {
                local = Some((neighbor, cost));
            }
            if cost < EARLY_EXIT_COST {
                break;
            }
        }

        if let Some((anchor, cost)) = local {
            if best.is_none_or(|(_, _, _, c)| cost < c) {
                best = Some((pos, candidate, anchor, cost));
            }
        }
    }

    // Every frontier entry was enqueued as the neighbor of a visited point
    // and adjacency is symmetric, so a connecting edge must exist.
    best.map(|(pos, point, anchor, _)| (pos, point, anchor))
        .ok_or_else(|| {
            ReconError::internal(
                "orientation propagation",
                "frontier has no edge into the visited set",
            )
        })
}

/// Push `point`'s unvisited neighbors onto the frontier, deduplicated.
fn enqueue_unvisited_neighbors(
    graph: &NeighborGraph,
    point: usize,
    frontier: &mut Vec<u32>,
    in_frontier: &mut HashSet<u32>,
) {
    for &j in &graph.points[point].neighbors {
        if !graph.points[j as usize].visited && in_frontier.insert(j) {
            frontier.push(j);
        }
    }
}
