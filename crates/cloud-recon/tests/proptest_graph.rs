//! Property-based tests for the neighbor graph and normal estimation.
//!
//! Run with: cargo test -p cloud-recon -- proptest

use cloud_recon::{PointCloud, build_graph, estimate_normals};
use proptest::prelude::*;

/// Generate a random position in a bounded box.
fn arb_position() -> impl Strategy<Value = [f64; 3]> {
    prop::array::uniform3(-100.0..100.0f64)
}

/// Generate a cloud with 2 to 40 random points.
fn arb_cloud() -> impl Strategy<Value = PointCloud> {
    prop::collection::vec(arb_position(), 2..40).prop_map(|positions| {
        let mut cloud = PointCloud::with_capacity(positions.len());
        for [x, y, z] in positions {
            cloud.push_coords(x, y, z);
        }
        cloud
    })
}

proptest! {
    #[test]
    fn prop_adjacency_is_symmetric(cloud in arb_cloud(), k in 1usize..8) {
        let graph = build_graph(&cloud, k).expect("non-empty cloud");

        for i in 0..graph.point_count() {
            for &j in graph.neighbors(i) {
                prop_assert!(
                    graph.neighbors(j as usize).contains(&(i as u32)),
                    "edge {}->{} has no mirror", i, j
                );
            }
        }
    }

    #[test]
    fn prop_no_self_edges_no_duplicates(cloud in arb_cloud(), k in 1usize..8) {
        let graph = build_graph(&cloud, k).expect("non-empty cloud");

        for i in 0..graph.point_count() {
            let nbrs = graph.neighbors(i);
            prop_assert!(!nbrs.contains(&(i as u32)), "point {} lists itself", i);

            let mut sorted = nbrs.to_vec();
            sorted.sort_unstable();
            sorted.dedup();
            prop_assert_eq!(sorted.len(), nbrs.len(), "point {} has duplicate edges", i);
        }
    }

    #[test]
    fn prop_estimated_normals_are_unit(cloud in arb_cloud(), k in 1usize..8) {
        let mut graph = build_graph(&cloud, k).expect("non-empty cloud");
        estimate_normals(&mut graph).expect("normals");

        for i in 0..graph.point_count() {
            let norm = graph.normal(i).norm();
            prop_assert!(
                (norm - 1.0).abs() < 1e-9,
                "normal {} has length {}", i, norm
            );
        }
    }
}
