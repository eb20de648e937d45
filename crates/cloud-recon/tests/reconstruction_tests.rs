//! End-to-end tests for the reconstruction pipeline.
//!
//! These exercise the full graph -> normals -> orientation -> sampling
//! chain on analytic shapes where the expected field is known.

use cloud_recon::progress::ProgressCallback;
use cloud_recon::{
    PointCloud, ReconError, ReconstructionParams, build_graph, estimate_normals,
    propagate_orientation, reconstruct_field, reconstruct_field_with_progress,
};

// =============================================================================
// Fixtures
// =============================================================================

/// Evenly distributed points on a sphere (Fibonacci lattice).
fn sphere_cloud(samples: usize, radius: f64) -> PointCloud {
    let golden = std::f64::consts::PI * (3.0 - 5.0_f64.sqrt());

    let mut cloud = PointCloud::with_capacity(samples);
    for i in 0..samples {
        let y = 1.0 - 2.0 * (i as f64 + 0.5) / samples as f64;
        let ring = (1.0 - y * y).sqrt();
        let theta = golden * i as f64;
        cloud.push_coords(
            radius * theta.cos() * ring,
            radius * y,
            radius * theta.sin() * ring,
        );
    }
    cloud
}

/// A small quad in the z = 0 plane.
fn quad_cloud() -> PointCloud {
    let mut cloud = PointCloud::new();
    cloud.push_coords(0.0, 0.0, 0.0);
    cloud.push_coords(1.0, 0.0, 0.0);
    cloud.push_coords(0.0, 1.0, 0.0);
    cloud.push_coords(1.0, 1.0, 0.0);
    cloud
}

/// A deterministic grid exactly filling the unit cube.
fn unit_cube_cloud(per_axis: usize) -> PointCloud {
    let mut cloud = PointCloud::with_capacity(per_axis * per_axis * per_axis);
    let step = 1.0 / (per_axis - 1) as f64;
    for ix in 0..per_axis {
        for iy in 0..per_axis {
            for iz in 0..per_axis {
                cloud.push_coords(ix as f64 * step, iy as f64 * step, iz as f64 * step);
            }
        }
    }
    cloud
}

// =============================================================================
// Graph properties
// =============================================================================

#[test]
fn test_sphere_graph_is_symmetric() {
    let cloud = sphere_cloud(300, 1.0);
    let graph = build_graph(&cloud, 10).expect("sphere graph");

    for i in 0..graph.point_count() {
        for &j in graph.neighbors(i) {
            assert!(
                graph.neighbors(j as usize).contains(&(i as u32)),
                "edge {}->{} has no mirror",
                i,
                j
            );
        }
    }
}

// =============================================================================
// Normal properties
// =============================================================================

#[test]
fn test_normals_unit_length_before_and_after_orientation() {
    let cloud = sphere_cloud(300, 1.0);
    let mut graph = build_graph(&cloud, 10).expect("graph");
    estimate_normals(&mut graph).expect("normals");

    for i in 0..graph.point_count() {
        assert!(
            (graph.normal(i).norm() - 1.0).abs() < 1e-9,
            "normal {} not unit length after estimation",
            i
        );
    }

    propagate_orientation(&mut graph).expect("orientation");

    for i in 0..graph.point_count() {
        assert!(
            (graph.normal(i).norm() - 1.0).abs() < 1e-9,
            "normal {} not unit length after orientation",
            i
        );
    }
}

#[test]
fn test_every_reachable_point_visited() {
    let cloud = sphere_cloud(300, 1.0);
    let mut graph = build_graph(&cloud, 10).expect("graph");
    estimate_normals(&mut graph).expect("normals");
    let visited = propagate_orientation(&mut graph).expect("orientation");

    assert_eq!(visited, 300, "sphere KNN graph is connected");
    for i in 0..graph.point_count() {
        assert!(graph.is_visited(i));
    }
}

#[test]
fn test_sphere_orientation_locally_consistent() {
    let cloud = sphere_cloud(500, 1.0);
    let mut graph = build_graph(&cloud, 12).expect("graph");
    estimate_normals(&mut graph).expect("normals");
    propagate_orientation(&mut graph).expect("orientation");

    // Angularly close points must agree in sign after propagation.
    for i in 0..graph.point_count() {
        let n_i = graph.normal(i);
        for &j in graph.neighbors(i) {
            let n_j = graph.normal(j as usize);
            assert!(
                n_i.dot(&n_j) > 0.0,
                "neighbors {} and {} disagree after orientation",
                i,
                j
            );
        }
    }
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn test_stages_are_bitwise_deterministic() {
    let cloud = sphere_cloud(200, 1.0);

    let run = || {
        let mut graph = build_graph(&cloud, 8).expect("graph");
        estimate_normals(&mut graph).expect("normals");
        propagate_orientation(&mut graph).expect("orientation");
        (0..graph.point_count())
            .map(|i| {
                let n = graph.normal(i);
                (n.x.to_bits(), n.y.to_bits(), n.z.to_bits())
            })
            .collect::<Vec<_>>()
    };

    let first = run();
    let second = run();
    assert_eq!(first, second, "identical input must give identical normals");
}

// =============================================================================
// Sphere distance field
// =============================================================================

#[test]
fn test_sphere_field_approximates_signed_distance() {
    let radius = 1.0;
    let spacing = 0.1;
    let cloud = sphere_cloud(2000, radius);

    let params = ReconstructionParams {
        neighborhood_size: 20,
        sample_spacing: Some(spacing),
    };
    let result = reconstruct_field(&cloud, &params).expect("sphere reconstructs");
    let field = &result.field;

    assert_eq!(result.visited_points, 2000);

    // The global sign is arbitrary (all-outward or all-inward); recover it
    // from how the seed's normal relates to its radial direction.
    let oriented = cloud.with_estimated_normals(20).expect("normals");
    let seed = &oriented.points[0];
    let sign = seed
        .normal
        .expect("estimated normal")
        .dot(&seed.position.coords)
        .signum();

    let mut worst = 0.0_f64;
    for idx in 0..field.node_count() {
        let [x, y, z] = field.delinearize(idx);
        let node = field.node_position(x, y, z);
        let expected = node.coords.norm() - radius;
        let got = sign * field.values[idx];
        worst = worst.max((got - expected).abs());
    }

    assert!(
        worst <= spacing,
        "worst signed-distance error {} exceeds one spacing ({})",
        worst,
        spacing
    );
}

// =============================================================================
// Coplanar quad scenario
// =============================================================================

#[test]
fn test_quad_normals_align_and_field_equals_height() {
    let spacing = 0.25;
    let params = ReconstructionParams {
        neighborhood_size: 3,
        sample_spacing: Some(spacing),
    };
    let result = reconstruct_field(&quad_cloud(), &params).expect("quad reconstructs");
    let field = &result.field;

    assert_eq!(result.visited_points, 4);

    // All four normals align to ±(0, 0, 1); recover the shared sign.
    let oriented = quad_cloud().with_estimated_normals(3).expect("normals");
    let first = oriented.points[0].normal.expect("normal");
    assert!((first.z.abs() - 1.0).abs() < 1e-9);
    for p in &oriented.points {
        let n = p.normal.expect("normal");
        assert!(
            (n - first).norm() < 1e-9,
            "quad normals must agree exactly, got {:?} vs {:?}",
            n,
            first
        );
    }

    // Every nearest quad corner lies in z = 0 with normal ±e_z, so each
    // node's signed distance is exactly ±its z-coordinate.
    let sign = first.z.signum();
    for idx in 0..field.node_count() {
        let [x, y, z] = field.delinearize(idx);
        let node = field.node_position(x, y, z);
        assert!(
            (field.values[idx] - sign * node.z).abs() < 1e-9,
            "node ({}, {}, {}): field {} vs height {}",
            x,
            y,
            z,
            field.values[idx],
            sign * node.z
        );
    }
}

// =============================================================================
// Boundary cases
// =============================================================================

#[test]
fn test_single_point_boundary_case() {
    let mut cloud = PointCloud::new();
    cloud.push_coords(3.0, -1.0, 2.0);

    let result =
        reconstruct_field(&cloud, &ReconstructionParams::default()).expect("single point runs");

    assert_eq!(result.point_count, 1);
    assert_eq!(result.visited_points, 1);
    assert!(result.spacing_estimated);
    assert_eq!(result.field.dims, [4, 4, 4]);
}

#[test]
fn test_auto_spacing_matches_cube_root_density() {
    // 1000 points exactly filling the unit cube: volume 1, spacing 0.1.
    let cloud = unit_cube_cloud(10);
    assert_eq!(cloud.len(), 1000);

    let result =
        reconstruct_field(&cloud, &ReconstructionParams::default()).expect("cube reconstructs");

    assert!(result.spacing_estimated);
    assert!(
        (result.sample_spacing - 0.1).abs() < 1e-9,
        "expected cbrt(1/1000) = 0.1, got {}",
        result.sample_spacing
    );
}

#[test]
fn test_empty_cloud_is_an_input_error() {
    let cloud = PointCloud::new();
    let err = reconstruct_field(&cloud, &ReconstructionParams::default()).unwrap_err();
    assert!(matches!(err, ReconError::EmptyCloud { .. }));
}

#[test]
fn test_zero_neighborhood_is_an_input_error() {
    let err = reconstruct_field(
        &quad_cloud(),
        &ReconstructionParams::with_neighborhood_size(0),
    )
    .unwrap_err();
    assert!(matches!(err, ReconError::InvalidParameter { .. }));
}

// =============================================================================
// Cancellation
// =============================================================================

#[test]
fn test_callback_can_cancel_the_run() {
    let callback: ProgressCallback = Box::new(|_| false);
    let err = reconstruct_field_with_progress(
        &quad_cloud(),
        &ReconstructionParams::with_neighborhood_size(3),
        Some(&callback),
    )
    .unwrap_err();
    assert!(matches!(err, ReconError::Cancelled { .. }));
}

#[test]
fn test_callback_reports_progress() {
    use std::sync::atomic::{AtomicU32, Ordering};
    let calls = std::sync::Arc::new(AtomicU32::new(0));
    let calls_clone = calls.clone();

    let callback: ProgressCallback = Box::new(move |progress| {
        calls_clone.fetch_add(1, Ordering::SeqCst);
        assert!(!progress.message.is_empty());
        true
    });

    reconstruct_field_with_progress(
        &quad_cloud(),
        &ReconstructionParams {
            neighborhood_size: 3,
            sample_spacing: Some(0.5),
        },
        Some(&callback),
    )
    .expect("quad reconstructs");

    assert!(
        calls.load(Ordering::SeqCst) >= 4,
        "each stage polls the callback at least once"
    );
}
