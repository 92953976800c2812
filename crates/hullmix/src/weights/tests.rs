use super::*;
use crate::synth::{uniform_cloud, ReplayToken};
use nalgebra::{dvector, Vector3};
use proptest::prelude::*;

fn rgb_corners() -> Vec<DVector<f64>> {
    vec![
        dvector![0.0, 0.0, 0.0],
        dvector![1.0, 0.0, 0.0],
        dvector![0.0, 1.0, 0.0],
        dvector![0.0, 0.0, 1.0],
        dvector![1.0, 1.0, 1.0],
    ]
}

fn reconstruct(w: &WeightMatrix, i: usize, vertices: &[DVector<f64>]) -> DVector<f64> {
    let mut out = DVector::zeros(vertices[0].len());
    for &(c, v) in w.row(i) {
        out += &vertices[c] * v;
    }
    out
}

#[test]
fn compose_multiplies_sparse_rows() {
    let mut a = WeightMatrix::new(2);
    a.push_row(vec![(0, 0.25), (1, 0.75)]);
    let mut b = WeightMatrix::new(3);
    b.push_row(vec![(0, 1.0)]);
    b.push_row(vec![(1, 0.5), (2, 0.5)]);
    let c = a.compose(&b).unwrap();
    assert_eq!(c.n_cols(), 3);
    assert_eq!(c.dense_row(0), vec![0.25, 0.375, 0.375]);
    assert!(b.compose(&a).is_err());
}

#[test]
fn delaunay_weights_reproduce_interior_points() {
    let verts = rgb_corners();
    let queries = uniform_cloud(200, 3, ReplayToken::new(2, 0)).unwrap();
    let solver = DelaunayBarycentric::default();
    let w = solver.solve(&verts, queries.points()).unwrap();
    assert_eq!(w.n_rows(), 200);
    let hull = crate::geomd::compute_hull(&verts).unwrap();
    for (i, q) in queries.points().iter().enumerate() {
        if hull.contains(q, -1e-6) {
            assert!((reconstruct(&w, i, &verts) - q).norm() < 1e-9);
        }
    }
}

#[test]
fn delaunay_snaps_outside_points_to_nearest_vertex() {
    let verts = rgb_corners();
    let far = dvector![3.0, -1.0, -1.0];
    let w = DelaunayBarycentric::default().solve(&verts, &[far]).unwrap();
    assert_eq!(w.row(0), &[(1, 1.0)]);
}

#[test]
fn delaunay_handles_flat_vertex_sets() {
    // Four coplanar RGBXY points: rank 2 inside R^5.
    let verts = vec![
        dvector![0.0, 0.0, 0.0, 0.0, 0.0],
        dvector![1.0, 0.0, 0.0, 0.5, 0.0],
        dvector![0.0, 1.0, 0.0, 0.0, 0.5],
        dvector![1.0, 1.0, 0.0, 0.5, 0.5],
    ];
    let w = DelaunayBarycentric::default().solve(&verts, &verts).unwrap();
    for i in 0..4 {
        let dense = w.dense_row(i);
        assert!((dense[i] - 1.0).abs() < 1e-9, "row {i}: {dense:?}");
    }
}

#[test]
fn delaunay_single_distinct_vertex() {
    let verts = vec![dvector![0.3, 0.3, 0.3]; 2];
    let w = DelaunayBarycentric::default().solve(&verts, &verts).unwrap();
    assert_eq!(w.row(1), &[(0, 1.0)]);
}

#[test]
fn star_identity_on_own_vertices() {
    let palette = rgb_corners();
    let w = StarBarycentric::default().solve(&palette, &palette).unwrap();
    for i in 0..palette.len() {
        let dense = w.dense_row(i);
        for (j, &v) in dense.iter().enumerate() {
            let expected = if i == j { 1.0 } else { 0.0 };
            assert!((v - expected).abs() < 1e-9, "row {i}: {dense:?}");
        }
    }
}

#[test]
fn star_pivot_is_nearest_origin() {
    let palette = vec![
        dvector![0.5, 0.5, 0.5],
        dvector![0.1, 0.0, 0.0],
        dvector![0.0, 0.1, 0.0],
    ];
    assert_eq!(StarBarycentric::pivot(&palette), 1);
}

#[test]
fn star_rows_are_exact_convex_combinations() {
    let palette = rgb_corners();
    let queries = vec![dvector![0.2, 0.2, 0.2], dvector![0.5, 0.5, 0.1], dvector![0.9, 0.9, 0.9]];
    let w = StarBarycentric::default().solve(&palette, &queries).unwrap();
    for (i, q) in queries.iter().enumerate() {
        assert!(w.row(i).len() <= 4);
        assert!((w.row_sums()[i] - 1.0).abs() < 1e-12);
        assert!((reconstruct(&w, i, &palette) - q).norm() < 1e-9);
    }
}

#[test]
fn star_outside_and_degenerate_fall_back_to_uniform() {
    let palette = rgb_corners();
    let w = StarBarycentric::default()
        .solve(&palette, &[dvector![2.0, 2.0, 2.0]])
        .unwrap();
    assert_eq!(w.dense_row(0), vec![0.2; 5]);

    let flat = vec![
        dvector![0.0, 0.0, 0.5],
        dvector![1.0, 0.0, 0.5],
        dvector![0.0, 1.0, 0.5],
    ];
    let w = StarBarycentric::default()
        .solve(&flat, &[dvector![0.2, 0.2, 0.5]])
        .unwrap();
    for v in w.dense_row(0) {
        assert!((v - 1.0 / 3.0).abs() < 1e-15);
    }
}

#[test]
fn asap_assigns_every_color() {
    let palette = rgb_corners();
    let mut queries = uniform_cloud(100, 3, ReplayToken::new(5, 0))
        .unwrap()
        .points()
        .to_vec();
    queries.push(queries[0].clone());
    let w = AsapWeights::default().solve(&palette, &queries).unwrap();
    assert_eq!(w.n_rows(), 101);
    assert_eq!(w.row(100), w.row(0));
    for s in w.row_sums() {
        assert!((s - 1.0).abs() < 1e-9);
    }
}

#[test]
fn asap_projects_outside_colors_onto_hull() {
    // Tetrahedron palette, query far outside beyond the red corner.
    let palette = vec![
        dvector![0.0, 0.0, 0.0],
        dvector![1.0, 0.0, 0.0],
        dvector![0.0, 1.0, 0.0],
        dvector![0.0, 0.0, 1.0],
    ];
    let w = AsapWeights::default()
        .solve(&palette, &[dvector![2.0, -0.5, -0.5]])
        .unwrap();
    let dense = w.dense_row(0);
    assert!((dense[1] - 1.0).abs() < 1e-9, "{dense:?}");
}

#[test]
fn asap_maps_columns_back_to_palette_order() {
    // White first: L1 ordering moves black to the base slot.
    let palette = vec![
        dvector![1.0, 1.0, 1.0],
        dvector![1.0, 0.0, 0.0],
        dvector![0.0, 1.0, 0.0],
        dvector![0.0, 0.0, 1.0],
        dvector![0.0, 0.0, 0.0],
    ];
    let w = AsapWeights::default().solve(&palette, &palette).unwrap();
    for i in 0..palette.len() {
        assert!((w.dense_row(i)[i] - 1.0).abs() < 1e-9);
    }
}

#[test]
fn asap_rejects_non_rgb_input() {
    let pts = vec![dvector![0.0, 0.0], dvector![1.0, 0.0], dvector![0.0, 1.0]];
    assert!(matches!(
        AsapWeights::default().solve(&pts, &pts),
        Err(GeomError::DimensionMismatch { expected: 3, found: 2 })
    ));
}

#[test]
fn asap_reports_unassigned_colors() {
    // Demanding every coordinate >= 0.1 leaves a color on the black-white
    // diagonal outside all face tetrahedra.
    let palette = rgb_corners();
    let strict = AsapWeights {
        eps: -0.1,
        ..AsapWeights::default()
    };
    let q = vec![dvector![0.05, 0.05, 0.05]];
    assert!(matches!(
        strict.solve(&palette, &q),
        Err(GeomError::UnassignedPoints { count: 1 })
    ));
}

#[test]
fn closest_point_regions() {
    let a = Vector3::new(0.0, 0.0, 0.0);
    let b = Vector3::new(1.0, 0.0, 0.0);
    let c = Vector3::new(0.0, 1.0, 0.0);
    let cp = |p: Vector3<f64>| closest_point_on_triangle(&p, &a, &b, &c);
    assert_eq!(cp(Vector3::new(-1.0, -1.0, 1.0)), a);
    assert_eq!(cp(Vector3::new(2.0, -0.5, 0.0)), b);
    assert!((cp(Vector3::new(0.25, 0.25, 3.0)) - Vector3::new(0.25, 0.25, 0.0)).norm() < 1e-12);
    assert!((cp(Vector3::new(1.0, 1.0, 0.0)) - Vector3::new(0.5, 0.5, 0.0)).norm() < 1e-12);
    assert!((cp(Vector3::new(0.5, -1.0, 0.0)) - Vector3::new(0.5, 0.0, 0.0)).norm() < 1e-12);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn delaunay_rows_sum_to_one(seed in 0u64..10_000) {
        let verts = uniform_cloud(12, 3, ReplayToken::new(seed, 1)).unwrap();
        let queries = uniform_cloud(40, 3, ReplayToken::new(seed, 2)).unwrap();
        let w = DelaunayBarycentric::default().solve(verts.points(), queries.points()).unwrap();
        for (i, s) in w.row_sums().into_iter().enumerate() {
            prop_assert!((s - 1.0).abs() < 1e-9);
            for &(_, v) in w.row(i) {
                prop_assert!(v >= -1e-6 && v <= 1.0 + 1e-6, "entry {v}");
            }
        }
    }
}
