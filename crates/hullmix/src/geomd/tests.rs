use super::*;
use crate::error::GeomError;
use nalgebra::{dvector, DVector};
use proptest::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

fn cube_corners() -> Vec<DVector<f64>> {
    let mut pts = Vec::new();
    for &x in &[0.0, 1.0] {
        for &y in &[0.0, 1.0] {
            for &z in &[0.0, 1.0] {
                pts.push(dvector![x, y, z]);
            }
        }
    }
    pts
}

fn random_cloud(n: usize, dim: usize, seed: u64) -> Vec<DVector<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| DVector::from_fn(dim, |_, _| rng.gen_range(0.0..1.0)))
        .collect()
}

#[test]
fn cube_hull_drops_interior_points() {
    let mut pts = cube_corners();
    pts.push(dvector![0.5, 0.5, 0.5]);
    pts.push(dvector![0.2, 0.7, 0.4]);
    let hull = compute_hull(&pts).unwrap();
    assert_eq!(hull.vertex_count(), 8);
    assert_eq!(hull.source, (0..8).collect::<Vec<_>>());
    // 6 square faces, each split into two triangles.
    assert_eq!(hull.facets.len(), 12);
    assert_eq!(hull.edges().len(), 18);
    for f in &hull.facets {
        assert!(is_outward(&hull, f));
    }
}

/// Every vertex lies strictly outside the hull of the remaining vertices.
fn assert_all_extreme(hull: &ConvexHull) {
    for i in 0..hull.vertex_count() {
        let others: Vec<DVector<f64>> = hull
            .points
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .map(|(_, p)| p.clone())
            .collect();
        let rest = compute_hull(&others).unwrap();
        let dist = rest
            .facets
            .iter()
            .map(|f| f.signed_distance(&hull.points[i]))
            .fold(f64::NEG_INFINITY, f64::max);
        assert!(dist > 1e-12, "vertex {} (input {}) is not extreme", i, hull.source[i]);
    }
}

#[test]
fn boundary_points_are_not_vertices() {
    let mut pts = cube_corners();
    pts.push(dvector![0.5, 0.5, 1.0]);
    pts.push(dvector![0.5, 0.0, 0.0]);
    pts.push(dvector![1.0, 0.25, 0.75]);
    let hull = compute_hull(&pts).unwrap();
    assert_eq!(hull.source, (0..8).collect::<Vec<_>>());
    assert_all_extreme(&hull);
}

#[test]
fn hull_after_adding_an_outside_apex_is_clean() {
    // An apex flush with two facet planes leaves old vertices on the new
    // boundary; they must not survive as vertices.
    let mut pts = cube_corners();
    pts.push(dvector![1.5, 1.0, 1.0]);
    pts.push(dvector![0.3, 0.6, 0.2]);
    let hull = compute_hull(&pts).unwrap();
    assert!(!hull.source.contains(&7));
    assert!(hull.source.contains(&8));
    assert_all_extreme(&hull);

    let cloud = random_cloud(300, 3, 0);
    let hull = compute_hull(&cloud).unwrap();
    assert_all_extreme(&hull);
    let mut grown = hull.points.clone();
    grown.push(dvector![1.2, 1.1, 0.5]);
    assert_all_extreme(&compute_hull(&grown).unwrap());
}

#[test]
fn singular_single_simplex_is_reported() {
    let pts = vec![
        dvector![0.0, 0.0, 0.0],
        dvector![1.0, 0.0, 0.0],
        dvector![0.0, 1.0, 0.0],
        dvector![1.0, 1.0, 1e-18],
    ];
    assert!(matches!(
        Triangulation::build(&pts),
        Err(GeomError::SingularSystem { simplex }) if simplex == vec![0, 1, 2, 3]
    ));
}

#[test]
fn coplanar_points_are_degenerate() {
    let pts = vec![
        dvector![0.0, 0.0, 0.5],
        dvector![1.0, 0.0, 0.5],
        dvector![0.0, 1.0, 0.5],
        dvector![1.0, 1.0, 0.5],
        dvector![0.3, 0.3, 0.5],
    ];
    assert!(matches!(
        compute_hull(&pts),
        Err(GeomError::DegenerateGeometry { .. })
    ));
}

#[test]
fn too_few_points_are_degenerate() {
    let pts = vec![dvector![0.0, 0.0, 0.0], dvector![1.0, 0.0, 0.0], dvector![0.0, 1.0, 0.0]];
    assert!(matches!(
        compute_hull(&pts),
        Err(GeomError::DegenerateGeometry { .. })
    ));
}

#[test]
fn mixed_dimensions_are_rejected() {
    let pts = vec![dvector![0.0, 0.0, 0.0], dvector![1.0, 0.0]];
    assert!(matches!(
        compute_hull(&pts),
        Err(GeomError::DimensionMismatch { expected: 3, found: 2 })
    ));
}

#[test]
fn random_cloud_is_contained_and_outward() {
    let pts = random_cloud(300, 3, 7);
    let hull = compute_hull(&pts).unwrap();
    for p in &pts {
        assert!(hull.contains(p, 1e-9));
    }
    for f in &hull.facets {
        assert_eq!(f.vertices.len(), 3);
        assert!(is_outward(&hull, f));
    }
    // Closed 2-manifold: every edge borders exactly two triangles.
    let adj = hull.vertex_facets();
    for (a, b) in hull.edges() {
        let shared = adj[a].iter().filter(|fi| adj[b].contains(fi)).count();
        assert_eq!(shared, 2, "edge ({a},{b})");
    }
}

#[test]
fn five_dimensional_hull() {
    let pts = random_cloud(120, 5, 11);
    let hull = compute_hull(&pts).unwrap();
    assert_eq!(hull.dim, 5);
    for p in &pts {
        assert!(hull.contains(p, 1e-9));
    }
    for f in &hull.facets {
        let mut v = f.vertices.clone();
        v.sort_unstable();
        v.dedup();
        assert_eq!(v.len(), 5);
        assert!(is_outward(&hull, f));
    }
}

#[test]
fn simplex_hull_in_5d_has_six_facets() {
    let mut pts = vec![DVector::zeros(5)];
    for k in 0..5 {
        let mut e = DVector::zeros(5);
        e[k] = 1.0;
        pts.push(e);
    }
    let hull = compute_hull(&pts).unwrap();
    assert_eq!(hull.vertex_count(), 6);
    assert_eq!(hull.facets.len(), 6);
}

#[test]
fn one_dimensional_hull_keeps_endpoints() {
    let pts = vec![dvector![0.4], dvector![0.1], dvector![0.9], dvector![0.5]];
    let hull = compute_hull(&pts).unwrap();
    assert_eq!(hull.source, vec![1, 2]);
    assert_eq!(hull.facets.len(), 2);
}

#[test]
fn orient_faces_repairs_flipped_winding() {
    let mut hull = compute_hull(&cube_corners()).unwrap();
    for f in hull.facets.iter_mut() {
        f.vertices.swap(1, 2);
    }
    orient_faces(&mut hull);
    for f in &hull.facets {
        assert!(is_outward(&hull, f));
    }
}

#[test]
fn cospherical_vertices_fall_back_to_fan() {
    let tri = Triangulation::build(&cube_corners()).unwrap();
    assert_eq!(tri.kind, TriangulationKind::Fan);
    let total: f64 = tri
        .simplices
        .iter()
        .map(|s| {
            let pts: Vec<DVector<f64>> = s.vertices.iter().map(|&v| cube_corners()[v].clone()).collect();
            super::util::simplex_volume(&pts)
        })
        .sum();
    assert!((total - 1.0).abs() < 1e-9);
}

#[test]
fn delaunay_locates_and_reproduces_points() {
    let mut pts = cube_corners();
    pts.push(dvector![0.5, 0.45, 0.55]);
    let tri = Triangulation::build(&pts).unwrap();
    assert_eq!(tri.kind, TriangulationKind::Delaunay);
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..200 {
        let q = DVector::from_fn(3, |_, _| rng.gen_range(0.0..1.0));
        let (k, bary) = tri.locate(&q, 1e-9).expect("interior point located");
        assert!((bary.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        let mut rebuilt = DVector::zeros(3);
        for (&v, &w) in tri.simplices[k].vertices.iter().zip(&bary) {
            rebuilt += &pts[v] * w;
        }
        assert!((rebuilt - q).norm() < 1e-9);
    }
    assert!(tri.locate(&dvector![2.0, 2.0, 2.0], 1e-6).is_none());
}

#[test]
fn single_simplex_triangulation() {
    let pts = vec![
        dvector![0.0, 0.0, 0.0],
        dvector![1.0, 0.0, 0.0],
        dvector![0.0, 1.0, 0.0],
        dvector![0.0, 0.0, 1.0],
    ];
    let tri = Triangulation::build(&pts).unwrap();
    assert_eq!(tri.kind, TriangulationKind::SingleSimplex);
    let (_, bary) = tri.locate(&pts[2], 1e-9).unwrap();
    assert!((bary[2] - 1.0).abs() < 1e-12);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn facets_face_away_from_centroid(
        raw in proptest::collection::vec((0.0..1.0f64, 0.0..1.0f64, 0.0..1.0f64), 5..40)
    ) {
        let pts: Vec<DVector<f64>> = raw.iter().map(|&(x, y, z)| dvector![x, y, z]).collect();
        let hull = compute_hull(&pts);
        prop_assume!(hull.is_ok());
        let hull = hull.unwrap();
        let cloud_center = super::util::centroid(&pts);
        for f in &hull.facets {
            let fp = hull.facet_points(f);
            let n = super::util::oriented_normal(&fp);
            prop_assert!(n.dot(&(super::util::centroid(&fp) - &cloud_center)) > 0.0);
        }
    }
}
