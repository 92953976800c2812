//! Edge-collapse candidates.
//!
//! For an edge (a, b) the replacement vertex is the LP optimum
//!
//!   minimize (Σ n_f) · x   s.t.   n_f · x >= n_f · p_f   for every facet f at a or b,
//!
//! with `n_f` the outward unit normal of f. The apex therefore lies on or
//! outside every adjacent supporting plane, and its cost is the volume of the
//! cone it adds over those facets: `Σ |g_f · (x − p_f)| / d!` where `g_f` is the
//! unnormalized cofactor normal (|g_f| = (d−1)! · area).

use nalgebra::{DMatrix, DVector};

use crate::cfg::{HULL_EPS, NORMAL_COMPAT_EPS, NULL_COLLAPSE_EPS};
use crate::geomd::util::{factorial, oriented_normal, scale_of};
use crate::geomd::ConvexHull;
use crate::lp::LinearProgram;

/// One feasible collapse, valid only for the hull it was computed on.
#[derive(Clone, Debug)]
pub struct CollapseCandidate {
    pub edge: (usize, usize),
    pub apex: DVector<f64>,
    /// Volume added by replacing the edge's star with the cone to `apex`.
    pub cost: f64,
}

/// Facets incident to `a` or `b`, ascending and without duplicates.
fn incident_facets(adj: &[Vec<usize>], a: usize, b: usize) -> Vec<usize> {
    let mut faces: Vec<usize> = adj[a].iter().chain(&adj[b]).copied().collect();
    faces.sort_unstable();
    faces.dedup();
    faces
}

/// Candidate for a single edge, or `None` when the LP has no optimum.
pub fn collapse_candidate<L: LinearProgram>(
    hull: &ConvexHull,
    adj: &[Vec<usize>],
    edge: (usize, usize),
    lp: &L,
) -> Option<CollapseCandidate> {
    let d = hull.dim;
    let faces = incident_facets(adj, edge.0, edge.1);
    let mut rows: Vec<DVector<f64>> = Vec::with_capacity(faces.len());
    let mut rhs: Vec<f64> = Vec::with_capacity(faces.len());
    let mut cones: Vec<(DVector<f64>, DVector<f64>)> = Vec::with_capacity(faces.len());
    let mut cost = DVector::zeros(d);
    for &fi in &faces {
        let pts = hull.facet_points(&hull.facets[fi]);
        let g = oriented_normal(&pts);
        let norm = g.norm();
        if norm == 0.0 {
            continue;
        }
        let n = &g / norm;
        rhs.push(n.dot(&pts[0]));
        cost += &n;
        rows.push(n);
        cones.push((g, pts[0].clone()));
    }
    if rows.is_empty() {
        return None;
    }
    let a = DMatrix::from_fn(rows.len(), d, |r, c| rows[r][c]);
    let b = DVector::from_vec(rhs);
    match lp.minimize(&cost, &a, &b) {
        Ok(apex) => {
            let volume: f64 = cones
                .iter()
                .map(|(g, p0)| g.dot(&(&apex - p0)).abs())
                .sum::<f64>()
                / factorial(d);
            if !volume.is_finite() {
                return None;
            }
            if is_null_collapse(hull, &apex, volume) {
                tracing::trace!(?edge, cost = volume, "apex sits on an existing vertex; skipping");
                return None;
            }
            Some(CollapseCandidate {
                edge,
                apex,
                cost: volume,
            })
        }
        // No optimum means no candidate, whatever the local geometry. The
        // edge-normal test only classifies the failure for the trace log.
        Err(err) => {
            let compatible = edge_normal_test(hull, &faces, edge);
            tracing::trace!(?edge, %err, compatible, "edge has no LP optimum");
            None
        }
    }
}

/// A collapse that adds no volume and lands on a current vertex leaves the
/// hull as it was.
fn is_null_collapse(hull: &ConvexHull, apex: &DVector<f64>, volume: f64) -> bool {
    let scale = scale_of(&hull.points);
    volume <= NULL_COLLAPSE_EPS * scale.powi(hull.dim as i32)
        && hull.points.iter().any(|p| (p - apex).norm() <= HULL_EPS * scale)
}

/// Local convexity check around an edge whose LP failed.
///
/// "Central" facets contain both endpoints, "full" facets exactly one. The
/// edge passes when there are exactly two central facets and every full facet
/// normal has a non-negative dot product (up to `NORMAL_COMPAT_EPS`) with the
/// mean of the central unit normals. Either way the edge yields no candidate.
pub fn edge_normal_test(hull: &ConvexHull, faces: &[usize], edge: (usize, usize)) -> bool {
    let mut central: Vec<DVector<f64>> = Vec::new();
    let mut full: Vec<DVector<f64>> = Vec::new();
    for &fi in faces {
        let f = &hull.facets[fi];
        let n = oriented_normal(&hull.facet_points(f));
        match (f.contains_vertex(edge.0), f.contains_vertex(edge.1)) {
            (true, true) => central.push(n),
            (true, false) | (false, true) => full.push(n),
            (false, false) => {}
        }
    }
    if central.len() != 2 {
        return false;
    }
    let mut avg = DVector::zeros(hull.dim);
    for n in &central {
        let norm = n.norm();
        if norm == 0.0 {
            return false;
        }
        avg += n / norm;
    }
    avg /= central.len() as f64;
    full.iter().all(|n| avg.dot(n) >= NORMAL_COMPAT_EPS)
}

/// Candidates for every edge of `hull`, in lexicographic edge order.
pub fn collapse_candidates<L: LinearProgram>(hull: &ConvexHull, lp: &L) -> Vec<CollapseCandidate> {
    let adj = hull.vertex_facets();
    hull.edges()
        .into_iter()
        .filter_map(|edge| collapse_candidate(hull, &adj, edge, lp))
        .collect()
}

/// Minimum-cost candidate; ties keep the earliest edge.
pub fn select_best(candidates: &[CollapseCandidate]) -> Option<&CollapseCandidate> {
    let mut best: Option<&CollapseCandidate> = None;
    for c in candidates {
        if best.map_or(true, |b| c.cost < b.cost) {
            best = Some(c);
        }
    }
    best
}
