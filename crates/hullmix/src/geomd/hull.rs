//! Convex hull extraction (Quickhull in R^d) and facet orientation.
//!
//! Algorithm
//! - Seed with d+1 affinely independent points chosen greedily by largest
//!   residual against the span found so far; failure means the cloud is flat.
//! - Every facet owns its "outside set". Repeatedly take the furthest outside
//!   point (the eye), collect all facets that see it, and cone the horizon
//!   ridges (ridges seen exactly once among visible facets) to the eye.
//! - Points within `HULL_EPS` of a plane count as inside, so coplanar input
//!   never produces zero-volume slivers.
//! - Output facets are simplices; coplanar boundary regions are triangulated.
//! - Every returned vertex is extreme: points left on a flat boundary region
//!   (incident facet normals of rank < d) are dropped and the hull rebuilt.

use std::cmp::Ordering;
use std::collections::HashMap;

use nalgebra::{DMatrix, DVector};

use super::types::{ConvexHull, Facet};
use super::util::{centroid, oriented_normal, residual, scale_of};
use crate::cfg::{EXTREME_EPS, HULL_EPS, SINGULAR_EPS, SPAN_EPS};
use crate::error::GeomError;

struct WorkFacet {
    vertices: Vec<usize>,
    normal: DVector<f64>,
    offset: f64,
    outside: Vec<usize>,
    alive: bool,
}

impl WorkFacet {
    #[inline]
    fn distance(&self, p: &DVector<f64>) -> f64 {
        self.normal.dot(p) - self.offset
    }
}

struct Ctx<'a> {
    points: &'a [DVector<f64>],
    interior: DVector<f64>,
    eps: f64,
    normal_floor: f64,
}

/// Convex hull of `points` with outward-oriented facets.
///
/// Errors with `DegenerateGeometry` when fewer than d+1 points are given or no
/// d+1 of them are affinely independent.
pub fn compute_hull(points: &[DVector<f64>]) -> Result<ConvexHull, GeomError> {
    let d = points
        .first()
        .map(|p| p.len())
        .ok_or_else(|| GeomError::degenerate("no points"))?;
    if let Some(p) = points.iter().find(|p| p.len() != d) {
        return Err(GeomError::DimensionMismatch {
            expected: d,
            found: p.len(),
        });
    }
    if d == 0 {
        return Err(GeomError::invalid("zero-dimensional points"));
    }
    if points.len() < d + 1 {
        return Err(GeomError::degenerate(format!(
            "need at least {} points for a {d}-dimensional hull, got {}",
            d + 1,
            points.len()
        )));
    }
    let mut hull = quickhull(points)?;
    // Eyes that end up flush with later facets stay in the facet lists; drop
    // them and rebuild until every vertex is extreme.
    loop {
        let keep = extreme_vertices(&hull);
        if keep.len() == hull.vertex_count() {
            return Ok(hull);
        }
        tracing::trace!(
            dropped = hull.vertex_count() - keep.len(),
            "rebuilding hull without non-extreme vertices"
        );
        let subset: Vec<usize> = keep.iter().map(|&l| hull.source[l]).collect();
        let pts: Vec<DVector<f64>> = subset.iter().map(|&g| points[g].clone()).collect();
        let mut next = quickhull(&pts)?;
        for s in next.source.iter_mut() {
            *s = subset[*s];
        }
        hull = next;
    }
}

/// Local indices of hull vertices whose incident facet normals span R^d.
///
/// A vertex in the relative interior of a flat boundary region (a coplanar
/// patch, or the middle of an edge) only sees normals orthogonal to that
/// region, so their rank drops below d.
pub(crate) fn extreme_vertices(hull: &ConvexHull) -> Vec<usize> {
    let d = hull.dim;
    hull.vertex_facets()
        .iter()
        .enumerate()
        .filter(|(_, faces)| {
            faces.len() >= d && {
                let m = DMatrix::from_fn(faces.len(), d, |r, c| hull.facets[faces[r]].normal[c]);
                m.rank(EXTREME_EPS) == d
            }
        })
        .map(|(v, _)| v)
        .collect()
}

fn quickhull(points: &[DVector<f64>]) -> Result<ConvexHull, GeomError> {
    let d = points[0].len();
    let scale = scale_of(points);
    let simplex = initial_simplex(points, scale)
        .ok_or_else(|| GeomError::degenerate(format!("points do not span R^{d}")))?;
    let seed: Vec<DVector<f64>> = simplex.iter().map(|&i| points[i].clone()).collect();
    let ctx = Ctx {
        points,
        interior: centroid(&seed),
        eps: HULL_EPS * scale,
        normal_floor: SINGULAR_EPS * scale.powi(d as i32 - 1),
    };

    let mut facets: Vec<WorkFacet> = Vec::new();
    for skip in 0..=d {
        let verts: Vec<usize> = simplex
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != skip)
            .map(|(_, &v)| v)
            .collect();
        let facet = make_facet(&ctx, verts)
            .ok_or_else(|| GeomError::degenerate("initial simplex is flat"))?;
        facets.push(facet);
    }
    for i in 0..points.len() {
        if !simplex.contains(&i) {
            assign_outside(&mut facets, 0, i, &ctx);
        }
    }

    let mut pending: Vec<usize> = (0..facets.len()).collect();
    while let Some(fi) = pending.pop() {
        if !facets[fi].alive || facets[fi].outside.is_empty() {
            continue;
        }
        let eye = furthest_outside(&facets[fi], points);
        let eye_p = &points[eye];
        let visible: Vec<usize> = (0..facets.len())
            .filter(|&k| facets[k].alive && facets[k].distance(eye_p) > ctx.eps)
            .collect();
        let horizon = horizon_ridges(&facets, &visible);

        let mut orphans = Vec::new();
        for &k in &visible {
            facets[k].alive = false;
            orphans.append(&mut facets[k].outside);
        }
        let first_new = facets.len();
        for mut ridge in horizon {
            ridge.push(eye);
            match make_facet(&ctx, ridge) {
                Some(f) => facets.push(f),
                None => tracing::trace!(eye, "skipping flat cone facet"),
            }
        }
        for o in orphans {
            if o != eye {
                assign_outside(&mut facets, first_new, o, &ctx);
            }
        }
        pending.extend((first_new..facets.len()).filter(|&k| !facets[k].outside.is_empty()));
    }

    let alive: Vec<&WorkFacet> = facets.iter().filter(|f| f.alive).collect();
    if alive.len() < d + 1 {
        return Err(GeomError::degenerate("hull collapsed during construction"));
    }
    let mut source: Vec<usize> = alive.iter().flat_map(|f| f.vertices.iter().copied()).collect();
    source.sort_unstable();
    source.dedup();
    let mut local = vec![usize::MAX; points.len()];
    for (l, &g) in source.iter().enumerate() {
        local[g] = l;
    }
    let mut hull = ConvexHull {
        dim: d,
        points: source.iter().map(|&g| points[g].clone()).collect(),
        facets: alive
            .iter()
            .map(|f| Facet {
                vertices: f.vertices.iter().map(|&g| local[g]).collect(),
                normal: f.normal.clone(),
                offset: f.offset,
            })
            .collect(),
        source,
    };
    orient_faces(&mut hull);
    Ok(hull)
}

/// Flip facet winding where the vertex-order normal disagrees with the
/// supporting-plane normal (swap the first two vertices).
///
/// Post: for every facet, `oriented_normal(vertices) · (facet centroid − hull
/// centroid) > 0`.
pub fn orient_faces(hull: &mut ConvexHull) {
    let points = &hull.points;
    for f in hull.facets.iter_mut() {
        if f.vertices.len() < 2 {
            continue;
        }
        let pts: Vec<DVector<f64>> = f.vertices.iter().map(|&v| points[v].clone()).collect();
        if oriented_normal(&pts).dot(&f.normal) < 0.0 {
            f.vertices.swap(0, 1);
        }
    }
}

/// Winding check used by tests and debug assertions.
pub fn is_outward(hull: &ConvexHull, facet: &Facet) -> bool {
    let pts = hull.facet_points(facet);
    let n = oriented_normal(&pts);
    n.dot(&(centroid(&pts) - hull.centroid())) > 0.0
}

fn initial_simplex(points: &[DVector<f64>], scale: f64) -> Option<Vec<usize>> {
    let d = points[0].len();
    let tol = SPAN_EPS * scale;
    let start = (0..points.len()).min_by(|&a, &b| {
        points[a][0]
            .partial_cmp(&points[b][0])
            .unwrap_or(Ordering::Equal)
    })?;
    let mut chosen = vec![start];
    let mut basis: Vec<DVector<f64>> = Vec::with_capacity(d);
    while basis.len() < d {
        let mut best: Option<(f64, usize, DVector<f64>)> = None;
        for (i, p) in points.iter().enumerate() {
            let r = residual(&(p - &points[start]), &basis);
            let norm = r.norm();
            if best.as_ref().map_or(true, |(n, _, _)| norm > *n) {
                best = Some((norm, i, r));
            }
        }
        let (norm, i, r) = best?;
        if norm <= tol {
            return None;
        }
        basis.push(r / norm);
        chosen.push(i);
    }
    Some(chosen)
}

fn make_facet(ctx: &Ctx<'_>, vertices: Vec<usize>) -> Option<WorkFacet> {
    let pts: Vec<DVector<f64>> = vertices.iter().map(|&v| ctx.points[v].clone()).collect();
    let n = oriented_normal(&pts);
    let norm = n.norm();
    if !norm.is_finite() || norm <= ctx.normal_floor {
        return None;
    }
    let mut normal = n / norm;
    let mut offset = normal.dot(&pts[0]);
    if normal.dot(&ctx.interior) > offset {
        normal = -normal;
        offset = -offset;
    }
    Some(WorkFacet {
        vertices,
        normal,
        offset,
        outside: Vec::new(),
        alive: true,
    })
}

fn assign_outside(facets: &mut [WorkFacet], from: usize, idx: usize, ctx: &Ctx<'_>) {
    let p = &ctx.points[idx];
    for f in facets[from..].iter_mut() {
        if f.alive && f.distance(p) > ctx.eps {
            f.outside.push(idx);
            return;
        }
    }
}

fn furthest_outside(facet: &WorkFacet, points: &[DVector<f64>]) -> usize {
    let mut best = facet.outside[0];
    let mut best_d = facet.distance(&points[best]);
    for &i in &facet.outside[1..] {
        let dist = facet.distance(&points[i]);
        if dist > best_d {
            best = i;
            best_d = dist;
        }
    }
    best
}

/// Ridges that border exactly one visible facet, in first-seen order.
fn horizon_ridges(facets: &[WorkFacet], visible: &[usize]) -> Vec<Vec<usize>> {
    let mut count: HashMap<Vec<usize>, usize> = HashMap::new();
    let mut order: Vec<Vec<usize>> = Vec::new();
    for &k in visible {
        let verts = &facets[k].vertices;
        for skip in 0..verts.len() {
            let mut ridge: Vec<usize> = verts
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != skip)
                .map(|(_, &v)| v)
                .collect();
            ridge.sort_unstable();
            let c = count.entry(ridge.clone()).or_insert(0);
            if *c == 0 {
                order.push(ridge);
            }
            *c += 1;
        }
    }
    order.into_iter().filter(|r| count.get(r) == Some(&1)).collect()
}
