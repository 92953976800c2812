//! Delaunay triangulation by paraboloid lifting, used purely for point location.
//!
//! The lower hull of `(p, |p|²)` in R^{d+1} projects to the Delaunay
//! triangulation of `p`. When every point is co-spherical the lifted set is
//! flat; we then fall back to a fan from the first hull vertex, which is still
//! a valid triangulation of the convex hull.

use nalgebra::{DMatrix, DVector};

use super::hull::compute_hull;
use super::util::{centroid, scale_of};
use crate::cfg::{LOWER_EPS, SINGULAR_EPS};
use crate::error::GeomError;

/// One d-simplex with its barycentric transform.
///
/// For `x`, `c = inv · (x − anchor)` gives the first d coordinates and the
/// last is `1 − Σc` (anchor is the last vertex).
#[derive(Clone, Debug)]
pub struct Simplex {
    pub vertices: Vec<usize>,
    inv: DMatrix<f64>,
    anchor: DVector<f64>,
}

impl Simplex {
    pub(crate) fn new(vertices: Vec<usize>, points: &[DVector<f64>]) -> Option<Self> {
        let d = points[0].len();
        let anchor = points[vertices[d]].clone();
        let m = DMatrix::from_fn(d, d, |r, c| points[vertices[c]][r] - anchor[r]);
        let scale = scale_of(&vertices.iter().map(|&v| points[v].clone()).collect::<Vec<_>>());
        if m.determinant().abs() <= SINGULAR_EPS * scale.powi(d as i32) {
            return None;
        }
        let inv = m.try_inverse()?;
        Some(Self {
            vertices,
            inv,
            anchor,
        })
    }

    /// Barycentric coordinates of `x`, aligned with `vertices`.
    pub fn barycentric(&self, x: &DVector<f64>) -> Vec<f64> {
        let c = &self.inv * (x - &self.anchor);
        let mut out: Vec<f64> = c.iter().copied().collect();
        out.push(1.0 - c.sum());
        out
    }
}

/// How the triangulation was obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriangulationKind {
    Delaunay,
    Fan,
    SingleSimplex,
}

#[derive(Clone, Debug)]
pub struct Triangulation {
    pub dim: usize,
    pub kind: TriangulationKind,
    pub simplices: Vec<Simplex>,
}

impl Triangulation {
    /// Triangulate a full-dimensional vertex set.
    ///
    /// Exactly d+1 vertices form a single simplex; if its barycentric system
    /// is singular the call fails with `GeomError::SingularSystem`.
    pub fn build(points: &[DVector<f64>]) -> Result<Self, GeomError> {
        let d = points
            .first()
            .map(|p| p.len())
            .ok_or_else(|| GeomError::degenerate("no vertices to triangulate"))?;
        if points.len() < d + 1 {
            return Err(GeomError::degenerate(format!(
                "need at least {} vertices to triangulate R^{d}",
                d + 1
            )));
        }
        if points.len() == d + 1 {
            // A lone simplex has no neighbor to fall back on.
            let simplex = Simplex::new((0..=d).collect(), points).ok_or_else(|| {
                GeomError::SingularSystem {
                    simplex: (0..=d).collect(),
                }
            })?;
            return Ok(Self {
                dim: d,
                kind: TriangulationKind::SingleSimplex,
                simplices: vec![simplex],
            });
        }
        match lifted_simplices(points) {
            Ok(simplices) if !simplices.is_empty() => Ok(Self {
                dim: d,
                kind: TriangulationKind::Delaunay,
                simplices,
            }),
            _ => {
                tracing::debug!(vertices = points.len(), "lifted hull degenerate; using fan");
                Ok(Self {
                    dim: d,
                    kind: TriangulationKind::Fan,
                    simplices: fan_simplices(points)?,
                })
            }
        }
    }

    /// First simplex whose barycentric coordinates are all `>= -tol`.
    pub fn locate(&self, x: &DVector<f64>, tol: f64) -> Option<(usize, Vec<f64>)> {
        self.simplices.iter().enumerate().find_map(|(k, s)| {
            let bary = s.barycentric(x);
            bary.iter().all(|&b| b >= -tol).then_some((k, bary))
        })
    }
}

fn lifted_simplices(points: &[DVector<f64>]) -> Result<Vec<Simplex>, GeomError> {
    let d = points[0].len();
    // Centering and scaling keeps |p|² comparable to the coordinates.
    let center = centroid(points);
    let radius = points
        .iter()
        .map(|p| (p - &center).norm())
        .fold(0.0_f64, f64::max)
        .max(f64::MIN_POSITIVE);
    let lifted: Vec<DVector<f64>> = points
        .iter()
        .map(|p| {
            let q = (p - &center) / radius;
            let h = q.norm_squared();
            DVector::from_iterator(d + 1, q.iter().copied().chain(std::iter::once(h)))
        })
        .collect();
    let hull = compute_hull(&lifted)?;
    let mut out = Vec::new();
    for f in &hull.facets {
        if f.normal[d] >= -LOWER_EPS {
            continue;
        }
        let verts: Vec<usize> = f.vertices.iter().map(|&l| hull.source[l]).collect();
        match Simplex::new(verts, points) {
            Some(s) => out.push(s),
            None => tracing::trace!(facet = ?f.vertices, "skipping flat Delaunay simplex"),
        }
    }
    Ok(out)
}

fn fan_simplices(points: &[DVector<f64>]) -> Result<Vec<Simplex>, GeomError> {
    let hull = compute_hull(points)?;
    let apex = 0;
    let mut out = Vec::new();
    for f in &hull.facets {
        if f.contains_vertex(apex) {
            continue;
        }
        let mut verts = vec![hull.source[apex]];
        verts.extend(f.vertices.iter().map(|&l| hull.source[l]));
        if let Some(s) = Simplex::new(verts, points) {
            out.push(s);
        }
    }
    if out.is_empty() {
        return Err(GeomError::degenerate("fan triangulation produced no simplices"));
    }
    Ok(out)
}
