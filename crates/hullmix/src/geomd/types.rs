//! Core d-dimensional types: point clouds, facets and convex hulls.

use nalgebra::DVector;

use crate::error::GeomError;

/// Ordered sequence of points in R^d (d = 3 for colors, d = 5 for RGBXY).
///
/// Invariants:
/// - Every point has exactly `dim` coordinates, all finite.
/// - Immutable once built; downstream code borrows it.
#[derive(Clone, Debug)]
pub struct PointCloud {
    dim: usize,
    points: Vec<DVector<f64>>,
}

impl PointCloud {
    /// Validate and wrap points. An empty cloud is rejected.
    pub fn new(points: Vec<DVector<f64>>) -> Result<Self, GeomError> {
        let dim = points
            .first()
            .map(|p| p.len())
            .ok_or_else(|| GeomError::invalid("point cloud is empty"))?;
        if dim == 0 {
            return Err(GeomError::invalid("points must have at least one coordinate"));
        }
        for p in &points {
            if p.len() != dim {
                return Err(GeomError::DimensionMismatch {
                    expected: dim,
                    found: p.len(),
                });
            }
            if !p.iter().all(|x| x.is_finite()) {
                return Err(GeomError::invalid("point cloud contains non-finite coordinates"));
            }
        }
        Ok(Self { dim, points })
    }

    /// Build from fixed-size rows, e.g. `&[[r, g, b]]`.
    pub fn from_rows<const D: usize>(rows: &[[f64; D]]) -> Result<Self, GeomError> {
        Self::new(rows.iter().map(|r| DVector::from_row_slice(r)).collect())
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
    #[inline]
    pub fn points(&self) -> &[DVector<f64>] {
        &self.points
    }
}

/// Oriented (d-1)-simplex on the hull boundary.
///
/// Invariants:
/// - `vertices` holds `d` distinct indices into `ConvexHull::points`.
/// - `normal` is unit length and outward: every hull point satisfies
///   `normal · x <= offset + eps`.
/// - After `orient_faces`, the determinant orientation of `vertices` agrees in
///   sign with `normal`.
#[derive(Clone, Debug)]
pub struct Facet {
    pub vertices: Vec<usize>,
    pub normal: DVector<f64>,
    pub offset: f64,
}

impl Facet {
    /// Signed distance of `p` to the supporting hyperplane (positive = outside).
    #[inline]
    pub fn signed_distance(&self, p: &DVector<f64>) -> f64 {
        self.normal.dot(p) - self.offset
    }

    #[inline]
    pub fn contains_vertex(&self, v: usize) -> bool {
        self.vertices.contains(&v)
    }
}

/// Convex hull of a point set.
///
/// Invariants:
/// - `source` and `points` are parallel: `points[i]` is the coordinate of the
///   input point `source[i]` (sorted ascending).
/// - Facet vertex indices are local (into `points`), never into the input.
#[derive(Clone, Debug)]
pub struct ConvexHull {
    pub dim: usize,
    pub source: Vec<usize>,
    pub points: Vec<DVector<f64>>,
    pub facets: Vec<Facet>,
}

impl ConvexHull {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }

    /// Vertex centroid; strictly interior for a full-dimensional hull.
    pub fn centroid(&self) -> DVector<f64> {
        super::util::centroid(&self.points)
    }

    /// Membership test against every supporting hyperplane.
    pub fn contains(&self, p: &DVector<f64>, eps: f64) -> bool {
        self.facets.iter().all(|f| f.signed_distance(p) <= eps)
    }

    /// Unique edges as sorted local-index pairs, in lexicographic order.
    pub fn edges(&self) -> Vec<(usize, usize)> {
        let mut edges = std::collections::BTreeSet::new();
        for f in &self.facets {
            for (i, &a) in f.vertices.iter().enumerate() {
                for &b in &f.vertices[i + 1..] {
                    edges.insert((a.min(b), a.max(b)));
                }
            }
        }
        edges.into_iter().collect()
    }

    /// Vertex → incident facet indices, rebuilt on demand after each rehull.
    pub fn vertex_facets(&self) -> Vec<Vec<usize>> {
        let mut adj = vec![Vec::new(); self.points.len()];
        for (fi, f) in self.facets.iter().enumerate() {
            for &v in &f.vertices {
                adj[v].push(fi);
            }
        }
        adj
    }

    /// Coordinates of a facet's vertices, in facet order.
    pub fn facet_points(&self, facet: &Facet) -> Vec<DVector<f64>> {
        facet.vertices.iter().map(|&v| self.points[v].clone()).collect()
    }
}
