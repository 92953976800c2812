//! Strict face-partitioned weights for 3D palettes.
//!
//! Pipeline
//! - Order the palette by L1 distance to black; the first color is the base.
//! - Project query colors outside the palette hull onto its surface (closest
//!   point over all facets).
//! - Deduplicate on the 1/255 grid (`QuantizedArena`).
//! - Walk the hull facets not containing the base; every still-unassigned
//!   unique color inside the tetrahedron (base, facet) takes its barycentric
//!   coordinates there.
//! - Any unique color left over fails the whole call.
//!
//! References
//! - Tan, Lien, Gingold, "Decomposing Images into Layers via RGB-Space
//!   Geometry" (2016).
//! - Ericson, "Real-Time Collision Detection", §5.1.5 (closest point on triangle).

use nalgebra::{DVector, Vector3};
use tracing::{debug, trace};

use super::{check_dims, BarycentricSolver, WeightMatrix};
use crate::cfg::{ASAP_EPS, COLOR_GRID, HULL_EPS};
use crate::error::GeomError;
use crate::geomd::util::scale_of;
use crate::geomd::{compute_hull, ConvexHull, QuantizedArena, Simplex};

#[derive(Clone, Copy, Debug)]
pub struct AsapWeights {
    pub eps: f64,
    pub grid: f64,
}

impl Default for AsapWeights {
    fn default() -> Self {
        Self {
            eps: ASAP_EPS,
            grid: COLOR_GRID,
        }
    }
}

/// Closest point to `p` on triangle `(a, b, c)`.
pub fn closest_point_on_triangle(
    p: &Vector3<f64>,
    a: &Vector3<f64>,
    b: &Vector3<f64>,
    c: &Vector3<f64>,
) -> Vector3<f64> {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;
    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return *a;
    }
    let bp = p - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return *b;
    }
    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        return a + ab * (d1 / (d1 - d3));
    }
    let cp = p - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return *c;
    }
    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        return a + ac * (d2 / (d2 - d6));
    }
    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        return b + (c - b) * ((d4 - d3) / ((d4 - d3) + (d5 - d6)));
    }
    let denom = 1.0 / (va + vb + vc);
    a + ab * (vb * denom) + ac * (vc * denom)
}

fn to_v3(p: &DVector<f64>) -> Vector3<f64> {
    Vector3::new(p[0], p[1], p[2])
}

/// Snap `q` onto the hull surface if it lies outside.
fn project_inside(q: &DVector<f64>, hull: &ConvexHull, eps: f64) -> DVector<f64> {
    if hull.contains(q, eps) {
        return q.clone();
    }
    let p = to_v3(q);
    let mut best = p;
    let mut best_d = f64::INFINITY;
    for f in &hull.facets {
        let [a, b, c] = [0, 1, 2].map(|k| to_v3(&hull.points[f.vertices[k]]));
        let x = closest_point_on_triangle(&p, &a, &b, &c);
        let d = (x - p).norm_squared();
        if d < best_d {
            best = x;
            best_d = d;
        }
    }
    DVector::from_column_slice(best.as_slice())
}

impl BarycentricSolver for AsapWeights {
    fn solve(
        &self,
        vertices: &[DVector<f64>],
        queries: &[DVector<f64>],
    ) -> Result<WeightMatrix, GeomError> {
        let d = check_dims(vertices, queries)?;
        if d != 3 {
            return Err(GeomError::DimensionMismatch {
                expected: 3,
                found: d,
            });
        }
        let mut order: Vec<usize> = (0..vertices.len()).collect();
        order.sort_by(|&a, &b| vertices[a].lp_norm(1).total_cmp(&vertices[b].lp_norm(1)));
        let ordered: Vec<DVector<f64>> = order.iter().map(|&i| vertices[i].clone()).collect();
        let hull = compute_hull(&ordered)?;
        let eps = HULL_EPS * scale_of(&ordered);

        let mut projected = 0usize;
        let arena = QuantizedArena::from_points(
            self.grid,
            &queries
                .iter()
                .map(|q| {
                    let p = project_inside(q, &hull, eps);
                    if &p != q {
                        projected += 1;
                    }
                    p
                })
                .collect::<Vec<_>>(),
        );
        debug!(
            queries = queries.len(),
            unique = arena.len(),
            projected,
            "prepared colors for face assignment"
        );

        let base = 0usize;
        let mut unique_rows: Vec<Option<Vec<(usize, f64)>>> = vec![None; arena.len()];
        let mut remaining = arena.len();
        for f in &hull.facets {
            if remaining == 0 {
                break;
            }
            let face: Vec<usize> = f.vertices.iter().map(|&l| hull.source[l]).collect();
            if face.contains(&base) {
                continue;
            }
            let mut verts = vec![base];
            verts.extend(face);
            let Some(simplex) = Simplex::new(verts, &ordered) else {
                trace!(facet = ?f.vertices, "skipping flat face tetrahedron");
                continue;
            };
            for (u, color) in arena.entries.iter().enumerate() {
                if unique_rows[u].is_some() {
                    continue;
                }
                let bary = simplex.barycentric(color);
                if bary.iter().all(|&b| b >= -self.eps) {
                    unique_rows[u] = Some(
                        simplex
                            .vertices
                            .iter()
                            .zip(&bary)
                            .map(|(&v, &b)| (order[v], b))
                            .collect(),
                    );
                    remaining -= 1;
                }
            }
        }
        if remaining > 0 {
            return Err(GeomError::UnassignedPoints { count: remaining });
        }

        let mut out = WeightMatrix::with_capacity(vertices.len(), queries.len());
        for &u in &arena.inverse {
            let row = unique_rows[u].clone().unwrap_or_default();
            out.push_row(row);
        }
        Ok(out)
    }
}
