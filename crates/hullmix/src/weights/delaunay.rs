use nalgebra::DVector;
use tracing::{debug, warn};

use super::{check_dims, BarycentricSolver, WeightMatrix};
use crate::cfg::{LOCATE_EPS, NORMALIZE_EPS};
use crate::error::GeomError;
use crate::geomd::{AffineFrame, Triangulation};

/// Delaunay point location over the vertex set.
///
/// Vertices whose affine span is lower-dimensional are first projected onto
/// their span (queries too). A query outside every simplex gets weight 1 on
/// its nearest vertex.
#[derive(Clone, Copy, Debug)]
pub struct DelaunayBarycentric {
    pub tol: f64,
}

impl Default for DelaunayBarycentric {
    fn default() -> Self {
        Self { tol: LOCATE_EPS }
    }
}

fn nearest(q: &DVector<f64>, vertices: &[DVector<f64>]) -> usize {
    let mut best = 0;
    let mut best_d = f64::INFINITY;
    for (i, v) in vertices.iter().enumerate() {
        let d = (q - v).norm_squared();
        if d < best_d {
            best = i;
            best_d = d;
        }
    }
    best
}

impl BarycentricSolver for DelaunayBarycentric {
    fn solve(
        &self,
        vertices: &[DVector<f64>],
        queries: &[DVector<f64>],
    ) -> Result<WeightMatrix, GeomError> {
        check_dims(vertices, queries)?;
        let mut out = WeightMatrix::with_capacity(vertices.len(), queries.len());
        let frame = AffineFrame::fit(vertices);
        if frame.rank() == 0 {
            for _ in queries {
                out.push_row(vec![(0, 1.0)]);
            }
            return Ok(out);
        }
        let (verts, qs) = if frame.is_full() {
            (vertices.to_vec(), queries.to_vec())
        } else {
            debug!(rank = frame.rank(), dim = vertices[0].len(), "projecting onto affine span");
            (frame.project_all(vertices), frame.project_all(queries))
        };
        let tri = Triangulation::build(&verts)?;
        let mut snapped = 0usize;
        let mut unstable = 0usize;
        for q in &qs {
            let Some((k, bary)) = tri.locate(q, self.tol) else {
                snapped += 1;
                out.push_row(vec![(nearest(q, &verts), 1.0)]);
                continue;
            };
            let sum: f64 = bary.iter().sum();
            let denom = if sum.abs() < NORMALIZE_EPS {
                unstable += 1;
                1.0
            } else {
                sum
            };
            out.push_row(
                tri.simplices[k]
                    .vertices
                    .iter()
                    .zip(&bary)
                    .map(|(&v, &b)| (v, b / denom))
                    .collect(),
            );
        }
        if snapped > 0 {
            warn!(snapped, queries = qs.len(), "queries outside triangulation snapped to nearest vertex");
        }
        if unstable > 0 {
            warn!(rows = unstable, "near-zero barycentric sums left unnormalized");
        }
        Ok(out)
    }
}
