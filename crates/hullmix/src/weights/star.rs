use nalgebra::DVector;
use tracing::{trace, warn};

use super::{check_dims, BarycentricSolver, WeightMatrix};
use crate::cfg::STAR_EPS;
use crate::error::GeomError;
use crate::geomd::{compute_hull, Simplex};

/// Star (fan) triangulation of the palette hull from a pivot color.
///
/// The pivot is the palette color nearest the origin (first on ties). Each
/// hull facet not containing the pivot spans one simplex with it; a query takes
/// the coordinates of the first simplex (facet order) containing it up to
/// `eps`. Unresolved queries, and every query of a degenerate palette, get the
/// uniform row `1/n`.
#[derive(Clone, Copy, Debug)]
pub struct StarBarycentric {
    pub eps: f64,
}

impl Default for StarBarycentric {
    fn default() -> Self {
        Self { eps: STAR_EPS }
    }
}

impl StarBarycentric {
    pub fn pivot(palette: &[DVector<f64>]) -> usize {
        let mut best = 0;
        let mut best_n = f64::INFINITY;
        for (i, c) in palette.iter().enumerate() {
            let n = c.norm();
            if n < best_n {
                best = i;
                best_n = n;
            }
        }
        best
    }

    /// Fan simplices in palette indices, pivot first.
    fn fan(palette: &[DVector<f64>], pivot: usize) -> Result<Vec<Simplex>, GeomError> {
        let hull = compute_hull(palette)?;
        let mut out = Vec::with_capacity(hull.facets.len());
        for f in &hull.facets {
            let verts: Vec<usize> = f.vertices.iter().map(|&l| hull.source[l]).collect();
            if verts.contains(&pivot) {
                continue;
            }
            let mut simplex = Vec::with_capacity(verts.len() + 1);
            simplex.push(pivot);
            simplex.extend(verts);
            match Simplex::new(simplex, palette) {
                Some(s) => out.push(s),
                None => trace!(facet = ?f.vertices, "skipping singular star simplex"),
            }
        }
        Ok(out)
    }
}

impl BarycentricSolver for StarBarycentric {
    fn solve(
        &self,
        vertices: &[DVector<f64>],
        queries: &[DVector<f64>],
    ) -> Result<WeightMatrix, GeomError> {
        check_dims(vertices, queries)?;
        let mut out = WeightMatrix::with_capacity(vertices.len(), queries.len());
        let pivot = Self::pivot(vertices);
        let simplices = match Self::fan(vertices, pivot) {
            Ok(s) => s,
            Err(err) => {
                warn!(%err, colors = vertices.len(), "degenerate palette; using uniform weights");
                for _ in queries {
                    out.push_uniform();
                }
                return Ok(out);
            }
        };
        let mut uniform = 0usize;
        for q in queries {
            let hit = simplices.iter().find_map(|s| {
                let bary = s.barycentric(q);
                bary.iter().all(|&b| b >= -self.eps).then(|| {
                    s.vertices
                        .iter()
                        .copied()
                        .zip(bary)
                        .collect::<Vec<(usize, f64)>>()
                })
            });
            match hit {
                Some(row) => out.push_row(row),
                None => {
                    uniform += 1;
                    out.push_uniform();
                }
            }
        }
        if uniform > 0 {
            warn!(rows = uniform, queries = queries.len(), "colors outside palette hull got uniform weights");
        }
        Ok(out)
    }
}
