//! Barycentric weight solvers.
//!
//! Purpose
//! - Express query points as convex combinations of a vertex set (hull
//!   vertices or palette colors). Three strategies share one interface:
//!   - `DelaunayBarycentric`: point location in a Delaunay triangulation of
//!     the vertices; misses snap to the nearest vertex.
//!   - `StarBarycentric`: fan of simplices from a pivot color over the palette
//!     hull; misses get uniform rows.
//!   - `AsapWeights`: strict face partition from a base color; a miss is an
//!     error (`GeomError::UnassignedPoints`).
//!
//! Assumptions and conventions
//! - Rows of a `WeightMatrix` are sparse `(column, weight)` lists in column
//!   order of discovery; every row sums to 1 within round-off.
//! - Strategies are chosen statically (generics), never by inspecting types.

mod asap;
mod delaunay;
mod star;

pub use asap::{closest_point_on_triangle, AsapWeights};
pub use delaunay::DelaunayBarycentric;
pub use star::StarBarycentric;

use nalgebra::{DMatrix, DVector};

use crate::error::GeomError;

/// Sparse row-major weights: `rows[i]` holds `(column, weight)` pairs.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightMatrix {
    cols: usize,
    rows: Vec<Vec<(usize, f64)>>,
}

impl WeightMatrix {
    pub fn new(cols: usize) -> Self {
        Self {
            cols,
            rows: Vec::new(),
        }
    }

    pub fn with_capacity(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows: Vec::with_capacity(rows),
        }
    }

    /// Append a row; entries must index columns `< cols`.
    pub fn push_row(&mut self, row: Vec<(usize, f64)>) {
        debug_assert!(row.iter().all(|&(c, _)| c < self.cols));
        self.rows.push(row);
    }

    /// Row with `1/cols` everywhere.
    pub fn push_uniform(&mut self) {
        let w = 1.0 / self.cols as f64;
        self.rows.push((0..self.cols).map(|c| (c, w)).collect());
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }
    #[inline]
    pub fn n_cols(&self) -> usize {
        self.cols
    }
    #[inline]
    pub fn row(&self, i: usize) -> &[(usize, f64)] {
        &self.rows[i]
    }

    pub fn dense_row(&self, i: usize) -> Vec<f64> {
        let mut out = vec![0.0; self.cols];
        for &(c, w) in &self.rows[i] {
            out[c] += w;
        }
        out
    }

    pub fn row_sums(&self) -> Vec<f64> {
        self.rows
            .iter()
            .map(|r| r.iter().map(|&(_, w)| w).sum())
            .collect()
    }

    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut m = DMatrix::zeros(self.rows.len(), self.cols);
        for (i, row) in self.rows.iter().enumerate() {
            for &(c, w) in row {
                m[(i, c)] += w;
            }
        }
        m
    }

    /// Matrix product `self · rhs`.
    pub fn compose(&self, rhs: &WeightMatrix) -> Result<WeightMatrix, GeomError> {
        if self.cols != rhs.n_rows() {
            return Err(GeomError::DimensionMismatch {
                expected: self.cols,
                found: rhs.n_rows(),
            });
        }
        let mut out = WeightMatrix::with_capacity(rhs.cols, self.rows.len());
        let mut acc = vec![0.0; rhs.cols];
        for row in &self.rows {
            acc.iter_mut().for_each(|a| *a = 0.0);
            for &(k, w) in row {
                for &(c, v) in rhs.row(k) {
                    acc[c] += w * v;
                }
            }
            out.push_row(
                acc.iter()
                    .enumerate()
                    .filter(|(_, &v)| v != 0.0)
                    .map(|(c, &v)| (c, v))
                    .collect(),
            );
        }
        Ok(out)
    }
}

/// Strategy interface: weights of `queries` relative to `vertices`.
///
/// The result has one row per query and one column per vertex.
pub trait BarycentricSolver {
    fn solve(
        &self,
        vertices: &[DVector<f64>],
        queries: &[DVector<f64>],
    ) -> Result<WeightMatrix, GeomError>;
}

pub(crate) fn check_dims(vertices: &[DVector<f64>], queries: &[DVector<f64>]) -> Result<usize, GeomError> {
    let d = vertices
        .first()
        .map(|v| v.len())
        .ok_or_else(|| GeomError::invalid("no vertices to weight against"))?;
    for p in vertices.iter().chain(queries) {
        if p.len() != d {
            return Err(GeomError::DimensionMismatch {
                expected: d,
                found: p.len(),
            });
        }
    }
    Ok(d)
}

#[cfg(test)]
mod tests;
