//! Small dense linear programs for the edge-collapse subproblem.
//!
//! Problem form: minimize `c · x` subject to `A x >= b`, `x` free.
//!
//! `DenseSimplex` is a textbook two-phase tableau simplex with Bland's rule
//! (no cycling). Free variables are split as `x = x⁺ − x⁻`, each row gets a
//! surplus and an artificial column. Problems here have at most a handful of
//! variables and a few dozen constraints.

use std::fmt;

use nalgebra::{DMatrix, DVector};

/// Non-optimal LP outcomes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LpError {
    Infeasible,
    Unbounded,
    IterationLimit,
    /// `A`, `b` and `c` disagree in shape.
    Shape,
}

impl fmt::Display for LpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LpError::Infeasible => write!(f, "linear program is infeasible"),
            LpError::Unbounded => write!(f, "linear program is unbounded"),
            LpError::IterationLimit => write!(f, "simplex pivot limit reached"),
            LpError::Shape => write!(f, "inconsistent linear program dimensions"),
        }
    }
}

impl std::error::Error for LpError {}

/// Minimizer for `c · x` s.t. `A x >= b`. Implementations must be reentrant.
pub trait LinearProgram {
    fn minimize(
        &self,
        c: &DVector<f64>,
        a: &DMatrix<f64>,
        b: &DVector<f64>,
    ) -> Result<DVector<f64>, LpError>;
}

#[derive(Clone, Copy, Debug)]
pub struct DenseSimplex {
    /// Pivot / reduced-cost tolerance.
    pub eps: f64,
    /// Phase-1 residual tolerance, relative to `1 + Σ|b|`.
    pub feas_eps: f64,
    pub max_pivots: usize,
}

impl Default for DenseSimplex {
    fn default() -> Self {
        Self {
            eps: 1e-11,
            feas_eps: 1e-9,
            max_pivots: 5_000,
        }
    }
}

struct Tableau {
    t: DMatrix<f64>,
    basis: Vec<usize>,
    rows: usize,
    rhs: usize,
}

impl Tableau {
    fn pivot(&mut self, row: usize, col: usize) {
        let p = self.t[(row, col)];
        for j in 0..=self.rhs {
            self.t[(row, j)] /= p;
        }
        for r in 0..=self.rows {
            if r == row {
                continue;
            }
            let f = self.t[(r, col)];
            if f == 0.0 {
                continue;
            }
            for j in 0..=self.rhs {
                let v = self.t[(row, j)];
                self.t[(r, j)] -= f * v;
            }
        }
        self.basis[row] = col;
    }

    /// Run simplex iterations on the objective row; only columns `< allowed` may enter.
    fn run(&mut self, allowed: usize, eps: f64, max_pivots: usize) -> Result<(), LpError> {
        let obj = self.rows;
        for _ in 0..max_pivots {
            let Some(col) = (0..allowed).find(|&j| self.t[(obj, j)] < -eps) else {
                return Ok(());
            };
            let mut leave: Option<(f64, usize)> = None;
            for r in 0..self.rows {
                let a = self.t[(r, col)];
                if a <= eps {
                    continue;
                }
                let ratio = self.t[(r, self.rhs)] / a;
                let better = match leave {
                    None => true,
                    Some((best, br)) => {
                        ratio < best - eps
                            || (ratio <= best + eps && self.basis[r] < self.basis[br])
                    }
                };
                if better {
                    leave = Some((ratio, r));
                }
            }
            let Some((_, row)) = leave else {
                return Err(LpError::Unbounded);
            };
            self.pivot(row, col);
        }
        Err(LpError::IterationLimit)
    }
}

impl LinearProgram for DenseSimplex {
    fn minimize(
        &self,
        c: &DVector<f64>,
        a: &DMatrix<f64>,
        b: &DVector<f64>,
    ) -> Result<DVector<f64>, LpError> {
        let (m, d) = a.shape();
        if c.len() != d || b.len() != m || d == 0 {
            return Err(LpError::Shape);
        }
        // Columns: x⁺ [0,d) | x⁻ [d,2d) | surplus [2d,2d+m) | artificial [2d+m,2d+2m) | rhs
        let n_real = 2 * d + m;
        let rhs = n_real + m;
        let mut t = DMatrix::zeros(m + 1, rhs + 1);
        for i in 0..m {
            let sign = if b[i] < 0.0 { -1.0 } else { 1.0 };
            for j in 0..d {
                t[(i, j)] = sign * a[(i, j)];
                t[(i, d + j)] = -sign * a[(i, j)];
            }
            t[(i, 2 * d + i)] = -sign;
            t[(i, n_real + i)] = 1.0;
            t[(i, rhs)] = sign * b[i];
        }
        // Phase 1: minimize the sum of artificials.
        for j in 0..n_real {
            t[(m, j)] = -(0..m).map(|i| t[(i, j)]).sum::<f64>();
        }
        t[(m, rhs)] = -(0..m).map(|i| t[(i, rhs)]).sum::<f64>();
        let mut tab = Tableau {
            t,
            basis: (n_real..n_real + m).collect(),
            rows: m,
            rhs,
        };
        tab.run(n_real, self.eps, self.max_pivots)?;
        let residual = -tab.t[(m, rhs)];
        if residual > self.feas_eps * (1.0 + b.iter().map(|v| v.abs()).sum::<f64>()) {
            return Err(LpError::Infeasible);
        }
        // Drive remaining (zero-valued) artificials out of the basis.
        for i in 0..m {
            if tab.basis[i] < n_real {
                continue;
            }
            if let Some(j) = (0..n_real).find(|&j| tab.t[(i, j)].abs() > self.eps) {
                tab.pivot(i, j);
            }
        }
        // Phase 2 objective row from the real costs.
        let cost = |j: usize| -> f64 {
            if j < d {
                c[j]
            } else if j < 2 * d {
                -c[j - d]
            } else {
                0.0
            }
        };
        for j in 0..=rhs {
            let base = if j < n_real { cost(j) } else { 0.0 };
            let reduced: f64 = (0..m).map(|i| cost(tab.basis[i]) * tab.t[(i, j)]).sum();
            tab.t[(m, j)] = base - reduced;
        }
        tab.run(n_real, self.eps, self.max_pivots)?;

        let mut z = DVector::zeros(n_real);
        for i in 0..m {
            if tab.basis[i] < n_real {
                z[tab.basis[i]] = tab.t[(i, rhs)];
            }
        }
        Ok(DVector::from_fn(d, |j, _| z[j] - z[d + j]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{dmatrix, dvector};

    #[test]
    fn box_corner_minimum() {
        // min x + y  s.t.  x >= 1, y >= 2, -x >= -5, -y >= -5
        let a = dmatrix![1.0, 0.0; 0.0, 1.0; -1.0, 0.0; 0.0, -1.0];
        let b = dvector![1.0, 2.0, -5.0, -5.0];
        let c = dvector![1.0, 1.0];
        let x = DenseSimplex::default().minimize(&c, &a, &b).unwrap();
        assert!((x - dvector![1.0, 2.0]).norm() < 1e-9);
    }

    #[test]
    fn free_variables_go_negative() {
        // min x  s.t.  x >= -3
        let x = DenseSimplex::default()
            .minimize(&dvector![1.0], &dmatrix![1.0], &dvector![-3.0])
            .unwrap();
        assert!((x[0] + 3.0).abs() < 1e-9);
    }

    #[test]
    fn apex_above_a_roof() {
        // Two roof planes meeting along the y axis; the apex minimizes the summed normals.
        let s = 1.0 / 2f64.sqrt();
        let a = dmatrix![
            s, 0.0, s;
            -s, 0.0, s;
            0.0, 1.0, 0.0;
            0.0, -1.0, 0.0
        ];
        let b = dvector![s, s, -1.0, -1.0];
        let c = dvector![0.0, 0.0, 2.0 * s];
        let x = DenseSimplex::default().minimize(&c, &a, &b).unwrap();
        assert!(x[0].abs() < 1e-9);
        assert!((x[2] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn detects_infeasible() {
        // x >= 1 and -x >= 0
        let r = DenseSimplex::default().minimize(&dvector![1.0], &dmatrix![1.0; -1.0], &dvector![1.0, 0.0]);
        assert_eq!(r, Err(LpError::Infeasible));
    }

    #[test]
    fn detects_unbounded() {
        // min -x  s.t.  x >= 0
        let r = DenseSimplex::default().minimize(&dvector![-1.0], &dmatrix![1.0], &dvector![0.0]);
        assert_eq!(r, Err(LpError::Unbounded));
    }

    #[test]
    fn rejects_shape_mismatch() {
        let r = DenseSimplex::default().minimize(&dvector![1.0, 1.0], &dmatrix![1.0], &dvector![0.0]);
        assert_eq!(r, Err(LpError::Shape));
    }
}
