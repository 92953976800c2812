//! Orthonormal frame of a cloud's affine span.
//!
//! A 2×2 image lifted to RGBXY has four points in R^5; no 5D hull exists, but
//! the points are a perfectly good tetrahedron inside their 3D span. Projecting
//! onto the span keeps distances (and hence Delaunay structure and barycentric
//! coordinates) intact.

use nalgebra::DVector;

use super::util::{residual, scale_of};
use crate::cfg::SPAN_EPS;

#[derive(Clone, Debug)]
pub struct AffineFrame {
    pub origin: DVector<f64>,
    /// Orthonormal directions spanning the cloud, greedily by largest residual.
    pub basis: Vec<DVector<f64>>,
}

impl AffineFrame {
    /// Fit the frame; `points` must be non-empty.
    pub fn fit(points: &[DVector<f64>]) -> Self {
        let origin = points[0].clone();
        let dim = origin.len();
        let tol = SPAN_EPS * scale_of(points);
        let mut basis: Vec<DVector<f64>> = Vec::with_capacity(dim);
        while basis.len() < dim {
            let mut best: Option<(f64, DVector<f64>)> = None;
            for p in points {
                let r = residual(&(p - &origin), &basis);
                let norm = r.norm();
                if best.as_ref().map_or(true, |(n, _)| norm > *n) {
                    best = Some((norm, r));
                }
            }
            match best {
                Some((norm, r)) if norm > tol => basis.push(r / norm),
                _ => break,
            }
        }
        Self { origin, basis }
    }

    /// Intrinsic dimension of the span.
    #[inline]
    pub fn rank(&self) -> usize {
        self.basis.len()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.rank() == self.origin.len()
    }

    /// Coordinates of `p` in the frame (length `rank()`).
    pub fn project(&self, p: &DVector<f64>) -> DVector<f64> {
        let rel = p - &self.origin;
        DVector::from_iterator(self.basis.len(), self.basis.iter().map(|b| b.dot(&rel)))
    }

    pub fn project_all(&self, points: &[DVector<f64>]) -> Vec<DVector<f64>> {
        points.iter().map(|p| self.project(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::dvector;

    #[test]
    fn planar_points_in_3d_have_rank_two() {
        let pts = vec![
            dvector![0.0, 0.0, 1.0],
            dvector![1.0, 0.0, 1.0],
            dvector![0.0, 1.0, 1.0],
            dvector![1.0, 1.0, 1.0],
        ];
        let frame = AffineFrame::fit(&pts);
        assert_eq!(frame.rank(), 2);
        assert!(!frame.is_full());
    }

    #[test]
    fn projection_preserves_distances() {
        let pts = vec![
            dvector![1.0, 0.0, 0.0, 0.0, 0.0],
            dvector![0.0, 1.0, 0.0, 0.5, 0.0],
            dvector![0.0, 0.0, 1.0, 0.0, 0.5],
            dvector![1.0, 1.0, 1.0, 0.5, 0.5],
        ];
        let frame = AffineFrame::fit(&pts);
        assert_eq!(frame.rank(), 3);
        let proj = frame.project_all(&pts);
        for i in 0..pts.len() {
            for j in 0..pts.len() {
                let a = (&pts[i] - &pts[j]).norm();
                let b = (&proj[i] - &proj[j]).norm();
                assert!((a - b).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn single_point_has_rank_zero() {
        let pts = vec![dvector![0.2, 0.3, 0.4]; 3];
        assert_eq!(AffineFrame::fit(&pts).rank(), 0);
    }
}
