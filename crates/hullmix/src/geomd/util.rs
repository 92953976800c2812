//! Small utilities: centroids, scale, generalized cross products and quantization.

use nalgebra::{DMatrix, DVector};

pub(crate) fn centroid(points: &[DVector<f64>]) -> DVector<f64> {
    let dim = points.first().map_or(0, |p| p.len());
    let mut acc = DVector::zeros(dim);
    for p in points {
        acc += p;
    }
    if points.is_empty() {
        acc
    } else {
        acc / points.len() as f64
    }
}

/// Bounding-box diagonal, floored at 1 so tolerances never vanish on tiny clouds.
pub(crate) fn scale_of(points: &[DVector<f64>]) -> f64 {
    let Some(first) = points.first() else {
        return 1.0;
    };
    let mut lo = first.clone();
    let mut hi = first.clone();
    for p in points {
        for k in 0..p.len() {
            lo[k] = lo[k].min(p[k]);
            hi[k] = hi[k].max(p[k]);
        }
    }
    (hi - lo).norm().max(1.0)
}

/// Oriented normal of the (d-1)-simplex `pts` (d points in R^d), unnormalized.
///
/// With rows `a_i = p_i - p_0`, `n_k = (-1)^k det(A without column k)`, so
/// `n · y = ±det[a_1; …; a_{d-1}; y]`. In 3D this is `(p1-p0) × (p2-p0)`.
/// Swapping two vertices flips the sign.
pub(crate) fn oriented_normal(pts: &[DVector<f64>]) -> DVector<f64> {
    let d = pts[0].len();
    debug_assert_eq!(pts.len(), d);
    if d == 1 {
        return DVector::from_element(1, 1.0);
    }
    let a = DMatrix::from_fn(d - 1, d, |r, c| pts[r + 1][c] - pts[0][c]);
    let mut n = DVector::zeros(d);
    for k in 0..d {
        let minor = a.clone().remove_column(k);
        let det = minor.determinant();
        n[k] = if k % 2 == 0 { det } else { -det };
    }
    n
}

/// Unsigned volume of the d-simplex with `d + 1` vertices.
#[cfg(test)]
pub(crate) fn simplex_volume(pts: &[DVector<f64>]) -> f64 {
    let d = pts[0].len();
    let m = DMatrix::from_fn(d, d, |r, c| pts[r + 1][c] - pts[0][c]);
    m.determinant().abs() / factorial(d)
}

pub(crate) fn factorial(n: usize) -> f64 {
    (1..=n).map(|k| k as f64).product()
}

/// Component of `v` orthogonal to the orthonormal `basis`.
pub(crate) fn residual(v: &DVector<f64>, basis: &[DVector<f64>]) -> DVector<f64> {
    let mut r = v.clone();
    for b in basis {
        let t = b.dot(&r);
        r -= b * t;
    }
    r
}

/// Integer grid key for a color, so deduplication never hashes raw floats.
pub(crate) fn quantize(v: &DVector<f64>, grid: f64) -> Vec<i64> {
    v.iter().map(|x| (x * grid).round() as i64).collect()
}
