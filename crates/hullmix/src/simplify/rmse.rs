//! Coverage error of a point cloud against a (simplified) hull.
//!
//! A point inside the hull is represented exactly (error 0); a point outside
//! is charged its distance to the nearest hull vertex. This over-estimates the
//! true distance to the hull surface, which keeps the gate conservative.

use std::collections::BTreeMap;

use nalgebra::DVector;

use crate::cfg::HULL_EPS;
use crate::geomd::util::scale_of;
use crate::geomd::{compute_hull, ConvexHull};

fn nearest_vertex_sq(p: &DVector<f64>, vertices: &[DVector<f64>]) -> f64 {
    vertices
        .iter()
        .map(|v| (p - v).norm_squared())
        .fold(f64::INFINITY, f64::min)
}

fn coverage_sq(p: &DVector<f64>, hull: Option<&ConvexHull>, vertices: &[DVector<f64>], eps: f64) -> f64 {
    match hull {
        Some(h) if h.contains(p, eps) => 0.0,
        _ => nearest_vertex_sq(p, vertices),
    }
}

/// Root-mean-square coverage error of `points` against `hull`.
pub fn coverage_rmse(points: &[DVector<f64>], hull: &ConvexHull) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    let eps = HULL_EPS * scale_of(&hull.points);
    let sum: f64 = points
        .iter()
        .map(|p| coverage_sq(p, Some(hull), &hull.points, eps))
        .sum();
    (sum / points.len() as f64).sqrt()
}

/// Histogram of a cloud over the unit cube: non-empty bin centers and counts.
#[derive(Clone, Debug)]
pub struct BinnedCloud {
    pub centers: Vec<DVector<f64>>,
    pub weights: Vec<f64>,
}

impl BinnedCloud {
    /// `bins` equal bins per axis on [0, 1]; the last bin is closed on the
    /// right and points outside the cube are ignored.
    pub fn new(points: &[DVector<f64>], bins: usize) -> Self {
        let bins = bins.max(1);
        let mut counts: BTreeMap<Vec<usize>, f64> = BTreeMap::new();
        for p in points {
            if !p.iter().all(|&x| (0.0..=1.0).contains(&x)) {
                continue;
            }
            let key: Vec<usize> = p
                .iter()
                .map(|&x| ((x * bins as f64) as usize).min(bins - 1))
                .collect();
            *counts.entry(key).or_insert(0.0) += 1.0;
        }
        let width = 1.0 / bins as f64;
        let mut centers = Vec::with_capacity(counts.len());
        let mut weights = Vec::with_capacity(counts.len());
        for (key, w) in counts {
            centers.push(DVector::from_iterator(
                key.len(),
                key.iter().map(|&k| (k as f64 + 0.5) * width),
            ));
            weights.push(w);
        }
        Self { centers, weights }
    }

    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    /// Count-weighted coverage RMSE of the bin centers against the hull of
    /// `vertices`. A degenerate vertex set covers nothing.
    pub fn rmse(&self, vertices: &[DVector<f64>]) -> f64 {
        let total: f64 = self.weights.iter().sum();
        if total <= 0.0 || vertices.is_empty() {
            return 0.0;
        }
        let hull = compute_hull(vertices).ok();
        let eps = HULL_EPS * scale_of(vertices);
        let sum: f64 = self
            .centers
            .iter()
            .zip(&self.weights)
            .map(|(c, w)| w * coverage_sq(c, hull.as_ref(), vertices, eps))
            .sum();
        (sum / total).sqrt()
    }
}
