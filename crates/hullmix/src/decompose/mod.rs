//! Image decomposition into palette weight layers.
//!
//! Purpose
//! - Re-express every pixel as a convex blend of an externally supplied
//!   palette and report how well the blend reconstructs the image.
//!
//! Pipeline
//! 1. Lift pixels to RGBXY `(r, g, b, x/W, y/H)`.
//! 2. Hull of the RGBXY cloud (inside its affine span when the image is
//!    degenerate, e.g. 2×2); hull colors are the RGB of the hull pixels.
//! 3. Spatial weights: Delaunay barycentrics of every pixel over the hull
//!    pixels.
//! 4. Color weights: star (default) or ASAP barycentrics of the hull colors
//!    over the palette.
//! 5. Compose, normalize each row (a zero row keeps denominator 1), clip to
//!    [0, 1].
//! 6. Reconstruction = Σ weight · color; one layer per palette color.
//! 7. RMSE / max / median Euclidean error on the 0–255 scale.
//!
//! Assumptions and conventions
//! - Pixels and layers are row-major, x = column, y = row.

mod image;
mod pipeline;
mod stats;

pub use image::{ImageBuffer, Palette, WeightLayer};
pub use pipeline::{extract_palette, run_pipeline, Diagnostics, PipelineCfg, PipelineOutput};
pub use stats::reconstruction_stats;

use nalgebra::{DVector, Vector3};
use tracing::{debug, info, warn};

use crate::cfg::NORMALIZE_EPS;
use crate::error::GeomError;
use crate::geomd::{compute_hull, AffineFrame};
use crate::progress::{ErrorStats, NullSink, ProgressSink};
use crate::weights::{AsapWeights, BarycentricSolver, DelaunayBarycentric, StarBarycentric, WeightMatrix};

/// How hull colors are expressed over the palette.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorWeighting {
    /// Star fan from the darkest color; never fails.
    #[default]
    Star,
    /// Strict face partition; fails on unassigned colors.
    Asap,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DecomposeCfg {
    pub color_weighting: ColorWeighting,
}

#[derive(Clone, Debug)]
pub struct Decomposition {
    /// One layer per palette color, in palette order.
    pub layers: Vec<WeightLayer>,
    pub reconstruction: ImageBuffer,
    /// Pixel indices of the RGBXY hull vertices.
    pub hull_pixels: Vec<usize>,
    pub stats: ErrorStats,
}

impl Decomposition {
    /// Weights of one pixel across all layers.
    pub fn pixel_weights(&self, pixel: usize) -> Vec<f64> {
        self.layers.iter().map(|l| l.weights[pixel]).collect()
    }
}

pub fn decompose(image: &ImageBuffer, palette: &Palette, cfg: &DecomposeCfg) -> Result<Decomposition, GeomError> {
    decompose_with(image, palette, cfg, &mut NullSink)
}

/// Hull vertices of the RGBXY cloud as pixel indices.
fn rgbxy_hull(points: &[DVector<f64>]) -> Result<Vec<usize>, GeomError> {
    let frame = AffineFrame::fit(points);
    match frame.rank() {
        0 => Ok(vec![0]),
        r if r == points[0].len() => Ok(compute_hull(points)?.source),
        r => {
            debug!(rank = r, "RGBXY cloud is flat; hulling inside its span");
            Ok(compute_hull(&frame.project_all(points))?.source)
        }
    }
}

fn color_weights(
    cfg: &DecomposeCfg,
    palette: &[DVector<f64>],
    hull_colors: &[DVector<f64>],
) -> Result<WeightMatrix, GeomError> {
    match cfg.color_weighting {
        ColorWeighting::Star => StarBarycentric::default().solve(palette, hull_colors),
        ColorWeighting::Asap => AsapWeights::default().solve(palette, hull_colors),
    }
}

/// Normalize a dense row in place; returns false if the sum was near zero.
pub(crate) fn normalize_row(row: &mut [f64]) -> bool {
    let sum: f64 = row.iter().sum();
    let stable = sum.abs() >= NORMALIZE_EPS;
    let denom = if stable { sum } else { 1.0 };
    for w in row.iter_mut() {
        *w = (*w / denom).clamp(0.0, 1.0);
    }
    stable
}

pub fn decompose_with<S>(
    image: &ImageBuffer,
    palette: &Palette,
    cfg: &DecomposeCfg,
    sink: &mut S,
) -> Result<Decomposition, GeomError>
where
    S: ProgressSink + ?Sized,
{
    let rgbxy = image.rgbxy_points();
    let hull_pixels = rgbxy_hull(&rgbxy)?;
    let hull_points: Vec<DVector<f64>> = hull_pixels.iter().map(|&i| rgbxy[i].clone()).collect();
    let hull_colors: Vec<DVector<f64>> = hull_pixels
        .iter()
        .map(|&i| DVector::from_column_slice(image.pixels()[i].as_slice()))
        .collect();
    info!(
        pixels = image.len(),
        hull_vertices = hull_pixels.len(),
        palette = palette.len(),
        "decomposing image"
    );

    let spatial = DelaunayBarycentric::default().solve(&hull_points, &rgbxy)?;
    let color = color_weights(cfg, &palette.points(), &hull_colors)?;
    let mixed = spatial.compose(&color)?;

    let k = palette.len();
    let mut layers: Vec<WeightLayer> = palette
        .colors()
        .iter()
        .map(|&c| WeightLayer {
            color: c,
            weights: Vec::with_capacity(image.len()),
        })
        .collect();
    let mut recon = Vec::with_capacity(image.len());
    let mut unstable = 0usize;
    for i in 0..mixed.n_rows() {
        let mut row = mixed.dense_row(i);
        debug_assert_eq!(row.len(), k);
        if !normalize_row(&mut row) {
            unstable += 1;
        }
        let mut px = Vector3::zeros();
        for (layer, &w) in layers.iter_mut().zip(&row) {
            layer.weights.push(w);
            px += layer.color * w;
        }
        recon.push(px);
    }
    if unstable > 0 {
        warn!(rows = unstable, "near-zero weight sums; substituted denominator 1");
    }

    let stats = reconstruction_stats(image.pixels(), &recon);
    sink.reconstruction(&stats);
    info!(
        rmse = stats.rmse,
        max_error = stats.max_error,
        median_error = stats.median_error,
        "reconstruction error (0-255)"
    );
    Ok(Decomposition {
        layers,
        reconstruction: ImageBuffer::new(image.width(), image.height(), recon)?,
        hull_pixels,
        stats,
    })
}

#[cfg(test)]
mod tests;
