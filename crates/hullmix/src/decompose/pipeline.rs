//! End-to-end palette extraction and decomposition.
//!
//! image → unique colors (1/255 grid) → simplified hull → optional pruning →
//! palette → `decompose`.

use tracing::info;

use super::{decompose_with, DecomposeCfg, Decomposition, ImageBuffer, Palette};
use crate::cfg::COLOR_GRID;
use crate::error::GeomError;
use crate::geomd::{PointCloud, QuantizedArena};
use crate::lp::DenseSimplex;
use crate::progress::ProgressSink;
use crate::simplify::{prune_palette, simplify_with, PruneCfg, SimplifyCfg, SimplifyReport, SimplifyStatus};

#[derive(Clone, Copy, Debug, Default)]
pub struct PipelineCfg {
    pub simplify: SimplifyCfg,
    /// Greedy histogram pruning after simplification; off by default.
    pub prune: Option<PruneCfg>,
    pub decompose: DecomposeCfg,
}

/// Summary handed to callers and diagnostics sinks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Diagnostics {
    pub iteration_count: usize,
    pub final_vertex_count: usize,
    pub rmse: f64,
    pub max_error: f64,
    pub median_error: f64,
    pub status: SimplifyStatus,
}

#[derive(Clone, Debug)]
pub struct PipelineOutput {
    pub palette: Palette,
    pub simplify: SimplifyReport,
    pub decomposition: Decomposition,
    pub diagnostics: Diagnostics,
}

/// Simplified color hull of `image` as a palette.
pub fn extract_palette<S>(
    image: &ImageBuffer,
    cfg: &PipelineCfg,
    sink: &mut S,
) -> Result<(Palette, SimplifyReport), GeomError>
where
    S: ProgressSink + ?Sized,
{
    let colors = image.color_points();
    let arena = QuantizedArena::from_points(COLOR_GRID, &colors);
    info!(pixels = colors.len(), unique = arena.len(), "collected image colors");
    let cloud = PointCloud::new(arena.entries)?;
    let report = simplify_with(&cloud, &cfg.simplify, &DenseSimplex::default(), sink)?;
    let mut vertices = report.hull.points.clone();
    if let Some(prune) = &cfg.prune {
        let before = vertices.len();
        vertices = prune_palette(&colors, &vertices, prune)?;
        info!(before, after = vertices.len(), "pruned palette");
    }
    Ok((Palette::from_points(&vertices)?, report))
}

/// Extract a palette from `image`, then decompose the image over it.
pub fn run_pipeline<S>(image: &ImageBuffer, cfg: &PipelineCfg, sink: &mut S) -> Result<PipelineOutput, GeomError>
where
    S: ProgressSink + ?Sized,
{
    let (palette, report) = extract_palette(image, cfg, sink)?;
    let decomposition = decompose_with(image, &palette, &cfg.decompose, sink)?;
    let diagnostics = Diagnostics {
        iteration_count: report.iterations,
        final_vertex_count: palette.len(),
        rmse: decomposition.stats.rmse,
        max_error: decomposition.stats.max_error,
        median_error: decomposition.stats.median_error,
        status: report.status,
    };
    Ok(PipelineOutput {
        palette,
        simplify: report,
        decomposition,
        diagnostics,
    })
}
