//! Hull simplification by least-volume edge collapses.
//!
//! Purpose
//! - Reduce the convex hull of a color (or RGBXY) cloud to a small palette
//!   that still encloses the cloud, adding as little volume as possible.
//!
//! Loop
//! - Each iteration enumerates all hull edges, solves one small LP per edge
//!   (see `collapse`), applies the globally cheapest collapse by appending its
//!   apex to the vertex set, and recomputes the hull from scratch.
//! - Stops on: target reached, iteration cap, stagnation (vertex count
//!   unchanged), minimal simplex (d+1 vertices), the optional coverage-RMSE
//!   gate, an empty candidate set, cancellation or a failed rehull. The last
//!   three report `SimplifyStatus::Incomplete`; the returned hull is always the
//!   last accepted one.
//!
//! Assumptions and conventions
//! - Vertex order: surviving vertices keep their relative order and a new apex
//!   is appended, so the output is deterministic for a given input order.
//! - Collapses only grow the hull, so coverage can only be lost by the final
//!   clamp into the unit cube; the RMSE gate therefore measures the clamped
//!   palette. It does not roll back: the hull that crossed the tolerance is
//!   the one returned.

mod collapse;
mod prune;
mod rmse;

pub use collapse::{collapse_candidate, collapse_candidates, edge_normal_test, select_best, CollapseCandidate};
pub use prune::{prune_palette, PruneCfg};
pub use rmse::{coverage_rmse, BinnedCloud};

use nalgebra::DVector;
use tracing::{debug, info, warn};

use crate::error::GeomError;
use crate::geomd::{compute_hull, ConvexHull, PointCloud};
use crate::lp::{DenseSimplex, LinearProgram};
use crate::progress::{HullStage, NullSink, ProgressSink};

#[derive(Clone, Copy, Debug)]
pub struct SimplifyCfg {
    pub target_vertex_count: usize,
    pub max_iterations: usize,
    /// Stop once the cloud's coverage RMSE exceeds this (e.g. 4/255).
    pub rmse_tolerance: Option<f64>,
    /// Clamp the final vertices into [0, 1]^d and rehull if anything moved.
    pub clamp_to_unit_cube: bool,
}

impl Default for SimplifyCfg {
    fn default() -> Self {
        Self {
            target_vertex_count: 10,
            max_iterations: 500,
            rmse_tolerance: None,
            clamp_to_unit_cube: true,
        }
    }
}

impl SimplifyCfg {
    /// Validated target for dimension `d` (clamped up to d+1).
    pub fn effective_target(&self, d: usize) -> Result<usize, GeomError> {
        if let Some(tol) = self.rmse_tolerance {
            if !(tol.is_finite() && tol > 0.0) {
                return Err(GeomError::invalid(format!(
                    "rmse_tolerance must be positive and finite, got {tol}"
                )));
            }
        }
        let floor = d + 1;
        if self.target_vertex_count < floor {
            warn!(
                requested = self.target_vertex_count,
                clamped = floor,
                "target vertex count below minimal simplex; clamping"
            );
            return Ok(floor);
        }
        Ok(self.target_vertex_count)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    TargetReached,
    IterationCap,
    Stagnation,
    MinimalSimplex,
    RmseGate,
    NoCandidates,
    Cancelled,
    RehullFailed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimplifyStatus {
    Complete,
    Incomplete,
}

impl StopReason {
    pub fn status(self) -> SimplifyStatus {
        match self {
            StopReason::NoCandidates | StopReason::Cancelled | StopReason::RehullFailed => {
                SimplifyStatus::Incomplete
            }
            _ => SimplifyStatus::Complete,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SimplifyReport {
    pub hull: ConvexHull,
    /// Accepted collapses.
    pub iterations: usize,
    pub stop: StopReason,
    pub status: SimplifyStatus,
    /// Coverage RMSE of the input cloud against the returned hull.
    pub rmse: f64,
}

/// Simplify with the dense simplex LP and no progress reporting.
pub fn simplify(cloud: &PointCloud, cfg: &SimplifyCfg) -> Result<SimplifyReport, GeomError> {
    simplify_with(cloud, cfg, &DenseSimplex::default(), &mut NullSink)
}

/// Full simplification loop.
///
/// Errors only when the initial hull cannot be built or `cfg` is invalid;
/// every later failure ends the loop with the last accepted hull.
pub fn simplify_with<L, S>(
    cloud: &PointCloud,
    cfg: &SimplifyCfg,
    lp: &L,
    sink: &mut S,
) -> Result<SimplifyReport, GeomError>
where
    L: LinearProgram,
    S: ProgressSink + ?Sized,
{
    let d = cloud.dim();
    let target = cfg.effective_target(d)?;
    let mut hull = compute_hull(cloud.points())?;
    sink.hull(HullStage::Initial, &hull);
    info!(
        points = cloud.len(),
        vertices = hull.vertex_count(),
        facets = hull.facets.len(),
        target,
        "initial hull"
    );

    let mut iterations = 0usize;
    let stop = loop {
        if hull.vertex_count() <= target {
            break StopReason::TargetReached;
        }
        if iterations >= cfg.max_iterations {
            break StopReason::IterationCap;
        }
        if sink.should_cancel() {
            break StopReason::Cancelled;
        }
        let previous = hull.vertex_count();
        let candidates = collapse_candidates(&hull, lp);
        let Some(best) = select_best(&candidates) else {
            warn!(iteration = iterations, "no collapsible edge");
            break StopReason::NoCandidates;
        };
        let mut next_points: Vec<DVector<f64>> = hull.points.clone();
        next_points.push(best.apex.clone());
        hull = match compute_hull(&next_points) {
            Ok(h) => h,
            Err(err) => {
                warn!(iteration = iterations, %err, "rehull after collapse failed");
                break StopReason::RehullFailed;
            }
        };
        iterations += 1;
        sink.iteration(iterations, hull.vertex_count());
        sink.hull(HullStage::Intermediate, &hull);
        debug!(
            iteration = iterations,
            edge = ?best.edge,
            cost = best.cost,
            candidates = candidates.len(),
            vertices = hull.vertex_count(),
            "collapsed edge"
        );
        if hull.vertex_count() == previous {
            break StopReason::Stagnation;
        }
        if hull.vertex_count() <= d + 1 {
            break StopReason::MinimalSimplex;
        }
        if let Some(tol) = cfg.rmse_tolerance {
            // Measure the palette that would be returned, i.e. after clamping.
            let rmse = if cfg.clamp_to_unit_cube {
                coverage_rmse(cloud.points(), &clamp_hull(hull.clone()))
            } else {
                coverage_rmse(cloud.points(), &hull)
            };
            if rmse > tol {
                debug!(rmse, tol, "coverage gate exceeded");
                break StopReason::RmseGate;
            }
        }
    };

    if cfg.clamp_to_unit_cube {
        hull = clamp_hull(hull);
    }
    let rmse = coverage_rmse(cloud.points(), &hull);
    sink.hull(HullStage::Final, &hull);
    let status = stop.status();
    info!(
        iterations,
        vertices = hull.vertex_count(),
        ?stop,
        ?status,
        rmse,
        "simplification finished"
    );
    Ok(SimplifyReport {
        hull,
        iterations,
        stop,
        status,
        rmse,
    })
}

/// Clamp vertices into the unit cube; rehull only if a coordinate moved.
fn clamp_hull(hull: ConvexHull) -> ConvexHull {
    let clamped: Vec<DVector<f64>> = hull
        .points
        .iter()
        .map(|p| p.map(|x| x.clamp(0.0, 1.0)))
        .collect();
    if clamped.iter().zip(&hull.points).all(|(a, b)| a == b) {
        return hull;
    }
    match compute_hull(&clamped) {
        Ok(h) => h,
        Err(err) => {
            warn!(%err, "clamped palette is degenerate; keeping unclamped vertices");
            hull
        }
    }
}
