//! Curated entry points (unstable).
//!
//! Callers such as the CLI import from here rather than reaching into module
//! internals; names may still change between versions.

// Geometry
pub use crate::geomd::{
    compute_hull, is_outward, orient_faces, AffineFrame, ConvexHull, Facet, PointCloud,
    QuantizedArena, Triangulation, TriangulationKind,
};
// LP
pub use crate::lp::{DenseSimplex, LinearProgram, LpError};
// Simplification
pub use crate::simplify::{
    collapse_candidates, coverage_rmse, edge_normal_test, prune_palette, select_best, simplify,
    simplify_with, BinnedCloud, CollapseCandidate, PruneCfg, SimplifyCfg, SimplifyReport,
    SimplifyStatus, StopReason,
};
// Weights
pub use crate::weights::{
    closest_point_on_triangle, AsapWeights, BarycentricSolver, DelaunayBarycentric,
    StarBarycentric, WeightMatrix,
};
// Decomposition
pub use crate::decompose::{
    decompose, decompose_with, extract_palette, reconstruction_stats, run_pipeline,
    ColorWeighting, DecomposeCfg, Decomposition, Diagnostics, ImageBuffer, Palette, PipelineCfg,
    PipelineOutput, WeightLayer,
};
// Harmonization
pub use crate::harmonize::{
    fit_template, harmonize, harmonize_all, snap_hues, Harmonization, HueTemplate, Lch,
    TemplateFit,
};
// Progress and synthetic data
pub use crate::progress::{CancelFlag, ErrorStats, HullStage, NullSink, ProgressSink, Recorder};
pub use crate::synth::{blend_image, random_palette, uniform_cloud, BlendCfg, ReplayToken};
pub use crate::error::GeomError;
