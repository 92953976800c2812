//! Palette extraction and layer decomposition by convex-hull geometry.
//!
//! Modules
//! - `geomd`: d-dimensional hulls, affine frames and Delaunay point location.
//! - `lp`: the small dense LP used to place collapse apexes.
//! - `simplify`: least-volume edge-collapse hull simplification and pruning.
//! - `weights`: barycentric solvers (Delaunay, star, ASAP) over a vertex set.
//! - `decompose`: RGBXY decomposition of an image over a palette.
//! - `harmonize`: hue-template harmonization of a palette in LCh.
//! - `progress`: stage callbacks and cooperative cancellation.
//! - `synth`: seeded synthetic clouds, palettes and images.
//!
//! API Policy
//! - There is no stable public API yet; `api` and `prelude` are the curated
//!   entry points and may change with the algorithms behind them.

pub mod api;
pub(crate) mod cfg;
pub mod decompose;
pub mod error;
pub mod geomd;
pub mod harmonize;
pub mod lp;
pub mod progress;
pub mod simplify;
pub mod synth;
pub mod weights;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::GeomError;

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::decompose::{
        decompose, run_pipeline, ColorWeighting, DecomposeCfg, Decomposition, ImageBuffer, Palette,
        PipelineCfg,
    };
    pub use crate::error::GeomError;
    pub use crate::geomd::{compute_hull, ConvexHull, PointCloud};
    pub use crate::progress::{NullSink, ProgressSink};
    pub use crate::simplify::{simplify, SimplifyCfg, SimplifyReport};
    pub use crate::synth::ReplayToken;
    pub use nalgebra::{DVector, Vector3};
}
