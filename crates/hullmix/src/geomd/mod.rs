//! d-dimensional convex geometry (hulls, affine frames, Delaunay point location).
//!
//! Purpose
//! - Provide the hull extractor used for color clouds (d = 3), RGBXY clouds
//!   (d = 5) and lifted Delaunay construction (d + 1).
//! - Keep points as `nalgebra::DVector<f64>` so one implementation serves every
//!   dimension; the sizes involved (d ≤ 6) make dynamic storage cheap enough.
//!
//! Assumptions and conventions
//! - Supporting hyperplanes are stored as unit `normal` and `offset` with
//!   `normal · x <= offset` for hull points (outward normal).
//! - Facets are simplices of exactly d local vertex indices. Orientation of the
//!   vertex order is normalized by `orient_faces` after every construction.
//! - Tolerances are relative to the bounding-box diagonal (see `crate::cfg`).
//! - Hulls are always recomputed wholesale; there is no incremental update API.

mod arena;
pub mod delaunay;
pub mod frame;
pub mod hull;
mod types;
pub(crate) mod util;

pub use arena::QuantizedArena;
pub use delaunay::{Simplex, Triangulation, TriangulationKind};
pub use frame::AffineFrame;
pub use hull::{compute_hull, is_outward, orient_faces};
pub use types::{ConvexHull, Facet, PointCloud};

#[cfg(test)]
mod tests;
