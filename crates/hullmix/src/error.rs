//! Error values shared by the hull, weighting and decomposition modules.
//!
//! Per-edge and per-simplex failures never surface here: they are logged and the
//! element is skipped. Only failures that leave the caller without a usable
//! result become a `GeomError`.

use std::fmt;

/// Errors surfaced by the geometry core.
#[derive(Clone, Debug, PartialEq)]
pub enum GeomError {
    /// Caller-supplied data or configuration is malformed.
    InvalidInput { reason: String },
    /// No full-dimensional hull exists (e.g. all points coplanar in 3D).
    DegenerateGeometry { reason: String },
    /// A local barycentric system could not be inverted and no fallback applies.
    SingularSystem { simplex: Vec<usize> },
    /// Strict (ASAP) weighting left colors outside every face tetrahedron.
    UnassignedPoints { count: usize },
    /// Two inputs disagree on the ambient dimension.
    DimensionMismatch { expected: usize, found: usize },
}

impl GeomError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    pub(crate) fn degenerate(reason: impl Into<String>) -> Self {
        Self::DegenerateGeometry {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for GeomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput { reason } => write!(f, "invalid input: {reason}"),
            Self::DegenerateGeometry { reason } => write!(f, "degenerate geometry: {reason}"),
            Self::SingularSystem { simplex } => {
                write!(f, "singular barycentric system for simplex {simplex:?}")
            }
            Self::UnassignedPoints { count } => {
                write!(f, "{count} colors could not be assigned to any palette face")
            }
            Self::DimensionMismatch { expected, found } => {
                write!(f, "dimension mismatch: expected {expected}, found {found}")
            }
        }
    }
}

impl std::error::Error for GeomError {}
