//! Tolerance defaults (internal).
//!
//! Policy
//! - Fixed constants, shared by every module, so call sites never juggle their
//!   own epsilons. Distances are relative to the bounding-box diagonal of the
//!   cloud at hand (see `geomd::util::scale_of`) unless stated otherwise.

/// Relative distance above which a point counts as strictly outside a facet.
pub(crate) const HULL_EPS: f64 = 1e-10;
/// Relative residual below which a direction is considered inside the affine span.
pub(crate) const SPAN_EPS: f64 = 1e-9;
/// Singular-value cutoff on incident unit facet normals; below it a hull
/// vertex lies on a flat boundary region and is not extreme.
pub(crate) const EXTREME_EPS: f64 = 1e-9;
/// Collapses adding less than this (relative to scale^d) whose apex coincides
/// with an existing vertex change nothing and are rejected.
pub(crate) const NULL_COLLAPSE_EPS: f64 = 1e-12;
/// Lower-hull filter on the lifted normal's last coordinate (Delaunay).
pub(crate) const LOWER_EPS: f64 = 1e-12;
/// Determinant magnitude below which a local simplex system is treated as singular.
pub(crate) const SINGULAR_EPS: f64 = 1e-14;
/// Barycentric tolerance for Delaunay point location (matches a `tol=1e-6` search).
pub(crate) const LOCATE_EPS: f64 = 1e-6;
/// Barycentric tolerance for the star strategy (round-off only).
pub(crate) const STAR_EPS: f64 = 1e-9;
/// Barycentric tolerance for strict ASAP face assignment.
pub(crate) const ASAP_EPS: f64 = 1e-8;
/// Edge-normal compatibility threshold on `avg_normal · face_normal`.
pub(crate) const NORMAL_COMPAT_EPS: f64 = -1e-5;
/// Denominator magnitude below which weight normalization substitutes 1.
pub(crate) const NORMALIZE_EPS: f64 = 1e-12;
/// Quantization grid for color deduplication (1/255 units).
pub(crate) const COLOR_GRID: f64 = 255.0;
