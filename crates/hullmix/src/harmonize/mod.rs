//! Hue-template palette harmonization in LCh space.
//!
//! Colors are converted sRGB -> linear -> XYZ -> Lab -> LCh (D65) with the
//! `palette` crate.
//!
//! A template is a set of hue axes placed by one angle `alpha` (and, for the
//! split templates, a spread `alpha2` in [-30, 30)). Fitting is brute force
//! over whole degrees, minimizing the mean over colors of
//! `L * C * (hue distance to the nearest axis)`. Harmonizing snaps every hue
//! onto its nearest axis and keeps lightness and chroma.
//!
//! Ties keep the first parameters in scan order (`alpha` ascending, then
//! `alpha2` ascending).

mod color;

pub use color::{hue_distance, Lch};

use nalgebra::Vector3;
use tracing::debug;

use crate::decompose::Palette;
use crate::error::GeomError;

const SPREAD_RANGE: std::ops::Range<i32> = -30..30;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HueTemplate {
    Monochromatic,
    Complementary,
    Triadic,
    Square,
    Analogous,
    Split,
    DoubleSplit,
}

impl HueTemplate {
    pub const ALL: [HueTemplate; 7] = [
        HueTemplate::Monochromatic,
        HueTemplate::Complementary,
        HueTemplate::Triadic,
        HueTemplate::Square,
        HueTemplate::Analogous,
        HueTemplate::Split,
        HueTemplate::DoubleSplit,
    ];

    pub fn name(self) -> &'static str {
        match self {
            HueTemplate::Monochromatic => "monochromatic",
            HueTemplate::Complementary => "complementary",
            HueTemplate::Triadic => "triadic",
            HueTemplate::Square => "square",
            HueTemplate::Analogous => "analogous",
            HueTemplate::Split => "split",
            HueTemplate::DoubleSplit => "double-split",
        }
    }

    /// Whether the template has a second (spread) parameter.
    pub fn has_spread(self) -> bool {
        matches!(self, HueTemplate::Split | HueTemplate::DoubleSplit)
    }

    /// Hue axes in [0, 360). `alpha2` is ignored by one-parameter templates.
    pub fn axes(self, alpha: f64, alpha2: f64) -> Vec<f64> {
        let offsets: Vec<f64> = match self {
            HueTemplate::Monochromatic => vec![0.0],
            HueTemplate::Complementary => vec![0.0, 180.0],
            HueTemplate::Triadic => vec![0.0, 120.0, 240.0],
            HueTemplate::Square => vec![0.0, 90.0, 180.0, 270.0],
            HueTemplate::Analogous => vec![-30.0, 0.0, 30.0],
            HueTemplate::Split => vec![0.0, 180.0 - alpha2, 180.0 + alpha2],
            HueTemplate::DoubleSplit => vec![0.0, alpha2, 180.0, 180.0 + alpha2],
        };
        offsets
            .into_iter()
            .map(|o| (alpha + o).rem_euclid(360.0))
            .collect()
    }
}

/// Best placement of one template for a palette.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TemplateFit {
    pub template: HueTemplate,
    pub alpha: i32,
    /// Spread; zero for one-parameter templates.
    pub alpha2: i32,
    /// Mean `L * C * angle` over the palette.
    pub distance: f64,
}

impl TemplateFit {
    pub fn axes(&self) -> Vec<f64> {
        self.template.axes(self.alpha as f64, self.alpha2 as f64)
    }

    /// `1 / (1 + distance)`; 1 for a palette already on the template.
    pub fn optimality(&self) -> f64 {
        1.0 / (1.0 + self.distance)
    }
}

#[derive(Clone, Debug)]
pub struct Harmonization {
    pub fit: TemplateFit,
    /// Input colors with snapped hues.
    pub lch: Vec<Lch>,
    /// `lch` back in sRGB, clamped into the unit cube.
    pub palette: Palette,
}

fn nearest_axis(h: f64, axes: &[f64]) -> f64 {
    let mut best = axes[0];
    for &ax in &axes[1..] {
        if hue_distance(h, ax) < hue_distance(h, best) {
            best = ax;
        }
    }
    best
}

/// Mean of `L * C * angle to the nearest axis`.
pub fn template_distance(colors: &[Lch], axes: &[f64]) -> f64 {
    if colors.is_empty() || axes.is_empty() {
        return 0.0;
    }
    let total: f64 = colors
        .iter()
        .map(|c| c.l * c.c * hue_distance(c.h, nearest_axis(c.h, axes)))
        .sum();
    total / colors.len() as f64
}

/// Exhaustive search over whole-degree `alpha` (and `alpha2` for split templates).
pub fn fit_template(colors: &[Lch], template: HueTemplate) -> TemplateFit {
    let spreads: Vec<i32> = if template.has_spread() {
        SPREAD_RANGE.collect()
    } else {
        vec![0]
    };
    let mut best = TemplateFit {
        template,
        alpha: 0,
        alpha2: 0,
        distance: f64::INFINITY,
    };
    for alpha in 0..360 {
        for &alpha2 in &spreads {
            let distance = template_distance(colors, &template.axes(alpha as f64, alpha2 as f64));
            if distance < best.distance {
                best = TemplateFit {
                    template,
                    alpha,
                    alpha2,
                    distance,
                };
            }
        }
    }
    best
}

/// Move every hue onto its nearest axis.
pub fn snap_hues(colors: &[Lch], axes: &[f64]) -> Vec<Lch> {
    colors
        .iter()
        .map(|c| Lch {
            h: if axes.is_empty() { c.h } else { nearest_axis(c.h, axes) },
            ..*c
        })
        .collect()
}

/// Fit `template` to an sRGB palette and snap its hues.
pub fn harmonize(palette: &Palette, template: HueTemplate) -> Result<Harmonization, GeomError> {
    let colors: Vec<Lch> = palette.colors().iter().map(Lch::from_rgb).collect();
    let fit = fit_template(&colors, template);
    let lch = snap_hues(&colors, &fit.axes());
    let rgb: Vec<Vector3<f64>> = lch.iter().map(|c| c.to_rgb()).collect();
    debug!(
        template = template.name(),
        alpha = fit.alpha,
        alpha2 = fit.alpha2,
        distance = fit.distance,
        "fitted hue template"
    );
    Ok(Harmonization {
        fit,
        lch,
        palette: Palette::new(rgb)?,
    })
}

/// One harmonization per template, in `HueTemplate::ALL` order.
pub fn harmonize_all(palette: &Palette) -> Result<Vec<Harmonization>, GeomError> {
    HueTemplate::ALL
        .iter()
        .map(|&t| harmonize(palette, t))
        .collect()
}
