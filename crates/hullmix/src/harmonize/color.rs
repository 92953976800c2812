//! sRGB <-> CIE LCh(ab) under D65, via `palette`.

use nalgebra::Vector3;
use palette::{white_point::D65, FromColor, Lab, Srgb};

type PLch = palette::Lch<D65, f64>;

/// Hue-chroma form of a Lab color; `h` in degrees, `[0, 360)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lch {
    pub l: f64,
    pub c: f64,
    pub h: f64,
}

impl Lch {
    /// From gamma-encoded sRGB in [0, 1].
    pub fn from_rgb(rgb: &Vector3<f64>) -> Self {
        let linear = Srgb::new(rgb.x, rgb.y, rgb.z).into_linear::<f64>();
        let lch = PLch::from_color(linear);
        Self {
            l: lch.l,
            c: lch.chroma,
            h: lch.hue.into_positive_degrees(),
        }
    }

    /// Back to sRGB; out-of-gamut colors are clamped into [0, 1].
    pub fn to_rgb(self) -> Vector3<f64> {
        let lch = PLch::new(self.l, self.c, self.h);
        let srgb = Srgb::<f64>::from_linear(palette::LinSrgb::from_color(lch));
        Vector3::new(srgb.red, srgb.green, srgb.blue)
    }

    /// `(L, a, b)`.
    pub fn lab(self) -> Vector3<f64> {
        let lab = Lab::<D65, f64>::from_color(PLch::new(self.l, self.c, self.h));
        Vector3::new(lab.l, lab.a, lab.b)
    }
}

/// Smallest angle between two hues in degrees, in [0, 180].
pub fn hue_distance(a: f64, b: f64) -> f64 {
    let d = (a - b).abs().rem_euclid(360.0);
    if d > 180.0 {
        360.0 - d
    } else {
        d
    }
}
