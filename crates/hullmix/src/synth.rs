//! Seeded synthetic inputs for tests, benches and the CLI demo.
//!
//! Model
//! - Clouds: i.i.d. uniform points in the unit cube.
//! - Images: every palette color gets a random anchor in the image plane; a
//!   pixel's blend weights fall off with squared distance to the anchors
//!   (Gaussian bumps), plus a little uniform noise, and are normalized. The
//!   image is therefore an exact convex blend of its palette.
//!
//! Determinism uses a `(seed, index)` token mixed into a single `StdRng`, so
//! the k-th draw of a sweep can be replayed on its own.

use nalgebra::{DVector, Vector2, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::decompose::{ImageBuffer, Palette};
use crate::error::GeomError;
use crate::geomd::PointCloud;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayToken {
    pub seed: u64,
    pub index: u64,
}

impl ReplayToken {
    pub fn new(seed: u64, index: u64) -> Self {
        Self { seed, index }
    }

    fn rng(self) -> StdRng {
        // SplitMix64 finalizer.
        fn mix(mut x: u64) -> u64 {
            x ^= x >> 30;
            x = x.wrapping_mul(0xbf58476d1ce4e5b9);
            x ^= x >> 27;
            x = x.wrapping_mul(0x94d049bb133111eb);
            x ^ (x >> 31)
        }
        StdRng::seed_from_u64(mix(self.seed ^ mix(self.index.wrapping_add(0x9e3779b97f4a7c15))))
    }
}

/// `n` uniform points in [0, 1]^dim.
pub fn uniform_cloud(n: usize, dim: usize, tok: ReplayToken) -> Result<PointCloud, GeomError> {
    let mut rng = tok.rng();
    PointCloud::new(
        (0..n)
            .map(|_| DVector::from_fn(dim, |_, _| rng.gen::<f64>()))
            .collect(),
    )
}

/// Random palette of `k` colors in the unit cube.
pub fn random_palette(k: usize, tok: ReplayToken) -> Result<Palette, GeomError> {
    let mut rng = tok.rng();
    Palette::new(
        (0..k)
            .map(|_| Vector3::new(rng.gen(), rng.gen(), rng.gen()))
            .collect(),
    )
}

#[derive(Clone, Copy, Debug)]
pub struct BlendCfg {
    pub width: usize,
    pub height: usize,
    /// Bump radius relative to the image diagonal.
    pub spread: f64,
    /// Uniform weight noise amplitude before normalization.
    pub noise: f64,
}

impl Default for BlendCfg {
    fn default() -> Self {
        Self {
            width: 32,
            height: 24,
            spread: 0.35,
            noise: 0.05,
        }
    }
}

/// Image whose pixels are convex blends of `palette`.
pub fn blend_image(palette: &Palette, cfg: BlendCfg, tok: ReplayToken) -> Result<ImageBuffer, GeomError> {
    let mut rng = tok.rng();
    let anchors: Vec<Vector2<f64>> = (0..palette.len())
        .map(|_| Vector2::new(rng.gen(), rng.gen()))
        .collect();
    let sigma2 = cfg.spread.max(1e-3).powi(2);
    let noise = cfg.noise.max(0.0);
    let (w, h) = (cfg.width.max(1) as f64, cfg.height.max(1) as f64);
    ImageBuffer::from_fn(cfg.width, cfg.height, |x, y| {
        let uv = Vector2::new((x as f64 + 0.5) / w, (y as f64 + 0.5) / h);
        let raw: Vec<f64> = anchors
            .iter()
            .map(|a| (-(uv - a).norm_squared() / sigma2).exp() + noise * rng.gen::<f64>())
            .collect();
        let total: f64 = raw.iter().sum();
        palette
            .colors()
            .iter()
            .zip(&raw)
            .fold(Vector3::zeros(), |acc, (c, &r)| acc + c * (r / total))
    })
}
