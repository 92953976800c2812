//! Pixel grids, palettes and weight layers.

use nalgebra::{DVector, Vector3};

use crate::error::GeomError;

/// Row-major RGB image with channels in [0, 1].
#[derive(Clone, Debug, PartialEq)]
pub struct ImageBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Vector3<f64>>,
}

impl ImageBuffer {
    pub fn new(width: usize, height: usize, pixels: Vec<Vector3<f64>>) -> Result<Self, GeomError> {
        if width == 0 || height == 0 {
            return Err(GeomError::invalid("image must have at least one pixel"));
        }
        if pixels.len() != width * height {
            return Err(GeomError::invalid(format!(
                "expected {}x{} = {} pixels, got {}",
                width,
                height,
                width * height,
                pixels.len()
            )));
        }
        if !pixels.iter().all(|p| p.iter().all(|c| c.is_finite())) {
            return Err(GeomError::invalid("image contains non-finite channels"));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build from `f(x, y)`, x = column, y = row.
    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> Result<Self, GeomError>
    where
        F: FnMut(usize, usize) -> Vector3<f64>,
    {
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self::new(width, height, pixels)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }
    #[inline]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }
    #[inline]
    pub fn pixels(&self) -> &[Vector3<f64>] {
        &self.pixels
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Vector3<f64> {
        self.pixels[y * self.width + x]
    }

    /// Colors as 3D points, row-major.
    pub fn color_points(&self) -> Vec<DVector<f64>> {
        self.pixels
            .iter()
            .map(|p| DVector::from_column_slice(p.as_slice()))
            .collect()
    }

    /// Lift every pixel to `(r, g, b, x / W, y / H)`.
    pub fn rgbxy_points(&self) -> Vec<DVector<f64>> {
        let (w, h) = (self.width as f64, self.height as f64);
        self.pixels
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let (x, y) = (i % self.width, i / self.width);
                DVector::from_row_slice(&[p.x, p.y, p.z, x as f64 / w, y as f64 / h])
            })
            .collect()
    }
}

/// Ordered list of RGB colors.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    colors: Vec<Vector3<f64>>,
}

impl Palette {
    pub fn new(colors: Vec<Vector3<f64>>) -> Result<Self, GeomError> {
        if colors.is_empty() {
            return Err(GeomError::invalid("palette is empty"));
        }
        if !colors.iter().all(|c| c.iter().all(|v| v.is_finite())) {
            return Err(GeomError::invalid("palette contains non-finite channels"));
        }
        Ok(Self { colors })
    }

    pub fn from_rows(rows: &[[f64; 3]]) -> Result<Self, GeomError> {
        Self::new(rows.iter().map(|r| Vector3::new(r[0], r[1], r[2])).collect())
    }

    /// Palette from 3D points (e.g. simplified hull vertices).
    pub fn from_points(points: &[DVector<f64>]) -> Result<Self, GeomError> {
        let mut colors = Vec::with_capacity(points.len());
        for p in points {
            if p.len() != 3 {
                return Err(GeomError::DimensionMismatch {
                    expected: 3,
                    found: p.len(),
                });
            }
            colors.push(Vector3::new(p[0], p[1], p[2]));
        }
        Self::new(colors)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
    #[inline]
    pub fn colors(&self) -> &[Vector3<f64>] {
        &self.colors
    }

    pub fn points(&self) -> Vec<DVector<f64>> {
        self.colors
            .iter()
            .map(|c| DVector::from_column_slice(c.as_slice()))
            .collect()
    }
}

/// Per-pixel weights of one palette color, row-major like the source image.
#[derive(Clone, Debug)]
pub struct WeightLayer {
    pub color: Vector3<f64>,
    pub weights: Vec<f64>,
}

impl WeightLayer {
    /// The layer as an image: `weight · color` per pixel.
    pub fn render(&self) -> Vec<Vector3<f64>> {
        self.weights.iter().map(|&w| self.color * w).collect()
    }
}
