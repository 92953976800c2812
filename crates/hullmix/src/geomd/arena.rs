//! Deduplication of points on a fixed quantization grid.
//!
//! Points are keyed by their rounded integer coordinates (`round(x · grid)`),
//! never by raw floats. The arena stores one representative per key (the
//! first point seen, unsnapped) and an inverse index mapping every input to
//! its entry.

use std::collections::HashMap;

use nalgebra::DVector;

use super::util::quantize;

#[derive(Clone, Debug)]
pub struct QuantizedArena {
    grid: f64,
    keys: HashMap<Vec<i64>, usize>,
    /// First point seen for each grid cell.
    pub entries: Vec<DVector<f64>>,
    /// `inverse[i]` is the entry of the i-th inserted point.
    pub inverse: Vec<usize>,
}

impl QuantizedArena {
    pub fn new(grid: f64) -> Self {
        Self {
            grid,
            keys: HashMap::new(),
            entries: Vec::new(),
            inverse: Vec::new(),
        }
    }

    /// Build from a point list in one go.
    pub fn from_points<'a, I>(grid: f64, points: I) -> Self
    where
        I: IntoIterator<Item = &'a DVector<f64>>,
    {
        let mut arena = Self::new(grid);
        for p in points {
            arena.insert(p);
        }
        arena
    }

    /// Insert `p`, returning its entry index.
    pub fn insert(&mut self, p: &DVector<f64>) -> usize {
        let key = quantize(p, self.grid);
        let next = self.entries.len();
        let idx = *self.keys.entry(key).or_insert(next);
        if idx == next {
            self.entries.push(p.clone());
        }
        self.inverse.push(idx);
        idx
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
