//! Greedy palette pruning by histogram coverage.
//!
//! While more than `min_colors` remain and the current palette still covers
//! the binned cloud within `rmse_tolerance`, drop the color whose removal
//! yields the smallest binned RMSE. The removal that crosses the tolerance is
//! kept; the next round then stops.

use nalgebra::DVector;

use super::rmse::BinnedCloud;
use crate::error::GeomError;

#[derive(Clone, Copy, Debug)]
pub struct PruneCfg {
    pub min_colors: usize,
    pub bins_per_axis: usize,
    pub rmse_tolerance: f64,
}

impl Default for PruneCfg {
    fn default() -> Self {
        Self {
            min_colors: 10,
            bins_per_axis: 32,
            rmse_tolerance: 2.0 / 255.0,
        }
    }
}

impl PruneCfg {
    pub fn validate(&self) -> Result<(), GeomError> {
        if self.bins_per_axis == 0 {
            return Err(GeomError::invalid("bins_per_axis must be positive"));
        }
        if !(self.rmse_tolerance.is_finite() && self.rmse_tolerance > 0.0) {
            return Err(GeomError::invalid(format!(
                "prune rmse_tolerance must be positive and finite, got {}",
                self.rmse_tolerance
            )));
        }
        Ok(())
    }
}

/// Returns the retained palette colors in their original relative order.
pub fn prune_palette(
    cloud: &[DVector<f64>],
    palette: &[DVector<f64>],
    cfg: &PruneCfg,
) -> Result<Vec<DVector<f64>>, GeomError> {
    cfg.validate()?;
    let binned = BinnedCloud::new(cloud, cfg.bins_per_axis);
    let mut kept: Vec<DVector<f64>> = palette.to_vec();
    while kept.len() > cfg.min_colors {
        let rmse = binned.rmse(&kept);
        if rmse > cfg.rmse_tolerance {
            tracing::debug!(colors = kept.len(), rmse, "pruning stopped at tolerance");
            break;
        }
        let mut best: Option<(f64, usize)> = None;
        for i in 0..kept.len() {
            let mut trial = kept.clone();
            trial.remove(i);
            let err = binned.rmse(&trial);
            if best.map_or(true, |(e, _)| err < e) {
                best = Some((err, i));
            }
        }
        let Some((err, idx)) = best else { break };
        kept.remove(idx);
        tracing::debug!(removed = idx, remaining = kept.len(), rmse = err, "pruned palette color");
    }
    Ok(kept)
}
