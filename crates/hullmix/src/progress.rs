//! Progress reporting and cooperative cancellation.
//!
//! The simplifier and decomposer report intermediate state through a
//! `ProgressSink`. Every method has a no-op default so callers implement only
//! what they display. `should_cancel` is polled once per simplification
//! iteration; returning `true` makes the loop stop with the last accepted hull.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::geomd::ConvexHull;

/// Which hull a `hull` callback carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HullStage {
    Initial,
    Intermediate,
    Final,
}

/// Reconstruction error summary on the 0–255 scale.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ErrorStats {
    pub rmse: f64,
    pub max_error: f64,
    pub median_error: f64,
}

pub trait ProgressSink {
    fn hull(&mut self, _stage: HullStage, _hull: &ConvexHull) {}

    /// Called after each accepted collapse with the new vertex count.
    fn iteration(&mut self, _iteration: usize, _vertex_count: usize) {}

    fn reconstruction(&mut self, _stats: &ErrorStats) {}

    fn should_cancel(&self) -> bool {
        false
    }
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {}

/// Cancels as soon as the shared flag is raised (e.g. from another thread).
#[derive(Clone, Debug, Default)]
pub struct CancelFlag {
    flag: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }
}

impl ProgressSink for CancelFlag {
    fn should_cancel(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Records callbacks; handy in tests and for the CLI's iteration log.
#[derive(Clone, Debug, Default)]
pub struct Recorder {
    pub hull_sizes: Vec<(HullStage, usize)>,
    pub iterations: Vec<(usize, usize)>,
    pub stats: Option<ErrorStats>,
    /// Request cancellation once this many iterations were reported.
    pub cancel_after: Option<usize>,
}

impl ProgressSink for Recorder {
    fn hull(&mut self, stage: HullStage, hull: &ConvexHull) {
        self.hull_sizes.push((stage, hull.vertex_count()));
    }

    fn iteration(&mut self, iteration: usize, vertex_count: usize) {
        self.iterations.push((iteration, vertex_count));
    }

    fn reconstruction(&mut self, stats: &ErrorStats) {
        self.stats = Some(*stats);
    }

    fn should_cancel(&self) -> bool {
        self.cancel_after
            .is_some_and(|n| self.iterations.len() >= n)
    }
}
