//! Sampling configuration and fix filtering.

use tracing::trace;

use super::fix::PositionFix;

/// Accuracy level requested from the location service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesiredAccuracy {
    /// Highest accuracy plus sensor fusion, intended for navigation.
    BestForNavigation,
    /// Highest accuracy without navigation-grade fusion.
    Best,
}

/// Sampling parameters handed to the location service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingConfig {
    /// Requested accuracy.
    pub accuracy: DesiredAccuracy,
    /// Minimum movement in meters before a new fix is reported.
    pub distance_filter_m: f64,
}

/// Filters raw platform fixes.
///
/// Drops unresolved fixes (non-positive accuracy) and fixes that moved less
/// than the configured distance filter since the last emitted fix. The first
/// valid fix is always emitted.
#[derive(Debug, Clone)]
pub struct FixFilter {
    sampling: SamplingConfig,
    last_emitted: Option<PositionFix>,
}

impl FixFilter {
    /// Create a filter with the given sampling configuration.
    pub fn new(sampling: SamplingConfig) -> Self {
        Self {
            sampling,
            last_emitted: None,
        }
    }

    /// Current sampling configuration.
    pub fn sampling(&self) -> SamplingConfig {
        self.sampling
    }

    /// Replace the sampling configuration. Applies to the next fix.
    pub fn set_sampling(&mut self, sampling: SamplingConfig) {
        self.sampling = sampling;
    }

    /// Run one raw fix through the filter.
    ///
    /// Returns the fix if it should be emitted.
    pub fn accept(&mut self, fix: PositionFix) -> Option<PositionFix> {
        if !fix.is_valid() {
            trace!(
                accuracy = fix.horizontal_accuracy_m,
                "Discarding unresolved fix"
            );
            return None;
        }

        if let Some(last) = &self.last_emitted {
            let moved = last.distance_to(&fix);
            if moved < self.sampling.distance_filter_m {
                trace!(
                    moved_m = moved,
                    filter_m = self.sampling.distance_filter_m,
                    "Fix within distance filter"
                );
                return None;
            }
        }

        self.last_emitted = Some(fix);
        Some(fix)
    }

    /// Forget the last emitted fix.
    pub fn reset(&mut self) {
        self.last_emitted = None;
    }
}
