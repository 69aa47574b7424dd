//! Tuning parameters for the analyzer.

use crate::models::types::{LocatorError, Result};
use crate::models::Position;

/// Default number of published results kept in history
pub const DEFAULT_RESULT_HISTORY_CAPACITY: usize = 10;

/// Default number of samples (current + preceding) in distance averages
pub const DEFAULT_SMOOTHING_WINDOW: usize = 3;

/// Default speed (m/s) below which a route must be within twice the accuracy
pub const DEFAULT_ON_ROUTE_SPEED_CUTOFF: f64 = 5.0;

/// Default radius (m) beyond which POIs are not considered at all
pub const DEFAULT_SEARCH_RADIUS_M: f64 = 100.0;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AnalyzerConfig {
    /// Published results kept for stabilization and inspection
    pub result_history_capacity: usize,
    /// Samples per averaged distance, including the current one
    pub smoothing_window: usize,
    /// Meters per second
    pub on_route_speed_cutoff: f64,
    pub search_radius_m: f64,
    /// Prefer previously guessed POIs that are still candidates
    pub stabilize: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            result_history_capacity: DEFAULT_RESULT_HISTORY_CAPACITY,
            smoothing_window: DEFAULT_SMOOTHING_WINDOW,
            on_route_speed_cutoff: DEFAULT_ON_ROUTE_SPEED_CUTOFF,
            search_radius_m: DEFAULT_SEARCH_RADIUS_M,
            stabilize: true,
        }
    }
}

impl AnalyzerConfig {
    pub fn with_result_history_capacity(mut self, capacity: usize) -> Self {
        self.result_history_capacity = capacity;
        self
    }

    pub fn with_smoothing_window(mut self, window: usize) -> Self {
        self.smoothing_window = window;
        self
    }

    pub fn with_on_route_speed_cutoff(mut self, cutoff: f64) -> Self {
        self.on_route_speed_cutoff = cutoff;
        self
    }

    pub fn with_search_radius(mut self, radius_m: f64) -> Self {
        self.search_radius_m = radius_m;
        self
    }

    pub fn with_stabilization(mut self, stabilize: bool) -> Self {
        self.stabilize = stabilize;
        self
    }

    /// Preceding raw snapshots needed for the averaging window
    pub fn snapshot_capacity(&self) -> usize {
        self.smoothing_window.saturating_sub(1)
    }

    /// Whether a route `distance_m` away can be the route `position` is on.
    /// Below the speed cutoff the route must lie within twice the accuracy.
    pub fn admits_route(&self, position: &Position, distance_m: f64) -> bool {
        position.speed >= self.on_route_speed_cutoff || distance_m <= 2.0 * position.accuracy
    }

    pub fn validate(&self) -> Result<()> {
        if self.result_history_capacity == 0 {
            return Err(LocatorError::InvalidConfig(
                "result history capacity must be at least 1".into(),
            ));
        }
        if self.smoothing_window == 0 {
            return Err(LocatorError::InvalidConfig(
                "smoothing window must be at least 1".into(),
            ));
        }
        if !self.on_route_speed_cutoff.is_finite() || self.on_route_speed_cutoff < 0.0 {
            return Err(LocatorError::InvalidConfig(format!(
                "on-route speed cutoff must be a non-negative number, got {}",
                self.on_route_speed_cutoff
            )));
        }
        if !self.search_radius_m.is_finite() || self.search_radius_m <= 0.0 {
            return Err(LocatorError::InvalidConfig(format!(
                "search radius must be a positive number of meters, got {}",
                self.search_radius_m
            )));
        }
        Ok(())
    }
}
