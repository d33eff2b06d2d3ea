pub mod aggregate;
pub mod extremes;
pub mod profile;


pub use aggregate::{
    anomaly_map, seasonal_cycle, spatial_map, temporal_series, variability_map, TIME_AXIS,
};
pub use extremes::{
    detect_extremes, extreme_cell, map_extremes, series_thresholds, Direction, ExtremeEvent,
    ExtremeOptions, MapExtreme, SeriesThresholds,
};
pub use profile::{profile_volume, StatisticalSummary, PERCENTILE_POINTS};

use thiserror::Error;

/// Errors shared by the analysis stages. All of them abort the run; this is
/// a batch tool with no partial-result mode.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Input array has no elements")]
    EmptyInput,

    #[error("Shape mismatch for {context}: expected {expected}, got {actual}")]
    ShapeMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Time series is empty")]
    NoData,
}
