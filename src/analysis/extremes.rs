use super::aggregate::TIME_AXIS;
use super::profile::percentile_sorted;
use super::AnalysisError;
use crate::grid::GridHypothesis;
use ndarray::{Array2, Array3, ArrayView2, Axis};

/// Whether an event sits above the high threshold or below the low one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    High,
    Low,
}

/// A located extreme: one time step, one spatial cell.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtremeEvent {
    pub time_index: usize,
    pub row: usize,
    pub col: usize,
    pub value: f32,
    pub direction: Direction,
    /// (latitude, longitude) when a grid hypothesis resolved
    pub location: Option<(f64, f64)>,
}

/// Threshold percentiles for flagging extreme time steps.
#[derive(Debug, Clone, Copy)]
pub struct ExtremeOptions {
    pub high_percentile: f64,
    pub low_percentile: f64,
}

impl Default for ExtremeOptions {
    fn default() -> Self {
        Self {
            high_percentile: 95.0,
            low_percentile: 5.0,
        }
    }
}

/// Threshold values derived from a series.
#[derive(Debug, Clone, Copy)]
pub struct SeriesThresholds {
    pub high: f64,
    pub low: f64,
}

/// Compute the flagging thresholds from the series, using the same
/// interpolated percentile definition as the profiler. Non-finite samples
/// are excluded; an all-NaN series yields NaN thresholds (and so flags
/// nothing).
pub fn series_thresholds(
    series: &[f64],
    opts: &ExtremeOptions,
) -> Result<SeriesThresholds, AnalysisError> {
    if series.is_empty() {
        return Err(AnalysisError::NoData);
    }
    let mut finite: Vec<f64> = series.iter().copied().filter(|v| v.is_finite()).collect();
    finite.sort_by(|a, b| a.total_cmp(b));
    Ok(SeriesThresholds {
        high: percentile_sorted(&finite, opts.high_percentile),
        low: percentile_sorted(&finite, opts.low_percentile),
    })
}

/// The single most extreme finite cell of a 2-D slice.
///
/// Ties go to the first cell in row-major order (axis 0 varies slowest), so
/// the result is reproducible. `None` when the slice has no finite cell.
pub fn extreme_cell(
    slice: ArrayView2<'_, f32>,
    direction: Direction,
) -> Option<(usize, usize, f32)> {
    let mut best: Option<(usize, usize, f32)> = None;
    for ((row, col), &v) in slice.indexed_iter() {
        if !v.is_finite() {
            continue;
        }
        let better = match best {
            None => true,
            Some((_, _, b)) => match direction {
                Direction::High => v > b,
                Direction::Low => v < b,
            },
        };
        if better {
            best = Some((row, col, v));
        }
    }
    best
}

/// Find extreme time steps in the series and locate the driving cell in
/// each flagged slice.
///
/// A step is flagged high when its series value is strictly above the high
/// threshold and low when strictly below the low one. Events come back in
/// ascending time order. Inputs are untouched; each call returns a fresh
/// collection.
pub fn detect_extremes(
    series: &[f64],
    volume: &Array3<f32>,
    grid: Option<&GridHypothesis>,
    opts: &ExtremeOptions,
) -> Result<Vec<ExtremeEvent>, AnalysisError> {
    let thresholds = series_thresholds(series, opts)?;
    let steps = volume.len_of(Axis(TIME_AXIS));
    if series.len() != steps {
        return Err(AnalysisError::ShapeMismatch {
            context: "series length vs time axis",
            expected: steps,
            actual: series.len(),
        });
    }

    let mut events = Vec::new();
    for (t, &value) in series.iter().enumerate() {
        if !value.is_finite() {
            continue;
        }
        if value > thresholds.high {
            push_located(&mut events, volume, t, Direction::High, grid);
        }
        if value < thresholds.low {
            push_located(&mut events, volume, t, Direction::Low, grid);
        }
    }
    Ok(events)
}

fn push_located(
    events: &mut Vec<ExtremeEvent>,
    volume: &Array3<f32>,
    t: usize,
    direction: Direction,
    grid: Option<&GridHypothesis>,
) {
    let slice = volume.index_axis(Axis(TIME_AXIS), t);
    if let Some((row, col, value)) = extreme_cell(slice, direction) {
        events.push(ExtremeEvent {
            time_index: t,
            row,
            col,
            value,
            direction,
            location: grid.map(|g| g.location_of(row, col)),
        });
    }
}

/// An extreme cell of a 2-D map (typically the temporal mean).
#[derive(Debug, Clone, PartialEq)]
pub struct MapExtreme {
    pub row: usize,
    pub col: usize,
    pub value: f64,
    pub location: Option<(f64, f64)>,
}

/// Maximum and minimum finite cells of a map, row-major tie-break.
/// `None` when the map has no finite cell.
pub fn map_extremes(
    map: &Array2<f64>,
    grid: Option<&GridHypothesis>,
) -> Option<(MapExtreme, MapExtreme)> {
    let mut max: Option<(usize, usize, f64)> = None;
    let mut min: Option<(usize, usize, f64)> = None;
    for ((row, col), &v) in map.indexed_iter() {
        if !v.is_finite() {
            continue;
        }
        if max.map_or(true, |(_, _, b)| v > b) {
            max = Some((row, col, v));
        }
        if min.map_or(true, |(_, _, b)| v < b) {
            min = Some((row, col, v));
        }
    }
    let locate = |(row, col, value): (usize, usize, f64)| MapExtreme {
        row,
        col,
        value,
        location: grid.map(|g| g.location_of(row, col)),
    };
    match (max, min) {
        (Some(hi), Some(lo)) => Some((locate(hi), locate(lo))),
        _ => None,
    }
}
