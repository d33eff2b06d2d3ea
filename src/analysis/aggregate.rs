use super::AnalysisError;
use ndarray::{Array2, Array3, ArrayView1, Axis, Zip};
use rayon::prelude::*;

/// The pipeline fixes time to the last axis of the (lat, lon, time) layout.
pub const TIME_AXIS: usize = 2;

fn check_time_axis(axis: usize) -> Result<(), AnalysisError> {
    if axis != TIME_AXIS {
        return Err(AnalysisError::ShapeMismatch {
            context: "time axis",
            expected: TIME_AXIS,
            actual: axis,
        });
    }
    Ok(())
}

/// Mean over the finite values of a window, NaN when it has none.
/// Accumulates in f64 so sums over ~1e8 f32 elements keep their precision.
fn finite_mean<'a, I>(values: I) -> f64
where
    I: IntoIterator<Item = &'a f32>,
{
    let mut sum = 0.0f64;
    let mut n = 0usize;
    for &v in values {
        if v.is_finite() {
            sum += v as f64;
            n += 1;
        }
    }
    if n == 0 {
        f64::NAN
    } else {
        sum / n as f64
    }
}

/// Population standard deviation over the finite values of one lane.
fn finite_std(lane: ArrayView1<'_, f32>) -> f64 {
    let mean = finite_mean(lane.iter());
    if !mean.is_finite() {
        return f64::NAN;
    }
    let mut sum_sq = 0.0f64;
    let mut n = 0usize;
    for &v in lane.iter() {
        if v.is_finite() {
            let d = v as f64 - mean;
            sum_sq += d * d;
            n += 1;
        }
    }
    (sum_sq / n as f64).sqrt()
}

/// Spatial mean per time step: one scalar for each index along the time
/// axis, length `D2`.
///
/// Each step is reduced sequentially left-to-right in f64; only the steps
/// themselves are distributed across threads, so the result is identical to
/// a fully sequential pass.
pub fn temporal_series(volume: &Array3<f32>, time_axis: usize) -> Result<Vec<f64>, AnalysisError> {
    check_time_axis(time_axis)?;
    Ok(volume
        .axis_iter(Axis(TIME_AXIS))
        .into_par_iter()
        .map(|step| finite_mean(step.iter()))
        .collect())
}

/// Temporal mean per spatial cell, shape `(D0, D1)`.
pub fn spatial_map(volume: &Array3<f32>, time_axis: usize) -> Result<Array2<f64>, AnalysisError> {
    check_time_axis(time_axis)?;
    Ok(Zip::from(volume.lanes(Axis(TIME_AXIS))).par_map_collect(|lane| finite_mean(lane.iter())))
}

/// Population standard deviation over time per spatial cell, showing
/// where the field actually varies.
pub fn variability_map(
    volume: &Array3<f32>,
    time_axis: usize,
) -> Result<Array2<f64>, AnalysisError> {
    check_time_axis(time_axis)?;
    Ok(Zip::from(volume.lanes(Axis(TIME_AXIS))).par_map_collect(finite_std))
}

/// Deviation of one time slice from the temporal mean map.
pub fn anomaly_map(
    volume: &Array3<f32>,
    mean_map: &Array2<f64>,
    step: usize,
) -> Result<Array2<f64>, AnalysisError> {
    let steps = volume.len_of(Axis(TIME_AXIS));
    if step >= steps {
        return Err(AnalysisError::ShapeMismatch {
            context: "time step index",
            expected: steps,
            actual: step,
        });
    }
    let slice = volume.index_axis(Axis(TIME_AXIS), step);
    Ok(Zip::from(slice).and(mean_map).map_collect(|&v, &m| {
        if v.is_finite() {
            v as f64 - m
        } else {
            f64::NAN
        }
    }))
}

/// Per-phase means of the series under an assumed cycle length (12 for
/// monthly data). Phase `k` averages samples `k, k + period, k + 2*period`,
/// and so on. Index arithmetic only, no calendar semantics.
///
/// Returns `None` when the period is zero or the series is shorter than one
/// full cycle.
pub fn seasonal_cycle(series: &[f64], period: usize) -> Option<Vec<f64>> {
    if period == 0 || series.len() < period {
        return None;
    }
    Some(
        (0..period)
            .map(|phase| {
                let mut sum = 0.0f64;
                let mut n = 0usize;
                for &v in series.iter().skip(phase).step_by(period) {
                    if v.is_finite() {
                        sum += v;
                        n += 1;
                    }
                }
                if n == 0 {
                    f64::NAN
                } else {
                    sum / n as f64
                }
            })
            .collect(),
    )
}
