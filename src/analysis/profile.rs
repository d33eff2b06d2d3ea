use super::AnalysisError;
use ndarray::Array3;

/// Quantile points of the percentile ladder, in percent.
pub const PERCENTILE_POINTS: [f64; 9] = [1.0, 5.0, 10.0, 25.0, 50.0, 75.0, 90.0, 95.0, 99.0];

/// Scalar description of the whole tensor, treated as an unordered multiset
/// of values.
///
/// Non-finite values are excluded from every statistic and surfaced through
/// `non_finite_count`; the same policy applies to all reductions downstream.
/// When the array holds no finite value at all, the statistics are NaN.
#[derive(Debug, Clone)]
pub struct StatisticalSummary {
    /// Total number of elements, finite or not
    pub element_count: usize,
    /// NaN and infinity count
    pub non_finite_count: usize,
    /// Exact zeros among the finite values
    pub zero_count: usize,
    /// Strictly negative finite values
    pub negative_count: usize,
    pub min: f64,
    pub max: f64,
    /// Arithmetic mean
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation
    pub std_dev: f64,
    /// (percent, value) pairs at `PERCENTILE_POINTS`, non-decreasing in value
    pub percentiles: Vec<(f64, f64)>,
}

impl StatisticalSummary {
    /// Number of finite values the statistics were computed over
    pub fn finite_count(&self) -> usize {
        self.element_count - self.non_finite_count
    }
}

/// Interpolated percentile of an ascending-sorted sample.
///
/// Uses the standard linear-interpolation definition: the value at rank
/// `p / 100 * (n - 1)`, interpolated between the two flanking order
/// statistics. An empty sample yields NaN.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let rank = p / 100.0 * (n - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            let frac = rank - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * frac
        }
    }
}

/// Profile the tensor: min, max, mean, median, population standard
/// deviation, percentile ladder, and data-quality counters.
///
/// Pure function of the array. Fails only when the array has zero elements.
pub fn profile_volume(volume: &Array3<f32>) -> Result<StatisticalSummary, AnalysisError> {
    let element_count = volume.len();
    if element_count == 0 {
        return Err(AnalysisError::EmptyInput);
    }

    let mut finite = Vec::with_capacity(element_count);
    let mut non_finite_count = 0usize;
    let mut zero_count = 0usize;
    let mut negative_count = 0usize;

    for &v in volume.iter() {
        if v.is_finite() {
            let x = v as f64;
            if x == 0.0 {
                zero_count += 1;
            } else if x < 0.0 {
                negative_count += 1;
            }
            finite.push(x);
        } else {
            non_finite_count += 1;
        }
    }

    finite.sort_by(|a, b| a.total_cmp(b));
    let n = finite.len();

    let (min, max, mean, median, std_dev, percentiles) = if n == 0 {
        let percentiles = PERCENTILE_POINTS.iter().map(|&p| (p, f64::NAN)).collect();
        (f64::NAN, f64::NAN, f64::NAN, f64::NAN, f64::NAN, percentiles)
    } else {
        let mean = finite.iter().sum::<f64>() / n as f64;
        let variance = finite
            .iter()
            .map(|x| {
                let d = x - mean;
                d * d
            })
            .sum::<f64>()
            / n as f64;
        let percentiles = PERCENTILE_POINTS
            .iter()
            .map(|&p| (p, percentile_sorted(&finite, p)))
            .collect();
        (
            finite[0],
            finite[n - 1],
            mean,
            percentile_sorted(&finite, 50.0),
            variance.sqrt(),
            percentiles,
        )
    };

    Ok(StatisticalSummary {
        element_count,
        non_finite_count,
        zero_count,
        negative_count,
        min,
        max,
        mean,
        median,
        std_dev,
        percentiles,
    })
}
