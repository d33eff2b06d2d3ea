use gridprobe::analysis::{profile_volume, AnalysisError, PERCENTILE_POINTS};
use ndarray::Array3;

fn one_to_hundred() -> Array3<f32> {
    Array3::from_shape_vec((10, 10, 1), (1..=100).map(|v| v as f32).collect()).unwrap()
}

#[test]
fn test_known_sample_statistics() {
    let summary = profile_volume(&one_to_hundred()).unwrap();

    assert_eq!(summary.min, 1.0);
    assert_eq!(summary.max, 100.0);
    assert!((summary.mean - 50.5).abs() < 1e-12);
    // interpolated p50 of 1..=100 sits between the 50th and 51st values
    assert!((summary.median - 50.5).abs() < 1e-12);
    // population standard deviation: sqrt((100^2 - 1) / 12)
    assert!((summary.std_dev - 28.86607004772212).abs() < 1e-9);
}

#[test]
fn test_percentile_ladder_is_monotone() {
    let summary = profile_volume(&one_to_hundred()).unwrap();

    assert_eq!(summary.percentiles.len(), PERCENTILE_POINTS.len());
    let mut previous = summary.min;
    for &(_, v) in &summary.percentiles {
        assert!(v >= previous);
        previous = v;
    }
    assert!(summary.max >= previous);
}

#[test]
fn test_empty_input_is_rejected() {
    let empty = Array3::<f32>::zeros((0, 0, 0));
    assert!(matches!(
        profile_volume(&empty),
        Err(AnalysisError::EmptyInput)
    ));
}

#[test]
fn test_non_finite_values_are_excluded_and_counted() {
    let mut volume = one_to_hundred();
    volume[[0, 0, 0]] = f32::NAN; // replaces the value 1.0
    volume[[0, 1, 0]] = f32::INFINITY; // replaces the value 2.0

    let summary = profile_volume(&volume).unwrap();
    assert_eq!(summary.element_count, 100);
    assert_eq!(summary.non_finite_count, 2);
    assert_eq!(summary.finite_count(), 98);
    assert_eq!(summary.min, 3.0);
    assert_eq!(summary.max, 100.0);
}

#[test]
fn test_quality_counters() {
    let volume =
        Array3::from_shape_vec((1, 1, 5), vec![-2.0, 0.0, 0.0, 3.0, f32::NAN]).unwrap();
    let summary = profile_volume(&volume).unwrap();
    assert_eq!(summary.zero_count, 2);
    assert_eq!(summary.negative_count, 1);
    assert_eq!(summary.non_finite_count, 1);
}

#[test]
fn test_all_non_finite_yields_nan_statistics() {
    let volume = Array3::from_elem((2, 2, 2), f32::NAN);
    let summary = profile_volume(&volume).unwrap();
    assert_eq!(summary.non_finite_count, 8);
    assert!(summary.mean.is_nan());
    assert!(summary.min.is_nan());
}
