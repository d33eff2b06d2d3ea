use gridprobe::analysis::{
    detect_extremes, temporal_series, Direction, ExtremeOptions, TIME_AXIS,
};
use gridprobe::data_io::{LoadError, NpyVolumeReader};
use gridprobe::grid::infer_grid;
use ndarray::{Array2, Array3};
use ndarray_npy::write_npy;

/// Single-spike scenario over a full 0.25° grid: one hot cell at spatial
/// index (660, 860) in the first time step of an otherwise all-zero field.
#[test]
fn test_single_spike_end_to_end() {
    let mut volume = Array3::<f32>::zeros((720, 1440, 129));
    volume[[660, 860, 0]] = 311800.88;

    let series = temporal_series(&volume, TIME_AXIS).unwrap();
    assert_eq!(series.len(), 129);

    let grid = infer_grid(720, 1440).unwrap();
    assert_eq!(grid.resolution, 0.25);

    let events =
        detect_extremes(&series, &volume, Some(&grid), &ExtremeOptions::default()).unwrap();
    assert_eq!(events.len(), 1);

    let event = &events[0];
    assert_eq!(event.time_index, 0);
    assert_eq!((event.row, event.col), (660, 860));
    assert_eq!(event.value, 311800.88);
    assert_eq!(event.direction, Direction::High);
    // the documented conversion formulas, literally
    let expected = (90.0 - 660.0 * 0.25, -180.0 + 860.0 * 0.25);
    assert_eq!(event.location, Some(expected));
}

#[test]
fn test_npy_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("volume.npy");

    let volume = Array3::from_shape_fn((4, 3, 2), |(i, j, t)| (i * 6 + j * 2 + t) as f32);
    write_npy(&path, &volume).unwrap();

    let loaded = NpyVolumeReader::new(&path).load().unwrap();
    assert_eq!(loaded, volume);
}

#[test]
fn test_loader_rejects_wrong_dimensionality() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plane.npy");

    let plane = Array2::<f32>::zeros((5, 5));
    write_npy(&path, &plane).unwrap();

    assert!(matches!(
        NpyVolumeReader::new(&path).load(),
        Err(LoadError::NotThreeDimensional(2))
    ));
}

#[test]
fn test_loader_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        NpyVolumeReader::new(dir.path().join("absent.npy")).load(),
        Err(LoadError::FileNotFound(_))
    ));
}
