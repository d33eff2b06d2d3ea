use gridprobe::analysis::{
    detect_extremes, map_extremes, profile_volume, series_thresholds, spatial_map,
    temporal_series, ExtremeOptions, TIME_AXIS,
};
use gridprobe::grid::infer_grid;
use gridprobe::render::{render_map, render_series, save_png, THERMAL};
use gridprobe::report::{format_summary, ReportContext, ReportWriter, RunMetadata};
use ndarray::Array3;
use std::fs;

fn fixture() -> Array3<f32> {
    Array3::from_shape_fn((72, 144, 13), |(i, _, t)| {
        if t == 12 {
            50.0
        } else {
            i as f32 * 0.1
        }
    })
}

#[test]
fn test_report_file_contents() {
    let dir = tempfile::tempdir().unwrap();
    let volume = fixture();

    let summary = profile_volume(&volume).unwrap();
    let grid = infer_grid(72, 144);
    assert!(grid.is_some()); // 2.5° candidate

    let series = temporal_series(&volume, TIME_AXIS).unwrap();
    let mean_map = spatial_map(&volume, TIME_AXIS).unwrap();
    let opts = ExtremeOptions::default();
    let thresholds = series_thresholds(&series, &opts).unwrap();
    let events = detect_extremes(&series, &volume, grid.as_ref(), &opts).unwrap();
    let extremes_of_map = map_extremes(&mean_map, grid.as_ref());

    let path = dir.path().join("report.txt");
    let metadata = RunMetadata::new(std::path::Path::new("fixture.npy"));
    let context = ReportContext {
        shape: (72, 144, 13),
        summary: &summary,
        grid,
        series: &series,
        thresholds,
        events: &events,
        map_extremes: extremes_of_map.as_ref(),
        seasonal: None,
    };
    ReportWriter::new(&path).write(&metadata, &context).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("# Exploratory data analysis report"));
    assert!(text.contains("== Data overview =="));
    assert!(text.contains("== Grid structure (hypothesis) =="));
    assert!(text.contains("== Extreme events =="));
    assert!(text.contains("working hypothesis"));
    // the uniform high step must show up as an event line
    assert!(text.contains("t=12"));
}

#[test]
fn test_summary_formatting() {
    let volume = fixture();
    let summary = profile_volume(&volume).unwrap();
    let text = format_summary(volume.dim(), &summary);
    assert!(text.contains("Shape: (72, 144, 13)"));
    assert!(text.contains("Percentiles:"));
}

#[test]
fn test_png_files_are_written() {
    let dir = tempfile::tempdir().unwrap();
    let volume = fixture();

    let mean_map = spatial_map(&volume, TIME_AXIS).unwrap();
    let img = render_map(&mean_map, &THERMAL).unwrap();
    let map_path = dir.path().join("map.png");
    save_png(&img, &map_path).unwrap();
    assert!(map_path.exists());

    let series = temporal_series(&volume, TIME_AXIS).unwrap();
    let chart = render_series(&series, &[], 640, 360).unwrap();
    let chart_path = dir.path().join("series.png");
    save_png(&chart, &chart_path).unwrap();
    assert!(chart_path.exists());
}
