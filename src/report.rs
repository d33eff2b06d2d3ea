//! Narrative report output.
//!
//! The report layer owns all wording and interpretation. The analysis
//! structures carry numbers only; every geophysical label printed here is
//! presented as a working hypothesis, never as a verified conclusion.

use crate::analysis::{
    ExtremeEvent, MapExtreme, SeriesThresholds, StatisticalSummary,
};
use crate::grid::{depth_annotation, GridHypothesis};
use std::fmt::Write as _;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Provenance stamped into the report header.
#[derive(Debug, Clone)]
pub struct RunMetadata {
    pub input_file: String,
    pub creation_time: String,
}

impl RunMetadata {
    pub fn new(input_file: &Path) -> Self {
        Self {
            input_file: input_file.to_string_lossy().to_string(),
            creation_time: chrono::Utc::now()
                .format("%Y-%m-%dT%H:%M:%SZ")
                .to_string(),
        }
    }
}

/// Everything the report consumes, borrowed from the pipeline run.
pub struct ReportContext<'a> {
    pub shape: (usize, usize, usize),
    pub summary: &'a StatisticalSummary,
    pub grid: Option<GridHypothesis>,
    pub series: &'a [f64],
    pub thresholds: SeriesThresholds,
    pub events: &'a [ExtremeEvent],
    pub map_extremes: Option<&'a (MapExtreme, MapExtreme)>,
    pub seasonal: Option<&'a [f64]>,
}

/// Plain-text statistics block, shared by the report file and the
/// `profile` subcommand's stdout output.
pub fn format_summary(shape: (usize, usize, usize), summary: &StatisticalSummary) -> String {
    let (d0, d1, d2) = shape;
    let megabytes = summary.element_count as f64 * 4.0 / (1024.0 * 1024.0);

    let mut out = String::new();
    let _ = writeln!(out, "Shape: ({}, {}, {}) [f32]", d0, d1, d2);
    let _ = writeln!(
        out,
        "Elements: {} ({:.2} MB resident)",
        summary.element_count, megabytes
    );
    let _ = writeln!(
        out,
        "Data quality: {} non-finite, {} zeros, {} negatives",
        summary.non_finite_count, summary.zero_count, summary.negative_count
    );
    let _ = writeln!(out, "Min: {:.4}", summary.min);
    let _ = writeln!(out, "Max: {:.4}", summary.max);
    let _ = writeln!(out, "Mean: {:.4}", summary.mean);
    let _ = writeln!(out, "Median: {:.4}", summary.median);
    let _ = writeln!(out, "Std deviation (population): {:.4}", summary.std_dev);
    let _ = writeln!(out, "Percentiles:");
    for (p, v) in &summary.percentiles {
        let _ = writeln!(out, "  {:>5.1}% -> {:.4}", p, v);
    }
    out
}

fn format_location(location: Option<(f64, f64)>) -> String {
    match location {
        Some((lat, lon)) => format!(" [lat {:.2}°, lon {:.2}°]", lat, lon),
        None => String::new(),
    }
}

/// Text report writer in the style of the pipeline's other flat-file
/// outputs: `#`-prefixed provenance header, then sectioned body.
pub struct ReportWriter {
    file_path: String,
}

impl ReportWriter {
    pub fn new(file_path: &Path) -> Self {
        Self {
            file_path: file_path.to_string_lossy().to_string(),
        }
    }

    pub fn write(&self, metadata: &RunMetadata, ctx: &ReportContext<'_>) -> Result<(), ReportError> {
        let mut file = File::create(&self.file_path)?;

        writeln!(file, "# Exploratory data analysis report")?;
        writeln!(file, "# Input: {}", metadata.input_file)?;
        writeln!(file, "# Generated: {}", metadata.creation_time)?;
        writeln!(
            file,
            "# Units and physical meaning of this dataset are unknown; every"
        )?;
        writeln!(
            file,
            "# geophysical label below is a working hypothesis, not a conclusion."
        )?;
        writeln!(file)?;

        writeln!(file, "== Data overview ==")?;
        write!(file, "{}", format_summary(ctx.shape, ctx.summary))?;
        writeln!(file)?;

        self.write_grid_section(&mut file, ctx)?;
        self.write_temporal_section(&mut file, ctx)?;
        self.write_spatial_section(&mut file, ctx)?;
        self.write_events_section(&mut file, ctx)?;

        Ok(())
    }

    fn write_grid_section(&self, file: &mut File, ctx: &ReportContext<'_>) -> Result<(), ReportError> {
        let (d0, d1, d2) = ctx.shape;
        writeln!(file, "== Grid structure (hypothesis) ==")?;
        match ctx.grid {
            Some(grid) => {
                writeln!(file, "Shape matches a {}.", grid)?;
                writeln!(
                    file,
                    "Axis 0 reads as latitude: {:.2}° at row 0, step -{}°.",
                    grid.lat_of(0),
                    grid.resolution
                )?;
                writeln!(
                    file,
                    "Axis 1 reads as longitude: {:.2}° at column 0, step +{}°.",
                    grid.lon_of(0),
                    grid.resolution
                )?;
                writeln!(
                    file,
                    "Axis 2 is left over: {} steps; {}.",
                    d2,
                    depth_annotation(d2)
                )?;
            }
            None => {
                writeln!(
                    file,
                    "No entry in the resolution table matches ({}, {}).",
                    d0, d1
                )?;
                writeln!(
                    file,
                    "Spatial semantics stay unresolved; coordinates below are raw indices."
                )?;
            }
        }
        writeln!(file)?;
        Ok(())
    }

    fn write_temporal_section(
        &self,
        file: &mut File,
        ctx: &ReportContext<'_>,
    ) -> Result<(), ReportError> {
        writeln!(file, "== Temporal behavior ==")?;
        let finite: Vec<f64> = ctx.series.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            writeln!(file, "The series of spatial means holds no finite samples.")?;
            writeln!(file)?;
            return Ok(());
        }
        let mean = finite.iter().sum::<f64>() / finite.len() as f64;
        let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        writeln!(
            file,
            "Series of {} spatial means: min {:.4}, max {:.4}, mean {:.4}.",
            ctx.series.len(),
            min,
            max,
            mean
        )?;
        writeln!(
            file,
            "Flagging thresholds: high {:.4}, low {:.4}.",
            ctx.thresholds.high, ctx.thresholds.low
        )?;

        if let Some(cycle) = ctx.seasonal {
            let peak = cycle
                .iter()
                .enumerate()
                .filter(|(_, v)| v.is_finite())
                .max_by(|a, b| a.1.total_cmp(b.1));
            let trough = cycle
                .iter()
                .enumerate()
                .filter(|(_, v)| v.is_finite())
                .min_by(|a, b| a.1.total_cmp(b.1));
            writeln!(
                file,
                "Seasonal breakdown over an assumed {}-step cycle:",
                cycle.len()
            )?;
            for (phase, v) in cycle.iter().enumerate() {
                writeln!(file, "  phase {:>2} -> {:.4}", phase, v)?;
            }
            if let (Some((p, _)), Some((t, _))) = (peak, trough) {
                writeln!(
                    file,
                    "Peak at phase {}, trough at phase {}. If the steps are months,",
                    p, t
                )?;
                writeln!(
                    file,
                    "this would be a seasonal cycle, but the step unit is unverified."
                )?;
            }
        }
        writeln!(file)?;
        Ok(())
    }

    fn write_spatial_section(
        &self,
        file: &mut File,
        ctx: &ReportContext<'_>,
    ) -> Result<(), ReportError> {
        writeln!(file, "== Spatial pattern ==")?;
        match ctx.map_extremes {
            Some((max, min)) => {
                writeln!(
                    file,
                    "Temporal-mean maximum {:.4} at ({}, {}){}.",
                    max.value,
                    max.row,
                    max.col,
                    format_location(max.location)
                )?;
                writeln!(
                    file,
                    "Temporal-mean minimum {:.4} at ({}, {}){}.",
                    min.value,
                    min.row,
                    min.col,
                    format_location(min.location)
                )?;
            }
            None => {
                writeln!(file, "The temporal-mean map holds no finite cells.")?;
            }
        }
        writeln!(file)?;
        Ok(())
    }

    fn write_events_section(
        &self,
        file: &mut File,
        ctx: &ReportContext<'_>,
    ) -> Result<(), ReportError> {
        writeln!(file, "== Extreme events ==")?;
        if ctx.events.is_empty() {
            writeln!(file, "None detected at the configured thresholds.")?;
        } else {
            for event in ctx.events {
                let label = match event.direction {
                    crate::analysis::Direction::High => "high",
                    crate::analysis::Direction::Low => "low",
                };
                writeln!(
                    file,
                    "t={:<4} {:>4} {:.4} at ({}, {}){}",
                    event.time_index,
                    label,
                    event.value,
                    event.row,
                    event.col,
                    format_location(event.location)
                )?;
            }
        }
        Ok(())
    }
}
