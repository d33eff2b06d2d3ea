//! Static PNG output: heatmaps of 2-D maps and a line chart of the time
//! series. Pure pixel work; all numbers come from the analysis structures.

use image::{ImageBuffer, Rgb, RgbImage};
use ndarray::Array2;
use num_traits::Float;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Nothing to draw: {0}")]
    EmptyInput(&'static str),
}

/// Generic linear interpolation between two values
fn lerp<T: Float>(v0: T, v1: T, fac: T) -> T {
    v0 + (v1 - v0) * fac
}

const NO_DATA_GRAY: [u8; 3] = [128, 128, 128];
const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Piecewise-linear color ramp over normalized [0, 1] values.
pub struct ColorRamp {
    stops: &'static [(f32, [u8; 3])],
}

/// Dark-to-warm ramp for magnitude fields.
pub const THERMAL: ColorRamp = ColorRamp {
    stops: &[
        (0.0, [13, 8, 135]),
        (0.35, [156, 23, 158]),
        (0.7, [237, 121, 83]),
        (1.0, [240, 249, 33]),
    ],
};

/// Blue-white-red ramp for signed fields (anomalies).
pub const DIVERGING: ColorRamp = ColorRamp {
    stops: &[
        (0.0, [33, 102, 172]),
        (0.5, [247, 247, 247]),
        (1.0, [178, 24, 43]),
    ],
};

impl ColorRamp {
    /// Sample the ramp at `t` in [0, 1]; out-of-range values clamp.
    pub fn sample(&self, t: f32) -> [u8; 3] {
        let t = t.clamp(0.0, 1.0);
        for pair in self.stops.windows(2) {
            let (t0, c0) = pair[0];
            let (t1, c1) = pair[1];
            if t <= t1 {
                let fac = if t1 > t0 { (t - t0) / (t1 - t0) } else { 0.0 };
                return [
                    lerp(c0[0] as f32, c1[0] as f32, fac).round() as u8,
                    lerp(c0[1] as f32, c1[1] as f32, fac).round() as u8,
                    lerp(c0[2] as f32, c1[2] as f32, fac).round() as u8,
                ];
            }
        }
        self.stops[self.stops.len() - 1].1
    }
}

/// Render a 2-D map as a heatmap, one pixel per cell.
///
/// Row 0 is the top of the image, so on a matched grid north is up. Values
/// normalize against the finite min/max; NaN cells render neutral gray, and
/// a constant map renders as the ramp midpoint.
pub fn render_map(map: &Array2<f64>, ramp: &ColorRamp) -> Result<RgbImage, RenderError> {
    let (rows, cols) = map.dim();
    if rows == 0 || cols == 0 {
        return Err(RenderError::EmptyInput("map has no cells"));
    }

    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for &v in map.iter() {
        if v.is_finite() {
            lo = lo.min(v);
            hi = hi.max(v);
        }
    }
    let span = hi - lo;

    let mut img = ImageBuffer::new(cols as u32, rows as u32);
    for ((row, col), &v) in map.indexed_iter() {
        let px = if !v.is_finite() || !span.is_finite() {
            NO_DATA_GRAY
        } else if span <= 0.0 {
            ramp.sample(0.5)
        } else {
            ramp.sample(((v - lo) / span) as f32)
        };
        img.put_pixel(col as u32, row as u32, Rgb(px));
    }
    Ok(img)
}

/// Render the time series as a line chart with horizontal reference lines
/// (mean, thresholds), white background, fixed canvas.
pub fn render_series(
    series: &[f64],
    references: &[(f64, [u8; 3])],
    width: u32,
    height: u32,
) -> Result<RgbImage, RenderError> {
    if series.is_empty() {
        return Err(RenderError::EmptyInput("series has no samples"));
    }
    let margin = 10u32;
    if width <= 2 * margin || height <= 2 * margin {
        return Err(RenderError::EmptyInput("canvas too small"));
    }

    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for &v in series.iter().chain(references.iter().map(|(v, _)| v)) {
        if v.is_finite() {
            lo = lo.min(v);
            hi = hi.max(v);
        }
    }
    if !(hi - lo).is_finite() {
        return Err(RenderError::EmptyInput("series has no finite samples"));
    }
    if hi - lo <= 0.0 {
        // flat line; give it some vertical room
        lo -= 0.5;
        hi += 0.5;
    }

    let plot_w = (width - 2 * margin) as f64;
    let plot_h = (height - 2 * margin) as f64;
    let y_of = |v: f64| -> i64 {
        let frac = (v - lo) / (hi - lo);
        (margin as f64 + (1.0 - frac) * plot_h).round() as i64
    };
    let x_of = |i: usize| -> i64 {
        let frac = if series.len() > 1 {
            i as f64 / (series.len() - 1) as f64
        } else {
            0.5
        };
        (margin as f64 + frac * plot_w).round() as i64
    };

    let mut img = ImageBuffer::from_pixel(width, height, WHITE);

    for &(v, color) in references {
        if !v.is_finite() {
            continue;
        }
        let y = y_of(v);
        draw_line(&mut img, margin as i64, y, (width - margin) as i64, y, color);
    }

    let line = [31u8, 119, 180];
    let mut prev: Option<(i64, i64)> = None;
    for (i, &v) in series.iter().enumerate() {
        if !v.is_finite() {
            prev = None;
            continue;
        }
        let point = (x_of(i), y_of(v));
        if let Some((x0, y0)) = prev {
            draw_line(&mut img, x0, y0, point.0, point.1, line);
        } else {
            put_pixel_checked(&mut img, point.0, point.1, line);
        }
        prev = Some(point);
    }

    Ok(img)
}

/// Bresenham line, clipped to the canvas.
fn draw_line(img: &mut RgbImage, x0: i64, y0: i64, x1: i64, y1: i64, color: [u8; 3]) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);
    loop {
        put_pixel_checked(img, x, y, color);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

fn put_pixel_checked(img: &mut RgbImage, x: i64, y: i64, color: [u8; 3]) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, Rgb(color));
    }
}

/// Write an image as PNG (format picked from the extension).
pub fn save_png(img: &RgbImage, path: &Path) -> Result<(), RenderError> {
    img.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    #[test]
    fn test_ramp_endpoints() {
        assert_eq!(THERMAL.sample(0.0), [13, 8, 135]);
        assert_eq!(THERMAL.sample(1.0), [240, 249, 33]);
        assert_eq!(THERMAL.sample(-1.0), THERMAL.sample(0.0));
        assert_eq!(DIVERGING.sample(0.5), [247, 247, 247]);
    }

    #[test]
    fn test_render_map_dimensions_and_nan() {
        let map = arr2(&[[0.0, 1.0], [f64::NAN, 0.5], [0.25, 0.75]]);
        let img = render_map(&map, &THERMAL).unwrap();
        assert_eq!((img.width(), img.height()), (2, 3));
        assert_eq!(img.get_pixel(0, 1).0, NO_DATA_GRAY);
    }

    #[test]
    fn test_render_map_constant() {
        let map = arr2(&[[2.0, 2.0], [2.0, 2.0]]);
        let img = render_map(&map, &THERMAL).unwrap();
        assert_eq!(img.get_pixel(0, 0).0, THERMAL.sample(0.5));
    }

    #[test]
    fn test_render_series_canvas() {
        let series: Vec<f64> = (0..100).map(|v| (v as f64 / 10.0).sin()).collect();
        let img = render_series(&series, &[(0.0, [200, 0, 0])], 640, 360).unwrap();
        assert_eq!((img.width(), img.height()), (640, 360));
    }

    #[test]
    fn test_render_empty_inputs() {
        assert!(render_map(&Array2::zeros((0, 0)), &THERMAL).is_err());
        assert!(render_series(&[], &[], 100, 100).is_err());
    }
}
