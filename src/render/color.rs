//! Diverging color ramp and the scalar-grid -> texture mapping.

use crate::harmonics::ScalarGrid;
use ndarray::{Array3, ArrayView2, Axis, Zip};
use tracing::info;

/// Equirectangular RGB texture, shape (rows, cols, 3).
pub type Texture = Array3<u8>;

/// Percentile used for the symmetric dynamic range.
pub const RANGE_PERCENTILE: f64 = 98.0;

/// Number of discrete ramp levels.
pub const RAMP_LEVELS: usize = 256;

/// Dark violet -> violet -> blue -> cyan -> yellow, evenly spaced on [0, 1].
pub(crate) const RAMP_STOPS: [(f64, f64, f64); 5] = [
    (0.05, 0.02, 0.12),
    (0.22, 0.05, 0.45),
    (0.05, 0.20, 0.75),
    (0.00, 0.80, 0.90),
    (0.98, 0.95, 0.20),
];

/// Maps t in [0, 1] to an 8-bit color.
///
/// t is quantized to one of [`RAMP_LEVELS`] levels before interpolating
/// between the stops. Values outside [0, 1] are clamped; NaN maps to the
/// midpoint color.
pub fn color_ramp(t: f64) -> [u8; 3] {
    let t = if t.is_nan() { 0.5 } else { t.clamp(0.0, 1.0) };
    let level = ((t * RAMP_LEVELS as f64) as usize).min(RAMP_LEVELS - 1);
    let pos = level as f64 / (RAMP_LEVELS - 1) as f64;

    let segments = (RAMP_STOPS.len() - 1) as f64;
    let scaled = pos * segments;
    let idx = (scaled.floor() as usize).min(RAMP_STOPS.len() - 2);
    let frac = scaled - idx as f64;

    let (r0, g0, b0) = RAMP_STOPS[idx];
    let (r1, g1, b1) = RAMP_STOPS[idx + 1];
    let lerp = |a: f64, b: f64| ((a + (b - a) * frac) * 255.0) as u8;
    [lerp(r0, r1), lerp(g0, g1), lerp(b0, b1)]
}

/// Linear-interpolation percentile of `values` (p in [0, 100]).
/// Sorts `values` in place; `None` when empty.
pub fn percentile(values: &mut [f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let rank = (p.clamp(0.0, 100.0) / 100.0) * (values.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some(values[lo] + (values[hi] - values[lo]) * frac)
}

/// Symmetric range bound: the 98th percentile of |v| over finite cells.
pub fn symmetric_range(values: &ArrayView2<f64>) -> Option<f64> {
    let mut abs: Vec<f64> = values
        .iter()
        .filter(|v| v.is_finite())
        .map(|v| v.abs())
        .collect();
    percentile(&mut abs, RANGE_PERCENTILE)
}

/// Builds the texture for a raw value array.
///
/// Each cell is normalized with (v - vmin)/(vmax - vmin), vmin = -vmax, then
/// clamped and colored. Undefined cells, and every cell of a field with a
/// zero or undefined range, take the midpoint color.
pub fn texture_from_values(values: &ArrayView2<f64>) -> Texture {
    let (rows, cols) = values.dim();
    let vmax = symmetric_range(values).filter(|v| v.is_finite() && *v > 0.0);
    let mut tex = Array3::<u8>::zeros((rows, cols, 3));

    Zip::from(tex.lanes_mut(Axis(2)))
        .and(values)
        .par_for_each(|mut px, &v| {
            let t = match vmax {
                Some(vmax) if v.is_finite() => ((v + vmax) / (2.0 * vmax)).clamp(0.0, 1.0),
                _ => 0.5,
            };
            let rgb = color_ramp(t);
            px[0] = rgb[0];
            px[1] = rgb[1];
            px[2] = rgb[2];
        });

    info!(rows, cols, vmax = vmax.unwrap_or(f64::NAN), "texture mapped");
    tex
}

pub fn texture_from_grid(grid: &ScalarGrid) -> Texture {
    texture_from_values(&grid.values().view())
}
