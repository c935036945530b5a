//! Inverse orthographic projection: view-plane (x, y) in the unit disk to
//! (latitude, longitude) on a sphere seen from infinite distance.

use crate::error::{GeoidError, Result};
use ndarray::{Array1, Array2, ArrayView2, Zip};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    /// [deg]
    pub lat: f64,
    /// [deg, 0..360)
    pub lon: f64,
    pub visible: bool,
}

/// Per-pixel projection output.
#[derive(Debug, Clone)]
pub struct Projection {
    pub lat: Array2<f64>,
    pub lon: Array2<f64>,
    pub visible: Array2<bool>,
}

/// Inverse orthographic map for one view-plane point.
///
/// `lon0_deg` is the sub-longitude (rotation), `lat0_deg` the viewing tilt.
/// Points with ρ > 1 lie off the disk and are never visible.
pub fn orthographic_inverse_point(x: f64, y: f64, lon0_deg: f64, lat0_deg: f64) -> ProjectedPoint {
    let (sin_lat0, cos_lat0) = lat0_deg.to_radians().sin_cos();

    let rho = (x * x + y * y).sqrt();
    // 중심점에서는 각도 항이 사라짐
    let rho_safe = if rho == 0.0 { 1.0 } else { rho };

    let c = rho.clamp(0.0, 1.0).asin();
    let (sin_c, cos_c) = c.sin_cos();

    let lat = (cos_c * sin_lat0 + y * sin_c * cos_lat0 / rho_safe).asin();
    let lon = lon0_deg.to_radians()
        + (x * sin_c).atan2(rho * cos_lat0 * cos_c - y * sin_lat0 * sin_c);

    let lat = lat.to_degrees();
    let lon = lon.to_degrees().rem_euclid(360.0);

    ProjectedPoint {
        lat,
        lon,
        visible: rho <= 1.0 && lat.is_finite() && lon.is_finite(),
    }
}

/// Projects every (x, y) pair of two same-shaped coordinate arrays.
pub fn orthographic_inverse(
    x: &ArrayView2<f64>,
    y: &ArrayView2<f64>,
    lon0_deg: f64,
    lat0_deg: f64,
) -> Result<Projection> {
    if x.dim() != y.dim() {
        return Err(GeoidError::invalid(format!(
            "x and y grids differ in shape: {:?} vs {:?}",
            x.dim(),
            y.dim()
        )));
    }
    let points = Zip::from(x)
        .and(y)
        .par_map_collect(|&x, &y| orthographic_inverse_point(x, y, lon0_deg, lat0_deg));

    Ok(Projection {
        lat: points.mapv(|p| p.lat),
        lon: points.mapv(|p| p.lon),
        visible: points.mapv(|p| p.visible),
    })
}

/// Square view-plane grid over [-1, 1]²: x grows left to right, y grows
/// bottom to top (row 0 is y = +1).
pub fn view_plane(size: usize) -> (Array2<f64>, Array2<f64>) {
    let lin: Array1<f64> = Array1::linspace(-1.0, 1.0, size);
    let x = Array2::from_shape_fn((size, size), |(_, j)| lin[j]);
    let y = Array2::from_shape_fn((size, size), |(i, _)| -lin[i]);
    (x, y)
}
