//! Bilinear texture lookup at fractional (latitude, longitude).
//!
//! Rows are clamped (the poles are edges); columns wrap (longitude is
//! cyclic). Output channels are truncated to u8.

use crate::error::{GeoidError, Result};
use ndarray::{Array3, ArrayView2, ArrayView3, Axis, Zip};

/// Samples one color. `tex` must have shape (rows >= 1, cols >= 1, 3).
#[inline]
pub fn sample_bilinear_point(tex: &ArrayView3<u8>, lat_deg: f64, lon_deg: f64) -> [u8; 3] {
    let (nlat, nlon, _) = tex.dim();

    let u = ((90.0 - lat_deg) / 180.0 * (nlat - 1) as f64).clamp(0.0, (nlat - 1) as f64);
    let u0 = (u.floor() as usize).min(nlat - 1);
    let u1 = (u0 + 1).min(nlat - 1);
    let fu = u - u0 as f64;

    let v = lon_deg / 360.0 * nlon as f64;
    let v_floor = v.floor();
    let v0 = (v_floor as i64).rem_euclid(nlon as i64) as usize;
    let v1 = (v0 + 1) % nlon;
    let fv = v - v_floor;

    let mut out = [0u8; 3];
    for (ch, o) in out.iter_mut().enumerate() {
        let c00 = tex[[u0, v0, ch]] as f64;
        let c01 = tex[[u0, v1, ch]] as f64;
        let c10 = tex[[u1, v0, ch]] as f64;
        let c11 = tex[[u1, v1, ch]] as f64;

        let c0 = c00 * (1.0 - fv) + c01 * fv;
        let c1 = c10 * (1.0 - fv) + c11 * fv;
        *o = (c0 * (1.0 - fu) + c1 * fu) as u8;
    }
    out
}

fn check_texture(tex: &ArrayView3<u8>) -> Result<()> {
    let (rows, cols, channels) = tex.dim();
    if rows == 0 || cols == 0 || channels != 3 {
        return Err(GeoidError::invalid(format!(
            "texture must be non-empty with 3 channels, got {:?}",
            tex.dim()
        )));
    }
    Ok(())
}

/// Samples `tex` at every (lat, lon) pair; output shape is (h, w, 3) for
/// (h, w) query arrays.
pub fn sample_texture_bilinear(
    tex: &ArrayView3<u8>,
    lat_deg: &ArrayView2<f64>,
    lon_deg: &ArrayView2<f64>,
) -> Result<Array3<u8>> {
    check_texture(tex)?;
    if lat_deg.dim() != lon_deg.dim() {
        return Err(GeoidError::invalid(format!(
            "latitude and longitude queries differ in shape: {:?} vs {:?}",
            lat_deg.dim(),
            lon_deg.dim()
        )));
    }
    let (h, w) = lat_deg.dim();
    let mut out = Array3::<u8>::zeros((h, w, 3));
    Zip::from(out.lanes_mut(Axis(2)))
        .and(lat_deg)
        .and(lon_deg)
        .par_for_each(|mut px, &lat, &lon| {
            let rgb = sample_bilinear_point(tex, lat, lon);
            px[0] = rgb[0];
            px[1] = rgb[1];
            px[2] = rgb[2];
        });
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    /// Smooth in longitude: value depends on cos(lon).
    fn lon_gradient(nlat: usize, nlon: usize) -> Array3<u8> {
        Array3::from_shape_fn((nlat, nlon, 3), |(_, j, _)| {
            let lon = j as f64 / nlon as f64 * std::f64::consts::TAU;
            (127.5 + 100.0 * lon.cos()) as u8
        })
    }

    #[test]
    fn test_output_shape() {
        let tex = Array3::<u8>::zeros((181, 360, 3));
        let lat = Array2::<f64>::zeros((5, 7));
        let lon = Array2::<f64>::zeros((5, 7));
        let out = sample_texture_bilinear(&tex.view(), &lat.view(), &lon.view()).unwrap();
        assert_eq!(out.dim(), (5, 7, 3));
        assert!(out.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_longitude_wraps() {
        let tex = lon_gradient(181, 360);
        let a = sample_bilinear_point(&tex.view(), 10.0, 359.9);
        let b = sample_bilinear_point(&tex.view(), 10.0, 0.1);
        for ch in 0..3 {
            assert!((a[ch] as i32 - b[ch] as i32).abs() <= 1, "{:?} vs {:?}", a, b);
        }
        // 마지막 열과 첫 열 사이 보간
        let tex = Array3::from_shape_fn((3, 4, 3), |(_, j, _)| if j == 3 { 200u8 } else { 0 });
        let mid = sample_bilinear_point(&tex.view(), 0.0, 315.0);
        assert_eq!(mid, [100, 100, 100]);
        // 음수 경도도 같은 열로
        assert_eq!(sample_bilinear_point(&tex.view(), 0.0, -45.0), mid);
    }

    #[test]
    fn test_latitude_clamps_at_pole() {
        // 북극 행만 밝고 남극 행은 어둡다
        let tex = Array3::from_shape_fn((181, 8, 3), |(i, _, _)| if i == 0 { 240u8 } else if i == 180 { 0 } else { 120 });
        let near_north = sample_bilinear_point(&tex.view(), 89.9, 45.0);
        assert!(near_north[0] > 200, "{:?}", near_north);
        // beyond the pole stays on the pole row instead of wrapping south
        assert_eq!(sample_bilinear_point(&tex.view(), 95.0, 45.0), [240, 240, 240]);
        assert_eq!(sample_bilinear_point(&tex.view(), -95.0, 45.0), [0, 0, 0]);
    }

    #[test]
    fn test_exact_texel() {
        let tex = Array3::from_shape_fn((181, 360, 3), |(i, j, c)| ((i + j + c) % 256) as u8);
        // lat 0 -> row 90, lon 90 -> col 90
        assert_eq!(sample_bilinear_point(&tex.view(), 0.0, 90.0), [180, 181, 182]);
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let tex = Array3::<u8>::zeros((4, 4, 4));
        let q = Array2::<f64>::zeros((2, 2));
        assert!(sample_texture_bilinear(&tex.view(), &q.view(), &q.view()).is_err());

        let tex = Array3::<u8>::zeros((4, 4, 3));
        let other = Array2::<f64>::zeros((2, 3));
        assert!(sample_texture_bilinear(&tex.view(), &q.view(), &other.view()).is_err());
    }
}
