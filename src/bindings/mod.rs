use crate::config::{RenderConfig, SynthesisConfig, DEFAULT_GAMMA};
use crate::error::GeoidError;
use crate::harmonics::{self, CoefficientTable};
use crate::render;
use ndarray::{Array4, ArrayView3, Axis};
use numpy::{
    IntoPyArray, PyArray2, PyArray3, PyArray4, PyReadonlyArray1, PyReadonlyArray2,
    PyReadonlyArray3,
};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyModule;

impl From<GeoidError> for PyErr {
    fn from(err: GeoidError) -> PyErr {
        match err {
            GeoidError::InvalidConfiguration(_) => PyValueError::new_err(err.to_string()),
            _ => PyRuntimeError::new_err(err.to_string()),
        }
    }
}

#[pyfunction]
fn fully_normalized_legendre(l: usize, m: usize, x: f64) -> PyResult<f64> {
    Ok(harmonics::fully_normalized_legendre(l, m, x)?)
}

/// c, s: (L+1, L+1) coefficient matrices; returns N [m] of shape (lats, lons)
#[pyfunction]
#[pyo3(signature = (c, s, lats, lons, lmax, lmin = 2, gm = None, r0 = None, gamma = DEFAULT_GAMMA))]
#[allow(clippy::too_many_arguments)]
fn synthesize_geoid<'py>(
    py: Python<'py>,
    c: PyReadonlyArray2<f64>,
    s: PyReadonlyArray2<f64>,
    lats: PyReadonlyArray1<f64>,
    lons: PyReadonlyArray1<f64>,
    lmax: usize,
    lmin: usize,
    gm: Option<f64>,
    r0: Option<f64>,
    gamma: f64,
) -> PyResult<&'py PyArray2<f64>> {
    let table = CoefficientTable::from_arrays(c.as_array().to_owned(), s.as_array().to_owned(), gm, r0)?;
    let cfg = SynthesisConfig { lmax, lmin, gamma };
    let lats = lats.as_array().to_owned();
    let lons = lons.as_array().to_owned();

    let grid = py.allow_threads(|| {
        harmonics::synthesize_geoid(&table, &cfg, &lats.view(), &lons.view())
    })?;
    Ok(grid.into_values().into_pyarray(py))
}

#[pyfunction]
fn texture_from_grid<'py>(py: Python<'py>, values: PyReadonlyArray2<f64>) -> &'py PyArray3<u8> {
    render::texture_from_values(&values.as_array()).into_pyarray(py)
}

/// Returns (lat, lon, visible) arrays shaped like `x`.
#[pyfunction]
fn orthographic_inverse<'py>(
    py: Python<'py>,
    x: PyReadonlyArray2<f64>,
    y: PyReadonlyArray2<f64>,
    lon0_deg: f64,
    lat0_deg: f64,
) -> PyResult<(&'py PyArray2<f64>, &'py PyArray2<f64>, &'py PyArray2<bool>)> {
    let proj = render::orthographic_inverse(&x.as_array(), &y.as_array(), lon0_deg, lat0_deg)?;
    Ok((
        proj.lat.into_pyarray(py),
        proj.lon.into_pyarray(py),
        proj.visible.into_pyarray(py),
    ))
}

#[pyfunction]
fn sample_texture_bilinear<'py>(
    py: Python<'py>,
    texture: PyReadonlyArray3<u8>,
    lat_deg: PyReadonlyArray2<f64>,
    lon_deg: PyReadonlyArray2<f64>,
) -> PyResult<&'py PyArray3<u8>> {
    let out = render::sample_texture_bilinear(&texture.as_array(), &lat_deg.as_array(), &lon_deg.as_array())?;
    Ok(out.into_pyarray(py))
}

/// Returns every frame stacked as (frames, size, size, 3).
#[pyfunction]
#[pyo3(signature = (texture, fps = 60, duration_s = 6.0, size_px = 720, lat0_deg = 15.0, spin_deg_per_s = 60.0))]
fn render_frames<'py>(
    py: Python<'py>,
    texture: PyReadonlyArray3<u8>,
    fps: u32,
    duration_s: f64,
    size_px: usize,
    lat0_deg: f64,
    spin_deg_per_s: f64,
) -> PyResult<&'py PyArray4<u8>> {
    let texture = texture.as_array().to_owned();
    let cfg = RenderConfig {
        fps,
        duration_s,
        size_px,
        lat0_deg,
        spin_deg_per_s,
        ..RenderConfig::default()
    };

    let frames = py.allow_threads(|| render::render_frames(&texture, cfg))?;
    let views: Vec<ArrayView3<u8>> = frames.iter().map(|f| f.view()).collect();
    let stacked: Array4<u8> = ndarray::stack(Axis(0), &views)
        .map_err(|e| PyRuntimeError::new_err(format!("failed to stack frames: {}", e)))?;
    Ok(stacked.into_pyarray(py))
}

/// Geoid Globe - geoid synthesis and globe rendering in Rust
#[pymodule]
pub fn geoid_globe(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    // Legendre / synthesis
    m.add_function(wrap_pyfunction!(fully_normalized_legendre, m)?)?;
    m.add_function(wrap_pyfunction!(synthesize_geoid, m)?)?;
    // Rendering
    m.add_function(wrap_pyfunction!(texture_from_grid, m)?)?;
    m.add_function(wrap_pyfunction!(orthographic_inverse, m)?)?;
    m.add_function(wrap_pyfunction!(sample_texture_bilinear, m)?)?;
    m.add_function(wrap_pyfunction!(render_frames, m)?)?;
    Ok(())
}
