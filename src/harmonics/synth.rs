//! Harmonic synthesis of the approximate geoid height N ≈ T / γ.
//!
//! T is the disturbing potential at the reference radius, summed from the
//! fully-normalized coefficients; dividing by a constant normal gravity gives
//! metres. This is a visualization-grade stand-in for a full geoid model.

use super::coeffs::CoefficientTable;
use super::grid::ScalarGrid;
use super::legendre::LegendreRow;
use crate::config::{GridSpec, SynthesisConfig, NEAR_POLE_TOL, X_CLAMP_EPS};
use crate::error::{GeoidError, Result};
use ndarray::{Array1, Array2, ArrayView1, Axis, Zip};
use rayon::prelude::*;
use std::time::Instant;
use tracing::{info, warn};

/// cos(mφ) / sin(mφ) for every order m and every sampled longitude.
/// Independent of latitude, so built once per run.
struct LongitudeBasis {
    cos_m: Array2<f64>,
    sin_m: Array2<f64>,
}

impl LongitudeBasis {
    fn new(lmax: usize, lons_deg: &ArrayView1<f64>) -> Self {
        let shape = (lmax + 1, lons_deg.len());
        let cos_m = Array2::from_shape_fn(shape, |(m, j)| (m as f64 * lons_deg[j].to_radians()).cos());
        let sin_m = Array2::from_shape_fn(shape, |(m, j)| (m as f64 * lons_deg[j].to_radians()).sin());
        Self { cos_m, sin_m }
    }
}

/// sin(lat) clamped into (-1 + ε, 1 - ε).
fn clamped_x(lat_deg: f64) -> f64 {
    let x = lat_deg.to_radians().sin();
    if x >= 1.0 {
        1.0 - X_CLAMP_EPS
    } else if x <= -1.0 {
        -1.0 + X_CLAMP_EPS
    } else {
        x
    }
}

/// Unscaled series sum for one latitude row.
fn accumulate_row(
    table: &CoefficientTable,
    cfg: &SynthesisConfig,
    basis: &LongitudeBasis,
    x: f64,
) -> Array1<f64> {
    let legendre = LegendreRow::compute(cfg.lmax, x);
    // m > 0 terms vanish at the poles and are least stable there
    let near_pole = (1.0 - x.abs()).abs() < NEAR_POLE_TOL;
    accumulate_terms(table, cfg, basis, near_pole, |l, m| legendre.get(l, m))
}

/// Sums every (l, m) term whose P̄_lm is defined; `None` drops the term
/// and leaves the rest of the row intact.
fn accumulate_terms<F>(
    table: &CoefficientTable,
    cfg: &SynthesisConfig,
    basis: &LongitudeBasis,
    near_pole: bool,
    pbar: F,
) -> Array1<f64>
where
    F: Fn(usize, usize) -> Option<f64>,
{
    let mut acc = Array1::<f64>::zeros(basis.cos_m.ncols());

    for l in cfg.lmin..=cfg.lmax {
        if let Some(p0) = pbar(l, 0) {
            let term = p0 * table.c(l, 0);
            acc.mapv_inplace(|a| a + term);
        }

        if near_pole {
            continue;
        }

        for m in 1..=l {
            let Some(p) = pbar(l, m) else {
                continue;
            };
            let c = table.c(l, m);
            let s = table.s(l, m);
            if c == 0.0 && s == 0.0 {
                continue;
            }
            Zip::from(&mut acc)
                .and(basis.cos_m.row(m))
                .and(basis.sin_m.row(m))
                .for_each(|a, &cm, &sm| *a += p * (c * cm + s * sm));
        }
    }
    acc
}

fn validate_inputs(
    table: &CoefficientTable,
    cfg: &SynthesisConfig,
    lats: &ArrayView1<f64>,
    lons: &ArrayView1<f64>,
) -> Result<()> {
    cfg.validate()?;
    if cfg.lmax > table.lmax() {
        return Err(GeoidError::invalid(format!(
            "synthesis degree {} exceeds coefficient table degree {}",
            cfg.lmax,
            table.lmax()
        )));
    }
    if lats.is_empty() || lons.is_empty() {
        return Err(GeoidError::invalid("latitude and longitude axes must be non-empty"));
    }
    if lats.iter().any(|v| !(v.is_finite() && v.abs() <= 90.0)) {
        return Err(GeoidError::invalid("latitudes must be finite and within [-90, 90]"));
    }
    if lons.iter().any(|v| !v.is_finite()) {
        return Err(GeoidError::invalid("longitudes must be finite"));
    }
    Ok(())
}

/// Synthesizes N ≈ T/γ [m] on the given axes.
///
/// Rows are accumulated in parallel; the grid-wide mean of finite cells is
/// removed afterwards in a single pass. Fails with `EmptySynthesis` when
/// no cell ends up finite.
pub fn synthesize_geoid(
    table: &CoefficientTable,
    cfg: &SynthesisConfig,
    lats: &ArrayView1<f64>,
    lons: &ArrayView1<f64>,
) -> Result<ScalarGrid> {
    validate_inputs(table, cfg, lats, lons)?;

    let start = Instant::now();
    let (gm, r0) = table.constants();
    let scale = gm / r0 / cfg.gamma;
    let basis = LongitudeBasis::new(cfg.lmax, lons);

    info!(
        rows = lats.len(),
        cols = lons.len(),
        lmin = cfg.lmin,
        lmax = cfg.lmax,
        scale,
        "synthesizing geoid grid"
    );

    // 1단계: 행 단위 병렬 누적
    let mut values = Array2::<f64>::from_elem((lats.len(), lons.len()), f64::NAN);
    values
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(i, mut row)| {
            let acc = accumulate_row(table, cfg, &basis, clamped_x(lats[i]));
            if acc.iter().any(|v| v.is_finite()) {
                Zip::from(&mut row).and(&acc).for_each(|out, &a| *out = scale * a);
            } else {
                warn!(row = i, lat = lats[i], "row produced no finite value");
            }
        });

    // 2단계: 전역 평균 제거
    let mut grid = ScalarGrid::new(lats.to_owned(), lons.to_owned(), values)?;
    let (rows, cols) = grid.shape();
    let mean = grid
        .remove_finite_mean()
        .ok_or(GeoidError::EmptySynthesis { rows, cols })?;

    info!(
        finite = grid.finite_count(),
        removed_mean = mean,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "synthesis finished"
    );
    Ok(grid)
}

/// Builds the axes from `spec` and synthesizes on them.
pub fn synthesize_on_grid(
    table: &CoefficientTable,
    cfg: &SynthesisConfig,
    spec: &GridSpec,
) -> Result<ScalarGrid> {
    spec.validate()?;
    let lats = spec.latitudes();
    let lons = spec.longitudes();
    synthesize_geoid(table, cfg, &lats.view(), &lons.view())
}
