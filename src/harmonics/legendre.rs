//! Fully-normalized associated Legendre functions.
//!
//! P̄_lm(x) = sqrt((2 - δ_m0)(2l + 1)(l - m)!/(l + m)!) · P_lm(x), with the
//! Condon-Shortley phase kept in P_lm. Under this convention the surface
//! harmonics built from P̄_lm are orthonormal over the sphere with 4π
//! normalization, i.e. ∫_{-1}^{1} P̄_lm(x)² dx = 2(2 - δ_m0).

use crate::error::{GeoidError, Result};
use statrs::function::gamma::ln_gamma;

/// ln((2m - 1)!!) = ln((2m)!) - m ln 2 - ln(m!)
fn ln_double_factorial_odd(m: usize) -> f64 {
    let m = m as f64;
    ln_gamma(2.0 * m + 1.0) - m * std::f64::consts::LN_2 - ln_gamma(m + 1.0)
}

/// ln of the normalization factor; the factorial ratio is taken as a
/// difference of log-gamma values so large degrees never overflow.
fn ln_norm(l: usize, m: usize) -> f64 {
    let k = if m == 0 { 1.0 } else { 2.0 };
    let log_ratio = ln_gamma((l - m) as f64 + 1.0) - ln_gamma((l + m) as f64 + 1.0);
    0.5 * ((k * (2.0 * l as f64 + 1.0)).ln() + log_ratio)
}

/// Evaluates P̄_lm(x) for a single (degree, order, argument) query.
///
/// Arguments outside 0 <= m <= l or x outside the open interval (-1, 1) are
/// rejected. The returned value may be non-finite when the evaluation is
/// unstable (very high degree). Series sums go through [`LegendreRow`],
/// whose lookups report such entries as `None`.
pub fn fully_normalized_legendre(l: usize, m: usize, x: f64) -> Result<f64> {
    if m > l {
        return Err(GeoidError::invalid(format!(
            "order m={} exceeds degree l={}",
            m, l
        )));
    }
    if !(x.is_finite() && x > -1.0 && x < 1.0) {
        return Err(GeoidError::invalid(format!(
            "Legendre argument must lie in (-1, 1), got {}",
            x
        )));
    }
    Ok(evaluate(l, m, x))
}

/// Unnormalized upward recurrence in l, seeded with the sectoral term
/// (-1)^m (2m-1)!! (1-x²)^{m/2}. The double factorial is kept out of the
/// recurrence as a log scale and recombined with the normalization at the end.
fn evaluate(l: usize, m: usize, x: f64) -> f64 {
    let u = ((1.0 - x) * (1.0 + x)).sqrt();
    let sign = if m % 2 == 0 { 1.0 } else { -1.0 };
    let p_mm = sign * u.powi(m as i32);

    let scaled = if l == m {
        p_mm
    } else {
        let mut p_prev = p_mm;
        let mut p_curr = x * (2 * m + 1) as f64 * p_mm;
        for ll in (m + 2)..=l {
            let p_next = ((2 * ll - 1) as f64 * x * p_curr - (ll + m - 1) as f64 * p_prev)
                / (ll - m) as f64;
            p_prev = p_curr;
            p_curr = p_next;
        }
        p_curr
    };

    if scaled == 0.0 {
        return 0.0;
    }
    scaled * (ln_double_factorial_odd(m) + ln_norm(l, m)).exp()
}

/// Triangular table of P̄_lm(x) for every 0 <= m <= l <= lmax at one x.
///
/// Filled with the fully-normalized sectoral/column recursion, which stays
/// bounded where the unnormalized recurrence overflows. Costs O(lmax²), so
/// the synthesizer builds one per latitude row.
#[derive(Debug, Clone)]
pub struct LegendreRow {
    lmax: usize,
    values: Vec<f64>,
}

#[inline]
fn tri_index(l: usize, m: usize) -> usize {
    l * (l + 1) / 2 + m
}

impl LegendreRow {
    /// `x` must lie in [-1, 1].
    pub fn compute(lmax: usize, x: f64) -> Self {
        let mut values = vec![0.0; tri_index(lmax, lmax) + 1];
        let u = ((1.0 - x) * (1.0 + x)).max(0.0).sqrt();

        values[0] = 1.0;
        for m in 0..=lmax {
            if m > 0 {
                let f = if m == 1 {
                    3.0_f64.sqrt()
                } else {
                    ((2 * m + 1) as f64 / (2 * m) as f64).sqrt()
                };
                values[tri_index(m, m)] = -u * f * values[tri_index(m - 1, m - 1)];
            }
            if m < lmax {
                values[tri_index(m + 1, m)] =
                    ((2 * m + 3) as f64).sqrt() * x * values[tri_index(m, m)];
            }
            for l in (m + 2)..=lmax {
                let lf = l as f64;
                let mf = m as f64;
                let den = (lf - mf) * (lf + mf);
                let a = ((2.0 * lf - 1.0) * (2.0 * lf + 1.0) / den).sqrt();
                let b = ((2.0 * lf + 1.0) * (lf + mf - 1.0) * (lf - mf - 1.0)
                    / (den * (2.0 * lf - 3.0)))
                    .sqrt();
                values[tri_index(l, m)] =
                    a * x * values[tri_index(l - 1, m)] - b * values[tri_index(l - 2, m)];
            }
        }

        Self { lmax, values }
    }

    pub fn lmax(&self) -> usize {
        self.lmax
    }

    /// P̄_lm(x), or `None` when out of range or non-finite.
    #[inline]
    pub fn get(&self, l: usize, m: usize) -> Option<f64> {
        if m > l || l > self.lmax {
            return None;
        }
        let v = self.values[tri_index(l, m)];
        v.is_finite().then_some(v)
    }
}
