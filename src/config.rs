//! 합성/렌더링 설정
//!
//! Every config validates itself before any computation starts, so a bad
//! flag fails fast with `InvalidConfiguration`.

use crate::error::{GeoidError, Result};
use ndarray::Array1;

/// Default Earth gravitational parameter GM [m^3/s^2], used when the
/// coefficient file carries none.
pub const DEFAULT_GM: f64 = 3.986004415e14;

/// Default reference radius [m].
pub const DEFAULT_R0: f64 = 6378136.3;

/// Normal gravity used to turn disturbing potential into a height [m/s^2].
pub const DEFAULT_GAMMA: f64 = 9.81;

/// Clamp applied to x = sin(lat) so it never reaches ±1 exactly.
pub const X_CLAMP_EPS: f64 = 1e-12;

/// Rows with |x| this close to 1 skip every m > 0 term.
pub const NEAR_POLE_TOL: f64 = 1e-10;

/// Latitude offset keeping the first/last grid rows off the poles [deg].
pub const DEFAULT_POLE_EPS_DEG: f64 = 1e-6;

/// 조화 합성 설정
#[derive(Debug, Clone)]
pub struct SynthesisConfig {
    /// 최대 차수 (L_max)
    pub lmax: usize,

    /// 최소 차수; degree 0/1 carry mass and centre-of-mass terms
    pub lmin: usize,

    /// 정규 중력 [m/s^2]
    pub gamma: f64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            lmax: 180,
            lmin: 2,
            gamma: DEFAULT_GAMMA,
        }
    }
}

impl SynthesisConfig {
    pub fn new(lmax: usize) -> Self {
        Self {
            lmax,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.lmin > self.lmax {
            return Err(GeoidError::invalid(format!(
                "lmin ({}) exceeds lmax ({})",
                self.lmin, self.lmax
            )));
        }
        if !(self.gamma.is_finite() && self.gamma > 0.0) {
            return Err(GeoidError::invalid(format!(
                "gamma must be positive and finite, got {}",
                self.gamma
            )));
        }
        Ok(())
    }
}

/// 위도/경도 격자 설정
#[derive(Debug, Clone)]
pub struct GridSpec {
    /// 격자 간격 [deg]
    pub step_deg: f64,

    /// 극 회피 오프셋 [deg]
    pub pole_eps_deg: f64,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            step_deg: 1.0,
            pole_eps_deg: DEFAULT_POLE_EPS_DEG,
        }
    }
}

impl GridSpec {
    pub fn with_step(step_deg: f64) -> Self {
        Self {
            step_deg,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.step_deg.is_finite() && self.step_deg > 0.0 && self.step_deg <= 180.0) {
            return Err(GeoidError::invalid(format!(
                "grid step must be in (0, 180] degrees, got {}",
                self.step_deg
            )));
        }
        if !(self.pole_eps_deg.is_finite() && self.pole_eps_deg > 0.0 && self.pole_eps_deg < 1.0) {
            return Err(GeoidError::invalid(format!(
                "pole epsilon must be in (0, 1) degrees, got {}",
                self.pole_eps_deg
            )));
        }
        Ok(())
    }

    /// Latitudes from north to south, poles excluded by `pole_eps_deg`.
    pub fn latitudes(&self) -> Array1<f64> {
        let n = (180.0 / self.step_deg).round() as usize + 1;
        Array1::linspace(90.0 - self.pole_eps_deg, -90.0 + self.pole_eps_deg, n)
    }

    /// Longitudes in [0, 360), endpoint excluded.
    pub fn longitudes(&self) -> Array1<f64> {
        let n = ((360.0 / self.step_deg).round() as usize).max(1);
        let step = 360.0 / n as f64;
        Array1::from_shape_fn(n, |j| j as f64 * step)
    }
}

/// 비디오 렌더링 설정
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub fps: u32,
    pub duration_s: f64,

    /// 출력 프레임 한 변의 픽셀 수
    pub size_px: usize,

    /// 시점 기울기 (sub-latitude) [deg]
    pub lat0_deg: f64,

    /// 자전 속도 [deg/s]
    pub spin_deg_per_s: f64,

    pub background: [u8; 3],
    pub rim_color: [u8; 3],

    /// Inner radius of the rim ring, in unit-disk coordinates
    pub rim_inner: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            fps: 60,
            duration_s: 6.0,
            size_px: 720,
            lat0_deg: 15.0,
            spin_deg_per_s: 60.0,
            background: [11, 11, 18],
            rim_color: [32, 32, 48],
            rim_inner: 0.992,
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.fps == 0 {
            return Err(GeoidError::invalid("fps must be at least 1"));
        }
        if !(self.duration_s.is_finite() && self.duration_s >= 0.0) {
            return Err(GeoidError::invalid(format!(
                "duration must be finite and non-negative, got {}",
                self.duration_s
            )));
        }
        if self.size_px < 2 {
            return Err(GeoidError::invalid(format!(
                "frame size must be at least 2 pixels, got {}",
                self.size_px
            )));
        }
        if !(self.lat0_deg.is_finite() && self.lat0_deg.abs() <= 90.0) {
            return Err(GeoidError::invalid(format!(
                "viewing tilt must be within [-90, 90] degrees, got {}",
                self.lat0_deg
            )));
        }
        if !self.spin_deg_per_s.is_finite() {
            return Err(GeoidError::invalid("spin rate must be finite"));
        }
        if !(self.rim_inner.is_finite() && (0.0..=1.0).contains(&self.rim_inner)) {
            return Err(GeoidError::invalid(format!(
                "rim inner radius must be within [0, 1], got {}",
                self.rim_inner
            )));
        }
        Ok(())
    }

    /// Number of frames for the configured duration, never less than one.
    pub fn frame_count(&self) -> usize {
        ((self.fps as f64 * self.duration_s).round() as usize).max(1)
    }

    /// Sub-longitude for frame `k` [deg, 0..360).
    pub fn sub_longitude(&self, k: usize) -> f64 {
        let t = k as f64 / self.fps as f64;
        (t * self.spin_deg_per_s).rem_euclid(360.0)
    }
}
