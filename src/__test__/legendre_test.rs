//! 르장드르 함수 성질 테스트

use crate::harmonics::{fully_normalized_legendre, LegendreRow};
use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn test_normalized_values_bounded() {
    // |P̄_lm(x)| <= sqrt((2 - δ_m0)(2l + 1))
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..2000 {
        let l = rng.gen_range(0..=60usize);
        let m = rng.gen_range(0..=l);
        let x: f64 = rng.gen_range(-0.999..0.999);
        let p = fully_normalized_legendre(l, m, x).unwrap();
        let k = if m == 0 { 1.0 } else { 2.0 };
        let bound = (k * (2 * l + 1) as f64).sqrt();
        assert!(p.is_finite(), "P̄_{}{}({}) not finite", l, m, x);
        assert!(p.abs() <= bound * (1.0 + 1e-9), "P̄_{}{}({}) = {} exceeds {}", l, m, x, p, bound);
    }
}

#[test]
fn test_row_parity() {
    // P̄_lm(-x) = (-1)^(l+m) P̄_lm(x)
    let row = LegendreRow::compute(30, 0.37);
    let mirrored = LegendreRow::compute(30, -0.37);
    for l in 0..=30 {
        for m in 0..=l {
            let sign = if (l + m) % 2 == 0 { 1.0 } else { -1.0 };
            let a = row.get(l, m).unwrap();
            let b = mirrored.get(l, m).unwrap();
            assert_relative_eq!(b, sign * a, epsilon = 1e-10, max_relative = 1e-9);
        }
    }
}

#[test]
fn test_sectoral_vanishes_toward_pole() {
    let near_pole = 1.0 - 1e-10;
    let p = fully_normalized_legendre(8, 8, near_pole).unwrap();
    assert!(p.abs() < 1e-10, "{}", p);
    // zonal terms stay finite and nonzero at the pole
    let p0 = fully_normalized_legendre(8, 0, near_pole).unwrap();
    assert_relative_eq!(p0, (17.0_f64).sqrt(), max_relative = 1e-6);
}
