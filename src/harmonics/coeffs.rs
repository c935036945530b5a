//! Spherical-harmonic coefficient table and the ICGEM `.gfc` reader.

use crate::config::{DEFAULT_GM, DEFAULT_R0};
use crate::error::{GeoidError, Result};
use ndarray::Array2;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::{info, warn};

/// Fully-normalized C̄_lm / S̄_lm coefficients up to degree `lmax`.
///
/// Both matrices are `(lmax + 1) x (lmax + 1)`; only the lower triangle
/// (m <= l) is meaningful and the rest stays zero.
#[derive(Debug, Clone)]
pub struct CoefficientTable {
    pub gm: Option<f64>,
    pub r0: Option<f64>,
    pub max_degree_in_file: usize,
    c: Array2<f64>,
    s: Array2<f64>,
}

impl CoefficientTable {
    /// All-zero table with no header constants.
    pub fn zeros(lmax: usize) -> Self {
        Self {
            gm: None,
            r0: None,
            max_degree_in_file: 0,
            c: Array2::zeros((lmax + 1, lmax + 1)),
            s: Array2::zeros((lmax + 1, lmax + 1)),
        }
    }

    /// Builds a table from dense matrices.
    pub fn from_arrays(c: Array2<f64>, s: Array2<f64>, gm: Option<f64>, r0: Option<f64>) -> Result<Self> {
        if c.dim() != s.dim() {
            return Err(GeoidError::invalid(format!(
                "C and S shapes differ: {:?} vs {:?}",
                c.dim(),
                s.dim()
            )));
        }
        let (rows, cols) = c.dim();
        if rows == 0 || rows != cols {
            return Err(GeoidError::invalid(format!(
                "coefficient matrices must be square and non-empty, got {}x{}",
                rows, cols
            )));
        }
        let mut max_degree_in_file = 0;
        for (((l, m), &cv), &sv) in c.indexed_iter().zip(s.iter()) {
            if m > l {
                continue;
            }
            if cv != 0.0 || sv != 0.0 {
                max_degree_in_file = max_degree_in_file.max(l);
            }
        }
        let mut table = Self {
            gm,
            r0,
            max_degree_in_file,
            c,
            s,
        };
        table.clear_upper_triangle();
        Ok(table)
    }

    fn clear_upper_triangle(&mut self) {
        for ((l, m), v) in self.c.indexed_iter_mut() {
            if m > l {
                *v = 0.0;
            }
        }
        for ((l, m), v) in self.s.indexed_iter_mut() {
            if m > l {
                *v = 0.0;
            }
        }
    }

    /// Highest degree the table can hold.
    pub fn lmax(&self) -> usize {
        self.c.nrows() - 1
    }

    /// Stores one coefficient pair. Entries with m > l or l > lmax are refused.
    pub fn set(&mut self, l: usize, m: usize, c: f64, s: f64) -> Result<()> {
        if m > l || l > self.lmax() {
            return Err(GeoidError::invalid(format!(
                "coefficient ({}, {}) outside 0 <= m <= l <= {}",
                l,
                m,
                self.lmax()
            )));
        }
        self.c[[l, m]] = c;
        self.s[[l, m]] = s;
        if c != 0.0 || s != 0.0 {
            self.max_degree_in_file = self.max_degree_in_file.max(l);
        }
        Ok(())
    }

    #[inline]
    pub fn c(&self, l: usize, m: usize) -> f64 {
        self.c[[l, m]]
    }

    #[inline]
    pub fn s(&self, l: usize, m: usize) -> f64 {
        self.s[[l, m]]
    }

    /// (GM, r0), falling back to the default Earth constants when either
    /// header value is missing.
    pub fn constants(&self) -> (f64, f64) {
        match (self.gm, self.r0) {
            (Some(gm), Some(r0)) => (gm, r0),
            _ => (DEFAULT_GM, DEFAULT_R0),
        }
    }

    /// Parses `.gfc` text, keeping coefficients up to `lmax`.
    ///
    /// Malformed numbers drop only their own line; lines with l > lmax or
    /// m > l are skipped.
    pub fn from_reader<R: Read>(reader: R, lmax: usize) -> Result<Self> {
        let mut table = Self::zeros(lmax);
        let mut ignored = 0usize;

        for raw in BufReader::new(reader).split(b'\n') {
            let raw = raw?;
            // 비 UTF-8 바이트는 무시
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let parts: Vec<&str> = line.split_whitespace().collect();

            match parts[0] {
                "earth_gravity_constant" if parts.len() >= 2 => {
                    if let Some(v) = parse_real(parts[1]) {
                        table.gm = Some(v);
                    }
                }
                "radius" if parts.len() >= 2 => {
                    if let Some(v) = parse_real(parts[1]) {
                        table.r0 = Some(v);
                    }
                }
                "gfc" if parts.len() >= 5 => {
                    let parsed = (|| {
                        let l = parts[1].parse::<usize>().ok()?;
                        let m = parts[2].parse::<usize>().ok()?;
                        if l > lmax || m > l {
                            return None;
                        }
                        Some((l, m, parse_real(parts[3])?, parse_real(parts[4])?))
                    })();
                    match parsed {
                        Some((l, m, c, s)) => {
                            table.c[[l, m]] = c;
                            table.s[[l, m]] = s;
                            table.max_degree_in_file = table.max_degree_in_file.max(l);
                        }
                        None => ignored += 1,
                    }
                }
                _ => {}
            }
        }

        if ignored > 0 {
            warn!(ignored, lmax, "skipped coefficient lines outside range or unparsable");
        }
        Ok(table)
    }
}

/// Reads a `.gfc` file from disk.
pub fn load_coefficients(path: impl AsRef<Path>, lmax: usize) -> Result<CoefficientTable> {
    let path = path.as_ref();
    let table = CoefficientTable::from_reader(File::open(path)?, lmax)?;
    info!(
        path = %path.display(),
        lmax,
        max_degree_in_file = table.max_degree_in_file,
        has_constants = table.gm.is_some() && table.r0.is_some(),
        "loaded coefficients"
    );
    Ok(table)
}

/// Accepts Fortran-style `D` exponents as well as plain floats.
fn parse_real(token: &str) -> Option<f64> {
    token
        .parse::<f64>()
        .ok()
        .or_else(|| token.replace(['D', 'd'], "e").parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;

    const SAMPLE: &str = "\
product_type              gravity_field
modelname                 TOY
earth_gravity_constant    0.3986004415E+15
radius                    0.6378136300E+07
max_degree                4
# comment line
end_of_head ==========================================================
gfc    2    0   -0.484165143790815D-03    0.000000000000E+00
gfc    2    1   -0.206615509074176E-09    0.138441389137979E-08
gfc    2    2    0.243938357328313E-05   -0.140027370385934E-05
gfc    3    4    1.0                       1.0
gfc    5    0    1.0                       0.0
gfc    3    0    not_a_number              0.0
gfc    3    1    0.203046201047864E-05    0.248200415856872E-06
";

    #[test]
    fn test_parse_header_and_coefficients() {
        let table = CoefficientTable::from_reader(SAMPLE.as_bytes(), 4).unwrap();
        assert_relative_eq!(table.gm.unwrap(), 3.986004415e14);
        assert_relative_eq!(table.r0.unwrap(), 6378136.3);
        assert_eq!(table.lmax(), 4);
        assert_eq!(table.max_degree_in_file, 3);

        assert_relative_eq!(table.c(2, 0), -0.484165143790815e-3);
        assert_relative_eq!(table.s(2, 2), -0.140027370385934e-5);
        assert_relative_eq!(table.c(3, 1), 0.203046201047864e-5);
        // m > l, l > lmax, 파싱 실패 줄은 무시
        assert_eq!(table.c(3, 0), 0.0);
        assert_eq!(table.c(4, 0), 0.0);
        assert_eq!(table.s(3, 0), 0.0);
    }

    #[test]
    fn test_missing_constants_fall_back() {
        let table = CoefficientTable::from_reader("gfc 2 0 1.0 0.0\n".as_bytes(), 2).unwrap();
        assert!(table.gm.is_none());
        assert_eq!(table.constants(), (DEFAULT_GM, DEFAULT_R0));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let table = load_coefficients(file.path(), 2).unwrap();
        assert_eq!(table.lmax(), 2);
        assert_eq!(table.max_degree_in_file, 2);
        assert!(load_coefficients("/nonexistent/model.gfc", 2).is_err());
    }

    #[test]
    fn test_set_rejects_upper_triangle() {
        let mut table = CoefficientTable::zeros(3);
        assert!(table.set(2, 3, 1.0, 0.0).is_err());
        assert!(table.set(4, 0, 1.0, 0.0).is_err());
        table.set(3, 3, 0.5, -0.5).unwrap();
        assert_eq!(table.max_degree_in_file, 3);
    }

    #[test]
    fn test_from_arrays_shape_checks() {
        let c = Array2::zeros((3, 3));
        let s = Array2::zeros((4, 4));
        assert!(CoefficientTable::from_arrays(c, s, None, None).is_err());

        let mut c = Array2::ones((3, 3));
        c[[0, 0]] = 0.0;
        let s = Array2::zeros((3, 3));
        let table = CoefficientTable::from_arrays(c, s, None, None).unwrap();
        assert_eq!(table.c(0, 2), 0.0);
        assert_eq!(table.c(2, 1), 1.0);
        assert_eq!(table.max_degree_in_file, 2);
    }

    #[test]
    fn test_from_arrays_degree_from_sine_terms() {
        // S 만 0 이 아닌 차수도 포함, 상삼각은 제외
        let c = Array2::zeros((4, 4));
        let mut s = Array2::zeros((4, 4));
        s[[2, 1]] = 0.5;
        s[[1, 3]] = 9.0;
        let table = CoefficientTable::from_arrays(c, s, Some(1.0), Some(2.0)).unwrap();
        assert_eq!(table.max_degree_in_file, 2);
        assert_eq!(table.s(2, 1), 0.5);
        assert_eq!(table.s(1, 3), 0.0);
        assert_eq!(table.constants(), (1.0, 2.0));
    }
}
