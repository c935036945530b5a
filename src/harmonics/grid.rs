use crate::error::{GeoidError, Result};
use ndarray::{Array1, Array2};

/// Synthesized scalar field on a latitude x longitude grid.
///
/// Rows follow `lats` (descending, north first), columns follow `lons`
/// (ascending in [0, 360)). Cells that failed to synthesize hold NaN.
#[derive(Debug, Clone)]
pub struct ScalarGrid {
    lats: Array1<f64>,
    lons: Array1<f64>,
    values: Array2<f64>,
}

impl ScalarGrid {
    pub fn new(lats: Array1<f64>, lons: Array1<f64>, values: Array2<f64>) -> Result<Self> {
        if values.dim() != (lats.len(), lons.len()) {
            return Err(GeoidError::invalid(format!(
                "grid values {:?} do not match {} latitudes x {} longitudes",
                values.dim(),
                lats.len(),
                lons.len()
            )));
        }
        Ok(Self { lats, lons, values })
    }

    pub fn lats(&self) -> &Array1<f64> {
        &self.lats
    }

    pub fn lons(&self) -> &Array1<f64> {
        &self.lons
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn into_values(self) -> Array2<f64> {
        self.values
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    pub fn finite_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_finite()).count()
    }

    /// Mean over finite cells, `None` when there are none.
    pub fn finite_mean(&self) -> Option<f64> {
        let (sum, count) = self
            .values
            .iter()
            .filter(|v| v.is_finite())
            .fold((0.0, 0usize), |(s, n), &v| (s + v, n + 1));
        (count > 0).then(|| sum / count as f64)
    }

    /// Subtracts the finite mean from every finite cell and returns it.
    pub(crate) fn remove_finite_mean(&mut self) -> Option<f64> {
        let mean = self.finite_mean()?;
        self.values.mapv_inplace(|v| if v.is_finite() { v - mean } else { v });
        Some(mean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::arr2;

    #[test]
    fn test_finite_mean_skips_nan() {
        let grid = ScalarGrid::new(
            Array1::from(vec![10.0, -10.0]),
            Array1::from(vec![0.0, 120.0, 240.0]),
            arr2(&[[1.0, f64::NAN, 3.0], [5.0, f64::INFINITY, 7.0]]),
        )
        .unwrap();
        assert_eq!(grid.shape(), (2, 3));
        assert_eq!(grid.finite_count(), 4);
        assert_relative_eq!(grid.finite_mean().unwrap(), 4.0);
    }

    #[test]
    fn test_remove_mean_keeps_undefined_cells() {
        let mut grid = ScalarGrid::new(
            Array1::from(vec![0.0]),
            Array1::from(vec![0.0, 180.0, 270.0]),
            arr2(&[[2.0, f64::NAN, 4.0]]),
        )
        .unwrap();
        assert_relative_eq!(grid.remove_finite_mean().unwrap(), 3.0);
        assert_relative_eq!(grid.values()[[0, 0]], -1.0);
        assert!(grid.values()[[0, 1]].is_nan());
        assert_relative_eq!(grid.finite_mean().unwrap(), 0.0);
    }

    #[test]
    fn test_shape_mismatch() {
        let res = ScalarGrid::new(
            Array1::from(vec![0.0, 1.0]),
            Array1::from(vec![0.0]),
            Array2::zeros((1, 1)),
        );
        assert!(res.is_err());
    }

    #[test]
    fn test_all_undefined() {
        let grid = ScalarGrid::new(
            Array1::from(vec![0.0]),
            Array1::from(vec![0.0]),
            arr2(&[[f64::NAN]]),
        )
        .unwrap();
        assert!(grid.finite_mean().is_none());
    }
}
