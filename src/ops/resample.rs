use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

use crate::components::DataType;

/// Kernel used to sample the source grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resampling {
    Nearest,
    Bilinear,
    #[default]
    Cubic,
}

/// Keys cubic convolution coefficient, as used by GDAL.
const CUBIC_A: f64 = -0.5;

fn cubic_weight(t: f64) -> f64 {
    let t = t.abs();
    if t <= 1. {
        (CUBIC_A + 2.) * t.powi(3) - (CUBIC_A + 3.) * t.powi(2) + 1.
    } else if t < 2. {
        CUBIC_A * t.powi(3) - 5. * CUBIC_A * t.powi(2) + 8. * CUBIC_A * t - 4. * CUBIC_A
    } else {
        0.
    }
}

fn linear_weight(t: f64) -> f64 {
    (1. - t.abs()).max(0.)
}

/// Samples one band at continuous pixel coordinates, where pixel `(col, row)`
/// covers `[col, col + 1) x [row, row + 1)`.
pub struct Sampler<'a, T: DataType> {
    band: ArrayView2<'a, T>,
    nodata: Option<f64>,
    method: Resampling,
}

impl<'a, T: DataType> Sampler<'a, T> {
    pub fn new(band: ArrayView2<'a, T>, nodata: Option<f64>, method: Resampling) -> Self {
        Self {
            band,
            nodata,
            method,
        }
    }

    fn value(&self, col: isize, row: isize) -> Option<f64> {
        let (rows, cols) = self.band.dim();
        if col < 0 || row < 0 || col as usize >= cols || row as usize >= rows {
            return None;
        }
        let value = self.band[[row as usize, col as usize]].to_f64()?;
        match self.nodata {
            Some(nodata) if value == nodata || (nodata.is_nan() && value.is_nan()) => None,
            _ => Some(value),
        }
    }

    /// `None` when `(x, y)` is off the grid or only nodata is in reach.
    pub fn sample(&self, x: f64, y: f64) -> Option<f64> {
        let (rows, cols) = self.band.dim();
        if !(x >= 0. && y >= 0. && x < cols as f64 && y < rows as f64) {
            return None;
        }
        match self.method {
            Resampling::Nearest => self.value(x.floor() as isize, y.floor() as isize),
            Resampling::Bilinear => self
                .convolve(x, y, 0, 1, linear_weight)
                .or_else(|| self.value(x.floor() as isize, y.floor() as isize)),
            Resampling::Cubic => self
                .convolve(x, y, 1, 2, cubic_weight)
                .or_else(|| self.value(x.floor() as isize, y.floor() as isize)),
        }
    }

    /// Separable convolution over taps `base - before ..= base + after`
    /// around the pixel centre left of `(x, y)`, renormalised over the taps
    /// holding data.
    fn convolve(
        &self,
        x: f64,
        y: f64,
        before: isize,
        after: isize,
        weight: fn(f64) -> f64,
    ) -> Option<f64> {
        let (u, v) = (x - 0.5, y - 0.5);
        let (base_col, base_row) = (u.floor() as isize, v.floor() as isize);
        let (mut sum, mut weights) = (0., 0.);
        for row in base_row - before..=base_row + after {
            let row_weight = weight(v - row as f64);
            if row_weight == 0. {
                continue;
            }
            for col in base_col - before..=base_col + after {
                let col_weight = weight(u - col as f64);
                if col_weight == 0. {
                    continue;
                }
                if let Some(value) = self.value(col, row) {
                    sum += value * row_weight * col_weight;
                    weights += row_weight * col_weight;
                }
            }
        }
        if weights.abs() < 1e-12 {
            None
        } else {
            Some(sum / weights)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};
    use rstest::{fixture, rstest};

    #[fixture]
    fn ramp() -> Array2<f32> {
        Array2::from_shape_fn((6, 6), |(row, col)| (10 * row + col) as f32)
    }

    #[rstest]
    #[case(0., 1.)]
    #[case(1., 0.)]
    #[case(2., 0.)]
    #[case(0.5, 0.5625)]
    #[case(1.5, -0.0625)]
    fn cubic_kernel(#[case] t: f64, #[case] expected: f64) {
        assert!((cubic_weight(t) - expected).abs() < 1e-12);
        assert!((cubic_weight(-t) - expected).abs() < 1e-12);
    }

    #[rstest]
    #[case(Resampling::Nearest)]
    #[case(Resampling::Bilinear)]
    #[case(Resampling::Cubic)]
    fn pixel_centres_are_exact(ramp: Array2<f32>, #[case] method: Resampling) {
        let sampler = Sampler::new(ramp.view(), None, method);
        for (row, col) in [(0, 0), (2, 3), (5, 5), (4, 1)] {
            let value = sampler.sample(col as f64 + 0.5, row as f64 + 0.5).unwrap();
            assert!((value - (10 * row + col) as f64).abs() < 1e-9);
        }
    }

    #[rstest]
    #[case(Resampling::Bilinear)]
    #[case(Resampling::Cubic)]
    fn linear_ramp_interpolates(ramp: Array2<f32>, #[case] method: Resampling) {
        let sampler = Sampler::new(ramp.view(), None, method);
        // halfway between (row 2, col 2) and (row 3, col 3)
        let value = sampler.sample(3., 3.).unwrap();
        assert!((value - 27.5).abs() < 1e-9);
    }

    #[rstest]
    fn off_grid_is_none(ramp: Array2<f32>) {
        let sampler = Sampler::new(ramp.view(), None, Resampling::Cubic);
        assert_eq!(sampler.sample(-0.1, 2.), None);
        assert_eq!(sampler.sample(2., 6.), None);
        assert_eq!(sampler.sample(f64::NAN, 2.), None);
    }

    #[rstest]
    fn nodata_is_excluded() {
        let band = array![[1., 1., -1.], [1., 1., -1.], [-1., -1., -1.]];
        let sampler = Sampler::new(band.view(), Some(-1.), Resampling::Bilinear);
        assert_eq!(sampler.sample(1.9, 1.9), Some(1.));
        assert_eq!(sampler.sample(2.5, 2.5), None);
        let nearest = Sampler::new(band.view(), Some(-1.), Resampling::Nearest);
        assert_eq!(nearest.sample(2.2, 0.5), None);
    }
}
