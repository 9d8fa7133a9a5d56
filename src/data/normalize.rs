use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Value assigned to every entry of a constant column.
pub const DEGENERATE_VALUE: f64 = 0.5;

// ---------------------------------------------------------------------------
// NormalizationParams – per-feature min / max from the training set
// ---------------------------------------------------------------------------

/// Training-time column ranges. Reuse these for every later prediction so
/// inputs are scaled exactly like the training data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizationParams {
    pub mins: Vec<f64>,
    pub maxs: Vec<f64>,
}

impl NormalizationParams {
    pub fn n_features(&self) -> usize {
        self.mins.len()
    }

    /// Scale one value of column `idx`.
    ///
    /// Constant columns map to 0.5. Values outside the training range are
    /// extrapolated, not clamped. Spans too wide for `f64` are computed on
    /// halved operands.
    fn scale_value(&self, idx: usize, value: f64) -> f64 {
        let (min, max) = (self.mins[idx], self.maxs[idx]);
        if min == max {
            return DEGENERATE_VALUE;
        }
        let range = max - min;
        if range.is_finite() {
            (value - min) / range
        } else {
            (value / 2.0 - min / 2.0) / (max / 2.0 - min / 2.0)
        }
    }

    /// Scale a single sample for prediction.
    ///
    /// Fails with `InvalidPredictionInput` unless `sample` has exactly one
    /// value per feature.
    pub fn scale_one(&self, sample: &[f64]) -> Result<Vec<f64>> {
        if sample.len() != self.n_features() {
            return Err(PipelineError::InvalidPredictionInput(format!(
                "expected {} values to scale, got {}",
                self.n_features(),
                sample.len()
            )));
        }
        Ok(sample
            .iter()
            .enumerate()
            .map(|(i, &v)| self.scale_value(i, v))
            .collect())
    }
}

/// Min-max scaled matrix together with the ranges that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub x: Array2<f64>,
    pub params: NormalizationParams,
}

/// Apply MinMax scaling column by column: (x - min) / (max - min).
///
/// An empty matrix yields empty params.
pub fn normalize(x: &Array2<f64>) -> Normalized {
    if x.nrows() == 0 {
        return Normalized {
            x: Array2::zeros((0, 0)),
            params: NormalizationParams::default(),
        };
    }

    let mins = x.fold_axis(Axis(0), f64::INFINITY, |&a, &b| a.min(b));
    let maxs = x.fold_axis(Axis(0), f64::NEG_INFINITY, |&a, &b| a.max(b));
    let params = NormalizationParams {
        mins: mins.to_vec(),
        maxs: maxs.to_vec(),
    };

    let mut scaled = x.clone();
    for (col_idx, mut col) in scaled.axis_iter_mut(Axis(1)).enumerate() {
        col.mapv_inplace(|v| params.scale_value(col_idx, v));
    }

    Normalized { x: scaled, params }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_normalize_simple() {
        let n = normalize(&array![[1.0, 2.0], [3.0, 4.0]]);
        assert_eq!(n.params.mins, vec![1.0, 2.0]);
        assert_eq!(n.params.maxs, vec![3.0, 4.0]);
        assert_eq!(n.x, array![[0.0, 0.0], [1.0, 1.0]]);
    }

    #[test]
    fn test_normalize_midpoints() {
        let n = normalize(&array![[0.0, 10.0], [5.0, 20.0], [10.0, 30.0]]);
        assert_abs_diff_eq!(n.x[[1, 0]], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(n.x[[1, 1]], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_constant_column_is_half() {
        let n = normalize(&array![[5.0, 10.0], [5.0, 20.0], [5.0, 30.0]]);
        for row in 0..3 {
            assert_eq!(n.x[[row, 0]], 0.5);
        }
        assert_eq!(n.x[[0, 1]], 0.0);
        assert_eq!(n.x[[2, 1]], 1.0);
    }

    #[test]
    fn test_single_row_is_all_half() {
        let n = normalize(&array![[3.0, -1.0, 42.0]]);
        assert_eq!(n.params.mins, n.params.maxs);
        assert!(n.x.iter().all(|&v| v == 0.5));
    }

    #[test]
    fn test_empty_input() {
        let n = normalize(&Array2::zeros((0, 3)));
        assert!(n.params.mins.is_empty());
        assert!(n.params.maxs.is_empty());
        assert_eq!(n.x.len(), 0);
    }

    #[test]
    fn test_negative_values_in_unit_range() {
        let n = normalize(&array![[-10.0], [0.0], [10.0], [2.5]]);
        assert!(n.x.iter().all(|&v| (0.0..=1.0).contains(&v)));
        assert_abs_diff_eq!(n.x[[1, 0]], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_second_pass_is_unit_range() {
        let x = array![[3.0, 100.0], [-7.0, 250.0], [11.5, 175.0]];
        let first = normalize(&x);
        let second = normalize(&first.x);
        assert_eq!(second.params.mins, vec![0.0, 0.0]);
        assert_eq!(second.params.maxs, vec![1.0, 1.0]);
    }

    #[test]
    fn test_scale_one_matches_training_and_extrapolates() {
        let x = array![[1.0, 2.0, 7.0], [3.0, 4.0, 7.0]];
        let n = normalize(&x);

        assert_eq!(n.params.scale_one(&[1.0, 4.0, 7.0]).unwrap(), vec![0.0, 1.0, 0.5]);
        // constant column stays 0.5 whatever the value
        assert_eq!(n.params.scale_one(&[2.0, 3.0, 99.0]).unwrap(), vec![0.5, 0.5, 0.5]);
        // outside the training range: not clamped
        assert_eq!(n.params.scale_one(&[5.0, 0.0, 7.0]).unwrap(), vec![2.0, -1.0, 0.5]);
    }

    #[test]
    fn test_scale_one_rejects_wrong_length() {
        let n = normalize(&array![[1.0, 2.0], [3.0, 4.0]]);
        assert!(matches!(
            n.params.scale_one(&[1.0]),
            Err(PipelineError::InvalidPredictionInput(_))
        ));
        assert!(matches!(
            n.params.scale_one(&[1.0, 2.0, 3.0]),
            Err(PipelineError::InvalidPredictionInput(_))
        ));
    }

    #[test]
    fn test_span_wider_than_f64_stays_in_unit_range() {
        let n = normalize(&array![[-1e308], [1e308], [0.0]]);
        assert_eq!(n.x.column(0).to_vec(), vec![0.0, 1.0, 0.5]);
        assert!(n.x.iter().all(|v| (0.0..=1.0).contains(v)));

        let scaled = n.params.scale_one(&[5e307]).unwrap();
        assert_abs_diff_eq!(scaled[0], 0.75, epsilon = 1e-12);
    }
}
