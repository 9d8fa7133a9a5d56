use ndarray::Array2;

use super::matrix::coerce_number;
use super::model::{FeatureSummary, Row};

/// Summarise values into min / max / mean, or `NonNumeric` when empty.
fn summarize(values: impl IntoIterator<Item = f64>) -> FeatureSummary {
    let mut count = 0usize;
    let mut sum = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for v in values {
        count += 1;
        sum += v;
        min = min.min(v);
        max = max.max(v);
    }

    if count == 0 {
        return FeatureSummary::NonNumeric;
    }
    FeatureSummary::Numeric {
        min,
        max,
        mean: sum / count as f64,
        count,
    }
}

/// Per-column statistics over raw rows, for display.
///
/// Each column is filtered on its own: a cell that fails coercion is skipped
/// without discarding the rest of its row. This can count rows that the
/// dataset builder drops.
pub fn feature_stats(rows: &[Row], features: &[String]) -> Vec<(String, FeatureSummary)> {
    features
        .iter()
        .map(|name| {
            let values = rows
                .iter()
                .filter_map(|row| row.get(name).and_then(|v| coerce_number(v)));
            (name.clone(), summarize(values))
        })
        .collect()
}

/// Per-column statistics over an already validated (unscaled) matrix.
pub fn matrix_stats(x: &Array2<f64>) -> Vec<FeatureSummary> {
    x.columns()
        .into_iter()
        .map(|col| summarize(col.iter().copied()))
        .collect()
}
