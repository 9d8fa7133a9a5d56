use ndarray::{Array1, Array2};

use super::model::{NumericDataset, Row};

/// Read a cell as a finite number.
///
/// Surrounding whitespace is ignored; empty text, non-numeric text and
/// non-finite values (`inf`, `NaN`) all yield `None`.
pub fn coerce_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Convert string rows into a feature matrix and label vector.
///
/// A row is kept only if every feature and the label coerce to finite
/// numbers; otherwise it is dropped whole. Surviving rows keep their order.
/// An all-dropped input yields an empty dataset, which callers must reject.
pub fn build_dataset(rows: &[Row], feature_names: &[String], label_name: &str) -> NumericDataset {
    let n_features = feature_names.len();
    let mut kept: Vec<Vec<f64>> = Vec::with_capacity(rows.len());
    let mut labels: Vec<f64> = Vec::with_capacity(rows.len());

    for row in rows {
        let features: Option<Vec<f64>> = feature_names
            .iter()
            .map(|name| row.get(name).and_then(|v| coerce_number(v)))
            .collect();
        let label = row.get(label_name).and_then(|v| coerce_number(v));

        if let (Some(features), Some(label)) = (features, label) {
            kept.push(features);
            labels.push(label);
        }
    }

    let dropped = rows.len() - labels.len();
    if dropped > 0 {
        log::debug!("Dropped {dropped} of {} rows with non-numeric cells", rows.len());
    }

    // every kept row has exactly one value per feature name
    let x = Array2::from_shape_fn((kept.len(), n_features), |(r, c)| kept[r][c]);

    NumericDataset {
        x,
        y: Array1::from(labels),
    }
}
