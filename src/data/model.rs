use std::collections::BTreeMap;
use std::fmt;

use ndarray::{Array1, Array2};

// ---------------------------------------------------------------------------
// ParsedTable – header row plus string cells
// ---------------------------------------------------------------------------

/// One parsed CSV row: column name → raw (trimmed) cell text.
pub type Row = BTreeMap<String, String>;

/// Result of parsing CSV text.
///
/// Every row holds exactly the keys in `headers`; missing trailing cells are
/// stored as empty strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedTable {
    /// Column names in file order.
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl ParsedTable {
    /// Number of data rows (header excluded).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    /// All headers except `label`, in header order.
    pub fn feature_names(&self, label: &str) -> Vec<String> {
        self.headers
            .iter()
            .filter(|h| h.as_str() != label)
            .cloned()
            .collect()
    }
}

// ---------------------------------------------------------------------------
// NumericDataset – validated features and labels
// ---------------------------------------------------------------------------

/// Numeric training data: one row of `x` per retained CSV row, `y` aligned
/// by index. Every element is finite.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericDataset {
    pub x: Array2<f64>,
    pub y: Array1<f64>,
}

impl NumericDataset {
    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }
}

// ---------------------------------------------------------------------------
// FeatureSummary – display statistics for one column
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureSummary {
    Numeric {
        min: f64,
        max: f64,
        mean: f64,
        count: usize,
    },
    /// No cell in the column could be read as a number.
    NonNumeric,
}

impl FeatureSummary {
    /// `min – max` hint used as a prediction-input placeholder.
    pub fn range_hint(&self) -> Option<String> {
        match self {
            FeatureSummary::Numeric { min, max, .. } => Some(format!("{min:.2} – {max:.2}")),
            FeatureSummary::NonNumeric => None,
        }
    }
}

impl fmt::Display for FeatureSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureSummary::Numeric { min, max, mean, .. } => {
                write!(f, "min={min:.3} max={max:.3} mean={mean:.3}")
            }
            FeatureSummary::NonNumeric => write!(f, "non-numeric"),
        }
    }
}
