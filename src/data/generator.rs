use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Column layout of the generated example table; `failure` is the label.
pub const EXAMPLE_COLUMNS: [&str; 6] = [
    "age",
    "pressure",
    "flow",
    "leak_history",
    "corrosion_index",
    "failure",
];

/// Probability that a synthetic pipe has a recorded leak.
const LEAK_PROBABILITY: f64 = 0.12;
/// Upper bound on the per-row failure probability.
const MAX_FAILURE_PROBABILITY: f64 = 0.95;

/// Deterministic risk score of one pipe segment.
///
/// Weighted mix of age (years), corrosion index (0–10), leak history (0/1)
/// and deviation of pressure from 4 bar.
pub fn risk_score(age: f64, pressure: f64, leak_history: u8, corrosion_index: f64) -> f64 {
    0.4 * (age / 60.0)
        + 0.35 * (corrosion_index / 10.0)
        + 0.18 * f64::from(leak_history)
        + 0.07 * (pressure - 4.0).abs() / 4.0
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Synthesises a labelled pipeline-failure table as CSV text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExampleGenerator {
    pub rows: usize,
    /// Fixed seed for reproducible output; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for ExampleGenerator {
    fn default() -> Self {
        Self {
            rows: 1000,
            seed: None,
        }
    }
}

impl ExampleGenerator {
    pub fn new(rows: usize) -> Self {
        Self { rows, seed: None }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Generate the header line plus `rows` data lines.
    ///
    /// The label is drawn as Bernoulli(min(0.95, score)), so it is noisy
    /// rather than a function of the features.
    pub fn generate(&self) -> Result<String> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        writer
            .write_record(EXAMPLE_COLUMNS)
            .context("writing example header")?;

        for _ in 0..self.rows {
            let age = round_to(rng.gen::<f64>() * 60.0 + 0.1, 1);
            let pressure = round_to(rng.gen::<f64>() * 7.0 + 1.0, 2);
            let flow = round_to(rng.gen::<f64>() * 495.0 + 5.0, 2);
            let leak_history = u8::from(rng.gen_bool(LEAK_PROBABILITY));
            let corrosion_index = round_to(rng.gen::<f64>() * 10.0, 2);

            let score = risk_score(age, pressure, leak_history, corrosion_index);
            let failure = u8::from(rng.gen::<f64>() < score.min(MAX_FAILURE_PROBABILITY));

            writer
                .write_record([
                    format!("{age:.1}"),
                    format!("{pressure:.2}"),
                    format!("{flow:.2}"),
                    leak_history.to_string(),
                    format!("{corrosion_index:.2}"),
                    failure.to_string(),
                ])
                .context("writing example row")?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("flushing example CSV: {}", e.error()))?;
        String::from_utf8(bytes).context("example CSV is not UTF-8")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::matrix::coerce_number;
    use crate::data::parser::parse_csv;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_risk_score() {
        assert_abs_diff_eq!(risk_score(0.0, 4.0, 0, 0.0), 0.0);
        assert_abs_diff_eq!(risk_score(60.0, 8.0, 1, 10.0), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(risk_score(30.0, 2.0, 0, 5.0), 0.2 + 0.175 + 0.035, epsilon = 1e-12);
    }

    #[test]
    fn test_schema_and_row_count() {
        let text = ExampleGenerator::new(50).with_seed(7).generate().unwrap();
        let table = parse_csv(&text);
        assert_eq!(table.headers, EXAMPLE_COLUMNS.to_vec());
        assert_eq!(table.len(), 50);
    }

    #[test]
    fn test_values_within_ranges() {
        let text = ExampleGenerator::new(500).with_seed(11).generate().unwrap();
        let table = parse_csv(&text);

        let num = |row: &crate::data::model::Row, col: &str| coerce_number(&row[col]).unwrap();
        for row in &table.rows {
            assert!((0.1..=60.1).contains(&num(row, "age")));
            assert!((1.0..=8.0).contains(&num(row, "pressure")));
            assert!((5.0..=500.0).contains(&num(row, "flow")));
            assert!((0.0..=10.0).contains(&num(row, "corrosion_index")));
            assert!(matches!(row["leak_history"].as_str(), "0" | "1"));
            assert!(matches!(row["failure"].as_str(), "0" | "1"));
        }
    }

    #[test]
    fn test_fixed_precision() {
        let text = ExampleGenerator::new(20).with_seed(3).generate().unwrap();
        let table = parse_csv(&text);
        for row in &table.rows {
            assert_eq!(row["age"].split('.').nth(1).map(str::len), Some(1));
            assert_eq!(row["pressure"].split('.').nth(1).map(str::len), Some(2));
            assert_eq!(row["flow"].split('.').nth(1).map(str::len), Some(2));
        }
    }

    #[test]
    fn test_seed_is_reproducible() {
        let a = ExampleGenerator::new(10).with_seed(99).generate().unwrap();
        let b = ExampleGenerator::new(10).with_seed(99).generate().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_rows_is_header_only() {
        let text = ExampleGenerator::new(0).generate().unwrap();
        assert_eq!(text, "age,pressure,flow,leak_history,corrosion_index,failure\n");
    }
}
