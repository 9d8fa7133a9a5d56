//! Data layer: parsing, numeric conversion, scaling and example data.
//!
//! Architecture:
//! ```text
//!  raw CSV text (file / generator)
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  parser   │  text → ParsedTable (headers + string rows)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  matrix   │  rows + feature/label names → NumericDataset (X, y)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌────────────┐
//!   │ normalize   │  X → X scaled to [0,1] + NormalizationParams
//!   └────────────┘
//! ```
//!
//! `stats` summarises raw rows for display; `generator` synthesises a
//! labelled example table; `loader` reads CSV files from disk.

pub mod generator;
pub mod loader;
pub mod matrix;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod stats;
