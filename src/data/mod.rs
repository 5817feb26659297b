/// Data layer: core types, loading, preparation and queries.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ prepare   │  drop incomplete rows, derive free rate, zero → missing
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ PlantTable  │  immutable, shared via Arc
///   └────────────┘
///        │
///        ▼
///   ┌──────────────────┐
///   │ query / engine    │  station options, bubble points, time series
///   └──────────────────┘
/// ```

pub mod engine;
pub mod error;
pub mod loader;
pub mod model;
pub mod prepare;
pub mod query;

pub use engine::QueryEngine;
pub use error::{DataError, DataResult};
pub use model::{Metric, PlantTable, Year, YearRange};
