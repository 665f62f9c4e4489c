/// Data layer: core types, loading, filtering, and statistics.
///
/// Architecture:
/// ```text
///  .csv / .parquet / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → AirQualityDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────────────┐
///   │ AirQualityDataset │  Vec<Observation>, period index
///   └──────────────────┘
///        │
///        ▼
///   ┌──────────┐     ┌──────────┐
///   │  filter   │ ──▶ │  stats    │  period predicate → daily / yearly
///   └──────────┘     └──────────┘  means, describe, correlations
/// ```
pub mod filter;
pub mod loader;
pub mod model;
pub mod stats;
