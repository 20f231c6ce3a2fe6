/// Data layer: core types, loading, filtering and summaries.
///
/// Architecture:
/// ```text
///   monitoringdata.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file → Table (typed columns)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter  │  range / membership predicates → row indices → Table
///   └──────────┘
///        │
///        ├──────────────┐
///        ▼              ▼
///   ┌──────────┐  ┌─────────────┐
///   │ summary  │  │ correlation │  read-only views of the filtered Table
///   └──────────┘  └─────────────┘
/// ```

pub mod correlation;
pub mod filter;
pub mod loader;
pub mod model;
pub mod summary;
