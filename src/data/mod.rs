/// Data layer: core types, normalization, loading, and row filtering.
///
/// Architecture:
/// ```text
///  .csv / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → raw text records
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ normalize  │  trim, missing tokens → None, infer column kind
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  Vec<Column>, stable row ids
///   └──────────┘
///        │
///        ├──▶ filter   drop rows missing required columns
///        ├──▶ split    train / validation / test partitions
///        └──▶ export   write back as delimited text
/// ```

pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod precision;
pub mod split;
