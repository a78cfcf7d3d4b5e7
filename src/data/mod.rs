//! Data layer: record sources, normalization, filtering and export.
//!
//! Architecture:
//! ```text
//!  .xlsx / .csv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  source   │  fetch_rows(table, sheet) → RawRows (header + records)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ normalize  │  check header, trim, project six columns, parse prices → PartTable
//!   └───────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  code / description / category / price predicates
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  export   │  display strings, CSV bytes, XLSX bytes
//!   └──────────┘
//! ```
//!
//! [`pipeline::Inventory`] ties the stages together for the shell.

pub mod export;
pub mod filter;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod source;
