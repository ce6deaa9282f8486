//! Data layer: table types, loading/saving, and sensor selection.
//!
//! Architecture:
//! ```text
//!  .csv / .json
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → TableLayer
//!   └──────────┘
//!        │
//!        ▼
//!   ┌────────────┐
//!   │ TableLayer │  schema + append-only rows of FieldValue
//!   └────────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  sensor selection → visible points
//!   └──────────┘
//! ```

pub mod filter;
pub mod loader;
pub mod model;
