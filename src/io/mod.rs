//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - result exports (CSV/JSON) (`export`)
//! - table persistence (SQLite) (`store`)

pub mod export;
pub mod ingest;
pub mod store;

pub use export::*;
pub use ingest::*;
pub use store::*;
