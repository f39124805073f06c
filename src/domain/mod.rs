//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the immutable numeric table shared by training/ideal/test data (`TableModel`)
//! - the selection and deviation maps produced by best-fit selection
//! - per-point classification results and the run configuration

pub mod table;
pub mod types;

pub use table::*;
pub use types::*;
