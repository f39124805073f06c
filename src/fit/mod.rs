//! Fitting and classification.
//!
//! Responsibilities:
//!
//! - choose one ideal function per training function by minimum SSE (`selection`)
//! - classify test points against the chosen functions within a tolerance (`classify`)

pub mod classify;
pub mod selection;

pub use classify::*;
pub use selection::*;
