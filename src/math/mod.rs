//! Numerical kernels shared by selection and classification.

pub mod deviation;

pub use deviation::*;
