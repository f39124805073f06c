//! `idealfit` library crate.
//!
//! The binary (`idealfit`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the selector and classifier can be reused without the CLI or storage
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
