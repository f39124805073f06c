//! Command-line parsing for the ideal function matcher.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the selection/classification code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// SQLite file used when neither `--db` nor `IDEALFIT_DB` is given.
pub const DEFAULT_DB: &str = "localDB.db";

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "idealfit",
    version,
    about = "Least-squares ideal function selection and test point mapping"
)]
pub struct Cli {
    /// More log output (debug level).
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Less log output (warnings and errors only).
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Select ideal functions for the training data, map the test points,
    /// store everything and print a summary.
    Run(RunArgs),
    /// Write a synthetic train/ideal/test dataset as CSV files.
    Generate(GenerateArgs),
    /// Print a table stored by a previous run.
    Show(ShowArgs),
    /// List the tables stored in a database.
    Tables(DbArgs),
}

/// Database location shared by every subcommand that touches storage.
#[derive(Debug, Args, Clone)]
pub struct DbArgs {
    /// SQLite database file.
    #[arg(long, env = "IDEALFIT_DB", default_value = DEFAULT_DB)]
    pub db: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    /// Training CSV (`x,y1,...`).
    #[arg(long, value_name = "CSV")]
    pub train: PathBuf,

    /// Ideal functions CSV (`x,y1,...`).
    #[arg(long, value_name = "CSV")]
    pub ideal: PathBuf,

    /// Test CSV (`x,y`).
    #[arg(long, value_name = "CSV")]
    pub test: PathBuf,

    #[command(flatten)]
    pub db: DbArgs,

    /// Skip writing tables to the database.
    #[arg(long)]
    pub no_store: bool,

    /// Render ASCII plots in the terminal.
    #[arg(long)]
    pub plot: bool,

    /// Also write SVG charts into this directory.
    #[arg(long, value_name = "DIR")]
    pub plot_dir: Option<PathBuf>,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export per-point results to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export the selection (mapping, deviations, SSE) to JSON.
    #[arg(long = "export-selection", value_name = "JSON")]
    pub export_selection: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct GenerateArgs {
    /// Output directory for `train.csv`, `ideal.csv` and `test.csv`.
    #[arg(long, value_name = "DIR")]
    pub out_dir: PathBuf,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Grid rows in the training and ideal tables.
    #[arg(long, default_value_t = 400)]
    pub rows: usize,

    /// Number of test points.
    #[arg(long, default_value_t = 100)]
    pub test_rows: usize,

    /// Standard deviation of the Gaussian noise.
    #[arg(long, default_value_t = 0.3)]
    pub noise: f64,

    /// Share of test points pushed off their curve.
    #[arg(long, default_value_t = 0.1)]
    pub outlier_prob: f64,
}

#[derive(Debug, Args, Clone)]
pub struct ShowArgs {
    #[command(flatten)]
    pub db: DbArgs,

    /// Table name (e.g. `test_results`).
    #[arg(long)]
    pub table: String,

    /// Maximum rows to print.
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
}
