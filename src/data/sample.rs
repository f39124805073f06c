//! Synthetic datasets for demos and end-to-end tests.
//!
//! An ideal catalog of analytic functions is laid out on an evenly spaced
//! grid. A handful of them are picked as hidden truths; the training table is
//! those truths plus Gaussian noise, and the test table samples grid points
//! from random truths with a share of deliberate outliers.

use std::path::Path;

use log::info;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{Series, TableModel};
use crate::error::AppError;
use crate::fit::TEST_Y_COLUMN;
use crate::io::write_table_csv;

/// Size of the ideal catalog.
pub const IDEAL_FUNCTIONS: usize = 50;

/// Number of training columns (hidden truths).
pub const TRAINING_FUNCTIONS: usize = 4;

/// Catalog families; amplitude cycles every `FAMILIES` columns.
const FAMILIES: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct SampleConfig {
    pub seed: u64,
    /// Grid rows shared by the training and ideal tables.
    pub rows: usize,
    pub x_start: f64,
    pub x_step: f64,
    pub test_rows: usize,
    /// Standard deviation of the additive noise.
    pub noise: f64,
    /// Probability that a test point is pushed off its curve.
    pub outlier_prob: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            rows: 400,
            x_start: -20.0,
            x_step: 0.1,
            test_rows: 100,
            noise: 0.3,
            outlier_prob: 0.1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SampleData {
    pub training: TableModel,
    pub ideal: TableModel,
    pub test: TableModel,
    /// Ideal column behind each training column, in training order.
    pub truths: Vec<String>,
}

pub fn generate_dataset(config: &SampleConfig) -> Result<SampleData, AppError> {
    if config.rows < 2 {
        return Err(AppError::new(2, "Sample rows must be >= 2."));
    }
    if config.test_rows == 0 {
        return Err(AppError::new(2, "Sample test rows must be > 0."));
    }
    if !(config.x_start.is_finite() && config.x_step.is_finite() && config.x_step > 0.0) {
        return Err(AppError::new(2, "Invalid sample grid (start/step)."));
    }
    if !(config.noise.is_finite() && config.noise >= 0.0) {
        return Err(AppError::new(2, "Sample noise must be a finite value >= 0."));
    }
    if !(0.0..=1.0).contains(&config.outlier_prob) {
        return Err(AppError::new(2, "Outlier probability must be within [0, 1]."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, config.noise)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let x: Vec<f64> = (0..config.rows)
        .map(|i| round6(config.x_start + i as f64 * config.x_step))
        .collect();

    let catalog: Vec<Series> = (0..IDEAL_FUNCTIONS)
        .map(|k| Series::new(format!("y{}", k + 1), x.iter().map(|&x| round6(ideal_value(k, x))).collect()))
        .collect();

    let picks = rand::seq::index::sample(&mut rng, IDEAL_FUNCTIONS, TRAINING_FUNCTIONS).into_vec();

    let training_columns: Vec<Series> = picks
        .iter()
        .enumerate()
        .map(|(i, &k)| {
            let values = catalog[k]
                .values
                .iter()
                .map(|&y| round6(y + normal.sample(&mut rng)))
                .collect();
            Series::new(format!("y{}", i + 1), values)
        })
        .collect();

    let outlier_scale = config.noise.max(0.1);
    let mut test_x = Vec::with_capacity(config.test_rows);
    let mut test_y = Vec::with_capacity(config.test_rows);
    for _ in 0..config.test_rows {
        let row = rng.gen_range(0..config.rows);
        let truth = &catalog[picks[rng.gen_range(0..picks.len())]];
        let mut y = truth.values[row] + normal.sample(&mut rng);
        if rng.gen_bool(config.outlier_prob) {
            let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            y += sign * rng.gen_range(10.0..20.0) * outlier_scale;
        }
        test_x.push(x[row]);
        test_y.push(round6(y));
    }

    let truths: Vec<String> = picks.iter().map(|&k| catalog[k].name.clone()).collect();
    info!(
        "Generated sample: {} rows, {} ideal functions, truths {:?}, {} test points",
        config.rows, IDEAL_FUNCTIONS, truths, config.test_rows
    );

    Ok(SampleData {
        training: TableModel::new("train", x.clone(), training_columns)?,
        ideal: TableModel::new("ideal", x, catalog)?,
        test: TableModel::new("test", test_x, vec![Series::new(TEST_Y_COLUMN, test_y)])?,
        truths,
    })
}

/// Write `train.csv`, `ideal.csv` and `test.csv` into `dir` (created if missing).
pub fn write_dataset(dir: &Path, data: &SampleData) -> Result<(), AppError> {
    std::fs::create_dir_all(dir)
        .map_err(|e| AppError::new(2, format!("Failed to create '{}': {e}", dir.display())))?;

    write_table_csv(&dir.join("train.csv"), &data.training)?;
    write_table_csv(&dir.join("ideal.csv"), &data.ideal)?;
    write_table_csv(&dir.join("test.csv"), &data.test)?;

    info!("Wrote sample dataset to {}", dir.display());
    Ok(())
}

/// Value of the `k`-th catalog function at `x`.
fn ideal_value(k: usize, x: f64) -> f64 {
    let a = (k / FAMILIES + 1) as f64;
    match k % FAMILIES {
        0 => a * x,
        1 => a * x + 10.0,
        2 => -a * x,
        3 => a * x * x / 20.0,
        4 => a * x.sin(),
        5 => a * x.cos(),
        6 => a * x.powi(3) / 400.0,
        7 => a * (x / 10.0).exp(),
        8 => a * x.abs().sqrt(),
        _ => a * x.tanh(),
    }
}

/// Keep CSV output short; the stored text parses back to the same value.
fn round6(v: f64) -> f64 {
    (v * 1e6).round() / 1e6
}
