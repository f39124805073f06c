//! Best-fit selection of one ideal function per training function.
//!
//! For every training column we compute the sum of squared errors (SSE)
//! against every ideal column on the shared grid and keep the minimum.
//!
//! Selection rules:
//! 1. Compare by row position; a candidate whose length differs from the
//!    training column is excluded (logged + recorded), not fatal
//! 2. Minimum SSE wins; ties keep the first candidate in ideal-table order
//! 3. A training column with no compatible candidate fails the whole run
//!
//! The tolerance handed to classification is the maximum absolute deviation
//! between a training column and its chosen ideal column, not the SSE.

use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::domain::{MaxDeviationMap, SelectionMap, Series, TableModel};
use crate::error::MatchError;
use crate::math::{max_abs_deviation, sse};

/// Chosen ideal function for one training column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitDetail {
    pub train: String,
    pub ideal: String,
    pub sse: f64,
    pub max_deviation: f64,
}

/// A candidate comparison that was excluded and why.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedCandidate {
    pub train: String,
    pub ideal: String,
    pub reason: MatchError,
}

/// Output of a selection run.
#[derive(Debug, Clone, PartialEq)]
pub struct BestFit {
    pub selection: SelectionMap,
    pub max_deviation: MaxDeviationMap,
    /// One entry per training column, in training-column order.
    pub fits: Vec<FitDetail>,
    /// Excluded candidates (for diagnostics).
    pub skipped: Vec<SkippedCandidate>,
}

/// Selection outcome for a single training column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFit {
    pub detail: FitDetail,
    pub skipped: Vec<SkippedCandidate>,
}

/// Select the best ideal column for every training column.
pub fn select_best_fit(training: &TableModel, ideal: &TableModel) -> Result<BestFit, MatchError> {
    training.ensure_not_empty()?;
    ideal.ensure_not_empty()?;

    info!(
        "Selecting best fits: {} training column(s) against {} ideal column(s) over {} rows",
        training.columns().len(),
        ideal.columns().len(),
        training.len()
    );

    // Columns are independent; evaluate in parallel but keep column order so
    // the first error (and the map order) does not depend on scheduling.
    let outcomes: Vec<Result<ColumnFit, MatchError>> = training
        .columns()
        .par_iter()
        .map(|train| select_for_column(train, ideal.columns()))
        .collect();

    let mut selection = SelectionMap::new();
    let mut max_deviation = MaxDeviationMap::new();
    let mut fits = Vec::with_capacity(outcomes.len());
    let mut skipped = Vec::new();

    for outcome in outcomes {
        let ColumnFit { detail, skipped: mut col_skipped } = outcome?;
        selection.insert(detail.train.clone(), detail.ideal.clone());
        max_deviation.insert(detail.train.clone(), detail.max_deviation);
        skipped.append(&mut col_skipped);
        fits.push(detail);
    }

    Ok(BestFit {
        selection,
        max_deviation,
        fits,
        skipped,
    })
}

/// Pick the minimum-SSE candidate for one training series.
pub fn select_for_column(train: &Series, candidates: &[Series]) -> Result<ColumnFit, MatchError> {
    let mut best: Option<&Series> = None;
    let mut best_sse = f64::INFINITY;
    let mut skipped = Vec::new();

    for candidate in candidates {
        match candidate_sse(train, candidate) {
            Ok(value) => {
                debug!("SSE({}, {}) = {value:.6}", train.name, candidate.name);
                // Strict `<`: the first candidate wins ties.
                if value < best_sse {
                    best_sse = value;
                    best = Some(candidate);
                }
            }
            Err(err) => {
                warn!("Skipping comparison between {} and {}: {err}", train.name, candidate.name);
                skipped.push(SkippedCandidate {
                    train: train.name.clone(),
                    ideal: candidate.name.clone(),
                    reason: err,
                });
            }
        }
    }

    let Some(chosen) = best else {
        return Err(MatchError::NoValidFit {
            column: train.name.clone(),
        });
    };

    let max_deviation =
        max_abs_deviation(&train.values, &chosen.values).ok_or_else(|| length_mismatch(train, chosen))?;

    debug!(
        "{} -> {} (SSE={best_sse:.6}, max deviation={max_deviation:.6})",
        train.name, chosen.name
    );

    Ok(ColumnFit {
        detail: FitDetail {
            train: train.name.clone(),
            ideal: chosen.name.clone(),
            sse: best_sse,
            max_deviation,
        },
        skipped,
    })
}

/// SSE between a training series and one candidate.
pub fn candidate_sse(train: &Series, candidate: &Series) -> Result<f64, MatchError> {
    sse(&train.values, &candidate.values).ok_or_else(|| length_mismatch(train, candidate))
}

fn length_mismatch(train: &Series, candidate: &Series) -> MatchError {
    MatchError::LengthMismatch {
        train: train.name.clone(),
        train_len: train.len(),
        ideal: candidate.name.clone(),
        ideal_len: candidate.len(),
    }
}
