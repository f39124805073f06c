//! Classification of test observations against the selected ideal functions.
//!
//! Each test point `(x, y)` is checked against the selected ideal functions in
//! selection order (training-column declaration order). A point is accepted by
//! the first function whose value at the same `x` lies within
//! `max_deviation * TOLERANCE_FACTOR`; later functions are not consulted even
//! if they would fit more tightly.
//!
//! Lookups use exact `x` equality. A test `x` absent from the ideal grid is a
//! data-integrity error, distinct from an ordinary non-match.

use std::collections::HashMap;

use log::{debug, info};
use rayon::prelude::*;

use crate::domain::{ClassificationResult, MaxDeviationMap, SelectionMap, Series, TableModel};
use crate::error::MatchError;

/// Widening applied to the training-derived deviation bound.
pub const TOLERANCE_FACTOR: f64 = std::f64::consts::SQRT_2;

/// Name of the observation column in a test table.
pub const TEST_Y_COLUMN: &str = "y";

/// Acceptance bound for a training column's maximum deviation.
pub fn tolerance(max_deviation: f64) -> f64 {
    max_deviation * TOLERANCE_FACTOR
}

/// One selected ideal function, resolved against the ideal table.
struct Band<'a> {
    ideal: &'a Series,
    tolerance: f64,
}

/// Classify every test row. Output order and length follow the test table.
pub fn classify(
    test: &TableModel,
    ideal: &TableModel,
    selection: &SelectionMap,
    max_deviation: &MaxDeviationMap,
) -> Result<Vec<ClassificationResult>, MatchError> {
    test.ensure_not_empty()?;
    ideal.ensure_not_empty()?;

    let y = test_series(test)?;
    let bands = resolve_bands(ideal, selection, max_deviation)?;
    let index = XIndex::build(ideal.x());

    info!(
        "Classifying {} test point(s) against {} selected function(s)",
        test.len(),
        bands.len()
    );

    let outcomes: Vec<Result<ClassificationResult, MatchError>> = test
        .x()
        .par_iter()
        .zip(y.values.par_iter())
        .map(|(&x, &y)| classify_point(x, y, &index, &bands))
        .collect();

    // Sequential collect: the first failing row in test order is reported.
    let results = outcomes.into_iter().collect::<Result<Vec<_>, _>>()?;

    let matched = results.iter().filter(|r| r.is_matched()).count();
    info!("Mapped {matched} of {} test point(s)", results.len());

    Ok(results)
}

fn classify_point(
    x: f64,
    y: f64,
    index: &XIndex,
    bands: &[Band<'_>],
) -> Result<ClassificationResult, MatchError> {
    if bands.is_empty() {
        return Ok(ClassificationResult::unmatched(x, y));
    }

    let row = index.row_of(x).ok_or(MatchError::MissingIdealPoint { x })?;

    for band in bands {
        let ideal_y = band.ideal.values[row];
        if (y - ideal_y).abs() <= band.tolerance {
            return Ok(ClassificationResult::matched(x, y, band.ideal.name.clone(), ideal_y));
        }
    }

    debug!("Test point ({x}, {y}) is outside every tolerance band");
    Ok(ClassificationResult::unmatched(x, y))
}

/// The observation column of a test table: `y`, or the only dependent column.
pub fn test_series(test: &TableModel) -> Result<&Series, MatchError> {
    if let Some(series) = test.column(TEST_Y_COLUMN) {
        return Ok(series);
    }
    match test.columns() {
        [only] => Ok(only),
        _ => Err(MatchError::invalid_table(
            test.name(),
            format!("expected a `{TEST_Y_COLUMN}` column next to `x`"),
        )),
    }
}

fn resolve_bands<'a>(
    ideal: &'a TableModel,
    selection: &SelectionMap,
    max_deviation: &MaxDeviationMap,
) -> Result<Vec<Band<'a>>, MatchError> {
    selection
        .iter()
        .map(|(train, ideal_name)| -> Result<Band<'a>, MatchError> {
            let series = ideal.column(ideal_name).ok_or_else(|| {
                MatchError::invalid_table(
                    ideal.name(),
                    format!("selected ideal column `{ideal_name}` (for `{train}`) does not exist"),
                )
            })?;
            let max_dev = max_deviation.get(train).copied().ok_or_else(|| MatchError::MissingDeviation {
                column: train.to_string(),
            })?;
            Ok(Band {
                ideal: series,
                tolerance: tolerance(max_dev),
            })
        })
        .collect()
}

/// Exact-match lookup from `x` to the first ideal row carrying it.
struct XIndex {
    rows: HashMap<u64, usize>,
}

impl XIndex {
    fn build(xs: &[f64]) -> Self {
        let mut rows = HashMap::with_capacity(xs.len());
        for (row, &x) in xs.iter().enumerate() {
            if let Some(key) = Self::key(x) {
                rows.entry(key).or_insert(row);
            }
        }
        Self { rows }
    }

    fn row_of(&self, x: f64) -> Option<usize> {
        Self::key(x).and_then(|k| self.rows.get(&k).copied())
    }

    /// Bit pattern with `-0.0` folded onto `0.0`; NaN never matches.
    fn key(x: f64) -> Option<u64> {
        if x.is_nan() {
            None
        } else if x == 0.0 {
            Some(0.0_f64.to_bits())
        } else {
            Some(x.to_bits())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ideal_table() -> TableModel {
        TableModel::new(
            "ideal",
            vec![1.0, 2.0, 3.0],
            vec![
                Series::new("y1", vec![9.0, 19.0, 29.0]),
                Series::new("y2", vec![10.5, 20.5, 30.5]),
            ],
        )
        .unwrap()
    }

    fn test_table(x: Vec<f64>, y: Vec<f64>) -> TableModel {
        TableModel::new("test", x, vec![Series::new("y", y)]).unwrap()
    }

    fn single_selection() -> (SelectionMap, MaxDeviationMap) {
        let selection: SelectionMap = [("y1", "y1".to_string())].into_iter().collect();
        let max_dev: MaxDeviationMap = [("y1", 1.0)].into_iter().collect();
        (selection, max_dev)
    }

    #[test]
    fn point_within_widened_bound_is_mapped() {
        let (selection, max_dev) = single_selection();
        let test = test_table(vec![1.0], vec![10.0]);

        let results = classify(&test, &ideal_table(), &selection, &max_dev).unwrap();
        assert_eq!(results, vec![ClassificationResult::matched(1.0, 10.0, "y1", 9.0)]);
        assert_eq!(results[0].deviation, Some(1.0));
    }

    #[test]
    fn point_outside_bound_is_unmatched() {
        let (selection, max_dev) = single_selection();
        let test = test_table(vec![1.0], vec![12.0]);

        let results = classify(&test, &ideal_table(), &selection, &max_dev).unwrap();
        assert_eq!(results, vec![ClassificationResult::unmatched(1.0, 12.0)]);
    }

    #[test]
    fn bound_uses_sqrt_two_widening() {
        let (selection, max_dev) = single_selection();
        // |10.4 - 9| = 1.4 <= 1.414..., |10.42 - 9| = 1.42 > 1.414...
        let test = test_table(vec![1.0, 1.0], vec![10.4, 10.42]);

        let results = classify(&test, &ideal_table(), &selection, &max_dev).unwrap();
        assert!(results[0].is_matched());
        assert!(!results[1].is_matched());
    }

    #[test]
    fn unknown_x_is_missing_ideal_point() {
        let (selection, max_dev) = single_selection();
        let test = test_table(vec![1.0, 2.5], vec![9.0, 20.0]);

        let err = classify(&test, &ideal_table(), &selection, &max_dev).unwrap_err();
        assert_eq!(err, MatchError::MissingIdealPoint { x: 2.5 });
    }

    #[test]
    fn first_band_in_selection_order_wins() {
        // y at x=2 is 20.0: inside both bands, closer to y2 (20.5) than y1 (19.0).
        let selection: SelectionMap =
            [("t1", "y1".to_string()), ("t2", "y2".to_string())].into_iter().collect();
        let max_dev: MaxDeviationMap = [("t1", 1.0), ("t2", 1.0)].into_iter().collect();
        let test = test_table(vec![2.0], vec![20.0]);

        let results = classify(&test, &ideal_table(), &selection, &max_dev).unwrap();
        assert_eq!(results[0].mapped_ideal.as_deref(), Some("y1"));
        assert_eq!(results[0].ideal_y, Some(19.0));
    }

    #[test]
    fn falls_through_to_later_band() {
        let selection: SelectionMap =
            [("t1", "y1".to_string()), ("t2", "y2".to_string())].into_iter().collect();
        let max_dev: MaxDeviationMap = [("t1", 0.1), ("t2", 0.5)].into_iter().collect();
        let test = test_table(vec![3.0], vec![30.8]);

        let results = classify(&test, &ideal_table(), &selection, &max_dev).unwrap();
        assert_eq!(results[0].mapped_ideal.as_deref(), Some("y2"));
        assert!((results[0].deviation.unwrap() - 0.3).abs() < 1e-9);
    }

    #[test]
    fn output_preserves_order_and_count() {
        let (selection, max_dev) = single_selection();
        let xs = vec![3.0, 1.0, 2.0, 1.0, 3.0];
        let ys = vec![29.5, 50.0, 19.0, 9.0, -4.0];
        let test = test_table(xs.clone(), ys.clone());

        let results = classify(&test, &ideal_table(), &selection, &max_dev).unwrap();
        assert_eq!(results.len(), xs.len());
        for (r, (x, y)) in results.iter().zip(xs.iter().zip(&ys)) {
            assert_eq!(r.x, *x);
            assert_eq!(r.y_test, *y);
        }
        let mapped: Vec<bool> = results.iter().map(|r| r.is_matched()).collect();
        assert_eq!(mapped, vec![true, false, true, true, false]);
    }

    #[test]
    fn repeated_ideal_x_uses_first_row() {
        let ideal = TableModel::new(
            "ideal",
            vec![0.0, 1.0, 1.0],
            vec![Series::new("y1", vec![0.0, 5.0, 100.0])],
        )
        .unwrap();
        let (selection, max_dev) = single_selection();
        let test = test_table(vec![1.0, -0.0], vec![5.5, 0.2]);

        let results = classify(&test, &ideal, &selection, &max_dev).unwrap();
        assert_eq!(results[0].ideal_y, Some(5.0));
        assert_eq!(results[1].ideal_y, Some(0.0));
    }

    #[test]
    fn missing_deviation_is_reported() {
        let selection: SelectionMap = [("y1", "y1".to_string())].into_iter().collect();
        let max_dev = MaxDeviationMap::new();
        let test = test_table(vec![1.0], vec![9.0]);

        let err = classify(&test, &ideal_table(), &selection, &max_dev).unwrap_err();
        assert_eq!(err, MatchError::MissingDeviation { column: "y1".to_string() });
    }

    #[test]
    fn empty_test_table_fails_fast() {
        let (selection, max_dev) = single_selection();
        let test = test_table(vec![], vec![]);

        let err = classify(&test, &ideal_table(), &selection, &max_dev).unwrap_err();
        assert_eq!(err, MatchError::EmptyInput { table: "test".to_string() });
    }

    #[test]
    fn test_column_must_be_identifiable() {
        let test = TableModel::new(
            "test",
            vec![1.0],
            vec![Series::new("a", vec![1.0]), Series::new("b", vec![2.0])],
        )
        .unwrap();
        assert!(matches!(test_series(&test), Err(MatchError::InvalidTable { .. })));

        let single = TableModel::new("test", vec![1.0], vec![Series::new("obs", vec![2.0])]).unwrap();
        assert_eq!(test_series(&single).unwrap().name, "obs");
    }
}
