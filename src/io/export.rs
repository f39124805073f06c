//! File exports.
//!
//! - per-point classification results to CSV (easy to consume in spreadsheets)
//! - the selection (training → ideal, deviations, SSE) to JSON
//! - whole tables back to the `x,y1,...` CSV layout that ingest reads

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::domain::{ClassificationResult, MaxDeviationMap, SelectionMap, TableModel, X_COLUMN};
use crate::error::AppError;
use crate::fit::{BestFit, FitDetail, TOLERANCE_FACTOR};

/// Write classification results as `x,y_test,mapped_ideal,ideal_y,deviation`.
///
/// Absent values are written as empty cells.
pub fn write_results_csv(path: &Path, results: &[ClassificationResult]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_results(file, results)
}

fn write_results<W: std::io::Write>(out: W, results: &[ClassificationResult]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);
    if results.is_empty() {
        writer
            .write_record(["x", "y_test", "mapped_ideal", "ideal_y", "deviation"])
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;
    }
    for r in results {
        writer
            .serialize(r)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Write a table as `x,<columns...>` CSV.
pub fn write_table_csv(path: &Path, table: &TableModel) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create CSV '{}': {e}", path.display())))?;
    write_table(file, table)
}

fn write_table<W: std::io::Write>(out: W, table: &TableModel) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);
    let header: Vec<&str> = std::iter::once(X_COLUMN)
        .chain(table.columns().iter().map(|c| c.name.as_str()))
        .collect();
    writer
        .write_record(&header)
        .map_err(|e| AppError::new(2, format!("Failed to write CSV header: {e}")))?;

    for (row, x) in table.x().iter().enumerate() {
        let record: Vec<String> = std::iter::once(*x)
            .chain(table.columns().iter().map(|c| c.values[row]))
            .map(|v| v.to_string())
            .collect();
        writer
            .write_record(&record)
            .map_err(|e| AppError::new(2, format!("Failed to write CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush CSV: {e}")))?;
    Ok(())
}

/// Portable description of a selection run.
#[derive(Debug, Serialize)]
pub struct SelectionFile<'a> {
    pub tool: &'static str,
    pub generated_at: DateTime<Local>,
    pub tolerance_factor: f64,
    pub selection: &'a SelectionMap,
    pub max_deviation: &'a MaxDeviationMap,
    pub fits: &'a [FitDetail],
}

impl<'a> SelectionFile<'a> {
    pub fn new(best: &'a BestFit) -> Self {
        Self {
            tool: "idealfit",
            generated_at: Local::now(),
            tolerance_factor: TOLERANCE_FACTOR,
            selection: &best.selection,
            max_deviation: &best.max_deviation,
            fits: &best.fits,
        }
    }
}

/// Write the selection as pretty-printed JSON.
pub fn write_selection_json(path: &Path, best: &BestFit) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create selection JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, &SelectionFile::new(best))
        .map_err(|e| AppError::new(2, format!("Failed to write selection JSON: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn results_csv_leaves_absent_values_empty() {
        let results = vec![
            ClassificationResult::matched(1.0, 10.0, "y1", 9.0),
            ClassificationResult::unmatched(2.0, 12.0),
        ];
        let mut buf = Vec::new();
        write_results(&mut buf, &results).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "x,y_test,mapped_ideal,ideal_y,deviation\n1.0,10.0,y1,9.0,1.0\n2.0,12.0,,,\n"
        );
    }

    #[test]
    fn empty_results_still_get_a_header() {
        let mut buf = Vec::new();
        write_results(&mut buf, &[]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "x,y_test,mapped_ideal,ideal_y,deviation\n");
    }

    #[test]
    fn table_csv_is_readable_by_ingest() {
        use crate::domain::Series;
        use crate::io::read_table;

        let table = TableModel::new(
            "ideal",
            vec![-0.1, 0.0, 0.1],
            vec![Series::new("y1", vec![0.3, -2.5, 1e-3]), Series::new("y2", vec![1.0, 2.0, 3.0])],
        )
        .unwrap();
        let mut buf = Vec::new();
        write_table(&mut buf, &table).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("x,y1,y2\n-0.1,0.3,1\n"), "{text}");
        let back = read_table(text.as_bytes(), "ideal").unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn selection_json_keeps_training_order() {
        let best = BestFit {
            selection: [("y2", "y40".to_string()), ("y1", "y7".to_string())].into_iter().collect(),
            max_deviation: [("y2", 0.25), ("y1", 0.5)].into_iter().collect(),
            fits: vec![],
            skipped: vec![],
        };
        // `to_value` would re-sort keys, so inspect the serialized text.
        let text = serde_json::to_string(&SelectionFile::new(&best)).unwrap();
        assert!(text.contains(r#""selection":{"y2":"y40","y1":"y7"}"#), "{text}");

        let json = serde_json::to_value(SelectionFile::new(&best)).unwrap();
        assert_eq!(json["tool"], "idealfit");
        assert!((json["tolerance_factor"].as_f64().unwrap() - 2f64.sqrt()).abs() < 1e-15);
    }
}
