//! CSV ingest.
//!
//! Turns a headered CSV (`x,y1,y2,...`) into a validated [`TableModel`].
//!
//! Design goals:
//! - **Strict schema**: the first column must be `x`, every cell must be a
//!   finite number (clear errors with line + column, exit code 2)
//! - **No silent repair**: a bad row fails the load instead of being skipped,
//!   since row alignment across tables is what the fit relies on
//! - **Separation of concerns**: no fitting logic here

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use log::debug;

use crate::domain::{Series, TableModel, X_COLUMN};
use crate::error::MatchError;

/// Load a CSV file into a table named `name`.
pub fn load_table(path: &Path, name: &str) -> Result<TableModel, MatchError> {
    let file = File::open(path).map_err(|e| MatchError::Io {
        path: path.display().to_string(),
        message: format!("failed to open CSV: {e}"),
    })?;
    let table = read_table(file, name)?;
    debug!(
        "Loaded '{}' from {}: {} rows x {} column(s)",
        name,
        path.display(),
        table.len(),
        table.columns().len()
    );
    Ok(table)
}

/// Parse CSV from any reader into a table named `name`.
pub fn read_table<R: Read>(input: R, name: &str) -> Result<TableModel, MatchError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| MatchError::invalid_table(name, format!("failed to read CSV headers: {e}")))?
        .clone();

    let column_names = validate_headers(&headers, name)?;

    let mut x = Vec::new();
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); column_names.len()];

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;

        let record = result
            .map_err(|e| MatchError::invalid_table(name, format!("line {line}: CSV parse error: {e}")))?;

        x.push(parse_cell(&record, 0, X_COLUMN, line, name)?);
        for (col, values) in columns.iter_mut().enumerate() {
            values.push(parse_cell(&record, col + 1, &column_names[col], line, name)?);
        }
    }

    let series = column_names
        .into_iter()
        .zip(columns)
        .map(|(col_name, values)| Series::new(col_name, values))
        .collect();

    TableModel::new(name, x, series)
}

/// Check the header row and return the dependent column names.
fn validate_headers(headers: &StringRecord, table: &str) -> Result<Vec<String>, MatchError> {
    let names: Vec<String> = headers.iter().map(normalize_header_name).collect();

    match names.first() {
        Some(first) if first.eq_ignore_ascii_case(X_COLUMN) => {}
        Some(first) => {
            return Err(MatchError::invalid_table(
                table,
                format!("first column must be `{X_COLUMN}`, found `{first}`"),
            ));
        }
        None => return Err(MatchError::invalid_table(table, "missing header row")),
    }

    if names.len() < 2 {
        return Err(MatchError::invalid_table(
            table,
            "expected at least one dependent column after `x`",
        ));
    }

    if let Some(empty) = names.iter().position(String::is_empty) {
        return Err(MatchError::invalid_table(
            table,
            format!("column {} has an empty header", empty + 1),
        ));
    }

    Ok(names[1..].to_vec())
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. If we don't strip it, `x` is not recognised.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

fn parse_cell(
    record: &StringRecord,
    idx: usize,
    column: &str,
    line: usize,
    table: &str,
) -> Result<f64, MatchError> {
    let raw = record.get(idx).unwrap_or("");
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(MatchError::invalid_table(
            table,
            format!("line {line}, column `{column}`: '{raw}' is not a finite number"),
        )),
    }
}
