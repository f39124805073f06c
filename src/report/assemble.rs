//! Packaging run outputs into persistable tables.
//!
//! The selector and classifier return plain in-memory values; this module is
//! the only place that knows how they are laid out as named tables.

use log::info;

use crate::domain::{ClassificationResult, TableModel};
use crate::error::MatchError;
use crate::fit::{BestFit, tolerance};
use crate::io::store::{Cell, ColumnDef, StoredTable, TableStore};

pub const TRAIN_TABLE: &str = "train_data";
pub const IDEAL_TABLE: &str = "ideal_functions";
pub const SELECTION_TABLE: &str = "selected_functions";
pub const RESULTS_TABLE: &str = "test_results";

/// Input datasets as stored tables (`train_data`, `ideal_functions`).
pub fn input_tables(training: &TableModel, ideal: &TableModel) -> Vec<StoredTable> {
    vec![
        StoredTable::from_table_model(TRAIN_TABLE, training),
        StoredTable::from_table_model(IDEAL_TABLE, ideal),
    ]
}

/// One row per training column: chosen ideal column, SSE, deviation bound.
pub fn selection_table(best: &BestFit) -> StoredTable {
    let rows = best
        .fits
        .iter()
        .map(|fit| {
            vec![
                Cell::Text(fit.train.clone()),
                Cell::Text(fit.ideal.clone()),
                Cell::Real(fit.sse),
                Cell::Real(fit.max_deviation),
                Cell::Real(tolerance(fit.max_deviation)),
            ]
        })
        .collect();

    StoredTable {
        name: SELECTION_TABLE.to_string(),
        columns: vec![
            ColumnDef::text("training"),
            ColumnDef::text("ideal"),
            ColumnDef::real("sse"),
            ColumnDef::real("max_deviation"),
            ColumnDef::real("tolerance"),
        ],
        rows,
    }
}

/// `x, y_test, mapped_ideal, ideal_y, deviation`; the last three nullable.
pub fn results_table(results: &[ClassificationResult]) -> StoredTable {
    let rows = results
        .iter()
        .map(|r| {
            vec![
                Cell::Real(r.x),
                Cell::Real(r.y_test),
                Cell::from(r.mapped_ideal.clone()),
                Cell::from(r.ideal_y),
                Cell::from(r.deviation),
            ]
        })
        .collect();

    StoredTable {
        name: RESULTS_TABLE.to_string(),
        columns: vec![
            ColumnDef::real("x"),
            ColumnDef::real("y_test"),
            ColumnDef::text("mapped_ideal"),
            ColumnDef::real("ideal_y"),
            ColumnDef::real("deviation"),
        ],
        rows,
    }
}

/// Output tables of a completed run (`selected_functions`, `test_results`).
pub fn assemble_results(best: &BestFit, results: &[ClassificationResult]) -> Vec<StoredTable> {
    vec![selection_table(best), results_table(results)]
}

/// Write every table through `store`, stopping at the first failure.
pub fn persist<S: TableStore + ?Sized>(store: &mut S, tables: &[StoredTable]) -> Result<(), MatchError> {
    for table in tables {
        store.replace_table(table)?;
        info!("Stored table '{}' ({} rows)", table.name, table.len());
    }
    Ok(())
}
