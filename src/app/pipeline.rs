//! Shared "match pipeline" logic used by the `run` command and end-to-end tests.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! CSV ingest -> store inputs -> best-fit selection -> classification -> store results
//!
//! The caller can then focus on presentation (printing, plots, exports).

use log::{info, warn};

use crate::domain::{ClassificationResult, RunConfig, TableModel};
use crate::error::AppError;
use crate::fit::{BestFit, classify, select_best_fit};
use crate::io::{SqliteStore, load_table};
use crate::report::{MatchSummary, assemble_results, input_tables, persist, summarize};

/// All computed outputs of a single `idealfit run`.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub training: TableModel,
    pub ideal: TableModel,
    pub test: TableModel,
    pub best: BestFit,
    pub results: Vec<ClassificationResult>,
    pub summary: MatchSummary,
}

/// Execute the full pipeline and return the computed outputs.
pub fn run_pipeline(config: &RunConfig) -> Result<RunOutput, AppError> {
    // 1) Load the three inputs.
    let training = load_table(&config.train_path, "train")?;
    let ideal = load_table(&config.ideal_path, "ideal")?;
    let test = load_table(&config.test_path, "test")?;

    // Nothing is stored or computed for an empty input.
    training.ensure_not_empty()?;
    ideal.ensure_not_empty()?;
    test.ensure_not_empty()?;

    // 2) Store the inputs before any computation.
    let mut store = match &config.db_path {
        Some(path) => {
            let mut store = SqliteStore::open(path)?;
            persist(&mut store, &input_tables(&training, &ideal))?;
            Some(store)
        }
        None => None,
    };

    // 3) Pick one ideal function per training column.
    let best = select_best_fit(&training, &ideal)?;
    if !best.skipped.is_empty() {
        warn!("{} candidate comparison(s) skipped", best.skipped.len());
    }
    for fit in &best.fits {
        info!(
            "Selected {} for {} (SSE={:.4}, max deviation={:.4})",
            fit.ideal, fit.train, fit.sse, fit.max_deviation
        );
    }

    // 4) Map the test points.
    let results = classify(&test, &ideal, &best.selection, &best.max_deviation)?;
    let summary = summarize(&results, &best.selection);

    // 5) Store the outcome.
    if let Some(store) = store.as_mut() {
        persist(store, &assemble_results(&best, &results))?;
    }

    Ok(RunOutput {
        training,
        ideal,
        test,
        best,
        results,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use tempfile::TempDir;

    use super::*;
    use crate::data::{SampleConfig, generate_dataset, write_dataset};
    use crate::io::TableStore;
    use crate::report::{RESULTS_TABLE, SELECTION_TABLE, TRAIN_TABLE};

    fn scratch_dir() -> TempDir {
        tempfile::tempdir().unwrap()
    }

    fn config(dir: &Path, db: Option<PathBuf>) -> RunConfig {
        RunConfig {
            train_path: dir.join("train.csv"),
            ideal_path: dir.join("ideal.csv"),
            test_path: dir.join("test.csv"),
            db_path: db,
            plot: false,
            plot_dir: None,
            plot_width: 80,
            plot_height: 20,
            export_results: None,
            export_selection: None,
        }
    }

    #[test]
    fn end_to_end_on_generated_data() {
        let tmp = scratch_dir();
        let dir = tmp.path();
        let data = generate_dataset(&SampleConfig {
            rows: 120,
            test_rows: 40,
            ..SampleConfig::default()
        })
        .unwrap();
        write_dataset(dir, &data).unwrap();

        let db = dir.join("run.db");
        let run = run_pipeline(&config(dir, Some(db.clone()))).unwrap();

        assert_eq!(run.results.len(), 40);
        assert_eq!(run.best.selection.len(), 4);
        assert_eq!(run.summary.total, 40);

        let store = SqliteStore::open(&db).unwrap();
        let names = store.table_names().unwrap();
        for table in [TRAIN_TABLE, SELECTION_TABLE, RESULTS_TABLE] {
            assert!(names.iter().any(|n| n == table), "{table} missing from {names:?}");
        }
        assert_eq!(store.load_table(RESULTS_TABLE).unwrap().len(), 40);
    }

    #[test]
    fn no_store_leaves_no_database() {
        let tmp = scratch_dir();
        let dir = tmp.path();
        std::fs::write(dir.join("train.csv"), "x,y1\n1,10\n2,20\n3,30\n").unwrap();
        std::fs::write(dir.join("ideal.csv"), "x,y1,y2\n1,9,11\n2,21,19\n3,31,31\n").unwrap();
        std::fs::write(dir.join("test.csv"), "x,y\n2,20.5\n3,40\n").unwrap();

        let run = run_pipeline(&config(dir, None)).unwrap();
        assert_eq!(run.best.selection.get("y1").map(String::as_str), Some("y1"));
        assert_eq!(run.summary.matched(), 1);
        assert!(!dir.join("localDB.db").exists());
    }

    #[test]
    fn missing_ideal_point_fails_with_integrity_code() {
        let tmp = scratch_dir();
        let dir = tmp.path();
        std::fs::write(dir.join("train.csv"), "x,y1\n1,10\n2,20\n").unwrap();
        std::fs::write(dir.join("ideal.csv"), "x,y1\n1,10\n2,20\n").unwrap();
        std::fs::write(dir.join("test.csv"), "x,y\n5,1\n").unwrap();

        let err = run_pipeline(&config(dir, None)).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.message().contains("x = 5"), "{err}");
    }

    #[test]
    fn empty_inputs_fail_before_anything_is_stored() {
        let full_train = "x,y1\n1,10\n2,20\n";
        let full_ideal = "x,y1\n1,10\n2,20\n";
        let full_test = "x,y\n1,10\n";

        for (empty, table) in [("train.csv", "train"), ("ideal.csv", "ideal"), ("test.csv", "test")] {
            let tmp = scratch_dir();
            let dir = tmp.path();
            std::fs::write(dir.join("train.csv"), full_train).unwrap();
            std::fs::write(dir.join("ideal.csv"), full_ideal).unwrap();
            std::fs::write(dir.join("test.csv"), full_test).unwrap();
            let header = if empty == "test.csv" { "x,y\n" } else { "x,y1\n" };
            std::fs::write(dir.join(empty), header).unwrap();

            let db = dir.join("run.db");
            let err = run_pipeline(&config(dir, Some(db.clone()))).unwrap_err();
            assert_eq!(err.exit_code(), 2, "{empty}: {err}");
            assert_eq!(err.message(), format!("Table '{table}' has no rows."));
            assert!(!db.exists(), "{empty}: database was created");
        }
    }

    #[test]
    fn missing_input_file_is_a_usage_error() {
        let tmp = scratch_dir();
        let dir = tmp.path();
        let err = run_pipeline(&config(dir, None)).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
