//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the selection/classification code stays clean and testable
//! - output changes are localized (golden tests below)

use crate::domain::{ClassificationResult, TableModel};
use crate::fit::{BestFit, TOLERANCE_FACTOR, tolerance};
use crate::io::store::{Cell, StoredTable};
use crate::report::MatchSummary;

/// Format the full run summary (dataset sizes + selection + mapping counts).
pub fn format_run_summary(
    training: &TableModel,
    ideal: &TableModel,
    test: &TableModel,
    best: &BestFit,
    summary: &MatchSummary,
) -> String {
    let mut out = String::new();

    out.push_str("=== idealfit - least-squares ideal function matching ===\n");
    out.push_str(&format!(
        "Training: {} rows x {} function(s)\n",
        training.len(),
        training.columns().len()
    ));
    out.push_str(&format!(
        "Ideal   : {} rows x {} function(s)\n",
        ideal.len(),
        ideal.columns().len()
    ));
    out.push_str(&format!("Test    : {} point(s)\n", test.len()));

    out.push_str(&format!("\nSelected ideal functions (tolerance = max dev x {TOLERANCE_FACTOR:.4}):\n"));
    for fit in &best.fits {
        out.push_str(&format!(
            "  {:<8} -> {:<8} SSE={:.4} max_dev={:.4} tol={:.4}\n",
            fit.train,
            fit.ideal,
            fit.sse,
            fit.max_deviation,
            tolerance(fit.max_deviation)
        ));
    }
    for skipped in &best.skipped {
        out.push_str(&format!(
            "  (skipped {} vs {}) {}\n",
            skipped.train, skipped.ideal, skipped.reason
        ));
    }

    out.push_str(&format!(
        "\nTest mapping: {} of {} mapped, {} unmatched\n",
        summary.matched(),
        summary.total,
        summary.unmatched
    ));
    for (ideal_name, count) in summary.per_ideal.iter() {
        out.push_str(&format!("  {ideal_name:<8} {count}\n"));
    }

    out
}

/// Format classification results as a fixed-width table (first `limit` rows).
pub fn format_results(results: &[ClassificationResult], limit: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:>10} {:>10} {:>12} {:>10} {:>10}\n",
        "x", "y_test", "mapped_ideal", "ideal_y", "deviation"
    ));
    for r in results.iter().take(limit) {
        out.push_str(&format!(
            "{:>10.4} {:>10.4} {:>12} {:>10} {:>10}\n",
            r.x,
            r.y_test,
            r.mapped_ideal.as_deref().unwrap_or("-"),
            fmt_opt(r.ideal_y),
            fmt_opt(r.deviation),
        ));
    }
    push_truncation_note(&mut out, results.len(), limit);
    out
}

/// Format a stored table (first `limit` rows).
pub fn format_stored_table(table: &StoredTable, limit: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Table '{}': {} row(s) x {} column(s)\n",
        table.name,
        table.len(),
        table.columns.len()
    ));

    let header: Vec<String> = table.columns.iter().map(|c| format!("{:>12}", c.name)).collect();
    out.push_str(header.join(" ").trim_end());
    out.push('\n');

    for row in table.rows.iter().take(limit) {
        let cells: Vec<String> = row.iter().map(|c| format!("{:>12}", fmt_cell(c))).collect();
        out.push_str(cells.join(" ").trim_end());
        out.push('\n');
    }
    push_truncation_note(&mut out, table.len(), limit);
    out
}

fn push_truncation_note(out: &mut String, total: usize, limit: usize) {
    if total > limit {
        out.push_str(&format!("... ({} more row(s))\n", total - limit));
    }
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.4}")).unwrap_or_else(|| "-".to_string())
}

fn fmt_cell(cell: &Cell) -> String {
    match cell {
        Cell::Real(v) => format!("{v:.4}"),
        Cell::Text(s) => s.clone(),
        Cell::Null => "NULL".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Series;
    use crate::fit::FitDetail;
    use crate::io::store::ColumnDef;
    use crate::report::summarize;

    #[test]
    fn results_table_golden() {
        let results = vec![
            ClassificationResult::matched(1.0, 10.0, "y1", 9.0),
            ClassificationResult::unmatched(1.0, 12.0),
            ClassificationResult::unmatched(2.0, 0.0),
        ];
        let txt = format_results(&results, 2);
        let expected = concat!(
            "         x     y_test mapped_ideal    ideal_y  deviation\n",
            "    1.0000    10.0000           y1     9.0000     1.0000\n",
            "    1.0000    12.0000            -          -          -\n",
            "... (1 more row(s))\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn summary_lists_each_selection() {
        let x = vec![1.0, 2.0];
        let training = TableModel::new("train", x.clone(), vec![Series::new("y1", vec![1.0, 2.0])]).unwrap();
        let ideal = TableModel::new("ideal", x.clone(), vec![Series::new("y9", vec![1.0, 2.5])]).unwrap();
        let test = TableModel::new("test", x, vec![Series::new("y", vec![1.0, 7.0])]).unwrap();
        let best = BestFit {
            selection: [("y1", "y9".to_string())].into_iter().collect(),
            max_deviation: [("y1", 0.5)].into_iter().collect(),
            fits: vec![FitDetail {
                train: "y1".to_string(),
                ideal: "y9".to_string(),
                sse: 0.25,
                max_deviation: 0.5,
            }],
            skipped: vec![],
        };
        let results = vec![
            ClassificationResult::matched(1.0, 1.0, "y9", 1.0),
            ClassificationResult::unmatched(2.0, 7.0),
        ];
        let summary = summarize(&results, &best.selection);

        let txt = format_run_summary(&training, &ideal, &test, &best, &summary);
        assert!(txt.contains("y1       -> y9       SSE=0.2500 max_dev=0.5000 tol=0.7071"), "{txt}");
        assert!(txt.contains("Test mapping: 1 of 2 mapped, 1 unmatched"), "{txt}");
    }

    #[test]
    fn stored_table_shows_nulls() {
        let table = StoredTable {
            name: "test_results".to_string(),
            columns: vec![ColumnDef::real("x"), ColumnDef::text("mapped_ideal")],
            rows: vec![vec![Cell::Real(0.5), Cell::Null]],
        };
        let txt = format_stored_table(&table, 10);
        assert!(txt.starts_with("Table 'test_results': 1 row(s) x 2 column(s)\n"));
        assert!(txt.ends_with("      0.5000         NULL\n"), "{txt}");
    }
}
