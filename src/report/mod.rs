//! Reporting utilities: result packaging, summaries, formatted terminal output.

pub mod assemble;
pub mod format;

pub use assemble::*;
pub use format::*;

use crate::domain::{ClassificationResult, ColumnMap, SelectionMap};

/// How many test points each selected ideal function absorbed.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchSummary {
    /// Ideal column → mapped point count, in selection order (zero counts included).
    pub per_ideal: ColumnMap<usize>,
    pub unmatched: usize,
    pub total: usize,
}

impl MatchSummary {
    pub fn matched(&self) -> usize {
        self.total - self.unmatched
    }
}

/// Count mapped / unmatched test points.
pub fn summarize(results: &[ClassificationResult], selection: &SelectionMap) -> MatchSummary {
    let mut per_ideal: ColumnMap<usize> = selection.iter().map(|(_, ideal)| (ideal.clone(), 0)).collect();
    let mut unmatched = 0;

    for r in results {
        match &r.mapped_ideal {
            Some(ideal) => {
                let count = per_ideal.get(ideal).copied().unwrap_or(0);
                per_ideal.insert(ideal.clone(), count + 1);
            }
            None => unmatched += 1,
        }
    }

    MatchSummary {
        per_ideal,
        unmatched,
        total: results.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarize_counts_per_ideal_function() {
        let selection: SelectionMap =
            [("y1", "y36".to_string()), ("y2", "y11".to_string())].into_iter().collect();
        let results = vec![
            ClassificationResult::matched(0.0, 1.0, "y11", 1.1),
            ClassificationResult::unmatched(1.0, 9.0),
            ClassificationResult::matched(2.0, 1.0, "y11", 0.9),
        ];

        let summary = summarize(&results, &selection);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.unmatched, 1);
        assert_eq!(summary.matched(), 2);
        assert_eq!(summary.per_ideal.get("y11"), Some(&2));
        assert_eq!(summary.per_ideal.get("y36"), Some(&0));
        assert_eq!(summary.per_ideal.keys().collect::<Vec<_>>(), vec!["y36", "y11"]);
    }
}
