//! In-memory numeric tables.
//!
//! Training, ideal and test datasets all share one shape: an independent
//! column `x` followed by one or more dependent series, aligned by row
//! position. A [`TableModel`] is validated once at construction and never
//! mutated afterwards.

use crate::error::MatchError;

/// Name of the mandatory independent column.
pub const X_COLUMN: &str = "x";

/// A named dependent series.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

impl Series {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// An immutable table: `x` plus dependent series of the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct TableModel {
    name: String,
    x: Vec<f64>,
    columns: Vec<Series>,
}

impl TableModel {
    /// Build a table, rejecting ragged or ambiguously named columns.
    pub fn new(name: impl Into<String>, x: Vec<f64>, columns: Vec<Series>) -> Result<Self, MatchError> {
        let name = name.into();

        if columns.is_empty() {
            return Err(MatchError::invalid_table(&name, "at least one dependent column is required"));
        }

        for (idx, col) in columns.iter().enumerate() {
            if col.name.eq_ignore_ascii_case(X_COLUMN) {
                return Err(MatchError::invalid_table(
                    &name,
                    "the independent column `x` may only appear once",
                ));
            }
            if columns[..idx].iter().any(|c| c.name == col.name) {
                return Err(MatchError::invalid_table(
                    &name,
                    format!("duplicate column `{}`", col.name),
                ));
            }
            if col.len() != x.len() {
                return Err(MatchError::invalid_table(
                    &name,
                    format!("column `{}` has {} values but `x` has {}", col.name, col.len(), x.len()),
                ));
            }
        }

        Ok(Self { name, x, columns })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// Dependent columns in declaration order.
    pub fn columns(&self) -> &[Series] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Series> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Fail fast with `EmptyInput` when the table has no rows.
    pub fn ensure_not_empty(&self) -> Result<(), MatchError> {
        if self.is_empty() {
            return Err(MatchError::EmptyInput {
                table: self.name.clone(),
            });
        }
        Ok(())
    }

    /// `(min, max)` over `x`, ignoring non-finite values.
    pub fn x_range(&self) -> Option<(f64, f64)> {
        finite_range(self.x.iter().copied())
    }

    /// `(min, max)` over every dependent value.
    pub fn y_range(&self) -> Option<(f64, f64)> {
        finite_range(self.columns.iter().flat_map(|c| c.values.iter().copied()))
    }
}

pub(crate) fn finite_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}
