//! Table persistence.
//!
//! The pipeline never talks to the database directly; it hands named
//! [`StoredTable`]s to a [`TableStore`]. The SQLite implementation gives
//! every write replace semantics: an existing table of the same name is
//! dropped and recreated, never appended to or merged.

use std::path::Path;

use log::{debug, info};
use rusqlite::types::Value;
use rusqlite::{Connection, params_from_iter};

use crate::domain::{TableModel, X_COLUMN};
use crate::error::MatchError;

/// A single stored value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Real(f64),
    Text(String),
    Null,
}

impl Cell {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Real(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Real(v)
    }
}

impl From<Option<f64>> for Cell {
    fn from(v: Option<f64>) -> Self {
        v.map_or(Cell::Null, Cell::Real)
    }
}

impl From<Option<String>> for Cell {
    fn from(v: Option<String>) -> Self {
        v.map_or(Cell::Null, Cell::Text)
    }
}

impl From<Value> for Cell {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => Cell::Null,
            Value::Integer(i) => Cell::Real(i as f64),
            Value::Real(f) => Cell::Real(f),
            Value::Text(s) => Cell::Text(s),
            Value::Blob(b) => Cell::Text(format!("<{} bytes>", b.len())),
        }
    }
}

impl From<&Cell> for Value {
    fn from(cell: &Cell) -> Self {
        match cell {
            Cell::Real(v) => Value::Real(*v),
            Cell::Text(s) => Value::Text(s.clone()),
            Cell::Null => Value::Null,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Real,
    Text,
}

impl ColumnKind {
    fn sql_type(self) -> &'static str {
        match self {
            ColumnKind::Real => "REAL",
            ColumnKind::Text => "TEXT",
        }
    }

    /// SQLite text affinity: the declared type mentions CHAR, CLOB or TEXT.
    fn from_decl_type(decl: &str) -> Self {
        let decl = decl.to_ascii_uppercase();
        if ["CHAR", "CLOB", "TEXT"].iter().any(|t| decl.contains(t)) {
            ColumnKind::Text
        } else {
            ColumnKind::Real
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub kind: ColumnKind,
}

impl ColumnDef {
    pub fn real(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Real,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Text,
        }
    }
}

/// A named, row-oriented table ready for persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredTable {
    pub name: String,
    pub columns: Vec<ColumnDef>,
    pub rows: Vec<Vec<Cell>>,
}

impl StoredTable {
    /// Row-major copy of a numeric table: `x` followed by its dependent columns.
    pub fn from_table_model(name: impl Into<String>, table: &TableModel) -> Self {
        let mut columns = vec![ColumnDef::real(X_COLUMN)];
        columns.extend(table.columns().iter().map(|c| ColumnDef::real(c.name.clone())));

        let rows = (0..table.len())
            .map(|row| {
                let mut cells = Vec::with_capacity(columns.len());
                cells.push(Cell::Real(table.x()[row]));
                cells.extend(table.columns().iter().map(|c| Cell::Real(c.values[row])));
                cells
            })
            .collect();

        Self {
            name: name.into(),
            columns,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }
}

/// Storage collaborator used by the orchestration layer.
pub trait TableStore {
    /// Create or replace `table.name`. Zero-row tables are rejected.
    fn replace_table(&mut self, table: &StoredTable) -> Result<(), MatchError>;

    /// Read a previously stored table back.
    fn load_table(&self, name: &str) -> Result<StoredTable, MatchError>;

    /// Names of all stored tables, sorted.
    fn table_names(&self) -> Result<Vec<String>, MatchError>;
}

/// SQLite-backed [`TableStore`].
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, MatchError> {
        let conn = Connection::open(path)
            .map_err(|e| MatchError::persistence("", format!("failed to open database '{}': {e}", path.display())))?;
        info!("Opened SQLite store at {}", path.display());
        Ok(Self { conn })
    }

    /// Column definitions as declared in the schema, in column order.
    ///
    /// Cell values cannot tell a TEXT column that only holds NULLs from a
    /// REAL one, so the kind comes from the declared type.
    fn declared_columns(&self, name: &str) -> Result<Vec<ColumnDef>, MatchError> {
        let err = |e: rusqlite::Error| MatchError::persistence(name, e);
        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info({})", quote_ident(name)))
            .map_err(err)?;
        let columns = stmt
            .query_map([], |row| {
                let col: String = row.get(1)?;
                let decl: String = row.get(2)?;
                Ok(ColumnDef {
                    name: col,
                    kind: ColumnKind::from_decl_type(&decl),
                })
            })
            .map_err(err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(err)?;
        Ok(columns)
    }

    pub fn open_in_memory() -> Result<Self, MatchError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| MatchError::persistence("", format!("failed to open in-memory database: {e}")))?;
        Ok(Self { conn })
    }
}

impl TableStore for SqliteStore {
    fn replace_table(&mut self, table: &StoredTable) -> Result<(), MatchError> {
        let name = table.name.as_str();
        if table.is_empty() {
            return Err(MatchError::persistence(
                name,
                "table has no rows; refusing to create an empty table",
            ));
        }
        if table.columns.is_empty() {
            return Err(MatchError::persistence(name, "table has no columns"));
        }
        if let Some(bad) = table.rows.iter().position(|r| r.len() != table.columns.len()) {
            return Err(MatchError::persistence(
                name,
                format!(
                    "row {bad} has {} cells but the table has {} columns",
                    table.rows[bad].len(),
                    table.columns.len()
                ),
            ));
        }

        let err = |e: rusqlite::Error| MatchError::persistence(name, e);
        let quoted = quote_ident(name);
        let column_sql: Vec<String> = table
            .columns
            .iter()
            .map(|c| format!("{} {}", quote_ident(&c.name), c.kind.sql_type()))
            .collect();
        let column_names: Vec<String> = table.columns.iter().map(|c| quote_ident(&c.name)).collect();
        let placeholders: Vec<String> = (1..=table.columns.len()).map(|i| format!("?{i}")).collect();

        let tx = self.conn.transaction().map_err(err)?;
        tx.execute(&format!("DROP TABLE IF EXISTS {quoted}"), []).map_err(err)?;
        tx.execute(&format!("CREATE TABLE {quoted} ({})", column_sql.join(", ")), [])
            .map_err(err)?;
        {
            let mut stmt = tx
                .prepare(&format!(
                    "INSERT INTO {quoted} ({}) VALUES ({})",
                    column_names.join(", "),
                    placeholders.join(", ")
                ))
                .map_err(err)?;
            for row in &table.rows {
                stmt.execute(params_from_iter(row.iter().map(Value::from)))
                    .map_err(err)?;
            }
        }
        tx.commit().map_err(err)?;

        debug!("Replaced table '{name}' ({} rows)", table.len());
        Ok(())
    }

    fn load_table(&self, name: &str) -> Result<StoredTable, MatchError> {
        if !self.table_names()?.iter().any(|t| t == name) {
            return Err(MatchError::persistence(name, "no such table"));
        }

        let err = |e: rusqlite::Error| MatchError::persistence(name, e);
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT * FROM {}", quote_ident(name)))
            .map_err(err)?;
        let width = stmt.column_count();

        let mut rows_out: Vec<Vec<Cell>> = Vec::new();
        let mut rows = stmt.query([]).map_err(err)?;
        while let Some(row) = rows.next().map_err(err)? {
            let mut cells = Vec::with_capacity(width);
            for idx in 0..width {
                let value: Value = row.get(idx).map_err(err)?;
                cells.push(Cell::from(value));
            }
            rows_out.push(cells);
        }

        let columns = self.declared_columns(name)?;

        Ok(StoredTable {
            name: name.to_string(),
            columns,
            rows: rows_out,
        })
    }

    fn table_names(&self) -> Result<Vec<String>, MatchError> {
        let err = |e: rusqlite::Error| MatchError::persistence("sqlite_master", e);
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name")
            .map_err(err)?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(err)?;
        Ok(names)
    }
}

/// Quote an SQL identifier (`"name"`, with embedded quotes doubled).
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
