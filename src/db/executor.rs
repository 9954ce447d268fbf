//! Storage interface consumed by the repository.
//!
//! Rows cross this boundary as ordered lists of [`Cell`] values so the
//! repository can decode them into typed records without caring which engine
//! produced them.

use chrono::{DateTime, NaiveDate, Utc};
use futures::future::BoxFuture;
use futures::stream::BoxStream;

use crate::error::QueryError;
use crate::query::BuiltQuery;

/// Read-only, parameterized query execution.
pub trait QueryExecutor: Send + Sync {
    /// Run `query` and yield its rows lazily, in order. A broken stream ends
    /// with a terminal error item.
    fn fetch<'a>(&'a self, query: &'a BuiltQuery) -> BoxStream<'a, Result<Row, QueryError>>;

    /// Run `query` and return the first column of its single row.
    fn fetch_scalar<'a>(&'a self, query: &'a BuiltQuery) -> BoxFuture<'a, Result<Cell, QueryError>>;
}

/// A single decoded column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    TextArray(Vec<Option<String>>),
}

impl Cell {
    pub fn kind(&self) -> &'static str {
        match self {
            Cell::Null => "null",
            Cell::Bool(_) => "bool",
            Cell::Int(_) => "int",
            Cell::Float(_) => "float",
            Cell::Text(_) => "text",
            Cell::Date(_) => "date",
            Cell::Timestamp(_) => "timestamp",
            Cell::TextArray(_) => "text[]",
        }
    }

    /// Interpret a scalar result as a count; SQL `NULL` counts as zero.
    pub fn into_count(self) -> Result<i64, QueryError> {
        match self {
            Cell::Int(v) => Ok(v),
            Cell::Null => Ok(0),
            other => Err(QueryError::Decode {
                column: 0,
                expected: "int",
                found: other.kind(),
            }),
        }
    }
}

/// One result row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    cells: Vec<Cell>,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Row { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn cell(&self, column: usize) -> Result<&Cell, QueryError> {
        self.cells.get(column).ok_or(QueryError::Decode {
            column,
            expected: "a column",
            found: "end of row",
        })
    }

    fn mismatch<T>(column: usize, expected: &'static str, found: &Cell) -> Result<T, QueryError> {
        Err(QueryError::Decode {
            column,
            expected,
            found: found.kind(),
        })
    }

    pub fn int(&self, column: usize) -> Result<i64, QueryError> {
        match self.cell(column)? {
            Cell::Int(v) => Ok(*v),
            other => Self::mismatch(column, "int", other),
        }
    }

    pub fn opt_int(&self, column: usize) -> Result<Option<i64>, QueryError> {
        match self.cell(column)? {
            Cell::Null => Ok(None),
            Cell::Int(v) => Ok(Some(*v)),
            other => Self::mismatch(column, "int or null", other),
        }
    }

    /// Floats also accept integer cells, since aggregates over integer
    /// columns come back as integers on some engines.
    pub fn float(&self, column: usize) -> Result<f64, QueryError> {
        match self.cell(column)? {
            Cell::Float(v) => Ok(*v),
            Cell::Int(v) => Ok(*v as f64),
            other => Self::mismatch(column, "float", other),
        }
    }

    pub fn opt_float(&self, column: usize) -> Result<Option<f64>, QueryError> {
        match self.cell(column)? {
            Cell::Null => Ok(None),
            _ => self.float(column).map(Some),
        }
    }

    pub fn text(&self, column: usize) -> Result<String, QueryError> {
        match self.cell(column)? {
            Cell::Text(v) => Ok(v.clone()),
            other => Self::mismatch(column, "text", other),
        }
    }

    pub fn opt_text(&self, column: usize) -> Result<Option<String>, QueryError> {
        match self.cell(column)? {
            Cell::Null => Ok(None),
            Cell::Text(v) => Ok(Some(v.clone())),
            other => Self::mismatch(column, "text or null", other),
        }
    }

    /// A calendar date; timestamps are truncated to their UTC date.
    pub fn date(&self, column: usize) -> Result<NaiveDate, QueryError> {
        match self.cell(column)? {
            Cell::Date(v) => Ok(*v),
            Cell::Timestamp(v) => Ok(v.date_naive()),
            other => Self::mismatch(column, "date", other),
        }
    }

    pub fn timestamp(&self, column: usize) -> Result<DateTime<Utc>, QueryError> {
        match self.cell(column)? {
            Cell::Timestamp(v) => Ok(*v),
            other => Self::mismatch(column, "timestamp", other),
        }
    }

    /// Array of nullable text; a SQL `NULL` array reads as empty.
    pub fn text_array(&self, column: usize) -> Result<Vec<Option<String>>, QueryError> {
        match self.cell(column)? {
            Cell::Null => Ok(Vec::new()),
            Cell::TextArray(v) => Ok(v.clone()),
            other => Self::mismatch(column, "text[]", other),
        }
    }

    /// Consume the row and take ownership of one cell.
    pub fn into_cell(mut self, column: usize) -> Result<Cell, QueryError> {
        self.cell(column)?;
        Ok(self.cells.swap_remove(column))
    }

    /// Consume the row and take ownership of a text array column.
    pub fn into_text_array(mut self, column: usize) -> Result<Vec<Option<String>>, QueryError> {
        if column >= self.cells.len() {
            return self.text_array(column);
        }
        match std::mem::replace(&mut self.cells[column], Cell::Null) {
            Cell::Null => Ok(Vec::new()),
            Cell::TextArray(v) => Ok(v),
            other => Self::mismatch(column, "text[]", &other),
        }
    }
}

impl From<Vec<Cell>> for Row {
    fn from(cells: Vec<Cell>) -> Self {
        Row::new(cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_accessors() {
        let row = Row::new(vec![
            Cell::Int(7),
            Cell::Text("hvg".to_string()),
            Cell::Null,
            Cell::Float(0.25),
        ]);

        assert_eq!(row.int(0).unwrap(), 7);
        assert_eq!(row.text(1).unwrap(), "hvg");
        assert_eq!(row.opt_text(2).unwrap(), None);
        assert_eq!(row.float(3).unwrap(), 0.25);
        assert_eq!(row.float(0).unwrap(), 7.0);
        assert_eq!(row.opt_float(2).unwrap(), None);
    }

    #[test]
    fn test_mismatch_is_decode_error() {
        let row = Row::new(vec![Cell::Text("x".to_string())]);
        match row.int(0) {
            Err(QueryError::Decode {
                column,
                expected,
                found,
            }) => {
                assert_eq!(column, 0);
                assert_eq!(expected, "int");
                assert_eq!(found, "text");
            }
            other => panic!("expected decode error, got {:?}", other),
        }
        assert!(matches!(row.text(3), Err(QueryError::Decode { column: 3, .. })));
    }

    #[test]
    fn test_date_from_timestamp() {
        let ts = DateTime::parse_from_rfc3339("2024-03-05T23:10:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let row = Row::new(vec![Cell::Timestamp(ts)]);
        assert_eq!(
            row.date(0).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
        );
    }

    #[test]
    fn test_null_array_is_empty() {
        let row = Row::new(vec![Cell::Null]);
        assert!(row.text_array(0).unwrap().is_empty());
        assert!(row.into_text_array(0).unwrap().is_empty());
    }

    #[test]
    fn test_into_cell() {
        let row = Row::new(vec![Cell::Int(1), Cell::Bool(true)]);
        assert_eq!(row.clone().into_cell(1).unwrap(), Cell::Bool(true));
        assert!(row.into_cell(2).is_err());
    }

    #[test]
    fn test_scalar_count() {
        assert_eq!(Cell::Int(12).into_count().unwrap(), 12);
        assert_eq!(Cell::Null.into_count().unwrap(), 0);
        assert!(Cell::Text("12".to_string()).into_count().is_err());
    }
}
