//! In-memory table snapshots
//!
//! A [`LoadedTable`] holds every row of one table as typed records, together with
//! the column names they were loaded under. Rows are decoded from backend
//! [`Value`]s through the [`TableRow`] trait.

use serde::Serialize;

use super::backend::Value;
use super::schema::TableSchema;
use crate::error::DbError;

/// A row that can be rendered as text cells, one per column
pub trait Record: Serialize {
    fn cells(&self) -> Vec<String>;
}

/// A record decoded from a row of a declared table
pub trait TableRow: Record + Sized {
    fn from_values(values: Vec<Value>) -> Result<Self, String>;
}

/// Sequential reader over the values of one row
pub struct ValueReader {
    values: std::vec::IntoIter<Value>,
}

impl ValueReader {
    pub fn new(values: Vec<Value>) -> Self {
        ValueReader {
            values: values.into_iter(),
        }
    }

    fn next(&mut self, column: &str) -> Result<Value, String> {
        self.values
            .next()
            .ok_or_else(|| format!("missing value for column '{}'", column))
    }

    pub fn integer(&mut self, column: &str) -> Result<i64, String> {
        match self.next(column)? {
            Value::Integer(v) => Ok(v),
            Value::Null => Err(format!("column '{}' is NULL", column)),
            other => Err(format!("column '{}' is not an integer: {:?}", column, other)),
        }
    }

    pub fn text(&mut self, column: &str) -> Result<String, String> {
        self.opt_text(column)?
            .ok_or_else(|| format!("column '{}' is NULL", column))
    }

    pub fn opt_text(&mut self, column: &str) -> Result<Option<String>, String> {
        match self.next(column)? {
            Value::Text(v) => Ok(Some(v)),
            Value::Null => Ok(None),
            other => Err(format!("column '{}' is not text: {:?}", column, other)),
        }
    }

    /// Fail if values are left over
    pub fn finish(mut self) -> Result<(), String> {
        match self.values.next() {
            None => Ok(()),
            Some(_) => Err(format!(
                "{} unexpected trailing value(s)",
                self.values.len() + 1
            )),
        }
    }
}

/// Point-in-time snapshot of one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedTable<R> {
    name: String,
    columns: Vec<String>,
    rows: Vec<R>,
}

impl<R> LoadedTable<R> {
    pub fn new(name: &str, columns: Vec<String>, rows: Vec<R>) -> Self {
        LoadedTable {
            name: name.to_string(),
            columns,
            rows,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&R> {
        self.rows.get(idx)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.rows.iter()
    }
}

impl<R: TableRow> LoadedTable<R> {
    /// Decode raw rows selected from `schema`
    pub fn from_values(schema: &TableSchema, rows: Vec<Vec<Value>>) -> Result<Self, DbError> {
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(idx, values)| {
                R::from_values(values).map_err(|e| {
                    DbError::storage(
                        format!("decoding row {} of table '{}'", idx, schema.name),
                        e,
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(LoadedTable::new(&schema.name, schema.key_names(), rows))
    }
}

impl<'a, R> IntoIterator for &'a LoadedTable<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
