//! Table declarations and the metadata registry
//!
//! A [`TableSchema`] describes one table: its columns, their types, keys and
//! foreign key references. Schemas are registered with a [`MetaData`] registry,
//! which renders `CREATE TABLE IF NOT EXISTS` statements for the tables that are
//! missing from the database.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use super::connection::Dialect;
use crate::error::DbError;

/// Primitive column type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    /// Variable-length string with a maximum length
    String(u32),
}

impl ColumnType {
    fn render(&self, dialect: Dialect, serial: bool) -> String {
        match (self, dialect) {
            (ColumnType::Integer, Dialect::Postgres) if serial => "SERIAL".to_string(),
            (ColumnType::Integer, _) => "INTEGER".to_string(),
            (ColumnType::String(len), _) => format!("VARCHAR({})", len),
        }
    }
}

/// Reference from a column to `table.column`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub table: String,
    pub column: String,
}

impl fmt::Display for ForeignKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

/// A single column definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    /// Column name in the database
    pub name: String,
    /// Name used for the column in loaded tables, when it differs from `name`
    pub key: Option<String>,
    pub column_type: ColumnType,
    pub nullable: bool,
    pub primary_key: bool,
    pub foreign_key: Option<ForeignKey>,
}

impl ColumnDef {
    /// A nullable, non-key column
    pub fn new(name: &str, column_type: ColumnType) -> Self {
        ColumnDef {
            name: name.to_string(),
            key: None,
            column_type,
            nullable: true,
            primary_key: false,
            foreign_key: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn key(mut self, key: &str) -> Self {
        self.key = Some(key.to_string());
        self
    }

    pub fn references(mut self, table: &str, column: &str) -> Self {
        self.foreign_key = Some(ForeignKey {
            table: table.to_string(),
            column: column.to_string(),
        });
        self
    }

    /// Name exposed in loaded tables: the key alias if present, else the column name
    pub fn key_name(&self) -> &str {
        self.key.as_deref().unwrap_or(&self.name)
    }
}

/// Declaration of one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnDef>,
}

impl TableSchema {
    pub fn new(name: &str, columns: Vec<ColumnDef>) -> Self {
        TableSchema {
            name: name.to_string(),
            columns,
        }
    }

    /// Look up a column by its database name; key aliases do not match
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column names as exposed in loaded tables
    pub fn key_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.key_name().to_string()).collect()
    }

    pub fn column_types(&self) -> Vec<ColumnType> {
        self.columns.iter().map(|c| c.column_type).collect()
    }

    /// Tables referenced by foreign keys of this table
    pub fn dependencies(&self) -> impl Iterator<Item = &ForeignKey> {
        self.columns.iter().filter_map(|c| c.foreign_key.as_ref())
    }

    /// Render the `CREATE TABLE IF NOT EXISTS` statement for this table
    pub fn create_sql(&self, dialect: Dialect) -> String {
        let pk: Vec<&ColumnDef> = self.columns.iter().filter(|c| c.primary_key).collect();
        let serial = pk.len() == 1 && pk[0].column_type == ColumnType::Integer;

        let mut parts: Vec<String> = self
            .columns
            .iter()
            .map(|c| {
                let mut line = format!(
                    "{} {}",
                    quote_ident(&c.name),
                    c.column_type.render(dialect, serial && c.primary_key)
                );
                if !c.nullable {
                    line.push_str(" NOT NULL");
                }
                line
            })
            .collect();

        if !pk.is_empty() {
            let cols: Vec<String> = pk.iter().map(|c| quote_ident(&c.name)).collect();
            parts.push(format!("PRIMARY KEY ({})", cols.join(", ")));
        }

        for c in &self.columns {
            if let Some(fk) = &c.foreign_key {
                parts.push(format!(
                    "FOREIGN KEY({}) REFERENCES {} ({})",
                    quote_ident(&c.name),
                    quote_ident(&fk.table),
                    quote_ident(&fk.column)
                ));
            }
        }

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n\t{}\n)",
            quote_ident(&self.name),
            parts.join(",\n\t")
        )
    }

    /// Render a select of every declared column, with an optional row limit
    pub fn select_sql(&self, limit: Option<usize>) -> String {
        let cols: Vec<String> = self.columns.iter().map(|c| quote_ident(&c.name)).collect();
        let mut sql = format!("SELECT {} FROM {}", cols.join(", "), quote_ident(&self.name));
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        sql
    }
}

/// Quote an identifier for both PostgreSQL and SQLite
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Registry of declared tables, kept in declaration order
#[derive(Debug, Clone, Default)]
pub struct MetaData {
    tables: Vec<Arc<TableSchema>>,
}

impl MetaData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table
    ///
    /// Foreign keys are resolved eagerly: the referenced table must already be
    /// declared and must have the referenced column. Declaring a name that is
    /// already registered returns the existing declaration unchanged.
    pub fn declare(&mut self, schema: TableSchema) -> Result<Arc<TableSchema>, DbError> {
        if let Some(existing) = self.get(&schema.name) {
            if *existing != schema {
                warn!(
                    "table '{}' is already declared with a different definition, keeping the existing one",
                    schema.name
                );
            }
            return Ok(existing);
        }

        if schema.columns.is_empty() {
            return Err(DbError::schema(format!(
                "table '{}' has no columns",
                schema.name
            )));
        }

        for fk in schema.dependencies() {
            let target = if fk.table == schema.name {
                schema.column(&fk.column).is_some()
            } else {
                match self.get(&fk.table) {
                    Some(t) => t.column(&fk.column).is_some(),
                    None => {
                        return Err(DbError::schema(format!(
                            "table '{}' references '{}', but table '{}' is not declared",
                            schema.name, fk, fk.table
                        )))
                    }
                }
            };
            if !target {
                return Err(DbError::schema(format!(
                    "table '{}' references '{}', but that column does not exist",
                    schema.name, fk
                )));
            }
        }

        debug!("declared table '{}'", schema.name);
        let schema = Arc::new(schema);
        self.tables.push(schema.clone());
        Ok(schema)
    }

    pub fn get(&self, name: &str) -> Option<Arc<TableSchema>> {
        self.tables.iter().find(|t| t.name == name).cloned()
    }

    /// Declared tables in declaration (dependency) order
    pub fn tables(&self) -> &[Arc<TableSchema>] {
        &self.tables
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// DDL for every declared table whose name is not in `existing`
    pub fn create_statements(&self, dialect: Dialect, existing: &[String]) -> Vec<(String, String)> {
        self.tables
            .iter()
            .filter(|t| !existing.iter().any(|e| e == &t.name))
            .map(|t| (t.name.clone(), t.create_sql(dialect)))
            .collect()
    }
}
