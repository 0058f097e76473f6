//! Backend drivers
//!
//! Each backend wraps exactly one open connection. Rows come back as loosely typed
//! [`Value`]s, decoded according to the declared column types, so that a column
//! whose stored type no longer matches the declaration is reported as an error
//! instead of being coerced.

use std::path::Path;

use rusqlite::Connection;
use tracing::debug;

use super::schema::ColumnType;
use crate::error::BoxError;

/// A single cell read from the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Integer(i64),
    Text(String),
}

/// One open connection to a relational store
pub(crate) trait Backend {
    /// Names of the tables in the default schema, sorted by name
    fn table_names(&mut self) -> Result<Vec<String>, BoxError>;

    /// Execute one or more statements that return no rows
    fn execute_batch(&mut self, sql: &str) -> Result<(), BoxError>;

    /// Run a query and decode every row using `types`, one entry per column
    fn query(&mut self, sql: &str, types: &[ColumnType]) -> Result<Vec<Vec<Value>>, BoxError>;

    /// Run a query returning a single integer
    fn query_count(&mut self, sql: &str) -> Result<u64, BoxError>;

    /// Close the connection and report any error doing so
    fn close(self: Box<Self>) -> Result<(), BoxError>;
}

// =============================================================================
// SQLite
// =============================================================================

pub(crate) struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    /// Open a database file; `:memory:` creates an in-memory database
    ///
    /// WAL mode is persistent, so it is only switched on for files created here.
    /// Existing files keep their journal mode.
    pub fn open(path: &str) -> Result<Self, BoxError> {
        let (conn, created) = if path == ":memory:" {
            (Connection::open_in_memory()?, false)
        } else {
            let created = !Path::new(path).exists();
            (Connection::open(path)?, created)
        };
        let backend = SqliteBackend { conn };
        backend.configure(created)?;
        Ok(backend)
    }

    fn configure(&self, created: bool) -> Result<(), BoxError> {
        if created {
            let mode: String = self
                .conn
                .query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;
            debug!("sqlite journal mode: {}", mode);
        }

        self.conn.execute("PRAGMA synchronous=NORMAL", [])?;
        self.conn.execute("PRAGMA foreign_keys=ON", [])?;
        Ok(())
    }
}

impl Backend for SqliteBackend {
    fn table_names(&mut self) -> Result<Vec<String>, BoxError> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
             ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    fn execute_batch(&mut self, sql: &str) -> Result<(), BoxError> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    fn query(&mut self, sql: &str, types: &[ColumnType]) -> Result<Vec<Vec<Value>>, BoxError> {
        let mut stmt = self.conn.prepare(sql)?;
        if stmt.column_count() != types.len() {
            return Err(format!(
                "query returned {} columns, expected {}",
                stmt.column_count(),
                types.len()
            )
            .into());
        }

        let rows = stmt
            .query_map([], |row| {
                types
                    .iter()
                    .enumerate()
                    .map(|(idx, ty)| match ty {
                        ColumnType::Integer => Ok(row
                            .get::<_, Option<i64>>(idx)?
                            .map_or(Value::Null, Value::Integer)),
                        ColumnType::String(_) => Ok(row
                            .get::<_, Option<String>>(idx)?
                            .map_or(Value::Null, Value::Text)),
                    })
                    .collect::<Result<Vec<_>, rusqlite::Error>>()
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn query_count(&mut self, sql: &str) -> Result<u64, BoxError> {
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    fn close(self: Box<Self>) -> Result<(), BoxError> {
        self.conn.close().map_err(|(_, e)| e)?;
        Ok(())
    }
}

// =============================================================================
// PostgreSQL
// =============================================================================

#[cfg(feature = "postgres")]
pub(crate) use pg::PostgresBackend;

#[cfg(feature = "postgres")]
mod pg {
    use super::{Backend, Value};
    use crate::database::core::schema::ColumnType;
    use crate::error::BoxError;
    use postgres::{Client, NoTls};

    pub(crate) struct PostgresBackend {
        client: Client,
    }

    impl PostgresBackend {
        pub fn connect(
            host: &str,
            port: u16,
            user: &str,
            password: &str,
            dbname: &str,
        ) -> Result<Self, BoxError> {
            let client = postgres::Config::new()
                .host(host)
                .port(port)
                .user(user)
                .password(password)
                .dbname(dbname)
                .connect(NoTls)?;
            Ok(PostgresBackend { client })
        }
    }

    impl Backend for PostgresBackend {
        fn table_names(&mut self) -> Result<Vec<String>, BoxError> {
            let rows = self.client.query(
                "SELECT tablename::text FROM pg_catalog.pg_tables
                 WHERE schemaname = current_schema()
                 ORDER BY tablename",
                &[],
            )?;
            rows.iter()
                .map(|row| row.try_get::<_, String>(0).map_err(BoxError::from))
                .collect()
        }

        fn execute_batch(&mut self, sql: &str) -> Result<(), BoxError> {
            self.client.batch_execute(sql)?;
            Ok(())
        }

        fn query(
            &mut self,
            sql: &str,
            types: &[ColumnType],
        ) -> Result<Vec<Vec<Value>>, BoxError> {
            let rows = self.client.query(sql, &[])?;
            let mut out = Vec::with_capacity(rows.len());
            for row in rows {
                if row.len() != types.len() {
                    return Err(format!(
                        "query returned {} columns, expected {}",
                        row.len(),
                        types.len()
                    )
                    .into());
                }
                let mut values = Vec::with_capacity(types.len());
                for (idx, ty) in types.iter().enumerate() {
                    let value = match ty {
                        ColumnType::Integer => row
                            .try_get::<_, Option<i32>>(idx)?
                            .map_or(Value::Null, |v| Value::Integer(v as i64)),
                        ColumnType::String(_) => row
                            .try_get::<_, Option<String>>(idx)?
                            .map_or(Value::Null, Value::Text),
                    };
                    values.push(value);
                }
                out.push(values);
            }
            Ok(out)
        }

        fn query_count(&mut self, sql: &str) -> Result<u64, BoxError> {
            let row = self.client.query_one(sql, &[])?;
            let count: i64 = row.try_get(0)?;
            Ok(count.max(0) as u64)
        }

        fn close(self: Box<Self>) -> Result<(), BoxError> {
            self.client.close()?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_open_in_memory() {
        let backend = SqliteBackend::open(":memory:");
        assert!(backend.is_ok());
    }

    #[test]
    fn test_sqlite_table_names_sorted() {
        let mut backend = SqliteBackend::open(":memory:").unwrap();
        backend
            .execute_batch(
                "CREATE TABLE zeta (id INTEGER PRIMARY KEY);
                 CREATE TABLE alpha (id INTEGER PRIMARY KEY);",
            )
            .unwrap();

        assert_eq!(backend.table_names().unwrap(), vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_sqlite_query_decodes_nulls() {
        let mut backend = SqliteBackend::open(":memory:").unwrap();
        backend
            .execute_batch(
                "CREATE TABLE t (id INTEGER, label TEXT);
                 INSERT INTO t VALUES (1, 'a'), (2, NULL);",
            )
            .unwrap();

        let rows = backend
            .query(
                "SELECT id, label FROM t ORDER BY id",
                &[ColumnType::Integer, ColumnType::String(10)],
            )
            .unwrap();
        assert_eq!(
            rows,
            vec![
                vec![Value::Integer(1), Value::Text("a".to_string())],
                vec![Value::Integer(2), Value::Null],
            ]
        );
    }

    #[test]
    fn test_sqlite_query_rejects_type_drift() {
        let mut backend = SqliteBackend::open(":memory:").unwrap();
        backend
            .execute_batch(
                "CREATE TABLE t (id TEXT);
                 INSERT INTO t VALUES ('not a number');",
            )
            .unwrap();

        assert!(backend
            .query("SELECT id FROM t", &[ColumnType::Integer])
            .is_err());
    }

    #[test]
    fn test_sqlite_query_rejects_column_count_mismatch() {
        let mut backend = SqliteBackend::open(":memory:").unwrap();
        backend.execute_batch("CREATE TABLE t (a INTEGER, b INTEGER);").unwrap();

        assert!(backend
            .query("SELECT a, b FROM t", &[ColumnType::Integer])
            .is_err());
    }

    fn journal_mode(backend: &SqliteBackend) -> String {
        backend
            .conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_sqlite_new_file_uses_wal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.sqlite3");
        let backend = SqliteBackend::open(path.to_str().unwrap()).unwrap();
        assert_eq!(journal_mode(&backend), "wal");
    }

    #[test]
    fn test_sqlite_existing_file_keeps_journal_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("existing.sqlite3");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch("CREATE TABLE t (id INTEGER);").unwrap();
        }

        let backend = SqliteBackend::open(path.to_str().unwrap()).unwrap();
        assert_eq!(journal_mode(&backend), "delete");
    }

    #[test]
    fn test_sqlite_close() {
        let backend = Box::new(SqliteBackend::open(":memory:").unwrap());
        assert!(backend.close().is_ok());
    }
}
