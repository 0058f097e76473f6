//! Core database infrastructure
//!
//! This module provides the foundational database components:
//! - `ConnectionHandle`: one open backend connection with its metadata registry
//! - `ConnectionConfig`: credentials and addressing for a connection
//! - `MetaData` / `TableSchema`: table declarations and DDL rendering
//! - `LoadedTable`: typed in-memory table snapshots

mod backend;
mod connection;
mod frame;
mod schema;

pub use backend::Value;
pub use connection::{ConnectionConfig, ConnectionHandle, Dialect, DEFAULT_DIALECT, DEFAULT_PORT};
pub use frame::{LoadedTable, Record, TableRow, ValueReader};
pub use schema::{quote_ident, ColumnDef, ColumnType, ForeignKey, MetaData, TableSchema};
