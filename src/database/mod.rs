//! Database module
//!
//! This module provides all database functionality for userstore, organized into:
//!
//! - **core**: Connection handling, table declarations and in-memory snapshots
//! - **users**: The `user` / `user_pref` tables and their joined view
//!
//! # Architecture
//!
//! ```text
//! database/
//! ├── core/           # Foundation
//! │   ├── backend     # SQLite (rusqlite) and PostgreSQL (postgres) drivers
//! │   ├── connection  # ConnectionConfig and ConnectionHandle
//! │   ├── schema      # TableSchema, MetaData registry, DDL rendering
//! │   └── frame       # LoadedTable snapshots
//! │
//! └── users/          # Read-only user tables
//!     └── tables      # Declarations and typed rows
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use userstore::database::{ConnectionConfig, ConnectionHandle, UserTables};
//!
//! let config = ConnectionConfig::new("localhost", 5432, "app", "alice", "secret");
//! let handle = ConnectionHandle::open(config)?;
//! let users = UserTables::new(&handle)?;
//!
//! println!("{} users, {} joined rows", users.user_df().len(), users.df().len());
//! handle.close()?;
//! ```

pub mod core;
pub mod users;

pub use core::{
    ColumnDef, ColumnType, ConnectionConfig, ConnectionHandle, Dialect, ForeignKey, LoadedTable,
    MetaData, Record, TableRow, TableSchema, Value, DEFAULT_DIALECT, DEFAULT_PORT,
};

pub use users::{
    inner_join, user_pref_table, user_table, JoinedRow, UserPrefRow, UserRow, UserTables,
    DEFAULT_ROW_LIMIT, USER_PREF_TABLE, USER_TABLE,
};
