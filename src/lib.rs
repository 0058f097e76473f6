#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! Userstore - read-only access to the user and user preference tables
//!
//! Userstore connects to a relational store, declares the `user` and `user_pref`
//! tables, creates whichever are missing, loads both into typed in-memory
//! snapshots and exposes their inner join on `user_id`.
//!
//! # Feature Flags
//!
//! | Feature | Description | Key Dependencies |
//! |---------|-------------|------------------|
//! | `postgres` | PostgreSQL backend | `postgres` |
//! | `display` | Table formatting with `tabled` | `tabled` |
//! | `cli` | Command line tool | `clap`, `tracing-subscriber` |
//!
//! SQLite support (`rusqlite`) is always available.
//!
//! # Architecture
//!
//! - **[`config`]**: Settings file, `USERSTORE_*` overrides and the credential env file
//! - **[`database`]**: Connections, table declarations, snapshots and the joined view
//! - **[`error`]**: The [`DbError`] taxonomy
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use userstore::{ConnectionHandle, UserTables, UserstoreConfig};
//!
//! let settings = UserstoreConfig::new(&None)?;
//! let vars = settings.load_env()?;
//! let handle = ConnectionHandle::open(settings.connection_config(&vars)?)?;
//!
//! let users = UserTables::with_row_limit(&handle, settings.row_limit)?;
//! for row in &users.df() {
//!     println!("{}: {} = {:?}", row.user_name, row.pref_name, row.pref_value);
//! }
//!
//! handle.close()?;
//! ```

pub mod config;
pub mod database;
pub mod error;

#[cfg(feature = "display")]
pub mod output;

pub use config::UserstoreConfig;
pub use error::DbError;

pub use database::{
    ConnectionConfig, ConnectionHandle, JoinedRow, LoadedTable, MetaData, TableSchema,
    UserPrefRow, UserRow, UserTables,
};

#[cfg(feature = "display")]
pub use output::OutputFormat;
