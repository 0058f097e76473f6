//! User and user preference tables
//!
//! [`UserTables`] declares the `user` and `user_pref` tables against a
//! [`ConnectionHandle`], creates whichever of them are missing, and loads both in
//! full. The loaded snapshots never change afterwards; [`UserTables::df`] joins
//! them on `user_id` every time it is called.
//!
//! # Usage
//!
//! ```rust,ignore
//! use userstore::database::{ConnectionConfig, ConnectionHandle, UserTables};
//!
//! let handle = ConnectionHandle::open(config)?;
//! let users = UserTables::new(&handle)?;
//!
//! for row in &users.df() {
//!     println!("{} {}={:?}", row.user_name, row.pref_name, row.pref_value);
//! }
//! ```
//!
//! # Scalability
//!
//! Both tables are pulled into memory without pagination. Construction fails
//! with a storage error when a table holds more rows than the row limit
//! ([`DEFAULT_ROW_LIMIT`] unless set with [`UserTables::with_row_limit`]).

mod tables;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::database::core::{ConnectionHandle, LoadedTable, TableRow, TableSchema};
use crate::error::DbError;

pub use tables::{
    user_pref_table, user_table, JoinedRow, UserPrefRow, UserRow, USER_PREF_TABLE, USER_TABLE,
};

/// Maximum number of rows loaded from one table
pub const DEFAULT_ROW_LIMIT: usize = 1_000_000;

/// Read-only view over the user tables of one connection
pub struct UserTables<'h> {
    handle: &'h ConnectionHandle,
    user: Arc<TableSchema>,
    pref: Arc<TableSchema>,
    user_df: LoadedTable<UserRow>,
    pref_df: LoadedTable<UserPrefRow>,
}

impl<'h> UserTables<'h> {
    /// Declare, create and load the user tables with the default row limit
    pub fn new(handle: &'h ConnectionHandle) -> Result<Self, DbError> {
        Self::with_row_limit(handle, DEFAULT_ROW_LIMIT)
    }

    /// Declare, create and load the user tables
    ///
    /// Fails if either table holds more than `row_limit` rows.
    pub fn with_row_limit(handle: &'h ConnectionHandle, row_limit: usize) -> Result<Self, DbError> {
        let user = handle.declare(user_table())?;
        let pref = handle.declare(user_pref_table())?;

        handle.create_all()?;

        let user_df = load::<UserRow>(handle, &user, row_limit)?;
        let pref_df = load::<UserPrefRow>(handle, &pref, row_limit)?;
        info!(
            "loaded {} user(s) and {} preference(s)",
            user_df.len(),
            pref_df.len()
        );

        Ok(UserTables {
            handle,
            user,
            pref,
            user_df,
            pref_df,
        })
    }

    pub fn handle(&self) -> &'h ConnectionHandle {
        self.handle
    }

    /// Declaration of the `user` table
    pub fn user_table(&self) -> &TableSchema {
        &self.user
    }

    /// Declaration of the `user_pref` table
    pub fn pref_table(&self) -> &TableSchema {
        &self.pref
    }

    /// Snapshot of the `user` table
    pub fn user_df(&self) -> &LoadedTable<UserRow> {
        &self.user_df
    }

    /// Snapshot of the `user_pref` table
    pub fn pref_df(&self) -> &LoadedTable<UserPrefRow> {
        &self.pref_df
    }

    /// Users joined with their preferences, recomputed on every call
    pub fn df(&self) -> LoadedTable<JoinedRow> {
        inner_join(&self.user_df, &self.pref_df)
    }
}

fn load<R: TableRow>(
    handle: &ConnectionHandle,
    schema: &TableSchema,
    row_limit: usize,
) -> Result<LoadedTable<R>, DbError> {
    // SQL LIMIT is a signed 64-bit value; anything at or above that reads every row
    let fetch_limit = if row_limit < i64::MAX as usize {
        Some(row_limit + 1)
    } else {
        None
    };
    let rows = handle.fetch_all(schema, fetch_limit)?;
    if rows.len() > row_limit {
        return Err(DbError::storage(
            format!("loading table '{}'", schema.name),
            format!("table holds more than {} rows", row_limit),
        ));
    }
    LoadedTable::from_values(schema, rows)
}

/// Inner join of users and preferences on `user_id`
///
/// Rows follow the user order; each user is repeated once per matching
/// preference, in preference order. Unmatched rows on either side are dropped.
pub fn inner_join(
    users: &LoadedTable<UserRow>,
    prefs: &LoadedTable<UserPrefRow>,
) -> LoadedTable<JoinedRow> {
    let mut by_user: HashMap<i64, Vec<&UserPrefRow>> = HashMap::new();
    for pref in prefs {
        by_user.entry(pref.user_id).or_default().push(pref);
    }

    let rows = users
        .iter()
        .flat_map(|user| {
            by_user
                .get(&user.user_id)
                .into_iter()
                .flatten()
                .map(move |pref| JoinedRow::new(user, pref))
        })
        .collect();

    let mut columns = users.columns().to_vec();
    columns.extend(
        prefs
            .columns()
            .iter()
            .filter(|c| c.as_str() != "user_id")
            .cloned(),
    );

    LoadedTable::new(
        &format!("{}_{}", users.name(), prefs.name()),
        columns,
        rows,
    )
}
