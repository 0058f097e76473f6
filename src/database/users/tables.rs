//! User table declarations and row types

use serde::Serialize;

use crate::database::core::{
    ColumnDef, ColumnType, Record, TableRow, TableSchema, Value, ValueReader,
};

pub const USER_TABLE: &str = "user";
pub const USER_PREF_TABLE: &str = "user_pref";

/// Declaration of the `user` table
pub fn user_table() -> TableSchema {
    TableSchema::new(
        USER_TABLE,
        vec![
            ColumnDef::new("user_id", ColumnType::Integer).primary_key(),
            ColumnDef::new("user_name", ColumnType::String(16)).not_null(),
            ColumnDef::new("email_address", ColumnType::String(60)).key("email"),
            ColumnDef::new("password", ColumnType::String(20)).not_null(),
        ],
    )
}

/// Declaration of the `user_pref` table; depends on `user`
pub fn user_pref_table() -> TableSchema {
    TableSchema::new(
        USER_PREF_TABLE,
        vec![
            ColumnDef::new("pref_id", ColumnType::Integer).primary_key(),
            ColumnDef::new("user_id", ColumnType::Integer)
                .not_null()
                .references(USER_TABLE, "user_id"),
            ColumnDef::new("pref_name", ColumnType::String(40)).not_null(),
            ColumnDef::new("pref_value", ColumnType::String(100)),
        ],
    )
}

/// A row of the `user` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRow {
    pub user_id: i64,
    pub user_name: String,
    pub email: Option<String>,
    pub password: String,
}

/// A row of the `user_pref` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserPrefRow {
    pub pref_id: i64,
    pub user_id: i64,
    pub pref_name: String,
    pub pref_value: Option<String>,
}

/// A user paired with one of their preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinedRow {
    pub user_id: i64,
    pub user_name: String,
    pub email: Option<String>,
    pub password: String,
    pub pref_id: i64,
    pub pref_name: String,
    pub pref_value: Option<String>,
}

impl JoinedRow {
    pub fn new(user: &UserRow, pref: &UserPrefRow) -> Self {
        JoinedRow {
            user_id: user.user_id,
            user_name: user.user_name.clone(),
            email: user.email.clone(),
            password: user.password.clone(),
            pref_id: pref.pref_id,
            pref_name: pref.pref_name.clone(),
            pref_value: pref.pref_value.clone(),
        }
    }
}

impl Record for UserRow {
    fn cells(&self) -> Vec<String> {
        vec![
            self.user_id.to_string(),
            self.user_name.clone(),
            self.email.clone().unwrap_or_default(),
            self.password.clone(),
        ]
    }
}

impl TableRow for UserRow {
    fn from_values(values: Vec<Value>) -> Result<Self, String> {
        let mut reader = ValueReader::new(values);
        let row = UserRow {
            user_id: reader.integer("user_id")?,
            user_name: reader.text("user_name")?,
            email: reader.opt_text("email")?,
            password: reader.text("password")?,
        };
        reader.finish()?;
        Ok(row)
    }
}

impl Record for UserPrefRow {
    fn cells(&self) -> Vec<String> {
        vec![
            self.pref_id.to_string(),
            self.user_id.to_string(),
            self.pref_name.clone(),
            self.pref_value.clone().unwrap_or_default(),
        ]
    }
}

impl TableRow for UserPrefRow {
    fn from_values(values: Vec<Value>) -> Result<Self, String> {
        let mut reader = ValueReader::new(values);
        let row = UserPrefRow {
            pref_id: reader.integer("pref_id")?,
            user_id: reader.integer("user_id")?,
            pref_name: reader.text("pref_name")?,
            pref_value: reader.opt_text("pref_value")?,
        };
        reader.finish()?;
        Ok(row)
    }
}

impl Record for JoinedRow {
    fn cells(&self) -> Vec<String> {
        vec![
            self.user_id.to_string(),
            self.user_name.clone(),
            self.email.clone().unwrap_or_default(),
            self.password.clone(),
            self.pref_id.to_string(),
            self.pref_name.clone(),
            self.pref_value.clone().unwrap_or_default(),
        ]
    }
}
