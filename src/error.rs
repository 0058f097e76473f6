//! Error types for the userstore library
//!
//! The library surface returns [`DbError`], one variant per stage that can fail:
//! configuration checks happen before any I/O, connection errors cover opening the
//! backend, schema errors come from the metadata registry, and storage errors cover
//! everything that talks to an already opened backend.

use thiserror::Error;

/// Boxed error coming from a backend driver
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for userstore operations
#[derive(Error, Debug)]
pub enum DbError {
    /// Missing or invalid configuration field, detected before connecting
    #[error("configuration error: {reason}")]
    Configuration { reason: String },

    /// Network, authentication or file failure while opening a connection
    #[error("failed to connect to {target}: {source}")]
    Connection {
        target: String,
        #[source]
        source: BoxError,
    },

    /// Invalid table declaration against the metadata registry
    #[error("schema error: {reason}")]
    Schema { reason: String },

    /// DDL or query failure on an open connection
    #[error("storage error while {context}: {source}")]
    Storage {
        context: String,
        #[source]
        source: BoxError,
    },
}

impl DbError {
    pub fn configuration(reason: impl Into<String>) -> Self {
        DbError::Configuration {
            reason: reason.into(),
        }
    }

    pub fn connection(target: impl Into<String>, source: impl Into<BoxError>) -> Self {
        DbError::Connection {
            target: target.into(),
            source: source.into(),
        }
    }

    pub fn schema(reason: impl Into<String>) -> Self {
        DbError::Schema {
            reason: reason.into(),
        }
    }

    pub fn storage(context: impl Into<String>, source: impl Into<BoxError>) -> Self {
        DbError::Storage {
            context: context.into(),
            source: source.into(),
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, DbError::Configuration { .. })
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, DbError::Connection { .. })
    }

    pub fn is_schema(&self) -> bool {
        matches!(self, DbError::Schema { .. })
    }

    pub fn is_storage(&self) -> bool {
        matches!(self, DbError::Storage { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_message_includes_context() {
        let err = DbError::storage("loading table 'user'", "no such table: user");
        assert!(err.is_storage());
        assert_eq!(
            err.to_string(),
            "storage error while loading table 'user': no such table: user"
        );
    }

    #[test]
    fn test_connection_source_is_kept() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = DbError::connection("postgresql://app:***@db:5432/app", io);
        assert!(err.is_connection());
        assert!(std::error::Error::source(&err).is_some());
    }
}
