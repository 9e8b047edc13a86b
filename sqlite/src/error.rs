//! Error types for metadata queries.
//!
//! [`MetaError`] covers failures of a whole operation and always names what
//! was being fetched. [`DecodeError`] covers a single value that could not be
//! turned into one of the metadata enums.

use thiserror::Error;

/// Errors returned by metadata operations.
#[derive(Debug, Error)]
pub enum MetaError {
    /// The query itself failed, or one of its rows could not be decoded.
    #[error("could not get {operation}: {source}")]
    Query {
        /// What was being fetched, e.g. `columns for table users`.
        operation: String,
        #[source]
        source: rusqlite::Error,
    },

    /// A named schema does not match any attached database.
    ///
    /// The wording follows SQLite's own message for the same condition.
    #[error("could not get {operation}: unknown database '{name}'")]
    UnknownDatabase {
        /// What was being fetched, e.g. `table names`.
        operation: String,
        /// The schema name exactly as the caller supplied it.
        name: String,
    },
}

impl MetaError {
    /// Returns `true` if the error was caused by an unknown schema name.
    pub fn is_unknown_database(&self) -> bool {
        matches!(self, Self::UnknownDatabase { .. })
    }

    /// Describes the operation that failed.
    pub fn operation(&self) -> &str {
        match self {
            Self::Query { operation, .. } | Self::UnknownDatabase { operation, .. } => operation,
        }
    }
}

/// A value that could not be decoded into a metadata enum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The value was neither text nor a blob.
    #[error("invalid {target}: {type_name} {value}")]
    InvalidType {
        /// Name of the enum being decoded.
        target: &'static str,
        /// SQLite storage class of the offending value.
        type_name: String,
        /// The offending value, rendered for display.
        value: String,
    },

    /// The value was text but not one of the recognized literals.
    #[error("unsupported {target}: {literal:?}")]
    Unsupported {
        /// Name of the enum being decoded.
        target: &'static str,
        /// The unrecognized literal.
        literal: String,
    },
}

/// Convenience alias for results with [`MetaError`].
pub type Result<T> = std::result::Result<T, MetaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_database_message_matches_sqlite_wording() {
        let err = MetaError::UnknownDatabase {
            operation: "table names".to_string(),
            name: "aux".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "could not get table names: unknown database 'aux'"
        );
        assert!(err.is_unknown_database());
        assert_eq!(err.operation(), "table names");
    }

    #[test]
    fn test_query_error_is_not_unknown_database() {
        let err = MetaError::Query {
            operation: "columns for table a".to_string(),
            source: rusqlite::Error::InvalidQuery,
        };
        assert!(!err.is_unknown_database());
        assert!(err.to_string().starts_with("could not get columns for table a: "));
    }

    #[test]
    fn test_decode_error_messages() {
        let invalid = DecodeError::InvalidType {
            target: "IndexType",
            type_name: "Integer".to_string(),
            value: "42".to_string(),
        };
        assert_eq!(invalid.to_string(), "invalid IndexType: Integer 42");

        let unsupported = DecodeError::Unsupported {
            target: "ForeignKeyAction",
            literal: "bogus".to_string(),
        };
        assert_eq!(
            unsupported.to_string(),
            "unsupported ForeignKeyAction: \"bogus\""
        );
    }
}
