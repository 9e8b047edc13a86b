//! Schema selection and verification.
//!
//! A single connection can see several databases: `main`, `temp` and any
//! number of attached ones. A [`Schema`] selects one of them by name, or none
//! at all, in which case SQLite searches `temp`, then `main`, then the
//! attached databases in order of attachment.
//!
//! # Identifier splicing
//!
//! The pragma table-valued functions take the schema name as an ordinary
//! bound argument. The catalog table (`<schema>.sqlite_master`) does not: its
//! schema has to be written into the SQL text. [`Schema::catalog_table`] is
//! the only place that does this, and it first checks that an attached
//! database with that name exists.

use std::borrow::Cow;

use rusqlite::{Connection, params};

use crate::error::{MetaError, Result};

const MASTER_TABLE: &str = "sqlite_master";
const TEMP_MASTER_TABLE: &str = "sqlite_temp_master";

/// Selects the database that metadata operations look at.
///
/// The default value is unscoped. Constructing a `Schema` never touches the
/// connection; names are verified when an operation needs them.
///
/// # Examples
///
/// ```
/// use sqlite_meta::Schema;
/// use rusqlite::Connection;
///
/// let conn = Connection::open_in_memory().unwrap();
/// conn.execute_batch("ATTACH DATABASE ':memory:' AS aux; CREATE TABLE aux.t (x);").unwrap();
///
/// assert_eq!(Schema::new("aux").table_names(&conn).unwrap(), vec!["t"]);
/// assert!(Schema::MAIN.table_names(&conn).unwrap().is_empty());
/// assert!(Schema::new("nope").table_names(&conn).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Schema {
    name: Cow<'static, str>,
}

impl Schema {
    /// The database the connection was opened on.
    pub const MAIN: Schema = Schema {
        name: Cow::Borrowed("main"),
    };

    /// The database holding temporary tables, indexes and triggers.
    pub const TEMP: Schema = Schema {
        name: Cow::Borrowed("temp"),
    };

    /// Selects the database with the given name. An empty name is unscoped.
    ///
    /// The name is not checked until an operation is run.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Cow::Owned(name.into()),
        }
    }

    /// The selected database name, or `None` when unscoped.
    pub fn name(&self) -> Option<&str> {
        if self.name.is_empty() {
            None
        } else {
            Some(&self.name)
        }
    }

    /// Returns `true` if no particular database is selected.
    pub fn is_unscoped(&self) -> bool {
        self.name.is_empty()
    }

    /// Returns `true` for the temp database, which never needs verification.
    pub fn is_temp(&self) -> bool {
        self.name.eq_ignore_ascii_case("temp")
    }

    /// Fails with [`MetaError::UnknownDatabase`] unless an attached database
    /// matches this schema's name.
    ///
    /// Names are compared the way SQLite's `LOWER` compares them: only ASCII
    /// letters are folded.
    pub(crate) fn verify(&self, conn: &Connection, operation: &str) -> Result<()> {
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM pragma_database_list WHERE LOWER(name) = ?1",
                params![sqlite_lower(&self.name)],
                |row| row.get(0),
            )
            .map_err(|source| MetaError::Query {
                operation: operation.to_string(),
                source,
            })?;

        if count < 1 {
            tracing::debug!(schema = %self.name, "schema not attached");
            return Err(MetaError::UnknownDatabase {
                operation: operation.to_string(),
                name: self.name.to_string(),
            });
        }

        Ok(())
    }

    /// Resolves the schema argument for a pragma table-valued function.
    ///
    /// Returns `None` when unscoped. Named schemas other than `temp` are
    /// verified first so an unknown name is reported the same way for every
    /// operation.
    pub(crate) fn pragma_argument(&self, conn: &Connection, operation: &str) -> Result<Option<&str>> {
        match self.name() {
            None => Ok(None),
            Some(name) if self.is_temp() => Ok(Some(name)),
            Some(name) => {
                self.verify(conn, operation)?;
                Ok(Some(name))
            }
        }
    }

    /// Returns the name of the catalog table for this schema, suitable for
    /// splicing into a `FROM` clause.
    pub(crate) fn catalog_table(&self, conn: &Connection, operation: &str) -> Result<String> {
        match self.name() {
            None => Ok(MASTER_TABLE.to_string()),
            Some(_) if self.is_temp() => Ok(TEMP_MASTER_TABLE.to_string()),
            Some(name) => {
                // The name is written into the SQL text below; it must refer
                // to an attached database before that happens.
                self.verify(conn, operation)?;
                Ok(format!("{}.{MASTER_TABLE}", quote_identifier(name)))
            }
        }
    }
}

/// Lowercases ASCII letters only, like SQLite's built-in `LOWER`.
pub(crate) fn sqlite_lower(s: &str) -> String {
    s.to_ascii_lowercase()
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attached() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("ATTACH DATABASE ':memory:' AS \"Aux\"").unwrap();
        conn
    }

    #[test]
    fn test_sqlite_lower_folds_ascii_only() {
        assert_eq!(sqlite_lower("MAIN"), "main");
        assert_eq!(sqlite_lower("ÄBC"), "Äbc");
        assert_eq!(sqlite_lower("ΣΑΣ"), "ΣΑΣ");
    }

    #[test]
    fn test_default_is_unscoped() {
        let schema = Schema::default();
        assert!(schema.is_unscoped());
        assert_eq!(schema.name(), None);
        assert_eq!(Schema::new(""), schema);
    }

    #[test]
    fn test_temp_matches_case_insensitively() {
        assert!(Schema::TEMP.is_temp());
        assert!(Schema::new("TeMp").is_temp());
        assert!(!Schema::MAIN.is_temp());
        assert!(!Schema::new("temporary").is_temp());
    }

    #[test]
    fn test_verify_is_case_insensitive() {
        let conn = attached();
        assert!(Schema::new("aux").verify(&conn, "test").is_ok());
        assert!(Schema::new("AUX").verify(&conn, "test").is_ok());
        assert!(Schema::MAIN.verify(&conn, "test").is_ok());
    }

    #[test]
    fn test_verify_rejects_unknown_name() {
        let conn = attached();
        let err = Schema::new("missing").verify(&conn, "table names").unwrap_err();
        assert!(err.is_unknown_database());
        assert_eq!(
            err.to_string(),
            "could not get table names: unknown database 'missing'"
        );
    }

    #[test]
    fn test_catalog_table_resolution() {
        let conn = attached();
        assert_eq!(
            Schema::default().catalog_table(&conn, "t").unwrap(),
            "sqlite_master"
        );
        assert_eq!(
            Schema::new("TEMP").catalog_table(&conn, "t").unwrap(),
            "sqlite_temp_master"
        );
        assert_eq!(
            Schema::new("aux").catalog_table(&conn, "t").unwrap(),
            "\"aux\".sqlite_master"
        );
        assert!(
            Schema::new("x; DROP TABLE y")
                .catalog_table(&conn, "t")
                .unwrap_err()
                .is_unknown_database()
        );
    }

    #[test]
    fn test_pragma_argument() {
        let conn = attached();
        assert_eq!(Schema::default().pragma_argument(&conn, "t").unwrap(), None);
        assert_eq!(
            Schema::TEMP.pragma_argument(&conn, "t").unwrap(),
            Some("temp")
        );
        assert_eq!(
            Schema::new("aux").pragma_argument(&conn, "t").unwrap(),
            Some("aux")
        );
        assert!(Schema::new("zzz").pragma_argument(&conn, "t").is_err());
    }

    #[test]
    fn test_quote_identifier_doubles_quotes() {
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
    }
}
