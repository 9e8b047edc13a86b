//! Whole-database descriptions built from the individual queries.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::schema::Schema;
use crate::types::{Column, ForeignKey, Index};

/// A table with everything known about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    pub name: String,
    pub columns: Vec<Column>,
    pub foreign_keys: Vec<ForeignKey>,
    pub indexes: Vec<Index>,
}

/// A view and the columns it produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewInfo {
    pub name: String,
    pub columns: Vec<Column>,
}

/// Structure of one database at the time it was read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    /// Name of the database described, `main` for the unscoped selector.
    pub schema: String,
    pub tables: Vec<TableInfo>,
    pub views: Vec<ViewInfo>,
    pub triggers: Vec<String>,
}

impl Schema {
    /// Describes every table, view and trigger in this schema.
    ///
    /// The unscoped selector describes `main`, so a temp table that shadows a
    /// main table of the same name cannot leak into the result. Tables,
    /// views and triggers are sorted by name.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlite_meta::Schema;
    /// use rusqlite::Connection;
    ///
    /// let conn = Connection::open_in_memory().unwrap();
    /// conn.execute_batch(
    ///     "CREATE TABLE parent (id INTEGER PRIMARY KEY);
    ///      CREATE TABLE child (pid REFERENCES parent(id));",
    /// )
    /// .unwrap();
    ///
    /// let snapshot = Schema::default().snapshot(&conn).unwrap();
    /// assert_eq!(snapshot.tables.len(), 2);
    /// assert_eq!(snapshot.tables[0].name, "child");
    /// assert_eq!(snapshot.tables[0].foreign_keys[0].parent_table, "parent");
    /// ```
    pub fn snapshot(&self, conn: &Connection) -> Result<SchemaSnapshot> {
        let scope = if self.is_unscoped() {
            Schema::MAIN
        } else {
            self.clone()
        };
        tracing::debug!(schema = ?scope.name(), "building schema snapshot");

        let mut tables = Vec::new();
        for name in scope.table_names(conn)? {
            tables.push(TableInfo {
                columns: scope.columns(conn, &name)?,
                foreign_keys: scope.foreign_keys(conn, &name)?,
                indexes: scope.indexes(conn, &name)?,
                name,
            });
        }

        let mut views = Vec::new();
        for name in scope.view_names(conn)? {
            views.push(ViewInfo {
                columns: scope.columns(conn, &name)?,
                name,
            });
        }

        Ok(SchemaSnapshot {
            schema: scope.name().unwrap_or("main").to_string(),
            tables,
            views,
            triggers: scope.trigger_names(conn)?,
        })
    }
}
