//! Metadata record types.
//!
//! Every value here is a read-only snapshot built fresh by a query. None of
//! them keep a reference to the connection they were read from, and all of
//! them serialize with [`serde`] so callers can emit them as JSON or YAML.

use std::fmt;

use serde::{Deserialize, Serialize};

/// [`IndexColumn::table_rank`] of the table's implicit rowid.
pub const TABLE_RANK_ROWID: i64 = -1;

/// [`IndexColumn::table_rank`] of an expression such as `a+b`.
pub const TABLE_RANK_EXPR: i64 = -2;

/// Kind of object recorded in the `sqlite_master` catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Table,
    View,
    Trigger,
    Index,
}

impl ObjectKind {
    /// The value of the catalog's `type` column for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::View => "view",
            Self::Trigger => "trigger",
            Self::Index => "index",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A column of a table or view.
///
/// # Examples
///
/// ```
/// use sqlite_meta::Column;
/// use rusqlite::Connection;
///
/// let conn = Connection::open_in_memory().unwrap();
/// conn.execute_batch("CREATE TABLE a (x TEXT NOT NULL DEFAULT 'hi')").unwrap();
///
/// let columns = sqlite_meta::columns(&conn, "a").unwrap();
/// assert_eq!(columns[0].name, "x");
/// assert_eq!(columns[0].default.as_deref(), Some("'hi'"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Column {
    /// Zero-based position in declaration order.
    pub id: u32,
    pub name: String,
    /// Declared type. Empty for typeless columns and many view columns.
    pub type_name: String,
    pub not_null: bool,
    /// Default expression exactly as declared, `None` if there is none.
    pub default: Option<String>,
    /// 0 if the column is not part of the primary key, otherwise its
    /// 1-based position within the key.
    pub primary_key: u32,
}

/// What happens to child rows when the parent key is updated or deleted.
///
/// See <https://sqlite.org/foreignkeys.html> for the semantics of each
/// action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForeignKeyAction {
    /// No special action. This is SQLite's default.
    #[default]
    None,
    /// Parent keys may not be changed or deleted while referenced.
    Restrict,
    /// Child key columns are set to NULL.
    SetNull,
    /// Child key columns are set to their default values.
    SetDefault,
    /// Updates propagate to child keys; deletes remove child rows.
    Cascade,
}

/// A foreign key constraint.
///
/// `child_key` and `parent_key` always have the same length; entries at the
/// same index form one column pair, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Identifier of the constraint, unique within its table only.
    pub id: i64,
    pub child_table: String,
    pub child_key: Vec<String>,
    pub parent_table: String,
    /// `None` where the REFERENCES clause did not name the parent column.
    pub parent_key: Vec<Option<String>>,
    pub on_update: ForeignKeyAction,
    pub on_delete: ForeignKeyAction,
}

/// How an index came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexType {
    /// Created with `CREATE INDEX`.
    #[default]
    User,
    /// Created by SQLite to enforce a UNIQUE constraint.
    Unique,
    /// Created by SQLite to enforce a PRIMARY KEY clause.
    PrimaryKey,
}

/// An index on a table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Index {
    pub name: String,
    pub index_type: IndexType,
    pub is_unique: bool,
    /// The index has a WHERE clause.
    pub is_partial: bool,
    /// Indexed columns in key order, `None` for expressions such as `a+b`.
    pub column_names: Vec<Option<String>>,
}

/// A column entry of an index as reported by `pragma_index_xinfo`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IndexColumn {
    /// `None` for expressions and for the rowid.
    pub name: Option<String>,
    /// Zero-based position within the index, auxiliary columns included.
    pub rank: u32,
    /// Position of the column in its table, or [`TABLE_RANK_ROWID`] /
    /// [`TABLE_RANK_EXPR`].
    pub table_rank: i64,
    pub descending: bool,
    pub collation: String,
    /// `false` for auxiliary columns SQLite appends to make the index
    /// covering.
    pub is_key: bool,
}

impl IndexColumn {
    /// The entry is the table's implicit rowid.
    pub fn is_rowid(&self) -> bool {
        self.table_rank == TABLE_RANK_ROWID
    }

    /// The entry is an expression rather than a table column.
    pub fn is_expression(&self) -> bool {
        self.table_rank == TABLE_RANK_EXPR
    }
}
