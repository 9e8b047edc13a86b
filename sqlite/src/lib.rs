//! Structural metadata for SQLite databases.
//!
//! This crate reads tables, views, triggers, indexes, columns and foreign
//! keys through SQLite's own introspection surface (the `pragma_*`
//! table-valued functions and the `sqlite_master` catalog) and returns them
//! as typed records. Nothing is cached and nothing is modified: every call
//! queries the connection and builds fresh values.
//!
//! # Architecture
//!
//! - **`schema`**: the [`Schema`] selector and verification of schema names
//! - **`query`**: the metadata queries, as [`Schema`] methods and free
//!   functions
//! - **`group`**: folding of flat pragma rows into grouped records
//! - **`convert`**: decoding of [`ForeignKeyAction`] and [`IndexType`]
//! - **`snapshot`**: whole-database descriptions
//!
//! # Quick start
//!
//! ```
//! use rusqlite::Connection;
//!
//! let conn = Connection::open_in_memory().unwrap();
//! conn.execute_batch(
//!     "CREATE TABLE users (id INTEGER PRIMARY KEY, email TEXT NOT NULL UNIQUE);
//!      CREATE INDEX idx_users_email_lower ON users(lower(email));",
//! )
//! .unwrap();
//!
//! for table in sqlite_meta::table_names(&conn).unwrap() {
//!     for index in sqlite_meta::indexes(&conn, &table).unwrap() {
//!         println!("{table}: {} {:?}", index.name, index.column_names);
//!     }
//! }
//! ```
//!
//! # Multiple databases
//!
//! A connection can see several databases. The free functions operate on
//! the unscoped selector: name listings read the main database, and lookups
//! by table or index name search `temp`, then `main`, then attached
//! databases in order of attachment. Use a [`Schema`] to restrict an
//! operation to one database:
//!
//! ```
//! use sqlite_meta::Schema;
//! use rusqlite::Connection;
//!
//! let conn = Connection::open_in_memory().unwrap();
//! conn.execute_batch(
//!     "CREATE TABLE t (a);
//!      CREATE TEMP TABLE t (b);",
//! )
//! .unwrap();
//!
//! assert_eq!(sqlite_meta::columns(&conn, "t").unwrap()[0].name, "b");
//! assert_eq!(Schema::MAIN.columns(&conn, "t").unwrap()[0].name, "a");
//! ```
//!
//! See <https://sqlite.org/lang_naming.html> for SQLite's lookup rules.

mod convert;
mod error;
mod group;
mod query;
mod schema;
mod snapshot;
mod types;

pub use error::{DecodeError, MetaError, Result};
pub use query::{
    columns, foreign_keys, index_columns, index_columns_aux, index_names, indexes,
    schema_names, table_names, trigger_names, view_names,
};
pub use schema::Schema;
pub use snapshot::{SchemaSnapshot, TableInfo, ViewInfo};
pub use types::{
    Column, ForeignKey, ForeignKeyAction, Index, IndexColumn, IndexType, ObjectKind,
    TABLE_RANK_EXPR, TABLE_RANK_ROWID,
};
