//! Metadata queries.
//!
//! Every operation is a method on [`Schema`] and is also available as a free
//! function that uses the unscoped selector. Object names and schema names
//! are passed as bound parameters; only the catalog table name used by the
//! name listings is spliced into the SQL text (see [`crate::schema`]).
//!
//! Looking up a table or index that does not exist is not an error: the
//! pragmas simply return no rows, and so do these functions.

use std::borrow::Cow;

use rusqlite::{Connection, Params, Row, params_from_iter};

use crate::error::{MetaError, Result};
use crate::group::fold_contiguous;
use crate::schema::Schema;
use crate::types::{
    Column, ForeignKey, ForeignKeyAction, Index, IndexColumn, IndexType, ObjectKind,
};

/// Runs `sql` and decodes every row with `map`.
fn query_rows<T, P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
    operation: &str,
    map: impl FnMut(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Vec<T>> {
    let wrap = |source: rusqlite::Error| MetaError::Query {
        operation: operation.to_string(),
        source,
    };

    let mut stmt = conn.prepare(sql).map_err(wrap)?;
    stmt.query_map(params, map)
        .map_err(wrap)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(wrap)
}

/// Arguments of a pragma function taking an object name and an optional
/// schema, bound as `?1` and `?2`.
#[derive(Clone, Copy)]
struct PragmaArgs<'a> {
    object_name: &'a str,
    schema: Option<&'a str>,
}

impl<'a> PragmaArgs<'a> {
    fn new(
        schema: &'a Schema,
        conn: &Connection,
        object_name: &'a str,
        operation: &str,
    ) -> Result<Self> {
        Ok(Self {
            object_name,
            schema: schema.pragma_argument(conn, operation)?,
        })
    }

    fn placeholders(&self) -> &'static str {
        match self.schema {
            Some(_) => "?1, ?2",
            None => "?1",
        }
    }

    fn params(self) -> impl Params {
        params_from_iter(std::iter::once(self.object_name).chain(self.schema))
    }
}

/// Finds the database an unqualified table name resolves to: `temp` first,
/// then `main`, then attached databases in order of attachment.
fn table_schema(conn: &Connection, table_name: &str, operation: &str) -> Result<Option<String>> {
    let schemas = query_rows(
        conn,
        r#"SELECT t.schema
           FROM pragma_table_list(?1) t
           INNER JOIN pragma_database_list d ON d.name = t.schema
           ORDER BY d.name = 'temp' DESC, d.seq
           LIMIT 1"#,
        [table_name],
        operation,
        |row| row.get(0),
    )?;
    Ok(schemas.into_iter().next())
}

/// Returns the names of all databases attached to the connection, sorted
/// alphabetically.
pub fn schema_names(conn: &Connection) -> Result<Vec<String>> {
    tracing::debug!("querying schema names");
    query_rows(
        conn,
        "SELECT name FROM pragma_database_list ORDER BY name",
        (),
        "schema names",
        |row| row.get(0),
    )
}

/// Returns the names of the tables in the main database, sorted
/// alphabetically.
pub fn table_names(conn: &Connection) -> Result<Vec<String>> {
    Schema::default().table_names(conn)
}

/// Returns the names of the views in the main database, sorted
/// alphabetically.
pub fn view_names(conn: &Connection) -> Result<Vec<String>> {
    Schema::default().view_names(conn)
}

/// Returns the names of the triggers in the main database, sorted
/// alphabetically.
pub fn trigger_names(conn: &Connection) -> Result<Vec<String>> {
    Schema::default().trigger_names(conn)
}

/// Returns the names of the indexes in the main database, sorted
/// alphabetically.
pub fn index_names(conn: &Connection) -> Result<Vec<String>> {
    Schema::default().index_names(conn)
}

/// Returns the columns of a table or view, searching all databases.
pub fn columns(conn: &Connection, table_name: &str) -> Result<Vec<Column>> {
    Schema::default().columns(conn, table_name)
}

/// Returns the foreign keys of a table, searching all databases.
pub fn foreign_keys(conn: &Connection, table_name: &str) -> Result<Vec<ForeignKey>> {
    Schema::default().foreign_keys(conn, table_name)
}

/// Returns the indexes of a table, searching all databases.
pub fn indexes(conn: &Connection, table_name: &str) -> Result<Vec<Index>> {
    Schema::default().indexes(conn, table_name)
}

/// Returns the key columns of an index, searching all databases.
pub fn index_columns(conn: &Connection, index_name: &str) -> Result<Vec<IndexColumn>> {
    Schema::default().index_columns(conn, index_name)
}

/// Returns the key and auxiliary columns of an index, searching all
/// databases.
pub fn index_columns_aux(conn: &Connection, index_name: &str) -> Result<Vec<IndexColumn>> {
    Schema::default().index_columns_aux(conn, index_name)
}

impl Schema {
    /// Returns the names of the tables in this schema, sorted alphabetically.
    ///
    /// The unscoped selector lists the main database.
    pub fn table_names(&self, conn: &Connection) -> Result<Vec<String>> {
        self.object_names(conn, ObjectKind::Table)
    }

    /// Returns the names of the views in this schema, sorted alphabetically.
    pub fn view_names(&self, conn: &Connection) -> Result<Vec<String>> {
        self.object_names(conn, ObjectKind::View)
    }

    /// Returns the names of the triggers in this schema, sorted
    /// alphabetically.
    pub fn trigger_names(&self, conn: &Connection) -> Result<Vec<String>> {
        self.object_names(conn, ObjectKind::Trigger)
    }

    /// Returns the names of the indexes in this schema, sorted
    /// alphabetically. Indexes SQLite created for UNIQUE and PRIMARY KEY
    /// constraints are included.
    pub fn index_names(&self, conn: &Connection) -> Result<Vec<String>> {
        self.object_names(conn, ObjectKind::Index)
    }

    /// Returns the names of all objects of one kind, sorted alphabetically.
    ///
    /// # Errors
    ///
    /// [`MetaError::UnknownDatabase`] if this schema names a database that
    /// is not attached.
    pub fn object_names(&self, conn: &Connection, kind: ObjectKind) -> Result<Vec<String>> {
        let operation = format!("{kind} names");
        let table = self.catalog_table(conn, &operation)?;
        tracing::debug!(schema = ?self.name(), %kind, %table, "querying object names");

        let sql = format!("SELECT name FROM {table} WHERE type = ?1 ORDER BY name");
        query_rows(conn, &sql, [kind.as_str()], &operation, |row| row.get(0))
    }

    /// Returns the columns of a table or view in declaration order.
    ///
    /// Primary key columns of `WITHOUT ROWID` tables are reported as
    /// `NOT NULL` because SQLite enforces that, declared or not. An unknown
    /// table yields an empty vector.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlite_meta::Schema;
    /// use rusqlite::Connection;
    ///
    /// let conn = Connection::open_in_memory().unwrap();
    /// conn.execute_batch("CREATE TABLE a (x, y, PRIMARY KEY (y)) WITHOUT ROWID").unwrap();
    ///
    /// let columns = Schema::MAIN.columns(&conn, "a").unwrap();
    /// assert!(!columns[0].not_null);
    /// assert!(columns[1].not_null);
    /// assert_eq!(columns[1].primary_key, 1);
    /// ```
    pub fn columns(&self, conn: &Connection, table_name: &str) -> Result<Vec<Column>> {
        let operation = format!("columns for table {table_name}");
        let args = PragmaArgs::new(self, conn, table_name, &operation)?;
        tracing::debug!(schema = ?self.name(), table = table_name, "querying columns");

        let sql = format!(
            r#"SELECT cid, name, type, "notnull", dflt_value, pk
               FROM pragma_table_info({})
               ORDER BY cid"#,
            args.placeholders()
        );

        let columns = query_rows(conn, &sql, args.params(), &operation, |row| {
            Ok(Column {
                id: row.get(0)?,
                name: row.get(1)?,
                type_name: row.get(2)?,
                not_null: row.get(3)?,
                default: row.get(4)?,
                primary_key: row.get(5)?,
            })
        })?;

        tracing::trace!(table = table_name, count = columns.len(), "columns loaded");
        Ok(columns)
    }

    /// Returns the foreign keys of a table.
    ///
    /// Each key's column pairs keep their declaration order. The order of
    /// the keys themselves is SQLite's id order, which is not guaranteed to
    /// match declaration order. An unknown table yields an empty vector.
    pub fn foreign_keys(&self, conn: &Connection, table_name: &str) -> Result<Vec<ForeignKey>> {
        struct FkRow {
            id: i64,
            parent_table: String,
            from: String,
            to: Option<String>,
            on_update: ForeignKeyAction,
            on_delete: ForeignKeyAction,
        }

        let operation = format!("foreign keys for table {table_name}");
        let args = PragmaArgs::new(self, conn, table_name, &operation)?;
        tracing::debug!(schema = ?self.name(), table = table_name, "querying foreign keys");

        let sql = format!(
            r#"SELECT id, "table", "from", "to", on_update, on_delete
               FROM pragma_foreign_key_list({})
               ORDER BY id, seq"#,
            args.placeholders()
        );

        let rows = query_rows(conn, &sql, args.params(), &operation, |row| {
            Ok(FkRow {
                id: row.get(0)?,
                parent_table: row.get(1)?,
                from: row.get(2)?,
                to: row.get(3)?,
                on_update: row.get(4)?,
                on_delete: row.get(5)?,
            })
        })?;

        let foreign_keys = fold_contiguous(
            rows,
            |fk: &ForeignKey, row| fk.id == row.id,
            |row| ForeignKey {
                id: row.id,
                child_table: table_name.to_string(),
                child_key: Vec::new(),
                parent_table: row.parent_table.clone(),
                parent_key: Vec::new(),
                on_update: row.on_update,
                on_delete: row.on_delete,
            },
            |fk, row| {
                fk.child_key.push(row.from);
                fk.parent_key.push(row.to);
            },
        );

        tracing::trace!(table = table_name, count = foreign_keys.len(), "foreign keys loaded");
        Ok(foreign_keys)
    }

    /// Returns the indexes of a table, including the ones SQLite created for
    /// UNIQUE and PRIMARY KEY constraints.
    ///
    /// An unknown table yields an empty vector.
    pub fn indexes(&self, conn: &Connection, table_name: &str) -> Result<Vec<Index>> {
        struct IndexRow {
            name: String,
            index_type: IndexType,
            is_unique: bool,
            is_partial: bool,
            column_name: Option<String>,
        }

        let operation = format!("indexes for table {table_name}");
        // Index names are only unique per database, so pragma_index_info must
        // be pinned to the database that owns the table.
        let owner = match self.pragma_argument(conn, &operation)? {
            Some(name) => Cow::Borrowed(name),
            None => match table_schema(conn, table_name, &operation)? {
                Some(name) => Cow::Owned(name),
                None => return Ok(Vec::new()),
            },
        };
        tracing::debug!(schema = %owner, table = table_name, "querying indexes");

        let sql = r#"SELECT t1.name, t1.origin, t1."unique", t1.partial, t2.name
                     FROM pragma_index_list(?1, ?2) t1
                     INNER JOIN pragma_index_info(t1.name, ?2) t2
                     ORDER BY t1.seq, t2.seqno"#;

        let rows = query_rows(conn, sql, [table_name, &*owner], &operation, |row| {
            Ok(IndexRow {
                name: row.get(0)?,
                index_type: row.get(1)?,
                is_unique: row.get(2)?,
                is_partial: row.get(3)?,
                column_name: row.get(4)?,
            })
        })?;

        let indexes = fold_contiguous(
            rows,
            |index: &Index, row| index.name == row.name,
            |row| Index {
                name: row.name.clone(),
                index_type: row.index_type,
                is_unique: row.is_unique,
                is_partial: row.is_partial,
                column_names: Vec::new(),
            },
            |index, row| index.column_names.push(row.column_name),
        );

        tracing::trace!(table = table_name, count = indexes.len(), "indexes loaded");
        Ok(indexes)
    }

    /// Returns the key columns of an index, ordered by rank.
    ///
    /// An unknown index yields an empty vector.
    pub fn index_columns(&self, conn: &Connection, index_name: &str) -> Result<Vec<IndexColumn>> {
        self.index_xinfo(conn, index_name, false)
    }

    /// Returns the key columns of an index followed by the auxiliary columns
    /// SQLite appends so the index covers the rowid (or the primary key of a
    /// `WITHOUT ROWID` table).
    ///
    /// An unknown index yields an empty vector.
    pub fn index_columns_aux(&self, conn: &Connection, index_name: &str) -> Result<Vec<IndexColumn>> {
        self.index_xinfo(conn, index_name, true)
    }

    fn index_xinfo(
        &self,
        conn: &Connection,
        index_name: &str,
        include_aux: bool,
    ) -> Result<Vec<IndexColumn>> {
        let operation = format!("columns for index {index_name}");
        let args = PragmaArgs::new(self, conn, index_name, &operation)?;
        tracing::debug!(
            schema = ?self.name(),
            index = index_name,
            include_aux,
            "querying index columns"
        );

        let filter = if include_aux { "" } else { r#"WHERE "key" = 1"# };
        let sql = format!(
            r#"SELECT name, seqno, cid, "desc", coll, "key"
               FROM pragma_index_xinfo({})
               {filter}
               ORDER BY seqno"#,
            args.placeholders()
        );

        let columns = query_rows(conn, &sql, args.params(), &operation, |row| {
            Ok(IndexColumn {
                name: row.get(0)?,
                rank: row.get(1)?,
                table_rank: row.get(2)?,
                descending: row.get(3)?,
                collation: row.get(4)?,
                is_key: row.get(5)?,
            })
        })?;

        tracing::trace!(index = index_name, count = columns.len(), "index columns loaded");
        Ok(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE a (x INTEGER PRIMARY KEY, y TEXT UNIQUE, z);
             CREATE INDEX idx_a_z ON a(z);",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_query_rows_wraps_errors_with_operation() {
        let conn = conn();
        let err = query_rows(&conn, "SELECT nope FROM a", (), "things", |row| {
            row.get::<_, i64>(0)
        })
        .unwrap_err();
        assert_eq!(err.operation(), "things");
        assert!(!err.is_unknown_database());
    }

    #[test]
    fn test_pragma_args_placeholders_follow_schema() {
        let conn = conn();
        let unscoped = Schema::default();
        let args = PragmaArgs::new(&unscoped, &conn, "a", "x").unwrap();
        assert_eq!(args.placeholders(), "?1");

        let main = Schema::MAIN;
        let args = PragmaArgs::new(&main, &conn, "a", "x").unwrap();
        assert_eq!(args.placeholders(), "?1, ?2");
        assert_eq!(args.schema, Some("main"));
    }

    #[test]
    fn test_table_schema_follows_search_order() {
        let conn = conn();
        conn.execute_batch(
            "ATTACH DATABASE ':memory:' AS aux;
             CREATE TABLE aux.a (p);
             CREATE TABLE aux.only_aux (p);",
        )
        .unwrap();

        assert_eq!(table_schema(&conn, "a", "x").unwrap().as_deref(), Some("main"));
        assert_eq!(table_schema(&conn, "A", "x").unwrap().as_deref(), Some("main"));
        assert_eq!(
            table_schema(&conn, "only_aux", "x").unwrap().as_deref(),
            Some("aux")
        );
        assert_eq!(table_schema(&conn, "missing", "x").unwrap(), None);

        conn.execute_batch("CREATE TEMP TABLE a (q)").unwrap();
        assert_eq!(table_schema(&conn, "a", "x").unwrap().as_deref(), Some("temp"));
    }

    #[test]
    fn test_object_names_binds_kind() {
        let conn = conn();
        assert_eq!(
            Schema::default()
                .object_names(&conn, ObjectKind::Index)
                .unwrap(),
            vec!["idx_a_z", "sqlite_autoindex_a_1"]
        );
    }
}
