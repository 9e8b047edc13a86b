//! Decoding of SQLite values into the metadata enums.
//!
//! `pragma_foreign_key_list` reports actions and `pragma_index_list` reports
//! index origins as short text literals. Both enums accept that literal as
//! either TEXT or BLOB, compared ASCII case-insensitively. Any other storage
//! class is rejected outright rather than stringified.

use std::fmt;
use std::str::FromStr;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ValueRef};

use crate::error::DecodeError;
use crate::types::{ForeignKeyAction, IndexType};

const FOREIGN_KEY_ACTION: &str = "ForeignKeyAction";
const INDEX_TYPE: &str = "IndexType";

/// Extracts the literal carried by a TEXT or BLOB value.
fn literal<'a>(target: &'static str, value: ValueRef<'a>) -> Result<&'a str, DecodeError> {
    let bytes = match value {
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => bytes,
        other => {
            return Err(DecodeError::InvalidType {
                target,
                type_name: other.data_type().to_string(),
                value: render(other),
            });
        }
    };

    std::str::from_utf8(bytes).map_err(|_| DecodeError::Unsupported {
        target,
        literal: String::from_utf8_lossy(bytes).into_owned(),
    })
}

fn render(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => String::from_utf8_lossy(bytes).into_owned(),
    }
}

impl ForeignKeyAction {
    /// The literal SQLite uses for this action.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "NO ACTION",
            Self::Restrict => "RESTRICT",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
            Self::Cascade => "CASCADE",
        }
    }

    /// Decodes a TEXT or BLOB value such as `CASCADE` or `set null`.
    ///
    /// # Errors
    ///
    /// [`DecodeError::InvalidType`] for any other storage class,
    /// [`DecodeError::Unsupported`] for an unrecognized literal.
    pub fn decode(value: ValueRef<'_>) -> Result<Self, DecodeError> {
        literal(FOREIGN_KEY_ACTION, value)?.parse()
    }
}

impl FromStr for ForeignKeyAction {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const ACTIONS: [ForeignKeyAction; 5] = [
            ForeignKeyAction::None,
            ForeignKeyAction::Restrict,
            ForeignKeyAction::SetNull,
            ForeignKeyAction::SetDefault,
            ForeignKeyAction::Cascade,
        ];

        ACTIONS
            .into_iter()
            .find(|action| action.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DecodeError::Unsupported {
                target: FOREIGN_KEY_ACTION,
                literal: s.to_string(),
            })
    }
}

impl fmt::Display for ForeignKeyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromSql for ForeignKeyAction {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Self::decode(value).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

impl IndexType {
    /// The origin tag `pragma_index_list` reports for this type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "c",
            Self::Unique => "u",
            Self::PrimaryKey => "pk",
        }
    }

    /// Decodes an origin tag (`c`, `u` or `pk`) from a TEXT or BLOB value.
    ///
    /// # Errors
    ///
    /// [`DecodeError::InvalidType`] for any other storage class,
    /// [`DecodeError::Unsupported`] for an unrecognized tag.
    pub fn decode(value: ValueRef<'_>) -> Result<Self, DecodeError> {
        literal(INDEX_TYPE, value)?.parse()
    }
}

impl FromStr for IndexType {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("c") {
            Ok(Self::User)
        } else if s.eq_ignore_ascii_case("u") {
            Ok(Self::Unique)
        } else if s.eq_ignore_ascii_case("pk") {
            Ok(Self::PrimaryKey)
        } else {
            Err(DecodeError::Unsupported {
                target: INDEX_TYPE,
                literal: s.to_string(),
            })
        }
    }
}

impl fmt::Display for IndexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromSql for IndexType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Self::decode(value).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}
