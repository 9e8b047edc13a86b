//! Output formatting for metadata results.

use serde::{Deserialize, Serialize};
use sqlite_meta::{Column, ForeignKey, Index, IndexColumn, SchemaSnapshot};

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Text,
}

/// Result of one command, ready to be formatted.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Output {
    Names(Vec<String>),
    Columns(Vec<Column>),
    ForeignKeys(Vec<ForeignKey>),
    Indexes(Vec<Index>),
    IndexColumns(Vec<IndexColumn>),
    Snapshot(Box<SchemaSnapshot>),
}

/// Formats a command result in the requested output format.
pub fn format_output(output: &Output, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(output)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(output).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Text => Ok(output_to_text(output)),
    }
}

fn output_to_text(output: &Output) -> String {
    let mut out = String::new();

    match output {
        Output::Names(names) => {
            for name in names {
                out.push_str(&format!("{name}\n"));
            }
        }
        Output::Columns(columns) => push_columns(&mut out, columns, ""),
        Output::ForeignKeys(fks) => push_foreign_keys(&mut out, fks, ""),
        Output::Indexes(indexes) => push_indexes(&mut out, indexes, ""),
        Output::IndexColumns(columns) => {
            for column in columns {
                let name = column.name.as_deref().unwrap_or(if column.is_rowid() {
                    "<rowid>"
                } else {
                    "<expr>"
                });
                let order = if column.descending { "DESC" } else { "ASC" };
                let aux = if column.is_key { "" } else { " aux" };
                out.push_str(&format!(
                    "{} {name} {} {order}{aux}\n",
                    column.rank, column.collation
                ));
            }
        }
        Output::Snapshot(snapshot) => {
            out.push_str(&format!("schema {}\n", snapshot.schema));
            for table in &snapshot.tables {
                out.push_str(&format!("\ntable {}\n", table.name));
                push_columns(&mut out, &table.columns, "  ");
                push_foreign_keys(&mut out, &table.foreign_keys, "  ");
                push_indexes(&mut out, &table.indexes, "  ");
            }
            for view in &snapshot.views {
                out.push_str(&format!("\nview {}\n", view.name));
                push_columns(&mut out, &view.columns, "  ");
            }
            if !snapshot.triggers.is_empty() {
                out.push('\n');
                for trigger in &snapshot.triggers {
                    out.push_str(&format!("trigger {trigger}\n"));
                }
            }
        }
    }

    out
}

fn push_columns(out: &mut String, columns: &[Column], indent: &str) {
    for column in columns {
        let mut line = format!("{indent}{} {}", column.id, column.name);
        if !column.type_name.is_empty() {
            line.push_str(&format!(" {}", column.type_name));
        }
        if column.not_null {
            line.push_str(" NOT NULL");
        }
        if let Some(default) = &column.default {
            line.push_str(&format!(" DEFAULT {default}"));
        }
        if column.primary_key > 0 {
            line.push_str(&format!(" PK{}", column.primary_key));
        }
        out.push_str(&line);
        out.push('\n');
    }
}

fn push_foreign_keys(out: &mut String, fks: &[ForeignKey], indent: &str) {
    for fk in fks {
        let parent_key = fk
            .parent_key
            .iter()
            .map(|key| key.as_deref().unwrap_or("?"))
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!(
            "{indent}fk {} ({}) -> {}({parent_key}) ON UPDATE {} ON DELETE {}\n",
            fk.id,
            fk.child_key.join(", "),
            fk.parent_table,
            fk.on_update,
            fk.on_delete,
        ));
    }
}

fn push_indexes(out: &mut String, indexes: &[Index], indent: &str) {
    for index in indexes {
        let columns = index
            .column_names
            .iter()
            .map(|name| name.as_deref().unwrap_or("<expr>"))
            .collect::<Vec<_>>()
            .join(", ");
        let mut flags = String::new();
        if index.is_unique {
            flags.push_str(" unique");
        }
        if index.is_partial {
            flags.push_str(" partial");
        }
        out.push_str(&format!(
            "{indent}index {} [{}] ({columns}){flags}\n",
            index.name, index.index_type
        ));
    }
}
