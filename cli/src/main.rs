mod config;
mod output;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rusqlite::{Connection, OpenFlags, params};
use sqlite_meta::ObjectKind;
use tracing_subscriber::EnvFilter;

use crate::config::{Attachment, Config, Settings};
use crate::output::{Output, OutputFormat, format_output};

/// Object kinds accepted by `names`.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliObjectKind {
    Table,
    View,
    Trigger,
    Index,
}

impl From<CliObjectKind> for ObjectKind {
    fn from(kind: CliObjectKind) -> Self {
        match kind {
            CliObjectKind::Table => Self::Table,
            CliObjectKind::View => Self::View,
            CliObjectKind::Trigger => Self::Trigger,
            CliObjectKind::Index => Self::Index,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "sqlite-meta")]
#[command(about = "Inspect the structure of SQLite databases")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    /// Database file to inspect (opened read-only).
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Restrict lookups to one attached database (main, temp or an attachment name).
    #[arg(long, global = true)]
    schema: Option<String>,
    /// Attach another database file, as NAME=PATH. May be repeated.
    #[arg(long, global = true, value_name = "NAME=PATH", value_parser = parse_attachment)]
    attach: Vec<Attachment>,
    /// YAML config file providing defaults for the options above.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Output format (default: json).
    #[arg(long, global = true)]
    format: Option<OutputFormat>,
    /// Log queries to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the databases visible to the connection.
    Schemas,
    /// List the names of tables, views, triggers or indexes.
    Names(NamesArgs),
    /// Show the columns of a table or view.
    Columns(TableArgs),
    /// Show the foreign keys declared by a table.
    ForeignKeys(TableArgs),
    /// Show the indexes of a table.
    Indexes(TableArgs),
    /// Show the columns of an index.
    IndexColumns(IndexColumnsArgs),
    /// Describe every table, view and trigger in one database.
    Dump,
}

#[derive(Debug, Args)]
struct NamesArgs {
    /// Kind of object to list.
    kind: CliObjectKind,
}

#[derive(Debug, Args)]
struct TableArgs {
    /// Table name.
    table: String,
}

#[derive(Debug, Args)]
struct IndexColumnsArgs {
    /// Index name.
    index: String,
    /// Include auxiliary columns stored with the key (the rowid or the remaining primary key).
    #[arg(long)]
    aux: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    let result = settings(cli.global).and_then(|settings| {
        let conn = connect(&settings)?;
        let output = match cli.command {
            Command::Schemas => run_schemas(&conn),
            Command::Names(args) => run_names(&conn, &settings, args),
            Command::Columns(args) => run_columns(&conn, &settings, args),
            Command::ForeignKeys(args) => run_foreign_keys(&conn, &settings, args),
            Command::Indexes(args) => run_indexes(&conn, &settings, args),
            Command::IndexColumns(args) => run_index_columns(&conn, &settings, args),
            Command::Dump => run_dump(&conn, &settings),
        }?;
        print_output(&output, settings.format)
    });

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    // RUST_LOG takes precedence over the default filter
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .init();
}

fn settings(args: GlobalArgs) -> Result<Settings, String> {
    let config = match &args.config {
        Some(path) => Config::load(path).map_err(|err| format!("'{}': {err}", path.display()))?,
        None => Config::default(),
    };
    config
        .merge_args(args.db, args.schema, args.format, args.attach)
        .resolve()
        .map_err(|err| err.to_string())
}

fn connect(settings: &Settings) -> Result<Connection, String> {
    let conn = Connection::open_with_flags(
        &settings.database,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|err| format!("Failed to open '{}': {err}", settings.database.display()))?;

    for attachment in &settings.attach {
        conn.execute(
            "ATTACH DATABASE ?1 AS ?2",
            params![attachment.path.to_string_lossy().into_owned(), attachment.name],
        )
        .map_err(|err| {
            format!(
                "Failed to attach '{}' as {}: {err}",
                attachment.path.display(),
                attachment.name
            )
        })?;
        tracing::debug!(name = %attachment.name, path = %attachment.path.display(), "attached database");
    }

    Ok(conn)
}

fn run_schemas(conn: &Connection) -> Result<Output, String> {
    let names = sqlite_meta::schema_names(conn).map_err(|e| e.to_string())?;
    Ok(Output::Names(names))
}

fn run_names(conn: &Connection, settings: &Settings, args: NamesArgs) -> Result<Output, String> {
    let names = settings
        .schema
        .object_names(conn, args.kind.into())
        .map_err(|e| e.to_string())?;
    Ok(Output::Names(names))
}

fn run_columns(conn: &Connection, settings: &Settings, args: TableArgs) -> Result<Output, String> {
    let columns = settings
        .schema
        .columns(conn, &args.table)
        .map_err(|e| e.to_string())?;
    Ok(Output::Columns(columns))
}

fn run_foreign_keys(
    conn: &Connection,
    settings: &Settings,
    args: TableArgs,
) -> Result<Output, String> {
    let fks = settings
        .schema
        .foreign_keys(conn, &args.table)
        .map_err(|e| e.to_string())?;
    Ok(Output::ForeignKeys(fks))
}

fn run_indexes(conn: &Connection, settings: &Settings, args: TableArgs) -> Result<Output, String> {
    let indexes = settings
        .schema
        .indexes(conn, &args.table)
        .map_err(|e| e.to_string())?;
    Ok(Output::Indexes(indexes))
}

fn run_index_columns(
    conn: &Connection,
    settings: &Settings,
    args: IndexColumnsArgs,
) -> Result<Output, String> {
    let columns = if args.aux {
        settings.schema.index_columns_aux(conn, &args.index)
    } else {
        settings.schema.index_columns(conn, &args.index)
    }
    .map_err(|e| e.to_string())?;
    Ok(Output::IndexColumns(columns))
}

fn run_dump(conn: &Connection, settings: &Settings) -> Result<Output, String> {
    let snapshot = settings.schema.snapshot(conn).map_err(|e| e.to_string())?;
    Ok(Output::Snapshot(Box::new(snapshot)))
}

fn print_output(output: &Output, format: OutputFormat) -> Result<(), String> {
    let raw = format_output(output, format)?;
    if raw.ends_with('\n') || raw.is_empty() {
        print!("{raw}");
    } else {
        println!("{raw}");
    }
    Ok(())
}

fn parse_attachment(raw: &str) -> Result<Attachment, String> {
    raw.parse().map_err(|err: config::ConfigError| err.to_string())
}
