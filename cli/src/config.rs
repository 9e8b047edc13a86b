//! Optional YAML configuration for the command-line front end.
//!
//! # Example YAML
//!
//! ```yaml
//! database: app.db
//! schema: aux
//! format: text
//! attach:
//!   - name: aux
//!     path: other.db
//! ```
//!
//! Relative paths are resolved against the directory holding the file.

use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlite_meta::Schema;
use thiserror::Error;

use crate::output::OutputFormat;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid attachment {0:?}, expected NAME=PATH")]
    InvalidAttachment(String),

    #[error("no database given, use --db or set `database` in the config file")]
    MissingDatabase,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// A database to attach to the connection under `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub path: PathBuf,
}

impl FromStr for Attachment {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.split_once('=') {
            Some((name, path)) if !name.trim().is_empty() && !path.is_empty() => Ok(Self {
                name: name.trim().to_string(),
                path: PathBuf::from(path),
            }),
            _ => Err(ConfigError::InvalidAttachment(raw.to_string())),
        }
    }
}

/// Settings read from a config file, all optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub database: Option<PathBuf>,
    pub schema: Option<String>,
    pub format: Option<OutputFormat>,
    pub attach: Vec<Attachment>,
}

/// Fully resolved settings for one invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database: PathBuf,
    pub schema: Schema,
    pub format: OutputFormat,
    pub attach: Vec<Attachment>,
}

impl Config {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let mut config: Config = serde_yaml::from_reader(BufReader::new(file))?;

        if let Some(base) = path.parent() {
            config.database = config.database.map(|db| resolve(base, db));
            for attachment in &mut config.attach {
                attachment.path = resolve(base, std::mem::take(&mut attachment.path));
            }
        }
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Overlays command-line values on top of the file values.
    ///
    /// Scalars given on the command line replace the file's. Attachments
    /// from the command line are added after the file's.
    pub fn merge_args(
        mut self,
        database: Option<PathBuf>,
        schema: Option<String>,
        format: Option<OutputFormat>,
        attach: Vec<Attachment>,
    ) -> Self {
        if database.is_some() {
            self.database = database;
        }
        if schema.is_some() {
            self.schema = schema;
        }
        if format.is_some() {
            self.format = format;
        }
        self.attach.extend(attach);
        self
    }

    /// Checks that a database was given and fills in defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingDatabase`] if neither the file nor the
    /// command line named a database.
    pub fn resolve(self) -> Result<Settings> {
        let database = self.database.ok_or(ConfigError::MissingDatabase)?;
        Ok(Settings {
            database,
            schema: self.schema.map(Schema::new).unwrap_or_default(),
            format: self.format.unwrap_or_default(),
            attach: self.attach,
        })
    }
}

fn resolve(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_relative() && !base.as_os_str().is_empty() {
        base.join(path)
    } else {
        path
    }
}
