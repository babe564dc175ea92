//! Runtime configuration: command-line flags first, then environment
//! variables, then defaults rooted in the user's home directory.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use clap::Parser;
use directories::BaseDirs;

use crate::store::DEFAULT_STORAGE_KEY;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".bookshelf";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "bookshelf.sqlite";
const LOG_DIR_NAME: &str = "logs";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Command-line surface. Every option can also come from the environment.
#[derive(Parser, Debug, Default, Clone, PartialEq, Eq)]
#[command(name = "bookshelf", version, about = "Track the books you read")]
pub struct Cli {
    /// Directory holding the database and the logs (default: ~/.bookshelf).
    #[arg(long, env = "BOOKSHELF_DATA_DIR", value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    /// Name of the storage slot holding the collection.
    #[arg(long, env = "BOOKSHELF_KEY", value_name = "NAME")]
    pub key: Option<String>,

    /// Log filter passed to the file logger, e.g. `debug` or `bookshelf=trace`.
    #[arg(long, env = "BOOKSHELF_LOG", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Keep the shelf in an in-memory database for this session only.
    #[arg(long, default_value_t = false)]
    pub ephemeral: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    /// Name of the persistence slot holding the collection.
    pub storage_key: String,
    pub log_level: String,
    /// Keep everything in memory; nothing is written to disk except logs.
    pub ephemeral: bool,
}

impl AppConfig {
    /// Build the configuration from the process arguments and environment.
    /// `--help` and `--version` print and exit here.
    pub fn from_env() -> Result<Self> {
        Self::resolve(Cli::parse())
    }

    /// Apply defaults to whatever the command line and environment left unset.
    pub fn resolve(cli: Cli) -> Result<Self> {
        let data_dir = match cli.data_dir.filter(|dir| !dir.as_os_str().is_empty()) {
            Some(dir) => dir,
            None => default_data_dir()?,
        };
        let log_level =
            non_blank(cli.log_level).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        let storage_key = match cli.key {
            Some(key) if key.trim().is_empty() => bail!("storage key must not be empty"),
            Some(key) => key,
            None => DEFAULT_STORAGE_KEY.to_string(),
        };

        Ok(Self {
            data_dir,
            storage_key,
            log_level,
            ephemeral: cli.ephemeral,
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join(LOG_DIR_NAME)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Resolve `~/.bookshelf`.
fn default_data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}
