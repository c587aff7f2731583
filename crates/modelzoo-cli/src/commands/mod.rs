pub mod inspect;
pub mod load;
pub mod save;

use clap::Args;
use modelzoo_core::ModelZooConfig;
use modelzoo_store::{open_and_connect, Database};
use std::path::PathBuf;

/// Flags shared by every command
#[derive(Debug, Args)]
pub struct CommonArgs {
    /// Database connection string, e.g. sqlite3:///var/lib/modelzoo/models.db
    #[arg(long)]
    pub db: Option<String>,

    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl CommonArgs {
    pub fn load_config(&self) -> Result<ModelZooConfig, Box<dyn std::error::Error>> {
        Ok(match &self.config {
            Some(path) => ModelZooConfig::from_file(path)?,
            None => ModelZooConfig::default(),
        })
    }

    /// Connect only when a connection string was given
    pub fn connect(&self) -> Result<Option<Database>, Box<dyn std::error::Error>> {
        Ok(match &self.db {
            Some(conn_str) => Some(open_and_connect(conn_str)?),
            None => None,
        })
    }
}
