//! Configuration
//!
//! Every knob has a default, so an empty TOML document is a complete
//! configuration.
//!
//! ```toml
//! [resolver]
//! default_table = "sqlflow.trained_models"
//! database = "sqlflow"
//!
//! [archive]
//! program = "tar"
//!
//! [blob]
//! chunk_size = 32768
//! ```

use crate::errors::{io_error, PersistError, Result};
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_TABLE: &str = "sqlflow.trained_models";
pub const DEFAULT_ARCHIVE_PROGRAM: &str = "tar";
pub const DEFAULT_CHUNK_SIZE: usize = 32 * 1024;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelZooConfig {
    pub resolver: ResolverConfig,
    pub archive: ArchiveConfig,
    pub blob: BlobConfig,
}

/// Defaults applied when resolving bare table destinations
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
    /// Table used when the destination string is empty
    pub default_table: String,
    /// Qualifier prepended to table names that have none
    pub database: Option<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            default_table: DEFAULT_TABLE.to_string(),
            database: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArchiveConfig {
    /// Archiver executable, looked up on PATH unless absolute
    pub program: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_ARCHIVE_PROGRAM.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlobConfig {
    /// Bytes per stored row in a table blob
    pub chunk_size: usize,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ModelZooConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: ModelZooConfig =
            toml::from_str(text).map_err(|e| PersistError::InvalidConfig {
                reason: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| io_error("load_config", e).with_entity_id(path.display().to_string()))?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<()> {
        if self.blob.chunk_size == 0 {
            return Err(PersistError::InvalidConfig {
                reason: "blob.chunk_size must be greater than zero".to_string(),
            }
            .into());
        }
        if self.archive.program.trim().is_empty() {
            return Err(PersistError::InvalidConfig {
                reason: "archive.program must not be empty".to_string(),
            }
            .into());
        }
        if self.resolver.default_table.is_empty() {
            return Err(PersistError::InvalidConfig {
                reason: "resolver.default_table must not be empty".to_string(),
            }
            .into());
        }
        Ok(())
    }
}
