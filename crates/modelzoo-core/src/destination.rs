//! Destination resolution
//!
//! Turns a caller-supplied model URI into a backend choice. Resolution is
//! pure string work and runs before any file or database is touched, on
//! both the save and the load path.

use crate::config::ResolverConfig;
use crate::errors::{PersistError, Result};
use std::fmt;
use std::path::PathBuf;

const SCHEME_SEPARATOR: &str = "://";

/// Which adapter a destination is served by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Filesystem,
    TableBlob,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Filesystem => "filesystem",
            Backend::TableBlob => "table_blob",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// `file://<dir>/<base>`: archive at `<dir>/<base>.tar.gz`
    Filesystem { dir: PathBuf, base: String },
    /// Bare table identifier
    TableBlob { table: String },
}

impl Destination {
    pub fn backend(&self) -> Backend {
        match self {
            Destination::Filesystem { .. } => Backend::Filesystem,
            Destination::TableBlob { .. } => Backend::TableBlob,
        }
    }
}

/// Which entry point is resolving, for error wording only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Save,
    Load,
}

/// Resolve a destination string into a backend location
///
/// - no `://`: table identifier (empty means `config.default_table`)
/// - `file://path`: directory and base name split on the last `/`
/// - `oss://...`: `UnsupportedBackend`
/// - anything else, including more than one `://`: `MalformedDestination`
pub fn resolve(destination: &str, direction: Direction, config: &ResolverConfig) -> Result<Destination> {
    if !destination.contains(SCHEME_SEPARATOR) {
        let table = qualify_table(destination, config);
        validate_table_identifier(destination, &table)?;
        return Ok(Destination::TableBlob { table });
    }

    let parts: Vec<&str> = destination.split(SCHEME_SEPARATOR).collect();
    if parts.len() != 2 {
        return Err(malformed(
            destination,
            "expected exactly one '://' separator",
        ));
    }

    match parts[0] {
        "file" => split_file_path(destination, parts[1]),
        "oss" => {
            let (operation, direction) = match direction {
                Direction::Save => ("save", "to"),
                Direction::Load => ("load", "from"),
            };
            Err(PersistError::UnsupportedBackend {
                destination: destination.to_string(),
                scheme: "oss".to_string(),
                operation,
                direction,
            }
            .into())
        }
        "" => Err(malformed(destination, "missing scheme before '://'")),
        other => Err(malformed(destination, &format!("unknown scheme '{}'", other))),
    }
}

fn split_file_path(destination: &str, path: &str) -> Result<Destination> {
    let (dir, base) = match path.rfind('/') {
        Some(idx) => (&path[..=idx], &path[idx + 1..]),
        None => ("", path),
    };

    if base.is_empty() {
        return Err(malformed(destination, "path has no base name"));
    }

    let dir = if dir.is_empty() {
        PathBuf::from(".")
    } else {
        PathBuf::from(dir)
    };

    Ok(Destination::Filesystem {
        dir,
        base: base.to_string(),
    })
}

fn qualify_table(name: &str, config: &ResolverConfig) -> String {
    if name.is_empty() {
        return config.default_table.clone();
    }
    match &config.database {
        Some(db) if !name.contains('.') => format!("{}.{}", db, name),
        _ => name.to_string(),
    }
}

/// Table identifiers are interpolated into SQL, so only plain
/// `segment(.segment)*` names are accepted.
fn validate_table_identifier(destination: &str, table: &str) -> Result<()> {
    let valid_segment = |s: &str| {
        let mut chars = s.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            _ => false,
        }
    };

    if table.split('.').all(valid_segment) {
        Ok(())
    } else {
        Err(malformed(
            destination,
            &format!("'{}' is not a valid table identifier", table),
        ))
    }
}

fn malformed(destination: &str, reason: &str) -> crate::errors::ExError {
    PersistError::MalformedDestination {
        destination: destination.to_string(),
        reason: reason.to_string(),
    }
    .into()
}
