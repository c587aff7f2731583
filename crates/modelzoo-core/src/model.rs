//! Model metadata, staging context and the metadata frame codec
//!
//! A persisted model is `[metadata frame][tar.gz stream]`. Only
//! `PersistableMetadata` is ever encoded; `StagingContext` names the local
//! directory the archive is built from or unpacked into and never leaves
//! the process.

use crate::errors::{ExError, ExErrorKind, PersistError, Result};
use bincode::Options;
use serde::{Deserialize, Serialize};
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

/// Version tag written at the front of every metadata frame
pub const METADATA_FORMAT_VERSION: u32 = 1;

/// Upper bound on an encoded frame; rejects corrupt length prefixes early
const MAX_FRAME_BYTES: u64 = 16 * 1024 * 1024;

/// The serialized half of a model: the training statement that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistableMetadata {
    format_version: u32,
    train_select: String,
}

impl PersistableMetadata {
    pub fn new(train_select: impl Into<String>) -> Self {
        Self {
            format_version: METADATA_FORMAT_VERSION,
            train_select: train_select.into(),
        }
    }

    /// The training statement text
    pub fn train_select(&self) -> &str {
        &self.train_select
    }

    pub fn format_version(&self) -> u32 {
        self.format_version
    }
}

/// The local-only half of a model: the staging directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingContext {
    dir: PathBuf,
}

impl StagingContext {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Check that the staging directory exists and is a directory
    pub fn ensure_exists(&self, op: &str) -> Result<()> {
        if self.dir.as_os_str().is_empty() {
            return Err(ExError::new(ExErrorKind::InvalidInput)
                .with_op(op.to_string())
                .with_message("staging directory is empty"));
        }
        if !self.dir.is_dir() {
            return Err(ExError::new(ExErrorKind::InvalidInput)
                .with_op(op.to_string())
                .with_entity_id(self.dir.display().to_string())
                .with_message("staging directory does not exist or is not a directory"));
        }
        Ok(())
    }
}

fn frame_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_limit(MAX_FRAME_BYTES)
        .allow_trailing_bytes()
}

/// Encode metadata into a standalone, self-delimiting frame
pub fn encode_metadata(metadata: &PersistableMetadata) -> Result<Vec<u8>> {
    frame_options().serialize(metadata).map_err(|e| {
        PersistError::MetadataEncode {
            reason: e.to_string(),
        }
        .into()
    })
}

/// Decode one metadata frame from a reader, consuming exactly its bytes
pub fn decode_metadata_from<R: Read>(reader: R) -> Result<PersistableMetadata> {
    let metadata: PersistableMetadata =
        frame_options()
            .deserialize_from(reader)
            .map_err(|e| PersistError::MetadataDecode {
                reason: e.to_string(),
            })?;

    if metadata.format_version != METADATA_FORMAT_VERSION {
        return Err(PersistError::MetadataVersion {
            found: metadata.format_version,
            expected: METADATA_FORMAT_VERSION,
        }
        .into());
    }

    Ok(metadata)
}

/// Decode the metadata frame at the front of `bytes`
///
/// Returns the metadata and the number of bytes it occupied; everything
/// after that offset is the archive payload.
pub fn decode_metadata_prefix(bytes: &[u8]) -> Result<(PersistableMetadata, usize)> {
    let mut cursor = Cursor::new(bytes);
    let metadata = decode_metadata_from(&mut cursor)?;
    let consumed = usize::try_from(cursor.position()).map_err(|_| {
        ExError::new(ExErrorKind::Internal)
            .with_op("decode_metadata")
            .with_message("frame offset does not fit in usize")
    })?;
    Ok((metadata, consumed))
}
