//! Table blob adapter
//!
//! One record per table: the metadata frame immediately followed by the
//! tar.gz stream, chunked into rows by sqlfs.

use crate::archive::{ArchiveError, Archiver};
use crate::db::Database;
use crate::errors::{
    archive_failure, blob_read_failure, blob_write_failure, extract_failure, io_error, Result,
};
use crate::sqlfs::{BlobGuard, BlobReader, BlobWriter, SqlFsReader, SqlFsWriter};
use modelzoo_core::model::{decode_metadata_prefix, encode_metadata};
use modelzoo_core::{PersistableMetadata, Session, StagingContext};
use std::io::{Read, Write};
use std::path::Path;

/// Save `staging` + `metadata` into `table`, replacing any previous model
pub fn save(
    db: &Database,
    table: &str,
    session: &Session,
    archiver: &Archiver,
    chunk_size: usize,
    staging: &StagingContext,
    metadata: &PersistableMetadata,
) -> Result<u64> {
    staging.ensure_exists("table_blob_save")?;
    // Encode before opening the blob so an encode failure leaves no table behind
    let frame = encode_metadata(metadata)?;

    let writer = SqlFsWriter::create(db, table, session, chunk_size)?;
    write_record(writer, table, archiver, staging.path(), &frame)
}

/// Stream one record into an open blob and close it
///
/// The blob is closed exactly once whether or not streaming succeeds. A
/// streaming error wins over any error from that close.
pub fn write_record<W: BlobWriter>(
    writer: W,
    table: &str,
    archiver: &Archiver,
    dir: &Path,
    frame: &[u8],
) -> Result<u64> {
    let mut guard = BlobGuard::new(writer, table);

    guard
        .blob()
        .write_all(frame)
        .map_err(|e| blob_write_failure("table_blob_save", table, e))?;

    let archived = archiver
        .compress_to_writer(dir, guard.blob())
        .map_err(|e| match e {
            ArchiveError::Sink(io) => blob_write_failure("table_blob_save", table, io),
            other => archive_failure("table_blob_save", table, other),
        })?;

    guard.close()?;

    let total = frame.len() as u64 + archived;
    tracing::debug!(
        table = %table,
        frame_bytes = frame.len(),
        archive_bytes = archived,
        "Saved model blob"
    );
    Ok(total)
}

/// Read the record in `table`; extract into `target` when one is given
pub fn load(
    db: &Database,
    table: &str,
    target: Option<&Path>,
    archiver: &Archiver,
) -> Result<PersistableMetadata> {
    let reader = SqlFsReader::open(db, table)?;
    read_record(reader, table, target, archiver)
}

/// Drain an open blob, close it, then split frame from archive
pub fn read_record<R: BlobReader>(
    reader: R,
    table: &str,
    target: Option<&Path>,
    archiver: &Archiver,
) -> Result<PersistableMetadata> {
    let mut guard = BlobGuard::new(reader, table);
    let mut record = Vec::new();
    guard
        .blob()
        .read_to_end(&mut record)
        .map_err(|e| blob_read_failure("table_blob_load", table, e))?;
    guard.close()?;

    let (metadata, offset) =
        decode_metadata_prefix(&record).map_err(|e| e.with_entity_id(table.to_string()))?;

    match target {
        Some(dir) if !dir.as_os_str().is_empty() => {
            std::fs::create_dir_all(dir).map_err(|e| io_error("table_blob_load", dir, e))?;
            archiver
                .extract_bytes(&record[offset..], dir)
                .map_err(|e| extract_failure("table_blob_load", table, e))?;
            tracing::debug!(
                table = %table,
                target = %dir.display(),
                archive_bytes = record.len() - offset,
                "Extracted model blob"
            );
        }
        _ => {
            tracing::debug!(table = %table, "Loaded model metadata only");
        }
    }

    Ok(metadata)
}
