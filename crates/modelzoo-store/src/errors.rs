//! Error handling for modelzoo-store
//!
//! Wraps modelzoo-core ExError with store-specific helpers

use crate::archive::ArchiveError;
use modelzoo_core::errors::{ExError, ExErrorKind};
use std::path::Path;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a connection error
pub fn connection_failure(conn_str: &str, reason: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::ConnectionFailure)
        .with_op("open_and_connect")
        .with_entity_id(redact_conn_str(conn_str))
        .with_message(reason)
}

/// Create a blob open error
pub fn blob_open_failure(op: &str, table: &str, reason: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::BlobOpenFailure)
        .with_op(op.to_string())
        .with_entity_id(table.to_string())
        .with_message(reason)
}

/// Create a blob write error
pub fn blob_write_failure(op: &str, table: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::BlobWriteFailure)
        .with_op(op.to_string())
        .with_entity_id(table.to_string())
        .with_message(err.to_string())
}

/// Create a blob read error
pub fn blob_read_failure(op: &str, table: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::BlobReadFailure)
        .with_op(op.to_string())
        .with_entity_id(table.to_string())
        .with_message(err.to_string())
}

/// Create a blob close error
pub fn blob_close_failure(table: &str, reason: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::BlobCloseFailure)
        .with_op("blob_close")
        .with_entity_id(table.to_string())
        .with_message(reason)
}

/// Create an archive (compress side) error
pub fn archive_failure(op: &str, entity: &str, err: ArchiveError) -> ExError {
    ExError::new(ExErrorKind::ArchiveFailure)
        .with_op(op.to_string())
        .with_entity_id(entity.to_string())
        .with_message(err.to_string())
}

/// Create an extract error
pub fn extract_failure(op: &str, entity: &str, err: ArchiveError) -> ExError {
    ExError::new(ExErrorKind::ExtractFailure)
        .with_op(op.to_string())
        .with_entity_id(entity.to_string())
        .with_message(err.to_string())
}

/// Create an IO error scoped to a path
pub fn io_error(operation: &str, path: &Path, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_entity_id(path.display().to_string())
        .with_message(err.to_string())
}

/// Strip the `user:password@` part of a connection string
fn redact_conn_str(conn_str: &str) -> String {
    match (conn_str.find("://"), conn_str.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***@{}", &conn_str[..scheme_end], &conn_str[at + 1..])
        }
        _ => conn_str.to_string(),
    }
}
