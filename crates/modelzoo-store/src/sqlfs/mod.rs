//! Table-backed append-only blobs ("sqlfs")
//!
//! A blob is a SQL table `(id INTEGER PRIMARY KEY, block TEXT)` whose rows,
//! read in `id` order and base64-decoded, concatenate to the blob's bytes.
//!
//! Provides:
//! - `BlobHandle` / `BlobWriter` / `BlobReader` traits (the seam adapters depend on)
//! - `BlobGuard`, which closes a blob exactly once on every exit path
//! - `SqlFsWriter` / `SqlFsReader` over SQLite

mod guard;
mod reader;
mod writer;

use crate::errors::Result;
use std::io::{Read, Write};
use thiserror::Error;

pub use guard::BlobGuard;
pub use reader::SqlFsReader;
pub use writer::SqlFsWriter;

/// A blob that must be explicitly closed
pub trait BlobHandle {
    /// Finalize the blob. Calling it twice is an error.
    fn close(&mut self) -> Result<()>;

    /// Release the blob on an error path. Blobs that can discard partial
    /// contents do so here; the default is a plain `close`.
    fn abort(&mut self) -> Result<()> {
        self.close()
    }
}

/// A writable blob stream
pub trait BlobWriter: Write + BlobHandle {}
impl<T: Write + BlobHandle> BlobWriter for T {}

/// A readable blob stream
pub trait BlobReader: Read + BlobHandle {}
impl<T: Read + BlobHandle> BlobReader for T {}

/// Low-level sqlfs failures, surfaced through `std::io::Error` on the
/// stream traits and through `ExError` everywhere else
#[derive(Debug, Error)]
pub enum BlobError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("block {id} is not valid base64: {source}")]
    Corrupt {
        id: i64,
        #[source]
        source: base64::DecodeError,
    },

    #[error("blob is already closed")]
    Closed,
}

impl From<BlobError> for std::io::Error {
    fn from(err: BlobError) -> Self {
        let kind = match err {
            BlobError::Corrupt { .. } => std::io::ErrorKind::InvalidData,
            _ => std::io::ErrorKind::Other,
        };
        std::io::Error::new(kind, err)
    }
}

/// Quote a table name as a single SQL identifier
pub(crate) fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
