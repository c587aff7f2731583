//! Readable table blob

use super::{quote_identifier, BlobError, BlobHandle};
use crate::db::Database;
use crate::errors::{blob_close_failure, blob_open_failure, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rusqlite::{Connection, OptionalExtension};
use std::io::{self, Read};

/// Sequential reader over an existing blob table
///
/// Rows are fetched one at a time in `id` order, so memory use is bounded
/// by the largest block rather than the whole blob.
pub struct SqlFsReader<'a> {
    conn: &'a Connection,
    table: String,
    quoted: String,
    last_id: i64,
    block: Vec<u8>,
    pos: usize,
    exhausted: bool,
    closed: bool,
}

impl<'a> SqlFsReader<'a> {
    /// Open `table` for reading; fails if it does not exist
    pub fn open(db: &'a Database, table: &str) -> Result<Self> {
        let exists: i64 = db
            .conn()
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table],
                |row| row.get(0),
            )
            .map_err(|e| blob_open_failure("sqlfs_open", table, e.to_string()))?;

        if exists == 0 {
            return Err(blob_open_failure(
                "sqlfs_open",
                table,
                "no model blob stored under this name",
            ));
        }

        Ok(Self {
            conn: db.conn(),
            table: table.to_string(),
            quoted: quote_identifier(table),
            last_id: -1,
            block: Vec::new(),
            pos: 0,
            exhausted: false,
            closed: false,
        })
    }

    fn next_block(&mut self) -> std::result::Result<bool, BlobError> {
        let row: Option<(i64, String)> = self
            .conn
            .query_row(
                &format!(
                    "SELECT id, block FROM {} WHERE id > ?1 ORDER BY id LIMIT 1",
                    self.quoted
                ),
                [self.last_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            None => Ok(false),
            Some((id, encoded)) => {
                self.block = STANDARD
                    .decode(encoded.as_bytes())
                    .map_err(|source| BlobError::Corrupt { id, source })?;
                self.pos = 0;
                self.last_id = id;
                Ok(true)
            }
        }
    }
}

impl Read for SqlFsReader<'_> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if self.closed {
            return Err(BlobError::Closed.into());
        }
        loop {
            if self.pos < self.block.len() {
                let n = out.len().min(self.block.len() - self.pos);
                out[..n].copy_from_slice(&self.block[self.pos..self.pos + n]);
                self.pos += n;
                return Ok(n);
            }
            if self.exhausted || out.is_empty() {
                return Ok(0);
            }
            if !self.next_block()? {
                self.exhausted = true;
            }
        }
    }
}

impl BlobHandle for SqlFsReader<'_> {
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Err(blob_close_failure(&self.table, BlobError::Closed.to_string()));
        }
        self.closed = true;
        self.block = Vec::new();
        Ok(())
    }
}
