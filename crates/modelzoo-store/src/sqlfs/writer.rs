//! Writable table blob

use super::{quote_identifier, BlobError, BlobHandle};
use crate::db::Database;
use crate::errors::{blob_close_failure, blob_open_failure, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use modelzoo_core::Session;
use rusqlite::{params, Connection, Transaction};
use std::io::{self, Write};

/// Append-only writer over a freshly (re)created blob table
///
/// All rows are written inside one transaction that commits on `close()`.
/// Dropping the writer without closing it rolls the transaction back, so
/// a failed save leaves whatever was stored under the name before.
pub struct SqlFsWriter<'a> {
    tx: Option<Transaction<'a>>,
    table: String,
    quoted: String,
    chunk_size: usize,
    buf: Vec<u8>,
    next_id: i64,
    bytes_written: u64,
}

impl<'a> SqlFsWriter<'a> {
    /// Drop and recreate `table`, then open it for appending
    pub fn create(
        db: &'a Database,
        table: &str,
        session: &Session,
        chunk_size: usize,
    ) -> Result<Self> {
        if chunk_size == 0 {
            return Err(blob_open_failure(
                "sqlfs_create",
                table,
                "chunk size must be greater than zero",
            ));
        }

        let quoted = quote_identifier(table);
        let tx = db
            .conn()
            .unchecked_transaction()
            .map_err(|e| blob_open_failure("sqlfs_create", table, e.to_string()))?;

        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS {q};
             CREATE TABLE {q} (id INTEGER PRIMARY KEY, block TEXT NOT NULL);",
            q = quoted
        ))
        .map_err(|e| blob_open_failure("sqlfs_create", table, e.to_string()))?;

        tracing::debug!(
            table = %table,
            driver = db.driver().name(),
            user_id = %session.user_id,
            "Created sqlfs blob"
        );

        Ok(Self {
            tx: Some(tx),
            table: table.to_string(),
            quoted,
            chunk_size,
            buf: Vec::with_capacity(chunk_size),
            next_id: 0,
            bytes_written: 0,
        })
    }

    /// Bytes accepted so far, buffered or stored
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written + self.buf.len() as u64
    }

    fn store_buffered(&mut self) -> std::result::Result<(), BlobError> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let tx = self.tx.as_ref().ok_or(BlobError::Closed)?;
        insert_block(tx, &self.quoted, self.next_id, &self.buf)?;
        self.next_id += 1;
        self.bytes_written += self.buf.len() as u64;
        self.buf.clear();
        Ok(())
    }
}

fn insert_block(
    conn: &Connection,
    quoted: &str,
    id: i64,
    block: &[u8],
) -> std::result::Result<(), BlobError> {
    conn.execute(
        &format!("INSERT INTO {} (id, block) VALUES (?1, ?2)", quoted),
        params![id, STANDARD.encode(block)],
    )?;
    Ok(())
}

impl Write for SqlFsWriter<'_> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if self.tx.is_none() {
            return Err(BlobError::Closed.into());
        }
        let room = self.chunk_size - self.buf.len();
        let n = room.min(data.len());
        self.buf.extend_from_slice(&data[..n]);
        if self.buf.len() == self.chunk_size {
            self.store_buffered()?;
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.store_buffered()?;
        Ok(())
    }
}

impl BlobHandle for SqlFsWriter<'_> {
    fn close(&mut self) -> Result<()> {
        if self.tx.is_none() {
            return Err(blob_close_failure(&self.table, BlobError::Closed.to_string()));
        }

        let stored = self.store_buffered();
        let Some(tx) = self.tx.take() else {
            return Err(blob_close_failure(&self.table, BlobError::Closed.to_string()));
        };
        stored.map_err(|e| blob_close_failure(&self.table, e.to_string()))?;
        tx.commit()
            .map_err(|e| blob_close_failure(&self.table, e.to_string()))?;

        tracing::debug!(
            table = %self.table,
            bytes = self.bytes_written,
            blocks = self.next_id,
            "Closed sqlfs blob"
        );
        Ok(())
    }

    fn abort(&mut self) -> Result<()> {
        let Some(tx) = self.tx.take() else {
            return Err(blob_close_failure(&self.table, BlobError::Closed.to_string()));
        };
        self.buf.clear();
        tx.rollback()
            .map_err(|e| blob_close_failure(&self.table, e.to_string()))?;
        tracing::debug!(table = %self.table, "Rolled back sqlfs blob");
        Ok(())
    }
}
