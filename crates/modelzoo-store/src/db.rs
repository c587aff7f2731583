//! Database connection management
//!
//! Connection strings take the form `<driver>://<dsn>`. Only the SQLite
//! driver is compiled into this workspace.

use crate::errors::{connection_failure, Result};
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database driver behind a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    Sqlite3,
}

impl Driver {
    pub fn name(&self) -> &'static str {
        match self {
            Driver::Sqlite3 => "sqlite3",
        }
    }
}

/// An open connection plus the driver it speaks
pub struct Database {
    conn: Connection,
    driver: Driver,
}

impl Database {
    /// Open (creating if needed) a SQLite database file
    pub fn open_sqlite<P: AsRef<Path>>(path: P) -> Result<Self> {
        let display = path.as_ref().display().to_string();
        let conn = Connection::open(path)
            .map_err(|e| connection_failure(&format!("sqlite3://{}", display), e.to_string()))?;
        Self::configured(conn, Driver::Sqlite3)
    }

    /// Open an in-memory SQLite database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| connection_failure("sqlite3://:memory:", e.to_string()))?;
        Self::configured(conn, Driver::Sqlite3)
    }

    fn configured(conn: Connection, driver: Driver) -> Result<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)
            .map_err(|e| connection_failure(driver.name(), e.to_string()))?;
        Ok(Self { conn, driver })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn driver(&self) -> Driver {
        self.driver
    }
}

/// Parse a connection string and connect
///
/// `sqlite3://<path>` opens a database file; `sqlite3://:memory:` an
/// in-memory one. Every other driver is a `ConnectionFailure`.
pub fn open_and_connect(conn_str: &str) -> Result<Database> {
    let (driver, dsn) = conn_str.split_once("://").ok_or_else(|| {
        connection_failure(conn_str, "connection string must look like <driver>://<dsn>")
    })?;

    match driver {
        "sqlite3" if dsn == ":memory:" => Database::open_in_memory(),
        "sqlite3" if !dsn.is_empty() => Database::open_sqlite(dsn),
        "sqlite3" => Err(connection_failure(conn_str, "sqlite3 connection string has no path")),
        other => Err(connection_failure(
            conn_str,
            format!("driver '{}' is not supported by this build", other),
        )),
    }
}
