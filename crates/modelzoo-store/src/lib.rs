//! ModelZoo Store - model persistence backends
//!
//! Provides:
//! - `ModelHandle::save` / `ModelHandle::load` dispatching on the resolved destination
//! - Filesystem archive backend (`<base>.meta` sidecar + `<base>.tar.gz`)
//! - Table-blob backend over SQLite ("sqlfs")
//! - The external archiver wrapper with diagnostic capture
//! - Connection-string based database access

pub mod archive;
pub mod atomic;
pub mod backend;
pub mod db;
pub mod errors;
pub mod model;
pub mod sqlfs;

// Re-export key types
pub use archive::{ArchiveError, Archiver};
pub use db::{open_and_connect, Database, Driver};
pub use errors::Result;
pub use model::{LoadedModel, ModelHandle};
