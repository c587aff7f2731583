//! Backend adapters
//!
//! Each adapter writes `[metadata frame][tar.gz stream]` to its medium and
//! reads it back:
//! - `fs_archive`: sidecar file inside the staging dir + `<base>.tar.gz`
//! - `table_blob`: one sqlfs blob holding frame and archive back to back

pub mod fs_archive;
pub mod table_blob;
