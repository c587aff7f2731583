//! Atomic write primitive
//!
//! Writes go to a hidden sibling temp file which is then renamed over the
//! target, so readers see either the old file or the complete new one.

use crate::errors::{io_error, Result};
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Atomically write bytes to a file
///
/// The parent directory must already exist.
pub fn atomic_write(target_path: &Path, content: &[u8]) -> Result<()> {
    let temp_path = temp_sibling(target_path);

    let mut file =
        fs::File::create(&temp_path).map_err(|e| io_error("write_temp", &temp_path, e))?;
    file.write_all(content)
        .and_then(|_| file.sync_all())
        .map_err(|e| {
            fs::remove_file(&temp_path).ok();
            io_error("write_temp", &temp_path, e)
        })?;
    drop(file);

    fs::rename(&temp_path, target_path).map_err(|e| {
        fs::remove_file(&temp_path).ok();
        io_error("rename_temp", target_path, e)
    })?;

    Ok(())
}

fn temp_sibling(target_path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(target_path.file_name().unwrap_or_default());
    name.push(".tmp");
    target_path.with_file_name(name)
}
