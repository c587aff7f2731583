//! Filesystem archive adapter

use crate::archive::Archiver;
use crate::atomic::atomic_write;
use crate::errors::{archive_failure, extract_failure, io_error, Result};
use modelzoo_core::model::{decode_metadata_from, encode_metadata};
use modelzoo_core::{ExError, ExErrorKind, PersistableMetadata, StagingContext};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Name of the metadata sidecar for a model saved as `base`
pub fn sidecar_name(base: &str) -> String {
    format!("{}.meta", base)
}

/// Path of the archive for a model saved as `dir/base`
pub fn archive_path(dir: &Path, base: &str) -> PathBuf {
    dir.join(format!("{}.tar.gz", base))
}

/// Write the sidecar into the staging directory, then archive the
/// directory's children to `<dir>/<base>.tar.gz`.
///
/// There is no rollback: if archiving fails the sidecar stays behind in
/// the staging directory and a partial archive may exist.
pub fn save(
    archiver: &Archiver,
    staging: &StagingContext,
    metadata: &PersistableMetadata,
    dir: &Path,
    base: &str,
) -> Result<()> {
    staging.ensure_exists("fs_archive_save")?;

    let frame = encode_metadata(metadata)?;
    let sidecar = staging.path().join(sidecar_name(base));
    atomic_write(&sidecar, &frame)?;

    let archive = archive_path(dir, base);
    archiver
        .compress_to_file(staging.path(), &archive)
        .map_err(|e| archive_failure("fs_archive_save", &archive.display().to_string(), e))?;

    tracing::debug!(
        archive = %archive.display(),
        sidecar = %sidecar.display(),
        frame_bytes = frame.len(),
        "Saved model archive"
    );
    Ok(())
}

/// Extract `<dir>/<base>.tar.gz` into `target`, then decode the sidecar
/// that came out of it.
pub fn load(
    archiver: &Archiver,
    dir: &Path,
    base: &str,
    target: &Path,
) -> Result<PersistableMetadata> {
    let archive = archive_path(dir, base);
    let archive_id = archive.display().to_string();

    if !archive.is_file() {
        return Err(ExError::new(ExErrorKind::ExtractFailure)
            .with_op("fs_archive_load")
            .with_entity_id(archive_id)
            .with_message("load tar file failed: archive does not exist"));
    }

    fs::create_dir_all(target).map_err(|e| io_error("fs_archive_load", target, e))?;
    archiver
        .extract_file(&archive, target)
        .map_err(|e| extract_failure("fs_archive_load", &archive_id, e))?;

    let sidecar = target.join(sidecar_name(base));
    let file = File::open(&sidecar).map_err(|e| {
        ExError::new(ExErrorKind::MetadataDecodeFailure)
            .with_op("fs_archive_load")
            .with_entity_id(sidecar.display().to_string())
            .with_message(format!("cannot open metadata sidecar: {}", e))
    })?;
    let metadata = decode_metadata_from(BufReader::new(file))
        .map_err(|e| e.with_entity_id(sidecar.display().to_string()))?;

    tracing::debug!(
        archive = %archive.display(),
        target = %target.display(),
        "Loaded model archive"
    );
    Ok(metadata)
}
