// Failure modes of the two backends: missing archives, corrupt records,
// archiver failures and metadata-only loads

use modelzoo_core::model::encode_metadata;
use modelzoo_core::{ExErrorKind, ModelZooConfig, PersistableMetadata, Session};
use modelzoo_store::sqlfs::{BlobHandle, SqlFsWriter};
use modelzoo_store::{Database, ModelHandle};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

fn setup_staging() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("model.ckpt"), vec![3u8; 10_000]).unwrap();
    dir
}

fn listing(dir: &Path) -> Vec<std::path::PathBuf> {
    let mut paths: Vec<_> = fs::read_dir(dir).unwrap().map(|e| e.unwrap().path()).collect();
    paths.sort();
    paths
}

fn sqlite_conn_str(dir: &Path) -> String {
    format!("sqlite3://{}", dir.join("zoo.db").display())
}

#[test]
fn test_missing_archive_is_extract_failure() {
    let out = TempDir::new().unwrap();
    let target = out.path().join("target");
    let dest = format!("file://{}/never_saved", out.path().display());

    let err = ModelHandle::load(&dest, Some(target.as_path()), None, &ModelZooConfig::default())
        .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::ExtractFailure);
    assert!(!target.exists());
}

#[test]
fn test_metadata_only_table_load_writes_nothing() {
    let staging = setup_staging();
    let scratch = TempDir::new().unwrap();
    let config = ModelZooConfig::default();
    ModelHandle::new(staging.path(), "SELECT 5")
        .save("zoo.m", &Session::new(sqlite_conn_str(scratch.path())), &config)
        .unwrap();
    let before = listing(scratch.path());

    let db = Database::open_sqlite(scratch.path().join("zoo.db")).unwrap();
    let loaded = ModelHandle::load("zoo.m", Some(Path::new("")), Some(&db), &config).unwrap();

    assert_eq!(loaded.train_select(), "SELECT 5");
    assert!(loaded.staging.is_none());
    assert_eq!(listing(scratch.path()), before);
}

#[test]
fn test_corrupt_metadata_prefix_is_decode_failure() {
    let db = Database::open_in_memory().unwrap();
    let mut writer = SqlFsWriter::create(&db, "zoo.bad", &Session::default(), 16).unwrap();
    writer.write_all(&[0xabu8; 64]).unwrap();
    writer.close().unwrap();

    let err = ModelHandle::load("zoo.bad", None, Some(&db), &ModelZooConfig::default())
        .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::MetadataDecodeFailure);
    assert_eq!(err.entity_id(), Some("zoo.bad"));
}

#[test]
fn test_corrupt_archive_tail_reports_diagnostics() {
    let db = Database::open_in_memory().unwrap();
    let target = TempDir::new().unwrap();
    let frame = encode_metadata(&PersistableMetadata::new("SELECT 6")).unwrap();
    let mut writer = SqlFsWriter::create(&db, "zoo.tail", &Session::default(), 16).unwrap();
    writer.write_all(&frame).unwrap();
    writer.write_all(b"this is not a gzip stream at all").unwrap();
    writer.close().unwrap();

    let err = ModelHandle::load(
        "zoo.tail",
        Some(target.path()),
        Some(&db),
        &ModelZooConfig::default(),
    )
    .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::ExtractFailure);
    assert!(err.message().contains("tar failed"), "{}", err.message());
}

#[test]
fn test_failed_archiver_keeps_previous_table_model() {
    let staging = setup_staging();
    let scratch = TempDir::new().unwrap();
    let session = Session::new(sqlite_conn_str(scratch.path()));

    ModelHandle::new(staging.path(), "SELECT 7 TO TRAIN kept")
        .save("zoo.m", &session, &ModelZooConfig::default())
        .unwrap();

    let broken = ModelZooConfig::from_toml_str("[archive]\nprogram = \"false\"\n").unwrap();
    let err = ModelHandle::new(staging.path(), "SELECT 8 TO TRAIN lost")
        .save("zoo.m", &session, &broken)
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::ArchiveFailure);

    let db = Database::open_sqlite(scratch.path().join("zoo.db")).unwrap();
    let loaded = ModelHandle::load("zoo.m", None, Some(&db), &ModelZooConfig::default()).unwrap();
    assert_eq!(loaded.train_select(), "SELECT 7 TO TRAIN kept");
}

#[test]
fn test_missing_archiver_program_is_archive_failure() {
    let staging = setup_staging();
    let out = TempDir::new().unwrap();
    let dest = format!("file://{}/m", out.path().display());
    let config =
        ModelZooConfig::from_toml_str("[archive]\nprogram = \"/nonexistent/tar\"\n").unwrap();

    let err = ModelHandle::new(staging.path(), "SELECT 9")
        .save(&dest, &Session::default(), &config)
        .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::ArchiveFailure);
    assert!(err.message().contains("/nonexistent/tar"));
    // The sidecar is written before archiving and is not rolled back
    assert!(staging.path().join("m.meta").is_file());
}

#[test]
fn test_missing_staging_directory_is_invalid_input() {
    let scratch = TempDir::new().unwrap();
    let handle = ModelHandle::new(scratch.path().join("gone"), "SELECT 10");

    let err = handle
        .save("zoo.m", &Session::new(sqlite_conn_str(scratch.path())), &ModelZooConfig::default())
        .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::InvalidInput);
}

#[test]
fn test_load_of_unknown_table_is_blob_open_failure() {
    let db = Database::open_in_memory().unwrap();
    let err = ModelHandle::load("zoo.absent", None, Some(&db), &ModelZooConfig::default())
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::BlobOpenFailure);
    assert_eq!(err.entity_id(), Some("zoo.absent"));
}
