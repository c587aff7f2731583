// Save/load round trips through both backends
// Covers metadata equality, extracted tree equality and idempotence

use modelzoo_core::{ModelZooConfig, Session};
use modelzoo_store::{Database, ModelHandle};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const TRAIN_SELECT: &str =
    "SELECT * FROM iris.train TO TRAIN DNNClassifier WITH model.n_classes = 3 INTO sqlflow_models.my_dnn_model";

fn setup_staging() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("saved_model.pb"), b"graph definition").unwrap();
    fs::create_dir_all(dir.path().join("variables")).unwrap();
    fs::write(
        dir.path().join("variables").join("variables.data-00000-of-00001"),
        (0..200_000u32).map(|i| (i % 251) as u8).collect::<Vec<u8>>(),
    )
    .unwrap();
    fs::write(dir.path().join("variables").join("variables.index"), b"idx").unwrap();
    dir
}

/// Relative path -> contents for every file under `root`
fn snapshot_tree(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    fn walk(root: &Path, dir: &Path, out: &mut BTreeMap<PathBuf, Vec<u8>>) {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(root, &path, out);
            } else {
                let rel = path.strip_prefix(root).unwrap().to_path_buf();
                out.insert(rel, fs::read(&path).unwrap());
            }
        }
    }
    let mut out = BTreeMap::new();
    walk(root, root, &mut out);
    out
}

fn without_sidecars(tree: BTreeMap<PathBuf, Vec<u8>>) -> BTreeMap<PathBuf, Vec<u8>> {
    tree.into_iter()
        .filter(|(p, _)| p.extension().map_or(true, |e| e != "meta"))
        .collect()
}

fn sqlite_session(dir: &Path) -> (Session, PathBuf) {
    let db_path = dir.join("zoo.db");
    (
        Session::new(format!("sqlite3://{}", db_path.display())).with_user("analyst"),
        db_path,
    )
}

#[test]
fn test_filesystem_round_trip() {
    let staging = setup_staging();
    let out = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    let config = ModelZooConfig::default();
    let dest = format!("file://{}/my_dnn_model", out.path().display());

    let handle = ModelHandle::new(staging.path(), TRAIN_SELECT);
    handle.save(&dest, &Session::default(), &config).unwrap();

    assert!(out.path().join("my_dnn_model.tar.gz").is_file());

    let loaded = ModelHandle::load(&dest, Some(target.path()), None, &config).unwrap();
    assert_eq!(loaded.train_select(), TRAIN_SELECT);
    assert_eq!(
        without_sidecars(snapshot_tree(target.path())),
        without_sidecars(snapshot_tree(staging.path()))
    );
    assert!(target.path().join("my_dnn_model.meta").is_file());
}

#[test]
fn test_table_blob_round_trip() {
    let staging = setup_staging();
    let scratch = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    let (session, db_path) = sqlite_session(scratch.path());
    let config = ModelZooConfig::from_toml_str("[blob]\nchunk_size = 4096\n").unwrap();

    let handle = ModelHandle::new(staging.path(), TRAIN_SELECT);
    handle
        .save("sqlflow_models.my_dnn_model", &session, &config)
        .unwrap();

    let db = Database::open_sqlite(&db_path).unwrap();
    let loaded = ModelHandle::load(
        "sqlflow_models.my_dnn_model",
        Some(target.path()),
        Some(&db),
        &config,
    )
    .unwrap();

    assert_eq!(loaded.train_select(), TRAIN_SELECT);
    assert_eq!(snapshot_tree(target.path()), snapshot_tree(staging.path()));
}

#[test]
fn test_default_table_round_trip() {
    let staging = setup_staging();
    let scratch = TempDir::new().unwrap();
    let (session, db_path) = sqlite_session(scratch.path());
    let config = ModelZooConfig::default();

    ModelHandle::new(staging.path(), TRAIN_SELECT)
        .save("", &session, &config)
        .unwrap();

    let db = Database::open_sqlite(&db_path).unwrap();
    let loaded =
        ModelHandle::load("sqlflow.trained_models", None, Some(&db), &config).unwrap();
    assert_eq!(loaded.train_select(), TRAIN_SELECT);
}

#[test]
fn test_table_blob_save_is_idempotent_across_tables() {
    let staging = setup_staging();
    let scratch = TempDir::new().unwrap();
    let (session, db_path) = sqlite_session(scratch.path());
    let config = ModelZooConfig::default();
    let handle = ModelHandle::new(staging.path(), TRAIN_SELECT);

    handle.save("zoo.first", &session, &config).unwrap();
    handle.save("zoo.second", &session, &config).unwrap();

    let db = Database::open_sqlite(&db_path).unwrap();
    let a = TempDir::new().unwrap();
    let b = TempDir::new().unwrap();
    let first = ModelHandle::load("zoo.first", Some(a.path()), Some(&db), &config).unwrap();
    let second = ModelHandle::load("zoo.second", Some(b.path()), Some(&db), &config).unwrap();

    assert_eq!(first.metadata, second.metadata);
    assert_eq!(snapshot_tree(a.path()), snapshot_tree(b.path()));
}

#[test]
fn test_filesystem_save_is_idempotent_across_directories() {
    let staging = setup_staging();
    let out_a = TempDir::new().unwrap();
    let out_b = TempDir::new().unwrap();
    let config = ModelZooConfig::default();
    let handle = ModelHandle::new(staging.path(), TRAIN_SELECT);
    let dest_a = format!("file://{}/model", out_a.path().display());
    let dest_b = format!("file://{}/model", out_b.path().display());

    handle.save(&dest_a, &Session::default(), &config).unwrap();
    handle.save(&dest_b, &Session::default(), &config).unwrap();

    let a = TempDir::new().unwrap();
    let b = TempDir::new().unwrap();
    let first = ModelHandle::load(&dest_a, Some(a.path()), None, &config).unwrap();
    let second = ModelHandle::load(&dest_b, Some(b.path()), None, &config).unwrap();

    assert_eq!(first.metadata, second.metadata);
    assert_eq!(snapshot_tree(a.path()), snapshot_tree(b.path()));
}

#[test]
fn test_resave_replaces_previous_model() {
    let staging = setup_staging();
    let scratch = TempDir::new().unwrap();
    let (session, db_path) = sqlite_session(scratch.path());
    let config = ModelZooConfig::default();

    ModelHandle::new(staging.path(), "SELECT 1 TO TRAIN old")
        .save("zoo.m", &session, &config)
        .unwrap();
    ModelHandle::new(staging.path(), "SELECT 2 TO TRAIN new")
        .save("zoo.m", &session, &config)
        .unwrap();

    let db = Database::open_sqlite(&db_path).unwrap();
    let loaded = ModelHandle::load("zoo.m", None, Some(&db), &config).unwrap();
    assert_eq!(loaded.train_select(), "SELECT 2 TO TRAIN new");
}

#[test]
fn test_load_creates_missing_target_directory() {
    let staging = setup_staging();
    let out = TempDir::new().unwrap();
    let config = ModelZooConfig::default();
    let dest = format!("file://{}/m", out.path().display());
    ModelHandle::new(staging.path(), TRAIN_SELECT)
        .save(&dest, &Session::default(), &config)
        .unwrap();

    let target = out.path().join("restored").join("nested");
    let loaded = ModelHandle::load(&dest, Some(target.as_path()), None, &config).unwrap();

    assert_eq!(loaded.staging.unwrap().path(), target.as_path());
    assert!(target.join("saved_model.pb").is_file());
}
