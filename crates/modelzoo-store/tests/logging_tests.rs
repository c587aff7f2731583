#![allow(clippy::unwrap_used, clippy::expect_used)]

use modelzoo_core::logging_facility::init_test_capture;
use modelzoo_core::{ModelZooConfig, Session};
use modelzoo_core_types::schema::{
    EVENT_END, EVENT_END_ERROR, EVENT_START, FIELD_BACKEND, FIELD_DESTINATION, FIELD_ERR_CODE,
    FIELD_ERR_KIND, FIELD_REQUEST_ID, OP_MODEL_LOAD, OP_MODEL_SAVE,
};
use modelzoo_store::ModelHandle;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_save_and_load_emit_start_and_end() {
    let capture = init_test_capture();
    let staging = TempDir::new().unwrap();
    fs::write(staging.path().join("w"), b"w").unwrap();
    let out = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    let dest = format!("file://{}/logged_model", out.path().display());
    let config = ModelZooConfig::default();

    ModelHandle::new(staging.path(), "SELECT 1")
        .save(&dest, &Session::default(), &config)
        .unwrap();
    ModelHandle::load(&dest, Some(target.path()), None, &config).unwrap();

    for op in [OP_MODEL_SAVE, OP_MODEL_LOAD] {
        let events: Vec<_> = capture
            .events_for_op(op)
            .into_iter()
            .filter(|e| e.field(FIELD_DESTINATION) == Some(dest.as_str()))
            .collect();
        assert_eq!(events.len(), 2, "{op}: {events:?}");
        assert_eq!(events[0].event.as_deref(), Some(EVENT_START));
        assert!(events[0].field(FIELD_REQUEST_ID).is_some());
        assert_eq!(events[1].event.as_deref(), Some(EVENT_END));
        assert_eq!(events[1].field(FIELD_BACKEND), Some("filesystem"));
        assert!(events[1].field("duration_ms").is_some());
    }
}

#[test]
fn test_rejected_load_emits_end_error_with_code() {
    let capture = init_test_capture();
    let dest = "oss://bucket/logged_rejection";

    ModelHandle::load(dest, None, None, &ModelZooConfig::default()).unwrap_err();

    let errors: Vec<_> = capture
        .events_for_op(OP_MODEL_LOAD)
        .into_iter()
        .filter(|e| e.field(FIELD_DESTINATION) == Some(dest))
        .filter(|e| e.event.as_deref() == Some(EVENT_END_ERROR))
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field(FIELD_ERR_CODE), Some("ERR_UNSUPPORTED_BACKEND"));
    assert_eq!(errors[0].field(FIELD_ERR_KIND), Some("UnsupportedBackend"));
}
