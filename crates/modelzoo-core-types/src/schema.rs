//! Canonical schema constants for structured logging and events
//!
//! These constants keep field names identical across the logging macros,
//! the persistence entry points and the test capture layer.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";

// Persistence context
pub const FIELD_DESTINATION: &str = "destination";
pub const FIELD_BACKEND: &str = "backend";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

// Canonical operation names
pub const OP_MODEL_SAVE: &str = "model_save";
pub const OP_MODEL_LOAD: &str = "model_load";
