use modelzoo_core_types::RequestId;
use thiserror::Error;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every failed save or load call surfaces exactly one `ExError` whose kind
/// is drawn from this list. Each kind maps to a stable error code that
/// callers and tests can match on without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Destination resolution
    MalformedDestination,
    UnsupportedBackend,

    // Database / blob store
    ConnectionFailure,
    BlobOpenFailure,
    BlobWriteFailure,
    BlobReadFailure,
    BlobCloseFailure,

    // Metadata frame
    MetadataEncodeFailure,
    MetadataDecodeFailure,

    // Archive primitive
    /// Compressing the staging directory failed (carries archiver diagnostics)
    ArchiveFailure,
    /// Unpacking an archive failed (carries archiver diagnostics)
    ExtractFailure,

    // Generic
    InvalidInput,
    Io,
    Config,
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::MalformedDestination => "ERR_MALFORMED_DESTINATION",
            ExErrorKind::UnsupportedBackend => "ERR_UNSUPPORTED_BACKEND",
            ExErrorKind::ConnectionFailure => "ERR_CONNECTION_FAILURE",
            ExErrorKind::BlobOpenFailure => "ERR_BLOB_OPEN_FAILURE",
            ExErrorKind::BlobWriteFailure => "ERR_BLOB_WRITE_FAILURE",
            ExErrorKind::BlobReadFailure => "ERR_BLOB_READ_FAILURE",
            ExErrorKind::BlobCloseFailure => "ERR_BLOB_CLOSE_FAILURE",
            ExErrorKind::MetadataEncodeFailure => "ERR_METADATA_ENCODE_FAILURE",
            ExErrorKind::MetadataDecodeFailure => "ERR_METADATA_DECODE_FAILURE",
            ExErrorKind::ArchiveFailure => "ERR_ARCHIVE_FAILURE",
            ExErrorKind::ExtractFailure => "ERR_EXTRACT_FAILURE",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries the classification (`kind`), the operation that failed (`op`),
/// the destination identifier it failed against (`entity_id`) and a
/// human-readable message, which together are enough to show to a user
/// directly.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    request_id: Option<RequestId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            request_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context (destination URI, table name or path)
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the entity ID context, if any
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// Get the request ID context, if any
    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.kind.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(source) = &self.source {
            write!(f, "; caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain errors raised while resolving destinations and framing metadata
///
/// Converted into `ExError` at the crate boundary so callers only ever see
/// the canonical facility.
#[derive(Debug, Clone, Error)]
pub enum PersistError {
    /// Destination has more than one scheme separator or an unknown scheme
    #[error("malformed model destination '{destination}': {reason}")]
    MalformedDestination { destination: String, reason: String },

    /// Destination names a backend this build rejects (oss://)
    #[error("{operation} model {direction} {scheme} is not supported")]
    UnsupportedBackend {
        destination: String,
        scheme: String,
        operation: &'static str,
        direction: &'static str,
    },

    /// Metadata could not be serialized
    #[error("encoding model metadata failed: {reason}")]
    MetadataEncode { reason: String },

    /// Metadata frame could not be deserialized
    #[error("decoding model metadata failed: {reason}")]
    MetadataDecode { reason: String },

    /// Metadata frame carries a version this build does not understand
    #[error("unsupported metadata format version {found} (expected {expected})")]
    MetadataVersion { found: u32, expected: u32 },

    /// Configuration text is invalid
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl From<PersistError> for ExError {
    fn from(err: PersistError) -> Self {
        let message = err.to_string();
        match err {
            PersistError::MalformedDestination { destination, .. } => {
                ExError::new(ExErrorKind::MalformedDestination)
                    .with_op("resolve_destination")
                    .with_entity_id(destination)
                    .with_message(message)
            }
            PersistError::UnsupportedBackend { destination, .. } => {
                ExError::new(ExErrorKind::UnsupportedBackend)
                    .with_op("resolve_destination")
                    .with_entity_id(destination)
                    .with_message(message)
            }
            PersistError::MetadataEncode { .. } => {
                ExError::new(ExErrorKind::MetadataEncodeFailure)
                    .with_op("encode_metadata")
                    .with_message(message)
            }
            PersistError::MetadataDecode { .. } | PersistError::MetadataVersion { .. } => {
                ExError::new(ExErrorKind::MetadataDecodeFailure)
                    .with_op("decode_metadata")
                    .with_message(message)
            }
            PersistError::InvalidConfig { .. } => ExError::new(ExErrorKind::Config)
                .with_op("load_config")
                .with_message(message),
        }
    }
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_code_op_message_and_entity() {
        let err = ExError::new(ExErrorKind::BlobOpenFailure)
            .with_op("table_blob_save")
            .with_entity_id("sqlflow.model_a")
            .with_message("cannot create sqlfs file");

        let s = err.to_string();
        assert!(s.starts_with("[ERR_BLOB_OPEN_FAILURE]"));
        assert!(s.contains("in operation 'table_blob_save'"));
        assert!(s.contains("cannot create sqlfs file"));
        assert!(s.contains("(entity_id: sqlflow.model_a)"));
    }

    #[test]
    fn test_source_is_rendered_and_exposed() {
        let inner = ExError::new(ExErrorKind::Io).with_message("disk full");
        let outer = ExError::new(ExErrorKind::ArchiveFailure).with_source(inner);

        assert_eq!(outer.source_error().unwrap().kind(), ExErrorKind::Io);
        assert!(outer.to_string().contains("caused by [ERR_IO]"));
        assert!(std::error::Error::source(&outer).is_some());
    }

    #[test]
    fn test_request_id_context() {
        let id = RequestId::from_string("req-7".to_string());
        let err = ExError::new(ExErrorKind::Internal).with_request_id(id.clone());
        assert_eq!(err.request_id(), Some(&id));
    }

    #[test]
    fn test_unsupported_backend_message() {
        let err = PersistError::UnsupportedBackend {
            destination: "oss://bucket/key".to_string(),
            scheme: "oss".to_string(),
            operation: "save",
            direction: "to",
        };
        assert_eq!(err.to_string(), "save model to oss is not supported");

        let ex: ExError = err.into();
        assert_eq!(ex.kind(), ExErrorKind::UnsupportedBackend);
        assert_eq!(ex.entity_id(), Some("oss://bucket/key"));
    }

    #[test]
    fn test_version_mismatch_maps_to_decode_failure() {
        let ex: ExError = PersistError::MetadataVersion {
            found: 9,
            expected: 1,
        }
        .into();
        assert_eq!(ex.kind(), ExErrorKind::MetadataDecodeFailure);
        assert!(ex.message().contains("version 9"));
    }

    #[test]
    fn test_io_error_helper() {
        let err = io_error(
            "write_sidecar",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.kind(), ExErrorKind::Io);
        assert_eq!(err.op(), Some("write_sidecar"));
    }
}
