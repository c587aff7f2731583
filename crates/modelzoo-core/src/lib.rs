//! ModelZoo Core - metadata, destinations and the ambient facilities
//!
//! This crate provides the backend-independent half of model persistence:
//! - `PersistableMetadata` / `StagingContext` and the self-delimiting metadata frame
//! - Destination resolution (`file://`, `oss://`, bare table names)
//! - The caller `Session`
//! - Configuration loaded from TOML
//! - The canonical error facility (`ExError`, `ExErrorKind`)
//! - The structured logging facility

pub mod config;
pub mod destination;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod session;

// Re-export commonly used types
pub use config::ModelZooConfig;
pub use destination::{resolve, Backend, Destination, Direction};
pub use errors::{ExError, ExErrorKind, PersistError, Result};
pub use model::{PersistableMetadata, StagingContext};
pub use session::Session;
