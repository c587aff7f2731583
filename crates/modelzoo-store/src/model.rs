//! Model save/load entry points
//!
//! `ModelHandle` pairs the serialized metadata with the staging directory
//! it was trained in. `save` and `load` resolve the destination first, so
//! rejected destinations never reach a file or a database.

use crate::archive::Archiver;
use crate::backend::{fs_archive, table_blob};
use crate::db::{open_and_connect, Database};
use crate::errors::Result;
use modelzoo_core::destination::{resolve, Destination, Direction};
use modelzoo_core::{
    log_op_end, log_op_error, log_op_start, ExError, ExErrorKind, ModelZooConfig,
    PersistableMetadata, Session, StagingContext,
};
use modelzoo_core_types::schema::{OP_MODEL_LOAD, OP_MODEL_SAVE};
use modelzoo_core_types::RequestId;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// A trained model: metadata plus the directory holding its files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelHandle {
    staging: StagingContext,
    metadata: PersistableMetadata,
}

impl ModelHandle {
    pub fn new(staging_dir: impl Into<PathBuf>, train_select: impl Into<String>) -> Self {
        Self::from_parts(
            StagingContext::new(staging_dir),
            PersistableMetadata::new(train_select),
        )
    }

    pub fn from_parts(staging: StagingContext, metadata: PersistableMetadata) -> Self {
        Self { staging, metadata }
    }

    pub fn staging(&self) -> &StagingContext {
        &self.staging
    }

    pub fn metadata(&self) -> &PersistableMetadata {
        &self.metadata
    }

    pub fn train_select(&self) -> &str {
        self.metadata.train_select()
    }

    /// Persist the staging directory and metadata to `destination`
    ///
    /// # Errors
    ///
    /// `MalformedDestination` / `UnsupportedBackend` before any I/O,
    /// `ConnectionFailure` if the session's database cannot be reached,
    /// otherwise the failing adapter step's kind.
    pub fn save(&self, destination: &str, session: &Session, config: &ModelZooConfig) -> Result<()> {
        let request_id = RequestId::new();
        let start = Instant::now();
        log_op_start!(
            OP_MODEL_SAVE,
            destination = %destination,
            request_id = %request_id
        );

        let result = self.save_inner(destination, session, config);
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(backend) => {
                log_op_end!(
                    OP_MODEL_SAVE,
                    duration_ms = duration_ms,
                    destination = %destination,
                    backend = backend
                );
                Ok(())
            }
            Err(e) => {
                let e = e.with_request_id(request_id);
                log_op_error!(
                    OP_MODEL_SAVE,
                    e.clone(),
                    duration_ms = duration_ms,
                    destination = %destination
                );
                Err(e)
            }
        }
    }

    fn save_inner(
        &self,
        destination: &str,
        session: &Session,
        config: &ModelZooConfig,
    ) -> Result<&'static str> {
        let resolved = resolve(destination, Direction::Save, &config.resolver)?;
        let archiver = Archiver::from_config(&config.archive);

        match &resolved {
            Destination::Filesystem { dir, base } => {
                fs_archive::save(&archiver, &self.staging, &self.metadata, dir, base)?;
            }
            Destination::TableBlob { table } => {
                let db = open_and_connect(&session.db_conn_str)?;
                table_blob::save(
                    &db,
                    table,
                    session,
                    &archiver,
                    config.blob.chunk_size,
                    &self.staging,
                    &self.metadata,
                )?;
            }
        }
        Ok(resolved.backend().as_str())
    }

    /// Load a model from `destination`
    ///
    /// `target` is the directory the archive is unpacked into. For table
    /// destinations it may be `None` (or empty) to read the metadata only;
    /// file destinations always need one. Table destinations read through
    /// `db`.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a file load without a target, `ConnectionFailure`
    /// for a table load without a database, otherwise as `save`.
    pub fn load(
        destination: &str,
        target: Option<&Path>,
        db: Option<&Database>,
        config: &ModelZooConfig,
    ) -> Result<LoadedModel> {
        let request_id = RequestId::new();
        let start = Instant::now();
        log_op_start!(
            OP_MODEL_LOAD,
            destination = %destination,
            request_id = %request_id
        );

        let result = load_inner(destination, target, db, config);
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok((loaded, backend)) => {
                log_op_end!(
                    OP_MODEL_LOAD,
                    duration_ms = duration_ms,
                    destination = %destination,
                    backend = backend,
                    extracted = loaded.staging.is_some()
                );
                Ok(loaded)
            }
            Err(e) => {
                let e = e.with_request_id(request_id);
                log_op_error!(
                    OP_MODEL_LOAD,
                    e.clone(),
                    duration_ms = duration_ms,
                    destination = %destination
                );
                Err(e)
            }
        }
    }
}

fn load_inner(
    destination: &str,
    target: Option<&Path>,
    db: Option<&Database>,
    config: &ModelZooConfig,
) -> Result<(LoadedModel, &'static str)> {
    let resolved = resolve(destination, Direction::Load, &config.resolver)?;
    let archiver = Archiver::from_config(&config.archive);
    let target = target.filter(|t| !t.as_os_str().is_empty());

    let metadata = match &resolved {
        Destination::Filesystem { dir, base } => {
            let Some(target) = target else {
                return Err(ExError::new(ExErrorKind::InvalidInput)
                    .with_op("model_load")
                    .with_entity_id(destination.to_string())
                    .with_message("loading from a file destination requires a target directory"));
            };
            fs_archive::load(&archiver, dir, base, target)?
        }
        Destination::TableBlob { table } => {
            let Some(db) = db else {
                return Err(ExError::new(ExErrorKind::ConnectionFailure)
                    .with_op("model_load")
                    .with_entity_id(table.clone())
                    .with_message("no database connection supplied for a table destination"));
            };
            table_blob::load(db, table, target, &archiver)?
        }
    };

    let loaded = LoadedModel {
        metadata,
        staging: target.map(StagingContext::new),
    };
    Ok((loaded, resolved.backend().as_str()))
}

/// Result of a load
///
/// `staging` is `None` when only the metadata was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedModel {
    pub metadata: PersistableMetadata,
    pub staging: Option<StagingContext>,
}

impl LoadedModel {
    pub fn train_select(&self) -> &str {
        self.metadata.train_select()
    }

    /// Turn a fully extracted load back into a saveable handle
    pub fn into_handle(self) -> Option<ModelHandle> {
        let staging = self.staging?;
        Some(ModelHandle::from_parts(staging, self.metadata))
    }
}
