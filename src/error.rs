use std::path::PathBuf;
use thiserror::Error;

use crate::data::class::StudentId;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("configuration file not found in '{0}'")]
    NotFound(PathBuf),
    #[error("unknown storage backend '{0}'")]
    UnknownStorage(String),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    // External errors
    #[error(transparent)]
    Database(#[from] mongodb::error::Error),
    #[error(transparent)]
    Cors(#[from] rocket_cors::Error),
}

/// Failure of a single roster action.
///
/// Validation variants are produced before the document store is touched.
/// Everything else comes back from the store, is never retried, and leaves
/// the caller's visible state as it was.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("class name can't be empty")]
    EmptyName,
    #[error("a class named '{0}' already exists")]
    DuplicateName(String),
    #[error("student id {0} appears more than once")]
    DuplicateStudentId(StudentId),
    #[error("class {0} has no student ids left")]
    StudentIdsExhausted(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("document store is unavailable: {0}")]
    StoreUnavailable(String),
    #[error("document store denied access: {0}")]
    PermissionDenied(String),

    #[error("clip position {0} is outside of 0..=3")]
    InvalidClipPosition(i64),
    #[error("stored class document is malformed: {0}")]
    InvalidDocument(#[from] bson::de::Error),
    #[error("unable to encode class document: {0}")]
    Encode(#[from] bson::ser::Error),
}

impl From<StoreError> for RosterError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unavailable(reason) => RosterError::StoreUnavailable(reason),
            StoreError::PermissionDenied(reason) => RosterError::PermissionDenied(reason),
            StoreError::NotFound { collection, key } => {
                RosterError::NotFound(format!("document '{}' in '{}'", key, collection))
            }
        }
    }
}

pub type RosterResult<T> = Result<T, RosterError>;
