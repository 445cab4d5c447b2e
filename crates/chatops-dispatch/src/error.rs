use chatops_store::RepositoryStoreError;
use thiserror::Error;

use crate::platform::PlatformError;

pub type DispatchResult<T> = Result<T, DispatchError>;

/// Hard failures surfaced by the dispatcher.
///
/// Workflow trigger failures are not represented here: they are reported as
/// `CommandResult` values with an error status.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("repository '{0}' already exists")]
    AlreadyExists(String),
    #[error("failed to fetch repository details: {0}")]
    Enrichment(#[source] PlatformError),
    #[error("{0} integration is not configured")]
    IntegrationNotConfigured(&'static str),
    #[error("repository storage failed: {0}")]
    Store(#[source] RepositoryStoreError),
}

impl DispatchError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Stable machine-readable code for the error family.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotFound(_) => "not_found",
            Self::AlreadyExists(_) => "already_exists",
            Self::Enrichment(_) => "enrichment_failed",
            Self::IntegrationNotConfigured(_) => "integration_not_configured",
            Self::Store(_) => "storage_error",
        }
    }
}

impl From<RepositoryStoreError> for DispatchError {
    fn from(error: RepositoryStoreError) -> Self {
        match error {
            RepositoryStoreError::RepositoryAlreadyExists(name) => Self::AlreadyExists(name),
            RepositoryStoreError::EmptyRepositoryName => {
                Self::Validation("repository name cannot be empty".to_string())
            }
            error @ RepositoryStoreError::AmbiguousPipelineName { .. } => {
                Self::Validation(error.to_string())
            }
            error if error.is_not_found() => Self::NotFound(error.to_string()),
            other => Self::Store(other),
        }
    }
}
