//! Repository directory storage abstractions and in-memory backend.

use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;
use tokio::sync::RwLock;

mod sqlite;

use chatops_domain::DefaultPipelineMark;
pub use chatops_domain::{Pipeline, Repository};
pub use sqlite::SqliteRepositoryStore;

/// Result type for repository store operations.
pub type StoreResult<T> = Result<T, RepositoryStoreError>;

/// Errors returned by store implementations.
#[derive(Debug, Error)]
pub enum RepositoryStoreError {
    #[error("repository '{0}' already exists")]
    RepositoryAlreadyExists(String),
    #[error("repository '{0}' not found")]
    RepositoryNotFound(String),
    #[error("pipeline '{pipeline}' not found in repository '{repository}'")]
    PipelineNotFound {
        repository: String,
        pipeline: String,
    },
    #[error(
        "pipeline name '{pipeline}' matches {matches} workflows in repository '{repository}'"
    )]
    AmbiguousPipelineName {
        repository: String,
        pipeline: String,
        matches: usize,
    },
    #[error("repository name cannot be empty")]
    EmptyRepositoryName,
    #[error("invalid persisted value for '{field}': {value}")]
    InvalidPersistedValue { field: &'static str, value: String },
    #[error("storage task failed: {0}")]
    Task(String),
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Chrono(#[from] chrono::ParseError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RepositoryStoreError {
    /// True for lookups of a repository or pipeline that does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::RepositoryNotFound(_) | Self::PipelineNotFound { .. }
        )
    }
}

/// Applies the default flag in memory, mapping a missing or shared name to an error.
pub(crate) fn apply_default_pipeline(
    repository: &mut Repository,
    pipeline_name: &str,
) -> StoreResult<()> {
    match repository.mark_default_pipeline(pipeline_name) {
        DefaultPipelineMark::Marked => Ok(()),
        DefaultPipelineMark::NotFound => Err(RepositoryStoreError::PipelineNotFound {
            repository: repository.name.clone(),
            pipeline: pipeline_name.to_string(),
        }),
        DefaultPipelineMark::Ambiguous(matches) => {
            Err(RepositoryStoreError::AmbiguousPipelineName {
                repository: repository.name.clone(),
                pipeline: pipeline_name.to_string(),
                matches,
            })
        }
    }
}

/// Async storage contract for the repository directory.
///
/// Repositories are keyed by their unique name. Each operation is atomic on its
/// own; callers never need an in-process lock around them.
#[async_trait]
pub trait RepositoryStore: Send + Sync {
    /// Inserts a new repository; a name collision fails with `RepositoryAlreadyExists`.
    async fn add_repository(&self, repository: Repository) -> StoreResult<()>;
    async fn get_repository(&self, name: &str) -> StoreResult<Repository>;
    /// All repositories ordered by name.
    async fn list_repositories(&self) -> StoreResult<Vec<Repository>>;
    /// Replaces url, default branch and pipelines of the row named `repository.name`.
    async fn update_repository(&self, repository: Repository) -> StoreResult<()>;
    /// Flags one pipeline as default and clears every other flag in one update.
    /// A name shared by several pipelines fails with `AmbiguousPipelineName`.
    async fn set_default_pipeline(
        &self,
        repository_name: &str,
        pipeline_name: &str,
    ) -> StoreResult<Repository>;
    /// Cheap liveness check used by health reporting.
    async fn ping(&self) -> StoreResult<()>;
}

/// In-memory implementation for tests and local experimentation.
#[derive(Debug, Default)]
pub struct InMemoryRepositoryStore {
    inner: RwLock<BTreeMap<String, Repository>>,
}

impl InMemoryRepositoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RepositoryStore for InMemoryRepositoryStore {
    async fn add_repository(&self, repository: Repository) -> StoreResult<()> {
        if repository.name.trim().is_empty() {
            return Err(RepositoryStoreError::EmptyRepositoryName);
        }
        let mut inner = self.inner.write().await;
        if inner.contains_key(&repository.name) {
            return Err(RepositoryStoreError::RepositoryAlreadyExists(
                repository.name.clone(),
            ));
        }
        inner.insert(repository.name.clone(), repository);
        Ok(())
    }

    async fn get_repository(&self, name: &str) -> StoreResult<Repository> {
        self.inner
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| RepositoryStoreError::RepositoryNotFound(name.to_string()))
    }

    async fn list_repositories(&self) -> StoreResult<Vec<Repository>> {
        Ok(self.inner.read().await.values().cloned().collect())
    }

    async fn update_repository(&self, repository: Repository) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let Some(existing) = inner.get_mut(&repository.name) else {
            return Err(RepositoryStoreError::RepositoryNotFound(repository.name));
        };
        existing.url = repository.url;
        existing.default_branch = repository.default_branch;
        existing.pipelines = repository.pipelines;
        Ok(())
    }

    async fn set_default_pipeline(
        &self,
        repository_name: &str,
        pipeline_name: &str,
    ) -> StoreResult<Repository> {
        let mut inner = self.inner.write().await;
        let Some(repository) = inner.get_mut(repository_name) else {
            return Err(RepositoryStoreError::RepositoryNotFound(
                repository_name.to_string(),
            ));
        };
        apply_default_pipeline(repository, pipeline_name)?;
        Ok(repository.clone())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
