//! Port to the external source-hosting platform.

use async_trait::async_trait;
use chatops_domain::{Pipeline, WorkflowTrigger};
use thiserror::Error;

/// Failures reported by a source-hosting platform integration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    #[error("invalid repository url '{0}'")]
    InvalidUrl(String),
    #[error("{0}")]
    Transport(String),
    #[error("platform returned status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Canonical repository metadata fetched during enrichment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryDetails {
    pub name: String,
    pub url: String,
    pub default_branch: String,
    pub pipelines: Vec<Pipeline>,
}

/// Capability set `{fetch_repository, trigger_workflow}` of a hosting platform.
#[async_trait]
pub trait SourceHostingPlatform: Send + Sync {
    /// Human readable platform label used in error messages.
    fn platform_name(&self) -> &'static str;

    async fn fetch_repository(&self, url: &str) -> Result<RepositoryDetails, PlatformError>;

    /// Dispatches the workflow and returns the HTTP status the platform answered with.
    ///
    /// Only failures to obtain any answer are errors; rejections come back as a status.
    async fn trigger_workflow(&self, trigger: &WorkflowTrigger) -> Result<u16, PlatformError>;
}
