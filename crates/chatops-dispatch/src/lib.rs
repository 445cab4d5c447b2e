//! Command dispatch and workflow trigger orchestration.
//!
//! The dispatcher routes a parsed [`Command`](chatops_domain::Command) to its
//! handler, resolving repositories through the directory, deciding which
//! pipeline to run and normalizing the CI platform's answer into a
//! [`CommandResult`](chatops_domain::CommandResult).

pub mod dispatcher;
pub mod error;
pub mod platform;
pub mod rbac;
pub mod repo_url;
pub mod resolver;
pub mod selector;
pub mod trigger_client;

pub use dispatcher::CommandDispatcher;
pub use error::{DispatchError, DispatchResult};
pub use platform::{PlatformError, RepositoryDetails, SourceHostingPlatform};
pub use rbac::{required_permission, RoleRegistry};
pub use repo_url::{is_github_url, GithubRepoRef};
pub use resolver::RepositoryResolver;
pub use selector::{select_pipeline, PipelineDecision};
pub use trigger_client::WorkflowTriggerClient;

#[cfg(test)]
pub(crate) mod test_support;
