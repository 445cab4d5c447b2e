//! GitHub REST integration: repository enrichment and workflow dispatch.

mod github_api_client;

pub use github_api_client::{GithubApiClient, DEFAULT_GITHUB_API_BASE};
