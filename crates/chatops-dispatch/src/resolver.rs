//! Repository resolution: registration with optional enrichment plus directory access.

use std::sync::Arc;

use chatops_domain::{Pipeline, Repository, DEFAULT_WORKFLOW_REF};
use chatops_store::RepositoryStore;
use tracing::{debug, info, warn};

use crate::error::{DispatchError, DispatchResult};
use crate::platform::SourceHostingPlatform;
use crate::repo_url::is_github_url;

/// Ensures the directory holds a repository, enriching GitHub URLs on first registration.
#[derive(Clone)]
pub struct RepositoryResolver {
    store: Arc<dyn RepositoryStore>,
    platform: Option<Arc<dyn SourceHostingPlatform>>,
}

impl RepositoryResolver {
    pub fn new(
        store: Arc<dyn RepositoryStore>,
        platform: Option<Arc<dyn SourceHostingPlatform>>,
    ) -> Self {
        Self { store, platform }
    }

    pub fn store(&self) -> &Arc<dyn RepositoryStore> {
        &self.store
    }

    /// Registers `repository` and returns the persisted value.
    ///
    /// GitHub-shaped URLs are enriched first and any enrichment failure aborts
    /// before anything is written. Other URLs must already carry a name.
    pub async fn add_repository(&self, mut repository: Repository) -> DispatchResult<Repository> {
        if is_github_url(&repository.url) {
            let Some(platform) = self.platform.as_ref() else {
                return Err(DispatchError::IntegrationNotConfigured("GitHub"));
            };
            let details = platform
                .fetch_repository(&repository.url)
                .await
                .map_err(|error| {
                    warn!(
                        url = %repository.url,
                        platform = platform.platform_name(),
                        error = %error,
                        "repository enrichment failed"
                    );
                    DispatchError::Enrichment(error)
                })?;
            debug!(
                url = %repository.url,
                name = %details.name,
                pipelines = details.pipelines.len(),
                "repository enriched"
            );
            repository.name = details.name;
            repository.default_branch = details.default_branch;
            repository.pipelines = details.pipelines;
        } else {
            if repository.name.trim().is_empty() {
                return Err(DispatchError::validation(
                    "repository name is required for non-GitHub URLs",
                ));
            }
            if repository.default_branch.trim().is_empty() {
                repository.default_branch = DEFAULT_WORKFLOW_REF.to_string();
            }
        }

        self.store.add_repository(repository.clone()).await?;
        info!(
            name = %repository.name,
            url = %repository.url,
            added_by = %repository.added_by,
            pipelines = repository.pipelines.len(),
            "repository registered"
        );
        Ok(repository)
    }

    pub async fn get_repository(&self, name: &str) -> DispatchResult<Repository> {
        Ok(self.store.get_repository(name).await?)
    }

    pub async fn list_repositories(&self) -> DispatchResult<Vec<Repository>> {
        Ok(self.store.list_repositories().await?)
    }

    pub async fn get_repository_pipelines(&self, name: &str) -> DispatchResult<Vec<Pipeline>> {
        Ok(self.get_repository(name).await?.pipelines)
    }

    pub async fn set_default_pipeline(
        &self,
        repository_name: &str,
        pipeline_name: &str,
    ) -> DispatchResult<Repository> {
        let repository = self
            .store
            .set_default_pipeline(repository_name, pipeline_name)
            .await?;
        info!(
            repository = repository_name,
            pipeline = pipeline_name,
            "default pipeline updated"
        );
        Ok(repository)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{PlatformError, RepositoryDetails};
    use crate::test_support::FakePlatform;
    use chatops_store::InMemoryRepositoryStore;
    use chrono::Utc;

    fn stub(url: &str) -> Repository {
        Repository::stub("repo-1", url, "U123", Utc::now())
    }

    #[tokio::test]
    async fn functional_github_url_is_enriched_before_persisting() {
        let store = Arc::new(InMemoryRepositoryStore::new());
        let platform = Arc::new(FakePlatform::default());
        let resolver = RepositoryResolver::new(store.clone(), Some(platform.clone()));

        let added = resolver
            .add_repository(stub("https://github.com/org/repo"))
            .await
            .expect("add");
        assert_eq!(added.name, "repo");
        assert_eq!(added.default_branch, "main");
        assert_eq!(platform.fetched_urls(), vec!["https://github.com/org/repo"]);

        let stored = store.get_repository("repo").await.expect("stored");
        assert_eq!(stored.pipelines.len(), 1);
        assert_eq!(stored.url, "https://github.com/org/repo");
    }

    #[tokio::test]
    async fn regression_enrichment_failure_writes_nothing() {
        let store = Arc::new(InMemoryRepositoryStore::new());
        let platform = Arc::new(FakePlatform::default().with_details(Err(
            PlatformError::HttpStatus {
                status: 404,
                body: "Not Found".to_string(),
            },
        )));
        let resolver = RepositoryResolver::new(store.clone(), Some(platform));

        let error = resolver
            .add_repository(stub("https://github.com/org/missing"))
            .await
            .expect_err("enrichment failure");
        assert_eq!(error.code(), "enrichment_failed");
        assert!(store.list_repositories().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn regression_github_url_without_integration_fails_fast() {
        let resolver = RepositoryResolver::new(Arc::new(InMemoryRepositoryStore::new()), None);
        let error = resolver
            .add_repository(stub("https://github.com/org/repo"))
            .await
            .expect_err("not configured");
        assert_eq!(error.to_string(), "GitHub integration is not configured");
    }

    #[tokio::test]
    async fn functional_non_github_url_requires_explicit_name() {
        let store = Arc::new(InMemoryRepositoryStore::new());
        let resolver = RepositoryResolver::new(store.clone(), None);

        let error = resolver
            .add_repository(stub("https://git.example.com/team/service"))
            .await
            .expect_err("name required");
        assert_eq!(error.code(), "validation_error");

        let mut named = stub("https://git.example.com/team/service");
        named.name = "service".to_string();
        let added = resolver.add_repository(named).await.expect("add named");
        assert_eq!(added.default_branch, "main");
        assert!(added.pipelines.is_empty());
    }

    #[tokio::test]
    async fn functional_second_registration_of_same_name_conflicts() {
        let store = Arc::new(InMemoryRepositoryStore::new());
        let platform = Arc::new(FakePlatform::default());
        let resolver = RepositoryResolver::new(store, Some(platform));
        resolver
            .add_repository(stub("https://github.com/org/repo"))
            .await
            .expect("first");
        let error = resolver
            .add_repository(stub("https://github.com/org/repo.git"))
            .await
            .expect_err("conflict");
        assert_eq!(error.to_string(), "repository 'repo' already exists");
    }

    #[tokio::test]
    async fn functional_set_default_pipeline_and_list_pipelines() {
        let store = Arc::new(InMemoryRepositoryStore::new());
        let platform = Arc::new(FakePlatform::default().with_details(Ok(RepositoryDetails {
            name: "repo".to_string(),
            url: "https://github.com/org/repo".to_string(),
            default_branch: "main".to_string(),
            pipelines: vec![
                Pipeline::new("A", "a.yml", true),
                Pipeline::new("B", "b.yml", false),
                Pipeline::new("C", "c.yml", false),
            ],
        })));
        let resolver = RepositoryResolver::new(store, Some(platform));
        resolver
            .add_repository(stub("https://github.com/org/repo"))
            .await
            .expect("add");

        resolver
            .set_default_pipeline("repo", "B")
            .await
            .expect("set default");
        let pipelines = resolver
            .get_repository_pipelines("repo")
            .await
            .expect("pipelines");
        let defaults = pipelines
            .iter()
            .filter(|pipeline| pipeline.is_default)
            .map(|pipeline| pipeline.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(defaults, vec!["B"]);

        let error = resolver
            .set_default_pipeline("repo", "Z")
            .await
            .expect_err("unknown pipeline");
        assert_eq!(error.code(), "not_found");
    }

    #[tokio::test]
    async fn regression_shared_workflow_name_is_rejected_as_validation() {
        let store = Arc::new(InMemoryRepositoryStore::new());
        let platform = Arc::new(FakePlatform::default().with_details(Ok(RepositoryDetails {
            name: "repo".to_string(),
            url: "https://github.com/org/repo".to_string(),
            default_branch: "main".to_string(),
            pipelines: vec![
                Pipeline::new("CI", ".github/workflows/ci.yml", false),
                Pipeline::new("CI", ".github/workflows/ci-nightly.yml", false),
                Pipeline::new("Release", ".github/workflows/release.yml", true),
            ],
        })));
        let resolver = RepositoryResolver::new(store, Some(platform));
        resolver
            .add_repository(stub("https://github.com/org/repo"))
            .await
            .expect("add");

        let error = resolver
            .set_default_pipeline("repo", "CI")
            .await
            .expect_err("ambiguous name");
        assert_eq!(error.code(), "validation_error");

        let defaults = resolver
            .get_repository_pipelines("repo")
            .await
            .expect("pipelines")
            .into_iter()
            .filter(|pipeline| pipeline.is_default)
            .map(|pipeline| pipeline.name)
            .collect::<Vec<_>>();
        assert_eq!(defaults, vec!["Release".to_string()]);
    }
}
