use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chatops_dispatch::{GithubRepoRef, PlatformError, RepositoryDetails, SourceHostingPlatform};
use chatops_domain::{Pipeline, WorkflowTrigger, DEFAULT_WORKFLOW_REF};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

pub const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com";

const WORKFLOWS_PAGE_SIZE: usize = 100;
const ERROR_BODY_MAX_CHARS: usize = 800;

#[derive(Debug, Deserialize)]
struct GithubRepository {
    name: String,
    #[serde(default)]
    html_url: Option<String>,
    #[serde(default)]
    default_branch: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GithubWorkflow {
    name: String,
    path: String,
}

#[derive(Debug, Deserialize)]
struct GithubWorkflowPage {
    #[serde(default)]
    workflows: Vec<GithubWorkflow>,
}

/// Thin GitHub REST client. Every call is attempted exactly once.
#[derive(Clone)]
pub struct GithubApiClient {
    http: reqwest::Client,
    api_base: String,
}

impl GithubApiClient {
    pub fn new(api_base: &str, token: &str, request_timeout_ms: u64) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("chatops-dispatch"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            reqwest::header::HeaderValue::from_static("2022-11-28"),
        );
        let auth_header = format!("Bearer {}", token.trim());
        headers.insert(
            reqwest::header::AUTHORIZATION,
            reqwest::header::HeaderValue::from_str(&auth_header)
                .context("invalid github authorization header")?,
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(request_timeout_ms.max(1)))
            .build()
            .context("failed to create github api client")?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    async fn list_workflows(
        &self,
        repo: &GithubRepoRef,
    ) -> Result<Vec<GithubWorkflow>, PlatformError> {
        let per_page = WORKFLOWS_PAGE_SIZE.to_string();
        let mut page = 1_u32;
        let mut rows = Vec::new();
        loop {
            let page_value = page.to_string();
            let chunk: GithubWorkflowPage = self
                .request_json(
                    "list workflows",
                    self.http
                        .get(format!(
                            "{}/repos/{}/{}/actions/workflows",
                            self.api_base, repo.owner, repo.name
                        ))
                        .query(&[
                            ("per_page", per_page.as_str()),
                            ("page", page_value.as_str()),
                        ]),
                )
                .await?;
            let chunk_len = chunk.workflows.len();
            rows.extend(chunk.workflows);
            if chunk_len < WORKFLOWS_PAGE_SIZE {
                break;
            }
            page = page.saturating_add(1);
        }
        Ok(rows)
    }

    async fn request_json<T>(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, PlatformError>
    where
        T: DeserializeOwned,
    {
        let response = request.send().await.map_err(|error| {
            PlatformError::Transport(format!("github api {operation} request failed: {error}"))
        })?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlatformError::HttpStatus {
                status: status.as_u16(),
                body: truncate_for_error(&body, ERROR_BODY_MAX_CHARS),
            });
        }
        response.json::<T>().await.map_err(|error| {
            PlatformError::InvalidResponse(format!("failed to decode github {operation}: {error}"))
        })
    }
}

#[async_trait]
impl SourceHostingPlatform for GithubApiClient {
    fn platform_name(&self) -> &'static str {
        "GitHub"
    }

    async fn fetch_repository(&self, url: &str) -> Result<RepositoryDetails, PlatformError> {
        let repo = GithubRepoRef::parse_url(url)
            .ok_or_else(|| PlatformError::InvalidUrl(url.to_string()))?;
        let metadata: GithubRepository = self
            .request_json(
                "get repository",
                self.http.get(format!(
                    "{}/repos/{}/{}",
                    self.api_base, repo.owner, repo.name
                )),
            )
            .await?;
        let workflows = self.list_workflows(&repo).await?;
        debug!(
            repository = %repo.as_slug(),
            workflows = workflows.len(),
            "fetched github repository details"
        );

        let single_workflow = workflows.len() == 1;
        let pipelines = workflows
            .into_iter()
            .map(|workflow| Pipeline::new(workflow.name, workflow.path, single_workflow))
            .collect();
        let default_branch = metadata
            .default_branch
            .filter(|branch| !branch.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_WORKFLOW_REF.to_string());
        Ok(RepositoryDetails {
            name: metadata.name,
            url: metadata.html_url.unwrap_or_else(|| url.to_string()),
            default_branch,
            pipelines,
        })
    }

    async fn trigger_workflow(&self, trigger: &WorkflowTrigger) -> Result<u16, PlatformError> {
        let repo = GithubRepoRef::parse_url(&trigger.repository_url)
            .ok_or_else(|| PlatformError::InvalidUrl(trigger.repository_url.clone()))?;
        let workflow_file = workflow_file_name(&trigger.workflow).ok_or_else(|| {
            PlatformError::InvalidResponse(format!(
                "workflow path '{}' has no file name",
                trigger.workflow
            ))
        })?;
        let payload = json!({
            "ref": trigger.git_ref,
            "inputs": dispatch_inputs(&trigger.parameters),
        });

        let response = self
            .http
            .post(format!(
                "{}/repos/{}/{}/actions/workflows/{}/dispatches",
                self.api_base, repo.owner, repo.name, workflow_file
            ))
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                PlatformError::Transport(format!(
                    "github api dispatch workflow request failed: {error}"
                ))
            })?;
        let status = response.status().as_u16();
        info!(
            repository = %repo.as_slug(),
            workflow = workflow_file,
            git_ref = %trigger.git_ref,
            status,
            "github workflow dispatch answered"
        );
        Ok(status)
    }
}

fn workflow_file_name(path: &str) -> Option<&str> {
    path.trim()
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
}

// Workflow dispatch inputs must all be strings.
fn dispatch_inputs(parameters: &BTreeMap<String, Value>) -> Value {
    let inputs = parameters
        .iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            (key.clone(), Value::String(text))
        })
        .collect::<Map<_, _>>();
    Value::Object(inputs)
}

fn truncate_for_error(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated = text.chars().take(max_chars).collect::<String>();
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;

    fn client(server: &MockServer) -> GithubApiClient {
        GithubApiClient::new(&server.base_url(), "test-token", 2_000).expect("github client")
    }

    #[tokio::test]
    async fn functional_fetch_repository_enriches_name_branch_and_workflows() {
        let server = MockServer::start();
        let repo_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/repos/org/repo")
                .header("authorization", "Bearer test-token")
                .header("x-github-api-version", "2022-11-28");
            then.status(200).json_body(json!({
                "name": "repo",
                "html_url": "https://github.com/org/repo",
                "default_branch": "trunk"
            }));
        });
        let workflows_mock = server.mock(|when, then| {
            when.method(GET).path("/repos/org/repo/actions/workflows");
            then.status(200).json_body(json!({
                "total_count": 2,
                "workflows": [
                    {"id": 1, "name": "CI", "path": ".github/workflows/ci.yml", "state": "active"},
                    {
                        "id": 2,
                        "name": "Release",
                        "path": ".github/workflows/release.yml",
                        "state": "active"
                    }
                ]
            }));
        });

        let details = client(&server)
            .fetch_repository("https://github.com/org/repo.git")
            .await
            .expect("details");
        repo_mock.assert_calls(1);
        workflows_mock.assert_calls(1);
        assert_eq!(details.name, "repo");
        assert_eq!(details.default_branch, "trunk");
        assert_eq!(details.pipelines.len(), 2);
        assert!(details.pipelines.iter().all(|pipeline| !pipeline.is_default));
        assert_eq!(details.pipelines[0].path, ".github/workflows/ci.yml");
    }

    #[tokio::test]
    async fn functional_single_workflow_is_marked_default() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/repos/org/repo");
            then.status(200)
                .json_body(json!({"name": "repo", "default_branch": "main"}));
        });
        server.mock(|when, then| {
            when.method(GET).path("/repos/org/repo/actions/workflows");
            then.status(200).json_body(json!({
                "total_count": 1,
                "workflows": [{"name": "CI", "path": ".github/workflows/ci.yml"}]
            }));
        });

        let details = client(&server)
            .fetch_repository("git@github.com:org/repo.git")
            .await
            .expect("details");
        assert_eq!(details.url, "git@github.com:org/repo.git");
        assert_eq!(
            details.pipelines,
            vec![Pipeline::new("CI", ".github/workflows/ci.yml", true)]
        );
    }

    #[tokio::test]
    async fn regression_fetch_surfaces_status_without_retrying() {
        let server = MockServer::start();
        let repo_mock = server.mock(|when, then| {
            when.method(GET).path("/repos/org/missing");
            then.status(503).body("unavailable");
        });

        let error = client(&server)
            .fetch_repository("https://github.com/org/missing")
            .await
            .expect_err("status error");
        repo_mock.assert_calls(1);
        assert_eq!(
            error,
            PlatformError::HttpStatus {
                status: 503,
                body: "unavailable".to_string()
            }
        );
    }

    #[tokio::test]
    async fn functional_trigger_posts_dispatch_event_for_workflow_file() {
        let server = MockServer::start();
        let dispatch = server.mock(|when, then| {
            when.method(POST)
                .path("/repos/org/repo/actions/workflows/ci.yml/dispatches")
                .json_body(json!({"ref": "main", "inputs": {}}));
            then.status(204);
        });

        let trigger = WorkflowTrigger::verification(
            "repo",
            "https://github.com/org/repo",
            ".github/workflows/ci.yml",
            "main",
        );
        let status = client(&server)
            .trigger_workflow(&trigger)
            .await
            .expect("dispatch");
        dispatch.assert_calls(1);
        assert_eq!(status, 204);
    }

    #[tokio::test]
    async fn functional_trigger_reports_rejection_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST)
                .path("/repos/org/repo/actions/workflows/ci.yml/dispatches");
            then.status(422).json_body(json!({"message": "Unexpected inputs provided"}));
        });

        let trigger = WorkflowTrigger::verification(
            "repo",
            "https://github.com/org/repo",
            ".github/workflows/ci.yml",
            "",
        );
        let status = client(&server)
            .trigger_workflow(&trigger)
            .await
            .expect("answered");
        assert_eq!(status, 422);
    }

    #[tokio::test]
    async fn regression_trigger_transport_failure_is_an_error() {
        let client = GithubApiClient::new("http://127.0.0.1:1", "token", 500).expect("client");
        let trigger = WorkflowTrigger::verification(
            "repo",
            "https://github.com/org/repo",
            ".github/workflows/ci.yml",
            "main",
        );
        let error = client.trigger_workflow(&trigger).await.expect_err("refused");
        assert!(matches!(error, PlatformError::Transport(_)));
    }

    #[test]
    fn unit_workflow_file_name_takes_last_segment() {
        assert_eq!(workflow_file_name(".github/workflows/ci.yml"), Some("ci.yml"));
        assert_eq!(workflow_file_name("ci.yml"), Some("ci.yml"));
        assert_eq!(workflow_file_name(".github/workflows/"), None);
    }
}
