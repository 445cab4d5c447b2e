use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use chatops_core::current_unix_timestamp;
use chatops_dispatch::{
    CommandDispatcher, RepositoryResolver, SourceHostingPlatform, WorkflowTriggerClient,
};
use chatops_gateway::{
    build_chatops_gateway_router, ChatopsGatewayConfig, ChatopsGatewayState,
    SLACK_COMMANDS_ENDPOINT, SLACK_EVENTS_ENDPOINT,
};
use chatops_github::GithubApiClient;
use chatops_slack::{compute_slack_signature, SLACK_SIGNATURE_HEADER, SLACK_TIMESTAMP_HEADER};
use chatops_store::SqliteRepositoryStore;
use httpmock::prelude::*;
use serde_json::{json, Value};
use tempfile::tempdir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

const SECRET: &str = "integration-signing-secret";

struct RunningGateway {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl Drop for RunningGateway {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn start_gateway(db_path: &Path, github_base: &str) -> RunningGateway {
    let store = SqliteRepositoryStore::new(db_path).expect("sqlite store");
    let github =
        GithubApiClient::new(github_base, "ghp_integration", 2_000).expect("github client");
    let platform = Some(Arc::new(github) as Arc<dyn SourceHostingPlatform>);
    let dispatcher = CommandDispatcher::new(
        RepositoryResolver::new(Arc::new(store), platform.clone()),
        WorkflowTriggerClient::new(platform),
    );
    let config = ChatopsGatewayConfig {
        bind: "127.0.0.1:0".to_string(),
        slack_signing_secret: SECRET.to_string(),
        ..ChatopsGatewayConfig::default()
    };
    let app = build_chatops_gateway_router(Arc::new(ChatopsGatewayState::new(config, dispatcher)));

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    RunningGateway { addr, handle }
}

async fn post_signed(
    addr: SocketAddr,
    path: &str,
    content_type: &str,
    body: String,
) -> (u16, Value) {
    let timestamp = current_unix_timestamp().to_string();
    let signature = compute_slack_signature(SECRET, &timestamp, body.as_bytes()).expect("sign");
    let response = reqwest::Client::new()
        .post(format!("http://{addr}{path}"))
        .header("content-type", content_type)
        .header(SLACK_TIMESTAMP_HEADER, timestamp)
        .header(SLACK_SIGNATURE_HEADER, signature)
        .body(body)
        .send()
        .await
        .expect("send");
    let status = response.status().as_u16();
    let body = response.json::<Value>().await.unwrap_or(Value::Null);
    (status, body)
}

async fn slash(addr: SocketAddr, encoded_text: &str) -> (u16, Value) {
    post_signed(
        addr,
        SLACK_COMMANDS_ENDPOINT,
        "application/x-www-form-urlencoded",
        format!("team_id=T1&channel_id=C1&user_id=U1&command=%2Fchatops&text={encoded_text}"),
    )
    .await
}

fn mock_single_workflow_repository(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET).path("/repos/org/repo");
        then.status(200).json_body(json!({
            "name": "repo",
            "html_url": "https://github.com/org/repo",
            "default_branch": "main"
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/org/repo/actions/workflows");
        then.status(200).json_body(json!({
            "total_count": 1,
            "workflows": [
                {"id": 7, "name": "CI", "path": ".github/workflows/ci.yml", "state": "active"}
            ]
        }));
    });
}

#[tokio::test]
async fn integration_slash_commands_register_and_dispatch_github_workflow() {
    let github = MockServer::start_async().await;
    mock_single_workflow_repository(&github);
    let dispatch = github.mock(|when, then| {
        when.method(POST)
            .path("/repos/org/repo/actions/workflows/ci.yml/dispatches")
            .header("authorization", "Bearer ghp_integration")
            .json_body(json!({"ref": "main", "inputs": {}}));
        then.status(204);
    });
    let temp = tempdir().expect("tempdir");
    let gateway = start_gateway(&temp.path().join("chatops.sqlite"), &github.base_url()).await;

    let (status, body) = slash(gateway.addr, "manage+https%3A%2F%2Fgithub.com%2Forg%2Frepo").await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Repository repo has been added successfully");

    let (status, body) = slash(gateway.addr, "verify+repo").await;
    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!({"status": "success", "message": "Workflow triggered successfully"})
    );

    let (status, body) = slash(gateway.addr, "verify+repo").await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "success");
    dispatch.assert_calls(2);
}

#[tokio::test]
async fn integration_rejected_dispatch_is_reported_as_error_result() {
    let github = MockServer::start_async().await;
    mock_single_workflow_repository(&github);
    github.mock(|when, then| {
        when.method(POST)
            .path("/repos/org/repo/actions/workflows/ci.yml/dispatches");
        then.status(422).json_body(json!({
            "message": "Workflow does not have 'workflow_dispatch' trigger"
        }));
    });
    let temp = tempdir().expect("tempdir");
    let gateway = start_gateway(&temp.path().join("chatops.sqlite"), &github.base_url()).await;

    slash(gateway.addr, "manage+https%3A%2F%2Fgithub.com%2Forg%2Frepo").await;
    let (status, body) = slash(gateway.addr, "verify+repo").await;
    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!({"status": "error", "message": "Failed to trigger workflow: HTTP 422"})
    );
}

#[tokio::test]
async fn integration_registrations_survive_gateway_restart() {
    let github = MockServer::start_async().await;
    mock_single_workflow_repository(&github);
    let temp = tempdir().expect("tempdir");
    let db_path = temp.path().join("state/chatops.sqlite");

    {
        let gateway = start_gateway(&db_path, &github.base_url()).await;
        let (status, _) = slash(gateway.addr, "manage+https%3A%2F%2Fgithub.com%2Forg%2Frepo").await;
        assert_eq!(status, 200);
    }

    let gateway = start_gateway(&db_path, &github.base_url()).await;
    let (status, body) = slash(gateway.addr, "manage+git%40github.com%3Aorg%2Frepo.git").await;
    assert_eq!(status, 409);
    assert_eq!(body["message"], "repository 'repo' already exists");
}

#[tokio::test]
async fn integration_workflow_step_event_runs_verification() {
    let github = MockServer::start_async().await;
    mock_single_workflow_repository(&github);
    let dispatch = github.mock(|when, then| {
        when.method(POST)
            .path("/repos/org/repo/actions/workflows/ci.yml/dispatches");
        then.status(204);
    });
    let temp = tempdir().expect("tempdir");
    let gateway = start_gateway(&temp.path().join("chatops.sqlite"), &github.base_url()).await;
    slash(gateway.addr, "manage+https%3A%2F%2Fgithub.com%2Forg%2Frepo").await;

    let payload = json!({
        "type": "event_callback",
        "event": {
            "type": "workflow_step_execute",
            "workflow_step": {
                "workflow_id": "Wf123",
                "step_id": "Step1",
                "inputs": {"repository": {"value": "repo"}, "action": {"value": "verify"}}
            }
        }
    });
    let (status, body) = post_signed(
        gateway.addr,
        SLACK_EVENTS_ENDPOINT,
        "application/json",
        payload.to_string(),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Webhook processed successfully");
    assert_eq!(body["details"]["status"], "success");
    dispatch.assert_calls(1);
}
