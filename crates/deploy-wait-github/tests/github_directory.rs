//! GitHub deployment directory against a mock REST server.

use std::time::Duration;

use deploy_wait_core::{
    DeploymentDirectory, DeploymentResolver, DeploymentState, DirectoryError, RepositoryRef,
    ResolutionOutcome, ResolutionRequest,
};
use deploy_wait_github::{GithubClient, GithubConfig, API_VERSION};
use httpmock::prelude::*;
use serde_json::json;

const SHA: &str = "4c8e1f0a9b7d6c5e4f3a2b1c0d9e8f7a6b5c4d3e";

fn client(server: &MockServer) -> GithubClient {
    GithubClient::new(GithubConfig::new("test-token").with_api_url(&server.base_url()))
        .expect("client")
}

fn repo() -> RepositoryRef {
    RepositoryRef::new("acme", "storefront")
}

#[tokio::test]
async fn test_list_deployments_sends_query_and_credentials() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/repos/acme/storefront/deployments")
                .query_param("sha", SHA)
                .query_param("environment", "preview")
                .header("authorization", "Bearer test-token")
                .header("accept", "application/vnd.github+json")
                .header("x-github-api-version", API_VERSION);
            then.status(200).json_body(json!([
                {
                    "id": 101,
                    "sha": SHA,
                    "ref": "feature",
                    "environment": "preview",
                    "payload": "{\"app\":\"web\"}",
                    "created_at": "2024-05-01T12:00:00Z"
                },
                {
                    "id": 102,
                    "sha": SHA,
                    "environment": "preview",
                    "payload": { "app": "worker" }
                }
            ]));
        })
        .await;

    let query = ResolutionRequest::new(repo(), SHA, Duration::from_secs(10))
        .with_environment(Some("preview".to_string()))
        .query();

    let deployments = client(&server).list_deployments(&query).await.expect("list");

    mock.assert_async().await;
    assert_eq!(deployments.len(), 2);
    assert_eq!(deployments[0].id, 101);
    assert_eq!(deployments[0].app_name().as_deref(), Some("web"));
    assert!(deployments[0].created_at.is_some());
    assert_eq!(deployments[1].app_name().as_deref(), Some("worker"));
}

#[tokio::test]
async fn test_list_statuses_maps_unknown_states_to_other() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/repos/acme/storefront/deployments/101/statuses");
            then.status(200).json_body(json!([
                { "id": 3, "state": "in_progress", "target_url": "" },
                { "id": 2, "state": "error", "target_url": "https://ci.test/2" },
                { "id": 1, "state": "success", "target_url": "https://web.test", "description": "ok" }
            ]));
        })
        .await;

    let statuses = client(&server)
        .list_deployment_statuses(&repo(), 101)
        .await
        .expect("statuses");

    mock.assert_async().await;
    let states: Vec<_> = statuses.iter().map(|s| s.state).collect();
    assert_eq!(
        states,
        vec![
            DeploymentState::Other,
            DeploymentState::Other,
            DeploymentState::Success
        ]
    );
    assert_eq!(statuses[2].target_url.as_deref(), Some("https://web.test"));
}

#[tokio::test]
async fn test_api_error_carries_status_and_message() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/acme/storefront/deployments");
            then.status(404)
                .json_body(json!({ "message": "Not Found", "documentation_url": "https://docs.test" }));
        })
        .await;

    let query = ResolutionRequest::new(repo(), SHA, Duration::from_secs(10)).query();
    let err = client(&server).list_deployments(&query).await.unwrap_err();

    assert_eq!(
        err,
        DirectoryError::Api {
            status: 404,
            message: "Not Found".to_string(),
        }
    );
}

#[tokio::test]
async fn test_malformed_body_is_a_decode_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/acme/storefront/deployments/7/statuses");
            then.status(200).body("{\"not\": \"a list\"}");
        })
        .await;

    let err = client(&server)
        .list_deployment_statuses(&repo(), 7)
        .await
        .unwrap_err();

    assert!(matches!(err, DirectoryError::Decode(_)));
}

#[tokio::test]
async fn test_unreachable_server_is_a_transport_error() {
    let client = GithubClient::new(GithubConfig::new("t").with_api_url("http://127.0.0.1:1"))
        .expect("client");

    let err = client
        .list_deployment_statuses(&repo(), 1)
        .await
        .unwrap_err();

    assert!(matches!(err, DirectoryError::Transport(_)));
}

#[tokio::test]
async fn test_resolver_reads_success_url_through_github() {
    let server = MockServer::start_async().await;
    let deployments = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/repos/acme/storefront/deployments")
                .query_param("sha", SHA);
            then.status(200).json_body(json!([
                { "id": 1, "sha": SHA, "payload": { "app": "web" } },
                { "id": 2, "sha": SHA, "payload": { "app": "api" } },
                { "id": 3, "sha": SHA, "payload": "" }
            ]));
        })
        .await;
    let statuses = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/repos/acme/storefront/deployments/2/statuses");
            then.status(200).json_body(json!([
                { "state": "pending" },
                { "state": "success", "target_url": "https://api-pr.test" }
            ]));
        })
        .await;

    let github = client(&server);
    let request = ResolutionRequest::new(repo(), SHA, Duration::from_secs(30))
        .with_app(Some("api".to_string()));
    let outcome = DeploymentResolver::new(&github)
        .resolve(&request)
        .await
        .expect("resolve");

    assert_eq!(outcome, ResolutionOutcome::success("https://api-pr.test"));
    deployments.assert_async().await;
    statuses.assert_async().await;
}
