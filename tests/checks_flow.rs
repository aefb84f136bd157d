//! Check-run discovery and polling tests

use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pipeup::github::{CheckRunConclusion, ChecksHandler, GitHubClient, PollPolicy};
use pipeup::PipeupError;

fn client(server: &MockServer) -> GitHubClient {
    GitHubClient::new("octo/app", SecretString::from("test-token".to_string()))
        .unwrap()
        .with_base_url(server.uri())
}

fn fast_policy() -> PollPolicy {
    PollPolicy {
        discovery_lag: Duration::from_millis(1),
        resolve_attempts: 4,
        resolve_interval: Duration::from_millis(2),
        status_interval: Duration::from_millis(2),
    }
}

#[tokio::test]
async fn resolve_gives_up_after_bounded_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/app/commits/abc123/check-runs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_count": 0,
            "check_runs": []
        })))
        .expect(4)
        .mount(&server)
        .await;

    let client = client(&server);
    let err = ChecksHandler::with_policy(&client, fast_policy())
        .resolve("abc123")
        .await
        .unwrap_err();
    assert!(matches!(err, PipeupError::CheckRunNotFound));
}

#[tokio::test]
async fn resolve_picks_the_actions_check_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/app/commits/abc123/check-runs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_count": 2,
            "check_runs": [
                {"id": 11, "app": {"slug": "dependabot"}},
                {"id": 42, "app": {"slug": "github-actions"}}
            ]
        })))
        .mount(&server)
        .await;

    let client = client(&server);
    let handle = ChecksHandler::with_policy(&client, fast_policy())
        .resolve("abc123")
        .await
        .unwrap();
    assert_eq!(handle.id, 42);
}

#[tokio::test]
async fn resolve_retries_until_the_run_appears() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/app/commits/abc123/check-runs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_count": 0,
            "check_runs": []
        })))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/app/commits/abc123/check-runs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_count": 1,
            "check_runs": [{"id": 7, "app": {"slug": "github-actions"}}]
        })))
        .mount(&server)
        .await;

    let client = client(&server);
    let handle = ChecksHandler::with_policy(&client, fast_policy())
        .resolve("abc123")
        .await
        .unwrap();
    assert_eq!(handle.id, 7);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn await_terminal_follows_the_full_lifecycle() {
    let server = MockServer::start().await;
    let run_path = "/repos/octo/app/check-runs/42";

    Mock::given(method("GET"))
        .and(path(run_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "queued",
            "conclusion": null
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(run_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "in_progress",
            "conclusion": null
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(run_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "completed",
            "conclusion": "success"
        })))
        .mount(&server)
        .await;

    let client = client(&server);
    let handler = ChecksHandler::with_policy(&client, fast_policy());
    let conclusion = handler
        .await_terminal(&pipeup::github::CheckRunHandle { id: 42 })
        .await
        .unwrap();

    assert_eq!(conclusion, CheckRunConclusion::Success);
    assert!(server.received_requests().await.unwrap().len() >= 3);
}

#[tokio::test]
async fn await_terminal_returns_once_when_already_completed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/app/check-runs/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "completed",
            "conclusion": "failure"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let conclusion = ChecksHandler::with_policy(&client, fast_policy())
        .await_terminal(&pipeup::github::CheckRunHandle { id: 42 })
        .await
        .unwrap();
    assert_eq!(conclusion, CheckRunConclusion::Failure);
}

#[tokio::test]
async fn await_terminal_carries_other_conclusions_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/app/check-runs/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "completed",
            "conclusion": "cancelled"
        })))
        .mount(&server)
        .await;

    let client = client(&server);
    let conclusion = ChecksHandler::with_policy(&client, fast_policy())
        .await_terminal(&pipeup::github::CheckRunHandle { id: 42 })
        .await
        .unwrap();
    assert_eq!(conclusion, CheckRunConclusion::Other("cancelled".to_string()));
}
