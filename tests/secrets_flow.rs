//! Secret provisioning tests

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use crypto_box::aead::OsRng;
use crypto_box::SecretKey;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pipeup::github::{GitHubClient, SecretsHandler};

fn client(server: &MockServer) -> GitHubClient {
    GitHubClient::new("octo/app", SecretString::from("test-token".to_string()))
        .unwrap()
        .with_base_url(server.uri())
}

#[tokio::test]
async fn existing_secret_is_never_overwritten() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/app/actions/secrets/AZURE_CREDENTIALS"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "AZURE_CREDENTIALS"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    SecretsHandler::new(&client)
        .ensure_secret("AZURE_CREDENTIALS", "ignored")
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| r.method.as_str() != "PUT"));
}

#[tokio::test]
async fn absent_secret_is_sealed_and_created() {
    let server = MockServer::start().await;
    let secret_key = SecretKey::generate(&mut OsRng);
    let public_key_b64 = BASE64.encode(secret_key.public_key().as_bytes());

    Mock::given(method("GET"))
        .and(path("/repos/octo/app/actions/secrets/REGISTRY_PASSWORD"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/app/actions/secrets/public-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "key_id": "568250167242549743",
            "key": public_key_b64
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/repos/octo/app/actions/secrets/REGISTRY_PASSWORD"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    SecretsHandler::new(&client)
        .ensure_secret("REGISTRY_PASSWORD", "s3cr3t")
        .await
        .unwrap();

    // The transmitted value must be a sealed box only the key holder opens
    let requests = server.received_requests().await.unwrap();
    let put = requests
        .iter()
        .find(|r| r.method.as_str() == "PUT")
        .expect("secret creation request");
    let body: serde_json::Value = serde_json::from_slice(&put.body).unwrap();
    assert_eq!(body["key_id"], "568250167242549743");

    let sealed = BASE64
        .decode(body["encrypted_value"].as_str().unwrap())
        .unwrap();
    let opened = secret_key.unseal(&sealed).unwrap();
    assert_eq!(opened, b"s3cr3t");
}

#[tokio::test]
async fn failed_creation_is_fatal() {
    let server = MockServer::start().await;
    let secret_key = SecretKey::generate(&mut OsRng);
    let public_key_b64 = BASE64.encode(secret_key.public_key().as_bytes());

    Mock::given(method("GET"))
        .and(path("/repos/octo/app/actions/secrets/REGISTRY_USERNAME"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/app/actions/secrets/public-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "key_id": "1",
            "key": public_key_b64
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/repos/octo/app/actions/secrets/REGISTRY_USERNAME"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let client = client(&server);
    let result = SecretsHandler::new(&client)
        .ensure_secret("REGISTRY_USERNAME", "svc-user")
        .await;
    assert!(matches!(
        result,
        Err(pipeup::PipeupError::SecretProvisioning(_))
    ));
}
