//! Actions secret provisioning
//!
//! Secrets are sealed with the repository's public key before transmission
//! (an anonymous sealed box; only the host platform can decrypt). Creation
//! is idempotent: an existing secret is never overwritten, so values
//! rotated by an operator stay intact.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use crypto_box::aead::OsRng;
use crypto_box::PublicKey;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{PipeupError, Result};
use crate::github::client::{status_reason, GitHubClient};

#[derive(Debug, Deserialize)]
struct PublicKeyDetails {
    key_id: String,
    key: String,
}

#[derive(Debug, Serialize)]
struct CreateSecretRequest<'a> {
    encrypted_value: String,
    key_id: &'a str,
}

/// Seal `value` for the holder of the repository's private key
fn seal_secret(public_key_b64: &str, value: &str) -> Result<String> {
    let key_bytes = BASE64.decode(public_key_b64).map_err(|e| {
        PipeupError::SecretProvisioning(format!("invalid repository public key: {e}"))
    })?;
    let key_bytes: [u8; 32] = key_bytes.try_into().map_err(|_| {
        PipeupError::SecretProvisioning("repository public key has unexpected length".to_string())
    })?;

    let public_key = PublicKey::from(key_bytes);
    let sealed = public_key
        .seal(&mut OsRng, value.as_bytes())
        .map_err(|e| PipeupError::SecretProvisioning(format!("sealing failed: {e}")))?;

    Ok(BASE64.encode(sealed))
}

/// Actions secret operations handler
pub struct SecretsHandler<'a> {
    client: &'a GitHubClient,
}

impl<'a> SecretsHandler<'a> {
    /// Create a new handler
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Check whether a secret with this name already exists
    pub async fn exists(&self, name: &str) -> Result<bool> {
        let url = self.client.repo_url(&format!("/actions/secrets/{name}"));
        let response = self.client.get(&url).await?;
        Ok(response.status() == StatusCode::OK)
    }

    /// Create the secret unless it already exists.
    ///
    /// An existing secret is skipped with a log line; the stored value is
    /// never overwritten.
    pub async fn ensure_secret(&self, name: &str, value: &str) -> Result<()> {
        if self.exists(name).await? {
            warn!("Skipped creating {name} as it already exists");
            return Ok(());
        }
        self.create(name, value).await
    }

    /// Fetch the repository's current public key for secret sealing
    async fn public_key(&self) -> Result<PublicKeyDetails> {
        let url = self.client.repo_url("/actions/secrets/public-key");
        let response = self.client.get(&url).await?;
        if response.status() != StatusCode::OK {
            return Err(PipeupError::SecretProvisioning(format!(
                "public key lookup failed: ({})",
                status_reason(response.status())
            )));
        }
        Ok(response.json().await?)
    }

    async fn create(&self, name: &str, value: &str) -> Result<()> {
        let key_details = self.public_key().await?;
        let encrypted_value = seal_secret(&key_details.key, value)?;
        let body = CreateSecretRequest {
            encrypted_value,
            key_id: &key_details.key_id,
        };

        let url = self.client.repo_url(&format!("/actions/secrets/{name}"));
        let response = self.client.put(&url, &body).await?;
        if !response.status().is_success() {
            return Err(PipeupError::SecretProvisioning(format!(
                "creating {name} returned ({})",
                status_reason(response.status())
            )));
        }
        debug!("Created repository secret {name}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crypto_box::SecretKey;

    #[test]
    fn test_seal_secret_roundtrip() {
        let secret_key = SecretKey::generate(&mut OsRng);
        let public_key_b64 = BASE64.encode(secret_key.public_key().as_bytes());

        let sealed_b64 = seal_secret(&public_key_b64, "hunter2").unwrap();
        let sealed = BASE64.decode(sealed_b64).unwrap();
        let opened = secret_key.unseal(&sealed).unwrap();

        assert_eq!(opened, b"hunter2");
    }

    #[test]
    fn test_seal_secret_rejects_bad_key() {
        assert!(seal_secret("not base64!!", "value").is_err());
        assert!(seal_secret(&BASE64.encode([0u8; 7]), "value").is_err());
    }
}
