//! Vault-style HTTP secret backend.
//!
//! Speaks the KV-v1 surface of a Vault-compatible server: JSON bodies under
//! `/v1/{mount}/{path}`, folder listings via `?list=true`, HTTP 404 meaning
//! absence. The authenticated session is established once in
//! [`VaultKvStore::connect`]; a failed handshake aborts construction.
//!
//! The store defines no retry policy of its own. The only knob is the
//! transport timeout, which is configuration, not code.

use std::time::Duration;

use async_trait::async_trait;
use credstore_sdk::{SecretData, SecretPath, SecretStoreClient, SecretStoreError};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

fn default_mount() -> String {
    "secret".to_owned()
}

fn default_timeout_secs() -> u64 {
    10
}

/// Connection settings for the secret backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    /// Backend origin, e.g. `http://127.0.0.1:8200`.
    pub address: String,
    /// KV mount the secrets live under.
    #[serde(default = "default_mount")]
    pub mount: String,
    pub auth: VaultAuth,
    /// Transport timeout for every call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// How the session handshake authenticates.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum VaultAuth {
    /// A pre-issued client token.
    Token { token: SecretString },
    /// AppRole login; exchanges role credentials for a client token.
    AppRole {
        role_id: String,
        secret_id: SecretString,
    },
}

#[derive(Deserialize)]
struct AppRoleLoginResponse {
    auth: AppRoleLoginAuth,
}

#[derive(Deserialize)]
struct AppRoleLoginAuth {
    client_token: SecretString,
}

#[derive(Deserialize)]
struct ReadResponse {
    #[serde(default)]
    data: SecretData,
}

#[derive(Deserialize)]
struct ListResponse {
    data: ListKeys,
}

#[derive(Deserialize)]
struct ListKeys {
    #[serde(default)]
    keys: Vec<String>,
}

fn transport_failure(context: &str, err: &reqwest::Error) -> SecretStoreError {
    SecretStoreError::unavailable(format!("{context}: {err}"))
}

fn status_failure(context: &str, status: StatusCode) -> SecretStoreError {
    // Auth rejections and server-side faults both mean the backend cannot
    // serve us right now; anything else is a contract surprise.
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
        || status.is_server_error()
    {
        SecretStoreError::unavailable(format!("{context}: backend answered {status}"))
    } else {
        SecretStoreError::internal(format!("{context}: unexpected status {status}"))
    }
}

/// Stateless façade over a Vault-compatible KV backend.
///
/// Holds a pooled HTTP client and the session token; cloning is cheap and
/// every call may be issued concurrently.
#[derive(Debug, Clone)]
pub struct VaultKvStore {
    http: reqwest::Client,
    base: Url,
    mount: String,
    token: SecretString,
}

impl VaultKvStore {
    /// Establish the authenticated session and return a ready store.
    ///
    /// Performs the login handshake (for AppRole auth) and verifies the
    /// session with a token lookup. A handshake failure is fatal here so
    /// that no half-initialized store ever serves calls.
    ///
    /// # Errors
    ///
    /// [`SecretStoreError::BackendUnavailable`] when the backend cannot be
    /// reached or rejects the session; [`SecretStoreError::Internal`] for a
    /// malformed address or response.
    pub async fn connect(config: &VaultConfig) -> Result<Self, SecretStoreError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SecretStoreError::internal(format!("http client: {e}")))?;
        let base = Url::parse(&config.address)
            .map_err(|e| SecretStoreError::internal(format!("invalid address '{}': {e}", config.address)))?;

        let token = match &config.auth {
            VaultAuth::Token { token } => token.clone(),
            VaultAuth::AppRole { role_id, secret_id } => {
                Self::approle_login(&http, &base, role_id, secret_id).await?
            }
        };

        let store = Self {
            http,
            base,
            mount: config.mount.clone(),
            token,
        };
        store.verify_session().await?;
        info!(address = %store.base, mount = %store.mount, "secret backend session established");
        Ok(store)
    }

    async fn approle_login(
        http: &reqwest::Client,
        base: &Url,
        role_id: &str,
        secret_id: &SecretString,
    ) -> Result<SecretString, SecretStoreError> {
        let url = join(base, "v1/auth/approle/login")?;
        let response = http
            .post(url)
            .json(&serde_json::json!({
                "role_id": role_id,
                "secret_id": secret_id.expose_secret(),
            }))
            .send()
            .await
            .map_err(|e| transport_failure("approle login", &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SecretStoreError::unavailable(format!(
                "approle login rejected with {status}"
            )));
        }

        let login: AppRoleLoginResponse = response
            .json()
            .await
            .map_err(|e| SecretStoreError::internal(format!("approle login response: {e}")))?;
        Ok(login.auth.client_token)
    }

    async fn verify_session(&self) -> Result<(), SecretStoreError> {
        let url = join(&self.base, "v1/auth/token/lookup-self")?;
        let response = self
            .authed(self.http.get(url))
            .send()
            .await
            .map_err(|e| transport_failure("session handshake", &e))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(SecretStoreError::unavailable(format!(
                "session handshake rejected with {status}"
            )))
        }
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.header("X-Vault-Token", self.token.expose_secret())
    }

    fn kv_url(&self, path: &str) -> Result<Url, SecretStoreError> {
        join(&self.base, &format!("v1/{}/{path}", self.mount))
    }
}

fn join(base: &Url, path: &str) -> Result<Url, SecretStoreError> {
    base.join(path)
        .map_err(|e| SecretStoreError::internal(format!("url '{path}': {e}")))
}

#[async_trait]
impl SecretStoreClient for VaultKvStore {
    async fn write(&self, path: &SecretPath, data: SecretData) -> Result<(), SecretStoreError> {
        let response = self
            .authed(self.http.post(self.kv_url(path.as_str())?))
            .json(&data)
            .send()
            .await
            .map_err(|e| transport_failure("write", &e))?;

        let status = response.status();
        if status.is_success() {
            debug!(%path, "secret written");
            Ok(())
        } else {
            Err(status_failure("write", status))
        }
    }

    async fn read(&self, path: &SecretPath) -> Result<Option<SecretData>, SecretStoreError> {
        let response = self
            .authed(self.http.get(self.kv_url(path.as_str())?))
            .send()
            .await
            .map_err(|e| transport_failure("read", &e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(status_failure("read", status));
        }

        let body: ReadResponse = response
            .json()
            .await
            .map_err(|e| SecretStoreError::internal(format!("read response: {e}")))?;
        Ok(Some(body.data))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, SecretStoreError> {
        let response = self
            .authed(self.http.get(self.kv_url(prefix)?).query(&[("list", "true")]))
            .send()
            .await
            .map_err(|e| transport_failure("list", &e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(status_failure("list", status));
        }

        let body: ListResponse = response
            .json()
            .await
            .map_err(|e| SecretStoreError::internal(format!("list response: {e}")))?;
        Ok(body.data.keys)
    }

    async fn delete(&self, path: &SecretPath) -> Result<(), SecretStoreError> {
        let response = self
            .authed(self.http.delete(self.kv_url(path.as_str())?))
            .send()
            .await
            .map_err(|e| transport_failure("delete", &e))?;

        let status = response.status();
        // 404 still counts as deleted: the operation is idempotent.
        if status.is_success() || status == StatusCode::NOT_FOUND {
            debug!(%path, "secret deleted");
            Ok(())
        } else {
            Err(status_failure("delete", status))
        }
    }
}
