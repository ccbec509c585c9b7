//! Wire types for the REST surface.

use credstore_sdk::SecretData;
use serde::{Deserialize, Serialize};
use tenant_config::RepositoryConfig;

/// Inbound credential submission body.
#[derive(Debug, Deserialize)]
pub struct CredentialRequest {
    pub service: String,
    #[serde(default)]
    pub credential: SecretData,
}

/// Response after a credential was stored.
#[derive(Debug, Serialize)]
pub struct CredentialStoredResponse {
    pub service: String,
}

/// A stored credential payload.
#[derive(Debug, Serialize)]
pub struct CredentialResponse {
    pub service: String,
    pub credential: SecretData,
}

/// Services the caller holds credentials for.
#[derive(Debug, Serialize)]
pub struct CredentialServicesResponse {
    pub services: Vec<String>,
}

/// One artifact repository, in lookup order.
///
/// Repository access credentials stay server-side and are not exposed.
#[derive(Debug, Serialize)]
pub struct RepositoryDto {
    pub name: String,
    pub priority: u32,
    pub tree_path: String,
}

impl From<RepositoryConfig> for RepositoryDto {
    fn from(repo: RepositoryConfig) -> Self {
        Self {
            name: repo.name,
            priority: repo.priority,
            tree_path: repo.tree_path,
        }
    }
}

/// Liveness body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
