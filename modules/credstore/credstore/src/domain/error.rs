use credstore_sdk::{CredentialError, SecretStoreError};
use tenant_config::ConfigError;

/// Errors surfaced by the credential domain service.
///
/// Caller input problems ([`CredentialError`], unknown tenants) map to
/// client-error responses; backend failures propagate unchanged so the REST
/// layer can answer 503 instead of pretending the secret is absent.
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] SecretStoreError),
}
