//! Credential brokering service.
//!
//! Orchestrates validation and persistence: a submission is validated
//! against the tenant schema first, then written under the deterministic
//! `{tenant}/{service}/{identity}` path. Validation and persistence stay
//! separate steps so validation remains side-effect free.

use std::sync::Arc;

use credstore_sdk::{CredentialSubmission, SecretData, SecretPath, SecretStoreClient};
use tenant_config::TenantDirectory;
use tracing::info;

use super::error::DomainError;
use super::validator::CredentialValidator;

/// Credential domain service.
///
/// Stateless apart from its collaborators; safe for concurrent use.
#[derive(Clone)]
pub struct CredentialService {
    validator: CredentialValidator,
    store: Arc<dyn SecretStoreClient>,
}

impl CredentialService {
    #[must_use]
    pub fn new(directory: Arc<TenantDirectory>, store: Arc<dyn SecretStoreClient>) -> Self {
        Self {
            validator: CredentialValidator::new(directory),
            store,
        }
    }

    /// Validate a submission without persisting it.
    ///
    /// # Errors
    ///
    /// See [`CredentialValidator::validate`].
    pub fn validate(
        &self,
        tenant: &str,
        submission: CredentialSubmission,
    ) -> Result<credstore_sdk::ValidatedCredential, DomainError> {
        self.validator.validate(tenant, submission)
    }

    /// Validate and persist a credential for `identity`.
    ///
    /// Returns the path the credential was stored under.
    ///
    /// # Errors
    ///
    /// Validation errors as in [`CredentialValidator::validate`];
    /// [`credstore_sdk::SecretStoreError::BackendUnavailable`] when the
    /// backend cannot be reached.
    #[tracing::instrument(skip(self, submission), fields(service = %submission.service))]
    pub async fn store_credential(
        &self,
        tenant: &str,
        identity: &str,
        submission: CredentialSubmission,
    ) -> Result<SecretPath, DomainError> {
        let validated = self.validator.validate(tenant, submission)?;
        let path = validated.secret_path(tenant, identity)?;
        self.store.write(&path, validated.into_payload()).await?;
        info!(%path, "credential stored");
        Ok(path)
    }

    /// Fetch a stored credential payload.
    ///
    /// Returns `Ok(None)` when nothing is stored under the coordinates —
    /// absence is not an error.
    ///
    /// # Errors
    ///
    /// Backend failures propagate unchanged.
    pub async fn fetch_credential(
        &self,
        tenant: &str,
        service: &str,
        identity: &str,
    ) -> Result<Option<SecretData>, DomainError> {
        let path = SecretPath::for_credential(tenant, service, identity)?;
        Ok(self.store.read(&path).await?)
    }

    /// Delete a stored credential. Idempotent.
    ///
    /// # Errors
    ///
    /// Backend failures propagate unchanged.
    #[tracing::instrument(skip(self))]
    pub async fn delete_credential(
        &self,
        tenant: &str,
        service: &str,
        identity: &str,
    ) -> Result<(), DomainError> {
        let path = SecretPath::for_credential(tenant, service, identity)?;
        self.store.delete(&path).await?;
        info!(%path, "credential deleted");
        Ok(())
    }

    /// Service names for which `identity` has a stored credential.
    ///
    /// An empty result means no credentials; it is not an error.
    ///
    /// # Errors
    ///
    /// Backend failures propagate unchanged.
    pub async fn list_services(
        &self,
        tenant: &str,
        identity: &str,
    ) -> Result<Vec<String>, DomainError> {
        let mut services = Vec::new();
        for entry in self.store.list(tenant).await? {
            let service = entry.trim_end_matches('/');
            if service.is_empty() {
                continue;
            }
            let path = SecretPath::for_credential(tenant, service, identity)?;
            if self.store.read(&path).await?.is_some() {
                services.push(service.to_owned());
            }
        }
        Ok(services)
    }
}
