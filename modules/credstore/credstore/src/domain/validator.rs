//! Schema validation for credential submissions.

use std::sync::Arc;

use credstore_sdk::{CredentialError, CredentialSubmission, ValidatedCredential};
use tenant_config::TenantDirectory;

use super::error::DomainError;

/// Validates credential submissions against the owning tenant's schema.
///
/// Validation is pure: no store calls, no side effects. The check is field
/// presence only — the declared type descriptors are advisory metadata and
/// deliberately not enforced against payload values.
#[derive(Clone)]
pub struct CredentialValidator {
    directory: Arc<TenantDirectory>,
}

impl CredentialValidator {
    #[must_use]
    pub fn new(directory: Arc<TenantDirectory>) -> Self {
        Self { directory }
    }

    /// Validate a submission for `tenant`.
    ///
    /// On success the payload is returned unchanged, tagged with the
    /// resolved service name and ready for storage.
    ///
    /// # Errors
    ///
    /// - [`CredentialError::UnknownService`] when the service is not
    ///   declared in the tenant's schema map
    /// - [`CredentialError::SchemaMismatch`] when declared fields are
    ///   absent from the payload
    /// - [`tenant_config::ConfigError::TenantNotFound`] for an unknown
    ///   tenant
    pub fn validate(
        &self,
        tenant: &str,
        submission: CredentialSubmission,
    ) -> Result<ValidatedCredential, DomainError> {
        let config = self.directory.resolve(tenant)?;

        let Some(schema) = config.credential_schemas.get(&submission.service) else {
            return Err(CredentialError::UnknownService {
                service: submission.service,
            }
            .into());
        };

        let missing: Vec<String> = schema
            .iter()
            .filter(|descriptor| !submission.credential.contains_key(&descriptor.field))
            .map(|descriptor| descriptor.field.clone())
            .collect();
        if !missing.is_empty() {
            return Err(CredentialError::SchemaMismatch {
                service: submission.service,
                missing,
            }
            .into());
        }

        Ok(ValidatedCredential::new(
            submission.service,
            submission.credential,
        ))
    }
}
