use axum::http::StatusCode;
use credstore::DomainError;
use credstore_sdk::{CredentialError, SecretStoreError};
use tenant_config::ConfigError;

use crate::problem::Problem;

/// Convert domain errors to HTTP Problem responses.
///
/// Caller input problems become 4xx; a backend outage becomes 503 and is
/// never downgraded to "not found".
pub fn domain_error_to_problem(err: DomainError) -> Problem {
    match err {
        DomainError::Credential(CredentialError::UnknownService { service }) => Problem::new(
            StatusCode::BAD_REQUEST,
            "Unknown Service",
            format!("service '{service}' is not declared for this tenant"),
        ),

        DomainError::Credential(err @ CredentialError::SchemaMismatch { .. }) => {
            Problem::new(StatusCode::UNPROCESSABLE_ENTITY, "Schema Mismatch", err.to_string())
        }

        DomainError::Config(ConfigError::TenantNotFound { tenant }) => Problem::new(
            StatusCode::NOT_FOUND,
            "Unknown Tenant",
            format!("tenant '{tenant}' is not configured"),
        ),

        DomainError::Config(err) => Problem::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Configuration Error",
            err.to_string(),
        ),

        DomainError::Store(SecretStoreError::BackendUnavailable { .. }) => Problem::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "Secret Backend Unavailable",
            "The secret backend cannot be reached",
        ),

        DomainError::Store(SecretStoreError::InvalidSecretPath { reason }) => {
            Problem::new(StatusCode::BAD_REQUEST, "Invalid Request", reason)
        }

        DomainError::Store(SecretStoreError::Internal(msg)) => {
            Problem::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Error", msg)
        }
    }
}

/// Implement `From` so `?` works in handlers.
impl From<DomainError> for Problem {
    fn from(e: DomainError) -> Self {
        domain_error_to_problem(e)
    }
}
