use thiserror::Error;

/// Errors that can occur during secret-store operations.
///
/// Absence is never an error: a missing key is `Ok(None)` from `read` and
/// an empty `Vec` from `list`.
#[derive(Debug, Error)]
pub enum SecretStoreError {
    /// A secret path or path segment is malformed.
    #[error("invalid secret path: {reason}")]
    InvalidSecretPath { reason: String },

    /// The backend could not be reached or refused the session.
    ///
    /// Propagated unchanged to callers; never retried inside the core and
    /// never collapsed into "not found".
    #[error("secret backend unavailable: {reason}")]
    BackendUnavailable { reason: String },

    /// The backend answered with something the client cannot interpret.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SecretStoreError {
    #[must_use]
    pub fn invalid_path(reason: impl Into<String>) -> Self {
        Self::InvalidSecretPath {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// Errors raised while validating a credential submission.
///
/// Both variants are caller input errors, surfaced as client-error
/// responses and never retried.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The submission names a service absent from the tenant's schema map.
    #[error("unknown credential service '{service}'")]
    UnknownService { service: String },

    /// Fields declared for the service are missing from the payload.
    #[error("credential for '{service}' is missing declared fields: {}", missing.join(", "))]
    SchemaMismatch {
        service: String,
        missing: Vec<String>,
    },
}
