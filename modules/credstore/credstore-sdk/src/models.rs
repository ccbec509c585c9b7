//! Domain models for the credstore module.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SecretStoreError;

/// Opaque secret payload, stored and retrieved verbatim.
///
/// The store enforces no schema on values; shape is the caller's concern.
pub type SecretData = HashMap<String, serde_json::Value>;

/// A validated key under which a secret lives.
///
/// Credential secrets use the deterministic `{tenant}/{service}/{identity}`
/// scheme so a payload can always be located again from its coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretPath(String);

impl SecretPath {
    /// Validate a raw path: non-empty, no empty segments, no leading or
    /// trailing separator.
    ///
    /// # Errors
    ///
    /// Returns [`SecretStoreError::InvalidSecretPath`] on a malformed path.
    pub fn new(raw: impl Into<String>) -> Result<Self, SecretStoreError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(SecretStoreError::invalid_path("path is empty"));
        }
        if raw.split('/').any(str::is_empty) {
            return Err(SecretStoreError::invalid_path(format!(
                "path '{raw}' contains an empty segment"
            )));
        }
        Ok(Self(raw))
    }

    /// Build the credential path `{tenant}/{service}/{identity}`.
    ///
    /// # Errors
    ///
    /// Returns [`SecretStoreError::InvalidSecretPath`] when any coordinate
    /// is empty or contains a separator.
    pub fn for_credential(
        tenant: &str,
        service: &str,
        identity: &str,
    ) -> Result<Self, SecretStoreError> {
        for (label, value) in [
            ("tenant", tenant),
            ("service", service),
            ("identity", identity),
        ] {
            if value.is_empty() {
                return Err(SecretStoreError::invalid_path(format!("{label} is empty")));
            }
            if value.contains('/') {
                return Err(SecretStoreError::invalid_path(format!(
                    "{label} '{value}' contains '/'"
                )));
            }
        }
        Ok(Self(format!("{tenant}/{service}/{identity}")))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SecretPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An inbound credential submission from a CLI client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialSubmission {
    /// Service the credential belongs to, e.g. `"github"`.
    pub service: String,
    /// Arbitrary credential payload.
    #[serde(default)]
    pub credential: SecretData,
}

/// A submission that passed schema validation, tagged with its service.
///
/// The payload is carried unchanged; validation checks field presence only.
#[derive(Debug, Clone)]
pub struct ValidatedCredential {
    service: String,
    payload: SecretData,
}

impl ValidatedCredential {
    #[must_use]
    pub fn new(service: String, payload: SecretData) -> Self {
        Self { service, payload }
    }

    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    #[must_use]
    pub fn payload(&self) -> &SecretData {
        &self.payload
    }

    /// The storage path for this credential under the given coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`SecretStoreError::InvalidSecretPath`] when tenant or
    /// identity are not valid path segments.
    pub fn secret_path(&self, tenant: &str, identity: &str) -> Result<SecretPath, SecretStoreError> {
        SecretPath::for_credential(tenant, &self.service, identity)
    }

    #[must_use]
    pub fn into_payload(self) -> SecretData {
        self.payload
    }
}
