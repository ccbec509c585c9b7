//! Configuration model.
//!
//! One [`TenantConfig`] per tenant key, plus the process-global security
//! ruleset. Secret-bearing fields are wrapped in [`SecretString`] so a
//! debug-printed snapshot never leaks them.

use std::collections::HashMap;

use access_control::SecurityConstraints;
use secrecy::SecretString;
use serde::Deserialize;

/// Identity-provider (SSO) settings for a tenant.
///
/// Consumed by the external identity-provider client; this crate only
/// carries the values.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityProviderConfig {
    /// Base URL of the identity provider.
    pub url: String,
    /// Realm the tenant's users live in.
    pub realm: String,
    pub client_id: String,
    pub client_secret: SecretString,
}

/// OAuth settings handed to CLI clients for the device login flow.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OauthConfig {
    pub url: String,
    pub client_id: String,
}

/// A single declared field of a credential schema.
///
/// The declared type is advisory metadata: validation checks field presence
/// only and does not enforce `kind` against payload values.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialField {
    /// Field name expected in the credential payload.
    pub field: String,
    /// Declared type descriptor, e.g. `"text"` or `"secret"`.
    #[serde(rename = "type")]
    pub kind: String,
}

/// Where CLI binaries for this tenant are released from.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliReleaseConfig {
    pub url: String,
    /// Release provider name, e.g. `"s3"`.
    pub provider: String,
}

/// One artifact repository searched for formulas/packages.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepositoryConfig {
    /// Repository name, unique within a tenant.
    pub name: String,
    /// Lookup priority; lower values are searched first.
    pub priority: u32,
    /// Path of the repository tree inside the backing store.
    pub tree_path: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<SecretString>,
}

/// Full configuration for one tenant.
///
/// The identity-provider, OAuth and CLI-release blocks are optional: a
/// tenant without them simply cannot serve the corresponding flows, which
/// surfaces in the collaborators that consume those blocks.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TenantConfig {
    #[serde(default)]
    pub identity_provider: Option<IdentityProviderConfig>,
    #[serde(default)]
    pub oauth: Option<OauthConfig>,
    /// Mapping from service name to the ordered field descriptors a
    /// credential submission for that service must carry.
    #[serde(default)]
    pub credential_schemas: HashMap<String, Vec<CredentialField>>,
    #[serde(default)]
    pub cli_release: Option<CliReleaseConfig>,
    /// Artifact repositories in declaration order.
    #[serde(default)]
    pub repositories: Vec<RepositoryConfig>,
}

/// The on-disk configuration document: all tenants plus the security rules.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigDocument {
    /// Tenant configurations keyed by the opaque tenant identifier.
    #[serde(default)]
    pub tenants: HashMap<String, TenantConfig>,
    /// Process-global security ruleset.
    #[serde(default)]
    pub security: SecurityConstraints,
}
