//! Multi-tenant configuration for the Quartermaster server.
//!
//! Configuration is loaded once at startup into an immutable snapshot and
//! resolved through [`TenantDirectory`]:
//!
//! - [`TenantConfig`] and friends — per-tenant identity-provider settings,
//!   credential schemas, CLI release channel and artifact repositories
//! - [`ConfigDocument`] — the full on-disk document, tenants plus the
//!   process-global security ruleset
//! - [`load_document`] — YAML + environment layering via figment
//! - [`TenantDirectory`] — snapshot holder; lookups never block and any
//!   future reload swaps the whole snapshot atomically
//!
//! No mutation API is exposed beyond [`TenantDirectory::replace`]; readers
//! always observe a consistent snapshot.

pub mod directory;
pub mod loader;
pub mod model;

pub use directory::{ConfigError, TenantDirectory};
pub use loader::load_document;
pub use model::{
    CliReleaseConfig, ConfigDocument, CredentialField, IdentityProviderConfig, OauthConfig,
    RepositoryConfig, TenantConfig,
};
