//! Credential brokering for the Quartermaster server.
//!
//! The module validates inbound credential submissions against the owning
//! tenant's declared schema and persists them through the
//! [`credstore_sdk::SecretStoreClient`] contract:
//!
//! - [`domain::validator::CredentialValidator`] — pure schema validation
//! - [`domain::service::CredentialService`] — validate-then-store
//!   orchestration plus fetch/delete/list
//! - [`infra::vault::VaultKvStore`] — Vault-style HTTP KV backend with a
//!   login handshake at construction
//! - [`infra::memory::InMemorySecretStore`] — contract-equal fake for tests

pub mod domain;
pub mod infra;

pub use domain::error::DomainError;
pub use domain::service::CredentialService;
pub use domain::validator::CredentialValidator;
pub use infra::memory::InMemorySecretStore;
pub use infra::vault::{VaultAuth, VaultConfig, VaultKvStore};
