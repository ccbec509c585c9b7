//! Credstore SDK
//!
//! This crate provides the public contract of the `credstore` module:
//!
//! - [`SecretStoreClient`] — backend-agnostic secret-store trait
//! - [`SecretPath`], [`SecretData`] — keys and opaque payloads
//! - [`CredentialSubmission`], [`ValidatedCredential`] — credential models
//! - [`SecretStoreError`], [`CredentialError`] — error taxonomy
//!
//! The store contract draws a hard line between absence and failure:
//! `read` returns `Ok(None)` for a key that does not exist and
//! `Err(BackendUnavailable)` when the backend cannot be reached — callers
//! must never read a failed call as "secret absent".

pub mod api;
pub mod error;
pub mod models;

pub use api::SecretStoreClient;
pub use error::{CredentialError, SecretStoreError};
pub use models::{CredentialSubmission, SecretData, SecretPath, ValidatedCredential};
