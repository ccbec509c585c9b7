use async_trait::async_trait;

use crate::error::SecretStoreError;
use crate::models::{SecretData, SecretPath};

/// Backend-agnostic secret-store contract.
///
/// Implementations are stateless façades over an external key-value secret
/// backend. The authenticated session handshake happens once, while the
/// implementation is constructed; a handshake failure is fatal to store
/// initialization, never to individual calls. All four operations may be
/// issued concurrently from independent request-handling tasks.
///
/// Absence versus failure is the load-bearing distinction of this trait:
/// a missing key is `Ok(None)` / an empty list, while a transport or auth
/// failure is [`SecretStoreError::BackendUnavailable`]. Callers must never
/// treat a failed call as "secret absent".
#[async_trait]
pub trait SecretStoreClient: Send + Sync {
    /// Upsert the data stored under `path`.
    ///
    /// Creates the record on first write, overwrites it on every later one.
    ///
    /// # Errors
    ///
    /// [`SecretStoreError::BackendUnavailable`] on connectivity or auth
    /// failure.
    async fn write(&self, path: &SecretPath, data: SecretData) -> Result<(), SecretStoreError>;

    /// Read the data stored under `path`.
    ///
    /// Returns `Ok(None)` when the key does not exist.
    ///
    /// # Errors
    ///
    /// [`SecretStoreError::BackendUnavailable`] on connectivity or auth
    /// failure.
    async fn read(&self, path: &SecretPath) -> Result<Option<SecretData>, SecretStoreError>;

    /// List the keys directly under `prefix`.
    ///
    /// Returns an empty `Vec` for an empty or nonexistent prefix.
    ///
    /// # Errors
    ///
    /// [`SecretStoreError::BackendUnavailable`] on connectivity or auth
    /// failure.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, SecretStoreError>;

    /// Delete the record under `path`.
    ///
    /// Idempotent: deleting a key that does not exist succeeds. After a
    /// successful delete, `read` on the same path yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// [`SecretStoreError::BackendUnavailable`] on connectivity or auth
    /// failure.
    async fn delete(&self, path: &SecretPath) -> Result<(), SecretStoreError>;
}
