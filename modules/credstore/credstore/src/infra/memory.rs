//! In-memory secret store.
//!
//! Implements the full [`SecretStoreClient`] contract, including the
//! not-found-versus-unavailable distinction: tests flip the store into an
//! outage to exercise backend-failure paths without a real backend.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use credstore_sdk::{SecretData, SecretPath, SecretStoreClient, SecretStoreError};
use parking_lot::RwLock;

/// Contract-equal stand-in for a remote secret backend.
#[derive(Debug, Default)]
pub struct InMemorySecretStore {
    records: RwLock<HashMap<String, SecretData>>,
    outage: RwLock<Option<String>>,
}

impl InMemorySecretStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with `BackendUnavailable`.
    pub fn set_unavailable(&self, reason: &str) {
        *self.outage.write() = Some(reason.to_owned());
    }

    /// Clear a previously set outage.
    pub fn set_available(&self) {
        *self.outage.write() = None;
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    fn check_outage(&self) -> Result<(), SecretStoreError> {
        match self.outage.read().as_deref() {
            Some(reason) => Err(SecretStoreError::unavailable(reason)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SecretStoreClient for InMemorySecretStore {
    async fn write(&self, path: &SecretPath, data: SecretData) -> Result<(), SecretStoreError> {
        self.check_outage()?;
        self.records.write().insert(path.as_str().to_owned(), data);
        Ok(())
    }

    async fn read(&self, path: &SecretPath) -> Result<Option<SecretData>, SecretStoreError> {
        self.check_outage()?;
        Ok(self.records.read().get(path.as_str()).cloned())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, SecretStoreError> {
        self.check_outage()?;

        let records = self.records.read();
        let prefix = format!("{}/", prefix.trim_end_matches('/'));
        // Immediate children only; deeper levels show up as "name/"
        // folder entries, the way a KV backend reports them.
        let mut entries = BTreeSet::new();
        for key in records.keys() {
            let Some(rest) = key.strip_prefix(&prefix) else {
                continue;
            };
            match rest.split_once('/') {
                Some((child, _)) => entries.insert(format!("{child}/")),
                None => entries.insert(rest.to_owned()),
            };
        }
        Ok(entries.into_iter().collect())
    }

    async fn delete(&self, path: &SecretPath) -> Result<(), SecretStoreError> {
        self.check_outage()?;
        // Removing an absent key is not an error.
        self.records.write().remove(path.as_str());
        Ok(())
    }
}
