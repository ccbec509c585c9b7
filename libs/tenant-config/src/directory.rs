//! Snapshot-based tenant configuration resolver.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use access_control::{AccessMatcher, AccessRuleError, SecurityConstraints};
use arc_swap::ArcSwap;
use thiserror::Error;

use crate::model::{ConfigDocument, RepositoryConfig, TenantConfig};

/// Errors raised when loading or resolving tenant configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The requested tenant key is not configured.
    #[error("tenant '{tenant}' not found")]
    TenantNotFound { tenant: String },

    /// Two repositories of one tenant share a name.
    #[error("duplicate repository '{name}' for tenant '{tenant}'")]
    DuplicateRepository { tenant: String, name: String },

    /// The security ruleset does not compile.
    #[error(transparent)]
    InvalidSecurityRules(#[from] AccessRuleError),

    /// The configuration source could not be read or parsed.
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),
}

/// One immutable, validated configuration snapshot.
#[derive(Debug)]
struct ConfigSnapshot {
    tenants: HashMap<String, Arc<TenantConfig>>,
    security: Arc<SecurityConstraints>,
}

impl ConfigSnapshot {
    fn build(document: ConfigDocument) -> Result<Self, ConfigError> {
        for (tenant, config) in &document.tenants {
            let mut seen = HashSet::new();
            for repo in &config.repositories {
                if !seen.insert(repo.name.as_str()) {
                    return Err(ConfigError::DuplicateRepository {
                        tenant: tenant.clone(),
                        name: repo.name.clone(),
                    });
                }
            }
        }

        // Compile once so bad patterns surface at load, not per request.
        AccessMatcher::new(&document.security)?;

        Ok(Self {
            tenants: document
                .tenants
                .into_iter()
                .map(|(key, config)| (key, Arc::new(config)))
                .collect(),
            security: Arc::new(document.security),
        })
    }
}

/// Read-mostly directory over all tenant configurations.
///
/// Built once at startup; lookups are lock-free. Replacing the
/// configuration swaps the whole snapshot, so concurrent readers always see
/// either the old or the new configuration in full, never a mix.
#[derive(Debug)]
pub struct TenantDirectory {
    snapshot: ArcSwap<ConfigSnapshot>,
}

impl TenantDirectory {
    /// Validate a document and build the directory from it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateRepository`] when a tenant declares
    /// two repositories with the same name, or
    /// [`ConfigError::InvalidSecurityRules`] when a rule pattern does not
    /// compile.
    pub fn new(document: ConfigDocument) -> Result<Self, ConfigError> {
        Ok(Self {
            snapshot: ArcSwap::from_pointee(ConfigSnapshot::build(document)?),
        })
    }

    /// Resolve one tenant's configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TenantNotFound`] for an unconfigured key.
    pub fn resolve(&self, tenant: &str) -> Result<Arc<TenantConfig>, ConfigError> {
        self.snapshot
            .load()
            .tenants
            .get(tenant)
            .cloned()
            .ok_or_else(|| ConfigError::TenantNotFound {
                tenant: tenant.to_owned(),
            })
    }

    /// A tenant's repositories ordered by ascending priority.
    ///
    /// Equal priorities keep their declaration order, so dependency
    /// resolution falls through repositories deterministically.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TenantNotFound`] for an unconfigured key.
    pub fn repositories_for(&self, tenant: &str) -> Result<Vec<RepositoryConfig>, ConfigError> {
        let config = self.resolve(tenant)?;
        let mut repositories = config.repositories.clone();
        // Vec::sort_by_key is stable: ties keep declaration order.
        repositories.sort_by_key(|repo| repo.priority);
        Ok(repositories)
    }

    /// The process-global security ruleset of the current snapshot.
    #[must_use]
    pub fn security(&self) -> Arc<SecurityConstraints> {
        self.snapshot.load().security.clone()
    }

    /// Replace the whole configuration snapshot.
    ///
    /// Validation is identical to [`TenantDirectory::new`]; on error the
    /// previous snapshot stays in place.
    ///
    /// # Errors
    ///
    /// Same as [`TenantDirectory::new`].
    pub fn replace(&self, document: ConfigDocument) -> Result<(), ConfigError> {
        let snapshot = ConfigSnapshot::build(document)?;
        self.snapshot.store(Arc::new(snapshot));
        tracing::info!("tenant configuration snapshot replaced");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use access_control::{DenyRule, PermitRule};
    use std::collections::BTreeMap;

    fn repository(name: &str, priority: u32) -> RepositoryConfig {
        RepositoryConfig {
            name: name.to_owned(),
            priority,
            tree_path: format!("tree/{name}"),
            username: None,
            password: None,
        }
    }

    fn document_with_repositories(repositories: Vec<RepositoryConfig>) -> ConfigDocument {
        let mut tenants = HashMap::new();
        tenants.insert(
            "zup".to_owned(),
            TenantConfig {
                repositories,
                ..TenantConfig::default()
            },
        );
        ConfigDocument {
            tenants,
            security: SecurityConstraints::default(),
        }
    }

    // ==================== resolve ====================

    #[test]
    fn resolve_existing_tenant() {
        let directory = TenantDirectory::new(document_with_repositories(vec![])).unwrap();
        assert!(directory.resolve("zup").is_ok());
    }

    #[test]
    fn resolve_unknown_tenant() {
        let directory = TenantDirectory::new(document_with_repositories(vec![])).unwrap();

        match directory.resolve("nope") {
            Err(ConfigError::TenantNotFound { tenant }) => assert_eq!(tenant, "nope"),
            other => panic!("expected TenantNotFound, got: {other:?}"),
        }
    }

    // ==================== repositories_for ====================

    #[test]
    fn repositories_are_ordered_by_priority() {
        let directory = TenantDirectory::new(document_with_repositories(vec![
            repository("repository1", 1),
            repository("local", 0),
        ]))
        .unwrap();

        let names: Vec<String> = directory
            .repositories_for("zup")
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["local", "repository1"]);
    }

    #[test]
    fn equal_priorities_keep_declaration_order() {
        let directory = TenantDirectory::new(document_with_repositories(vec![
            repository("beta", 1),
            repository("alpha", 1),
            repository("local", 0),
        ]))
        .unwrap();

        let names: Vec<String> = directory
            .repositories_for("zup")
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["local", "beta", "alpha"]);
    }

    #[test]
    fn repositories_for_unknown_tenant_fails() {
        let directory = TenantDirectory::new(document_with_repositories(vec![])).unwrap();
        assert!(matches!(
            directory.repositories_for("nope"),
            Err(ConfigError::TenantNotFound { .. })
        ));
    }

    // ==================== validation ====================

    #[test]
    fn duplicate_repository_names_are_rejected() {
        let result = TenantDirectory::new(document_with_repositories(vec![
            repository("local", 0),
            repository("local", 1),
        ]));

        match result {
            Err(ConfigError::DuplicateRepository { tenant, name }) => {
                assert_eq!(tenant, "zup");
                assert_eq!(name, "local");
            }
            other => panic!("expected DuplicateRepository, got: {other:?}"),
        }
    }

    #[test]
    fn invalid_security_pattern_is_rejected() {
        let mut document = document_with_repositories(vec![]);
        document.security.public_constraints.push(PermitRule {
            pattern: "/bad/[glob".to_owned(),
            methods: vec!["GET".to_owned()],
        });

        assert!(matches!(
            TenantDirectory::new(document),
            Err(ConfigError::InvalidSecurityRules(_))
        ));
    }

    // ==================== snapshot swap ====================

    #[test]
    fn replace_swaps_the_whole_snapshot() {
        let directory = TenantDirectory::new(document_with_repositories(vec![repository(
            "local", 0,
        )]))
        .unwrap();

        let mut security = SecurityConstraints::default();
        security.constraints.push(DenyRule {
            pattern: "/validate".to_owned(),
            role_methods: BTreeMap::from([("admin".to_owned(), vec!["POST".to_owned()])]),
        });
        directory
            .replace(ConfigDocument {
                tenants: HashMap::new(),
                security,
            })
            .unwrap();

        // Old tenant gone, new rules visible: the snapshot moved as a unit.
        assert!(matches!(
            directory.resolve("zup"),
            Err(ConfigError::TenantNotFound { .. })
        ));
        assert_eq!(directory.security().constraints.len(), 1);
    }

    #[test]
    fn failed_replace_keeps_previous_snapshot() {
        let directory = TenantDirectory::new(document_with_repositories(vec![repository(
            "local", 0,
        )]))
        .unwrap();

        let result = directory.replace(document_with_repositories(vec![
            repository("dup", 0),
            repository("dup", 1),
        ]));

        assert!(result.is_err());
        assert!(directory.resolve("zup").is_ok());
    }
}
