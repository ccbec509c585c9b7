//! Configuration document loading.
//!
//! Layering mirrors the server's own config: YAML file first, then
//! `QM_TENANTS__*` environment variables on top, so a deployment can patch
//! single values without editing the file.

use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Yaml};

use crate::directory::ConfigError;
use crate::model::ConfigDocument;

/// Environment prefix for tenant configuration overrides.
const ENV_PREFIX: &str = "QM_TENANTS__";

/// Load and parse the tenant configuration document.
///
/// # Errors
///
/// Returns [`ConfigError::Load`] when the file cannot be read or does not
/// parse into a [`ConfigDocument`].
pub fn load_document(path: &Path) -> Result<ConfigDocument, ConfigError> {
    let document: ConfigDocument = Figment::new()
        .merge(Yaml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(Box::new)?;

    tracing::info!(
        path = %path.display(),
        tenants = document.tenants.len(),
        "tenant configuration loaded"
    );
    Ok(document)
}
