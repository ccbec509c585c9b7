//! Server configuration.
//!
//! Layered loading: YAML file (if provided) first, then `QM__*`
//! environment variables, then CLI overrides on top.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use credstore::VaultConfig;
use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use secrecy::SecretString;
use serde::Deserialize;

fn default_bind_addr() -> String {
    "127.0.0.1:3000".to_owned()
}

fn default_tenant_header() -> String {
    "x-tenant".to_owned()
}

fn default_tenants_file() -> PathBuf {
    PathBuf::from("config/tenants.yaml")
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Header carrying the tenant key on incoming requests.
    #[serde(default = "default_tenant_header")]
    pub tenant_header: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            tenant_header: default_tenant_header(),
        }
    }
}

impl ServerConfig {
    /// Apply a `--port` CLI override, keeping the configured host.
    ///
    /// # Errors
    ///
    /// Fails when the configured `bind_addr` is not a socket address.
    pub fn override_port(&mut self, port: u16) -> anyhow::Result<()> {
        let mut addr: SocketAddr = self
            .bind_addr
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid bind_addr '{}': {e}", self.bind_addr))?;
        addr.set_port(port);
        self.bind_addr = addr.to_string();
        Ok(())
    }
}

/// One statically configured bearer token.
///
/// The static table stands in for the external identity provider in
/// deployments (and tests) that run without one.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StaticTokenEntry {
    pub token: SecretString,
    pub username: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Caller-identity settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Static bearer tokens accepted by the server.
    #[serde(default)]
    pub static_tokens: Vec<StaticTokenEntry>,
}

/// Full server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    /// Path of the tenant configuration document.
    #[serde(default = "default_tenants_file")]
    pub tenants_file: PathBuf,
    /// Secret backend settings; without them the server falls back to the
    /// in-memory store and keeps nothing across restarts.
    #[serde(default)]
    pub vault: Option<VaultConfig>,
    #[serde(default)]
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Layered load: YAML (if provided) -> env (`QM__*`).
    ///
    /// # Errors
    ///
    /// Fails when a source does not parse into this structure.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        let config = figment
            .merge(Env::prefixed("QM__").split("__"))
            .extract()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_apply_without_any_source() {
        let config = AppConfig::load(None).unwrap();
        assert_eq!(config.server.bind_addr, "127.0.0.1:3000");
        assert_eq!(config.server.tenant_header, "x-tenant");
        assert!(config.vault.is_none());
        assert!(config.auth.static_tokens.is_empty());
    }

    #[test]
    fn yaml_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "server:\n  bind_addr: 0.0.0.0:8882\ntenants_file: /etc/qm/tenants.yaml"
        )
        .unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.server.bind_addr, "0.0.0.0:8882");
        assert_eq!(config.tenants_file, PathBuf::from("/etc/qm/tenants.yaml"));
    }

    #[test]
    fn environment_overrides_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server:\n  bind_addr: 127.0.0.1:1111").unwrap();

        temp_env::with_var("QM__SERVER__BIND_ADDR", Some("127.0.0.1:2222"), || {
            let config = AppConfig::load(Some(file.path())).unwrap();
            assert_eq!(config.server.bind_addr, "127.0.0.1:2222");
        });
    }

    #[test]
    fn port_override_keeps_host() {
        let mut server = ServerConfig::default();
        server.override_port(9000).unwrap();
        assert_eq!(server.bind_addr, "127.0.0.1:9000");
    }
}
