use std::path::PathBuf;
use std::sync::Arc;

use access_control::AccessMatcher;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use credstore::{CredentialService, InMemorySecretStore, VaultKvStore};
use credstore_sdk::SecretStoreClient;
use tenant_config::TenantDirectory;

use quartermaster_server::auth::{AuthState, StaticRoleSource};
use quartermaster_server::config::AppConfig;

/// Quartermaster Server - multi-tenant backend for CLI clients
#[derive(Parser)]
#[command(name = "quartermaster-server")]
#[command(about = "Quartermaster Server - multi-tenant backend for CLI clients")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port override for the HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Validate configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Layered config: defaults -> YAML (if provided) -> env (QM__*) -> CLI.
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.server.override_port(port)?;
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(&config),
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Load and validate the tenant document, building the directory.
fn build_directory(config: &AppConfig) -> Result<Arc<TenantDirectory>> {
    let document = tenant_config::load_document(&config.tenants_file)
        .with_context(|| format!("loading {}", config.tenants_file.display()))?;
    let directory = TenantDirectory::new(document)?;
    Ok(Arc::new(directory))
}

fn check_config(config: &AppConfig) -> Result<()> {
    let directory = build_directory(config)?;
    // Ruleset compiled during directory validation; compile once more to
    // hold a matcher and prove the full startup path.
    AccessMatcher::new(&directory.security())?;
    println!("Configuration is valid");
    Ok(())
}

async fn run_server(config: AppConfig) -> Result<()> {
    tracing::info!("Quartermaster Server starting");

    let directory = build_directory(&config)?;
    let matcher = Arc::new(AccessMatcher::new(&directory.security())?);

    // The session handshake happens here; a failed handshake aborts
    // startup rather than letting calls fail one by one later.
    let store: Arc<dyn SecretStoreClient> = match &config.vault {
        Some(vault) => Arc::new(
            VaultKvStore::connect(vault)
                .await
                .context("secret backend handshake failed")?,
        ),
        None => {
            tracing::warn!("no secret backend configured; using the in-memory store");
            Arc::new(InMemorySecretStore::new())
        }
    };

    let credentials = Arc::new(CredentialService::new(directory.clone(), store));
    let auth = AuthState {
        directory: directory.clone(),
        matcher,
        roles: Arc::new(StaticRoleSource::from_config(&config.auth)),
        tenant_header: config.server.tenant_header.clone(),
    };

    let router = quartermaster_server::api::rest::routes::router(auth, credentials, directory);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.server.bind_addr))?;
    tracing::info!(addr = %config.server.bind_addr, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::error!("failed to install shutdown signal handler");
        return;
    }
    tracing::info!("shutdown signal received");
}
