//! Authorization middleware.
//!
//! For each request:
//! 1. Evaluates the public rules first — a public match proceeds with no
//!    tenant or credentials required.
//! 2. Otherwise resolves the tenant from the configured header, extracts
//!    the bearer token, obtains the caller's roles through [`RoleSource`]
//!    and asks the matcher for a decision.
//! 3. `Allow` proceeds with [`CallerIdentity`] attached; `Deny` answers
//!    with an RFC-9457 Problem. A failed role lookup is never treated as
//!    an allow.

use std::collections::HashMap;
use std::sync::Arc;

use access_control::{AccessMatcher, AccessRequest, Decision};
use async_trait::async_trait;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use secrecy::ExposeSecret;
use tenant_config::TenantDirectory;
use thiserror::Error;

use crate::config::AuthConfig;
use crate::problem::Problem;

/// The authenticated caller, attached to authorized requests.
#[derive(Debug, Clone)]
pub struct CallerIdentity {
    pub username: String,
    pub roles: Vec<String>,
}

impl CallerIdentity {
    /// Identity attached to public requests: no username, no roles.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            username: String::new(),
            roles: Vec::new(),
        }
    }
}

/// The tenant a request was resolved against.
#[derive(Debug, Clone)]
pub struct RequestTenant(pub String);

/// Errors from caller-role resolution.
#[derive(Debug, Error)]
pub enum RoleSourceError {
    /// The token is unknown, expired, or malformed.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The identity provider cannot be reached.
    #[error("identity provider unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Source of caller identity and roles for a bearer token.
///
/// The identity-provider protocol itself lives behind this seam; the
/// middleware only consumes the resulting role claims.
#[async_trait]
pub trait RoleSource: Send + Sync {
    /// Resolve the caller behind `token` within `tenant`.
    ///
    /// # Errors
    ///
    /// [`RoleSourceError::Unauthorized`] for a token the provider does not
    /// accept; [`RoleSourceError::ServiceUnavailable`] when the provider
    /// cannot be reached.
    async fn resolve(&self, tenant: &str, token: &str) -> Result<CallerIdentity, RoleSourceError>;
}

/// Role source backed by the statically configured token table.
pub struct StaticRoleSource {
    tokens: HashMap<String, CallerIdentity>,
}

impl StaticRoleSource {
    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        let tokens = config
            .static_tokens
            .iter()
            .map(|entry| {
                (
                    entry.token.expose_secret().to_owned(),
                    CallerIdentity {
                        username: entry.username.clone(),
                        roles: entry.roles.clone(),
                    },
                )
            })
            .collect();
        Self { tokens }
    }
}

#[async_trait]
impl RoleSource for StaticRoleSource {
    async fn resolve(&self, _tenant: &str, token: &str) -> Result<CallerIdentity, RoleSourceError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| RoleSourceError::Unauthorized("unknown token".to_owned()))
    }
}

/// Shared state for the authorization middleware.
#[derive(Clone)]
pub struct AuthState {
    pub directory: Arc<TenantDirectory>,
    pub matcher: Arc<AccessMatcher>,
    pub roles: Arc<dyn RoleSource>,
    pub tenant_header: String,
}

/// Authorization middleware entry point.
pub async fn authorize_middleware(
    axum::extract::State(state): axum::extract::State<AuthState>,
    mut req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let tenant = header_value(&req, &state.tenant_header);

    // Public rules are checked before anything else; no tenant or
    // credentials are required for a public match.
    let probe = AccessRequest {
        tenant: tenant.as_deref().unwrap_or_default(),
        path: &path,
        method: &method,
        roles: &[],
    };
    if state.matcher.authorize(&probe) == Decision::Public {
        // Extensions are always present downstream; public requests carry
        // an anonymous identity and whatever tenant the header named.
        req.extensions_mut()
            .insert(RequestTenant(tenant.unwrap_or_default()));
        req.extensions_mut().insert(CallerIdentity::anonymous());
        return next.run(req).await;
    }

    let Some(tenant) = tenant else {
        return Problem::new(
            StatusCode::BAD_REQUEST,
            "Missing Tenant",
            format!("the '{}' header is required", state.tenant_header),
        )
        .into_response();
    };
    if state.directory.resolve(&tenant).is_err() {
        return Problem::new(
            StatusCode::NOT_FOUND,
            "Unknown Tenant",
            format!("tenant '{tenant}' is not configured"),
        )
        .into_response();
    }

    let Some(token) = bearer_token(&req) else {
        return Problem::new(
            StatusCode::UNAUTHORIZED,
            "Unauthorized",
            "Missing or invalid Authorization header",
        )
        .into_response();
    };

    let caller = match state.roles.resolve(&tenant, token).await {
        Ok(caller) => caller,
        Err(err) => return role_error_to_response(&err),
    };

    let decision = state.matcher.authorize(&AccessRequest {
        tenant: &tenant,
        path: &path,
        method: &method,
        roles: &caller.roles,
    });
    tracing::debug!(%tenant, %path, %method, ?decision, username = %caller.username, "authorization decision");

    match decision {
        Decision::Public | Decision::Allow => {
            req.extensions_mut().insert(RequestTenant(tenant));
            req.extensions_mut().insert(caller);
            next.run(req).await
        }
        Decision::Deny => Problem::new(
            StatusCode::FORBIDDEN,
            "Forbidden",
            format!("access to {path} denied by policy"),
        )
        .into_response(),
    }
}

fn role_error_to_response(err: &RoleSourceError) -> axum::response::Response {
    match err {
        RoleSourceError::Unauthorized(msg) => {
            tracing::debug!("caller rejected: {msg}");
            Problem::new(
                StatusCode::UNAUTHORIZED,
                "Unauthorized",
                "Authentication failed",
            )
            .into_response()
        }
        RoleSourceError::ServiceUnavailable(msg) => {
            tracing::error!("identity provider unavailable: {msg}");
            Problem::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "Service Unavailable",
                "Identity provider unavailable",
            )
            .into_response()
        }
    }
}

fn header_value(req: &axum::extract::Request, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

fn bearer_token(req: &axum::extract::Request) -> Option<&str> {
    req.headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer ").map(str::trim))
}
