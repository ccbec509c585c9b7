use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Extension, Router};
use credstore::CredentialService;
use tenant_config::TenantDirectory;
use tower_http::trace::TraceLayer;

use crate::api::rest::handlers;
use crate::auth::{AuthState, authorize_middleware};

/// Build the full application router.
///
/// Layer order matters: extensions are attached outside the authorization
/// middleware so the middleware and every handler can read them.
pub fn router(
    auth: AuthState,
    credentials: Arc<CredentialService>,
    directory: Arc<TenantDirectory>,
) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/credentials",
            post(handlers::store_credential).get(handlers::list_credentials),
        )
        .route(
            "/credentials/{service}",
            get(handlers::fetch_credential).delete(handlers::delete_credential),
        )
        .route("/repositories", get(handlers::list_repositories))
        .layer(axum::middleware::from_fn_with_state(
            auth,
            authorize_middleware,
        ))
        .layer(Extension(credentials))
        .layer(Extension(directory))
        .layer(TraceLayer::new_for_http())
}
