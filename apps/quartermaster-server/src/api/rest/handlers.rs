//! REST handlers.
//!
//! Handlers run behind the authorization middleware, which always attaches
//! a [`RequestTenant`] and a [`CallerIdentity`] extension before a request
//! reaches them. Credentials are addressed by the authenticated caller's
//! username, so one caller can never reach another caller's secrets.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use credstore::{CredentialService, DomainError};
use credstore_sdk::CredentialSubmission;
use tenant_config::TenantDirectory;
use tracing::info;

use crate::api::rest::dto::{
    CredentialRequest, CredentialResponse, CredentialServicesResponse, CredentialStoredResponse,
    HealthResponse, RepositoryDto,
};
use crate::api::rest::error::domain_error_to_problem;
use crate::auth::{CallerIdentity, RequestTenant};
use crate::problem::Problem;

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[tracing::instrument(skip_all, fields(service = %body.service))]
pub async fn store_credential(
    Extension(svc): Extension<Arc<CredentialService>>,
    Extension(RequestTenant(tenant)): Extension<RequestTenant>,
    Extension(caller): Extension<CallerIdentity>,
    Json(body): Json<CredentialRequest>,
) -> Result<(StatusCode, Json<CredentialStoredResponse>), Problem> {
    let service = body.service.clone();
    svc.store_credential(
        &tenant,
        &caller.username,
        CredentialSubmission {
            service: body.service,
            credential: body.credential,
        },
    )
    .await?;

    info!(%tenant, username = %caller.username, "credential accepted");
    Ok((
        StatusCode::CREATED,
        Json(CredentialStoredResponse { service }),
    ))
}

#[tracing::instrument(skip_all, fields(service = %service))]
pub async fn fetch_credential(
    Extension(svc): Extension<Arc<CredentialService>>,
    Extension(RequestTenant(tenant)): Extension<RequestTenant>,
    Extension(caller): Extension<CallerIdentity>,
    Path(service): Path<String>,
) -> Result<Json<CredentialResponse>, Problem> {
    let payload = svc
        .fetch_credential(&tenant, &service, &caller.username)
        .await?;
    match payload {
        Some(credential) => Ok(Json(CredentialResponse {
            service,
            credential,
        })),
        None => Err(Problem::new(
            StatusCode::NOT_FOUND,
            "Credential Not Found",
            format!("no credential stored for service '{service}'"),
        )),
    }
}

#[tracing::instrument(skip_all, fields(service = %service))]
pub async fn delete_credential(
    Extension(svc): Extension<Arc<CredentialService>>,
    Extension(RequestTenant(tenant)): Extension<RequestTenant>,
    Extension(caller): Extension<CallerIdentity>,
    Path(service): Path<String>,
) -> Result<StatusCode, Problem> {
    svc.delete_credential(&tenant, &service, &caller.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(skip_all)]
pub async fn list_credentials(
    Extension(svc): Extension<Arc<CredentialService>>,
    Extension(RequestTenant(tenant)): Extension<RequestTenant>,
    Extension(caller): Extension<CallerIdentity>,
) -> Result<Json<CredentialServicesResponse>, Problem> {
    let services = svc.list_services(&tenant, &caller.username).await?;
    Ok(Json(CredentialServicesResponse { services }))
}

#[tracing::instrument(skip_all)]
pub async fn list_repositories(
    Extension(directory): Extension<Arc<TenantDirectory>>,
    Extension(RequestTenant(tenant)): Extension<RequestTenant>,
) -> Result<Json<Vec<RepositoryDto>>, Problem> {
    let repositories = directory
        .repositories_for(&tenant)
        .map_err(|e| domain_error_to_problem(DomainError::Config(e)))?;
    Ok(Json(
        repositories.into_iter().map(RepositoryDto::from).collect(),
    ))
}
