use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    manager::ServiceManager,
    types::{ServiceRequest, ServiceResponse},
};
use crate::accounts::models::Role;
use crate::pagination::ListQuery;
use crate::security::AccountClaims;
use crate::shared::{AppError, AppState};

/// GET /v1/services?offset&limit&orderBy
#[instrument(name = "list_services", skip(state, _claims))]
pub async fn list_services(
    State(state): State<AppState>,
    Extension(_claims): Extension<AccountClaims>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ServiceResponse>>, AppError> {
    let page = query.page()?;
    ServiceManager::from_state(&state).list(page).await.map(Json)
}

/// GET /v1/services/:id
#[instrument(name = "get_service", skip(state, _claims))]
pub async fn get_service(
    State(state): State<AppState>,
    Extension(_claims): Extension<AccountClaims>,
    Path(id): Path<Uuid>,
) -> Result<Json<ServiceResponse>, AppError> {
    ServiceManager::from_state(&state).get(id).await.map(Json)
}

/// POST /v1/services
#[instrument(name = "create_service", skip(state, claims, request))]
pub async fn create_service(
    State(state): State<AppState>,
    Extension(claims): Extension<AccountClaims>,
    Json(request): Json<ServiceRequest>,
) -> Result<(StatusCode, Json<ServiceResponse>), AppError> {
    claims.require_role(Role::EDITORS)?;

    let service = ServiceManager::from_state(&state)
        .create(request, claims.account_id())
        .await?;
    Ok((StatusCode::CREATED, Json(service)))
}

/// PUT /v1/services/:id
#[instrument(name = "update_service", skip(state, claims, request))]
pub async fn update_service(
    State(state): State<AppState>,
    Extension(claims): Extension<AccountClaims>,
    Path(id): Path<Uuid>,
    Json(request): Json<ServiceRequest>,
) -> Result<Json<ServiceResponse>, AppError> {
    claims.require_role(Role::EDITORS)?;

    ServiceManager::from_state(&state)
        .update(id, request, claims.account_id())
        .await
        .map(Json)
}

/// DELETE /v1/services/:id
#[instrument(name = "delete_service", skip(state, claims))]
pub async fn delete_service(
    State(state): State<AppState>,
    Extension(claims): Extension<AccountClaims>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    claims.require_role(Role::EDITORS)?;

    ServiceManager::from_state(&state)
        .delete(id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
}
