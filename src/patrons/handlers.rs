use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    service::PatronService,
    types::{PatronRequest, PatronResponse},
};
use crate::accounts::models::Role;
use crate::pagination::ListQuery;
use crate::security::AccountClaims;
use crate::shared::{AppError, AppState};

/// GET /v1/patrons?offset&limit&orderBy
#[instrument(name = "list_patrons", skip(state, _claims))]
pub async fn list_patrons(
    State(state): State<AppState>,
    Extension(_claims): Extension<AccountClaims>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<PatronResponse>>, AppError> {
    let page = query.page()?;
    PatronService::from_state(&state).list(page).await.map(Json)
}

/// GET /v1/patrons/:id
#[instrument(name = "get_patron", skip(state, _claims))]
pub async fn get_patron(
    State(state): State<AppState>,
    Extension(_claims): Extension<AccountClaims>,
    Path(id): Path<Uuid>,
) -> Result<Json<PatronResponse>, AppError> {
    PatronService::from_state(&state).get(id).await.map(Json)
}

/// POST /v1/patrons
#[instrument(name = "create_patron", skip(state, claims, request))]
pub async fn create_patron(
    State(state): State<AppState>,
    Extension(claims): Extension<AccountClaims>,
    Json(request): Json<PatronRequest>,
) -> Result<(StatusCode, Json<PatronResponse>), AppError> {
    claims.require_role(Role::EDITORS)?;

    let patron = PatronService::from_state(&state)
        .create(request, claims.account_id())
        .await?;
    Ok((StatusCode::CREATED, Json(patron)))
}

/// PUT /v1/patrons/:id
#[instrument(name = "update_patron", skip(state, claims, request))]
pub async fn update_patron(
    State(state): State<AppState>,
    Extension(claims): Extension<AccountClaims>,
    Path(id): Path<Uuid>,
    Json(request): Json<PatronRequest>,
) -> Result<Json<PatronResponse>, AppError> {
    claims.require_role(Role::EDITORS)?;

    PatronService::from_state(&state)
        .update(id, request, claims.account_id())
        .await
        .map(Json)
}

/// DELETE /v1/patrons/:id
#[instrument(name = "delete_patron", skip(state, claims))]
pub async fn delete_patron(
    State(state): State<AppState>,
    Extension(claims): Extension<AccountClaims>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    claims.require_role(Role::EDITORS)?;

    PatronService::from_state(&state)
        .delete(id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
}
