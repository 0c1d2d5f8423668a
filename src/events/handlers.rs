use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    service::EventService,
    types::{EventListQuery, EventRequest, EventResponse},
};
use crate::accounts::models::Role;
use crate::security::AccountClaims;
use crate::shared::{AppError, AppState};

/// GET /v1/events?offset&limit&orderBy&dateStart&dateEnd
#[instrument(name = "list_events", skip(state, _claims))]
pub async fn list_events(
    State(state): State<AppState>,
    Extension(_claims): Extension<AccountClaims>,
    Query(query): Query<EventListQuery>,
) -> Result<Json<Vec<EventResponse>>, AppError> {
    let page = query.page()?;
    EventService::from_state(&state)
        .list(query.filter(), page)
        .await
        .map(Json)
}

/// GET /v1/events/:id
#[instrument(name = "get_event", skip(state, _claims))]
pub async fn get_event(
    State(state): State<AppState>,
    Extension(_claims): Extension<AccountClaims>,
    Path(id): Path<Uuid>,
) -> Result<Json<EventResponse>, AppError> {
    EventService::from_state(&state).get(id).await.map(Json)
}

/// POST /v1/events
#[instrument(name = "create_event", skip(state, claims, request))]
pub async fn create_event(
    State(state): State<AppState>,
    Extension(claims): Extension<AccountClaims>,
    Json(request): Json<EventRequest>,
) -> Result<(StatusCode, Json<EventResponse>), AppError> {
    claims.require_role(Role::EDITORS)?;

    let event = EventService::from_state(&state)
        .create(request, claims.account_id())
        .await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// PUT /v1/events/:id
#[instrument(name = "update_event", skip(state, claims, request))]
pub async fn update_event(
    State(state): State<AppState>,
    Extension(claims): Extension<AccountClaims>,
    Path(id): Path<Uuid>,
    Json(request): Json<EventRequest>,
) -> Result<Json<EventResponse>, AppError> {
    claims.require_role(Role::EDITORS)?;

    EventService::from_state(&state)
        .update(id, request, claims.account_id())
        .await
        .map(Json)
}

/// DELETE /v1/events/:id
#[instrument(name = "delete_event", skip(state, claims))]
pub async fn delete_event(
    State(state): State<AppState>,
    Extension(claims): Extension<AccountClaims>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    claims.require_role(Role::EDITORS)?;

    EventService::from_state(&state)
        .delete(id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
}
