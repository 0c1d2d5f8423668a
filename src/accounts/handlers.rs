use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    models::Role,
    service::AccountService,
    types::{AccountCreateRequest, AccountResponse, AccountUpdateRequest},
};
use crate::security::AccountClaims;
use crate::shared::{AppError, AppState};

/// GET /v1/accounts
#[instrument(name = "list_accounts", skip(state, _claims))]
pub async fn list_accounts(
    State(state): State<AppState>,
    Extension(_claims): Extension<AccountClaims>,
) -> Result<Json<Vec<AccountResponse>>, AppError> {
    AccountService::from_state(&state).list().await.map(Json)
}

/// GET /v1/accounts/:id
#[instrument(name = "get_account", skip(state, _claims))]
pub async fn get_account(
    State(state): State<AppState>,
    Extension(_claims): Extension<AccountClaims>,
    Path(id): Path<Uuid>,
) -> Result<Json<AccountResponse>, AppError> {
    AccountService::from_state(&state).get(id).await.map(Json)
}

/// POST /v1/accounts
/// Administrator only
#[instrument(name = "create_account", skip(state, claims, request))]
pub async fn create_account(
    State(state): State<AppState>,
    Extension(claims): Extension<AccountClaims>,
    Json(request): Json<AccountCreateRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), AppError> {
    claims.require_role(&[Role::Administrator])?;

    let account = AccountService::from_state(&state).create(request).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

/// PUT /v1/accounts/:id
#[instrument(name = "update_account", skip(state, claims, request))]
pub async fn update_account(
    State(state): State<AppState>,
    Extension(claims): Extension<AccountClaims>,
    Path(id): Path<Uuid>,
    Json(request): Json<AccountUpdateRequest>,
) -> Result<Json<AccountResponse>, AppError> {
    AccountService::from_state(&state)
        .update(&claims, id, request)
        .await
        .map(Json)
}

/// DELETE /v1/accounts/:id
/// Administrator only
#[instrument(name = "delete_account", skip(state, claims))]
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(claims): Extension<AccountClaims>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    AccountService::from_state(&state)
        .delete(&claims, id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::build_router;
    use crate::shared::test_utils::{account_with_token, send, test_state};
    use axum::http::Method;
    use serde_json::json;

    #[tokio::test]
    async fn test_account_crud_round_trip() {
        let state = test_state();
        let (_, admin_token) = account_with_token(&state, "admin", Role::Administrator).await;
        let app = build_router(state);

        let (status, created) = send(
            app.clone(),
            Method::POST,
            "/v1/accounts",
            Some(&admin_token),
            Some(json!({ "name": "volunteer", "role": "Supervisor", "password": "pw" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["role"], "Supervisor");
        assert!(created.get("passwordHash").is_none());
        let id = created["id"].as_str().unwrap().to_string();

        let (status, fetched) = send(
            app.clone(),
            Method::GET,
            &format!("/v1/accounts/{}", id),
            Some(&admin_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["name"], "volunteer");

        let (status, updated) = send(
            app.clone(),
            Method::PUT,
            &format!("/v1/accounts/{}", id),
            Some(&admin_token),
            Some(json!({ "name": "volunteer-2", "role": "User" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["name"], "volunteer-2");
        assert_eq!(updated["role"], "User");

        let (status, listed) = send(
            app.clone(),
            Method::GET,
            "/v1/accounts",
            Some(&admin_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 2);

        let (status, _) = send(
            app.clone(),
            Method::DELETE,
            &format!("/v1/accounts/{}", id),
            Some(&admin_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(
            app,
            Method::GET,
            &format!("/v1/accounts/{}", id),
            Some(&admin_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_requires_administrator() {
        let state = test_state();
        let (_, token) = account_with_token(&state, "sup", Role::Supervisor).await;
        let app = build_router(state);

        let (status, _) = send(
            app,
            Method::POST,
            "/v1/accounts",
            Some(&token),
            Some(json!({ "name": "x", "password": "y" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_create_validation_messages() {
        let state = test_state();
        let (_, token) = account_with_token(&state, "admin", Role::Administrator).await;
        let app = build_router(state);

        let (status, body) = send(
            app,
            Method::POST,
            "/v1/accounts",
            Some(&token),
            Some(json!({ "name": "", "password": "" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["name"], "The Name field is required.");
        assert_eq!(body["password"], "The Password field is required.");
    }

    #[tokio::test]
    async fn test_create_duplicate_name_conflicts() {
        let state = test_state();
        let (_, token) = account_with_token(&state, "admin", Role::Administrator).await;
        let app = build_router(state);

        let (status, _) = send(
            app,
            Method::POST,
            "/v1/accounts",
            Some(&token),
            Some(json!({ "name": "ADMIN", "password": "pw" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_invalid_id_is_rejected() {
        let state = test_state();
        let (_, token) = account_with_token(&state, "admin", Role::Administrator).await;
        let app = build_router(state);

        let (status, _) = send(
            app,
            Method::GET,
            "/v1/accounts/not-a-uuid",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
