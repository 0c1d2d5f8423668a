use axum::{extract::State, http::StatusCode, Extension, Json};
use tracing::{info, instrument};

use super::{
    service::SecurityService,
    types::{AccountClaims, LoginRequest, RefreshRequest, TokenResponse},
};
use crate::accounts::types::AccountResponse;
use crate::shared::{AppError, AppState};
use crate::validation::Validator;

/// HTTP handler for logging in
///
/// POST /v1/security/login
/// Returns an access token and a refresh token
#[instrument(name = "login", skip(state, request), fields(name = %request.name))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let mut validator = Validator::new();
    validator
        .required("name", "Name", &request.name)
        .required("password", "Password", &request.password);
    validator.finish()?;

    let tokens = SecurityService::from_state(&state)
        .login(&request.name, &request.password)
        .await?;

    Ok(Json(tokens))
}

/// HTTP handler for exchanging a refresh token
///
/// POST /v1/security/refresh
#[instrument(name = "refresh", skip(state, request))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let mut validator = Validator::new();
    validator.required("refreshToken", "Refresh Token", &request.refresh_token);
    validator.finish()?;

    let tokens = SecurityService::from_state(&state)
        .refresh(&request.refresh_token)
        .await?;

    Ok(Json(tokens))
}

/// POST /v1/security/logout
#[instrument(name = "logout", skip(state, claims), fields(account_id = %claims.sub))]
pub async fn logout(
    State(state): State<AppState>,
    Extension(claims): Extension<AccountClaims>,
) -> Result<StatusCode, AppError> {
    SecurityService::from_state(&state)
        .logout(claims.account_id())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /v1/security
/// Returns the authenticated account
#[instrument(name = "whoami", skip(state, claims), fields(account_id = %claims.sub))]
pub async fn whoami(
    State(state): State<AppState>,
    Extension(claims): Extension<AccountClaims>,
) -> Result<Json<AccountResponse>, AppError> {
    let account = state
        .account_repository
        .get(claims.account_id())
        .await?
        .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?;

    info!(name = %account.name, "Resolved current account");
    Ok(Json(account.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::models::Role;
    use crate::app::build_router;
    use crate::shared::test_utils::{account_with_token, send, test_state, TEST_PASSWORD};
    use axum::http::Method;
    use serde_json::json;

    #[tokio::test]
    async fn test_login_and_whoami() {
        let state = test_state();
        account_with_token(&state, "jp", Role::Supervisor).await;
        let app = build_router(state);

        let (status, body) = send(
            app.clone(),
            Method::POST,
            "/v1/security/login",
            None,
            Some(json!({ "name": "jp", "password": TEST_PASSWORD })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tokenType"], "Bearer");

        let access_token = body["accessToken"].as_str().unwrap().to_string();
        let (status, body) = send(
            app,
            Method::GET,
            "/v1/security",
            Some(&access_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "jp");
        assert_eq!(body["role"], "Supervisor");
    }

    #[tokio::test]
    async fn test_login_missing_fields() {
        let app = build_router(test_state());

        let (status, body) = send(
            app,
            Method::POST,
            "/v1/security/login",
            None,
            Some(json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["name"], "The Name field is required.");
        assert_eq!(body["password"], "The Password field is required.");
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let state = test_state();
        account_with_token(&state, "jp", Role::User).await;
        let app = build_router(state);

        let (status, _) = send(
            app,
            Method::POST,
            "/v1/security/login",
            None,
            Some(json!({ "name": "jp", "password": "nope" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_refresh_then_logout() {
        let state = test_state();
        let (_, token) = account_with_token(&state, "jp", Role::User).await;
        let app = build_router(state);

        let (_, body) = send(
            app.clone(),
            Method::POST,
            "/v1/security/login",
            None,
            Some(json!({ "name": "jp", "password": TEST_PASSWORD })),
        )
        .await;
        let refresh_token = body["refreshToken"].as_str().unwrap().to_string();

        let (status, body) = send(
            app.clone(),
            Method::POST,
            "/v1/security/refresh",
            None,
            Some(json!({ "refreshToken": refresh_token })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let rotated = body["refreshToken"].as_str().unwrap().to_string();

        let (status, _) = send(
            app.clone(),
            Method::POST,
            "/v1/security/logout",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(
            app,
            Method::POST,
            "/v1/security/refresh",
            None,
            Some(json!({ "refreshToken": rotated })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let app = build_router(test_state());

        let (status, body) = send(app.clone(), Method::GET, "/v1/security", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Missing authorization header");

        let (status, _) = send(
            app,
            Method::GET,
            "/v1/security",
            Some("not-a-jwt"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
