use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    service::ScanService,
    types::{ScanDeleteQuery, ScanFilter, ScanRequest, ScanResponse},
};
use crate::accounts::models::Role;
use crate::security::AccountClaims;
use crate::shared::{AppError, AppState};

/// GET /v1/scans?eventId&patronId&serviceId
#[instrument(name = "list_scans", skip(state, _claims))]
pub async fn list_scans(
    State(state): State<AppState>,
    Extension(_claims): Extension<AccountClaims>,
    Query(filter): Query<ScanFilter>,
) -> Result<Json<Vec<ScanResponse>>, AppError> {
    ScanService::from_state(&state).list(filter).await.map(Json)
}

/// POST /v1/scans
/// Any authenticated account may scan; the scan is attributed to the caller
#[instrument(name = "record_scan", skip(state, claims))]
pub async fn record_scan(
    State(state): State<AppState>,
    Extension(claims): Extension<AccountClaims>,
    Json(request): Json<ScanRequest>,
) -> Result<(StatusCode, Json<ScanResponse>), AppError> {
    let scan = ScanService::from_state(&state)
        .record(request, claims.account_id())
        .await?;
    Ok((StatusCode::CREATED, Json(scan)))
}

/// DELETE /v1/scans/:event_id/:patron_id?serviceId
#[instrument(name = "delete_scan", skip(state, claims))]
pub async fn delete_scan(
    State(state): State<AppState>,
    Extension(claims): Extension<AccountClaims>,
    Path((event_id, patron_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<ScanDeleteQuery>,
) -> Result<StatusCode, AppError> {
    claims.require_role(Role::EDITORS)?;

    ScanService::from_state(&state)
        .delete(event_id, patron_id, query.service_id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::build_router;
    use crate::events::{models::EventModel, types::EventRequest};
    use crate::patrons::{models::PatronModel, types::PatronRequest};
    use crate::services::{models::ServiceModel, types::ServiceRequest};
    use crate::shared::test_utils::{account_with_token, send, test_state};
    use axum::{http::Method, Router};
    use chrono::{Duration, Utc};
    use serde_json::{json, Value};

    struct Fixture {
        app: Router,
        token: String,
        scanner: Uuid,
        event: EventModel,
        patron: PatronModel,
        haircut: ServiceModel,
    }

    async fn fixture(role: Role, service_limit: Option<i32>) -> Fixture {
        let state = test_state();
        let (account, token) = account_with_token(&state, "scanner", role).await;
        let now = Utc::now();

        let event = EventModel::new(
            EventRequest {
                name: "Stand Down".to_string(),
                start_date: Some(now - Duration::hours(1)),
                end_date: Some(now + Duration::hours(4)),
                description: None,
            },
            account.id,
        );
        state.event_repository.create(&event).await.unwrap();

        let patron = new_patron(42, account.id);
        state.patron_repository.create(&patron).await.unwrap();

        let haircut = ServiceModel::new(
            ServiceRequest {
                name: "Haircut".to_string(),
                description: None,
                limit: service_limit,
            },
            account.id,
        );
        state.service_repository.create(&haircut).await.unwrap();

        Fixture {
            app: build_router(state),
            token,
            scanner: account.id,
            event,
            patron,
            haircut,
        }
    }

    fn new_patron(member_id: i32, created_by: Uuid) -> PatronModel {
        PatronModel::new(
            PatronRequest {
                member_id: Some(member_id),
                first_name: "John".to_string(),
                last_name: format!("Doe{}", member_id),
                address: "1 Main St".to_string(),
                primary_phone: "555-0100".to_string(),
                secondary_phone: None,
                email: None,
                enrollment_date: None,
            },
            created_by,
        )
    }

    async fn scan(f: &Fixture, member_id: i32, service_id: Option<Uuid>) -> (StatusCode, Value) {
        let mut body = json!({ "eventId": f.event.id, "memberId": member_id });
        if let Some(service_id) = service_id {
            body["serviceId"] = json!(service_id);
        }
        send(f.app.clone(), Method::POST, "/v1/scans", Some(&f.token), Some(body)).await
    }

    #[tokio::test]
    async fn test_check_in_then_service() {
        let f = fixture(Role::User, None).await;

        let (status, body) = scan(&f, 42, None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["patronId"], f.patron.id.to_string());
        assert_eq!(body["scanBy"], f.scanner.to_string());
        assert_eq!(body["serviceId"], Value::Null);

        let (status, body) = scan(&f, 42, Some(f.haircut.id)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["serviceId"], f.haircut.id.to_string());

        let (status, body) = send(
            f.app.clone(),
            Method::GET,
            &format!("/v1/scans?eventId={}", f.event.id),
            Some(&f.token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);

        let (_, body) = send(
            f.app.clone(),
            Method::GET,
            &format!("/v1/scans?serviceId={}", f.haircut.id),
            Some(&f.token),
            None,
        )
        .await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_check_in_conflicts() {
        let f = fixture(Role::User, None).await;

        assert_eq!(scan(&f, 42, None).await.0, StatusCode::CREATED);
        let (status, body) = scan(&f, 42, None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().unwrap().contains("already checked in"));
    }

    #[tokio::test]
    async fn test_service_requires_check_in() {
        let f = fixture(Role::User, None).await;

        let (status, body) = scan(&f, 42, Some(f.haircut.id)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["memberId"].as_str().unwrap().contains("not checked in"));
    }

    #[tokio::test]
    async fn test_duplicate_service_conflicts() {
        let f = fixture(Role::User, None).await;

        scan(&f, 42, None).await;
        assert_eq!(scan(&f, 42, Some(f.haircut.id)).await.0, StatusCode::CREATED);
        assert_eq!(scan(&f, 42, Some(f.haircut.id)).await.0, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_service_limit_blocks_second_patron() {
        let state = test_state();
        let (account, token) = account_with_token(&state, "scanner", Role::User).await;
        let now = Utc::now();

        let event = EventModel::new(
            EventRequest {
                name: "Stand Down".to_string(),
                start_date: Some(now - Duration::hours(1)),
                end_date: Some(now + Duration::hours(1)),
                description: None,
            },
            account.id,
        );
        state.event_repository.create(&event).await.unwrap();
        for member_id in [1, 2] {
            state
                .patron_repository
                .create(&new_patron(member_id, account.id))
                .await
                .unwrap();
        }
        let meal = ServiceModel::new(
            ServiceRequest {
                name: "Meal".to_string(),
                description: None,
                limit: Some(1),
            },
            account.id,
        );
        state.service_repository.create(&meal).await.unwrap();
        let app = build_router(state);

        let post = |member_id: i32, service_id: Option<Uuid>| {
            let app = app.clone();
            let token = token.clone();
            async move {
                let mut body = json!({ "eventId": event.id, "memberId": member_id });
                if let Some(service_id) = service_id {
                    body["serviceId"] = json!(service_id);
                }
                send(app, Method::POST, "/v1/scans", Some(&token), Some(body)).await
            }
        };

        assert_eq!(post(1, None).await.0, StatusCode::CREATED);
        assert_eq!(post(2, None).await.0, StatusCode::CREATED);
        assert_eq!(post(1, Some(meal.id)).await.0, StatusCode::CREATED);

        let (status, body) = post(2, Some(meal.id)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().unwrap().contains("limit"));
    }

    #[tokio::test]
    async fn test_event_not_in_progress() {
        let state = test_state();
        let (account, token) = account_with_token(&state, "scanner", Role::User).await;
        let now = Utc::now();

        let past = EventModel::new(
            EventRequest {
                name: "Last Year".to_string(),
                start_date: Some(now - Duration::days(400)),
                end_date: Some(now - Duration::days(399)),
                description: None,
            },
            account.id,
        );
        state.event_repository.create(&past).await.unwrap();
        state
            .patron_repository
            .create(&new_patron(42, account.id))
            .await
            .unwrap();
        let app = build_router(state);

        let (status, body) = send(
            app.clone(),
            Method::POST,
            "/v1/scans",
            Some(&token),
            Some(json!({ "eventId": past.id, "memberId": 42 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["eventId"], "The specified Event is not in progress.");

        let (status, body) = send(
            app,
            Method::POST,
            "/v1/scans",
            Some(&token),
            Some(json!({ "eventId": Uuid::new_v4(), "memberId": 42 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["eventId"], "The specified Event does not exist.");
    }

    #[tokio::test]
    async fn test_unknown_member_is_not_found() {
        let f = fixture(Role::User, None).await;
        assert_eq!(scan(&f, 9999, None).await.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_scan() {
        let f = fixture(Role::Supervisor, None).await;
        scan(&f, 42, None).await;
        scan(&f, 42, Some(f.haircut.id)).await;

        let uri = format!(
            "/v1/scans/{}/{}?serviceId={}",
            f.event.id, f.patron.id, f.haircut.id
        );
        let (status, _) = send(f.app.clone(), Method::DELETE, &uri, Some(&f.token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(f.app.clone(), Method::DELETE, &uri, Some(&f.token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        // The check-in itself is untouched
        let (_, body) = send(
            f.app.clone(),
            Method::GET,
            &format!("/v1/scans?patronId={}", f.patron.id),
            Some(&f.token),
            None,
        )
        .await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_user_cannot_delete_scan() {
        let f = fixture(Role::User, None).await;
        scan(&f, 42, None).await;

        let (status, _) = send(
            f.app.clone(),
            Method::DELETE,
            &format!("/v1/scans/{}/{}", f.event.id, f.patron.id),
            Some(&f.token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_deleting_event_removes_its_scans() {
        let f = fixture(Role::Administrator, None).await;
        scan(&f, 42, None).await;

        let (status, _) = send(
            f.app.clone(),
            Method::DELETE,
            &format!("/v1/events/{}", f.event.id),
            Some(&f.token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, body) = send(
            f.app.clone(),
            Method::GET,
            &format!("/v1/scans?patronId={}", f.patron.id),
            Some(&f.token),
            None,
        )
        .await;
        assert!(body.as_array().unwrap().is_empty());
    }
}
