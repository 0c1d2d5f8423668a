use axum::{
    body::Body,
    http::{header, Response, StatusCode},
    middleware,
    routing::{delete, get, post},
    Router,
};
use serde_json::json;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::error;

use crate::shared::AppState;
use crate::{accounts, events, patrons, reports, scans, security, services, values};

/// Builds the full API router. Everything except login and refresh sits
/// behind the JWT middleware.
pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/v1/security/login", post(security::login))
        .route("/v1/security/refresh", post(security::refresh));

    let protected = Router::new()
        .route("/v1/security", get(security::whoami))
        .route("/v1/security/logout", post(security::logout))
        .route(
            "/v1/accounts",
            get(accounts::list_accounts).post(accounts::create_account),
        )
        .route(
            "/v1/accounts/:id",
            get(accounts::get_account)
                .put(accounts::update_account)
                .delete(accounts::delete_account),
        )
        .route(
            "/v1/patrons",
            get(patrons::list_patrons).post(patrons::create_patron),
        )
        .route(
            "/v1/patrons/:id",
            get(patrons::get_patron)
                .put(patrons::update_patron)
                .delete(patrons::delete_patron),
        )
        .route(
            "/v1/events",
            get(events::list_events).post(events::create_event),
        )
        .route(
            "/v1/events/:id",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route(
            "/v1/services",
            get(services::list_services).post(services::create_service),
        )
        .route(
            "/v1/services/:id",
            get(services::get_service)
                .put(services::update_service)
                .delete(services::delete_service),
        )
        .route("/v1/scans", get(scans::list_scans).post(scans::record_scan))
        .route(
            "/v1/scans/:event_id/:patron_id",
            delete(scans::delete_scan),
        )
        .route(
            "/v1/reports/event/master",
            get(reports::event_master_report),
        )
        .route("/api/values", get(values::get_values))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            security::jwt_auth,
        ));

    public
        .merge(protected)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Turns a handler panic into the same JSON 500 body as other internal errors
fn handle_panic(err: Box<dyn std::any::Any + Send + 'static>) -> Response<Body> {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    error!(panic = %detail, "Request handler panicked");

    let body = json!({ "error": "Internal server error" }).to_string();
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap_or_else(|_| Response::new(Body::empty()))
}
