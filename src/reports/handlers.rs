use axum::{
    extract::{Query, State},
    Extension, Json,
};
use tracing::instrument;

use super::{
    service::ReportService,
    types::{EventSummary, ReportQuery},
};
use crate::accounts::models::Role;
use crate::security::AccountClaims;
use crate::shared::{AppError, AppState};

/// GET /v1/reports/event/master?startTime&endTime
#[instrument(name = "event_master_report", skip(state, claims))]
pub async fn event_master_report(
    State(state): State<AppState>,
    Extension(claims): Extension<AccountClaims>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Vec<EventSummary>>, AppError> {
    claims.require_role(Role::EDITORS)?;

    let (start, end) = query.range()?;
    ReportService::from_state(&state)
        .event_master(start, end)
        .await
        .map(Json)
}
