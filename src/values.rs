use axum::{Extension, Json};
use tracing::instrument;

use crate::accounts::models::Role;
use crate::security::AccountClaims;
use crate::shared::AppError;

/// GET /api/values
/// Administrator-only endpoint for checking that authorization is wired up
#[instrument(name = "get_values", skip(claims))]
pub async fn get_values(
    Extension(claims): Extension<AccountClaims>,
) -> Result<Json<Vec<&'static str>>, AppError> {
    claims.require_role(&[Role::Administrator])?;
    Ok(Json(vec!["value1", "value2"]))
}
