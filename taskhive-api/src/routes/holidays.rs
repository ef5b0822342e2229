/// Holiday endpoints
///
/// - `POST   /v1/holidays`     - Create a holiday (manager only)
/// - `GET    /v1/holidays`     - List the effective owner's holidays
/// - `DELETE /v1/holidays/:id` - Delete a holiday (manager only)

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use taskhive_shared::{
    auth::context::IdentityContext,
    models::holiday::{Holiday, HolidayRequest},
};
use uuid::Uuid;

/// Create a holiday
///
/// `start` and `end` are epoch milliseconds; `duration` in the response is
/// the whole number of days between them.
///
/// # Errors
///
/// - `403 Forbidden`: Caller is a worker
/// - `409 Conflict`: The owner already has a holiday with this title
/// - `422 Unprocessable Entity`: Validation failed, or `end` precedes `start`
pub async fn create_holiday(
    State(state): State<AppState>,
    identity: IdentityContext,
    Json(req): Json<HolidayRequest>,
) -> ApiResult<(StatusCode, Json<Holiday>)> {
    let holiday = state.services.holidays.create(&identity, req).await?;
    Ok((StatusCode::CREATED, Json(holiday)))
}

pub async fn list_holidays(
    State(state): State<AppState>,
    identity: IdentityContext,
) -> ApiResult<Json<Vec<Holiday>>> {
    Ok(Json(state.services.holidays.list(&identity).await?))
}

pub async fn delete_holiday(
    State(state): State<AppState>,
    identity: IdentityContext,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.services.holidays.delete(&identity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
