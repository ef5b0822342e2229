/// Worker management endpoints
///
/// Manager-only. A worker calling any of these gets `403 Forbidden`.
///
/// - `POST   /v1/users/devs` - Create a worker owned by the caller
/// - `GET    /v1/users/devs` - List the caller's workers
/// - `DELETE /v1/users/:id`  - Delete one of the caller's workers

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use taskhive_shared::{
    auth::context::IdentityContext,
    models::user::{CreateWorkerRequest, UserInfo},
};
use uuid::Uuid;

/// Create a worker
///
/// # Endpoint
///
/// ```text
/// POST /v1/users/devs
/// Authorization: Bearer <session token>
///
/// {
///   "email": "dev@example.com",
///   "password": "pw1",
///   "first_name": "Grace",
///   "last_name": "Hopper"
/// }
/// ```
///
/// # Errors
///
/// - `403 Forbidden`: Caller is a worker, or `role` asks for a manager
/// - `409 Conflict`: Email already registered
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create_dev(
    State(state): State<AppState>,
    identity: IdentityContext,
    Json(req): Json<CreateWorkerRequest>,
) -> ApiResult<(StatusCode, Json<UserInfo>)> {
    let user = state.services.users.create_worker(&identity, req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn list_devs(
    State(state): State<AppState>,
    identity: IdentityContext,
) -> ApiResult<Json<Vec<UserInfo>>> {
    Ok(Json(state.services.users.list_workers(&identity).await?))
}

/// Delete a worker
///
/// The worker is first removed from every project, then deleted. If the
/// removal fails the worker is kept.
///
/// # Errors
///
/// - `403 Forbidden`: Caller is a worker, or the target is a manager
/// - `404 Not Found`: No such worker among the caller's own
pub async fn delete_user(
    State(state): State<AppState>,
    identity: IdentityContext,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.services.users.delete(&identity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
