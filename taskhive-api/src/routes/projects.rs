/// Project endpoints
///
/// Reads are scoped to the caller's effective owner: a manager sees its own
/// projects, a worker sees its manager's. Mutations are manager-only.
///
/// - `POST   /v1/projects`          - Create a project
/// - `GET    /v1/projects`          - List projects (`?scope=assigned` for the caller's assignments)
/// - `GET    /v1/projects/:id`      - Get a project
/// - `DELETE /v1/projects/:id`      - Delete a project
/// - `POST   /v1/projects/:id/devs` - Assign workers
/// - `GET    /v1/projects/:id/devs` - List assigned workers

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use taskhive_shared::{
    auth::context::IdentityContext,
    models::project::{AssignDevsRequest, CreateProjectRequest, Project},
    services::projects::ProjectDevs,
};
use uuid::Uuid;

/// Which projects a list request returns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListScope {
    /// Every project of the effective owner
    #[default]
    Owned,

    /// Only projects the caller is assigned to
    Assigned,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListProjectsQuery {
    #[serde(default)]
    pub scope: ListScope,
}

/// Create a project
///
/// # Errors
///
/// - `403 Forbidden`: Caller is a worker
/// - `409 Conflict`: The owner already has a project with this name
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create_project(
    State(state): State<AppState>,
    identity: IdentityContext,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let project = state.services.projects.create(&identity, req).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn list_projects(
    State(state): State<AppState>,
    identity: IdentityContext,
    Query(query): Query<ListProjectsQuery>,
) -> ApiResult<Json<Vec<Project>>> {
    let projects = match query.scope {
        ListScope::Owned => state.services.projects.list(&identity).await?,
        ListScope::Assigned => state.services.projects.assigned(&identity).await?,
    };
    Ok(Json(projects))
}

pub async fn get_project(
    State(state): State<AppState>,
    identity: IdentityContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Project>> {
    Ok(Json(state.services.projects.get(&identity, id).await?))
}

pub async fn delete_project(
    State(state): State<AppState>,
    identity: IdentityContext,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.services.projects.delete(&identity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Assign workers to a project
///
/// All ids must be workers of the caller; otherwise nothing is assigned.
///
/// # Errors
///
/// - `404 Not Found`: Project not visible to the caller
/// - `422 Unprocessable Entity`: Unknown or foreign worker ids, listed in `details`
pub async fn assign_devs(
    State(state): State<AppState>,
    identity: IdentityContext,
    Path(id): Path<Uuid>,
    Json(req): Json<AssignDevsRequest>,
) -> ApiResult<Json<Project>> {
    Ok(Json(
        state.services.projects.assign_devs(&identity, id, req).await?,
    ))
}

pub async fn list_project_devs(
    State(state): State<AppState>,
    identity: IdentityContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ProjectDevs>> {
    Ok(Json(state.services.projects.devs(&identity, id).await?))
}
