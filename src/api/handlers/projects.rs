//! Project handlers.

use axum::{
    extract::{Extension, Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::api::middleware::auth::AuthExtension;
use crate::api::AppState;
use crate::error::{AppError, Result};
use crate::models::artifact::ArtifactKind;
use crate::models::project::Project;
use crate::services::project_service::ProjectFields;

/// Create project routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_project).get(list_projects))
        .route(
            "/:id",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route(
            "/:id/:kind/:artifact_id",
            post(add_member).delete(remove_member),
        )
}

#[derive(Debug, Deserialize)]
pub struct ProjectRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub storage_space_required: String,
}

impl From<ProjectRequest> for ProjectFields {
    fn from(req: ProjectRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            storage_space_required: req.storage_space_required,
        }
    }
}

/// Map the path segment ("models" / "agents") to an artifact kind.
fn member_kind(segment: &str) -> Result<ArtifactKind> {
    match segment {
        "models" => Ok(ArtifactKind::Model),
        "agents" => Ok(ArtifactKind::Agent),
        other => Err(AppError::Validation(format!(
            "unknown member kind '{}'",
            other
        ))),
    }
}

/// Create a project owned by the caller
pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthExtension>,
    Json(payload): Json<ProjectRequest>,
) -> Result<Json<Project>> {
    let project = state.projects.create(&auth.username, payload.into()).await?;
    Ok(Json(project))
}

/// List the caller's projects
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthExtension>,
) -> Result<Json<Vec<Project>>> {
    let projects = state.projects.list(&auth.username).await?;
    Ok(Json(projects))
}

/// Fetch one of the caller's projects
pub async fn get_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthExtension>,
    Path(id): Path<String>,
) -> Result<Json<Project>> {
    let project = state.projects.get(&id, &auth.username).await?;
    Ok(Json(project))
}

/// Replace a project's fields
pub async fn update_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthExtension>,
    Path(id): Path<String>,
    Json(payload): Json<ProjectRequest>,
) -> Result<Json<Project>> {
    let project = state
        .projects
        .update(&id, &auth.username, payload.into())
        .await?;
    Ok(Json(project))
}

/// Delete a project
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthExtension>,
    Path(id): Path<String>,
) -> Result<()> {
    state.projects.delete(&id, &auth.username).await
}

/// Add a model or agent to the project
pub async fn add_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthExtension>,
    Path((id, kind, artifact_id)): Path<(String, String, String)>,
) -> Result<Json<Project>> {
    let kind = member_kind(&kind)?;
    let project = state
        .projects
        .add_member(&id, &auth.username, kind, &artifact_id)
        .await?;
    Ok(Json(project))
}

/// Remove a model or agent from the project
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthExtension>,
    Path((id, kind, artifact_id)): Path<(String, String, String)>,
) -> Result<Json<Project>> {
    let kind = member_kind(&kind)?;
    let project = state
        .projects
        .remove_member(&id, &auth.username, kind, &artifact_id)
        .await?;
    Ok(Json(project))
}
