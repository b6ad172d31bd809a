//! Routes for listing, inspecting and deleting published projects.

use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::get,
};
use serde::Serialize;
use services::services::project_store::{ProjectStatus, ProjectStore, ProjectSummary};
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

#[derive(Debug, Clone, Serialize, TS)]
pub struct ProjectListResponse {
    pub projects: Vec<ProjectSummary>,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct DeleteProjectResponse {
    pub message: String,
}

/// GET /api/flutter-projects
pub async fn list_projects(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<ProjectListResponse>>, ApiError> {
    let store = ProjectStore::new(&state.config.public_dir);
    let projects = store.list().await?;
    Ok(ResponseJson(ApiResponse::success(ProjectListResponse {
        projects,
    })))
}

/// GET /api/flutter-projects/{project_id}
pub async fn get_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<ResponseJson<ApiResponse<ProjectStatus>>, ApiError> {
    let store = ProjectStore::new(&state.config.public_dir);
    let status = store.get(&project_id).await?;
    Ok(ResponseJson(ApiResponse::success(status)))
}

/// DELETE /api/flutter-projects/{project_id}
pub async fn delete_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<ResponseJson<ApiResponse<DeleteProjectResponse>>, ApiError> {
    let store = ProjectStore::new(&state.config.public_dir);
    store.delete(&project_id).await?;
    Ok(ResponseJson(ApiResponse::success(DeleteProjectResponse {
        message: "Project deleted successfully".to_string(),
    })))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/flutter-projects",
        Router::new()
            .route("/", get(list_projects))
            .route("/{project_id}", get(get_project).delete(delete_project)),
    )
}
