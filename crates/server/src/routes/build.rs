//! Route for building and publishing a generated project.

use axum::{Router, extract::State, response::Json as ResponseJson, routing::post};
use serde::Deserialize;
use services::services::file_set::FileRecord;
use services::services::project_builder::{BuildOutcome, ProjectBuilder};
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

#[derive(Debug, Clone, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct BuildFlutterRequest {
    #[serde(default)]
    pub files: Vec<FileRecord>,
    #[serde(default)]
    pub project_name: Option<String>,
}

/// POST /api/build-flutter
/// Materialize the file set, build it with the Flutter toolchain when
/// available, and publish either the build artifact or an HTML preview.
pub async fn build_flutter(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<BuildFlutterRequest>,
) -> Result<ResponseJson<ApiResponse<BuildOutcome>>, ApiError> {
    if payload.files.is_empty() {
        return Err(ApiError::BadRequest("No files provided".to_string()));
    }

    let config = &state.config;
    let builder = ProjectBuilder::new(&config.temp_dir, &config.public_dir)
        .with_flutter_bin(&config.flutter_bin)
        .with_build_timeout(config.build_timeout);

    let outcome = builder
        .build(&payload.files, payload.project_name.as_deref())
        .await?;

    Ok(ResponseJson(ApiResponse::success(outcome)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/build-flutter", post(build_flutter))
}
