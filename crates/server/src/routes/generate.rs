//! Route for whole-app generation.

use axum::{Router, extract::State, response::Json as ResponseJson, routing::post};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use services::services::app_generator::{AppGenerator, AppPlan};
use services::services::file_set::FileRecord;
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

#[derive(Debug, Clone, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct GenerateAppRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub plan: Option<AppPlan>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct GenerateAppResponse {
    pub files: Vec<FileRecord>,
    pub used_fallback: bool,
    pub generated_at: DateTime<Utc>,
}

/// POST /api/generate-app
/// Generate a complete Flutter project from a prompt or a structured plan.
/// Model failures are absorbed by the fallback project, so a well-formed
/// request always gets a file set back.
pub async fn generate_app(
    State(_state): State<AppState>,
    axum::Json(payload): axum::Json<GenerateAppRequest>,
) -> Result<ResponseJson<ApiResponse<GenerateAppResponse>>, ApiError> {
    let prompt = match (payload.prompt, payload.plan) {
        (Some(prompt), _) if !prompt.trim().is_empty() => prompt,
        (_, Some(plan)) => plan.to_prompt(),
        _ => return Err(ApiError::BadRequest("App prompt is required".to_string())),
    };

    let generator = AppGenerator::from_env()?;
    let result = generator.generate_app(&prompt).await;

    Ok(ResponseJson(ApiResponse::success(GenerateAppResponse {
        files: result.files,
        used_fallback: result.used_fallback,
        generated_at: Utc::now(),
    })))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/generate-app", post(generate_app))
}
