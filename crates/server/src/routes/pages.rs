//! Route for single-page generation.

use axum::{Router, extract::State, response::Json as ResponseJson, routing::post};
use chrono::{DateTime, Utc};
use serde::Serialize;
use services::services::page_generator::{PageGenerationRequest, PageGenerator};
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePageResponse {
    pub code: String,
    pub pubspec_yaml: String,
    pub widget_structure: String,
    pub generated_at: DateTime<Utc>,
}

/// POST /api/generate-page
/// Generate one Flutter page. Unlike whole-app generation, an invocation
/// failure here is a hard error.
pub async fn generate_page(
    State(_state): State<AppState>,
    axum::Json(payload): axum::Json<PageGenerationRequest>,
) -> Result<ResponseJson<ApiResponse<GeneratePageResponse>>, ApiError> {
    if payload.name.trim().is_empty() || payload.description.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Page name and description are required".to_string(),
        ));
    }

    let generator = PageGenerator::from_env()?;
    let page = generator.generate_page(&payload).await?;

    Ok(ResponseJson(ApiResponse::success(GeneratePageResponse {
        code: page.code,
        pubspec_yaml: page.pubspec_yaml,
        widget_structure: page.widget_structure,
        generated_at: Utc::now(),
    })))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/generate-page", post(generate_page))
}
