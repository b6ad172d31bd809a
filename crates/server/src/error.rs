//! Maps service failures onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use services::services::gemini::GeminiError;
use services::services::project_builder::BuildError;
use services::services::project_store::ProjectStoreError;
use thiserror::Error;
use tracing::error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error(
        "Gemini API key is not configured. Please add GEMINI_API_KEY to your environment variables."
    )]
    MissingApiKey,
    #[error(transparent)]
    Gemini(GeminiError),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Store(#[from] ProjectStoreError),
}

impl From<GeminiError> for ApiError {
    fn from(e: GeminiError) -> Self {
        match e {
            GeminiError::MissingApiKey => Self::MissingApiKey,
            other => Self::Gemini(other),
        }
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::MissingApiKey | Self::Gemini(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Build(e) if e.is_validation() => StatusCode::BAD_REQUEST,
            Self::Build(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Store(ProjectStoreError::InvalidProjectId(_)) => StatusCode::BAD_REQUEST,
            Self::Store(ProjectStoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }
        (status, Json(ApiResponse::<()>::error(self.to_string()))).into_response()
    }
}
