//! Request-level error taxonomy and its HTTP mapping.

use crate::services::providers::ProviderError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlantError {
    /// Required input field absent or blank in every accepted source.
    #[error("missing '{field}' in JSON body")]
    Validation { field: &'static str },

    /// The model API could not be reached or answered with an error.
    #[error("openai request failed: {0}")]
    Upstream(#[from] ProviderError),

    /// The model's structured payload could not be interpreted.
    #[error("failed parsing model arguments: {detail}")]
    Parse { detail: String, raw: String },
}

impl PlantError {
    pub fn missing(field: &'static str) -> Self {
        PlantError::Validation { field }
    }
}

impl IntoResponse for PlantError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            PlantError::Validation { field } => (
                StatusCode::BAD_REQUEST,
                json!({ "error": format!("missing '{}' in JSON body", field) }),
            ),
            PlantError::Upstream(err) => (
                StatusCode::BAD_GATEWAY,
                json!({ "error": "openai request failed", "detail": err.to_string() }),
            ),
            PlantError::Parse { detail, raw } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": "failed parsing model arguments",
                    "detail": detail,
                    "raw": raw,
                }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
