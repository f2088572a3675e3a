use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
};
use serde_json::json;
use axum::Json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// The sheet's name never shows up in its first column.
    #[error("table start not found for sheet {sheet} (searched first column for {search_key:?})")]
    HeaderNotFound { sheet: String, search_key: String },

    #[error("malformed header in sheet {sheet}: {reason}")]
    MalformedHeader { sheet: String, reason: String },

    #[error("could not download catalog file after checking {days} days")]
    SourceUnavailable { days: u32 },

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP Error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Per-sheet failures are contained by the processor; everything else
    /// aborts the run.
    pub fn is_sheet_level(&self) -> bool {
        matches!(
            self,
            AppError::HeaderNotFound { .. } | AppError::MalformedHeader { .. } | AppError::Workbook(_)
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::SourceUnavailable { .. } | AppError::Http(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match status {
            StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("request failed: {}", self);
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
