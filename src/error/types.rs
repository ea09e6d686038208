use axum::{
    extract::{multipart::MultipartError, rejection::BytesRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::ExtractionErrorBody;
use crate::services::ExtractionError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("No file provided")]
    MissingFile,

    #[error("Invalid multipart payload: {message}")]
    InvalidMultipart { message: String },

    #[error("Invalid request body: {message}")]
    InvalidBody { message: String },

    #[error("File too large: exceeds limit of {limit}MB")]
    FileTooLarge { limit: usize },

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::MissingFile => "MISSING_FILE",
            AppError::InvalidMultipart { .. } => "INVALID_MULTIPART",
            AppError::InvalidBody { .. } => "INVALID_BODY",
            AppError::FileTooLarge { .. } => "FILE_TOO_LARGE",
            AppError::Extraction(ExtractionError::UnsupportedType { .. }) => "UNSUPPORTED_TYPE",
            AppError::Extraction(ExtractionError::AllMethodsFailed { .. }) => "EXTRACTION_FAILED",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingFile => StatusCode::BAD_REQUEST,
            AppError::InvalidMultipart { .. } => StatusCode::BAD_REQUEST,
            AppError::InvalidBody { .. } => StatusCode::BAD_REQUEST,
            AppError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Extraction(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Maps a multipart read failure, keeping body-limit rejections distinct.
    pub fn from_multipart(err: MultipartError, limit_mb: usize) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::FileTooLarge { limit: limit_mb }
        } else {
            AppError::InvalidMultipart {
                message: err.body_text(),
            }
        }
    }

    /// Maps a raw-body read failure the same way.
    pub fn from_body_rejection(rejection: BytesRejection, limit_mb: usize) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::FileTooLarge { limit: limit_mb }
        } else {
            AppError::InvalidBody {
                message: rejection.body_text(),
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        tracing::error!(
            error_code = error_code,
            status_code = %status,
            error_message = %self,
            "API error occurred"
        );

        let body = match self {
            AppError::MissingFile => json!({ "error": "No file provided" }),
            AppError::Extraction(err) => serde_json::to_value(ExtractionErrorBody {
                error: "Failed to parse document with any available method".to_string(),
                details: err.details(),
                file_type: err.file_type().to_string(),
                file_name: err.file_name().to_string(),
            })
            .unwrap_or_default(),
            AppError::InvalidMultipart { message } => json!({
                "error": "Invalid multipart payload",
                "details": message,
            }),
            AppError::InvalidBody { message } => json!({
                "error": "Invalid request body",
                "details": message,
            }),
            AppError::FileTooLarge { limit } => json!({
                "error": "File too large",
                "details": format!("Uploads are limited to {}MB", limit),
            }),
        };

        (status, Json(body)).into_response()
    }
}
