use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Multipart, State},
    http::{header, HeaderMap},
    response::Json,
};
use std::time::Instant;
use tracing::{debug, error, info};

use crate::error::{AppError, AppResult};
use crate::handlers::AppState;
use crate::middleware::request_id;
use crate::models::{ExtractionResult, UploadedDocument};

const FILE_FIELD: &str = "file";
const FILE_NAME_HEADER: &str = "x-file-name";
const DEFAULT_FILE_NAME: &str = "upload";

pub async fn extract_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> AppResult<Json<ExtractionResult>> {
    let request_id = request_id(&headers);

    info!(request_id = %request_id, "Received request at extract-text API");

    let document = match read_file_field(&mut multipart, state.config.max_file_size_mb).await {
        Ok(document) => document,
        Err(e) => {
            error!(request_id = %request_id, error = %e, "Failed to read upload from multipart form");
            return Err(e);
        }
    };

    info!(
        request_id = %request_id,
        file_name = %document.name,
        declared_type = %document.declared_type,
        file_size = document.size(),
        "Received file"
    );

    run_extraction(&state, &request_id, document).await
}

async fn read_file_field(multipart: &mut Multipart, limit_mb: usize) -> AppResult<UploadedDocument> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::from_multipart(e, limit_mb))?
    {
        if field.name() != Some(FILE_FIELD) {
            debug!(field = ?field.name(), "Skipping multipart field");
            continue;
        }

        let file_name = field.file_name().unwrap_or(DEFAULT_FILE_NAME).to_string();
        let content_type = field.content_type().map(|ct| ct.to_string()).unwrap_or_default();

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::from_multipart(e, limit_mb))?;

        return Ok(UploadedDocument::new(file_name, data).with_declared_type(content_type));
    }

    Err(AppError::MissingFile)
}

/// Raw-body upload: the body is the document, `Content-Type` declares its
/// type and `X-File-Name` names it.
pub async fn extract_binary_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> AppResult<Json<ExtractionResult>> {
    let request_id = request_id(&headers);

    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            let e = AppError::from_body_rejection(rejection, state.config.max_file_size_mb);
            error!(request_id = %request_id, error = %e, "Failed to read binary upload");
            return Err(e);
        }
    };

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .unwrap_or_default();

    let file_name = headers
        .get(FILE_NAME_HEADER)
        .and_then(|name| name.to_str().ok())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_FILE_NAME);

    info!(
        request_id = %request_id,
        file_name = file_name,
        declared_type = content_type,
        file_size = body.len(),
        "Received binary upload"
    );

    let document = UploadedDocument::new(file_name, body).with_declared_type(content_type);
    run_extraction(&state, &request_id, document).await
}

async fn run_extraction(
    state: &AppState,
    request_id: &str,
    document: UploadedDocument,
) -> AppResult<Json<ExtractionResult>> {
    let start = Instant::now();

    let result = match state.extractor.extract(document).await {
        Ok(result) => result,
        Err(e) => {
            error!(
                request_id = %request_id,
                file_name = %e.file_name(),
                file_type = %e.file_type(),
                details = %e.details(),
                "Text extraction failed"
            );
            return Err(e.into());
        }
    };

    info!(
        request_id = %request_id,
        file_type = %result.metadata.file_type,
        line_count = result.lines.len(),
        page_count = ?result.metadata.page_count,
        total_time_ms = start.elapsed().as_millis() as u64,
        "Text processed successfully"
    );

    Ok(Json(result))
}
