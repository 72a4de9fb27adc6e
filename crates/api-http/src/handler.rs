//! HTTP Handlers
//!
//! Multipart extraction and response shaping. Conversion itself lives in
//! `ConversionService`.

use crate::error::ApiError;
use crate::types::{HealthResponse, TextResponse};
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::State;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pdf2html_core::application::{ConversionService, ConvertedDocument, SanitizeMode};
use pdf2html_core::domain::upload::validate_filename;
use pdf2html_core::domain::{PdfUpload, UPLOAD_FIELD};
use pdf2html_core::error::AppError;
use std::sync::Arc;
use tracing::debug;

const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub conversion: Arc<ConversionService>,
}

impl AppState {
    pub fn new(conversion: Arc<ConversionService>) -> Self {
        Self { conversion }
    }
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// POST /convert
pub async fn convert(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let doc = run(&state, multipart, SanitizeMode::Clean).await?;
    attachment(doc)
}

/// POST /convert/full
pub async fn convert_full(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let doc = run(&state, multipart, SanitizeMode::Full).await?;
    attachment(doc)
}

/// POST /convert/text
pub async fn convert_text(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<TextResponse>, ApiError> {
    let doc = run(&state, multipart, SanitizeMode::Clean).await?;
    Ok(Json(doc.into()))
}

/// POST /convert/text/full
pub async fn convert_text_full(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<TextResponse>, ApiError> {
    let doc = run(&state, multipart, SanitizeMode::Full).await?;
    Ok(Json(doc.into()))
}

async fn run(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
    mode: SanitizeMode,
) -> Result<ConvertedDocument, ApiError> {
    let upload = read_upload(multipart).await?;
    Ok(state.conversion.convert(&upload, mode).await?)
}

/// Pull the `file` part out of the request
///
/// Fields under other names, and parts without a filename parameter, are
/// skipped. The filename is checked before the body is buffered.
async fn read_upload(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<PdfUpload, ApiError> {
    let mut multipart = multipart.map_err(|e| {
        debug!(error = %e, "Request is not multipart");
        no_file()
    })?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_owned) else {
            continue;
        };

        validate_filename(&filename)?;
        let bytes = field.bytes().await?;

        return Ok(PdfUpload::new(filename, bytes.to_vec())?);
    }

    Err(no_file())
}

fn no_file() -> ApiError {
    AppError::Validation("No file provided".to_string()).into()
}

fn attachment(doc: ConvertedDocument) -> Result<Response, ApiError> {
    let disposition = HeaderValue::from_str(&content_disposition(&doc.filename))
        .map_err(|e| AppError::Internal(format!("Invalid Content-Disposition: {}", e)))?;

    Ok((
        [
            (CONTENT_TYPE, HeaderValue::from_static(HTML_CONTENT_TYPE)),
            (CONTENT_DISPOSITION, disposition),
        ],
        doc.html,
    )
        .into_response())
}

/// `attachment; filename="..."`, plus an RFC 5987 `filename*` when the name
/// is not plain ASCII
pub fn content_disposition(filename: &str) -> String {
    if filename.chars().all(is_token_char) {
        return format!("attachment; filename=\"{}\"", filename);
    }

    let fallback: String = filename
        .chars()
        .map(|c| if is_token_char(c) { c } else { '_' })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    )
}

fn is_token_char(c: char) -> bool {
    (c.is_ascii_graphic() || c == ' ') && c != '"' && c != '\\'
}
