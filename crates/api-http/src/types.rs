//! HTTP Request/Response Types

use pdf2html_core::application::ConvertedDocument;
use serde::Serialize;

/// GET /health
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self { status: "ok" }
    }
}

/// POST /convert/text and /convert/text/full
#[derive(Debug, Clone, Serialize)]
pub struct TextResponse {
    pub filename: String,
    pub html: String,
}

impl From<ConvertedDocument> for TextResponse {
    fn from(doc: ConvertedDocument) -> Self {
        Self {
            filename: doc.filename,
            html: doc.html,
        }
    }
}

/// Body of every non-2xx response
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}
