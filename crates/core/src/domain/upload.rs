// Upload validation
// Runs before any job directory is allocated or any subprocess is spawned.

use crate::domain::error::{DomainError, Result};

/// Multipart field the PDF must be posted under
pub const UPLOAD_FIELD: &str = "file";

const PDF_EXTENSION: &str = ".pdf";
const HTML_EXTENSION: &str = ".html";

/// A validated PDF upload
#[derive(Debug, Clone)]
pub struct PdfUpload {
    filename: String,
    bytes: Vec<u8>,
}

impl PdfUpload {
    /// Validate a client-supplied filename and payload
    ///
    /// # Errors
    /// - `DomainError::ValidationError` if the filename is empty, does not end
    ///   in `.pdf` (case-insensitive), or the payload is empty
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let filename = filename.into();
        validate_filename(&filename)?;

        if bytes.is_empty() {
            return Err(DomainError::ValidationError(
                "Uploaded file is empty".to_string(),
            ));
        }

        Ok(Self { filename, bytes })
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Name of the HTML document returned to the caller (`<stem>.html`)
    pub fn output_filename(&self) -> String {
        output_filename_for(&self.filename)
    }
}

/// Filename-only checks, usable before the upload body is read
pub fn validate_filename(filename: &str) -> Result<()> {
    if filename.is_empty() {
        return Err(DomainError::ValidationError(
            "No file selected".to_string(),
        ));
    }

    if !filename.to_ascii_lowercase().ends_with(PDF_EXTENSION) {
        return Err(DomainError::ValidationError(
            "File must be a PDF".to_string(),
        ));
    }

    Ok(())
}

/// Strip client directory components and the final extension, then append `.html`
pub fn output_filename_for(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);

    let stem = match base.rfind('.') {
        Some(idx) if idx > 0 => &base[..idx],
        _ => base,
    };

    format!("{}{}", stem, HTML_EXTENSION)
}
