//! Uploaded documents: the transient bytes + filename pairs a request owns.
//!
//! Nothing here touches the file system. pdfium loads documents straight
//! from the byte buffer, and the buffer is dropped with the request. We check
//! the `%PDF` magic before handing bytes to pdfium so a stray `.docx` gets a
//! clear message rather than an opaque parser error.

use crate::error::{PdfQaError, Result};
use tracing::debug;

/// One file received from the user.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadedDocument {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    /// Reject empty payloads and payloads without the PDF magic bytes.
    pub fn validate(&self) -> Result<()> {
        if self.bytes.is_empty() {
            return Err(PdfQaError::EmptyDocument {
                filename: self.filename.clone(),
            });
        }

        if self.bytes.len() < 4 || &self.bytes[..4] != b"%PDF" {
            let mut magic = [0u8; 4];
            let n = self.bytes.len().min(4);
            magic[..n].copy_from_slice(&self.bytes[..n]);
            return Err(PdfQaError::NotAPdf {
                filename: self.filename.clone(),
                magic,
            });
        }

        debug!(
            "Accepted upload '{}' ({} bytes)",
            self.filename,
            self.bytes.len()
        );
        Ok(())
    }
}

/// Case-insensitive `.pdf` extension check for uploaded filenames.
pub fn is_pdf_filename(name: &str) -> bool {
    name.len() > 4 && name.to_ascii_lowercase().ends_with(".pdf")
}
